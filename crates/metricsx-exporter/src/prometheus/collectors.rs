//! Async runtime collector.
//!
//! Reads the tokio runtime driving the scrape. Outside a runtime every gauge
//! reports zero.

use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{IntGauge, Opts};

pub struct RuntimeCollector {
    workers: IntGauge,
    alive_tasks: IntGauge,
    global_queue_depth: IntGauge,
    descs: Vec<Desc>,
}

impl RuntimeCollector {
    pub fn new() -> prometheus::Result<Self> {
        let workers = IntGauge::with_opts(Opts::new(
            "tokio_runtime_workers",
            "Number of worker threads used by the runtime.",
        ))?;
        let alive_tasks = IntGauge::with_opts(Opts::new(
            "tokio_runtime_alive_tasks",
            "Number of tasks currently alive in the runtime.",
        ))?;
        let global_queue_depth = IntGauge::with_opts(Opts::new(
            "tokio_runtime_global_queue_depth",
            "Number of tasks waiting in the runtime's global queue.",
        ))?;

        let descs = [&workers, &alive_tasks, &global_queue_depth]
            .iter()
            .flat_map(|g| g.desc())
            .cloned()
            .collect();

        Ok(Self {
            workers,
            alive_tasks,
            global_queue_depth,
            descs,
        })
    }

    fn refresh(&self) {
        let (workers, alive, queued) = match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let m = handle.metrics();
                (m.num_workers(), m.num_alive_tasks(), m.global_queue_depth())
            }
            Err(_) => (0, 0, 0),
        };
        self.workers.set(workers as i64);
        self.alive_tasks.set(alive as i64);
        self.global_queue_depth.set(queued as i64);
    }
}

impl Collector for RuntimeCollector {
    fn desc(&self) -> Vec<&Desc> {
        self.descs.iter().collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        self.refresh();
        let mut mfs = self.workers.collect();
        mfs.extend(self.alive_tasks.collect());
        mfs.extend(self.global_queue_depth.collect());
        mfs
    }
}
