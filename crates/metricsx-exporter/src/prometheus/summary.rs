//! Summary collector.
//!
//! The `prometheus` crate ships no summary type, so this renders `summary`
//! families itself. Quantiles cover a sliding window of [`MAX_AGE`] split into
//! [`AGE_BUCKETS`] streams that rotate lazily on observe and collect. Each
//! stream answers within the smallest objective `error`, in rank. Sum and
//! count are cumulative.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use prometheus::core::{Collector, Desc};
use prometheus::proto::{LabelPair, Metric, MetricFamily, MetricType, Quantile, Summary};
use prometheus::{Error, Opts};

use metricsx_core::Objective;

pub const MAX_AGE: Duration = Duration::from_secs(600);
pub const AGE_BUCKETS: usize = 5;
/// Observations buffered per stream before a sorted merge.
pub const STREAM_BUFFER: usize = 500;

/// Label-partitioned summary. Clones share state.
#[derive(Clone)]
pub struct SummaryVec {
    inner: Arc<SummaryCore>,
}

struct SummaryCore {
    desc: Desc,
    label_names: Vec<String>,
    objectives: Vec<Objective>,
    epsilon: f64,
    series: DashMap<Vec<String>, WindowedSeries>,
}

impl SummaryVec {
    pub fn new(opts: Opts, label_names: &[String], objectives: &[Objective]) -> prometheus::Result<Self> {
        if label_names.iter().any(|l| l == "quantile") {
            return Err(Error::Msg(
                "\"quantile\" is not allowed as label name in summaries".into(),
            ));
        }
        for o in objectives {
            if !(0.0..=1.0).contains(&o.quantile) || !(0.0..=1.0).contains(&o.error) {
                return Err(Error::Msg(format!(
                    "illegal objective {{quantile: {}, error: {}}}",
                    o.quantile, o.error
                )));
            }
        }

        let desc = Desc::new(
            opts.fq_name(),
            opts.help.clone(),
            label_names.to_vec(),
            HashMap::new(),
        )?;

        let mut objectives = objectives.to_vec();
        objectives.sort_by(|a, b| a.quantile.total_cmp(&b.quantile));

        Ok(Self {
            inner: Arc::new(SummaryCore {
                desc,
                label_names: label_names.to_vec(),
                epsilon: rank_epsilon(&objectives),
                objectives,
                series: DashMap::new(),
            }),
        })
    }

    pub fn observe(&self, value: f64, labels: &[&str]) -> prometheus::Result<()> {
        let core = &self.inner;
        if labels.len() != core.label_names.len() {
            return Err(Error::Msg(format!(
                "inconsistent label cardinality, expect {} label values, but got {}",
                core.label_names.len(),
                labels.len()
            )));
        }
        let key: Vec<String> = labels.iter().map(|s| s.to_string()).collect();
        let now = Instant::now();
        core.series
            .entry(key)
            .or_insert_with(|| WindowedSeries::new(now, core.epsilon))
            .observe(value, now);
        Ok(())
    }
}

impl Collector for SummaryVec {
    fn desc(&self) -> Vec<&Desc> {
        vec![&self.inner.desc]
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let core = &self.inner;
        let now = Instant::now();

        let mut metrics = Vec::with_capacity(core.series.len());
        for mut entry in core.series.iter_mut() {
            let mut pairs: Vec<LabelPair> = core
                .label_names
                .iter()
                .zip(entry.key().iter())
                .map(|(name, value)| {
                    let mut lp = LabelPair::default();
                    lp.set_name(name.clone());
                    lp.set_value(value.clone());
                    lp
                })
                .collect();
            pairs.sort_by(|a, b| a.get_name().cmp(b.get_name()));

            let series = entry.value_mut();
            let quantiles: Vec<Quantile> = series
                .quantiles(now, &core.objectives)
                .into_iter()
                .map(|(q, v)| {
                    let mut quantile = Quantile::default();
                    quantile.set_quantile(q);
                    quantile.set_value(v);
                    quantile
                })
                .collect();

            let mut summary = Summary::default();
            summary.set_sample_count(series.count);
            summary.set_sample_sum(series.sum);
            summary.set_quantile(quantiles.into());

            let mut m = Metric::default();
            m.set_label(pairs.into());
            m.set_summary(summary);
            metrics.push(m);
        }

        let mut mf = MetricFamily::default();
        mf.set_name(core.desc.fq_name.clone());
        mf.set_help(core.desc.help.clone());
        mf.set_field_type(MetricType::SUMMARY);
        mf.set_metric(metrics.into());
        vec![mf]
    }
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    value: f64,
    /// Observations folded into this sample.
    width: f64,
    /// Uncertainty of the sample's rank.
    delta: f64,
}

/// Greenwald-Khanna rank summary.
///
/// Every reported quantile is within `epsilon * n` ranks of the true one.
/// Inserts are buffered and merged in sorted batches.
#[derive(Debug)]
struct QuantileStream {
    epsilon: f64,
    samples: Vec<Sample>,
    buffer: Vec<f64>,
    n: f64,
}

impl QuantileStream {
    fn new(epsilon: f64) -> Self {
        Self {
            epsilon,
            samples: Vec::new(),
            buffer: Vec::with_capacity(STREAM_BUFFER),
            n: 0.0,
        }
    }

    fn insert(&mut self, value: f64) {
        self.buffer.push(value);
        if self.buffer.len() >= STREAM_BUFFER {
            self.flush();
        }
    }

    fn reset(&mut self) {
        self.samples.clear();
        self.buffer.clear();
        self.n = 0.0;
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.samples.len() + self.buffer.len()
    }

    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        self.buffer.sort_by(|a, b| a.total_cmp(b));

        let old = std::mem::take(&mut self.samples);
        let mut merged = Vec::with_capacity(old.len() + self.buffer.len());
        let mut rest = old.into_iter().peekable();
        let mut passed_any = false;
        for &value in &self.buffer {
            while let Some(c) = rest.next_if(|c| c.value <= value) {
                merged.push(c);
                passed_any = true;
            }
            // new minimum or maximum has an exact rank
            let delta = match rest.peek() {
                Some(next) if passed_any => next.width + next.delta - 1.0,
                _ => 0.0,
            };
            merged.push(Sample {
                value,
                width: 1.0,
                delta,
            });
            self.n += 1.0;
        }
        merged.extend(rest);
        self.buffer.clear();
        self.samples = merged;
        self.compress();
    }

    /// Fold samples into their right neighbour while the band stays within
    /// `2 * epsilon * n`. The extremes are kept.
    fn compress(&mut self) {
        let len = self.samples.len();
        if len < 3 {
            return;
        }
        let limit = 2.0 * self.epsilon * self.n;
        let mut kept = Vec::with_capacity(len);
        kept.push(self.samples[len - 1]);
        let mut x = self.samples[len - 2];
        for &c in self.samples[1..len - 2].iter().rev() {
            if c.width + x.width + x.delta <= limit {
                x.width += c.width;
            } else {
                kept.push(x);
                x = c;
            }
        }
        kept.push(x);
        kept.push(self.samples[0]);
        kept.reverse();
        self.samples = kept;
    }

    fn query(&mut self, q: f64) -> f64 {
        if self.samples.is_empty() {
            // exact while nothing has been merged
            if self.buffer.is_empty() {
                return f64::NAN;
            }
            self.buffer.sort_by(|a, b| a.total_cmp(b));
            let i = (self.buffer.len() as f64 * q).ceil() as usize;
            return self.buffer[i.saturating_sub(1).min(self.buffer.len() - 1)];
        }
        self.flush();

        let target = q * self.n;
        let mut best = (f64::INFINITY, f64::NAN);
        let mut r_min = 0.0;
        for s in &self.samples {
            r_min += s.width;
            let err = (target - r_min).max(r_min + s.delta - target);
            if err < best.0 {
                best = (err, s.value);
            }
        }
        best.1
    }
}

/// Tightest error among `objectives`; it bounds every reported quantile.
fn rank_epsilon(objectives: &[Objective]) -> f64 {
    objectives
        .iter()
        .map(|o| o.error)
        .fold(f64::INFINITY, f64::min)
}

/// Every observation goes into all age streams; the head stream is the oldest
/// and answers queries. Rotation resets it and moves the head on.
#[derive(Debug)]
struct WindowedSeries {
    streams: Vec<QuantileStream>,
    head: usize,
    head_expires: Instant,
    count: u64,
    sum: f64,
}

impl WindowedSeries {
    fn new(now: Instant, epsilon: f64) -> Self {
        Self {
            streams: (0..AGE_BUCKETS).map(|_| QuantileStream::new(epsilon)).collect(),
            head: 0,
            head_expires: now + bucket_width(),
            count: 0,
            sum: 0.0,
        }
    }

    fn rotate(&mut self, now: Instant) {
        if now < self.head_expires {
            return;
        }
        if now.duration_since(self.head_expires) >= MAX_AGE {
            for s in &mut self.streams {
                s.reset();
            }
            self.head_expires = now + bucket_width();
            return;
        }
        while now >= self.head_expires {
            self.streams[self.head].reset();
            self.head = (self.head + 1) % AGE_BUCKETS;
            self.head_expires += bucket_width();
        }
    }

    fn observe(&mut self, value: f64, now: Instant) {
        self.rotate(now);
        for s in &mut self.streams {
            s.insert(value);
        }
        self.count += 1;
        self.sum += value;
    }

    /// Quantiles over the live window; NaN when it is empty.
    fn quantiles(&mut self, now: Instant, objectives: &[Objective]) -> Vec<(f64, f64)> {
        self.rotate(now);
        let head = &mut self.streams[self.head];
        objectives
            .iter()
            .map(|o| (o.quantile, head.query(o.quantile)))
            .collect()
    }
}

fn bucket_width() -> Duration {
    MAX_AGE / AGE_BUCKETS as u32
}
