//! Prometheus provider.
//!
//! Per-kind identity maps are `DashMap`s: an already-registered identity is
//! served under a shard read lock, and only the first declaration of a new
//! identity takes the shard write lock while it registers with the registry.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use metricsx_core::error::{MetricsError, Result};
use metricsx_core::{
    Context, Counter, Exposition, Gauge, Histogram, MetricIdentity, MetricKind, MetricOptions,
    Provider, Summary,
};

use super::metrics::{
    Declared, PrometheusCounter, PrometheusGauge, PrometheusHistogram, PrometheusSummary,
    Registered,
};
use super::registry::PrometheusRegistry;
use crate::config::PrometheusConfig;
use crate::ops;
use crate::server::ExpositionServer;

pub struct PrometheusProvider {
    config: PrometheusConfig,
    registry: Arc<PrometheusRegistry>,
    server: ExpositionServer,

    counters: DashMap<MetricIdentity, Arc<PrometheusCounter>>,
    gauges: DashMap<MetricIdentity, Arc<PrometheusGauge>>,
    histograms: DashMap<MetricIdentity, Arc<PrometheusHistogram>>,
    summaries: DashMap<MetricIdentity, Arc<PrometheusSummary>>,
}

impl PrometheusProvider {
    pub fn new(config: PrometheusConfig) -> Result<Self> {
        let registry = Arc::new(PrometheusRegistry::new(&config)?);
        Ok(Self {
            config,
            registry,
            server: ExpositionServer::new(),
            counters: DashMap::new(),
            gauges: DashMap::new(),
            histograms: DashMap::new(),
            summaries: DashMap::new(),
        })
    }

    pub fn config(&self) -> &PrometheusConfig {
        &self.config
    }

    pub fn registry(&self) -> Arc<PrometheusRegistry> {
        Arc::clone(&self.registry)
    }

    /// Address of the standalone listener, when one is running.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.server.local_addr().await
    }

    fn identity(&self, name: &str, opts: &MetricOptions) -> MetricIdentity {
        MetricIdentity::resolve(name, opts, &self.config.namespace, &self.config.subsystem)
    }

    fn get_or_register<M, F>(
        &self,
        map: &DashMap<MetricIdentity, Arc<M>>,
        kind: MetricKind,
        name: &str,
        opts: &MetricOptions,
        build: F,
    ) -> Result<Arc<M>>
    where
        M: Registered,
        F: FnOnce(&MetricIdentity) -> prometheus::Result<M>,
    {
        let id = self.identity(name, opts);

        if let Some(existing) = map.get(&id) {
            warn_on_redeclare(kind, existing.decl(), opts);
            return Ok(Arc::clone(existing.value()));
        }

        match map.entry(id) {
            Entry::Occupied(e) => {
                warn_on_redeclare(kind, e.get().decl(), opts);
                Ok(Arc::clone(e.get()))
            }
            Entry::Vacant(e) => {
                let fq_name = e.key().fq_name();
                let metric =
                    build(e.key()).map_err(|err| MetricsError::registration(kind, &fq_name, err))?;
                self.registry.register(kind, &fq_name, metric.collector())?;
                let metric = Arc::new(metric);
                e.insert(Arc::clone(&metric));
                tracing::debug!(kind = %kind, metric = %fq_name, "registered metric");
                Ok(metric)
            }
        }
    }
}

/// The first declaration wins; differing options only get flagged.
fn warn_on_redeclare(kind: MetricKind, decl: &Declared, opts: &MetricOptions) {
    let differs = decl.drift(opts);
    if !differs.is_empty() {
        tracing::warn!(
            kind = %kind,
            metric = %decl.fq_name(),
            differs = ?differs,
            "metric redeclared with different options; keeping first registration"
        );
    }
}

#[async_trait]
impl Provider for PrometheusProvider {
    fn counter(&self, name: &str, opts: &MetricOptions) -> Result<Arc<dyn Counter>> {
        let c: Arc<dyn Counter> =
            self.get_or_register(&self.counters, MetricKind::Counter, name, opts, |id| {
                PrometheusCounter::new(id, opts)
            })?;
        Ok(c)
    }

    fn gauge(&self, name: &str, opts: &MetricOptions) -> Result<Arc<dyn Gauge>> {
        let g: Arc<dyn Gauge> =
            self.get_or_register(&self.gauges, MetricKind::Gauge, name, opts, |id| {
                PrometheusGauge::new(id, opts)
            })?;
        Ok(g)
    }

    fn histogram(&self, name: &str, opts: &MetricOptions) -> Result<Arc<dyn Histogram>> {
        let h: Arc<dyn Histogram> =
            self.get_or_register(&self.histograms, MetricKind::Histogram, name, opts, |id| {
                PrometheusHistogram::new(id, opts)
            })?;
        Ok(h)
    }

    fn summary(&self, name: &str, opts: &MetricOptions) -> Result<Arc<dyn Summary>> {
        let s: Arc<dyn Summary> =
            self.get_or_register(&self.summaries, MetricKind::Summary, name, opts, |id| {
                PrometheusSummary::new(id, opts)
            })?;
        Ok(s)
    }

    async fn start(&self, ctx: &Context) -> Result<()> {
        let path = &self.config.path;
        if self.config.port == 0 {
            tracing::info!(path = %path, "metrics will be exposed on the host HTTP server");
            return Ok(());
        }

        let exposition: Arc<dyn Exposition> = self.registry.clone();
        let router = ops::exposition_router(path, exposition);
        let addr = self.server.start(ctx, self.config.port, router).await?;
        tracing::info!(addr = %addr, path = %path, "metrics HTTP server listening");
        Ok(())
    }

    async fn stop(&self, ctx: &Context) -> Result<()> {
        self.server.stop(ctx).await
    }

    fn exposition(&self) -> Option<Arc<dyn Exposition>> {
        let exposition: Arc<dyn Exposition> = self.registry.clone();
        Some(exposition)
    }
}
