#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use metricsx_core::{Exposition, MetricOptions, Metrics, Objective, Provider};
use metricsx_exporter::config::PrometheusConfig;
use metricsx_exporter::prometheus::PrometheusProvider;

use common::{bare_config, bare_provider, capture_logs, counter_value, find_series, gauge_value};

fn render(p: &PrometheusProvider) -> String {
    p.registry().render().unwrap()
}

fn same<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

#[test]
fn counter_accumulates_per_label_set() {
    let p = bare_provider();
    let c = p
        .counter(
            "http_requests_total",
            &MetricOptions::new().help("requests").labels(["method"]),
        )
        .unwrap();

    c.inc(&["GET"]);
    c.inc(&["GET"]);
    c.add(5.0, &["GET"]);
    c.inc(&["POST"]);

    assert_eq!(counter_value(&p, "http_requests_total", &[("method", "GET")]), 7.0);
    assert_eq!(counter_value(&p, "http_requests_total", &[("method", "POST")]), 1.0);

    let text = render(&p);
    assert!(text.contains("# TYPE http_requests_total counter"), "{text}");
    assert!(text.contains(r#"http_requests_total{method="GET"} 7"#), "{text}");
}

#[test]
fn counter_drops_negative_add() {
    let p = bare_provider();
    let c = p.counter("jobs_total", &MetricOptions::new()).unwrap();
    c.add(2.0, &[]);

    let ((), logs) = capture_logs(|| c.add(-1.0, &[]));

    assert_eq!(counter_value(&p, "jobs_total", &[]), 2.0);
    assert!(logs.contains("dropping observation"), "{logs}");
}

#[test]
fn gauge_arithmetic() {
    let p = bare_provider();
    let g = p
        .gauge("queue_depth", &MetricOptions::new().labels(["queue"]))
        .unwrap();

    g.set(10.0, &["jobs"]);
    g.add(5.0, &["jobs"]);
    g.sub(3.0, &["jobs"]);
    assert_eq!(gauge_value(&p, "queue_depth", &[("queue", "jobs")]), 12.0);

    g.inc(&["jobs"]);
    g.dec(&["jobs"]);
    g.dec(&["jobs"]);
    assert_eq!(gauge_value(&p, "queue_depth", &[("queue", "jobs")]), 11.0);

    g.set(-4.5, &["mail"]);
    assert_eq!(gauge_value(&p, "queue_depth", &[("queue", "mail")]), -4.5);
}

#[test]
fn histogram_timer_records_elapsed_seconds() {
    let p = bare_provider();
    let h = p
        .histogram(
            "request_duration_seconds",
            &MetricOptions::new().labels(["route"]),
        )
        .unwrap();

    let timer = h.timer(&["/users"]);
    thread::sleep(Duration::from_millis(20));
    let elapsed = timer.stop();
    assert!(elapsed >= Duration::from_millis(20), "elapsed={elapsed:?}");

    let m = find_series(&p, "request_duration_seconds", &[("route", "/users")]).unwrap();
    let hist = m.get_histogram();
    assert_eq!(hist.get_sample_count(), 1);
    assert!(hist.get_sample_sum() >= 0.02);
    // default buckets
    assert_eq!(hist.get_bucket().len(), 9);
}

#[test]
fn histogram_custom_buckets() {
    let p = bare_provider();
    let h = p
        .histogram(
            "payload_bytes",
            &MetricOptions::new().buckets(vec![100.0, 1_000.0, 10_000.0]),
        )
        .unwrap();
    h.observe(50.0, &[]);
    h.observe(5_000.0, &[]);

    let m = find_series(&p, "payload_bytes", &[]).unwrap();
    let buckets = m.get_histogram().get_bucket();
    assert_eq!(buckets.len(), 3);
    assert_eq!(buckets[0].get_cumulative_count(), 1);
    assert_eq!(buckets[1].get_cumulative_count(), 1);
    assert_eq!(buckets[2].get_cumulative_count(), 2);
}

#[test]
fn summary_renders_quantiles() {
    let p = bare_provider();
    let s = p
        .summary(
            "rpc_seconds",
            &MetricOptions::new()
                .labels(["service"])
                .objectives(vec![Objective::new(0.5, 0.05)]),
        )
        .unwrap();
    s.observe(0.5, &["auth"]);
    s.observe(1.5, &["auth"]);

    let m = find_series(&p, "rpc_seconds", &[("service", "auth")]).unwrap();
    let sum = m.get_summary();
    assert_eq!(sum.get_sample_count(), 2);
    assert_eq!(sum.get_sample_sum(), 2.0);
    assert_eq!(sum.get_quantile().len(), 1);
    assert_eq!(sum.get_quantile()[0].get_value(), 0.5);

    let text = render(&p);
    assert!(text.contains("# TYPE rpc_seconds summary"), "{text}");
    assert!(text.contains(r#"rpc_seconds_count{service="auth"} 2"#), "{text}");
    assert!(text.contains(r#"quantile="0.5""#), "{text}");
}

#[test]
fn same_identity_returns_same_instance() {
    let p = bare_provider();
    let a = p
        .counter("events_total", &MetricOptions::new().help("first"))
        .unwrap();
    let b = p
        .counter("events_total", &MetricOptions::new().help("second"))
        .unwrap();
    assert!(same(&a, &b));

    let g1 = p.gauge("temperature", &MetricOptions::new()).unwrap();
    let g2 = p.gauge("temperature", &MetricOptions::new()).unwrap();
    assert!(same(&g1, &g2));

    a.inc(&[]);
    b.inc(&[]);
    assert_eq!(counter_value(&p, "events_total", &[]), 2.0);
}

#[test]
fn namespace_override_is_a_distinct_identity() {
    let p = bare_provider();
    let plain = p.counter("hits_total", &MetricOptions::new()).unwrap();
    let scoped = p
        .counter("hits_total", &MetricOptions::new().namespace("cache"))
        .unwrap();
    assert!(!same(&plain, &scoped));

    plain.inc(&[]);
    scoped.add(2.0, &[]);
    assert_eq!(counter_value(&p, "hits_total", &[]), 1.0);
    assert_eq!(counter_value(&p, "cache_hits_total", &[]), 2.0);
}

#[test]
fn provider_defaults_prefix_names() {
    let p = PrometheusProvider::new(PrometheusConfig {
        namespace: "myapp".into(),
        subsystem: "http".into(),
        ..bare_config()
    })
    .unwrap();

    let c = p.counter("requests_total", &MetricOptions::new()).unwrap();
    c.inc(&[]);
    let g = p
        .gauge("workers", &MetricOptions::new().subsystem("pool"))
        .unwrap();
    g.set(3.0, &[]);

    let text = render(&p);
    assert!(text.contains("myapp_http_requests_total 1"), "{text}");
    assert!(text.contains("myapp_pool_workers 3"), "{text}");
}

#[test]
fn empty_help_falls_back_to_name() {
    let p = bare_provider();
    let c = p.counter("undocumented_total", &MetricOptions::new()).unwrap();
    c.inc(&[]);
    let text = render(&p);
    assert!(text.contains("# HELP undocumented_total undocumented_total"), "{text}");
}

#[test]
fn invalid_declarations_are_registration_errors() {
    let p = bare_provider();

    let err = p.counter("bad-name", &MetricOptions::new()).err().unwrap();
    assert_eq!(err.kind().as_str(), "REGISTRATION");

    let err = p
        .histogram("latency", &MetricOptions::new().buckets(vec![1.0, 0.5]))
        .err()
        .unwrap();
    assert_eq!(err.kind().as_str(), "REGISTRATION");

    let err = p
        .summary("rpc", &MetricOptions::new().labels(["quantile"]))
        .err()
        .unwrap();
    assert_eq!(err.kind().as_str(), "REGISTRATION");
}

#[test]
fn cross_kind_name_collision_is_rejected() {
    let p = bare_provider();
    p.counter("shared_name", &MetricOptions::new()).unwrap();
    let err = p.gauge("shared_name", &MetricOptions::new()).err().unwrap();
    assert_eq!(err.kind().as_str(), "REGISTRATION");

    // the failed declaration is not cached
    assert!(p.gauge("shared_name", &MetricOptions::new()).is_err());
}

#[test]
fn wrong_label_arity_is_dropped() {
    let p = bare_provider();
    let c = p
        .counter("api_calls_total", &MetricOptions::new().labels(["method", "code"]))
        .unwrap();

    let ((), logs) = capture_logs(|| {
        c.inc(&["GET"]);
        c.inc(&["GET", "200", "extra"]);
    });
    assert!(logs.contains("dropping observation"), "{logs}");
    assert!(find_series(&p, "api_calls_total", &[("method", "GET")]).is_none());

    c.inc(&["GET", "200"]);
    assert_eq!(
        counter_value(&p, "api_calls_total", &[("method", "GET"), ("code", "200")]),
        1.0
    );
}

#[test]
fn redeclare_with_other_labels_warns_and_keeps_first() {
    let p = bare_provider();
    let first = p
        .counter("logins_total", &MetricOptions::new().labels(["realm"]))
        .unwrap();

    let (second, logs) = capture_logs(|| {
        p.counter("logins_total", &MetricOptions::new().labels(["user"]))
            .unwrap()
    });
    assert!(same(&first, &second));
    assert!(logs.contains("redeclared"), "{logs}");
}

#[test]
fn concurrent_declaration_yields_one_instance() {
    let p = Arc::new(bare_provider());

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let p = Arc::clone(&p);
            thread::spawn(move || {
                let c = p
                    .counter("concurrent_total", &MetricOptions::new())
                    .unwrap();
                c.inc(&[]);
                c
            })
        })
        .collect();
    let counters: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    for c in &counters[1..] {
        assert!(same(&counters[0], c));
    }
    assert_eq!(counter_value(&p, "concurrent_total", &[]), 16.0);
}

#[test]
fn facade_over_prometheus() {
    let p = Arc::new(bare_provider());
    let metrics = Metrics::new(p.clone());

    let c = metrics
        .counter("orders_total", MetricOptions::new().labels(["status"]))
        .unwrap();
    c.inc(&["paid"]);
    assert_eq!(counter_value(&p, "orders_total", &[("status", "paid")]), 1.0);
}

#[test]
fn default_collectors_are_exposed() {
    let p = PrometheusProvider::new(PrometheusConfig::default()).unwrap();
    let text = render(&p);
    assert!(text.contains("tokio_runtime_workers"), "{text}");
    #[cfg(target_os = "linux")]
    assert!(text.contains("process_cpu_seconds_total"), "{text}");
}

#[test]
fn exposition_content_type_is_text_format() {
    let p = bare_provider();
    let exposition = p.exposition().unwrap();
    assert!(exposition.content_type().starts_with("text/plain"));
}

#[test]
fn redeclare_with_other_buckets_or_objectives_warns() {
    let p = bare_provider();
    let first = p
        .histogram("upload_seconds", &MetricOptions::new().buckets(vec![1.0, 2.0]))
        .unwrap();
    let (second, logs) = capture_logs(|| {
        p.histogram("upload_seconds", &MetricOptions::new().buckets(vec![1.0, 5.0]))
            .unwrap()
    });
    assert!(same(&first, &second));
    assert!(logs.contains("redeclared"), "{logs}");
    assert!(logs.contains("buckets"), "{logs}");

    p.summary("rpc_latency", &MetricOptions::new()).unwrap();
    let (_, logs) = capture_logs(|| {
        p.summary(
            "rpc_latency",
            &MetricOptions::new().objectives(vec![Objective::new(0.75, 0.01)]),
        )
        .unwrap()
    });
    assert!(logs.contains("objectives"), "{logs}");
}

#[test]
fn identical_redeclare_is_silent() {
    let p = bare_provider();
    let opts = MetricOptions::new().help("bytes sent").labels(["peer"]);
    p.histogram("sent_bytes", &opts).unwrap();

    let (_, logs) = capture_logs(|| {
        p.histogram("sent_bytes", &opts).unwrap();
        // empty help is a plain lookup, not a redefinition
        p.histogram("sent_bytes", &MetricOptions::new().labels(["peer"]))
            .unwrap();
    });
    assert!(!logs.contains("redeclared"), "{logs}");
}
