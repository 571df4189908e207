use chart_axis::telemetry::{init_default_tracing, init_tracing_with_filter};

#[test]
fn tracing_is_installed_at_most_once() {
    let _ = init_tracing_with_filter("chart_axis=trace");
    assert!(!init_default_tracing());
}
