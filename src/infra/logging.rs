pub fn init() {
    // Initialize tracing subscriber once, honoring RUST_LOG if set.
    // Default to info level; allow override via RUST_LOG (e.g., "debug").
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Log a metric line and record it with the `metrics` facade. Without an
/// installed recorder the facade call is a no-op.
pub fn log_metric(operation: &str, metric: &str, value: f64) {
    tracing::info!(operation = operation, metric = metric, value = value, "metric");
    metrics::histogram!(metric.to_string(), "operation" => operation.to_string()).record(value);
}
