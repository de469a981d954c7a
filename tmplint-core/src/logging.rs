//! Structured logging using **tracing**.
//!
//! Library code only emits events (`tracing::debug!` and friends); installing
//! a subscriber is left to the binary.

/// Initializes the global tracing subscriber.
///
/// Call once at the beginning of the application's runtime. Events are
/// written as JSON to stderr so stdout stays clean for the report.
///
/// # Environment Variables
/// - `RUST_LOG`: Controls log filtering (e.g., `RUST_LOG=tmplint_core=debug`)
pub fn init_structured_logging() {
    tracing_subscriber::fmt()
        .json()
        .with_ansi(false)
        .with_level(true)
        .with_target(true)
        .with_current_span(true)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}
