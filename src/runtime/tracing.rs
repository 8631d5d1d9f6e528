/// Initializes the tracing/logging infrastructure for the application.
///
/// Log verbosity comes from `RUST_LOG`:
/// - `RUST_LOG=info` - Editor lifecycle, loads, saves and deletes
/// - `RUST_LOG=debug` - Every intent, with draft payloads
/// - `RUST_LOG=resource_console::gateway=debug` - Only the HTTP requests
///
/// Output goes to stderr so the CLI can print views on stdout.
///
/// # Example
///
/// ```ignore
/// setup_tracing();
/// tracing::info!("Console started");
/// ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
