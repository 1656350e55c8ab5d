use env_logger::Env;

/// Initializes the process wide logger.
///
/// Defaults to info level, overridable through RUST_LOG.
pub fn setup_logging() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}
