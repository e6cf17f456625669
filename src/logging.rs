use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize logging for binaries.
///
/// Defaults to `info` level unless overridden by `VERBATIM_LOG`, so
/// recoverable pipeline failures (failed save, failed report format) are
/// visible to the user by default.
pub fn init() {
    let filter = EnvFilter::builder()
        .with_env_var("VERBATIM_LOG")
        .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
        .from_env_lossy();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init();
        init();
    }
}
