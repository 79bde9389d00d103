use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;

/// Rolling daily file subscriber for binaries embedding the engine. Keep the
/// returned guard alive for the life of the process.
pub fn init_rolling(dir: &str) -> WorkerGuard {
    let file_appender = rolling::daily(dir, "app.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .pretty()
        .init();

    guard
}

/// Captured-output subscriber for tests; safe to call repeatedly.
pub fn init_for_tests() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
