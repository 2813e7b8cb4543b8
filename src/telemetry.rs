use once_cell::sync::OnceCell;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;

use crate::config::Config;

static INSTALLED: OnceCell<()> = OnceCell::new();

/// Install the global tracing subscriber. Logs to stderr, or to a daily
/// rolling file when `Config::log_dir` is set. Only the first call installs
/// anything; later calls are no-ops. Keep the returned guard alive for the
/// lifetime of the process when file logging is enabled, or buffered lines
/// are lost on exit.
pub fn init(config: &Config) -> Option<WorkerGuard> {
    let mut guard = None;

    INSTALLED.get_or_init(|| match &config.log_dir {
        Some(dir) => {
            let file_appender = rolling::daily(dir, "leaveflow.log");
            let (non_blocking, g) = tracing_appender::non_blocking(file_appender);

            tracing_subscriber::fmt()
                .with_writer(non_blocking)
                .with_max_level(tracing::Level::DEBUG)
                .with_ansi(false)
                .with_target(false)
                .with_level(true)
                .init();

            guard = Some(g);
        }
        None => {
            tracing_subscriber::fmt()
                .with_max_level(tracing::Level::DEBUG)
                .with_target(false)
                .with_level(true)
                .init();
        }
    });

    guard
}
