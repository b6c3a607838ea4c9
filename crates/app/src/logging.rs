use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};
use vixwatch_core::config::LogConfig;

/// # Summary
/// 安装全局 tracing 订阅器。
///
/// # Logic
/// 1. 优先使用 `RUST_LOG`，否则使用 `LogConfig::level`。
/// 2. 控制台日志写入 stderr，stdout 留给看板。
/// 3. 设置了 `LogConfig::dir` 时，额外写入按天滚动的日志文件。
///
/// # Returns
/// 文件写入守卫，需在进程记录日志期间一直存活。
pub fn init(config: &LogConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));
    let console = fmt::layer().with_target(true).with_writer(std::io::stderr);

    match &config.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, &config.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file = fmt::layer().with_ansi(false).with_writer(writer);
            tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .with(file)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .init();
            None
        }
    }
}
