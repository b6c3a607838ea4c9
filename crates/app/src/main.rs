mod logging;
mod render;
mod settings;

use std::sync::Arc;
use std::time::Duration;

use render::ConsoleRenderer;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};
use vixwatch_core::signal::port::ReportRenderer;
use vixwatch_feed::yahoo::YahooProvider;
use vixwatch_signal::cycle::Monitor;

/// # Summary
/// 应用启动入口：装配 Yahoo 适配器、监控器与控制台看板，
/// 随后按固定周期刷新，直到收到 Ctrl-C。
///
/// # Logic
/// 1. 加载配置（第一个参数可指定路径）。
/// 2. 初始化日志。
/// 3. 构建适配器与监控器；配置非法时在此退出。
/// 4. 每次定时触发执行一个周期并渲染。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 加载配置
    let path = std::env::args().nth(1);
    let config = settings::load(path.as_deref())?;

    // 2. 初始化日志
    let _log_guard = logging::init(&config.log);
    info!("VixWatch starting...");

    // 3. 实例化组件
    let source = Arc::new(YahooProvider::new()?);
    let monitor = match Monitor::new(source, config.monitor.clone()) {
        Ok(m) => m,
        Err(e) => {
            error!(error = %e, "Refusing to start");
            return Err(e.into());
        }
    };
    let renderer = ConsoleRenderer::new(config.monitor.ema_fast_period, config.monitor.ema_slow_period);
    let symbols: Vec<String> = monitor.config().tickers().into_iter().map(|t| t.symbol).collect();
    info!(
        symbols = ?symbols,
        interval = %monitor.config().interval,
        refresh_secs = monitor.config().refresh_secs,
        "Monitor ready"
    );

    // 4. 刷新循环
    let mut ticker = tokio::time::interval(Duration::from_secs(monitor.config().refresh_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let report = monitor.run_cycle().await;
                renderer.render(&report);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received. Exiting...");
                break;
            }
        }
    }

    Ok(())
}
