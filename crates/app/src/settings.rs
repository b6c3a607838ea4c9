use config::{Config, ConfigError, Environment, File};
use vixwatch_core::config::AppConfig;

/// 默认配置文件，在工作目录下查找。
const DEFAULT_FILE: &str = "vixwatch";
const ENV_PREFIX: &str = "VIXWATCH";

/// # Summary
/// 加载应用配置。
///
/// # Logic
/// 1. 以内置默认值为起点。
/// 2. 叠加配置文件（未指定 `path` 时为 `vixwatch.toml`）；
///    默认文件缺失可忽略，显式指定的文件缺失则报错。
/// 3. 叠加 `VIXWATCH__SECTION__KEY` 环境变量，
///    例如 `VIXWATCH__MONITOR__SYMBOLS="AAPL,NVDA"`。
///
/// # Arguments
/// * `path`: 可选的显式配置文件。
///
/// # Returns
/// 合并后的配置；校验在构建监控器时进行。
pub fn load(path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let file = match path {
        Some(p) => File::with_name(p).required(true),
        None => File::with_name(DEFAULT_FILE).required(false),
    };
    Config::builder()
        .add_source(file)
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?
        .try_deserialize()
}

/// 在默认值之上解析一段 TOML 文本。
#[cfg(test)]
fn from_toml(text: &str) -> Result<AppConfig, ConfigError> {
    Config::builder()
        .add_source(File::from_str(text, config::FileFormat::Toml))
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vixwatch_core::common::TimeFrame;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = from_toml(
            r#"
            [monitor]
            symbols = "aapl, msft"
            interval = "5m"
            ema_fast_period = 12

            [monitor.thresholds]
            volume_spike_ratio = 2.0
            "#,
        )
        .unwrap();

        let symbols: Vec<String> = config.monitor.tickers().into_iter().map(|t| t.symbol).collect();
        assert_eq!(symbols, vec!["AAPL", "MSFT"]);
        assert_eq!(config.monitor.interval, TimeFrame::Minute5);
        assert_eq!(config.monitor.ema_fast_period, 12);
        assert_eq!(config.monitor.ema_slow_period, 21);
        assert_eq!(config.monitor.thresholds.volume_spike_ratio, 2.0);
        assert_eq!(config.monitor.thresholds.rsi_overbought, 70.0);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_symbol_list_form() {
        let config = from_toml(
            r#"
            [monitor]
            symbols = ["QQQ", "SPY"]
            "#,
        )
        .unwrap();
        assert_eq!(config.monitor.symbols, vec!["QQQ", "SPY"]);
    }

    #[test]
    fn test_bad_interval_is_rejected() {
        let result = from_toml(
            r#"
            [monitor]
            interval = "3m"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        assert!(load(Some("/nonexistent/vixwatch-config")).is_err());
    }
}
