use crate::common::{Ticker, TimeFrame};
use crate::signal::error::SignalError;
use serde::{Deserialize, Deserializer, Serialize};

/// 全局应用配置。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub monitor: MonitorConfig,
    pub log: LogConfig,
}

/// # Summary
/// 监控器在各周期内不可变的配置。
///
/// # Invariants
/// - 通过 `validate` 后满足 `ema_slow_period > ema_fast_period >= 1`。
/// - 至少包含一个非空代码。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    // 接受列表或逗号分隔的字符串 ("AAPL, NVDA")
    #[serde(deserialize_with = "deserialize_symbols")]
    pub symbols: Vec<String>,
    pub interval: TimeFrame,
    pub ema_fast_period: usize,
    pub ema_slow_period: usize,
    pub rsi_period: usize,
    pub volume_window: usize,
    pub volatility_symbol: String,
    pub volatility_interval: TimeFrame,
    pub refresh_secs: u64,
    pub fetch_timeout_secs: u64,
    pub cycle_timeout_secs: u64,
    pub thresholds: SignalThresholds,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            symbols: ["AAPL", "NVDA", "TSLA", "QQQ"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            interval: TimeFrame::Minute1,
            ema_fast_period: 9,
            ema_slow_period: 21,
            rsi_period: 14,
            volume_window: 10,
            volatility_symbol: "^VIX".to_string(),
            volatility_interval: TimeFrame::Minute2,
            refresh_secs: 60,
            fetch_timeout_secs: 10,
            cycle_timeout_secs: 45,
            thresholds: SignalThresholds::default(),
        }
    }
}

impl MonitorConfig {
    /// # Summary
    /// 配置的代码，已去除空白、转为大写并剔除空项。
    ///
    /// # Returns
    /// 按配置顺序返回，保留重复项。
    pub fn tickers(&self) -> Vec<Ticker> {
        self.symbols.iter().filter_map(|s| Ticker::parse(s)).collect()
    }

    pub fn volatility_ticker(&self) -> Option<Ticker> {
        Ticker::parse(&self.volatility_symbol)
    }

    /// # Summary
    /// 拒绝无法运行任何周期的配置。
    ///
    /// # Logic
    /// 1. 指标周期必须非零，且慢速 > 快速。
    /// 2. 代码列表至少包含一个可用代码。
    /// 3. 时间参数必须非零。
    ///
    /// # Returns
    /// `SignalError::InvalidConfig`，指出第一个不合法的字段。
    pub fn validate(&self) -> Result<(), SignalError> {
        if self.ema_fast_period == 0 {
            return Err(SignalError::InvalidConfig(
                "ema_fast_period must be at least 1".into(),
            ));
        }
        if self.ema_slow_period <= self.ema_fast_period {
            return Err(SignalError::InvalidConfig(format!(
                "ema_slow_period ({}) must be greater than ema_fast_period ({})",
                self.ema_slow_period, self.ema_fast_period
            )));
        }
        if self.rsi_period == 0 || self.volume_window == 0 {
            return Err(SignalError::InvalidConfig(
                "rsi_period and volume_window must be at least 1".into(),
            ));
        }
        if self.tickers().is_empty() {
            return Err(SignalError::InvalidConfig("symbol list is empty".into()));
        }
        if self.volatility_ticker().is_none() {
            return Err(SignalError::InvalidConfig(
                "volatility_symbol is empty".into(),
            ));
        }
        if self.refresh_secs == 0 || self.fetch_timeout_secs == 0 || self.cycle_timeout_secs == 0
        {
            return Err(SignalError::InvalidConfig(
                "refresh and timeout periods must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// # Summary
/// 分级常量，所有标的使用同一套规则。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalThresholds {
    // 最新成交量 / 成交量均线超过此值即为放量
    pub volume_spike_ratio: f64,
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    // R1 / S1 附近的相对区间
    pub proximity_band: f64,
    // VIX 变化 (%) 超过此值时金叉升级为 Error
    pub rising_risk_delta_pct: f64,
    pub vix_high_level: f64,
    pub vix_medium_level: f64,
    // VIX 变化 (%) 超过此值时强制 High 风险并显示市场横幅
    pub vix_spike_delta_pct: f64,
    // 摘要附加说明的阈值
    pub vix_surge_delta_pct: f64,
    pub vix_easing_delta_pct: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            volume_spike_ratio: 1.8,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            proximity_band: 0.005,
            rising_risk_delta_pct: 1.0,
            vix_high_level: 30.0,
            vix_medium_level: 20.0,
            vix_spike_delta_pct: 5.0,
            vix_surge_delta_pct: 3.0,
            vix_easing_delta_pct: -2.0,
        }
    }
}

/// 日志输出设置。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    // 未设置 RUST_LOG 时的默认过滤级别
    pub level: String,
    // 按天滚动日志文件的目录；未设置时仅输出到控制台
    pub dir: Option<String>,
    pub file_prefix: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: Some("logs".to_string()),
            file_prefix: "vixwatch.log".to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSymbols {
    List(Vec<String>),
    Csv(String),
}

fn deserialize_symbols<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let symbols = match RawSymbols::deserialize(deserializer)? {
        RawSymbols::List(list) => list,
        RawSymbols::Csv(csv) => csv.split(',').map(|s| s.to_string()).collect(),
    };
    Ok(symbols)
}
