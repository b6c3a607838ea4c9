use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// # Summary
/// 由波动率指数得出的市场整体风险等级。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLabel {
    Low,
    Medium,
    High,
    // 本周期波动率 K 线不足两根
    Unknown,
}

/// # Summary
/// `VolatilityContext::delta_pct` 的单位，随报告一起传递，
/// 渲染端无需猜测。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeltaUnit {
    Percent,
}

/// # Summary
/// 本周期所有标的只读共享的波动率指数快照。
///
/// # Invariants
/// - `delta_pct` 为相邻 K 线的百分比变化。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolatilityContext {
    pub level: f64,
    pub delta_pct: f64,
    pub risk: RiskLabel,
}

impl VolatilityContext {
    /// 无法读取指数时报告的水平。
    pub const DEFAULT_LEVEL: f64 = 20.0;

    /// 指数 K 线不足两根时使用的默认值。
    pub fn unknown() -> Self {
        Self {
            level: Self::DEFAULT_LEVEL,
            delta_pct: 0.0,
            risk: RiskLabel::Unknown,
        }
    }
}

impl Default for VolatilityContext {
    fn default() -> Self {
        Self::unknown()
    }
}

/// # Summary
/// 基于当前时段窗口的经典枢轴位。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PivotLevels {
    pub pivot: f64,
    pub resistance1: f64,
    pub support1: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Bullish,
    // 也包括 fast == slow
    Bearish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Crossover {
    None,
    Golden,
    Death,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Proximity {
    None,
    NearResistance,
    NearSupport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RsiExtreme {
    None,
    Overbought,
    Oversold,
}

/// # Summary
/// 标的的综合告警级别，有序，`max` 取最严重者。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AlertLevel {
    Info,
    Warning,
    Error,
}

/// # Summary
/// 决定记录 `alert_level` 的优先级规则。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertReason {
    DeathCross,
    GoldenCrossRisingRisk,
    GoldenCross,
    RsiOverbought,
    RsiOversold,
    NearResistance,
    NearSupport,
    VolumeSpike,
    Stable,
}

/// # Summary
/// 单个标的在一次刷新周期内得出的全部结果。
///
/// # Invariants
/// - 每个周期重新计算，不原地更新。
/// - `rsi` 存在时位于 `[0, 100]`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    pub symbol: String,
    pub trend: Trend,
    pub crossover: Crossover,
    pub proximity: Proximity,
    pub rsi_extreme: RsiExtreme,
    pub volume_spike: bool,
    pub alert_level: AlertLevel,
    pub reason: AlertReason,
    // 看板上的单行摘要
    pub headline: String,
    pub price: f64,
    // 最新收盘价减前一收盘价
    pub price_change: f64,
    pub price_change_pct: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub rsi: Option<f64>,
    pub volume_ratio: Option<f64>,
    pub pivots: PivotLevels,
}

/// # Summary
/// 单个配置标的的结果。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SymbolReport {
    Signal(SignalRecord),
    // 收到部分 K 线，不足以计算慢速 EMA / RSI / 成交量窗口
    InsufficientData { bars: usize, required: usize },
    // 本周期未收到任何数据
    NoData,
}

impl SymbolReport {
    pub fn signal(&self) -> Option<&SignalRecord> {
        match self {
            SymbolReport::Signal(record) => Some(record),
            _ => None,
        }
    }

    pub fn alert_level(&self) -> Option<AlertLevel> {
        self.signal().map(|r| r.alert_level)
    }

    /// 显示为 "waiting for data"，而非故障。
    pub fn is_waiting(&self) -> bool {
        !matches!(self, SymbolReport::Signal(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub symbol: String,
    pub status: SymbolReport,
}

/// # Summary
/// 报告中各级别的计数，用于周期日志。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertCounts {
    pub info: usize,
    pub warning: usize,
    pub error: usize,
    pub waiting: usize,
}

/// # Summary
/// 一次刷新周期的结果，渲染器只读使用。
///
/// # Invariants
/// - `entries` 按配置顺序排列，每个标的一项。
/// - 归单个周期所有，下个周期重新构建。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub entries: Vec<ReportEntry>,
    pub volatility: VolatilityContext,
    pub delta_unit: DeltaUnit,
    // 波动率指数飙升，在所有标的上方显示横幅
    pub market_alert: bool,
    // 参与本报告的最新 K 线时间
    pub as_of: Option<DateTime<Utc>>,
}

impl Report {
    pub fn get(&self, symbol: &str) -> Option<&SymbolReport> {
        self.entries
            .iter()
            .find(|e| e.symbol == symbol)
            .map(|e| &e.status)
    }

    pub fn counts(&self) -> AlertCounts {
        let mut counts = AlertCounts::default();
        for entry in &self.entries {
            match entry.status.alert_level() {
                Some(AlertLevel::Info) => counts.info += 1,
                Some(AlertLevel::Warning) => counts.warning += 1,
                Some(AlertLevel::Error) => counts.error += 1,
                None => counts.waiting += 1,
            }
        }
        counts
    }

    /// 存在信号时返回其中最严重的告警级别。
    pub fn highest_alert(&self) -> Option<AlertLevel> {
        self.entries
            .iter()
            .filter_map(|e| e.status.alert_level())
            .max()
    }
}
