use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// # Summary
/// 被监控的标的，以交易所代码标识。
///
/// # Invariants
/// - `symbol` 已去除空白并转为大写（`AAPL`, `^VIX`）。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticker {
    pub symbol: String,
}

impl Ticker {
    /// # Summary
    /// 规范化用户输入的代码。
    ///
    /// # Returns
    /// 去除空白后为空时返回 `None`。
    pub fn parse(raw: &str) -> Option<Self> {
        let symbol = raw.trim().to_uppercase();
        if symbol.is_empty() {
            None
        } else {
            Some(Self { symbol })
        }
    }
}

impl std::fmt::Display for Ticker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.symbol)
    }
}

/// # Summary
/// 轮询日内数据时使用的 K 线周期。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub enum TimeFrame {
    // 1 分钟
    Minute1,
    // 2 分钟
    Minute2,
    // 5 分钟
    Minute5,
    // 15 分钟
    Minute15,
    // 1 小时
    Hour1,
    // 1 天
    Day1,
}

impl FromStr for TimeFrame {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1m" | "minute1" => Ok(TimeFrame::Minute1),
            "2m" | "minute2" => Ok(TimeFrame::Minute2),
            "5m" | "minute5" => Ok(TimeFrame::Minute5),
            "15m" | "minute15" => Ok(TimeFrame::Minute15),
            "1h" | "60m" | "hour1" => Ok(TimeFrame::Hour1),
            "1d" | "day1" => Ok(TimeFrame::Day1),
            _ => Err(format!("Unknown TimeFrame: {}", s)),
        }
    }
}

impl TryFrom<String> for TimeFrame {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeFrame> for String {
    fn from(value: TimeFrame) -> Self {
        value.to_string()
    }
}

impl std::fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeFrame::Minute1 => write!(f, "1m"),
            TimeFrame::Minute2 => write!(f, "2m"),
            TimeFrame::Minute5 => write!(f, "5m"),
            TimeFrame::Minute15 => write!(f, "15m"),
            TimeFrame::Hour1 => write!(f, "1h"),
            TimeFrame::Day1 => write!(f, "1d"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_normalisation() {
        assert_eq!(Ticker::parse("  nvda ").map(|t| t.symbol), Some("NVDA".into()));
        assert_eq!(Ticker::parse("^vix").map(|t| t.symbol), Some("^VIX".into()));
        assert!(Ticker::parse("   ").is_none());
    }

    #[test]
    fn test_timeframe_round_trip_through_text() {
        for tf in [
            TimeFrame::Minute1,
            TimeFrame::Minute2,
            TimeFrame::Minute5,
            TimeFrame::Minute15,
            TimeFrame::Hour1,
            TimeFrame::Day1,
        ] {
            assert_eq!(tf.to_string().parse::<TimeFrame>(), Ok(tf));
        }
        assert!("3m".parse::<TimeFrame>().is_err());
    }
}
