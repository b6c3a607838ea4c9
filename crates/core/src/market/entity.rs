use crate::common::TimeFrame;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// # Summary
/// 单根 OHLCV K 线。
///
/// # Invariants
/// - 由数据适配器生成后不可变。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    // K 线开始时间
    pub time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// # Summary
    /// 检查该 K 线能否参与指标计算。
    ///
    /// # Logic
    /// 1. 所有价格必须为有限正数。
    /// 2. 满足 `low <= open, close <= high`。
    /// 3. 成交量必须为有限非负数。
    fn is_well_formed(&self) -> bool {
        let prices_ok = [self.open, self.high, self.low, self.close]
            .iter()
            .all(|p| p.is_finite() && *p > 0.0);
        let range_ok = [self.open, self.close]
            .iter()
            .all(|p| self.low <= *p && *p <= self.high);
        prices_ok && range_ok && self.volume.is_finite() && self.volume >= 0.0
    }
}

/// # Summary
/// 单个标的在某周期下当前时段的 K 线序列。
///
/// # Invariants
/// - 时间戳严格递增。
/// - 每根 K 线都通过 `Bar::is_well_formed`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    symbol: String,
    interval: TimeFrame,
    bars: Vec<Bar>,
}

impl BarSeries {
    /// # Summary
    /// 由适配器原始输出构建序列，剔除会破坏不变量的数据，
    /// 而不是直接失败。
    ///
    /// # Logic
    /// 1. 跳过异常 K 线（NaN 价格、负成交量等）。
    /// 2. 跳过时间不晚于上一根已保留 K 线的数据。
    ///
    /// # Arguments
    /// * `symbol`: K 线所属代码。
    /// * `interval`: K 线周期。
    /// * `raw`: 适配器给出的原始顺序 K 线。
    ///
    /// # Returns
    /// 清洗后的序列，可能为空。
    pub fn new(symbol: impl Into<String>, interval: TimeFrame, raw: Vec<Bar>) -> Self {
        let symbol = symbol.into();
        let total = raw.len();
        let mut bars: Vec<Bar> = Vec::with_capacity(total);
        for bar in raw {
            if !bar.is_well_formed() {
                continue;
            }
            if bars.last().is_some_and(|prev| bar.time <= prev.time) {
                continue;
            }
            bars.push(bar);
        }
        if bars.len() < total {
            debug!(
                symbol = %symbol,
                dropped = total - bars.len(),
                kept = bars.len(),
                "Dropped malformed or out-of-order bars"
            );
        }
        Self {
            symbol,
            interval,
            bars,
        }
    }

    pub fn empty(symbol: impl Into<String>, interval: TimeFrame) -> Self {
        Self {
            symbol: symbol.into(),
            interval,
            bars: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn interval(&self) -> TimeFrame {
        self.interval
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// 按时间排列的收盘价。
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// 按时间排列的成交量。
    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bar(minute: u32, close: f64, volume: f64) -> Bar {
        Bar {
            time: Utc.with_ymd_and_hms(2024, 3, 4, 14, minute, 0).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume,
        }
    }

    #[test]
    fn test_series_drops_malformed_bars() {
        let raw = vec![
            bar(30, 100.0, 1000.0),
            bar(31, f64::NAN, 1000.0),
            bar(32, 101.0, -5.0),
            bar(33, 102.0, f64::NAN),
            bar(34, 103.0, 0.0),
        ];
        let series = BarSeries::new("AAPL", TimeFrame::Minute1, raw);
        assert_eq!(series.closes(), vec![100.0, 103.0]);
    }

    #[test]
    fn test_series_drops_bars_outside_their_range() {
        let inverted = Bar {
            high: 99.0,
            low: 101.0,
            ..bar(31, 100.0, 10.0)
        };
        let close_above_high = Bar {
            high: 100.0,
            close: 100.5,
            ..bar(32, 100.0, 10.0)
        };
        let open_below_low = Bar {
            low: 100.0,
            open: 99.5,
            ..bar(33, 100.0, 10.0)
        };
        let raw = vec![
            bar(30, 100.0, 10.0),
            inverted,
            close_above_high,
            open_below_low,
            bar(34, 101.0, 10.0),
        ];
        let series = BarSeries::new("AAPL", TimeFrame::Minute1, raw);
        assert_eq!(series.closes(), vec![100.0, 101.0]);
    }

    #[test]
    fn test_series_enforces_strictly_increasing_time() {
        let raw = vec![
            bar(30, 100.0, 10.0),
            bar(30, 100.5, 10.0),
            bar(29, 99.0, 10.0),
            bar(31, 101.0, 10.0),
        ];
        let series = BarSeries::new("AAPL", TimeFrame::Minute1, raw);
        assert_eq!(series.len(), 2);
        assert!(series.bars().windows(2).all(|w| w[0].time < w[1].time));
    }

    #[test]
    fn test_empty_series() {
        let series = BarSeries::empty("TSLA", TimeFrame::Minute5);
        assert!(series.is_empty());
        assert!(series.last().is_none());
        assert_eq!(series.symbol(), "TSLA");
        assert_eq!(series.interval(), TimeFrame::Minute5);
    }
}
