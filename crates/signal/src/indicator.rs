use vixwatch_core::config::MonitorConfig;
use vixwatch_core::market::entity::{Bar, BarSeries};
use vixwatch_core::signal::entity::PivotLevels;
use vixwatch_core::signal::error::SignalError;

/// # Summary
/// 指标集的回看周期。
///
/// # Invariants
/// - `ema_slow_period > ema_fast_period >= 1`（由 `MonitorConfig::validate` 保证）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorParams {
    pub ema_fast_period: usize,
    pub ema_slow_period: usize,
    pub rsi_period: usize,
    pub volume_window: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            ema_fast_period: 9,
            ema_slow_period: 21,
            rsi_period: 14,
            volume_window: 10,
        }
    }
}

impl From<&MonitorConfig> for IndicatorParams {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            ema_fast_period: config.ema_fast_period,
            ema_slow_period: config.ema_slow_period,
            rsi_period: config.rsi_period,
            volume_window: config.volume_window,
        }
    }
}

impl IndicatorParams {
    /// 最后两个对齐点有意义所需的最少 K 线数。
    pub fn min_bars(&self) -> usize {
        self.ema_slow_period
            .max(self.rsi_period)
            .max(self.volume_window)
            + 1
    }
}

/// 对任何实际周期都无损；超界时饱和而非截断。
fn period_f64(n: usize) -> f64 {
    u32::try_from(n).map(f64::from).unwrap_or(f64::from(u32::MAX))
}

/// # Summary
/// 以首个值为种子的指数移动平均。
///
/// # Logic
/// 1. `alpha = 2 / (period + 1)`.
/// 2. `ema[0] = values[0]`, `ema[t] = alpha * values[t] + (1 - alpha) * ema[t - 1]`.
///
/// # Returns
/// 每个输入对应一个值，空输入返回空。
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    let alpha = 2.0 / (period_f64(period) + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;
    for &value in values {
        let next = match prev {
            None => value,
            Some(p) => alpha * value + (1.0 - alpha) * p,
        };
        out.push(next);
        prev = Some(next);
    }
    out
}

/// # Summary
/// 使用简单平均（非平滑）的相对强弱指标。
///
/// # Logic
/// 1. 计算相邻收盘价差。
/// 2. 对每个 `i >= period`，累加以 `i` 结尾的 `period` 个差值中的
///    涨幅与跌幅。
/// 3. 窗口内无下跌时为 100；否则为 `100 - 100 / (1 + gain / loss)`。
///
/// # Returns
/// 每个收盘价一项；差值不足 `period` 个时为 `None`。
pub fn rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() <= period {
        return out;
    }
    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    for (start, window) in deltas.windows(period).enumerate() {
        let gain: f64 = window.iter().filter(|d| **d > 0.0).sum();
        let loss: f64 = -window.iter().filter(|d| **d < 0.0).sum::<f64>();
        // 两个均值除数相同，和之比即 RS
        let value = if loss == 0.0 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + gain / loss)
        };
        out[start + period] = Some(value.clamp(0.0, 100.0));
    }
    out
}

/// # Summary
/// 尾随窗口上的简单移动平均。
///
/// # Returns
/// 每个输入一项；窗口填满前为 `None`。
pub fn sma(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }
    let divisor = period_f64(window);
    for (start, slice) in values.windows(window).enumerate() {
        out[start + window - 1] = Some(slice.iter().sum::<f64>() / divisor);
    }
    out
}

/// # Summary
/// 窗口的枢轴点、第一阻力位与第一支撑位。
///
/// # Logic
/// 1. `H` / `L`：全部 K 线的最高价与最低价。
/// 2. `C`：最新一根 K 线的收盘价。
/// 3. `P = (H + L + C) / 3`, `R1 = 2P - L`, `S1 = 2P - H`.
///
/// # Returns
/// 空窗口返回 `None`。
pub fn pivot_levels(bars: &[Bar]) -> Option<PivotLevels> {
    let last = bars.last()?;
    let high = bars.iter().map(|b| b.high).fold(f64::MIN, f64::max);
    let low = bars.iter().map(|b| b.low).fold(f64::MAX, f64::min);
    let pivot = (high + low + last.close) / 3.0;
    Some(PivotLevels {
        pivot,
        resistance1: 2.0 * pivot - low,
        support1: 2.0 * pivot - high,
    })
}

/// # Summary
/// 与 `BarSeries` 一一对齐的指标列。
///
/// # Invariants
/// - 四列长度均等于序列长度。
/// - 不会由少于 `IndicatorParams::min_bars` 根 K 线构建。
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSet {
    pub ema_fast: Vec<f64>,
    pub ema_slow: Vec<f64>,
    pub rsi: Vec<Option<f64>>,
    pub volume_ma: Vec<Option<f64>>,
}

impl IndicatorSet {
    /// # Summary
    /// 为序列计算所有指标列。
    ///
    /// # Returns
    /// 序列短于 `params.min_bars()` 时返回
    /// `SignalError::InsufficientData`。
    pub fn compute(series: &BarSeries, params: &IndicatorParams) -> Result<Self, SignalError> {
        let required = params.min_bars();
        if series.len() < required {
            return Err(SignalError::InsufficientData {
                bars: series.len(),
                required,
            });
        }
        let closes = series.closes();
        Ok(Self {
            ema_fast: ema(&closes, params.ema_fast_period),
            ema_slow: ema(&closes, params.ema_slow_period),
            rsi: rsi(&closes, params.rsi_period),
            volume_ma: sma(&series.volumes(), params.volume_window),
        })
    }

    pub fn len(&self) -> usize {
        self.ema_fast.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ema_fast.is_empty()
    }
}

/// # Summary
/// 最后两个对齐的指标点及最新 K 线数据。
/// 即分类器所需的全部输入。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSnapshot {
    pub prev_fast: f64,
    pub prev_slow: f64,
    pub fast: f64,
    pub slow: f64,
    pub rsi: Option<f64>,
    pub volume: f64,
    pub volume_ma: Option<f64>,
    pub price: f64,
    pub prev_close: f64,
    pub pivots: PivotLevels,
}

impl IndicatorSnapshot {
    /// # Summary
    /// 计算指标集并保留最近两个点。
    ///
    /// # Logic
    /// 1. `IndicatorSet::compute`（长度不足时失败）。
    /// 2. 读取最后两组 EMA、最新 RSI 与成交量均线。
    /// 3. 由整个窗口计算枢轴位。
    pub fn from_series(series: &BarSeries, params: &IndicatorParams) -> Result<Self, SignalError> {
        let set = IndicatorSet::compute(series, params)?;
        let insufficient = || SignalError::InsufficientData {
            bars: series.len(),
            required: params.min_bars(),
        };
        let n = set.len();
        if n < 2 {
            return Err(insufficient());
        }
        let bars = series.bars();
        let (last, prev) = (&bars[n - 1], &bars[n - 2]);
        let pivots = pivot_levels(bars).ok_or_else(insufficient)?;
        Ok(Self {
            prev_fast: set.ema_fast[n - 2],
            prev_slow: set.ema_slow[n - 2],
            fast: set.ema_fast[n - 1],
            slow: set.ema_slow[n - 1],
            rsi: set.rsi[n - 1],
            volume: last.volume,
            volume_ma: set.volume_ma[n - 1],
            price: last.close,
            prev_close: prev.close,
            pivots,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use vixwatch_core::common::TimeFrame;

    fn series_from_closes(closes: &[f64]) -> BarSeries {
        let start = Utc.with_ymd_and_hms(2024, 3, 4, 14, 30, 0).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar {
                time: start + Duration::minutes(i64::try_from(i).unwrap()),
                open: c,
                high: c + 0.5,
                low: c - 0.5,
                close: c,
                volume: 1000.0,
            })
            .collect();
        BarSeries::new("TEST", TimeFrame::Minute1, bars)
    }

    #[test]
    fn test_ema_seeded_with_first_close() {
        let values = ema(&[10.0, 11.0, 12.0, 13.0], 3);
        // alpha = 0.5
        assert_eq!(values, vec![10.0, 10.5, 11.25, 12.125]);
    }

    #[test]
    fn test_ema_is_reproducible_bit_for_bit() {
        let closes: Vec<f64> = (0..50_i32).map(|i| 100.0 + (f64::from(i) * 0.37).sin()).collect();
        let a = ema(&closes, 9);
        let b = ema(&closes, 9);
        assert!(a.iter().zip(&b).all(|(x, y)| x.to_bits() == y.to_bits()));
    }

    #[test]
    fn test_rsi_without_losses_is_exactly_100() {
        let closes: Vec<f64> = (1..=20_i32).map(f64::from).collect();
        let values = rsi(&closes, 14);
        assert!(values[..14].iter().all(Option::is_none));
        assert!(values[14..].iter().all(|v| *v == Some(100.0)));
    }

    #[test]
    fn test_rsi_flat_prices_is_100() {
        let values = rsi(&[50.0; 16], 14);
        assert_eq!(values[15], Some(100.0));
    }

    #[test]
    fn test_rsi_without_gains_is_zero() {
        let closes: Vec<f64> = (1..=20_i32).map(|i| 40.0 - f64::from(i)).collect();
        let values = rsi(&closes, 14);
        assert_eq!(values[19], Some(0.0));
    }

    #[test]
    fn test_rsi_simple_average_value() {
        // 14 个差值：七个 +2、七个 -1 -> RS = 14 / 7 = 2 -> RSI = 66.67
        let mut closes = vec![100.0];
        for i in 0..14 {
            let last = closes[closes.len() - 1];
            closes.push(if i % 2 == 0 { last + 2.0 } else { last - 1.0 });
        }
        let value = rsi(&closes, 14)[14].unwrap();
        assert!((value - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_rsi_stays_in_range() {
        let closes: Vec<f64> = (0..80_i32)
            .map(|i| 100.0 + (f64::from(i) * 0.9).sin() * 5.0 + (f64::from(i) * 0.13).cos())
            .collect();
        for value in rsi(&closes, 14).into_iter().flatten() {
            assert!((0.0..=100.0).contains(&value));
        }
    }

    #[test]
    fn test_sma_undefined_until_window_filled() {
        let values = sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(values, vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
        assert_eq!(sma(&[1.0, 2.0], 3), vec![None, None]);
    }

    #[test]
    fn test_pivot_levels() {
        let series = series_from_closes(&[100.0, 104.0, 102.0]);
        let levels = pivot_levels(series.bars()).unwrap();
        // H = 104.5, L = 99.5, C = 102 -> P = 102
        assert!((levels.pivot - 102.0).abs() < 1e-9);
        assert!((levels.resistance1 - 104.5).abs() < 1e-9);
        assert!((levels.support1 - 99.5).abs() < 1e-9);
        assert!(pivot_levels(&[]).is_none());
    }

    #[test]
    fn test_min_bars() {
        assert_eq!(IndicatorParams::default().min_bars(), 22);
        let params = IndicatorParams {
            ema_fast_period: 5,
            ema_slow_period: 8,
            rsi_period: 14,
            volume_window: 10,
        };
        assert_eq!(params.min_bars(), 15);
    }

    #[test]
    fn test_short_series_is_insufficient_for_every_length() {
        let params = IndicatorParams::default();
        for len in 0..params.min_bars() {
            let closes: Vec<f64> = (0..len).map(|i| 100.0 + period_f64(i)).collect();
            let series = series_from_closes(&closes);
            assert_eq!(
                IndicatorSet::compute(&series, &params),
                Err(SignalError::InsufficientData {
                    bars: len,
                    required: 22
                })
            );
            assert!(IndicatorSnapshot::from_series(&series, &params).is_err());
        }
    }

    #[test]
    fn test_indicator_columns_are_aligned() {
        let closes: Vec<f64> = (0..30_i32).map(|i| 100.0 + f64::from(i) * 0.1).collect();
        let series = series_from_closes(&closes);
        let set = IndicatorSet::compute(&series, &IndicatorParams::default()).unwrap();
        assert_eq!(set.len(), 30);
        assert_eq!(set.ema_slow.len(), 30);
        assert_eq!(set.rsi.len(), 30);
        assert_eq!(set.volume_ma.len(), 30);
        assert!(set.volume_ma[8].is_none());
        assert_eq!(set.volume_ma[9], Some(1000.0));
    }

    #[test]
    fn test_snapshot_reads_last_two_points() {
        let closes: Vec<f64> = (0..25_i32).map(|i| 100.0 + f64::from(i)).collect();
        let series = series_from_closes(&closes);
        let params = IndicatorParams::default();
        let set = IndicatorSet::compute(&series, &params).unwrap();
        let snap = IndicatorSnapshot::from_series(&series, &params).unwrap();
        assert_eq!(snap.fast, set.ema_fast[24]);
        assert_eq!(snap.prev_slow, set.ema_slow[23]);
        assert_eq!(snap.price, 124.0);
        assert_eq!(snap.prev_close, 123.0);
        assert_eq!(snap.volume_ma, Some(1000.0));
    }
}
