use tracing::debug;
use vixwatch_core::config::SignalThresholds;
use vixwatch_core::market::entity::BarSeries;
use vixwatch_core::signal::entity::{RiskLabel, VolatilityContext};

/// # Summary
/// 将指数水平及其百分比变化映射为风险标签。
///
/// # Logic
/// 1. 水平高于 `vix_high_level` 或变化高于 `vix_spike_delta_pct`：High。
/// 2. 水平高于 `vix_medium_level`：Medium。
/// 3. 其余：Low。
pub fn risk_label(level: f64, delta_pct: f64, thresholds: &SignalThresholds) -> RiskLabel {
    if level > thresholds.vix_high_level || delta_pct > thresholds.vix_spike_delta_pct {
        RiskLabel::High
    } else if level > thresholds.vix_medium_level {
        RiskLabel::Medium
    } else {
        RiskLabel::Low
    }
}

/// # Summary
/// 由指数 K 线得出本周期的波动率上下文。
///
/// # Logic
/// 1. 不足两根 K 线时退回 `VolatilityContext::unknown()`。
/// 2. `level` 为最新收盘价，`delta_pct` 为相对前一收盘价的
///    百分比变化。
/// 3. 用 `risk_label` 给出标签。
///
/// # Arguments
/// * `series`: 指数 K 线，抓取失败时为 `None`。
/// * `thresholds`: 分级常量。
///
/// # Returns
/// 总是返回可用的上下文。
pub fn volatility_context(
    series: Option<&BarSeries>,
    thresholds: &SignalThresholds,
) -> VolatilityContext {
    let bars = match series {
        Some(s) if s.len() >= 2 => s.bars(),
        _ => {
            debug!("Volatility index unavailable, using default context");
            return VolatilityContext::unknown();
        }
    };
    let level = bars[bars.len() - 1].close;
    let prev = bars[bars.len() - 2].close;
    let delta_pct = if prev > 0.0 {
        (level - prev) / prev * 100.0
    } else {
        0.0
    };
    VolatilityContext {
        level,
        delta_pct,
        risk: risk_label(level, delta_pct, thresholds),
    }
}
