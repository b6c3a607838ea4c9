use crate::indicator::IndicatorSnapshot;
use vixwatch_core::config::SignalThresholds;
use vixwatch_core::signal::entity::{
    AlertLevel, AlertReason, Crossover, PivotLevels, Proximity, RsiExtreme, SignalRecord, Trend,
    VolatilityContext,
};

/// # Summary
/// 比较最近两组 EMA。
///
/// # Logic
/// - 金叉：`prev_fast <= prev_slow` 且 `fast > slow`。
/// - 死叉：`prev_fast >= prev_slow` 且 `fast < slow`。
/// - 否则为 None。持平只为下一根 K 线做准备，自身不触发。
pub fn detect_crossover(prev_fast: f64, prev_slow: f64, fast: f64, slow: f64) -> Crossover {
    if prev_fast <= prev_slow && fast > slow {
        Crossover::Golden
    } else if prev_fast >= prev_slow && fast < slow {
        Crossover::Death
    } else {
        Crossover::None
    }
}

/// 严格高于为看涨；EMA 相等视为看跌。
pub fn trend(fast: f64, slow: f64) -> Trend {
    if fast > slow {
        Trend::Bullish
    } else {
        Trend::Bearish
    }
}

pub fn rsi_extreme(rsi: Option<f64>, thresholds: &SignalThresholds) -> RsiExtreme {
    match rsi {
        Some(v) if v > thresholds.rsi_overbought => RsiExtreme::Overbought,
        Some(v) if v < thresholds.rsi_oversold => RsiExtreme::Oversold,
        _ => RsiExtreme::None,
    }
}

/// # Summary
/// 价格是否处于 R1 或 S1 附近的区间内。
///
/// # Logic
/// 1. 先检查阻力位，两个区间重叠时以阻力位为准。
pub fn proximity(price: f64, pivots: &PivotLevels, thresholds: &SignalThresholds) -> Proximity {
    if price >= pivots.resistance1 * (1.0 - thresholds.proximity_band) {
        Proximity::NearResistance
    } else if price <= pivots.support1 * (1.0 + thresholds.proximity_band) {
        Proximity::NearSupport
    } else {
        Proximity::None
    }
}

/// 最新成交量与其均线之比；均线不可用时为 `None`。
pub fn volume_ratio(volume: f64, volume_ma: Option<f64>) -> Option<f64> {
    match volume_ma {
        Some(ma) if ma > 0.0 => Some(volume / ma),
        _ => None,
    }
}

/// 单个标的在定级之前得出的事件。
#[derive(Debug, Clone, Copy)]
struct Events {
    crossover: Crossover,
    rsi_extreme: RsiExtreme,
    proximity: Proximity,
    volume_spike: bool,
}

type AlertRule = fn(&Events, &VolatilityContext, &SignalThresholds) -> Option<(AlertLevel, AlertReason)>;

/// 按优先级排列的定级规则，首个命中者决定结果。
const ALERT_RULES: [AlertRule; 5] = [
    death_cross_rule,
    golden_cross_rule,
    rsi_extreme_rule,
    proximity_rule,
    volume_spike_rule,
];

fn death_cross_rule(
    e: &Events,
    _: &VolatilityContext,
    _: &SignalThresholds,
) -> Option<(AlertLevel, AlertReason)> {
    (e.crossover == Crossover::Death).then_some((AlertLevel::Error, AlertReason::DeathCross))
}

fn golden_cross_rule(
    e: &Events,
    ctx: &VolatilityContext,
    t: &SignalThresholds,
) -> Option<(AlertLevel, AlertReason)> {
    if e.crossover != Crossover::Golden {
        return None;
    }
    if ctx.delta_pct > t.rising_risk_delta_pct {
        Some((AlertLevel::Error, AlertReason::GoldenCrossRisingRisk))
    } else {
        Some((AlertLevel::Warning, AlertReason::GoldenCross))
    }
}

fn rsi_extreme_rule(
    e: &Events,
    _: &VolatilityContext,
    _: &SignalThresholds,
) -> Option<(AlertLevel, AlertReason)> {
    match e.rsi_extreme {
        RsiExtreme::Overbought => Some((AlertLevel::Warning, AlertReason::RsiOverbought)),
        RsiExtreme::Oversold => Some((AlertLevel::Warning, AlertReason::RsiOversold)),
        RsiExtreme::None => None,
    }
}

fn proximity_rule(
    e: &Events,
    _: &VolatilityContext,
    _: &SignalThresholds,
) -> Option<(AlertLevel, AlertReason)> {
    match e.proximity {
        Proximity::NearResistance => Some((AlertLevel::Warning, AlertReason::NearResistance)),
        Proximity::NearSupport => Some((AlertLevel::Info, AlertReason::NearSupport)),
        Proximity::None => None,
    }
}

fn volume_spike_rule(
    e: &Events,
    _: &VolatilityContext,
    _: &SignalThresholds,
) -> Option<(AlertLevel, AlertReason)> {
    e.volume_spike
        .then_some((AlertLevel::Warning, AlertReason::VolumeSpike))
}

fn headline(
    reason: AlertReason,
    snap: &IndicatorSnapshot,
    ratio: Option<f64>,
    volume_spike: bool,
    ctx: &VolatilityContext,
    t: &SignalThresholds,
) -> String {
    let mut text = match reason {
        AlertReason::DeathCross => {
            let mut s = String::from("Death cross, trend turning down");
            if ctx.delta_pct > t.vix_surge_delta_pct {
                s.push_str(" + VIX surging (strong warning)");
            }
            s
        }
        AlertReason::GoldenCrossRisingRisk => {
            format!(
                "Golden cross while VIX rises {:+.2}%, treat with caution",
                ctx.delta_pct
            )
        }
        AlertReason::GoldenCross => {
            let mut s = String::from("Golden cross, trend turning up");
            if ctx.delta_pct < t.vix_easing_delta_pct {
                s.push_str(" + VIX easing (confirmed)");
            }
            s
        }
        AlertReason::RsiOverbought => {
            format!("RSI {:.1} overbought", snap.rsi.unwrap_or_default())
        }
        AlertReason::RsiOversold => format!("RSI {:.1} oversold", snap.rsi.unwrap_or_default()),
        AlertReason::NearResistance => {
            format!("Testing resistance {:.2}", snap.pivots.resistance1)
        }
        AlertReason::NearSupport => format!("Testing support {:.2}", snap.pivots.support1),
        AlertReason::VolumeSpike => {
            format!("Volume {:.1}x average", ratio.unwrap_or_default())
        }
        AlertReason::Stable => String::from("Stable"),
    };
    if volume_spike && reason != AlertReason::VolumeSpike {
        text.push_str(" | unusual volume");
    }
    text
}

/// # Summary
/// 将单个标的的指标快照转换为信号记录。
///
/// # Logic
/// 1. 得出趋势、交叉、RSI 极值、关键位接近与放量。
/// 2. 依次遍历 `ALERT_RULES`，首个触发的规则决定级别。
/// 3. 均未触发：Info / Stable。
///
/// # Arguments
/// * `symbol`: 记录对应的代码。
/// * `snap`: 最后两个指标点及最新 K 线数据。
/// * `ctx`: 本周期共享的波动率上下文。
/// * `thresholds`: 分级常量。
///
/// # Returns
/// 字段完整的记录。相同输入总是得到相同记录。
pub fn classify(
    symbol: &str,
    snap: &IndicatorSnapshot,
    ctx: &VolatilityContext,
    thresholds: &SignalThresholds,
) -> SignalRecord {
    let ratio = volume_ratio(snap.volume, snap.volume_ma);
    let events = Events {
        crossover: detect_crossover(snap.prev_fast, snap.prev_slow, snap.fast, snap.slow),
        rsi_extreme: rsi_extreme(snap.rsi, thresholds),
        proximity: proximity(snap.price, &snap.pivots, thresholds),
        volume_spike: ratio.is_some_and(|r| r > thresholds.volume_spike_ratio),
    };

    let (alert_level, reason) = ALERT_RULES
        .iter()
        .find_map(|rule| rule(&events, ctx, thresholds))
        .unwrap_or((AlertLevel::Info, AlertReason::Stable));

    let price_change = snap.price - snap.prev_close;
    let price_change_pct = if snap.prev_close > 0.0 {
        price_change / snap.prev_close * 100.0
    } else {
        0.0
    };

    SignalRecord {
        symbol: symbol.to_string(),
        trend: trend(snap.fast, snap.slow),
        crossover: events.crossover,
        proximity: events.proximity,
        rsi_extreme: events.rsi_extreme,
        volume_spike: events.volume_spike,
        alert_level,
        reason,
        headline: headline(reason, snap, ratio, events.volume_spike, ctx, thresholds),
        price: snap.price,
        price_change,
        price_change_pct,
        ema_fast: snap.fast,
        ema_slow: snap.slow,
        rsi: snap.rsi,
        volume_ratio: ratio,
        pivots: snap.pivots,
    }
}
