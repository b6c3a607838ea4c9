use std::fmt;
use std::io::Write as _;
use tracing::warn;
use vixwatch_core::signal::entity::{
    AlertLevel, Crossover, Report, RiskLabel, SignalRecord, SymbolReport, Trend,
};
use vixwatch_core::signal::port::ReportRenderer;

/// # Summary
/// 每个周期向 stdout 输出一次的纯文本看板。
pub struct ConsoleRenderer {
    fast_label: String,
    slow_label: String,
}

impl ConsoleRenderer {
    pub fn new(ema_fast_period: usize, ema_slow_period: usize) -> Self {
        Self {
            fast_label: format!("EMA{}", ema_fast_period),
            slow_label: format!("EMA{}", ema_slow_period),
        }
    }

    /// # Summary
    /// 格式化整份报告。
    ///
    /// # Logic
    /// 1. 标题行：波动率水平、变化与风险。
    /// 2. 指数飙升时显示市场告警横幅。
    /// 3. 按报告顺序每个标的一段；没有信号的标的
    ///    显示为 "waiting"，而非故障。
    pub fn format(&self, report: &Report) -> String {
        Dashboard {
            renderer: self,
            report,
        }
        .to_string()
    }

    fn write_signal(&self, f: &mut fmt::Formatter<'_>, r: &SignalRecord) -> fmt::Result {
        let trend = match (r.trend, r.crossover) {
            (_, Crossover::Golden) => "Bullish (reversal up)",
            (_, Crossover::Death) => "Bearish (reversal down)",
            (Trend::Bullish, Crossover::None) => "Bullish",
            (Trend::Bearish, Crossover::None) => "Bearish",
        };
        let rsi = r
            .rsi
            .map(|v| format!("{:.1}", v))
            .unwrap_or_else(|| "-".into());
        let volume = r
            .volume_ratio
            .map(|v| format!("{:.2}x", v))
            .unwrap_or_else(|| "-".into());
        writeln!(
            f,
            "{:<8} {:>10.2} {:+.2} ({:+.2}%)  {}  {}/{} {:.2}/{:.2}  RSI {}  Vol {}  [{}] {}",
            r.symbol,
            r.price,
            r.price_change,
            r.price_change_pct,
            trend,
            self.fast_label,
            self.slow_label,
            r.ema_fast,
            r.ema_slow,
            rsi,
            volume,
            level_text(r.alert_level),
            r.headline
        )?;
        writeln!(
            f,
            "{:<8} pivot {:.2}  R1 {:.2}  S1 {:.2}",
            "", r.pivots.pivot, r.pivots.resistance1, r.pivots.support1
        )
    }
}

/// 经某个渲染器呈现的一份报告。
struct Dashboard<'a> {
    renderer: &'a ConsoleRenderer,
    report: &'a Report,
}

impl fmt::Display for Dashboard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        let as_of = report
            .as_of
            .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            f,
            "=== VIX {:.2} ({:+.2}%)  risk: {}  as of {} ===",
            report.volatility.level,
            report.volatility.delta_pct,
            risk_text(report.volatility.risk),
            as_of
        )?;
        if report.market_alert {
            writeln!(
                f,
                "!!! MARKET ALERT: volatility index spiking, watch long exposure !!!"
            )?;
        }
        for entry in &report.entries {
            match &entry.status {
                SymbolReport::Signal(record) => self.renderer.write_signal(f, record)?,
                SymbolReport::InsufficientData { bars, required } => writeln!(
                    f,
                    "{:<8} waiting for data ({}/{} bars)",
                    entry.symbol, bars, required
                )?,
                SymbolReport::NoData => writeln!(f, "{:<8} waiting for data...", entry.symbol)?,
            }
        }
        Ok(())
    }
}

impl ReportRenderer for ConsoleRenderer {
    fn render(&self, report: &Report) {
        let text = self.format(report);
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = stdout.write_all(text.as_bytes()).and_then(|_| stdout.flush()) {
            warn!(error = %e, "Failed to write dashboard");
        }
    }
}

fn risk_text(risk: RiskLabel) -> &'static str {
    match risk {
        RiskLabel::Low => "LOW (calm market)",
        RiskLabel::Medium => "MEDIUM (volatility rising)",
        RiskLabel::High => "HIGH (fear spike)",
        RiskLabel::Unknown => "UNKNOWN",
    }
}

fn level_text(level: AlertLevel) -> &'static str {
    match level {
        AlertLevel::Info => "INFO",
        AlertLevel::Warning => "WARN",
        AlertLevel::Error => "ALERT",
    }
}
