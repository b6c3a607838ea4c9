use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::warn;
use vixwatch_core::common::Ticker;
use vixwatch_core::config::SignalThresholds;
use vixwatch_core::signal::entity::{
    DeltaUnit, Report, ReportEntry, SymbolReport, VolatilityContext,
};

/// # Summary
/// 将单个周期内各标的的结果汇总为 `Report`。
///
/// # Invariants
/// - 输出顺序即配置顺序，而非严重程度。
/// - 每个配置的标的都有一项；未记录的为 `NoData`。
pub struct ReportBuilder {
    // 配置顺序，保留重复项
    order: Vec<String>,
    received: HashMap<String, SymbolReport>,
    volatility: VolatilityContext,
    market_alert: bool,
    as_of: Option<DateTime<Utc>>,
}

impl ReportBuilder {
    /// # Summary
    /// 以给定标的与波动率上下文开始一份报告。
    ///
    /// # Logic
    /// 1. 记录标的顺序。
    /// 2. 指数变化超过 `vix_spike_delta_pct` 时
    ///    打开市场告警横幅。
    pub fn new(
        tickers: &[Ticker],
        volatility: VolatilityContext,
        thresholds: &SignalThresholds,
    ) -> Self {
        Self {
            order: tickers.iter().map(|t| t.symbol.clone()).collect(),
            received: HashMap::with_capacity(tickers.len()),
            volatility,
            market_alert: volatility.delta_pct > thresholds.vix_spike_delta_pct,
            as_of: None,
        }
    }

    /// # Summary
    /// 保存单个标的的结果。同一标的的后续调用
    /// 会覆盖之前的结果。
    pub fn record(&mut self, symbol: &str, status: SymbolReport) {
        if !self.order.iter().any(|s| s == symbol) {
            warn!(symbol, "Ignoring outcome for unconfigured symbol");
            return;
        }
        self.received.insert(symbol.to_string(), status);
    }

    /// 记录本周期内见到的最新 K 线时间。
    pub fn observe_time(&mut self, time: DateTime<Utc>) {
        self.as_of = Some(self.as_of.map_or(time, |t| t.max(time)));
    }

    pub fn build(self) -> Report {
        let entries = self
            .order
            .into_iter()
            .map(|symbol| {
                let status = self
                    .received
                    .get(&symbol)
                    .cloned()
                    .unwrap_or(SymbolReport::NoData);
                ReportEntry { symbol, status }
            })
            .collect();
        Report {
            entries,
            volatility: self.volatility,
            delta_unit: DeltaUnit::Percent,
            market_alert: self.market_alert,
            as_of: self.as_of,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use vixwatch_core::signal::entity::{AlertLevel, RiskLabel};

    fn tickers(symbols: &[&str]) -> Vec<Ticker> {
        symbols.iter().filter_map(|s| Ticker::parse(s)).collect()
    }

    #[test]
    fn test_missing_symbols_become_no_data_in_order() {
        let mut builder = ReportBuilder::new(
            &tickers(&["TSLA", "AAPL", "NVDA"]),
            VolatilityContext::unknown(),
            &SignalThresholds::default(),
        );
        builder.record(
            "NVDA",
            SymbolReport::InsufficientData {
                bars: 5,
                required: 22,
            },
        );
        let report = builder.build();

        let order: Vec<&str> = report.entries.iter().map(|e| e.symbol.as_str()).collect();
        assert_eq!(order, vec!["TSLA", "AAPL", "NVDA"]);
        assert_eq!(report.get("TSLA"), Some(&SymbolReport::NoData));
        assert_eq!(report.get("AAPL"), Some(&SymbolReport::NoData));
        assert!(matches!(
            report.get("NVDA"),
            Some(SymbolReport::InsufficientData { bars: 5, .. })
        ));
        assert_eq!(report.delta_unit, DeltaUnit::Percent);
        assert_eq!(report.counts().waiting, 3);
        assert_eq!(report.highest_alert(), None::<AlertLevel>);
    }

    #[test]
    fn test_unconfigured_symbol_is_ignored() {
        let mut builder = ReportBuilder::new(
            &tickers(&["AAPL"]),
            VolatilityContext::unknown(),
            &SignalThresholds::default(),
        );
        builder.record("MSFT", SymbolReport::NoData);
        assert_eq!(builder.build().entries.len(), 1);
    }

    #[test]
    fn test_market_alert_follows_index_spike() {
        let spiking = VolatilityContext {
            level: 24.0,
            delta_pct: 6.0,
            risk: RiskLabel::High,
        };
        let report =
            ReportBuilder::new(&tickers(&["AAPL"]), spiking, &SignalThresholds::default()).build();
        assert!(report.market_alert);

        let calm = ReportBuilder::new(
            &tickers(&["AAPL"]),
            VolatilityContext::unknown(),
            &SignalThresholds::default(),
        )
        .build();
        assert!(!calm.market_alert);
    }

    #[test]
    fn test_as_of_keeps_latest_time() {
        let mut builder = ReportBuilder::new(
            &tickers(&["AAPL"]),
            VolatilityContext::unknown(),
            &SignalThresholds::default(),
        );
        let early = Utc.with_ymd_and_hms(2024, 3, 4, 15, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 3, 4, 15, 5, 0).unwrap();
        builder.observe_time(late);
        builder.observe_time(early);
        assert_eq!(builder.build().as_of, Some(late));
    }
}
