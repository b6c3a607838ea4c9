use crate::aggregator::ReportBuilder;
use crate::classifier::classify;
use crate::indicator::{IndicatorParams, IndicatorSnapshot};
use crate::volatility::volatility_context;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::{Instant, timeout, timeout_at};
use tracing::{debug, info, warn};
use vixwatch_core::common::{Ticker, TimeFrame};
use vixwatch_core::config::{MonitorConfig, SignalThresholds};
use vixwatch_core::market::entity::BarSeries;
use vixwatch_core::market::port::BarSource;
use vixwatch_core::signal::entity::{Report, SymbolReport, VolatilityContext};
use vixwatch_core::signal::error::SignalError;

/// # Summary
/// 对单个标的计算指标并完成分类。
///
/// # Logic
/// 1. 空序列：`NoData`。
/// 2. 长度不足：`InsufficientData`。
/// 3. 否则对指标快照进行分类。
pub fn evaluate_symbol(
    series: &BarSeries,
    params: &IndicatorParams,
    volatility: &VolatilityContext,
    thresholds: &SignalThresholds,
) -> SymbolReport {
    if series.is_empty() {
        return SymbolReport::NoData;
    }
    match IndicatorSnapshot::from_series(series, params) {
        Ok(snap) => SymbolReport::Signal(classify(series.symbol(), &snap, volatility, thresholds)),
        Err(SignalError::InsufficientData { bars, required }) => {
            debug!(
                symbol = series.symbol(),
                interval = %series.interval(),
                bars,
                required,
                "Waiting for more bars"
            );
            SymbolReport::InsufficientData { bars, required }
        }
        Err(_) => SymbolReport::NoData,
    }
}

/// # Summary
/// 纯函数：基于已抓取的 K 线计算单个周期的报告。
///
/// # Logic
/// 1. 拒绝非法配置。
/// 2. 只计算一次波动率上下文。
/// 3. 以该上下文评估每个配置的标的；缺失的标的记为 `NoData`。
/// 4. 按配置顺序汇总。
///
/// # Arguments
/// * `config`: 监控配置，计算前先校验。
/// * `bars_by_symbol`: 以规范化代码为键的 K 线序列。
/// * `volatility`: 波动率指数序列，抓取失败时为 `None`。
///
/// # Returns
/// `config` 未通过 `MonitorConfig::validate` 时返回 `SignalError::InvalidConfig`。
pub fn compute_report(
    config: &MonitorConfig,
    bars_by_symbol: &HashMap<String, BarSeries>,
    volatility: Option<&BarSeries>,
) -> Result<Report, SignalError> {
    config.validate()?;
    let thresholds = &config.thresholds;
    let params = IndicatorParams::from(config);
    let tickers = config.tickers();
    let ctx = volatility_context(volatility, thresholds);

    let mut builder = ReportBuilder::new(&tickers, ctx, thresholds);
    if let Some(last) = volatility.and_then(BarSeries::last) {
        builder.observe_time(last.time);
    }
    for ticker in &tickers {
        if let Some(series) = bars_by_symbol.get(&ticker.symbol) {
            if let Some(last) = series.last() {
                builder.observe_time(last.time);
            }
            builder.record(
                &ticker.symbol,
                evaluate_symbol(series, &params, &ctx, thresholds),
            );
        }
    }
    Ok(builder.build())
}

/// # Summary
/// 基于真实 `BarSource` 驱动刷新周期。
///
/// # Invariants
/// - 除配置外，周期之间不保留任何状态。
/// - 慢速或失败的标的不会让报告超过周期超时。
pub struct Monitor {
    source: Arc<dyn BarSource>,
    config: Arc<MonitorConfig>,
    params: IndicatorParams,
}

impl Monitor {
    /// # Summary
    /// 校验配置后创建监控器。
    ///
    /// # Returns
    /// 配置无法运行时返回 `SignalError::InvalidConfig`。
    pub fn new(source: Arc<dyn BarSource>, config: MonitorConfig) -> Result<Self, SignalError> {
        config.validate()?;
        let params = IndicatorParams::from(&config);
        Ok(Self {
            source,
            config: Arc::new(config),
            params,
        })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// # Summary
    /// 在单次抓取超时内获取波动率指数。
    ///
    /// # Returns
    /// 出错或超时返回 `None`，调用方退回默认上下文。
    async fn fetch_volatility(&self) -> Option<BarSeries> {
        let ticker = self.config.volatility_ticker()?;
        let limit = Duration::from_secs(self.config.fetch_timeout_secs);
        match timeout(
            limit,
            self.source
                .fetch_bars(&ticker, self.config.volatility_interval),
        )
        .await
        {
            Ok(Ok(series)) => Some(series),
            Ok(Err(e)) => {
                warn!(symbol = %ticker, error = %e, "Volatility index fetch failed");
                None
            }
            Err(_) => {
                warn!(symbol = %ticker, "Volatility index fetch timed out");
                None
            }
        }
    }

    /// # Summary
    /// 执行一次完整的刷新周期。
    ///
    /// # Logic
    /// 1. 先抓取波动率指数并得出共享上下文。
    /// 2. 每个不重复的标的启动一个任务：带超时抓取，再评估。
    /// 3. 收集结果，直到所有任务结束或到达周期截止时间；
    ///    未完成的任务被中止并记为 `NoData`。
    ///
    /// # Returns
    /// 本周期的报告，不会失败。
    pub async fn run_cycle(&self) -> Report {
        let deadline = Instant::now() + Duration::from_secs(self.config.cycle_timeout_secs);
        let thresholds = self.config.thresholds;
        let tickers = self.config.tickers();

        let volatility_series = self.fetch_volatility().await;
        let ctx = volatility_context(volatility_series.as_ref(), &thresholds);
        let mut builder = ReportBuilder::new(&tickers, ctx, &thresholds);
        if let Some(last) = volatility_series.as_ref().and_then(BarSeries::last) {
            builder.observe_time(last.time);
        }

        let mut tasks = JoinSet::new();
        let mut seen = HashSet::new();
        for ticker in tickers.iter().filter(|t| seen.insert(t.symbol.clone())) {
            tasks.spawn(fetch_and_evaluate(
                self.source.clone(),
                ticker.clone(),
                self.config.interval,
                Duration::from_secs(self.config.fetch_timeout_secs),
                self.params,
                ctx,
                thresholds,
            ));
        }

        loop {
            match timeout_at(deadline, tasks.join_next()).await {
                Ok(Some(Ok(outcome))) => {
                    if let Some(time) = outcome.last_time {
                        builder.observe_time(time);
                    }
                    builder.record(&outcome.symbol, outcome.status);
                }
                Ok(Some(Err(e))) => warn!(error = %e, "Symbol task failed"),
                Ok(None) => break,
                Err(_) => {
                    warn!(pending = tasks.len(), "Cycle deadline reached, pending symbols marked NoData");
                    tasks.abort_all();
                    break;
                }
            }
        }

        let report = builder.build();
        let counts = report.counts();
        info!(
            vix = report.volatility.level,
            vix_delta_pct = report.volatility.delta_pct,
            errors = counts.error,
            warnings = counts.warning,
            infos = counts.info,
            waiting = counts.waiting,
            highest = ?report.highest_alert(),
            "Refresh cycle complete"
        );
        report
    }
}

struct SymbolOutcome {
    symbol: String,
    last_time: Option<chrono::DateTime<chrono::Utc>>,
    status: SymbolReport,
}

async fn fetch_and_evaluate(
    source: Arc<dyn BarSource>,
    ticker: Ticker,
    interval: TimeFrame,
    limit: Duration,
    params: IndicatorParams,
    ctx: VolatilityContext,
    thresholds: SignalThresholds,
) -> SymbolOutcome {
    let (last_time, status) = match timeout(limit, source.fetch_bars(&ticker, interval)).await {
        Ok(Ok(series)) => (
            series.last().map(|b| b.time),
            evaluate_symbol(&series, &params, &ctx, &thresholds),
        ),
        Ok(Err(e)) => {
            warn!(symbol = %ticker, error = %e, "Bar fetch failed");
            (None, SymbolReport::NoData)
        }
        Err(_) => {
            warn!(symbol = %ticker, "Bar fetch timed out");
            (None, SymbolReport::NoData)
        }
    };
    SymbolOutcome {
        symbol: ticker.symbol,
        last_time,
        status,
    }
}
