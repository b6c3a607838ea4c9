use crate::common::{Ticker, TimeFrame};
use crate::market::entity::BarSeries;
use crate::market::error::MarketError;
use async_trait::async_trait;

/// # Summary
/// 数据适配器契约：提供当前时段的 K 线。
///
/// # Invariants
/// - 重试与传输超时由实现方负责。
/// - 空的 `BarSeries` 是合法结果，表示"暂无数据"。
#[async_trait]
pub trait BarSource: Send + Sync {
    /// # Summary
    /// 抓取 `ticker` 当前时段的日内 K 线。
    ///
    /// # Logic
    /// 1. 将 `interval` 映射为上游粒度。
    /// 2. 请求最新交易时段窗口。
    /// 3. 由响应构建清洗后的 `BarSeries`。
    ///
    /// # Arguments
    /// * `ticker`: 要抓取的标的。
    /// * `interval`: K 线周期。
    ///
    /// # Returns
    /// 成功时返回序列；数据源不可达或
    /// 返回数据不可用时返回 `MarketError`。
    async fn fetch_bars(
        &self,
        ticker: &Ticker,
        interval: TimeFrame,
    ) -> Result<BarSeries, MarketError>;
}
