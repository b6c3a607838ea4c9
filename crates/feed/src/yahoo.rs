use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use vixwatch_core::common::{Ticker, TimeFrame};
use vixwatch_core::market::entity::{Bar, BarSeries};
use vixwatch_core::market::error::MarketError;
use vixwatch_core::market::port::BarSource;

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// # Summary
/// 获取当前交易时段数据的 Yahoo Finance chart 适配器。
///
/// # Invariants
/// - 共用一个超时 10 秒的 `reqwest` 客户端。
#[derive(Clone)]
pub struct YahooProvider {
    client: Client,
}

impl YahooProvider {
    /// # Summary
    /// 使用伪装浏览器的 HTTP 客户端创建实例。
    ///
    /// # Logic
    /// 1. 为 rustls 安装 ring 加密提供者（已安装则跳过）。
    /// 2. 设置浏览器 User-Agent，否则会被 Yahoo 拦截。
    /// 3. 以 10 秒超时构建客户端。
    ///
    /// # Returns
    /// 返回 YahooProvider；客户端无法构建时返回 `MarketError::Network`。
    pub fn new() -> Result<Self, MarketError> {
        if rustls::crypto::ring::default_provider()
            .install_default()
            .is_err()
        {
            debug!("rustls crypto provider already installed");
        }

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_UA));

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .default_headers(headers)
            .build()
            .map_err(|e| MarketError::Network(e.to_string()))?;
        Ok(Self { client })
    }
}

/// 周期对应的 Yahoo 粒度字符串。
fn yahoo_interval(interval: TimeFrame) -> &'static str {
    match interval {
        TimeFrame::Minute1 => "1m",
        TimeFrame::Minute2 => "2m",
        TimeFrame::Minute5 => "5m",
        TimeFrame::Minute15 => "15m",
        TimeFrame::Hour1 => "60m",
        TimeFrame::Day1 => "1d",
    }
}

/// 回看范围：日内周期取当前交易时段，其余周期取
/// 足够计算慢速 EMA 的天数。
fn yahoo_range(interval: TimeFrame) -> &'static str {
    match interval {
        TimeFrame::Day1 => "3mo",
        TimeFrame::Hour1 => "5d",
        _ => "1d",
    }
}

#[derive(Deserialize, Debug)]
struct YahooResponse {
    chart: YahooChart,
}

#[derive(Deserialize, Debug)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Deserialize, Debug)]
struct YahooError {
    description: String,
}

#[derive(Deserialize, Debug)]
struct YahooResult {
    // 开盘前不存在
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: YahooIndicators,
}

#[derive(Deserialize, Debug)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

/// 按列存储的 OHLCV，任意元素都可能为 null。
#[derive(Deserialize, Debug, Default)]
struct YahooQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// # Summary
/// 将解码后的 chart 数据转换为 `BarSeries`。
///
/// # Logic
/// 1. 如有接口错误，返回其描述。
/// 2. 将时间戳与报价列逐行组合，跳过含 null 字段的行。
/// 3. 由 `BarSeries::new` 剔除异常或乱序的行。
fn into_series(
    ticker: &Ticker,
    interval: TimeFrame,
    response: YahooResponse,
) -> Result<BarSeries, MarketError> {
    if let Some(err) = response.chart.error {
        return Err(MarketError::Unknown(err.description));
    }
    let result = response
        .chart
        .result
        .and_then(|mut r| r.pop())
        .ok_or(MarketError::NotFound)?;
    let Some(quote) = result.indicators.quote.first() else {
        return Ok(BarSeries::empty(ticker.symbol.clone(), interval));
    };

    let mut bars = Vec::with_capacity(result.timestamp.len());
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let row = (
            DateTime::<Utc>::from_timestamp(ts, 0),
            quote.open.get(i).copied().flatten(),
            quote.high.get(i).copied().flatten(),
            quote.low.get(i).copied().flatten(),
            quote.close.get(i).copied().flatten(),
            quote.volume.get(i).copied().flatten(),
        );
        if let (Some(time), Some(open), Some(high), Some(low), Some(close), Some(volume)) = row {
            bars.push(Bar {
                time,
                open,
                high,
                low,
                close,
                volume,
            });
        }
    }
    Ok(BarSeries::new(ticker.symbol.clone(), interval, bars))
}

#[async_trait]
impl BarSource for YahooProvider {
    /// # Summary
    /// 从 Yahoo v8 chart 接口抓取当前时段的 K 线。
    ///
    /// # Logic
    /// 1. 映射周期并选择回看范围。
    /// 2. 请求 `/v8/finance/chart/{symbol}` 并解析 JSON。
    /// 3. 将各列转换为经过清洗的 `BarSeries`。
    async fn fetch_bars(
        &self,
        ticker: &Ticker,
        interval: TimeFrame,
    ) -> Result<BarSeries, MarketError> {
        let url = format!("{}/{}", CHART_URL, ticker.symbol);

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("range", yahoo_range(interval)),
                ("interval", yahoo_interval(interval)),
                ("includePrePost", "false"),
            ])
            .send()
            .await
            .map_err(|e| MarketError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(MarketError::Network(format!("HTTP {}", resp.status())));
        }

        let json: YahooResponse = resp
            .json()
            .await
            .map_err(|e| MarketError::Parse(e.to_string()))?;

        let series = into_series(ticker, interval, json)?;
        debug!(symbol = %ticker, interval = %interval, bars = series.len(), "Fetched bars");
        Ok(series)
    }
}
