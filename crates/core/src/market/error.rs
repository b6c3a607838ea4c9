use thiserror::Error;

/// # Summary
/// 数据适配器的失败类型：网络、解析与数据缺失。
///
/// # Invariants
/// - 不会中断刷新周期，周期将其映射为 `NoData`。
#[derive(Error, Debug)]
pub enum MarketError {
    // 传输层失败，携带 HTTP 客户端的错误信息
    #[error("Network error: {0}")]
    Network(String),
    // 返回数据与预期结构不符
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Data not found")]
    NotFound,
    #[error("Unknown error: {0}")]
    Unknown(String),
}
