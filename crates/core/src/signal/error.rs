use thiserror::Error;

/// # Summary
/// 信号引擎的错误分类。
///
/// # Invariants
/// - `InsufficientData` 与 `NoData` 针对单个标的，
///   可在下个周期恢复。
/// - `InvalidConfig` 在任何周期运行之前抛出。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    #[error("Insufficient data: {bars} bars, {required} required")]
    InsufficientData { bars: usize, required: usize },

    #[error("No data received")]
    NoData,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
