//! # `vixwatch-signal`
//!
//! 信号推导与告警分级引擎。
//!
//! ## 流水线
//! - `indicator`: 由 K 线窗口计算 EMA、RSI、成交量均线与枢轴位
//! - `volatility`: 波动率指数的水平、百分比变化与风险标签
//! - `classifier`: 将趋势、交叉与极值归并为一个告警级别
//! - `aggregator`: 按配置顺序生成每周期报告
//! - `cycle`: 纯函数 `compute_report` 与并发抓取汇总的 `Monitor`

pub mod aggregator;
pub mod classifier;
pub mod cycle;
pub mod indicator;
pub mod volatility;
