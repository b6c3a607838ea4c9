use crate::signal::entity::Report;

/// # Summary
/// 展示已完成周期的渲染接口。
///
/// # Invariants
/// - 以共享引用接收报告，不得修改。
pub trait ReportRenderer: Send + Sync {
    /// # Summary
    /// 展示一次刷新周期。
    ///
    /// # Arguments
    /// * `report`: 本周期的报告。
    fn render(&self, report: &Report);
}
