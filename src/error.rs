use thiserror::Error;

/// 报表引擎错误
///
/// - [`Validation`] 缺少必填参数 (如 source、租户头)
/// - [`NotFound`] 未知数据源或未知命名报表
/// - [`Unsupported`] 合法数据源但未实现的聚合组合
/// - [`Database`] 底层查询失败
///
/// [`Validation`]: ReportError::Validation
/// [`NotFound`]: ReportError::NotFound
/// [`Unsupported`]: ReportError::Unsupported
/// [`Database`]: ReportError::Database
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unsupported combination: {0}")]
    Unsupported(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
