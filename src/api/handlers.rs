use crate::error::ReportError;
use crate::service::{RawReportRequest, ReportService};
use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;

/// 错误响应体
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 报表运行接口: 命名报表与通用聚合共用一个入口
///
/// 成功时返回 `{ title, source, columns, rows }`;
/// 失败时按错误种类映射状态码, 响应体为 `{ success, message }`。
pub async fn run_report(
    State(service): State<Arc<ReportService>>,
    headers: HeaderMap,
    Json(req): Json<RawReportRequest>,
) -> Response {
    let tenant_id = match tenant_from_headers(&headers) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match service.run(tenant_id, &req).await {
        Ok(table) => (StatusCode::OK, Json(table)).into_response(),
        Err(e) => {
            let status = status_for(&e);
            if status == StatusCode::INTERNAL_SERVER_ERROR {
                tracing::error!("报表执行失败: {}", e);
            }
            let body = ErrorResponse {
                success: false,
                message: e.to_string(),
            };
            (status, Json(body)).into_response()
        }
    }
}

/// 租户ID显式从请求头传入, 鉴权与租户归属由上游网关负责
fn tenant_from_headers(headers: &HeaderMap) -> Result<i64, Response> {
    headers
        .get("x-tenant-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok())
        .ok_or_else(|| {
            let body = ErrorResponse {
                success: false,
                message: "missing or invalid x-tenant-id header".to_string(),
            };
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        })
}

/// 错误种类到状态码的映射
///
/// Unsupported 与 Validation 同为 400, 传输层刻意不区分。
fn status_for(error: &ReportError) -> StatusCode {
    match error {
        ReportError::Validation(_) | ReportError::Unsupported(_) => StatusCode::BAD_REQUEST,
        ReportError::NotFound(_) => StatusCode::NOT_FOUND,
        ReportError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds_map_to_contract_status_codes() {
        assert_eq!(
            status_for(&ReportError::Validation("source is required".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&ReportError::Unsupported("no path".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&ReportError::NotFound("unknown source".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&ReportError::Database(sqlx::Error::PoolTimedOut)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn tenant_header_is_required_and_numeric() {
        let mut headers = HeaderMap::new();
        assert!(tenant_from_headers(&headers).is_err());

        headers.insert("x-tenant-id", "abc".parse().unwrap());
        assert!(tenant_from_headers(&headers).is_err());

        headers.insert("x-tenant-id", " 42 ".parse().unwrap());
        assert_eq!(tenant_from_headers(&headers).ok(), Some(42));
    }
}
