use crate::error::{ErrorKind, MatchingError};
use crate::models::{BonusSku, MatchResult, StatisticsReport};
use crate::service::{reconcile, MatchingOutcome, ModuleMatchingService};
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 请求体: 客户ID与奖金系数
#[derive(Debug, Deserialize)]
pub struct ModuleMatchingRequest {
    pub endpoint: String,
    #[serde(default)]
    pub bonus_percent: Option<f64>,
}

/// 响应体
///
/// 失败时 `url` 与 `message` 均为哨兵字符串。
#[derive(Debug, Serialize)]
pub struct ModuleMatchingResponse {
    pub success: bool,
    pub url: String,
    pub stats: Option<StatisticsReport>,
    pub message: String,
}

/// 统计请求体: 调用方给出的结果表与奖金表
#[derive(Debug, Deserialize)]
pub struct StatisticsRequest {
    pub endpoint: String,
    pub results: Vec<MatchResult>,
    pub catalog: Vec<BonusSku>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 模块匹配接口
pub async fn module_matching(
    State(service): State<Arc<ModuleMatchingService>>,
    Json(req): Json<ModuleMatchingRequest>,
) -> Response {
    match service
        .auto_module_matching(&req.endpoint, req.bonus_percent, None)
        .await
    {
        Ok(MatchingOutcome::Uploaded { url, stats }) => {
            let response = ModuleMatchingResponse {
                success: true,
                message: format!("Matched {} nomenclatures", stats.n_nom),
                url,
                stats: Some(stats),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Ok(MatchingOutcome::Failed { sentinel }) => {
            let response = ModuleMatchingResponse {
                success: false,
                url: sentinel.clone(),
                stats: None,
                message: sentinel,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// 对给定的结果表与奖金表重新计算统计
pub async fn statistics(Json(req): Json<StatisticsRequest>) -> Response {
    match reconcile(&req.endpoint, &req.results, &req.catalog) {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => error_response(e),
    }
}

fn error_response(e: MatchingError) -> Response {
    let status = match e.kind() {
        ErrorKind::Schema => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let response = ErrorResponse {
        success: false,
        message: format!("Error: {}", e),
    };
    (status, Json(response)).into_response()
}
