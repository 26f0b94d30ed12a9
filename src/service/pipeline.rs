use crate::db::MatchingSource;
use crate::error::{MatchingError, MatchingResult};
use crate::models::{MatchResult, StatisticsReport};
use crate::service::enrich::enrich;
use crate::service::matcher::Matcher;
use crate::service::model::{ModelFactory, PredictionModel};
use crate::service::reconcile::reconcile;
use crate::service::resolver::resolve;
use crate::storage::ResultSink;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// 模块匹配一次运行的结果
///
/// 校验失败与上游失败以哨兵字符串返回，不作为错误抛出。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MatchingOutcome {
    Uploaded { url: String, stats: StatisticsReport },
    Failed { sentinel: String },
}

/// 模块匹配服务：取数 → 补充属性 → 匹配 → 统计 → 上传
pub struct ModuleMatchingService {
    source: Arc<dyn MatchingSource>,
    sink: Arc<dyn ResultSink>,
    matcher: Arc<dyn Matcher>,
    model_factory: ModelFactory,
    default_bonus_percent: f64,
}

impl ModuleMatchingService {
    pub fn new(
        source: Arc<dyn MatchingSource>,
        sink: Arc<dyn ResultSink>,
        matcher: Arc<dyn Matcher>,
        model_factory: ModelFactory,
        default_bonus_percent: f64,
    ) -> Self {
        Self {
            source,
            sink,
            matcher,
            model_factory,
            default_bonus_percent,
        }
    }

    /// 完整流程入口
    ///
    /// `model` 为空时使用注入的模型工厂。Schema / Lookup 错误属于契约
    /// 违例，直接返回 `Err`。
    pub async fn auto_module_matching(
        &self,
        endpoint: &str,
        bonus_percent: Option<f64>,
        model: Option<Arc<dyn PredictionModel>>,
    ) -> MatchingResult<MatchingOutcome> {
        match self.run(endpoint, bonus_percent, model).await {
            Ok((url, stats)) => Ok(MatchingOutcome::Uploaded { url, stats }),
            Err(e) if e.is_sentinel() => {
                tracing::warn!("Module matching for {} stopped: {:?}", endpoint, e);
                Ok(MatchingOutcome::Failed {
                    sentinel: e.to_string(),
                })
            }
            Err(e) => {
                tracing::error!("Module matching for {} failed: {}", endpoint, e);
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        endpoint: &str,
        bonus_percent: Option<f64>,
        model: Option<Arc<dyn PredictionModel>>,
    ) -> MatchingResult<(String, StatisticsReport)> {
        let endpoint = normalize_endpoint(endpoint)?;
        let bonus_percent = effective_bonus_percent(bonus_percent, self.default_bonus_percent);

        let (train, test) = self.source.fetch(&endpoint, bonus_percent).await?;
        tracing::info!(
            "Client {}: fetched {} bonus SKUs, {} nomenclatures (bonus percent {})",
            endpoint,
            train.len(),
            test.len(),
            bonus_percent
        );

        let model = match model {
            Some(m) => m,
            None => (self.model_factory)()?,
        };
        let matcher = self.matcher.clone();
        let task_endpoint = endpoint.clone();

        // 补充属性、匹配、统计均为 CPU 密集，放到阻塞线程
        let (result, stats) = tokio::task::spawn_blocking(
            move || -> MatchingResult<(Vec<MatchResult>, StatisticsReport)> {
                let train = enrich(train, model.as_ref(), false)?;
                let test = enrich(test, model.as_ref(), true)?;
                let result = resolve(&train, &test, matcher.as_ref())?;
                let stats = reconcile(&task_endpoint, &result, &train)?;
                Ok((result, stats))
            },
        )
        .await
        .map_err(|e| MatchingError::Matcher(format!("matching task aborted: {}", e)))??;

        tracing::info!("Module matching statistics: {}", stats);

        let url = self.sink.upload(&endpoint, &result).await?;
        tracing::info!("Client {}: result uploaded to {}", endpoint, url);
        Ok((url, stats))
    }
}

/// 客户ID必须是 UUID，统一为小写连字符格式
pub fn normalize_endpoint(raw: &str) -> MatchingResult<String> {
    Uuid::parse_str(raw)
        .map(|id| id.hyphenated().to_string())
        .map_err(|_| MatchingError::InvalidEndpoint {
            value: raw.to_string(),
        })
}

/// 奖金系数：缺省、非有限值或非正数时使用默认值
pub fn effective_bonus_percent(requested: Option<f64>, default: f64) -> f64 {
    match requested {
        Some(p) if p.is_finite() && p > 0.0 => p,
        _ => default,
    }
}
