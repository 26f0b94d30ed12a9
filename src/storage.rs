use crate::config::StorageConfig;
use crate::error::{MatchingError, MatchingResult};
use crate::models::MatchResult;
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::Utc;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;

/// 结果表的去向，返回可访问的 URL
#[async_trait]
pub trait ResultSink: Send + Sync {
    async fn upload(&self, endpoint: &str, results: &[MatchResult]) -> MatchingResult<String>;
}

/// 对象存储客户端 (HTTP PUT)
#[derive(Debug, Clone)]
pub struct StorageClient {
    client: Client,
    base_url: String,
}

impl StorageClient {
    pub fn new(config: &StorageConfig) -> MatchingResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                tracing::error!("Cannot build storage client: {}", e);
                MatchingError::Storage {
                    code: "client".to_string(),
                }
            })?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn object_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}/{}.csv",
            self.base_url,
            endpoint,
            Utc::now().format("%Y%m%d%H%M%S%3f")
        )
    }
}

#[async_trait]
impl ResultSink for StorageClient {
    async fn upload(&self, endpoint: &str, results: &[MatchResult]) -> MatchingResult<String> {
        let body = results_to_csv(results).map_err(|e| {
            tracing::error!("CSV export failed: {}", e);
            MatchingError::Storage {
                code: "csv".to_string(),
            }
        })?;
        let url = self.object_url(endpoint);
        tracing::debug!("Uploading {} rows ({} bytes) to {}", results.len(), body.len(), url);

        let response = self
            .client
            .put(&url)
            .header(CONTENT_TYPE, "text/csv")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Storage request failed: {}", e);
                MatchingError::Storage {
                    code: "network".to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MatchingError::Storage {
                code: status.as_u16().to_string(),
            });
        }
        Ok(url)
    }
}

fn option_to_csv(val: &Option<String>) -> String {
    val.clone().unwrap_or_default()
}

fn decimal_to_csv(val: &Option<BigDecimal>) -> String {
    val.as_ref().map(|v| v.to_string()).unwrap_or_default()
}

/// 结果表转 CSV (缺失值为空单元格)
pub fn results_to_csv(
    results: &[MatchResult],
) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["id", "nomcode", "m_group", "ph_group", "y", "bonus"])?;

    for result in results {
        writer.write_record(&[
            result.id.clone(),
            option_to_csv(&result.nomcode),
            option_to_csv(&result.m_group),
            option_to_csv(&result.ph_group),
            option_to_csv(&result.catalog_id),
            decimal_to_csv(&result.bonus),
        ])?;
    }

    writer.flush()?;
    Ok(writer.into_inner().map_err(|e| e.into_error())?)
}
