use crate::db::queries::{self, BonusRow};
use crate::error::{MatchingError, MatchingResult};
use crate::models::{parse_bonus, BonusSku, Nomenclature};
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use sqlx::PgPool;
use std::str::FromStr;

/// 匹配数据来源：返回 (奖金表, 名录)
#[async_trait]
pub trait MatchingSource: Send + Sync {
    async fn fetch(
        &self,
        endpoint: &str,
        bonus_percent: f64,
    ) -> MatchingResult<(Vec<BonusSku>, Vec<Nomenclature>)>;
}

/// Postgres 数据来源
pub struct PgMatchingSource {
    pool: PgPool,
}

impl PgMatchingSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MatchingSource for PgMatchingSource {
    async fn fetch(
        &self,
        endpoint: &str,
        bonus_percent: f64,
    ) -> MatchingResult<(Vec<BonusSku>, Vec<Nomenclature>)> {
        let rows = queries::list_bonus_rows(&self.pool, endpoint).await.map_err(|e| {
            tracing::error!("Bonus query for {} failed: {:?}", endpoint, e);
            MatchingError::Db(e)
        })?;
        let train = build_catalog(rows, bonus_percent)?;

        let test = queries::list_nomenclatures(&self.pool, endpoint).await.map_err(|e| {
            tracing::error!("Nomenclature query for {} failed: {:?}", endpoint, e);
            MatchingError::Db(e)
        })?;
        if test.is_empty() {
            return Err(MatchingError::NoNoms);
        }

        Ok((train, test))
    }
}

/// 由原始行构建奖金表：丢弃无有效奖金的行，奖金乘以系数
pub fn build_catalog(rows: Vec<BonusRow>, bonus_percent: f64) -> MatchingResult<Vec<BonusSku>> {
    if rows.is_empty() {
        return Err(MatchingError::NoBonus);
    }
    let multiplier = BigDecimal::from_str(&bonus_percent.to_string())
        .map_err(|e| MatchingError::schema("catalog", "bonus", format!("bad multiplier: {}", e)))?;

    let total = rows.len();
    let catalog: Vec<BonusSku> = rows
        .into_iter()
        .filter_map(|row| {
            let bonus = match row.bonus.as_deref().map(parse_bonus) {
                Some(Ok(Some(b))) => b,
                Some(Err(e)) => {
                    tracing::warn!("Skipping bonus SKU {}: {}", row.id, e);
                    return None;
                }
                _ => return None,
            };
            Some(BonusSku {
                id: row.id,
                text: row.text,
                bonus: Some(bonus * &multiplier),
            })
        })
        .collect();

    if catalog.is_empty() {
        return Err(MatchingError::NoneBonus);
    }
    if catalog.len() < total {
        tracing::debug!("{} of {} bonus rows had no usable bonus", total - catalog.len(), total);
    }
    Ok(catalog)
}
