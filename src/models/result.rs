use super::nomenclature::{de_bonus, Enriched, Nomenclature};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// 匹配结果行 (每个 test 行一条)
///
/// `catalog_id` 与 `bonus` 同时存在或同时缺失。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub id: String,
    #[serde(default)]
    pub nomcode: Option<String>,
    #[serde(default)]
    pub m_group: Option<String>,
    #[serde(default)]
    pub ph_group: Option<String>,
    #[serde(rename = "y", default)]
    pub catalog_id: Option<String>,
    #[serde(default, deserialize_with = "de_bonus")]
    pub bonus: Option<BigDecimal>,
}

impl MatchResult {
    /// 未匹配行：复制 test 行的标识与分组
    pub fn unmatched(purchase: &Enriched<Nomenclature>) -> Self {
        let groups = purchase.groups.clone().unwrap_or_default();
        Self {
            id: purchase.record.id.clone(),
            nomcode: purchase.record.nomcode.clone(),
            m_group: groups.m_group,
            ph_group: groups.ph_group,
            catalog_id: None,
            bonus: None,
        }
    }

    pub fn with_match(mut self, catalog_id: String, bonus: BigDecimal) -> Self {
        self.catalog_id = Some(catalog_id);
        self.bonus = Some(bonus);
        self
    }

    pub fn is_matched(&self) -> bool {
        self.catalog_id.is_some()
    }
}
