use crate::error::{MatchingError, MatchingResult};
use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use std::collections::HashSet;
use std::str::FromStr;

/// 客户商品名录行 (test 表)
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Nomenclature {
    pub id: String,
    #[serde(rename = "x")]
    pub text: String,
    pub nomcode: Option<String>,
}

/// 奖金SKU行 (train 表)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusSku {
    pub id: String,
    #[serde(rename = "x", default)]
    pub text: String,
    #[serde(default, deserialize_with = "de_bonus")]
    pub bonus: Option<BigDecimal>,
}

/// 可供模型预测的行 (带自由文本)
pub trait NomenclatureText {
    fn id(&self) -> &str;
    fn text(&self) -> &str;
}

impl NomenclatureText for Nomenclature {
    fn id(&self) -> &str {
        &self.id
    }

    fn text(&self) -> &str {
        &self.text
    }
}

impl NomenclatureText for BonusSku {
    fn id(&self) -> &str {
        &self.id
    }

    fn text(&self) -> &str {
        &self.text
    }
}

impl AsRef<BonusSku> for BonusSku {
    fn as_ref(&self) -> &BonusSku {
        self
    }
}

/// 模块组 / 药房组
///
/// `m_group == None` 即“无组”哨兵。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupAssignment {
    pub m_group: Option<String>,
    pub ph_group: Option<String>,
}

/// 经模型补充属性后的行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Enriched<T> {
    #[serde(flatten)]
    pub record: T,
    pub trail: String,
    #[serde(rename = "m_preds")]
    pub manufacturer_id: i64,
    /// 仅 test 表在 `with_groups` 时填充
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub groups: Option<GroupAssignment>,
}

impl<T> AsRef<T> for Enriched<T> {
    fn as_ref(&self) -> &T {
        &self.record
    }
}

/// 解析奖金金额：空串视为缺失，负数或非数字为 Schema 错误
pub fn parse_bonus(raw: &str) -> MatchingResult<Option<BigDecimal>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value = BigDecimal::from_str(trimmed)
        .map_err(|e| MatchingError::schema("catalog", "bonus", format!("'{}': {}", trimmed, e)))?;
    if value < BigDecimal::zero() {
        return Err(MatchingError::schema(
            "catalog",
            "bonus",
            format!("negative amount '{}'", trimmed),
        ));
    }
    Ok(Some(value))
}

/// JSON 中的金额：字符串或数字
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum RawBonus {
    Text(String),
    Number(serde_json::Number),
}

impl RawBonus {
    pub(crate) fn into_decimal(self) -> MatchingResult<Option<BigDecimal>> {
        match self {
            RawBonus::Text(s) => parse_bonus(&s),
            RawBonus::Number(n) => parse_bonus(&n.to_string()),
        }
    }
}

/// 奖金字段既可能是字符串也可能是数字
pub(crate) fn de_bonus<'de, D>(deserializer: D) -> Result<Option<BigDecimal>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawBonus>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => raw.into_decimal().map_err(serde::de::Error::custom),
    }
}

/// 校验同一张表内 id 唯一
pub(crate) fn ensure_unique_ids<'a, I>(table: &'static str, ids: I) -> MatchingResult<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(MatchingError::schema(table, "id", format!("duplicate id '{}'", id)));
        }
    }
    Ok(())
}
