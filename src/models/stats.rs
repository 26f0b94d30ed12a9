use crate::models::nomenclature::RawBonus;
use bigdecimal::BigDecimal;
use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// 模块匹配统计 (字段名为对外约定)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsReport {
    pub endpoint: String,
    /// 名录行数
    pub n_nom: usize,
    /// 奖金表行数
    pub n_bon: usize,
    /// 奖金表总额
    #[serde(serialize_with = "ser_amount", deserialize_with = "de_amount")]
    pub s_bon: BigDecimal,
    /// 模块分组 (9000…) 的名录行数
    pub n_mg_nom: usize,
    /// 有药房组的名录行数
    pub n_phg_nom: usize,
    /// 有组名录中匹配到的不同奖金数
    #[serde(rename = "n_bon+")]
    pub n_bon_grouped: usize,
    /// 有组名录行的奖金和 (逐行累加)
    #[serde(rename = "s_bon+", serialize_with = "ser_amount", deserialize_with = "de_amount")]
    pub s_bon_grouped: BigDecimal,
    /// 未出现在名录中的奖金数
    #[serde(rename = "n_bon-")]
    pub n_bon_unmatched: usize,
    #[serde(rename = "s_bon-", serialize_with = "ser_amount", deserialize_with = "de_amount")]
    pub s_bon_unmatched: BigDecimal,
    /// 已匹配但无组的奖金数
    #[serde(rename = "n_bon-gr")]
    pub n_bon_ungrouped: usize,
    #[serde(rename = "s_bon-gr", serialize_with = "ser_amount", deserialize_with = "de_amount")]
    pub s_bon_ungrouped: BigDecimal,
}

/// 金额在 JSON 中输出为数字 (已舍入到两位小数)
fn ser_amount<S>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    // 经十进制文本转换，保证得到最接近的 f64
    let number = value
        .to_string()
        .parse::<f64>()
        .map_err(|e| ser::Error::custom(format!("amount {}: {}", value, e)))?;
    serializer.serialize_f64(number)
}

fn de_amount<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match RawBonus::deserialize(deserializer)? {
        RawBonus::Text(s) => s,
        RawBonus::Number(n) => n.to_string(),
    };
    BigDecimal::from_str(raw.trim()).map_err(de::Error::custom)
}

impl fmt::Display for StatisticsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "endpoint={} n_nom={} n_bon={} s_bon={} n_mg_nom={} n_phg_nom={} \
             n_bon+={} s_bon+={} n_bon-={} s_bon-={} n_bon-gr={} s_bon-gr={}",
            self.endpoint,
            self.n_nom,
            self.n_bon,
            self.s_bon,
            self.n_mg_nom,
            self.n_phg_nom,
            self.n_bon_grouped,
            self.s_bon_grouped,
            self.n_bon_unmatched,
            self.s_bon_unmatched,
            self.n_bon_ungrouped,
            self.s_bon_ungrouped,
        )
    }
}
