use crate::error::{MatchingError, MatchingResult};
use crate::models::nomenclature::ensure_unique_ids;
use crate::models::{BonusSku, MatchResult, StatisticsReport};
use bigdecimal::{BigDecimal, Zero};
use indexmap::IndexSet;
use std::collections::{HashMap, HashSet};

/// 模块分组 (相对普通类目分组) 的保留前缀
pub const MODULE_GROUP_PREFIX: &str = "9000";

/// 统计模块匹配结果
///
/// 奖金表按三类划分：未出现在名录中、已匹配但无组、已匹配且有组。
/// `s_bon+` 按结果行累加 (同一SKU被多行匹配时重复计入)，另外两类
/// 按去重后的SKU从奖金表取值，因此三类之和不一定等于 `s_bon`。
pub fn reconcile<C>(
    endpoint: &str,
    results: &[MatchResult],
    catalog: &[C],
) -> MatchingResult<StatisticsReport>
where
    C: AsRef<BonusSku>,
{
    ensure_unique_ids("catalog", catalog.iter().map(|c| c.as_ref().id.as_str()))?;

    let catalog = catalog
        .iter()
        .map(|c| {
            let sku = c.as_ref();
            sku.bonus
                .as_ref()
                .map(|bonus| (sku.id.as_str(), bonus))
                .ok_or_else(|| {
                    let detail = format!("row '{}' has no bonus", sku.id);
                    MatchingError::schema("catalog", "bonus", detail)
                })
        })
        .collect::<MatchingResult<Vec<_>>>()?;

    let mask = grouped_mask(results);

    let n_mg_nom = results
        .iter()
        .filter(|r| r.m_group.as_deref().is_some_and(|g| g.starts_with(MODULE_GROUP_PREFIX)))
        .count();
    let n_phg_nom = results.iter().filter(|r| r.ph_group.is_some()).count();

    let grouped_rows = || results.iter().zip(&mask).filter(|(_, g)| **g).map(|(r, _)| r);
    let grouped_ids: IndexSet<&str> = grouped_rows()
        .filter_map(|r| r.catalog_id.as_deref())
        .collect();
    let s_bon_grouped = round_sum(grouped_rows().filter_map(|r| r.bonus.as_ref()));

    let matched_ids: HashSet<&str> = results
        .iter()
        .filter_map(|r| r.catalog_id.as_deref())
        .collect();
    let unmatched: Vec<&BigDecimal> = catalog
        .iter()
        .filter(|(id, _)| !matched_ids.contains(id))
        .map(|(_, bonus)| *bonus)
        .collect();

    let ungrouped_ids: IndexSet<&str> = results
        .iter()
        .zip(&mask)
        .filter(|(_, g)| !**g)
        .filter_map(|(r, _)| r.catalog_id.as_deref())
        .collect();
    let s_bon_ungrouped = round_sum(
        catalog
            .iter()
            .filter(|(id, _)| ungrouped_ids.contains(id))
            .map(|(_, bonus)| *bonus),
    );

    Ok(StatisticsReport {
        endpoint: endpoint.to_string(),
        n_nom: results.len(),
        n_bon: catalog.len(),
        s_bon: round_sum(catalog.iter().map(|(_, bonus)| *bonus)),
        n_mg_nom,
        n_phg_nom,
        n_bon_grouped: grouped_ids.len(),
        s_bon_grouped,
        n_bon_unmatched: unmatched.len(),
        s_bon_unmatched: round_sum(unmatched.into_iter()),
        n_bon_ungrouped: ungrouped_ids.len(),
        s_bon_ungrouped,
    })
}

/// 有组名录行：`m_group` 不是“无组”，且至少出现两次
pub fn grouped_mask(results: &[MatchResult]) -> Vec<bool> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for group in results.iter().filter_map(|r| r.m_group.as_deref()) {
        *counts.entry(group).or_default() += 1;
    }
    results
        .iter()
        .map(|r| {
            r.m_group
                .as_deref()
                .and_then(|g| counts.get(g))
                .is_some_and(|n| *n >= 2)
        })
        .collect()
}

/// 全精度累加，最后一次性保留两位小数
fn round_sum<'a, I>(values: I) -> BigDecimal
where
    I: Iterator<Item = &'a BigDecimal>,
{
    values.fold(BigDecimal::zero(), |acc, v| acc + v).round(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn row(id: &str, m_group: Option<&str>, y: Option<&str>, bonus: Option<&str>) -> MatchResult {
        MatchResult {
            id: id.into(),
            nomcode: None,
            m_group: m_group.map(Into::into),
            ph_group: None,
            catalog_id: y.map(Into::into),
            bonus: bonus.map(dec),
        }
    }

    fn sku(id: &str, bonus: &str) -> BonusSku {
        BonusSku {
            id: id.into(),
            text: String::new(),
            bonus: Some(dec(bonus)),
        }
    }

    #[test]
    fn mask_excludes_singletons_and_absent_groups() {
        let results = vec![
            row("0", Some("90000"), None, None),
            row("1", Some("90000"), None, None),
            row("2", Some("5"), None, None),
            row("3", None, None, None),
            row("4", None, None, None),
        ];
        assert_eq!(grouped_mask(&results), vec![true, true, false, false, false]);
    }

    #[test]
    fn sums_round_once_at_the_end() {
        let catalog = vec![sku("a", "0.333"), sku("b", "0.333"), sku("c", "0.004")];
        let report = reconcile("e", &[], &catalog).unwrap();
        // 0.67 (先累加 0.670 再舍入)，逐项舍入会得到 0.66
        assert_eq!(report.s_bon.to_string(), "0.67");
        assert_eq!(report.s_bon_unmatched.to_string(), "0.67");
        assert_eq!(report.n_bon_unmatched, 3);
    }

    #[test]
    fn duplicate_grouped_matches_are_row_summed() {
        let catalog = vec![sku("a", "10"), sku("b", "5")];
        let results = vec![
            row("0", Some("90001"), Some("a"), Some("10")),
            row("1", Some("90001"), Some("a"), Some("10")),
        ];
        let report = reconcile("e", &results, &catalog).unwrap();
        assert_eq!(report.n_bon_grouped, 1);
        assert_eq!(report.s_bon_grouped, dec("20"));
        assert_eq!(report.n_bon_unmatched, 1);
        assert_eq!(report.s_bon_unmatched, dec("5"));
        assert_eq!(report.n_bon_ungrouped, 0);
        assert_eq!(report.s_bon_ungrouped, dec("0"));
    }

    #[test]
    fn ungrouped_sum_comes_from_catalog_once_per_id() {
        let catalog = vec![sku("a", "7.5")];
        let results = vec![
            row("0", Some("1"), Some("a"), Some("7.5")),
            row("1", Some("2"), Some("a"), Some("7.5")),
        ];
        let report = reconcile("e", &results, &catalog).unwrap();
        assert_eq!(report.n_bon_ungrouped, 1);
        assert_eq!(report.s_bon_ungrouped, dec("7.5"));
    }

    #[test]
    fn catalog_without_bonus_is_schema_error() {
        let catalog = vec![BonusSku {
            id: "a".into(),
            text: String::new(),
            bonus: None,
        }];
        let err = reconcile("e", &[], &catalog).unwrap_err();
        assert!(matches!(err, MatchingError::Schema { column: "bonus", .. }));
    }

    #[test]
    fn duplicate_catalog_ids_are_schema_error() {
        let catalog = vec![sku("a", "10"), sku("b", "5"), sku("a", "10")];
        let err = reconcile("e", &[], &catalog).unwrap_err();
        assert!(matches!(err, MatchingError::Schema { table: "catalog", column: "id", .. }));
    }
}
