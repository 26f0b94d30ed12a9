use crate::error::{MatchingError, MatchingResult};
use crate::models::nomenclature::ensure_unique_ids;
use crate::models::{BonusSku, Enriched, MatchResult, Nomenclature};
use crate::service::matcher::Matcher;
use bigdecimal::BigDecimal;
use std::collections::HashMap;

/// 将 test 行与奖金表 (train) 对照，返回逐行匹配结果
///
/// 结果与 `purchases` 一一对应、顺序一致。仅被采纳的候选会带上
/// `catalog_id` 与奖金表中该行的 `bonus`。
pub fn resolve(
    catalog: &[Enriched<BonusSku>],
    purchases: &[Enriched<Nomenclature>],
    matcher: &dyn Matcher,
) -> MatchingResult<Vec<MatchResult>> {
    ensure_unique_ids("catalog", catalog.iter().map(|c| c.record.id.as_str()))?;
    ensure_unique_ids("purchases", purchases.iter().map(|p| p.record.id.as_str()))?;

    let mut bonus_map: HashMap<&str, &BigDecimal> = HashMap::with_capacity(catalog.len());
    for sku in catalog {
        let bonus = sku.record.bonus.as_ref().ok_or_else(|| {
            let detail = format!("row '{}' has no bonus", sku.record.id);
            MatchingError::schema("catalog", "bonus", detail)
        })?;
        bonus_map.insert(sku.record.id.as_str(), bonus);
    }

    if let Some(p) = purchases.iter().find(|p| p.groups.is_none()) {
        return Err(MatchingError::schema(
            "purchases",
            "m_group",
            format!("row '{}' was enriched without groups", p.record.id),
        ));
    }

    let candidates = matcher.best_candidates(catalog, purchases)?;
    if candidates.len() != purchases.len() {
        return Err(MatchingError::Matcher(format!(
            "expected {} candidates, got {}",
            purchases.len(),
            candidates.len()
        )));
    }

    let mut accepted = 0usize;
    let results = purchases
        .iter()
        .zip(candidates)
        .map(|(purchase, candidate)| {
            let row = MatchResult::unmatched(purchase);
            if !candidate.is_accepted() {
                return Ok(row);
            }
            let Some(catalog_id) = candidate.catalog_id else {
                return Ok(row);
            };
            let bonus = bonus_map.get(catalog_id.as_str()).copied().ok_or_else(|| {
                tracing::error!(
                    "Accepted candidate {} for row {} is not in the catalog",
                    catalog_id,
                    purchase.record.id
                );
                MatchingError::Lookup {
                    catalog_id: catalog_id.clone(),
                }
            })?;
            accepted += 1;
            Ok(row.with_match(catalog_id, bonus.clone()))
        })
        .collect::<MatchingResult<Vec<_>>>()?;

    tracing::info!(
        "Resolved {} purchase rows against {} bonus SKUs, {} accepted",
        purchases.len(),
        catalog.len(),
        accepted
    );
    Ok(results)
}
