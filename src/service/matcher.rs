use crate::error::MatchingResult;
use crate::models::{BonusSku, Enriched, Nomenclature};
use std::collections::HashMap;

/// 匹配器给出的置信度信号
///
/// 本模块只解释它是否等于 `NoMatch` 哨兵，分值本身不参与判断。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Confidence {
    /// "no-match" 哨兵
    NoMatch,
    Score(f64),
}

/// 单个 test 行的最佳候选
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub catalog_id: Option<String>,
    pub confidence: Confidence,
}

impl Candidate {
    pub fn new(catalog_id: Option<String>, confidence: Confidence) -> Self {
        Self {
            catalog_id,
            confidence,
        }
    }

    /// 采纳条件：置信度等于 `NoMatch` 哨兵。
    ///
    /// 注意这与直觉相反 (带分值的候选会被丢弃)，由 `tests/resolver.rs` 固定，
    /// 修改前需先确认上游匹配器的语义。
    pub fn is_accepted(&self) -> bool {
        self.confidence == Confidence::NoMatch
    }
}

/// 文本匹配器 (外部协作者)
///
/// 必须按 `purchases` 的顺序为每一行返回恰好一个候选。
pub trait Matcher: Send + Sync {
    fn best_candidates(
        &self,
        catalog: &[Enriched<BonusSku>],
        purchases: &[Enriched<Nomenclature>],
    ) -> MatchingResult<Vec<Candidate>>;
}

impl<F> Matcher for F
where
    F: Fn(&[Enriched<BonusSku>], &[Enriched<Nomenclature>]) -> MatchingResult<Vec<Candidate>>
        + Send
        + Sync,
{
    fn best_candidates(
        &self,
        catalog: &[Enriched<BonusSku>],
        purchases: &[Enriched<Nomenclature>],
    ) -> MatchingResult<Vec<Candidate>> {
        self(catalog, purchases)
    }
}

/// 按预测 trail 精确比对的默认匹配器
///
/// trail + 厂商一致得 1.0，仅 trail 一致得 0.5，找不到 (或 trail 为空) 时
/// 返回 `NoMatch`。
///
/// 这只是占位实现：按 `Candidate::is_accepted` 的采纳规则，它的候选永远
/// 不会挂上奖金。实际部署必须通过 `ModuleMatchingService::new` 注入自己的
/// 匹配器。
#[derive(Debug, Clone, Copy, Default)]
pub struct TrailMatcher;

impl Matcher for TrailMatcher {
    fn best_candidates(
        &self,
        catalog: &[Enriched<BonusSku>],
        purchases: &[Enriched<Nomenclature>],
    ) -> MatchingResult<Vec<Candidate>> {
        // 同一 trail 多个SKU时取第一个
        let mut by_trail_and_manuf: HashMap<(&str, i64), &str> = HashMap::new();
        let mut by_trail: HashMap<&str, &str> = HashMap::new();
        for sku in catalog.iter().filter(|s| !s.trail.is_empty()) {
            by_trail_and_manuf
                .entry((sku.trail.as_str(), sku.manufacturer_id))
                .or_insert(sku.record.id.as_str());
            by_trail
                .entry(sku.trail.as_str())
                .or_insert(sku.record.id.as_str());
        }

        let candidates = purchases
            .iter()
            .map(|p| {
                let key = (p.trail.as_str(), p.manufacturer_id);
                if let Some(id) = by_trail_and_manuf.get(&key) {
                    Candidate::new(Some(id.to_string()), Confidence::Score(1.0))
                } else if let Some(id) = by_trail.get(p.trail.as_str()) {
                    Candidate::new(Some(id.to_string()), Confidence::Score(0.5))
                } else {
                    Candidate::new(None, Confidence::NoMatch)
                }
            })
            .collect();

        Ok(candidates)
    }
}
