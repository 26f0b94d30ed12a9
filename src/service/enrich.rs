use crate::error::MatchingResult;
use crate::models::{Enriched, GroupAssignment, NomenclatureText};
use crate::service::model::PredictionModel;
use rayon::prelude::*;

/// 为原始行补充 trail 与厂商；`with_groups` 时再补模块组与药房组
///
/// 逐行预测并行执行，输出保持输入顺序与行数。
pub fn enrich<T>(
    records: Vec<T>,
    model: &dyn PredictionModel,
    with_groups: bool,
) -> MatchingResult<Vec<Enriched<T>>>
where
    T: NomenclatureText + Send,
{
    let total = records.len();
    let enriched = records
        .into_par_iter()
        .map(|record| {
            let prediction = model.predict(record.text()).map_err(|e| {
                tracing::warn!("Prediction failed for row {}: {}", record.id(), e);
                e
            })?;
            let groups = with_groups.then(|| GroupAssignment {
                m_group: model.module_group(&prediction.trail),
                ph_group: model.pharmacy_group(&prediction.trail),
            });
            Ok(Enriched {
                record,
                trail: prediction.trail,
                manufacturer_id: prediction.manufacturer_id,
                groups,
            })
        })
        .collect::<MatchingResult<Vec<_>>>()?;

    tracing::debug!("Enriched {} rows (groups: {})", total, with_groups);
    Ok(enriched)
}
