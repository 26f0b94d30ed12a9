pub mod nomenclature;
pub mod result;
pub mod stats;

pub use nomenclature::{
    parse_bonus, BonusSku, Enriched, GroupAssignment, Nomenclature,
    NomenclatureText,
};
pub use result::MatchResult;
pub use stats::StatisticsReport;
