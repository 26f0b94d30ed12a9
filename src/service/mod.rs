pub mod enrich;
pub mod matcher;
pub mod model;
pub mod pipeline;
pub mod reconcile;
pub mod resolver;

pub use enrich::enrich;
pub use matcher::{Candidate, Confidence, Matcher, TrailMatcher};
pub use model::{DictionaryModel, ModelFactory, Prediction, PredictionModel};
pub use pipeline::{
    effective_bonus_percent, normalize_endpoint, MatchingOutcome, ModuleMatchingService,
};
pub use reconcile::{grouped_mask, reconcile, MODULE_GROUP_PREFIX};
pub use resolver::resolve;
