pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod service;
pub mod storage;

pub use config::AppConfig;
pub use db::{create_pool, PgMatchingSource};
pub use error::{ErrorKind, MatchingError, MatchingResult};
pub use service::{ModuleMatchingService, TrailMatcher};
pub use storage::StorageClient;
