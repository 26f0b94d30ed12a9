use thiserror::Error;

/// 错误分类 (决定编排层是否转换为哨兵字符串)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Schema,
    Lookup,
    Upstream,
}

/// 模块匹配错误
///
/// 前六个变体的 Display 即对外哨兵字符串，不可改动。
#[derive(Error, Debug)]
pub enum MatchingError {
    #[error("error: endpoint must be uuid")]
    InvalidEndpoint { value: String },

    #[error("error: db")]
    Db(#[from] sqlx::Error),

    #[error("error: no bonus")]
    NoBonus,

    #[error("error: none bonus")]
    NoneBonus,

    #[error("error: no noms")]
    NoNoms,

    #[error("error: {code} storage")]
    Storage { code: String },

    #[error("schema error: table '{table}', column '{column}': {detail}")]
    Schema {
        table: &'static str,
        column: &'static str,
        detail: String,
    },

    #[error("lookup error: accepted candidate '{catalog_id}' is not in the catalog")]
    Lookup { catalog_id: String },

    #[error("model error: {0}")]
    Model(String),

    #[error("matcher error: {0}")]
    Matcher(String),
}

impl MatchingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidEndpoint { .. } => ErrorKind::Validation,
            Self::Schema { .. } => ErrorKind::Schema,
            Self::Lookup { .. } => ErrorKind::Lookup,
            Self::Db(_)
            | Self::NoBonus
            | Self::NoneBonus
            | Self::NoNoms
            | Self::Storage { .. }
            | Self::Model(_)
            | Self::Matcher(_) => ErrorKind::Upstream,
        }
    }

    /// 是否在编排层转换为哨兵字符串 (Schema / Lookup 必须向上抛出)
    pub fn is_sentinel(&self) -> bool {
        matches!(self.kind(), ErrorKind::Validation | ErrorKind::Upstream)
    }

    pub(crate) fn schema(
        table: &'static str,
        column: &'static str,
        detail: impl Into<String>,
    ) -> Self {
        Self::Schema {
            table,
            column,
            detail: detail.into(),
        }
    }
}

pub type MatchingResult<T> = Result<T, MatchingError>;
