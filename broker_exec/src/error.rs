use std::time::Duration;

use broker_query::QueryError;
use broker_sql::ParseError;
use broker_state::RepositoryError;
use broker_types::storage::ConfigValidationError;
use http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ExecuteError {
    #[error("invalid execute request: {0}")]
    InvalidRequest(String),

    #[error("failed to parse statement: {0}")]
    Parse(#[from] ParseError),

    #[error("database name cannot be empty")]
    DatabaseNameRequired,

    #[error("master not found")]
    MasterNotFound,

    #[error("metadata type not supported")]
    UnsupportedMetadataType,

    #[error("storage operation not supported")]
    UnsupportedStorageOp,

    #[error("statement not supported: {0}")]
    UnsupportedStatement(&'static str),

    #[error("metadata store error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("failed to decode storage cluster config")]
    DecodeStorageConfig(#[source] serde_json::Error),

    #[error("failed to decode storage cluster config stored under {key}")]
    DecodeStorageEntry {
        key: String,
        source: serde_json::Error,
    },

    #[error("failed to encode storage cluster config")]
    EncodeStorageConfig(#[source] serde_json::Error),

    #[error("invalid storage cluster config: {0}")]
    InvalidStorageConfig(#[from] ConfigValidationError),

    #[error("storage cluster {name} already exists")]
    StorageExists { name: String },

    #[error("storage cluster name cannot be empty")]
    StorageNameRequired,

    #[error("query failed: {0}")]
    Query(#[from] QueryError),

    #[error("failed to decode field metadata")]
    DecodeFields(#[source] serde_json::Error),

    #[error("too many concurrent queries, no slot freed within {0:?}")]
    TooManyQueries(Duration),
}

/// Coarse classification of an [`ExecuteError`], as seen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The statement was understood but has no handler.
    NotFound,
    Internal,
}

impl ExecuteError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MasterNotFound
            | Self::UnsupportedMetadataType
            | Self::UnsupportedStorageOp
            | Self::UnsupportedStatement(_) => ErrorKind::NotFound,
            Self::InvalidRequest(_)
            | Self::Parse(_)
            | Self::DatabaseNameRequired
            | Self::Repository(_)
            | Self::DecodeStorageConfig(_)
            | Self::DecodeStorageEntry { .. }
            | Self::EncodeStorageConfig(_)
            | Self::InvalidStorageConfig(_)
            | Self::StorageExists { .. }
            | Self::StorageNameRequired
            | Self::Query(_)
            | Self::DecodeFields(_)
            | Self::TooManyQueries(_) => ErrorKind::Internal,
        }
    }

    /// True for internal errors caused by what the caller sent rather than by a dependency.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest(_)
                | Self::Parse(_)
                | Self::DatabaseNameRequired
                | Self::DecodeStorageConfig(_)
                | Self::InvalidStorageConfig(_)
                | Self::StorageExists { .. }
                | Self::StorageNameRequired
        )
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type Result<T, E = ExecuteError> = std::result::Result<T, E>;
