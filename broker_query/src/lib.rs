//! Entry points into the distributed query engines.
//!
//! The executor asks a [`QueryFactory`] for a query handle bound to one statement execution and
//! then waits on it. The handle owns the fan-out to the storage nodes; its wait is bounded by the
//! timeout in the [`QueryContext`] it was created with.
use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use broker_sql::{Metadata, Query};
use broker_types::ResultSet;

pub mod mock;

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("database not found: {db_name}")]
    DatabaseNotFound { db_name: String },

    #[error("query timed out after {0:?}")]
    Timeout(Duration),

    #[error("query execution failed: {0:?}")]
    Execution(#[from] anyhow::Error),
}

/// Per execution settings handed to the query engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryContext {
    pub database: String,
    pub timeout: Duration,
}

/// Handle onto a running metric data query.
#[async_trait]
pub trait MetricQuery: Debug + Send {
    async fn wait_response(&mut self) -> Result<ResultSet, QueryError>;
}

/// Handle onto a running metadata query. Each returned string is one engine specific
/// serialized answer.
#[async_trait]
pub trait MetadataQuery: Debug + Send {
    async fn wait_response(&mut self) -> Result<Vec<String>, QueryError>;
}

pub trait QueryFactory: Debug + Send + Sync + 'static {
    fn new_metric_query(&self, ctx: QueryContext, statement: &Query) -> Box<dyn MetricQuery>;

    fn new_metadata_query(&self, ctx: QueryContext, statement: &Metadata)
    -> Box<dyn MetadataQuery>;
}
