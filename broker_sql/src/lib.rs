//! Statements understood by the broker.
//!
//! The broker does not own the query language grammar. A [`StatementParser`] is handed to the
//! executor at construction time and turns request text into a [`Statement`]; everything past
//! that point works on the typed representation defined here.
use std::fmt::Debug;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },

    #[error("unsupported statement: {0}")]
    Unsupported(String),
}

/// Turns query language text into a [`Statement`].
pub trait StatementParser: Debug + Send + Sync + 'static {
    fn parse(&self, sql: &str) -> Result<Statement, ParseError>;
}

/// A parsed client request.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `show master`
    ShowMaster,
    /// `show databases`
    ShowDatabases,
    /// `show schemas`
    ShowSchemas,
    /// `select ... from <metric> ...`
    Query(Query),
    /// `show namespaces`, `show metrics`, `show tag keys`, `show tag values`, `show fields`
    Metadata(Metadata),
    /// `show storages`, `create storage <config>`, `drop storage <name>`
    Storage(StorageStatement),
    /// `use <database>`
    Use { name: String },
    /// `show <kind> state`
    State(StateKind),
    Unknown,
}

impl Statement {
    /// A short, stable name of the statement family.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ShowMaster => "show_master",
            Self::ShowDatabases => "show_databases",
            Self::ShowSchemas => "show_schemas",
            Self::Query(_) => "query",
            Self::Metadata(_) => "metadata",
            Self::Storage(_) => "storage",
            Self::Use { .. } => "use",
            Self::State(_) => "state",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRange {
    pub start: i64,
    pub end: i64,
}

/// A metric data query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub namespace: String,
    pub metric_name: String,
    pub select_items: Vec<String>,
    pub condition: Option<String>,
    pub group_by: Vec<String>,
    pub interval: Option<Duration>,
    pub time_range: TimeRange,
    pub limit: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MetadataType {
    #[default]
    Unknown,
    Namespace,
    Metric,
    TagKey,
    TagValue,
    Field,
}

/// A metadata lookup against a database.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub metadata_type: MetadataType,
    pub namespace: String,
    pub metric_name: String,
    pub tag_key: String,
    pub prefix: String,
    pub condition: Option<String>,
    pub limit: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageOp {
    #[default]
    Unknown,
    List,
    Create,
    Delete,
}

/// Storage cluster administration. `value` carries the JSON config for create and the cluster
/// name for delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageStatement {
    pub op: StorageOp,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateKind {
    Master,
    Broker,
    Storage,
    Replication,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        assert_eq!(Statement::ShowMaster.name(), "show_master");
        assert_eq!(Statement::Query(Query::default()).name(), "query");
        assert_eq!(
            Statement::Storage(StorageStatement::default()).name(),
            "storage"
        );
        assert_eq!(Statement::State(StateKind::Broker).name(), "state");
        assert_eq!(MetadataType::default(), MetadataType::Unknown);
        assert_eq!(StorageOp::default(), StorageOp::Unknown);
    }
}
