//! Maps a statement onto what the executor has to do for it.
use broker_sql::{Metadata, Query, Statement, StorageStatement};

/// The handler family a statement is routed to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent<'a> {
    MasterState,
    ListDatabases,
    ListSchemas,
    MetricQuery(&'a Query),
    MetadataQuery(&'a Metadata),
    StorageAdmin(&'a StorageStatement),
    /// Parsed, but no handler exists. Carries the statement name.
    Unsupported(&'static str),
}

impl Intent<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::MasterState => "master_state",
            Self::ListDatabases => "list_databases",
            Self::ListSchemas => "list_schemas",
            Self::MetricQuery(_) => "metric_query",
            Self::MetadataQuery(_) => "metadata_query",
            Self::StorageAdmin(_) => "storage_admin",
            Self::Unsupported(_) => "unsupported",
        }
    }
}

pub fn classify(statement: &Statement) -> Intent<'_> {
    match statement {
        Statement::ShowMaster => Intent::MasterState,
        Statement::ShowDatabases => Intent::ListDatabases,
        Statement::ShowSchemas => Intent::ListSchemas,
        Statement::Query(query) => Intent::MetricQuery(query),
        Statement::Metadata(metadata) => Intent::MetadataQuery(metadata),
        Statement::Storage(storage) => Intent::StorageAdmin(storage),
        other => Intent::Unsupported(other.name()),
    }
}

#[cfg(test)]
mod tests {
    use broker_sql::{MetadataType, StateKind, StorageOp};

    use super::*;

    #[test]
    fn routed_statements() {
        assert_eq!(classify(&Statement::ShowMaster), Intent::MasterState);
        assert_eq!(classify(&Statement::ShowDatabases), Intent::ListDatabases);
        assert_eq!(classify(&Statement::ShowSchemas), Intent::ListSchemas);

        let query = Query {
            metric_name: "cpu".to_string(),
            ..Default::default()
        };
        assert_eq!(
            classify(&Statement::Query(query.clone())),
            Intent::MetricQuery(&query)
        );

        let metadata = Metadata {
            metadata_type: MetadataType::Field,
            ..Default::default()
        };
        assert_eq!(
            classify(&Statement::Metadata(metadata.clone())),
            Intent::MetadataQuery(&metadata)
        );

        let storage = StorageStatement {
            op: StorageOp::List,
            value: String::new(),
        };
        let statement = Statement::Storage(storage.clone());
        let intent = classify(&statement);
        assert_eq!(intent, Intent::StorageAdmin(&storage));
        assert_eq!(intent.name(), "storage_admin");
    }

    #[test]
    fn unrouted_statements() {
        for (statement, name) in [
            (
                Statement::Use {
                    name: "db".to_string(),
                },
                "use",
            ),
            (Statement::State(StateKind::Master), "state"),
            (Statement::Unknown, "unknown"),
        ] {
            assert_eq!(classify(&statement), Intent::Unsupported(name));
        }
    }
}
