//! Shared models of the broker tier.
//!
//! These are the values that travel between the statement router, the distributed metadata
//! store and the query engines: database descriptors, storage cluster configuration, the elected
//! master, field metadata and query result sets. All of them serialize to the JSON shape that is
//! persisted in the metadata store and returned to clients.

pub mod database;
pub mod field;
pub mod master;
pub mod result;
pub mod storage;

pub use database::{Database, DatabaseSchema};
pub use field::{FieldType, Meta};
pub use master::{BrokerNode, Master};
pub use result::{ResultSet, Series};
pub use storage::{
    ConfigValidationError, RepoConfig, StorageCluster, StorageClusterSummary, StorageNode,
    StorageState, StorageStatus,
};
