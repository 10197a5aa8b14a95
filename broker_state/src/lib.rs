//! Access to the distributed, strongly consistent metadata store.
//!
//! The broker never talks to the metadata store directly. It goes through a [`Repository`],
//! which offers list/get/put and a conditional put ([`Repository::put_with_tx`]), and a
//! [`RepositoryFactory`] that opens a dedicated repository handle for a storage cluster. Local
//! views of the cluster (the elected master, the live state of each storage cluster) come from a
//! [`MasterController`] and a [`StateManager`].
//!
//! [`memory`] contains an in-process implementation of the store and [`mock`] contains
//! programmable test doubles.
use std::fmt::Debug;

use anyhow::anyhow;
use async_trait::async_trait;
use broker_types::{Master, RepoConfig, StorageState};

pub mod memory;
pub mod mock;
pub mod paths;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("key not found: {key}")]
    KeyNotFound { key: String },

    #[error("repository is closed")]
    Closed,

    #[error("unexpected error: {0:?}")]
    Unexpected(#[from] anyhow::Error),
}

impl RepositoryError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(anyhow!(message.into()))
    }
}

pub type Result<T, E = RepositoryError> = std::result::Result<T, E>;

/// A raw entry of the metadata store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<u8>,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Condition that must hold on the stored value for a conditional put to be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precondition {
    /// The key must not exist yet.
    KeyAbsent,
    /// The key must exist and hold exactly this value.
    ValueEquals(Vec<u8>),
}

impl Precondition {
    pub fn holds(&self, current: Option<&[u8]>) -> bool {
        match (self, current) {
            (Self::KeyAbsent, None) => true,
            (Self::KeyAbsent, Some(_)) => false,
            (Self::ValueEquals(expected), Some(current)) => expected.as_slice() == current,
            (Self::ValueEquals(_), None) => false,
        }
    }
}

/// Handle onto a namespace of the metadata store.
///
/// Every call may block on the network; callers must not hold local locks across them.
#[async_trait]
pub trait Repository: Debug + Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// All entries whose key starts with `prefix`.
    async fn list(&self, prefix: &str) -> Result<Vec<KeyValue>>;

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Put `value` under `key` if `precondition` holds.
    ///
    /// Returns `Ok(false)` when the precondition did not hold and nothing was written.
    async fn put_with_tx(
        &self,
        key: &str,
        value: Vec<u8>,
        precondition: Precondition,
    ) -> Result<bool>;

    async fn delete(&self, key: &str) -> Result<()>;

    /// Release the handle. Further calls fail with [`RepositoryError::Closed`].
    async fn close(&self) -> Result<()>;
}

/// Opens repository handles scoped to a storage cluster's own metadata store.
#[async_trait]
pub trait RepositoryFactory: Debug + Send + Sync + 'static {
    async fn create_storage_repo(&self, config: &RepoConfig) -> Result<Box<dyn Repository>>;
}

/// Oracle of the master election.
pub trait MasterController: Debug + Send + Sync + 'static {
    /// The elected master, `None` while no master is elected.
    fn get_master(&self) -> Option<Master>;
}

/// The broker's live view of the storage clusters.
pub trait StateManager: Debug + Send + Sync + 'static {
    fn get_storage(&self, name: &str) -> Option<StorageState>;
}
