//! In-process implementations of the metadata store and the broker's local state.
//!
//! [`MemRepository`] honours the same contract as a networked repository, including the
//! conditional put and the closed-handle behaviour, so it can back a single node broker or be
//! used wherever a real store is not available.
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use broker_types::{Master, RepoConfig, StorageState};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use crate::{
    KeyValue, MasterController, Precondition, Repository, RepositoryError, RepositoryFactory,
    Result, StateManager,
};

type Store = Arc<Mutex<BTreeMap<String, Vec<u8>>>>;

#[derive(Debug, Default)]
pub struct MemRepository {
    store: Store,
    closed: AtomicBool,
}

impl MemRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_store(store: Store) -> Self {
        Self {
            store,
            closed: AtomicBool::new(false),
        }
    }

    fn check_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(RepositoryError::Closed);
        }
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[async_trait]
impl Repository for MemRepository {
    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.check_open()?;
        self.store
            .lock()
            .get(key)
            .cloned()
            .ok_or_else(|| RepositoryError::KeyNotFound {
                key: key.to_string(),
            })
    }

    async fn list(&self, prefix: &str) -> Result<Vec<KeyValue>> {
        self.check_open()?;
        let store = self.store.lock();
        Ok(store
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| KeyValue::new(k.clone(), v.clone()))
            .collect())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.check_open()?;
        self.store.lock().insert(key.to_string(), value);
        Ok(())
    }

    async fn put_with_tx(
        &self,
        key: &str,
        value: Vec<u8>,
        precondition: Precondition,
    ) -> Result<bool> {
        self.check_open()?;
        let mut store = self.store.lock();
        if !precondition.holds(store.get(key).map(Vec::as_slice)) {
            debug!(key, ?precondition, "conditional put rejected");
            return Ok(false);
        }
        store.insert(key.to_string(), value);
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.check_open()?;
        self.store.lock().remove(key);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Err(RepositoryError::Closed);
        }
        Ok(())
    }
}

/// Opens [`MemRepository`] handles; handles opened for the same namespace share their data.
#[derive(Debug, Default)]
pub struct MemRepositoryFactory {
    namespaces: Mutex<HashMap<String, Store>>,
}

impl MemRepositoryFactory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RepositoryFactory for MemRepositoryFactory {
    async fn create_storage_repo(&self, config: &RepoConfig) -> Result<Box<dyn Repository>> {
        let store = Arc::clone(
            self.namespaces
                .lock()
                .entry(config.namespace.clone())
                .or_default(),
        );
        Ok(Box::new(MemRepository::with_store(store)))
    }
}

/// Holds the master elected by the local election participant.
#[derive(Debug, Default)]
pub struct LocalMasterController {
    master: RwLock<Option<Master>>,
}

impl LocalMasterController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_master(&self, master: Option<Master>) {
        match &master {
            Some(m) => info!(
                master = %m.node.indicator(),
                elect_time = m.elect_time,
                "master elected"
            ),
            None => info!("master lost"),
        }
        *self.master.write() = master;
    }
}

impl MasterController for LocalMasterController {
    fn get_master(&self) -> Option<Master> {
        self.master.read().clone()
    }
}

/// Live storage cluster state maintained from metadata store watch events.
#[derive(Debug, Default)]
pub struct LocalStateManager {
    storages: RwLock<HashMap<String, StorageState>>,
}

impl LocalStateManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_storage_state_change(&self, state: StorageState) {
        self.storages.write().insert(state.name.clone(), state);
    }

    pub fn on_storage_delete(&self, name: &str) {
        self.storages.write().remove(name);
    }
}

impl StateManager for LocalStateManager {
    fn get_storage(&self, name: &str) -> Option<StorageState> {
        self.storages.read().get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use broker_types::StorageStatus;

    use super::*;

    #[tokio::test]
    async fn list_by_prefix() {
        let repo = MemRepository::new();
        repo.put("/a/1", b"1".to_vec()).await.unwrap();
        repo.put("/a/2", b"2".to_vec()).await.unwrap();
        repo.put("/b/1", b"3".to_vec()).await.unwrap();

        let listed = repo.list("/a").await.unwrap();
        assert_eq!(
            listed,
            vec![KeyValue::new("/a/1", "1"), KeyValue::new("/a/2", "2")]
        );
        assert_eq!(repo.get("/b/1").await.unwrap(), b"3");
        assert!(matches!(
            repo.get("/c").await,
            Err(RepositoryError::KeyNotFound { .. })
        ));

        repo.delete("/a/1").await.unwrap();
        assert_eq!(repo.list("/a").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn put_with_tx() {
        let repo = MemRepository::new();
        assert!(
            repo.put_with_tx("k", b"v1".to_vec(), Precondition::KeyAbsent)
                .await
                .unwrap()
        );
        assert!(
            !repo
                .put_with_tx("k", b"v2".to_vec(), Precondition::KeyAbsent)
                .await
                .unwrap()
        );
        assert_eq!(repo.get("k").await.unwrap(), b"v1");

        assert!(
            repo.put_with_tx(
                "k",
                b"v2".to_vec(),
                Precondition::ValueEquals(b"v1".to_vec())
            )
            .await
            .unwrap()
        );
        assert_eq!(repo.get("k").await.unwrap(), b"v2");
    }

    #[tokio::test]
    async fn closed_repository_rejects_calls() {
        let repo = MemRepository::new();
        repo.close().await.unwrap();
        assert!(repo.is_closed());
        assert!(matches!(repo.list("/").await, Err(RepositoryError::Closed)));
        assert!(matches!(repo.close().await, Err(RepositoryError::Closed)));
    }

    #[tokio::test]
    async fn factory_shares_namespace() {
        let factory = MemRepositoryFactory::new();
        let config = RepoConfig {
            namespace: "cluster".to_string(),
            ..Default::default()
        };
        let first = factory.create_storage_repo(&config).await.unwrap();
        first.put("/k", b"v".to_vec()).await.unwrap();
        first.close().await.unwrap();

        let second = factory.create_storage_repo(&config).await.unwrap();
        assert_eq!(second.get("/k").await.unwrap(), b"v");

        let other = factory
            .create_storage_repo(&RepoConfig {
                namespace: "other".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(other.list("/").await.unwrap().is_empty());
    }

    #[test]
    fn local_state() {
        let master = LocalMasterController::new();
        assert!(master.get_master().is_none());
        master.set_master(Some(Master::default()));
        assert_eq!(master.get_master(), Some(Master::default()));

        let state_mgr = LocalStateManager::new();
        state_mgr.on_storage_state_change(StorageState {
            name: "s".to_string(),
            status: StorageStatus::Ready,
            live_nodes: vec![],
        });
        assert_eq!(
            state_mgr.get_storage("s").map(|s| s.status),
            Some(StorageStatus::Ready)
        );
        state_mgr.on_storage_delete("s");
        assert!(state_mgr.get_storage("s").is_none());
    }
}
