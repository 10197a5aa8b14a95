//! Programmable [`Repository`] and [`RepositoryFactory`] doubles that record every call.

#![allow(missing_docs)]

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use broker_types::RepoConfig;
use parking_lot::Mutex;

use crate::{KeyValue, Precondition, Repository, RepositoryError, RepositoryFactory, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockRepositoryCall {
    Get {
        key: String,
    },
    List {
        prefix: String,
    },
    Put {
        key: String,
        value: Vec<u8>,
    },
    PutWithTx {
        key: String,
        value: Vec<u8>,
        precondition: Precondition,
    },
    Delete {
        key: String,
    },
    Close,
}

#[derive(Debug, Default)]
struct Inner {
    calls: Vec<MockRepositoryCall>,
    get_return: VecDeque<Result<Vec<u8>>>,
    list_return: VecDeque<Result<Vec<KeyValue>>>,
    put_with_tx_return: VecDeque<Result<bool>>,
    delete_return: VecDeque<Result<()>>,
    close_return: VecDeque<Result<()>>,
}

/// A [`Repository`] returning queued results in order.
///
/// When a queue is exhausted the call succeeds: `list` returns no entries, `put_with_tx`
/// reports the put as applied and `get` fails with [`RepositoryError::KeyNotFound`].
#[derive(Debug, Default)]
pub struct MockRepository(Mutex<Inner>);

impl MockRepository {
    pub fn with_get_return(self, ret: impl Into<VecDeque<Result<Vec<u8>>>>) -> Self {
        self.0.lock().get_return = ret.into();
        self
    }

    pub fn with_list_return(self, ret: impl Into<VecDeque<Result<Vec<KeyValue>>>>) -> Self {
        self.0.lock().list_return = ret.into();
        self
    }

    pub fn with_put_with_tx_return(self, ret: impl Into<VecDeque<Result<bool>>>) -> Self {
        self.0.lock().put_with_tx_return = ret.into();
        self
    }

    pub fn with_delete_return(self, ret: impl Into<VecDeque<Result<()>>>) -> Self {
        self.0.lock().delete_return = ret.into();
        self
    }

    pub fn with_close_return(self, ret: impl Into<VecDeque<Result<()>>>) -> Self {
        self.0.lock().close_return = ret.into();
        self
    }

    pub fn calls(&self) -> Vec<MockRepositoryCall> {
        self.0.lock().calls.clone()
    }

    pub fn close_count(&self) -> usize {
        self.0
            .lock()
            .calls
            .iter()
            .filter(|c| matches!(c, MockRepositoryCall::Close))
            .count()
    }
}

#[async_trait]
impl Repository for Arc<MockRepository> {
    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let mut guard = self.0.lock();
        guard.calls.push(MockRepositoryCall::Get {
            key: key.to_string(),
        });
        guard
            .get_return
            .pop_front()
            .unwrap_or_else(|| {
                Err(RepositoryError::KeyNotFound {
                    key: key.to_string(),
                })
            })
    }

    async fn list(&self, prefix: &str) -> Result<Vec<KeyValue>> {
        let mut guard = self.0.lock();
        guard.calls.push(MockRepositoryCall::List {
            prefix: prefix.to_string(),
        });
        guard.list_return.pop_front().unwrap_or_else(|| Ok(vec![]))
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.0.lock().calls.push(MockRepositoryCall::Put {
            key: key.to_string(),
            value,
        });
        Ok(())
    }

    async fn put_with_tx(
        &self,
        key: &str,
        value: Vec<u8>,
        precondition: Precondition,
    ) -> Result<bool> {
        let mut guard = self.0.lock();
        guard.calls.push(MockRepositoryCall::PutWithTx {
            key: key.to_string(),
            value,
            precondition,
        });
        guard.put_with_tx_return.pop_front().unwrap_or(Ok(true))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut guard = self.0.lock();
        guard.calls.push(MockRepositoryCall::Delete {
            key: key.to_string(),
        });
        guard.delete_return.pop_front().unwrap_or(Ok(()))
    }

    async fn close(&self) -> Result<()> {
        let mut guard = self.0.lock();
        guard.calls.push(MockRepositoryCall::Close);
        guard.close_return.pop_front().unwrap_or(Ok(()))
    }
}

#[derive(Debug, Default)]
struct FactoryInner {
    calls: Vec<RepoConfig>,
    create_return: VecDeque<Result<Arc<MockRepository>>>,
}

/// A [`RepositoryFactory`] handing out queued [`MockRepository`] handles.
///
/// When the queue is exhausted a fresh, empty [`MockRepository`] is returned.
#[derive(Debug, Default)]
pub struct MockRepositoryFactory(Mutex<FactoryInner>);

impl MockRepositoryFactory {
    pub fn with_create_return(self, ret: impl Into<VecDeque<Result<Arc<MockRepository>>>>) -> Self {
        self.0.lock().create_return = ret.into();
        self
    }

    pub fn calls(&self) -> Vec<RepoConfig> {
        self.0.lock().calls.clone()
    }
}

#[async_trait]
impl RepositoryFactory for Arc<MockRepositoryFactory> {
    async fn create_storage_repo(&self, config: &RepoConfig) -> Result<Box<dyn Repository>> {
        let mut guard = self.0.lock();
        guard.calls.push(config.clone());
        let repo = guard
            .create_return
            .pop_front()
            .unwrap_or_else(|| Ok(Arc::new(MockRepository::default())))?;
        Ok(Box::new(repo))
    }
}
