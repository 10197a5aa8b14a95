//! A mock implementation of [`Shard`].

#![allow(missing_docs)]

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::proto::Metric;
use crate::shard::{Shard, ShardId, WriteError};

#[derive(Debug, Default)]
struct Inner {
    attempted: Vec<Metric>,
    written: Vec<Metric>,
    write_return: VecDeque<Result<(), WriteError>>,
}

/// A [`Shard`] answering writes with queued results; an exhausted queue accepts the write.
#[derive(Debug)]
pub struct MockShard {
    database: String,
    shard_id: ShardId,
    inner: Mutex<Inner>,
}

impl MockShard {
    pub fn new(database: impl Into<String>, shard_id: ShardId) -> Self {
        Self {
            database: database.into(),
            shard_id,
            inner: Mutex::default(),
        }
    }

    pub fn with_write_return(self, ret: impl Into<VecDeque<Result<(), WriteError>>>) -> Self {
        self.inner.lock().write_return = ret.into();
        self
    }

    /// Every metric passed to `write`, in call order.
    pub fn attempted(&self) -> Vec<Metric> {
        self.inner.lock().attempted.clone()
    }

    /// Metrics whose write succeeded, in call order.
    pub fn written(&self) -> Vec<Metric> {
        self.inner.lock().written.clone()
    }
}

impl Shard for MockShard {
    fn database(&self) -> &str {
        &self.database
    }

    fn shard_id(&self) -> ShardId {
        self.shard_id
    }

    fn write(&self, metric: &Metric) -> Result<(), WriteError> {
        let mut guard = self.inner.lock();
        guard.attempted.push(metric.clone());
        let ret = guard.write_return.pop_front().unwrap_or(Ok(()));
        if ret.is_ok() {
            guard.written.push(metric.clone());
        }
        ret
    }
}
