use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, error, trace};

use crate::codec::{DecodeError, DecoderPool};
use crate::shard::{Shard, WriteErrorClass};

/// Consumer end of a replication channel.
pub trait Replicator: Debug + Send + Sync {
    /// Apply one replicated message. `sequence` is the channel's sequence hint for the message.
    ///
    /// There is no response leg: failures are logged and never surfaced to the caller.
    fn replica(&self, sequence: i64, msg: &[u8]);
}

/// Counters of a [`LocalReplicator`] since creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplicaStats {
    pub messages: u64,
    pub decode_failures: u64,
    pub written: u64,
    pub ignored: u64,
    pub failed: u64,
}

#[derive(Debug, Default)]
struct Counters {
    messages: AtomicU64,
    decode_failures: AtomicU64,
    written: AtomicU64,
    ignored: AtomicU64,
    failed: AtomicU64,
}

#[derive(Debug, Default)]
struct BatchOutcome {
    written: u64,
    ignored: u64,
    failed: u64,
}

/// Applies replicated batches to a shard owned by this node.
#[derive(Debug)]
pub struct LocalReplicator {
    shard: Arc<dyn Shard>,
    decoders: Arc<DecoderPool>,
    counters: Counters,
}

impl LocalReplicator {
    pub fn new(shard: Arc<dyn Shard>, decoders: Arc<DecoderPool>) -> Self {
        Self {
            shard,
            decoders,
            counters: Counters::default(),
        }
    }

    pub fn stats(&self) -> ReplicaStats {
        ReplicaStats {
            messages: self.counters.messages.load(Ordering::Relaxed),
            decode_failures: self.counters.decode_failures.load(Ordering::Relaxed),
            written: self.counters.written.load(Ordering::Relaxed),
            ignored: self.counters.ignored.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }

    fn apply(&self, msg: &[u8]) -> Result<BatchOutcome, DecodeError> {
        // the decoder goes back to the pool before any shard write
        let metric_list = self.decoders.acquire().decode(msg)?;

        let mut outcome = BatchOutcome::default();
        for metric in &metric_list.metrics {
            match self.shard.write(metric) {
                Ok(()) => outcome.written += 1,
                Err(e) => match e.class() {
                    WriteErrorClass::Ignorable => {
                        debug!(metric = %metric.name, error = %e, "ignore replica metric");
                        outcome.ignored += 1;
                    }
                    WriteErrorClass::Failed => {
                        error!(
                            database = self.shard.database(),
                            shard = self.shard.shard_id(),
                            metric = %metric.name,
                            error = %e,
                            "write replica metric"
                        );
                        outcome.failed += 1;
                    }
                },
            }
        }
        Ok(outcome)
    }
}

impl Replicator for LocalReplicator {
    fn replica(&self, sequence: i64, msg: &[u8]) {
        trace!(sequence, bytes = msg.len(), "apply replica message");
        self.counters.messages.fetch_add(1, Ordering::Relaxed);

        match self.apply(msg) {
            Ok(outcome) => {
                self.counters
                    .written
                    .fetch_add(outcome.written, Ordering::Relaxed);
                self.counters
                    .ignored
                    .fetch_add(outcome.ignored, Ordering::Relaxed);
                self.counters
                    .failed
                    .fetch_add(outcome.failed, Ordering::Relaxed);
            }
            Err(e) => {
                self.counters.decode_failures.fetch_add(1, Ordering::Relaxed);
                error!(
                    database = self.shard.database(),
                    shard = self.shard.shard_id(),
                    sequence,
                    error = %e,
                    "decode replica data"
                );
            }
        }
    }
}
