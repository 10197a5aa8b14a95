//! Replica write path.
//!
//! Writes arrive on a replication channel as snappy framed, protobuf encoded [`MetricList`]
//! batches. A [`LocalReplicator`] decodes each batch with a pooled [`MetricBatchDecoder`] and
//! applies the records, in order, to the [`Shard`] it is bound to. The channel has no response
//! leg, so nothing is returned to the sender: failures end up in the log and in
//! [`ReplicaStats`].

pub mod codec;
pub mod mock;
pub mod proto;
pub mod replicator;
pub mod shard;

pub use codec::{DecodeError, DecoderPool, MetricBatchDecoder, PooledDecoder, encode_metric_list};
pub use proto::{CompoundField, KeyValue, Metric, MetricList, SimpleField, SimpleFieldType};
pub use replicator::{LocalReplicator, ReplicaStats, Replicator};
pub use shard::{Shard, ShardId, WriteError, WriteErrorClass};
