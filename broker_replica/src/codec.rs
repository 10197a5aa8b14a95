//! Decoding of replicated metric batches and the pool of reusable decoders.
use std::io::{self, Read, Write};
use std::ops::{Deref, DerefMut};

use broker_clap_blocks::replica::ReplicaConfig;
use parking_lot::Mutex;
use prost::Message;
use snap::read::FrameDecoder;
use snap::write::FrameEncoder;

use crate::proto::MetricList;

/// Buffers that grew beyond this are dropped on reset instead of being kept for reuse.
const MAX_RETAINED_BUFFER_BYTES: usize = 4 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("failed to decompress replica data")]
    Decompress(#[source] io::Error),

    #[error("failed to unmarshal metric list: {0}")]
    Unmarshal(#[from] prost::DecodeError),
}

/// Turns a compressed replica payload into a [`MetricList`].
///
/// The decompression buffer is kept between uses; [`reset`](Self::reset) returns the decoder
/// to an empty state.
#[derive(Debug, Default)]
pub struct MetricBatchDecoder {
    buf: Vec<u8>,
}

impl MetricBatchDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decompress all of `payload` and deserialize it. Nothing is returned unless the whole
    /// payload decodes.
    pub fn decode(&mut self, payload: &[u8]) -> Result<MetricList, DecodeError> {
        self.buf.clear();
        FrameDecoder::new(payload)
            .read_to_end(&mut self.buf)
            .map_err(DecodeError::Decompress)?;
        Ok(MetricList::decode(self.buf.as_slice())?)
    }

    pub fn reset(&mut self) {
        self.buf.clear();
        if self.buf.capacity() > MAX_RETAINED_BUFFER_BYTES {
            self.buf = Vec::new();
        }
    }

    /// True when no data from a previous decode is held.
    pub fn is_quiescent(&self) -> bool {
        self.buf.is_empty()
    }
}

/// Thread safe pool of idle [`MetricBatchDecoder`]s.
///
/// A decoder handed out by [`acquire`](Self::acquire) belongs to the returned guard alone and is
/// reset before it goes back into the pool.
#[derive(Debug)]
pub struct DecoderPool {
    idle: Mutex<Vec<MetricBatchDecoder>>,
    capacity: usize,
}

impl DecoderPool {
    /// Create a pool keeping at most `capacity` idle decoders.
    pub fn new(capacity: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn from_config(config: &ReplicaConfig) -> Self {
        Self::new(config.decoder_pool_size)
    }

    pub fn acquire(&self) -> PooledDecoder<'_> {
        let decoder = self.idle.lock().pop().unwrap_or_default();
        PooledDecoder {
            pool: self,
            decoder,
        }
    }

    /// Number of idle decoders.
    pub fn idle(&self) -> usize {
        self.idle.lock().len()
    }

    /// True when every idle decoder is empty.
    pub fn all_idle_quiescent(&self) -> bool {
        self.idle.lock().iter().all(MetricBatchDecoder::is_quiescent)
    }

    fn release(&self, mut decoder: MetricBatchDecoder) {
        decoder.reset();
        let mut idle = self.idle.lock();
        if idle.len() < self.capacity {
            idle.push(decoder);
        }
    }
}

/// A decoder checked out of a [`DecoderPool`]; returned to the pool on drop.
#[derive(Debug)]
pub struct PooledDecoder<'a> {
    pool: &'a DecoderPool,
    decoder: MetricBatchDecoder,
}

impl Deref for PooledDecoder<'_> {
    type Target = MetricBatchDecoder;

    fn deref(&self) -> &Self::Target {
        &self.decoder
    }
}

impl DerefMut for PooledDecoder<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.decoder
    }
}

impl Drop for PooledDecoder<'_> {
    fn drop(&mut self) {
        let decoder = std::mem::take(&mut self.decoder);
        self.pool.release(decoder);
    }
}

/// Serialize and compress `list` into the replica wire format.
pub fn encode_metric_list(list: &MetricList) -> io::Result<Vec<u8>> {
    let mut encoder = FrameEncoder::new(Vec::new());
    encoder.write_all(&list.encode_to_vec())?;
    encoder
        .into_inner()
        .map_err(|e| io::Error::new(e.error().kind(), e.error().to_string()))
}
