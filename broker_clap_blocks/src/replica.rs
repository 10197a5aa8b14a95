//! Config for the replica write path.

/// CLI config for applying replicated writes.
#[derive(Debug, Clone, clap::Parser)]
#[allow(missing_copy_implementations)]
pub struct ReplicaConfig {
    /// Number of idle decoders kept for reuse by the replica write path.
    #[clap(
        long = "replica-decoder-pool-size",
        env = "BROKER_REPLICA_DECODER_POOL_SIZE",
        default_value = "16",
        action
    )]
    pub decoder_pool_size: usize,
}

impl Default for ReplicaConfig {
    fn default() -> Self {
        Self {
            decoder_pool_size: 16,
        }
    }
}
