use std::fmt::Debug;

use crate::proto::Metric;

pub type ShardId = u32;

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("metric {metric} with timestamp {timestamp} is out of the accepted time range")]
    OutOfTimeRange { metric: String, timestamp: i64 },

    #[error("metric {0} carries no fields")]
    NoFields(String),

    #[error("shard {0} is closed")]
    ShardClosed(ShardId),

    #[error("unexpected storage error: {0:?}")]
    Storage(#[from] anyhow::Error),
}

/// How the replica write path treats a failed record write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteErrorClass {
    /// Expected and not actionable, e.g. late or expired data. Skipped without logging an error.
    Ignorable,
    /// Logged; the rest of the batch is still applied.
    Failed,
}

impl WriteError {
    pub fn class(&self) -> WriteErrorClass {
        match self {
            Self::OutOfTimeRange { .. } => WriteErrorClass::Ignorable,
            Self::NoFields(_) | Self::ShardClosed(_) | Self::Storage(_) => WriteErrorClass::Failed,
        }
    }
}

/// A local storage partition accepting metric writes.
pub trait Shard: Debug + Send + Sync + 'static {
    fn database(&self) -> &str;

    fn shard_id(&self) -> ShardId;

    fn write(&self, metric: &Metric) -> Result<(), WriteError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert_eq!(
            WriteError::OutOfTimeRange {
                metric: "cpu".to_string(),
                timestamp: 0
            }
            .class(),
            WriteErrorClass::Ignorable
        );
        assert_eq!(
            WriteError::NoFields("cpu".to_string()).class(),
            WriteErrorClass::Failed
        );
        assert_eq!(WriteError::ShardClosed(1).class(), WriteErrorClass::Failed);
        assert_eq!(
            WriteError::Storage(anyhow::anyhow!("disk full")).class(),
            WriteErrorClass::Failed
        );
    }
}
