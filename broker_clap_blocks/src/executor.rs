//! Config for the statement executor.
use std::{num::NonZeroUsize, time::Duration};

const DEFAULT_MAX_CONCURRENT_QUERIES: NonZeroUsize = NonZeroUsize::new(32).unwrap();

/// CLI config for statement execution.
#[derive(Debug, Clone, clap::Parser)]
#[allow(missing_copy_implementations)]
pub struct ExecutorConfig {
    /// Upper bound handed to the query engine for a single metric or metadata query.
    #[clap(
        long = "query-timeout",
        env = "BROKER_QUERY_TIMEOUT",
        default_value = "10s",
        value_parser = humantime::parse_duration,
    )]
    pub query_timeout: Duration,

    /// Maximum number of queries executing at the same time.
    #[clap(
        long = "max-concurrent-queries",
        env = "BROKER_MAX_CONCURRENT_QUERIES",
        default_value = "32",
        action
    )]
    pub max_concurrent_queries: NonZeroUsize,

    /// How long a query may wait for a free execution slot before it is rejected.
    #[clap(
        long = "query-queue-timeout",
        env = "BROKER_QUERY_QUEUE_TIMEOUT",
        default_value = "5s",
        value_parser = humantime::parse_duration,
    )]
    pub query_queue_timeout: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            query_timeout: Duration::from_secs(10),
            max_concurrent_queries: DEFAULT_MAX_CONCURRENT_QUERIES,
            query_queue_timeout: Duration::from_secs(5),
        }
    }
}
