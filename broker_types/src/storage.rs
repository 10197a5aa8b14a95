//! Storage cluster configuration and the broker's live view of a storage cluster.
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("storage cluster namespace cannot be empty")]
    EmptyNamespace,

    #[error("storage cluster namespace {0:?} must not contain '/'")]
    InvalidNamespace(String),

    #[error("storage cluster requires at least one endpoint")]
    NoEndpoints,

    #[error("invalid endpoint {endpoint:?}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    #[error("{0} must be greater than zero")]
    NonPositive(&'static str),
}

/// Connection settings of the metadata store owned by a storage cluster. The namespace doubles
/// as the cluster name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RepoConfig {
    pub namespace: String,
    pub endpoints: Vec<String>,
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Dial timeout in seconds.
    pub dial_timeout: u64,
    /// Lease TTL in seconds.
    #[serde(rename = "leaseTTL")]
    pub lease_ttl: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            namespace: String::new(),
            endpoints: Vec::new(),
            timeout: 5,
            dial_timeout: 5,
            lease_ttl: 10,
            username: String::new(),
            password: String::new(),
        }
    }
}

impl RepoConfig {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.namespace.trim().is_empty() {
            return Err(ConfigValidationError::EmptyNamespace);
        }
        if self.namespace.contains('/') {
            return Err(ConfigValidationError::InvalidNamespace(
                self.namespace.clone(),
            ));
        }
        if self.endpoints.is_empty() {
            return Err(ConfigValidationError::NoEndpoints);
        }
        for endpoint in &self.endpoints {
            url::Url::parse(endpoint).map_err(|source| ConfigValidationError::InvalidEndpoint {
                endpoint: endpoint.clone(),
                source,
            })?;
        }
        if self.timeout == 0 {
            return Err(ConfigValidationError::NonPositive("timeout"));
        }
        if self.dial_timeout == 0 {
            return Err(ConfigValidationError::NonPositive("dialTimeout"));
        }
        if self.lease_ttl <= 0 {
            return Err(ConfigValidationError::NonPositive("leaseTTL"));
        }
        Ok(())
    }
}

/// A storage cluster registration as persisted under the storage config namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageCluster {
    pub config: RepoConfig,
}

impl StorageCluster {
    pub fn name(&self) -> &str {
        &self.config.namespace
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageStatus {
    Initialize,
    Ready,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageNode {
    pub node_id: u32,
    pub host_ip: String,
    pub grpc_port: u16,
}

/// Live state of a storage cluster as tracked by the broker's state manager.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageState {
    pub name: String,
    pub status: StorageStatus,
    pub live_nodes: Vec<StorageNode>,
}

/// One row of `show storages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageClusterSummary {
    pub config: RepoConfig,
    pub status: StorageStatus,
    pub live_nodes: Vec<StorageNode>,
}

impl StorageClusterSummary {
    pub fn new(cluster: StorageCluster, state: Option<StorageState>) -> Self {
        let (status, live_nodes) = match state {
            Some(state) => (state.status, state.live_nodes),
            None => (StorageStatus::Unknown, Vec::new()),
        };
        Self {
            config: cluster.config,
            status,
            live_nodes,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn valid() -> RepoConfig {
        serde_json::from_str::<StorageCluster>(
            r#"{"config":{"namespace":"test","timeout":10,"dialTimeout":10,"leaseTTL":10,"endpoints":["http://localhost:2379"]}}"#,
        )
        .unwrap()
        .config
    }

    #[test]
    fn decode_with_defaults() {
        let cluster: StorageCluster =
            serde_json::from_str(r#"{ "config": {"namespace":"xxx"}}"#).unwrap();
        assert_eq!(cluster.name(), "xxx");
        assert_eq!(cluster.config.lease_ttl, 10);
        assert!(serde_json::from_str::<StorageCluster>("[]").is_err());
    }

    #[test]
    fn validate() {
        assert!(valid().validate().is_ok());

        let empty = StorageCluster::default().config;
        assert!(matches!(
            empty.validate(),
            Err(ConfigValidationError::EmptyNamespace)
        ));

        let mut cfg = valid();
        cfg.namespace = "a/b".to_string();
        assert!(matches!(
            cfg.validate(),
            Err(ConfigValidationError::InvalidNamespace(_))
        ));

        let mut cfg = valid();
        cfg.endpoints.clear();
        assert!(matches!(cfg.validate(), Err(ConfigValidationError::NoEndpoints)));

        let mut cfg = valid();
        cfg.endpoints = vec!["not a url".to_string()];
        assert!(matches!(
            cfg.validate(),
            Err(ConfigValidationError::InvalidEndpoint { .. })
        ));

        let mut cfg = valid();
        cfg.lease_ttl = 0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigValidationError::NonPositive("leaseTTL"))
        ));
    }

    #[test]
    fn summary_without_state_is_unknown() {
        let cluster = StorageCluster { config: valid() };
        let summary = StorageClusterSummary::new(cluster.clone(), None);
        assert_eq!(summary.status, StorageStatus::Unknown);
        assert!(summary.live_nodes.is_empty());

        let state = StorageState {
            name: "test".to_string(),
            status: StorageStatus::Ready,
            live_nodes: vec![StorageNode {
                node_id: 1,
                host_ip: "10.0.0.1".to_string(),
                grpc_port: 2891,
            }],
        };
        let summary = StorageClusterSummary::new(cluster, Some(state));
        assert_eq!(summary.status, StorageStatus::Ready);
        assert_eq!(summary.live_nodes.len(), 1);
    }
}
