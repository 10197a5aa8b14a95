use serde::{Deserialize, Serialize};

/// A broker node as registered in the metadata store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerNode {
    pub host_ip: String,
    pub host_name: String,
    pub grpc_port: u16,
    pub http_port: u16,
    pub online_time: i64,
    pub version: String,
}

impl BrokerNode {
    /// `host:grpc_port`, identifying the node within the cluster.
    pub fn indicator(&self) -> String {
        format!("{}:{}", self.host_ip, self.grpc_port)
    }
}

/// The currently elected master broker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Master {
    pub elect_time: i64,
    pub node: BrokerNode,
}
