use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Result of a metric query as assembled by the distributed query engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSet {
    pub metric_name: String,
    pub group_by: Vec<String>,
    pub fields: Vec<String>,
    pub start_time: i64,
    pub end_time: i64,
    pub interval: i64,
    pub series: Vec<Series>,
}

impl ResultSet {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// One tag combination and its field points keyed by timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub tags: BTreeMap<String, String>,
    pub fields: BTreeMap<String, BTreeMap<i64, f64>>,
}
