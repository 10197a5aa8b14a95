//! Wire schema of replicated metric batches.
//!
//! Field tags are part of the replication protocol and must not be renumbered.

/// An ordered batch of metric records.
#[derive(Clone, PartialEq, prost::Message)]
pub struct MetricList {
    #[prost(message, repeated, tag = "1")]
    pub metrics: Vec<Metric>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Metric {
    #[prost(string, tag = "1")]
    pub namespace: String,
    #[prost(string, tag = "2")]
    pub name: String,
    /// Milliseconds since the epoch.
    #[prost(int64, tag = "3")]
    pub timestamp: i64,
    #[prost(message, repeated, tag = "4")]
    pub tags: Vec<KeyValue>,
    #[prost(uint64, tag = "5")]
    pub tags_hash: u64,
    #[prost(message, repeated, tag = "6")]
    pub simple_fields: Vec<SimpleField>,
    #[prost(message, optional, tag = "7")]
    pub compound_field: Option<CompoundField>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct KeyValue {
    #[prost(string, tag = "1")]
    pub key: String,
    #[prost(string, tag = "2")]
    pub value: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct SimpleField {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(enumeration = "SimpleFieldType", tag = "2")]
    pub r#type: i32,
    #[prost(double, tag = "3")]
    pub value: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum SimpleFieldType {
    Unspecified = 0,
    DeltaSum = 1,
    Gauge = 2,
    Min = 3,
    Max = 4,
    Last = 5,
    First = 6,
}

/// A histogram value: explicit bucket bounds with one count per bucket plus the aggregates.
#[derive(Clone, PartialEq, prost::Message)]
pub struct CompoundField {
    #[prost(double, tag = "1")]
    pub min: f64,
    #[prost(double, tag = "2")]
    pub max: f64,
    #[prost(double, tag = "3")]
    pub sum: f64,
    #[prost(double, tag = "4")]
    pub count: f64,
    #[prost(double, repeated, tag = "5")]
    pub explicit_bounds: Vec<f64>,
    #[prost(double, repeated, tag = "6")]
    pub values: Vec<f64>,
}
