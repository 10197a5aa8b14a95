//! Field metadata returned by `show fields`.
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Prefix of the sub-fields holding one histogram bucket each, e.g. `__bucket_3`.
pub const HISTOGRAM_BUCKET_PREFIX: &str = "__bucket_";

/// Name of the composite field a histogram is presented as.
pub const HISTOGRAM_FIELD_NAME: &str = "histogram";

pub const HISTOGRAM_SUM: &str = "histogram_sum";
pub const HISTOGRAM_COUNT: &str = "histogram_count";
pub const HISTOGRAM_MIN: &str = "histogram_min";
pub const HISTOGRAM_MAX: &str = "histogram_max";

/// Aggregate sub-fields that belong to a histogram when bucket fields are present.
pub const HISTOGRAM_AGGREGATES: [&str; 4] =
    [HISTOGRAM_SUM, HISTOGRAM_COUNT, HISTOGRAM_MIN, HISTOGRAM_MAX];

/// Aggregation type of a stored field.
///
/// Types the broker does not know are kept verbatim in [`FieldType::Other`] so they survive a
/// decode/encode round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Sum,
    Min,
    Max,
    Last,
    First,
    Histogram,
    Other(String),
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Sum => "sum",
            Self::Min => "min",
            Self::Max => "max",
            Self::Last => "last",
            Self::First => "first",
            Self::Histogram => "histogram",
            Self::Other(s) => s,
        }
    }
}

impl From<&str> for FieldType {
    fn from(s: &str) -> Self {
        match s {
            "sum" => Self::Sum,
            "min" => Self::Min,
            "max" => Self::Max,
            "last" => Self::Last,
            "first" => Self::First,
            "histogram" => Self::Histogram,
            other => Self::Other(other.to_string()),
        }
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s.as_str()))
    }
}

/// Name and type of one stored field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl Meta {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }

    /// True if the name marks a histogram bucket fragment, whether or not its index is valid.
    pub fn is_bucket_fragment(&self) -> bool {
        self.name.starts_with(HISTOGRAM_BUCKET_PREFIX)
    }

    /// The bucket index if this field is a bucket fragment with a numeric suffix.
    pub fn bucket_index(&self) -> Option<u64> {
        self.name
            .strip_prefix(HISTOGRAM_BUCKET_PREFIX)
            .and_then(|suffix| suffix.parse().ok())
    }

    pub fn is_histogram_aggregate(&self) -> bool {
        HISTOGRAM_AGGREGATES.contains(&self.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_index() {
        let bucket = |name: &str| Meta::new(name, FieldType::Histogram);
        assert_eq!(bucket("__bucket_0").bucket_index(), Some(0));
        assert_eq!(bucket("__bucket_99").bucket_index(), Some(99));
        assert_eq!(
            bucket("__bucket_4294967296").bucket_index(),
            Some(4_294_967_296)
        );
        assert_eq!(bucket("__bucket_").bucket_index(), None);
        assert_eq!(bucket("__bucket_x").bucket_index(), None);
        assert!(bucket("__bucket_x").is_bucket_fragment());
        assert!(bucket("__bucket_").is_bucket_fragment());

        let plain = Meta::new("bucket_1", FieldType::Sum);
        assert_eq!(plain.bucket_index(), None);
        assert!(!plain.is_bucket_fragment());
    }

    #[test]
    fn field_type_json() {
        let metas: Vec<Meta> =
            serde_json::from_str(r#"[{"name":"f","type":"sum"},{"name":"g","type":"gauge"}]"#)
                .unwrap();
        assert_eq!(metas[0].field_type, FieldType::Sum);
        assert_eq!(metas[1].field_type, FieldType::Other("gauge".to_string()));
        assert_eq!(
            serde_json::to_string(&Meta::new("h", FieldType::Histogram)).unwrap(),
            r#"{"name":"h","type":"histogram"}"#
        );
    }

    #[test]
    fn unknown_field_type_round_trips() {
        let raw = r#"{"name":"g","type":"gauge"}"#;
        let meta: Meta = serde_json::from_str(raw).unwrap();
        assert_eq!(serde_json::to_string(&meta).unwrap(), raw);
        assert!(serde_json::from_str::<Meta>(r#"{"name":"g","type":1}"#).is_err());
    }
}
