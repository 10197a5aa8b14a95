//! Presentation of `show fields` answers.
//!
//! Storage keeps a histogram as one field per bucket (`__bucket_<n>`) next to the
//! `histogram_sum`/`histogram_count`/`histogram_min`/`histogram_max` aggregates. Callers see a
//! single composite `histogram` field instead.
use std::collections::HashSet;

use broker_types::field::HISTOGRAM_FIELD_NAME;
use broker_types::{FieldType, Meta};
use serde::Serialize;
use tracing::warn;

/// One entry of a `show fields` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldDescriptor {
    Simple(Meta),
    Histogram(HistogramField),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistogramField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Bucket indexes, ascending and unique.
    pub buckets: Vec<u64>,
    /// Aggregate sub-fields in the order storage reported them.
    pub aggregates: Vec<Meta>,
}

/// Decode the raw engine answers. Each string is a JSON array of [`Meta`].
pub fn decode_fields(raw: &[String]) -> Result<Vec<Meta>, serde_json::Error> {
    let mut fields = Vec::new();
    for s in raw {
        fields.extend(serde_json::from_str::<Vec<Meta>>(s)?);
    }
    Ok(fields)
}

/// Fold histogram fragments into one [`HistogramField`] and drop duplicate fields.
///
/// Answers from several storage nodes may repeat a field; the first occurrence of a name wins.
/// The composite takes the position of the first fragment. Aggregate names are only treated as
/// fragments when at least one valid bucket is present; otherwise they are ordinary fields.
/// Bucket fragments without a numeric index are dropped.
pub fn reassemble_histogram(fields: Vec<Meta>) -> Vec<FieldDescriptor> {
    let has_buckets = fields.iter().any(|f| f.bucket_index().is_some());

    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(fields.len());
    let mut position = None;
    let mut buckets = Vec::new();
    let mut aggregates = Vec::new();
    for field in fields {
        if field.is_bucket_fragment() {
            match field.bucket_index() {
                Some(index) => {
                    position.get_or_insert(out.len());
                    buckets.push(index);
                }
                None => warn!(field = %field.name, "drop histogram bucket without a valid index"),
            }
            continue;
        }
        if !seen.insert(field.name.clone()) {
            continue;
        }
        if has_buckets && field.is_histogram_aggregate() {
            position.get_or_insert(out.len());
            aggregates.push(field);
        } else {
            out.push(FieldDescriptor::Simple(field));
        }
    }
    if !has_buckets {
        return out;
    }

    buckets.sort_unstable();
    buckets.dedup();
    let histogram = FieldDescriptor::Histogram(HistogramField {
        name: HISTOGRAM_FIELD_NAME.to_string(),
        field_type: FieldType::Histogram,
        buckets,
        aggregates,
    });
    out.insert(position.unwrap_or(out.len()), histogram);
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;

    fn meta(name: &str, field_type: FieldType) -> Meta {
        Meta::new(name, field_type)
    }

    #[test]
    fn no_histogram() {
        let fields = vec![
            meta("f1", FieldType::Sum),
            meta("histogram_sum", FieldType::Sum),
        ];
        assert_eq!(
            reassemble_histogram(fields.clone()),
            fields
                .into_iter()
                .map(FieldDescriptor::Simple)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn histogram_fragments_are_merged() {
        let fields = vec![
            meta("test", FieldType::Sum),
            meta("__bucket_0", FieldType::Histogram),
            meta("__bucket_99", FieldType::Histogram),
            meta("__bucket_2", FieldType::Histogram),
            meta("__bucket_3", FieldType::Histogram),
            meta("__bucket_4", FieldType::Histogram),
            meta("histogram_sum", FieldType::Sum),
            meta("histogram_count", FieldType::Sum),
            meta("histogram_min", FieldType::Min),
            meta("histogram_max", FieldType::Max),
            meta("after", FieldType::Last),
        ];

        assert_eq!(
            reassemble_histogram(fields),
            vec![
                FieldDescriptor::Simple(meta("test", FieldType::Sum)),
                FieldDescriptor::Histogram(HistogramField {
                    name: "histogram".to_string(),
                    field_type: FieldType::Histogram,
                    buckets: vec![0, 2, 3, 4, 99],
                    aggregates: vec![
                        meta("histogram_sum", FieldType::Sum),
                        meta("histogram_count", FieldType::Sum),
                        meta("histogram_min", FieldType::Min),
                        meta("histogram_max", FieldType::Max),
                    ],
                }),
                FieldDescriptor::Simple(meta("after", FieldType::Last)),
            ]
        );
    }

    #[test]
    fn answers_from_several_nodes_are_merged() {
        let answer = serde_json::to_string(&vec![
            meta("test", FieldType::Sum),
            meta("__bucket_0", FieldType::Histogram),
            meta("histogram_sum", FieldType::Sum),
        ])
        .unwrap();
        let fields = decode_fields(&[answer.clone(), answer]).unwrap();
        assert_eq!(fields.len(), 6);

        assert_eq!(
            reassemble_histogram(fields),
            vec![
                FieldDescriptor::Simple(meta("test", FieldType::Sum)),
                FieldDescriptor::Histogram(HistogramField {
                    name: "histogram".to_string(),
                    field_type: FieldType::Histogram,
                    buckets: vec![0],
                    aggregates: vec![meta("histogram_sum", FieldType::Sum)],
                }),
            ]
        );

        // without buckets the first occurrence of a name is kept
        assert_eq!(
            reassemble_histogram(vec![
                meta("f", FieldType::Sum),
                meta("g", FieldType::Last),
                meta("f", FieldType::Max),
            ]),
            vec![
                FieldDescriptor::Simple(meta("f", FieldType::Sum)),
                FieldDescriptor::Simple(meta("g", FieldType::Last)),
            ]
        );
    }

    #[test_log::test]
    fn bucket_fragments_never_leak() {
        let out = reassemble_histogram(vec![
            meta("__bucket_1", FieldType::Histogram),
            meta("__bucket_4294967296", FieldType::Histogram),
            meta("__bucket_x", FieldType::Histogram),
            meta("f", FieldType::Sum),
        ]);
        assert_eq!(
            out,
            vec![
                FieldDescriptor::Histogram(HistogramField {
                    name: "histogram".to_string(),
                    field_type: FieldType::Histogram,
                    buckets: vec![1, 4_294_967_296],
                    aggregates: vec![],
                }),
                FieldDescriptor::Simple(meta("f", FieldType::Sum)),
            ]
        );

        // invalid fragments alone produce no composite
        assert_eq!(
            reassemble_histogram(vec![
                meta("__bucket_", FieldType::Histogram),
                meta("histogram_sum", FieldType::Sum),
            ]),
            vec![FieldDescriptor::Simple(meta("histogram_sum", FieldType::Sum))]
        );
    }

    #[test]
    fn decode() {
        let raw = vec![
            r#"[{"name":"f1","type":"sum"}]"#.to_string(),
            r#"[{"name":"f2","type":"last"},{"name":"f3","type":"gauge"}]"#.to_string(),
        ];
        assert_eq!(
            decode_fields(&raw).unwrap(),
            vec![
                meta("f1", FieldType::Sum),
                meta("f2", FieldType::Last),
                meta("f3", FieldType::Other("gauge".to_string())),
            ]
        );

        assert!(decode_fields(&["ns".to_string()]).is_err());
        assert!(decode_fields(&[]).unwrap().is_empty());
    }

    #[test]
    fn serialized_shape() {
        let out = reassemble_histogram(vec![
            meta("__bucket_1", FieldType::Histogram),
            meta("f", FieldType::Sum),
        ]);
        assert_eq!(
            serde_json::to_value(&out).unwrap(),
            serde_json::json!([
                {"name": "histogram", "type": "histogram", "buckets": [1], "aggregates": []},
                {"name": "f", "type": "sum"}
            ])
        );
    }

    proptest! {
        #[test]
        fn buckets_come_out_sorted(
            indexes in prop::collection::vec(0u64..200, 1..20).prop_shuffle(),
            plain in prop::collection::vec("[a-z]{1,8}", 0..5),
        ) {
            let mut fields: Vec<_> = plain
                .iter()
                .map(|name| meta(name, FieldType::Sum))
                .collect();
            fields.extend(
                indexes
                    .iter()
                    .map(|i| meta(&format!("__bucket_{i}"), FieldType::Histogram)),
            );

            let out = reassemble_histogram(fields);

            let histograms: Vec<_> = out
                .iter()
                .filter_map(|d| match d {
                    FieldDescriptor::Histogram(h) => Some(h),
                    FieldDescriptor::Simple(_) => None,
                })
                .collect();
            prop_assert_eq!(histograms.len(), 1);

            let mut expected = indexes.clone();
            expected.sort_unstable();
            expected.dedup();
            prop_assert_eq!(&histograms[0].buckets, &expected);
            let distinct: HashSet<_> = plain.iter().collect();
            prop_assert_eq!(out.len(), distinct.len() + 1);
        }
    }
}
