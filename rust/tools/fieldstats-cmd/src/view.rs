//! JSON rendering of statistics and responses.

use std::collections::BTreeMap;

use fieldstats::{FieldStatsResponse, PartitionFailure, PartitionStats};
use fieldstats_format::{FieldStats, StatValue};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Serialize)]
pub struct ResponseView {
    #[serde(rename = "_shards")]
    shards: ShardsView,
    indices: BTreeMap<String, IndexView>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    conflicts: BTreeMap<String, String>,
}

#[derive(Serialize)]
struct ShardsView {
    total: usize,
    successful: usize,
    failed: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failures: Vec<FailureView>,
}

#[derive(Serialize)]
struct FailureView {
    index: String,
    shard: u32,
    reason: String,
}

#[derive(Serialize)]
struct IndexView {
    fields: BTreeMap<String, StatsView>,
}

#[derive(Serialize)]
pub struct PartitionView {
    index: String,
    shard: u32,
    fields: BTreeMap<String, StatsView>,
}

#[derive(Serialize)]
pub struct StatsView {
    #[serde(rename = "type")]
    value_type: &'static str,
    max_doc: u64,
    doc_count: u64,
    density: u32,
    sum_doc_freq: u64,
    sum_total_term_freq: u64,
    searchable: bool,
    aggregatable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_value_as_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_value_as_string: Option<String>,
}

impl From<&FieldStatsResponse> for ResponseView {
    fn from(response: &FieldStatsResponse) -> Self {
        ResponseView {
            shards: ShardsView {
                total: response.total_partitions(),
                successful: response.successful_partitions(),
                failed: response.failed_partitions(),
                failures: response.failures().iter().map(FailureView::from).collect(),
            },
            indices: response
                .buckets()
                .iter()
                .map(|(key, bucket)| {
                    let fields = bucket
                        .iter()
                        .map(|(name, stats)| (name.clone(), StatsView::from(stats)))
                        .collect();
                    (key.clone(), IndexView { fields })
                })
                .collect(),
            conflicts: response.conflicts().clone(),
        }
    }
}

impl From<&PartitionFailure> for FailureView {
    fn from(failure: &PartitionFailure) -> Self {
        FailureView {
            index: failure.partition.group.clone(),
            shard: failure.partition.shard,
            reason: failure.reason.clone(),
        }
    }
}

impl From<&PartitionStats> for PartitionView {
    fn from(stats: &PartitionStats) -> Self {
        PartitionView {
            index: stats.id().group.clone(),
            shard: stats.id().shard,
            fields: stats
                .fields()
                .iter()
                .map(|(name, field)| (name.clone(), StatsView::from(field)))
                .collect(),
        }
    }
}

impl From<&FieldStats> for StatsView {
    fn from(stats: &FieldStats) -> Self {
        StatsView {
            value_type: stats.display_type(),
            max_doc: stats.max_doc(),
            doc_count: stats.doc_count(),
            density: stats.density(),
            sum_doc_freq: stats.sum_doc_freq(),
            sum_total_term_freq: stats.sum_total_term_freq(),
            searchable: stats.is_searchable(),
            aggregatable: stats.is_aggregatable(),
            min_value: stats.min_value().map(value_json),
            min_value_as_string: stats.min_value_as_string(),
            max_value: stats.max_value().map(value_json),
            max_value_as_string: stats.max_value_as_string(),
        }
    }
}

/// Raw JSON form of a value: numbers stay numeric, dates are epoch millis.
fn value_json(value: &StatValue) -> Value {
    match value {
        StatValue::Integer64(v) => json!(v),
        StatValue::Float64(v) => json!(v),
        StatValue::Timestamp { millis, .. } => json!(millis),
        StatValue::Text(_) | StatValue::IpAddress(_) => json!(value.to_string()),
        StatValue::GeoPoint { lat, lon } => json!({ "lat": lat, "lon": lon }),
    }
}

pub fn to_json<T: Serialize>(view: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(view)
    } else {
        serde_json::to_string(view)
    }
}
