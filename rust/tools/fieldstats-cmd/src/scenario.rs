//! JSON scenario files: a request plus the statistics every partition
//! reports.
//!
//! ```json
//! {
//!   "request": {"fields": ["value"], "level": "indices"},
//!   "partitions": [
//!     {"index": "test1", "shard": 0, "fields": {
//!       "value": {"type": "integer", "max_doc": 1, "doc_count": 1,
//!                 "min_value": "1", "max_value": "1"}}},
//!     {"index": "test1", "shard": 1, "failure": "shard not available"}
//!   ]
//! }
//! ```

use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Context, Result, anyhow};
use fieldstats::{FieldStatsRequest, InMemorySource, PartitionId, PartitionStats};
use fieldstats_format::{DateFormat, FieldStats, StatValue, ValueType};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Scenario {
    pub request: FieldStatsRequest,
    #[serde(default)]
    pub partitions: Vec<PartitionSpec>,
}

#[derive(Debug, Deserialize)]
pub struct PartitionSpec {
    pub index: String,
    pub shard: u32,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldSpec>,
    /// Marks the partition as unreachable.
    #[serde(default)]
    pub failure: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FieldSpec {
    #[serde(rename = "type")]
    pub value_type: String,
    #[serde(default)]
    pub max_doc: u64,
    #[serde(default)]
    pub doc_count: u64,
    #[serde(default)]
    pub sum_doc_freq: u64,
    #[serde(default)]
    pub sum_total_term_freq: u64,
    #[serde(default = "default_true")]
    pub searchable: bool,
    #[serde(default = "default_true")]
    pub aggregatable: bool,
    #[serde(default)]
    pub min_value: Option<String>,
    #[serde(default)]
    pub max_value: Option<String>,
    /// Date format of the field, for date values.
    #[serde(default)]
    pub format: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Scenario {
    pub fn load(path: impl AsRef<Path>) -> Result<Scenario> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario file: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse scenario file: {}", path.display()))
    }

    pub fn partition_ids(&self) -> Vec<PartitionId> {
        self.partitions.iter().map(PartitionSpec::id).collect()
    }

    pub fn source(&self) -> Result<InMemorySource> {
        let mut source = InMemorySource::new();
        for partition in &self.partitions {
            let id = partition.id();
            if let Some(reason) = &partition.failure {
                source.fail_partition(id, reason.clone());
                continue;
            }
            source.add_partition(id.clone());
            for (name, field) in &partition.fields {
                let stats = field
                    .to_field_stats()
                    .with_context(|| format!("Invalid field [{name}] in partition {id}"))?;
                source.add_field(id.clone(), name.clone(), stats);
            }
        }
        Ok(source)
    }

    /// Statistics of every reachable partition.
    pub fn partition_stats(&self) -> Result<Vec<PartitionStats>> {
        self.partitions
            .iter()
            .filter(|partition| partition.failure.is_none())
            .map(|partition| {
                let mut stats = PartitionStats::new(partition.id());
                for (name, field) in &partition.fields {
                    let field_stats = field.to_field_stats().with_context(|| {
                        format!("Invalid field [{name}] in partition {}", partition.id())
                    })?;
                    stats.insert(name.clone(), field_stats);
                }
                Ok(stats)
            })
            .collect()
    }
}

impl PartitionSpec {
    pub fn id(&self) -> PartitionId {
        PartitionId::new(self.index.clone(), self.shard)
    }
}

impl FieldSpec {
    pub fn to_field_stats(&self) -> Result<FieldStats> {
        let value_type = ValueType::from_display_name(&self.value_type)
            .ok_or_else(|| anyhow!("Unknown field type: {}", self.value_type))?;
        let stats = FieldStats::new(
            value_type,
            self.max_doc,
            self.doc_count,
            self.sum_doc_freq,
            self.sum_total_term_freq,
            self.searchable,
            self.aggregatable,
        );

        let (min, max) = match (&self.min_value, &self.max_value) {
            (None, None) => return Ok(stats),
            (Some(min), Some(max)) => (min, max),
            _ => anyhow::bail!("min_value and max_value must be given together"),
        };
        let date_format = match &self.format {
            Some(pattern) => DateFormat::parse(pattern)?,
            None => DateFormat::default(),
        };
        let min = StatValue::parse(value_type, min, None, Some(&date_format))?;
        let max = StatValue::parse(value_type, max, None, Some(&date_format))?;
        Ok(stats.with_range(min, max)?)
    }
}
