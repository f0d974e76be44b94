//! Fan-out over partitions: ask each one for the statistics of the fields
//! matching the requested patterns.

use std::collections::BTreeMap;

use fieldstats_common::{Error, Result};
use fieldstats_format::FieldStats;
use rayon::prelude::*;

use crate::{
    partition::{PartitionFailure, PartitionId, PartitionOutcome, PartitionStats},
    pattern,
};

/// Supplies raw per-field statistics for a partition.
pub trait PartitionSource: Sync {
    /// Concrete field names known to the partition.
    fn field_names(&self, partition: &PartitionId) -> Result<Vec<String>>;

    /// Statistics of one field, or `None` when the partition has no such
    /// field.
    fn field_stats(&self, partition: &PartitionId, field: &str) -> Result<Option<FieldStats>>;
}

#[derive(Debug, Clone)]
pub struct CollectOptions {
    parallel: bool,
}

impl CollectOptions {
    pub fn new() -> CollectOptions {
        CollectOptions { parallel: true }
    }

    /// Query partitions concurrently on the rayon pool.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }
}

impl Default for CollectOptions {
    fn default() -> Self {
        CollectOptions::new()
    }
}

/// Queries every partition for the fields matching `patterns`.
///
/// Returns one outcome per partition, in the order of `partitions`. A
/// partition whose source reports an error becomes a failure outcome; the
/// remaining partitions are still collected.
pub fn collect_outcomes<S: PartitionSource>(
    partitions: &[PartitionId],
    patterns: &[String],
    source: &S,
    options: &CollectOptions,
) -> Vec<PartitionOutcome> {
    let collect_one = |partition: &PartitionId| {
        match collect_partition(partition, patterns, source) {
            Ok(stats) => PartitionOutcome::Success(stats),
            Err(e) => {
                log::warn!("failed to collect field stats from {partition}: {e}");
                PartitionOutcome::Failure(PartitionFailure::new(partition.clone(), e.to_string()))
            }
        }
    };
    if options.parallel {
        partitions.par_iter().map(collect_one).collect()
    } else {
        partitions.iter().map(collect_one).collect()
    }
}

fn collect_partition<S: PartitionSource>(
    partition: &PartitionId,
    patterns: &[String],
    source: &S,
) -> Result<PartitionStats> {
    let names = source.field_names(partition)?;
    let fields = pattern::expand(patterns, names.iter().map(String::as_str));
    let mut stats = PartitionStats::new(partition.clone());
    for field in fields {
        if let Some(field_stats) = source.field_stats(partition, &field)? {
            stats.insert(field, field_stats);
        }
    }
    log::trace!("collected {} fields from {partition}", stats.len());
    Ok(stats)
}

/// A [`PartitionSource`] backed by precomputed statistics.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    partitions: BTreeMap<PartitionId, std::result::Result<BTreeMap<String, FieldStats>, String>>,
}

impl InMemorySource {
    pub fn new() -> InMemorySource {
        InMemorySource::default()
    }

    pub fn add_field(&mut self, partition: PartitionId, name: impl Into<String>, stats: FieldStats) {
        let fields = self
            .partitions
            .entry(partition)
            .or_insert_with(|| Ok(BTreeMap::new()));
        if let Ok(fields) = fields {
            fields.insert(name.into(), stats);
        }
    }

    /// Registers a partition without fields.
    pub fn add_partition(&mut self, partition: PartitionId) {
        self.partitions
            .entry(partition)
            .or_insert_with(|| Ok(BTreeMap::new()));
    }

    /// Makes every query against `partition` fail with `reason`.
    pub fn fail_partition(&mut self, partition: PartitionId, reason: impl Into<String>) {
        self.partitions.insert(partition, Err(reason.into()));
    }

    pub fn partitions(&self) -> Vec<PartitionId> {
        self.partitions.keys().cloned().collect()
    }

    fn fields(&self, partition: &PartitionId) -> Result<&BTreeMap<String, FieldStats>> {
        match self.partitions.get(partition) {
            Some(Ok(fields)) => Ok(fields),
            Some(Err(reason)) => Err(Error::io(
                partition.to_string(),
                std::io::Error::other(reason.clone()),
            )),
            None => Err(Error::invalid_arg(
                "partition",
                format!("unknown partition {partition}"),
            )),
        }
    }
}

impl PartitionSource for InMemorySource {
    fn field_names(&self, partition: &PartitionId) -> Result<Vec<String>> {
        Ok(self.fields(partition)?.keys().cloned().collect())
    }

    fn field_stats(&self, partition: &PartitionId, field: &str) -> Result<Option<FieldStats>> {
        Ok(self.fields(partition)?.get(field).cloned())
    }
}
