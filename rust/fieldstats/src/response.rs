use fieldstats_format::FieldStats;

use crate::{
    aggregator::{Bucket, Buckets, Conflicts},
    partition::PartitionFailure,
    scope::ALL_BUCKET_KEY,
};

/// Final answer of an evaluation: merged statistics per surviving bucket,
/// the fields dropped for type conflicts, and partition accounting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldStatsResponse {
    pub(crate) total_partitions: usize,
    pub(crate) successful_partitions: usize,
    pub(crate) failures: Vec<PartitionFailure>,
    pub(crate) buckets: Buckets,
    pub(crate) conflicts: Conflicts,
}

impl FieldStatsResponse {
    pub fn total_partitions(&self) -> usize {
        self.total_partitions
    }

    pub fn successful_partitions(&self) -> usize {
        self.successful_partitions
    }

    pub fn failed_partitions(&self) -> usize {
        self.failures.len()
    }

    pub fn failures(&self) -> &[PartitionFailure] {
        &self.failures
    }

    pub fn buckets(&self) -> &Buckets {
        &self.buckets
    }

    pub fn bucket(&self, key: &str) -> Option<&Bucket> {
        self.buckets.get(key)
    }

    /// The single cluster-wide bucket, when evaluated with `Scope::Cluster`
    /// and not pruned by a constraint.
    pub fn all_field_stats(&self) -> Option<&Bucket> {
        self.bucket(ALL_BUCKET_KEY)
    }

    pub fn field_stats(&self, key: &str, field: &str) -> Option<&FieldStats> {
        self.bucket(key)?.get(field)
    }

    pub fn conflicts(&self) -> &Conflicts {
        &self.conflicts
    }

    pub fn into_buckets(self) -> Buckets {
        self.buckets
    }
}
