//! Folds per-partition statistics into result buckets.

use std::collections::{BTreeMap, hash_map::Entry};

use ahash::AHashMap;
use fieldstats_common::Result;
use fieldstats_format::FieldStats;

use crate::{
    partition::{PartitionFailure, PartitionOutcome, PartitionStats},
    scope::Scope,
};

/// Field name to merged statistics, for one scope key.
pub type Bucket = BTreeMap<String, FieldStats>;

/// Scope key to bucket.
pub type Buckets = BTreeMap<String, Bucket>;

/// Field name to conflict message.
pub type Conflicts = BTreeMap<String, String>;

/// Merges partition outcomes, in any arrival order, into buckets selected by
/// a [`Scope`].
///
/// A field seen with two different value types within one bucket is recorded
/// as a conflict and removed from every bucket after each outcome, so it
/// never reappears even if a later partition reports it again.
pub struct Aggregator {
    scope: Scope,
    buckets: AHashMap<String, AHashMap<String, FieldStats>>,
    conflicts: Conflicts,
    successful: usize,
    failures: Vec<PartitionFailure>,
}

impl Aggregator {
    pub fn new(scope: Scope) -> Aggregator {
        Aggregator {
            scope,
            buckets: AHashMap::new(),
            conflicts: Conflicts::new(),
            successful: 0,
            failures: Vec::new(),
        }
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn push(&mut self, outcome: PartitionOutcome) -> Result<()> {
        match outcome {
            PartitionOutcome::Success(stats) => self.push_stats(stats)?,
            PartitionOutcome::Failure(failure) => self.push_failure(failure),
        }
        self.purge_conflicts();
        Ok(())
    }

    pub fn extend<I>(&mut self, outcomes: I) -> Result<()>
    where
        I: IntoIterator<Item = PartitionOutcome>,
    {
        for outcome in outcomes {
            self.push(outcome)?;
        }
        Ok(())
    }

    fn push_stats(&mut self, stats: PartitionStats) -> Result<()> {
        let key = self.scope.bucket_key(stats.group()).to_string();
        let bucket = self.buckets.entry(key).or_default();
        for (name, field) in stats.into_fields() {
            match bucket.entry(name) {
                Entry::Vacant(entry) => {
                    entry.insert(field);
                }
                Entry::Occupied(mut entry) => {
                    if entry.get().value_type() == field.value_type() {
                        entry.get_mut().accumulate(&field)?;
                    } else if !self.conflicts.contains_key(entry.key()) {
                        let message = conflict_message(entry.key(), entry.get(), &field);
                        log::debug!("{message}");
                        self.conflicts.insert(entry.key().clone(), message);
                    }
                }
            }
        }
        self.successful += 1;
        Ok(())
    }

    fn push_failure(&mut self, failure: PartitionFailure) {
        log::warn!("field stats unavailable for partition {failure}");
        self.failures.push(failure);
    }

    fn purge_conflicts(&mut self) {
        for name in self.conflicts.keys() {
            for bucket in self.buckets.values_mut() {
                bucket.remove(name);
            }
        }
    }

    pub fn finish(self) -> Aggregation {
        let buckets: Buckets = self
            .buckets
            .into_iter()
            .map(|(key, bucket)| (key, bucket.into_iter().collect()))
            .collect();
        let mut failures = self.failures;
        failures.sort();

        log::debug!(
            "aggregated {} partitions ({} failed) into {} buckets, {} conflicts",
            self.successful + failures.len(),
            failures.len(),
            buckets.len(),
            self.conflicts.len()
        );

        Aggregation {
            buckets,
            conflicts: self.conflicts,
            successful_partitions: self.successful,
            failures,
        }
    }
}

/// Result of folding every partition outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregation {
    pub buckets: Buckets,
    pub conflicts: Conflicts,
    pub successful_partitions: usize,
    pub failures: Vec<PartitionFailure>,
}

impl Aggregation {
    pub fn total_partitions(&self) -> usize {
        self.successful_partitions + self.failures.len()
    }
}

/// Names the lower type id first so the message does not depend on which
/// partition arrived first.
fn conflict_message(name: &str, a: &FieldStats, b: &FieldStats) -> String {
    let (lower, higher) = if a.type_id() <= b.type_id() {
        (a, b)
    } else {
        (b, a)
    };
    format!(
        "Field [{name}] of type [{}] conflicts with existing field of type [{}] in other index.",
        lower.display_type(),
        higher.display_type()
    )
}

#[cfg(test)]
mod tests {
    use fieldstats_format::{FieldStats, StatValue, ValueType};

    use super::Aggregator;
    use crate::{
        partition::{PartitionFailure, PartitionId, PartitionOutcome, PartitionStats},
        scope::{ALL_BUCKET_KEY, Scope},
    };

    fn long_stats(value: i64) -> FieldStats {
        FieldStats::new(ValueType::Integer, 1, 1, 1, 1, true, true)
            .with_range(StatValue::from(value), StatValue::from(value))
            .unwrap()
    }

    fn text_stats(value: &str) -> FieldStats {
        FieldStats::new(ValueType::Text, 1, 1, 1, 1, true, false)
            .with_range(StatValue::from(value), StatValue::from(value))
            .unwrap()
    }

    fn partition(group: &str, shard: u32, fields: Vec<(&str, FieldStats)>) -> PartitionOutcome {
        PartitionOutcome::Success(fields.into_iter().fold(
            PartitionStats::new(PartitionId::new(group, shard)),
            |stats, (name, field)| stats.with_field(name, field),
        ))
    }

    #[test]
    fn test_cluster_scope_merges_everything() {
        let mut aggregator = Aggregator::new(Scope::Cluster);
        aggregator
            .extend([
                partition("test1", 0, vec![("value", long_stats(1))]),
                partition("test2", 0, vec![("value", long_stats(3))]),
            ])
            .unwrap();
        let result = aggregator.finish();

        assert_eq!(result.buckets.len(), 1);
        let merged = &result.buckets[ALL_BUCKET_KEY]["value"];
        assert_eq!(merged.max_doc(), 2);
        assert_eq!(merged.min_value(), Some(&StatValue::from(1)));
        assert_eq!(merged.max_value(), Some(&StatValue::from(3)));
        assert_eq!(result.successful_partitions, 2);
        assert!(result.conflicts.is_empty());
    }

    #[test]
    fn test_indices_scope_keeps_groups_apart() {
        let mut aggregator = Aggregator::new(Scope::Indices);
        aggregator
            .extend([
                partition("test1", 0, vec![("value", long_stats(1))]),
                partition("test1", 1, vec![("value", long_stats(2))]),
                partition("test2", 0, vec![("value", text_stats("a"))]),
            ])
            .unwrap();
        let result = aggregator.finish();

        assert_eq!(result.buckets.len(), 2);
        assert_eq!(result.buckets["test1"]["value"].doc_count(), 2);
        assert_eq!(result.buckets["test2"]["value"].display_type(), "string");
        // Different groups never conflict with each other.
        assert!(result.conflicts.is_empty());
    }

    #[test]
    fn test_conflict_purges_field_everywhere() {
        let mut aggregator = Aggregator::new(Scope::Cluster);
        aggregator
            .extend([
                partition("test1", 0, vec![("f", text_stats("a")), ("g", long_stats(1))]),
                partition("test2", 0, vec![("f", long_stats(1))]),
                // Re-added after the conflict was recorded.
                partition("test3", 0, vec![("f", long_stats(5))]),
            ])
            .unwrap();
        let result = aggregator.finish();

        let bucket = &result.buckets[ALL_BUCKET_KEY];
        assert!(!bucket.contains_key("f"));
        assert!(bucket.contains_key("g"));
        assert_eq!(
            result.conflicts["f"],
            "Field [f] of type [integer] conflicts with existing field of type [string] in other index."
        );
    }

    #[test]
    fn test_failures_are_counted() {
        let mut aggregator = Aggregator::new(Scope::Cluster);
        aggregator
            .extend([
                PartitionFailure::new(PartitionId::new("test1", 1), "node left").into(),
                partition("test1", 0, vec![("value", long_stats(1))]),
                PartitionFailure::new(PartitionId::new("test1", 0), "timed out").into(),
            ])
            .unwrap();
        let result = aggregator.finish();

        assert_eq!(result.total_partitions(), 3);
        assert_eq!(result.successful_partitions, 1);
        assert_eq!(result.failures.len(), 2);
        assert_eq!(result.failures[0].partition.shard, 0);
        assert_eq!(result.buckets[ALL_BUCKET_KEY].len(), 1);
    }

    #[test]
    fn test_empty_partition_still_opens_bucket() {
        let mut aggregator = Aggregator::new(Scope::Indices);
        aggregator.push(partition("empty", 0, vec![])).unwrap();
        let result = aggregator.finish();
        assert!(result.buckets["empty"].is_empty());
    }
}
