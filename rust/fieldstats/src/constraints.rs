//! Bucket pruning by index constraints.

use std::collections::BTreeSet;

use fieldstats_common::Result;
use fieldstats_format::IndexConstraint;

use crate::{aggregator::Buckets, pattern::simple_match};

/// Removes every bucket that fails at least one constraint and strips the
/// fields that were only collected to evaluate constraints.
///
/// Evaluation runs against the merged buckets before anything is removed, so
/// an invalid constraint leaves the buckets untouched and two constraints on
/// the same constraint-only field both see it.
pub struct ConstraintEvaluator<'a> {
    constraints: &'a [IndexConstraint],
    requested_fields: &'a [String],
}

/// What [`ConstraintEvaluator::apply`] removes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruningPlan {
    pub failed_buckets: BTreeSet<String>,
    pub stripped_fields: BTreeSet<String>,
}

impl<'a> ConstraintEvaluator<'a> {
    pub fn new(
        constraints: &'a [IndexConstraint],
        requested_fields: &'a [String],
    ) -> ConstraintEvaluator<'a> {
        ConstraintEvaluator {
            constraints,
            requested_fields,
        }
    }

    /// Whether `field` was asked for by the caller, directly or through a
    /// wildcard pattern.
    pub fn is_requested(&self, field: &str) -> bool {
        self.requested_fields
            .iter()
            .any(|pattern| simple_match(pattern, field))
    }

    pub fn plan(&self, buckets: &Buckets) -> Result<PruningPlan> {
        let mut plan = PruningPlan::default();
        for constraint in self.constraints {
            for (key, bucket) in buckets {
                if plan.failed_buckets.contains(key) {
                    continue;
                }
                let satisfied = match bucket.get(constraint.field()) {
                    Some(stats) => stats.matches(constraint)?,
                    None => false,
                };
                if !satisfied {
                    log::debug!("bucket [{key}] fails index constraint {constraint}");
                    plan.failed_buckets.insert(key.clone());
                }
            }
            if !self.is_requested(constraint.field()) {
                plan.stripped_fields.insert(constraint.field().to_string());
            }
        }
        Ok(plan)
    }

    pub fn apply(&self, buckets: &mut Buckets) -> Result<PruningPlan> {
        let plan = self.plan(buckets)?;
        buckets.retain(|key, _| !plan.failed_buckets.contains(key));
        for bucket in buckets.values_mut() {
            for field in &plan.stripped_fields {
                bucket.remove(field);
            }
        }
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use fieldstats_format::{Comparison, FieldStats, IndexConstraint, Property, StatValue, ValueType};

    use super::ConstraintEvaluator;
    use crate::aggregator::{Bucket, Buckets};

    fn long_stats(value: i64) -> FieldStats {
        FieldStats::new(ValueType::Integer, 1, 1, 1, 1, true, true)
            .with_range(StatValue::from(value), StatValue::from(value))
            .unwrap()
    }

    fn buckets() -> Buckets {
        let mut buckets = Buckets::new();
        for (key, value) in [("test1", 1), ("test2", 3)] {
            let mut bucket = Bucket::new();
            bucket.insert("value".to_string(), long_stats(value));
            bucket.insert("other".to_string(), long_stats(value * 10));
            buckets.insert(key.to_string(), bucket);
        }
        buckets
    }

    fn value_constraint(property: Property, comparison: Comparison, value: &str) -> IndexConstraint {
        IndexConstraint::new("value", property, comparison, value)
    }

    fn surviving(constraints: &[IndexConstraint]) -> Vec<String> {
        let requested = vec!["value".to_string()];
        let mut buckets = buckets();
        ConstraintEvaluator::new(constraints, &requested)
            .apply(&mut buckets)
            .unwrap();
        buckets.into_keys().collect()
    }

    #[test]
    fn test_and_semantics() {
        assert_eq!(
            surviving(&[
                value_constraint(Property::Min, Comparison::Gte, "1"),
                value_constraint(Property::Max, Comparison::Lte, "2"),
            ]),
            vec!["test1"]
        );
        assert!(
            surviving(&[
                value_constraint(Property::Min, Comparison::Gt, "3"),
                value_constraint(Property::Max, Comparison::Lte, "4"),
            ])
            .is_empty()
        );
        assert_eq!(
            surviving(&[
                value_constraint(Property::Min, Comparison::Gte, "1"),
                value_constraint(Property::Max, Comparison::Lte, "3"),
            ]),
            vec!["test1", "test2"]
        );
    }

    #[test]
    fn test_missing_field_fails_bucket() {
        let constraint = IndexConstraint::new("absent", Property::Min, Comparison::Gte, "0");
        assert!(surviving(&[constraint]).is_empty());
    }

    #[test]
    fn test_constraint_only_field_is_stripped() {
        let requested = vec!["value".to_string()];
        let constraints = [
            IndexConstraint::new("other", Property::Min, Comparison::Gte, "10"),
            IndexConstraint::new("other", Property::Max, Comparison::Lte, "30"),
        ];
        let mut buckets = buckets();
        let plan = ConstraintEvaluator::new(&constraints, &requested)
            .apply(&mut buckets)
            .unwrap();

        assert!(plan.failed_buckets.is_empty());
        assert_eq!(buckets.len(), 2);
        for bucket in buckets.values() {
            assert!(bucket.contains_key("value"));
            assert!(!bucket.contains_key("other"));
        }
    }

    #[test]
    fn test_wildcard_request_keeps_field() {
        let requested = vec!["*".to_string()];
        let constraints = [IndexConstraint::new("other", Property::Min, Comparison::Gte, "0")];
        let mut buckets = buckets();
        ConstraintEvaluator::new(&constraints, &requested)
            .apply(&mut buckets)
            .unwrap();
        assert!(buckets.values().all(|bucket| bucket.contains_key("other")));
    }

    #[test]
    fn test_invalid_value_leaves_buckets_untouched() {
        let requested = vec!["value".to_string()];
        let constraints = [
            value_constraint(Property::Min, Comparison::Gte, "2"),
            value_constraint(Property::Max, Comparison::Lte, "two"),
        ];
        let mut buckets = buckets();
        let err = ConstraintEvaluator::new(&constraints, &requested)
            .apply(&mut buckets)
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(buckets, self::buckets());
    }
}
