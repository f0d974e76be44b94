use fieldstats_common::Result;
use fieldstats_format::IndexConstraint;

use crate::{
    aggregator::Aggregator,
    collect::{CollectOptions, PartitionSource, collect_outcomes},
    constraints::ConstraintEvaluator,
    partition::{PartitionId, PartitionOutcome},
    request::FieldStatsRequest,
    response::FieldStatsResponse,
    scope::Scope,
};

/// Merges the partition outcomes into buckets of `scope`, then drops the
/// buckets failing any of `constraints`.
///
/// Fields that appear only in `constraints` and do not match any of the
/// `requested_fields` patterns are removed from the result. A pattern match
/// is enough, the exact field name need not be requested: with `["*"]`
/// requested, constraint fields stay. The outcome order does not affect the
/// result.
pub fn evaluate<I>(
    partitions: I,
    scope: Scope,
    constraints: &[IndexConstraint],
    requested_fields: &[String],
) -> Result<FieldStatsResponse>
where
    I: IntoIterator<Item = PartitionOutcome>,
{
    let mut aggregator = Aggregator::new(scope);
    aggregator.extend(partitions)?;
    let mut aggregation = aggregator.finish();

    if !constraints.is_empty() {
        let plan = ConstraintEvaluator::new(constraints, requested_fields)
            .apply(&mut aggregation.buckets)?;
        log::debug!(
            "{} buckets pruned by {} index constraints",
            plan.failed_buckets.len(),
            constraints.len()
        );
    }

    Ok(FieldStatsResponse {
        total_partitions: aggregation.total_partitions(),
        successful_partitions: aggregation.successful_partitions,
        failures: aggregation.failures,
        buckets: aggregation.buckets,
        conflicts: aggregation.conflicts,
    })
}

impl FieldStatsRequest {
    /// Validates the request and evaluates it over already collected
    /// partition outcomes.
    pub fn evaluate<I>(&self, partitions: I) -> Result<FieldStatsResponse>
    where
        I: IntoIterator<Item = PartitionOutcome>,
    {
        self.validate()?;
        evaluate(
            partitions,
            self.scope()?,
            &self.index_constraints,
            &self.fields,
        )
    }

    /// Collects statistics from every partition through `source`, then
    /// evaluates the request over them.
    pub fn execute<S: PartitionSource>(
        &self,
        partitions: &[PartitionId],
        source: &S,
        options: &CollectOptions,
    ) -> Result<FieldStatsResponse> {
        self.validate()?;
        let outcomes = collect_outcomes(partitions, &self.partition_fields(), source, options);
        self.evaluate(outcomes)
    }
}
