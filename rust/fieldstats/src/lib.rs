//! Cross-partition field statistics.
//!
//! Partitions of a document index report per-field statistics
//! ([`FieldStats`]) independently. This crate collects them
//! ([`collect_outcomes`]), merges them into result buckets while dropping
//! fields whose type differs between partitions ([`Aggregator`]), and prunes
//! buckets that fail index constraints ([`ConstraintEvaluator`]).
//! [`evaluate`] ties the stages together.

pub mod aggregator;
pub mod collect;
pub mod constraints;
pub mod evaluate;
pub mod partition;
pub mod pattern;
pub mod request;
pub mod response;
pub mod scope;


pub use aggregator::{Aggregation, Aggregator, Bucket, Buckets, Conflicts};
pub use collect::{CollectOptions, InMemorySource, PartitionSource, collect_outcomes};
pub use constraints::{ConstraintEvaluator, PruningPlan};
pub use evaluate::evaluate;
pub use partition::{PartitionFailure, PartitionId, PartitionOutcome, PartitionStats};
pub use pattern::simple_match;
pub use request::FieldStatsRequest;
pub use response::FieldStatsResponse;
pub use scope::{ALL_BUCKET_KEY, Scope};

pub use fieldstats_format::{
    Comparison, DateFormat, FieldStats, IndexConstraint, Property, StatValue, ValueType,
};
