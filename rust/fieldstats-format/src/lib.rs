//! Value model for per-field statistics: typed min/max values, the statistics
//! record itself with its merge and constraint-match rules, index constraints,
//! and the binary wire form used between partitions.

pub mod constraint;
pub mod date_format;
pub mod field_stats;
pub mod value;
pub mod value_type;
pub mod wire;


pub use constraint::{Comparison, IndexConstraint, Property};
pub use date_format::DateFormat;
pub use field_stats::FieldStats;
pub use value::StatValue;
pub use value_type::ValueType;
