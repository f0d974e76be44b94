//! Per-field statistics gathered from one partition, and the rules for merging
//! them across partitions and testing them against index constraints.

use std::cmp::Ordering;

use fieldstats_common::{Error, Result, verify_arg};

use crate::{
    constraint::{Comparison, IndexConstraint, Property},
    value::StatValue,
    value_type::ValueType,
};

/// Statistics for one field over one partition, or over any number of merged
/// partitions.
///
/// `min` and `max` are either both present or both absent; absence means no
/// document carried a value for the field. When present, both hold values of
/// `value_type`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldStats {
    value_type: ValueType,
    max_doc: u64,
    doc_count: u64,
    sum_doc_freq: u64,
    sum_total_term_freq: u64,
    searchable: bool,
    aggregatable: bool,
    min: Option<StatValue>,
    max: Option<StatValue>,
}

impl FieldStats {
    /// Creates statistics without a value range, for a field that exists in
    /// the partition but has no observed values.
    pub fn new(
        value_type: ValueType,
        max_doc: u64,
        doc_count: u64,
        sum_doc_freq: u64,
        sum_total_term_freq: u64,
        searchable: bool,
        aggregatable: bool,
    ) -> FieldStats {
        FieldStats {
            value_type,
            max_doc,
            doc_count,
            sum_doc_freq,
            sum_total_term_freq,
            searchable,
            aggregatable,
            min: None,
            max: None,
        }
    }

    /// Attaches the observed value range.
    ///
    /// Both values must be of this field's type.
    pub fn with_range(mut self, min: StatValue, max: StatValue) -> Result<FieldStats> {
        verify_arg!(min, min.value_type() == self.value_type);
        verify_arg!(max, max.value_type() == self.value_type);
        self.min = Some(min);
        self.max = Some(max);
        Ok(self)
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Stable id of the value type, see [`ValueType::id`].
    pub fn type_id(&self) -> u8 {
        self.value_type.id()
    }

    pub fn display_type(&self) -> &'static str {
        self.value_type.display_name()
    }

    /// Number of documents scanned, with or without the field.
    pub fn max_doc(&self) -> u64 {
        self.max_doc
    }

    /// Number of documents carrying the field.
    pub fn doc_count(&self) -> u64 {
        self.doc_count
    }

    pub fn sum_doc_freq(&self) -> u64 {
        self.sum_doc_freq
    }

    pub fn sum_total_term_freq(&self) -> u64 {
        self.sum_total_term_freq
    }

    pub fn is_searchable(&self) -> bool {
        self.searchable
    }

    pub fn is_aggregatable(&self) -> bool {
        self.aggregatable
    }

    pub fn min_value(&self) -> Option<&StatValue> {
        self.min.as_ref()
    }

    pub fn max_value(&self) -> Option<&StatValue> {
        self.max.as_ref()
    }

    pub fn has_min_max(&self) -> bool {
        self.min.is_some() && self.max.is_some()
    }

    pub fn min_value_as_string(&self) -> Option<String> {
        self.min.as_ref().map(ToString::to_string)
    }

    pub fn max_value_as_string(&self) -> Option<String> {
        self.max.as_ref().map(ToString::to_string)
    }

    /// Percentage (rounded down) of scanned documents that carry the field.
    pub fn density(&self) -> u32 {
        if self.max_doc == 0 {
            return 0;
        }
        (self.doc_count as u128 * 100 / self.max_doc as u128) as u32
    }

    /// Merges `other` into `self`.
    ///
    /// Counts are summed, capability flags are OR-ed (a partition that lacks
    /// the capability says nothing against the ones that have it) and the
    /// value ranges are widened, ignoring sides without a range. The merge is
    /// associative and commutative, so any fold order gives the same result.
    ///
    /// Both statistics must share the value type; mixing types is a conflict
    /// the caller resolves before merging.
    pub fn accumulate(&mut self, other: &FieldStats) -> Result<()> {
        verify_arg!(other, other.value_type == self.value_type);

        self.max_doc = self.max_doc.saturating_add(other.max_doc);
        self.doc_count = self.doc_count.saturating_add(other.doc_count);
        self.sum_doc_freq = self.sum_doc_freq.saturating_add(other.sum_doc_freq);
        self.sum_total_term_freq = self
            .sum_total_term_freq
            .saturating_add(other.sum_total_term_freq);
        self.searchable |= other.searchable;
        self.aggregatable |= other.aggregatable;

        self.min = merge_bound(self.min.take(), other.min.as_ref(), StatValue::min_of);
        self.max = merge_bound(self.max.take(), other.max.as_ref(), StatValue::max_of);
        Ok(())
    }

    /// Returns the merge of `self` and `other`, leaving both untouched.
    pub fn merged(&self, other: &FieldStats) -> Result<FieldStats> {
        let mut result = self.clone();
        result.accumulate(other)?;
        Ok(result)
    }

    /// Tests the statistics against an index constraint.
    ///
    /// Statistics without a value range never match. A constraint value that
    /// cannot be parsed as this field's type is reported as an error rather
    /// than as a mismatch, as is any constraint over a geo point field.
    pub fn matches(&self, constraint: &IndexConstraint) -> Result<bool> {
        if !self.value_type.is_comparable() {
            return Err(Error::unsupported_constraint(
                constraint.field(),
                self.value_type.display_name(),
            ));
        }

        let (Some(min), Some(max)) = (&self.min, &self.max) else {
            return Ok(false);
        };
        let value = match constraint.property() {
            Property::Min => min,
            Property::Max => max,
        };

        let bound = StatValue::parse(
            self.value_type,
            constraint.value(),
            constraint.format(),
            value.date_format(),
        )?;
        let ordering = value.compare(&bound).ok_or_else(|| {
            Error::unsupported_constraint(constraint.field(), self.value_type.display_name())
        })?;

        Ok(match constraint.comparison() {
            Comparison::Lt => ordering == Ordering::Less,
            Comparison::Lte => ordering != Ordering::Greater,
            Comparison::Gt => ordering == Ordering::Greater,
            Comparison::Gte => ordering != Ordering::Less,
        })
    }
}

fn merge_bound(
    current: Option<StatValue>,
    other: Option<&StatValue>,
    pick: fn(&StatValue, &StatValue) -> StatValue,
) -> Option<StatValue> {
    match (current, other) {
        (Some(current), Some(other)) => Some(pick(&current, other)),
        (Some(current), None) => Some(current),
        (None, other) => other.cloned(),
    }
}
