use std::collections::BTreeSet;

use fieldstats_common::{Error, Result};
use fieldstats_format::IndexConstraint;
use serde::{Deserialize, Serialize};

use crate::scope::Scope;

/// A field statistics request: which fields to report, how to group the
/// result, and which constraints a bucket must satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldStatsRequest {
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub index_constraints: Vec<IndexConstraint>,
    /// `cluster` or `indices`, kept as text so validation can report it.
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    Scope::default().name().to_string()
}

impl FieldStatsRequest {
    pub fn new<I, S>(fields: I) -> FieldStatsRequest
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldStatsRequest {
            fields: fields.into_iter().map(Into::into).collect(),
            index_constraints: Vec::new(),
            level: default_level(),
        }
    }

    pub fn with_constraint(mut self, constraint: IndexConstraint) -> Self {
        self.index_constraints.push(constraint);
        self
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.level = scope.name().to_string();
        self
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Checks the request, reporting every problem at once.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();
        if self.level.parse::<Scope>().is_err() {
            problems.push(format!("invalid level option [{}]", self.level));
        }
        if self.fields.is_empty() {
            problems.push("no fields specified".to_string());
        }
        for constraint in &self.index_constraints {
            if constraint.field().is_empty() {
                problems.push("index constraint without a field".to_string());
            }
        }
        if problems.is_empty() {
            return Ok(());
        }
        let message = problems
            .iter()
            .enumerate()
            .map(|(i, problem)| format!("{}: {problem};", i + 1))
            .collect::<Vec<_>>()
            .join(" ");
        Err(Error::validation(message))
    }

    pub fn scope(&self) -> Result<Scope> {
        self.level.parse()
    }

    /// Field patterns each partition is asked for: the requested fields plus
    /// every constraint field.
    pub fn partition_fields(&self) -> Vec<String> {
        self.fields
            .iter()
            .map(String::as_str)
            .chain(self.index_constraints.iter().map(IndexConstraint::field))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}
