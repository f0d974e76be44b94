//! Range predicates over a field's merged min or max value.

use std::{fmt, str::FromStr};

use fieldstats_common::{Error, Result};
use serde::{Deserialize, Serialize};

/// Which end of the value range a constraint looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    #[serde(rename = "min_value", alias = "min")]
    Min,
    #[serde(rename = "max_value", alias = "max")]
    Max,
}

impl Property {
    pub fn id(self) -> u8 {
        match self {
            Property::Min => 0,
            Property::Max => 1,
        }
    }

    pub fn from_id(id: u8) -> Option<Property> {
        match id {
            0 => Some(Property::Min),
            1 => Some(Property::Max),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Property::Min => "min_value",
            Property::Max => "max_value",
        }
    }
}

impl FromStr for Property {
    type Err = Error;

    fn from_str(s: &str) -> Result<Property> {
        match s {
            "min_value" | "min" => Ok(Property::Min),
            "max_value" | "max" => Ok(Property::Max),
            _ => Err(Error::validation(format!("unknown index constraint property [{s}]"))),
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Lt,
    Lte,
    Gt,
    Gte,
}

impl Comparison {
    pub fn id(self) -> u8 {
        match self {
            Comparison::Lt => 0,
            Comparison::Lte => 1,
            Comparison::Gt => 2,
            Comparison::Gte => 3,
        }
    }

    pub fn from_id(id: u8) -> Option<Comparison> {
        match id {
            0 => Some(Comparison::Lt),
            1 => Some(Comparison::Lte),
            2 => Some(Comparison::Gt),
            3 => Some(Comparison::Gte),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Comparison::Lt => "lt",
            Comparison::Lte => "lte",
            Comparison::Gt => "gt",
            Comparison::Gte => "gte",
        }
    }
}

impl FromStr for Comparison {
    type Err = Error;

    fn from_str(s: &str) -> Result<Comparison> {
        match s {
            "lt" => Ok(Comparison::Lt),
            "lte" => Ok(Comparison::Lte),
            "gt" => Ok(Comparison::Gt),
            "gte" => Ok(Comparison::Gte),
            _ => Err(Error::validation(format!(
                "unknown index constraint comparison [{s}]"
            ))),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A caller-supplied predicate such as "min_value of `timestamp` >= 2014-01-01".
///
/// The value is kept as text and parsed against the type of the field it is
/// evaluated on; `format` only matters for date fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexConstraint {
    field: String,
    property: Property,
    comparison: Comparison,
    value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    format: Option<String>,
}

impl IndexConstraint {
    pub fn new(
        field: impl Into<String>,
        property: Property,
        comparison: Comparison,
        value: impl Into<String>,
    ) -> IndexConstraint {
        IndexConstraint {
            field: field.into(),
            property,
            comparison,
            value: value.into(),
            format: None,
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> IndexConstraint {
        self.format = Some(format.into());
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn property(&self) -> Property {
        self.property
    }

    pub fn comparison(&self) -> Comparison {
        self.comparison
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }
}

impl fmt::Display for IndexConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} {} [{}]",
            self.field, self.property, self.comparison, self.value
        )?;
        if let Some(format) = &self.format {
            write!(f, " (format {format})")?;
        }
        Ok(())
    }
}
