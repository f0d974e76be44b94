//! The closed catalogue of statistics value types.
//!
//! Each type carries a fixed numeric id. The id doubles as the wire
//! discriminator and as the tie-break order for type-conflict messages, so
//! existing ids must never be renumbered; new types get the next free id.

use std::fmt;

/// Kind of values a field's statistics are expressed in.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueType {
    Integer = 0,
    Float = 1,
    Date = 2,
    Text = 3,
    Ip = 4,
    GeoPoint = 5,
}

impl ValueType {
    pub const ALL: [ValueType; 6] = [
        ValueType::Integer,
        ValueType::Float,
        ValueType::Date,
        ValueType::Text,
        ValueType::Ip,
        ValueType::GeoPoint,
    ];

    /// Stable type id.
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<ValueType> {
        Self::ALL.get(id as usize).copied()
    }

    /// Name shown to users, e.g. in conflict messages.
    pub fn display_name(self) -> &'static str {
        match self {
            ValueType::Integer => "integer",
            ValueType::Float => "float",
            ValueType::Date => "date",
            ValueType::Text => "string",
            ValueType::Ip => "ip",
            ValueType::GeoPoint => "geo_point",
        }
    }

    pub fn from_display_name(name: &str) -> Option<ValueType> {
        Self::ALL
            .iter()
            .copied()
            .find(|value_type| value_type.display_name() == name)
    }

    /// Whether values of this type have an order usable by index constraints.
    pub fn is_comparable(self) -> bool {
        !matches!(self, ValueType::GeoPoint)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
