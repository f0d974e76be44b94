//! Typed min/max values carried by field statistics.
//!
//! Every [`StatValue`] variant belongs to exactly one [`ValueType`]. Values of
//! the same type are totally ordered (except geo points, which only carry a
//! bounding box), have a canonical display string, and can be parsed back from
//! a string for use in index constraints.

use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    net::{IpAddr, Ipv6Addr},
};

use fieldstats_common::{Error, Result};

use crate::{date_format::DateFormat, value_type::ValueType};

#[derive(Debug, Clone)]
pub enum StatValue {
    Integer64(i64),
    Float64(f64),
    /// Milliseconds since the epoch, displayed with the field's resolved format.
    Timestamp {
        millis: i64,
        format: DateFormat,
    },
    /// Raw term bytes, ordered by unsigned byte value.
    Text(Vec<u8>),
    /// Network-order 16-byte address; IPv4 is stored IPv4-mapped.
    IpAddress([u8; 16]),
    GeoPoint {
        lat: f64,
        lon: f64,
    },
}

impl StatValue {
    pub fn timestamp(millis: i64, format: DateFormat) -> StatValue {
        StatValue::Timestamp { millis, format }
    }

    pub fn text(value: impl AsRef<[u8]>) -> StatValue {
        StatValue::Text(value.as_ref().to_vec())
    }

    pub fn ip(addr: IpAddr) -> StatValue {
        let normalized = match addr {
            IpAddr::V4(v4) => v4.to_ipv6_mapped(),
            IpAddr::V6(v6) => v6,
        };
        StatValue::IpAddress(normalized.octets())
    }

    pub fn geo_point(lat: f64, lon: f64) -> StatValue {
        StatValue::GeoPoint { lat, lon }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            StatValue::Integer64(_) => ValueType::Integer,
            StatValue::Float64(_) => ValueType::Float,
            StatValue::Timestamp { .. } => ValueType::Date,
            StatValue::Text(_) => ValueType::Text,
            StatValue::IpAddress(_) => ValueType::Ip,
            StatValue::GeoPoint { .. } => ValueType::GeoPoint,
        }
    }

    /// Orders two values of the same comparable type.
    ///
    /// Returns `None` for geo points and for values of different types; the
    /// aggregation never compares across types, a mismatch there is treated
    /// as a conflict instead.
    pub fn compare(&self, other: &StatValue) -> Option<Ordering> {
        match (self, other) {
            (StatValue::Integer64(l), StatValue::Integer64(r)) => Some(l.cmp(r)),
            (StatValue::Float64(l), StatValue::Float64(r)) => Some(l.total_cmp(r)),
            (StatValue::Timestamp { millis: l, .. }, StatValue::Timestamp { millis: r, .. }) => {
                Some(l.cmp(r))
            }
            (StatValue::Text(l), StatValue::Text(r)) => Some(l.cmp(r)),
            (StatValue::IpAddress(l), StatValue::IpAddress(r)) => Some(l.cmp(r)),
            _ => None,
        }
    }

    /// Parses `raw` as a value of `value_type`.
    ///
    /// The format hint only applies to dates; when it is absent dates are
    /// parsed with `default_date_format` (the field's own format) or the
    /// standard date format.
    pub fn parse(
        value_type: ValueType,
        raw: &str,
        format: Option<&str>,
        default_date_format: Option<&DateFormat>,
    ) -> Result<StatValue> {
        match value_type {
            ValueType::Integer => raw
                .trim()
                .parse::<i64>()
                .map(StatValue::Integer64)
                .map_err(|_| invalid_value(raw, value_type)),
            ValueType::Float => raw
                .trim()
                .parse::<f64>()
                .map(StatValue::Float64)
                .map_err(|_| invalid_value(raw, value_type)),
            ValueType::Date => {
                let format = match format {
                    Some(pattern) => DateFormat::parse(pattern)?,
                    None => default_date_format.cloned().unwrap_or_default(),
                };
                let millis = format.parse_millis(raw)?;
                Ok(StatValue::Timestamp { millis, format })
            }
            ValueType::Text => Ok(StatValue::text(raw)),
            ValueType::Ip => raw
                .trim()
                .parse::<IpAddr>()
                .map(StatValue::ip)
                .map_err(|_| invalid_value(raw, value_type)),
            ValueType::GeoPoint => parse_geo_point(raw).ok_or_else(|| invalid_value(raw, value_type)),
        }
    }

    /// Smaller of two values of the same type. Geo points merge
    /// component-wise, yielding the lower-left corner of the bounding box.
    ///
    /// The choice never depends on operand order: dates with equal millis
    /// keep the format with the smaller pattern, and floats order with
    /// `total_cmp`, so `-0.0` is below `0.0`.
    pub fn min_of(&self, other: &StatValue) -> StatValue {
        match (self, other) {
            (
                StatValue::GeoPoint { lat: l_lat, lon: l_lon },
                StatValue::GeoPoint { lat: r_lat, lon: r_lon },
            ) => StatValue::GeoPoint {
                lat: total_min(*l_lat, *r_lat),
                lon: total_min(*l_lon, *r_lon),
            },
            _ => match self.merge_order(other) {
                Some(Ordering::Greater) => other.clone(),
                _ => self.clone(),
            },
        }
    }

    /// Larger of two values of the same type. Geo points merge
    /// component-wise, yielding the upper-right corner of the bounding box.
    ///
    /// Ties are broken the same way as in [`StatValue::min_of`].
    pub fn max_of(&self, other: &StatValue) -> StatValue {
        match (self, other) {
            (
                StatValue::GeoPoint { lat: l_lat, lon: l_lon },
                StatValue::GeoPoint { lat: r_lat, lon: r_lon },
            ) => StatValue::GeoPoint {
                lat: total_max(*l_lat, *r_lat),
                lon: total_max(*l_lon, *r_lon),
            },
            _ => match self.merge_order(other) {
                Some(Ordering::Less) => other.clone(),
                _ => self.clone(),
            },
        }
    }

    /// [`StatValue::compare`] refined so that `Equal` only holds for equal
    /// values.
    fn merge_order(&self, other: &StatValue) -> Option<Ordering> {
        match (self, other) {
            (
                StatValue::Timestamp {
                    millis: l_millis,
                    format: l_format,
                },
                StatValue::Timestamp {
                    millis: r_millis,
                    format: r_format,
                },
            ) => Some(
                l_millis
                    .cmp(r_millis)
                    .then_with(|| l_format.pattern().cmp(&r_format.pattern())),
            ),
            _ => self.compare(other),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            StatValue::Integer64(v) => Some(*v),
            StatValue::Timestamp { millis, .. } => Some(*millis),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            StatValue::Float64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            StatValue::Text(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn as_ip(&self) -> Option<IpAddr> {
        match self {
            StatValue::IpAddress(octets) => {
                let v6 = Ipv6Addr::from(*octets);
                Some(match v6.to_ipv4_mapped() {
                    Some(v4) => IpAddr::V4(v4),
                    None => IpAddr::V6(v6),
                })
            }
            _ => None,
        }
    }

    pub fn date_format(&self) -> Option<&DateFormat> {
        match self {
            StatValue::Timestamp { format, .. } => Some(format),
            _ => None,
        }
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Integer64(v) => write!(f, "{v}"),
            StatValue::Float64(v) => write!(f, "{v:?}"),
            StatValue::Timestamp { millis, format } => f.write_str(&format.format_millis(*millis)),
            StatValue::Text(v) => f.write_str(&String::from_utf8_lossy(v)),
            StatValue::IpAddress(_) => match self.as_ip() {
                Some(addr) => write!(f, "{addr}"),
                None => Ok(()),
            },
            StatValue::GeoPoint { lat, lon } => write!(f, "{lat:?}, {lon:?}"),
        }
    }
}

// Floating point payloads compare by bit pattern so that equality, hashing
// and wire round trips agree, NaN included.
impl PartialEq for StatValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (StatValue::Integer64(l), StatValue::Integer64(r)) => l == r,
            (StatValue::Float64(l), StatValue::Float64(r)) => l.to_bits() == r.to_bits(),
            (
                StatValue::Timestamp {
                    millis: l_millis,
                    format: l_format,
                },
                StatValue::Timestamp {
                    millis: r_millis,
                    format: r_format,
                },
            ) => l_millis == r_millis && l_format == r_format,
            (StatValue::Text(l), StatValue::Text(r)) => l == r,
            (StatValue::IpAddress(l), StatValue::IpAddress(r)) => l == r,
            (
                StatValue::GeoPoint { lat: l_lat, lon: l_lon },
                StatValue::GeoPoint { lat: r_lat, lon: r_lon },
            ) => l_lat.to_bits() == r_lat.to_bits() && l_lon.to_bits() == r_lon.to_bits(),
            _ => false,
        }
    }
}

impl Eq for StatValue {}

impl Hash for StatValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value_type().id().hash(state);
        match self {
            StatValue::Integer64(v) => v.hash(state),
            StatValue::Float64(v) => v.to_bits().hash(state),
            StatValue::Timestamp { millis, format } => {
                millis.hash(state);
                format.hash(state);
            }
            StatValue::Text(v) => v.hash(state),
            StatValue::IpAddress(v) => v.hash(state),
            StatValue::GeoPoint { lat, lon } => {
                lat.to_bits().hash(state);
                lon.to_bits().hash(state);
            }
        }
    }
}

impl From<i64> for StatValue {
    fn from(value: i64) -> StatValue {
        StatValue::Integer64(value)
    }
}

impl From<f64> for StatValue {
    fn from(value: f64) -> StatValue {
        StatValue::Float64(value)
    }
}

impl From<&str> for StatValue {
    fn from(value: &str) -> StatValue {
        StatValue::text(value)
    }
}

impl From<IpAddr> for StatValue {
    fn from(value: IpAddr) -> StatValue {
        StatValue::ip(value)
    }
}

fn invalid_value(raw: &str, value_type: ValueType) -> Error {
    Error::validation(format!(
        "failed to parse value [{raw}] as type [{value_type}]"
    ))
}

fn total_min(l: f64, r: f64) -> f64 {
    if r.total_cmp(&l).is_lt() { r } else { l }
}

fn total_max(l: f64, r: f64) -> f64 {
    if r.total_cmp(&l).is_gt() { r } else { l }
}

fn parse_geo_point(raw: &str) -> Option<StatValue> {
    let (lat, lon) = raw.split_once(',')?;
    let lat = lat.trim().parse::<f64>().ok()?;
    let lon = lon.trim().parse::<f64>().ok()?;
    Some(StatValue::GeoPoint { lat, lon })
}
