//! Binary form of statistics exchanged between partitions.
//!
//! Layout (little-endian):
//!
//! ```text
//! field_stats := type_id:u8 max_doc:u64 doc_count:u64 sum_doc_freq:u64
//!                sum_total_term_freq:u64 flags:u8 [min:value max:value]
//! flags       := bit0 searchable | bit1 aggregatable | bit2 has_range
//! value       := i64                       (integer)
//!              | f64                       (float)
//!              | string i64                (date: format pattern, millis)
//!              | len:u32 bytes             (text)
//!              | [u8; 16]                  (ip)
//!              | f64 f64                   (geo point: lat, lon)
//! string      := len:u32 utf8
//! ```
//!
//! The leading type id makes every record self-describing, so readers can
//! reject unknown types instead of misreading the payload.

use std::io::{self, Read, Write};

use byteorder::{LE, ReadBytesExt, WriteBytesExt};
use fieldstats_common::{Error, Result, verify_data};

use crate::{
    date_format::DateFormat, field_stats::FieldStats, value::StatValue, value_type::ValueType,
};

const FLAG_SEARCHABLE: u8 = 0x1;
const FLAG_AGGREGATABLE: u8 = 0x2;
const FLAG_HAS_RANGE: u8 = 0x4;
const KNOWN_FLAGS: u8 = FLAG_SEARCHABLE | FLAG_AGGREGATABLE | FLAG_HAS_RANGE;

impl FieldStats {
    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_u8(self.type_id())?;
        w.write_u64::<LE>(self.max_doc())?;
        w.write_u64::<LE>(self.doc_count())?;
        w.write_u64::<LE>(self.sum_doc_freq())?;
        w.write_u64::<LE>(self.sum_total_term_freq())?;

        let mut flags = 0u8;
        if self.is_searchable() {
            flags |= FLAG_SEARCHABLE;
        }
        if self.is_aggregatable() {
            flags |= FLAG_AGGREGATABLE;
        }
        let range = self.min_value().zip(self.max_value());
        if range.is_some() {
            flags |= FLAG_HAS_RANGE;
        }
        w.write_u8(flags)?;

        if let Some((min, max)) = range {
            write_value(w, min)?;
            write_value(w, max)?;
        }
        Ok(())
    }

    pub fn read_from<R: Read>(r: &mut R) -> Result<FieldStats> {
        let type_id = r.read_u8()?;
        let value_type = ValueType::from_id(type_id).ok_or_else(|| {
            Error::invalid_format("field_stats", format!("unknown type id {type_id}"))
        })?;
        let max_doc = r.read_u64::<LE>()?;
        let doc_count = r.read_u64::<LE>()?;
        let sum_doc_freq = r.read_u64::<LE>()?;
        let sum_total_term_freq = r.read_u64::<LE>()?;
        let flags = r.read_u8()?;
        verify_data!(flags, flags & !KNOWN_FLAGS == 0);

        let stats = FieldStats::new(
            value_type,
            max_doc,
            doc_count,
            sum_doc_freq,
            sum_total_term_freq,
            flags & FLAG_SEARCHABLE != 0,
            flags & FLAG_AGGREGATABLE != 0,
        );
        if flags & FLAG_HAS_RANGE == 0 {
            return Ok(stats);
        }
        let min = read_value(r, value_type)?;
        let max = read_value(r, value_type)?;
        stats
            .with_range(min, max)
            .map_err(|e| Error::invalid_format("field_stats", e.to_string()))
    }

    /// Fails only when a byte string is longer than `u32::MAX`.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    pub fn from_bytes(mut bytes: &[u8]) -> Result<FieldStats> {
        let stats = FieldStats::read_from(&mut bytes)?;
        verify_data!(trailing_bytes, bytes.is_empty());
        Ok(stats)
    }
}

pub fn write_value<W: Write>(w: &mut W, value: &StatValue) -> Result<()> {
    match value {
        StatValue::Integer64(v) => w.write_i64::<LE>(*v)?,
        StatValue::Float64(v) => w.write_f64::<LE>(*v)?,
        StatValue::Timestamp { millis, format } => {
            write_string(w, &format.pattern())?;
            w.write_i64::<LE>(*millis)?;
        }
        StatValue::Text(bytes) => write_bytes(w, bytes)?,
        StatValue::IpAddress(octets) => w.write_all(octets)?,
        StatValue::GeoPoint { lat, lon } => {
            w.write_f64::<LE>(*lat)?;
            w.write_f64::<LE>(*lon)?;
        }
    }
    Ok(())
}

pub fn read_value<R: Read>(r: &mut R, value_type: ValueType) -> Result<StatValue> {
    let value = match value_type {
        ValueType::Integer => StatValue::Integer64(r.read_i64::<LE>()?),
        ValueType::Float => StatValue::Float64(r.read_f64::<LE>()?),
        ValueType::Date => {
            let pattern = read_string(r)?;
            let format = DateFormat::parse(&pattern)
                .map_err(|e| Error::invalid_format("date_format", e.to_string()))?;
            let millis = r.read_i64::<LE>()?;
            StatValue::Timestamp { millis, format }
        }
        ValueType::Text => StatValue::Text(read_bytes(r)?),
        ValueType::Ip => {
            let mut octets = [0u8; 16];
            r.read_exact(&mut octets)?;
            StatValue::IpAddress(octets)
        }
        ValueType::GeoPoint => {
            let lat = r.read_f64::<LE>()?;
            let lon = r.read_f64::<LE>()?;
            StatValue::GeoPoint { lat, lon }
        }
    };
    Ok(value)
}

pub fn write_bytes<W: Write>(w: &mut W, bytes: &[u8]) -> Result<()> {
    let len = u32::try_from(bytes.len())
        .map_err(|_| Error::invalid_arg("bytes", "length exceeds u32::MAX"))?;
    w.write_u32::<LE>(len)?;
    w.write_all(bytes)?;
    Ok(())
}

pub fn read_bytes<R: Read>(r: &mut R) -> Result<Vec<u8>> {
    let len = r.read_u32::<LE>()? as usize;
    let mut bytes = Vec::new();
    // Bounded read: a corrupt length must not trigger a huge allocation.
    r.take(len as u64).read_to_end(&mut bytes)?;
    if bytes.len() != len {
        return Err(Error::io(
            "read_bytes",
            io::Error::new(io::ErrorKind::UnexpectedEof, "truncated byte string"),
        ));
    }
    Ok(bytes)
}

pub fn write_string<W: Write>(w: &mut W, s: &str) -> Result<()> {
    write_bytes(w, s.as_bytes())
}

pub fn read_string<R: Read>(r: &mut R) -> Result<String> {
    let bytes = read_bytes(r)?;
    String::from_utf8(bytes).map_err(|e| Error::invalid_format("string", e.to_string()))
}
