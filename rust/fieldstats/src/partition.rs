//! Per-partition statistics and their transport form.

use std::{
    collections::BTreeMap,
    fmt,
    io::{Read, Write},
};

use byteorder::{LE, ReadBytesExt, WriteBytesExt};
use fieldstats_common::{Error, Result, verify_data};
use fieldstats_format::{
    FieldStats,
    wire::{read_string, write_string},
};
use serde::{Deserialize, Serialize};

/// Identifies one queried partition: the group it belongs to (an index name)
/// and its ordinal within the group.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartitionId {
    pub group: String,
    pub shard: u32,
}

impl PartitionId {
    pub fn new(group: impl Into<String>, shard: u32) -> PartitionId {
        PartitionId {
            group: group.into(),
            shard,
        }
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}][{}]", self.group, self.shard)
    }
}

/// Statistics one partition reported, keyed by concrete field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionStats {
    id: PartitionId,
    fields: BTreeMap<String, FieldStats>,
}

impl PartitionStats {
    /// Payload layout version written by [`PartitionStats::write_to`].
    pub const WIRE_VERSION: u8 = 1;

    pub fn new(id: PartitionId) -> PartitionStats {
        PartitionStats {
            id,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, stats: FieldStats) -> PartitionStats {
        self.insert(name, stats);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, stats: FieldStats) {
        self.fields.insert(name.into(), stats);
    }

    pub fn id(&self) -> &PartitionId {
        &self.id
    }

    pub fn group(&self) -> &str {
        &self.id.group
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldStats> {
        &self.fields
    }

    pub fn into_fields(self) -> BTreeMap<String, FieldStats> {
        self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_u8(Self::WIRE_VERSION)?;
        write_string(w, &self.id.group)?;
        w.write_u32::<LE>(self.id.shard)?;
        let count = u32::try_from(self.fields.len())
            .map_err(|_| Error::invalid_arg("fields", "too many fields for one partition"))?;
        w.write_u32::<LE>(count)?;
        for (name, stats) in &self.fields {
            write_string(w, name)?;
            stats.write_to(w)?;
        }
        Ok(())
    }

    pub fn read_from<R: Read>(r: &mut R) -> Result<PartitionStats> {
        let version = r.read_u8()?;
        if version != Self::WIRE_VERSION {
            return Err(Error::invalid_format(
                "partition_stats",
                format!("unsupported payload version {version}"),
            ));
        }
        let group = read_string(r)?;
        let shard = r.read_u32::<LE>()?;
        let count = r.read_u32::<LE>()?;

        let mut stats = PartitionStats::new(PartitionId::new(group, shard));
        for _ in 0..count {
            let name = read_string(r)?;
            let field = FieldStats::read_from(r)?;
            if stats.fields.insert(name.clone(), field).is_some() {
                return Err(Error::invalid_format(
                    "partition_stats",
                    format!("duplicate field [{name}]"),
                ));
            }
        }
        Ok(stats)
    }

    /// Fails only when a byte string is longer than `u32::MAX`.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    pub fn from_bytes(mut bytes: &[u8]) -> Result<PartitionStats> {
        let stats = PartitionStats::read_from(&mut bytes)?;
        verify_data!(trailing_bytes, bytes.is_empty());
        Ok(stats)
    }
}

/// A partition that could not deliver statistics.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartitionFailure {
    pub partition: PartitionId,
    pub reason: String,
}

impl PartitionFailure {
    pub fn new(partition: PartitionId, reason: impl Into<String>) -> PartitionFailure {
        PartitionFailure {
            partition,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for PartitionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.partition, self.reason)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionOutcome {
    Success(PartitionStats),
    Failure(PartitionFailure),
}

impl PartitionOutcome {
    pub fn partition(&self) -> &PartitionId {
        match self {
            PartitionOutcome::Success(stats) => stats.id(),
            PartitionOutcome::Failure(failure) => &failure.partition,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PartitionOutcome::Success(_))
    }
}

impl From<PartitionStats> for PartitionOutcome {
    fn from(stats: PartitionStats) -> Self {
        PartitionOutcome::Success(stats)
    }
}

impl From<PartitionFailure> for PartitionOutcome {
    fn from(failure: PartitionFailure) -> Self {
        PartitionOutcome::Failure(failure)
    }
}
