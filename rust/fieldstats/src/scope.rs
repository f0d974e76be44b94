use std::{fmt, str::FromStr};

use fieldstats_common::{Error, Result};
use serde::{Deserialize, Serialize};

/// Bucket key used when every partition is merged into one result.
pub const ALL_BUCKET_KEY: &str = "_all";

/// Grouping granularity of the result buckets.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// One bucket, keyed [`ALL_BUCKET_KEY`], for the whole cluster.
    #[default]
    Cluster,
    /// One bucket per partition group (index).
    Indices,
}

impl Scope {
    pub fn name(self) -> &'static str {
        match self {
            Scope::Cluster => "cluster",
            Scope::Indices => "indices",
        }
    }

    /// The bucket a partition of `group` contributes to.
    pub fn bucket_key<'a>(self, group: &'a str) -> &'a str {
        match self {
            Scope::Cluster => ALL_BUCKET_KEY,
            Scope::Indices => group,
        }
    }
}

impl FromStr for Scope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Scope> {
        match s {
            "cluster" => Ok(Scope::Cluster),
            "indices" => Ok(Scope::Indices),
            _ => Err(Error::validation(format!("invalid level option [{s}]"))),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::{ALL_BUCKET_KEY, Scope};

    #[test]
    fn test_bucket_keys() {
        assert_eq!(Scope::default(), Scope::Cluster);
        assert_eq!(Scope::Cluster.bucket_key("test-1"), ALL_BUCKET_KEY);
        assert_eq!(Scope::Indices.bucket_key("test-1"), "test-1");
    }

    #[test]
    fn test_parse() {
        assert_eq!("indices".parse::<Scope>().unwrap(), Scope::Indices);
        let err = "shards".parse::<Scope>().unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("invalid level option [shards]"));
    }
}
