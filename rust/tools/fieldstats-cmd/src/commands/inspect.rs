//! Inspect command implementation

use std::{fs, path::Path};

use anyhow::{Context, Result};
use fieldstats::PartitionStats;

use crate::view::{PartitionView, to_json};

pub fn run(payload_path: String) -> Result<()> {
    let stats = read_payload(&payload_path)?;
    let json = to_json(&PartitionView::from(&stats), true)
        .context("Failed to serialize payload to JSON")?;
    println!("{json}");
    Ok(())
}

pub fn read_payload(path: impl AsRef<Path>) -> Result<PartitionStats> {
    let path = path.as_ref();
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read payload: {}", path.display()))?;
    PartitionStats::from_bytes(&bytes)
        .with_context(|| format!("Invalid partition payload: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::Value;

    use super::read_payload;
    use crate::{
        commands::encode::encode_scenario,
        view::{PartitionView, to_json},
    };

    const SCENARIO: &str = r#"{
        "request": {"fields": ["*"]},
        "partitions": [
            {"index": "logs", "shard": 0, "fields": {
                "client": {"type": "ip", "max_doc": 4, "doc_count": 4,
                           "min_value": "10.0.0.1", "max_value": "192.168.1.7"},
                "when": {"type": "date", "max_doc": 4, "doc_count": 4, "format": "epoch_second",
                         "min_value": "1388534400", "max_value": "1388620800"},
                "where": {"type": "geo_point", "max_doc": 4, "doc_count": 2,
                          "min_value": "-1.5,2", "max_value": "3,4.25"}}},
            {"index": "logs", "shard": 1, "failure": "node left"}
        ]
    }"#;

    #[test]
    fn test_encode_then_inspect() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("scenario.json");
        fs::write(&input, SCENARIO).unwrap();

        let written = encode_scenario(&input, dir.path().join("out")).unwrap();
        assert_eq!(written.len(), 1);
        assert!(written[0].ends_with("logs-0.bin"));

        let stats = read_payload(&written[0]).unwrap();
        assert_eq!(stats.group(), "logs");
        assert_eq!(stats.len(), 3);

        let json: Value =
            serde_json::from_str(&to_json(&PartitionView::from(&stats), false).unwrap()).unwrap();
        let fields = &json["fields"];
        assert_eq!(fields["client"]["min_value_as_string"], "10.0.0.1");
        assert_eq!(fields["when"]["min_value"], 1_388_534_400_000i64);
        assert_eq!(fields["when"]["max_value_as_string"], "1388620800");
        assert_eq!(fields["where"]["min_value"]["lat"], -1.5);
        assert_eq!(fields["where"]["max_value_as_string"], "3.0, 4.25");
        assert_eq!(fields["where"]["density"], 50);
    }

    #[test]
    fn test_corrupt_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.bin");
        fs::write(&path, [9u8, 0, 0]).unwrap();
        let err = read_payload(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Invalid partition payload"));
    }
}
