//! Evaluate command implementation

use std::path::Path;

use anyhow::{Context, Result};
use fieldstats::{CollectOptions, FieldStatsResponse};

use crate::{
    scenario::Scenario,
    view::{ResponseView, to_json},
};

pub fn run(input: String, level: Option<String>, sequential: bool, pretty: bool) -> Result<()> {
    let response = evaluate_scenario(&input, level, !sequential)?;
    let json = to_json(&ResponseView::from(&response), pretty)
        .context("Failed to serialize response to JSON")?;
    println!("{json}");
    Ok(())
}

pub fn evaluate_scenario(
    input: impl AsRef<Path>,
    level: Option<String>,
    parallel: bool,
) -> Result<FieldStatsResponse> {
    let scenario = Scenario::load(input)?;
    let mut request = scenario.request.clone();
    if let Some(level) = level {
        request = request.with_level(level);
    }
    let source = scenario.source()?;
    let response = request
        .execute(
            &scenario.partition_ids(),
            &source,
            &CollectOptions::new().parallel(parallel),
        )
        .context("Field stats evaluation failed")?;
    Ok(response)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::Value;
    use tempfile::NamedTempFile;

    use super::evaluate_scenario;
    use crate::view::{ResponseView, to_json};

    const SCENARIO: &str = r#"{
        "request": {
            "fields": ["value", "name"],
            "index_constraints": [
                {"field": "timestamp", "property": "min_value", "comparison": "gte",
                 "value": "2014-01-02", "format": "date_optional_time"}
            ],
            "level": "indices"
        },
        "partitions": [
            {"index": "test1", "shard": 0, "fields": {
                "value": {"type": "integer", "max_doc": 2, "doc_count": 2, "sum_doc_freq": 2,
                          "sum_total_term_freq": 2, "min_value": "1", "max_value": "4"},
                "timestamp": {"type": "date", "max_doc": 2, "doc_count": 2,
                              "min_value": "2014-01-01T00:00:00.000Z",
                              "max_value": "2014-01-01T10:00:00.000Z"}}},
            {"index": "test2", "shard": 0, "fields": {
                "value": {"type": "integer", "max_doc": 3, "doc_count": 1,
                          "min_value": "7", "max_value": "9"},
                "name": {"type": "string", "max_doc": 3, "doc_count": 0, "aggregatable": false},
                "timestamp": {"type": "date", "max_doc": 3, "doc_count": 3,
                              "min_value": "1388620800000", "max_value": "1388707200000"}}},
            {"index": "test2", "shard": 1, "failure": "shard not available"}
        ]
    }"#;

    fn write_scenario(text: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_evaluate_scenario() {
        let file = write_scenario(SCENARIO);
        for parallel in [true, false] {
            let response = evaluate_scenario(file.path(), None, parallel).unwrap();
            assert_eq!(response.total_partitions(), 3);
            assert_eq!(response.failed_partitions(), 1);
            assert_eq!(response.buckets().keys().collect::<Vec<_>>(), vec!["test2"]);
            let bucket = response.bucket("test2").unwrap();
            assert!(bucket.contains_key("value"));
            assert!(bucket.contains_key("name"));
            assert!(!bucket.contains_key("timestamp"));
        }
    }

    #[test]
    fn test_response_json_shape() {
        let file = write_scenario(SCENARIO);
        let response = evaluate_scenario(file.path(), None, true).unwrap();
        let json: Value =
            serde_json::from_str(&to_json(&ResponseView::from(&response), false).unwrap()).unwrap();

        assert_eq!(json["_shards"]["total"], 3);
        assert_eq!(json["_shards"]["successful"], 2);
        assert_eq!(json["_shards"]["failed"], 1);
        assert_eq!(json["_shards"]["failures"][0]["index"], "test2");

        let value = &json["indices"]["test2"]["fields"]["value"];
        assert_eq!(value["type"], "integer");
        assert_eq!(value["density"], 33);
        assert_eq!(value["min_value"], 7);
        assert_eq!(value["max_value_as_string"], "9");

        let name = &json["indices"]["test2"]["fields"]["name"];
        assert_eq!(name["aggregatable"], false);
        assert!(name.get("min_value").is_none());
        assert!(json.get("conflicts").is_none());
    }

    #[test]
    fn test_level_override() {
        // Cluster level merges test1 in, so its earlier timestamp must pass.
        let file = write_scenario(&SCENARIO.replace("2014-01-02", "2014-01-01"));
        let response = evaluate_scenario(file.path(), Some("cluster".to_string()), true).unwrap();
        let all = response.all_field_stats().unwrap();
        assert_eq!(all["value"].max_doc(), 5);
        assert_eq!(all["value"].min_value_as_string().as_deref(), Some("1"));

        let err = evaluate_scenario(file.path(), Some("shards".to_string()), true).unwrap_err();
        assert!(format!("{err:#}").contains("invalid level option [shards]"));
    }

    #[test]
    fn test_invalid_scenario() {
        let file = write_scenario(r#"{"request": {"fields": ["a"]}, "partitions": [
            {"index": "i", "shard": 0, "fields": {"a": {"type": "decimal"}}}]}"#);
        let err = evaluate_scenario(file.path(), None, true).unwrap_err();
        assert!(format!("{err:#}").contains("Unknown field type: decimal"));
    }
}
