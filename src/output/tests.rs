//! Tests for the output module

use super::*;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn record(value: Value) -> crate::types::JsonObject {
    value.as_object().cloned().unwrap()
}

#[test]
fn test_schema_message_serialization() {
    let msg = Message::schema(
        "groups",
        json!({"type": "object", "properties": {}}),
        vec!["uuid".to_string()],
        vec![],
    );
    assert_eq!(
        serde_json::to_value(&msg).unwrap(),
        json!({
            "type": "SCHEMA",
            "stream": "groups",
            "schema": {"type": "object", "properties": {}},
            "key_properties": ["uuid"],
            "bookmark_properties": []
        })
    );
    assert_eq!(msg.stream(), Some("groups"));
}

#[test]
fn test_record_message_serialization() {
    let msg = Message::record("locations", record(json!({"code": "ams", "name": "Amsterdam"})));
    let value = serde_json::to_value(&msg).unwrap();

    assert_eq!(value["type"], "RECORD");
    assert_eq!(value["stream"], "locations");
    assert_eq!(value["record"], json!({"code": "ams", "name": "Amsterdam"}));
    assert!(value["time_extracted"].is_string());

    let back: Message = serde_json::from_value(value).unwrap();
    assert_eq!(back, msg);
}

#[test]
fn test_state_message_serialization() {
    let msg = Message::state(json!({"streams": {}}));
    assert_eq!(
        serde_json::to_value(&msg).unwrap(),
        json!({"type": "STATE", "value": {"streams": {}}})
    );
    assert_eq!(msg.stream(), None);
}

#[test]
fn test_json_lines_sink() {
    let mut sink = JsonLinesSink::new(Vec::new());
    sink.write(&Message::state(json!({"a": 1}))).unwrap();
    sink.write(&Message::record("locations", record(json!({"code": "ams"}))))
        .unwrap();
    sink.flush().unwrap();
    assert_eq!(sink.written(), 2);

    let output = String::from_utf8(sink.into_inner()).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], r#"{"type":"STATE","value":{"a":1}}"#);

    let second: Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(second["type"], "RECORD");
    assert_eq!(second["record"]["code"], "ams");
}

#[test]
fn test_memory_sink_helpers() {
    let mut sink = MemorySink::new();
    sink.write(&Message::schema("groups", json!({}), vec![], vec![]))
        .unwrap();
    sink.write(&Message::record("groups", record(json!({"uuid": "g1"}))))
        .unwrap();
    sink.write(&Message::record("databases", record(json!({"DbId": "d1"}))))
        .unwrap();
    sink.write(&Message::record("groups", record(json!({"uuid": "g2"}))))
        .unwrap();
    sink.write(&Message::state(json!({"streams": {}}))).unwrap();

    assert_eq!(sink.messages().len(), 5);
    assert_eq!(sink.schema_streams(), vec!["groups"]);
    let groups: Vec<_> = sink.records("groups").iter().map(|r| r["uuid"].clone()).collect();
    assert_eq!(groups, vec![json!("g1"), json!("g2")]);
    assert_eq!(sink.records("databases").len(), 1);
    assert_eq!(sink.states(), vec![&json!({"streams": {}})]);
}
