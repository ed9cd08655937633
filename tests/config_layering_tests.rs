use climbox::ClimboxConfig;
use climbox::api::deep_merge;
use climbox::error::ClimboxError;
use serde_json::json;

#[test]
fn defaults_match_deployment() {
    let config = ClimboxConfig::default();
    assert_eq!(config.location_id, "pulau_komodo");
    assert_eq!(config.history_points, 20);
    assert_eq!(config.gviz_range, "A:Z");
    assert_eq!(config.cache_prefix, "climbox_cache");
    assert_eq!(config.mqtt.mqtt_topic_base, "climbox");
    assert!(config.mqtt.mqtt_subscribe_wildcard);
    assert!(!config.mqtt.is_enabled());
    assert_eq!(config.alerts.poll_seconds, 60);
    assert_eq!(config.alerts.max_items, 6);
    assert_eq!(config.arrow.min, 20.0);
    assert_eq!(config.arrow.max, 40.0);
    assert_eq!(config.station_offset().local_minus_utc(), 7 * 3600);
}

#[test]
fn later_layers_win_and_nested_objects_merge() {
    let config = ClimboxConfig::from_layers([
        json!({
            "LOCATION_ID": "bali",
            "MQTT": {"MQTT_WS": "wss://broker.example/mqtt", "MQTT_TOPIC_BASE": "climbox"}
        }),
        json!({"MQTT": {"MQTT_TOPIC_BASE": "cbx"}, "HISTORY_POINTS": 48}),
    ])
    .expect("layered config");

    assert_eq!(config.location_id, "bali");
    assert_eq!(config.history_points, 48);
    assert_eq!(config.mqtt.mqtt_ws, "wss://broker.example/mqtt");
    assert_eq!(config.mqtt.mqtt_topic_base, "cbx");
    assert!(config.mqtt.mqtt_subscribe_wildcard);
    assert!(config.mqtt.is_enabled());
}

#[test]
fn arrays_replace_and_null_members_are_ignored() {
    let config = ClimboxConfig::from_layers([
        json!({"KEYS": {"water_temp": ["Water Temp (C)", "WaterTemp"], "tss": ["TSS (V)"]}}),
        json!({"KEYS": {"water_temp": ["Suhu Air"]}, "LOCATION_ID": null}),
    ])
    .expect("layered config");

    assert_eq!(config.keys["water_temp"], vec!["Suhu Air".to_owned()]);
    assert_eq!(config.keys["tss"], vec!["TSS (V)".to_owned()]);
    assert_eq!(config.location_id, "pulau_komodo");
}

#[test]
fn timestamp_candidates_follow_keys() {
    assert_eq!(
        ClimboxConfig::default().timestamp_candidates(),
        vec!["Timestamp", "timestamp", "time", "date"]
    );
    let config = ClimboxConfig::default().with_keys("timestamp", ["Waktu"]);
    assert_eq!(config.timestamp_candidates(), vec!["Waktu".to_owned()]);
}

#[test]
fn builders_normalize_canonical_keys() {
    let config = ClimboxConfig::default()
        .with_field_alias("Water Temp", ["Water Temp (C)"])
        .with_keys("Air Temp", ["Temp Udara"]);
    assert!(config.field_aliases.contains_key("water_temp"));
    assert_eq!(
        config.resolver().candidates_for("air_temp"),
        vec!["Temp Udara".to_owned()]
    );
}

#[test]
fn invalid_layers_are_rejected() {
    let cases = [
        json!({"HISTORY_POINTS": 0}),
        json!({"ALERTS": {"MAX_ITEMS": 0}}),
        json!({"ARROW": {"min": 40, "max": 20}}),
        json!({"STATION_UTC_OFFSET_MINUTES": 1440}),
        json!({"HISTORY_POINTS": "many"}),
        json!(["not", "an", "object"]),
    ];
    for layer in cases {
        let err = ClimboxConfig::from_layers([layer.clone()]).expect_err("invalid layer");
        assert!(matches!(err, ClimboxError::InvalidConfig(_)), "{layer}");
    }
    assert!(matches!(
        ClimboxConfig::from_json_str("{ nope"),
        Err(ClimboxError::InvalidConfig(_))
    ));
}

#[test]
fn deep_merge_semantics() {
    let mut target = json!({"a": {"b": 1, "c": [1, 2]}, "d": "keep"});
    deep_merge(&mut target, json!({"a": {"c": [3], "e": true}, "d": null}));
    assert_eq!(target, json!({"a": {"b": 1, "c": [3], "e": true}, "d": "keep"}));

    deep_merge(&mut target, json!({"a": 5}));
    assert_eq!(target["a"], json!(5));
}
