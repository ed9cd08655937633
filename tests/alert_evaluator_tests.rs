use climbox::ClimboxConfig;
use climbox::alerts::{
    AlertDeduplicator, AlertEvaluator, AlertKey, AlertLevel, AlertParameter, Thresholds,
    UpperLimits,
};
use climbox::core::{RawRow, offset_from_minutes};
use climbox::error::ClimboxError;
use climbox::ingest::Location;
use serde_json::json;

fn komodo() -> Location {
    Location::new("pulau_komodo").with_name("Pulau Komodo")
}

fn evaluator() -> AlertEvaluator {
    AlertEvaluator::new(Thresholds::default(), offset_from_minutes(7 * 60))
}

fn row(timestamp: &str, pairs: &[(&str, serde_json::Value)]) -> RawRow {
    let mut row = RawRow::from_pairs([("Timestamp", json!(timestamp))]);
    for (header, value) in pairs {
        row.insert(*header, value.clone());
    }
    row
}

#[test]
fn wind_above_danger_emits_single_danger_alert() {
    let evaluator = AlertEvaluator::new(
        Thresholds::default().with_wind_kmh(UpperLimits::new(30.0, 50.0)),
        offset_from_minutes(7 * 60),
    );
    let row = row("2024-08-05T10:30:00", &[("Wind Speed (km/h)", json!(52))]);

    let alerts = evaluator.evaluate(&komodo(), &row);
    assert_eq!(alerts.len(), 1);
    let alert = &alerts[0];
    assert_eq!(alert.level, AlertLevel::Danger);
    assert_eq!(alert.parameter, AlertParameter::Wind);
    assert_eq!(alert.message, "Wind speed 52 km/h (>= 50)");
    assert_eq!(alert.title, "Pulau Komodo: Wind");
    assert_eq!(alert.time_text, "05 Aug: 10:30");
    assert!(alert.observed_at.is_some());
}

#[test]
fn wind_between_limits_is_a_warning() {
    let row = row("2024-08-05T10:30:00", &[("Wind Speed", json!("35"))]);
    let alerts = evaluator().evaluate(&komodo(), &row);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].level, AlertLevel::Warning);
    assert_eq!(alerts[0].message, "Wind speed 35 km/h (>= 30)");
}

#[test]
fn water_temperature_band() {
    let evaluator = evaluator();
    let cases = [
        (28.0, None),
        (33.0, Some(AlertLevel::Warning)),
        (35.0, Some(AlertLevel::Danger)),
        (22.0, Some(AlertLevel::Warning)),
        (19.5, Some(AlertLevel::Danger)),
    ];
    for (value, expected) in cases {
        let row = row("2024-08-05T10:30:00", &[("Water Temp (C)", json!(value))]);
        let alerts = evaluator.evaluate(&komodo(), &row);
        assert_eq!(alerts.first().map(|a| a.level), expected, "water temp {value}");
        assert!(alerts.len() <= 1);
    }

    let row = row("2024-08-05T10:30:00", &[("Water Temp (C)", json!(35))]);
    let alerts = evaluator.evaluate(&komodo(), &row);
    assert_eq!(alerts[0].message, "Water Temp 35°C (critical)");
    assert_eq!(alerts[0].title, "Pulau Komodo: Water Temp");
}

#[test]
fn unparseable_values_are_skipped() {
    let row = row(
        "2024-08-05T10:30:00",
        &[("Wind Speed (km/h)", json!("n/a")), ("Rainfall (mm)", json!(""))],
    );
    assert!(evaluator().evaluate(&komodo(), &row).is_empty());
}

#[test]
fn overflowing_gviz_timestamp_is_echoed_not_parsed() {
    let row = row("Date(2024,4294967295,1)", &[("Wind Speed (km/h)", json!(52))]);

    let alerts = evaluator().evaluate(&komodo(), &row);
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].observed_at.is_none());
    assert_eq!(alerts[0].time_text, "Date(2024,4294967295,1)");
}

#[test]
fn every_parameter_can_fire_on_one_row() {
    let row = row(
        "2024-08-05T10:30:00",
        &[
            ("Wind Speed (km/h)", json!(60)),
            ("Rainfall (mm)", json!(12)),
            ("Water Temp (C)", json!(33)),
            ("TSS (V)", json!(250)),
        ],
    );
    let alerts = evaluator().evaluate(&komodo(), &row);
    let parameters: Vec<AlertParameter> = alerts.iter().map(|a| a.parameter).collect();
    assert_eq!(parameters, AlertParameter::ALL.to_vec());
    assert_eq!(alerts[1].level, AlertLevel::Warning);
    assert_eq!(alerts[3].level, AlertLevel::Danger);
}

#[test]
fn dedupe_suppresses_same_timestamp_and_reemits_new_one() {
    let evaluator = evaluator();
    let mut dedupe = AlertDeduplicator::default();
    let first = row("2024-08-05T10:30:00", &[("Wind Speed (km/h)", json!(52))]);
    let later = row("2024-08-05T10:40:00", &[("Wind Speed (km/h)", json!(52))]);

    let alert = evaluator.evaluate(&komodo(), &first).remove(0);
    assert!(dedupe.admit(&alert));
    let again = evaluator.evaluate(&komodo(), &first).remove(0);
    assert!(!dedupe.admit(&again));

    let next = evaluator.evaluate(&komodo(), &later).remove(0);
    assert!(dedupe.admit(&next));
    assert_eq!(
        dedupe.last_time_text(&AlertKey::of(&next)),
        Some("05 Aug: 10:40")
    );
}

#[test]
fn alerts_without_time_text_always_pass() {
    let evaluator = evaluator();
    let mut dedupe = AlertDeduplicator::default();
    let row = RawRow::from_pairs([("Wind Speed (km/h)", json!(52))]);

    let alert = evaluator.evaluate(&komodo(), &row).remove(0);
    assert!(alert.time_text.is_empty());
    assert!(dedupe.admit(&alert));
    assert!(dedupe.admit(&alert));
}

#[test]
fn bounded_dedupe_evicts_oldest_key() {
    let evaluator = evaluator();
    let mut dedupe = AlertDeduplicator::new(2);
    let row = row("2024-08-05T10:30:00", &[("Wind Speed (km/h)", json!(52))]);

    let alerts: Vec<_> = ["a", "b", "c"]
        .into_iter()
        .map(|id| evaluator.evaluate(&Location::new(id), &row).remove(0))
        .collect();
    for alert in &alerts {
        assert!(dedupe.admit(alert));
    }
    assert_eq!(dedupe.len(), 2);
    assert_eq!(dedupe.evictions(), 1);
    assert_eq!(dedupe.last_time_text(&AlertKey::of(&alerts[0])), None);

    // The evicted key fires again for the same timestamp.
    assert!(dedupe.admit(&alerts[0]));
    assert!(!dedupe.admit(&alerts[2]));
}

#[test]
fn thresholds_come_from_config() {
    let config = ClimboxConfig::from_json_str(
        r#"{"ALERTS": {"THRESHOLDS": {"wind_kmh": {"warning": 20, "danger": 40}}}}"#,
    )
    .expect("config");
    assert_eq!(config.alerts.thresholds.rainfall_mm, Thresholds::default().rainfall_mm);

    let evaluator = AlertEvaluator::from_config(&config).expect("evaluator");
    let row = row("2024-08-05T10:30:00", &[("Wind Speed (km/h)", json!(45))]);
    let alerts = evaluator.evaluate(&komodo(), &row);
    assert_eq!(alerts[0].level, AlertLevel::Danger);
    assert_eq!(alerts[0].message, "Wind speed 45 km/h (>= 40)");
}

#[test]
fn inverted_thresholds_are_rejected() {
    let err = ClimboxConfig::from_json_str(
        r#"{"ALERTS": {"THRESHOLDS": {"wind_kmh": {"warning": 60, "danger": 40}}}}"#,
    )
    .expect_err("warning above danger");
    assert!(matches!(err, ClimboxError::InvalidConfig(_)));
}
