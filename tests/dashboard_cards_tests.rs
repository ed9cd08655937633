use approx::assert_relative_eq;
use climbox::api::{
    ArrowRange, CacheStore, CardGroup, ClimboxConfig, Dashboard, MemoryCacheStore, build_cards,
    cache_key, gauge_angle, group_row, prepare_chart_series,
};
use climbox::core::RawRow;
use climbox::ingest::LiveMessage;
use serde_json::json;

fn config() -> ClimboxConfig {
    ClimboxConfig::default()
        .with_field_alias("air_temp", ["Temp Udara (°C)"])
        .with_sensor_group(
            "meteorologi",
            ["air_temp", "wind_speed", "wind_direction", "humidity"],
        )
        .with_sensor_group("kualitas_fisika", ["water_temp", "ec", "latitude", "longitude"])
        .with_sensor_group("kualitas_kimia_dasar", ["ph", "tds"])
}

fn station_row() -> RawRow {
    RawRow::from_pairs([
        ("Timestamp", json!("2024-08-05T10:30:00")),
        ("Temp Udara (°C)", json!("31.2")),
        ("Wind Speed (km/h)", json!(12)),
        ("Wind Direction", json!("NE")),
        ("Humidity (%)", json!("78")),
        ("Water Temp (C)", json!("30")),
        ("EC (mS/cm)", json!("1,050.5")),
        ("Latitude", json!(-8.55)),
        ("Longitude", json!(119.49)),
        ("pH", json!("8.1")),
        ("TDS (ppm)", json!(410)),
    ])
}

#[test]
fn grouping_resolves_configured_fields() {
    let grouped = group_row(&station_row(), &config());

    assert_eq!(grouped.timestamp, Some(json!("2024-08-05T10:30:00")));
    let number = |group: &str, field: &str| grouped.value(group, field).and_then(|v| v.as_f64());
    assert_eq!(number("meteorologi", "air_temp"), Some(31.2));
    assert_eq!(number("meteorologi", "wind_speed"), Some(12.0));
    assert_eq!(number("meteorologi", "humidity"), Some(78.0));
    assert_eq!(number("kualitas_fisika", "ec"), Some(1050.5));
    assert_eq!(
        grouped.value("meteorologi", "wind_direction"),
        Some(&json!("NE"))
    );
    assert!(grouped.group("presipitasi").is_none());
}

#[test]
fn missing_fields_group_as_null() {
    let row = RawRow::from_pairs([("Timestamp", json!("2024-08-05T10:30:00"))]);
    let grouped = group_row(&row, &config());
    assert_eq!(grouped.value("kualitas_kimia_dasar", "ph"), Some(&json!(null)));
}

#[test]
fn cards_render_values_and_placeholders() {
    let config = config();
    let cards = build_cards(&group_row(&station_row(), &config), &config);
    assert_eq!(cards.len(), CardGroup::ALL.len());

    let card = |group: CardGroup| cards.iter().find(|c| c.group == group).expect("card");

    let meteo = card(CardGroup::Meteorologi);
    assert_eq!(meteo.headline, "31.2°C");
    assert_eq!(meteo.field("Wind direction"), Some("NE"));
    assert_eq!(meteo.field("Wind speed"), Some("12 km/h"));
    assert_eq!(meteo.field("Humidity"), Some("RH 78%"));
    assert_eq!(
        meteo.last_updated.as_deref(),
        Some("Last data received: 05/08/2024 10:30:00")
    );

    let physical = card(CardGroup::KualitasFisika);
    assert_eq!(physical.headline, "30°C");
    assert_eq!(physical.field("EC"), Some("1050.5"));
    assert_eq!(physical.field("Coordinates"), Some("Lat: -8.55, Lon: 119.49"));
    assert_relative_eq!(physical.arrow_angle.expect("gauge"), 50.5);

    let chemistry = card(CardGroup::KualitasKimiaDasar);
    assert_eq!(chemistry.headline, "410 ppm");
    assert_eq!(chemistry.field("pH"), Some("8.1"));

    let rain = card(CardGroup::Presipitasi);
    assert_eq!(rain.headline, "--");
    assert_eq!(rain.field("Distance"), Some("--"));
    assert_eq!(card(CardGroup::KualitasKimiaLanjut).field("Pumps"), Some("--"));
    assert!(rain.arrow_angle.is_none());
}

#[test]
fn zero_humidity_renders_placeholder() {
    let config = config();
    let humidity_card = |reading: serde_json::Value| {
        let mut row = station_row();
        row.insert("Humidity (%)", reading);
        let cards = build_cards(&group_row(&row, &config), &config);
        let meteo = cards
            .into_iter()
            .find(|c| c.group == CardGroup::Meteorologi)
            .expect("meteorologi card");
        meteo.field("Humidity").map(str::to_owned)
    };

    assert_eq!(humidity_card(json!("0")).as_deref(), Some("--"));
    assert_eq!(humidity_card(json!(0)).as_deref(), Some("--"));
    assert_eq!(humidity_card(json!("")).as_deref(), Some("--"));
    assert_eq!(humidity_card(json!(55.5)).as_deref(), Some("RH 55.5%"));
}

#[test]
fn gauge_sweep_wraps_and_clamps() {
    let range = ArrowRange::default();
    assert_relative_eq!(gauge_angle(Some(20.0), range), -89.0);
    assert_relative_eq!(gauge_angle(Some(10.0), range), -89.0);
    assert_relative_eq!(gauge_angle(Some(40.0), range), -170.0);
    assert_relative_eq!(gauge_angle(Some(30.0), range), 50.5);
    assert_relative_eq!(gauge_angle(None, range), 0.0);
}

#[test]
fn card_group_names() {
    assert_eq!(CardGroup::from_name(" Kualitas_Fisika "), Some(CardGroup::KualitasFisika));
    assert_eq!(CardGroup::from_name("unknown"), None);
    assert_eq!(CardGroup::KualitasTurbiditas.to_string(), "kualitas_turbiditas");
}

fn history(count: usize) -> Vec<RawRow> {
    (0..count)
        .map(|i| {
            let mut row = RawRow::from_pairs([
                ("Timestamp", json!(format!("2024-08-05T10:{i:02}:00"))),
                ("Humidity", json!(70 + i)),
                ("Air Temp", json!(format!("{}.5", 25 + i % 3))),
            ]);
            if i % 4 == 0 {
                row.insert("Water Temp", json!(28 + i));
            }
            row
        })
        .collect()
}

#[test]
fn chart_series_windows() {
    let config = ClimboxConfig::default();
    assert!(prepare_chart_series(&[], &config).is_none());

    let charts = prepare_chart_series(&history(30), &config).expect("charts");

    assert_eq!(charts.climate.len(), 20);
    assert_eq!(charts.climate.labels.first().map(String::as_str), Some("10:10"));
    assert_eq!(charts.climate.labels.last().map(String::as_str), Some("10:29"));
    let humidity = charts.climate.series("humidity").expect("humidity");
    assert_eq!(humidity.values.last(), Some(&Some(99.0)));

    assert_eq!(charts.water_quality.len(), 5);
    assert_eq!(
        charts.water_quality.labels,
        vec!["10:12", "10:16", "10:20", "10:24", "10:28"]
    );
    let water = charts.water_quality.series("water_temp").expect("water temp");
    assert_eq!(
        water.values,
        vec![Some(40.0), Some(44.0), Some(48.0), Some(52.0), Some(56.0)]
    );
    assert!(charts.water_quality.series("tss").expect("tss").values.iter().all(Option::is_none));
    assert_eq!(charts.water_quality.value_range(), Some((40.0, 56.0)));

    assert!(charts.chemistry.is_empty());
    assert_eq!(charts.chemistry.value_range(), None);
}

#[test]
fn dashboard_caches_latest_batch() {
    let mut dashboard = Dashboard::new(config(), MemoryCacheStore::new());
    assert!(dashboard.ingest_rows("pulau_komodo", Vec::new()).is_none());
    assert!(dashboard.cache().is_empty());

    let update = dashboard
        .ingest_rows("pulau_komodo", vec![station_row()])
        .expect("cards");
    assert_eq!(update.cards.len(), 6);

    let key = cache_key("climbox_cache", "pulau_komodo");
    assert_eq!(key, "climbox_cache_sensor_pulau_komodo");
    assert!(dashboard.cache().get(&key).expect("cache read").is_some());

    let entry = dashboard.cached("pulau_komodo").expect("cached entry");
    assert_eq!(entry.raw.len(), 1);
    assert_eq!(entry.last_timestamp, Some(json!("2024-08-05T10:30:00")));
    assert_eq!(entry.grouped.timestamp, update.grouped.timestamp);
    assert_eq!(
        entry.grouped.value("meteorologi", "wind_direction"),
        Some(&json!("NE"))
    );
}

#[test]
fn malformed_cache_entries_are_dropped() {
    let mut store = MemoryCacheStore::new();
    store
        .set("climbox_cache_sensor_pulau_komodo", "{ not json".to_owned())
        .expect("cache write");
    let dashboard = Dashboard::new(config(), store);
    assert!(dashboard.cached("pulau_komodo").is_none());
}

#[test]
fn history_batch_yields_charts_and_cards() {
    let mut dashboard = Dashboard::new(ClimboxConfig::default(), MemoryCacheStore::new());
    let (charts, cards) = dashboard.ingest_history("pulau_komodo", history(8));
    assert_eq!(charts.expect("charts").climate.len(), 8);
    assert!(cards.is_some());
    assert_eq!(dashboard.cache().len(), 1);
}

#[test]
fn live_messages_only_update_configured_location() {
    let mut dashboard = Dashboard::new(config(), MemoryCacheStore::new());

    let other = LiveMessage::decode(
        "climbox/bali/latest",
        br#"[{"Timestamp":"2024-08-05T10:30:00","Water Temp (C)":"29"}]"#,
    )
    .expect("decode");
    assert!(dashboard.ingest_live(&other).is_none());

    let rowless = LiveMessage::decode("climbox/pulau_komodo/latest", br#"{"rowCount":0}"#)
        .expect("decode");
    assert!(dashboard.ingest_live(&rowless).is_none());
    assert!(dashboard.cache().is_empty());

    let own = LiveMessage::decode(
        "climbox/pulau_komodo/latest",
        br#"{"rows":[{"Timestamp":"2024-08-05T10:30:00","Water Temp (C)":"29"}]}"#,
    )
    .expect("decode");
    let update = dashboard.ingest_live(&own).expect("cards");
    assert_eq!(update.location_id, "pulau_komodo");
    let physical = update
        .cards
        .iter()
        .find(|c| c.group == CardGroup::KualitasFisika)
        .expect("physical card");
    assert_eq!(physical.headline, "29°C");
}
