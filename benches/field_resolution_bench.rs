use climbox::ClimboxConfig;
use climbox::api::{build_cards, group_row, prepare_chart_series};
use climbox::core::{AliasSet, FieldResolver, RawRow, normalize_key};
use criterion::{Criterion, criterion_group, criterion_main};
use serde_json::json;
use std::hint::black_box;

const HEADERS: [&str; 12] = [
    "Timestamp",
    "Wind Speed (km/h)",
    "Wind Direction",
    "Temp Udara (°C)",
    "Humidity (%)",
    "Rainfall (mm)",
    "Water Temp (C)",
    "TSS (V)",
    "pH Meter A",
    "DO (mg/L)",
    "EC (mS/cm)",
    "TDS (ppm)",
];

fn wide_row(i: usize) -> RawRow {
    let mut row = RawRow::new();
    row.insert("Timestamp", json!(format!("2024-08-05T{:02}:{:02}:00", (i / 60) % 24, i % 60)));
    for (n, header) in HEADERS.iter().enumerate().skip(1) {
        row.insert(*header, json!(format!("{:.2}", (i + n) as f64 * 0.37)));
    }
    for extra in 0..28 {
        row.insert(format!("Aux Channel {extra} (raw)"), json!(extra));
    }
    row
}

fn bench_normalize_headers(c: &mut Criterion) {
    c.bench_function("normalize_key_headers", |b| {
        b.iter(|| {
            for header in HEADERS {
                let _ = normalize_key(black_box(header));
            }
        })
    });
}

fn bench_pick_wide_row(c: &mut Criterion) {
    let row = wide_row(7);
    let resolver = FieldResolver::new(
        AliasSet::default().with_alias("water_temp", ["Water Temp (C)", "WaterTemp"]),
    );

    c.bench_function("pick_exact_wide_row", |b| {
        b.iter(|| {
            let _ = resolver.pick_canonical(black_box(&row), black_box("water_temp"));
        })
    });
    c.bench_function("pick_fallback_wide_row", |b| {
        b.iter(|| {
            let _ = resolver.pick(black_box(&row), black_box(&["ph"]));
        })
    });
}

fn bench_dashboard_render_500(c: &mut Criterion) {
    let rows: Vec<RawRow> = (0..500).map(wide_row).collect();
    let config = ClimboxConfig::default()
        .with_history_points(50)
        .with_sensor_group("meteorologi", ["air_temp", "wind_speed", "wind_direction", "humidity"])
        .with_sensor_group("kualitas_fisika", ["water_temp", "ec"]);

    c.bench_function("chart_series_500_rows", |b| {
        b.iter(|| {
            let _ = prepare_chart_series(black_box(&rows), black_box(&config));
        })
    });
    c.bench_function("group_and_build_cards", |b| {
        b.iter(|| {
            let grouped = group_row(black_box(&rows[499]), &config);
            let _ = build_cards(&grouped, &config);
        })
    });
}

criterion_group!(
    benches,
    bench_normalize_headers,
    bench_pick_wide_row,
    bench_dashboard_render_500
);
criterion_main!(benches);
