use std::fs;
use std::path::PathBuf;

use climbox::alerts::AlertMonitor;
use climbox::api::{ClimboxConfig, build_cards, group_row, prepare_chart_series};
use climbox::core::RawRow;
use climbox::error::ClimboxResult;
use climbox::ingest::{Location, decode_rows, parse_rows};
use serde_json::json;

const USAGE: &str = "usage: climbox_replay <charts|cards|alerts> --input <path> [--config <path>] [--location <id>] [--output <path>]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommandKind {
    Charts,
    Cards,
    Alerts,
}

#[derive(Debug)]
struct CliArgs {
    command: CommandKind,
    input: PathBuf,
    config: Option<PathBuf>,
    location: Option<String>,
    output: Option<PathBuf>,
}

fn main() {
    let _ = climbox::telemetry::init_default_tracing();
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| format!("failed to read config `{}`: {e}", path.display()))?;
            ClimboxConfig::from_json_str(&text).map_err(|e| e.to_string())?
        }
        None => ClimboxConfig::default(),
    };
    let location_id = args
        .location
        .clone()
        .unwrap_or_else(|| config.location_id.clone());

    let body = fs::read_to_string(&args.input)
        .map_err(|e| format!("failed to read input `{}`: {e}", args.input.display()))?;
    let rows = load_rows(&body).map_err(|e| e.to_string())?;

    let report = match args.command {
        CommandKind::Charts => serde_json::to_value(prepare_chart_series(&rows, &config)),
        CommandKind::Cards => {
            let grouped = rows.last().map(|row| group_row(row, &config)).unwrap_or_default();
            let cards = build_cards(&grouped, &config);
            serde_json::to_value(json!({ "grouped": grouped, "cards": cards }))
        }
        CommandKind::Alerts => {
            let mut monitor = AlertMonitor::from_config(&config).map_err(|e| e.to_string())?;
            let location = Location::new(location_id);
            let source = |_: &Location| -> ClimboxResult<Vec<RawRow>> { Ok(rows.clone()) };
            let cycle = monitor.evaluate_all_once(&source, std::slice::from_ref(&location));
            let feed = cycle.feed(config.alerts.max_items);
            serde_json::to_value(json!({ "feed": feed, "dangers": cycle.dangers() }))
        }
    }
    .map_err(|e| format!("failed to encode report: {e}"))?;

    let text = serde_json::to_string_pretty(&report)
        .map_err(|e| format!("failed to encode report: {e}"))?;
    match &args.output {
        Some(path) => fs::write(path, text + "\n")
            .map_err(|e| format!("failed to write `{}`: {e}", path.display()))?,
        None => println!("{text}"),
    }
    Ok(())
}

/// GViz bodies are recognised by their callback; anything else is a JSON payload.
fn load_rows(body: &str) -> ClimboxResult<Vec<RawRow>> {
    if body.contains("google.visualization.Query.setResponse") || body.trim_start().starts_with('<') {
        parse_rows(body)
    } else {
        decode_rows(body.as_bytes())
    }
}

fn parse_args() -> Result<CliArgs, String> {
    let mut args = std::env::args().skip(1);
    let command = match args.next().as_deref() {
        Some("charts") => CommandKind::Charts,
        Some("cards") => CommandKind::Cards,
        Some("alerts") => CommandKind::Alerts,
        _ => return Err(USAGE.to_owned()),
    };

    let mut input = None::<PathBuf>;
    let mut config = None::<PathBuf>;
    let mut location = None::<String>;
    let mut output = None::<PathBuf>;

    while let Some(flag) = args.next() {
        let mut value = || {
            args.next()
                .ok_or_else(|| format!("missing value for {flag}"))
        };
        match flag.as_str() {
            "--input" => input = Some(PathBuf::from(value()?)),
            "--config" => config = Some(PathBuf::from(value()?)),
            "--location" => location = Some(value()?),
            "--output" => output = Some(PathBuf::from(value()?)),
            "--help" | "-h" => return Err(USAGE.to_owned()),
            _ => return Err(format!("unknown argument `{flag}`")),
        }
    }

    let input = input.ok_or_else(|| "missing --input".to_owned())?;
    Ok(CliArgs {
        command,
        input,
        config,
        location,
        output,
    })
}
