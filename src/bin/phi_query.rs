//! Command-line driver for the PHI query engine.
//!
//! Runs point or polygon queries against the bundled sample scene and
//! prints the result JSON. Run with: cargo run --bin phi_query -- -3.0 -62.0

use anyhow::{bail, Result};
use phi_engine::{
    parse_mode, parse_pillars, parse_temporal, Location, QueryEngine, QueryRequest, StaticProvider,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "Usage: phi_query <lat> <lng> [options]
       phi_query --polygon <lat1> <lng1> <lat2> <lng2> <lat3> <lng3> <lat4> <lng4> [options]
       phi_query --list-metrics [--mode MODE]

Options:
  --mode simple|comprehensive   Query depth (default: comprehensive)
  --temporal latest|monthly|annual
                                Lookback window (default: latest)
  --buffer METERS               Spatial averaging radius (default: 500)
  --pillars A,B,..              Subset of pillars to query (default: all)
  --sequential                  Disable the parallel pillar fan-out
  --quality-only                Strip raw values, keep quality flags only";

fn main() -> Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // Default log level: info for our crates, warn for others
                "phi_engine=info,phi_query=info,warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        bail!("{USAGE}");
    }

    let mut request = QueryRequest::default();
    let mut positional: Vec<f64> = Vec::new();
    let mut polygon = false;
    let mut list_metrics = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--mode" => request.mode = parse_mode(next_value(&mut iter, "--mode")?)?,
            "--temporal" => request.temporal = parse_temporal(next_value(&mut iter, "--temporal")?)?,
            "--buffer" => {
                let raw = next_value(&mut iter, "--buffer")?;
                request.buffer_radius_m = raw
                    .parse()
                    .map_err(|_| anyhow::anyhow!("invalid buffer radius: {raw}"))?;
            }
            "--pillars" => request.pillars = Some(parse_pillars(next_value(&mut iter, "--pillars")?)?),
            "--sequential" => request.parallel = false,
            "--quality-only" => request.include_raw = false,
            "--polygon" => polygon = true,
            "--list-metrics" => list_metrics = true,
            "--help" | "-h" => {
                println!("{USAGE}");
                return Ok(());
            }
            other => {
                let value: f64 = other
                    .parse()
                    .map_err(|_| anyhow::anyhow!("unrecognized argument: {other}\n\n{USAGE}"))?;
                positional.push(value);
            }
        }
    }

    let engine = QueryEngine::new(StaticProvider::sample_scene());

    if list_metrics {
        let metrics = engine.available_metrics(request.mode);
        println!("{}", serde_json::to_string_pretty(&metrics)?);
        return Ok(());
    }

    let result = if polygon {
        if positional.len() != 8 {
            bail!("--polygon needs 8 coordinates (4 lat/lng pairs)\n\n{USAGE}");
        }
        let points: Vec<Location> = positional
            .chunks(2)
            .map(|pair| Location::new(pair[0], pair[1]))
            .collect();
        engine.query_polygon(&points, &request)?
    } else {
        if positional.len() != 2 {
            bail!("expected <lat> <lng>\n\n{USAGE}");
        }
        engine.query(positional[0], positional[1], &request)?
    };

    tracing::info!(
        overall_score = ?result.summary.overall_score,
        interpretation = result.summary.overall_interpretation,
        data_quality_score = result.summary.data_quality_score,
        "query complete"
    );
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn next_value<'a>(iter: &mut std::slice::Iter<'a, String>, flag: &str) -> Result<&'a str> {
    match iter.next() {
        Some(value) => Ok(value.as_str()),
        None => bail!("{flag} needs a value\n\n{USAGE}"),
    }
}
