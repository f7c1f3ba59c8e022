//! Command line reverse geocoder.
//!
//! Loads one or more geonames dumps and prints the nearest place for each query coordinate, given
//! either with `--at` or one per line on stdin.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use geo::{Distance, Haversine, Point};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use reverse_geocode::ingest::{IngestOptions, MalformedPolicy};
use reverse_geocode::{Coord, FeatureClass, PointRecord, ReverseGeocoder};

#[derive(Parser, Debug)]
#[command(name = "reverse-geocode")]
#[command(about = "Find the nearest named place to a coordinate using geonames dumps")]
struct Args {
    /// Geonames dumps to load (`.txt` or `.zip`)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Feature classes to keep (A, H, L, P, R, S, T, U, V); may be repeated
    #[arg(short, long = "class", default_value = "P")]
    classes: Vec<FeatureClass>,

    /// Skip malformed lines instead of failing
    #[arg(long)]
    skip_malformed: bool,

    /// Number of places to print per query
    #[arg(short, default_value_t = 1)]
    k: usize,

    /// Query coordinate as `LAT,LON`; may be repeated. Reads stdin when absent
    #[arg(long = "at", value_parser = parse_coord, allow_hyphen_values = true)]
    at: Vec<Coord>,
}

fn parse_coord(value: &str) -> std::result::Result<Coord, String> {
    let mut parts = value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty());
    let (Some(lat), Some(lon), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("expected LAT,LON, got {value:?}"));
    };
    let lat = lat
        .parse::<f64>()
        .map_err(|err| format!("invalid latitude {lat:?}: {err}"))?;
    let lon = lon
        .parse::<f64>()
        .map_err(|err| format!("invalid longitude {lon:?}: {err}"))?;
    Ok(Coord::new(lat, lon))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let policy = if args.skip_malformed {
        MalformedPolicy::Skip
    } else {
        MalformedPolicy::Fail
    };
    let options = IngestOptions::new(args.classes.iter().copied()).with_malformed_policy(policy);

    info!("Loading {} geonames file(s)", args.files.len());
    let geocoder = ReverseGeocoder::from_paths(&args.files, options)
        .context("Failed to load geonames data")?;
    info!("Indexed {} places", geocoder.len());

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if !args.at.is_empty() {
        for query in &args.at {
            write_answer(&mut out, &geocoder, *query, args.k)?;
        }
        return Ok(());
    }

    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read query from stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        match parse_coord(&line) {
            Ok(query) => write_answer(&mut out, &geocoder, query, args.k)?,
            Err(err) => warn!("Skipping query: {err}"),
        }
    }

    Ok(())
}

fn write_answer(
    out: &mut impl Write,
    geocoder: &ReverseGeocoder,
    query: Coord,
    k: usize,
) -> Result<()> {
    let places = geocoder
        .nearest_places(query.lat, query.lon, k)
        .context("No places loaded; check the --class filter")?;
    for place in places {
        writeln!(
            out,
            "{},{}\t{}\t{}\t{}\t{:.3}",
            query.lat,
            query.lon,
            place.id,
            place.name,
            place.country_code,
            distance_km(query, place)
        )?;
    }
    Ok(())
}

/// Great-circle distance for display.
fn distance_km(query: Coord, place: &PointRecord) -> f64 {
    let from = Point::new(query.lon, query.lat);
    let to = Point::new(place.longitude, place.latitude);
    Haversine.distance(from, to) / 1000.0
}
