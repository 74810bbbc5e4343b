// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use haunt_map_core::locate::{geolocator_from_config, FixedGeolocator, Geolocator};
use haunt_map_core::pins::{fetch_approved_pins, HttpPinSource};
use haunt_map_core::submit::HttpFormTransport;
use haunt_map_core::{LatLng, MapConfig, MapSession};
use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a config.json
    #[arg(short, long, env = "HAUNT_MAP_CONFIG")]
    config: Option<PathBuf>,

    /// More log output (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the approved pins
    Pins {
        /// Print JSON instead of popup text
        #[arg(long)]
        json: bool,
    },
    /// Propose a new location
    Submit {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        #[arg(short, long)]
        description: String,
        #[arg(short = 'b', long)]
        submitted_by: String,
        #[arg(short, long, default_value = "")]
        address: String,
        /// Validate and print the payload without posting it
        #[arg(long)]
        dry_run: bool,
    },
    /// Find the current position the way the map's locate button does
    Locate {
        /// Use this position instead of the configured lookup, as LAT,LNG
        #[arg(long, value_parser = parse_lat_lng, allow_hyphen_values = true)]
        at: Option<LatLng>,
    },
    /// Show the effective configuration
    Config {
        /// Write the effective configuration to the config path
        #[arg(long)]
        init: bool,
    },
}

fn parse_lat_lng(s: &str) -> Result<LatLng, String> {
    let (lat, lng) = s
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LNG but got '{}'", s))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("bad latitude: {}", e))?;
    let lng: f64 = lng.trim().parse().map_err(|e| format!("bad longitude: {}", e))?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(format!("'{}' is out of range", s));
    }
    Ok(LatLng::new(lat, lng))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let config = ConfigBuilder::new()
        .add_filter_allow_str("haunt_map")
        .build();
    // A second init only fails when a logger is already installed.
    let _ = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto);
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = MapConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Pins { json } => {
            let source = HttpPinSource::new(&config)?;
            let pins = fetch_approved_pins(&source)
                .map_err(|e| anyhow::anyhow!(e.alert_text()))
                .context("Failed to load pins")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&pins)?);
            } else {
                println!("{} approved pins", pins.len());
                for pin in &pins {
                    println!();
                    println!("{}", pin.position());
                    for line in pin.popup_text().lines() {
                        println!("  {}", line);
                    }
                }
            }
        }
        Commands::Submit {
            lat,
            lng,
            description,
            submitted_by,
            address,
            dry_run,
        } => {
            let mut session = MapSession::new(config);
            session.click_map(LatLng::new(lat, lng));
            session.affirm_selection();

            let form = session.form_mut();
            form.description = description;
            form.submitted_by = submitted_by;
            form.address = address;

            if dry_run {
                let payload = session
                    .prepare_submission()
                    .map_err(|e| anyhow::anyhow!(e.alert_text()))?;
                println!("Would post to {}", session.config.form_url);
                for (key, value) in &payload {
                    println!("  {} = {}", key, value);
                }
            } else {
                let transport = HttpFormTransport::new(&session.config)?;
                let notice = session
                    .submit(&transport)
                    .map_err(|e| anyhow::anyhow!(e.alert_text()))?;
                println!("{}", notice);
            }
        }
        Commands::Locate { at } => {
            let geolocator: Box<dyn Geolocator> = match at {
                Some(p) => Box::new(FixedGeolocator(p)),
                None => geolocator_from_config(&config),
            };
            let mut session = MapSession::new(config);
            let recenter = session
                .locate(geolocator.as_ref())
                .map_err(|e| anyhow::anyhow!(e.alert_text()))?;
            println!(
                "Centered on {} at zoom {}",
                recenter.center, recenter.zoom
            );
        }
        Commands::Config { init } => {
            let path = cli.config.unwrap_or_else(MapConfig::default_path);
            if init {
                config.save(&path)?;
                println!("Wrote {}", path.display());
            } else {
                println!("# {}", path.display());
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
        }
    }

    Ok(())
}
