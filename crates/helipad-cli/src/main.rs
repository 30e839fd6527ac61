// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use helipad_core::cluster::{RenderCluster, Viewport};
use helipad_core::toggler;
use helipad_core::{AppSettings, HelipadSession, MatchState};
use log::info;
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the simulator's Community folder
    #[arg(short, long, env = "HELIPAD_COMMUNITY")]
    community: Option<PathBuf>,

    /// Settings file to use instead of the per-user one
    #[arg(long, env = "HELIPAD_SETTINGS")]
    settings: Option<PathBuf>,

    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a helipad CSV and report what was accepted
    Load { csv: Option<PathBuf> },
    /// Index scenery files in the Community folder
    Index,
    /// Load a CSV and match it against the Community folder, if one is set
    Match {
        csv: Option<PathBuf>,
        /// Only list helipads without a scenery file
        #[arg(long)]
        unmatched: bool,
    },
    /// Print the markers a map would draw for a viewport
    Clusters {
        csv: Option<PathBuf>,
        #[arg(long, allow_hyphen_values = true)]
        top: f64,
        #[arg(long, allow_hyphen_values = true)]
        bottom: f64,
        #[arg(long, allow_hyphen_values = true)]
        left: f64,
        #[arg(long, allow_hyphen_values = true)]
        right: f64,
        #[arg(long, default_value_t = 10.0)]
        zoom: f64,
    },
    /// Enable or disable a scenery file, by helipad ident or by path
    Toggle {
        target: String,
        /// Helipad CSV used to resolve an ident
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Show or change stored settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    Show,
    SetCommunity { path: PathBuf },
    SetCsv { path: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings_path = cli.settings.clone().unwrap_or_else(AppSettings::default_path);
    let mut settings = AppSettings::load(&settings_path)?;
    if let Some(community) = &cli.community {
        settings.community_folder = Some(community.clone());
    }

    match cli.command {
        Commands::Load { csv } => {
            let csv = resolve_csv(csv, &settings)?;
            let mut session = HelipadSession::new(&AppSettings {
                community_folder: None,
                ..settings.clone()
            });
            let report = session.load_csv(&csv)?;
            if report.source_missing {
                anyhow::bail!("CSV not found: {}", csv.display());
            }
            println!(
                "Loaded {} helipads ({} lines, {} skipped, {} blank)",
                report.stats.accepted, report.stats.total, report.stats.skipped, report.stats.blank
            );
            for skip in &report.skipped {
                println!("  line {}: {:?}", skip.line_number, skip.reason);
            }
        }
        Commands::Index => {
            let community = require_community(&settings)?;
            let mut session = HelipadSession::new(&settings);
            let index = session.index_community(&community)?;
            println!(
                "Indexed {} scenery files under {:?}: {} idents",
                index.files_scanned(),
                community,
                index.len()
            );
            for dup in index.duplicates() {
                println!(
                    "  duplicate {}: kept {:?}, ignored {:?}",
                    dup.ident, dup.kept, dup.dropped
                );
            }
        }
        Commands::Match { csv, unmatched } => {
            let session = loaded_session(csv, &settings)?;
            let exts = session.extensions();
            for r in session.records() {
                let state = r.match_state(exts);
                if unmatched && state != MatchState::Unmatched {
                    continue;
                }
                let marker = match state {
                    MatchState::Active => "[x]",
                    MatchState::Inactive => "[ ]",
                    MatchState::Unmatched => "[?]",
                };
                match &r.scenery_path {
                    Some(path) => println!("{} {} {}", marker, r.ident, path.display()),
                    None => println!("{} {} {}", marker, r.ident, r.name),
                }
            }
            println!(
                "Matched {} of {} helipads",
                session.matched_count(),
                session.records().len()
            );
        }
        Commands::Clusters {
            csv,
            top,
            bottom,
            left,
            right,
            zoom,
        } => {
            let session = loaded_session(csv, &settings)?;
            let viewport = Viewport::new(top, bottom, left, right, zoom);
            let clusters = session.clusters(&viewport);
            for cluster in &clusters {
                match cluster {
                    RenderCluster::Single {
                        index, lat, lon, state, ..
                    } => {
                        let colour = match state {
                            MatchState::Unmatched => "red",
                            MatchState::Active | MatchState::Inactive => "green",
                        };
                        let r = &session.records()[*index];
                        println!("{:>10.5} {:>11.5}  {:<5} {}", lat, lon, colour, r.ident);
                    }
                    RenderCluster::Aggregate {
                        lat, lon, count, ..
                    } => {
                        println!("{:>10.5} {:>11.5}  blue  ({} helipads)", lat, lon, count);
                    }
                }
            }
            println!("{} markers", clusters.len());
        }
        Commands::Toggle { target, csv } => {
            let path = Path::new(&target);
            if path.exists() {
                let outcome = toggler::toggle(path, &settings.extensions)?;
                println!("{}", outcome.message);
            } else {
                require_community(&settings)?;
                let mut session = loaded_session(csv, &settings)?;
                let idx = session
                    .find_by_ident(&target)
                    .ok_or_else(|| anyhow::anyhow!("No helipad with ident '{}'", target))?;
                let outcome = session.toggle(idx)?;
                println!("{}", outcome.message);
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                println!("Settings file: {}", settings_path.display());
                println!("{}", describe_settings(&settings));
            }
            ConfigAction::SetCommunity { path } => {
                if !path.is_dir() {
                    anyhow::bail!("Not a directory: {}", path.display());
                }
                settings.community_folder = Some(path.clone());
                settings.save(&settings_path)?;
                println!("Community folder set: {}", path.display());
            }
            ConfigAction::SetCsv { path } => {
                settings.csv_path = Some(path.clone());
                settings.save(&settings_path)?;
                println!("Helipad CSV set: {}", path.display());
            }
        },
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let config = ConfigBuilder::new().set_time_level(LevelFilter::Off).build();
    let _ = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto);
}

fn resolve_csv(csv: Option<PathBuf>, settings: &AppSettings) -> Result<PathBuf> {
    csv.or_else(|| settings.csv_path.clone()).ok_or_else(|| {
        anyhow::anyhow!("No helipad CSV given. Pass one or run `helipad config set-csv`.")
    })
}

fn require_community(settings: &AppSettings) -> Result<PathBuf> {
    settings.community_folder.clone().ok_or_else(|| {
        anyhow::anyhow!("Set the Community folder first (--community or `helipad config set-community`).")
    })
}

/// Loads the CSV and, when a Community folder is configured, matches it against the
/// scenery there. Without a folder every helipad stays unmatched.
fn loaded_session(csv: Option<PathBuf>, settings: &AppSettings) -> Result<HelipadSession> {
    let csv = resolve_csv(csv, settings)?;

    // Index explicitly rather than inside load_csv so a bad folder is reported
    let mut session = HelipadSession::new(&AppSettings {
        community_folder: None,
        ..settings.clone()
    });
    let report = session
        .load_csv(&csv)
        .with_context(|| format!("Failed to load {}", csv.display()))?;
    if report.source_missing {
        anyhow::bail!("CSV not found: {}", csv.display());
    }
    match &settings.community_folder {
        Some(community) => {
            session.index_community(community)?;
        }
        None => info!("No Community folder set, helipads are shown unmatched"),
    }
    Ok(session)
}

fn describe_settings(settings: &AppSettings) -> String {
    format!(
        "community_folder: {}\ncsv_path: {}\nextensions: active=.{} disabled=.{}",
        display_opt(settings.community_folder.as_deref()),
        display_opt(settings.csv_path.as_deref()),
        settings.extensions.active,
        settings.extensions.disabled
    )
}

fn display_opt(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "(not set)".to_string())
}
