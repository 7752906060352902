use anyhow::Context;
use clap::Parser;
use config::SessionConfig;
use crimecore::calendar::{DateInterval, DayKey};
use std::fs;
use std::path::PathBuf;
use summary::{probe_interval, Auditor};

mod config;
mod summary;

#[derive(Parser)]
#[command(author, version, about = "Headless audit driver for the NYC crime map dataset")]
struct Args {
    /// Load a session config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Incident CSV (ignored when --config is given)
    #[arg(long, default_value = "data/allMurders.csv")]
    incidents: PathBuf,
    /// Borough boundary GeoJSON
    #[arg(long)]
    boundaries: Option<PathBuf>,
    /// Probe start date (MM/DD/YYYY); counts incidents in --from..--to
    #[arg(long)]
    from: Option<String>,
    /// Probe end date (MM/DD/YYYY)
    #[arg(long)]
    to: Option<String>,
    /// Write the summary as JSON to this path
    #[arg(long)]
    summary_json: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let session_config = if let Some(path) = args.config {
        SessionConfig::load(path)?
    } else {
        SessionConfig::from_args(args.incidents, args.boundaries)
    };

    let auditor = Auditor::new(session_config);
    let (series, summary) = auditor.execute()?;

    println!(
        "Window {}..{} -> {} days, {} incidents ({} outside window)",
        summary.window_start,
        summary.window_end,
        summary.days,
        summary.incidents,
        summary.outside_window
    );
    println!(
        "Skipped rows: {} invalid dates, {} missing coordinates",
        summary.invalid_dates, summary.missing_coordinates
    );
    match &summary.peak_day {
        Some(day) => println!(
            "Peak day {} with {} incidents; {} empty days",
            day, summary.max_daily_count, summary.empty_days
        ),
        None => println!("No incidents inside the window"),
    }
    if !summary.boroughs.is_empty() {
        println!("Boroughs: {}", summary.boroughs.join(", "));
    }

    if let (Some(from), Some(to)) = (&args.from, &args.to) {
        let interval = DateInterval::new(
            DayKey::parse_mdy(from).with_context(|| format!("invalid --from {from:?}"))?,
            DayKey::parse_mdy(to).with_context(|| format!("invalid --to {to:?}"))?,
        );
        println!(
            "Probe {} -> {} incidents",
            interval,
            probe_interval(&series, interval)
        );
    }

    if let Some(path) = args.summary_json {
        let json = serde_json::to_string_pretty(&summary)?;
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, json).with_context(|| format!("writing summary {}", path.display()))?;
        println!("Summary written to {}", path.display());
    }

    Ok(())
}
