use anyhow::Result;
use clap::Parser;
use siegewar_core::{EventLogProcessor, LogMessenger, PlacementClassifier};
use std::path::PathBuf;

mod loader;

/// Replay block placements through the siege-war classifier.
///
/// Prints one JSON line per placement taken as a siege action.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario file (JSON: world + placements)
    #[arg(long)]
    scenario: PathBuf,

    /// Settings file (JSON). Defaults apply when omitted
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = std::str::FromStr::from_str(&args.log_level).unwrap_or(log::LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();

    let settings = loader::load_settings(args.settings.as_deref())?;
    let scenario = loader::load_scenario(&args.scenario)?;
    log::debug!("Settings: {:?}", settings);

    let classifier = PlacementClassifier::new(&scenario.world, &settings);
    let mut processor = EventLogProcessor::stdout();
    let mut messenger = LogMessenger;

    let mut consumed = 0usize;
    for event in &scenario.placements {
        if classifier.evaluate(event, &mut processor, &mut messenger) {
            consumed += 1;
        } else {
            log::debug!(
                "{} placed {} normally",
                event.player.name,
                event.block.type_key
            );
        }
    }
    processor.flush()?;

    log::info!(
        "Replay finished: {}/{} placements were siege actions",
        consumed,
        scenario.placements.len()
    );

    Ok(())
}
