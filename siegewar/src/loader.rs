use anyhow::{Context, Result};
use serde::Deserialize;
use siegewar_core::{PlaceBlockEvent, SiegeWarSettings, SiegeWarState};
use std::path::Path;

/// A world plus the placements to replay against it.
#[derive(Debug, Deserialize)]
pub struct Scenario {
    pub world: SiegeWarState,
    #[serde(default)]
    pub placements: Vec<PlaceBlockEvent>,
}

pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario {}", path.display()))?;
    let scenario: Scenario = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse scenario {}", path.display()))?;

    log::info!(
        "Loaded scenario: {} worlds, {} settlements, {} sieges, {} placements",
        scenario.world.worlds.len(),
        scenario.world.settlements.len(),
        scenario.world.sieges.len(),
        scenario.placements.len()
    );
    Ok(scenario)
}

pub fn load_settings(path: Option<&Path>) -> Result<SiegeWarSettings> {
    match path {
        Some(path) => SiegeWarSettings::from_json_file(path)
            .with_context(|| format!("Failed to load settings {}", path.display())),
        None => Ok(SiegeWarSettings::default()),
    }
}
