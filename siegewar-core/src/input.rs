use crate::block::PlacedBlock;
use crate::state::PlayerId;
use serde::{Deserialize, Serialize};

/// The acting player as the host reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Display name, used to look up the participant record
    pub name: String,
    /// Stable unique id (keys the scoring schedules)
    pub id: PlayerId,
    /// World the player is currently in
    pub world: String,
}

impl Player {
    pub fn new(name: impl Into<String>, id: impl Into<PlayerId>, world: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            world: world.into(),
        }
    }
}

/// A block placement delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceBlockEvent {
    pub player: Player,
    pub block: PlacedBlock,
}

impl PlaceBlockEvent {
    pub fn new(player: Player, block: PlacedBlock) -> Self {
        Self { player, block }
    }
}
