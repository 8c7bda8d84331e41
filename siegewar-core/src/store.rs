//! Collaborator interfaces the placement classifier reads from.
//!
//! The classifier never reaches for a global data source; a single store is
//! wired at startup and passed in. [`SiegeWarState`] is the in-memory
//! implementation used by the binary and the tests.

use crate::state::{
    Coord, FactionId, Participant, Settlement, Siege, SiegeWarState, TownUnit, WorldTerritory,
};
use thiserror::Error;

/// A name or coordinate that does not resolve to a live object.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("world {0:?} is not registered")]
    UnregisteredWorld(String),
}

/// Territory lookup: which cells are claimed, and by whom.
pub trait TerritoryStore {
    fn has_town_unit(&self, world: &str, coord: Coord) -> Result<bool, LookupError>;

    fn town_unit(&self, world: &str, coord: Coord) -> Result<Option<&TownUnit>, LookupError>;

    fn owning_settlement(&self, unit: &TownUnit) -> Option<&Settlement>;
}

/// Resident lookup.
pub trait ParticipantStore {
    fn participant(&self, player_name: &str) -> Option<&Participant>;

    /// Faction the participant fights for (the faction of its settlement).
    fn participant_faction(&self, participant: &Participant) -> Option<&FactionId>;
}

/// Siege lookup.
pub trait SiegeStore {
    /// The siege attached to a settlement, whatever its status.
    fn siege_of(&self, settlement: &Settlement) -> Option<&Siege>;

    /// All sieges, in a stable order.
    fn sieges<'a>(&'a self) -> Box<dyn Iterator<Item = &'a Siege> + 'a>;

    fn has_siege(&self, settlement: &Settlement) -> bool {
        self.siege_of(settlement).is_some()
    }
}

/// Everything the classifier needs.
pub trait SiegeWarStore: TerritoryStore + ParticipantStore + SiegeStore {}

impl<T: TerritoryStore + ParticipantStore + SiegeStore> SiegeWarStore for T {}

impl SiegeWarState {
    fn world(&self, name: &str) -> Result<&WorldTerritory, LookupError> {
        self.worlds
            .get(name)
            .ok_or_else(|| LookupError::UnregisteredWorld(name.to_string()))
    }
}

impl TerritoryStore for SiegeWarState {
    fn has_town_unit(&self, world: &str, coord: Coord) -> Result<bool, LookupError> {
        Ok(self.world(world)?.contains(coord))
    }

    fn town_unit(&self, world: &str, coord: Coord) -> Result<Option<&TownUnit>, LookupError> {
        Ok(self.world(world)?.get(coord))
    }

    fn owning_settlement(&self, unit: &TownUnit) -> Option<&Settlement> {
        unit.settlement
            .as_ref()
            .and_then(|name| self.settlements.get(name))
    }
}

impl ParticipantStore for SiegeWarState {
    fn participant(&self, player_name: &str) -> Option<&Participant> {
        self.participants.get(player_name)
    }

    fn participant_faction(&self, participant: &Participant) -> Option<&FactionId> {
        participant
            .settlement
            .as_ref()
            .and_then(|name| self.settlements.get(name))
            .and_then(|settlement| settlement.faction.as_ref())
    }
}

impl SiegeStore for SiegeWarState {
    fn siege_of(&self, settlement: &Settlement) -> Option<&Siege> {
        self.sieges.get(&settlement.name)
    }

    fn sieges<'a>(&'a self) -> Box<dyn Iterator<Item = &'a Siege> + 'a> {
        Box::new(self.sieges.values())
    }
}
