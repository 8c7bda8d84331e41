use crate::action::{ActionKind, Messenger, SiegeActionProcessor};
use crate::block::PlacedBlock;
use crate::input::{PlaceBlockEvent, Player};
use crate::state::{
    BlockPos, Coord, FactionId, Location, Participant, Settlement, Siege, SiegeStatus,
    SiegeWarState, TownUnit,
};
use crate::zone::SiegeZone;

pub struct SiegeWarStateBuilder {
    state: SiegeWarState,
}

impl SiegeWarStateBuilder {
    pub fn new() -> Self {
        Self {
            state: SiegeWarState::default(),
        }
    }

    pub fn with_world(mut self, name: &str) -> Self {
        self.state.worlds.entry(name.to_string()).or_default();
        self
    }

    pub fn with_settlement(mut self, name: &str, faction: Option<&str>) -> Self {
        self.state.settlements.insert(
            name.to_string(),
            Settlement {
                name: name.to_string(),
                faction: faction.map(|f| f.to_string()),
            },
        );
        self
    }

    /// Claim a cell for a settlement. Registers the world if needed.
    pub fn with_town_unit(mut self, world: &str, coord: Coord, settlement: &str) -> Self {
        self.state
            .worlds
            .entry(world.to_string())
            .or_default()
            .insert(TownUnit::new(coord, Some(settlement)));
        self
    }

    pub fn with_unowned_town_unit(mut self, world: &str, coord: Coord) -> Self {
        self.state
            .worlds
            .entry(world.to_string())
            .or_default()
            .insert(TownUnit::new(coord, None));
        self
    }

    pub fn with_participant(mut self, name: &str, settlement: Option<&str>) -> Self {
        self.state.participants.insert(
            name.to_string(),
            Participant {
                name: name.to_string(),
                settlement: settlement.map(|s| s.to_string()),
            },
        );
        self
    }

    pub fn with_siege(mut self, settlement: &str, status: SiegeStatus) -> Self {
        self.state
            .sieges
            .insert(settlement.to_string(), Siege::new(settlement, status));
        self
    }

    /// Add an attacking zone. Creates an in-progress siege if the settlement
    /// has none yet.
    ///
    /// # Panics
    ///
    /// If either name contains the zone separator.
    pub fn with_zone(mut self, settlement: &str, faction: &str, flag: Option<Location>) -> Self {
        let mut zone = SiegeZone::new(faction, settlement).expect("fixture zone names are valid");
        if let Some(flag) = flag {
            zone.set_flag_location(flag);
        }
        self.state
            .sieges
            .entry(settlement.to_string())
            .or_insert_with(|| Siege::new(settlement, SiegeStatus::InProgress))
            .add_zone(zone);
        self
    }

    pub fn build(self) -> SiegeWarState {
        self.state
    }
}

impl Default for SiegeWarStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Player whose id is derived from the name.
pub fn player(name: &str, world: &str) -> Player {
    Player::new(name, format!("{name}-id"), world)
}

pub fn chest_at(world: &str, x: i32, z: i32) -> PlacedBlock {
    PlacedBlock::new("minecraft:chest", BlockPos::new(world, x, 64, z))
}

/// One dispatched action, as seen by [`RecordingProcessor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedAction {
    pub kind: ActionKind,
    pub player: String,
    pub target: String,
}

/// Processor that only remembers what it was asked to do.
#[derive(Debug, Default)]
pub struct RecordingProcessor {
    pub actions: Vec<RecordedAction>,
    /// Cells handed to each attack call
    pub attack_units: Vec<Vec<Coord>>,
}

impl RecordingProcessor {
    fn record(&mut self, kind: ActionKind, event: &PlaceBlockEvent, target: &str) {
        self.actions.push(RecordedAction {
            kind,
            player: event.player.name.clone(),
            target: target.to_string(),
        });
    }
}

impl SiegeActionProcessor for RecordingProcessor {
    fn attack(&mut self, event: &PlaceBlockEvent, adjacent_units: &[&TownUnit]) {
        let target = adjacent_units
            .iter()
            .find_map(|u| u.settlement.as_deref())
            .unwrap_or_default();
        self.record(ActionKind::Attack, event, target);
        self.attack_units
            .push(adjacent_units.iter().map(|u| u.coord).collect());
    }

    fn abandon(&mut self, event: &PlaceBlockEvent, zone: &SiegeZone) {
        self.record(ActionKind::Abandon, event, &zone.name());
    }

    fn surrender(&mut self, event: &PlaceBlockEvent, settlement: &Settlement) {
        self.record(ActionKind::Surrender, event, &settlement.name);
    }

    fn invade(
        &mut self,
        event: &PlaceBlockEvent,
        _participant: &Participant,
        _faction: &FactionId,
        settlement: &Settlement,
        _siege: &Siege,
    ) {
        self.record(ActionKind::Invade, event, &settlement.name);
    }

    fn plunder(
        &mut self,
        event: &PlaceBlockEvent,
        _participant: &Participant,
        _faction: &FactionId,
        settlement: &Settlement,
        _siege: &Siege,
    ) {
        self.record(ActionKind::Plunder, event, &settlement.name);
    }
}

/// Messenger that keeps `(player, message)` pairs.
#[derive(Debug, Default)]
pub struct RecordingMessenger {
    pub errors: Vec<(String, String)>,
}

impl Messenger for RecordingMessenger {
    fn send_error(&mut self, player: &Player, message: &str) {
        self.errors.push((player.name.clone(), message.to_string()));
    }
}
