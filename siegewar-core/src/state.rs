use crate::zone::{SiegeZone, ZoneError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub type SettlementId = String;
pub type FactionId = String;
pub type PlayerId = String;
/// Milliseconds since the epoch, as delivered by the host clock.
pub type Timestamp = u64;

/// A point in a named world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub world: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Location {
    pub fn new(world: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self {
            world: world.into(),
            x,
            y,
            z,
        }
    }

    /// Euclidean 3-D distance, or `None` when the locations are in different worlds.
    pub fn distance(&self, other: &Location) -> Option<f64> {
        if self.world != other.world {
            return None;
        }
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        Some((dx * dx + dy * dy + dz * dz).sqrt())
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{:.1},{:.1},{:.1}", self.world, self.x, self.y, self.z)
    }
}

/// Integer block coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    pub world: String,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(world: impl Into<String>, x: i32, y: i32, z: i32) -> Self {
        Self {
            world: world.into(),
            x,
            y,
            z,
        }
    }

    pub fn location(&self) -> Location {
        Location::new(
            self.world.clone(),
            self.x as f64,
            self.y as f64,
            self.z as f64,
        )
    }

    /// Town-unit cell containing this block.
    pub fn coord(&self, town_block_size: u32) -> Coord {
        Coord::parse(self.x, self.z, town_block_size)
    }
}

/// A single town-unit cell on the horizontal plane.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Coord {
    pub x: i32,
    pub z: i32,
}

impl Coord {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Cell for block coordinates. Rounds toward negative infinity, so block -1
    /// lands in cell -1 rather than cell 0.
    pub fn parse(block_x: i32, block_z: i32, town_block_size: u32) -> Self {
        let size = town_block_size.max(1) as i32;
        Self {
            x: block_x.div_euclid(size),
            z: block_z.div_euclid(size),
        }
    }

    pub const fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            z: self.z + dz,
        }
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// A claimed (or unowned but registered) cell of territory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TownUnit {
    pub coord: Coord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settlement: Option<SettlementId>,
}

impl TownUnit {
    pub fn new(coord: Coord, settlement: Option<&str>) -> Self {
        Self {
            coord,
            settlement: settlement.map(|s| s.to_string()),
        }
    }
}

/// Town units of one world, indexed by cell.
///
/// Serialized as a plain list because JSON map keys must be strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<TownUnit>", into = "Vec<TownUnit>")]
pub struct WorldTerritory {
    units: HashMap<Coord, TownUnit>,
}

impl WorldTerritory {
    pub fn insert(&mut self, unit: TownUnit) {
        self.units.insert(unit.coord, unit);
    }

    pub fn get(&self, coord: Coord) -> Option<&TownUnit> {
        self.units.get(&coord)
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.units.contains_key(&coord)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl From<Vec<TownUnit>> for WorldTerritory {
    fn from(units: Vec<TownUnit>) -> Self {
        Self {
            units: units.into_iter().map(|u| (u.coord, u)).collect(),
        }
    }
}

impl From<WorldTerritory> for Vec<TownUnit> {
    fn from(territory: WorldTerritory) -> Self {
        let mut units: Vec<TownUnit> = territory.units.into_values().collect();
        units.sort_by_key(|u| u.coord);
        units
    }
}

/// A town. Optionally a member of a faction (nation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub name: SettlementId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faction: Option<FactionId>,
}

/// A player's persistent identity (resident).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settlement: Option<SettlementId>,
}

impl Participant {
    pub fn has_settlement(&self) -> bool {
        self.settlement.is_some()
    }
}

/// Lifecycle status of a siege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiegeStatus {
    Preparation,
    InProgress,
    AttackerWin,
    DefenderWin,
    AttackerAbandon,
    DefenderSurrender,
}

impl SiegeStatus {
    pub fn is_in_progress(self) -> bool {
        self == SiegeStatus::InProgress
    }

    pub fn is_concluded(self) -> bool {
        !matches!(self, SiegeStatus::Preparation | SiegeStatus::InProgress)
    }
}

/// All siege zones pressing on one settlement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawSiege")]
pub struct Siege {
    pub defending_settlement: SettlementId,
    pub status: SiegeStatus,
    /// Keyed by attacking faction.
    #[serde(default)]
    pub zones: BTreeMap<FactionId, SiegeZone>,
}

impl Siege {
    pub fn new(defending_settlement: impl Into<String>, status: SiegeStatus) -> Self {
        Self {
            defending_settlement: defending_settlement.into(),
            status,
            zones: BTreeMap::new(),
        }
    }

    pub fn zone(&self, faction: &str) -> Option<&SiegeZone> {
        self.zones.get(faction)
    }

    pub fn zone_mut(&mut self, faction: &str) -> Option<&mut SiegeZone> {
        self.zones.get_mut(faction)
    }

    /// Whether `faction` is one of the attackers of this siege.
    pub fn has_attacker(&self, faction: &str) -> bool {
        self.zones.contains_key(faction)
    }

    /// Insert a zone under its attacking faction, replacing any previous one.
    pub fn add_zone(&mut self, zone: SiegeZone) -> Option<SiegeZone> {
        self.zones.insert(zone.attacking_faction().to_string(), zone)
    }
}

#[derive(Deserialize)]
struct RawSiege {
    defending_settlement: SettlementId,
    status: SiegeStatus,
    #[serde(default)]
    zones: BTreeMap<FactionId, SiegeZone>,
}

impl TryFrom<RawSiege> for Siege {
    type Error = ZoneError;

    /// Each zone must sit under its own faction and besiege this settlement.
    fn try_from(raw: RawSiege) -> Result<Self, Self::Error> {
        for (key, zone) in &raw.zones {
            if key != zone.attacking_faction() {
                return Err(ZoneError::KeyMismatch {
                    key: key.clone(),
                    faction: zone.attacking_faction().to_string(),
                });
            }
            if zone.defending_settlement() != raw.defending_settlement {
                return Err(ZoneError::SettlementMismatch {
                    zone: zone.name(),
                    settlement: raw.defending_settlement.clone(),
                });
            }
        }
        Ok(Self {
            defending_settlement: raw.defending_settlement,
            status: raw.status,
            zones: raw.zones,
        })
    }
}

/// In-memory siege-war world: territory, residents and sieges.
///
/// Implements every store trait so it can be handed straight to the
/// placement classifier. Ordered maps keep scans deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiegeWarState {
    /// Registered worlds and their claimed cells
    #[serde(default)]
    pub worlds: BTreeMap<String, WorldTerritory>,
    #[serde(default)]
    pub settlements: BTreeMap<SettlementId, Settlement>,
    /// Residents keyed by player name
    #[serde(default)]
    pub participants: BTreeMap<String, Participant>,
    /// Sieges keyed by defending settlement
    #[serde(default)]
    pub sieges: BTreeMap<SettlementId, Siege>,
}

impl SiegeWarState {
    /// Every zone of every siege, in (settlement, faction) order.
    pub fn zones(&self) -> impl Iterator<Item = &SiegeZone> {
        self.sieges.values().flat_map(|s| s.zones.values())
    }

    /// Find a zone by its `faction#vs#settlement` key.
    pub fn zone_by_name(&self, name: &str) -> Option<&SiegeZone> {
        self.zones().find(|z| z.name() == name)
    }
}
