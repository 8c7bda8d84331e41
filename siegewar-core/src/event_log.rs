//! Event log processor: records dispatched siege actions as JSONL.
//!
//! Stands in for the real action processors when replaying placements
//! offline. Each dispatched action becomes one line:
//!
//! ```json
//! {"type":"invade","player":"alice","faction":"Northmark","settlement":"Oakvale"}
//! ```

use crate::action::SiegeActionProcessor;
use crate::input::PlaceBlockEvent;
use crate::state::{BlockPos, Coord, FactionId, Participant, Settlement, Siege, TownUnit};
use crate::zone::SiegeZone;
use serde::{Deserialize, Serialize};
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SiegeEvent {
    /// Coloured banner placed beside a town.
    Attack {
        player: String,
        block: BlockPos,
        /// Bordering town-unit cells
        adjacent: Vec<Coord>,
        /// Settlements owning those cells, deduplicated
        settlements: Vec<String>,
    },
    /// White banner placed near an in-progress siege flag.
    Abandon {
        player: String,
        zone: String,
        score: i32,
    },
    Surrender {
        player: String,
        settlement: String,
    },
    Invade {
        player: String,
        faction: FactionId,
        settlement: String,
    },
    Plunder {
        player: String,
        faction: FactionId,
        settlement: String,
    },
}

/// Processor writing one [`SiegeEvent`] per dispatched action.
pub struct EventLogProcessor {
    writer: Box<dyn Write + Send>,
    written: u64,
}

impl EventLogProcessor {
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self { writer, written: 0 }
    }

    /// Buffered stdout, for piping to `jq` and friends.
    pub fn stdout() -> Self {
        Self::new(Box::new(BufWriter::new(std::io::stdout())))
    }

    pub fn file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(BufWriter::new(file))))
    }

    /// Number of events successfully written.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }

    fn emit(&mut self, event: SiegeEvent) {
        let result = serde_json::to_string(&event)
            .map_err(std::io::Error::from)
            .and_then(|line| writeln!(self.writer, "{line}"));
        match result {
            Ok(()) => self.written += 1,
            // Write failures are logged, never propagated to the caller
            Err(e) => log::error!("Failed to write siege event: {}", e),
        }
    }
}

impl Drop for EventLogProcessor {
    fn drop(&mut self) {
        if let Err(e) = self.writer.flush() {
            log::error!("Failed to flush siege event log: {}", e);
        }
    }
}

impl SiegeActionProcessor for EventLogProcessor {
    fn attack(&mut self, event: &PlaceBlockEvent, adjacent_units: &[&TownUnit]) {
        let mut settlements: Vec<String> = Vec::new();
        for name in adjacent_units.iter().filter_map(|u| u.settlement.as_ref()) {
            if !settlements.contains(name) {
                settlements.push(name.clone());
            }
        }
        self.emit(SiegeEvent::Attack {
            player: event.player.name.clone(),
            block: event.block.position.clone(),
            adjacent: adjacent_units.iter().map(|u| u.coord).collect(),
            settlements,
        });
    }

    fn abandon(&mut self, event: &PlaceBlockEvent, zone: &SiegeZone) {
        self.emit(SiegeEvent::Abandon {
            player: event.player.name.clone(),
            zone: zone.name(),
            score: zone.score(),
        });
    }

    fn surrender(&mut self, event: &PlaceBlockEvent, settlement: &Settlement) {
        self.emit(SiegeEvent::Surrender {
            player: event.player.name.clone(),
            settlement: settlement.name.clone(),
        });
    }

    fn invade(
        &mut self,
        event: &PlaceBlockEvent,
        _participant: &Participant,
        faction: &FactionId,
        settlement: &Settlement,
        _siege: &Siege,
    ) {
        self.emit(SiegeEvent::Invade {
            player: event.player.name.clone(),
            faction: faction.clone(),
            settlement: settlement.name.clone(),
        });
    }

    fn plunder(
        &mut self,
        event: &PlaceBlockEvent,
        _participant: &Participant,
        faction: &FactionId,
        settlement: &Settlement,
        _siege: &Siege,
    ) {
        self.emit(SiegeEvent::Plunder {
            player: event.player.name.clone(),
            faction: faction.clone(),
            settlement: settlement.name.clone(),
        });
    }
}
