//! Block placement classifier.
//!
//! Decides whether a placed block is a siege action and, if so, which one:
//!
//! ```text
//!                 ┌── wilderness ──┬─ white ───▶ Abandon
//!   banner ──────▶┤                └─ coloured ▶ Attack
//!                 └── besieged town┬─ white ───▶ Surrender
//!                                  └─ coloured ▶ Invade
//!   chest  ─────────▶ besieged town ───────────▶ Plunder
//!   other  ─────────▶ not a siege action
//! ```
//!
//! Failing any precondition is not an error: the placement simply falls
//! through to normal block handling. Only lookups that fail to resolve
//! (e.g. an unregistered world) are reported, and even those never veto the
//! placement.

use crate::action::{ActionKind, ActionRequest, Messenger, SiegeActionProcessor};
use crate::block::{BannerColour, BlockCategory, PlacedBlock};
use crate::config::{SettingsSource, SiegeWarSettings};
use crate::input::{PlaceBlockEvent, Player};
use crate::spatial::adjacent_town_units;
use crate::state::{FactionId, Participant, Settlement, Siege};
use crate::store::{LookupError, ParticipantStore, SiegeStore, SiegeWarStore, TerritoryStore};
use crate::zone::SiegeZone;

/// Message shown to the player when a lookup fails mid-classification.
pub const PLACEMENT_ERROR_MESSAGE: &str = "Problem placing siege related block";

/// Classifies placements against a store and the current settings.
///
/// Holds no state of its own between calls.
pub struct PlacementClassifier<'s, S: ?Sized, C: ?Sized> {
    store: &'s S,
    settings: &'s C,
}

impl<'s, S, C> PlacementClassifier<'s, S, C>
where
    S: SiegeWarStore + ?Sized,
    C: SettingsSource + ?Sized,
{
    pub fn new(store: &'s S, settings: &'s C) -> Self {
        Self { store, settings }
    }

    /// Evaluate a placement end to end.
    ///
    /// Returns `true` when the placement was taken as a siege action and the
    /// host must suppress its default handling.
    pub fn evaluate<P, M>(
        &self,
        event: &PlaceBlockEvent,
        processor: &mut P,
        messenger: &mut M,
    ) -> bool
    where
        P: SiegeActionProcessor + ?Sized,
        M: Messenger + ?Sized,
    {
        match self.classify(event) {
            Ok(Some(request)) => {
                log::info!(
                    "{} by {} against {}",
                    request.kind(),
                    event.player.name,
                    request.target()
                );
                request.dispatch(event, processor);
                true
            }
            Ok(None) => false,
            Err(e) => {
                messenger.send_error(&event.player, PLACEMENT_ERROR_MESSAGE);
                log::error!(
                    "Siege placement by {} at {:?} failed: {}",
                    event.player.name,
                    event.block.position,
                    e
                );
                false
            }
        }
    }

    /// Work out which siege action, if any, a placement represents.
    pub fn classify(
        &self,
        event: &PlaceBlockEvent,
    ) -> Result<Option<ActionRequest<'s>>, LookupError> {
        let category = event.block.category();
        if category == BlockCategory::Other {
            return Ok(None);
        }

        let settings = self.settings.settings();
        match category {
            BlockCategory::Banner(colour) => self.classify_banner(event, colour, &settings),
            BlockCategory::Chest => evaluate_plunder(self.store, &settings, event),
            BlockCategory::Other => Ok(None),
        }
    }

    fn classify_banner(
        &self,
        event: &PlaceBlockEvent,
        colour: BannerColour,
        settings: &SiegeWarSettings,
    ) -> Result<Option<ActionRequest<'s>>, LookupError> {
        let block = &event.block;
        let world = block.position.world.as_str();
        let coord = block.position.coord(settings.town_block_size);

        if !self.store.has_town_unit(world, coord)? {
            log::trace!("Banner at {} {} is in the wilderness", world, coord);
            return match colour {
                BannerColour::White => Ok(evaluate_abandon(self.store, settings, block)),
                BannerColour::Colored => evaluate_attack(self.store, settings, block),
            };
        }

        let Some(unit) = self.store.town_unit(world, coord)? else {
            return Ok(None);
        };
        let Some(settlement) = self.store.owning_settlement(unit) else {
            return Ok(None);
        };
        // No siege here: an ordinary build
        let Some(siege) = self.store.siege_of(settlement) else {
            return Ok(None);
        };

        Ok(match colour {
            BannerColour::White => evaluate_surrender(settings, settlement),
            BannerColour::Colored => {
                evaluate_invade(self.store, settings, &event.player, settlement, siege)
            }
        })
    }
}

/// White banner in the wilderness: give up the nearest in-progress siege.
///
/// Picks the zone whose flag is nearest the block across every in-progress
/// siege. Exact ties go to the first zone in store order. Zones without a
/// flag, or with a flag in another world, are not candidates.
pub fn evaluate_abandon<'a, S: SiegeStore + ?Sized>(
    store: &'a S,
    settings: &SiegeWarSettings,
    block: &PlacedBlock,
) -> Option<ActionRequest<'a>> {
    if !ActionKind::Abandon.is_enabled(settings) {
        return None;
    }

    let (zone, distance) = nearest_in_progress_zone(store, block)?;
    if distance > settings.town_block_size as f64 {
        log::debug!(
            "Nearest zone {} is {:.1} blocks away, beyond {}",
            zone.name(),
            distance,
            settings.town_block_size
        );
        return None;
    }

    Some(ActionRequest::Abandon { zone })
}

fn nearest_in_progress_zone<'a, S: SiegeStore + ?Sized>(
    store: &'a S,
    block: &PlacedBlock,
) -> Option<(&'a SiegeZone, f64)> {
    let origin = block.position.location();
    let mut nearest: Option<(&'a SiegeZone, f64)> = None;

    for siege in store.sieges().filter(|s| s.status.is_in_progress()) {
        for zone in siege.zones.values() {
            let Some(distance) = zone.flag_location().and_then(|flag| origin.distance(flag))
            else {
                continue;
            };
            if nearest.map_or(true, |(_, best)| distance < best) {
                nearest = Some((zone, distance));
            }
        }
    }
    nearest
}

/// Coloured banner in the wilderness: start a siege on a bordering town.
pub fn evaluate_attack<'a, S: TerritoryStore + ?Sized>(
    store: &'a S,
    settings: &SiegeWarSettings,
    block: &PlacedBlock,
) -> Result<Option<ActionRequest<'a>>, LookupError> {
    if !ActionKind::Attack.is_enabled(settings) {
        return Ok(None);
    }

    let adjacent_units = adjacent_town_units(store, block, settings.town_block_size)?;
    if adjacent_units.is_empty() {
        return Ok(None);
    }
    Ok(Some(ActionRequest::Attack { adjacent_units }))
}

/// White banner inside a besieged town. Anyone may place it; the processor
/// decides whether the player may actually surrender.
pub fn evaluate_surrender<'a>(
    settings: &SiegeWarSettings,
    settlement: &'a Settlement,
) -> Option<ActionRequest<'a>> {
    if !ActionKind::Surrender.is_enabled(settings) {
        return None;
    }
    Some(ActionRequest::Surrender { settlement })
}

/// Coloured banner inside a besieged town, placed by one of its attackers.
pub fn evaluate_invade<'a, S: ParticipantStore + ?Sized>(
    store: &'a S,
    settings: &SiegeWarSettings,
    player: &Player,
    settlement: &'a Settlement,
    siege: &'a Siege,
) -> Option<ActionRequest<'a>> {
    if !ActionKind::Invade.is_enabled(settings) {
        return None;
    }

    let (participant, faction) = attacking_participant(store, player, siege)?;
    Some(ActionRequest::Invade {
        participant,
        faction,
        settlement,
        siege,
    })
}

/// Chest inside a besieged town, placed by one of its attackers.
///
/// The cell is resolved in the player's world.
pub fn evaluate_plunder<'a, S: SiegeWarStore + ?Sized>(
    store: &'a S,
    settings: &SiegeWarSettings,
    event: &PlaceBlockEvent,
) -> Result<Option<ActionRequest<'a>>, LookupError> {
    if !ActionKind::Plunder.is_enabled(settings) {
        return Ok(None);
    }

    let world = event.player.world.as_str();
    let coord = event.block.position.coord(settings.town_block_size);
    if !store.has_town_unit(world, coord)? {
        return Ok(None);
    }
    let Some(unit) = store.town_unit(world, coord)? else {
        return Ok(None);
    };
    let Some(settlement) = store.owning_settlement(unit) else {
        return Ok(None);
    };
    let Some(siege) = store.siege_of(settlement) else {
        return Ok(None);
    };

    Ok(
        attacking_participant(store, &event.player, siege).map(|(participant, faction)| {
            ActionRequest::Plunder {
                participant,
                faction,
                settlement,
                siege,
            }
        }),
    )
}

/// The player's participant record and faction, if that faction is one of
/// the siege's attackers.
fn attacking_participant<'a, S: ParticipantStore + ?Sized>(
    store: &'a S,
    player: &Player,
    siege: &Siege,
) -> Option<(&'a Participant, &'a FactionId)> {
    let participant = store.participant(&player.name)?;
    if !participant.has_settlement() {
        return None;
    }
    let faction = store.participant_faction(participant)?;
    if !siege.has_attacker(faction) {
        log::debug!(
            "{} ({}) is not attacking {}",
            player.name,
            faction,
            siege.defending_settlement
        );
        return None;
    }
    Some((participant, faction))
}
