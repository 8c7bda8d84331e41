//! # Siege War Core
//!
//! Territorial siege rules for a persistent multiplayer world: a faction
//! besieges a settlement, and players on either side act by placing blocks.
//!
//! This crate turns a block placement into a siege action (or decides it is
//! an ordinary build) and models the per-attacker siege zone whose score
//! decides the outcome.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌─────────────────────┐     ┌──────────────────────┐
//! │ Host event   │────▶│ PlacementClassifier │────▶│ SiegeActionProcessor │
//! │ (placement)  │     │ (classify/dispatch) │     │ (attack, invade ...) │
//! └──────────────┘     └──────────┬──────────┘     └──────────────────────┘
//!                                 │ reads
//!                      ┌──────────▼──────────┐
//!                      │ SiegeWarStore       │
//!                      │ territory, sieges,  │
//!                      │ residents, zones    │
//!                      └─────────────────────┘
//! ```
//!
//! ## Key Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`PlacementClassifier`] | Entry point: placement in, `consumed` bool out |
//! | [`ActionRequest`] | Tagged siege action with its resolved context |
//! | [`SiegeZone`] | Flag, score and scoring schedules of one attacker |
//! | [`SiegeWarStore`] | Injected lookups (territory, residents, sieges) |
//! | [`SiegeWarSettings`] | Feature toggles and town-unit size |
//!
//! Everything runs synchronously on the caller's thread. The classifier
//! only reads; processors and the scoring timer are the only writers, so a
//! host delivering events from several threads must serialise access to
//! the store itself.

pub mod action;
pub mod block;
pub mod config;
pub mod event_log;
pub mod input;
pub mod placement;
pub mod scoring;
pub mod spatial;
pub mod state;
pub mod store;
pub mod testing;
pub mod zone;

pub use action::{ActionKind, ActionRequest, LogMessenger, Messenger, SiegeActionProcessor};
pub use block::{BannerColour, BlockCategory, PlacedBlock};
pub use config::{ConfigError, SettingsSource, SharedSettings, SiegeWarSettings};
pub use event_log::{EventLogProcessor, SiegeEvent};
pub use input::{PlaceBlockEvent, Player};
pub use placement::{PlacementClassifier, PLACEMENT_ERROR_MESSAGE};
pub use scoring::{accrue_due, ScoreTally, ScoringRules};
pub use spatial::adjacent_town_units;
pub use state::{
    BlockPos, Coord, Location, Participant, Settlement, Siege, SiegeStatus, SiegeWarState,
    TownUnit,
};
pub use store::{LookupError, ParticipantStore, SiegeStore, SiegeWarStore, TerritoryStore};
pub use zone::{split_zone_name, zone_name, ScoreSide, SiegeZone, ZoneError};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{chest_at, player, RecordingMessenger, RecordingProcessor};

    fn scenario_world(flag_distance: f64) -> SiegeWarState {
        testing::SiegeWarStateBuilder::new()
            .with_world("world")
            .with_settlement("Oakvale", None)
            .with_settlement("Ironhold", Some("Northmark"))
            .with_town_unit("world", Coord::new(4, 4), "Oakvale")
            .with_participant("alice", Some("Ironhold"))
            .with_siege("Oakvale", SiegeStatus::InProgress)
            .with_zone(
                "Oakvale",
                "Northmark",
                Some(Location::new("world", flag_distance, 64.0, 0.0)),
            )
            .build()
    }

    fn evaluate(
        state: &SiegeWarState,
        settings: &SiegeWarSettings,
        event: &PlaceBlockEvent,
    ) -> (bool, RecordingProcessor) {
        let mut processor = RecordingProcessor::default();
        let consumed = PlacementClassifier::new(state, settings).evaluate(
            event,
            &mut processor,
            &mut RecordingMessenger::default(),
        );
        (consumed, processor)
    }

    fn white_banner_at_origin() -> PlaceBlockEvent {
        PlaceBlockEvent::new(
            player("alice", "world"),
            PlacedBlock::new("minecraft:white_banner", BlockPos::new("world", 0, 64, 0)),
        )
    }

    #[test]
    fn test_scenario_abandon_within_one_unit() {
        let state = scenario_world(10.0);
        let settings = SiegeWarSettings::default();
        let (consumed, processor) = evaluate(&state, &settings, &white_banner_at_origin());
        assert!(consumed);
        assert_eq!(processor.actions[0].kind, ActionKind::Abandon);
    }

    #[test]
    fn test_scenario_abandon_too_far() {
        let state = scenario_world(20.0);
        let settings = SiegeWarSettings::default();
        let (consumed, processor) = evaluate(&state, &settings, &white_banner_at_origin());
        assert!(!consumed);
        assert!(processor.actions.is_empty());
    }

    #[test]
    fn test_scenario_plunder_by_attacker() {
        let state = scenario_world(10.0);
        let settings = SiegeWarSettings::default();
        let event = PlaceBlockEvent::new(player("alice", "world"), chest_at("world", 70, 70));
        let (consumed, processor) = evaluate(&state, &settings, &event);
        assert!(consumed);
        assert_eq!(processor.actions[0].kind, ActionKind::Plunder);
        assert_eq!(processor.actions[0].target, "Oakvale");
    }

    #[test]
    fn test_scenario_plunder_disabled() {
        let state = scenario_world(10.0);
        let settings = SiegeWarSettings {
            plunder_enabled: false,
            ..Default::default()
        };
        let event = PlaceBlockEvent::new(player("alice", "world"), chest_at("world", 70, 70));
        let (consumed, processor) = evaluate(&state, &settings, &event);
        assert!(!consumed);
        assert!(processor.actions.is_empty());
    }
}
