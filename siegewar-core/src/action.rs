//! Siege actions: the request produced by the classifier and the
//! processors that carry it out.
//!
//! # Dispatch table
//!
//! | Kind | Block | Where | Eligibility |
//! |------|-------|-------|-------------|
//! | Attack | coloured banner | wilderness | a town unit borders the block's cell |
//! | Abandon | white banner | wilderness | an in-progress zone flag within one town unit |
//! | Surrender | white banner | besieged town | none |
//! | Invade | coloured banner | besieged town | player's faction is an attacker |
//! | Plunder | chest | besieged town | player's faction is an attacker |
//!
//! Every kind is also gated by its own toggle in [`SiegeWarSettings`].

use crate::config::SiegeWarSettings;
use crate::input::{PlaceBlockEvent, Player};
use crate::state::{FactionId, Participant, Settlement, Siege, TownUnit};
use crate::zone::SiegeZone;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Attack,
    Abandon,
    Surrender,
    Invade,
    Plunder,
}

impl ActionKind {
    pub const ALL: [ActionKind; 5] = [
        ActionKind::Attack,
        ActionKind::Abandon,
        ActionKind::Surrender,
        ActionKind::Invade,
        ActionKind::Plunder,
    ];

    /// Feature toggle for this kind.
    pub fn is_enabled(self, settings: &SiegeWarSettings) -> bool {
        match self {
            ActionKind::Attack => settings.attack_enabled,
            ActionKind::Abandon => settings.abandon_enabled,
            ActionKind::Surrender => settings.surrender_enabled,
            ActionKind::Invade => settings.invade_enabled,
            ActionKind::Plunder => settings.plunder_enabled,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Attack => "attack",
            ActionKind::Abandon => "abandon",
            ActionKind::Surrender => "surrender",
            ActionKind::Invade => "invade",
            ActionKind::Plunder => "plunder",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A placement that passed every precondition of one action kind, with the
/// context resolved along the way.
#[derive(Debug, Clone)]
pub enum ActionRequest<'a> {
    Attack {
        adjacent_units: Vec<&'a TownUnit>,
    },
    Abandon {
        zone: &'a SiegeZone,
    },
    Surrender {
        settlement: &'a Settlement,
    },
    Invade {
        participant: &'a Participant,
        /// The player's faction, known to be one of the siege's attackers
        faction: &'a FactionId,
        settlement: &'a Settlement,
        siege: &'a Siege,
    },
    Plunder {
        participant: &'a Participant,
        faction: &'a FactionId,
        settlement: &'a Settlement,
        siege: &'a Siege,
    },
}

impl ActionRequest<'_> {
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionRequest::Attack { .. } => ActionKind::Attack,
            ActionRequest::Abandon { .. } => ActionKind::Abandon,
            ActionRequest::Surrender { .. } => ActionKind::Surrender,
            ActionRequest::Invade { .. } => ActionKind::Invade,
            ActionRequest::Plunder { .. } => ActionKind::Plunder,
        }
    }

    /// Short description of what the action targets, for logs.
    pub fn target(&self) -> String {
        match self {
            ActionRequest::Attack { adjacent_units } => adjacent_units
                .iter()
                .find_map(|u| u.settlement.clone())
                .unwrap_or_default(),
            ActionRequest::Abandon { zone } => zone.name(),
            ActionRequest::Surrender { settlement }
            | ActionRequest::Invade { settlement, .. }
            | ActionRequest::Plunder { settlement, .. } => settlement.name.clone(),
        }
    }

    /// Hand the request to the matching processor.
    pub fn dispatch<P: SiegeActionProcessor + ?Sized>(
        &self,
        event: &PlaceBlockEvent,
        processor: &mut P,
    ) {
        match self {
            ActionRequest::Attack { adjacent_units } => processor.attack(event, adjacent_units),
            ActionRequest::Abandon { zone } => processor.abandon(event, zone),
            ActionRequest::Surrender { settlement } => processor.surrender(event, settlement),
            ActionRequest::Invade {
                participant,
                faction,
                settlement,
                siege,
            } => processor.invade(event, participant, faction, settlement, siege),
            ActionRequest::Plunder {
                participant,
                faction,
                settlement,
                siege,
            } => processor.plunder(event, participant, faction, settlement, siege),
        }
    }
}

/// The five action processors.
///
/// Implementations own whatever host context they need (economy, teleport,
/// chat). Calls are fire-and-forget: the classifier has already decided the
/// placement is a siege action by the time one of these runs.
pub trait SiegeActionProcessor {
    fn attack(&mut self, event: &PlaceBlockEvent, adjacent_units: &[&TownUnit]);

    fn abandon(&mut self, event: &PlaceBlockEvent, zone: &SiegeZone);

    fn surrender(&mut self, event: &PlaceBlockEvent, settlement: &Settlement);

    fn invade(
        &mut self,
        event: &PlaceBlockEvent,
        participant: &Participant,
        faction: &FactionId,
        settlement: &Settlement,
        siege: &Siege,
    );

    fn plunder(
        &mut self,
        event: &PlaceBlockEvent,
        participant: &Participant,
        faction: &FactionId,
        settlement: &Settlement,
        siege: &Siege,
    );
}

/// Player-facing error channel.
pub trait Messenger {
    fn send_error(&mut self, player: &Player, message: &str);
}

/// Messenger that only writes to the log. Used when there is no chat.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMessenger;

impl Messenger for LogMessenger {
    fn send_error(&mut self, player: &Player, message: &str) {
        log::warn!("[to {}] {}", player.name, message);
    }
}
