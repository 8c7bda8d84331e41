//! Timed score accrual for siege zones.
//!
//! Each participant in a zone's schedule scores once their time comes up and
//! is then rescheduled one interval later. Attackers push the score up,
//! defenders push it down. Who gets scheduled, and how often this pass runs,
//! is decided by the caller's timer loop.

use crate::state::{PlayerId, Timestamp};
use crate::zone::{ScoreSide, SiegeZone};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRules {
    /// Delay between two scores by the same player
    pub interval_ms: u64,
    pub attacker_points: i32,
    pub defender_points: i32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            interval_ms: 60_000,
            attacker_points: 10,
            defender_points: 10,
        }
    }
}

/// What one accrual pass did to a zone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreTally {
    pub attackers_scored: Vec<PlayerId>,
    pub defenders_scored: Vec<PlayerId>,
    /// Net change applied to the zone score
    pub delta: i32,
}

/// Apply every due score entry at `now` and reschedule the scorers.
pub fn accrue_due(zone: &mut SiegeZone, now: Timestamp, rules: &ScoringRules) -> ScoreTally {
    let mut tally = ScoreTally::default();
    let next = now.saturating_add(rules.interval_ms);

    for side in [ScoreSide::Attacker, ScoreSide::Defender] {
        let due: Vec<PlayerId> = zone
            .due_entries(side, now)
            .map(|(player, _)| player.to_string())
            .collect();

        let points = match side {
            ScoreSide::Attacker => rules.attacker_points,
            ScoreSide::Defender => rules.defender_points.saturating_neg(),
        };
        for player in due {
            zone.add_score(points);
            tally.delta = tally.delta.saturating_add(points);
            zone.schedule_next(side, player.clone(), next);
            match side {
                ScoreSide::Attacker => tally.attackers_scored.push(player),
                ScoreSide::Defender => tally.defenders_scored.push(player),
            }
        }
    }

    if tally.delta != 0 {
        log::debug!(
            "[SCORE] {}: {:+} ({} attackers, {} defenders)",
            zone.name(),
            tally.delta,
            tally.attackers_scored.len(),
            tally.defenders_scored.len()
        );
    }
    tally
}
