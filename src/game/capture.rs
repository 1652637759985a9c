//! Capture Resolution
//!
//! The protocol binding flags, roster, arena, and scoreboard: a carrier
//! standing in their own team's capture zone scores, but only while
//! their own flag is safely at its stand.

use crate::game::arena::ArenaConfig;
use crate::game::events::GameEvent;
use crate::game::state::{CtfState, FlagState, PlayerId, Team};

/// One capture committed during a resolution pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureCommit {
    /// Team credited with the capture
    pub scoring_team: Team,
    /// Flag that was brought in (the opposing record)
    pub captured_team: Team,
    /// The carrier
    pub player: PlayerId,
    /// Scoring team's new score
    pub new_score: u32,
}

/// Outcome of one resolution pass.
#[derive(Debug, Default)]
pub struct CaptureSweep {
    /// Captures committed this pass
    pub commits: Vec<CaptureCommit>,
    /// Whether the match ended during this pass
    pub match_ended: bool,
    /// Winner, if the match ended by reaching the limit
    pub winner: Option<Team>,
}

/// Candidate found during the scan phase.
#[derive(Clone, Copy, Debug)]
struct CaptureCandidate {
    captured_team: Team,
    scoring_team: Team,
    player: PlayerId,
}

/// Evaluate every carried flag once and commit any captures.
///
/// No evaluation begins unless the match is active; a capture found
/// valid during the scan still re-checks the scoreboard at commit time,
/// so once the score limit ends the match mid-pass no further capture
/// lands.
pub fn resolve_captures(state: &mut CtfState, arena: &ArenaConfig) -> CaptureSweep {
    let mut sweep = CaptureSweep::default();

    if !state.scoreboard.is_active() {
        return sweep;
    }

    // Scan phase: find carriers standing in their own zone while their
    // own flag is home.
    let mut candidates: Vec<CaptureCandidate> = Vec::new();
    for captured_team in Team::ALL {
        let flag = state.flag(captured_team);
        if flag.state() != FlagState::Carried {
            continue;
        }
        let Some(player) = flag.carrier() else {
            continue;
        };
        let Some(scoring_team) = state.roster.team_of(player) else {
            continue;
        };
        let Some(zone) = arena.capture_zone(scoring_team) else {
            continue;
        };

        // You cannot score while your own flag is out.
        if state.flag(scoring_team).state() != FlagState::AtStand {
            continue;
        }
        if !zone.contains(flag.current_position()) {
            continue;
        }

        candidates.push(CaptureCandidate {
            captured_team,
            scoring_team,
            player,
        });
    }

    // Commit phase: the scoreboard gate makes this a no-op once the
    // match has ended, even within the same pass.
    for candidate in candidates {
        let Some(tally) = state.scoreboard.record_capture(candidate.scoring_team) else {
            continue;
        };

        let tick = state.tick;
        state.flag_mut(candidate.captured_team).set_at_stand();
        let stand = state.flag(candidate.captured_team).stand_position();

        state.push_event(GameEvent::flag_state_changed(
            tick,
            candidate.captured_team,
            FlagState::Carried,
            FlagState::AtStand,
            None,
            stand,
        ));
        state.push_event(GameEvent::capture(
            tick,
            candidate.scoring_team,
            candidate.player,
            tally.new_score,
        ));

        sweep.commits.push(CaptureCommit {
            scoring_team: candidate.scoring_team,
            captured_team: candidate.captured_team,
            player: candidate.player,
            new_score: tally.new_score,
        });

        if let Some(winner) = tally.winner {
            sweep.match_ended = true;
            sweep.winner = Some(winner);
            state.push_event(GameEvent::match_ended(tick, Some(winner)));
        }
    }

    sweep
}

// =============================================================================
// TESTS
// =============================================================================
