//! Engine Tick
//!
//! The periodic step that owns time-driven behavior: the dropped-flag
//! sweep and capture resolution. All request handling and the tick run
//! under the same session lock, so every compound transition stays
//! atomic from the outside.

use crate::game::arena::ArenaConfig;
use crate::game::capture::resolve_captures;
use crate::game::events::GameEvent;
use crate::game::flag::{sweep_dropped_flags, FlagConfig};
use crate::game::state::{CtfState, Team};

/// Engine configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct CtfConfig {
    /// Dropped-flag timers
    pub flag: FlagConfig,
}

/// Result of a tick.
#[derive(Debug)]
#[derive(Default)]
pub struct TickResult {
    /// Events generated this tick
    pub events: Vec<GameEvent>,
    /// Whether the match ended this tick
    pub match_ended: bool,
    /// Winner (if the match ended by reaching the limit)
    pub winner: Option<Team>,
}

/// Run one engine tick.
///
/// Order matters: the sweep may return a team's flag to its stand,
/// which can unblock a capture in the same tick.
pub fn tick(state: &mut CtfState, arena: &ArenaConfig, config: &CtfConfig) -> TickResult {
    state.tick += 1;

    sweep_dropped_flags(state, &config.flag);
    let sweep = resolve_captures(state, arena);

    TickResult {
        events: state.take_events(),
        match_ended: sweep.match_ended,
        winner: sweep.winner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vec3::Vec3;
    use crate::game::flag::{drop_flag, pickup};
    use crate::game::state::{FlagState, PlayerId};

    fn player(n: u8) -> PlayerId {
        PlayerId::new([n; 16])
    }

    fn test_setup() -> (CtfState, ArenaConfig, CtfConfig) {
        let red_stand = Vec3::new(0.0, 64.0, 0.0);
        let blue_stand = Vec3::new(100.0, 64.0, 0.0);
        let state = CtfState::new(red_stand, blue_stand);

        let mut arena = ArenaConfig::new();
        arena.set_capture_zone(Team::Red, red_stand, 3.0);
        arena.set_capture_zone(Team::Blue, blue_stand, 3.0);

        let config = CtfConfig {
            flag: FlagConfig {
                immunity_ticks: 5,
                auto_return_ticks: 20,
            },
        };
        (state, arena, config)
    }

    #[test]
    fn test_tick_advances_counter() {
        let (mut state, arena, config) = test_setup();
        assert_eq!(state.tick, 0);
        tick(&mut state, &arena, &config);
        assert_eq!(state.tick, 1);
    }

    #[test]
    fn test_tick_sweeps_dropped_flag() {
        let (mut state, arena, config) = test_setup();
        let p = player(1);
        pickup(&mut state, Team::Red, p, false);
        drop_flag(&mut state, p, Vec3::new(40.0, 64.0, 0.0), &config.flag);

        for _ in 0..config.flag.auto_return_ticks {
            tick(&mut state, &arena, &config);
        }
        assert_eq!(state.flag(Team::Red).state(), FlagState::AtStand);
    }

    #[test]
    fn test_tick_resolves_capture_and_reports_end() {
        let (mut state, arena, config) = test_setup();
        let p = player(1);
        state.scoreboard.set_score_limit(1);
        state.scoreboard.start();

        state.roster.assign(p, Team::Red);
        state.update_position(p, Vec3::new(100.0, 64.0, 0.0));
        assert!(pickup(&mut state, Team::Blue, p, false));
        state.update_position(p, Vec3::new(1.0, 64.0, 0.0));

        let result = tick(&mut state, &arena, &config);
        assert!(result.match_ended);
        assert_eq!(result.winner, Some(Team::Red));
        assert!(!result.events.is_empty());
    }

    #[test]
    fn test_sweep_can_unblock_capture_same_tick() {
        let (mut state, arena, config) = test_setup();
        let carrier = player(1);
        let thief = player(2);
        state.scoreboard.start();

        // Red carries the blue flag into the red zone
        state.roster.assign(carrier, Team::Red);
        state.update_position(carrier, Vec3::new(100.0, 64.0, 0.0));
        assert!(pickup(&mut state, Team::Blue, carrier, false));
        state.update_position(carrier, Vec3::new(1.0, 64.0, 0.0));

        // Meanwhile the red flag lies dropped somewhere
        state.roster.assign(thief, Team::Blue);
        assert!(pickup(&mut state, Team::Red, thief, false));
        drop_flag(&mut state, thief, Vec3::new(60.0, 64.0, 0.0), &config.flag);

        // Blocked while the red flag is out
        let result = tick(&mut state, &arena, &config);
        assert!(!result.match_ended);
        assert_eq!(state.scoreboard.score(Team::Red), 0);

        // Once the sweep returns the red flag, the held capture lands on
        // the same tick
        for _ in 0..config.flag.auto_return_ticks {
            tick(&mut state, &arena, &config);
        }
        assert_eq!(state.scoreboard.score(Team::Red), 1);
        assert_eq!(state.flag(Team::Blue).state(), FlagState::AtStand);
    }
}
