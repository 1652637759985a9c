//! Flag Carrier Mechanics
//!
//! Pickup, drop, forced return, carrier-loss handling, and the dropped
//! flag sweep. All operations mutate `CtfState` in one step, so the
//! precondition check and the transition are never separated.

use crate::core::vec3::Vec3;
use crate::game::events::GameEvent;
use crate::game::state::{CtfState, FlagState, PlayerId, Team};

/// Timers for dropped flags.
#[derive(Clone, Copy, Debug)]
pub struct FlagConfig {
    /// Ticks a freshly dropped flag rejects pickups
    pub immunity_ticks: u32,
    /// Ticks a dropped flag waits before returning to its stand
    pub auto_return_ticks: u32,
}

impl Default for FlagConfig {
    fn default() -> Self {
        // 3 s immunity, 30 s auto-return at 20 Hz
        Self {
            immunity_ticks: 60,
            auto_return_ticks: 600,
        }
    }
}

/// Attempt to pick up `team`'s flag for `player`.
///
/// Fails without side effects when the flag is carried, still immune
/// from a drop, the player already holds a flag, or (unless
/// `privileged`) the player is trying to take their own team's flag.
/// Players not on any team are unrestricted, which keeps setup and
/// testing workable.
pub fn pickup(state: &mut CtfState, team: Team, player: PlayerId, privileged: bool) -> bool {
    let tick = state.tick;

    if !state.flag(team).can_be_picked_up(tick) {
        return false;
    }
    if state.is_carrying(player) {
        return false;
    }
    if !privileged && state.roster.team_of(player) == Some(team) {
        return false;
    }

    let old_state = state.flag(team).state();
    let position = state
        .last_position(player)
        .unwrap_or_else(|| state.flag(team).current_position());

    let flag = state.flag_mut(team);
    flag.set_carried(player);
    flag.update_carried_position(position);

    state.push_event(GameEvent::flag_state_changed(
        tick,
        team,
        old_state,
        FlagState::Carried,
        Some(player),
        position,
    ));
    true
}

/// Drop the flag `player` is carrying at `position`.
///
/// No-op (returns false) when the player is not a carrier.
pub fn drop_flag(
    state: &mut CtfState,
    player: PlayerId,
    position: Vec3,
    config: &FlagConfig,
) -> bool {
    let Some(team) = state.carried_flag_team(player) else {
        return false;
    };

    let tick = state.tick;
    state
        .flag_mut(team)
        .set_dropped(position, tick, config.immunity_ticks);

    state.push_event(GameEvent::flag_state_changed(
        tick,
        team,
        FlagState::Carried,
        FlagState::Dropped,
        None,
        position,
    ));
    true
}

/// Force a team's flag back to its stand from any state, clearing the
/// carrier and both drop timers. Returns false when the flag was
/// already at its stand.
pub fn return_to_stand(state: &mut CtfState, team: Team) -> bool {
    let old_state = state.flag(team).state();
    if old_state == FlagState::AtStand {
        return false;
    }

    let tick = state.tick;
    state.flag_mut(team).set_at_stand();
    let position = state.flag(team).stand_position();

    state.push_event(GameEvent::flag_state_changed(
        tick,
        team,
        old_state,
        FlagState::AtStand,
        None,
        position,
    ));
    true
}

/// Carrier died or disconnected. If they held a flag it is dropped at
/// their last known position, falling back to the world origin, so a
/// flag is never stranded in the carried state with no carrier behind
/// it.
pub fn handle_carrier_lost(state: &mut CtfState, player: PlayerId, config: &FlagConfig) -> bool {
    if !state.is_carrying(player) {
        return false;
    }
    let position = state.last_position(player).unwrap_or(Vec3::ZERO);
    drop_flag(state, player, position, config)
}

/// Return dropped flags whose auto-return timeout elapsed with no
/// pickup. Called once per tick.
pub fn sweep_dropped_flags(state: &mut CtfState, config: &FlagConfig) {
    let tick = state.tick;
    for team in Team::ALL {
        let due = state.flag(team).dropped_at_tick().is_some_and(|dropped| {
            tick.saturating_sub(dropped) >= config.auto_return_ticks
        });
        if due {
            return_to_stand(state, team);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn player(n: u8) -> PlayerId {
        PlayerId::new([n; 16])
    }

    fn test_state() -> CtfState {
        CtfState::new(Vec3::new(0.0, 64.0, 0.0), Vec3::new(100.0, 64.0, 0.0))
    }

    #[test]
    fn test_pickup_from_stand() {
        let mut state = test_state();
        let p1 = player(1);

        assert!(pickup(&mut state, Team::Red, p1, false));
        assert_eq!(state.flag(Team::Red).state(), FlagState::Carried);
        assert_eq!(state.flag(Team::Red).carrier(), Some(p1));

        // Second pickup on a carried flag fails, carrier unchanged
        let p2 = player(2);
        assert!(!pickup(&mut state, Team::Red, p2, false));
        assert_eq!(state.flag(Team::Red).carrier(), Some(p1));
    }

    #[test]
    fn test_player_carries_at_most_one_flag() {
        let mut state = test_state();
        let p1 = player(1);

        assert!(pickup(&mut state, Team::Red, p1, false));
        assert!(!pickup(&mut state, Team::Blue, p1, false));
        assert_eq!(state.carried_flag_team(p1), Some(Team::Red));
        assert_eq!(state.flag(Team::Blue).state(), FlagState::AtStand);
    }

    #[test]
    fn test_own_flag_pickup_needs_privilege() {
        let mut state = test_state();
        let p1 = player(1);
        state.roster.assign(p1, Team::Red);

        assert!(!pickup(&mut state, Team::Red, p1, false));
        assert!(pickup(&mut state, Team::Blue, p1, false));

        // Privileged callers bypass the ownership rule
        let mut state = test_state();
        state.roster.assign(p1, Team::Red);
        assert!(pickup(&mut state, Team::Red, p1, true));
    }

    #[test]
    fn test_unassigned_player_unrestricted() {
        let mut state = test_state();
        assert!(pickup(&mut state, Team::Red, player(1), false));
    }

    #[test]
    fn test_drop_and_immunity() {
        let mut state = test_state();
        let config = FlagConfig::default();
        let p1 = player(1);
        let p2 = player(2);

        // Dropping without carrying is a no-op
        assert!(!drop_flag(&mut state, p1, Vec3::ZERO, &config));

        assert!(pickup(&mut state, Team::Red, p1, false));
        let drop_pos = Vec3::new(10.0, 5.0, 10.0);
        assert!(drop_flag(&mut state, p1, drop_pos, &config));

        let flag = state.flag(Team::Red);
        assert_eq!(flag.state(), FlagState::Dropped);
        assert_eq!(flag.current_position(), drop_pos);
        assert!(flag.has_immunity(state.tick));

        // Pickup within the immunity window fails
        assert!(!pickup(&mut state, Team::Red, p2, false));

        // After the window it succeeds
        state.tick += config.immunity_ticks;
        assert!(pickup(&mut state, Team::Red, p2, false));
        assert_eq!(state.flag(Team::Red).carrier(), Some(p2));
    }

    #[test]
    fn test_disconnect_drops_at_last_position() {
        let mut state = test_state();
        let config = FlagConfig::default();
        let p1 = player(1);

        state.update_position(p1, Vec3::new(10.0, 5.0, 10.0));
        assert!(pickup(&mut state, Team::Red, p1, false));

        assert!(handle_carrier_lost(&mut state, p1, &config));
        let flag = state.flag(Team::Red);
        assert_eq!(flag.state(), FlagState::Dropped);
        assert_eq!(flag.current_position(), Vec3::new(10.0, 5.0, 10.0));
        assert!(flag.has_immunity(state.tick));

        // Losing a non-carrier does nothing
        assert!(!handle_carrier_lost(&mut state, player(2), &config));
    }

    #[test]
    fn test_carrier_lost_without_position_falls_back_to_origin() {
        let mut state = test_state();
        let config = FlagConfig::default();
        let p1 = player(1);

        assert!(pickup(&mut state, Team::Blue, p1, false));
        assert!(handle_carrier_lost(&mut state, p1, &config));
        assert_eq!(state.flag(Team::Blue).current_position(), Vec3::ZERO);
    }

    #[test]
    fn test_return_to_stand() {
        let mut state = test_state();
        let p1 = player(1);

        // Already at stand: nothing to do
        assert!(!return_to_stand(&mut state, Team::Red));

        assert!(pickup(&mut state, Team::Red, p1, false));
        assert!(return_to_stand(&mut state, Team::Red));
        let flag = state.flag(Team::Red);
        assert_eq!(flag.state(), FlagState::AtStand);
        assert_eq!(flag.carrier(), None);
        assert_eq!(flag.current_position(), flag.stand_position());
        assert!(!state.is_carrying(p1));
    }

    #[test]
    fn test_sweep_auto_returns_after_timeout() {
        let mut state = test_state();
        let config = FlagConfig {
            immunity_ticks: 10,
            auto_return_ticks: 100,
        };
        let p1 = player(1);

        pickup(&mut state, Team::Red, p1, false);
        drop_flag(&mut state, p1, Vec3::new(50.0, 0.0, 50.0), &config);
        let dropped_tick = state.tick;

        // Before the timeout the flag stays put
        state.tick = dropped_tick + config.auto_return_ticks - 1;
        sweep_dropped_flags(&mut state, &config);
        assert_eq!(state.flag(Team::Red).state(), FlagState::Dropped);

        state.tick = dropped_tick + config.auto_return_ticks;
        sweep_dropped_flags(&mut state, &config);
        assert_eq!(state.flag(Team::Red).state(), FlagState::AtStand);
    }

    #[test]
    fn test_pickup_emits_events() {
        let mut state = test_state();
        pickup(&mut state, Team::Red, player(1), false);
        let events = state.take_events();
        assert_eq!(events.len(), 1);
        assert!(events[0].involves_carry());
        // Drained
        assert!(state.take_events().is_empty());
    }

    // =========================================================================
    // State machine path property
    // =========================================================================

    /// Operations the property test drives against a single flag.
    #[derive(Clone, Copy, Debug)]
    enum FlagOp {
        Pickup(u8),
        Drop(u8),
        Return,
        AdvanceTicks(u32),
        Sweep,
    }

    fn flag_op_strategy() -> impl Strategy<Value = FlagOp> {
        prop_oneof![
            (0u8..4).prop_map(FlagOp::Pickup),
            (0u8..4).prop_map(FlagOp::Drop),
            Just(FlagOp::Return),
            (1u32..200).prop_map(FlagOp::AdvanceTicks),
            Just(FlagOp::Sweep),
        ]
    }

    /// Legal transitions of the possession state machine.
    fn transition_allowed(from: FlagState, to: FlagState) -> bool {
        use FlagState::*;
        matches!(
            (from, to),
            (AtStand, Carried)
                | (Carried, Dropped)
                | (Carried, AtStand)
                | (Dropped, Carried)
                | (Dropped, AtStand)
        )
    }

    proptest! {
        #[test]
        fn flag_state_follows_transition_graph(ops in prop::collection::vec(flag_op_strategy(), 1..120)) {
            let mut state = test_state();
            let config = FlagConfig { immunity_ticks: 20, auto_return_ticks: 80 };
            let mut previous = state.flag(Team::Red).state();

            for op in ops {
                match op {
                    FlagOp::Pickup(n) => { pickup(&mut state, Team::Red, player(n), false); }
                    FlagOp::Drop(n) => {
                        drop_flag(&mut state, player(n), Vec3::new(1.0, 2.0, 3.0), &config);
                    }
                    FlagOp::Return => { return_to_stand(&mut state, Team::Red); }
                    FlagOp::AdvanceTicks(n) => { state.tick = state.tick.saturating_add(n); }
                    FlagOp::Sweep => { sweep_dropped_flags(&mut state, &config); }
                }

                let current = state.flag(Team::Red).state();
                if current != previous {
                    prop_assert!(
                        transition_allowed(previous, current),
                        "illegal transition {:?} -> {:?}", previous, current
                    );
                }
                previous = current;

                // Carrier is present exactly when carried
                let flag = state.flag(Team::Red);
                prop_assert_eq!(flag.carrier().is_some(), current == FlagState::Carried);
            }
        }
    }
}
