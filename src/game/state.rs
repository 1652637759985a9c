//! Game State Definitions
//!
//! All state types for a CTF match: teams, flag records, the match
//! scoreboard, and the team roster.
//! Uses BTreeMap for deterministic iteration order.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use serde::{Serialize, Deserialize};

use crate::core::vec3::Vec3;
use crate::game::events::GameEvent;

// =============================================================================
// PLAYER ID
// =============================================================================

/// Unique player identifier (UUID as bytes).
///
/// Implements Ord for deterministic BTreeMap ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub struct PlayerId(pub [u8; 16]);

impl PlayerId {
    /// Create from raw bytes.
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Create a fresh random id.
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().into_bytes())
    }

    /// Create from UUID string.
    pub fn from_uuid_str(s: &str) -> Option<Self> {
        uuid::Uuid::parse_str(s)
            .ok()
            .map(|u| Self(*u.as_bytes()))
    }

    /// Convert to UUID string.
    pub fn to_uuid_string(&self) -> String {
        uuid::Uuid::from_bytes(self.0).to_string()
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uuid_string())
    }
}

// =============================================================================
// TEAM
// =============================================================================

/// One of the two fixed CTF teams.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Team {
    /// Red team
    Red = 0,
    /// Blue team
    Blue = 1,
}

impl Team {
    /// Both teams, in scoreboard order.
    pub const ALL: [Team; 2] = [Team::Red, Team::Blue];

    /// Human-readable team name.
    pub fn display_name(self) -> &'static str {
        match self {
            Team::Red => "Red",
            Team::Blue => "Blue",
        }
    }

    /// The other team.
    pub fn opponent(self) -> Team {
        match self {
            Team::Red => Team::Blue,
            Team::Blue => Team::Red,
        }
    }

    /// Parse from a user-supplied string ("red" / "blue", any case).
    pub fn parse(s: &str) -> Option<Team> {
        match s.to_ascii_lowercase().as_str() {
            "red" => Some(Team::Red),
            "blue" => Some(Team::Blue),
            _ => None,
        }
    }

    /// Index into per-team arrays.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// =============================================================================
// FLAG RECORD
// =============================================================================

/// Possession state of a team's flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Default)]
pub enum FlagState {
    /// Flag is resting at its stand
    #[default]
    AtStand,
    /// Flag is held by a player
    Carried,
    /// Flag is lying on the ground after a drop
    Dropped,
}

/// Possession record for a single team's flag.
///
/// Transitions only happen through the methods below, which keep the
/// carrier field and the timers consistent with the state:
/// `carrier` is `Some` exactly when the state is `Carried`, and the
/// drop timers are `Some` exactly when the state is `Dropped`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FlagRecord {
    /// Team that owns this flag
    pub team: Team,

    state: FlagState,
    carrier: Option<PlayerId>,
    stand_position: Vec3,
    current_position: Vec3,
    dropped_at_tick: Option<u32>,
    immune_until_tick: Option<u32>,
}

impl FlagRecord {
    /// Create a flag resting at its stand.
    pub fn new(team: Team, stand_position: Vec3) -> Self {
        Self {
            team,
            state: FlagState::AtStand,
            carrier: None,
            stand_position,
            current_position: stand_position,
            dropped_at_tick: None,
            immune_until_tick: None,
        }
    }

    /// Current possession state.
    pub fn state(&self) -> FlagState {
        self.state
    }

    /// Player holding the flag, if carried.
    pub fn carrier(&self) -> Option<PlayerId> {
        self.carrier
    }

    /// Position of the stand.
    pub fn stand_position(&self) -> Vec3 {
        self.stand_position
    }

    /// Where the flag currently is (stand, carrier, or ground).
    pub fn current_position(&self) -> Vec3 {
        match self.state {
            FlagState::AtStand => self.stand_position,
            _ => self.current_position,
        }
    }

    /// Tick the flag was dropped on, while dropped.
    pub fn dropped_at_tick(&self) -> Option<u32> {
        self.dropped_at_tick
    }

    /// Whether a dropped flag still rejects pickups.
    pub fn has_immunity(&self, tick: u32) -> bool {
        matches!(self.state, FlagState::Dropped)
            && self.immune_until_tick.is_some_and(|until| tick < until)
    }

    /// Whether a pickup would currently succeed (ignoring per-player rules).
    pub fn can_be_picked_up(&self, tick: u32) -> bool {
        match self.state {
            FlagState::AtStand => true,
            FlagState::Dropped => !self.has_immunity(tick),
            FlagState::Carried => false,
        }
    }

    /// Transition to carried by `player`. Caller has already validated the
    /// pickup; this only flips the record.
    pub(crate) fn set_carried(&mut self, player: PlayerId) {
        self.state = FlagState::Carried;
        self.carrier = Some(player);
        self.dropped_at_tick = None;
        self.immune_until_tick = None;
    }

    /// Transition to dropped at `position`, starting both timers.
    pub(crate) fn set_dropped(&mut self, position: Vec3, tick: u32, immunity_ticks: u32) {
        self.state = FlagState::Dropped;
        self.carrier = None;
        self.current_position = position;
        self.dropped_at_tick = Some(tick);
        self.immune_until_tick = Some(tick.saturating_add(immunity_ticks));
    }

    /// Force back to the stand from any state, clearing carrier and timers.
    pub(crate) fn set_at_stand(&mut self) {
        self.state = FlagState::AtStand;
        self.carrier = None;
        self.current_position = self.stand_position;
        self.dropped_at_tick = None;
        self.immune_until_tick = None;
    }

    /// Track the carrier's movement while carried.
    pub(crate) fn update_carried_position(&mut self, position: Vec3) {
        if self.state == FlagState::Carried {
            self.current_position = position;
        }
    }

    /// Move the stand. Rejected while the flag is carried, so an active
    /// carry is never retroactively rerouted.
    pub fn set_stand_position(&mut self, position: Vec3) -> bool {
        if self.state == FlagState::Carried {
            return false;
        }
        self.stand_position = position;
        if self.state == FlagState::AtStand {
            self.current_position = position;
        }
        true
    }
}

// =============================================================================
// MATCH RECORD
// =============================================================================

/// Lifecycle phase of the match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Default)]
pub enum MatchPhase {
    /// No match running; configuration is mutable
    #[default]
    Inactive,
    /// Match in progress; captures count
    Active,
    /// Match finished; waiting for reset
    Ended,
}

/// Result of a recorded capture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureTally {
    /// Team's score after the capture
    pub new_score: u32,
    /// Winner, if this capture reached the score limit
    pub winner: Option<Team>,
}

/// Match lifecycle and score counters.
///
/// Scores only move through `record_capture`, and only while active.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchRecord {
    phase: MatchPhase,
    scores: [u32; 2],
    score_limit: u32,
    winner: Option<Team>,
}

impl MatchRecord {
    /// Captures needed to win unless configured otherwise.
    pub const DEFAULT_SCORE_LIMIT: u32 = 3;

    /// Create an inactive match with the default score limit.
    pub fn new() -> Self {
        Self {
            phase: MatchPhase::Inactive,
            scores: [0, 0],
            score_limit: Self::DEFAULT_SCORE_LIMIT,
            winner: None,
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    /// Whether the match is currently active.
    pub fn is_active(&self) -> bool {
        self.phase == MatchPhase::Active
    }

    /// Score for one team.
    pub fn score(&self, team: Team) -> u32 {
        self.scores[team.index()]
    }

    /// Captures needed to win.
    pub fn score_limit(&self) -> u32 {
        self.score_limit
    }

    /// Winner, once the match has ended by reaching the limit.
    pub fn winner(&self) -> Option<Team> {
        self.winner
    }

    /// Start the match. Only valid from inactive.
    pub fn start(&mut self) -> bool {
        if self.phase != MatchPhase::Inactive {
            return false;
        }
        self.phase = MatchPhase::Active;
        true
    }

    /// End the match early. Rejected when already ended or never started.
    pub fn end(&mut self) -> bool {
        if self.phase != MatchPhase::Active {
            return false;
        }
        self.phase = MatchPhase::Ended;
        true
    }

    /// Return unconditionally to inactive with scores zeroed.
    pub fn reset(&mut self) {
        self.phase = MatchPhase::Inactive;
        self.scores = [0, 0];
        self.winner = None;
    }

    /// Change the score limit. Only allowed while inactive, and never below 1.
    pub fn set_score_limit(&mut self, limit: u32) -> bool {
        if self.phase != MatchPhase::Inactive || limit < 1 {
            return false;
        }
        self.score_limit = limit;
        true
    }

    /// Record a capture for `team`. Returns `None` unless the match is
    /// active. Reaching the score limit ends the match in the same step.
    pub fn record_capture(&mut self, team: Team) -> Option<CaptureTally> {
        if self.phase != MatchPhase::Active {
            return None;
        }

        let score = &mut self.scores[team.index()];
        *score += 1;
        let new_score = *score;

        let winner = if new_score >= self.score_limit {
            self.phase = MatchPhase::Ended;
            self.winner = Some(team);
            Some(team)
        } else {
            None
        };

        Some(CaptureTally { new_score, winner })
    }

    /// Human-readable score line, e.g. `Red 2 - 1 Blue`.
    pub fn score_string(&self) -> String {
        format!(
            "{} {} - {} {}",
            Team::Red.display_name(),
            self.score(Team::Red),
            self.score(Team::Blue),
            Team::Blue.display_name(),
        )
    }
}

impl Default for MatchRecord {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TEAM ROSTER
// =============================================================================

/// Player-to-team assignment. A player is on at most one team.
///
/// The per-team member sets are kept in lockstep with the assignment map;
/// both are updated inside every mutation so no caller can observe them
/// disagreeing.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TeamRoster {
    assignment: BTreeMap<PlayerId, Team>,
    members: [BTreeSet<PlayerId>; 2],
}

impl TeamRoster {
    /// Create an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `player` to `team`, moving them off any previous team.
    /// Returns the team they left, if any. Idempotent when already on `team`.
    pub fn assign(&mut self, player: PlayerId, team: Team) -> Option<Team> {
        let previous = self.assignment.insert(player, team);
        if previous == Some(team) {
            return previous;
        }
        if let Some(old) = previous {
            self.members[old.index()].remove(&player);
        }
        self.members[team.index()].insert(player);
        previous
    }

    /// Remove `player` from their team. Returns the team left, or `None`
    /// if they were unassigned.
    pub fn leave(&mut self, player: PlayerId) -> Option<Team> {
        let team = self.assignment.remove(&player)?;
        self.members[team.index()].remove(&player);
        Some(team)
    }

    /// Team the player is currently on.
    pub fn team_of(&self, player: PlayerId) -> Option<Team> {
        self.assignment.get(&player).copied()
    }

    /// Snapshot of a team's members. A copy, so callers can iterate while
    /// the roster keeps changing.
    pub fn members(&self, team: Team) -> BTreeSet<PlayerId> {
        self.members[team.index()].clone()
    }

    /// Member count for a team.
    pub fn member_count(&self, team: Team) -> usize {
        self.members[team.index()].len()
    }

    /// Total assigned players.
    pub fn len(&self) -> usize {
        self.assignment.len()
    }

    /// Whether nobody has joined a team.
    pub fn is_empty(&self) -> bool {
        self.assignment.is_empty()
    }
}

// =============================================================================
// CTF STATE
// =============================================================================

/// Complete mutable state of one CTF world: both flags, the scoreboard,
/// the roster, and last known player positions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CtfState {
    /// Current engine tick
    pub tick: u32,

    flags: [FlagRecord; 2],

    /// Match lifecycle and scores
    pub scoreboard: MatchRecord,

    /// Team membership
    pub roster: TeamRoster,

    /// Last known position per connected player (fed by the host)
    positions: BTreeMap<PlayerId, Vec3>,

    /// Events generated since the last drain
    #[serde(skip)]
    pending_events: Vec<GameEvent>,
}

impl CtfState {
    /// Create a fresh state with both flags at the given stands.
    pub fn new(red_stand: Vec3, blue_stand: Vec3) -> Self {
        Self {
            tick: 0,
            flags: [
                FlagRecord::new(Team::Red, red_stand),
                FlagRecord::new(Team::Blue, blue_stand),
            ],
            scoreboard: MatchRecord::new(),
            roster: TeamRoster::new(),
            positions: BTreeMap::new(),
            pending_events: Vec::new(),
        }
    }

    /// A team's flag record.
    pub fn flag(&self, team: Team) -> &FlagRecord {
        &self.flags[team.index()]
    }

    /// A team's flag record, mutably.
    pub(crate) fn flag_mut(&mut self, team: Team) -> &mut FlagRecord {
        &mut self.flags[team.index()]
    }

    /// Which flag the player is carrying, if any.
    pub fn carried_flag_team(&self, player: PlayerId) -> Option<Team> {
        Team::ALL
            .into_iter()
            .find(|team| self.flag(*team).carrier() == Some(player))
    }

    /// Whether the player holds any flag.
    pub fn is_carrying(&self, player: PlayerId) -> bool {
        self.carried_flag_team(player).is_some()
    }

    /// Carriers are movement-restricted for as long as they hold a flag.
    pub fn is_movement_restricted(&self, player: PlayerId) -> bool {
        self.is_carrying(player)
    }

    /// Record the player's latest position and keep any carried flag with
    /// them.
    pub fn update_position(&mut self, player: PlayerId, position: Vec3) {
        self.positions.insert(player, position);
        if let Some(team) = self.carried_flag_team(player) {
            self.flag_mut(team).update_carried_position(position);
        }
    }

    /// Last position reported for the player.
    pub fn last_position(&self, player: PlayerId) -> Option<Vec3> {
        self.positions.get(&player).copied()
    }

    /// Forget a player's position (on disconnect).
    pub(crate) fn forget_position(&mut self, player: PlayerId) {
        self.positions.remove(&player);
    }

    /// Push a game event.
    pub fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }
}

// =============================================================================
// TESTS
// =============================================================================
