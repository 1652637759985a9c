//! Game Events
//!
//! Notifications published by the engine. Collaborators (HUD, chat,
//! visuals) subscribe to these instead of being called by the core.

use serde::{Serialize, Deserialize};
use crate::core::vec3::Vec3;
use crate::game::state::{FlagState, PlayerId, Team};

/// Game event data.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum GameEventData {
    /// A flag changed possession state
    FlagStateChanged {
        /// Team owning the flag
        team: Team,
        /// State before the transition
        old_state: FlagState,
        /// State after the transition
        new_state: FlagState,
        /// Carrier after the transition (set when now carried)
        carrier: Option<PlayerId>,
        /// Flag position after the transition
        position: Vec3,
    },

    /// A carrier scored a capture
    Capture {
        /// Team credited with the capture
        scoring_team: Team,
        /// Player who carried the flag in
        player: PlayerId,
        /// Scoring team's total after this capture
        new_score: u32,
    },

    /// Match went active
    MatchStarted,

    /// Match finished
    MatchEnded {
        /// Winning team, if the score limit was reached
        winner: Option<Team>,
    },

    /// Current scores, pushed to a newly connected player
    ScoreSync {
        /// Player the sync is for
        player: PlayerId,
        /// Red team's score
        red_score: u32,
        /// Blue team's score
        blue_score: u32,
    },

    /// A player joined a team
    TeamJoined {
        /// The player
        player: PlayerId,
        /// Team joined
        team: Team,
    },

    /// A player left a team
    TeamLeft {
        /// The player
        player: PlayerId,
        /// Team left
        team: Team,
    },
}

/// A game event with the tick it occurred on.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when event occurred
    pub tick: u32,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(tick: u32, data: GameEventData) -> Self {
        Self { tick, data }
    }

    /// Create flag state change event.
    pub fn flag_state_changed(
        tick: u32,
        team: Team,
        old_state: FlagState,
        new_state: FlagState,
        carrier: Option<PlayerId>,
        position: Vec3,
    ) -> Self {
        Self::new(
            tick,
            GameEventData::FlagStateChanged {
                team,
                old_state,
                new_state,
                carrier,
                position,
            },
        )
    }

    /// Create capture event.
    pub fn capture(tick: u32, scoring_team: Team, player: PlayerId, new_score: u32) -> Self {
        Self::new(
            tick,
            GameEventData::Capture {
                scoring_team,
                player,
                new_score,
            },
        )
    }

    /// Create match started event.
    pub fn match_started(tick: u32) -> Self {
        Self::new(tick, GameEventData::MatchStarted)
    }

    /// Create match ended event.
    pub fn match_ended(tick: u32, winner: Option<Team>) -> Self {
        Self::new(tick, GameEventData::MatchEnded { winner })
    }

    /// Create score sync event.
    pub fn score_sync(tick: u32, player: PlayerId, red_score: u32, blue_score: u32) -> Self {
        Self::new(
            tick,
            GameEventData::ScoreSync {
                player,
                red_score,
                blue_score,
            },
        )
    }

    /// Create team joined event.
    pub fn team_joined(tick: u32, player: PlayerId, team: Team) -> Self {
        Self::new(tick, GameEventData::TeamJoined { player, team })
    }

    /// Create team left event.
    pub fn team_left(tick: u32, player: PlayerId, team: Team) -> Self {
        Self::new(tick, GameEventData::TeamLeft { player, team })
    }

    /// Whether this event is a flag transition into or out of carried.
    pub fn involves_carry(&self) -> bool {
        matches!(
            &self.data,
            GameEventData::FlagStateChanged { old_state, new_state, .. }
                if *old_state == FlagState::Carried || *new_state == FlagState::Carried
        )
    }
}
