//! Game logic modules.
//!
//! Flag possession, match lifecycle, roster, arena configuration, and
//! the tick that drives time-based behavior. Everything here is
//! synchronous; the session layer provides the locking.

pub mod state;
pub mod events;
pub mod flag;
pub mod arena;
pub mod capture;
pub mod tick;

pub use state::{CtfState, FlagRecord, FlagState, MatchPhase, MatchRecord, PlayerId, Team, TeamRoster};
pub use arena::{ArenaConfig, ArenaSnapshot, CaptureZone, ProtectedRegion, SpawnPolicy};
pub use events::{GameEvent, GameEventData};
pub use tick::{tick, CtfConfig, TickResult};
