//! # Flagrush Server
//!
//! Server-authoritative engine for a Capture The Flag game mode: flag
//! possession, team membership, match lifecycle and score, and the
//! arena's spatial configuration.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     FLAGRUSH SERVER                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Spatial primitives                        │
//! │  ├── vec3.rs     - 3D vectors and transforms                 │
//! │  ├── aabb.rs     - Axis-aligned region boxes                 │
//! │  └── rng.rs      - Seeded Xorshift128+ PRNG (spawn picks)    │
//! │                                                              │
//! │  game/           - Game logic (synchronous)                  │
//! │  ├── state.rs    - Flags, scoreboard, roster                 │
//! │  ├── flag.rs     - Pickup/drop/return mechanics              │
//! │  ├── arena.rs    - Spawns, capture zones, regions            │
//! │  ├── capture.rs  - Capture resolution                        │
//! │  ├── events.rs   - Engine notifications                      │
//! │  └── tick.rs     - Periodic sweep + resolution               │
//! │                                                              │
//! │  session.rs      - Per-world session and manager             │
//! │  command.rs      - Host-facing command surface               │
//! │  storage.rs      - Arena/preset persistence (JSON)           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Consistency Guarantee
//!
//! A session owns all four components and is mutated only behind one
//! exclusive lock, so every compound transition (pickup, capture,
//! disconnect-drop) is atomic to concurrent callers. Persistence works
//! on snapshots copied out of the session; no lock is held across file
//! I/O.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod session;
pub mod command;
pub mod storage;

// Re-export commonly used types
pub use crate::core::vec3::{Transform, Vec3};
pub use crate::core::aabb::Aabb;
pub use game::state::{CtfState, FlagRecord, FlagState, MatchPhase, PlayerId, Team};
pub use game::arena::{ArenaConfig, ArenaSnapshot, CaptureZone};
pub use game::events::{GameEvent, GameEventData};
pub use game::tick::{CtfConfig, TickResult};
pub use session::{CtfSession, SessionManager};
pub use storage::{ArenaStore, StorageError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine tick rate (Hz)
pub const TICK_RATE: u32 = 20;
