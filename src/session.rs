//! Match Session Management
//!
//! One `CtfSession` per world owns the flag records, scoreboard,
//! roster, and arena configuration. Every mutating method takes `&mut
//! self`, and callers hold the session behind a `tokio::sync::RwLock`,
//! so each compound transition (check + mutate) is one critical section
//! from the outside. Persistence never runs under that lock: callers
//! copy an `ArenaSnapshot` out first.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info};

use crate::core::vec3::{Transform, Vec3};
use crate::game::arena::{ArenaConfig, ArenaSnapshot, ProtectedRegion};
use crate::game::events::{GameEvent, GameEventData};
use crate::game::flag;
use crate::game::state::{CtfState, FlagRecord, PlayerId, Team};
use crate::game::tick::{tick, CtfConfig, TickResult};

/// Reserved item-id prefix for flag items in player inventories.
pub const FLAG_ITEM_PREFIX: &str = "CTF_Flag";

/// Hotbar slot that holds a carried flag.
pub const FLAG_ITEM_SLOT: u8 = 0;

/// Unique world/session identifier.
pub type WorldId = [u8; 16];

/// What to do with a forwarded inventory drop request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropItemDecision {
    /// The request was a flag drop; default item-drop behavior must be
    /// suppressed.
    Intercepted,
    /// Not a flag drop; the host should proceed normally.
    PassThrough,
}

/// A CTF world: all four core components behind one owner.
pub struct CtfSession {
    /// World identifier.
    pub id: WorldId,
    config: CtfConfig,
    state: CtfState,
    arena: ArenaConfig,
    event_tx: broadcast::Sender<GameEvent>,
}

impl CtfSession {
    /// Create a session with flags standing at the given positions.
    pub fn new(id: WorldId, config: CtfConfig, red_stand: Vec3, blue_stand: Vec3) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            id,
            config,
            state: CtfState::new(red_stand, blue_stand),
            arena: ArenaConfig::new(),
            event_tx,
        }
    }

    /// Subscribe to engine events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<GameEvent> {
        self.event_tx.subscribe()
    }

    /// Read-only view of the game state.
    pub fn state(&self) -> &CtfState {
        &self.state
    }

    /// Read-only view of the arena configuration.
    pub fn arena(&self) -> &ArenaConfig {
        &self.arena
    }

    /// Engine configuration.
    pub fn config(&self) -> &CtfConfig {
        &self.config
    }

    /// Drain pending events to subscribers.
    fn publish_pending(&mut self) {
        for event in self.state.take_events() {
            // A lagging or absent subscriber must not stall the engine.
            let _ = self.event_tx.send(event);
        }
    }

    // =========================================================================
    // Flag operations
    // =========================================================================

    /// Pick up a team's flag. `privileged` bypasses the
    /// opposing-team-only ownership rule for admin callers.
    pub fn pickup_flag(&mut self, player: PlayerId, team: Team, privileged: bool) -> bool {
        let ok = flag::pickup(&mut self.state, team, player, privileged);
        if ok {
            info!(%player, %team, "flag picked up");
        }
        self.publish_pending();
        ok
    }

    /// Drop the carried flag at `position`, the player's last known
    /// position, or the world origin, in that order of preference.
    pub fn drop_flag(&mut self, player: PlayerId, position: Option<Vec3>) -> bool {
        let at = position
            .or_else(|| self.state.last_position(player))
            .unwrap_or(Vec3::ZERO);
        let ok = flag::drop_flag(&mut self.state, player, at, &self.config.flag);
        if ok {
            info!(%player, %at, "flag dropped");
        }
        self.publish_pending();
        ok
    }

    /// Force a team's flag back to its stand (admin correction).
    pub fn return_flag(&mut self, team: Team) {
        if flag::return_to_stand(&mut self.state, team) {
            info!(%team, "flag returned to stand");
        }
        self.publish_pending();
    }

    /// Move a team's flag stand. Rejected while that flag is carried.
    pub fn set_flag_stand(&mut self, team: Team, position: Vec3) -> bool {
        let moved = self.state.flag_mut(team).set_stand_position(position);
        if moved {
            info!(%team, %position, "flag stand moved");
        }
        moved
    }

    /// A team's flag record.
    pub fn flag_data(&self, team: Team) -> &FlagRecord {
        self.state.flag(team)
    }

    /// Which flag the player carries, if any.
    pub fn carried_flag_team(&self, player: PlayerId) -> Option<Team> {
        self.state.carried_flag_team(player)
    }

    /// Whether a carrier is currently movement-restricted.
    pub fn is_movement_restricted(&self, player: PlayerId) -> bool {
        self.state.is_movement_restricted(player)
    }

    // =========================================================================
    // Team operations
    // =========================================================================

    /// Put a player on a team, leaving any previous one.
    pub fn join_team(&mut self, player: PlayerId, team: Team) {
        let previous = self.state.roster.assign(player, team);
        let tick = self.state.tick;
        if previous != Some(team) {
            if let Some(old) = previous {
                self.state.push_event(GameEvent::team_left(tick, player, old));
            }
            self.state.push_event(GameEvent::team_joined(tick, player, team));
            info!(%player, %team, "player joined team");
        }
        self.publish_pending();
    }

    /// Take a player off their team. Returns the team left.
    pub fn leave_team(&mut self, player: PlayerId) -> Option<Team> {
        let left = self.state.roster.leave(player);
        if let Some(team) = left {
            let tick = self.state.tick;
            self.state.push_event(GameEvent::team_left(tick, player, team));
            info!(%player, %team, "player left team");
        }
        self.publish_pending();
        left
    }

    // =========================================================================
    // Match operations
    // =========================================================================

    /// Start the match from inactive.
    pub fn start_match(&mut self) -> bool {
        if !self.state.scoreboard.start() {
            return false;
        }
        let tick = self.state.tick;
        self.state.push_event(GameEvent::match_started(tick));
        info!("match started (first to {})", self.state.scoreboard.score_limit());
        self.publish_pending();
        true
    }

    /// End the match early. The scoreboard keeps its counts until reset.
    pub fn end_match(&mut self) -> bool {
        if !self.state.scoreboard.end() {
            return false;
        }
        let tick = self.state.tick;
        self.state.push_event(GameEvent::match_ended(tick, None));
        info!(score = %self.state.scoreboard.score_string(), "match ended early");
        self.publish_pending();
        true
    }

    /// Reset to inactive: scores zeroed, both flags returned.
    pub fn reset_match(&mut self) {
        self.state.scoreboard.reset();
        for team in Team::ALL {
            flag::return_to_stand(&mut self.state, team);
        }
        info!("match reset");
        self.publish_pending();
    }

    /// Change the captures-to-win limit (inactive only).
    pub fn set_score_limit(&mut self, limit: u32) -> bool {
        self.state.scoreboard.set_score_limit(limit)
    }

    // =========================================================================
    // Arena operations
    // =========================================================================

    /// Append a spawn point and report the new count.
    pub fn add_spawn(&mut self, team: Team, transform: Transform) -> usize {
        self.arena.add_spawn(team, transform);
        self.arena.spawn_count(team)
    }

    /// Remove all of a team's spawn points.
    pub fn clear_spawns(&mut self, team: Team) {
        self.arena.clear_spawns(team);
    }

    /// Pick the next spawn for a team per the configured policy.
    pub fn next_spawn(&mut self, team: Team) -> Option<Transform> {
        self.arena.next_spawn(team)
    }

    /// Set a team's capture zone.
    pub fn set_capture_zone(&mut self, team: Team, center: Vec3, radius: f64) {
        self.arena.set_capture_zone(team, center, radius);
        info!(%team, %center, radius, "capture zone set");
    }

    /// Mark the first corner of a protected region.
    pub fn start_region(&mut self, player: PlayerId, name: &str, corner: Vec3) {
        self.arena.start_region(player, name, corner);
        debug!(%player, name, "region first corner marked");
    }

    /// Name of the player's pending region mark.
    pub fn pending_region_name(&self, player: PlayerId) -> Option<&str> {
        self.arena.pending_region_name(player)
    }

    /// Complete a pending region.
    pub fn finish_region(
        &mut self,
        player: PlayerId,
        name: &str,
        corner: Vec3,
    ) -> Option<ProtectedRegion> {
        let region = self.arena.finish_region(player, name, corner);
        if let Some(ref region) = region {
            info!(name = %region.name, "protected region created");
        }
        region
    }

    /// Delete a protected region by name.
    pub fn remove_region(&mut self, name: &str) -> bool {
        self.arena.remove_region(name)
    }

    /// Copy the persistable arena configuration.
    pub fn arena_snapshot(&self) -> ArenaSnapshot {
        self.arena.snapshot()
    }

    /// Replace the live arena configuration (preset load). The change is
    /// staged in memory only; persisting it requires an explicit arena
    /// save afterwards.
    pub fn load_arena_snapshot(&mut self, snapshot: ArenaSnapshot) {
        self.arena.restore(snapshot);
        info!("arena configuration replaced from snapshot");
    }

    // =========================================================================
    // Host events
    // =========================================================================

    /// Player connected. While a match is active, push the current
    /// scores so the host can show the newcomer a HUD.
    pub fn handle_connect(&mut self, player: PlayerId) {
        if self.state.scoreboard.is_active() {
            let tick = self.state.tick;
            let red = self.state.scoreboard.score(Team::Red);
            let blue = self.state.scoreboard.score(Team::Blue);
            self.state.push_event(GameEvent::score_sync(tick, player, red, blue));
            self.publish_pending();
        }
        debug!(%player, "player connected");
    }

    /// Player disconnected: roster removal first, then the carrier-drop
    /// path, then position cleanup.
    pub fn handle_disconnect(&mut self, player: PlayerId) {
        if let Some(team) = self.state.roster.leave(player) {
            let tick = self.state.tick;
            self.state.push_event(GameEvent::team_left(tick, player, team));
        }
        if flag::handle_carrier_lost(&mut self.state, player, &self.config.flag) {
            info!(%player, "carrier disconnected, flag dropped");
        }
        self.state.forget_position(player);
        self.publish_pending();
        debug!(%player, "player disconnected");
    }

    /// Carrier died: same drop path as a disconnect, but the player
    /// keeps their roster slot and position tracking.
    pub fn handle_death(&mut self, player: PlayerId) {
        if flag::handle_carrier_lost(&mut self.state, player, &self.config.flag) {
            info!(%player, "carrier died, flag dropped");
        }
        self.publish_pending();
    }

    /// Inventory drop request forwarded by the host. Only a request for
    /// the reserved flag slot holding a flag item is intercepted;
    /// everything else keeps default behavior.
    pub fn handle_drop_item_request(
        &mut self,
        player: PlayerId,
        slot: u8,
        item_id: &str,
    ) -> DropItemDecision {
        if !self.state.is_carrying(player) {
            return DropItemDecision::PassThrough;
        }
        if slot != FLAG_ITEM_SLOT || !item_id.starts_with(FLAG_ITEM_PREFIX) {
            return DropItemDecision::PassThrough;
        }
        self.drop_flag(player, None);
        DropItemDecision::Intercepted
    }

    /// Host-reported player movement.
    pub fn update_position(&mut self, player: PlayerId, position: Vec3) {
        self.state.update_position(player, position);
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Run one engine tick and publish its events.
    pub fn run_tick(&mut self) -> TickResult {
        let result = tick(&mut self.state, &self.arena, &self.config);
        for event in &result.events {
            match &event.data {
                GameEventData::Capture { scoring_team, new_score, .. } => {
                    info!(%scoring_team, new_score = *new_score, "capture");
                }
                GameEventData::MatchEnded { winner } => {
                    info!(?winner, "match ended");
                }
                _ => {}
            }
            let _ = self.event_tx.send(event.clone());
        }
        result
    }
}

// =============================================================================
// SESSION MANAGER
// =============================================================================

/// Manages all active world sessions. Sessions are explicit instances,
/// so multiple worlds run concurrently without shared globals.
pub struct SessionManager {
    sessions: RwLock<BTreeMap<WorldId, Arc<RwLock<CtfSession>>>>,
}

impl SessionManager {
    /// Create new session manager.
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(BTreeMap::new()),
        }
    }

    /// Create a new session and return its id.
    pub async fn create_session(
        &self,
        config: CtfConfig,
        red_stand: Vec3,
        blue_stand: Vec3,
    ) -> WorldId {
        let id = uuid::Uuid::new_v4().into_bytes();
        let session = CtfSession::new(id, config, red_stand, blue_stand);

        let mut sessions = self.sessions.write().await;
        sessions.insert(id, Arc::new(RwLock::new(session)));
        id
    }

    /// Get a session by id.
    pub async fn get_session(&self, id: &WorldId) -> Option<Arc<RwLock<CtfSession>>> {
        let sessions = self.sessions.read().await;
        sessions.get(id).cloned()
    }

    /// Remove a session.
    pub async fn remove_session(&self, id: &WorldId) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(id);
    }

    /// Get active session count.
    pub async fn session_count(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Drive a session's tick at `tick_rate` Hz until the session is
/// dropped from its manager (the task holds only a weak handle).
pub fn spawn_ticker(session: Arc<RwLock<CtfSession>>, tick_rate: u32) -> JoinHandle<()> {
    let weak = Arc::downgrade(&session);
    drop(session);

    tokio::spawn(async move {
        let tick_duration = Duration::from_micros(1_000_000 / tick_rate as u64);
        let mut tick_interval = interval(tick_duration);
        tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tick_interval.tick().await;
            let Some(session) = weak.upgrade() else {
                break;
            };
            let mut s = session.write().await;
            s.run_tick();
        }
    })
}

// =============================================================================
// TESTS
// =============================================================================
