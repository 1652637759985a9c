//! Command Surface
//!
//! Typed commands from the host, one per engine operation. Every
//! command produces either an acknowledgment or a rejection reason;
//! nothing here panics or leaks errors to the caller. Persistence
//! commands copy a snapshot under the session lock and do their file
//! I/O after releasing it.

use std::sync::Arc;

use serde::{Serialize, Deserialize};
use tokio::sync::RwLock;

use crate::core::vec3::{Transform, Vec3};
use crate::game::state::{FlagState, PlayerId, Team};
use crate::session::CtfSession;
use crate::storage::{ArenaStore, StorageError};

/// Who issued a command, and where they stand.
#[derive(Debug, Clone, Default)]
pub struct CommandContext {
    /// Issuing player; `None` for console callers.
    pub player: Option<PlayerId>,
    /// Caller's position, when the host knows it.
    pub position: Option<Vec3>,
    /// Caller's full transform (for spawn placement).
    pub transform: Option<Transform>,
    /// Admin privilege: unlocks the own-flag pickup override.
    pub privileged: bool,
}

/// Commands understood by the engine. Argument parsing happens in the
/// host; value validation happens here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Show match, flag, and caller state.
    Status,
    /// Pick up a team's flag.
    Pickup { team: String },
    /// Drop the carried flag.
    Drop,
    /// Move a flag stand to the caller's position.
    SetStand { team: String },
    /// Force a flag back to its stand.
    ReturnFlag { team: String },
    /// Add a spawn point at the caller's position.
    SetSpawn { team: String },
    /// Clear a team's spawn points.
    ClearSpawns { team: String },
    /// Set a capture zone at the caller's position.
    SetCapture { team: String, radius: Option<f64> },
    /// Mark the first corner of a protected region.
    ProtectAdd { name: String },
    /// Mark the second corner and create the region.
    ProtectSet { name: String },
    /// Delete a protected region.
    ProtectRemove { name: String },
    /// List protected regions.
    ProtectList,
    /// Persist the live arena configuration.
    Save,
    /// Save the live configuration as a named preset.
    PresetSave { name: String },
    /// Stage a named preset into the live configuration.
    PresetLoad { name: String },
    /// Delete a named preset.
    PresetDelete { name: String },
    /// List stored presets.
    PresetList,
    /// Join a team.
    TeamJoin { team: String },
    /// Leave the current team.
    TeamLeave,
    /// Show team rosters.
    TeamList,
    /// Start the match.
    Start,
    /// End the match early.
    End,
    /// Reset scores and match state.
    Reset,
    /// Show the current score.
    Score,
    /// Set the captures-to-win limit.
    SetLimit { limit: i64 },
}

/// Acknowledgment or rejection for one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Whether the command took effect.
    pub success: bool,
    /// Reply lines for the caller.
    pub lines: Vec<String>,
}

impl CommandOutcome {
    fn ok(message: impl Into<String>) -> Self {
        Self { success: true, lines: vec![message.into()] }
    }

    fn ok_lines(lines: Vec<String>) -> Self {
        Self { success: true, lines }
    }

    fn reject(reason: impl Into<String>) -> Self {
        Self { success: false, lines: vec![reason.into()] }
    }

    /// All reply lines joined for single-line consumers.
    pub fn message(&self) -> String {
        self.lines.join("\n")
    }
}

fn parse_team(arg: &str) -> Result<Team, CommandOutcome> {
    Team::parse(arg).ok_or_else(|| CommandOutcome::reject("Invalid team. Use 'red' or 'blue'"))
}

fn require_player(ctx: &CommandContext) -> Result<PlayerId, CommandOutcome> {
    ctx.player
        .ok_or_else(|| CommandOutcome::reject("This command must be run as a player"))
}

fn require_position(ctx: &CommandContext) -> Result<Vec3, CommandOutcome> {
    ctx.position
        .ok_or_else(|| CommandOutcome::reject("Could not get your position"))
}

fn is_valid_preset_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn format_position(position: Vec3) -> String {
    format!("{position}")
}

/// Execute one command against a session.
///
/// The session lock is held only for the in-memory part of each
/// command; preset and arena file I/O happens against copied snapshots.
pub async fn execute(
    session: &Arc<RwLock<CtfSession>>,
    store: &ArenaStore,
    ctx: &CommandContext,
    command: Command,
) -> CommandOutcome {
    match command {
        Command::Status => status(session, ctx).await,

        Command::Pickup { team } => {
            let team = match parse_team(&team) {
                Ok(t) => t,
                Err(r) => return r,
            };
            let player = match require_player(ctx) {
                Ok(p) => p,
                Err(r) => return r,
            };
            let mut s = session.write().await;
            if s.state().is_carrying(player) {
                return CommandOutcome::reject("You are already carrying a flag!");
            }
            if s.pickup_flag(player, team, ctx.privileged) {
                CommandOutcome::ok_lines(vec![
                    format!("You picked up the {} flag!", team.display_name()),
                    "Movement restrictions are now active. Press G to drop.".to_string(),
                ])
            } else {
                CommandOutcome::reject(
                    "Could not pick up the flag. It may be carried or have immunity.",
                )
            }
        }

        Command::Drop => {
            let player = match require_player(ctx) {
                Ok(p) => p,
                Err(r) => return r,
            };
            let mut s = session.write().await;
            if !s.state().is_carrying(player) {
                return CommandOutcome::reject("You are not carrying a flag!");
            }
            s.drop_flag(player, ctx.position);
            CommandOutcome::ok("You dropped the flag!")
        }

        Command::SetStand { team } => {
            let team = match parse_team(&team) {
                Ok(t) => t,
                Err(r) => return r,
            };
            let position = match require_position(ctx) {
                Ok(p) => p,
                Err(r) => return r,
            };
            let mut s = session.write().await;
            if s.set_flag_stand(team, position) {
                CommandOutcome::ok(format!(
                    "Set {} flag stand at: {}",
                    team.display_name(),
                    format_position(position)
                ))
            } else {
                CommandOutcome::reject("Cannot move the stand while that flag is carried.")
            }
        }

        Command::ReturnFlag { team } => {
            let team = match parse_team(&team) {
                Ok(t) => t,
                Err(r) => return r,
            };
            let mut s = session.write().await;
            s.return_flag(team);
            CommandOutcome::ok(format!(
                "{} flag has been returned to its stand.",
                team.display_name()
            ))
        }

        Command::SetSpawn { team } => {
            let team = match parse_team(&team) {
                Ok(t) => t,
                Err(r) => return r,
            };
            let transform = match ctx.transform {
                Some(t) => t,
                None => match require_position(ctx) {
                    Ok(p) => Transform::at(p),
                    Err(r) => return r,
                },
            };
            let mut s = session.write().await;
            let count = s.add_spawn(team, transform);
            CommandOutcome::ok(format!(
                "Added {} spawn point #{} at: {}",
                team.display_name(),
                count,
                format_position(transform.position)
            ))
        }

        Command::ClearSpawns { team } => {
            let team = match parse_team(&team) {
                Ok(t) => t,
                Err(r) => return r,
            };
            let mut s = session.write().await;
            s.clear_spawns(team);
            CommandOutcome::ok(format!("Cleared all {} spawn points.", team.display_name()))
        }

        Command::SetCapture { team, radius } => {
            let team = match parse_team(&team) {
                Ok(t) => t,
                Err(r) => return r,
            };
            let radius = radius.unwrap_or(crate::game::arena::CaptureZone::DEFAULT_RADIUS);
            if radius <= 0.0 {
                return CommandOutcome::reject("Radius must be positive");
            }
            let position = match require_position(ctx) {
                Ok(p) => p,
                Err(r) => return r,
            };
            let mut s = session.write().await;
            s.set_capture_zone(team, position, radius);
            CommandOutcome::ok(format!(
                "Set {} capture zone at: {} (radius: {})",
                team.display_name(),
                format_position(position),
                radius
            ))
        }

        Command::ProtectAdd { name } => {
            if name.is_empty() {
                return CommandOutcome::reject("Usage: protect add <name>");
            }
            let player = match require_player(ctx) {
                Ok(p) => p,
                Err(r) => return r,
            };
            let position = match require_position(ctx) {
                Ok(p) => p,
                Err(r) => return r,
            };
            let mut s = session.write().await;
            s.start_region(player, &name, position);
            CommandOutcome::ok(format!(
                "Position 1 marked for region '{name}'. Now use 'protect set {name}' at the opposite corner."
            ))
        }

        Command::ProtectSet { name } => {
            if name.is_empty() {
                return CommandOutcome::reject("Usage: protect set <name>");
            }
            let player = match require_player(ctx) {
                Ok(p) => p,
                Err(r) => return r,
            };
            let position = match require_position(ctx) {
                Ok(p) => p,
                Err(r) => return r,
            };
            let mut s = session.write().await;
            let pending_matches = s
                .pending_region_name(player)
                .is_some_and(|pending| pending.eq_ignore_ascii_case(&name));
            if !pending_matches {
                return CommandOutcome::reject(format!(
                    "No pending region named '{name}'. Use 'protect add {name}' first."
                ));
            }
            match s.finish_region(player, &name, position) {
                Some(region) => CommandOutcome::ok(format!(
                    "Protected region '{name}' created: {} to {}",
                    format_position(region.bounds.min),
                    format_position(region.bounds.max)
                )),
                None => CommandOutcome::reject("Failed to create region."),
            }
        }

        Command::ProtectRemove { name } => {
            if name.is_empty() {
                return CommandOutcome::reject("Usage: protect remove <name>");
            }
            let mut s = session.write().await;
            if s.remove_region(&name) {
                CommandOutcome::ok(format!("Removed protected region '{name}'."))
            } else {
                CommandOutcome::reject(format!("Region '{name}' not found."))
            }
        }

        Command::ProtectList => {
            let s = session.read().await;
            let regions = s.arena().region_names();
            if regions.is_empty() {
                CommandOutcome::ok("No protected regions defined.")
            } else {
                CommandOutcome::ok(format!("Protected regions: {}", regions.join(", ")))
            }
        }

        Command::Save => {
            let snapshot = {
                let s = session.read().await;
                s.arena_snapshot()
            };
            match store.save_arena(&snapshot).await {
                Ok(()) => CommandOutcome::ok("Arena configuration saved."),
                Err(e) => CommandOutcome::reject(format!("Failed to save arena: {e}")),
            }
        }

        Command::PresetSave { name } => {
            if !is_valid_preset_name(&name) {
                return CommandOutcome::reject(
                    "Invalid preset name. Use only letters, numbers, underscores, and hyphens.",
                );
            }
            let snapshot = {
                let s = session.read().await;
                s.arena_snapshot()
            };
            match store.save_preset(&name, &snapshot).await {
                Ok(()) => CommandOutcome::ok(format!("Saved arena preset '{name}'.")),
                Err(e) => CommandOutcome::reject(format!("Failed to save preset: {e}")),
            }
        }

        Command::PresetLoad { name } => {
            if !is_valid_preset_name(&name) {
                return CommandOutcome::reject(
                    "Invalid preset name. Use only letters, numbers, underscores, and hyphens.",
                );
            }
            // File read happens before, not under, the session lock.
            let snapshot = match store.load_preset(&name).await {
                Ok(snapshot) => snapshot,
                Err(StorageError::PresetNotFound(_)) => {
                    return CommandOutcome::reject(format!("Preset '{name}' not found."));
                }
                Err(e) => return CommandOutcome::reject(format!("Failed to load preset: {e}")),
            };
            let mut s = session.write().await;
            s.load_arena_snapshot(snapshot);
            CommandOutcome::ok(format!("Loaded arena preset '{name}'. Use 'save' to persist."))
        }

        Command::PresetDelete { name } => {
            if !is_valid_preset_name(&name) {
                return CommandOutcome::reject(
                    "Invalid preset name. Use only letters, numbers, underscores, and hyphens.",
                );
            }
            match store.delete_preset(&name).await {
                Ok(()) => CommandOutcome::ok(format!("Deleted preset '{name}'.")),
                Err(StorageError::PresetNotFound(_)) => {
                    CommandOutcome::reject(format!("Preset '{name}' not found."))
                }
                Err(e) => CommandOutcome::reject(format!("Failed to delete preset: {e}")),
            }
        }

        Command::PresetList => {
            match store.list_presets().await {
                Ok(presets) if presets.is_empty() => CommandOutcome::ok(
                    "No presets saved. Use 'preset save <name>' to create one.",
                ),
                Ok(presets) => {
                    CommandOutcome::ok(format!("Available presets: {}", presets.join(", ")))
                }
                Err(e) => CommandOutcome::reject(format!("Failed to list presets: {e}")),
            }
        }

        Command::TeamJoin { team } => {
            let team = match parse_team(&team) {
                Ok(t) => t,
                Err(r) => return r,
            };
            let player = match require_player(ctx) {
                Ok(p) => p,
                Err(r) => return r,
            };
            let mut s = session.write().await;
            s.join_team(player, team);
            CommandOutcome::ok(format!("You joined the {} team!", team.display_name()))
        }

        Command::TeamLeave => {
            let player = match require_player(ctx) {
                Ok(p) => p,
                Err(r) => return r,
            };
            let mut s = session.write().await;
            match s.leave_team(player) {
                Some(team) => {
                    CommandOutcome::ok(format!("You left the {} team.", team.display_name()))
                }
                None => CommandOutcome::reject("You are not on a team."),
            }
        }

        Command::TeamList => {
            let s = session.read().await;
            let mut lines = vec!["=== Team Rosters ===".to_string()];
            for team in Team::ALL {
                let members = s.state().roster.members(team);
                let listing = if members.is_empty() {
                    "(empty)".to_string()
                } else {
                    members
                        .iter()
                        .map(|p| p.to_uuid_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                lines.push(format!(
                    "{} ({}): {}",
                    team.display_name(),
                    members.len(),
                    listing
                ));
            }
            CommandOutcome::ok_lines(lines)
        }

        Command::Start => {
            let mut s = session.write().await;
            if s.start_match() {
                CommandOutcome::ok("Match started!")
            } else {
                CommandOutcome::reject(format!(
                    "Could not start match. Current state: {:?}",
                    s.state().scoreboard.phase()
                ))
            }
        }

        Command::End => {
            let mut s = session.write().await;
            if s.end_match() {
                CommandOutcome::ok("Match ended.")
            } else {
                CommandOutcome::reject("Match is not active.")
            }
        }

        Command::Reset => {
            let mut s = session.write().await;
            s.reset_match();
            CommandOutcome::ok("Match reset. Scores cleared.")
        }

        Command::Score => {
            let s = session.read().await;
            let scoreboard = &s.state().scoreboard;
            CommandOutcome::ok_lines(vec![
                format!("Score: {}", scoreboard.score_string()),
                format!("Match state: {:?}", scoreboard.phase()),
                format!("First to {} wins.", scoreboard.score_limit()),
            ])
        }

        Command::SetLimit { limit } => {
            if limit < 1 {
                return CommandOutcome::reject("Limit must be at least 1");
            }
            let mut s = session.write().await;
            if s.set_score_limit(limit as u32) {
                CommandOutcome::ok(format!("Score limit set to {limit} captures."))
            } else {
                CommandOutcome::reject("Cannot change limit while match is active.")
            }
        }
    }
}

async fn status(session: &Arc<RwLock<CtfSession>>, ctx: &CommandContext) -> CommandOutcome {
    let s = session.read().await;
    let state = s.state();
    let mut lines = vec!["=== CTF Status ===".to_string()];

    let scoreboard = &state.scoreboard;
    lines.push(format!(
        "Match: {:?} | {}",
        scoreboard.phase(),
        scoreboard.score_string()
    ));
    if scoreboard.is_active() {
        lines.push(format!("First to {} captures wins!", scoreboard.score_limit()));
    }

    for team in Team::ALL {
        let flag = state.flag(team);
        let status = match flag.state() {
            FlagState::AtStand => "At stand".to_string(),
            FlagState::Carried => match flag.carrier() {
                Some(carrier) => format!("Carried by {carrier}"),
                None => "Carried".to_string(),
            },
            FlagState::Dropped => {
                if flag.has_immunity(state.tick) {
                    "Dropped (immune)".to_string()
                } else {
                    "Dropped".to_string()
                }
            }
        };
        lines.push(format!("{} flag: {}", team.display_name(), status));
    }

    if let Some(player) = ctx.player {
        if let Some(team) = state.roster.team_of(player) {
            lines.push(format!("Your team: {}", team.display_name()));
        }
        if let Some(team) = state.carried_flag_team(player) {
            lines.push(format!("You are carrying the {} flag!", team.display_name()));
        }
    }

    CommandOutcome::ok_lines(lines)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::tick::CtfConfig;

    fn player(n: u8) -> PlayerId {
        PlayerId::new([n; 16])
    }

    fn player_ctx(n: u8, position: Vec3) -> CommandContext {
        CommandContext {
            player: Some(player(n)),
            position: Some(position),
            transform: Some(Transform::at(position)),
            privileged: false,
        }
    }

    fn test_session() -> Arc<RwLock<CtfSession>> {
        Arc::new(RwLock::new(CtfSession::new(
            [0; 16],
            CtfConfig::default(),
            Vec3::new(0.0, 64.0, 0.0),
            Vec3::new(100.0, 64.0, 0.0),
        )))
    }

    fn test_store() -> (tempfile::TempDir, ArenaStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ArenaStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn test_invalid_team_rejected() {
        let session = test_session();
        let (_dir, store) = test_store();
        let ctx = player_ctx(1, Vec3::ZERO);

        let outcome = execute(&session, &store, &ctx, Command::Pickup { team: "green".into() }).await;
        assert!(!outcome.success);
        assert!(outcome.message().contains("Invalid team"));

        // Nothing changed
        let s = session.read().await;
        assert_eq!(s.flag_data(Team::Red).state(), FlagState::AtStand);
    }

    #[tokio::test]
    async fn test_pickup_then_conflicting_pickup() {
        let session = test_session();
        let (_dir, store) = test_store();

        let outcome = execute(
            &session,
            &store,
            &player_ctx(1, Vec3::ZERO),
            Command::Pickup { team: "red".into() },
        )
        .await;
        assert!(outcome.success);

        let outcome = execute(
            &session,
            &store,
            &player_ctx(2, Vec3::ZERO),
            Command::Pickup { team: "red".into() },
        )
        .await;
        assert!(!outcome.success);
        assert!(outcome.message().contains("carried or have immunity"));
    }

    #[tokio::test]
    async fn test_drop_requires_carrying() {
        let session = test_session();
        let (_dir, store) = test_store();
        let ctx = player_ctx(1, Vec3::new(5.0, 64.0, 5.0));

        let outcome = execute(&session, &store, &ctx, Command::Drop).await;
        assert!(!outcome.success);

        execute(&session, &store, &ctx, Command::Pickup { team: "blue".into() }).await;
        let outcome = execute(&session, &store, &ctx, Command::Drop).await;
        assert!(outcome.success);

        let s = session.read().await;
        assert_eq!(s.flag_data(Team::Blue).state(), FlagState::Dropped);
        assert_eq!(
            s.flag_data(Team::Blue).current_position(),
            Vec3::new(5.0, 64.0, 5.0)
        );
    }

    #[tokio::test]
    async fn test_console_cannot_run_player_commands() {
        let session = test_session();
        let (_dir, store) = test_store();
        let console = CommandContext::default();

        let outcome = execute(&session, &store, &console, Command::Drop).await;
        assert!(!outcome.success);
        assert!(outcome.message().contains("as a player"));
    }

    #[tokio::test]
    async fn test_protect_two_step_flow() {
        let session = test_session();
        let (_dir, store) = test_store();

        // Set without add fails
        let outcome = execute(
            &session,
            &store,
            &player_ctx(1, Vec3::new(5.0, 3.0, 5.0)),
            Command::ProtectSet { name: "base".into() },
        )
        .await;
        assert!(!outcome.success);
        assert!(outcome.message().contains("No pending region"));

        let outcome = execute(
            &session,
            &store,
            &player_ctx(1, Vec3::ZERO),
            Command::ProtectAdd { name: "base".into() },
        )
        .await;
        assert!(outcome.success);

        // Different case still matches the pending mark
        let outcome = execute(
            &session,
            &store,
            &player_ctx(1, Vec3::new(5.0, 3.0, 5.0)),
            Command::ProtectSet { name: "Base".into() },
        )
        .await;
        assert!(outcome.success, "{}", outcome.message());

        // Case-insensitive removal
        let outcome = execute(
            &session,
            &store,
            &player_ctx(1, Vec3::ZERO),
            Command::ProtectRemove { name: "BASE".into() },
        )
        .await;
        assert!(outcome.success);

        let outcome = execute(
            &session,
            &store,
            &player_ctx(1, Vec3::ZERO),
            Command::ProtectRemove { name: "base".into() },
        )
        .await;
        assert!(!outcome.success);
        assert!(outcome.message().contains("not found"));
    }

    #[tokio::test]
    async fn test_preset_name_validation() {
        let session = test_session();
        let (_dir, store) = test_store();
        let ctx = player_ctx(1, Vec3::ZERO);

        for bad in ["", "my map", "a/b", "naïve"] {
            let outcome = execute(
                &session,
                &store,
                &ctx,
                Command::PresetSave { name: bad.into() },
            )
            .await;
            assert!(!outcome.success, "name {bad:?} should be rejected");
        }

        let outcome = execute(
            &session,
            &store,
            &ctx,
            Command::PresetSave { name: "duel_map-2".into() },
        )
        .await;
        assert!(outcome.success);
    }

    #[tokio::test]
    async fn test_preset_round_trip_via_commands() {
        let session = test_session();
        let (_dir, store) = test_store();
        let ctx = player_ctx(1, Vec3::new(7.0, 64.0, 7.0));

        execute(&session, &store, &ctx, Command::SetSpawn { team: "red".into() }).await;
        execute(
            &session,
            &store,
            &ctx,
            Command::SetCapture { team: "red".into(), radius: None },
        )
        .await;
        let saved = {
            let s = session.read().await;
            s.arena_snapshot()
        };

        let outcome = execute(&session, &store, &ctx, Command::PresetSave { name: "arena1".into() }).await;
        assert!(outcome.success);

        // Blow the live config away, then load the preset back
        {
            let mut s = session.write().await;
            s.clear_spawns(Team::Red);
        }
        let outcome = execute(&session, &store, &ctx, Command::PresetLoad { name: "arena1".into() }).await;
        assert!(outcome.success);
        assert!(outcome.message().contains("Use 'save' to persist"));

        let s = session.read().await;
        assert_eq!(s.arena_snapshot(), saved);
    }

    #[tokio::test]
    async fn test_preset_load_missing_is_not_found() {
        let session = test_session();
        let (_dir, store) = test_store();
        let ctx = player_ctx(1, Vec3::ZERO);

        let outcome = execute(&session, &store, &ctx, Command::PresetLoad { name: "ghost".into() }).await;
        assert!(!outcome.success);
        assert!(outcome.message().contains("not found"));
    }

    #[tokio::test]
    async fn test_match_command_flow() {
        let session = test_session();
        let (_dir, store) = test_store();
        let ctx = player_ctx(1, Vec3::ZERO);

        let outcome = execute(&session, &store, &ctx, Command::SetLimit { limit: 0 }).await;
        assert!(!outcome.success);

        let outcome = execute(&session, &store, &ctx, Command::SetLimit { limit: 5 }).await;
        assert!(outcome.success);

        let outcome = execute(&session, &store, &ctx, Command::Start).await;
        assert!(outcome.success);

        // Limit is frozen while active
        let outcome = execute(&session, &store, &ctx, Command::SetLimit { limit: 7 }).await;
        assert!(!outcome.success);

        let outcome = execute(&session, &store, &ctx, Command::Start).await;
        assert!(!outcome.success);

        let outcome = execute(&session, &store, &ctx, Command::End).await;
        assert!(outcome.success);
        let outcome = execute(&session, &store, &ctx, Command::End).await;
        assert!(!outcome.success);

        let outcome = execute(&session, &store, &ctx, Command::Reset).await;
        assert!(outcome.success);

        let outcome = execute(&session, &store, &ctx, Command::Score).await;
        assert!(outcome.message().contains("Red 0 - 0 Blue"));
    }

    #[tokio::test]
    async fn test_status_reports_caller_state() {
        let session = test_session();
        let (_dir, store) = test_store();
        let ctx = player_ctx(1, Vec3::ZERO);

        execute(&session, &store, &ctx, Command::TeamJoin { team: "red".into() }).await;
        execute(&session, &store, &ctx, Command::Pickup { team: "blue".into() }).await;

        let outcome = execute(&session, &store, &ctx, Command::Status).await;
        let message = outcome.message();
        assert!(message.contains("Your team: Red"));
        assert!(message.contains("You are carrying the Blue flag!"));
        assert!(message.contains("Blue flag: Carried by"));
    }

    #[tokio::test]
    async fn test_team_list_snapshot() {
        let session = test_session();
        let (_dir, store) = test_store();

        execute(
            &session,
            &store,
            &player_ctx(1, Vec3::ZERO),
            Command::TeamJoin { team: "red".into() },
        )
        .await;
        let outcome = execute(
            &session,
            &store,
            &CommandContext::default(),
            Command::TeamList,
        )
        .await;
        let message = outcome.message();
        assert!(message.contains("Red (1)"));
        assert!(message.contains("Blue (0): (empty)"));
    }
}
