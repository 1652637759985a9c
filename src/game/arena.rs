//! Arena Spatial Configuration
//!
//! Spawn points, capture zones, and protected regions for one world,
//! plus the snapshot type used for persistence and presets.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::core::aabb::Aabb;
use crate::core::rng::SpawnRng;
use crate::core::vec3::{Transform, Vec3};
use crate::game::state::{PlayerId, Team};

/// Spherical scoring area for one team.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CaptureZone {
    /// Zone center
    pub center: Vec3,
    /// Zone radius
    pub radius: f64,
}

impl CaptureZone {
    /// Radius used when the admin does not pass one.
    pub const DEFAULT_RADIUS: f64 = 3.0;

    /// Create a new zone.
    pub fn new(center: Vec3, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Whether a point is inside the zone (Euclidean distance).
    pub fn contains(&self, point: Vec3) -> bool {
        point.distance_squared(self.center) <= self.radius * self.radius
    }
}

/// Named no-build/no-damage box.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProtectedRegion {
    /// Region name as the admin typed it (matching is case-insensitive)
    pub name: String,
    /// Region bounds
    pub bounds: Aabb,
}

/// First half of the two-step region creation, keyed by the marking player.
#[derive(Clone, Debug)]
struct PendingRegionMark {
    name: String,
    first_corner: Vec3,
}

/// How `next_spawn` walks a team's spawn list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpawnPolicy {
    /// Cycle through spawns in insertion order
    #[default]
    RoundRobin,
    /// Pick a seeded-random spawn each time
    Random,
}

/// Serializable snapshot of the spatial configuration.
///
/// This is the exact shape written to disk for both the live arena file
/// and named presets; it must round-trip without loss, keeping spawn
/// order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ArenaSnapshot {
    /// Spawn lists per team, insertion-ordered
    pub red_spawns: Vec<Transform>,
    /// Spawn lists per team, insertion-ordered
    pub blue_spawns: Vec<Transform>,
    /// Capture zone per team, if configured
    pub red_capture_zone: Option<CaptureZone>,
    /// Capture zone per team, if configured
    pub blue_capture_zone: Option<CaptureZone>,
    /// Protected regions in creation order
    pub regions: Vec<ProtectedRegion>,
}

/// Live spatial configuration for one world.
///
/// Mutated by admin commands; persisted only on an explicit save.
#[derive(Clone, Debug)]
pub struct ArenaConfig {
    spawns: [Vec<Transform>; 2],
    capture_zones: [Option<CaptureZone>; 2],
    regions: Vec<ProtectedRegion>,
    pending_marks: BTreeMap<PlayerId, PendingRegionMark>,
    spawn_policy: SpawnPolicy,
    next_spawn: [usize; 2],
    rng: SpawnRng,
}

impl ArenaConfig {
    /// Create an empty configuration with the default spawn policy.
    pub fn new() -> Self {
        Self::with_policy(SpawnPolicy::RoundRobin, 0)
    }

    /// Create an empty configuration with an explicit spawn policy.
    pub fn with_policy(spawn_policy: SpawnPolicy, spawn_seed: u64) -> Self {
        Self {
            spawns: [Vec::new(), Vec::new()],
            capture_zones: [None, None],
            regions: Vec::new(),
            pending_marks: BTreeMap::new(),
            spawn_policy,
            next_spawn: [0, 0],
            rng: SpawnRng::new(spawn_seed),
        }
    }

    // =========================================================================
    // Spawn points
    // =========================================================================

    /// Append a spawn point for a team.
    pub fn add_spawn(&mut self, team: Team, transform: Transform) {
        self.spawns[team.index()].push(transform);
    }

    /// Remove all spawn points for a team.
    pub fn clear_spawns(&mut self, team: Team) {
        self.spawns[team.index()].clear();
        self.next_spawn[team.index()] = 0;
    }

    /// Number of spawn points for a team.
    pub fn spawn_count(&self, team: Team) -> usize {
        self.spawns[team.index()].len()
    }

    /// A team's spawn list, in insertion order.
    pub fn spawns(&self, team: Team) -> &[Transform] {
        &self.spawns[team.index()]
    }

    /// Pick the next spawn for a team according to the configured policy.
    /// Returns `None` when the team has no spawns.
    pub fn next_spawn(&mut self, team: Team) -> Option<Transform> {
        let spawns = &self.spawns[team.index()];
        if spawns.is_empty() {
            return None;
        }
        match self.spawn_policy {
            SpawnPolicy::RoundRobin => {
                let idx = self.next_spawn[team.index()] % spawns.len();
                self.next_spawn[team.index()] = idx + 1;
                Some(spawns[idx])
            }
            SpawnPolicy::Random => self.rng.choose(spawns).copied(),
        }
    }

    // =========================================================================
    // Capture zones
    // =========================================================================

    /// Set a team's capture zone, replacing any previous one.
    pub fn set_capture_zone(&mut self, team: Team, center: Vec3, radius: f64) {
        self.capture_zones[team.index()] = Some(CaptureZone::new(center, radius));
    }

    /// A team's capture zone, if configured.
    pub fn capture_zone(&self, team: Team) -> Option<&CaptureZone> {
        self.capture_zones[team.index()].as_ref()
    }

    // =========================================================================
    // Protected regions (two-step creation)
    // =========================================================================

    /// Store the first corner of a region for `player`. A second mark by
    /// the same player replaces the pending one.
    pub fn start_region(&mut self, player: PlayerId, name: &str, corner: Vec3) {
        self.pending_marks.insert(
            player,
            PendingRegionMark {
                name: name.to_string(),
                first_corner: corner,
            },
        );
    }

    /// Name of the player's pending region mark, if any.
    pub fn pending_region_name(&self, player: PlayerId) -> Option<&str> {
        self.pending_marks.get(&player).map(|m| m.name.as_str())
    }

    /// Complete a region started by `start_region`. Succeeds only when the
    /// player has a pending mark whose name matches case-insensitively;
    /// otherwise nothing changes and `None` is returned.
    pub fn finish_region(
        &mut self,
        player: PlayerId,
        name: &str,
        corner: Vec3,
    ) -> Option<ProtectedRegion> {
        let matches = self
            .pending_marks
            .get(&player)
            .is_some_and(|m| m.name.eq_ignore_ascii_case(name));
        if !matches {
            return None;
        }

        let mark = self.pending_marks.remove(&player)?;
        let region = ProtectedRegion {
            name: mark.name,
            bounds: Aabb::from_corners(mark.first_corner, corner),
        };

        // Region names are unique ignoring case; a re-created name
        // replaces the old box.
        self.regions
            .retain(|r| !r.name.eq_ignore_ascii_case(&region.name));
        self.regions.push(region.clone());
        Some(region)
    }

    /// Delete a region by name (case-insensitive). False when absent.
    pub fn remove_region(&mut self, name: &str) -> bool {
        let before = self.regions.len();
        self.regions.retain(|r| !r.name.eq_ignore_ascii_case(name));
        self.regions.len() != before
    }

    /// Look up a region by name (case-insensitive).
    pub fn region(&self, name: &str) -> Option<&ProtectedRegion> {
        self.regions.iter().find(|r| r.name.eq_ignore_ascii_case(name))
    }

    /// Region names in creation order.
    pub fn region_names(&self) -> Vec<String> {
        self.regions.iter().map(|r| r.name.clone()).collect()
    }

    /// Name of the first protected region containing the point, if any.
    pub fn region_containing(&self, point: Vec3) -> Option<&str> {
        self.regions
            .iter()
            .find(|r| r.bounds.contains(point))
            .map(|r| r.name.as_str())
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// Copy the persistable parts of the configuration.
    pub fn snapshot(&self) -> ArenaSnapshot {
        ArenaSnapshot {
            red_spawns: self.spawns[Team::Red.index()].clone(),
            blue_spawns: self.spawns[Team::Blue.index()].clone(),
            red_capture_zone: self.capture_zones[Team::Red.index()],
            blue_capture_zone: self.capture_zones[Team::Blue.index()],
            regions: self.regions.clone(),
        }
    }

    /// Replace the live configuration from a snapshot. Pending region
    /// marks and spawn cursors are transient and reset.
    pub fn restore(&mut self, snapshot: ArenaSnapshot) {
        self.spawns = [snapshot.red_spawns, snapshot.blue_spawns];
        self.capture_zones = [snapshot.red_capture_zone, snapshot.blue_capture_zone];
        self.regions = snapshot.regions;
        self.pending_marks.clear();
        self.next_spawn = [0, 0];
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TESTS
// =============================================================================
