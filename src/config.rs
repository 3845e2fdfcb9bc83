//! Tunable constants of the synthesizer.
//!
//! Every default mirrors the layout the planner was tuned for (60 extensions,
//! eight free tiles, a 3-tile rampart setback). Callers override individual
//! values through the fluent setters or deserialize a partial config; missing
//! fields fall back to the defaults.

use crate::location::*;
use serde::{Deserialize, Serialize};

/// Parameters of the checkerboard space expansion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceSettings {
    /// Stop expanding once this many building slots exist.
    pub building_slot_target: usize,
    /// Building slots must be at least this far from a walkable border tile.
    pub building_border_margin: u8,
    /// Road slots must be at least this far from a walkable border tile.
    pub road_border_margin: u8,
    pub controller_exclusion: u8,
    pub source_exclusion: u8,
    pub mineral_exclusion: u8,
    /// Size of the free-space pool carved next to the road slots.
    pub free_space_pool: usize,
    /// Pool tiles farther than this from the origin are never offered.
    pub free_space_radius: u8,
}

impl Default for SpaceSettings {
    fn default() -> Self {
        SpaceSettings {
            building_slot_target: 90,
            building_border_margin: 5,
            road_border_margin: 4,
            controller_exclusion: 4,
            source_exclusion: 2,
            mineral_exclusion: 1,
            free_space_pool: 16,
            free_space_radius: 8,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub space: SpaceSettings,

    /// Building slots kept after infill; the surplus farthest from the center
    /// is released to the free-space pool.
    pub building_slot_ceiling: usize,

    pub extension_target: usize,
    pub extension_min: usize,

    pub free_space_count: usize,
    pub free_space_min: usize,

    pub tower_count: usize,
    pub tower_min: usize,
    pub tower_spacing: u8,

    /// Padding around core structures when building protect rectangles.
    pub structure_padding: u8,
    /// Padding around source and mineral infrastructure.
    pub resource_padding: u8,
    pub controller_padding: u8,
    /// Make the perimeter hug the protected structures instead of taking any
    /// cut of minimal length.
    pub prefer_closer_barriers: bool,
    /// Only the first N protect rectangles pull the cut closer. `None` applies
    /// the preference to every rectangle.
    pub prefer_closer_limit: Option<usize>,

    /// A* heuristic multiplier for network paths. 0 degrades to Dijkstra.
    pub heuristic_weight: u32,
    pub upgrader_limit: usize,

    pub rampart_weight: f32,
    pub upgrade_bonus_weight: f32,
    pub terrain_penalty_weight: f32,

    /// Restrict candidate origins. `None` tries every passable interior tile.
    pub origins: Option<Vec<Location>>,
    /// Threads used to evaluate candidates. 0 uses the available parallelism.
    pub worker_threads: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            space: SpaceSettings::default(),
            building_slot_ceiling: 70,
            extension_target: 60,
            extension_min: 55,
            free_space_count: 8,
            free_space_min: 4,
            tower_count: 6,
            tower_min: 6,
            tower_spacing: 3,
            structure_padding: 3,
            resource_padding: 1,
            controller_padding: 1,
            prefer_closer_barriers: true,
            prefer_closer_limit: None,
            heuristic_weight: 1,
            upgrader_limit: 8,
            rampart_weight: 1000.0,
            upgrade_bonus_weight: 10.0,
            terrain_penalty_weight: 1.0,
            origins: None,
            worker_threads: 0,
        }
    }
}

impl LayoutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn space(mut self, space: SpaceSettings) -> Self {
        self.space = space;
        self
    }

    pub fn extensions(mut self, target: usize, min: usize) -> Self {
        self.extension_target = target;
        self.extension_min = min;
        self
    }

    pub fn free_space(mut self, count: usize, min: usize) -> Self {
        self.free_space_count = count;
        self.free_space_min = min;
        self
    }

    pub fn towers(mut self, count: usize, min: usize) -> Self {
        self.tower_count = count;
        self.tower_min = min;
        self
    }

    pub fn origins(mut self, origins: Vec<Location>) -> Self {
        self.origins = Some(origins);
        self
    }

    pub fn worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads;
        self
    }

    pub fn heuristic_weight(mut self, weight: u32) -> Self {
        self.heuristic_weight = weight;
        self
    }

    pub fn prefer_closer_barriers(mut self, enabled: bool) -> Self {
        self.prefer_closer_barriers = enabled;
        self
    }

    pub fn prefer_closer_limit(mut self, limit: Option<usize>) -> Self {
        self.prefer_closer_limit = limit;
        self
    }

    /// Resolve `worker_threads`, falling back to the machine's parallelism.
    pub fn effective_threads(&self) -> usize {
        if self.worker_threads > 0 {
            self.worker_threads
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_uses_defaults() {
        let config: LayoutConfig =
            serde_json::from_str(r#"{"extension_target": 40, "space": {"free_space_pool": 4}}"#).unwrap();

        assert_eq!(config.extension_target, 40);
        assert_eq!(config.extension_min, 55);
        assert_eq!(config.space.free_space_pool, 4);
        assert_eq!(config.space.building_border_margin, 5);
        assert_eq!(config.space.free_space_radius, 8);
        assert!(config.prefer_closer_barriers);
    }

    #[test]
    fn barrier_hugging_can_be_switched_off() {
        let config: LayoutConfig = serde_json::from_str(r#"{"prefer_closer_barriers": false}"#).unwrap();
        assert!(!config.prefer_closer_barriers);
        assert!(!LayoutConfig::default().prefer_closer_barriers(false).prefer_closer_barriers);
    }
}
