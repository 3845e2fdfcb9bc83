//! Structure allocation with per-level quotas.
//!
//! A batch is either committed whole or not at all: before touching the grid
//! the allocator checks that the cumulative count of the structure type stays
//! within its cap at the requested level and every level above it.

use crate::constants::*;
use crate::grid::WeightedGrid;
use crate::location::*;
use crate::plan::BuildPriority;
use crate::room_data::RoomObjectKind;
use crate::structure::*;
use fnv::{FnvHashMap, FnvHashSet};
use log::*;
use thiserror::Error;

use screeps::constants::StructureType;

/// Per-level structure caps.
#[derive(Clone, Debug)]
pub struct QuotaTable {
    caps: FnvHashMap<StructureType, [u32; LEVEL_COUNT]>,
}

impl QuotaTable {
    pub fn empty() -> Self {
        QuotaTable {
            caps: FnvHashMap::default(),
        }
    }

    /// The game's controller table, with ramparts and walls held back until level 5.
    pub fn screeps_default() -> Self {
        let mut table = QuotaTable::empty();

        for structure_type in [
            StructureType::Spawn,
            StructureType::Extension,
            StructureType::Link,
            StructureType::Storage,
            StructureType::Tower,
            StructureType::Observer,
            StructureType::PowerSpawn,
            StructureType::Extractor,
            StructureType::Lab,
            StructureType::Terminal,
            StructureType::Nuker,
            StructureType::Factory,
            StructureType::Container,
            StructureType::Road,
        ] {
            let mut caps = [0; LEVEL_COUNT];
            for (level, cap) in caps.iter_mut().enumerate() {
                *cap = max_structures_at_rcl(structure_type, level as u8);
            }
            table.caps.insert(structure_type, caps);
        }

        let fortification = [0, 0, 0, 0, 0, 2500, 2500, 2500, 2500];
        table.caps.insert(StructureType::Rampart, fortification);
        table.caps.insert(StructureType::Wall, fortification);

        table
    }

    pub fn with_cap(mut self, structure_type: StructureType, caps: [u32; LEVEL_COUNT]) -> Self {
        self.caps.insert(structure_type, caps);
        self
    }

    /// Cap for a type at a level. Unknown types and levels above 8 are capped at 0.
    pub fn cap(&self, structure_type: StructureType, level: u8) -> u32 {
        self.caps
            .get(&structure_type)
            .and_then(|caps| caps.get(level as usize))
            .copied()
            .unwrap_or(0)
    }
}

impl Default for QuotaTable {
    fn default() -> Self {
        QuotaTable::screeps_default()
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct QuotaCounters {
    pub added: [u32; LEVEL_COUNT],
    pub cumulative: [u32; LEVEL_COUNT],
}

/// Per-grid record of how many structures of each type have been placed at each level.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuotaRegistry {
    counters: FnvHashMap<StructureType, QuotaCounters>,
}

impl QuotaRegistry {
    pub fn counters(&self, structure_type: StructureType) -> QuotaCounters {
        self.counters.get(&structure_type).copied().unwrap_or_default()
    }

    fn apply(&mut self, structure_type: StructureType, level: u8, delta: i64) {
        let entry = self.counters.entry(structure_type).or_default();
        let level = level as usize;
        entry.added[level] = (entry.added[level] as i64 + delta).max(0) as u32;
        for cumulative in entry.cumulative.iter_mut().skip(level) {
            *cumulative = (*cumulative as i64 + delta).max(0) as u32;
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{structure:?} quota exceeded at level {level} by {overflow}")]
pub struct QuotaExceeded {
    pub structure: StructureType,
    pub level: u8,
    /// Cumulative count minus cap at the offending level.
    pub overflow: i32,
}

/// Result of a greedy fill-by-level allocation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FillOutcome {
    pub placed: Vec<(Location, u8)>,
    pub unplaced: Vec<Location>,
}

impl FillOutcome {
    pub fn placed_locations(&self) -> Vec<Location> {
        self.placed.iter().map(|(loc, _)| *loc).collect()
    }
}

impl WeightedGrid {
    pub fn quotas(&self) -> &QuotaTable {
        &self.quotas
    }

    pub fn added(&self, structure_type: StructureType, level: u8) -> u32 {
        self.registry.counters(structure_type).added.get(level as usize).copied().unwrap_or(0)
    }

    pub fn cumulative(&self, structure_type: StructureType, level: u8) -> u32 {
        self.registry
            .counters(structure_type)
            .cumulative
            .get(level as usize)
            .copied()
            .unwrap_or(0)
    }

    pub fn cap(&self, structure_type: StructureType, level: u8) -> u32 {
        self.quotas.cap(structure_type, level)
    }

    /// Remaining allowance at a level; negative if the table was tightened after placement.
    pub fn headroom(&self, structure_type: StructureType, level: u8) -> i64 {
        self.cap(structure_type, level) as i64 - self.cumulative(structure_type, level) as i64
    }

    /// Tiles from `coords` that can take `variant`, deduplicated in input order.
    fn eligible_tiles(&self, variant: StructureVariant, coords: &[Location]) -> Vec<Location> {
        let kind = variant.kind();
        let mut seen = FnvHashSet::default();

        coords
            .iter()
            .copied()
            .filter(|loc| seen.insert(*loc))
            .filter(|loc| !self.has_structure(*loc, kind))
            .filter(|loc| {
                if self.is_passable(*loc) {
                    return true;
                }
                match kind {
                    StructureType::Road | StructureType::Rampart => true,
                    StructureType::Extractor => self.object_at(*loc) == Some(RoomObjectKind::Mineral),
                    _ => false,
                }
            })
            .collect()
    }

    /// Place `variant` on every eligible tile of `coords` at `level`.
    ///
    /// Tiles that are impassable (or already hold the same type) are skipped.
    /// If the batch would push the cumulative count past the cap at any level
    /// from `level` to 8, nothing is placed. Returns the number of tiles placed.
    pub fn add_structure(
        &mut self,
        variant: StructureVariant,
        level: u8,
        priority: BuildPriority,
        coords: &[Location],
    ) -> Result<usize, QuotaExceeded> {
        let kind = variant.kind();
        let tiles = self.eligible_tiles(variant, coords);
        if tiles.is_empty() {
            return Ok(0);
        }

        let count = tiles.len() as u32;
        if level > MAX_LEVEL {
            return Err(QuotaExceeded {
                structure: kind,
                level,
                overflow: count as i32,
            });
        }

        for check_level in level..=MAX_LEVEL {
            let total = self.cumulative(kind, check_level) + count;
            let cap = self.cap(kind, check_level);
            if total > cap {
                trace!(
                    "Rejected {} x{} at level {}: {} > {} at level {}",
                    variant.name(),
                    count,
                    level,
                    total,
                    cap,
                    check_level
                );
                return Err(QuotaExceeded {
                    structure: kind,
                    level: check_level,
                    overflow: total as i32 - cap as i32,
                });
            }
        }

        for loc in &tiles {
            let cell = &mut self.cells[loc.index()];
            cell.structures.push(StructurePlacement {
                location: *loc,
                variant,
                level,
                priority,
            });
            cell.recompute_cost();
        }
        self.registry.apply(kind, level, count as i64);

        Ok(tiles.len())
    }

    /// Remove every structure of `structure_type` at `coords`, restoring counters and costs.
    pub fn remove_structure(&mut self, structure_type: StructureType, coords: &[Location]) -> usize {
        let unique: FnvHashSet<Location> = coords.iter().copied().collect();
        let mut removed = 0;

        for loc in unique {
            let cell = &mut self.cells[loc.index()];
            let mut levels = Vec::new();
            cell.structures.retain(|s| {
                if s.kind() == structure_type {
                    levels.push(s.level);
                    false
                } else {
                    true
                }
            });
            if levels.is_empty() {
                continue;
            }
            cell.recompute_cost();
            for level in levels {
                self.registry.apply(structure_type, level, -1);
                removed += 1;
            }
        }

        removed
    }

    /// Place each tile at the lowest level the quota allows, raising the level
    /// whenever a tile is rejected. Tiles left once level 8 is exhausted, or
    /// that cannot take the structure at all, are returned as unplaced.
    pub fn add_structure_by_filling_level<F>(
        &mut self,
        variant: StructureVariant,
        priority: F,
        coords: &[Location],
    ) -> FillOutcome
    where
        F: Fn(u8, usize) -> BuildPriority,
    {
        let mut outcome = FillOutcome::default();
        let mut level = 0u8;

        for (index, loc) in coords.iter().enumerate() {
            loop {
                if level > MAX_LEVEL {
                    outcome.unplaced.push(*loc);
                    break;
                }
                match self.add_structure(variant, level, priority(level, index), &[*loc]) {
                    Ok(0) => {
                        outcome.unplaced.push(*loc);
                        break;
                    }
                    Ok(_) => {
                        outcome.placed.push((*loc, level));
                        break;
                    }
                    Err(_) => level += 1,
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::test_support::*;
    use std::sync::Arc;

    fn row(y: u8, xs: std::ops::Range<u8>) -> Vec<Location> {
        xs.map(|x| Location::from_xy(x, y)).collect()
    }

    #[test]
    fn add_then_remove_restores_cost_and_counters() {
        let mut grid = open_grid();
        let tiles = row(20, 10..15);

        let placed = grid
            .add_structure(StructureVariant::Extension, 3, BuildPriority::Medium, &tiles)
            .unwrap();
        assert_eq!(placed, 5);
        assert!(tiles.iter().all(|l| grid.cost(*l) == IMPASSABLE_COST));
        assert_eq!(grid.cumulative(StructureType::Extension, 8), 5);
        assert_eq!(grid.cumulative(StructureType::Extension, 2), 0);

        let removed = grid.remove_structure(StructureType::Extension, &tiles);
        assert_eq!(removed, 5);
        assert!(tiles.iter().all(|l| grid.cost(*l) == PLAIN_COST));
        assert_eq!(grid.registry.counters(StructureType::Extension), QuotaCounters::default());
    }

    #[test]
    fn roads_lower_cost_and_containers_do_not_block() {
        let mut grid = open_grid();
        let road = Location::from_xy(5, 5);
        let container = Location::from_xy(6, 5);

        grid.add_structure(StructureVariant::BaseRoad, 1, BuildPriority::Low, &[road]).unwrap();
        grid.add_structure(StructureVariant::SourceContainer, 2, BuildPriority::High, &[container])
            .unwrap();

        assert_eq!(grid.cost(road), ROAD_COST);
        assert_eq!(grid.cost(container), PLAIN_COST);

        grid.add_structure(StructureVariant::Rampart, 5, BuildPriority::Low, &[road]).unwrap();
        assert_eq!(grid.cost(road), ROAD_COST, "rampart keeps the road cost");
    }

    #[test]
    fn over_quota_batch_is_rejected_atomically() {
        let mut grid = open_grid();
        let tiles = row(10, 10..17);

        let err = grid
            .add_structure(StructureVariant::Tower, 7, BuildPriority::High, &tiles)
            .unwrap_err();
        assert_eq!(err.structure, StructureType::Tower);
        assert_eq!(err.level, 7);
        assert_eq!(err.overflow, 4);
        assert_eq!(grid.cumulative(StructureType::Tower, 8), 0);
        assert!(tiles.iter().all(|l| grid.is_passable(*l)));
    }

    #[test]
    fn impassable_tiles_are_skipped() {
        let mut grid = open_grid();
        let loc = Location::from_xy(12, 12);
        grid.add_structure(StructureVariant::Extension, 2, BuildPriority::Medium, &[loc]).unwrap();

        let placed = grid
            .add_structure(StructureVariant::Lab, 8, BuildPriority::Medium, &[loc, loc])
            .unwrap();
        assert_eq!(placed, 0);
        assert_eq!(grid.cumulative(StructureType::Lab, 8), 0);
    }

    #[test]
    fn fill_by_level_respects_caps() {
        let quotas = QuotaTable::empty().with_cap(StructureType::Extension, [0, 1, 2, 5, 5, 5, 5, 5, 5]);
        let terrain = terrain_from(|_, _| '0');
        let mut grid = WeightedGrid::with_quotas(&terrain, &[], Arc::new(quotas));
        let tiles = row(25, 10..18);

        let outcome = grid.add_structure_by_filling_level(
            StructureVariant::Extension,
            |_, _| BuildPriority::Medium,
            &tiles,
        );

        assert_eq!(outcome.placed.len(), 5);
        assert_eq!(outcome.unplaced.len(), 3);
        let levels: Vec<u8> = outcome.placed.iter().map(|(_, level)| *level).collect();
        assert_eq!(levels, vec![1, 2, 3, 3, 3]);
        for level in 0..=MAX_LEVEL {
            assert!(
                grid.cumulative(StructureType::Extension, level) <= grid.cap(StructureType::Extension, level),
                "cap exceeded at level {}",
                level
            );
        }
    }
}
