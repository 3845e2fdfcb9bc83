use crate::grid::WeightedGrid;
use crate::location::*;
use crate::structure::*;
use crate::visual::*;
use fnv::FnvHashMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use screeps::constants::StructureType;

/// Build priority for construction ordering.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Ord, PartialOrd, Serialize, Deserialize)]
pub enum BuildPriority {
    VeryLow = 0,
    Low = 1,
    Medium = 2,
    High = 3,
    Critical = 4,
}

/// A single step in the build order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStep {
    pub structure_type: StructureType,
    pub location: Location,
    pub required_rcl: u8,
    pub priority: BuildPriority,
}

/// A single structure placement in the finished layout.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutStructure {
    #[serde(rename = "s")]
    pub structure_type: StructureType,
    #[serde(rename = "v")]
    pub variant: StructureVariant,
    #[serde(rename = "l")]
    pub location: Location,
    #[serde(rename = "r")]
    pub required_rcl: u8,
    #[serde(rename = "p")]
    pub priority: BuildPriority,
}

impl From<&StructurePlacement> for LayoutStructure {
    fn from(p: &StructurePlacement) -> Self {
        LayoutStructure {
            structure_type: p.kind(),
            variant: p.variant,
            location: p.location,
            required_rcl: p.level,
            priority: p.priority,
        }
    }
}

/// Sub-scores of a committed layout. Lower totals are better.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutScore {
    pub total: f32,
    pub ramparts: usize,
    pub walls: usize,
    pub upgraders: usize,
    pub path_cost: u32,
}

/// The complete base layout for one room.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoomLayout {
    /// Every placement, row-major by tile.
    pub structures: Vec<LayoutStructure>,
    /// The hub tile between storage, terminal, factory and the center link.
    pub center: Location,
    pub first_spawn: Location,
    /// Tiles kept clear for future use.
    pub free_space: Vec<Location>,
    /// Tiles reserved for upgraders standing next to the controller link.
    pub upgraders: Vec<Location>,
    pub score: LayoutScore,
}

impl RoomLayout {
    /// Snapshot the structures of a finished grid.
    pub fn from_grid(
        grid: &WeightedGrid,
        center: Location,
        first_spawn: Location,
        free_space: Vec<Location>,
        upgraders: Vec<Location>,
        score: LayoutScore,
    ) -> Self {
        RoomLayout {
            structures: grid.placements().map(LayoutStructure::from).collect(),
            center,
            first_spawn,
            free_space,
            upgraders,
            score,
        }
    }

    /// Render the layout using a visualizer.
    pub fn visualize<V: RoomVisualizer>(&self, visualizer: &mut V) {
        for item in &self.structures {
            visualizer.render(item.location, item.variant);
        }
    }

    /// Get all locations of a specific structure type.
    pub fn get_locations(&self, structure_type: StructureType) -> Vec<Location> {
        self.structures
            .iter()
            .filter(|s| s.structure_type == structure_type)
            .map(|s| s.location)
            .unique()
            .collect()
    }

    pub fn count(&self, structure_type: StructureType) -> usize {
        self.structures
            .iter()
            .filter(|s| s.structure_type == structure_type)
            .count()
    }

    /// Placements grouped by role, as locations.
    pub fn by_variant(&self) -> FnvHashMap<StructureVariant, Vec<Location>> {
        let mut grouped: FnvHashMap<StructureVariant, Vec<Location>> = FnvHashMap::default();
        for item in &self.structures {
            grouped.entry(item.variant).or_default().push(item.location);
        }
        grouped
    }

    /// Construction sequence: by required level, then most urgent first.
    pub fn build_order(&self) -> Vec<BuildStep> {
        self.structures
            .iter()
            .sorted_by(|a, b| {
                a.required_rcl
                    .cmp(&b.required_rcl)
                    .then_with(|| b.priority.cmp(&a.priority))
            })
            .map(|s| BuildStep {
                structure_type: s.structure_type,
                location: s.location,
                required_rcl: s.required_rcl,
                priority: s.priority,
            })
            .collect()
    }

    /// Check if the layout has all mandatory structures for RCL 8.
    pub fn is_complete(&self) -> bool {
        self.count(StructureType::Spawn) >= 3
            && self.count(StructureType::Extension) >= 55
            && self.count(StructureType::Storage) >= 1
            && self.count(StructureType::Terminal) >= 1
            && self.count(StructureType::Lab) >= 10
            && self.count(StructureType::Factory) >= 1
            && self.count(StructureType::Observer) >= 1
            && self.count(StructureType::PowerSpawn) >= 1
            && self.count(StructureType::Nuker) >= 1
            && self.count(StructureType::Tower) >= 6
    }
}

/// Get the build priority for a structure type at a given RCL.
pub fn get_build_priority(structure_type: StructureType, rcl: u8) -> BuildPriority {
    match structure_type {
        StructureType::Spawn => BuildPriority::Critical,
        StructureType::Extension => {
            if rcl <= 2 {
                BuildPriority::Critical
            } else {
                BuildPriority::Medium
            }
        }
        StructureType::Storage => BuildPriority::Critical,
        StructureType::Container => BuildPriority::High,
        StructureType::Tower => BuildPriority::Critical,
        StructureType::Terminal => BuildPriority::High,
        StructureType::Link => BuildPriority::High,
        StructureType::Lab => BuildPriority::Medium,
        StructureType::Extractor => BuildPriority::Medium,
        StructureType::Factory => BuildPriority::Medium,
        StructureType::Observer => BuildPriority::Low,
        StructureType::PowerSpawn => BuildPriority::Medium,
        StructureType::Nuker => BuildPriority::Low,
        StructureType::Wall => BuildPriority::Low,
        StructureType::Rampart => BuildPriority::Low,
        StructureType::Road => BuildPriority::VeryLow,
        _ => BuildPriority::Medium,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(variant: StructureVariant, x: u8, y: u8, rcl: u8) -> LayoutStructure {
        LayoutStructure {
            structure_type: variant.kind(),
            variant,
            location: Location::from_xy(x, y),
            required_rcl: rcl,
            priority: get_build_priority(variant.kind(), rcl),
        }
    }

    #[test]
    fn build_order_sorts_by_level_then_priority() {
        let layout = RoomLayout {
            structures: vec![
                item(StructureVariant::BaseRoad, 10, 10, 1),
                item(StructureVariant::Storage, 11, 11, 4),
                item(StructureVariant::Spawn, 12, 12, 1),
                item(StructureVariant::Extension, 13, 13, 2),
            ],
            center: Location::from_xy(11, 10),
            first_spawn: Location::from_xy(12, 12),
            free_space: Vec::new(),
            upgraders: Vec::new(),
            score: LayoutScore::default(),
        };

        let order: Vec<StructureType> = layout.build_order().iter().map(|s| s.structure_type).collect();
        assert_eq!(
            order,
            vec![
                StructureType::Spawn,
                StructureType::Road,
                StructureType::Extension,
                StructureType::Storage
            ]
        );
        assert_eq!(layout.by_variant()[&StructureVariant::Storage], vec![Location::from_xy(11, 11)]);
        assert!(!layout.is_complete());
    }
}
