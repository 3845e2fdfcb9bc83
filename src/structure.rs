//! Structure roles used by the layout.
//!
//! Several roles share one game structure type (a container next to a source
//! and one next to the controller are both `StructureType::Container`). The
//! planner tracks the role so later stages and the output can tell them apart;
//! quotas and tile costs are always driven by the canonical type.

use crate::location::*;
use crate::plan::BuildPriority;
use serde::{Deserialize, Serialize};

use screeps::constants::StructureType;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StructureVariant {
    Spawn,
    Extension,
    Storage,
    Terminal,
    Factory,
    Tower,
    Lab,
    Observer,
    PowerSpawn,
    Nuker,
    Extractor,
    SourceContainer,
    ControllerContainer,
    MineralContainer,
    SourceLink,
    ControllerLink,
    CenterLink,
    BaseRoad,
    SourceRoad,
    ControllerRoad,
    MineralRoad,
    ExitRoad,
    Rampart,
    Wall,
}

impl StructureVariant {
    pub const ALL: [StructureVariant; 24] = [
        StructureVariant::Spawn,
        StructureVariant::Extension,
        StructureVariant::Storage,
        StructureVariant::Terminal,
        StructureVariant::Factory,
        StructureVariant::Tower,
        StructureVariant::Lab,
        StructureVariant::Observer,
        StructureVariant::PowerSpawn,
        StructureVariant::Nuker,
        StructureVariant::Extractor,
        StructureVariant::SourceContainer,
        StructureVariant::ControllerContainer,
        StructureVariant::MineralContainer,
        StructureVariant::SourceLink,
        StructureVariant::ControllerLink,
        StructureVariant::CenterLink,
        StructureVariant::BaseRoad,
        StructureVariant::SourceRoad,
        StructureVariant::ControllerRoad,
        StructureVariant::MineralRoad,
        StructureVariant::ExitRoad,
        StructureVariant::Rampart,
        StructureVariant::Wall,
    ];

    /// The game structure type this role is built as.
    pub fn kind(self) -> StructureType {
        match self {
            StructureVariant::Spawn => StructureType::Spawn,
            StructureVariant::Extension => StructureType::Extension,
            StructureVariant::Storage => StructureType::Storage,
            StructureVariant::Terminal => StructureType::Terminal,
            StructureVariant::Factory => StructureType::Factory,
            StructureVariant::Tower => StructureType::Tower,
            StructureVariant::Lab => StructureType::Lab,
            StructureVariant::Observer => StructureType::Observer,
            StructureVariant::PowerSpawn => StructureType::PowerSpawn,
            StructureVariant::Nuker => StructureType::Nuker,
            StructureVariant::Extractor => StructureType::Extractor,
            StructureVariant::SourceContainer
            | StructureVariant::ControllerContainer
            | StructureVariant::MineralContainer => StructureType::Container,
            StructureVariant::SourceLink
            | StructureVariant::ControllerLink
            | StructureVariant::CenterLink => StructureType::Link,
            StructureVariant::BaseRoad
            | StructureVariant::SourceRoad
            | StructureVariant::ControllerRoad
            | StructureVariant::MineralRoad
            | StructureVariant::ExitRoad => StructureType::Road,
            StructureVariant::Rampart => StructureType::Rampart,
            StructureVariant::Wall => StructureType::Wall,
        }
    }

    pub fn is_road(self) -> bool {
        self.kind() == StructureType::Road
    }

    /// Roles that belong to resource harvesting rather than the base core.
    pub fn is_resource_infrastructure(self) -> bool {
        matches!(
            self,
            StructureVariant::SourceContainer
                | StructureVariant::SourceLink
                | StructureVariant::MineralContainer
                | StructureVariant::Extractor
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            StructureVariant::Spawn => "spawn",
            StructureVariant::Extension => "extension",
            StructureVariant::Storage => "storage",
            StructureVariant::Terminal => "terminal",
            StructureVariant::Factory => "factory",
            StructureVariant::Tower => "tower",
            StructureVariant::Lab => "lab",
            StructureVariant::Observer => "observer",
            StructureVariant::PowerSpawn => "powerSpawn",
            StructureVariant::Nuker => "nuker",
            StructureVariant::Extractor => "extractor",
            StructureVariant::SourceContainer => "sourceContainer",
            StructureVariant::ControllerContainer => "controllerContainer",
            StructureVariant::MineralContainer => "mineralContainer",
            StructureVariant::SourceLink => "sourceLink",
            StructureVariant::ControllerLink => "controllerLink",
            StructureVariant::CenterLink => "centerLink",
            StructureVariant::BaseRoad => "baseRoad",
            StructureVariant::SourceRoad => "sourceRoad",
            StructureVariant::ControllerRoad => "controllerRoad",
            StructureVariant::MineralRoad => "mineralRoad",
            StructureVariant::ExitRoad => "exitRoad",
            StructureVariant::Rampart => "rampart",
            StructureVariant::Wall => "wall",
        }
    }
}

/// True if creeps can stand on a tile holding this structure type.
pub fn is_walkable(structure_type: StructureType) -> bool {
    matches!(
        structure_type,
        StructureType::Road | StructureType::Container | StructureType::Rampart
    )
}

/// A single structure committed to a grid.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct StructurePlacement {
    pub location: Location,
    pub variant: StructureVariant,
    pub level: u8,
    pub priority: BuildPriority,
}

impl StructurePlacement {
    pub fn kind(&self) -> StructureType {
        self.variant.kind()
    }
}
