pub mod center;
pub mod controller_infra;
pub mod core_structures;
pub mod defense;
pub mod extension;
pub mod fixed_template;
pub mod infill;
pub mod lab;
pub mod mineral_infra;
pub mod reachability;
pub mod road_network;
pub mod source_infra;
pub mod spawn;
pub mod tower;

pub use center::CenterLayer;
pub use controller_infra::ControllerInfraLayer;
pub use core_structures::CoreLayer;
pub use defense::DefenseLayer;
pub use extension::ExtensionLayer;
pub use fixed_template::{FixedTemplate, FixedTemplateLayer, TemplateEntry};
pub use infill::InfillLayer;
pub use lab::LabLayer;
pub use mineral_infra::MineralInfraLayer;
pub use reachability::ReachabilityLayer;
pub use road_network::RoadNetworkLayer;
pub use source_infra::SourceInfraLayer;
pub use spawn::SpawnLayer;
pub use tower::TowerLayer;

use crate::error::LayoutError;
use crate::grid::*;
use crate::layer::*;
use crate::location::*;

/// Build the default layer stack (13 layers).
///
/// 1. SpawnLayer -- first spawn at the origin, checkerboard expansion
/// 2. CenterLayer -- storage, terminal, factory and center link around the hub
/// 3. CoreLayer -- observer, power spawn, nuker, two more spawns
/// 4. LabLayer -- ten labs around two road cores
/// 5. InfillLayer -- fill enclosed holes, trim surplus slots
/// 6. TowerLayer -- spaced towers
/// 7. ExtensionLayer -- free-space reserve, then extensions
/// 8. RoadNetworkLayer -- every remaining road slot
/// 9. SourceInfraLayer -- roads, containers and links to each source
/// 10. MineralInfraLayer -- road, container and extractor
/// 11. ControllerInfraLayer -- link, container, upgrader tiles
/// 12. DefenseLayer -- min-cut ramparts and walls
/// 13. ReachabilityLayer -- protected-area and access validation
pub fn default_layers() -> Vec<Box<dyn LayoutLayer>> {
    vec![
        Box::new(SpawnLayer),
        Box::new(CenterLayer),
        Box::new(CoreLayer),
        Box::new(LabLayer),
        Box::new(InfillLayer),
        Box::new(TowerLayer),
        Box::new(ExtensionLayer),
        Box::new(RoadNetworkLayer),
        Box::new(SourceInfraLayer),
        Box::new(MineralInfraLayer),
        Box::new(ControllerInfraLayer),
        Box::new(DefenseLayer),
        Box::new(ReachabilityLayer),
    ]
}

/// Tiles at the given offsets from `loc` that fall inside the room.
pub(crate) fn offsets(loc: Location, deltas: &[(i8, i8)]) -> Vec<Location> {
    deltas
        .iter()
        .filter_map(|&(dx, dy)| loc.checked_add(dx as i16, dy as i16))
        .collect()
}

/// Path from the center to within `range` of `goal`. Unassigned building
/// slots, the free-space reserve and `blocked` are treated as impassable.
pub(crate) fn path_from_center(
    candidate: &Candidate,
    room: &RoomContext,
    goal: Location,
    range: u8,
    blocked: &[Location],
) -> Result<PathResult, LayoutError> {
    let center = candidate.require_landmark("center")?;
    let options = PathOptions::weighted(room.config.heuristic_weight)
        .block(candidate.space.building.iter())
        .block(candidate.free_space.iter().copied())
        .block(blocked.iter().copied());

    let result = candidate.grid.find_path(center, goal, range, &options);
    if result.incomplete || result.path.is_empty() {
        return Err(LayoutError::PathNotFound(goal));
    }
    Ok(result)
}
