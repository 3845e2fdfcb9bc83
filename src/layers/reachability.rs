//! ReachabilityLayer: Final connectivity checks on a fortified candidate.
//!
//! The first spawn, the controller container and link, and every upgrader
//! tile must lie in one protected area, so the controller stays supplied
//! while under siege. Every structure that is not a road or a fortification
//! must also be reachable from the center: either its own tile can be walked
//! onto (containers) or a walkable neighbor can.

use crate::constants::IMPASSABLE_COST;
use crate::error::LayoutError;
use crate::grid::WeightedGrid;
use crate::layer::*;
use crate::location::*;
use crate::protected::ProtectedAreas;
use crate::structure::is_walkable;
use crate::terrain::*;
use log::*;

use screeps::constants::StructureType;

pub struct ReachabilityLayer;

fn is_walkable_tile(grid: &WeightedGrid, loc: Location) -> bool {
    let cell = grid.cell(loc);
    cell.base_cost() < IMPASSABLE_COST && cell.structures().iter().all(|s| is_walkable(s.kind()))
}

fn check_protected(candidate: &Candidate) -> Result<(), LayoutError> {
    let mut members = vec![candidate.origin];
    members.extend(candidate.get_landmark("controller_container"));
    members.extend(candidate.get_landmark("controller_link"));
    members.extend(candidate.upgraders.iter().copied());

    let areas = ProtectedAreas::analyze(&candidate.grid);
    if !areas.is_in_same_protected_area(&members) {
        debug!(
            "Origin {:?}: spawn and controller split across {} groups",
            candidate.origin,
            areas.group_count()
        );
        return Err(LayoutError::DisconnectedProtectedArea);
    }
    Ok(())
}

fn check_access(candidate: &Candidate, center: Location) -> Result<(), LayoutError> {
    let grid = &candidate.grid;
    let (reached, _) =
        flood_fill_distance_with_obstacles(&[center], |x, y| is_walkable_tile(grid, Location::from_xy(x, y)));

    let unreachable = grid
        .placements()
        .filter(|p| !p.variant.is_road() && !matches!(p.kind(), StructureType::Rampart | StructureType::Wall))
        .map(|p| p.location)
        .find(|loc| {
            reached.at(*loc).is_none()
                && NEIGHBORS_8.iter().all(|&(dx, dy)| {
                    loc.checked_add(dx as i16, dy as i16)
                        .map(|n| reached.at(n).is_none())
                        .unwrap_or(true)
                })
        });

    match unreachable {
        Some(loc) => Err(LayoutError::UnreachableStructure(loc)),
        None => Ok(()),
    }
}

impl LayoutLayer for ReachabilityLayer {
    fn name(&self) -> &str {
        "reachability"
    }

    fn phase(&self) -> CandidatePhase {
        CandidatePhase::ConnectivityValidation
    }

    fn apply(&self, candidate: &mut Candidate, _room: &RoomContext) -> Result<(), LayoutError> {
        let center = candidate.require_landmark("center")?;
        check_protected(candidate)?;
        check_access(candidate, center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::test_support::*;
    use crate::plan::BuildPriority;
    use crate::structure::StructureVariant;

    #[test]
    fn full_stack_passes() {
        let (candidate, room) = full_stack();
        assert!(ReachabilityLayer.is_applicable(&candidate, &room));
        assert!(candidate.get_landmark("controller_link").is_some());
    }

    #[test]
    fn unfortified_base_is_rejected() {
        let (candidate, _) = through_extensions();
        assert_eq!(check_protected(&candidate), Err(LayoutError::DisconnectedProtectedArea));
    }

    #[test]
    fn buildings_splitting_the_base_are_rejected() {
        let (grid, _) = flat_room();
        let mut candidate = Candidate::new(Location::from_xy(15, 20), grid);
        let bounds = Rect::new(10, 10, 30, 30);
        let ring: Vec<Location> = bounds.locations().filter(|l| bounds.is_on_border(*l)).collect();
        candidate
            .grid
            .add_structure(StructureVariant::Rampart, 5, BuildPriority::Low, &ring)
            .unwrap();
        candidate.set_landmark("controller_container", Location::from_xy(24, 24));
        assert_eq!(check_protected(&candidate), Ok(()));

        let divider: Vec<Location> = (11..30).map(|y| Location::from_xy(20, y)).collect();
        candidate
            .grid
            .add_structure(StructureVariant::Extension, 8, BuildPriority::Medium, &divider)
            .unwrap();
        assert_eq!(check_protected(&candidate), Err(LayoutError::DisconnectedProtectedArea));
    }

    #[test]
    fn boxed_in_structure_is_rejected() {
        let (grid, _) = flat_room();
        let center = Location::from_xy(18, 18);
        let mut candidate = Candidate::new(center, grid);

        let target = Location::from_xy(40, 20);
        let ring: Vec<Location> = NEIGHBORS_8
            .iter()
            .filter_map(|&(dx, dy)| target.checked_add(dx as i16, dy as i16))
            .collect();
        candidate
            .grid
            .add_structure(StructureVariant::Wall, 5, BuildPriority::Low, &ring)
            .unwrap();
        assert!(check_access(&candidate, center).is_ok());

        candidate
            .grid
            .add_structure(StructureVariant::Storage, 4, BuildPriority::High, &[target])
            .unwrap();
        assert_eq!(
            check_access(&candidate, center),
            Err(LayoutError::UnreachableStructure(target))
        );
    }
}
