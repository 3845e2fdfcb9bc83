//! LabLayer: Ten labs in a 4x4 block around two diagonal road cores.
//!
//! ```text
//!   R L L .
//!   L R L L
//!   L L R L
//!   . L L R
//! ```
//!
//! Every lab is within range 2 of both cores, so reactions can run from
//! either one. The block must sit entirely on unassigned slots with its
//! diagonal on road slots; the match whose first core is closest to storage
//! wins.

use crate::error::LayoutError;
use crate::grid::*;
use crate::layer::*;
use crate::location::*;
use crate::structure::StructureVariant;
use fnv::FnvHashSet;
use log::*;

/// Cores, then the two corner roads, then the labs.
const LAB_PATTERN: [(i8, i8); 14] = [
    (0, 0),
    (1, 1),
    (-1, -1),
    (2, 2),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (2, 0),
    (-1, 1),
    (0, 1),
    (2, 1),
    (0, 2),
    (1, 2),
];

const ROAD_TILES: usize = 4;

pub struct LabLayer;

impl LayoutLayer for LabLayer {
    fn name(&self) -> &str {
        "lab"
    }

    fn phase(&self) -> CandidatePhase {
        CandidatePhase::LabAssignment
    }

    fn apply(&self, candidate: &mut Candidate, _room: &RoomContext) -> Result<(), LayoutError> {
        let center = candidate.require_landmark("center")?;
        let storage = candidate.require_landmark("storage")?;

        let available: FnvHashSet<Location> = candidate
            .space
            .building
            .iter()
            .chain(candidate.space.road.iter())
            .filter(|loc| *loc != center)
            .collect();

        let options = FindAreaOptions {
            rotate: true,
            flip: true,
            ignore_wall: false,
        };
        let matches = candidate
            .grid
            .find_area(&LAB_PATTERN, &[AreaConstraint::every("slots", &available)], options);

        let chosen = matches
            .into_iter()
            .filter(|m| m.coords[..ROAD_TILES].iter().all(|l| candidate.space.road.contains(*l)))
            .min_by_key(|m| m.coords[0].distance_to(storage))
            .ok_or(LayoutError::NoLabLayout)?;

        let labs = &chosen.coords[ROAD_TILES..];
        for lab in labs {
            candidate.space.building.remove(*lab);
            candidate.space.road.remove(*lab);
        }

        let outcome = candidate.fill(StructureVariant::Lab, labs);
        if !outcome.unplaced.is_empty() {
            debug!(
                "Origin {:?}: {} labs could not be placed",
                candidate.origin,
                outcome.unplaced.len()
            );
            return Err(LayoutError::NoLabLayout);
        }

        for core in &chosen.coords[..2] {
            candidate.add_to_landmark_set("lab_cores", *core);
        }
        for lab in labs {
            candidate.add_to_landmark_set("labs", *lab);
        }

        trace!("Origin {:?}: labs around {:?}", candidate.origin, chosen.coords[0]);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::test_support::*;
    use crate::layers::{CenterLayer, CoreLayer, SpawnLayer};

    use screeps::constants::StructureType;

    #[test]
    fn labs_reach_both_cores() {
        let (candidate, _) = run_layers(&[&SpawnLayer, &CenterLayer, &CoreLayer, &LabLayer]);

        let labs = candidate.get_landmark_set("labs");
        let cores = candidate.get_landmark_set("lab_cores");
        assert_eq!(labs.len(), 10);
        assert_eq!(cores.len(), 2);

        for lab in labs {
            assert!(candidate.grid.has_structure(*lab, StructureType::Lab));
            assert!(cores.iter().all(|c| c.distance_to(*lab) <= 2));
            assert!(!candidate.space.building.contains(*lab));
            assert!(!candidate.space.road.contains(*lab));
        }
        for core in cores {
            assert!(candidate.space.road.contains(*core));
        }

        let mut levels: Vec<u8> = candidate
            .grid
            .placements()
            .filter(|p| p.kind() == StructureType::Lab)
            .map(|p| p.level)
            .collect();
        levels.sort();
        assert_eq!(levels, vec![6, 6, 6, 7, 7, 7, 8, 8, 8, 8]);
    }

    #[test]
    fn no_room_for_labs() {
        let (mut candidate, room) = run_layers(&[&SpawnLayer, &CenterLayer]);
        candidate.space.road = Default::default();
        assert_eq!(LabLayer.apply(&mut candidate, &room), Err(LayoutError::NoLabLayout));
    }
}
