//! CenterLayer: Picks the hub tile and builds the storage cluster around it.
//!
//! The hub is a tile whose four diagonals are building slots and whose four
//! orthogonal neighbors are road slots. Storage, center link, terminal and
//! factory take the diagonals, nearest to the first spawn first; the hub
//! itself becomes a road slot so haulers can stand between them.

use super::offsets;
use crate::error::LayoutError;
use crate::grid::sort_by_distance;
use crate::layer::*;
use crate::location::*;
use crate::structure::StructureVariant;
use crate::terrain::*;
use log::*;

const CLUSTER: [(StructureVariant, u8, &str); 4] = [
    (StructureVariant::Storage, 4, "storage"),
    (StructureVariant::CenterLink, 5, "center_link"),
    (StructureVariant::Terminal, 6, "terminal"),
    (StructureVariant::Factory, 7, "factory"),
];

pub struct CenterLayer;

fn is_hub(candidate: &Candidate, tile: Location) -> bool {
    if !tile.in_build_range() || !candidate.grid.is_passable(tile) {
        return false;
    }
    let diagonals = offsets(tile, &NEIGHBORS_DIAGONAL);
    let orthogonals = offsets(tile, &NEIGHBORS_4);

    diagonals.len() == 4
        && orthogonals.len() == 4
        && diagonals.iter().all(|d| candidate.space.building.contains(*d))
        && orthogonals.iter().all(|o| candidate.space.road.contains(*o))
}

/// First hub found scanning building slots in expansion order.
fn find_hub(candidate: &Candidate) -> Option<Location> {
    candidate.space.building.iter().find_map(|slot| {
        offsets(slot, &NEIGHBORS_DIAGONAL)
            .into_iter()
            .find(|tile| is_hub(candidate, *tile))
    })
}

impl LayoutLayer for CenterLayer {
    fn name(&self) -> &str {
        "center"
    }

    fn phase(&self) -> CandidatePhase {
        CandidatePhase::CenterPlacement
    }

    fn apply(&self, candidate: &mut Candidate, _room: &RoomContext) -> Result<(), LayoutError> {
        let hub = find_hub(candidate).ok_or(LayoutError::NoCenterFound)?;

        let mut diagonals = offsets(hub, &NEIGHBORS_DIAGONAL);
        sort_by_distance(candidate.origin, &mut diagonals);

        for (&(variant, level, name), &tile) in CLUSTER.iter().zip(diagonals.iter()) {
            candidate.place(variant, level, &[tile])?;
            candidate.space.building.remove(tile);
            candidate.set_landmark(name, tile);
        }

        candidate.space.building.remove(hub);
        candidate.space.road.insert(hub);
        candidate.set_landmark("center", hub);

        trace!("Origin {:?}: center at {:?}", candidate.origin, hub);

        Ok(())
    }
}
