//! ExtensionLayer: Reserves free space, then fills the remaining building
//! slots with extensions.
//!
//! The reserve is drawn from the free-space pool and from any building slots
//! beyond the extension target, nearest to storage first. Extensions then
//! take the building slots in expansion order; their levels come from the
//! quota table (5 at level 2 up to 60 at level 8).

use crate::error::LayoutError;
use crate::grid::sort_by_distance;
use crate::layer::*;
use crate::location::*;
use crate::structure::StructureVariant;
use itertools::Itertools;
use log::*;

pub struct ExtensionLayer;

fn reserve_free_space(candidate: &Candidate, room: &RoomContext, storage: Location) -> Vec<Location> {
    let target = room.config.extension_target;
    let building = candidate.space.building.as_slice();
    let beyond_target = building.get(target..).unwrap_or(&[]);

    let mut reserve: Vec<Location> = candidate
        .space
        .free_pool
        .iter()
        .copied()
        .filter(|l| candidate.is_free(*l))
        .chain(beyond_target.iter().copied().filter(|l| candidate.grid.is_passable(*l)))
        .unique()
        .collect();

    sort_by_distance(storage, &mut reserve);
    reserve.truncate(room.config.free_space_count);
    reserve
}

impl LayoutLayer for ExtensionLayer {
    fn name(&self) -> &str {
        "extension"
    }

    fn phase(&self) -> CandidatePhase {
        CandidatePhase::SecondaryAssignment
    }

    fn apply(&self, candidate: &mut Candidate, room: &RoomContext) -> Result<(), LayoutError> {
        let config = &room.config;
        let storage = candidate.require_landmark("storage")?;

        let reserve = reserve_free_space(candidate, room, storage);
        if reserve.len() < config.free_space_min {
            return Err(LayoutError::InsufficientFreeSpace {
                found: reserve.len(),
                required: config.free_space_min,
            });
        }
        for loc in &reserve {
            candidate.space.building.remove(*loc);
        }
        candidate.space.free_pool.retain(|l| !reserve.contains(l));
        candidate.free_space = reserve;

        let slots: Vec<Location> = candidate
            .space
            .building
            .iter()
            .filter(|l| candidate.grid.is_passable(*l))
            .take(config.extension_target)
            .collect();

        let outcome = candidate.fill(StructureVariant::Extension, &slots);
        if outcome.placed.len() < config.extension_min {
            return Err(LayoutError::InsufficientExtensions {
                found: outcome.placed.len(),
                required: config.extension_min,
            });
        }

        for (loc, _) in &outcome.placed {
            candidate.space.building.remove(*loc);
            candidate.add_to_landmark_set("extensions", *loc);
        }

        trace!(
            "Origin {:?}: {} extensions, {} free tiles",
            candidate.origin,
            outcome.placed.len(),
            candidate.free_space.len()
        );

        Ok(())
    }
}
