//! SpawnLayer: Places the first spawn on the candidate origin and runs the
//! checkerboard expansion around it.
//! Rejects the candidate when the origin cannot host enough building slots.

use crate::error::LayoutError;
use crate::expansion::find_space;
use crate::layer::*;
use crate::structure::StructureVariant;
use log::*;

pub struct SpawnLayer;

impl LayoutLayer for SpawnLayer {
    fn name(&self) -> &str {
        "spawn"
    }

    fn phase(&self) -> CandidatePhase {
        CandidatePhase::CandidateEvaluation
    }

    fn apply(&self, candidate: &mut Candidate, room: &RoomContext) -> Result<(), LayoutError> {
        let origin = candidate.origin;
        let mut space = find_space(&candidate.grid, origin, &room.config.space)?;
        space.building.remove(origin);

        if candidate.place(StructureVariant::Spawn, 1, &[origin])? == 0 {
            return Err(LayoutError::InfeasibleSpace);
        }

        trace!(
            "Origin {:?}: {} building slots, {} road slots, {} free tiles",
            origin,
            space.building.len(),
            space.road.len(),
            space.free_pool.len()
        );

        candidate.space = space;
        candidate.set_landmark("first_spawn", origin);
        candidate.add_to_landmark_set("spawns", origin);

        Ok(())
    }
}
