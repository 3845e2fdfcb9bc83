//! CoreLayer: Observer, power spawn, nuker and the two late spawns.
//! Each takes the first building slot left in expansion order.

use crate::error::LayoutError;
use crate::layer::*;
use crate::structure::StructureVariant;
use log::*;

const CORE: [(StructureVariant, u8); 5] = [
    (StructureVariant::Observer, 8),
    (StructureVariant::PowerSpawn, 8),
    (StructureVariant::Nuker, 8),
    (StructureVariant::Spawn, 7),
    (StructureVariant::Spawn, 8),
];

pub struct CoreLayer;

impl LayoutLayer for CoreLayer {
    fn name(&self) -> &str {
        "core"
    }

    fn phase(&self) -> CandidatePhase {
        CandidatePhase::CoreAssignment
    }

    fn apply(&self, candidate: &mut Candidate, _room: &RoomContext) -> Result<(), LayoutError> {
        for (variant, level) in CORE {
            let slot = candidate
                .space
                .building
                .iter()
                .find(|loc| candidate.grid.is_passable(*loc))
                .ok_or(LayoutError::InsufficientCoreSlots(variant))?;

            if candidate.place(variant, level, &[slot])? == 0 {
                return Err(LayoutError::InsufficientCoreSlots(variant));
            }
            candidate.space.building.remove(slot);

            if variant == StructureVariant::Spawn {
                candidate.add_to_landmark_set("spawns", slot);
            } else {
                candidate.set_landmark(variant.name(), slot);
            }

            trace!("Origin {:?}: {} at {:?}", candidate.origin, variant.name(), slot);
        }

        Ok(())
    }
}
