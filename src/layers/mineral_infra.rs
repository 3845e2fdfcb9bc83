//! MineralInfraLayer: Extractor, container and access road for the mineral.
//! Everything here waits for level 6, when extractors unlock.

use super::path_from_center;
use crate::error::LayoutError;
use crate::layer::*;
use crate::structure::StructureVariant;
use log::*;

const MINERAL_LEVEL: u8 = 6;

pub struct MineralInfraLayer;

impl LayoutLayer for MineralInfraLayer {
    fn name(&self) -> &str {
        "mineral_infra"
    }

    fn phase(&self) -> CandidatePhase {
        CandidatePhase::NetworkConnections
    }

    fn apply(&self, candidate: &mut Candidate, room: &RoomContext) -> Result<(), LayoutError> {
        for &mineral in &room.minerals {
            let result = path_from_center(candidate, room, mineral, 1, &[])?;
            let Some((&container, roads)) = result.path.get(1..).and_then(|p| p.split_last()) else {
                return Err(LayoutError::PathNotFound(mineral));
            };

            candidate.place(StructureVariant::MineralRoad, MINERAL_LEVEL, roads)?;
            candidate.place(StructureVariant::MineralContainer, MINERAL_LEVEL, &[container])?;
            candidate.place(StructureVariant::Extractor, MINERAL_LEVEL, &[mineral])?;
            candidate.set_landmark("mineral_container", container);
            candidate.push_score("path_cost", result.cost as f32, room.config.terrain_penalty_weight);

            trace!("Origin {:?}: mineral {:?} container at {:?}", candidate.origin, mineral, container);
        }

        Ok(())
    }
}
