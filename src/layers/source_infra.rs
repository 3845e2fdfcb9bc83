//! SourceInfraLayer: Roads, containers and links for every source.
//!
//! Each source is reached by a path from the center that stays off the
//! unassigned building slots and the free-space reserve. The last tile of the
//! path holds the container; the empty tile next to it that is closest to the
//! center holds the link.

use super::path_from_center;
use crate::error::LayoutError;
use crate::grid::*;
use crate::layer::*;
use crate::location::*;
use crate::structure::StructureVariant;
use log::*;

const ROAD_LEVEL: u8 = 2;
const CONTAINER_LEVEL: u8 = 1;
const FIRST_LINK_LEVEL: u8 = 6;
const LINK_LEVEL: u8 = 7;

pub struct SourceInfraLayer;

fn link_site(candidate: &Candidate, container: Location, path: &[Location], center: Location) -> Option<Location> {
    candidate
        .grid
        .square_pos(container, 1, PositionOptions::default())
        .into_iter()
        .filter(|l| candidate.is_free(*l) && !path.contains(l))
        .min_by_key(|l| l.distance_to(center))
}

impl LayoutLayer for SourceInfraLayer {
    fn name(&self) -> &str {
        "source_infra"
    }

    fn phase(&self) -> CandidatePhase {
        CandidatePhase::NetworkConnections
    }

    fn apply(&self, candidate: &mut Candidate, room: &RoomContext) -> Result<(), LayoutError> {
        let center = candidate.require_landmark("center")?;

        for (index, &source) in room.sources.iter().enumerate() {
            let result = path_from_center(candidate, room, source, 1, &[])?;
            let Some((&container, roads)) = result.path.get(1..).and_then(|p| p.split_last()) else {
                return Err(LayoutError::PathNotFound(source));
            };

            candidate.place(StructureVariant::SourceRoad, ROAD_LEVEL, roads)?;
            candidate.place(StructureVariant::SourceContainer, CONTAINER_LEVEL, &[container])?;
            candidate.add_to_landmark_set("source_containers", container);
            candidate.push_score("path_cost", result.cost as f32, room.config.terrain_penalty_weight);

            let level = if index == 0 { FIRST_LINK_LEVEL } else { LINK_LEVEL };
            match link_site(candidate, container, &result.path, center) {
                Some(link) => {
                    candidate.place(StructureVariant::SourceLink, level, &[link])?;
                    candidate.add_to_landmark_set("source_links", link);
                }
                None => debug!("Origin {:?}: no link site next to source {:?}", candidate.origin, source),
            }

            trace!(
                "Origin {:?}: source {:?} reached in {} tiles, cost {}",
                candidate.origin,
                source,
                result.path.len(),
                result.cost
            );
        }

        Ok(())
    }
}
