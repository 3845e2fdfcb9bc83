//! DefenseLayer: Ramparts and walls on the minimum cut around the base.
//!
//! Every placed structure other than roads is wrapped in a protect rectangle,
//! padded by `structure_padding` (or `resource_padding` for harvesting
//! infrastructure); each controller gets `controller_padding`. The min-cut
//! between those rectangles and the room exits becomes the perimeter. Cut
//! tiles carrying a road, or next to the controller, become ramparts so
//! traffic can pass; the rest become walls.

use crate::constants::*;
use crate::error::LayoutError;
use crate::layer::*;
use crate::location::*;
use crate::mincut::*;
use crate::structure::StructureVariant;
use fnv::FnvHashSet;
use log::*;

use screeps::constants::StructureType;

const FORTIFICATION_LEVEL: u8 = 5;

pub struct DefenseLayer;

/// Protect rectangles in placement order, controllers last.
fn protect_rects(candidate: &Candidate, room: &RoomContext) -> Vec<Rect> {
    let config = &room.config;
    let mut seen = FnvHashSet::default();

    let structures = candidate
        .grid
        .placements()
        .filter(|p| !p.variant.is_road() && !matches!(p.kind(), StructureType::Rampart | StructureType::Wall))
        .map(|p| {
            let padding = if p.variant.is_resource_infrastructure() {
                config.resource_padding
            } else {
                config.structure_padding
            };
            Rect::around(p.location, padding, BUILD_MIN, BUILD_MAX)
        });

    let controllers = room
        .controllers
        .iter()
        .map(|c| Rect::around(*c, config.controller_padding, BUILD_MIN, BUILD_MAX));

    structures.chain(controllers).filter(|r| seen.insert(*r)).collect()
}

impl LayoutLayer for DefenseLayer {
    fn name(&self) -> &str {
        "defense"
    }

    fn phase(&self) -> CandidatePhase {
        CandidatePhase::PerimeterComputation
    }

    fn apply(&self, candidate: &mut Candidate, room: &RoomContext) -> Result<(), LayoutError> {
        let rects = protect_rects(candidate, room);
        let options = MinCutOptions {
            bounds: Rect::room(),
            prefer_closer: room.config.prefer_closer_barriers,
            prefer_closer_limit: room.config.prefer_closer_limit,
            prune_dead_ends: true,
        };
        let result = compute_perimeter(&candidate.grid, &rects, &options)?;
        let (ramparts, walls) = classify_cut(&candidate.grid, &result.cut, &room.controllers);

        candidate.place(StructureVariant::Rampart, FORTIFICATION_LEVEL, &ramparts)?;
        candidate.place(StructureVariant::Wall, FORTIFICATION_LEVEL, &walls)?;

        let weight = room.config.rampart_weight;
        candidate.push_score("ramparts", ramparts.len() as f32, weight);
        candidate.push_score("walls", walls.len() as f32, weight);

        trace!(
            "Origin {:?}: perimeter of {} ramparts and {} walls from {} rectangles",
            candidate.origin,
            ramparts.len(),
            walls.len(),
            rects.len()
        );

        for loc in ramparts {
            candidate.add_to_landmark_set("ramparts", loc);
        }
        for loc in walls {
            candidate.add_to_landmark_set("walls", loc);
        }

        Ok(())
    }
}
