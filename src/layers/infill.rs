//! InfillLayer: Fills single-tile holes in the slot grid and trims the
//! building slots down to the configured ceiling.
//!
//! A hole is an empty buildable tile whose eight neighbors are all slots. It
//! becomes a building slot. Afterwards the building slots farthest from the
//! center are released to the free-space pool until at most
//! `building_slot_ceiling` remain.

use crate::error::LayoutError;
use crate::expansion::SpaceRules;
use crate::grid::*;
use crate::layer::*;
use crate::location::*;
use crate::terrain::*;
use fnv::FnvHashSet;
use log::*;
use std::cmp::Reverse;

pub struct InfillLayer;

/// Centers of every fully enclosed hole.
fn find_holes(candidate: &Candidate, room: &RoomContext) -> Vec<Location> {
    let slots: FnvHashSet<Location> = candidate
        .space
        .building
        .iter()
        .chain(candidate.space.road.iter())
        .collect();

    let rules = SpaceRules::new(&candidate.grid, &room.config.space);
    let matches = candidate.grid.find_area(
        &NEIGHBORS_8,
        &[AreaConstraint::every("slots", &slots)],
        FindAreaOptions::default(),
    );

    matches
        .iter()
        .filter_map(|m| {
            let min_x = m.coords.iter().map(|l| l.x()).min()?;
            let min_y = m.coords.iter().map(|l| l.y()).min()?;
            Some(Location::from_xy(min_x + 1, min_y + 1))
        })
        .filter(|hole| !slots.contains(hole) && candidate.is_free(*hole) && rules.building_allowed(*hole))
        .collect()
}

impl LayoutLayer for InfillLayer {
    fn name(&self) -> &str {
        "infill"
    }

    fn phase(&self) -> CandidatePhase {
        CandidatePhase::SecondaryAssignment
    }

    fn apply(&self, candidate: &mut Candidate, room: &RoomContext) -> Result<(), LayoutError> {
        let center = candidate.require_landmark("center")?;

        let holes = find_holes(candidate, room);
        for hole in &holes {
            candidate.space.free_pool.retain(|l| l != hole);
            candidate.space.building.insert(*hole);
        }

        let ceiling = room.config.building_slot_ceiling;
        let mut surplus = Vec::new();
        if candidate.space.building.len() > ceiling {
            let mut ranked: Vec<Location> = candidate.space.building.iter().collect();
            ranked.sort_by_key(|l| Reverse(l.distance_to(center)));
            surplus.extend_from_slice(&ranked[..ranked.len() - ceiling]);

            for loc in &surplus {
                candidate.space.building.remove(*loc);
                candidate.space.free_pool.push(*loc);
            }
        }

        trace!(
            "Origin {:?}: {} holes filled, {} slots released",
            candidate.origin,
            holes.len(),
            surplus.len()
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::test_support::*;
    use crate::layers::{CenterLayer, CoreLayer, LabLayer, SpawnLayer};

    #[test]
    fn enclosed_hole_becomes_building_slot() {
        let (grid, room) = flat_room();
        let mut candidate = Candidate::new(Location::from_xy(18, 18), grid);
        let hole = Location::from_xy(30, 30);
        for &(dx, dy) in &NEIGHBORS_8 {
            candidate.space.road.insert(hole.checked_add(dx as i16, dy as i16).unwrap());
        }
        candidate.space.free_pool.push(hole);
        candidate.set_landmark("center", Location::from_xy(18, 18));

        InfillLayer.apply(&mut candidate, &room).unwrap();

        assert!(candidate.space.building.contains(hole));
        assert!(!candidate.space.free_pool.contains(&hole));
    }

    #[test]
    fn surplus_slots_farthest_from_center_are_released() {
        let (mut candidate, room) = run_layers(&[&SpawnLayer, &CenterLayer, &CoreLayer, &LabLayer]);
        let center = candidate.get_landmark("center").unwrap();
        let before: Vec<Location> = candidate.space.building.iter().collect();

        InfillLayer.apply(&mut candidate, &room).unwrap();

        assert_eq!(candidate.space.building.len(), room.config.building_slot_ceiling);

        let released: Vec<Location> = before
            .into_iter()
            .filter(|l| !candidate.space.building.contains(*l))
            .collect();
        assert!(!released.is_empty());
        assert!(released.iter().all(|l| candidate.space.free_pool.contains(l)));

        let nearest_released = released.iter().map(|l| l.distance_to(center)).min().unwrap();
        let farthest_kept = candidate
            .space
            .building
            .iter()
            .map(|l| l.distance_to(center))
            .max()
            .unwrap();
        assert!(nearest_released >= farthest_kept);
    }
}
