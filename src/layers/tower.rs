//! TowerLayer: Spreads towers over the building slots.
//!
//! Slots are taken greedily in expansion order, skipping any slot closer than
//! `tower_spacing` to a tower already chosen. Levels come from the quota
//! table, so the first tower lands at level 3 and the last three at level 8.

use crate::error::LayoutError;
use crate::layer::*;
use crate::location::*;
use crate::structure::StructureVariant;
use log::*;

pub struct TowerLayer;

fn spaced_slots(candidate: &Candidate, count: usize, spacing: u8) -> Vec<Location> {
    let mut chosen: Vec<Location> = Vec::with_capacity(count);
    for slot in candidate.space.building.iter() {
        if chosen.len() >= count {
            break;
        }
        if !candidate.grid.is_passable(slot) {
            continue;
        }
        if chosen.iter().all(|t| t.distance_to(slot) >= spacing) {
            chosen.push(slot);
        }
    }
    chosen
}

impl LayoutLayer for TowerLayer {
    fn name(&self) -> &str {
        "tower"
    }

    fn phase(&self) -> CandidatePhase {
        CandidatePhase::SecondaryAssignment
    }

    fn apply(&self, candidate: &mut Candidate, room: &RoomContext) -> Result<(), LayoutError> {
        let config = &room.config;
        let slots = spaced_slots(candidate, config.tower_count, config.tower_spacing);
        if slots.len() < config.tower_min {
            return Err(LayoutError::InsufficientTowerSlots {
                found: slots.len(),
                required: config.tower_min,
            });
        }

        for slot in &slots {
            candidate.space.building.remove(*slot);
        }

        let outcome = candidate.fill(StructureVariant::Tower, &slots);
        for loc in &outcome.unplaced {
            candidate.space.building.insert(*loc);
        }
        if outcome.placed.len() < config.tower_min {
            return Err(LayoutError::InsufficientTowerSlots {
                found: outcome.placed.len(),
                required: config.tower_min,
            });
        }

        for (loc, _) in &outcome.placed {
            candidate.add_to_landmark_set("towers", *loc);
        }

        trace!("Origin {:?}: {} towers", candidate.origin, outcome.placed.len());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::layers::test_support::*;
    use crate::layers::{CenterLayer, CoreLayer, InfillLayer, LabLayer, SpawnLayer};

    use screeps::constants::StructureType;

    #[test]
    fn towers_keep_their_distance() {
        let (candidate, room) = run_layers(&[&SpawnLayer, &CenterLayer, &CoreLayer, &LabLayer, &InfillLayer, &TowerLayer]);
        let towers = candidate.get_landmark_set("towers");
        assert_eq!(towers.len(), room.config.tower_count);

        for (i, a) in towers.iter().enumerate() {
            assert!(candidate.grid.has_structure(*a, StructureType::Tower));
            assert!(!candidate.space.building.contains(*a));
            for b in &towers[i + 1..] {
                assert!(a.distance_to(*b) >= room.config.tower_spacing, "{:?} and {:?} too close", a, b);
            }
        }

        let mut levels: Vec<u8> = candidate
            .grid
            .placements()
            .filter(|p| p.kind() == StructureType::Tower)
            .map(|p| p.level)
            .collect();
        levels.sort();
        assert_eq!(levels, vec![3, 5, 7, 8, 8, 8]);
    }

    #[test]
    fn too_few_spaced_slots() {
        let (grid, _) = flat_room();
        let room = RoomContext::new(&grid, LayoutConfig::default().towers(6, 3));
        let mut candidate = Candidate::new(Location::from_xy(18, 18), grid);
        for x in 10..14 {
            candidate.space.building.insert(Location::from_xy(x, 30));
        }

        assert_eq!(
            TowerLayer.apply(&mut candidate, &room),
            Err(LayoutError::InsufficientTowerSlots { found: 2, required: 3 })
        );
        assert_eq!(candidate.space.building.len(), 4);
    }
}
