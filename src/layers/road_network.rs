//! RoadNetworkLayer: Turns every remaining road slot into a base road and
//! connects the center to each side of the room that has an exit.
//!
//! The ring around the first spawn is needed from the start and is built at
//! level 1; the rest of the base waits for level 3. Exit roads head for the
//! open edge tile nearest to the center on each side, so the perimeter later
//! crosses them with ramparts instead of walls.

use super::path_from_center;
use crate::constants::*;
use crate::error::LayoutError;
use crate::grid::WeightedGrid;
use crate::layer::*;
use crate::location::*;
use crate::structure::StructureVariant;
use log::*;

use screeps::constants::StructureType;

const SPAWN_ROAD_LEVEL: u8 = 1;
const BASE_ROAD_LEVEL: u8 = 3;
const EXIT_ROAD_LEVEL: u8 = 3;

pub struct RoadNetworkLayer;

/// Open edge tiles per side (top, right, bottom, left), corners excluded.
pub(crate) fn exit_sides(grid: &WeightedGrid) -> [Vec<Location>; 4] {
    let last = ROOM_WIDTH - 1;
    let open = |locs: Vec<Location>| -> Vec<Location> { locs.into_iter().filter(|l| !grid.is_wall(*l)).collect() };
    let span = 1..last;

    [
        open(span.clone().map(|x| Location::from_xy(x, 0)).collect()),
        open(span.clone().map(|y| Location::from_xy(last, y)).collect()),
        open(span.clone().map(|x| Location::from_xy(x, last)).collect()),
        open(span.map(|y| Location::from_xy(0, y)).collect()),
    ]
}

fn place_exit_roads(candidate: &mut Candidate, room: &RoomContext, center: Location) -> Result<usize, LayoutError> {
    let mut placed = 0;

    for side in exit_sides(&candidate.grid) {
        let Some(exit) = side.iter().copied().min_by_key(|l| l.distance_to(center)) else {
            continue;
        };

        let path = match path_from_center(candidate, room, exit, 1, &[]) {
            Ok(result) => result.path,
            Err(err) => {
                debug!("Origin {:?}: no exit road towards {:?}: {}", candidate.origin, exit, err);
                continue;
            }
        };

        let roads: Vec<Location> = path
            .iter()
            .copied()
            .filter(|l| !candidate.grid.has_structure(*l, StructureType::Road))
            .collect();
        placed += candidate.place(StructureVariant::ExitRoad, EXIT_ROAD_LEVEL, &roads)?;
        if let Some(end) = path.last() {
            candidate.add_to_landmark_set("exits", *end);
        }
    }

    Ok(placed)
}

impl LayoutLayer for RoadNetworkLayer {
    fn name(&self) -> &str {
        "road_network"
    }

    fn phase(&self) -> CandidatePhase {
        CandidatePhase::RoadFinalization
    }

    fn apply(&self, candidate: &mut Candidate, room: &RoomContext) -> Result<(), LayoutError> {
        let origin = candidate.origin;
        let center = candidate.require_landmark("center")?;
        let (early, late): (Vec<Location>, Vec<Location>) = candidate
            .space
            .road
            .iter()
            .partition(|l| l.distance_to(origin) <= 1);

        let placed = candidate.place(StructureVariant::BaseRoad, SPAWN_ROAD_LEVEL, &early)?
            + candidate.place(StructureVariant::BaseRoad, BASE_ROAD_LEVEL, &late)?;
        let exits = place_exit_roads(candidate, room, center)?;

        trace!("Origin {:?}: {} base roads, {} exit roads", origin, placed, exits);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::grid::test_support::*;
    use crate::layers::test_support::*;
    use crate::layers::{CenterLayer, CoreLayer, ExtensionLayer, InfillLayer, LabLayer, SpawnLayer, TowerLayer};
    use crate::room_data::*;

    #[test]
    fn road_slots_become_base_roads() {
        let (mut candidate, room) = through_extensions();
        RoadNetworkLayer.apply(&mut candidate, &room).unwrap();

        let origin = candidate.origin;
        for loc in candidate.space.road.iter() {
            let road = candidate
                .grid
                .structures_at(loc)
                .iter()
                .find(|s| s.kind() == StructureType::Road)
                .copied()
                .unwrap();
            assert_eq!(road.variant, StructureVariant::BaseRoad);
            let expected = if loc.distance_to(origin) <= 1 { 1 } else { 3 };
            assert_eq!(road.level, expected, "{:?}", loc);
        }

        let hub = candidate.get_landmark("center").unwrap();
        assert!(candidate.grid.has_structure(hub, StructureType::Road));
    }

    fn reaches_edge(candidate: &Candidate, on_edge: impl Fn(Location) -> bool) -> bool {
        candidate
            .grid
            .locations_of(StructureVariant::ExitRoad)
            .into_iter()
            .any(on_edge)
    }

    #[test]
    fn exit_roads_reach_every_open_side() {
        let (mut candidate, room) = through_extensions();
        RoadNetworkLayer.apply(&mut candidate, &room).unwrap();

        assert_eq!(candidate.get_landmark_set("exits").len(), 4);
        assert!(reaches_edge(&candidate, |l| l.y() == 1), "no road to the top");
        assert!(reaches_edge(&candidate, |l| l.x() == 48), "no road to the right");
        assert!(reaches_edge(&candidate, |l| l.y() == 48), "no road to the bottom");
        assert!(reaches_edge(&candidate, |l| l.x() == 1), "no road to the left");

        for end in candidate.get_landmark_set("exits") {
            assert!(candidate.grid.has_structure(*end, StructureType::Road));
        }
    }

    #[test]
    fn walled_side_gets_no_exit_road() {
        let objects = vec![
            RoomObject::new(RoomObjectKind::Source, 10, 10),
            RoomObject::new(RoomObjectKind::Mineral, 40, 40),
            RoomObject::new(RoomObjectKind::Controller, 25, 25),
        ];
        let grid = WeightedGrid::new(&terrain_from(|x, _| if x == 0 { '1' } else { '0' }), &objects);
        let room = RoomContext::new(&grid, LayoutConfig::default());

        let sides = exit_sides(&grid);
        assert!(sides[3].is_empty());
        assert_eq!(sides[0].len(), 48);

        let layers: [&dyn LayoutLayer; 7] = [
            &SpawnLayer,
            &CenterLayer,
            &CoreLayer,
            &LabLayer,
            &InfillLayer,
            &TowerLayer,
            &ExtensionLayer,
        ];
        let (mut candidate, room) = run_layers_in(grid, room, &layers);
        RoadNetworkLayer.apply(&mut candidate, &room).unwrap();

        assert_eq!(candidate.get_landmark_set("exits").len(), 3);
        assert!(!reaches_edge(&candidate, |l| l.x() == 1));
        assert!(reaches_edge(&candidate, |l| l.x() == 48));
    }
}
