//! Connectivity groups after fortification.
//!
//! Tiles that creeps can stand on once ramparts and walls are treated as
//! solid are split into connected groups. Buildings other than roads and
//! containers block movement too. Everything reachable from an open map
//! edge tile is group 0, the unprotected outside. Each remaining component
//! is a protected area numbered from 1 in row-major discovery order.
//!
//! A tile holding a building belongs to no group itself; it is reached
//! through the groups of its walkable neighbours.

use crate::grid::WeightedGrid;
use crate::location::*;
use crate::structure::is_walkable;
use crate::terrain::*;
use log::*;
use std::collections::VecDeque;

use screeps::constants::StructureType;

/// Group id of everything reachable from the room exits.
pub const OUTSIDE_GROUP: u16 = 0;

pub struct ProtectedAreas {
    groups: RoomDataArray<Option<u16>>,
    group_count: u16,
}

fn is_open(grid: &WeightedGrid, loc: Location) -> bool {
    let cell = grid.cell(loc);
    !cell.terrain().contains(TerrainFlags::WALL)
        && cell.object().is_none()
        && cell
            .structures()
            .iter()
            .all(|s| is_walkable(s.kind()) && s.kind() != StructureType::Rampart)
}

fn flood(grid: &WeightedGrid, groups: &mut RoomDataArray<Option<u16>>, seeds: &[Location], group: u16) {
    let mut queue: VecDeque<Location> = VecDeque::new();
    for seed in seeds {
        groups.set(seed.x() as usize, seed.y() as usize, Some(group));
        queue.push_back(*seed);
    }

    while let Some(loc) = queue.pop_front() {
        for &(dx, dy) in &NEIGHBORS_8 {
            let Some(n) = loc.checked_add(dx as i16, dy as i16) else {
                continue;
            };
            if groups.at(n).is_none() && is_open(grid, n) {
                groups.set(n.x() as usize, n.y() as usize, Some(group));
                queue.push_back(n);
            }
        }
    }
}

impl ProtectedAreas {
    pub fn analyze(grid: &WeightedGrid) -> Self {
        let mut groups = RoomDataArray::new(None);

        let exits: Vec<Location> = Rect::room()
            .locations()
            .filter(|l| l.is_room_edge() && is_open(grid, *l))
            .collect();
        flood(grid, &mut groups, &exits, OUTSIDE_GROUP);

        let mut next = OUTSIDE_GROUP + 1;
        for loc in Rect::room().locations() {
            if groups.at(loc).is_none() && is_open(grid, loc) {
                flood(grid, &mut groups, &[loc], next);
                next += 1;
            }
        }

        trace!("Protected area analysis: {} enclosed groups", next - 1);

        ProtectedAreas {
            groups,
            group_count: next,
        }
    }

    /// Group of an open tile, `None` for walls, objects, buildings and fortifications.
    pub fn group_of(&self, loc: Location) -> Option<u16> {
        self.groups.at(loc)
    }

    /// Number of groups including the outside.
    pub fn group_count(&self) -> usize {
        self.group_count as usize
    }

    /// Groups a creep can stand in to reach `loc`: its own group when the
    /// tile is open, otherwise the groups of its open neighbours.
    pub fn access_groups(&self, loc: Location) -> Vec<u16> {
        if let Some(group) = self.group_of(loc) {
            return vec![group];
        }

        let mut groups: Vec<u16> = NEIGHBORS_8
            .iter()
            .filter_map(|&(dx, dy)| loc.checked_add(dx as i16, dy as i16))
            .filter_map(|n| self.group_of(n))
            .collect();
        groups.sort_unstable();
        groups.dedup();
        groups
    }

    /// True when the tile can only be reached from inside the perimeter.
    pub fn is_protected(&self, loc: Location) -> bool {
        let groups = self.access_groups(loc);
        !groups.is_empty() && !groups.contains(&OUTSIDE_GROUP)
    }

    /// True when one enclosed group gives access to every tile.
    pub fn is_in_same_protected_area(&self, coords: &[Location]) -> bool {
        let Some(first) = coords.first() else {
            return false;
        };
        self.access_groups(*first)
            .into_iter()
            .filter(|g| *g != OUTSIDE_GROUP)
            .any(|group| coords[1..].iter().all(|l| self.access_groups(*l).contains(&group)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::test_support::*;
    use crate::plan::BuildPriority;
    use crate::structure::StructureVariant;

    fn ring(x1: u8, y1: u8, x2: u8, y2: u8) -> Vec<Location> {
        Rect::new(x1, y1, x2, y2)
            .locations()
            .filter(|l| Rect::new(x1, y1, x2, y2).is_on_border(*l))
            .collect()
    }

    #[test]
    fn open_room_is_all_outside() {
        let areas = ProtectedAreas::analyze(&open_grid());
        assert_eq!(areas.group_count(), 1);
        assert_eq!(areas.group_of(Location::from_xy(25, 25)), Some(OUTSIDE_GROUP));
        assert!(!areas.is_in_same_protected_area(&[Location::from_xy(25, 25)]));
        assert!(!areas.is_in_same_protected_area(&[]));
    }

    #[test]
    fn rampart_rings_form_separate_groups() {
        let mut grid = open_grid();
        grid.add_structure(StructureVariant::Rampart, 5, BuildPriority::Low, &ring(10, 10, 14, 14))
            .unwrap();
        grid.add_structure(StructureVariant::Wall, 5, BuildPriority::Low, &ring(30, 30, 34, 34))
            .unwrap();

        let areas = ProtectedAreas::analyze(&grid);
        assert_eq!(areas.group_count(), 3);
        assert_eq!(areas.group_of(Location::from_xy(10, 10)), None);
        assert_eq!(areas.group_of(Location::from_xy(12, 12)), Some(1));
        assert_eq!(areas.group_of(Location::from_xy(32, 32)), Some(2));

        assert!(areas.is_in_same_protected_area(&[Location::from_xy(11, 11), Location::from_xy(13, 13)]));
        assert!(!areas.is_in_same_protected_area(&[Location::from_xy(11, 11), Location::from_xy(32, 32)]));
        assert!(!areas.is_in_same_protected_area(&[Location::from_xy(11, 11), Location::from_xy(20, 20)]));
    }

    #[test]
    fn buildings_split_an_enclosure() {
        let mut grid = open_grid();
        grid.add_structure(StructureVariant::Rampart, 5, BuildPriority::Low, &ring(10, 10, 30, 30))
            .unwrap();
        let divider: Vec<Location> = (11..30).map(|y| Location::from_xy(20, y)).collect();
        grid.add_structure(StructureVariant::Extension, 8, BuildPriority::Medium, &divider)
            .unwrap();

        let areas = ProtectedAreas::analyze(&grid);
        assert_eq!(areas.group_count(), 3);

        let spawn_side = Location::from_xy(15, 20);
        let controller_side = Location::from_xy(25, 20);
        assert_eq!(areas.group_of(spawn_side), Some(1));
        assert_eq!(areas.group_of(controller_side), Some(2));
        assert!(!areas.is_in_same_protected_area(&[spawn_side, controller_side]));

        // A building on the divider is reachable from both halves.
        let extension = Location::from_xy(20, 20);
        assert_eq!(areas.group_of(extension), None);
        assert_eq!(areas.access_groups(extension), vec![1, 2]);
        assert!(areas.is_protected(extension));
        assert!(areas.is_in_same_protected_area(&[extension, spawn_side]));
        assert!(areas.is_in_same_protected_area(&[extension, controller_side]));
    }

    #[test]
    fn building_next_to_the_outside_is_not_protected() {
        let mut grid = open_grid();
        let spawn = Location::from_xy(12, 12);
        grid.add_structure(StructureVariant::Spawn, 1, BuildPriority::Critical, &[spawn])
            .unwrap();

        let areas = ProtectedAreas::analyze(&grid);
        assert_eq!(areas.access_groups(spawn), vec![OUTSIDE_GROUP]);
        assert!(!areas.is_protected(spawn));
        assert!(!areas.is_in_same_protected_area(&[spawn]));
    }

    #[test]
    fn roads_do_not_block() {
        let mut grid = open_grid();
        grid.add_structure(StructureVariant::BaseRoad, 1, BuildPriority::Low, &ring(10, 10, 14, 14))
            .unwrap();
        let areas = ProtectedAreas::analyze(&grid);
        assert_eq!(areas.group_count(), 1);
    }
}
