//! Checkerboard space expansion.
//!
//! Starting from the first spawn, building slots grow along one checkerboard
//! colour and road slots along the other, so every building slot ends up
//! orthogonally next to a road. Growth stops once enough building slots
//! exist, or fails when a round adds nothing.

use crate::config::SpaceSettings;
use crate::error::LayoutError;
use crate::grid::*;
use crate::location::*;
use crate::room_data::RoomObjectKind;
use crate::terrain::*;
use fnv::FnvHashSet;
use log::*;

/// Insertion-ordered set of tiles.
#[derive(Clone, Debug, Default)]
pub struct SlotSet {
    order: Vec<Location>,
    members: FnvHashSet<Location>,
}

impl SlotSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, loc: Location) -> bool {
        if self.members.insert(loc) {
            self.order.push(loc);
            true
        } else {
            false
        }
    }

    pub fn remove(&mut self, loc: Location) -> bool {
        if self.members.remove(&loc) {
            self.order.retain(|l| *l != loc);
            true
        } else {
            false
        }
    }

    pub fn retain<F: FnMut(&Location) -> bool>(&mut self, mut f: F) {
        let members = &mut self.members;
        self.order.retain(|l| {
            let keep = f(l);
            if !keep {
                members.remove(l);
            }
            keep
        });
    }

    pub fn contains(&self, loc: Location) -> bool {
        self.members.contains(&loc)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Location> + '_ {
        self.order.iter().copied()
    }

    pub fn as_slice(&self) -> &[Location] {
        &self.order
    }

    pub fn members(&self) -> &FnvHashSet<Location> {
        &self.members
    }
}

impl FromIterator<Location> for SlotSet {
    fn from_iter<I: IntoIterator<Item = Location>>(iter: I) -> Self {
        let mut set = SlotSet::new();
        for loc in iter {
            set.insert(loc);
        }
        set
    }
}

/// Result of a successful expansion.
#[derive(Clone, Debug, Default)]
pub struct SpaceExpansion {
    pub building: SlotSet,
    pub road: SlotSet,
    /// Open tiles next to road slots that belong to neither set, nearest to the origin first.
    pub free_pool: Vec<Location>,
}

/// Placement rules shared by the expansion and later stages.
pub struct SpaceRules<'a> {
    grid: &'a WeightedGrid,
    settings: &'a SpaceSettings,
    controllers: Vec<Location>,
    sources: Vec<Location>,
    minerals: Vec<Location>,
}

impl<'a> SpaceRules<'a> {
    pub fn new(grid: &'a WeightedGrid, settings: &'a SpaceSettings) -> Self {
        SpaceRules {
            grid,
            settings,
            controllers: grid.find_objects(RoomObjectKind::Controller),
            sources: grid.find_objects(RoomObjectKind::Source),
            minerals: grid.find_objects(RoomObjectKind::Mineral),
        }
    }

    fn near_any(points: &[Location], loc: Location, range: u8) -> bool {
        points.iter().any(|p| p.distance_to(loc) <= range)
    }

    fn near_resource(&self, loc: Location) -> bool {
        Self::near_any(&self.controllers, loc, self.settings.controller_exclusion)
            || Self::near_any(&self.sources, loc, self.settings.source_exclusion)
            || Self::near_any(&self.minerals, loc, self.settings.mineral_exclusion)
    }

    /// True if a building may sit on `loc` as far as terrain, margins and
    /// resource exclusion zones are concerned. Placed structures are ignored.
    pub fn building_allowed(&self, loc: Location) -> bool {
        loc.in_build_range()
            && self.grid.cell(loc).base_cost() < crate::constants::IMPASSABLE_COST
            && self.grid.border_distance(loc) >= self.settings.building_border_margin
            && !self.near_resource(loc)
    }

    pub fn road_allowed(&self, loc: Location) -> bool {
        loc.in_build_range()
            && self.grid.cell(loc).base_cost() < crate::constants::IMPASSABLE_COST
            && self.grid.border_distance(loc) >= self.settings.road_border_margin
            && !self.near_resource(loc)
    }
}

fn has_adjacent(loc: Location, set: &SlotSet) -> bool {
    NEIGHBORS_8.iter().any(|&(dx, dy)| {
        loc.checked_add(dx as i16, dy as i16)
            .map(|n| set.contains(n))
            .unwrap_or(false)
    })
}

/// Grow building and road slots from `origin` until `building_slot_target` is reached.
pub fn find_space(grid: &WeightedGrid, origin: Location, settings: &SpaceSettings) -> Result<SpaceExpansion, LayoutError> {
    let rules = SpaceRules::new(grid, settings);
    if !rules.building_allowed(origin) {
        return Err(LayoutError::InfeasibleSpace);
    }

    let options = PositionOptions::default();
    let mut building: SlotSet = std::iter::once(origin).collect();
    let mut road: SlotSet = grid.mod2_not_equal_pos(origin, 1, options).into_iter().collect();

    let mut rounds = 0;
    loop {
        rounds += 1;
        let before = building.len();

        // Compute the whole round from the current sets before merging.
        let grown_roads: Vec<Location> = road
            .iter()
            .flat_map(|r| grid.mod2_equal_pos(r, 1, options))
            .collect();
        let grown_buildings: Vec<Location> = building
            .iter()
            .flat_map(|b| grid.mod2_equal_pos(b, 1, options))
            .collect();
        for loc in grown_roads {
            road.insert(loc);
        }
        for loc in grown_buildings {
            building.insert(loc);
        }

        road.retain(|l| rules.road_allowed(*l));
        building.retain(|l| *l == origin || rules.building_allowed(*l));
        building.retain(|l| *l == origin || has_adjacent(*l, &road));

        trace!(
            "Expansion round {} from {:?}: {} building, {} road",
            rounds,
            origin,
            building.len(),
            road.len()
        );

        if building.len() >= settings.building_slot_target {
            break;
        }
        if building.len() <= before {
            return Err(LayoutError::InfeasibleSpace);
        }
    }

    // The spawn's own ring is always walkable.
    for loc in grid.mod2_not_equal_pos(origin, 1, options) {
        road.insert(loc);
    }

    let mut seen = FnvHashSet::default();
    let mut free_pool: Vec<Location> = road
        .iter()
        .flat_map(|r| grid.hollow_square_pos(r, 1, options))
        .filter(|l| !building.contains(*l) && !road.contains(*l))
        .filter(|l| l.distance_to(origin) <= settings.free_space_radius && seen.insert(*l))
        .collect();
    sort_by_distance(origin, &mut free_pool);
    free_pool.truncate(settings.free_space_pool);

    Ok(SpaceExpansion {
        building,
        road,
        free_pool,
    })
}
