//! Weighted room grid.
//!
//! Every tile carries its terrain, the natural object sitting on it (if any),
//! the structures committed so far and the resulting movement cost. The
//! structure quota bookkeeping lives alongside (see `allocator`), so a grid
//! clone is a fully independent planning state.

pub mod area;
pub mod path;

pub use area::*;
pub use path::*;

use crate::allocator::{QuotaRegistry, QuotaTable};
use crate::constants::*;
use crate::location::*;
use crate::room_data::*;
use crate::structure::*;
use crate::terrain::*;
use log::*;
use std::sync::Arc;

use screeps::constants::StructureType;

/// A single tile of the grid.
#[derive(Clone, Debug)]
pub struct GridCell {
    pub(crate) terrain: TerrainFlags,
    pub(crate) object: Option<RoomObjectKind>,
    pub(crate) structures: Vec<StructurePlacement>,
    pub(crate) cost: u32,
    pub(crate) cost_override: Option<u32>,
}

impl GridCell {
    fn new(terrain: TerrainFlags) -> Self {
        GridCell {
            terrain,
            object: None,
            structures: Vec::new(),
            cost: terrain.cost(),
            cost_override: None,
        }
    }

    pub fn terrain(&self) -> TerrainFlags {
        self.terrain
    }

    pub fn object(&self) -> Option<RoomObjectKind> {
        self.object
    }

    pub fn structures(&self) -> &[StructurePlacement] {
        &self.structures
    }

    /// Cost from terrain and natural objects alone.
    pub fn base_cost(&self) -> u32 {
        if self.object.is_some() {
            IMPASSABLE_COST
        } else {
            self.terrain.cost()
        }
    }

    /// Recompute the structure-driven cost. Roads lower the cost, containers
    /// and ramparts leave it alone, anything else blocks the tile. Walls and
    /// natural objects stay blocked regardless.
    pub(crate) fn recompute_cost(&mut self) {
        let base = self.base_cost();
        if base >= IMPASSABLE_COST {
            self.cost = IMPASSABLE_COST;
            return;
        }

        self.cost = self
            .structures
            .iter()
            .filter_map(|s| match s.kind() {
                StructureType::Road => Some(ROAD_COST),
                StructureType::Container | StructureType::Rampart => None,
                _ => Some(IMPASSABLE_COST),
            })
            .max()
            .unwrap_or(base);
    }
}

/// Filters applied by the neighborhood queries.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PositionOptions {
    /// Keep impassable tiles.
    pub ignore_wall: bool,
    /// Allow the room edge (x or y of 0 or 49).
    pub ignore_border_limit: bool,
}

impl PositionOptions {
    pub fn any_tile() -> Self {
        PositionOptions {
            ignore_wall: true,
            ignore_border_limit: false,
        }
    }
}

#[derive(Clone)]
pub struct WeightedGrid {
    pub(crate) cells: Vec<GridCell>,
    objects: Vec<RoomObject>,
    exit_distance: Arc<RoomDataArray<u8>>,
    pub(crate) quotas: Arc<QuotaTable>,
    pub(crate) registry: QuotaRegistry,
}

impl WeightedGrid {
    pub fn new(terrain: &FastRoomTerrain, objects: &[RoomObject]) -> Self {
        Self::with_quotas(terrain, objects, Arc::new(QuotaTable::default()))
    }

    pub fn with_quotas(terrain: &FastRoomTerrain, objects: &[RoomObject], quotas: Arc<QuotaTable>) -> Self {
        let mut cells: Vec<GridCell> = (0..ROOM_AREA)
            .map(|i| {
                let loc = Location::from_index(i);
                GridCell::new(terrain.get(&loc))
            })
            .collect();

        let objects: Vec<RoomObject> = objects
            .iter()
            .filter(|o| o.kind != RoomObjectKind::Other)
            .filter(|o| {
                let inside = o.location().in_build_range();
                if !inside {
                    warn!("Ignoring {:?} outside the room interior at ({}, {})", o.kind, o.x, o.y);
                }
                inside
            })
            .cloned()
            .collect();

        for object in &objects {
            let cell = &mut cells[object.location().index()];
            cell.object = Some(object.kind);
            cell.recompute_cost();
        }

        WeightedGrid {
            cells,
            objects,
            exit_distance: Arc::new(terrain.exit_distances()),
            quotas,
            registry: QuotaRegistry::default(),
        }
    }

    pub fn from_room(room: &dyn RoomDataSource, quotas: Arc<QuotaTable>) -> Self {
        Self::with_quotas(room.get_terrain(), room.get_objects(), quotas)
    }

    #[inline]
    pub fn cell(&self, loc: Location) -> &GridCell {
        &self.cells[loc.index()]
    }

    pub fn terrain(&self, loc: Location) -> TerrainFlags {
        self.cell(loc).terrain
    }

    pub fn is_wall(&self, loc: Location) -> bool {
        self.cell(loc).terrain.contains(TerrainFlags::WALL)
    }

    /// Effective movement cost; an explicit override wins over everything.
    #[inline]
    pub fn cost(&self, loc: Location) -> u32 {
        let cell = self.cell(loc);
        cell.cost_override.unwrap_or(cell.cost)
    }

    #[inline]
    pub fn is_passable(&self, loc: Location) -> bool {
        self.cost(loc) < IMPASSABLE_COST
    }

    /// Pin the cost of a tile regardless of its contents.
    pub fn set_cost(&mut self, loc: Location, cost: u32) {
        self.cells[loc.index()].cost_override = Some(cost.min(IMPASSABLE_COST));
    }

    pub fn clear_cost(&mut self, loc: Location) {
        self.cells[loc.index()].cost_override = None;
    }

    pub fn object_at(&self, loc: Location) -> Option<RoomObjectKind> {
        self.cell(loc).object
    }

    pub fn objects(&self) -> &[RoomObject] {
        &self.objects
    }

    pub fn find_objects(&self, kind: RoomObjectKind) -> Vec<Location> {
        self.objects
            .iter()
            .filter(|o| o.kind == kind)
            .map(|o| o.location())
            .collect()
    }

    pub fn structures_at(&self, loc: Location) -> &[StructurePlacement] {
        &self.cell(loc).structures
    }

    pub fn has_structure(&self, loc: Location, structure_type: StructureType) -> bool {
        self.structures_at(loc).iter().any(|s| s.kind() == structure_type)
    }

    pub fn has_variant(&self, loc: Location, variant: StructureVariant) -> bool {
        self.structures_at(loc).iter().any(|s| s.variant == variant)
    }

    /// True if a structure other than a road occupies the tile.
    pub fn is_occupied(&self, loc: Location) -> bool {
        self.structures_at(loc).iter().any(|s| !s.variant.is_road())
    }

    /// All committed placements, row-major.
    pub fn placements(&self) -> impl Iterator<Item = &StructurePlacement> + '_ {
        self.cells.iter().flat_map(|c| c.structures.iter())
    }

    pub fn locations_of(&self, variant: StructureVariant) -> Vec<Location> {
        self.placements()
            .filter(|p| p.variant == variant)
            .map(|p| p.location)
            .collect()
    }

    /// Chebyshev distance to the nearest walkable room-edge tile.
    pub fn border_distance(&self, loc: Location) -> u8 {
        self.exit_distance.at(loc)
    }

    fn accepts(&self, loc: Location, options: PositionOptions) -> bool {
        if !options.ignore_border_limit && !loc.in_build_range() {
            return false;
        }
        options.ignore_wall || self.is_passable(loc)
    }

    fn ring(&self, center: Location, range: u8, hollow: bool, options: PositionOptions) -> Vec<Location> {
        let r = range as i16;
        let mut result = Vec::new();
        for dy in -r..=r {
            for dx in -r..=r {
                if dx == 0 && dy == 0 {
                    continue;
                }
                if hollow && dx.abs().max(dy.abs()) != r {
                    continue;
                }
                if let Some(loc) = center.checked_add(dx, dy) {
                    if self.accepts(loc, options) {
                        result.push(loc);
                    }
                }
            }
        }
        result
    }

    /// Tiles within Chebyshev `range` of `center`, excluding the center.
    pub fn square_pos(&self, center: Location, range: u8, options: PositionOptions) -> Vec<Location> {
        self.ring(center, range, false, options)
    }

    /// Tiles at exactly Chebyshev `range` from `center`.
    pub fn hollow_square_pos(&self, center: Location, range: u8, options: PositionOptions) -> Vec<Location> {
        self.ring(center, range, true, options)
    }

    /// Ring tiles with the same checkerboard colour as `center`.
    pub fn mod2_equal_pos(&self, center: Location, range: u8, options: PositionOptions) -> Vec<Location> {
        let parity = center.parity();
        self.ring(center, range, true, options)
            .into_iter()
            .filter(|l| l.parity() == parity)
            .collect()
    }

    /// Ring tiles with the opposite checkerboard colour to `center`.
    pub fn mod2_not_equal_pos(&self, center: Location, range: u8, options: PositionOptions) -> Vec<Location> {
        let parity = center.parity();
        self.ring(center, range, true, options)
            .into_iter()
            .filter(|l| l.parity() != parity)
            .collect()
    }

    /// Union of the discs around `coords`, minus the coordinates themselves.
    pub fn near_pos(&self, coords: &[Location], range: u8, options: PositionOptions) -> Vec<Location> {
        let exclude: fnv::FnvHashSet<Location> = coords.iter().copied().collect();
        let mut seen = fnv::FnvHashSet::default();
        coords
            .iter()
            .flat_map(|c| self.square_pos(*c, range, options))
            .filter(|l| !exclude.contains(l) && seen.insert(*l))
            .collect()
    }

    pub fn rect_pos(&self, rect: &Rect, options: PositionOptions) -> Vec<Location> {
        rect.locations().filter(|l| self.accepts(*l, options)).collect()
    }
}

/// Order `coords` nearest-first from `start`; ties keep their input order.
pub fn sort_by_distance(start: Location, coords: &mut [Location]) {
    coords.sort_by_key(|c| start.distance_to(*c));
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Terrain built from a closure returning the code for each tile.
    pub fn terrain_from(f: impl Fn(u8, u8) -> char) -> FastRoomTerrain {
        let mut raw = String::with_capacity(ROOM_AREA);
        for y in 0..ROOM_HEIGHT {
            for x in 0..ROOM_WIDTH {
                raw.push(f(x, y));
            }
        }
        // Terrain strings are indexed x + 50 * y, which matches row-major pushing.
        FastRoomTerrain::from_terrain_string(&raw).unwrap()
    }

    pub fn open_grid() -> WeightedGrid {
        WeightedGrid::new(&terrain_from(|_, _| '0'), &[])
    }
}
