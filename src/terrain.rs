use crate::constants::*;
use crate::error::LayoutError;
use crate::location::*;
use bitflags::*;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct TerrainFlags: u8 {
        const NONE = 0;
        const WALL = 1;
        const SWAMP = 2;
    }
}

impl TerrainFlags {
    /// Base movement cost of the terrain alone.
    pub fn cost(self) -> u32 {
        if self.contains(TerrainFlags::WALL) {
            IMPASSABLE_COST
        } else if self.contains(TerrainFlags::SWAMP) {
            SWAMP_COST
        } else {
            PLAIN_COST
        }
    }
}

#[derive(Clone)]
pub struct FastRoomTerrain {
    buffer: Vec<u8>,
}

impl FastRoomTerrain {
    pub fn new(buffer: Vec<u8>) -> FastRoomTerrain {
        FastRoomTerrain { buffer }
    }

    /// Parse the 2500-character terrain encoding (index `x + 50 * y`).
    ///
    /// `'0'` is plain, `'1'` and `'3'` are walls, `'2'` is swamp.
    pub fn from_terrain_string(terrain: &str) -> Result<FastRoomTerrain, LayoutError> {
        if terrain.len() != ROOM_AREA {
            return Err(LayoutError::InvalidTerrain(format!(
                "expected {} tiles, got {}",
                ROOM_AREA,
                terrain.len()
            )));
        }

        let buffer = terrain
            .bytes()
            .enumerate()
            .map(|(index, c)| match c {
                b'0' => Ok(TerrainFlags::NONE.bits()),
                b'1' | b'3' => Ok(TerrainFlags::WALL.bits()),
                b'2' => Ok(TerrainFlags::SWAMP.bits()),
                other => Err(LayoutError::InvalidTerrain(format!(
                    "unexpected terrain code {:?} at tile {}",
                    other as char, index
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FastRoomTerrain { buffer })
    }

    pub fn get(&self, pos: &Location) -> TerrainFlags {
        self.get_xy(pos.x(), pos.y())
    }

    pub fn get_xy(&self, x: u8, y: u8) -> TerrainFlags {
        let index = (y as usize * ROOM_WIDTH as usize) + (x as usize);
        TerrainFlags::from_bits_truncate(self.buffer[index])
    }

    pub fn is_wall(&self, x: u8, y: u8) -> bool {
        self.get_xy(x, y).contains(TerrainFlags::WALL)
    }

    pub fn is_swamp(&self, x: u8, y: u8) -> bool {
        self.get_xy(x, y).contains(TerrainFlags::SWAMP)
    }

    /// Returns all passable exit tiles (tiles on the room border that are not walls).
    pub fn get_exits(&self) -> Vec<Location> {
        let mut exits = Vec::new();
        // Top edge
        for x in 0..ROOM_WIDTH {
            if !self.is_wall(x, 0) {
                exits.push(Location::from_xy(x, 0));
            }
        }
        // Right edge
        for y in 1..ROOM_HEIGHT - 1 {
            if !self.is_wall(ROOM_WIDTH - 1, y) {
                exits.push(Location::from_xy(ROOM_WIDTH - 1, y));
            }
        }
        // Bottom edge
        for x in 0..ROOM_WIDTH {
            if !self.is_wall(x, ROOM_HEIGHT - 1) {
                exits.push(Location::from_xy(x, ROOM_HEIGHT - 1));
            }
        }
        // Left edge
        for y in 1..ROOM_HEIGHT - 1 {
            if !self.is_wall(0, y) {
                exits.push(Location::from_xy(0, y));
            }
        }
        exits
    }

    /// Chebyshev distance from every tile to the nearest exit tile, ignoring
    /// walls in between. Rooms without exits report `u8::MAX` everywhere.
    pub fn exit_distances(&self) -> RoomDataArray<u8> {
        let exits = self.get_exits();
        let (distances, _) = flood_fill_distance_with_obstacles(&exits, |_, _| true);

        let mut result = RoomDataArray::new(u8::MAX);
        for ((x, y), dist) in distances.iter() {
            if let Some(d) = dist {
                result.set(x, y, (*d).min(u8::MAX as u32) as u8);
            }
        }
        result
    }
}

/// A 50x50 array for room-sized data.
#[derive(Clone)]
pub struct RoomDataArray<T: Copy> {
    data: Vec<T>,
}

impl<T: Copy> RoomDataArray<T> {
    pub fn new(initial: T) -> Self {
        RoomDataArray {
            data: vec![initial; ROOM_AREA],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> &T {
        let index = y * (ROOM_WIDTH as usize) + x;
        &self.data[index]
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        let index = y * (ROOM_WIDTH as usize) + x;
        &mut self.data[index]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        *self.get_mut(x, y) = value;
    }

    #[inline]
    pub fn at(&self, loc: Location) -> T {
        self.data[loc.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &T)> {
        self.data.iter().enumerate().map(|(i, v)| {
            let x = i % (ROOM_WIDTH as usize);
            let y = i / (ROOM_WIDTH as usize);
            ((x, y), v)
        })
    }
}

impl<T: Copy + Serialize> Serialize for RoomDataArray<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.data.serialize(serializer)
    }
}

impl<'de, T: Copy + Deserialize<'de>> Deserialize<'de> for RoomDataArray<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let data = Vec::<T>::deserialize(deserializer)?;
        if data.len() != ROOM_AREA {
            return Err(serde::de::Error::custom("Invalid room data array size"));
        }
        Ok(RoomDataArray { data })
    }
}

/// Neighbor offsets for 8-directional movement.
pub const NEIGHBORS_8: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
];

/// Neighbor offsets for 4-directional (cardinal) movement.
pub const NEIGHBORS_4: [(i8, i8); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];

/// Diagonal neighbor offsets.
pub const NEIGHBORS_DIAGONAL: [(i8, i8); 4] = [(-1, -1), (1, -1), (1, 1), (-1, 1)];

/// BFS flood-fill distance over 8-connected tiles from a set of seeds.
/// `is_passable` is called for each tile to determine if it can be traversed;
/// seeds are always included. Returns the distance map and the maximum
/// distance reached.
pub fn flood_fill_distance_with_obstacles<F>(
    seeds: &[Location],
    is_passable: F,
) -> (RoomDataArray<Option<u32>>, u32)
where
    F: Fn(u8, u8) -> bool,
{
    let mut data: RoomDataArray<Option<u32>> = RoomDataArray::new(None);
    let mut queue = VecDeque::new();

    for seed in seeds {
        data.set(seed.x() as usize, seed.y() as usize, Some(0));
        queue.push_back((*seed, 0u32));
    }

    let mut max_distance = 0u32;

    while let Some((loc, dist)) = queue.pop_front() {
        let next_dist = dist + 1;
        for &(dx, dy) in &NEIGHBORS_8 {
            let nx = loc.x() as i16 + dx as i16;
            let ny = loc.y() as i16 + dy as i16;
            if nx >= 0 && nx < ROOM_WIDTH as i16 && ny >= 0 && ny < ROOM_HEIGHT as i16 {
                let ux = nx as usize;
                let uy = ny as usize;
                if data.get(ux, uy).is_none() && is_passable(nx as u8, ny as u8) {
                    data.set(ux, uy, Some(next_dist));
                    if next_dist > max_distance {
                        max_distance = next_dist;
                    }
                    queue.push_back((Location::from_xy(nx as u8, ny as u8), next_dist));
                }
            }
        }
    }

    (data, max_distance)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_terrain() -> String {
        "0".repeat(ROOM_AREA)
    }

    #[test]
    fn parses_terrain_codes() {
        let mut raw: Vec<u8> = plain_terrain().into_bytes();
        raw[3 + 50 * 4] = b'1';
        raw[5 + 50 * 4] = b'2';
        raw[6 + 50 * 4] = b'3';
        let terrain = FastRoomTerrain::from_terrain_string(std::str::from_utf8(&raw).unwrap()).unwrap();

        assert!(terrain.is_wall(3, 4));
        assert!(terrain.is_swamp(5, 4));
        assert!(terrain.is_wall(6, 4));
        assert!(!terrain.is_wall(4, 4), "plain tile must not be a wall");
    }

    #[test]
    fn rejects_malformed_terrain() {
        assert!(matches!(
            FastRoomTerrain::from_terrain_string("000"),
            Err(LayoutError::InvalidTerrain(_))
        ));

        let mut bad = plain_terrain();
        bad.replace_range(10..11, "x");
        assert!(matches!(
            FastRoomTerrain::from_terrain_string(&bad),
            Err(LayoutError::InvalidTerrain(_))
        ));
    }

    #[test]
    fn exit_distance_is_chebyshev_from_edge() {
        let terrain = FastRoomTerrain::from_terrain_string(&plain_terrain()).unwrap();
        let distances = terrain.exit_distances();

        assert_eq!(*distances.get(0, 10), 0);
        assert_eq!(*distances.get(4, 20), 4);
        assert_eq!(*distances.get(25, 25), 24);
    }
}
