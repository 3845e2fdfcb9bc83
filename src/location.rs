use crate::constants::*;
use serde::*;

/// A tile coordinate inside a single room, packed as `(x << 8) | y`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct Location {
    packed: u16,
}

impl Location {
    pub fn from_coords(x: u32, y: u32) -> Self {
        Location {
            packed: ((x << 8) | y) as u16,
        }
    }

    #[inline]
    pub fn from_xy(x: u8, y: u8) -> Self {
        Location {
            packed: ((x as u16) << 8) | (y as u16),
        }
    }

    /// Build a location from signed coordinates, returning `None` outside the room.
    pub fn try_from_signed(x: i16, y: i16) -> Option<Self> {
        if (0..ROOM_WIDTH as i16).contains(&x) && (0..ROOM_HEIGHT as i16).contains(&y) {
            Some(Location::from_xy(x as u8, y as u8))
        } else {
            None
        }
    }

    #[inline]
    pub fn x(self) -> u8 {
        ((self.packed >> 8) & 0xFF) as u8
    }

    #[inline]
    pub fn y(self) -> u8 {
        (self.packed & 0xFF) as u8
    }

    #[inline]
    pub fn packed_repr(self) -> u16 {
        self.packed
    }

    #[inline]
    pub fn from_packed(packed: u16) -> Self {
        Location { packed }
    }

    /// Linear index into a row-major 50x50 buffer.
    #[inline]
    pub fn index(self) -> usize {
        self.y() as usize * ROOM_WIDTH as usize + self.x() as usize
    }

    pub fn from_index(index: usize) -> Self {
        Location::from_xy(
            (index % ROOM_WIDTH as usize) as u8,
            (index / ROOM_WIDTH as usize) as u8,
        )
    }

    /// Offset by `(dx, dy)`, returning `None` if the result leaves the room.
    pub fn checked_add(self, dx: i16, dy: i16) -> Option<Self> {
        Location::try_from_signed(self.x() as i16 + dx, self.y() as i16 + dy)
    }

    /// Checkerboard colour of the tile.
    #[inline]
    pub fn parity(self) -> u8 {
        (self.x() ^ self.y()) & 1
    }

    /// True if the tile is inside the buildable range `[1, 48]` on both axes.
    pub fn in_build_range(self) -> bool {
        (BUILD_MIN..=BUILD_MAX).contains(&self.x()) && (BUILD_MIN..=BUILD_MAX).contains(&self.y())
    }

    pub fn is_room_edge(self) -> bool {
        self.x() == 0 || self.y() == 0 || self.x() == ROOM_WIDTH - 1 || self.y() == ROOM_HEIGHT - 1
    }

    pub fn distance_to(self, other: Self) -> u8 {
        let dx = (self.x() as i8) - (other.x() as i8);
        let dy = (self.y() as i8) - (other.y() as i8);

        dx.abs().max(dy.abs()) as u8
    }

    pub fn distance_to_xy(self, x: i8, y: i8) -> u8 {
        let dx = (self.x() as i8) - x;
        let dy = (self.y() as i8) - y;

        dx.abs().max(dy.abs()) as u8
    }
}

impl Serialize for Location {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.packed_repr().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Location {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        u16::deserialize(deserializer).map(Location::from_packed)
    }
}

/// Inclusive axis-aligned rectangle of tiles.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct Rect {
    pub x1: u8,
    pub y1: u8,
    pub x2: u8,
    pub y2: u8,
}

impl Rect {
    pub fn new(x1: u8, y1: u8, x2: u8, y2: u8) -> Self {
        Rect { x1, y1, x2, y2 }
    }

    /// The whole room.
    pub fn room() -> Self {
        Rect::new(0, 0, ROOM_WIDTH - 1, ROOM_HEIGHT - 1)
    }

    /// Square of radius `padding` around `center`, clamped to `[lo, hi]`.
    pub fn around(center: Location, padding: u8, lo: u8, hi: u8) -> Self {
        Rect {
            x1: center.x().saturating_sub(padding).max(lo),
            y1: center.y().saturating_sub(padding).max(lo),
            x2: center.x().saturating_add(padding).min(hi),
            y2: center.y().saturating_add(padding).min(hi),
        }
    }

    pub fn contains(&self, loc: Location) -> bool {
        (self.x1..=self.x2).contains(&loc.x()) && (self.y1..=self.y2).contains(&loc.y())
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x1 >= self.x1 && other.x2 <= self.x2 && other.y1 >= self.y1 && other.y2 <= self.y2
    }

    pub fn is_on_border(&self, loc: Location) -> bool {
        self.contains(loc)
            && (loc.x() == self.x1 || loc.x() == self.x2 || loc.y() == self.y1 || loc.y() == self.y2)
    }

    /// Chebyshev distance from `loc` to the nearest tile of the rectangle.
    pub fn distance_to(&self, loc: Location) -> u8 {
        let dx = if loc.x() < self.x1 {
            self.x1 - loc.x()
        } else if loc.x() > self.x2 {
            loc.x() - self.x2
        } else {
            0
        };
        let dy = if loc.y() < self.y1 {
            self.y1 - loc.y()
        } else if loc.y() > self.y2 {
            loc.y() - self.y2
        } else {
            0
        };
        dx.max(dy)
    }

    /// All tiles of the rectangle, row-major.
    pub fn locations(&self) -> impl Iterator<Item = Location> + '_ {
        (self.y1..=self.y2).flat_map(move |y| (self.x1..=self.x2).map(move |x| Location::from_xy(x, y)))
    }
}
