use crate::error::LayoutError;
use crate::location::*;
use crate::terrain::*;
use serde::{Deserialize, Serialize};

/// Natural room objects the planner cares about.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoomObjectKind {
    Source,
    Mineral,
    Controller,
    #[serde(other)]
    Other,
}

/// A fixed point of interest, in the shape the room object feed provides it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomObject {
    pub x: u8,
    pub y: u8,
    #[serde(rename = "type")]
    pub kind: RoomObjectKind,
    #[serde(rename = "mineralType", default, skip_serializing_if = "Option::is_none")]
    pub mineral_type: Option<String>,
}

impl RoomObject {
    pub fn new(kind: RoomObjectKind, x: u8, y: u8) -> Self {
        RoomObject {
            x,
            y,
            kind,
            mineral_type: None,
        }
    }

    pub fn location(&self) -> Location {
        Location::from_xy(self.x, self.y)
    }
}

/// Trait for providing room data to the planner.
/// Implementations can wrap live game data or offline snapshots.
pub trait RoomDataSource {
    fn get_terrain(&self) -> &FastRoomTerrain;
    fn get_objects(&self) -> &[RoomObject];

    fn locations_of(&self, kind: RoomObjectKind) -> Vec<Location> {
        self.get_objects()
            .iter()
            .filter(|o| o.kind == kind)
            .map(|o| o.location())
            .collect()
    }

    fn get_sources(&self) -> Vec<Location> {
        self.locations_of(RoomObjectKind::Source)
    }

    fn get_minerals(&self) -> Vec<Location> {
        self.locations_of(RoomObjectKind::Mineral)
    }

    fn get_controllers(&self) -> Vec<Location> {
        self.locations_of(RoomObjectKind::Controller)
    }
}

/// Offline room snapshot: the raw terrain encoding plus the object list.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub terrain: String,
    pub objects: Vec<RoomObject>,
}

/// A parsed room ready for planning.
#[derive(Clone)]
pub struct RoomData {
    terrain: FastRoomTerrain,
    objects: Vec<RoomObject>,
}

impl RoomData {
    pub fn new(terrain: FastRoomTerrain, objects: Vec<RoomObject>) -> Self {
        RoomData { terrain, objects }
    }

    pub fn from_terrain_string(terrain: &str, objects: Vec<RoomObject>) -> Result<Self, LayoutError> {
        let terrain = FastRoomTerrain::from_terrain_string(terrain)?;

        for object in &objects {
            if !object.location().in_build_range() && object.kind != RoomObjectKind::Other {
                return Err(LayoutError::InvalidTerrain(format!(
                    "{:?} at ({}, {}) is outside the room interior",
                    object.kind, object.x, object.y
                )));
            }
        }

        Ok(RoomData { terrain, objects })
    }
}

impl TryFrom<RoomSnapshot> for RoomData {
    type Error = LayoutError;

    fn try_from(snapshot: RoomSnapshot) -> Result<Self, Self::Error> {
        RoomData::from_terrain_string(&snapshot.terrain, snapshot.objects)
    }
}

impl RoomDataSource for RoomData {
    fn get_terrain(&self) -> &FastRoomTerrain {
        &self.terrain
    }

    fn get_objects(&self) -> &[RoomObject] {
        &self.objects
    }
}
