pub mod allocator;
pub mod config;
pub mod constants;
pub mod error;
pub mod expansion;
pub mod grid;
pub mod layer;
pub mod layers;
pub mod location;
pub mod mincut;
pub mod pipeline;
pub mod plan;
pub mod planner;
pub mod protected;
pub mod room_data;
pub mod scoring;
pub mod structure;
pub mod terrain;

pub mod visual;
pub use visual::*;

pub use allocator::{FillOutcome, QuotaExceeded, QuotaTable};
pub use config::{LayoutConfig, SpaceSettings};
pub use error::LayoutError;
pub use grid::WeightedGrid;
pub use layer::{Candidate, CandidatePhase, LayoutLayer, RoomContext};
pub use location::{Location, Rect};
pub use pipeline::Rejection;
pub use plan::{BuildPriority, BuildStep, LayoutScore, LayoutStructure, RoomLayout};
pub use planner::{LayoutSynthesizer, SynthesisReport};
pub use protected::ProtectedAreas;
pub use room_data::{RoomData, RoomDataSource, RoomObject, RoomObjectKind, RoomSnapshot};
pub use structure::{StructurePlacement, StructureVariant};
pub use terrain::{FastRoomTerrain, TerrainFlags};
