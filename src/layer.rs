//! Core types for the candidate pipeline.
//!
//! `Candidate` is the evolving plan for one origin tile. It owns its grid
//! clone, so nothing a layer does can leak into another candidate.
//! `LayoutLayer` is the trait each pipeline stage implements.
//! `ScoreEntry` records a weighted score term pushed by a layer.

use crate::allocator::FillOutcome;
use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::expansion::SpaceExpansion;
use crate::grid::WeightedGrid;
use crate::location::*;
use crate::plan::*;
use crate::room_data::RoomObjectKind;
use crate::structure::*;
use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};

/// Where a candidate is in the pipeline. A rejected candidate reports the
/// phase of the layer that failed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandidatePhase {
    CandidateEvaluation,
    CenterPlacement,
    CoreAssignment,
    LabAssignment,
    SecondaryAssignment,
    RoadFinalization,
    NetworkConnections,
    PerimeterComputation,
    ConnectivityValidation,
    Scored,
    Rejected,
}

/// A weighted score term. The candidate total is the sum of `score * weight`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: f32,
    pub weight: f32,
}

/// Room-wide facts shared by every candidate.
#[derive(Clone, Debug)]
pub struct RoomContext {
    pub config: LayoutConfig,
    pub sources: Vec<Location>,
    pub minerals: Vec<Location>,
    pub controllers: Vec<Location>,
}

impl RoomContext {
    pub fn new(grid: &WeightedGrid, config: LayoutConfig) -> Self {
        RoomContext {
            config,
            sources: grid.find_objects(RoomObjectKind::Source),
            minerals: grid.find_objects(RoomObjectKind::Mineral),
            controllers: grid.find_objects(RoomObjectKind::Controller),
        }
    }
}

/// The evolving plan for a single origin.
#[derive(Clone)]
pub struct Candidate {
    pub origin: Location,
    pub grid: WeightedGrid,
    /// Building and road slots still waiting for a structure, plus the
    /// free-space pool found by the expansion.
    pub space: SpaceExpansion,
    /// Tiles kept clear for future use.
    pub free_space: Vec<Location>,
    /// Upgrader standing tiles next to the controller link.
    pub upgraders: Vec<Location>,
    /// Named locations for cross-layer reference (e.g. "center", "storage").
    pub landmarks: FnvHashMap<String, Location>,
    /// Named location sets (e.g. "towers", "ramparts").
    pub landmark_sets: FnvHashMap<String, Vec<Location>>,
    pub scores: Vec<ScoreEntry>,
    pub phase: CandidatePhase,
}

impl Candidate {
    pub fn new(origin: Location, grid: WeightedGrid) -> Self {
        Candidate {
            origin,
            grid,
            space: SpaceExpansion::default(),
            free_space: Vec::new(),
            upgraders: Vec::new(),
            landmarks: FnvHashMap::default(),
            landmark_sets: FnvHashMap::default(),
            scores: Vec::new(),
            phase: CandidatePhase::CandidateEvaluation,
        }
    }

    pub fn push_score(&mut self, name: impl Into<String>, score: f32, weight: f32) {
        self.scores.push(ScoreEntry {
            name: name.into(),
            score,
            weight,
        });
    }

    /// Sum of every score term named `name`.
    pub fn score_of(&self, name: &str) -> f32 {
        self.scores
            .iter()
            .filter(|s| s.name == name)
            .map(|s| s.score)
            .sum()
    }

    pub fn set_landmark(&mut self, name: impl Into<String>, loc: Location) {
        self.landmarks.insert(name.into(), loc);
    }

    pub fn get_landmark(&self, name: &str) -> Option<Location> {
        self.landmarks.get(name).copied()
    }

    /// Landmark lookup for layers that cannot run without it.
    pub fn require_landmark(&self, name: &'static str) -> Result<Location, LayoutError> {
        self.get_landmark(name).ok_or(LayoutError::MissingLandmark(name))
    }

    pub fn add_to_landmark_set(&mut self, name: impl Into<String>, loc: Location) {
        self.landmark_sets.entry(name.into()).or_default().push(loc);
    }

    pub fn get_landmark_set(&self, name: &str) -> &[Location] {
        self.landmark_sets
            .get(name)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// True for slot and free-space tiles that later stages must not take.
    pub fn is_reserved(&self, loc: Location) -> bool {
        self.space.building.contains(loc) || self.space.road.contains(loc) || self.free_space.contains(&loc)
    }

    /// Passable, empty and not reserved.
    pub fn is_free(&self, loc: Location) -> bool {
        loc.in_build_range()
            && self.grid.is_passable(loc)
            && self.grid.structures_at(loc).is_empty()
            && !self.is_reserved(loc)
    }

    /// Place `variant` on `coords` at a fixed level with its default priority.
    pub fn place(&mut self, variant: StructureVariant, level: u8, coords: &[Location]) -> Result<usize, LayoutError> {
        let priority = get_build_priority(variant.kind(), level);
        Ok(self.grid.add_structure(variant, level, priority, coords)?)
    }

    /// Place `variant` on `coords`, each at the lowest level the quota allows.
    pub fn fill(&mut self, variant: StructureVariant, coords: &[Location]) -> FillOutcome {
        let kind = variant.kind();
        self.grid
            .add_structure_by_filling_level(variant, |level, _| get_build_priority(kind, level), coords)
    }
}

/// A stage of the candidate pipeline.
///
/// Layers are stateless; everything they decide is written into the
/// `Candidate`. Returning an error rejects the candidate.
pub trait LayoutLayer: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Phase reported while this layer runs.
    fn phase(&self) -> CandidatePhase;

    /// Return false to skip this layer (the candidate passes through unchanged).
    fn is_applicable(&self, _candidate: &Candidate, _room: &RoomContext) -> bool {
        true
    }

    fn apply(&self, candidate: &mut Candidate, room: &RoomContext) -> Result<(), LayoutError>;
}
