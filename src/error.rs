use crate::allocator::QuotaExceeded;
use crate::location::*;
use crate::structure::StructureVariant;
use thiserror::Error;

/// Reasons a room, or a single candidate origin inside it, fails to produce a layout.
///
/// Everything except `InvalidTerrain` and `NoViableLayout` is scoped to one
/// candidate: the synthesizer records it and moves on to the next origin.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("invalid terrain: {0}")]
    InvalidTerrain(String),
    #[error("not enough building space around the origin")]
    InfeasibleSpace,
    #[error("no tile can host the storage cluster")]
    NoCenterFound,
    #[error("no building slot left for {0:?}")]
    InsufficientCoreSlots(StructureVariant),
    #[error("no lab layout fits the remaining slots")]
    NoLabLayout,
    #[error("the base template does not fit anywhere in the room")]
    NoTemplateFit,
    #[error("found {found} tower slots, need {required}")]
    InsufficientTowerSlots { found: usize, required: usize },
    #[error("placed {found} extensions, need {required}")]
    InsufficientExtensions { found: usize, required: usize },
    #[error("reserved {found} free-space tiles, need {required}")]
    InsufficientFreeSpace { found: usize, required: usize },
    #[error("no path to {0:?}")]
    PathNotFound(Location),
    #[error("no viable controller link site")]
    NoControllerSite,
    #[error("the room has no {0}")]
    MissingObject(&'static str),
    #[error("landmark {0} has not been placed")]
    MissingLandmark(&'static str),
    #[error(transparent)]
    QuotaExceeded(#[from] QuotaExceeded),
    #[error("spawn and controller infrastructure are not in one protected area")]
    DisconnectedProtectedArea,
    #[error("structure at {0:?} cannot be reached from the center")]
    UnreachableStructure(Location),
    #[error("invalid protected rectangle {0:?}")]
    InvalidRectangle(Rect),
    #[error("rectangle {0:?} lies outside the cut bounds")]
    OutOfBounds(Rect),
    #[error("no viable layout among {candidates} candidate origins")]
    NoViableLayout { candidates: usize },
}
