//! Candidate scoring.
//!
//! Layers push weighted terms while they run (fortification counts, upgrader
//! bonus, network path costs). The candidate total is the weighted sum;
//! lower is better.

use crate::layer::*;
use crate::plan::LayoutScore;

impl Candidate {
    /// Weighted sum of every score term pushed so far.
    pub fn total_score(&self) -> f32 {
        self.scores.iter().map(|s| s.score * s.weight).sum()
    }

    pub fn to_layout_score(&self) -> LayoutScore {
        LayoutScore {
            total: self.total_score(),
            ramparts: self.get_landmark_set("ramparts").len(),
            walls: self.get_landmark_set("walls").len(),
            upgraders: self.upgraders.len(),
            path_cost: self.score_of("path_cost").max(0.0) as u32,
        }
    }
}
