//! FixedTemplateLayer: Drops a hand-made base template into the room.
//!
//! The template's bounding box is slid over the room interior (at least
//! `margin` tiles from the edge); placements touching a wall or natural
//! object are skipped. Among the remaining placements the one covering the
//! fewest swamp tiles wins, then the one whose template center is closest to
//! the candidate origin. Every template structure is then committed through
//! the quota allocator at its listed level.
//!
//! This layer replaces the checkerboard stages rather than complementing
//! them; build a synthesizer with `LayoutSynthesizer::empty` and add it
//! together with whichever network and defense layers should follow.

use crate::constants::ROOM_WIDTH;
use crate::error::LayoutError;
use crate::grid::*;
use crate::layer::*;
use crate::location::*;
use crate::structure::StructureVariant;
use crate::terrain::TerrainFlags;
use fnv::FnvHashSet;
use log::*;
use serde::{Deserialize, Serialize};

const DEFAULT_MARGIN: u8 = 5;

/// Structures of one role at one level, as offsets from the template corner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateEntry {
    pub variant: StructureVariant,
    pub level: u8,
    pub offsets: Vec<(u8, u8)>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FixedTemplate {
    pub width: u8,
    pub height: u8,
    /// Offset of the hub tile, recorded as the `center` landmark.
    pub center: (u8, u8),
    pub entries: Vec<TemplateEntry>,
}

impl FixedTemplate {
    pub fn new(width: u8, height: u8, center: (u8, u8)) -> Self {
        FixedTemplate {
            width,
            height,
            center,
            entries: Vec::new(),
        }
    }

    pub fn with(mut self, variant: StructureVariant, level: u8, offsets: &[(u8, u8)]) -> Self {
        self.entries.push(TemplateEntry {
            variant,
            level,
            offsets: offsets.to_vec(),
        });
        self
    }

    fn footprint(&self) -> Vec<(i8, i8)> {
        (0..self.height as i8)
            .flat_map(|y| (0..self.width as i8).map(move |x| (x, y)))
            .collect()
    }
}

pub struct FixedTemplateLayer {
    template: FixedTemplate,
    margin: u8,
}

impl FixedTemplateLayer {
    pub fn new(template: FixedTemplate) -> Self {
        FixedTemplateLayer {
            template,
            margin: DEFAULT_MARGIN,
        }
    }

    pub fn margin(mut self, margin: u8) -> Self {
        self.margin = margin;
        self
    }

    /// Top-left corner of the best placement for `origin`.
    fn best_corner(&self, grid: &WeightedGrid, origin: Location) -> Option<Location> {
        let (width, height) = (self.template.width, self.template.height);
        let max = (ROOM_WIDTH - 1).saturating_sub(self.margin);
        if width == 0 || height == 0 || self.margin > max {
            return None;
        }
        let interior: FnvHashSet<Location> = grid
            .rect_pos(&Rect::new(self.margin, self.margin, max, max), PositionOptions::any_tile())
            .into_iter()
            .collect();

        let (cx, cy) = self.template.center;
        grid.find_area(
            &self.template.footprint(),
            &[AreaConstraint::every("interior", &interior)],
            FindAreaOptions::default(),
        )
        .into_iter()
        .filter_map(|m| m.coords.first().copied())
        .min_by_key(|corner| {
            let swamps = Rect::new(
                corner.x(),
                corner.y(),
                corner.x() + width - 1,
                corner.y() + height - 1,
            )
            .locations()
            .filter(|l| grid.terrain(*l).contains(TerrainFlags::SWAMP))
            .count();
            let center = Location::from_xy(corner.x() + cx, corner.y() + cy);
            (swamps, center.distance_to(origin))
        })
    }
}

impl LayoutLayer for FixedTemplateLayer {
    fn name(&self) -> &str {
        "fixed_template"
    }

    fn phase(&self) -> CandidatePhase {
        CandidatePhase::CenterPlacement
    }

    fn apply(&self, candidate: &mut Candidate, _room: &RoomContext) -> Result<(), LayoutError> {
        let corner = self
            .best_corner(&candidate.grid, candidate.origin)
            .ok_or(LayoutError::NoTemplateFit)?;
        let at = |(x, y): (u8, u8)| Location::from_xy(corner.x() + x, corner.y() + y);

        for entry in &self.template.entries {
            let coords: Vec<Location> = entry.offsets.iter().map(|o| at(*o)).collect();
            let placed = candidate.place(entry.variant, entry.level, &coords)?;
            if placed < coords.len() {
                debug!(
                    "Origin {:?}: only {} of {} {} fit the template site",
                    candidate.origin,
                    placed,
                    coords.len(),
                    entry.variant.name()
                );
                return Err(LayoutError::NoTemplateFit);
            }
            if entry.variant == StructureVariant::Spawn {
                for loc in &coords {
                    candidate.add_to_landmark_set("spawns", *loc);
                }
            }
        }

        let center = at(self.template.center);
        candidate.set_landmark("center", center);
        if let Some(spawn) = candidate.get_landmark_set("spawns").first().copied() {
            candidate.set_landmark("first_spawn", spawn);
        }

        trace!("Origin {:?}: template placed at {:?}", candidate.origin, corner);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::QuotaExceeded;
    use crate::config::LayoutConfig;
    use crate::grid::test_support::*;

    use screeps::constants::StructureType;

    /// A spawn with its four orthogonal roads.
    fn spawn_cross() -> FixedTemplate {
        FixedTemplate::new(3, 3, (1, 1))
            .with(StructureVariant::Spawn, 1, &[(1, 1)])
            .with(StructureVariant::BaseRoad, 1, &[(1, 0), (0, 1), (2, 1), (1, 2)])
    }

    /// Swamp everywhere except two plain 3x3 pockets.
    fn swampy_grid() -> WeightedGrid {
        let terrain = terrain_from(|x, y| {
            let near = (30..=32).contains(&x) && (30..=32).contains(&y);
            let far = (6..=8).contains(&x) && (6..=8).contains(&y);
            if near || far {
                '0'
            } else {
                '2'
            }
        });
        WeightedGrid::new(&terrain, &[])
    }

    #[test]
    fn plain_site_wins_over_distance() {
        let grid = swampy_grid();
        let room = RoomContext::new(&grid, LayoutConfig::default());
        let mut candidate = Candidate::new(Location::from_xy(20, 20), grid);

        FixedTemplateLayer::new(spawn_cross()).apply(&mut candidate, &room).unwrap();

        let hub = Location::from_xy(31, 31);
        assert_eq!(candidate.get_landmark("center"), Some(hub));
        assert_eq!(candidate.get_landmark("first_spawn"), Some(hub));
        assert!(candidate.grid.has_structure(hub, StructureType::Spawn));
        for road in [(31, 30), (30, 31), (32, 31), (31, 32)] {
            assert!(candidate.grid.has_structure(Location::from_xy(road.0, road.1), StructureType::Road));
        }
    }

    #[test]
    fn nearest_site_wins_among_plain_ones() {
        let grid = open_grid();
        let room = RoomContext::new(&grid, LayoutConfig::default());
        let mut candidate = Candidate::new(Location::from_xy(20, 22), grid);

        FixedTemplateLayer::new(spawn_cross()).apply(&mut candidate, &room).unwrap();
        assert_eq!(candidate.get_landmark("center"), Some(Location::from_xy(20, 22)));
    }

    #[test]
    fn oversized_template_does_not_fit() {
        let grid = open_grid();
        let room = RoomContext::new(&grid, LayoutConfig::default());
        let mut candidate = Candidate::new(Location::from_xy(25, 25), grid);

        let layer = FixedTemplateLayer::new(FixedTemplate::new(41, 41, (20, 20)));
        assert_eq!(layer.apply(&mut candidate, &room), Err(LayoutError::NoTemplateFit));
    }

    #[test]
    fn template_levels_go_through_the_quota() {
        let grid = open_grid();
        let room = RoomContext::new(&grid, LayoutConfig::default());
        let mut candidate = Candidate::new(Location::from_xy(25, 25), grid);

        let template = FixedTemplate::new(3, 1, (1, 0)).with(StructureVariant::Spawn, 1, &[(0, 0), (2, 0)]);
        let result = FixedTemplateLayer::new(template).apply(&mut candidate, &room);

        assert_eq!(
            result,
            Err(LayoutError::QuotaExceeded(QuotaExceeded {
                structure: StructureType::Spawn,
                level: 1,
                overflow: 1,
            }))
        );
        assert_eq!(candidate.grid.placements().count(), 0);
    }
}
