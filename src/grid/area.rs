//! Pattern search over the grid.
//!
//! A pattern is a set of relative offsets. `find_area` slides every allowed
//! orientation of the pattern across the room and keeps placements that
//! satisfy all constraints.

use super::WeightedGrid;
use crate::constants::*;
use crate::location::*;
use fnv::FnvHashSet;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConstraintKind {
    /// Every placed tile must be in the set.
    Every,
    /// At least one placed tile must be in the set.
    Some,
    /// No placed tile may be in the set.
    None,
}

#[derive(Clone, Debug)]
pub struct AreaConstraint<'a> {
    pub name: &'a str,
    pub kind: ConstraintKind,
    pub coords: &'a FnvHashSet<Location>,
}

impl<'a> AreaConstraint<'a> {
    pub fn every(name: &'a str, coords: &'a FnvHashSet<Location>) -> Self {
        AreaConstraint {
            name,
            kind: ConstraintKind::Every,
            coords,
        }
    }

    pub fn some(name: &'a str, coords: &'a FnvHashSet<Location>) -> Self {
        AreaConstraint {
            name,
            kind: ConstraintKind::Some,
            coords,
        }
    }

    pub fn none(name: &'a str, coords: &'a FnvHashSet<Location>) -> Self {
        AreaConstraint {
            name,
            kind: ConstraintKind::None,
            coords,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FindAreaOptions {
    pub rotate: bool,
    pub flip: bool,
    pub ignore_wall: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaMatch {
    /// Placed tiles, in pattern order.
    pub coords: Vec<Location>,
    /// Tiles of the placement found in each constraint's set. For `None`
    /// constraints this is every placed tile.
    pub matched: Vec<(String, Vec<Location>)>,
    /// Rotation in degrees (0, 90, 180 or 270).
    pub rotation: u16,
    pub flipped: bool,
}

impl AreaMatch {
    pub fn matched(&self, name: &str) -> &[Location] {
        self.matched
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, coords)| coords.as_slice())
            .unwrap_or(&[])
    }
}

struct Orientation {
    offsets: Vec<(i16, i16)>,
    width: i16,
    height: i16,
    rotation: u16,
    flipped: bool,
}

fn transform((x, y): (i16, i16), rotation: u16, flipped: bool) -> (i16, i16) {
    let (x, y) = if flipped { (-x, y) } else { (x, y) };
    match rotation {
        90 => (y, -x),
        180 => (-x, -y),
        270 => (-y, x),
        _ => (x, y),
    }
}

/// Distinct orientations of `pattern`, each shifted so its minimum corner is (0, 0).
fn orientations(pattern: &[(i8, i8)], options: FindAreaOptions) -> Vec<Orientation> {
    let rotations: &[u16] = if options.rotate { &[0, 90, 180, 270] } else { &[0] };
    let flips: &[bool] = if options.flip { &[false, true] } else { &[false] };

    let mut seen: FnvHashSet<Vec<(i16, i16)>> = FnvHashSet::default();
    let mut result = Vec::new();

    for &flipped in flips {
        for &rotation in rotations {
            let raw: Vec<(i16, i16)> = pattern
                .iter()
                .map(|&(x, y)| transform((x as i16, y as i16), rotation, flipped))
                .collect();
            let (Some(min_x), Some(min_y)) = (raw.iter().map(|p| p.0).min(), raw.iter().map(|p| p.1).min()) else {
                continue;
            };
            let offsets: Vec<(i16, i16)> = raw.iter().map(|&(x, y)| (x - min_x, y - min_y)).collect();

            let shape: Vec<(i16, i16)> = offsets.iter().copied().sorted().collect();
            if !seen.insert(shape) {
                continue;
            }

            let width = offsets.iter().map(|p| p.0).max().unwrap_or(0) + 1;
            let height = offsets.iter().map(|p| p.1).max().unwrap_or(0) + 1;
            result.push(Orientation {
                offsets,
                width,
                height,
                rotation,
                flipped,
            });
        }
    }

    result
}

impl WeightedGrid {
    /// Find every placement of `pattern` that satisfies all `constraints`.
    ///
    /// Results are ordered by translation, row-major; orientations of the same
    /// translation keep their enumeration order.
    pub fn find_area(
        &self,
        pattern: &[(i8, i8)],
        constraints: &[AreaConstraint],
        options: FindAreaOptions,
    ) -> Vec<AreaMatch> {
        // An `Every` constraint bounds the search to its own bounding box.
        let mut bounds = (0i16, 0i16, ROOM_WIDTH as i16 - 1, ROOM_HEIGHT as i16 - 1);
        for constraint in constraints.iter().filter(|c| c.kind == ConstraintKind::Every) {
            if constraint.coords.is_empty() {
                return Vec::new();
            }
            let (min_x, max_x) = constraint
                .coords
                .iter()
                .map(|l| l.x() as i16)
                .minmax()
                .into_option()
                .unwrap_or((0, 0));
            let (min_y, max_y) = constraint
                .coords
                .iter()
                .map(|l| l.y() as i16)
                .minmax()
                .into_option()
                .unwrap_or((0, 0));
            bounds = (
                bounds.0.max(min_x),
                bounds.1.max(min_y),
                bounds.2.min(max_x),
                bounds.3.min(max_y),
            );
        }

        let mut found: Vec<((i16, i16), AreaMatch)> = Vec::new();

        for orientation in orientations(pattern, options) {
            for ty in bounds.1..=(bounds.3 - orientation.height + 1) {
                for tx in bounds.0..=(bounds.2 - orientation.width + 1) {
                    let coords: Option<Vec<Location>> = orientation
                        .offsets
                        .iter()
                        .map(|&(dx, dy)| Location::try_from_signed(tx + dx, ty + dy))
                        .collect();
                    let Some(coords) = coords else {
                        continue;
                    };

                    if !options.ignore_wall && coords.iter().any(|l| !self.is_passable(*l)) {
                        continue;
                    }

                    if let Some(matched) = check_constraints(&coords, constraints) {
                        found.push((
                            (ty, tx),
                            AreaMatch {
                                coords,
                                matched,
                                rotation: orientation.rotation,
                                flipped: orientation.flipped,
                            },
                        ));
                    }
                }
            }
        }

        found.sort_by_key(|(anchor, _)| *anchor);
        found.into_iter().map(|(_, m)| m).collect()
    }
}

fn check_constraints(coords: &[Location], constraints: &[AreaConstraint]) -> Option<Vec<(String, Vec<Location>)>> {
    let mut matched = Vec::with_capacity(constraints.len());

    for constraint in constraints {
        let inside: Vec<Location> = coords.iter().copied().filter(|l| constraint.coords.contains(l)).collect();
        let ok = match constraint.kind {
            ConstraintKind::Every => inside.len() == coords.len(),
            ConstraintKind::Some => !inside.is_empty(),
            ConstraintKind::None => inside.is_empty(),
        };
        if !ok {
            return None;
        }
        let recorded = match constraint.kind {
            ConstraintKind::None => coords.to_vec(),
            _ => inside,
        };
        matched.push((constraint.name.to_string(), recorded));
    }

    Some(matched)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    fn set(coords: &[(u8, u8)]) -> FnvHashSet<Location> {
        coords.iter().map(|&(x, y)| Location::from_xy(x, y)).collect()
    }

    #[test]
    fn every_constraint_finds_exact_fit() {
        let grid = open_grid();
        let slots = set(&[(10, 10), (11, 10), (12, 10)]);
        let matches = grid.find_area(
            &[(0, 0), (1, 0), (2, 0)],
            &[AreaConstraint::every("slots", &slots)],
            FindAreaOptions::default(),
        );

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].coords[0], Location::from_xy(10, 10));
        assert_eq!(matches[0].matched("slots").len(), 3);
    }

    #[test]
    fn rotation_finds_vertical_placement() {
        let grid = open_grid();
        let slots = set(&[(10, 10), (10, 11), (10, 12)]);
        let pattern = [(0, 0), (1, 0), (2, 0)];

        let plain = grid.find_area(&pattern, &[AreaConstraint::every("slots", &slots)], FindAreaOptions::default());
        assert!(plain.is_empty());

        let rotated = grid.find_area(
            &pattern,
            &[AreaConstraint::every("slots", &slots)],
            FindAreaOptions {
                rotate: true,
                ..Default::default()
            },
        );
        assert_eq!(rotated.len(), 1, "symmetric orientations must be deduplicated");
        assert_eq!(rotated[0].rotation, 90);
    }

    #[test]
    fn flip_finds_mirrored_shape() {
        let grid = open_grid();
        // An L facing the other way.
        let slots = set(&[(11, 10), (11, 11), (10, 11)]);
        let pattern = [(0, 0), (0, 1), (1, 1)];

        let flipped = grid.find_area(
            &pattern,
            &[AreaConstraint::every("slots", &slots)],
            FindAreaOptions {
                flip: true,
                ..Default::default()
            },
        );
        assert_eq!(flipped.len(), 1);
        assert!(flipped[0].flipped);
    }

    #[test]
    fn none_and_some_constraints() {
        let terrain = terrain_from(|x, y| if (x, y) == (21, 20) { '1' } else { '0' });
        let grid = WeightedGrid::new(&terrain, &[]);
        let slots = set(&[(20, 20), (21, 20), (22, 20), (20, 21), (21, 21), (22, 21)]);
        let taken = set(&[(20, 21)]);
        let anchors = set(&[(22, 21)]);

        let matches = grid.find_area(
            &[(0, 0), (1, 0)],
            &[
                AreaConstraint::every("slots", &slots),
                AreaConstraint::none("taken", &taken),
                AreaConstraint::some("anchors", &anchors),
            ],
            FindAreaOptions::default(),
        );

        // (20,20)-(21,20) and (21,20)-(22,20) touch the wall; (20,21)-(21,21) hits `taken`.
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].coords, vec![Location::from_xy(21, 21), Location::from_xy(22, 21)]);
        assert_eq!(matches[0].matched("taken").len(), 2);
    }
}
