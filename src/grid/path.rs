use super::WeightedGrid;
use crate::constants::*;
use crate::location::*;
use crate::terrain::*;
use fnv::FnvHashMap;
use pathfinding::directed::astar::astar;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default)]
pub struct PathOptions {
    /// Multiplier on the Chebyshev heuristic. 0 turns the search into Dijkstra.
    pub heuristic_weight: u32,
    /// Per-call cost replacements. A value at or above the impassable cost
    /// removes the tile from the search.
    pub cost_overrides: FnvHashMap<Location, u32>,
}

impl PathOptions {
    pub fn weighted(heuristic_weight: u32) -> Self {
        PathOptions {
            heuristic_weight,
            cost_overrides: FnvHashMap::default(),
        }
    }

    pub fn block(mut self, tiles: impl IntoIterator<Item = Location>) -> Self {
        for loc in tiles {
            self.cost_overrides.insert(loc, IMPASSABLE_COST);
        }
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathResult {
    /// Tiles from start to the final tile, both inclusive. Empty when incomplete.
    pub path: Vec<Location>,
    pub cost: u32,
    pub incomplete: bool,
}

impl PathResult {
    pub fn last(&self) -> Option<Location> {
        self.path.last().copied()
    }
}

impl WeightedGrid {
    fn step_cost(&self, loc: Location, options: &PathOptions) -> u32 {
        options
            .cost_overrides
            .get(&loc)
            .copied()
            .unwrap_or_else(|| self.cost(loc))
    }

    /// A* from `start` to any tile within Chebyshev `range` of `goal`.
    ///
    /// Each step costs the destination tile's cost. Movement is limited to
    /// the buildable interior.
    pub fn find_path(&self, start: Location, goal: Location, range: u8, options: &PathOptions) -> PathResult {
        let weight = options.heuristic_weight;

        let result = astar(
            &start,
            |&loc| {
                let mut next = Vec::with_capacity(8);
                for &(dx, dy) in &NEIGHBORS_8 {
                    let Some(n) = loc.checked_add(dx as i16, dy as i16) else {
                        continue;
                    };
                    if !n.in_build_range() {
                        continue;
                    }
                    let cost = self.step_cost(n, options);
                    if cost >= IMPASSABLE_COST {
                        continue;
                    }
                    next.push((n, cost));
                }
                next
            },
            |&loc| weight * (loc.distance_to(goal).saturating_sub(range) as u32),
            |&loc| loc.distance_to(goal) <= range,
        );

        match result {
            Some((path, cost)) => PathResult {
                path,
                cost,
                incomplete: false,
            },
            None => PathResult {
                path: Vec::new(),
                cost: 0,
                incomplete: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn path_to_self_is_trivial() {
        let grid = open_grid();
        let a = Location::from_xy(20, 20);
        let result = grid.find_path(a, a, 0, &PathOptions::default());

        assert_eq!(result.path, vec![a]);
        assert_eq!(result.cost, 0);
        assert!(!result.incomplete);
    }

    #[test]
    fn straight_path_costs_plain_steps() {
        let grid = open_grid();
        let result = grid.find_path(
            Location::from_xy(10, 10),
            Location::from_xy(15, 10),
            0,
            &PathOptions::weighted(1),
        );

        assert!(!result.incomplete);
        assert_eq!(result.path.len(), 6);
        assert_eq!(result.cost, 5 * PLAIN_COST);
    }

    #[test]
    fn range_stops_short_of_goal() {
        let grid = open_grid();
        let goal = Location::from_xy(30, 30);
        let result = grid.find_path(Location::from_xy(20, 30), goal, 1, &PathOptions::default());

        assert_eq!(result.last().map(|l| l.distance_to(goal)), Some(1));
        assert_eq!(result.path.len(), 10);
    }

    #[test]
    fn wall_partition_is_incomplete() {
        let terrain = terrain_from(|x, _| if x == 25 { '1' } else { '0' });
        let grid = WeightedGrid::new(&terrain, &[]);
        let result = grid.find_path(
            Location::from_xy(10, 10),
            Location::from_xy(40, 10),
            0,
            &PathOptions::weighted(1),
        );

        assert!(result.incomplete, "a gapless wall must block the path");
        assert!(result.path.is_empty());
    }

    #[test]
    fn overrides_route_around_tiles() {
        let grid = open_grid();
        let start = Location::from_xy(10, 10);
        let goal = Location::from_xy(12, 10);
        let blocked = Location::from_xy(11, 10);
        let result = grid.find_path(start, goal, 0, &PathOptions::weighted(1).block([blocked]));

        assert!(!result.incomplete);
        assert!(!result.path.contains(&blocked));
        assert_eq!(result.cost, 2 * PLAIN_COST);
    }
}
