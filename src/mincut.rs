//! Minimal fortification perimeter via max-flow / min-cut.
//!
//! Each tile inside the bounds is split into an entry and an exit vertex so
//! that cutting the entry→exit edge corresponds to fortifying the tile:
//!   - Protect rectangles: border tiles are fed from the source, interiors are
//!     removed from the network.
//!   - Tiles next to an exit drain into the sink and can never be fortified.
//!   - Open tiles cost 10 to cut, minus a bonus of up to 3 for hugging a
//!     rectangle, so the cut is pulled in towards what it protects.
//!
//! The network is solved with Dinic's algorithm; tiles whose entry vertex is
//! on the source side and whose exit vertex is not form the cut.

use crate::constants::*;
use crate::error::LayoutError;
use crate::grid::WeightedGrid;
use crate::location::*;
use crate::terrain::*;
use fnv::{FnvHashMap, FnvHashSet};
use log::*;
use rs_graph::builder::Builder;
use rs_graph::maxflow::dinic;
use rs_graph::traits::*;
use rs_graph::Net;
use std::collections::VecDeque;

/// Capacity of a tile that is free to fortify.
const BASE_CAPACITY: u32 = 10;
/// Tiles within this range of a protect rectangle are cheaper to cut.
const RANGE_PADDING: u8 = 3;

/// Infinite capacity sentinel for edges that should never be cut.
const INF_CAP: u32 = BASE_CAPACITY * ROOM_AREA as u32 + 1;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TileClass {
    Unwalkable,
    /// Open tile; `weight` is subtracted from its cut capacity.
    Open { weight: u8 },
    /// Border tile of a protect rectangle.
    Protected,
    /// Walkable tile next to an exit.
    CannotBuild,
    Exit,
}

impl TileClass {
    fn floods(self) -> bool {
        matches!(self, TileClass::Open { .. } | TileClass::CannotBuild)
    }
}

#[derive(Clone, Debug)]
pub struct MinCutOptions {
    /// Area considered for the cut. Its border acts as the exit line.
    pub bounds: Rect,
    /// Let tiles near the rectangles cost less to cut, pulling the perimeter in.
    pub prefer_closer: bool,
    /// Only the first N rectangles pull the cut closer; `None` means all.
    pub prefer_closer_limit: Option<usize>,
    /// Drop cut tiles that only guard dead ends. Only applies when the bounds
    /// are smaller than the room.
    pub prune_dead_ends: bool,
}

impl Default for MinCutOptions {
    fn default() -> Self {
        MinCutOptions {
            bounds: Rect::room(),
            prefer_closer: true,
            prefer_closer_limit: None,
            prune_dead_ends: true,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MinCutResult {
    /// Fortification tiles, row-major.
    pub cut: Vec<Location>,
    /// Value of the maximum flow (sum of the cut capacities).
    pub flow: u32,
}

fn is_unwalkable(grid: &WeightedGrid, loc: Location) -> bool {
    grid.cell(loc).base_cost() >= IMPASSABLE_COST
}

/// Classify every tile of `bounds`: walls, the exit border, and the
/// unbuildable band just inside each exit. Tiles outside the bounds are open.
pub fn classify_tiles(grid: &WeightedGrid, bounds: &Rect) -> RoomDataArray<TileClass> {
    let mut tiles = RoomDataArray::new(TileClass::Open { weight: 0 });

    for loc in bounds.locations() {
        if is_unwalkable(grid, loc) {
            tiles.set(loc.x() as usize, loc.y() as usize, TileClass::Unwalkable);
        } else if bounds.is_on_border(loc) {
            tiles.set(loc.x() as usize, loc.y() as usize, TileClass::Exit);
        }
    }

    let inner = Rect::new(bounds.x1 + 1, bounds.y1 + 1, bounds.x2.saturating_sub(1), bounds.y2.saturating_sub(1));
    for loc in bounds.locations().filter(|l| bounds.is_on_border(*l)) {
        if *tiles.get(loc.x() as usize, loc.y() as usize) != TileClass::Exit {
            continue;
        }
        for &(dx, dy) in &NEIGHBORS_8 {
            let Some(n) = loc.checked_add(dx as i16, dy as i16) else {
                continue;
            };
            if !inner.is_on_border(n) {
                continue;
            }
            let tile = tiles.get_mut(n.x() as usize, n.y() as usize);
            if *tile != TileClass::Unwalkable {
                *tile = TileClass::CannotBuild;
            }
        }
    }

    tiles
}

fn validate(rects: &[Rect], bounds: &Rect) -> Result<(), LayoutError> {
    if bounds.x1 >= bounds.x2 || bounds.y1 >= bounds.y2 || !Rect::room().contains_rect(bounds) {
        error!("Invalid min-cut bounds {:?}", bounds);
        return Err(LayoutError::OutOfBounds(*bounds));
    }
    for rect in rects {
        if rect.x1 >= rect.x2 || rect.y1 >= rect.y2 {
            error!("Rectangle {:?} invalid", rect);
            return Err(LayoutError::InvalidRectangle(*rect));
        }
        if !bounds.contains_rect(rect) {
            error!("Rectangle {:?} out of bounds {:?}", rect, bounds);
            return Err(LayoutError::OutOfBounds(*rect));
        }
    }
    Ok(())
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
enum Vertex {
    Source,
    Sink,
    Entry(Location),
    Exit(Location),
}

/// Sparse split-vertex flow network.
struct FlowNetwork {
    index: FnvHashMap<Vertex, usize>,
    vertices: Vec<Vertex>,
    edges: Vec<(usize, usize, u32)>,
}

impl FlowNetwork {
    fn new() -> Self {
        let mut network = FlowNetwork {
            index: FnvHashMap::default(),
            vertices: Vec::new(),
            edges: Vec::new(),
        };
        network.node(Vertex::Source);
        network.node(Vertex::Sink);
        network
    }

    fn node(&mut self, vertex: Vertex) -> usize {
        if let Some(&id) = self.index.get(&vertex) {
            return id;
        }
        let id = self.vertices.len();
        self.vertices.push(vertex);
        self.index.insert(vertex, id);
        id
    }

    fn add_edge(&mut self, from: Vertex, to: Vertex, capacity: u32) {
        let u = self.node(from);
        let v = self.node(to);
        self.edges.push((u, v, capacity));
    }

    /// Link the exit vertex of `loc` to every neighbor that traffic can enter.
    fn connect_neighbors(&mut self, tiles: &RoomDataArray<TileClass>, loc: Location) {
        for &(dx, dy) in &NEIGHBORS_8 {
            let Some(n) = loc.checked_add(dx as i16, dy as i16) else {
                continue;
            };
            if tiles.get(n.x() as usize, n.y() as usize).floods() {
                self.add_edge(Vertex::Exit(loc), Vertex::Entry(n), INF_CAP);
            }
        }
    }

    /// Run Dinic and return the flow value plus the source side of the minimum cut.
    fn solve(&self) -> (u32, FnvHashSet<Vertex>) {
        let num_nodes = self.vertices.len();
        let mut builder =
            <Net as rs_graph::builder::Buildable>::Builder::with_capacities(num_nodes, self.edges.len());
        let nodes: Vec<_> = (0..num_nodes).map(|_| builder.add_node()).collect();
        let mut capacities: Vec<u32> = Vec::with_capacity(self.edges.len());
        for &(u, v, cap) in &self.edges {
            builder.add_edge(nodes[u], nodes[v]);
            capacities.push(cap);
        }

        let graph = builder.into_graph();
        let src = nodes[0];
        let snk = nodes[1];

        let (value, _flow, mincut_nodes) = dinic(&graph, src, snk, |e| capacities[graph.edge_id(e)]);

        let cut_ids: FnvHashSet<usize> = mincut_nodes.iter().map(|n| graph.node_id(*n)).collect();
        let source_side = (0..num_nodes)
            .filter(|&i| cut_ids.contains(&graph.node_id(nodes[i])))
            .map(|i| self.vertices[i])
            .collect();

        (value, source_side)
    }
}

/// Compute the minimal set of tiles separating every protect rectangle from the exits.
pub fn compute_perimeter(grid: &WeightedGrid, rects: &[Rect], options: &MinCutOptions) -> Result<MinCutResult, LayoutError> {
    let bounds = options.bounds;
    validate(rects, &bounds)?;

    let mut tiles = classify_tiles(grid, &bounds);

    for rect in rects {
        for loc in rect.locations() {
            let tile = tiles.get_mut(loc.x() as usize, loc.y() as usize);
            if rect.is_on_border(loc) {
                if *tile == (TileClass::Open { weight: 0 }) {
                    *tile = TileClass::Protected;
                }
            } else {
                *tile = TileClass::Unwalkable;
            }
        }
    }

    let limit = match options.prefer_closer {
        true => options.prefer_closer_limit.unwrap_or(rects.len()),
        false => 0,
    };
    for rect in rects.iter().take(limit) {
        let padded = Rect::new(
            rect.x1.saturating_sub(RANGE_PADDING),
            rect.y1.saturating_sub(RANGE_PADDING),
            rect.x2.saturating_add(RANGE_PADDING).min(ROOM_WIDTH - 1),
            rect.y2.saturating_add(RANGE_PADDING).min(ROOM_HEIGHT - 1),
        );
        for loc in padded.locations() {
            let tile = tiles.get_mut(loc.x() as usize, loc.y() as usize);
            if let TileClass::Open { weight } = *tile {
                let bonus = RANGE_PADDING.saturating_sub(rect.distance_to(loc));
                *tile = TileClass::Open {
                    weight: weight.max(bonus),
                };
            }
        }
    }

    let mut network = FlowNetwork::new();
    let interior = bounds
        .locations()
        .filter(|l| !bounds.is_on_border(*l))
        .collect::<Vec<_>>();

    for &loc in &interior {
        match *tiles.get(loc.x() as usize, loc.y() as usize) {
            TileClass::Open { weight } => {
                network.add_edge(Vertex::Entry(loc), Vertex::Exit(loc), BASE_CAPACITY - weight as u32);
                network.connect_neighbors(&tiles, loc);
            }
            TileClass::Protected => {
                network.add_edge(Vertex::Source, Vertex::Entry(loc), INF_CAP);
                network.add_edge(Vertex::Entry(loc), Vertex::Exit(loc), BASE_CAPACITY - RANGE_PADDING as u32);
                network.connect_neighbors(&tiles, loc);
            }
            TileClass::CannotBuild => {
                network.add_edge(Vertex::Entry(loc), Vertex::Sink, INF_CAP);
            }
            TileClass::Unwalkable | TileClass::Exit => {}
        }
    }

    let (flow, source_side) = network.solve();
    if flow == 0 {
        return Ok(MinCutResult::default());
    }

    let mut cut: Vec<Location> = interior
        .iter()
        .copied()
        .filter(|l| source_side.contains(&Vertex::Entry(*l)) && !source_side.contains(&Vertex::Exit(*l)))
        .collect();

    let whole_room = bounds == Rect::room();
    if options.prune_dead_ends && !whole_room {
        cut = prune_dead_ends(grid, &cut);
    }

    debug!("Min-cut over {} rectangles: {} tiles, flow {}", rects.len(), cut.len(), flow);

    Ok(MinCutResult { cut, flow })
}

/// Drop cut tiles that no path from a room exit can reach.
pub fn prune_dead_ends(grid: &WeightedGrid, cut: &[Location]) -> Vec<Location> {
    let mut tiles = classify_tiles(grid, &Rect::room());
    for loc in cut {
        tiles.set(loc.x() as usize, loc.y() as usize, TileClass::Unwalkable);
    }

    let mut reached = RoomDataArray::new(false);
    let mut queue: VecDeque<Location> = VecDeque::new();
    for loc in Rect::room().locations() {
        if *tiles.get(loc.x() as usize, loc.y() as usize) == TileClass::Exit {
            reached.set(loc.x() as usize, loc.y() as usize, true);
            queue.push_back(loc);
        }
    }

    while let Some(loc) = queue.pop_front() {
        for &(dx, dy) in &NEIGHBORS_8 {
            let Some(n) = loc.checked_add(dx as i16, dy as i16) else {
                continue;
            };
            if *reached.get(n.x() as usize, n.y() as usize) {
                continue;
            }
            if tiles.get(n.x() as usize, n.y() as usize).floods() {
                reached.set(n.x() as usize, n.y() as usize, true);
                queue.push_back(n);
            }
        }
    }

    cut.iter()
        .copied()
        .filter(|loc| {
            NEIGHBORS_8.iter().any(|&(dx, dy)| {
                loc.checked_add(dx as i16, dy as i16)
                    .map(|n| reached.at(n))
                    .unwrap_or(false)
            })
        })
        .collect()
}

/// Split cut tiles into ramparts and walls.
///
/// A tile becomes a rampart when a walkable structure already sits on it
/// (traffic has to pass) or when it is next to a controller; anything else
/// is a wall.
pub fn classify_cut(grid: &WeightedGrid, cut: &[Location], controllers: &[Location]) -> (Vec<Location>, Vec<Location>) {
    cut.iter().copied().partition(|loc| {
        let walkable_structure = grid
            .structures_at(*loc)
            .iter()
            .any(|s| crate::structure::is_walkable(s.kind()));
        walkable_structure || controllers.iter().any(|c| c.distance_to(*loc) <= 1)
    })
}
