//! Public API for the layout synthesizer.
//!
//! `LayoutSynthesizer` holds an ordered layer stack, the tuning config and
//! the quota table. Layers are appended in order; the default stack is the
//! one from `layers::default_layers`. Every passable interior tile (or the
//! configured origin list) is tried as the first spawn and the lowest scoring
//! accepted candidate becomes the room layout.

use crate::allocator::QuotaTable;
use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::grid::WeightedGrid;
use crate::layer::*;
use crate::layers::default_layers;
use crate::location::*;
use crate::pipeline::*;
use crate::plan::*;
use crate::room_data::RoomDataSource;
use log::*;
use std::sync::Arc;
use std::thread;

/// Everything learned from one synthesis run.
#[derive(Clone, Debug)]
pub struct SynthesisReport {
    /// The winning layout, if any candidate was accepted.
    pub layout: Option<RoomLayout>,
    pub accepted: usize,
    /// Number of origins evaluated.
    pub candidates: usize,
    /// Every rejected origin with the phase it failed in, in origin order.
    pub rejections: Vec<Rejection>,
}

pub struct LayoutSynthesizer {
    layers: Vec<Box<dyn LayoutLayer>>,
    config: LayoutConfig,
    quotas: Arc<QuotaTable>,
}

impl LayoutSynthesizer {
    /// Synthesizer with the default layer stack.
    pub fn new(config: LayoutConfig) -> Self {
        LayoutSynthesizer {
            layers: default_layers(),
            config,
            quotas: Arc::new(QuotaTable::default()),
        }
    }

    /// Synthesizer with no layers; add them with `add_layer`.
    pub fn empty(config: LayoutConfig) -> Self {
        LayoutSynthesizer {
            layers: Vec::new(),
            config,
            quotas: Arc::new(QuotaTable::default()),
        }
    }

    /// Append a layer to the end of the stack.
    pub fn add_layer(mut self, layer: Box<dyn LayoutLayer>) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn with_config(mut self, config: LayoutConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_quotas(mut self, quotas: QuotaTable) -> Self {
        self.quotas = Arc::new(quotas);
        self
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.name()).collect()
    }

    fn prepare(&self, room: &dyn RoomDataSource) -> (WeightedGrid, RoomContext) {
        let grid = WeightedGrid::from_room(room, self.quotas.clone());
        let context = RoomContext::new(&grid, self.config.clone());
        (grid, context)
    }

    /// Origins to try, row-major unless the config supplies a list.
    fn candidate_origins(&self, grid: &WeightedGrid) -> Vec<Location> {
        let usable = |loc: &Location| loc.in_build_range() && grid.is_passable(*loc);
        match &self.config.origins {
            Some(origins) => origins.iter().copied().filter(usable).collect(),
            None => Rect::room().locations().filter(usable).collect(),
        }
    }

    fn to_layout(candidate: Candidate, score: LayoutScore) -> RoomLayout {
        let center = candidate.get_landmark("center").unwrap_or(candidate.origin);
        let first_spawn = candidate.get_landmark("first_spawn").unwrap_or(candidate.origin);
        RoomLayout::from_grid(
            &candidate.grid,
            center,
            first_spawn,
            candidate.free_space,
            candidate.upgraders,
            score,
        )
    }

    /// Evaluate every candidate origin and keep the best layout.
    pub fn synthesize(&self, room: &dyn RoomDataSource) -> SynthesisReport {
        let (grid, context) = self.prepare(room);
        let origins = self.candidate_origins(&grid);

        debug!(
            "Synthesizing over {} origins with {} layers",
            origins.len(),
            self.layers.len()
        );

        let evaluation = evaluate_origins(&grid, &context, &self.layers, &origins, self.config.effective_threads());
        let layout = evaluation.best.map(|(index, candidate, score)| {
            info!(
                "Committed layout from origin {:?} ({} of {}), score {}",
                origins[index],
                evaluation.accepted,
                origins.len(),
                score.total
            );
            Self::to_layout(candidate, score)
        });

        SynthesisReport {
            layout,
            accepted: evaluation.accepted,
            candidates: origins.len(),
            rejections: evaluation.rejections,
        }
    }

    /// Like `synthesize`, but only the layout; `NoViableLayout` if every origin failed.
    pub fn synthesize_layout(&self, room: &dyn RoomDataSource) -> Result<RoomLayout, LayoutError> {
        let report = self.synthesize(room);
        report
            .layout
            .ok_or(LayoutError::NoViableLayout {
                candidates: report.candidates,
            })
    }

    /// Run the layer stack for a single origin.
    pub fn evaluate_origin(&self, room: &dyn RoomDataSource, origin: Location) -> Result<RoomLayout, Rejection> {
        let (grid, context) = self.prepare(room);
        let (candidate, score) = evaluate_candidate(&grid, &context, &self.layers, origin)?;
        Ok(Self::to_layout(candidate, score))
    }

    /// Synthesize several rooms, one scoped thread each. Results keep the
    /// input order and one room's failure does not affect the others.
    pub fn synthesize_rooms<R: RoomDataSource + Sync>(&self, rooms: &[R]) -> Vec<Result<RoomLayout, LayoutError>> {
        thread::scope(|scope| {
            let handles: Vec<_> = rooms
                .iter()
                .map(|room| scope.spawn(move || self.synthesize_layout(room)))
                .collect();

            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                .collect()
        })
    }
}

impl Default for LayoutSynthesizer {
    /// The default 13-layer stack with default tuning.
    fn default() -> Self {
        LayoutSynthesizer::new(LayoutConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room_data::*;
    use crate::structure::StructureVariant;

    struct SpawnOnly;

    impl LayoutLayer for SpawnOnly {
        fn name(&self) -> &str {
            "spawn_only"
        }

        fn phase(&self) -> CandidatePhase {
            CandidatePhase::CandidateEvaluation
        }

        fn apply(&self, candidate: &mut Candidate, _room: &RoomContext) -> Result<(), LayoutError> {
            let origin = candidate.origin;
            if candidate.place(StructureVariant::Spawn, 1, &[origin])? == 0 {
                return Err(LayoutError::InfeasibleSpace);
            }
            candidate.set_landmark("first_spawn", origin);
            Ok(())
        }
    }

    fn pocket_room() -> RoomData {
        let terrain: String = (0..2500)
            .map(|i| {
                let (x, y) = (i % 50, i / 50);
                if (20..23).contains(&x) && (20..23).contains(&y) {
                    '0'
                } else {
                    '1'
                }
            })
            .collect();
        RoomData::from_terrain_string(&terrain, vec![RoomObject::new(RoomObjectKind::Controller, 21, 21)]).unwrap()
    }

    #[test]
    fn default_stack_has_every_layer() {
        let synthesizer = LayoutSynthesizer::default();
        assert_eq!(synthesizer.layer_names().len(), 13);
        assert_eq!(synthesizer.layer_names()[0], "spawn");
        assert_eq!(synthesizer.layer_names()[12], "reachability");
    }

    #[test]
    fn origins_skip_impassable_tiles() {
        let synthesizer = LayoutSynthesizer::empty(LayoutConfig::default()).add_layer(Box::new(SpawnOnly));
        let report = synthesizer.synthesize(&pocket_room());

        // Nine open tiles, one of them under the controller.
        assert_eq!(report.candidates, 8);
        assert_eq!(report.accepted, 8);
        let layout = report.layout.unwrap();
        assert_eq!(layout.first_spawn, Location::from_xy(20, 20));
    }

    #[test]
    fn configured_origins_are_filtered() {
        let config = LayoutConfig::default().origins(vec![
            Location::from_xy(5, 5),
            Location::from_xy(22, 22),
            Location::from_xy(21, 21),
        ]);
        let synthesizer = LayoutSynthesizer::empty(config).add_layer(Box::new(SpawnOnly));
        let report = synthesizer.synthesize(&pocket_room());

        assert_eq!(report.candidates, 1);
        assert_eq!(report.layout.unwrap().first_spawn, Location::from_xy(22, 22));
    }

    #[test]
    fn pocket_room_has_no_viable_layout() {
        let synthesizer = LayoutSynthesizer::default().with_config(LayoutConfig::default().worker_threads(2));
        let result = synthesizer.synthesize_layout(&pocket_room());
        assert_eq!(result.unwrap_err(), LayoutError::NoViableLayout { candidates: 8 });
    }

    #[test]
    fn rooms_are_isolated() {
        let synthesizer = LayoutSynthesizer::empty(LayoutConfig::default().worker_threads(1)).add_layer(Box::new(SpawnOnly));
        let empty = RoomData::from_terrain_string(&"1".repeat(2500), Vec::new()).unwrap();
        let results = synthesizer.synthesize_rooms(&[pocket_room(), empty]);

        assert!(results[0].is_ok());
        assert_eq!(results[1].clone().unwrap_err(), LayoutError::NoViableLayout { candidates: 0 });
    }
}
