//! Candidate evaluation.
//!
//! Each origin runs the layer stack on its own clone of the room grid. The
//! first failing layer rejects the candidate and its phase is recorded; a
//! candidate that clears every layer is scored. Origins can be split across
//! scoped worker threads in contiguous chunks, and chunk results are merged
//! in origin order, so the winner does not depend on the thread count.

use crate::error::LayoutError;
use crate::grid::WeightedGrid;
use crate::layer::*;
use crate::location::*;
use crate::plan::LayoutScore;
use log::*;
use std::thread;

/// Why a candidate origin was dropped.
#[derive(Clone, Debug, PartialEq)]
pub struct Rejection {
    pub origin: Location,
    pub phase: CandidatePhase,
    pub reason: LayoutError,
}

/// Run every layer on a fresh clone of `base` for one origin.
pub fn evaluate_candidate(
    base: &WeightedGrid,
    room: &RoomContext,
    layers: &[Box<dyn LayoutLayer>],
    origin: Location,
) -> Result<(Candidate, LayoutScore), Rejection> {
    let mut candidate = Candidate::new(origin, base.clone());

    for layer in layers {
        if !layer.is_applicable(&candidate, room) {
            continue;
        }
        candidate.phase = layer.phase();
        if let Err(reason) = layer.apply(&mut candidate, room) {
            debug!(
                "Origin {:?} rejected by {} during {:?}: {}",
                origin,
                layer.name(),
                candidate.phase,
                reason
            );
            return Err(Rejection {
                origin,
                phase: candidate.phase,
                reason,
            });
        }
    }

    candidate.phase = CandidatePhase::Scored;
    let score = candidate.to_layout_score();
    debug!("Origin {:?} accepted with score {}", origin, score.total);

    Ok((candidate, score))
}

/// Outcome of evaluating a list of origins.
#[derive(Default)]
pub struct Evaluation {
    /// Index into the origin list, candidate and score of the best layout.
    pub best: Option<(usize, Candidate, LayoutScore)>,
    pub accepted: usize,
    pub rejections: Vec<Rejection>,
}

impl Evaluation {
    fn record(&mut self, index: usize, outcome: Result<(Candidate, LayoutScore), Rejection>) {
        match outcome {
            Ok((candidate, score)) => {
                self.accepted += 1;
                self.offer(index, candidate, score);
            }
            Err(rejection) => self.rejections.push(rejection),
        }
    }

    /// Keep the lower total; an equal total keeps the earlier origin.
    fn offer(&mut self, index: usize, candidate: Candidate, score: LayoutScore) {
        let better = match &self.best {
            None => true,
            Some((best_index, _, best)) => score.total.total_cmp(&best.total).then(index.cmp(best_index)).is_lt(),
        };
        if better {
            self.best = Some((index, candidate, score));
        }
    }

    /// Fold in the results of a later chunk of origins.
    fn merge(&mut self, other: Evaluation) {
        self.accepted += other.accepted;
        self.rejections.extend(other.rejections);
        if let Some((index, candidate, score)) = other.best {
            self.offer(index, candidate, score);
        }
    }
}

fn evaluate_chunk(
    base: &WeightedGrid,
    room: &RoomContext,
    layers: &[Box<dyn LayoutLayer>],
    origins: &[Location],
    offset: usize,
) -> Evaluation {
    let mut evaluation = Evaluation::default();
    for (i, origin) in origins.iter().enumerate() {
        evaluation.record(offset + i, evaluate_candidate(base, room, layers, *origin));
    }
    evaluation
}

/// Evaluate every origin, splitting the list over up to `threads` workers.
pub fn evaluate_origins(
    base: &WeightedGrid,
    room: &RoomContext,
    layers: &[Box<dyn LayoutLayer>],
    origins: &[Location],
    threads: usize,
) -> Evaluation {
    let threads = threads.max(1).min(origins.len().max(1));
    if threads == 1 {
        return evaluate_chunk(base, room, layers, origins, 0);
    }

    let chunk_size = origins.len().div_ceil(threads);
    thread::scope(|scope| {
        let handles: Vec<_> = origins
            .chunks(chunk_size)
            .enumerate()
            .map(|(i, chunk)| scope.spawn(move || evaluate_chunk(base, room, layers, chunk, i * chunk_size)))
            .collect();

        let mut evaluation = Evaluation::default();
        for handle in handles {
            let chunk = handle.join().unwrap_or_else(|e| std::panic::resume_unwind(e));
            evaluation.merge(chunk);
        }
        evaluation
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::grid::test_support::*;
    use crate::structure::StructureVariant;

    /// Scores each candidate by the x coordinate of its origin.
    struct ScoreByColumn;

    impl LayoutLayer for ScoreByColumn {
        fn name(&self) -> &str {
            "score_by_column"
        }

        fn phase(&self) -> CandidatePhase {
            CandidatePhase::CandidateEvaluation
        }

        fn apply(&self, candidate: &mut Candidate, _room: &RoomContext) -> Result<(), LayoutError> {
            if candidate.origin.x() % 5 == 0 {
                return Err(LayoutError::InfeasibleSpace);
            }
            let origin = candidate.origin;
            candidate.place(StructureVariant::Spawn, 1, &[origin])?;
            candidate.push_score("column", (origin.x() % 3) as f32, 1.0);
            Ok(())
        }
    }

    fn origins() -> Vec<Location> {
        (1..30).map(|x| Location::from_xy(x, 20)).collect()
    }

    #[test]
    fn rejections_carry_phase_and_reason() {
        let grid = open_grid();
        let room = RoomContext::new(&grid, LayoutConfig::default());
        let layers: Vec<Box<dyn LayoutLayer>> = vec![Box::new(ScoreByColumn)];

        let rejection = evaluate_candidate(&grid, &room, &layers, Location::from_xy(10, 20))
            .err()
            .unwrap();
        assert_eq!(rejection.phase, CandidatePhase::CandidateEvaluation);
        assert_eq!(rejection.reason, LayoutError::InfeasibleSpace);

        let (candidate, _) = evaluate_candidate(&grid, &room, &layers, Location::from_xy(11, 20)).unwrap();
        assert_eq!(candidate.phase, CandidatePhase::Scored);
        assert_eq!(grid.placements().count(), 0);
    }

    #[test]
    fn ties_go_to_the_earliest_origin_for_any_thread_count() {
        let grid = open_grid();
        let room = RoomContext::new(&grid, LayoutConfig::default());
        let layers: Vec<Box<dyn LayoutLayer>> = vec![Box::new(ScoreByColumn)];
        let origins = origins();

        for threads in [1, 2, 3, 7] {
            let evaluation = evaluate_origins(&grid, &room, &layers, &origins, threads);
            let (index, candidate, score) = evaluation.best.unwrap();
            assert_eq!(index, 2, "threads = {}", threads);
            assert_eq!(candidate.origin, Location::from_xy(3, 20));
            assert_eq!(score.total, 0.0);
            assert_eq!(evaluation.rejections.len(), 5);
            assert_eq!(evaluation.accepted, origins.len() - 5);

            let rejected: Vec<u8> = evaluation.rejections.iter().map(|r| r.origin.x()).collect();
            assert_eq!(rejected, vec![5, 10, 15, 20, 25]);
        }
    }
}
