//! Randomized board generation by reject sampling.
//!
//! Each candidate entity is checked against the entities already accepted
//! and rejected on any conflict, so no repair pass ever runs. Every entity
//! type has a bounded attempt budget; exhausting it yields fewer entities.

use crate::{Board, BoardDimension, Ladder, Point, Snake};
use rand::Rng;
use std::collections::HashSet;
use tracing::{debug, info, instrument};

/// Fewest snakes or ladders a board aims for.
pub const MIN_ENTITIES: usize = 3;

/// Sampling attempts allowed per requested entity.
pub const ATTEMPTS_PER_ENTITY: usize = 200;

/// How many snakes and ladders a generation run aims to place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityTargets {
    /// Requested snake count.
    pub snakes: usize,
    /// Requested ladder count.
    pub ladders: usize,
}

/// Produces boards that satisfy every placement rule.
#[derive(Debug, Clone, Copy)]
pub struct BoardGenerator {
    dimension: BoardDimension,
}

impl BoardGenerator {
    /// Creates a generator for boards of the given dimension.
    pub fn new(dimension: BoardDimension) -> Self {
        Self { dimension }
    }

    /// Largest entity count for this dimension: N/2, but never below
    /// [`MIN_ENTITIES`].
    pub fn max_entities(&self) -> usize {
        (self.dimension.get() / 2).max(MIN_ENTITIES)
    }

    /// Draws target counts.
    ///
    /// The snake count is uniform over `[MIN_ENTITIES, max]`; the ladder count
    /// differs from it by −1, 0, or +1 and is clamped to the same range.
    pub fn targets<R: Rng + ?Sized>(&self, rng: &mut R) -> EntityTargets {
        let max = self.max_entities();
        let base = rng.random_range(MIN_ENTITIES..=max);
        let ladders = match rng.random_range(0..3u8) {
            0 => base.saturating_sub(1),
            1 => base,
            _ => base + 1,
        }
        .clamp(MIN_ENTITIES, max);
        EntityTargets {
            snakes: base,
            ladders,
        }
    }

    /// Generates a board.
    #[instrument(skip(self, rng), fields(dimension = %self.dimension))]
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Board {
        let targets = self.targets(rng);
        self.generate_with_targets(targets, rng)
    }

    /// Generates a board aiming for explicit entity counts.
    #[instrument(skip(self, rng), fields(dimension = %self.dimension))]
    pub fn generate_with_targets<R: Rng + ?Sized>(
        &self,
        targets: EntityTargets,
        rng: &mut R,
    ) -> Board {
        let ladders = self.place_ladders(targets.ladders, rng);
        let snakes = self.place_snakes(targets.snakes, &ladders, rng);

        info!(
            snakes = snakes.len(),
            ladders = ladders.len(),
            target_snakes = targets.snakes,
            target_ladders = targets.ladders,
            "Generated board"
        );

        let board = Board::assemble(self.dimension, snakes, ladders);
        debug_assert!(
            board.check_invariants().is_ok(),
            "generated board broke a placement rule: {:?}",
            board.check_invariants()
        );
        board
    }

    fn place_ladders<R: Rng + ?Sized>(&self, target: usize, rng: &mut R) -> Vec<Ladder> {
        let mut bottoms = HashSet::new();
        let mut tops = HashSet::new();
        let mut ladders = Vec::with_capacity(target);
        let budget = target * ATTEMPTS_PER_ENTITY;
        let mut attempts = 0;

        while ladders.len() < target && attempts < budget {
            attempts += 1;
            let (top, bottom) = self.sample_span(rng);
            if bottoms.contains(&bottom.index()) || tops.contains(&top.index()) {
                continue;
            }
            bottoms.insert(bottom.index());
            tops.insert(top.index());
            ladders.push(Ladder::spanning(bottom, top));
        }

        if ladders.len() < target {
            debug!(placed = ladders.len(), target, attempts, "Ladder attempt budget exhausted");
        }
        ladders
    }

    fn place_snakes<R: Rng + ?Sized>(
        &self,
        target: usize,
        ladders: &[Ladder],
        rng: &mut R,
    ) -> Vec<Snake> {
        let ladder_tops: HashSet<_> = ladders.iter().map(|l| l.top().index()).collect();
        let ladder_bottoms: HashSet<_> = ladders.iter().map(|l| l.bottom().index()).collect();
        let mut heads = HashSet::new();
        let mut snakes = Vec::with_capacity(target);
        let budget = target * ATTEMPTS_PER_ENTITY;
        let mut attempts = 0;

        while snakes.len() < target && attempts < budget {
            attempts += 1;
            let (head, tail) = self.sample_span(rng);
            let head_taken = heads.contains(&head.index())
                || ladder_tops.contains(&head.index())
                || ladder_bottoms.contains(&head.index());
            if head_taken || ladder_bottoms.contains(&tail.index()) {
                continue;
            }
            heads.insert(head.index());
            snakes.push(Snake::spanning(head, tail));
        }

        if snakes.len() < target {
            debug!(placed = snakes.len(), target, attempts, "Snake attempt budget exhausted");
        }

        let last = self.dimension.final_cell();
        let before = snakes.len();
        snakes.retain(|s| s.head().index() != last);
        if snakes.len() < before {
            debug!("Discarded snake with head on the final cell");
        }
        snakes
    }

    /// Samples two cells on different rows, returned as (upper, lower).
    fn sample_span<R: Rng + ?Sized>(&self, rng: &mut R) -> (Point, Point) {
        loop {
            let a = self.sample_point(rng);
            let b = self.sample_point(rng);
            if a.row() > b.row() {
                return (a, b);
            }
        }
    }

    fn sample_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Point {
        let n = self.dimension.get();
        Point::from_row_col(self.dimension, rng.random_range(0..n), rng.random_range(0..n))
    }
}
