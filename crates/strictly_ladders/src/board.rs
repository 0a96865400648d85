//! Immutable board layout with flat redirect lookup tables.

use crate::invariants::{BoardInvariants, EntitiesOrdered, Invariant, InvariantSet, InvariantViolation};
use crate::{BoardDimension, GameError, Ladder, Point, Redirect, Snake};
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

/// A board: its dimension, its snakes and ladders, and the cells they trigger on.
///
/// Boards never change after construction, so sessions share them without
/// locking.
#[derive(Debug, Clone)]
pub struct Board {
    dimension: BoardDimension,
    snakes: Vec<Snake>,
    ladders: Vec<Ladder>,
    snake_heads: HashMap<usize, Snake>,
    ladder_bottoms: HashMap<usize, Ladder>,
}

/// Where chain resolution stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Final cell after every redirect was applied.
    pub cell: Point,
    /// Number of redirects followed.
    pub hops: usize,
    /// Resolution hit the N² bound (the layout contains a cycle).
    pub truncated: bool,
}

impl Board {
    /// Builds a board from hand-placed entities.
    ///
    /// Only the endpoints are checked: each must lie on a board of `dimension`.
    /// Placement rules are not enforced, so deliberately cyclic layouts can be
    /// built; use [`Board::validated`] for layouts that must satisfy them.
    /// When two entities trigger on the same cell the first one listed wins.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfiguration`] when an endpoint does not
    /// belong to a board of `dimension`.
    #[instrument(skip(snakes, ladders), fields(snakes = snakes.len(), ladders = ladders.len()))]
    pub fn new(
        dimension: BoardDimension,
        snakes: Vec<Snake>,
        ladders: Vec<Ladder>,
    ) -> Result<Self, GameError> {
        let board = Self::assemble(dimension, snakes, ladders);
        if !EntitiesOrdered::holds(&board) {
            return Err(GameError::InvalidConfiguration(
                EntitiesOrdered::description().to_string(),
            ));
        }
        Ok(board)
    }

    /// Builds a board and checks every placement rule.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfiguration`] listing each violated rule.
    #[instrument(skip(snakes, ladders), fields(snakes = snakes.len(), ladders = ladders.len()))]
    pub fn validated(
        dimension: BoardDimension,
        snakes: Vec<Snake>,
        ladders: Vec<Ladder>,
    ) -> Result<Self, GameError> {
        let board = Self::assemble(dimension, snakes, ladders);
        board.check_invariants().map_err(|violations| {
            let descriptions = violations
                .iter()
                .map(|v| v.description.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            GameError::InvalidConfiguration(descriptions)
        })?;
        Ok(board)
    }

    pub(crate) fn assemble(
        dimension: BoardDimension,
        snakes: Vec<Snake>,
        ladders: Vec<Ladder>,
    ) -> Self {
        let mut snake_heads = HashMap::with_capacity(snakes.len());
        for snake in &snakes {
            snake_heads.entry(snake.head().index()).or_insert(*snake);
        }
        let mut ladder_bottoms = HashMap::with_capacity(ladders.len());
        for ladder in &ladders {
            ladder_bottoms.entry(ladder.bottom().index()).or_insert(*ladder);
        }
        Self {
            dimension,
            snakes,
            ladders,
            snake_heads,
            ladder_bottoms,
        }
    }

    /// Returns the board dimension.
    pub fn dimension(&self) -> BoardDimension {
        self.dimension
    }

    /// Returns the snakes in placement order.
    pub fn snakes(&self) -> &[Snake] {
        &self.snakes
    }

    /// Returns the ladders in placement order.
    pub fn ladders(&self) -> &[Ladder] {
        &self.ladders
    }

    /// Checks every placement rule against this board.
    pub fn check_invariants(&self) -> Result<(), Vec<InvariantViolation>> {
        BoardInvariants::check_all(self)
    }

    /// Returns the redirect triggered by landing on `cell`, if any.
    ///
    /// Snake heads are consulted before ladder bottoms.
    pub fn redirect(&self, cell: usize) -> Option<Redirect> {
        if let Some(snake) = self.snake_heads.get(&cell) {
            return Some(Redirect::Snake {
                from: snake.head(),
                to: snake.tail(),
            });
        }
        self.ladder_bottoms.get(&cell).map(|ladder| Redirect::Ladder {
            from: ladder.bottom(),
            to: ladder.top(),
        })
    }

    /// Follows redirects from `landed` until a cell triggers nothing.
    ///
    /// At most N² redirects are followed; a cyclic layout stops wherever the
    /// bound is reached.
    #[instrument(skip(self), fields(landed = landed.index()))]
    pub fn resolve(&self, landed: Point) -> Resolution {
        let limit = self.dimension.cell_count();
        let mut cell = landed;
        let mut hops = 0;
        while let Some(redirect) = self.redirect(cell.index()) {
            if hops == limit {
                warn!(cell = cell.index(), hops, "Redirect chain hit iteration bound, stopping");
                return Resolution {
                    cell,
                    hops,
                    truncated: true,
                };
            }
            debug!(%redirect, "Following redirect");
            cell = redirect.destination();
            hops += 1;
        }
        Resolution {
            cell,
            hops,
            truncated: false,
        }
    }
}
