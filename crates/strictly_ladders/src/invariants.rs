//! First-class invariants for boards and turn state.
//!
//! Invariants are logical properties that must hold outside every mutation.
//! They are testable independently and checked in debug builds after board
//! generation and after every roll.

use crate::{Board, GameState};
use std::collections::HashSet;

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("{}", description)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
///
/// Implemented for tuples of up to seven invariants.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set.
    ///
    /// Returns `Ok(())` if all invariants hold, or every violation otherwise.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

macro_rules! impl_invariant_set {
    ($($inv:ident),+) => {
        impl<S, $($inv),+> InvariantSet<S> for ($($inv,)+)
        where
            $($inv: Invariant<S>),+
        {
            fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
                let mut violations = Vec::new();
                $(
                    if !$inv::holds(state) {
                        violations.push(InvariantViolation::new($inv::description()));
                    }
                )+
                if violations.is_empty() {
                    Ok(())
                } else {
                    Err(violations)
                }
            }
        }
    };
}

impl_invariant_set!(I1);
impl_invariant_set!(I1, I2);
impl_invariant_set!(I1, I2, I3);
impl_invariant_set!(I1, I2, I3, I4);
impl_invariant_set!(I1, I2, I3, I4, I5);
impl_invariant_set!(I1, I2, I3, I4, I5, I6);
impl_invariant_set!(I1, I2, I3, I4, I5, I6, I7);

// ─────────────────────────────────────────────────────────────
//  Board invariants
// ─────────────────────────────────────────────────────────────

fn all_distinct(cells: impl IntoIterator<Item = usize>) -> bool {
    let mut seen = HashSet::new();
    cells.into_iter().all(|cell| seen.insert(cell))
}

/// Every endpoint lies on the board and every entity points the right way.
pub struct EntitiesOrdered;

impl Invariant<Board> for EntitiesOrdered {
    fn holds(board: &Board) -> bool {
        let dim = board.dimension();
        let ladders_ok = board.ladders().iter().all(|l| {
            l.top().fits(dim) && l.bottom().fits(dim) && l.top().row() > l.bottom().row()
        });
        let snakes_ok = board.snakes().iter().all(|s| {
            s.head().fits(dim) && s.tail().fits(dim) && s.head().row() > s.tail().row()
        });
        ladders_ok && snakes_ok
    }

    fn description() -> &'static str {
        "Endpoints lie on the board; ladder tops and snake heads sit on strictly higher rows"
    }
}

/// No two ladders share a bottom cell or a top cell.
pub struct LadderEndsUnique;

impl Invariant<Board> for LadderEndsUnique {
    fn holds(board: &Board) -> bool {
        all_distinct(board.ladders().iter().map(|l| l.bottom().index()))
            && all_distinct(board.ladders().iter().map(|l| l.top().index()))
    }

    fn description() -> &'static str {
        "No two ladders share a bottom or a top"
    }
}

/// No two snakes share a head cell.
pub struct SnakeHeadsUnique;

impl Invariant<Board> for SnakeHeadsUnique {
    fn holds(board: &Board) -> bool {
        all_distinct(board.snakes().iter().map(|s| s.head().index()))
    }

    fn description() -> &'static str {
        "No two snakes share a head"
    }
}

/// A piece that climbs a ladder is never bitten on arrival.
pub struct SnakeHeadOffLadderTop;

impl Invariant<Board> for SnakeHeadOffLadderTop {
    fn holds(board: &Board) -> bool {
        let tops: HashSet<_> = board.ladders().iter().map(|l| l.top().index()).collect();
        board.snakes().iter().all(|s| !tops.contains(&s.head().index()))
    }

    fn description() -> &'static str {
        "No snake head sits on a ladder top"
    }
}

/// A piece dropped by a snake is never lifted straight back up.
pub struct LadderBottomOffSnakeTail;

impl Invariant<Board> for LadderBottomOffSnakeTail {
    fn holds(board: &Board) -> bool {
        let tails: HashSet<_> = board.snakes().iter().map(|s| s.tail().index()).collect();
        board.ladders().iter().all(|l| !tails.contains(&l.bottom().index()))
    }

    fn description() -> &'static str {
        "No ladder bottom sits on a snake tail"
    }
}

/// The winning cell never redirects a piece away.
pub struct FinalCellSafe;

impl Invariant<Board> for FinalCellSafe {
    fn holds(board: &Board) -> bool {
        let last = board.dimension().final_cell();
        board.snakes().iter().all(|s| s.head().index() != last)
    }

    fn description() -> &'static str {
        "No snake head sits on the final cell"
    }
}

/// A cell triggers at most one redirect.
pub struct SingleTriggerPerCell;

impl Invariant<Board> for SingleTriggerPerCell {
    fn holds(board: &Board) -> bool {
        let bottoms: HashSet<_> = board.ladders().iter().map(|l| l.bottom().index()).collect();
        board.snakes().iter().all(|s| !bottoms.contains(&s.head().index()))
    }

    fn description() -> &'static str {
        "No snake head sits on a ladder bottom"
    }
}

/// Every placement rule a generated board satisfies.
pub type BoardInvariants = (
    EntitiesOrdered,
    LadderEndsUnique,
    SnakeHeadsUnique,
    SnakeHeadOffLadderTop,
    LadderBottomOffSnakeTail,
    FinalCellSafe,
    SingleTriggerPerCell,
);

// ─────────────────────────────────────────────────────────────
//  Turn state invariants
// ─────────────────────────────────────────────────────────────

/// The turn index points at a player whenever anyone has joined.
pub struct TurnIndexInBounds;

impl Invariant<GameState> for TurnIndexInBounds {
    fn holds(state: &GameState) -> bool {
        state.players().is_empty() || state.turn_index() < state.players().len()
    }

    fn description() -> &'static str {
        "Turn index is a valid player index"
    }
}

/// A declared winner is one of the joined players.
pub struct WinnerIsPlayer;

impl Invariant<GameState> for WinnerIsPlayer {
    fn holds(state: &GameState) -> bool {
        match state.winner() {
            None => true,
            Some(name) => state.players().iter().any(|p| p.name() == name),
        }
    }

    fn description() -> &'static str {
        "Winner names a joined player"
    }
}

/// Player names are unique, ignoring case.
pub struct PlayerNamesUnique;

impl Invariant<GameState> for PlayerNamesUnique {
    fn holds(state: &GameState) -> bool {
        let mut seen = HashSet::new();
        state
            .players()
            .iter()
            .all(|p| seen.insert(p.name().to_lowercase()))
    }

    fn description() -> &'static str {
        "Player names are unique (case-insensitive)"
    }
}

/// Every turn-state rule.
pub type GameInvariants = (TurnIndexInBounds, WinnerIsPlayer, PlayerNamesUnique);
