//! Strictly Ladders - snakes-and-ladders game logic
//!
//! Pure, synchronous game rules with no I/O. The server crate wraps these
//! types in locks and fan-out; everything here is single-owner.
//!
//! # Architecture
//!
//! - **Geometry**: [`BoardDimension`] and row-major [`Point`]s
//! - **Entities**: [`Snake`]s, [`Ladder`]s and the [`Redirect`]s they trigger
//! - **Board**: immutable layout with flat lookup tables and chain resolution
//! - **Generator**: reject-sampling [`BoardGenerator`] with bounded attempts
//! - **Game**: the [`GameState`] turn state machine
//! - **Invariants**: first-class, composable placement and turn rules
//!
//! # Example
//!
//! ```
//! use strictly_ladders::{BoardDimension, BoardGenerator, GameState};
//!
//! # fn example() -> Result<(), strictly_ladders::GameError> {
//! let dimension = BoardDimension::new(10)?;
//! let board = BoardGenerator::new(dimension).generate(&mut rand::rng());
//!
//! let mut game = GameState::new();
//! game.add_player("Arun")?;
//! game.add_player("Megha")?;
//! let outcome = game.roll(&board, &mut rand::rng())?;
//! assert!(outcome.roll().is_some());
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod board;
mod dice;
mod entity;
mod error;
mod game;
mod generator;
pub mod invariants;
mod point;
mod snapshot;

pub use board::{Board, Resolution};
pub use dice::DiceRoll;
pub use entity::{Ladder, Redirect, Snake};
pub use error::GameError;
pub use game::{GamePhase, GameState, Movement, Player, RollOutcome, TurnReport};
pub use generator::{ATTEMPTS_PER_ENTITY, BoardGenerator, EntityTargets, MIN_ENTITIES};
pub use invariants::{Invariant, InvariantSet, InvariantViolation};
pub use point::{BoardDimension, MAX_DIMENSION, Point};
pub use snapshot::GameSnapshot;
