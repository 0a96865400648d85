//! Serializable point-in-time view of a game.

use crate::{Board, GamePhase, GameState, Ladder, Player, Snake};
use serde::{Deserialize, Serialize};

/// Complete observable state of a game.
///
/// Every delivery path (pull queries and pushed updates) uses this one shape.
/// Each snapshot is authoritative on its own; none is a diff of another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    /// Board side length N.
    pub grid_size: usize,
    /// Players in turn order.
    pub players: Vec<Player>,
    /// Snakes on the board.
    pub snakes: Vec<Snake>,
    /// Ladders on the board.
    pub ladders: Vec<Ladder>,
    /// Index into `players` of whoever rolls next.
    pub turn_index: usize,
    /// Last face rolled, 0 before the first roll.
    pub last_roll: u8,
    /// Winner's name, absent until decided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
    /// Lifecycle phase.
    pub phase: GamePhase,
    /// Mutation counter of the owning session; later snapshots carry larger values.
    pub version: u64,
}

impl GameSnapshot {
    /// Captures an independent copy of `board` and `state`.
    pub fn capture(board: &Board, state: &GameState, version: u64) -> Self {
        Self {
            grid_size: board.dimension().get(),
            players: state.players().to_vec(),
            snakes: board.snakes().to_vec(),
            ladders: board.ladders().to_vec(),
            turn_index: state.turn_index(),
            last_roll: state.last_roll().map_or(0, |r| r.value()),
            winner: state.winner().map(str::to_string),
            phase: state.phase(),
            version,
        }
    }
}
