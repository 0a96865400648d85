//! Plays a session to completion without a network in between.

use crate::GameSession;
use rand::Rng;
use strictly_ladders::{GameError, RollOutcome, TurnReport};
use tracing::{debug, info, instrument};

/// Result of an automated playthrough.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playthrough {
    /// Every turn played, in order.
    pub turns: Vec<TurnReport>,
    /// Winner, if one emerged within the turn limit.
    pub winner: Option<String>,
}

/// Rolls for each player in turn until someone wins or `max_turns` pass.
///
/// # Errors
///
/// Fails if fewer than two players have joined.
#[instrument(skip(session, rng), fields(session = %session.id()))]
pub fn play_out<R: Rng + ?Sized>(
    session: &GameSession,
    rng: &mut R,
    max_turns: usize,
) -> Result<Playthrough, GameError> {
    let mut turns = Vec::new();
    while turns.len() < max_turns {
        match session.roll_dice_with(rng)? {
            RollOutcome::AlreadyFinished { winner } => {
                return Ok(Playthrough {
                    turns,
                    winner: Some(winner),
                });
            }
            RollOutcome::Rolled(turn) => {
                debug!(turn = turns.len() + 1, player = %turn.player, roll = %turn.roll, "Turn");
                let winner = turn.winner.clone();
                turns.push(turn);
                if let Some(winner) = winner {
                    info!(%winner, turns = turns.len(), "Game won");
                    return Ok(Playthrough {
                        turns,
                        winner: Some(winner),
                    });
                }
            }
        }
    }
    info!(turns = turns.len(), "Turn limit reached without a winner");
    Ok(Playthrough {
        turns,
        winner: None,
    })
}
