//! One live game: an immutable board, mutable state, and its subscribers.

use crate::hub::{SubscriberHub, Subscription, Update};
use crate::sync::lock;
use crate::{SessionError, SessionId};
use rand::Rng;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use strictly_ladders::{
    Board, BoardDimension, BoardGenerator, DiceRoll, GameError, GameSnapshot, GameState,
    RollOutcome,
};
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Default)]
struct SessionState {
    game: GameState,
    version: u64,
}

impl SessionState {
    fn snapshot(&self, board: &Board) -> GameSnapshot {
        GameSnapshot::capture(board, &self.game, self.version)
    }

    /// Bumps the version and captures the snapshot to publish.
    fn commit(&mut self, board: &Board) -> GameSnapshot {
        self.version += 1;
        self.snapshot(board)
    }

    fn commit_outcome(&mut self, board: &Board, outcome: &RollOutcome) -> Option<GameSnapshot> {
        match outcome {
            RollOutcome::AlreadyFinished { winner } => {
                debug!(%winner, "Roll on finished game, nothing to publish");
                None
            }
            RollOutcome::Rolled(turn) => {
                info!(
                    player = %turn.player,
                    roll = %turn.roll,
                    movement = ?turn.movement,
                    "Turn played"
                );
                Some(self.commit(board))
            }
        }
    }
}

/// A game shared between concurrent requests.
///
/// All mutations of one session are serialized. Every successful mutation
/// bumps the session version while the lock is held and publishes the
/// resulting snapshot after releasing it, so a slow subscriber never stalls
/// gameplay.
#[derive(Debug)]
pub struct GameSession {
    id: SessionId,
    board: Board,
    state: Mutex<SessionState>,
    hub: Arc<SubscriberHub>,
}

impl GameSession {
    /// Creates a session around an existing board.
    #[instrument(skip(board), fields(grid = board.dimension().get()))]
    pub fn new(id: SessionId, board: Board, queue_capacity: NonZeroUsize) -> Self {
        Self {
            id,
            board,
            state: Mutex::new(SessionState::default()),
            hub: Arc::new(SubscriberHub::new(queue_capacity)),
        }
    }

    /// Creates a session on a freshly generated board.
    #[instrument(skip(rng))]
    pub fn generate<R: Rng + ?Sized>(
        id: SessionId,
        dimension: BoardDimension,
        queue_capacity: NonZeroUsize,
        rng: &mut R,
    ) -> Self {
        let board = BoardGenerator::new(dimension).generate(rng);
        info!(
            snakes = board.snakes().len(),
            ladders = board.ladders().len(),
            "Board generated"
        );
        Self::new(id, board, queue_capacity)
    }

    /// Session identifier.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The board, fixed for the life of the session.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.hub.len()
    }

    /// Current snapshot.
    pub fn state(&self) -> GameSnapshot {
        lock(&self.state, "session").snapshot(&self.board)
    }

    /// Adds a player and returns the resulting snapshot.
    ///
    /// # Errors
    ///
    /// Fails if the name is taken or the game has finished.
    #[instrument(skip(self), fields(session = %self.id))]
    pub fn add_player(&self, name: &str) -> Result<GameSnapshot, GameError> {
        let snapshot = {
            let mut state = lock(&self.state, "session");
            state.game.add_player(name)?;
            state.commit(&self.board)
        };
        self.publish(&snapshot);
        Ok(snapshot)
    }

    /// Rolls the die for the current player using the thread RNG.
    ///
    /// # Errors
    ///
    /// Fails while fewer than two players have joined.
    pub fn roll_dice(&self) -> Result<RollOutcome, GameError> {
        self.roll_dice_with(&mut rand::rng())
    }

    /// Rolls the die for the current player using `rng`.
    ///
    /// A finished game reports its winner, changes nothing, and draws nothing
    /// from `rng`.
    ///
    /// # Errors
    ///
    /// Fails while fewer than two players have joined.
    #[instrument(skip(self, rng), fields(session = %self.id))]
    pub fn roll_dice_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<RollOutcome, GameError> {
        let (outcome, snapshot) = {
            let mut state = lock(&self.state, "session");
            let outcome = state.game.roll(&self.board, rng)?;
            let snapshot = state.commit_outcome(&self.board, &outcome);
            (outcome, snapshot)
        };
        if let Some(snapshot) = snapshot {
            self.publish(&snapshot);
        }
        Ok(outcome)
    }

    /// Plays the current player's turn with a predetermined roll.
    ///
    /// # Errors
    ///
    /// Fails while fewer than two players have joined.
    #[instrument(skip(self), fields(session = %self.id))]
    pub fn apply_roll(&self, roll: DiceRoll) -> Result<RollOutcome, GameError> {
        let (outcome, snapshot) = {
            let mut state = lock(&self.state, "session");
            let outcome = state.game.apply_roll(&self.board, roll)?;
            let snapshot = state.commit_outcome(&self.board, &outcome);
            (outcome, snapshot)
        };
        if let Some(snapshot) = snapshot {
            self.publish(&snapshot);
        }
        Ok(outcome)
    }

    /// Subscribes to snapshots of this session.
    ///
    /// The subscription's queue starts with the current snapshot.
    ///
    /// # Errors
    ///
    /// Fails only if the snapshot cannot be encoded.
    #[instrument(skip(self), fields(session = %self.id))]
    pub fn subscribe(&self) -> Result<Subscription, SessionError> {
        let state = lock(&self.state, "session");
        let initial = Update::encode(&state.snapshot(&self.board))?;
        let subscription = self.hub.register(initial);
        info!(subscriber = subscription.id(), "Subscribed");
        Ok(subscription)
    }

    /// Offers `snapshot` to every subscriber without waiting on any of them.
    fn publish(&self, snapshot: &GameSnapshot) {
        match Update::encode(snapshot) {
            Ok(update) => {
                self.hub.broadcast(&update);
            }
            Err(e) => warn!(error = %e, version = snapshot.version, "Snapshot not published"),
        }
    }
}
