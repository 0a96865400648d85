//! End-to-end tests of the game rules through the public API.

use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashSet;
use strictly_ladders::{
    Board, BoardDimension, BoardGenerator, DiceRoll, GameError, GamePhase, GameState, Ladder,
    Movement, Point, RollOutcome, Snake,
};

fn dim() -> BoardDimension {
    BoardDimension::new(10).expect("valid dimension")
}

fn pt(index: usize) -> Point {
    Point::from_index(dim(), index).expect("on board")
}

fn roll(v: u8) -> DiceRoll {
    DiceRoll::new(v).expect("valid face")
}

fn joined(names: &[&str]) -> GameState {
    let mut state = GameState::new();
    for name in names {
        state.add_player(*name).expect("join");
    }
    state
}

#[test]
fn test_generated_boards_respect_placement_rules() {
    for n in [2, 4, 8, 10, 25] {
        let dimension = BoardDimension::new(n).expect("valid dimension");
        let generator = BoardGenerator::new(dimension);
        for seed in 0..100 {
            let board = generator.generate(&mut StdRng::seed_from_u64(seed));

            for l in board.ladders() {
                assert!(l.top().row() > l.bottom().row());
                assert!(l.top().row() < n && l.top().col() < n);
                assert!(l.bottom().row() < n && l.bottom().col() < n);
            }
            for s in board.snakes() {
                assert!(s.head().row() > s.tail().row());
                assert!(s.head().row() < n && s.head().col() < n);
                assert!(s.tail().row() < n && s.tail().col() < n);
                assert_ne!(s.head().index(), dimension.final_cell());
            }

            let bottoms: HashSet<_> = board.ladders().iter().map(|l| l.bottom().index()).collect();
            let tops: HashSet<_> = board.ladders().iter().map(|l| l.top().index()).collect();
            let heads: HashSet<_> = board.snakes().iter().map(|s| s.head().index()).collect();
            assert_eq!(bottoms.len(), board.ladders().len(), "shared ladder bottom");
            assert_eq!(tops.len(), board.ladders().len(), "shared ladder top");
            assert_eq!(heads.len(), board.snakes().len(), "shared snake head");
            assert!(heads.is_disjoint(&tops), "snake head on ladder top");
            for s in board.snakes() {
                assert!(!bottoms.contains(&s.tail().index()), "ladder bottom on snake tail");
            }
        }
    }
}

#[test]
fn test_unplaced_player_climbs_chained_ladders() {
    let board = Board::new(
        dim(),
        vec![],
        vec![
            Ladder::new(pt(5), pt(23)).expect("ladder"),
            Ladder::new(pt(23), pt(47)).expect("ladder"),
        ],
    )
    .expect("board");
    let mut state = joined(&["A", "B"]);

    state.apply_roll(&board, roll(6)).expect("roll");
    assert_eq!(state.players()[0].position(), Some(pt(47)));
}

#[test]
fn test_player_at_29_slides_down_chained_snakes() {
    let board = Board::new(
        dim(),
        vec![
            Snake::new(pt(30), pt(12)).expect("snake"),
            Snake::new(pt(12), pt(3)).expect("snake"),
        ],
        vec![],
    )
    .expect("board");
    let mut state = joined(&["A", "B"]);

    // A walks 5 -> 11 -> 17 -> 23 -> 29 while B shadows with ones
    for _ in 0..5 {
        state.apply_roll(&board, roll(6)).expect("A rolls");
        state.apply_roll(&board, roll(1)).expect("B rolls");
    }
    assert_eq!(state.players()[0].position(), Some(pt(29)));

    state.apply_roll(&board, roll(1)).expect("A rolls");
    assert_eq!(state.players()[0].position(), Some(pt(3)));
}

#[test]
fn test_cyclic_layout_still_terminates() {
    let board = Board::new(
        dim(),
        vec![Snake::new(pt(40), pt(21)).expect("snake")],
        vec![Ladder::new(pt(21), pt(40)).expect("ladder")],
    )
    .expect("cycles are allowed in hand-built boards");
    assert!(Board::validated(
        dim(),
        board.snakes().to_vec(),
        board.ladders().to_vec()
    )
    .is_err());

    let resolution = board.resolve(pt(21));
    assert!(resolution.truncated);
    assert_eq!(resolution.hops, dim().cell_count());

    let mut state = joined(&["A", "B"]);
    state.apply_roll(&board, roll(6)).expect("A enters at 5");
    state.apply_roll(&board, roll(1)).expect("B");
    state.apply_roll(&board, roll(6)).expect("A to 11");
    state.apply_roll(&board, roll(1)).expect("B");
    state.apply_roll(&board, roll(6)).expect("A to 17");
    state.apply_roll(&board, roll(1)).expect("B");
    let outcome = state.apply_roll(&board, roll(4)).expect("A lands on the cycle");
    assert!(matches!(outcome, RollOutcome::Rolled(_)));
    assert!(state.players()[0].position().is_some());
}

#[test]
fn test_duplicate_names_rejected_ignoring_case() {
    let mut state = GameState::new();
    state.add_player("Alice").expect("first");
    let err = state.add_player("alice").expect_err("duplicate");
    assert!(matches!(err, GameError::DuplicatePlayerName(_)));
    assert_eq!(state.players().len(), 1);
}

#[test]
fn test_rolling_alone_is_rejected() {
    let board = Board::new(dim(), vec![], vec![]).expect("board");
    let mut state = joined(&["Solo"]);
    let before = state.clone();
    let err = state
        .roll(&board, &mut StdRng::seed_from_u64(1))
        .expect_err("one player");
    assert_eq!(err, GameError::InsufficientPlayers { joined: 1 });
    assert_eq!(state, before);
}

#[test]
fn test_turn_advances_on_every_roll() {
    let dimension = BoardDimension::new(3).expect("valid dimension");
    let board = Board::new(dimension, vec![], vec![]).expect("board");
    let mut state = joined(&["A", "B", "C"]);
    let mut rng = StdRng::seed_from_u64(99);

    let mut overshoots = 0;
    while state.phase() != GamePhase::Finished {
        let before = state.turn_index();
        let outcome = state.roll(&board, &mut rng).expect("roll");
        assert_eq!(state.turn_index(), (before + 1) % 3);
        if let RollOutcome::Rolled(turn) = outcome {
            if turn.movement == Movement::Overshot {
                overshoots += 1;
            }
        }
    }
    // On a 9-cell board most late rolls overshoot
    assert!(overshoots > 0);

    let winner = state.winner().expect("winner").to_string();
    let turn = state.turn_index();
    let outcome = state.roll(&board, &mut rng).expect("finished roll");
    assert_eq!(outcome, RollOutcome::AlreadyFinished { winner });
    assert_eq!(state.turn_index(), turn);
}
