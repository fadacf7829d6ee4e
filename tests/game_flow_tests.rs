//! Engine flows through the public API only

use net_tetris::core::GameState;
use net_tetris::types::{GameAction, GameEvent, Phase, BOARD_HEIGHT, BOARD_WIDTH, INITIAL_SPEED_MS};

fn started(seed: u32) -> GameState {
    let mut state = GameState::new(seed);
    state.start();
    state
}

#[test]
fn idle_session_ignores_everything() {
    let mut state = GameState::new(1);
    assert_eq!(state.phase(), Phase::Idle);
    assert!(!state.advance());
    assert!(!state.apply_input(GameAction::MoveLeft));
    assert!(!state.apply_input(GameAction::TogglePause));
}

#[test]
fn start_spawns_and_reports_a_snapshot() {
    let mut state = started(42);

    assert_eq!(state.phase(), Phase::Falling);
    assert!(state.active().is_some());
    assert!(state.take_events().contains(&GameEvent::BoardCommitted));
}

#[test]
fn snapshot_mirrors_the_session() {
    let state = started(42);
    let snap = state.snapshot();

    assert!(snap.board.iter().all(|&c| c == 0));
    assert_eq!(snap.score, 0);
    assert_eq!(snap.level, 1);
    assert_eq!(snap.speed_ms, INITIAL_SPEED_MS);
    assert_eq!(snap.phase, Phase::Falling);
    assert!(snap.held.is_none());
    assert!(!snap.next.is_empty());

    let active = snap.active.expect("piece in flight");
    for (x, y) in active.cells {
        assert!((0..BOARD_WIDTH as i8).contains(&x));
        assert!((0..BOARD_HEIGHT as i8).contains(&y));
    }
}

#[test]
fn horizontal_moves_shift_the_piece() {
    let mut state = started(5);
    let (_, x, y) = state.active().unwrap();

    assert!(state.apply_input(GameAction::MoveLeft));
    assert_eq!(state.active().unwrap().1, x - 1);

    assert!(state.apply_input(GameAction::MoveRight));
    let (_, x2, y2) = state.active().unwrap();
    assert_eq!((x2, y2), (x, y));
}

#[test]
fn soft_drop_steps_one_row() {
    let mut state = started(5);
    let (_, _, y) = state.active().unwrap();

    assert!(state.apply_input(GameAction::SoftDrop));
    assert_eq!(state.active().unwrap().2, y - 1);
}

#[test]
fn rotation_succeeds_in_the_open() {
    let mut state = started(5);
    assert!(state.apply_input(GameAction::RotateRight));
}

#[test]
fn pause_blocks_gravity_and_moves() {
    let mut state = started(5);

    assert!(state.apply_input(GameAction::TogglePause));
    assert_eq!(state.phase(), Phase::Paused);
    assert!(!state.advance());
    assert!(!state.apply_input(GameAction::HardDrop));

    assert!(state.apply_input(GameAction::TogglePause));
    assert!(state.advance());
}

#[test]
fn explicit_pause_and_resume() {
    let mut state = started(5);

    state.pause();
    assert_eq!(state.phase(), Phase::Paused);
    assert!(!state.advance());

    state.resume();
    assert_eq!(state.phase(), Phase::Falling);
    assert!(state.advance());

    // Pausing an unstarted session does nothing
    let mut idle = GameState::new(1);
    idle.pause();
    assert_eq!(idle.phase(), Phase::Idle);
}

#[test]
fn hold_is_once_per_lock_cycle() {
    let mut state = started(13);
    let first = state.active().unwrap().0.kind();

    assert!(state.apply_input(GameAction::Hold));
    assert_eq!(state.held_piece(), Some(first));
    assert!(!state.can_hold());
    assert!(!state.apply_input(GameAction::Hold));

    assert!(state.apply_input(GameAction::HardDrop));
    assert!(state.can_hold());
}

#[test]
fn stacking_out_ends_the_session_exactly_once() {
    let mut state = started(3);
    let mut game_over_events = 0;

    for _ in 0..300 {
        state.apply_input(GameAction::HardDrop);
        game_over_events += state
            .take_events()
            .iter()
            .filter(|&&e| e == GameEvent::GameOver)
            .count();
        if state.game_over() {
            break;
        }
    }

    assert!(state.game_over());
    assert_eq!(game_over_events, 1);
    assert_eq!(state.phase(), Phase::GameOver);

    // Terminal state: nothing moves any more
    assert!(!state.advance());
    assert!(!state.apply_input(GameAction::MoveLeft));
    assert!(!state.apply_input(GameAction::TogglePause));
    assert!(state.take_events().is_empty());
}

#[test]
fn score_tracks_cleared_lines() {
    let state = started(2);
    assert_eq!(state.score(), 0);
    assert_eq!(state.lines_cleared_total(), 0);
    assert_eq!(state.lines_to_goal(), state.goal());
}
