use criterion::{black_box, criterion_group, criterion_main, Criterion};

use net_tetris::core::{Board, GameState};
use net_tetris::net::protocol::{self, NetMessage};
use net_tetris::types::{GameAction, Tetromino, BOARD_WIDTH};

fn bench_advance(c: &mut Criterion) {
    let mut state = GameState::new(12345);
    state.start();

    c.bench_function("gravity_advance", |b| {
        b.iter(|| {
            state.advance();
            black_box(state.phase());
        })
    });
}

fn bench_line_clear(c: &mut Criterion) {
    c.bench_function("clear_4_lines", |b| {
        b.iter(|| {
            let mut board = Board::new();
            for y in 0..4 {
                for x in 0..BOARD_WIDTH {
                    board.set(x, y, Tetromino::I);
                }
            }
            black_box(board.clear_full_rows());
        })
    });
}

fn bench_horizontal_moves(c: &mut Criterion) {
    let mut state = GameState::new(12345);
    state.start();

    c.bench_function("move_left_right", |b| {
        b.iter(|| {
            state.apply_input(black_box(GameAction::MoveLeft));
            state.apply_input(black_box(GameAction::MoveRight));
        })
    });
}

fn bench_rotation(c: &mut Criterion) {
    let mut state = GameState::new(12345);
    state.start();

    c.bench_function("rotate_right", |b| {
        b.iter(|| {
            state.apply_input(black_box(GameAction::RotateRight));
        })
    });
}

fn bench_board_token(c: &mut Criterion) {
    let mut state = GameState::new(12345);
    state.start();
    state.apply_input(GameAction::HardDrop);
    let cells = state.board().wire_cells();

    c.bench_function("encode_board_token", |b| {
        b.iter(|| {
            black_box(protocol::encode(&NetMessage::Board {
                peer: 0,
                cells: black_box(cells),
            }));
        })
    });
}

criterion_group!(
    benches,
    bench_advance,
    bench_line_clear,
    bench_horizontal_moves,
    bench_rotation,
    bench_board_token
);
criterion_main!(benches);
