//! Game state module - one player's session state machine
//!
//! Ties together board, pieces and bag. Drives the gravity/lock/clear/spawn
//! cycle, movement and rotation legality, hold-swap, and the goal-based
//! speed progression. Illegal moves are rejected silently; the only fatal
//! condition is a blocked spawn, which ends the session.

use crate::core::{Board, GameSnapshot, Piece, PieceBag};
use crate::core::snapshot::ActivePiece;
use crate::types::{
    GameAction, GameEvent, Phase, Tetromino, BOARD_HEIGHT, BOARD_WIDTH, INITIAL_GOAL,
    INITIAL_SPEED_MS, SCORE_PER_LINE,
};

/// Complete per-session game state. Every session owns its own speed;
/// nothing here is shared between sessions.
#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    bag: PieceBag,
    current: Piece,
    cur_x: i8,
    cur_y: i8,
    next: Piece,
    held: Option<Piece>,
    hold_locked: bool,
    waiting_after_line: bool,
    started: bool,
    paused: bool,
    game_over: bool,
    lines_cleared_total: u32,
    goal: u32,
    lines_toward_goal: u32,
    goals_reached: u32,
    speed_ms: u32,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create a fresh session with the given bag seed
    pub fn new(seed: u32) -> Self {
        let mut bag = PieceBag::new(seed);
        let next = Piece::new(bag.next());

        Self {
            board: Board::new(),
            bag,
            current: Piece::empty(),
            cur_x: 0,
            cur_y: 0,
            next,
            held: None,
            hold_locked: false,
            waiting_after_line: false,
            started: false,
            paused: false,
            game_over: false,
            lines_cleared_total: 0,
            goal: INITIAL_GOAL,
            lines_toward_goal: 0,
            goals_reached: 0,
            speed_ms: INITIAL_SPEED_MS,
            events: Vec::new(),
        }
    }

    /// Start the session and spawn the first piece
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.new_piece();
    }

    /// Reset grid and counters in place and spawn afresh. The bag keeps its
    /// RNG stream, so a restarted session continues the piece sequence.
    pub fn restart(&mut self) {
        self.board.clear();
        self.held = None;
        self.hold_locked = false;
        self.waiting_after_line = false;
        self.paused = false;
        self.game_over = false;
        self.lines_cleared_total = 0;
        self.goal = INITIAL_GOAL;
        self.lines_toward_goal = 0;
        self.goals_reached = 0;
        self.speed_ms = INITIAL_SPEED_MS;
        self.events.clear();
        self.started = true;
        self.new_piece();
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    pub fn can_hold(&self) -> bool {
        !self.hold_locked
    }

    /// Score is derived from total cleared lines, never stored
    pub fn score(&self) -> u32 {
        self.lines_cleared_total * SCORE_PER_LINE
    }

    pub fn level(&self) -> u32 {
        self.goals_reached + 1
    }

    pub fn goal(&self) -> u32 {
        self.goal
    }

    pub fn lines_to_goal(&self) -> u32 {
        self.goal.saturating_sub(self.lines_toward_goal)
    }

    pub fn lines_cleared_total(&self) -> u32 {
        self.lines_cleared_total
    }

    /// Current gravity interval. The external tick source re-reads this
    /// after every advance to pick up speed-ups.
    pub fn speed_ms(&self) -> u32 {
        self.speed_ms
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Falling piece and its origin, if one is in flight
    pub fn active(&self) -> Option<(Piece, i8, i8)> {
        if self.current.is_empty() {
            None
        } else {
            Some((self.current, self.cur_x, self.cur_y))
        }
    }

    pub fn next_piece(&self) -> Tetromino {
        self.next.kind()
    }

    pub fn held_piece(&self) -> Option<Tetromino> {
        self.held.map(|p| p.kind())
    }

    pub fn phase(&self) -> Phase {
        if !self.started {
            Phase::Idle
        } else if self.game_over {
            Phase::GameOver
        } else if self.paused {
            Phase::Paused
        } else if self.waiting_after_line {
            Phase::LineClearPause
        } else {
            Phase::Falling
        }
    }

    /// Drain the events accumulated since the last drain
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Freeze gravity and inputs; grid and piece state stay untouched
    pub fn pause(&mut self) {
        if self.started && !self.game_over {
            self.paused = true;
        }
    }

    /// Lift a pause
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// One gravity tick: drop the piece a row, or lock it; after a line
    /// clear, spend one tick paused before spawning the next piece.
    pub fn advance(&mut self) -> bool {
        if !self.started || self.paused || self.game_over {
            return false;
        }

        if self.waiting_after_line {
            self.waiting_after_line = false;
            self.new_piece();
        } else {
            self.one_line_down();
        }

        true
    }

    /// Apply a discrete input. Returns whether the action changed anything;
    /// rejected moves are not errors.
    pub fn apply_input(&mut self, action: GameAction) -> bool {
        if !self.started || self.game_over {
            return false;
        }

        if action == GameAction::TogglePause {
            self.paused = !self.paused;
            return true;
        }

        if self.paused || self.current.is_empty() {
            return false;
        }

        match action {
            GameAction::MoveLeft => self.try_move(self.current, self.cur_x - 1, self.cur_y),
            GameAction::MoveRight => self.try_move(self.current, self.cur_x + 1, self.cur_y),
            GameAction::SoftDrop => {
                self.one_line_down();
                true
            }
            GameAction::HardDrop => {
                self.drop_down();
                true
            }
            GameAction::RotateRight => self.try_rotate_right(),
            GameAction::Hold => self.hold_current_piece(),
            GameAction::TogglePause => unreachable!(),
        }
    }

    /// The single gatekeeping primitive for movement, rotation and spawn.
    /// Rejects without mutating if any target cell is out of bounds or
    /// landed; commits piece and origin on success.
    pub(crate) fn try_move(&mut self, piece: Piece, new_x: i8, new_y: i8) -> bool {
        for (x, y) in piece.cells_at(new_x, new_y) {
            if x < 0 || x >= BOARD_WIDTH as i8 || y < 0 || y >= BOARD_HEIGHT as i8 {
                return false;
            }
            if self.board.is_occupied(x as u8, y as u8) {
                return false;
            }
        }

        self.current = piece;
        self.cur_x = new_x;
        self.cur_y = new_y;
        true
    }

    /// Rotate clockwise, kicking one cell left, right, up then down when
    /// the in-place rotation collides. First fit wins; otherwise no change.
    pub(crate) fn try_rotate_right(&mut self) -> bool {
        let rotated = self.current.rotated_right();

        self.try_move(rotated, self.cur_x, self.cur_y)
            || self.try_move(rotated, self.cur_x - 1, self.cur_y)
            || self.try_move(rotated, self.cur_x + 1, self.cur_y)
            || self.try_move(rotated, self.cur_x, self.cur_y + 1)
            || self.try_move(rotated, self.cur_x, self.cur_y - 1)
    }

    fn one_line_down(&mut self) {
        if !self.try_move(self.current, self.cur_x, self.cur_y - 1) {
            self.lock_piece();
        }
    }

    fn drop_down(&mut self) {
        while self.try_move(self.current, self.cur_x, self.cur_y - 1) {}
        self.lock_piece();
    }

    /// Transfer the falling piece into the landed grid, clear full rows,
    /// and either spawn immediately or wait one tick after a clear.
    fn lock_piece(&mut self) {
        let kind = self.current.kind();
        for (x, y) in self.current.cells_at(self.cur_x, self.cur_y) {
            // try_move already validated this position
            self.board.set(x as u8, y as u8, kind);
        }

        self.clear_full_lines();
        self.hold_locked = false;
        self.note_board_changed();

        if self.waiting_after_line {
            self.current = Piece::empty();
        } else {
            self.new_piece();
        }
    }

    fn clear_full_lines(&mut self) {
        let cleared = self.board.clear_full_rows();
        if cleared.is_empty() {
            return;
        }

        let n = cleared.len() as u32;
        self.lines_cleared_total += n;
        self.lines_toward_goal += n;
        self.waiting_after_line = true;

        if self.lines_toward_goal >= self.goal {
            self.goal += if self.goals_reached == 0 {
                5
            } else {
                5 * self.goals_reached
            };
            self.lines_toward_goal = 0;
            self.goals_reached += 1;
            // A quarter faster per goal, integer milliseconds
            self.speed_ms -= self.speed_ms / 4;
        }
    }

    /// Promote `next` to the falling slot at center-top. A blocked spawn
    /// ends the session.
    fn new_piece(&mut self) {
        self.current = self.next;
        self.next = Piece::new(self.bag.next());
        self.cur_x = (BOARD_WIDTH / 2 + 1) as i8;
        self.cur_y = BOARD_HEIGHT as i8 - 1 + self.current.min_y();

        if self.try_move(self.current, self.cur_x, self.cur_y) {
            self.note_board_changed();
        } else {
            self.current = Piece::empty();
            self.enter_game_over();
        }
    }

    /// Hold-swap, usable once per lock cycle. Swapping in a held piece
    /// respawns it at center-top and can end the session like any spawn.
    fn hold_current_piece(&mut self) -> bool {
        if self.hold_locked {
            return false;
        }

        match self.held.take() {
            None => {
                self.held = Some(self.current);
                self.new_piece();
            }
            Some(held) => {
                let swapped_out = self.current;
                self.current = held;
                self.held = Some(swapped_out);
                self.cur_x = (BOARD_WIDTH / 2 + 1) as i8;
                self.cur_y = BOARD_HEIGHT as i8 - 1 + self.current.min_y();

                if !self.try_move(self.current, self.cur_x, self.cur_y) {
                    self.current = Piece::empty();
                    self.enter_game_over();
                }
            }
        }

        self.hold_locked = true;
        true
    }

    fn enter_game_over(&mut self) {
        if !self.game_over {
            self.game_over = true;
            self.events.push(GameEvent::GameOver);
        }
    }

    fn note_board_changed(&mut self) {
        // Consecutive commits within one call collapse into one broadcast
        if self.events.last() != Some(&GameEvent::BoardCommitted) {
            self.events.push(GameEvent::BoardCommitted);
        }
    }

    /// Read-only view for render and wire callers
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            board: self.board.wire_cells(),
            active: self.active().map(|(piece, x, y)| ActivePiece {
                kind: piece.kind(),
                cells: piece.cells_at(x, y),
            }),
            next: self.next_piece(),
            held: self.held_piece(),
            score: self.score(),
            level: self.level(),
            goal: self.goal,
            lines_to_goal: self.lines_to_goal(),
            lines_cleared: self.lines_cleared_total,
            speed_ms: self.speed_ms,
            phase: self.phase(),
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(1)
    }
}
