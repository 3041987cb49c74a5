//! Tic-tac-toe on an N×N board.
//!
//! ## Game Rules
//!
//! - Player 0 plays `X` and moves first, player 1 plays `O`
//! - Players alternate placing their piece on an empty cell
//! - Filling a whole row, column or diagonal wins
//! - A full board without a line is a draw
//!
//! Utilities are +1 for a win, -1 for a loss and 0 for a draw.
//!
//! ## Cell Layout (3×3)
//!
//! ```text
//!  0 | 1 | 2
//! ---+---+---
//!  3 | 4 | 5
//! ---+---+---
//!  6 | 7 | 8
//! ```
//!
//! The game has perfect information, so the information set key is the
//! board itself: one character per cell in row-major order (`X`, `O`, `-`).
//! The player to move follows from the piece counts.

use std::fmt;

use crate::cfr::error::{CfrError, Result};
use crate::cfr::game::{Action, Game, GameState};

/// Contents of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    /// No piece.
    #[default]
    Empty,
    /// Player 0's piece.
    X,
    /// Player 1's piece.
    O,
}

impl Cell {
    /// Character used in keys and board strings.
    pub fn symbol(self) -> char {
        match self {
            Cell::Empty => '-',
            Cell::X => 'X',
            Cell::O => 'O',
        }
    }

    /// The piece placed by `player`.
    pub fn for_player(player: usize) -> Self {
        if player == 0 {
            Cell::X
        } else {
            Cell::O
        }
    }

    fn from_symbol(c: char) -> Option<Self> {
        match c {
            '-' => Some(Cell::Empty),
            'X' => Some(Cell::X),
            'O' => Some(Cell::O),
            _ => None,
        }
    }
}

/// Place the mover's piece on a cell (row-major index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement(pub usize);

impl Action for Placement {
    fn label(&self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tic-tac-toe position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TicTacToeState {
    /// Cells in row-major order.
    pub board: Vec<Cell>,
    /// Player to move (0 = X, 1 = O).
    pub to_move: usize,
}

impl GameState for TicTacToeState {}

impl TicTacToeState {
    /// Empty `dim`×`dim` board with X to move.
    pub fn empty(dim: usize) -> Self {
        Self {
            board: vec![Cell::Empty; dim * dim],
            to_move: 0,
        }
    }

    /// Parse a row-major board string such as `"X-O-X----"`.
    ///
    /// # Errors
    /// [`CfrError::InvalidBoard`] for a wrong length, an unknown character
    /// or piece counts no legal game can produce.
    pub fn from_cells(dim: usize, cells: &str) -> Result<Self> {
        let invalid = |reason: String| CfrError::InvalidBoard {
            board: cells.to_string(),
            reason,
        };

        let board = cells
            .chars()
            .map(|c| Cell::from_symbol(c).ok_or_else(|| invalid(format!("unknown cell '{}'", c))))
            .collect::<Result<Vec<_>>>()?;
        if board.len() != dim * dim {
            return Err(invalid(format!(
                "expected {} cells, found {}",
                dim * dim,
                board.len()
            )));
        }

        let xs = board.iter().filter(|&&c| c == Cell::X).count();
        let os = board.iter().filter(|&&c| c == Cell::O).count();
        let to_move = match xs.checked_sub(os) {
            Some(0) => 0,
            Some(1) => 1,
            _ => return Err(invalid(format!("{} X and {} O pieces", xs, os))),
        };

        Ok(Self { board, to_move })
    }

    /// Row-major cell characters; the information set key.
    pub fn key(&self) -> String {
        self.board.iter().map(|c| c.symbol()).collect()
    }

    /// Board side length.
    pub fn dim(&self) -> usize {
        let mut dim = 0;
        while dim * dim < self.board.len() {
            dim += 1;
        }
        dim
    }
}

impl fmt::Display for TicTacToeState {
    /// The board next to a guide of cell indices.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dim = self.dim();
        let width = (dim * dim).saturating_sub(1).to_string().len();
        for row in 0..dim {
            let cells: Vec<String> = (0..dim)
                .map(|col| self.board[row * dim + col].symbol().to_string())
                .collect();
            let guide: Vec<String> = (0..dim)
                .map(|col| format!("{:>width$}", row * dim + col, width = width))
                .collect();
            writeln!(f, " {}    {}", cells.join(" "), guide.join(" "))?;
        }
        Ok(())
    }
}

/// Tic-tac-toe with a configurable board size.
#[derive(Debug, Clone)]
pub struct TicTacToe {
    board_dim: usize,
    /// Every winning line as cell indices.
    lines: Vec<Vec<usize>>,
}

impl Default for TicTacToe {
    fn default() -> Self {
        Self::new(3)
    }
}

impl TicTacToe {
    /// Create a `board_dim`×`board_dim` game. Dimensions below 1 are
    /// raised to 1.
    pub fn new(board_dim: usize) -> Self {
        let dim = board_dim.max(1);
        let mut lines = Vec::with_capacity(2 * dim + 2);
        for i in 0..dim {
            lines.push((0..dim).map(|j| i * dim + j).collect());
            lines.push((0..dim).map(|j| j * dim + i).collect());
        }
        lines.push((0..dim).map(|i| i * dim + i).collect());
        lines.push((0..dim).map(|i| i * dim + (dim - 1 - i)).collect());
        Self {
            board_dim: dim,
            lines,
        }
    }

    /// Board side length.
    pub fn board_dim(&self) -> usize {
        self.board_dim
    }

    /// Player who completed a line, if any.
    pub fn winner(&self, state: &TicTacToeState) -> Option<usize> {
        let cell = |i: usize| state.board.get(i).copied().unwrap_or_default();
        self.lines.iter().find_map(|line| {
            let first = cell(line[0]);
            if first != Cell::Empty && line.iter().all(|&i| cell(i) == first) {
                Some(if first == Cell::X { 0 } else { 1 })
            } else {
                None
            }
        })
    }

    fn is_full(state: &TicTacToeState) -> bool {
        state.board.iter().all(|&c| c != Cell::Empty)
    }
}

impl Game for TicTacToe {
    type State = TicTacToeState;
    type Action = Placement;

    fn num_players(&self) -> usize {
        2
    }

    fn initial_state(&self) -> Self::State {
        TicTacToeState::empty(self.board_dim)
    }

    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action> {
        if self.is_terminal(state) {
            return vec![];
        }
        state
            .board
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell == Cell::Empty)
            .map(|(i, _)| Placement(i))
            .collect()
    }

    fn apply(&self, state: &Self::State, action: &Self::Action) -> Result<Self::State> {
        let open = state.board.get(action.0) == Some(&Cell::Empty);
        if !open || self.is_terminal(state) {
            return Err(CfrError::IllegalAction {
                action: action.label(),
                state: state.key(),
            });
        }

        let mut next = state.clone();
        next.board[action.0] = Cell::for_player(state.to_move);
        next.to_move = 1 - state.to_move;
        Ok(next)
    }

    fn is_terminal(&self, state: &Self::State) -> bool {
        self.winner(state).is_some() || Self::is_full(state)
    }

    fn utility(&self, state: &Self::State, player: usize) -> Result<f64> {
        match self.winner(state) {
            Some(winner) if winner == player => Ok(1.0),
            Some(_) => Ok(-1.0),
            None if Self::is_full(state) => Ok(0.0),
            None => Err(CfrError::UndefinedUtility {
                state: state.key(),
            }),
        }
    }

    fn acting_player(&self, state: &Self::State) -> Option<usize> {
        (!self.is_terminal(state)).then_some(state.to_move)
    }

    fn information_set_key(&self, state: &Self::State, _player: usize) -> String {
        state.key()
    }

    fn name(&self) -> String {
        format!("tictactoe-{}x{}", self.board_dim, self.board_dim)
    }

    fn describe(&self, state: &Self::State) -> String {
        state.key()
    }
}
