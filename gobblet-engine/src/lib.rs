//! Gobblet game rules: piece catalog, board state, move generation, scoring.
//!
//! # Game Model
//!
//! Two players each own six pieces in two sizes (three Small, three Large)
//! on a 3x3 board. A piece may be placed on an empty cell or on top of a
//! strictly smaller piece, hiding it. A player wins by topping all three
//! cells of a row, column, or diagonal.
//!
//! # Piece Catalog
//!
//! Piece ids form a closed domain `0..12`:
//!
//! ```text
//! Ids 0-2:   Player One, Small
//! Ids 3-5:   Player One, Large
//! Ids 6-8:   Player Two, Small
//! Ids 9-11:  Player Two, Large
//! ```
//!
//! # State Representation
//!
//! Each cell stores its stack of piece ids inline (max depth 2 with two
//! ranks), and each player's reserve is a 12-bit set, so `GameState` is
//! `Copy`. Applying a move copies the state and edits the copy; the input
//! state is never mutated, which keeps search branches independent.
//!
//! Cell indices (row-major order):
//!
//! ```text
//!   (0,0)=0  (0,1)=1  (0,2)=2
//!   (1,0)=3  (1,1)=4  (1,2)=5
//!   (2,0)=6  (2,1)=7  (2,2)=8
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of piece ids in the catalog (six per player).
pub const PIECE_COUNT: usize = 12;

/// Number of piece ranks.
pub const RANK_COUNT: usize = 2;

/// Pieces each player owns per rank.
pub const PIECES_PER_RANK: usize = 3;

/// Exact score of a won state for the winning side.
pub const WIN_SCORE: i32 = 1000;

/// Exact score of a lost state.
pub const LOSS_SCORE: i32 = -WIN_SCORE;

/// Heuristic bonus for an unopposed two-in-a-line.
const TWO_IN_LINE_BONUS: i32 = 100;

/// Player identifier.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Player {
    One,
    Two,
}

impl Player {
    /// Get the opponent player.
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Index for per-player arrays (0 or 1).
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Iterate over the six piece ids this player owns.
    pub fn pieces(self) -> impl Iterator<Item = PieceId> {
        let base = self.index() as u8 * 6;
        (base..base + 6).map(PieceId)
    }
}

/// Piece size rank. The ordering decides stacking legality.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Rank {
    Small = 0,
    Large = 1,
}

impl Rank {
    /// Check if this rank may be stacked on top of another rank.
    #[inline]
    pub fn can_cover(self, other: Rank) -> bool {
        (self as u8) > (other as u8)
    }
}

/// Static catalog: owner and rank for every piece id.
const CATALOG: [(Player, Rank); PIECE_COUNT] = [
    (Player::One, Rank::Small),
    (Player::One, Rank::Small),
    (Player::One, Rank::Small),
    (Player::One, Rank::Large),
    (Player::One, Rank::Large),
    (Player::One, Rank::Large),
    (Player::Two, Rank::Small),
    (Player::Two, Rank::Small),
    (Player::Two, Rank::Small),
    (Player::Two, Rank::Large),
    (Player::Two, Rank::Large),
    (Player::Two, Rank::Large),
];

/// Identifier of a single physical piece (0-11).
///
/// Owner and rank are fixed attributes looked up in the catalog. Lookups
/// outside the catalog are programming errors and panic.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId(pub u8);

impl PieceId {
    /// Check if this id is inside the catalog domain.
    #[inline]
    pub fn is_valid(self) -> bool {
        (self.0 as usize) < PIECE_COUNT
    }

    /// Get the owning player.
    #[inline]
    pub fn owner(self) -> Player {
        debug_assert!(self.is_valid(), "piece id {} outside catalog", self.0);
        CATALOG[self.0 as usize].0
    }

    /// Get the size rank.
    #[inline]
    pub fn rank(self) -> Rank {
        debug_assert!(self.is_valid(), "piece id {} outside catalog", self.0);
        CATALOG[self.0 as usize].1
    }

    /// Iterate over all 12 piece ids.
    pub fn all() -> impl Iterator<Item = PieceId> {
        (0..PIECE_COUNT as u8).map(PieceId)
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rank = match self.rank() {
            Rank::Small => 'S',
            Rank::Large => 'L',
        };
        write!(f, "{}{}", self.owner().index() + 1, rank)
    }
}

/// A set of piece ids, packed into 12 bits.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct PieceSet(u16);

impl PieceSet {
    /// The empty set.
    pub const EMPTY: PieceSet = PieceSet(0);

    /// The full set of pieces owned by a player.
    #[inline]
    pub fn owned_by(player: Player) -> PieceSet {
        PieceSet(0b111111 << (player.index() * 6))
    }

    /// Check membership.
    #[inline]
    pub fn contains(self, piece: PieceId) -> bool {
        self.0 & (1 << piece.0) != 0
    }

    #[inline]
    fn remove(&mut self, piece: PieceId) {
        self.0 &= !(1 << piece.0);
    }

    /// Number of pieces in the set.
    #[inline]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate over member ids in ascending order.
    pub fn iter(self) -> impl Iterator<Item = PieceId> {
        (0..PIECE_COUNT as u8).map(PieceId).filter(move |p| self.contains(*p))
    }
}

/// Position on the 3x3 board (0-8, row-major).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct Pos(pub u8);

impl Pos {
    /// Create a position from row and column (0-2 each).
    #[inline]
    pub fn from_row_col(row: u8, col: u8) -> Pos {
        debug_assert!(row < 3 && col < 3);
        Pos(row * 3 + col)
    }

    /// Get the row (0-2).
    #[inline]
    pub fn row(self) -> u8 {
        self.0 / 3
    }

    /// Get the column (0-2).
    #[inline]
    pub fn col(self) -> u8 {
        self.0 % 3
    }

    /// Check if this is a valid position (0-8).
    #[inline]
    pub fn is_valid(self) -> bool {
        self.0 < 9
    }

    /// Iterate over all 9 positions.
    pub fn all() -> impl Iterator<Item = Pos> {
        (0..9).map(Pos)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row(), self.col())
    }
}

/// A move: which piece, where it comes from, where it goes.
///
/// `from == None` places the piece from the reserve; `from == Some(pos)`
/// relocates a piece currently on top of `pos`. Origin and destination are
/// never the same cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct Move {
    /// The piece being moved.
    pub piece: PieceId,
    /// Origin cell, or `None` for a reserve placement.
    pub from: Option<Pos>,
    /// Destination cell.
    pub to: Pos,
}

impl Move {
    /// Create a placement from the reserve.
    #[inline]
    pub fn place(piece: PieceId, to: Pos) -> Move {
        Move { piece, from: None, to }
    }

    /// Create an on-board relocation.
    #[inline]
    pub fn relocate(piece: PieceId, from: Pos, to: Pos) -> Move {
        Move { piece, from: Some(from), to }
    }

    /// Check if this is a placement from the reserve.
    #[inline]
    pub fn is_placement(&self) -> bool {
        self.from.is_none()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.from {
            None => write!(f, "place {} -> {}", self.piece, self.to),
            Some(from) => write!(f, "move {} {} -> {}", self.piece, from, self.to),
        }
    }
}

/// Errors reported by the rules engine.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    /// The move is not one `moves` would have returned for this state.
    #[error("illegal move `{mov}` for {side:?}")]
    IllegalMove { side: Player, mov: Move },
}

/// Maximum stack depth of a cell: with two ranks, at most a Large on a Small.
pub const MAX_STACK: usize = RANK_COUNT;

/// One board cell: an inline stack of piece ids, bottom to top.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Cell {
    pieces: [PieceId; MAX_STACK],
    len: u8,
}

impl Cell {
    /// An empty cell.
    pub const EMPTY: Cell = Cell {
        pieces: [PieceId(0); MAX_STACK],
        len: 0,
    };

    /// The visible occupant: the top of the stack, if any.
    #[inline]
    pub fn top(&self) -> Option<PieceId> {
        if self.len == 0 {
            None
        } else {
            Some(self.pieces[self.len as usize - 1])
        }
    }

    /// Check if the cell has no pieces.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Stack depth.
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Check if a piece of the given rank may be stacked here: the cell
    /// must be empty or topped by a strictly lower rank.
    #[inline]
    pub fn can_accept(&self, rank: Rank) -> bool {
        match self.top() {
            None => true,
            Some(top) => rank.can_cover(top.rank()),
        }
    }

    #[inline]
    fn push(&mut self, piece: PieceId) {
        debug_assert!(self.can_accept(piece.rank()));
        self.pieces[self.len as usize] = piece;
        self.len += 1;
    }

    #[inline]
    fn pop(&mut self) -> Option<PieceId> {
        let top = self.top()?;
        self.len -= 1;
        // Zero the vacated slot so derived Eq/Hash compare stacks, not
        // leftover slot contents.
        self.pieces[self.len as usize] = PieceId(0);
        Some(top)
    }
}

/// The 3x3 board: nine cell stacks.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Board {
    cells: [Cell; 9],
}

impl Board {
    /// The 8 winning lines: 3 rows, 3 columns, 2 diagonals.
    pub const WIN_LINES: [[Pos; 3]; 8] = [
        [Pos(0), Pos(1), Pos(2)], // Row 0
        [Pos(3), Pos(4), Pos(5)], // Row 1
        [Pos(6), Pos(7), Pos(8)], // Row 2
        [Pos(0), Pos(3), Pos(6)], // Col 0
        [Pos(1), Pos(4), Pos(7)], // Col 1
        [Pos(2), Pos(5), Pos(8)], // Col 2
        [Pos(0), Pos(4), Pos(8)], // Main diagonal
        [Pos(2), Pos(4), Pos(6)], // Anti-diagonal
    ];

    /// Create an empty board.
    #[inline]
    pub fn new() -> Board {
        Board {
            cells: [Cell::EMPTY; 9],
        }
    }

    /// Get the cell at a position.
    #[inline]
    pub fn cell(&self, pos: Pos) -> &Cell {
        &self.cells[pos.0 as usize]
    }

    #[inline]
    fn cell_mut(&mut self, pos: Pos) -> &mut Cell {
        &mut self.cells[pos.0 as usize]
    }

    /// The visible occupant at a position.
    #[inline]
    pub fn top(&self, pos: Pos) -> Option<PieceId> {
        self.cell(pos).top()
    }

    /// The owner of the visible occupant at a position.
    #[inline]
    pub fn top_owner(&self, pos: Pos) -> Option<Player> {
        self.top(pos).map(PieceId::owner)
    }

    /// Count how many cells of a line are topped by the given player.
    fn line_count(&self, line: &[Pos; 3], player: Player) -> usize {
        line.iter()
            .filter(|&&pos| self.top_owner(pos) == Some(player))
            .count()
    }

    /// Check if the given player tops all three cells of some line.
    pub fn has_won(&self, player: Player) -> bool {
        Self::WIN_LINES
            .iter()
            .any(|line| self.line_count(line, player) == 3)
    }

    /// The winning player, or None if no line is complete.
    pub fn winner(&self) -> Option<Player> {
        if self.has_won(Player::One) {
            Some(Player::One)
        } else if self.has_won(Player::Two) {
            Some(Player::Two)
        } else {
            None
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..3 {
            for col in 0..3 {
                match self.top(Pos::from_row_col(row, col)) {
                    Some(piece) => write!(f, "{} ", piece)?,
                    None => write!(f, ".. ")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Per-player piece accounting.
///
/// `owned` is fixed for the whole game; `reserve` is the subset not yet
/// placed. A placed piece never returns to the reserve, even while buried
/// under an opponent's piece.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct PlayerState {
    owned: PieceSet,
    reserve: PieceSet,
}

impl PlayerState {
    #[inline]
    fn new(player: Player) -> PlayerState {
        let owned = PieceSet::owned_by(player);
        PlayerState { owned, reserve: owned }
    }

    /// All pieces this player owns.
    #[inline]
    pub fn owned(&self) -> PieceSet {
        self.owned
    }

    /// Pieces not yet placed on the board.
    #[inline]
    pub fn reserve(&self) -> PieceSet {
        self.reserve
    }
}

/// A full game snapshot: board plus both players' piece accounting.
///
/// Values are immutable once created; `apply` returns a fresh state.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct GameState {
    board: Board,
    players: [PlayerState; 2],
}

impl GameState {
    /// The starting configuration: empty board, all twelve pieces in
    /// reserve.
    pub fn new() -> GameState {
        GameState {
            board: Board::new(),
            players: [PlayerState::new(Player::One), PlayerState::new(Player::Two)],
        }
    }

    /// Get the board.
    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Get a player's piece accounting.
    #[inline]
    pub fn player(&self, side: Player) -> &PlayerState {
        &self.players[side.index()]
    }

    /// Check if some player already controls a full line.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.board.winner().is_some()
    }

    /// The winning player, or None.
    #[inline]
    pub fn winner(&self) -> Option<Player> {
        self.board.winner()
    }

    // ========== Move Generation ==========

    /// Generate all legal moves for `side`.
    ///
    /// Returns an empty list if the state is already terminal. Otherwise
    /// every movable piece (reserve, plus exposed on-board pieces) is
    /// paired with every destination that is empty or topped by a strictly
    /// lower rank. Reserve placements come first, then relocations, both
    /// in row-major destination order.
    pub fn moves(&self, side: Player) -> Vec<Move> {
        let mut moves = Vec::with_capacity(32);
        if self.is_terminal() {
            return moves;
        }

        // Reserve placements
        for piece in self.player(side).reserve.iter() {
            for to in Pos::all() {
                if self.board.cell(to).can_accept(piece.rank()) {
                    moves.push(Move::place(piece, to));
                }
            }
        }

        // Relocations of exposed pieces
        for from in Pos::all() {
            if let Some(piece) = self.board.top(from) {
                if piece.owner() == side {
                    for to in Pos::all() {
                        if to != from && self.board.cell(to).can_accept(piece.rank()) {
                            moves.push(Move::relocate(piece, from, to));
                        }
                    }
                }
            }
        }

        moves
    }

    /// Check whether `moves(side)` would contain this move.
    fn is_legal(&self, side: Player, mov: &Move) -> bool {
        if self.is_terminal() || !mov.piece.is_valid() || mov.piece.owner() != side {
            return false;
        }
        if !mov.to.is_valid() {
            return false;
        }
        match mov.from {
            None => {
                if !self.player(side).reserve.contains(mov.piece) {
                    return false;
                }
            }
            Some(from) => {
                if !from.is_valid() || from == mov.to {
                    return false;
                }
                if self.board.top(from) != Some(mov.piece) {
                    return false;
                }
            }
        }
        self.board.cell(mov.to).can_accept(mov.piece.rank())
    }

    // ========== Move Application ==========

    /// Apply a move for `side`, returning the successor state.
    ///
    /// The input state is never mutated. Moves that `moves(side)` would not
    /// return are rejected with [`GameError::IllegalMove`].
    pub fn apply(&self, side: Player, mov: Move) -> Result<GameState, GameError> {
        if !self.is_legal(side, &mov) {
            return Err(GameError::IllegalMove { side, mov });
        }

        let mut next = *self;
        match mov.from {
            // Relocation: lift from origin, reserve untouched
            Some(from) => {
                next.board.cell_mut(from).pop();
            }
            // Placement: consume the piece from the reserve
            None => {
                next.players[side.index()].reserve.remove(mov.piece);
            }
        }
        next.board.cell_mut(mov.to).push(mov.piece);
        Ok(next)
    }

    // ========== Scoring ==========

    /// Exact terminal score for `side`: -1000 if the opponent controls a
    /// line, +1000 if `side` does, 0 otherwise.
    ///
    /// The opponent check runs first, so a state where both players hold a
    /// complete line scores as a loss for whichever side is asked.
    pub fn score_exact(&self, side: Player) -> i32 {
        if self.board.has_won(side.opponent()) {
            return LOSS_SCORE;
        }
        if self.board.has_won(side) {
            return WIN_SCORE;
        }
        0
    }

    /// Heuristic score for `side`: the exact terminal score when the state
    /// is decided; otherwise +100 per line holding exactly two of `side`'s
    /// visible pieces and none of the opponent's, and -100 symmetrically.
    pub fn score_heuristic(&self, side: Player) -> i32 {
        let exact = self.score_exact(side);
        if exact != 0 {
            return exact;
        }

        let opponent = side.opponent();
        let mut total = 0;
        for line in &Board::WIN_LINES {
            let mine = self.board.line_count(line, side);
            let theirs = self.board.line_count(line, opponent);
            if mine == 2 && theirs == 0 {
                total += TWO_IN_LINE_BONUS;
            } else if theirs == 2 && mine == 0 {
                total -= TWO_IN_LINE_BONUS;
            }
        }
        total
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
