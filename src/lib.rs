//! Corridor puzzle logic with grid-based board representation.
//!
//! # Board Layout
//!
//! ```text
//! size × size grid, row-major cell indexing: index = row * size + col
//!
//! Row 0 (top edge):      start gate at (0, start.column)
//! Row size-1 (bottom):   end gate at (size-1, end.column)
//!
//! Each cell holds the id of the bar covering it, or nothing.
//! A gate is "open" while its own cell is uncovered.
//! ```
//!
//! Bar pieces are rigid lines of 2-4 cells, horizontal or vertical, and only
//! ever slide along their own axis. The puzzle is won when the 4-connected
//! empty cells form a path from the start gate to the end gate;
//! [`Board::find_path`] is both the existence test and the win check.
//!
//! Everything here is pure state: the interactive layer lives in
//! [`session`], random boards come from [`generate`], and [`oracle`] decides
//! whether an arrangement can be solved at all.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

pub mod generate;
pub mod oracle;
pub mod session;
#[cfg(feature = "wasm")]
pub mod wasm;

/// Orientation of a bar piece, fixed for the piece's lifetime.
///
/// A piece only ever slides along this axis; its anchor is the only part of
/// it that changes.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    /// Unit step along the slide axis, as (row delta, col delta).
    #[inline]
    pub fn delta(self) -> (i8, i8) {
        match self {
            Orientation::Horizontal => (0, 1),
            Orientation::Vertical => (1, 0),
        }
    }
}

/// Position on the board.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub row: u8,
    pub col: u8,
}

impl Pos {
    #[inline]
    pub fn new(row: u8, col: u8) -> Pos {
        Pos { row, col }
    }

    /// Offset by one signed step, staying inside a `size`-sized grid.
    #[inline]
    pub fn step(self, dr: i8, dc: i8, size: u8) -> Option<Pos> {
        let row = self.row as i16 + dr as i16;
        let col = self.col as i16 + dc as i16;
        if row < 0 || col < 0 || row >= size as i16 || col >= size as i16 {
            None
        } else {
            Some(Pos {
                row: row as u8,
                col: col as u8,
            })
        }
    }
}

/// A rigid bar: `len` cells extending right (horizontal) or down (vertical)
/// from its anchor cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct Shape {
    len: u8,
    orientation: Orientation,
}

impl Shape {
    pub const MIN_LEN: u8 = 2;
    pub const MAX_LEN: u8 = 4;

    /// Create a bar shape. Returns None for lengths outside 2..=4.
    pub fn new(len: u8, orientation: Orientation) -> Option<Shape> {
        if (Self::MIN_LEN..=Self::MAX_LEN).contains(&len) {
            Some(Shape { len, orientation })
        } else {
            None
        }
    }

    #[inline]
    pub fn len(self) -> u8 {
        self.len
    }

    #[inline]
    pub fn orientation(self) -> Orientation {
        self.orientation
    }

    /// Cells covered when anchored at `anchor`, anchor first.
    ///
    /// Purely arithmetic: cells past the grid edge are still yielded and
    /// must be bounds-checked by the caller.
    pub fn cells(self, anchor: Pos) -> impl Iterator<Item = Pos> {
        (0..self.len).map(move |k| match self.orientation {
            Orientation::Horizontal => Pos::new(anchor.row, anchor.col + k),
            Orientation::Vertical => Pos::new(anchor.row + k, anchor.col),
        })
    }
}

/// Stable piece identifier, assigned densely from 0 at generation.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId(pub u8);

impl PieceId {
    /// Ids are dense u8 indexes, which bounds a board's piece count.
    pub const MAX_PIECES: usize = u8::MAX as usize + 1;
}

/// Cosmetic piece tint, carried for the view and ignored by the rules.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum PieceColor {
    Red,
    Green,
    Blue,
    Yellow,
    Purple,
    Orange,
}

impl PieceColor {
    pub const ALL: [PieceColor; 6] = [
        PieceColor::Red,
        PieceColor::Green,
        PieceColor::Blue,
        PieceColor::Yellow,
        PieceColor::Purple,
        PieceColor::Orange,
    ];

    /// CSS-class-friendly lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            PieceColor::Red => "red",
            PieceColor::Green => "green",
            PieceColor::Blue => "blue",
            PieceColor::Yellow => "yellow",
            PieceColor::Purple => "purple",
            PieceColor::Orange => "orange",
        }
    }
}

/// A placed bar piece.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Piece {
    pub id: PieceId,
    pub shape: Shape,
    pub anchor: Pos,
    pub color: PieceColor,
}

impl Piece {
    /// Cells this piece currently covers.
    pub fn covered(&self) -> impl Iterator<Item = Pos> {
        self.shape.cells(self.anchor)
    }
}

/// Which edge of the board a gate sits on.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Bottom,
}

/// Role of a gate in the corridor the player must open.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum GateRole {
    Start,
    End,
}

/// A designated edge cell the corridor must reach.
///
/// Placed once at generation, immutable afterwards.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Gate {
    pub edge: Edge,
    pub column: u8,
    pub role: GateRole,
}

impl Gate {
    /// The board cell this gate occupies.
    #[inline]
    pub fn cell(&self, size: u8) -> Pos {
        match self.edge {
            Edge::Top => Pos::new(0, self.column),
            Edge::Bottom => Pos::new(size - 1, self.column),
        }
    }
}

/// Why a move was rejected. The board is unchanged in every case.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub enum MoveError {
    /// No live piece has the given id.
    UnknownPiece,
    /// The candidate anchor leaves the piece's slide axis.
    OffAxis,
    /// Some covered cell would fall outside the grid.
    OutOfBounds,
    /// Some covered or swept-through cell is occupied by another piece.
    Collision,
    /// The puzzle is already solved; the board is locked.
    Locked,
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MoveError::UnknownPiece => "no piece with that id",
            MoveError::OffAxis => "anchor leaves the piece's slide axis",
            MoveError::OutOfBounds => "piece would leave the board",
            MoveError::Collision => "piece would collide with another piece",
            MoveError::Locked => "the puzzle is solved and the board is locked",
        })
    }
}

impl std::error::Error for MoveError {}

/// BFS neighbor order: right, left, down, up. Fixed so path discovery is
/// deterministic for a given occupancy.
const NEIGHBORS: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

/// Occupancy grid plus the two gates. Pure data: occupancy queries, the
/// placement validator, and empty-cell pathfinding. Which piece sits where
/// is [`Puzzle`]'s business.
#[derive(Clone, Debug)]
pub struct Board {
    size: u8,
    cells: Vec<Option<PieceId>>,
    start: Gate,
    end: Gate,
}

impl Board {
    /// Create an empty board with a start gate on the top edge and an end
    /// gate on the bottom edge.
    pub fn new(size: u8, start_col: u8, end_col: u8) -> Board {
        debug_assert!(size >= 2, "board must have two distinct gate rows");
        debug_assert!(start_col < size && end_col < size);
        Board {
            size,
            cells: vec![None; size as usize * size as usize],
            start: Gate {
                edge: Edge::Top,
                column: start_col,
                role: GateRole::Start,
            },
            end: Gate {
                edge: Edge::Bottom,
                column: end_col,
                role: GateRole::End,
            },
        }
    }

    #[inline]
    pub fn size(&self) -> u8 {
        self.size
    }

    #[inline]
    pub fn start_gate(&self) -> Gate {
        self.start
    }

    #[inline]
    pub fn end_gate(&self) -> Gate {
        self.end
    }

    #[inline]
    fn index(&self, pos: Pos) -> usize {
        pos.row as usize * self.size as usize + pos.col as usize
    }

    #[inline]
    fn pos_at(&self, index: usize) -> Pos {
        Pos::new(
            (index / self.size as usize) as u8,
            (index % self.size as usize) as u8,
        )
    }

    #[inline]
    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.row < self.size && pos.col < self.size
    }

    /// The piece covering `pos`, if any. Out-of-bounds reads as unoccupied.
    #[inline]
    pub fn occupant(&self, pos: Pos) -> Option<PieceId> {
        if self.in_bounds(pos) {
            self.cells[self.index(pos)]
        } else {
            None
        }
    }

    /// True iff `pos` is inside the grid and uncovered. Gate cells count as
    /// empty while no piece overlaps them.
    #[inline]
    pub fn is_empty(&self, pos: Pos) -> bool {
        self.in_bounds(pos) && self.cells[self.index(pos)].is_none()
    }

    /// Placement validator: every covered cell must be in-bounds and
    /// unoccupied. The single source of truth for legality, shared by
    /// generation, interactive moves, and oracle expansion.
    #[inline]
    pub fn can_place(&self, shape: Shape, anchor: Pos) -> bool {
        self.check_place(shape, anchor).is_ok()
    }

    /// Like [`Board::can_place`] but reports which rule failed.
    pub fn check_place(&self, shape: Shape, anchor: Pos) -> Result<(), MoveError> {
        for pos in shape.cells(anchor) {
            if !self.in_bounds(pos) {
                return Err(MoveError::OutOfBounds);
            }
            if self.cells[self.index(pos)].is_some() {
                return Err(MoveError::Collision);
            }
        }
        Ok(())
    }

    /// Placement check with one piece treated as lifted off the board, so a
    /// mover cannot collide with its own cells.
    pub(crate) fn check_place_excluding(
        &self,
        shape: Shape,
        anchor: Pos,
        mover: PieceId,
    ) -> Result<(), MoveError> {
        for pos in shape.cells(anchor) {
            if !self.in_bounds(pos) {
                return Err(MoveError::OutOfBounds);
            }
            match self.cells[self.index(pos)] {
                None => {}
                Some(id) if id == mover => {}
                Some(_) => return Err(MoveError::Collision),
            }
        }
        Ok(())
    }

    /// Mark every cell covered by the piece as occupied by it.
    /// Caller must have validated the placement.
    pub fn place(&mut self, piece: &Piece) {
        for pos in piece.covered() {
            debug_assert!(self.is_empty(pos), "place() onto occupied cell {pos:?}");
            let idx = self.index(pos);
            self.cells[idx] = Some(piece.id);
        }
    }

    /// Clear every cell the piece currently covers.
    pub fn remove(&mut self, piece: &Piece) {
        for pos in piece.covered() {
            debug_assert_eq!(self.occupant(pos), Some(piece.id));
            let idx = self.index(pos);
            self.cells[idx] = None;
        }
    }

    /// Breadth-first search over empty cells from the start gate to the end
    /// gate. Returns the discovered path (source to sink) or None. Both gate
    /// cells must themselves be empty for any path to exist.
    ///
    /// FIFO expansion with a fixed neighbor order, so the first (hop-count
    /// shortest) path found is stable for a given occupancy. O(size²).
    pub fn find_path(&self) -> Option<Vec<Pos>> {
        let source = self.start.cell(self.size);
        let sink = self.end.cell(self.size);
        if !self.is_empty(source) || !self.is_empty(sink) {
            return None;
        }

        // prev doubles as the visited marker; the source points at itself.
        let mut prev: Vec<usize> = vec![usize::MAX; self.cells.len()];
        let mut queue = VecDeque::new();
        prev[self.index(source)] = self.index(source);
        queue.push_back(source);

        while let Some(pos) = queue.pop_front() {
            if pos == sink {
                let mut path = vec![pos];
                let mut idx = self.index(pos);
                while prev[idx] != idx {
                    idx = prev[idx];
                    path.push(self.pos_at(idx));
                }
                path.reverse();
                return Some(path);
            }
            for (dr, dc) in NEIGHBORS {
                if let Some(next) = pos.step(dr, dc, self.size) {
                    let idx = self.index(next);
                    if self.cells[idx].is_none() && prev[idx] == usize::MAX {
                        prev[idx] = self.index(pos);
                        queue.push_back(next);
                    }
                }
            }
        }
        None
    }
}

/// A full puzzle: the board plus the bar pieces that produced its occupancy.
///
/// Pieces are stored in id order (`pieces[id.0]`), which keeps arrangement
/// snapshots canonical for the oracle.
#[derive(Clone, Debug)]
pub struct Puzzle {
    board: Board,
    pieces: Vec<Piece>,
}

impl Puzzle {
    /// Build a puzzle from a gate-only board and a set of pieces, placing
    /// each piece onto the board. Pieces must carry dense, ordered ids and a
    /// legal non-overlapping arrangement.
    pub fn new(mut board: Board, pieces: Vec<Piece>) -> Puzzle {
        for (i, piece) in pieces.iter().enumerate() {
            debug_assert_eq!(piece.id.0 as usize, i, "piece ids must be dense and ordered");
            board.place(piece);
        }
        Puzzle { board, pieces }
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    #[inline]
    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id.0 as usize)
    }

    /// Connectivity of the current arrangement. See [`Board::find_path`].
    #[inline]
    pub fn find_path(&self) -> Option<Vec<Pos>> {
        self.board.find_path()
    }

    /// Would the piece sit legally at `anchor`, with the piece itself lifted
    /// off the board? Pure query for drag previews.
    pub fn can_drop(&self, id: PieceId, anchor: Pos) -> bool {
        match self.piece(id) {
            Some(piece) => self
                .board
                .check_place_excluding(piece.shape, anchor, id)
                .is_ok(),
            None => false,
        }
    }

    /// Validate and apply a slide of `id` to a new anchor.
    ///
    /// The anchor must stay on the piece's slide axis, and every anchor
    /// swept between the current one and the candidate must be placeable
    /// with the mover lifted off the board: a bar slides through any number
    /// of empty cells in one move, but never past an obstacle. Applied fully
    /// or not at all.
    pub fn try_slide(&mut self, id: PieceId, to: Pos) -> Result<(), MoveError> {
        let idx = id.0 as usize;
        let piece = *self.pieces.get(idx).ok_or(MoveError::UnknownPiece)?;
        let from = piece.anchor;

        let on_axis = match piece.shape.orientation() {
            Orientation::Horizontal => to.row == from.row,
            Orientation::Vertical => to.col == from.col,
        };
        if !on_axis {
            return Err(MoveError::OffAxis);
        }

        // Sweep one anchor at a time toward the candidate; the first blocked
        // anchor decides the rejection kind.
        let (dr, dc) = match piece.shape.orientation() {
            Orientation::Horizontal => (0i16, (to.col as i16 - from.col as i16).signum()),
            Orientation::Vertical => ((to.row as i16 - from.row as i16).signum(), 0i16),
        };
        let steps = (to.row as i16 - from.row as i16).abs() + (to.col as i16 - from.col as i16).abs();
        let mut cur = from;
        for _ in 0..steps {
            cur = Pos::new(
                (cur.row as i16 + dr) as u8,
                (cur.col as i16 + dc) as u8,
            );
            self.board.check_place_excluding(piece.shape, cur, id)?;
        }

        self.board.remove(&piece);
        self.pieces[idx].anchor = to;
        let moved = self.pieces[idx];
        self.board.place(&moved);
        Ok(())
    }

    /// Every anchor the piece can reach by sliding, scanning outward from
    /// its current anchor in both directions and stopping each direction at
    /// the first blocked anchor. The current anchor is not included.
    pub fn reachable_anchors(&self, id: PieceId) -> Vec<Pos> {
        let Some(piece) = self.piece(id) else {
            return Vec::new();
        };
        let (dr, dc) = piece.shape.orientation().delta();
        let mut out = Vec::new();
        for dir in [-1i8, 1] {
            let mut cur = piece.anchor;
            loop {
                let Some(next) = cur.step(dr * dir, dc * dir, self.board.size) else {
                    break;
                };
                if self
                    .board
                    .check_place_excluding(piece.shape, next, id)
                    .is_err()
                {
                    break;
                }
                out.push(next);
                cur = next;
            }
        }
        out
    }

    /// Rewrite every piece's anchor and rebuild occupancy to match. The
    /// anchors must describe a legal non-overlapping arrangement (the oracle
    /// only feeds back arrangements it derived from legal slides).
    pub fn restore_anchors(&mut self, anchors: &[Pos]) {
        debug_assert_eq!(anchors.len(), self.pieces.len());
        for piece in &self.pieces {
            self.board.remove(piece);
        }
        for (piece, &anchor) in self.pieces.iter_mut().zip(anchors) {
            piece.anchor = anchor;
        }
        for piece in &self.pieces {
            self.board.place(piece);
        }
    }
}
