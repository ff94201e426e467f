//! Solvability search over piece arrangements.
//!
//! Breadth-first search on the arrangement graph: each node is one
//! assignment of anchors to pieces, each edge is one legal slide. The search
//! asks a single question — does any reachable arrangement open a corridor
//! between the gates? Equivalent arrangements reached through different move
//! orders collapse into one visited node, so this is reachability over
//! states, not a depth-limited hunt through move sequences.
//!
//! The frontier is FIFO and the visited set is keyed by the exact anchor
//! tuple. A hard cap on expansions keeps pathological boards from blowing up
//! the generator; hitting the cap is reported as [`Verdict::Inconclusive`],
//! never as proof of unsolvability.

use std::collections::{HashSet, VecDeque};

use tracing::debug;

use crate::{PieceId, Pos, Puzzle};

/// Default bound on state expansions before the search gives up.
pub const DEFAULT_EXPANSION_LIMIT: usize = 5000;

/// Outcome of a solvability search.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Verdict {
    /// Some sequence of legal slides connects the gates.
    Solvable,
    /// The reachable arrangement graph was exhausted without a connected
    /// state.
    Unsolvable,
    /// The expansion cap was hit first. Callers should treat this like
    /// unsolvable, but it is not a proof.
    Inconclusive,
}

/// Canonical arrangement key: every piece's anchor in piece-id order.
///
/// Two arrangements are equal iff every piece has the same anchor, so this
/// is exactly the visited-set identity the search needs.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct StateKey(Box<[Pos]>);

impl StateKey {
    fn capture(puzzle: &Puzzle) -> StateKey {
        StateKey(puzzle.pieces().iter().map(|p| p.anchor).collect())
    }

    fn with_anchor(&self, idx: usize, anchor: Pos) -> StateKey {
        let mut anchors = self.0.clone();
        anchors[idx] = anchor;
        StateKey(anchors)
    }

    pub fn anchors(&self) -> &[Pos] {
        &self.0
    }
}

/// Decide whether any finite sequence of legal slides from the puzzle's
/// current arrangement reaches a connected state.
///
/// Success is tested on each dequeued state; expansion enumerates every
/// reachable anchor of every piece with the rest held fixed. `limit` bounds
/// the number of dequeued-and-expanded states.
pub fn solve(puzzle: &Puzzle, limit: usize) -> Verdict {
    let mut scratch = puzzle.clone();
    let start = StateKey::capture(&scratch);

    let mut visited: HashSet<StateKey> = HashSet::new();
    let mut queue: VecDeque<StateKey> = VecDeque::new();
    visited.insert(start.clone());
    queue.push_back(start);

    let mut expanded = 0usize;
    while let Some(state) = queue.pop_front() {
        scratch.restore_anchors(state.anchors());
        if scratch.find_path().is_some() {
            return Verdict::Solvable;
        }

        expanded += 1;
        if expanded >= limit {
            debug!(expanded, "expansion cap hit, arrangement search inconclusive");
            return Verdict::Inconclusive;
        }

        for idx in 0..scratch.pieces().len() {
            let id = PieceId(idx as u8);
            for anchor in scratch.reachable_anchors(id) {
                let successor = state.with_anchor(idx, anchor);
                if visited.insert(successor.clone()) {
                    queue.push_back(successor);
                }
            }
        }
    }
    Verdict::Unsolvable
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Board, Orientation, Piece, PieceColor, Shape};

    fn bar(id: u8, len: u8, orientation: Orientation, row: u8, col: u8) -> Piece {
        Piece {
            id: PieceId(id),
            shape: Shape::new(len, orientation).unwrap(),
            anchor: Pos::new(row, col),
            color: PieceColor::Blue,
        }
    }

    /// 4×4 board, both gates in column 0, row 2 fully walled off:
    ///
    /// ```text
    /// S . . .
    /// . . . C
    /// B B B C
    /// E . . .
    /// ```
    ///
    /// The only solution is two slides: C up, then B right.
    fn two_slide_puzzle() -> Puzzle {
        Puzzle::new(
            Board::new(4, 0, 0),
            vec![
                bar(0, 3, Orientation::Horizontal, 2, 0),
                bar(1, 2, Orientation::Vertical, 1, 3),
            ],
        )
    }

    #[test]
    fn test_two_slide_board_is_solvable() {
        let puzzle = two_slide_puzzle();
        assert_eq!(puzzle.find_path(), None, "must not start solved");
        assert_eq!(solve(&puzzle, DEFAULT_EXPANSION_LIMIT), Verdict::Solvable);
    }

    #[test]
    fn test_single_slide_is_not_enough() {
        // Every one-move successor of the two-slide board stays blocked.
        let mut puzzle = two_slide_puzzle();
        for id in [PieceId(0), PieceId(1)] {
            for anchor in puzzle.reachable_anchors(id) {
                let mut moved = puzzle.clone();
                moved.try_slide(id, anchor).unwrap();
                assert_eq!(moved.find_path(), None, "{id:?} to {anchor:?}");
            }
        }
        // Sanity: the two-slide solution itself works.
        puzzle.try_slide(PieceId(1), Pos::new(0, 3)).unwrap();
        puzzle.try_slide(PieceId(0), Pos::new(2, 1)).unwrap();
        assert!(puzzle.find_path().is_some());
    }

    #[test]
    fn test_wedged_board_is_unsolvable() {
        // Full-width bars cover both gate rows; neither can slide anywhere.
        let puzzle = Puzzle::new(
            Board::new(4, 1, 2),
            vec![
                bar(0, 4, Orientation::Horizontal, 0, 0),
                bar(1, 4, Orientation::Horizontal, 3, 0),
            ],
        );
        assert_eq!(puzzle.reachable_anchors(PieceId(0)), Vec::new());
        assert_eq!(puzzle.reachable_anchors(PieceId(1)), Vec::new());
        assert_eq!(solve(&puzzle, DEFAULT_EXPANSION_LIMIT), Verdict::Unsolvable);
    }

    #[test]
    fn test_connected_board_solves_immediately() {
        let puzzle = Puzzle::new(Board::new(4, 2, 2), Vec::new());
        assert_eq!(solve(&puzzle, 1), Verdict::Solvable);
    }

    #[test]
    fn test_tiny_cap_is_inconclusive() {
        let puzzle = two_slide_puzzle();
        assert_eq!(solve(&puzzle, 1), Verdict::Inconclusive);
    }
}
