//! Interactive play session: serialized moves, win lock, view notifications.
//!
//! A [`Session`] is the explicit context object the presentation layer talks
//! to. It owns exactly one puzzle, applies moves atomically (a move is
//! validated against current occupancy and applied fully or not at all), and
//! queues [`Event`]s for the view to drain. Moves are serialized by the
//! exclusive borrow `attempt_move` takes; once the corridor connects the
//! session locks and every further move is rejected.

use serde::Serialize;

use crate::{MoveError, PieceId, Pos, Puzzle};

/// Lifecycle of a session's puzzle.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub enum Status {
    InPlay,
    /// The corridor is open. The board is locked; moves are rejected.
    Won,
}

/// Notification for the presentation layer. Emitted in order; drain with
/// [`Session::take_events`].
#[derive(Clone, PartialEq, Debug, Serialize)]
pub enum Event {
    /// A fresh board was installed (new session or reset).
    BoardGenerated,
    MoveAccepted {
        piece: PieceId,
        to: Pos,
    },
    MoveRejected {
        piece: PieceId,
        reason: MoveError,
    },
    /// Connectivity flipped. Only the disconnected→connected transition can
    /// occur during play, because the board locks on win.
    ConnectivityChanged {
        connected: bool,
    },
    /// The corridor opened; the winning path is attached.
    Won {
        path: Vec<Pos>,
    },
}

/// What a move attempt did, reported back to the caller.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct MoveOutcome {
    pub accepted: bool,
    /// Rejection reason when `accepted` is false.
    pub rejected: Option<MoveError>,
    /// Whether the corridor is open after this attempt.
    pub connected: bool,
    /// The connecting path, when one exists.
    pub path: Option<Vec<Pos>>,
}

/// One live puzzle and its interaction state.
pub struct Session {
    puzzle: Puzzle,
    status: Status,
    events: Vec<Event>,
}

impl Session {
    /// Start a session on the given puzzle. Emits [`Event::BoardGenerated`];
    /// a hand-built board that is already connected locks immediately.
    pub fn new(puzzle: Puzzle) -> Session {
        let mut session = Session {
            puzzle,
            status: Status::InPlay,
            events: Vec::new(),
        };
        session.install();
        session
    }

    /// Replace the board wholesale, as after a restart.
    pub fn reset(&mut self, puzzle: Puzzle) {
        self.puzzle = puzzle;
        self.status = Status::InPlay;
        self.install();
    }

    fn install(&mut self) {
        self.events.push(Event::BoardGenerated);
        if let Some(path) = self.puzzle.find_path() {
            self.status = Status::Won;
            self.events.push(Event::ConnectivityChanged { connected: true });
            self.events.push(Event::Won { path });
        }
    }

    #[inline]
    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    #[inline]
    pub fn status(&self) -> Status {
        self.status
    }

    #[inline]
    pub fn is_won(&self) -> bool {
        self.status == Status::Won
    }

    /// Validate and apply one slide.
    ///
    /// Takes `&mut self`, so attempts are serialized: each one sees the
    /// board exactly as the previous attempt left it, and occupancy after
    /// two back-to-back attempts always matches a whole number of applied
    /// moves, never a partial merge. A won session rejects everything with
    /// [`MoveError::Locked`].
    pub fn attempt_move(&mut self, id: PieceId, anchor: Pos) -> MoveOutcome {
        if self.status == Status::Won {
            self.events.push(Event::MoveRejected {
                piece: id,
                reason: MoveError::Locked,
            });
            let path = self.puzzle.find_path();
            return MoveOutcome {
                accepted: false,
                rejected: Some(MoveError::Locked),
                connected: true,
                path,
            };
        }

        match self.puzzle.try_slide(id, anchor) {
            Err(reason) => {
                self.events.push(Event::MoveRejected { piece: id, reason });
                MoveOutcome {
                    accepted: false,
                    rejected: Some(reason),
                    connected: false,
                    path: None,
                }
            }
            Ok(()) => {
                self.events.push(Event::MoveAccepted { piece: id, to: anchor });
                let path = self.puzzle.find_path();
                let connected = path.is_some();
                if let Some(path) = &path {
                    self.status = Status::Won;
                    self.events.push(Event::ConnectivityChanged { connected: true });
                    self.events.push(Event::Won { path: path.clone() });
                }
                MoveOutcome {
                    accepted: true,
                    rejected: None,
                    connected,
                    path,
                }
            }
        }
    }

    /// Current connectivity. Deterministic and side-effect free: repeated
    /// calls on an unmodified board return the identical path.
    #[inline]
    pub fn query_connectivity(&self) -> Option<Vec<Pos>> {
        self.puzzle.find_path()
    }

    /// Legality probe for drag previews; never mutates.
    #[inline]
    pub fn can_drop(&self, id: PieceId, anchor: Pos) -> bool {
        self.puzzle.can_drop(id, anchor)
    }

    /// Drain queued notifications, oldest first.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
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
            color: PieceColor::Green,
        }
    }

    /// The two-slide board from the oracle tests: wall across row 2, gates
    /// in column 0 of a 4×4 grid.
    fn two_slide_session() -> Session {
        Session::new(Puzzle::new(
            Board::new(4, 0, 0),
            vec![
                bar(0, 3, Orientation::Horizontal, 2, 0),
                bar(1, 2, Orientation::Vertical, 1, 3),
            ],
        ))
    }

    #[test]
    fn test_win_flow_and_events() {
        let mut session = two_slide_session();
        assert_eq!(session.take_events(), vec![Event::BoardGenerated]);

        let first = session.attempt_move(PieceId(1), Pos::new(0, 3));
        assert!(first.accepted);
        assert!(!first.connected);
        assert_eq!(first.path, None);
        assert_eq!(session.status(), Status::InPlay);

        let second = session.attempt_move(PieceId(0), Pos::new(2, 1));
        assert!(second.accepted);
        assert!(second.connected);
        let path = second.path.expect("winning move must carry a path");
        assert_eq!(path.first(), Some(&Pos::new(0, 0)));
        assert_eq!(path.last(), Some(&Pos::new(3, 0)));
        assert!(session.is_won());

        assert_eq!(
            session.take_events(),
            vec![
                Event::MoveAccepted {
                    piece: PieceId(1),
                    to: Pos::new(0, 3)
                },
                Event::MoveAccepted {
                    piece: PieceId(0),
                    to: Pos::new(2, 1)
                },
                Event::ConnectivityChanged { connected: true },
                Event::Won { path },
            ]
        );
    }

    #[test]
    fn test_won_board_is_locked() {
        let mut session = two_slide_session();
        session.attempt_move(PieceId(1), Pos::new(0, 3));
        session.attempt_move(PieceId(0), Pos::new(2, 1));
        assert!(session.is_won());
        session.take_events();

        let outcome = session.attempt_move(PieceId(1), Pos::new(1, 3));
        assert!(!outcome.accepted);
        assert_eq!(outcome.rejected, Some(MoveError::Locked));
        assert!(outcome.connected);
        assert_eq!(
            session.take_events(),
            vec![Event::MoveRejected {
                piece: PieceId(1),
                reason: MoveError::Locked
            }]
        );
        // Anchor untouched.
        assert_eq!(session.puzzle().piece(PieceId(1)).unwrap().anchor, Pos::new(0, 3));
    }

    #[test]
    fn test_rejected_move_leaves_board_unchanged() {
        let mut session = two_slide_session();
        session.take_events();

        let outcome = session.attempt_move(PieceId(0), Pos::new(2, 1));
        assert!(!outcome.accepted);
        assert_eq!(outcome.rejected, Some(MoveError::Collision));
        assert_eq!(session.puzzle().piece(PieceId(0)).unwrap().anchor, Pos::new(2, 0));
        assert_eq!(
            session.take_events(),
            vec![Event::MoveRejected {
                piece: PieceId(0),
                reason: MoveError::Collision
            }]
        );
    }

    #[test]
    fn test_back_to_back_moves_never_merge() {
        // Both bars race for row 3: once the first slide lands, the second
        // must be validated against the updated occupancy and rejected, so
        // the final board reflects exactly one applied move. A third bar
        // covers the start gate to keep the session unlocked.
        let mut session = Session::new(Puzzle::new(
            Board::new(8, 6, 6),
            vec![
                bar(0, 2, Orientation::Vertical, 1, 0),
                bar(1, 3, Orientation::Horizontal, 3, 2),
                bar(2, 2, Orientation::Vertical, 0, 6),
            ],
        ));
        assert!(!session.is_won());

        let first = session.attempt_move(PieceId(0), Pos::new(2, 0));
        assert!(first.accepted);
        let second = session.attempt_move(PieceId(1), Pos::new(3, 0));
        assert!(!second.accepted);
        assert_eq!(second.rejected, Some(MoveError::Collision));

        // Occupancy equals move one applied alone.
        assert_eq!(session.puzzle().board().occupant(Pos::new(2, 0)), Some(PieceId(0)));
        assert_eq!(session.puzzle().board().occupant(Pos::new(3, 0)), Some(PieceId(0)));
        assert_eq!(session.puzzle().board().occupant(Pos::new(3, 2)), Some(PieceId(1)));
        assert!(session.puzzle().board().is_empty(Pos::new(1, 0)));
    }

    #[test]
    fn test_connectivity_query_is_idempotent() {
        let session = two_slide_session();
        assert_eq!(session.query_connectivity(), None);
        assert_eq!(session.query_connectivity(), None);

        let open = Session::new(Puzzle::new(Board::new(8, 4, 4), Vec::new()));
        assert_eq!(open.query_connectivity(), open.query_connectivity());
    }

    #[test]
    fn test_already_connected_board_locks_immediately() {
        let mut session = Session::new(Puzzle::new(Board::new(4, 1, 1), Vec::new()));
        assert!(session.is_won());
        let events = session.take_events();
        assert_eq!(events[0], Event::BoardGenerated);
        assert_eq!(events[1], Event::ConnectivityChanged { connected: true });
        assert!(matches!(events[2], Event::Won { .. }));

        let outcome = session.attempt_move(PieceId(0), Pos::new(0, 0));
        assert_eq!(outcome.rejected, Some(MoveError::Locked));
    }

    #[test]
    fn test_can_drop_probe() {
        let session = two_slide_session();
        // Own cells are ignored while probing.
        assert!(session.can_drop(PieceId(0), Pos::new(2, 0)));
        // (2,3) belongs to the other bar.
        assert!(!session.can_drop(PieceId(0), Pos::new(2, 1)));
        assert!(!session.can_drop(PieceId(99), Pos::new(0, 0)));
    }

    #[test]
    fn test_outcome_serializes_for_the_view() {
        let mut session = two_slide_session();
        let outcome = session.attempt_move(PieceId(1), Pos::new(0, 3));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["accepted"], true);
        assert_eq!(json["connected"], false);
        assert!(json["path"].is_null());
    }

    #[test]
    fn test_reset_reopens_the_session() {
        let mut session = two_slide_session();
        session.attempt_move(PieceId(1), Pos::new(0, 3));
        session.attempt_move(PieceId(0), Pos::new(2, 1));
        assert!(session.is_won());
        session.take_events();

        session.reset(Puzzle::new(
            Board::new(4, 0, 0),
            vec![
                bar(0, 3, Orientation::Horizontal, 2, 0),
                bar(1, 2, Orientation::Vertical, 1, 3),
            ],
        ));
        assert_eq!(session.status(), Status::InPlay);
        assert_eq!(session.take_events(), vec![Event::BoardGenerated]);
    }
}
