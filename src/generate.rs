//! Random board generation with solvability validation.
//!
//! Boards are built by rejection sampling and only handed out once they
//! pass two gates: the board must not be born connected, and the
//! [`oracle`](crate::oracle) must confirm some sequence of slides connects
//! it. Rejected boards are thrown away whole and rebuilt, up to a bounded
//! number of attempts.
//!
//! Generation can take many attempts, so the loop is exposed two ways:
//! [`generate`] runs it to completion, and [`GenerationTask`] runs one
//! whole-board attempt per [`step`](GenerationTask::step) so an interactive
//! caller can keep its UI alive and cancel by dropping the task.

use std::fmt;

use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::{debug, trace};

use crate::oracle::{self, Verdict};
use crate::{Board, Orientation, Piece, PieceColor, PieceId, Pos, Puzzle, Shape};

/// Tunable knobs for board generation.
///
/// The defaults reproduce the standard game: an 8×8 grid, ten bars drawn
/// from lengths 2-4, and a hundred placement attempts per bar.
#[derive(Clone, Debug)]
pub struct GenerateConfig {
    /// Board edge length.
    pub size: u8,
    /// How many bars to place. Placement retries may exhaust before every
    /// bar fits; an under-full board is accepted.
    pub piece_count: usize,
    /// Bar lengths to draw from, uniformly.
    pub shape_lengths: Vec<u8>,
    /// Rejection-sampling budget per bar.
    pub placement_attempts: u32,
    /// Whole-board budget: how many candidate boards may be rejected before
    /// generation fails.
    pub board_attempts: u32,
    /// Expansion cap handed to the solvability oracle.
    pub oracle_limit: usize,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        GenerateConfig {
            size: 8,
            piece_count: 10,
            shape_lengths: vec![2, 3, 4],
            placement_attempts: 100,
            board_attempts: 100,
            oracle_limit: oracle::DEFAULT_EXPANSION_LIMIT,
        }
    }
}

impl GenerateConfig {
    /// Check that the knobs can produce a board at all.
    pub fn validate(&self) -> Result<(), GenerateError> {
        if self.size < 2 {
            return Err(GenerateError::InvalidConfig(
                "board size must be at least 2",
            ));
        }
        if self.piece_count > PieceId::MAX_PIECES {
            return Err(GenerateError::InvalidConfig("too many pieces"));
        }
        if self.shape_lengths.is_empty() {
            return Err(GenerateError::InvalidConfig("shape catalog is empty"));
        }
        for &len in &self.shape_lengths {
            if Shape::new(len, Orientation::Horizontal).is_none() || len > self.size {
                return Err(GenerateError::InvalidConfig(
                    "shape length must be 2..=4 and fit the board",
                ));
            }
        }
        if self.placement_attempts == 0 || self.board_attempts == 0 {
            return Err(GenerateError::InvalidConfig(
                "attempt budgets must be positive",
            ));
        }
        if self.oracle_limit == 0 {
            return Err(GenerateError::InvalidConfig(
                "oracle expansion cap must be positive",
            ));
        }
        Ok(())
    }
}

/// Why generation failed. Never silently yields an invalid board.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GenerateError {
    /// A configuration value cannot produce a board.
    InvalidConfig(&'static str),
    /// Every whole-board attempt was rejected. The caller must retry
    /// explicitly.
    AttemptsExhausted { attempts: u32 },
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::InvalidConfig(reason) => write!(f, "invalid config: {reason}"),
            GenerateError::AttemptsExhausted { attempts } => {
                write!(f, "no valid board after {attempts} attempts")
            }
        }
    }
}

impl std::error::Error for GenerateError {}

/// Progress of a [`GenerationTask`].
#[derive(Debug)]
pub enum Progress {
    /// The latest candidate board was rejected; call `step` again.
    Pending { attempt: u32 },
    /// A validated puzzle: unsolved at hand-off and oracle-solvable.
    Done(Puzzle),
    /// The attempt budget ran out.
    Failed(GenerateError),
}

/// Resumable generation driver.
///
/// Each `step` runs one whole-board attempt (build, connectivity screen,
/// oracle screen), so a caller can interleave other work between attempts
/// and cancel an in-flight generation by dropping the task.
pub struct GenerationTask<R: Rng> {
    config: GenerateConfig,
    rng: R,
    attempt: u32,
}

impl<R: Rng> GenerationTask<R> {
    pub fn new(config: GenerateConfig, rng: R) -> Result<GenerationTask<R>, GenerateError> {
        config.validate()?;
        Ok(GenerationTask {
            config,
            rng,
            attempt: 0,
        })
    }

    /// Whole-board attempts consumed so far.
    #[inline]
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Run one whole-board attempt.
    pub fn step(&mut self) -> Progress {
        if self.attempt >= self.config.board_attempts {
            return Progress::Failed(GenerateError::AttemptsExhausted {
                attempts: self.attempt,
            });
        }
        self.attempt += 1;

        let puzzle = build_candidate(&self.config, &mut self.rng);
        if puzzle.find_path().is_some() {
            trace!(attempt = self.attempt, "candidate born connected, rejected");
            return Progress::Pending {
                attempt: self.attempt,
            };
        }
        match oracle::solve(&puzzle, self.config.oracle_limit) {
            Verdict::Solvable => Progress::Done(puzzle),
            Verdict::Unsolvable => {
                debug!(attempt = self.attempt, "candidate unsolvable, rejected");
                Progress::Pending {
                    attempt: self.attempt,
                }
            }
            Verdict::Inconclusive => {
                debug!(
                    attempt = self.attempt,
                    "oracle inconclusive, candidate rejected"
                );
                Progress::Pending {
                    attempt: self.attempt,
                }
            }
        }
    }
}

/// Run the generate-validate-retry loop to completion.
pub fn generate<R: Rng>(config: GenerateConfig, rng: R) -> Result<Puzzle, GenerateError> {
    let mut task = GenerationTask::new(config, rng)?;
    loop {
        match task.step() {
            Progress::Pending { .. } => continue,
            Progress::Done(puzzle) => return Ok(puzzle),
            Progress::Failed(err) => return Err(err),
        }
    }
}

/// Build one unvalidated candidate: random opposite-edge gates, then pieces
/// by rejection sampling. A bar whose retries all collide is skipped.
fn build_candidate<R: Rng>(config: &GenerateConfig, rng: &mut R) -> Puzzle {
    let size = config.size;
    let start_col = rng.random_range(0..size);
    let end_col = rng.random_range(0..size);

    let mut board = Board::new(size, start_col, end_col);
    let mut pieces: Vec<Piece> = Vec::with_capacity(config.piece_count);

    for _ in 0..config.piece_count {
        for _ in 0..config.placement_attempts {
            let Some(&len) = config.shape_lengths.choose(rng) else {
                break;
            };
            let orientation = if rng.random() {
                Orientation::Horizontal
            } else {
                Orientation::Vertical
            };
            let Some(shape) = Shape::new(len, orientation) else {
                break;
            };

            // Sample anchors that leave room for the whole bar.
            let (row_span, col_span) = match orientation {
                Orientation::Horizontal => (size, size - len + 1),
                Orientation::Vertical => (size - len + 1, size),
            };
            let anchor = Pos::new(rng.random_range(0..row_span), rng.random_range(0..col_span));

            if board.can_place(shape, anchor) {
                let piece = Piece {
                    id: PieceId(pieces.len() as u8),
                    shape,
                    anchor,
                    color: PieceColor::ALL[rng.random_range(0..PieceColor::ALL.len())],
                };
                board.place(&piece);
                pieces.push(piece);
                break;
            }
        }
    }

    Puzzle::new(Board::new(size, start_col, end_col), pieces)
}
