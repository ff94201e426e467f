//! End-to-end generation invariants.
//!
//! Every board handed out by the generator must be unsolved at hand-off and
//! must stay solvable according to the oracle, across many fixed seeds; and
//! the generator must stop at its attempt cap instead of looping when every
//! candidate it can build is born connected.

use corridor_core::generate::{self, GenerateConfig, GenerateError};
use corridor_core::oracle::{self, Verdict};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn test_generated_boards_are_unsolved_and_solvable() {
    for seed in 0..100u64 {
        let rng = StdRng::seed_from_u64(seed);
        let puzzle = generate::generate(GenerateConfig::default(), rng)
            .unwrap_or_else(|err| panic!("seed {seed}: generation failed: {err}"));

        assert!(
            puzzle.find_path().is_none(),
            "seed {seed}: board must not start solved"
        );
        assert_eq!(
            oracle::solve(&puzzle, oracle::DEFAULT_EXPANSION_LIMIT),
            Verdict::Solvable,
            "seed {seed}: generated board must be oracle-solvable"
        );
    }
}

#[test]
fn test_generated_pieces_match_board_occupancy() {
    let rng = StdRng::seed_from_u64(2024);
    let puzzle = generate::generate(GenerateConfig::default(), rng).unwrap();

    for piece in puzzle.pieces() {
        for pos in piece.covered() {
            assert_eq!(puzzle.board().occupant(pos), Some(piece.id));
        }
    }
}

#[test]
fn test_generation_stops_at_the_cap_when_boards_are_born_connected() {
    // With no pieces to place, every candidate has an open corridor and is
    // rejected, so the only possible outcome is cap exhaustion.
    let config = GenerateConfig {
        piece_count: 0,
        board_attempts: 25,
        ..GenerateConfig::default()
    };
    match generate::generate(config, StdRng::seed_from_u64(7)) {
        Err(GenerateError::AttemptsExhausted { attempts }) => assert_eq!(attempts, 25),
        other => panic!("expected exhaustion, got {other:?}"),
    }
}

#[test]
fn test_invalid_settings_fail_before_any_attempt() {
    let config = GenerateConfig {
        shape_lengths: vec![9],
        ..GenerateConfig::default()
    };
    assert!(matches!(
        generate::generate(config, StdRng::seed_from_u64(0)),
        Err(GenerateError::InvalidConfig(_))
    ));
}
