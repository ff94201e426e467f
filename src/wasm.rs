//! WASM bindings for corridor-core
//!
//! Provides a JavaScript-friendly API for the puzzle engine. The JS view
//! drives generation with `beginGenerate`/`stepGenerate` (one whole-board
//! attempt per call, so the page stays responsive and a busy indicator can
//! run), applies player drops through `attemptMove`, and drains engine
//! notifications with `takeEvents`.

use rand::rngs::ThreadRng;
use wasm_bindgen::prelude::*;

use crate::generate::{GenerateConfig, GenerationTask, Progress};
use crate::session::Session;
use crate::{Orientation, PieceId, Pos};

/// WASM-friendly wrapper around a puzzle session.
#[wasm_bindgen]
pub struct WasmGame {
    session: Option<Session>,
    pending: Option<GenerationTask<ThreadRng>>,
}

#[wasm_bindgen]
impl WasmGame {
    /// Create a game with no board yet.
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmGame {
        WasmGame {
            session: None,
            pending: None,
        }
    }

    /// Start generating a board. Returns false if the settings are invalid.
    /// Drive the work with `stepGenerate`.
    #[wasm_bindgen(js_name = beginGenerate)]
    pub fn begin_generate(&mut self, size: u8, piece_count: usize) -> bool {
        let config = GenerateConfig {
            size,
            piece_count,
            ..GenerateConfig::default()
        };
        match GenerationTask::new(config, rand::rng()) {
            Ok(task) => {
                self.pending = Some(task);
                true
            }
            Err(_) => false,
        }
    }

    /// Run one generation attempt.
    /// Returns "idle", "pending", "ready", or "failed".
    #[wasm_bindgen(js_name = stepGenerate)]
    pub fn step_generate(&mut self) -> String {
        let Some(task) = self.pending.as_mut() else {
            return "idle".to_string();
        };
        match task.step() {
            Progress::Pending { .. } => "pending".to_string(),
            Progress::Done(puzzle) => {
                self.pending = None;
                match self.session.as_mut() {
                    Some(session) => session.reset(puzzle),
                    None => self.session = Some(Session::new(puzzle)),
                }
                "ready".to_string()
            }
            Progress::Failed(_) => {
                self.pending = None;
                "failed".to_string()
            }
        }
    }

    /// Cancel an in-flight generation, if any.
    #[wasm_bindgen(js_name = cancelGenerate)]
    pub fn cancel_generate(&mut self) {
        self.pending = None;
    }

    /// Attempt to slide a piece to a new anchor.
    /// Returns { accepted, rejected, connected, path } or null without a board.
    #[wasm_bindgen(js_name = attemptMove)]
    pub fn attempt_move(&mut self, piece_id: u8, row: u8, col: u8) -> JsValue {
        let Some(session) = self.session.as_mut() else {
            return JsValue::NULL;
        };
        let outcome = session.attempt_move(PieceId(piece_id), Pos::new(row, col));
        serde_wasm_bindgen::to_value(&outcome).unwrap()
    }

    /// Current gate-to-gate path as [{row, col}, ...], or null.
    #[wasm_bindgen(js_name = queryConnectivity)]
    pub fn query_connectivity(&self) -> JsValue {
        match self.session.as_ref().and_then(|s| s.query_connectivity()) {
            Some(path) => serde_wasm_bindgen::to_value(&path).unwrap(),
            None => JsValue::NULL,
        }
    }

    /// Would the piece sit legally at (row, col)? Used for drag previews.
    #[wasm_bindgen(js_name = canDrop)]
    pub fn can_drop(&self, piece_id: u8, row: u8, col: u8) -> bool {
        match self.session.as_ref() {
            Some(session) => session.can_drop(PieceId(piece_id), Pos::new(row, col)),
            None => false,
        }
    }

    /// Every anchor the piece can slide to, as [{row, col}, ...].
    /// Used to clamp drags.
    #[wasm_bindgen(js_name = reachableAnchors)]
    pub fn reachable_anchors(&self, piece_id: u8) -> JsValue {
        let anchors = match self.session.as_ref() {
            Some(session) => session.puzzle().reachable_anchors(PieceId(piece_id)),
            None => Vec::new(),
        };
        serde_wasm_bindgen::to_value(&anchors).unwrap()
    }

    /// All pieces as JSON array.
    /// Each piece is { id, row, col, len, orientation, color }.
    pub fn pieces(&self) -> JsValue {
        let pieces: Vec<JsPiece> = self
            .session
            .as_ref()
            .map(|s| s.puzzle().pieces().iter().map(JsPiece::from).collect())
            .unwrap_or_default();
        serde_wasm_bindgen::to_value(&pieces).unwrap()
    }

    /// The two gates as [{ edge, column, role }, ...].
    pub fn gates(&self) -> JsValue {
        let gates: Vec<JsGate> = self
            .session
            .as_ref()
            .map(|s| {
                let board = s.puzzle().board();
                vec![
                    JsGate::from(board.start_gate()),
                    JsGate::from(board.end_gate()),
                ]
            })
            .unwrap_or_default();
        serde_wasm_bindgen::to_value(&gates).unwrap()
    }

    /// Board edge length, 0 when no board is live.
    #[wasm_bindgen(js_name = boardSize)]
    pub fn board_size(&self) -> u8 {
        self.session
            .as_ref()
            .map(|s| s.puzzle().board().size())
            .unwrap_or(0)
    }

    /// Check if the corridor is open and the board locked.
    #[wasm_bindgen(js_name = isWon)]
    pub fn is_won(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.is_won())
    }

    /// Drain queued engine notifications, oldest first.
    #[wasm_bindgen(js_name = takeEvents)]
    pub fn take_events(&mut self) -> JsValue {
        let events = match self.session.as_mut() {
            Some(session) => session.take_events(),
            None => Vec::new(),
        };
        serde_wasm_bindgen::to_value(&events).unwrap()
    }
}

impl Default for WasmGame {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable piece view for JavaScript
#[derive(serde::Serialize)]
struct JsPiece {
    id: u8,
    row: u8,
    col: u8,
    len: u8,
    orientation: &'static str,
    color: &'static str,
}

impl From<&crate::Piece> for JsPiece {
    fn from(piece: &crate::Piece) -> Self {
        JsPiece {
            id: piece.id.0,
            row: piece.anchor.row,
            col: piece.anchor.col,
            len: piece.shape.len(),
            orientation: match piece.shape.orientation() {
                Orientation::Horizontal => "horizontal",
                Orientation::Vertical => "vertical",
            },
            color: piece.color.name(),
        }
    }
}

/// Serializable gate view for JavaScript
#[derive(serde::Serialize)]
struct JsGate {
    edge: &'static str,
    column: u8,
    role: &'static str,
}

impl From<crate::Gate> for JsGate {
    fn from(gate: crate::Gate) -> Self {
        JsGate {
            edge: match gate.edge {
                crate::Edge::Top => "top",
                crate::Edge::Bottom => "bottom",
            },
            column: gate.column,
            role: match gate.role {
                crate::GateRole::Start => "start",
                crate::GateRole::End => "end",
            },
        }
    }
}
