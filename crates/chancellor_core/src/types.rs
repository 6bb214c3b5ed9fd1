//! Data model shared by the statistics client, the evaluator and the search.
//!
//! Centipawns are always stored from White's point of view and win rates are
//! White's expected points per mille. `±INF_CP` marks a forced mate.

use cozy_chess::Color;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Centipawn sentinel for a forced mate (positive: White mates).
pub const INF_CP: i32 = 4000;
pub const DRAW_WIN_RATE: f64 = 500.0;
/// Win rate reported when no evaluation was available for a node.
pub const UNDEFINED_WIN_RATE: f64 = 500.0;
pub const WHITE_WIN_RATE: f64 = 1000.0;
pub const BLACK_WIN_RATE: f64 = 0.0;

/// Clamp a centipawn score into `[-INF_CP, INF_CP]`.
pub fn clamp_centipawns(cp: f64) -> f64 {
    cp.clamp(-(INF_CP as f64), INF_CP as f64)
}

/// Clamp a per-mille win rate into `[0, 1000]`.
pub fn clamp_win_rate(win_rate: f64) -> f64 {
    win_rate.clamp(BLACK_WIN_RATE, WHITE_WIN_RATE)
}

/// `1` when White is to move, `-1` otherwise.
pub fn side_sign(side: Color) -> i32 {
    match side {
        Color::White => 1,
        Color::Black => -1,
    }
}

/// A candidate move together with the aggregated outcome of real games.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveStats {
    /// Coordinate notation, e.g. `e2e4` or `e7e8q`
    pub uci: String,
    /// Standard algebraic notation, e.g. `Nxe4+`
    pub san: String,
    #[serde(default)]
    pub average_rating: u32,
    #[serde(default)]
    pub white: u64,
    #[serde(default)]
    pub draws: u64,
    #[serde(default)]
    pub black: u64,
}

impl MoveStats {
    pub fn new(uci: impl Into<String>, san: impl Into<String>) -> Self {
        Self {
            uci: uci.into(),
            san: san.into(),
            average_rating: 0,
            white: 0,
            draws: 0,
            black: 0,
        }
    }

    pub fn with_counts(mut self, white: u64, draws: u64, black: u64) -> Self {
        self.white = white;
        self.draws = draws;
        self.black = black;
        self
    }

    /// Total number of games in which this move was played.
    pub fn occurrences(&self) -> u64 {
        self.white + self.draws + self.black
    }

    pub fn wins_for(&self, side: Color) -> u64 {
        match side {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    pub fn delivers_mate(&self) -> bool {
        self.san.ends_with('#')
    }
}

/// Quality glyph attached to a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Annotation {
    Brilliant,
    Good,
    Interesting,
    Dubious,
    Mistake,
    Blunder,
}

impl Annotation {
    pub fn symbol(self) -> &'static str {
        match self {
            Annotation::Brilliant => "!!",
            Annotation::Good => "!",
            Annotation::Interesting => "!?",
            Annotation::Dubious => "?!",
            Annotation::Mistake => "?",
            Annotation::Blunder => "??",
        }
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A move as it appears inside a returned line, with whatever the search
/// concluded about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedMove {
    pub stats: MoveStats,
    #[serde(default)]
    pub annotation: Option<Annotation>,
    /// Popular but losing alternatives, each shown with its refutation
    #[serde(default)]
    pub punishment_lines: Vec<Variant>,
}

impl AnnotatedMove {
    pub fn new(stats: MoveStats, annotation: Option<Annotation>) -> Self {
        Self {
            stats,
            annotation,
            punishment_lines: Vec::new(),
        }
    }

    pub fn with_punishment_lines(mut self, lines: Vec<Variant>) -> Self {
        self.punishment_lines = lines;
        self
    }

    pub fn uci(&self) -> &str {
        &self.stats.uci
    }

    pub fn san(&self) -> &str {
        &self.stats.san
    }
}

impl From<MoveStats> for AnnotatedMove {
    fn from(stats: MoveStats) -> Self {
        Self::new(stats, None)
    }
}

/// An ordered line of moves with the score it leads to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub moves: Vec<AnnotatedMove>,
    pub win_rate: f64,
    pub centipawns: f64,
}

impl Variant {
    pub fn new(moves: Vec<AnnotatedMove>, win_rate: f64, centipawns: f64) -> Self {
        Self {
            moves,
            win_rate,
            centipawns,
        }
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn stats(&self) -> impl Iterator<Item = &MoveStats> {
        self.moves.iter().map(|m| &m.stats)
    }
}

/// One engine line for a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    /// White-relative centipawns, `±INF_CP` for mate
    pub centipawns: i32,
    /// White's expected points per mille
    pub win_rate: f64,
    pub best_move: MoveStats,
    pub best_line: Vec<MoveStats>,
    /// Probability of reaching the evaluated node
    pub probability: f64,
}

impl Evaluation {
    /// Synthetic evaluation for a position reached by a mating move.
    pub fn checkmate_by(mover: Color, mating_move: MoveStats, probability: f64) -> Self {
        let (centipawns, win_rate) = match mover {
            Color::White => (INF_CP, WHITE_WIN_RATE),
            Color::Black => (-INF_CP, BLACK_WIN_RATE),
        };
        Self {
            centipawns,
            win_rate,
            best_move: mating_move.clone(),
            best_line: vec![mating_move],
            probability,
        }
    }

    pub fn is_mate(&self) -> bool {
        self.centipawns.abs() >= INF_CP
    }
}

/// Outcome of searching one node of the opening tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Probability-weighted centipawns over explored replies
    pub statistical_centipawns: f64,
    /// The engine's own score for the node, when one was obtained
    pub engine_centipawns: Option<i32>,
    pub win_rate: f64,
    pub variants: Vec<Variant>,
}

impl SearchResult {
    /// Result for a position repeated on the current path.
    pub fn draw() -> Self {
        Self {
            statistical_centipawns: 0.0,
            engine_centipawns: None,
            win_rate: DRAW_WIN_RATE,
            variants: Vec::new(),
        }
    }

    /// Result for a node the evaluator had nothing to say about.
    pub fn undefined() -> Self {
        Self {
            statistical_centipawns: 0.0,
            engine_centipawns: None,
            win_rate: UNDEFINED_WIN_RATE,
            variants: Vec::new(),
        }
    }

    /// Result for a side to move that is already mated.
    pub fn checkmated(side_to_move: Color) -> Self {
        let (cp, win_rate) = match side_to_move {
            Color::White => (-INF_CP, BLACK_WIN_RATE),
            Color::Black => (INF_CP, WHITE_WIN_RATE),
        };
        Self {
            statistical_centipawns: cp as f64,
            engine_centipawns: Some(cp),
            win_rate,
            variants: Vec::new(),
        }
    }

    /// Terminal result carrying a single line scored by `evaluation`.
    pub fn terminal(evaluation: &Evaluation, line: Vec<MoveStats>) -> Self {
        let centipawns = clamp_centipawns(evaluation.centipawns as f64);
        let win_rate = clamp_win_rate(evaluation.win_rate);
        Self {
            statistical_centipawns: centipawns,
            engine_centipawns: Some(evaluation.centipawns),
            win_rate,
            variants: vec![Variant::new(
                line.into_iter().map(AnnotatedMove::from).collect(),
                win_rate,
                centipawns,
            )],
        }
    }
}
