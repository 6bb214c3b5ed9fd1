//! In-memory oracles for search tests.

#![allow(dead_code)]

use chancellor_core::position::{legal_moves, parse_fen, parse_uci, replay, san, to_uci};
use chancellor_core::PositionKey;
use chancellor_core::MoveStats;
use chancellor_oracle::{
    EngineOracle, ExplorerFilters, MoveStatistics, Mover, OracleError, PvLine,
};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};

fn play_key(play: &[MoveStats]) -> String {
    play.iter().map(|m| m.uci.as_str()).collect::<Vec<_>>().join(",")
}

pub fn stat(uci: &str, white: u64, draws: u64, black: u64) -> MoveStats {
    MoveStats::new(uci, uci).with_counts(white, draws, black)
}

/// `count` games split 40/30/30 between White wins, draws and Black wins.
pub fn games(uci: &str, count: u64) -> MoveStats {
    let white = count * 4 / 10;
    let draws = count * 3 / 10;
    stat(uci, white, draws, count - white - draws)
}

/// Statistics looked up by the moves played so far. Notation is filled in
/// from the position, so entries only need coordinates and counts.
#[derive(Default)]
pub struct Book {
    moves: HashMap<String, Vec<MoveStats>>,
    openings: HashMap<String, String>,
    calls: AtomicUsize,
    fetched: Mutex<Vec<String>>,
}

impl Book {
    pub fn new() -> Self {
        Self::default()
    }

    /// `play` is a comma-joined list of coordinate moves, empty for the start.
    pub fn after(mut self, play: &str, moves: Vec<MoveStats>) -> Self {
        self.moves.insert(play.to_string(), moves);
        self
    }

    pub fn opening(mut self, play: &str, name: &str) -> Self {
        self.openings.insert(play.to_string(), name.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every position asked about, in the same comma-joined form as `after`.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().clone()
    }
}

impl MoveStatistics for Book {
    fn fetch_moves(
        &self,
        play: &[MoveStats],
        _mover: Mover,
        _filters: &ExplorerFilters,
    ) -> Result<Vec<MoveStats>, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.fetched.lock().push(play_key(play));
        let Some(moves) = self.moves.get(&play_key(play)) else {
            return Ok(Vec::new());
        };
        let board = replay(play).map_err(|e| OracleError::Client(e.to_string()))?;
        moves
            .iter()
            .map(|mv| {
                let parsed =
                    parse_uci(&board, &mv.uci).map_err(|e| OracleError::Client(e.to_string()))?;
                let mut mv = mv.clone();
                mv.san = san(&board, parsed);
                Ok(mv)
            })
            .collect()
    }

    fn fetch_opening_name(&self, play: &[MoveStats]) -> Result<String, OracleError> {
        Ok(self
            .openings
            .get(&play_key(play))
            .cloned()
            .unwrap_or_else(|| "Unknown Opening".to_string()))
    }
}

/// Engine lines looked up by position, scores for the side to move.
#[derive(Default)]
pub struct Engine {
    lines: HashMap<PositionKey, Vec<PvLine>>,
    calls: AtomicUsize,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines for the position after `play` (coordinate moves).
    pub fn at(mut self, play: &[&str], lines: &[(&str, i32)]) -> Self {
        let lines = lines
            .iter()
            .map(|(moves, cp)| PvLine {
                moves: moves.to_string(),
                cp: Some(*cp),
                mate: None,
            })
            .collect();
        self.lines.insert(key_after(play), lines);
        self
    }

    pub fn mate_at(mut self, play: &[&str], moves: &str, mate: i32) -> Self {
        let line = PvLine {
            moves: moves.to_string(),
            cp: None,
            mate: Some(mate),
        };
        self.lines.insert(key_after(play), vec![line]);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn key_after(play: &[&str]) -> PositionKey {
    let stats: Vec<MoveStats> = play.iter().map(|uci| MoveStats::new(*uci, "")).collect();
    PositionKey::of(&replay(&stats).unwrap())
}

impl EngineOracle for Engine {
    fn analyse(&self, fen: &str, multi_pv: usize) -> Result<Option<Vec<PvLine>>, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .lines
            .get(&PositionKey::from_fen(fen))
            .map(|lines| lines.iter().take(multi_pv).cloned().collect()))
    }
}

/// Every position is level and the first legal move is best.
pub struct LevelEngine;

impl EngineOracle for LevelEngine {
    fn analyse(&self, fen: &str, _multi_pv: usize) -> Result<Option<Vec<PvLine>>, OracleError> {
        let board = parse_fen(fen).map_err(|e| OracleError::Client(e.to_string()))?;
        Ok(legal_moves(&board).first().map(|&mv| {
            vec![PvLine {
                moves: to_uci(&board, mv),
                cp: Some(0),
                mate: None,
            }]
        }))
    }
}

/// Pseudo-random but reproducible statistics over legal moves.
pub struct SyntheticExplorer {
    pub seed: u64,
    pub max_moves: usize,
}

impl MoveStatistics for SyntheticExplorer {
    fn fetch_moves(
        &self,
        play: &[MoveStats],
        _mover: Mover,
        _filters: &ExplorerFilters,
    ) -> Result<Vec<MoveStats>, OracleError> {
        let board = replay(play).map_err(|e| OracleError::Client(e.to_string()))?;
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        play_key(play).hash(&mut hasher);
        let mut rng = StdRng::seed_from_u64(hasher.finish());

        let mut moves = legal_moves(&board);
        moves.shuffle(&mut rng);
        moves.truncate(self.max_moves);
        Ok(moves
            .into_iter()
            .map(|mv| {
                MoveStats::new(to_uci(&board, mv), san(&board, mv)).with_counts(
                    rng.gen_range(50..150),
                    rng.gen_range(50..150),
                    rng.gen_range(50..150),
                )
            })
            .collect())
    }

    fn fetch_opening_name(&self, _play: &[MoveStats]) -> Result<String, OracleError> {
        Ok("Synthetic".to_string())
    }
}
