//! Engine scores for positions, converted to White-relative centipawns and
//! win rates and memoized per FEN.

use chancellor_core::position::{annotate_line, is_checkmate, replay};
use chancellor_core::win_rate::expected_win_rate;
use chancellor_core::{side_sign, Evaluation, MoveStats, BLACK_WIN_RATE, INF_CP, WHITE_WIN_RATE};
use chancellor_oracle::{EngineOracle, PvLine};
use cozy_chess::Board;
use std::sync::Arc;
use tracing::{info, warn};

use crate::cache::CacheManager;
use crate::error::Result;

/// Rating attached to engine moves so they sort like strong human moves.
const ENGINE_RATING: u32 = 2000;

/// Shared, immutable list of engine lines, best first.
pub type Evaluations = Arc<Vec<Evaluation>>;

pub struct Evaluator<E> {
    oracle: E,
    cache: Arc<CacheManager>,
}

impl<E: EngineOracle> Evaluator<E> {
    pub fn new(oracle: E, cache: Arc<CacheManager>) -> Self {
        Self { oracle, cache }
    }

    pub fn oracle(&self) -> &E {
        &self.oracle
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    pub fn into_oracle(self) -> E {
        self.oracle
    }

    /// Evaluate the position reached by `play` from the starting position.
    pub fn evaluate(
        &self,
        probability: f64,
        play: &[MoveStats],
        multi_pv: usize,
    ) -> Result<Option<Evaluations>> {
        let board = replay(play)?;
        self.evaluate_position(probability, &board, play.len(), multi_pv)
    }

    /// Up to `multi_pv` engine lines for `board`, reached after `ply` plies.
    ///
    /// # Panics
    /// If the side to move is checkmated. Callers terminate such nodes first.
    pub fn evaluate_position(
        &self,
        probability: f64,
        board: &Board,
        ply: usize,
        multi_pv: usize,
    ) -> Result<Option<Evaluations>> {
        assert!(
            !is_checkmate(board),
            "cannot evaluate a checkmated position: {board}"
        );

        let fen = board.to_string();
        if let Some(hit) = self.cache.get_evaluation(&fen) {
            return Ok(Some(hit));
        }

        let Some(lines) = self.oracle.analyse(&fen, multi_pv)? else {
            return Ok(None);
        };

        let mut evaluations = Vec::with_capacity(lines.len());
        for pv in &lines {
            if let Some(evaluation) = self.convert(pv, board, ply, probability)? {
                evaluations.push(evaluation);
            }
        }
        if evaluations.is_empty() {
            return Ok(None);
        }

        let best = &evaluations[0];
        info!(
            fen = %fen,
            cp = best.centipawns,
            win_rate = best.win_rate,
            probability,
            best = %best.best_move.san,
            "evaluated"
        );

        let evaluations = Arc::new(evaluations);
        self.cache.cache_evaluation(&fen, evaluations.clone());
        Ok(Some(evaluations))
    }

    fn convert(
        &self,
        pv: &PvLine,
        board: &Board,
        ply: usize,
        probability: f64,
    ) -> Result<Option<Evaluation>> {
        let sign = side_sign(board.side_to_move());

        let (centipawns, white, black) = match (pv.mate, pv.cp) {
            (Some(mate), _) if mate != 0 => {
                let cp = sign * mate.signum() * INF_CP;
                if cp > 0 {
                    (cp, WHITE_WIN_RATE, BLACK_WIN_RATE)
                } else {
                    (cp, BLACK_WIN_RATE, WHITE_WIN_RATE)
                }
            }
            (_, Some(cp)) => {
                let wcp = sign * cp.clamp(-INF_CP, INF_CP);
                (
                    wcp,
                    expected_win_rate(wcp as f64, ply),
                    expected_win_rate(-wcp as f64, ply),
                )
            }
            _ => {
                warn!(moves = %pv.moves, "engine line without a score");
                return Ok(None);
            }
        };
        let draws = 1000.0 - white - black;

        let best_line: Vec<MoveStats> = annotate_line(board, pv.uci_moves())?
            .into_iter()
            .map(|mut mv| {
                mv.average_rating = ENGINE_RATING;
                mv.white = white as u64;
                mv.draws = draws as u64;
                mv.black = black as u64;
                mv
            })
            .collect();
        let Some(best_move) = best_line.first().cloned() else {
            return Ok(None);
        };

        Ok(Some(Evaluation {
            centipawns,
            win_rate: white + draws / 2.0,
            best_move,
            best_line,
            probability,
        }))
    }
}

#[cfg(test)]
#[path = "evaluator_tests.rs"]
mod evaluator_tests;
