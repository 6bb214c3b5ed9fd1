//! Refutation lines for popular moves the engine rejects.

use chancellor_core::position::{
    is_capture, material_balance, parse_uci, pawns_threaten_pieces, play_uci,
};
use chancellor_core::{AnnotatedMove, ChessError, Evaluation, MoveStats, Variant};
use cozy_chess::{Board, Color};
use tracing::debug;

use crate::annotate::annotate_mistake_move;
use crate::config::AnnotationConfig;

/// Cut the engine line after `candidate` down to the point where the
/// opponent has cashed in on it.
///
/// `board` is the position before `candidate`; `evaluation` is the engine's
/// best line after it and `swing` the centipawn loss that flagged the move.
/// The line is walked one opponent/reply pair at a time and stops after the
/// first pair that starts with a capture and leaves the opponent at least
/// half of `swing` up in material. When our pawn attacks one of their pieces
/// at that point, one more pair is shown so the fork can be collected.
pub fn punishment_line(
    board: &Board,
    candidate: &MoveStats,
    evaluation: &Evaluation,
    swing: f64,
    config: &AnnotationConfig,
) -> Result<Variant, ChessError> {
    let mut sequence = evaluation.best_line.as_slice();
    if sequence.len() % 2 == 0 {
        // Finish on an opponent move.
        sequence = &sequence[..sequence.len().saturating_sub(1)];
    }

    let mut board = board.clone();
    let initial = material_balance(&board) as f64;
    play_uci(&mut board, &candidate.uci)?;

    let opponent = board.side_to_move();
    let us = !opponent;
    let threshold = swing.abs() / 2.0;

    let mut stop = sequence.len();
    let mut pawn_threat = false;
    let mut i = 0;
    while i + 1 < sequence.len() {
        stop = i + 1;
        let theirs = parse_uci(&board, &sequence[i].uci)?;
        let captured = is_capture(&board, theirs);
        board.play_unchecked(theirs);
        play_uci(&mut board, &sequence[i + 1].uci)?;
        i += 2;

        if !captured && !pawn_threat {
            continue;
        }
        let after = material_balance(&board) as f64;
        let cashed_in = match opponent {
            Color::White => after > initial + threshold,
            Color::Black => after < initial - threshold,
        };
        if cashed_in {
            if !pawn_threat && pawns_threaten_pieces(&board, us) {
                pawn_threat = true;
                continue;
            }
            break;
        }
    }

    debug!(
        candidate = %candidate.san,
        swing,
        shown = stop,
        "punishment line"
    );

    let mut moves = Vec::with_capacity(stop + 1);
    moves.push(AnnotatedMove::new(
        candidate.clone(),
        annotate_mistake_move(config, swing),
    ));
    moves.extend(sequence[..stop].iter().cloned().map(AnnotatedMove::from));
    Ok(Variant::new(
        moves,
        evaluation.win_rate,
        evaluation.centipawns as f64,
    ))
}

#[cfg(test)]
#[path = "blunder_tests.rs"]
mod blunder_tests;
