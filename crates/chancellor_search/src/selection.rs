//! Branching rules shared by the search and the leaf count.
//!
//! Both traversals must expand exactly the same moves, so every decision about
//! which candidates and replies to follow lives here.

use chancellor_core::position::{is_checkmate, parse_uci, to_uci};
use chancellor_core::ranking::{
    share, sort_by_included_and_win_rate, sort_by_win_rate, total_occurrences,
};
use chancellor_core::{ChessError, MoveStats, Variant};
use cozy_chess::{Board, Color};

use crate::config::{PruningConfig, WidthConfig};

/// Nodes reached less often than the floor are scored, not expanded.
pub fn is_below_floor(config: &PruningConfig, probability: f64) -> bool {
    probability < config.stop_at_accumulated_prob
}

/// How many of our candidates may be expanded at a node.
pub fn candidate_width(config: &WidthConfig, is_root: bool) -> usize {
    if is_root {
        config.moves_to_consider + config.additional_moves_at_root
    } else {
        config.moves_to_consider
    }
}

/// Rewrite explorer moves into the notation used everywhere else, so that
/// king-takes-rook castling compares equal to the engine's king-two-squares.
pub fn normalize_moves(
    board: &Board,
    moves: Vec<MoveStats>,
) -> Result<Vec<MoveStats>, ChessError> {
    moves
        .into_iter()
        .map(|mut mv| {
            let parsed = parse_uci(board, &mv.uci)?;
            mv.uci = to_uci(board, parsed);
            Ok(mv)
        })
        .collect()
}

/// Candidates in the order they are tried: included lines first, then by
/// Wilson score for `side`.
pub fn order_candidates(
    candidates: &[MoveStats],
    side: Color,
    play: &[MoveStats],
    included: &[Variant],
) -> Vec<MoveStats> {
    sort_by_included_and_win_rate(candidates, side, play, included)
}

pub fn mates_immediately(board: &Board, mv: &MoveStats) -> Result<bool, ChessError> {
    let mut after = board.clone();
    after.play_unchecked(parse_uci(board, &mv.uci)?);
    Ok(is_checkmate(&after))
}

/// Candidates chosen for expansion at one node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub moves: Vec<MoveStats>,
    /// The only move is a mate in one
    pub mate: bool,
}

/// Walk `ordered` until `width` moves are kept.
///
/// Moves rarer than `min_share` are passed over. A move that mates at once
/// replaces everything kept so far and ends the walk. Any other move is
/// offered to `keep`, which decides from its evaluation.
pub fn retain_candidates<E>(
    board: &Board,
    ordered: &[MoveStats],
    width: usize,
    min_share: f64,
    mut keep: impl FnMut(&MoveStats) -> Result<bool, E>,
) -> Result<Selection, E>
where
    E: From<ChessError>,
{
    let total = total_occurrences(ordered);
    let mut selection = Selection::default();
    for mv in ordered {
        if selection.moves.len() >= width {
            break;
        }
        if share(mv, total) < min_share {
            continue;
        }
        if mates_immediately(board, mv)? {
            selection.moves = vec![mv.clone()];
            selection.mate = true;
            break;
        }
        if keep(mv)? {
            selection.moves.push(mv.clone());
        }
    }
    Ok(selection)
}

/// An opponent reply worth following.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyBranch {
    pub reply: MoveStats,
    /// Fraction of games in which the reply was played
    pub share: f64,
    /// Probability of reaching the position after the reply
    pub probability: f64,
}

/// Opponent replies at least `min_share` popular, in Wilson order for `side`
/// (the side that played the move being answered).
///
/// A reply seen in a single game is followed but scored straight away.
pub fn reply_branches(
    mut replies: Vec<MoveStats>,
    side: Color,
    probability: f64,
    min_share: f64,
) -> Vec<ReplyBranch> {
    sort_by_win_rate(&mut replies, side);
    let total = total_occurrences(&replies);
    let threshold = total as f64 * min_share;
    replies
        .into_iter()
        .filter(|reply| reply.occurrences() as f64 >= threshold)
        .map(|reply| {
            let share = share(&reply, total);
            let probability = if total == 1 { 0.0 } else { probability * share };
            ReplyBranch {
                reply,
                share,
                probability,
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "selection_tests.rs"]
mod selection_tests;
