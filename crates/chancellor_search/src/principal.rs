//! Following the engine line through the replies real players agree on.

use chancellor_core::position::{parse_uci, to_uci};
use chancellor_core::ranking::{sort_by_popularity, total_occurrences};
use chancellor_core::MoveStats;
use chancellor_oracle::{ExplorerFilters, MoveStatistics, Mover};
use cozy_chess::Board;
use tracing::debug;

use crate::error::Result;

/// The part of `best_line` that real games confirm.
///
/// `board` is the position reached by `play`; `best_line` starts with our move
/// there. Our first move is always kept. After each of our moves the engine's
/// reply and our next move are appended only while the most played real reply
/// is the engine's reply, was seen more than once and holds at least
/// `clear_best_share` of the games, and two more plies of `best_line` remain.
pub fn extend_principal_variation<S: MoveStatistics>(
    stats: &S,
    filters: &ExplorerFilters,
    board: &Board,
    play: &[MoveStats],
    best_line: &[MoveStats],
    clear_best_share: f64,
) -> Result<Vec<MoveStats>> {
    let mut line = Vec::new();
    let Some(first) = best_line.first() else {
        return Ok(line);
    };

    let mut board = board.clone();
    let mut played = play.to_vec();
    board.play_unchecked(parse_uci(&board, &first.uci)?);
    line.push(first.clone());
    played.push(first.clone());

    let mut i = 0;
    while i + 2 < best_line.len() {
        let expected = &best_line[i + 1];
        let mut replies = stats.fetch_moves(&played, Mover::They, filters)?;
        sort_by_popularity(&mut replies);
        let total = total_occurrences(&replies);
        let Some(top) = replies.first() else {
            break;
        };
        let occurrences = top.occurrences();
        let agreed = occurrences > 1
            && occurrences as f64 >= total as f64 * clear_best_share
            && to_uci(&board, parse_uci(&board, &top.uci)?) == expected.uci;
        if !agreed {
            break;
        }

        let ours = &best_line[i + 2];
        board.play_unchecked(parse_uci(&board, &expected.uci)?);
        board.play_unchecked(parse_uci(&board, &ours.uci)?);
        line.push(expected.clone());
        line.push(ours.clone());
        played.push(expected.clone());
        played.push(ours.clone());
        i += 2;
    }

    debug!(engine = best_line.len(), kept = line.len(), "extended principal variation");
    Ok(line)
}
