//! Ordering of candidate moves by outcome statistics.

use cozy_chess::Color;

use crate::position::{is_legal_line, is_transposition};
use crate::types::{MoveStats, Variant};

/// z-value of a two-sided 95% confidence interval.
const Z: f64 = 1.96;

/// Points per game for `side` (wins plus half the draws), in `[0, 1]`.
pub fn score_rate(mv: &MoveStats, side: Color) -> f64 {
    let total = mv.occurrences() as f64;
    if total == 0.0 {
        return 0.0;
    }
    (mv.wins_for(side) as f64 + mv.draws as f64 / 2.0) / total
}

/// Lower bound of the Wilson score interval on `score_rate`.
///
/// Small samples are pushed down, so a well-established move beats a lucky
/// one with the same raw rate.
pub fn wilson_score(mv: &MoveStats, side: Color) -> f64 {
    let n = mv.occurrences() as f64;
    if n == 0.0 {
        return 0.0;
    }
    let phat = score_rate(mv, side);
    let z2 = Z * Z;
    let centre = phat + z2 / (2.0 * n);
    let spread = Z * ((phat * (1.0 - phat) + z2 / (4.0 * n)) / n).sqrt();
    (centre - spread) / (1.0 + z2 / n)
}

/// Sort best first by Wilson score for `side`. Ties keep their order.
pub fn sort_by_win_rate(moves: &mut [MoveStats], side: Color) {
    moves.sort_by(|a, b| wilson_score(b, side).total_cmp(&wilson_score(a, side)));
}

/// Sort most played first.
pub fn sort_by_popularity(moves: &mut [MoveStats]) {
    moves.sort_by_key(|m| std::cmp::Reverse(m.occurrences()));
}

pub fn total_occurrences(moves: &[MoveStats]) -> u64 {
    moves.iter().map(MoveStats::occurrences).sum()
}

/// Fraction of `total` games in which `mv` was played.
pub fn share(mv: &MoveStats, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    mv.occurrences() as f64 / total as f64
}

/// Order candidates so that moves continuing one of the `included` lines come
/// first, then moves reaching an included line's position one move early,
/// then everything else by Wilson score.
pub fn sort_by_included_and_win_rate(
    candidates: &[MoveStats],
    side: Color,
    play: &[MoveStats],
    included: &[Variant],
) -> Vec<MoveStats> {
    let ply = play.len();
    if included.is_empty() {
        let mut sorted = candidates.to_vec();
        sort_by_win_rate(&mut sorted, side);
        return sorted;
    }

    let continuations: Vec<Vec<MoveStats>> = included
        .iter()
        .filter(|v| v.len() > ply)
        .map(|v| v.stats().take(ply + 1).cloned().collect())
        .collect();

    let early_arrivals: Vec<Vec<MoveStats>> = included
        .iter()
        .filter(|v| v.len() > ply + 2)
        .map(|v| {
            let mut line: Vec<MoveStats> = v.stats().take(ply).cloned().collect();
            line.push(v.moves[ply + 2].stats.clone());
            line
        })
        .filter(|line| is_legal_line(line))
        .collect();

    let mut keyed: Vec<(bool, bool, f64, MoveStats)> = candidates
        .iter()
        .map(|mv| {
            let mut next = play.to_vec();
            next.push(mv.clone());
            let continues = continuations.iter().any(|l| is_transposition(l, &next));
            let arrives = early_arrivals.iter().any(|l| is_transposition(l, &next));
            (continues, arrives, wilson_score(mv, side), mv.clone())
        })
        .collect();

    keyed.sort_by(|a, b| {
        b.0.cmp(&a.0)
            .then(b.1.cmp(&a.1))
            .then(b.2.total_cmp(&a.2))
    });
    keyed.into_iter().map(|(_, _, _, mv)| mv).collect()
}

#[cfg(test)]
#[path = "ranking_tests.rs"]
mod ranking_tests;
