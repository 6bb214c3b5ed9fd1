//! Centipawn to win-probability conversion.
//!
//! A logistic curve whose offset and slope are third-order polynomials of the
//! game phase, fitted on engine self-play data.

use crate::types::INF_CP;

const AS: [f64; 4] = [0.38036525, -2.82015070, 23.17882135, 307.36768407];
const BS: [f64; 4] = [-2.29434733, 13.27689788, -14.26828904, 63.45318330];

/// Plies beyond which the fit is flat.
const MAX_PLY: usize = 240;

fn polynomial(coefficients: &[f64; 4], m: f64) -> f64 {
    ((coefficients[0] * m + coefficients[1]) * m + coefficients[2]) * m + coefficients[3]
}

/// Per-mille probability that the side with `centipawns` wins outright.
pub fn expected_win_rate(centipawns: f64, ply: usize) -> f64 {
    let m = ply.min(MAX_PLY) as f64 / 64.0;
    let a = polynomial(&AS, m);
    let b = polynomial(&BS, m);
    let x = centipawns.clamp(-(INF_CP as f64), INF_CP as f64);
    (1000.0 / (1.0 + ((a - x) / b).exp())).round()
}

/// Expected points per mille for the side with `centipawns`, draws counting half.
pub fn expected_score(centipawns: f64, ply: usize) -> f64 {
    let ours = expected_win_rate(centipawns, ply);
    let theirs = expected_win_rate(-centipawns, ply);
    let draws = 1000.0 - ours - theirs;
    ours + draws / 2.0
}

#[cfg(test)]
#[path = "win_rate_tests.rs"]
mod win_rate_tests;
