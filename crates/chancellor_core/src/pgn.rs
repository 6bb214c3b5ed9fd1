//! Move-text rendering of variants, with refutations as nested sub-lines.

use crate::types::Variant;

/// Evaluation glyph for a White-relative centipawn score.
pub fn result_glyph(centipawns: f64) -> &'static str {
    match centipawns {
        cp if cp >= 300.0 => "+-",
        cp if cp >= 100.0 => "+/-",
        cp if cp >= 50.0 => "+=",
        cp if cp <= -300.0 => "-+",
        cp if cp <= -100.0 => "-/+",
        cp if cp <= -50.0 => "=+",
        _ => "=",
    }
}

/// Render `variant` as numbered move text.
///
/// `start_ply` is the ply index of the first move (0 for White's first move).
/// Punishment lines attached to a move are alternatives to it, so they are
/// rendered from that move's ply in parentheses right after it. The result
/// glyph is omitted when the line ends in mate.
pub fn write_moves(variant: &Variant, start_ply: usize) -> String {
    let mut tokens = Vec::with_capacity(variant.len());

    for (i, mv) in variant.moves.iter().enumerate() {
        let ply = start_ply + i;
        let mut token = String::new();
        if ply % 2 == 0 {
            token.push_str(&format!("{}.", ply / 2 + 1));
        }
        token.push_str(mv.san());
        if let Some(annotation) = mv.annotation {
            token.push_str(annotation.symbol());
        }
        if !mv.punishment_lines.is_empty() {
            token.push(' ');
            for line in &mv.punishment_lines {
                token.push_str(&format!("({})", write_moves(line, ply)));
            }
        }
        tokens.push(token);
    }

    let mut text = tokens.join(" ");
    let mated = variant
        .moves
        .last()
        .is_some_and(|mv| mv.stats.delivers_mate());
    if !mated {
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(result_glyph(variant.centipawns));
    }

    if start_ply % 2 == 1 {
        format!("{}...{}", start_ply / 2 + 1, text)
    } else {
        text
    }
}

#[cfg(test)]
#[path = "pgn_tests.rs"]
mod pgn_tests;
