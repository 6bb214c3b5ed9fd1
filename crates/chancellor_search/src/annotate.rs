//! Move-quality glyphs from centipawn swings and how rarely a move is played.

use chancellor_core::Annotation;

use crate::config::AnnotationConfig;

/// Glyph for a strong move played in `share` of games, `advantage` centipawns
/// better for the mover than the alternative.
///
/// The rarer a strong move, the higher its glyph.
pub fn annotate_good_move(
    config: &AnnotationConfig,
    share: f64,
    advantage: f64,
) -> Option<Annotation> {
    if share < config.brilliant_move_threshold && advantage > config.brilliant_move_diff {
        Some(Annotation::Brilliant)
    } else if share < config.good_move_threshold && advantage > config.good_move_diff {
        Some(Annotation::Good)
    } else if share < config.interesting_move_threshold && advantage > config.interesting_move_diff
    {
        Some(Annotation::Interesting)
    } else {
        None
    }
}

/// Glyph for a move that changed the evaluation by `swing` centipawns for the
/// mover (negative is worse).
pub fn annotate_mistake_move(config: &AnnotationConfig, swing: f64) -> Option<Annotation> {
    if swing < config.blunder_move_diff {
        Some(Annotation::Blunder)
    } else if swing < config.mistake_move_diff {
        Some(Annotation::Mistake)
    } else if swing < config.dubious_move_diff {
        Some(Annotation::Dubious)
    } else {
        None
    }
}

/// Smallest swing worth a glyph in either direction.
pub fn significance(config: &AnnotationConfig) -> f64 {
    config
        .dubious_move_diff
        .abs()
        .min(config.interesting_move_diff.abs())
}

#[cfg(test)]
#[path = "annotate_tests.rs"]
mod annotate_tests;
