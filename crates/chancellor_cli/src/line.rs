//! Move lists given on the command line.

use anyhow::{Context, Result};
use chancellor_core::position::annotate_line;
use chancellor_core::{AnnotatedMove, MoveStats, Variant, UNDEFINED_WIN_RATE};
use cozy_chess::Board;

/// Coordinate moves from the starting position, given as separate
/// arguments or as one space separated string.
pub fn parse_line(args: &[String]) -> Result<Vec<MoveStats>> {
    let ucis: Vec<&str> = args.iter().flat_map(|a| a.split_whitespace()).collect();
    annotate_line(&Board::default(), ucis.iter().copied())
        .with_context(|| format!("illegal line: {}", ucis.join(" ")))
}

/// A line to try first wherever the search passes through it.
pub fn included_line(text: &str) -> Result<Variant> {
    let moves = parse_line(&[text.to_string()])?;
    Ok(Variant::new(
        moves.into_iter().map(AnnotatedMove::from).collect(),
        UNDEFINED_WIN_RATE,
        0.0,
    ))
}
