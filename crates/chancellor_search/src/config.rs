//! Tunable thresholds of the search, loaded once per engine.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cache::CachePolicy;
use crate::error::{Result, SearchError};

/// When to stop branching and which moves are worth a look.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PruningConfig {
    /// Nodes less likely than this are scored by the engine, not expanded
    pub stop_at_accumulated_prob: f64,
    /// Opponent replies rarer than this share are ignored
    pub skip_opp_moves_with_prob: f64,
    /// Our candidates losing more centipawns than this are dropped
    pub min_eval_diff_to_consider: f64,
    /// Our candidates rarer than this share are not considered
    pub min_frequency_to_consider: f64,
    /// Dropped candidates at least this popular get a refutation line
    pub consider_solid_move_prob: f64,
    /// Share a reply needs for the engine line to be followed through it
    pub clear_best_move_prob: f64,
    /// Advantage after which a winning capture ends the branch
    pub significant_advantage_diff: f64,
}

impl Default for PruningConfig {
    fn default() -> Self {
        Self {
            stop_at_accumulated_prob: 0.10,
            skip_opp_moves_with_prob: 0.010,
            min_eval_diff_to_consider: -150.0,
            min_frequency_to_consider: 0.02,
            consider_solid_move_prob: 0.100,
            clear_best_move_prob: 0.70,
            significant_advantage_diff: 500.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidthConfig {
    pub moves_to_consider: usize,
    pub additional_moves_at_root: usize,
}

impl Default for WidthConfig {
    fn default() -> Self {
        Self {
            moves_to_consider: 2,
            additional_moves_at_root: 0,
        }
    }
}

/// Centipawn swings and rarity shares behind the quality glyphs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationConfig {
    pub dubious_move_diff: f64,
    pub mistake_move_diff: f64,
    pub blunder_move_diff: f64,
    pub interesting_move_diff: f64,
    pub good_move_diff: f64,
    pub brilliant_move_diff: f64,
    pub interesting_move_threshold: f64,
    pub good_move_threshold: f64,
    pub brilliant_move_threshold: f64,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            dubious_move_diff: -50.0,
            mistake_move_diff: -100.0,
            blunder_move_diff: -200.0,
            interesting_move_diff: 50.0,
            good_move_diff: 100.0,
            brilliant_move_diff: 200.0,
            interesting_move_threshold: 0.40,
            good_move_threshold: 0.25,
            brilliant_move_threshold: 0.15,
        }
    }
}

/// Number of engine lines requested at each kind of node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiPvConfig {
    pub before_our_move: usize,
    pub before_opp_move: usize,
    pub end_node: usize,
}

impl Default for MultiPvConfig {
    fn default() -> Self {
        Self {
            before_our_move: 2,
            before_opp_move: 2,
            end_node: 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub pruning: PruningConfig,
    pub width: WidthConfig,
    pub annotation: AnnotationConfig,
    pub multi_pv: MultiPvConfig,
    pub cache: CachePolicy,
}

impl SearchConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| SearchError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        let p = &self.pruning;
        let shares = [
            ("stop_at_accumulated_prob", p.stop_at_accumulated_prob),
            ("skip_opp_moves_with_prob", p.skip_opp_moves_with_prob),
            ("min_frequency_to_consider", p.min_frequency_to_consider),
            ("consider_solid_move_prob", p.consider_solid_move_prob),
            ("clear_best_move_prob", p.clear_best_move_prob),
        ];
        for (name, value) in shares {
            if !(0.0..=1.0).contains(&value) {
                return Err(SearchError::Config(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if p.min_eval_diff_to_consider > 0.0 {
            return Err(SearchError::Config(
                "min_eval_diff_to_consider must not be positive".into(),
            ));
        }
        if self.width.moves_to_consider == 0 {
            return Err(SearchError::Config(
                "moves_to_consider must be at least 1".into(),
            ));
        }
        let m = &self.multi_pv;
        if m.before_our_move == 0 || m.before_opp_move == 0 || m.end_node == 0 {
            return Err(SearchError::Config("multi_pv values must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
