//! A full query: one search per scenario, with the reporting around it.

use chancellor_core::pgn::write_moves;
use chancellor_core::position::replay;
use chancellor_core::ranking::{share, total_occurrences};
use chancellor_core::win_rate::expected_score;
use chancellor_core::{AnnotatedMove, MoveStats, SearchResult, Variant};
use chancellor_oracle::{EngineOracle, MoveStatistics, Mover};
use cozy_chess::Color;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::cache::CacheStats;
use crate::engine::{SearchEngine, SearchNode};
use crate::error::{Result, SearchError};
use crate::events::SearchEvent;
use crate::selection::normalize_moves;

#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    /// Moves already played from the starting position
    pub moves: Vec<MoveStats>,
    /// Build the repertoire for this colour. When the opponent is to move,
    /// each of their replies is searched as its own scenario.
    pub search_for: Option<Color>,
}

/// Outcome of searching one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioReport {
    pub moves: Vec<MoveStats>,
    /// Probability of the scenario being reached
    pub probability: f64,
    pub opening_name: String,
    pub estimated_leaves: u64,
    pub result: SearchResult,
    /// White's expected points from the statistical score at the average line length
    pub derived_win_rate: f64,
    /// Result variants prefixed with the scenario moves
    pub lines: Vec<Variant>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryReport {
    pub scenarios: Vec<ScenarioReport>,
    pub visited: u64,
    pub cache: CacheStats,
}

impl ScenarioReport {
    /// Plies of the scenario plus the average length of its variants.
    pub fn average_ply(moves: usize, result: &SearchResult) -> usize {
        if result.variants.is_empty() {
            return moves;
        }
        let total: usize = result.variants.iter().map(Variant::len).sum();
        moves + (total as f64 / result.variants.len() as f64).round() as usize
    }
}

impl QueryReport {
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| SearchError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| SearchError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Generate a text report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();
        let total = self.scenarios.len();
        for (index, scenario) in self.scenarios.iter().enumerate() {
            report.push_str(&format!(
                "=== Scenario {}/{}: {} ===\n",
                index + 1,
                total,
                scenario.opening_name
            ));
            report.push_str(&format!(
                "Probability {:.1}%, {} estimated leaves\n",
                scenario.probability * 100.0,
                scenario.estimated_leaves
            ));
            report.push_str(&format!(
                "Expected White cp {:+.0}, win rate {:.1}%, derived {:.1}%\n\n",
                scenario.result.statistical_centipawns,
                scenario.result.win_rate / 10.0,
                scenario.derived_win_rate / 10.0
            ));

            for (i, line) in scenario.lines.iter().enumerate() {
                report.push_str(&format!(
                    "{:>3}. {}  [{:+.0} cp, {:.1}%]\n",
                    i + 1,
                    write_moves(line, 0),
                    line.centipawns,
                    line.win_rate / 10.0
                ));
            }
            report.push('\n');
        }
        report.push_str(&format!(
            "Visited {} nodes ({} transposition hits, {} evaluation hits)\n",
            self.visited, self.cache.transposition_hits, self.cache.evaluation_hits
        ));
        report
    }

    /// Print report to stdout
    pub fn print_report(&self) {
        println!("{}", self.generate_report());
    }
}

/// The positions to search for `request`, each with the probability of
/// reaching it.
fn scenarios<S: MoveStatistics, E: EngineOracle>(
    engine: &SearchEngine<S, E>,
    request: &QueryRequest,
) -> Result<Vec<(Vec<MoveStats>, f64)>> {
    let board = replay(&request.moves)?;
    let single = vec![(request.moves.clone(), 1.0)];
    let Some(colour) = request.search_for else {
        return Ok(single);
    };
    if colour == board.side_to_move() {
        return Ok(single);
    }

    let replies = normalize_moves(
        &board,
        engine
            .stats()
            .fetch_moves(&request.moves, Mover::They, engine.filters())?,
    )?;
    if replies.is_empty() {
        return Ok(single);
    }
    let total = total_occurrences(&replies);
    Ok(replies
        .iter()
        .map(|reply| {
            let mut moves = request.moves.clone();
            moves.push(reply.clone());
            (moves, share(reply, total))
        })
        .collect())
}

/// Search every scenario of `request` in turn.
pub fn run_query<S: MoveStatistics, E: EngineOracle>(
    engine: &SearchEngine<S, E>,
    request: &QueryRequest,
) -> Result<QueryReport> {
    engine.stop_signal().start();
    let scenarios = scenarios(engine, request)?;
    let total = scenarios.len();
    let mut reports = Vec::with_capacity(total);

    for (index, (moves, probability)) in scenarios.into_iter().enumerate() {
        let opening_name = engine.stats().fetch_opening_name(&moves)?;
        let node = SearchNode::root(moves.clone(), probability)?;
        let estimated_leaves = engine.count_leaf_nodes(&node)?;
        info!(
            scenario = index + 1,
            total,
            opening = %opening_name,
            probability,
            estimated_leaves,
            "searching scenario"
        );
        engine.events().emit(SearchEvent::Scenario {
            index,
            total,
            opening: opening_name.clone(),
            estimated_leaves,
        });

        let result = engine.search(&node)?;
        let average_ply = ScenarioReport::average_ply(moves.len(), &result);
        let derived_win_rate = expected_score(result.statistical_centipawns, average_ply);
        info!(
            cp = result.statistical_centipawns,
            win_rate = result.win_rate,
            derived_win_rate,
            average_ply,
            "scenario complete"
        );

        let lines = result
            .variants
            .iter()
            .map(|variant| {
                let mut line: Vec<AnnotatedMove> =
                    moves.iter().cloned().map(AnnotatedMove::from).collect();
                line.extend(variant.moves.iter().cloned());
                Variant::new(line, variant.win_rate, variant.centipawns)
            })
            .collect();

        reports.push(ScenarioReport {
            moves,
            probability,
            opening_name,
            estimated_leaves,
            result,
            derived_win_rate,
            lines,
        });
    }

    Ok(QueryReport {
        scenarios: reports,
        visited: engine.visited(),
        cache: engine.cache().stats(),
    })
}
