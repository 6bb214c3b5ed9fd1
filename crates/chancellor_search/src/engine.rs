//! Expectimax over the opening tree.
//!
//! Our nodes take the best of a few candidate moves; opponent nodes average
//! over the replies real players chose, weighted by how often they chose them.

use chancellor_core::position::{captured_piece, is_checkmate, parse_uci, play_uci, replay};
use chancellor_core::ranking::{share, sort_by_popularity, total_occurrences};
use chancellor_core::{
    side_sign, AnnotatedMove, ChessError, Evaluation, MoveStats, PositionKey, SearchResult,
    Variant, BLACK_WIN_RATE, WHITE_WIN_RATE,
};
use chancellor_oracle::{EngineOracle, ExplorerFilters, MoveStatistics, Mover};
use cozy_chess::{Board, Piece};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use crate::annotate::{annotate_good_move, annotate_mistake_move, significance};
use crate::blunder::punishment_line;
use crate::cache::CacheManager;
use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::evaluator::{Evaluations, Evaluator};
use crate::events::{EventSink, SearchEvent};
use crate::leaf_count::Census;
use crate::principal::extend_principal_variation;
use crate::selection::{
    candidate_width, is_below_floor, mates_immediately, normalize_moves, order_candidates,
    reply_branches, retain_candidates,
};
use crate::shapes::best_line_shapes;
use crate::stop::StopSignal;

/// A position in the tree together with how it was reached.
#[derive(Debug, Clone)]
pub struct SearchNode {
    /// Probability of the opponent steering the game here
    pub probability: f64,
    /// Moves from the standard starting position
    pub play: Vec<MoveStats>,
    pub board: Board,
    /// Positions earlier on the current path, for repetition detection
    pub path: Vec<PositionKey>,
    /// Ply at which the query started
    pub root_offset: usize,
}

impl SearchNode {
    pub fn root(play: Vec<MoveStats>, probability: f64) -> std::result::Result<Self, ChessError> {
        let board = replay(&play)?;
        let root_offset = play.len();
        Ok(Self {
            probability,
            play,
            board,
            path: Vec::new(),
            root_offset,
        })
    }

    pub fn ply(&self) -> usize {
        self.play.len()
    }

    /// Only the query position itself, reached with certainty, gets the
    /// extra root width. Scenario roots after an opponent reply are entered
    /// below certainty and are searched like any other node.
    pub fn is_root(&self) -> bool {
        self.ply() == self.root_offset && self.probability >= 1.0
    }

    /// Full moves below the root.
    pub fn depth(&self) -> usize {
        (self.ply() - self.root_offset) / 2
    }

    pub fn key(&self) -> PositionKey {
        PositionKey::of(&self.board)
    }

    /// The node after our `ours` and the opponent's `reply`.
    pub fn child(
        &self,
        ours: &MoveStats,
        reply: &MoveStats,
        probability: f64,
    ) -> std::result::Result<Self, ChessError> {
        let mut board = self.board.clone();
        play_uci(&mut board, &ours.uci)?;
        play_uci(&mut board, &reply.uci)?;
        let mut play = self.play.clone();
        play.push(ours.clone());
        play.push(reply.clone());
        let mut path = self.path.clone();
        path.push(self.key());
        Ok(Self {
            probability,
            play,
            board,
            path,
            root_offset: self.root_offset,
        })
    }
}

/// Expected centipawns and win rate of a candidate move.
#[derive(Debug, Clone, Copy)]
struct Score {
    centipawns: f64,
    win_rate: f64,
}

/// Search over an opening tree for the side to move at the root.
pub struct SearchEngine<S, E> {
    pub(crate) stats: S,
    evaluator: Evaluator<E>,
    pub(crate) config: SearchConfig,
    pub(crate) filters: ExplorerFilters,
    pub(crate) included: Vec<Variant>,
    cache: Arc<CacheManager>,
    events: EventSink,
    stop: StopSignal,
    visited: AtomicU64,
    census: Mutex<Census>,
}

impl<S: MoveStatistics, E: EngineOracle> SearchEngine<S, E> {
    pub fn new(stats: S, oracle: E, config: SearchConfig) -> Result<Self> {
        config.validate()?;
        let cache = Arc::new(CacheManager::new(config.cache));
        Ok(Self {
            stats,
            evaluator: Evaluator::new(oracle, cache.clone()),
            config,
            filters: ExplorerFilters::default(),
            included: Vec::new(),
            cache,
            events: EventSink::disabled(),
            stop: StopSignal::default(),
            visited: AtomicU64::new(0),
            census: Mutex::new(Census::default()),
        })
    }

    /// Share caches with other engines of the same query.
    pub fn with_cache(mut self, cache: Arc<CacheManager>) -> Self {
        self.evaluator = Evaluator::new(self.evaluator.into_oracle(), cache.clone());
        self.cache = cache;
        self
    }

    pub fn with_events(mut self, events: EventSink) -> Self {
        self.events = events;
        self
    }

    pub fn with_stop(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    pub fn with_filters(mut self, filters: ExplorerFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Lines whose moves are tried first wherever they apply.
    pub fn with_included(mut self, included: Vec<Variant>) -> Self {
        self.included = included;
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    pub fn stats(&self) -> &S {
        &self.stats
    }

    pub fn oracle(&self) -> &E {
        self.evaluator.oracle()
    }

    pub fn events(&self) -> &EventSink {
        &self.events
    }

    pub fn stop_signal(&self) -> &StopSignal {
        &self.stop
    }

    pub fn filters(&self) -> &ExplorerFilters {
        &self.filters
    }

    pub fn included(&self) -> &[Variant] {
        &self.included
    }

    /// Nodes visited by [`SearchEngine::search`] so far.
    pub fn visited(&self) -> u64 {
        self.visited.load(Ordering::Relaxed)
    }

    /// Shape of the tree walked by [`SearchEngine::search`] so far.
    pub fn census(&self) -> Census {
        self.census.lock().clone()
    }

    /// Best line tree for the side to move at `node`.
    pub fn search(&self, node: &SearchNode) -> Result<SearchResult> {
        let visited = self.visited.fetch_add(1, Ordering::Relaxed) + 1;
        if self.stop.check() {
            return Err(SearchError::Cancelled { visited });
        }
        self.events.emit(SearchEvent::Progress { visited });
        self.census.lock().record_node(node.depth());

        let key = node.key();
        if let Some(cached) = self.cache.get_transposition(&key) {
            return Ok(cached);
        }
        if node.path.contains(&key) {
            debug!(%key, "repetition");
            self.census.lock().record_leaf();
            return Ok(SearchResult::draw());
        }
        if is_checkmate(&node.board) {
            self.census.lock().record_leaf();
            return Ok(SearchResult::checkmated(node.board.side_to_move()));
        }

        let sign = side_sign(node.board.side_to_move());
        if is_below_floor(&self.config.pruning, node.probability) {
            self.census.lock().record_leaf();
            return self.leaf(node, sign);
        }

        let evaluations = self.evaluator.evaluate_position(
            node.probability,
            &node.board,
            node.ply(),
            self.config.multi_pv.before_our_move,
        )?;

        if let Some(top) = evaluations.as_deref().and_then(|e| e.first()) {
            if top.is_mate() {
                info!(cp = top.centipawns, line = %sans(&top.best_line), "forced mate");
                return Ok(SearchResult::terminal(top, top.best_line.clone()));
            }
            let advantage = (sign * top.centipawns) as f64;
            if advantage > self.config.pruning.significant_advantage_diff
                && is_valuable_capture(&node.board, &top.best_move)?
            {
                info!(
                    cp = top.centipawns,
                    after = %sans(&node.play),
                    capture = %top.best_move.san,
                    "significant advantage"
                );
                let line = self.extend(node, &top.best_line)?;
                return Ok(SearchResult::terminal(top, line));
            }
        }

        let result = self.expand(node, sign, evaluations)?;
        self.cache.cache_transposition(key, result.clone());
        Ok(result)
    }

    /// Score a node below the probability floor without branching.
    fn leaf(&self, node: &SearchNode, sign: i32) -> Result<SearchResult> {
        let evaluations = self.evaluator.evaluate_position(
            node.probability,
            &node.board,
            node.ply(),
            self.config.multi_pv.end_node,
        )?;
        let Some(top) = evaluations.as_deref().and_then(|e| e.first()) else {
            return Ok(SearchResult::undefined());
        };

        let shapes = best_line_shapes(&node.play, top, node.root_offset, sign)?;
        self.events.emit(SearchEvent::BestLine { shapes });

        let line = self.extend(node, &top.best_line)?;
        Ok(SearchResult::terminal(top, line))
    }

    fn extend(&self, node: &SearchNode, best_line: &[MoveStats]) -> Result<Vec<MoveStats>> {
        extend_principal_variation(
            &self.stats,
            &self.filters,
            &node.board,
            &node.play,
            best_line,
            self.config.pruning.clear_best_move_prob,
        )
    }

    /// Engine lines for the position after our `candidate`.
    fn evaluate_after(
        &self,
        node: &SearchNode,
        candidate: &MoveStats,
    ) -> Result<Option<Evaluations>> {
        let mut board = node.board.clone();
        play_uci(&mut board, &candidate.uci)?;
        self.evaluator.evaluate_position(
            node.probability,
            &board,
            node.ply() + 1,
            self.config.multi_pv.before_opp_move,
        )
    }

    fn expand(
        &self,
        node: &SearchNode,
        sign: i32,
        evaluations: Option<Evaluations>,
    ) -> Result<SearchResult> {
        let pruning = &self.config.pruning;
        let annotation = &self.config.annotation;
        let side = node.board.side_to_move();
        let s = sign as f64;
        let position = evaluations.as_deref().and_then(|e| e.first());

        let candidates = normalize_moves(
            &node.board,
            self.stats.fetch_moves(&node.play, Mover::Us, &self.filters)?,
        )?;
        let ordered = order_candidates(&candidates, side, &node.play, &self.included);
        let total = total_occurrences(&ordered);

        let mut move_evaluations: HashMap<String, Option<Evaluations>> = HashMap::new();
        let width = candidate_width(&self.config.width, node.is_root());
        let selection = retain_candidates(
            &node.board,
            &ordered,
            width,
            pruning.min_frequency_to_consider,
            |mv| -> Result<bool> {
                let child = self.evaluate_after(node, mv)?;
                let keep = match (child.as_deref().and_then(|e| e.first()), position) {
                    (Some(after), Some(before)) => {
                        s * (after.centipawns - before.centipawns) as f64
                            >= pruning.min_eval_diff_to_consider
                    }
                    _ => false,
                };
                move_evaluations.insert(mv.uci.clone(), child);
                Ok(keep)
            },
        )?;
        if selection.mate {
            let mate = &selection.moves[0];
            info!(line = %sans(&node.play), mate = %mate.san, "mate in one");
            let synthetic = Evaluation::checkmate_by(side, mate.clone(), 1.0);
            move_evaluations.insert(mate.uci.clone(), Some(Arc::new(vec![synthetic])));
        }

        // Popular moves the engine rejects get a refutation line.
        let mut popular = ordered.clone();
        sort_by_popularity(&mut popular);
        let mut punishment_lines = Vec::new();
        for mv in &popular {
            if (mv.occurrences() as f64) < total as f64 * pruning.consider_solid_move_prob {
                break;
            }
            if selection.moves.iter().any(|kept| kept.uci == mv.uci) {
                continue;
            }
            let Some(before) = position else {
                continue;
            };
            if mates_immediately(&node.board, mv)? {
                continue;
            }
            let child = match move_evaluations.get(&mv.uci) {
                Some(cached) => cached.clone(),
                None => {
                    let child = self.evaluate_after(node, mv)?;
                    move_evaluations.insert(mv.uci.clone(), child.clone());
                    child
                }
            };
            let Some(after) = child.as_deref().and_then(|e| e.first()) else {
                continue;
            };
            let swing = s * (after.centipawns - before.centipawns) as f64;
            if swing < pruning.min_eval_diff_to_consider && !after.best_line.is_empty() {
                info!(
                    line = %sans(&node.play),
                    removed = %mv.san,
                    share = share(mv, total),
                    swing,
                    "popular move refuted"
                );
                punishment_lines.push(punishment_line(&node.board, mv, after, swing, annotation)?);
            }
        }

        let before_our_move = self.config.multi_pv.before_our_move;
        let best_is_less_popular = match evaluations.as_deref() {
            Some(lines) if lines.len() == before_our_move && lines.len() >= 2 => {
                popular
                    .iter()
                    .position(|mv| mv.uci == lines[0].best_move.uci)
                    != Some(0)
            }
            _ => false,
        };
        let significance = significance(annotation);

        let mut best: Option<(Score, Vec<Variant>)> = None;
        for mv in &selection.moves {
            let Some(own) = move_evaluations.get(&mv.uci).cloned().flatten() else {
                continue;
            };
            let Some(own_top) = own.first() else {
                continue;
            };

            let mut ours = AnnotatedMove::from(mv.clone());
            if let Some(lines) = evaluations.as_deref().filter(|_| best_is_less_popular) {
                if lines[0].best_move.uci == mv.uci {
                    let advantage = s * (lines[0].centipawns - lines[1].centipawns) as f64;
                    ours.annotation = annotate_good_move(annotation, share(mv, total), advantage);
                }
            }
            ours.punishment_lines = punishment_lines.clone();

            let reply_advantage = match own.get(1) {
                Some(second) if own.len() == self.config.multi_pv.before_opp_move => {
                    s * second.centipawns as f64 - s * own_top.centipawns as f64
                }
                _ => f64::NEG_INFINITY,
            };

            let mut played = node.play.clone();
            played.push(mv.clone());
            let mut after_ours = node.board.clone();
            play_uci(&mut after_ours, &mv.uci)?;
            let replies = normalize_moves(
                &after_ours,
                self.stats.fetch_moves(&played, Mover::They, &self.filters)?,
            )?;
            let branches = reply_branches(
                replies,
                side,
                node.probability,
                pruning.skip_opp_moves_with_prob,
            );

            let mut score = Score {
                centipawns: 0.0,
                win_rate: 0.0,
            };
            let mut uncovered = 1.0;
            let mut variants = Vec::new();
            for branch in branches {
                uncovered -= branch.share;
                let child = node.child(mv, &branch.reply, branch.probability)?;
                let result = self.search(&child)?;
                score.centipawns += result.statistical_centipawns * branch.share;
                score.win_rate += result.win_rate * branch.share;

                let reply_annotation = if branch.reply.uci == own_top.best_move.uci {
                    if reply_advantage > significance {
                        annotate_good_move(annotation, branch.share, reply_advantage)
                    } else {
                        None
                    }
                } else if let Some(engine) = result.engine_centipawns {
                    let swing = -s * (engine - own_top.centipawns) as f64;
                    annotate_mistake_move(annotation, swing)
                } else {
                    None
                };

                let prefix = [
                    ours.clone(),
                    AnnotatedMove::new(branch.reply.clone(), reply_annotation),
                ];
                if result.variants.is_empty() {
                    variants.push(Variant::new(
                        prefix.to_vec(),
                        result.win_rate,
                        result.statistical_centipawns,
                    ));
                } else {
                    for variant in result.variants {
                        let mut moves = prefix.to_vec();
                        moves.extend(variant.moves);
                        variants.push(Variant::new(moves, variant.win_rate, variant.centipawns));
                    }
                }
            }

            if uncovered > 0.0 {
                score.centipawns += uncovered * own_top.centipawns as f64;
                score.win_rate += uncovered * own_top.win_rate;
            }

            debug!(
                line = %sans(&played),
                cp = score.centipawns,
                win_rate = score.win_rate,
                "candidate scored"
            );
            let better = match &best {
                None => true,
                Some((current, _)) => s * score.win_rate > s * current.win_rate,
            };
            if better {
                best = Some((score, variants));
            }
        }

        let Some((score, variants)) = best else {
            // Nothing worth playing; the engine's own line stands in.
            return Ok(match position {
                Some(top) => SearchResult::terminal(top, top.best_line.clone()),
                None => SearchResult::undefined(),
            });
        };

        Ok(SearchResult {
            statistical_centipawns: score.centipawns,
            engine_centipawns: position.map(|p| p.centipawns),
            win_rate: score.win_rate.clamp(BLACK_WIN_RATE, WHITE_WIN_RATE),
            variants,
        })
    }
}

/// Whether `mv` takes a knight, bishop, rook or queen.
fn is_valuable_capture(board: &Board, mv: &MoveStats) -> std::result::Result<bool, ChessError> {
    let parsed = parse_uci(board, &mv.uci)?;
    Ok(matches!(
        captured_piece(board, parsed),
        Some(Piece::Knight | Piece::Bishop | Piece::Rook | Piece::Queen)
    ))
}

fn sans(moves: &[MoveStats]) -> String {
    moves
        .iter()
        .map(|m| m.san.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
