//! Size estimate of the tree a search will walk.
//!
//! The count asks only the statistics oracle and applies the same branching
//! rules as the search, so it can be shown as a progress denominator before
//! the search starts.

use chancellor_core::position::{is_checkmate, play_uci};
use chancellor_oracle::{EngineOracle, MoveStatistics, Mover};
use serde::Serialize;

use crate::engine::{SearchEngine, SearchNode};
use crate::error::Result;
use crate::selection::{
    candidate_width, is_below_floor, normalize_moves, order_candidates, reply_branches,
    retain_candidates,
};

/// Nodes per full-move depth below the root, and how many of them ended the
/// branch on their own (repetition, probability floor or checkmate).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Census {
    pub leaves: u64,
    pub nodes_by_depth: Vec<u64>,
}

impl Census {
    pub fn record_node(&mut self, depth: usize) {
        if self.nodes_by_depth.len() <= depth {
            self.nodes_by_depth.resize(depth + 1, 0);
        }
        self.nodes_by_depth[depth] += 1;
    }

    pub fn record_leaf(&mut self) {
        self.leaves += 1;
    }

    pub fn nodes(&self) -> u64 {
        self.nodes_by_depth.iter().sum()
    }
}

impl<S: MoveStatistics, E: EngineOracle> SearchEngine<S, E> {
    /// Number of leaves below `node`.
    pub fn count_leaf_nodes(&self, node: &SearchNode) -> Result<u64> {
        Ok(self.census_leaf_nodes(node)?.leaves)
    }

    pub fn census_leaf_nodes(&self, node: &SearchNode) -> Result<Census> {
        let mut census = Census::default();
        self.walk(node, &mut census)?;
        Ok(census)
    }

    fn walk(&self, node: &SearchNode, census: &mut Census) -> Result<()> {
        census.record_node(node.depth());
        if node.path.contains(&node.key())
            || is_checkmate(&node.board)
            || is_below_floor(&self.config.pruning, node.probability)
        {
            census.record_leaf();
            return Ok(());
        }

        let side = node.board.side_to_move();
        let candidates = normalize_moves(
            &node.board,
            self.stats.fetch_moves(&node.play, Mover::Us, &self.filters)?,
        )?;
        let ordered = order_candidates(&candidates, side, &node.play, &self.included);
        let selection = retain_candidates(
            &node.board,
            &ordered,
            candidate_width(&self.config.width, node.is_root()),
            self.config.pruning.min_frequency_to_consider,
            |_| Ok::<_, crate::SearchError>(true),
        )?;

        for mv in &selection.moves {
            let mut played = node.play.clone();
            played.push(mv.clone());
            let mut after = node.board.clone();
            play_uci(&mut after, &mv.uci)?;
            let replies = normalize_moves(
                &after,
                self.stats.fetch_moves(&played, Mover::They, &self.filters)?,
            )?;
            for branch in reply_branches(
                replies,
                side,
                node.probability,
                self.config.pruning.skip_opp_moves_with_prob,
            ) {
                let child = node.child(mv, &branch.reply, branch.probability)?;
                self.walk(&child, census)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_census_grows_by_depth() {
        let mut census = Census::default();
        census.record_node(0);
        census.record_node(2);
        census.record_node(2);
        census.record_leaf();
        assert_eq!(census.nodes_by_depth, vec![1, 0, 2]);
        assert_eq!(census.nodes(), 3);
        assert_eq!(census.leaves, 1);
    }
}
