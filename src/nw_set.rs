//! Context model over nested words.
//!
//! A [`NestedWordSet`] stores chains in an underlying pattern model and
//! additionally remembers *context*: the last `context_size` chains are
//! folded into one [`NestedWord`] over pattern-model vertex ids, and the set
//! of observed combined words is what `contains` consults. Two chain
//! sequences that visit the same vertices in a different order produce
//! different nested words, so ordering within a context is significant.
//!
//! During lookup a chain node with no matching vertex yields a `None` id;
//! a combined word containing `None` can never have been learned, so
//! unknown vertices fail containment naturally.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;

use crate::digraph::VertexId;
use crate::discretise::Chain;
use crate::helpers::HpmError;
use crate::nested::NestedWord;
use crate::nodes::Node;
use crate::patterns::{MatchStrategy, PatternGraph, PatternModel, PatternTree};

/// A nested word over pattern-model vertex ids; `None` marks a vertex that
/// was unknown at lookup time.
pub type ContextWord = NestedWord<Option<VertexId>>;

/// Which pattern model backs the vertex ids of the nested words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ContextModelKind {
    #[default]
    PatternGraph,
    PatternTree,
}

/// Configuration for [`NestedWordSet`].
#[derive(Debug, Clone)]
pub struct NestedWordSetConfig {
    /// How many consecutive chains make up one context.
    pub context_size: usize,
    pub pattern_model: ContextModelKind,
    pub closest_match: bool,
}

impl Default for NestedWordSetConfig {
    fn default() -> Self {
        NestedWordSetConfig {
            context_size: 2,
            pattern_model: ContextModelKind::PatternGraph,
            closest_match: true,
        }
    }
}

#[derive(Debug, Clone)]
enum ContextPatterns {
    Graph(PatternGraph),
    Tree(PatternTree),
}

/// Model maintaining the set of nested words observed over sliding contexts
/// of chains.
#[derive(Debug, Clone)]
pub struct NestedWordSet {
    patterns: ContextPatterns,
    context_size: usize,
    nested_words: HashSet<ContextWord>,
    context_queue: VecDeque<ContextWord>,
    combined_cache: HashMap<(ContextWord, ContextWord), ContextWord>,
}

impl NestedWordSet {
    pub fn new(config: NestedWordSetConfig) -> Result<Self, HpmError> {
        if config.context_size == 0 {
            return Err(HpmError::InvalidInput(
                "`context_size` must be positive".into(),
            ));
        }
        let strategy = if config.closest_match {
            MatchStrategy::Closest
        } else {
            MatchStrategy::First
        };
        let patterns = match config.pattern_model {
            ContextModelKind::PatternGraph => ContextPatterns::Graph(PatternGraph::new(strategy)),
            ContextModelKind::PatternTree => ContextPatterns::Tree(PatternTree::new(strategy)),
        };
        Ok(NestedWordSet {
            patterns,
            context_size: config.context_size,
            nested_words: HashSet::new(),
            context_queue: VecDeque::new(),
            combined_cache: HashMap::new(),
        })
    }

    pub fn context_size(&self) -> usize {
        self.context_size
    }

    /// The number of distinct combined nested words observed so far.
    pub fn nested_word_count(&self) -> usize {
        self.nested_words.len()
    }

    pub fn has_word(&self, word: &ContextWord) -> bool {
        self.nested_words.contains(word)
    }

    /// Vertices allocated in the backing pattern model (the pattern tree's
    /// root is not counted).
    pub fn pattern_vertex_count(&self) -> usize {
        match &self.patterns {
            ContextPatterns::Graph(graph) => graph.vertex_count(),
            ContextPatterns::Tree(tree) => tree.vertex_count() - 1,
        }
    }

    /// One vertex id per chain depth, without mutating the pattern model.
    /// Depths without a matching vertex yield `None`.
    fn chain_to_ids(&self, chain: &[Node]) -> Result<Vec<Option<VertexId>>, HpmError> {
        match &self.patterns {
            ContextPatterns::Graph(graph) => Ok(graph.chain_to_vertices(chain)?.traversal),
            ContextPatterns::Tree(tree) => {
                // Drop the root, pad unmatched depths.
                let path = tree.chain_to_vertices(chain)?;
                let mut ids = path[1..].iter().map(|vertex| Some(*vertex)).collect::<Vec<_>>();
                ids.resize(chain.len(), None);
                Ok(ids)
            }
        }
    }

    /// The per-chain nested word: all ids but the last are pending calls,
    /// the last is internal.
    fn chain_to_nw(&self, chain: &[Node]) -> Result<ContextWord, HpmError> {
        let ids = self.chain_to_ids(chain)?;
        let mut nw = NestedWord::new();
        if ids.len() > 1 {
            nw.add_calls(&ids[..ids.len() - 1]);
        }
        if let Some(last) = ids.last() {
            nw.add_internal(*last);
        }
        Ok(nw)
    }

    /// Close `number` pending calls, most recent first, each matched by a
    /// fresh return carrying the call's own symbol.
    fn close_positions(nw: &mut ContextWord, number: usize) -> Result<(), HpmError> {
        let pending = nw.matching().pending_calls();
        if number == 0 {
            return Err(HpmError::InvalidInput(
                "cannot close zero open positions".into(),
            ));
        }
        if number > pending.len() {
            return Err(HpmError::InvalidInput(format!(
                "cannot close {number} positions with only {} open",
                pending.len()
            )));
        }
        for position in pending.into_iter().rev().take(number) {
            let symbol = *nw
                .symbol(position)
                .ok_or_else(|| HpmError::Internal(format!("no symbol at position {position}")))?;
            nw.add_return(symbol);
        }
        Ok(())
    }

    /// Combine two nested words: as long as their pending-call symbols
    /// agree the context deepens; at the first disagreement the stale open
    /// positions are closed and the remainder of `w2` is spliced on.
    fn combine(&mut self, w1: &ContextWord, w2: &ContextWord) -> Result<ContextWord, HpmError> {
        if w1.is_empty() {
            return Ok(w2.clone());
        }
        let key = (w1.clone(), w2.clone());
        if let Some(cached) = self.combined_cache.get(&key) {
            return Ok(cached.clone());
        }
        let p1 = w1.matching().pending_calls().into_iter().collect::<Vec<_>>();
        let p2 = w2.matching().pending_calls().into_iter().collect::<Vec<_>>();
        let s1 = p1.iter().map(|&p| w1.word()[p]).collect::<Vec<_>>();
        let s2 = p2.iter().map(|&p| w2.word()[p]).collect::<Vec<_>>();

        let mut nw = w1.clone();
        for (depth, (c1, c2)) in s1.iter().zip(&s2).enumerate() {
            if c1 != c2 {
                Self::close_positions(&mut nw, s1.len() - depth)?;
                nw = nw.concat(&w2.slice(p2[depth], w2.len())?)?;
                break;
            }
        }
        if let Some(last) = w2.word().last() {
            if nw.word().last() != Some(last) {
                nw.add_internal(*last);
            }
        }
        self.combined_cache.insert(key, nw.clone());
        Ok(nw)
    }

    fn combine_all(&mut self, words: &[ContextWord]) -> Result<ContextWord, HpmError> {
        let mut result = NestedWord::new();
        for word in words {
            result = self.combine(&result, word)?;
        }
        Ok(result)
    }

    /// Add a chain. Once `context_size` chains have been seen, every update
    /// yields the combined nested word of the current context.
    pub fn update(&mut self, chain: &[Node]) -> Result<Vec<ContextWord>, HpmError> {
        if chain.is_empty() {
            return Err(HpmError::InvalidInput("chain must not be empty".into()));
        }
        match &mut self.patterns {
            ContextPatterns::Graph(graph) => {
                graph.update(chain)?;
            }
            ContextPatterns::Tree(tree) => {
                tree.update(chain)?;
            }
        }
        let nw = self.chain_to_nw(chain)?;
        if self.context_queue.len() >= self.context_size {
            self.context_queue.pop_front();
        }
        self.context_queue.push_back(nw);
        if self.context_queue.len() == self.context_size {
            let queue = self.context_queue.iter().cloned().collect::<Vec<_>>();
            let combined = self.combine_all(&queue)?;
            self.nested_words.insert(combined.clone());
            return Ok(vec![combined]);
        }
        Ok(Vec::new())
    }

    /// Fold [`NestedWordSet::update`] over a dataset, collecting every
    /// combined word formed along the way.
    pub fn learn(&mut self, chains: &[Chain]) -> Result<Vec<ContextWord>, HpmError> {
        let mut result = Vec::new();
        for chain in chains {
            result.extend(self.update(chain)?);
        }
        Ok(result)
    }

    /// Whether the combined nested word of exactly `context_size` chains
    /// has been observed. The pattern model is only read, never grown.
    pub fn contains(&mut self, chains: &[Chain]) -> Result<bool, HpmError> {
        if chains.len() != self.context_size {
            return Err(HpmError::InvalidInput(format!(
                "expected {} chains, got {}",
                self.context_size,
                chains.len()
            )));
        }
        if chains.iter().any(|chain| chain.is_empty()) {
            return Err(HpmError::InvalidInput("chains must not be empty".into()));
        }
        let words = chains
            .iter()
            .map(|chain| self.chain_to_nw(chain))
            .collect::<Result<Vec<_>, _>>()?;
        let combined = self.combine_all(&words)?;
        Ok(self.nested_words.contains(&combined))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nested::Tagged;
    use crate::nodes::SlopeSignNode;

    fn node(depth: usize, slopes: &[f64]) -> Node {
        Node::SlopeSign(SlopeSignNode::new(depth, slopes.to_vec()))
    }

    fn config(context_size: usize) -> NestedWordSetConfig {
        NestedWordSetConfig {
            context_size,
            ..Default::default()
        }
    }

    fn sym(id: usize) -> Tagged<Option<VertexId>> {
        Tagged::Symbol(Some(id))
    }

    #[test]
    fn test_creation() {
        let model = NestedWordSet::new(NestedWordSetConfig::default()).unwrap();
        assert_eq!(model.context_size(), 2);
        assert_eq!(model.pattern_vertex_count(), 0);
        assert_eq!(model.nested_word_count(), 0);

        assert!(NestedWordSet::new(config(0)).is_err());

        let tree_backed = NestedWordSet::new(NestedWordSetConfig {
            pattern_model: ContextModelKind::PatternTree,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(tree_backed.pattern_vertex_count(), 0);
    }

    #[test]
    fn test_update_empty_chain() {
        let mut model = NestedWordSet::new(config(2)).unwrap();
        assert!(model.update(&[]).is_err());
    }

    #[test]
    fn test_update_short_chains() {
        let mut model = NestedWordSet::new(config(2)).unwrap();
        model.update(&[node(0, &[1.0])]).unwrap();
        assert_eq!(model.pattern_vertex_count(), 1);
        assert_eq!(model.nested_word_count(), 0);

        model.update(&[node(0, &[-1.0])]).unwrap();
        assert_eq!(model.pattern_vertex_count(), 2);
        assert_eq!(model.nested_word_count(), 1);

        let expected = NestedWord::from_tagged(&[sym(0), sym(1)]).unwrap();
        assert!(model.has_word(&expected));
    }

    #[test]
    fn test_update_duplicate_short_chains() {
        let mut model = NestedWordSet::new(config(2)).unwrap();
        let chain = vec![node(0, &[1.0])];
        model.update(&chain).unwrap();
        assert_eq!(model.nested_word_count(), 0);

        model.update(&chain).unwrap();
        assert_eq!(model.pattern_vertex_count(), 1);
        assert_eq!(model.nested_word_count(), 1);
        // The repeated vertex collapses to a single internal symbol.
        let expected = NestedWord::from_tagged(&[sym(0)]).unwrap();
        assert!(model.has_word(&expected));
    }

    #[test]
    fn test_update_regular_chains() {
        let mut model = NestedWordSet::new(config(4)).unwrap();
        let chain1 = vec![
            node(0, &[1.0]),
            node(1, &[1.0, 1.0]),
            node(2, &[1.0, 1.0, 1.0]),
            node(3, &[1.0, 1.0, 1.0, 1.0]),
        ];
        model.update(&chain1).unwrap();
        assert_eq!(model.pattern_vertex_count(), 4);
        assert_eq!(model.nested_word_count(), 0);

        // Mismatch at the last node.
        let chain2 = vec![
            node(0, &[1.0]),
            node(1, &[1.0, 1.0]),
            node(2, &[1.0, 1.0, 1.0]),
            node(3, &[-1.0, 1.0, 1.0, 1.0]),
        ];
        model.update(&chain2).unwrap();
        assert_eq!(model.pattern_vertex_count(), 5);
        assert_eq!(model.nested_word_count(), 0);

        // Mismatch at the second-to-last node.
        let chain3 = vec![
            node(0, &[1.0]),
            node(1, &[1.0, 1.0]),
            node(2, &[-1.0, 1.0, 1.0]),
            node(3, &[1.0, 1.0, 1.0, 1.0]),
        ];
        model.update(&chain3).unwrap();
        assert_eq!(model.pattern_vertex_count(), 6);
        assert_eq!(model.nested_word_count(), 0);

        // Mismatch at the second node fills the context window.
        let chain4 = vec![
            node(0, &[1.0]),
            node(1, &[-1.0, 1.0]),
            node(2, &[1.0, 1.0, 1.0]),
            node(3, &[1.0, 1.0, 1.0, 1.0]),
        ];
        model.update(&chain4).unwrap();
        assert_eq!(model.nested_word_count(), 1);
    }

    #[test]
    fn test_update_duplicate_regular_chain() {
        let mut model = NestedWordSet::new(config(2)).unwrap();
        let chain = vec![
            node(0, &[1.0]),
            node(1, &[1.0, 1.0]),
            node(2, &[1.0, 1.0, 1.0]),
            node(3, &[1.0, 1.0, 1.0, 1.0]),
            node(4, &[1.0, 1.0, 1.0, 1.0, 1.0]),
        ];
        model.update(&chain).unwrap();
        assert_eq!(model.pattern_vertex_count(), 5);
        assert_eq!(model.nested_word_count(), 0);

        model.update(&chain).unwrap();
        assert_eq!(model.pattern_vertex_count(), 5);
        assert_eq!(model.nested_word_count(), 1);

        let expected = NestedWord::from_tagged(&[
            Tagged::Call,
            sym(0),
            Tagged::Call,
            sym(1),
            Tagged::Call,
            sym(2),
            Tagged::Call,
            sym(3),
            sym(4),
        ])
        .unwrap();
        assert!(model.has_word(&expected));
    }

    #[test]
    fn test_learn() {
        let mut model = NestedWordSet::new(config(5)).unwrap();
        let chains: Vec<Chain> = vec![
            vec![node(0, &[-1.0, 1.0, 1.0]), node(1, &[1.0, 1.0]), node(2, &[1.0])],
            vec![node(0, &[1.0, -1.0, 1.0]), node(1, &[1.0, 1.0]), node(2, &[1.0])],
            vec![node(0, &[1.0, 1.0, -1.0]), node(1, &[1.0, 1.0]), node(2, &[1.0])],
            vec![node(0, &[1.0, 1.0, 1.0]), node(1, &[-1.0, 1.0]), node(2, &[1.0])],
            vec![node(0, &[1.0, 1.0, 1.0]), node(1, &[1.0, 1.0]), node(2, &[-1.0])],
        ];
        let result = model.learn(&chains).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(model.nested_word_count(), 1);
    }

    #[test]
    fn test_contains_single_context() {
        let mut model = NestedWordSet::new(config(1)).unwrap();
        let chain = vec![node(0, &[1.0])];
        assert!(!model.contains(std::slice::from_ref(&chain)).unwrap());
        let produced = model.update(&chain).unwrap();
        assert_eq!(produced, vec![NestedWord::from_tagged(&[sym(0)]).unwrap()]);
        assert!(model.contains(std::slice::from_ref(&chain)).unwrap());

        let longer = vec![node(0, &[1.0]), node(1, &[1.0, -1.0])];
        assert!(!model.contains(std::slice::from_ref(&longer)).unwrap());
        let produced = model.update(&longer).unwrap();
        assert_eq!(
            produced,
            vec![NestedWord::from_tagged(&[Tagged::Call, sym(0), sym(1)]).unwrap()]
        );
        assert!(model.contains(std::slice::from_ref(&longer)).unwrap());
    }

    #[test]
    fn test_contains_rotated_contexts() {
        let mut model = NestedWordSet::new(config(5)).unwrap();
        let chains: Vec<Chain> = vec![
            vec![node(0, &[-1.0]), node(1, &[1.0, 1.0]), node(2, &[1.0, 1.0, 1.0])],
            vec![node(0, &[1.0]), node(1, &[-1.0, 1.0]), node(2, &[1.0, 1.0, 1.0])],
            vec![node(0, &[1.0]), node(1, &[1.0, -1.0]), node(2, &[1.0, 1.0, 1.0])],
            vec![node(0, &[1.0]), node(1, &[1.0, 1.0]), node(2, &[-1.0, 1.0, 1.0])],
            vec![node(0, &[1.0]), node(1, &[1.0, 1.0]), node(2, &[1.0, -1.0, 1.0])],
        ];
        for _ in 0..10 {
            for chain in &chains {
                model.update(chain).unwrap();
            }
        }

        // The learned cycle and every rotation of it are known.
        for rotation in 0..5 {
            let mut context = Vec::new();
            for offset in 0..5 {
                context.push(chains[(rotation + offset) % 5].clone());
            }
            assert!(model.contains(&context).unwrap(), "rotation {rotation}");
        }

        // A shuffled order was never observed.
        let shuffled = vec![
            chains[1].clone(),
            chains[0].clone(),
            chains[4].clone(),
            chains[2].clone(),
            chains[3].clone(),
        ];
        assert!(!model.contains(&shuffled).unwrap());
    }

    #[test]
    fn test_contains_edge_cases() {
        let mut model = NestedWordSet::new(config(2)).unwrap();
        let chain = vec![node(0, &[1.0])];

        assert!(!model.contains(&[chain.clone(), chain.clone()]).unwrap());

        assert!(model.contains(&[]).is_err());
        assert!(model.contains(std::slice::from_ref(&chain)).is_err());
        assert!(
            model
                .contains(&[chain.clone(), chain.clone(), chain.clone()])
                .is_err()
        );

        let chains = [vec![node(0, &[1.0])], vec![node(0, &[-1.0])]];
        for chain in &chains {
            model.update(chain).unwrap();
        }
        assert!(model.contains(&chains).unwrap());

        // A chain whose node is unknown to the pattern model cannot be
        // contained.
        let unknown = vec![node(0, &[1.0, -1.0])];
        assert!(!model.contains(&[unknown.clone(), unknown.clone()]).unwrap());
        assert!(!model.contains(&[chains[0].clone(), unknown]).unwrap());
    }

    #[test]
    fn test_context_queue_boundaries() {
        // With context 1 every update yields a word immediately.
        let mut model = NestedWordSet::new(config(1)).unwrap();
        assert_eq!(model.update(&[node(0, &[1.0])]).unwrap().len(), 1);
        assert_eq!(model.nested_word_count(), 1);
        assert_eq!(model.update(&[node(0, &[1.0])]).unwrap().len(), 1);
        assert_eq!(model.nested_word_count(), 1);

        // With context 3 the first two updates produce nothing; the queue
        // then slides.
        let mut model = NestedWordSet::new(config(3)).unwrap();
        let chains = [
            vec![node(0, &[1.0])],
            vec![node(0, &[-1.0])],
            vec![node(0, &[1.0, 1.0])],
        ];
        for (index, chain) in chains.iter().enumerate() {
            let produced = model.update(chain).unwrap();
            assert_eq!(produced.len(), usize::from(index == 2));
        }
        let produced = model.update(&[node(0, &[-1.0, -1.0])]).unwrap();
        assert_eq!(produced.len(), 1);
        assert_eq!(model.nested_word_count(), 2);
    }

    #[test]
    fn test_nesting_scenarios() {
        let mut model = NestedWordSet::new(config(3)).unwrap();
        let chain1 = vec![node(0, &[1.0]), node(1, &[1.0, 1.0])];
        let chain2 = vec![node(0, &[1.0]), node(1, &[-1.0, 1.0])];
        let chain3 = vec![node(0, &[-1.0]), node(1, &[1.0, 1.0])];
        let chain4 = vec![node(0, &[-1.0]), node(1, &[-1.0, -1.0])];

        assert!(model.update(&chain1).unwrap().is_empty());
        assert!(model.update(&chain2).unwrap().is_empty());

        // The shared depth-0 vertex keeps its call open across the first
        // two chains; the third one closes it and splices its own context.
        let produced = model.update(&chain3).unwrap();
        let expected = NestedWord::from_tagged(&[
            Tagged::Call,
            sym(0),
            sym(1),
            sym(2),
            sym(0),
            Tagged::Return,
            Tagged::Call,
            sym(3),
            sym(1),
        ])
        .unwrap();
        assert_eq!(produced, vec![expected]);

        let produced = model.update(&chain4).unwrap();
        let expected = NestedWord::from_tagged(&[
            Tagged::Call,
            sym(0),
            sym(2),
            sym(0),
            Tagged::Return,
            Tagged::Call,
            sym(3),
            sym(1),
            sym(4),
        ])
        .unwrap();
        assert_eq!(produced, vec![expected]);
        assert_eq!(model.nested_word_count(), 2);
    }

    #[test]
    fn test_learn_with_duplicate_context() {
        let mut model = NestedWordSet::new(config(2)).unwrap();
        let chains: Vec<Chain> = vec![
            vec![node(0, &[1.0])],
            vec![node(0, &[-1.0])],
            vec![node(0, &[1.0])],
            vec![node(0, &[-1.0])],
        ];
        let result = model.learn(&chains).unwrap();
        assert_eq!(result.len(), 3);
        assert_eq!(model.nested_word_count(), 2);

        assert!(model.learn(&[vec![], vec![node(0, &[1.0])]]).is_err());
    }
}
