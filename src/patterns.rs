//! Pattern storage models: learn chains, answer membership.
//!
//! All three models share one contract: `update` adds a chain and reports a
//! per-node trace, `learn` folds `update` over a dataset, and `contains`
//! says whether a chain is fully recognised.
//!
//! - [`PatternSet`] keeps an independent set of nodes per depth.
//! - [`PatternTree`] keeps a rooted tree whose root-paths are chains.
//! - [`PatternGraph`] keeps a layered DAG in which chains are layer-to-layer
//!   paths and a vertex can be shared between chains learned on different
//!   branches.
//!
//! Lookup uses equivalence under a configurable [`MatchStrategy`]; candidate
//! sets iterate in vertex-id order, so ties resolve toward the smallest id.

use serde::Serialize;

use crate::digraph::{Digraph, LayeredDigraph, VertexId};
use crate::discretise::Chain;
use crate::helpers::HpmError;
use crate::nodes::Node;

/// How a chain node is matched against stored candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum MatchStrategy {
    /// The first equivalent candidate in id order.
    #[default]
    First,
    /// The equivalent candidate at the smallest distance; ties go to the
    /// smaller id.
    Closest,
}

/// Common contract of the pattern storage models.
pub trait PatternModel {
    /// Per-node information reported by `update`; its meaning differs per
    /// model.
    type Trace;

    fn update(&mut self, chain: &[Node]) -> Result<Self::Trace, HpmError>;

    fn contains(&self, chain: &[Node]) -> Result<bool, HpmError>;

    fn learn(&mut self, chains: &[Chain]) -> Result<Vec<Self::Trace>, HpmError> {
        chains.iter().map(|chain| self.update(chain)).collect()
    }
}

fn validate_chain(chain: &[Node]) -> Result<(), HpmError> {
    if chain.is_empty() {
        return Err(HpmError::InvalidInput("chain must not be empty".into()));
    }
    Ok(())
}

/// Select a match among `(vertex id, stored node)` candidates according to
/// the strategy. Candidates must iterate in ascending vertex id.
fn match_among<'a>(
    node: &Node,
    candidates: impl IntoIterator<Item = (VertexId, &'a Node)>,
    strategy: MatchStrategy,
) -> Result<Option<VertexId>, HpmError> {
    match strategy {
        MatchStrategy::First => {
            for (vertex, candidate) in candidates {
                if node.equivalent(candidate) {
                    return Ok(Some(vertex));
                }
            }
            Ok(None)
        }
        MatchStrategy::Closest => {
            let mut best: Option<(VertexId, f64)> = None;
            for (vertex, candidate) in candidates {
                if node.equivalent(candidate) {
                    let distance = node.distance(candidate)?;
                    if best.is_none_or(|(_, current)| distance < current) {
                        best = Some((vertex, distance));
                    }
                }
            }
            Ok(best.map(|(vertex, _)| vertex))
        }
    }
}

/// Per-depth sets of nodes, with set semantics modulo node equivalence.
///
/// Membership is a linear scan under `equivalent`; threshold-based
/// equivalence admits no consistent hash, so no hashing is attempted.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    nodes: Vec<Vec<Node>>,
}

impl PatternSet {
    pub fn new() -> Self {
        PatternSet { nodes: Vec::new() }
    }

    /// The number of depth levels seen so far.
    pub fn depth_count(&self) -> usize {
        self.nodes.len()
    }

    /// The stored representatives at one depth.
    pub fn nodes_at(&self, depth: usize) -> Option<&[Node]> {
        self.nodes.get(depth).map(|nodes| nodes.as_slice())
    }
}

impl PatternModel for PatternSet {
    /// For each chain position, whether the node was already present.
    type Trace = Vec<bool>;

    fn update(&mut self, chain: &[Node]) -> Result<Self::Trace, HpmError> {
        validate_chain(chain)?;
        while self.nodes.len() < chain.len() {
            self.nodes.push(Vec::new());
        }
        let mut present = Vec::with_capacity(chain.len());
        for (depth, node) in chain.iter().enumerate() {
            let was_present = self.nodes[depth].iter().any(|stored| node.equivalent(stored));
            present.push(was_present);
            if !was_present {
                self.nodes[depth].push(node.clone());
            }
        }
        Ok(present)
    }

    fn contains(&self, chain: &[Node]) -> Result<bool, HpmError> {
        validate_chain(chain)?;
        if chain.len() > self.nodes.len() {
            return Ok(false);
        }
        Ok(chain.iter().enumerate().all(|(depth, node)| {
            self.nodes[depth].iter().any(|stored| node.equivalent(stored))
        }))
    }
}

/// A vertex of the pattern tree: the distinguished root or a stored node.
#[derive(Debug, Clone)]
enum TreeVertex {
    Root,
    Node(Node),
}

/// Rooted tree of chains. Each path from the root is the prefix of one or
/// more learned chains.
#[derive(Debug, Clone)]
pub struct PatternTree {
    graph: Digraph<TreeVertex>,
    root: VertexId,
    strategy: MatchStrategy,
}

impl PatternTree {
    pub fn new(strategy: MatchStrategy) -> Self {
        let mut graph = Digraph::new();
        let root = graph.add_vertex(TreeVertex::Root);
        PatternTree {
            graph,
            root,
            strategy,
        }
    }

    pub fn root(&self) -> VertexId {
        self.root
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.vertex_count()
    }

    /// The stored node at a vertex, or `None` for the root.
    pub fn node_at(&self, vertex: VertexId) -> Result<Option<&Node>, HpmError> {
        match self.graph.vertex(vertex)? {
            TreeVertex::Root => Ok(None),
            TreeVertex::Node(node) => Ok(Some(node)),
        }
    }

    fn stored(&self, vertex: VertexId) -> &Node {
        match self.graph.vertex(vertex).expect("vertex allocated by this tree") {
            TreeVertex::Node(node) => node,
            TreeVertex::Root => unreachable!("the root is never a match candidate"),
        }
    }

    /// Walk from the root, matching each chain node among the current
    /// vertex's children. Stops at the first non-match; the returned path
    /// always starts with the root.
    pub fn chain_to_vertices(&self, chain: &[Node]) -> Result<Vec<VertexId>, HpmError> {
        let mut traversal = vec![self.root];
        for node in chain {
            let children = self.graph.outgoing(*traversal.last().expect("path starts at root"))?;
            let matched = match_among(
                node,
                children.iter().map(|&vertex| (vertex, self.stored(vertex))),
                self.strategy,
            )?;
            match matched {
                Some(vertex) => traversal.push(vertex),
                None => break,
            }
        }
        Ok(traversal)
    }
}

impl PatternModel for PatternTree {
    /// The full vertex path of the chain, root included.
    type Trace = Vec<VertexId>;

    fn update(&mut self, chain: &[Node]) -> Result<Self::Trace, HpmError> {
        validate_chain(chain)?;
        let mut vertices = self.chain_to_vertices(chain)?;
        while vertices.len() <= chain.len() {
            let current = *vertices.last().expect("path starts at root");
            let next = self
                .graph
                .add_vertex(TreeVertex::Node(chain[vertices.len() - 1].clone()));
            self.graph.add_edge(current, next)?;
            vertices.push(next);
        }
        Ok(vertices)
    }

    fn contains(&self, chain: &[Node]) -> Result<bool, HpmError> {
        validate_chain(chain)?;
        Ok(self.chain_to_vertices(chain)?.len() == chain.len() + 1)
    }
}

/// The outcome of matching a chain against a [`PatternGraph`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphTraversal {
    /// Per depth, the matched vertex or `None`.
    pub traversal: Vec<Option<VertexId>>,
    /// For each consecutive pair, whether the connecting edge exists
    /// (`false` when either endpoint is unmatched).
    pub connections: Vec<bool>,
}

/// Layered DAG of chains. A chain is a path through successive layers, and a
/// vertex found on a different branch can be reused, cross-linking the
/// branches while recording this chain's own adjacency.
#[derive(Debug, Clone)]
pub struct PatternGraph {
    graph: LayeredDigraph<Node>,
    strategy: MatchStrategy,
}

impl PatternGraph {
    pub fn new(strategy: MatchStrategy) -> Self {
        PatternGraph {
            graph: LayeredDigraph::new(),
            strategy,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.vertex_count()
    }

    pub fn node_at(&self, vertex: VertexId) -> Result<&Node, HpmError> {
        self.graph.vertex(vertex)
    }

    pub fn has_edge(&self, from: VertexId, to: VertexId) -> bool {
        self.graph.has_edge(from, to)
    }

    fn stored(&self, vertex: VertexId) -> &Node {
        self.graph.vertex(vertex).expect("vertex allocated by this graph")
    }

    /// Find a vertex matching `node` at `depth`: first among the parent's
    /// children, then across the whole layer.
    fn find_matching_vertex(
        &self,
        node: &Node,
        depth: usize,
        parent: Option<VertexId>,
    ) -> Result<Option<VertexId>, HpmError> {
        if depth >= self.graph.max_depth() {
            return Ok(None);
        }
        if let Some(parent) = parent {
            let children = self.graph.outgoing(parent)?;
            let matched = match_among(
                node,
                children.iter().map(|&vertex| (vertex, self.stored(vertex))),
                self.strategy,
            )?;
            if matched.is_some() {
                return Ok(matched);
            }
        }
        match_among(
            node,
            self.graph
                .layer(depth)?
                .iter()
                .map(|&vertex| (vertex, self.stored(vertex))),
            self.strategy,
        )
    }

    /// Match each chain node to a vertex and record which consecutive pairs
    /// are already connected.
    pub fn chain_to_vertices(&self, chain: &[Node]) -> Result<GraphTraversal, HpmError> {
        let mut traversal: Vec<Option<VertexId>> = Vec::with_capacity(chain.len());
        let mut connections = Vec::new();
        for (depth, node) in chain.iter().enumerate() {
            let parent = traversal.last().copied().flatten();
            let matched = self.find_matching_vertex(node, depth, parent)?;
            if let Some(previous) = traversal.last().copied() {
                connections.push(match (previous, matched) {
                    (Some(from), Some(to)) => self.graph.has_edge(from, to),
                    _ => false,
                });
            }
            traversal.push(matched);
        }
        Ok(GraphTraversal {
            traversal,
            connections,
        })
    }
}

impl PatternModel for PatternGraph {
    /// One vertex per chain depth.
    type Trace = Vec<VertexId>;

    fn update(&mut self, chain: &[Node]) -> Result<Self::Trace, HpmError> {
        validate_chain(chain)?;
        let GraphTraversal {
            traversal,
            connections,
        } = self.chain_to_vertices(chain)?;
        let vertices = traversal
            .into_iter()
            .enumerate()
            .map(|(depth, matched)| {
                matched.unwrap_or_else(|| self.graph.add_vertex(chain[depth].clone()))
            })
            .collect::<Vec<_>>();
        for (index, connected) in connections.into_iter().enumerate() {
            if !connected {
                self.graph.add_edge(vertices[index], vertices[index + 1])?;
            }
        }
        Ok(vertices)
    }

    fn contains(&self, chain: &[Node]) -> Result<bool, HpmError> {
        validate_chain(chain)?;
        let GraphTraversal {
            traversal,
            connections,
        } = self.chain_to_vertices(chain)?;
        Ok(traversal.iter().all(Option::is_some) && connections.into_iter().all(|c| c))
    }
}
