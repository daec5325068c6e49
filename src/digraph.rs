//! Directed graphs with contiguous vertex ids.
//!
//! [`Digraph`] is a plain directed graph with set-semantics edges.
//! [`LayeredDigraph`] partitions its vertices into layers and only permits
//! edges from layer `n` to layer `n + 1`; a freshly added vertex sits in
//! layer 0 until the first incoming edge promotes it.
//!
//! Adjacency and layer sets are ordered by vertex id, so iteration order is
//! deterministic and ties in candidate scans resolve toward the smallest id.

use std::collections::BTreeSet;

use crate::helpers::HpmError;

pub type VertexId = usize;

/// A simple directed graph. Vertices carry an arbitrary payload; edges are
/// unlabelled and deduplicated.
#[derive(Debug, Clone)]
pub struct Digraph<V> {
    vertices: Vec<V>,
    edges: Vec<BTreeSet<VertexId>>,
}

impl<V> Default for Digraph<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Digraph<V> {
    pub fn new() -> Self {
        Digraph {
            vertices: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Add a vertex, returning its identifier. Identifiers are allocated
    /// sequentially from zero.
    pub fn add_vertex(&mut self, payload: V) -> VertexId {
        self.vertices.push(payload);
        self.edges.push(BTreeSet::new());
        self.vertices.len() - 1
    }

    fn check_vertex(&self, vertex: VertexId) -> Result<(), HpmError> {
        if vertex >= self.vertices.len() {
            return Err(HpmError::InvalidInput(format!(
                "vertex {vertex} does not exist"
            )));
        }
        Ok(())
    }

    pub fn add_edge(&mut self, from: VertexId, to: VertexId) -> Result<(), HpmError> {
        self.check_vertex(from)?;
        self.check_vertex(to)?;
        self.edges[from].insert(to);
        Ok(())
    }

    /// The targets of all outgoing edges, ordered by vertex id.
    pub fn outgoing(&self, vertex: VertexId) -> Result<&BTreeSet<VertexId>, HpmError> {
        self.check_vertex(vertex)?;
        Ok(&self.edges[vertex])
    }

    pub fn has_edge(&self, from: VertexId, to: VertexId) -> bool {
        self.edges.get(from).is_some_and(|targets| targets.contains(&to))
    }

    pub fn vertex(&self, vertex: VertexId) -> Result<&V, HpmError> {
        self.check_vertex(vertex)?;
        Ok(&self.vertices[vertex])
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(|targets| targets.len()).sum()
    }
}

/// A directed graph whose vertices live in layers, with every edge going
/// from layer `n` to layer `n + 1`.
#[derive(Debug, Clone)]
pub struct LayeredDigraph<V> {
    graph: Digraph<V>,
    layers: Vec<BTreeSet<VertexId>>,
    layer_of: Vec<usize>,
}

impl<V> LayeredDigraph<V> {
    pub fn new() -> Self {
        LayeredDigraph {
            graph: Digraph::new(),
            // The root layer exists even while empty.
            layers: vec![BTreeSet::new()],
            layer_of: Vec::new(),
        }
    }

    /// The number of allocated layers.
    pub fn max_depth(&self) -> usize {
        self.layers.len()
    }

    /// Add a vertex into layer 0. It is promoted when an incoming edge
    /// arrives.
    pub fn add_vertex(&mut self, payload: V) -> VertexId {
        let vertex = self.graph.add_vertex(payload);
        self.layer_of.push(0);
        self.layers[0].insert(vertex);
        vertex
    }

    fn move_to_layer(&mut self, vertex: VertexId, layer: usize) {
        self.layers[self.layer_of[vertex]].remove(&vertex);
        if self.layers.len() <= layer {
            self.layers.push(BTreeSet::new());
        }
        self.layers[layer].insert(vertex);
        self.layer_of[vertex] = layer;
    }

    /// Add an edge from `from` to `to`, promoting `to` to the layer below
    /// `from`. A target still in layer 0 must not have outgoing edges of its
    /// own; any other target must already sit exactly one layer deeper.
    pub fn add_edge(&mut self, from: VertexId, to: VertexId) -> Result<(), HpmError> {
        self.graph.check_vertex(from)?;
        self.graph.check_vertex(to)?;
        let from_layer = self.layer_of[from];
        let to_layer = self.layer_of[to];
        if to_layer == 0 {
            if !self.graph.outgoing(to)?.is_empty() {
                return Err(HpmError::InvalidInput(format!(
                    "cannot add edge from vertex {from} in layer {from_layer} to root-layer \
                     vertex {to} with outgoing edges"
                )));
            }
            self.graph.add_edge(from, to)?;
        } else if to_layer == from_layer + 1 {
            self.graph.add_edge(from, to)?;
        } else {
            return Err(HpmError::InvalidInput(format!(
                "cannot add edge from vertex {from} of layer {from_layer} to vertex {to} of \
                 layer {to_layer}"
            )));
        }
        self.move_to_layer(to, from_layer + 1);
        Ok(())
    }

    pub fn outgoing(&self, vertex: VertexId) -> Result<&BTreeSet<VertexId>, HpmError> {
        self.graph.outgoing(vertex)
    }

    pub fn has_edge(&self, from: VertexId, to: VertexId) -> bool {
        self.graph.has_edge(from, to)
    }

    pub fn vertex(&self, vertex: VertexId) -> Result<&V, HpmError> {
        self.graph.vertex(vertex)
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.vertex_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// The vertices of one layer, ordered by vertex id.
    pub fn layer(&self, layer: usize) -> Result<&BTreeSet<VertexId>, HpmError> {
        self.layers.get(layer).ok_or_else(|| {
            HpmError::Internal(format!("layer {layer} does not exist"))
        })
    }

    pub fn layer_of(&self, vertex: VertexId) -> Result<usize, HpmError> {
        self.graph.check_vertex(vertex)?;
        Ok(self.layer_of[vertex])
    }
}

impl<V> Default for LayeredDigraph<V> {
    fn default() -> Self {
        Self::new()
    }
}
