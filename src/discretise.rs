//! Discretisation of windows into chains of nodes.
//!
//! A [`Discretiser`] turns one window into a *chain*: one node per depth,
//! coarse to fine. The frame count per depth and the chain length are
//! depth-indexed policies; the statistic computed per frame is the
//! discretisation strategy (means, line fits, symbols or sums).

use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use crate::helpers::{HpmError, divide, line_fit, norm_quantile, normalise, std_dev};
use crate::nodes::{
    Node, NodeParams, PaaNode, PlaNode, SaxNode, SlopeSignNode, StructuralProminenceNode, SumNode,
};

/// A chain of nodes produced from one window, ordered coarse to fine.
pub type Chain = Vec<Node>;

/// Policy for the chain length, given the window to discretise.
#[derive(Clone)]
pub struct MaxDepthFn(Rc<dyn Fn(&[f64]) -> usize>);

impl MaxDepthFn {
    pub fn new(f: impl Fn(&[f64]) -> usize + 'static) -> Self {
        MaxDepthFn(Rc::new(f))
    }

    pub fn constant(depth: usize) -> Self {
        MaxDepthFn(Rc::new(move |_| depth))
    }

    /// `floor(ln(window length))`, the default chain length.
    pub fn log() -> Self {
        MaxDepthFn(Rc::new(|data: &[f64]| (data.len() as f64).ln().floor() as usize))
    }

    pub fn at(&self, data: &[f64]) -> usize {
        (self.0)(data)
    }
}

impl fmt::Debug for MaxDepthFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MaxDepthFn(..)")
    }
}

/// Policy for the number of frames at a given depth.
#[derive(Clone)]
pub struct FrameFn(Rc<dyn Fn(usize) -> usize>);

impl FrameFn {
    pub fn new(f: impl Fn(usize) -> usize + 'static) -> Self {
        FrameFn(Rc::new(f))
    }

    pub fn constant(frames: usize) -> Self {
        FrameFn(Rc::new(move |_| frames))
    }

    /// `2^depth`, the default frame count.
    pub fn powers_of_two() -> Self {
        FrameFn(Rc::new(|depth| 1 << depth))
    }

    pub fn at(&self, depth: usize) -> usize {
        (self.0)(depth)
    }
}

impl fmt::Debug for FrameFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FrameFn(..)")
    }
}

/// Which node variant a discretiser produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    Paa,
    Pla,
    SlopeSign,
    StructuralProminence,
    Sax,
    Sum,
}

/// The per-frame statistic computed by a discretiser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiscretiserKind {
    /// Per-frame means (PAA).
    PiecewiseAggregate,
    /// Per-frame least-squares line fits (PLA and its derived variants).
    PiecewiseLinear,
    /// PAA means mapped to symbols over inverse-Normal cut points (SAX).
    SymbolicAggregate { alphabet_size: usize },
    /// Per-frame sums, without normalisation.
    Summation,
}

/// Configuration for a [`Discretiser`].
#[derive(Debug, Clone)]
pub struct DiscretiserConfig {
    pub kind: DiscretiserKind,
    pub node_kind: NodeKind,
    pub max_depth: MaxDepthFn,
    pub frames: FrameFn,
    pub node_params: NodeParams,
}

impl Default for DiscretiserConfig {
    fn default() -> Self {
        use crate::nodes::DepthFn;
        DiscretiserConfig {
            kind: DiscretiserKind::PiecewiseLinear,
            node_kind: NodeKind::StructuralProminence,
            max_depth: MaxDepthFn::log(),
            frames: FrameFn::powers_of_two(),
            node_params: NodeParams {
                structural_threshold: Some(DepthFn::constant(0.5)),
                prominence_threshold: Some(DepthFn::constant(0.5)),
                ..Default::default()
            },
        }
    }
}

/// Maps a window to a chain of nodes of one variant across increasing
/// depths.
#[derive(Debug, Clone)]
pub struct Discretiser {
    kind: DiscretiserKind,
    node_kind: NodeKind,
    max_depth: MaxDepthFn,
    frames: FrameFn,
    node_params: NodeParams,
    /// Inverse-Normal cut points, precomputed for symbolic aggregation.
    cut_points: Vec<f64>,
}

impl Discretiser {
    pub fn new(config: DiscretiserConfig) -> Result<Self, HpmError> {
        let compatible = match config.kind {
            DiscretiserKind::PiecewiseAggregate => config.node_kind == NodeKind::Paa,
            DiscretiserKind::PiecewiseLinear => matches!(
                config.node_kind,
                NodeKind::Pla | NodeKind::SlopeSign | NodeKind::StructuralProminence
            ),
            DiscretiserKind::SymbolicAggregate { .. } => config.node_kind == NodeKind::Sax,
            DiscretiserKind::Summation => config.node_kind == NodeKind::Sum,
        };
        if !compatible {
            return Err(HpmError::InvalidInput(format!(
                "node kind {:?} is not produced by discretiser {:?}",
                config.node_kind, config.kind
            )));
        }
        let cut_points = match config.kind {
            DiscretiserKind::SymbolicAggregate { alphabet_size } => cut_points(alphabet_size)?,
            _ => Vec::new(),
        };
        Ok(Discretiser {
            kind: config.kind,
            node_kind: config.node_kind,
            max_depth: config.max_depth,
            frames: config.frames,
            node_params: config.node_params,
            cut_points,
        })
    }

    /// Discretise one window into a chain of `max_depth` nodes.
    pub fn discretise(&self, segment: &[f64]) -> Result<Chain, HpmError> {
        match self.kind {
            DiscretiserKind::PiecewiseAggregate => self.discretise_aggregate(segment),
            DiscretiserKind::PiecewiseLinear => self.discretise_linear(segment),
            DiscretiserKind::SymbolicAggregate { alphabet_size } => {
                self.discretise_symbolic(segment, alphabet_size)
            }
            DiscretiserKind::Summation => self.discretise_summation(segment),
        }
    }

    fn discretise_aggregate(&self, segment: &[f64]) -> Result<Chain, HpmError> {
        let segment = normalise(segment)?;
        let mut nodes = Vec::new();
        for depth in 0..self.max_depth.at(&segment) {
            let breakpoints = divide(0, segment.len(), self.frames.at(depth))?;
            let means = frame_means(&segment, &breakpoints);
            nodes.push(Node::Paa(PaaNode::new(
                depth,
                segment.len(),
                breakpoints,
                means,
                &self.node_params,
            )?));
        }
        Ok(nodes)
    }

    fn discretise_linear(&self, segment: &[f64]) -> Result<Chain, HpmError> {
        // The prominence distance wants the raw spread, before the shape is
        // normalised away.
        let std = std_dev(segment);
        let segment = normalise(segment)?;
        let mut nodes = Vec::new();
        for depth in 0..self.max_depth.at(&segment) {
            let breakpoints = divide(0, segment.len(), self.frames.at(depth))?;
            let (slopes, intercepts) = frame_lines(&segment, &breakpoints);
            let node = match self.node_kind {
                NodeKind::Pla => Node::Pla(PlaNode::new(
                    depth,
                    slopes,
                    intercepts,
                    breakpoints,
                    &self.node_params,
                )?),
                NodeKind::SlopeSign => Node::SlopeSign(SlopeSignNode::new(depth, slopes)),
                NodeKind::StructuralProminence => {
                    Node::StructuralProminence(StructuralProminenceNode::new(
                        depth,
                        std,
                        slopes,
                        intercepts,
                        &self.node_params,
                    )?)
                }
                _ => unreachable!("checked at construction"),
            };
            nodes.push(node);
        }
        Ok(nodes)
    }

    fn discretise_symbolic(
        &self,
        segment: &[f64],
        alphabet_size: usize,
    ) -> Result<Chain, HpmError> {
        let segment = normalise(segment)?;
        let mut nodes = Vec::new();
        for depth in 0..self.max_depth.at(&segment) {
            let breakpoints = divide(0, segment.len(), self.frames.at(depth))?;
            let symbols = frame_means(&segment, &breakpoints)
                .into_iter()
                .map(|mean| digitize(mean, &self.cut_points))
                .collect();
            nodes.push(Node::Sax(SaxNode::new(
                depth,
                segment.len(),
                symbols,
                self.cut_points.clone(),
                alphabet_size,
                &self.node_params,
            )?));
        }
        Ok(nodes)
    }

    fn discretise_summation(&self, segment: &[f64]) -> Result<Chain, HpmError> {
        if segment.is_empty() {
            return Err(HpmError::InvalidInput(
                "cannot discretise an empty segment".into(),
            ));
        }
        let mut nodes = Vec::new();
        for depth in 0..self.max_depth.at(segment) {
            let breakpoints = divide(0, segment.len(), self.frames.at(depth))?;
            let sums = breakpoints
                .iter()
                .map(|&(begin, end)| segment[begin..end].iter().sum())
                .collect();
            nodes.push(Node::Sum(SumNode::new(depth, sums, &self.node_params)?));
        }
        Ok(nodes)
    }
}

fn frame_means(segment: &[f64], breakpoints: &[(usize, usize)]) -> Vec<f64> {
    breakpoints
        .iter()
        .map(|&(begin, end)| crate::helpers::mean(&segment[begin..end]))
        .collect()
}

fn frame_lines(segment: &[f64], breakpoints: &[(usize, usize)]) -> (Vec<f64>, Vec<f64>) {
    let mut slopes = Vec::with_capacity(breakpoints.len());
    let mut intercepts = Vec::with_capacity(breakpoints.len());
    for &(begin, end) in breakpoints {
        let (slope, intercept) = line_fit(&segment[begin..end]);
        slopes.push(slope);
        intercepts.push(intercept);
    }
    (slopes, intercepts)
}

/// The symbol for a frame mean: the number of cut points at or below it.
fn digitize(value: f64, cut_points: &[f64]) -> usize {
    cut_points.iter().filter(|cut| value >= **cut).count()
}

/// The `alphabet_size - 1` cut points dividing a standard Normal into
/// equally probable regions.
fn cut_points(alphabet_size: usize) -> Result<Vec<f64>, HpmError> {
    if alphabet_size < 2 {
        return Err(HpmError::InvalidInput(format!(
            "alphabet size must be at least 2, got {alphabet_size}"
        )));
    }
    if alphabet_size == 2 {
        return Ok(vec![0.0]);
    }
    Ok((1..alphabet_size)
        .map(|k| norm_quantile(k as f64 / alphabet_size as f64))
        .collect())
}
