//! Node variants: approximations of one window at one granularity.
//!
//! A node captures a single window at one depth of a discretisation chain.
//! Every variant defines *equivalence* (approximate equality, usually
//! threshold-based) and *distance* against a peer of the same variant and
//! depth. Thresholds are depth-indexed policies evaluated once at node
//! construction; two nodes built under different threshold values are not
//! comparable.
//!
//! # Examples
//!
//! ```
//! use hpm::nodes::{DepthFn, NodeParams, SumNode};
//!
//! let params = NodeParams {
//!     distance_threshold: Some(DepthFn::constant(0.5)),
//!     ..Default::default()
//! };
//! let a = SumNode::new(0, vec![1.0, 2.0], &params).unwrap();
//! let b = SumNode::new(0, vec![1.2, 2.2], &params).unwrap();
//! assert!(a.equivalent(&b));
//! assert!((a.distance(&b).unwrap() - 0.2).abs() < 1e-12);
//! ```

use std::fmt;
use std::rc::Rc;

use crate::helpers::HpmError;

/// A depth-indexed numeric policy, evaluated at node construction time.
///
/// Either a closure over the depth or a precomputed table (the last table
/// entry covers all deeper levels).
#[derive(Clone)]
pub struct DepthFn(Rc<dyn Fn(usize) -> f64>);

impl DepthFn {
    pub fn new(f: impl Fn(usize) -> f64 + 'static) -> Self {
        DepthFn(Rc::new(f))
    }

    /// The same value at every depth.
    pub fn constant(value: f64) -> Self {
        DepthFn(Rc::new(move |_| value))
    }

    /// Values looked up by depth; depths beyond the table reuse the last
    /// entry. Panics on an empty table.
    pub fn table(values: Vec<f64>) -> Self {
        assert!(!values.is_empty(), "threshold table must not be empty");
        DepthFn(Rc::new(move |depth| {
            values[depth.min(values.len() - 1)]
        }))
    }

    pub fn at(&self, depth: usize) -> f64 {
        (self.0)(depth)
    }
}

impl fmt::Debug for DepthFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DepthFn(..)")
    }
}

/// Threshold policies handed to node constructors. Which fields are required
/// depends on the node variant; a missing required policy is an
/// `InvalidInput` at construction.
#[derive(Debug, Clone, Default)]
pub struct NodeParams {
    pub distance_threshold: Option<DepthFn>,
    pub structural_threshold: Option<DepthFn>,
    pub prominence_threshold: Option<DepthFn>,
}

fn required(policy: &Option<DepthFn>, name: &str, depth: usize) -> Result<f64, HpmError> {
    policy
        .as_ref()
        .map(|f| f.at(depth))
        .ok_or_else(|| HpmError::InvalidInput(format!("required node parameter `{name}` not set")))
}

/// Piecewise aggregate approximation: one mean per frame, compared by
/// Euclidean distance scaled by `sqrt(segment_length / frames)`.
#[derive(Debug, Clone)]
pub struct PaaNode {
    depth: usize,
    segment_length: usize,
    frames: usize,
    breakpoints: Vec<(usize, usize)>,
    means: Vec<f64>,
    distance_threshold: f64,
}

impl PaaNode {
    pub fn new(
        depth: usize,
        segment_length: usize,
        breakpoints: Vec<(usize, usize)>,
        means: Vec<f64>,
        params: &NodeParams,
    ) -> Result<Self, HpmError> {
        let distance_threshold = required(&params.distance_threshold, "distance_threshold", depth)?;
        Ok(PaaNode {
            depth,
            segment_length,
            frames: means.len(),
            breakpoints,
            means,
            distance_threshold,
        })
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn breakpoints(&self) -> &[(usize, usize)] {
        &self.breakpoints
    }

    fn comparable(&self, other: &PaaNode) -> Result<(), HpmError> {
        if self.depth != other.depth {
            return Err(HpmError::Incomparable(
                "cannot compare nodes of different depths".into(),
            ));
        }
        if self.distance_threshold != other.distance_threshold {
            return Err(HpmError::Incomparable(
                "cannot compare nodes with different distance thresholds".into(),
            ));
        }
        if self.frames != other.frames {
            return Err(HpmError::Incomparable(format!(
                "cannot compare nodes with {} and {} frames",
                self.frames, other.frames
            )));
        }
        Ok(())
    }

    /// Euclidean distance between the frame means, scaled by
    /// `sqrt(segment_length / frames)` to undo the dimensionality reduction.
    pub fn distance(&self, other: &PaaNode) -> Result<f64, HpmError> {
        self.comparable(other)?;
        let euclidean = self
            .means
            .iter()
            .zip(&other.means)
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt();
        Ok((self.segment_length as f64 / self.frames as f64).sqrt() * euclidean)
    }

    pub fn equivalent(&self, other: &PaaNode) -> bool {
        match self.distance(other) {
            Ok(distance) => distance <= self.distance_threshold,
            Err(_) => false,
        }
    }
}

/// Piecewise linear approximation with the full PLA distance over in-frame
/// offsets.
#[derive(Debug, Clone)]
pub struct PlaNode {
    depth: usize,
    slopes: Vec<f64>,
    intercepts: Vec<f64>,
    breakpoints: Vec<(usize, usize)>,
    distance_threshold: f64,
}

impl PlaNode {
    pub fn new(
        depth: usize,
        slopes: Vec<f64>,
        intercepts: Vec<f64>,
        breakpoints: Vec<(usize, usize)>,
        params: &NodeParams,
    ) -> Result<Self, HpmError> {
        let distance_threshold = required(&params.distance_threshold, "distance_threshold", depth)?;
        Ok(PlaNode {
            depth,
            slopes,
            intercepts,
            breakpoints,
            distance_threshold,
        })
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn slopes(&self) -> &[f64] {
        &self.slopes
    }

    fn comparable(&self, other: &PlaNode) -> Result<(), HpmError> {
        if self.depth != other.depth {
            return Err(HpmError::Incomparable(
                "cannot compare nodes of different depths".into(),
            ));
        }
        if self.distance_threshold != other.distance_threshold {
            return Err(HpmError::Incomparable(
                "cannot compare nodes with different distance thresholds".into(),
            ));
        }
        if self.slopes.len() != other.slopes.len() {
            return Err(HpmError::Incomparable(
                "cannot compare nodes with different frame counts".into(),
            ));
        }
        Ok(())
    }

    /// PLA distance: `sqrt( Σ_i Σ_{j=1..L} (Δa_i·j + Δb_i)² )` where `L` is
    /// the frame length.
    pub fn distance(&self, other: &PlaNode) -> Result<f64, HpmError> {
        self.comparable(other)?;
        let length = self
            .breakpoints
            .first()
            .map(|(begin, end)| end - begin)
            .unwrap_or(0);
        let mut total = 0.0;
        for (i, (a, b)) in self.slopes.iter().zip(&self.intercepts).enumerate() {
            let da = a - other.slopes[i];
            let db = b - other.intercepts[i];
            for j in 1..=length {
                let term = da * j as f64 + db;
                total += term * term;
            }
        }
        Ok(total.sqrt())
    }

    pub fn equivalent(&self, other: &PlaNode) -> bool {
        match self.distance(other) {
            Ok(distance) => distance <= self.distance_threshold,
            Err(_) => false,
        }
    }
}

/// Signs of the per-frame slopes. Equivalence requires every sign to match;
/// distance is the fraction of mismatching signs.
#[derive(Debug, Clone)]
pub struct SlopeSignNode {
    depth: usize,
    slopes: Vec<f64>,
}

impl SlopeSignNode {
    pub fn new(depth: usize, slopes: Vec<f64>) -> SlopeSignNode {
        SlopeSignNode { depth, slopes }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn slopes(&self) -> &[f64] {
        &self.slopes
    }

    /// Signs as booleans; a zero slope counts as non-negative.
    pub fn signs(&self) -> Vec<bool> {
        self.slopes.iter().map(|s| *s >= 0.0).collect()
    }

    fn comparable(&self, other: &SlopeSignNode) -> Result<(), HpmError> {
        if self.depth != other.depth {
            return Err(HpmError::Incomparable(
                "cannot compare nodes of different depths".into(),
            ));
        }
        if self.slopes.len() != other.slopes.len() {
            return Err(HpmError::Incomparable(
                "cannot compare nodes with different frame counts".into(),
            ));
        }
        Ok(())
    }

    /// The fraction of slope signs that differ.
    pub fn distance(&self, other: &SlopeSignNode) -> Result<f64, HpmError> {
        self.comparable(other)?;
        let mismatches = self
            .slopes
            .iter()
            .zip(&other.slopes)
            .filter(|(a, b)| (**a >= 0.0) != (**b >= 0.0))
            .count();
        Ok(mismatches as f64 / self.slopes.len() as f64)
    }

    pub fn equivalent(&self, other: &SlopeSignNode) -> bool {
        match self.distance(other) {
            Ok(distance) => distance == 0.0,
            Err(_) => false,
        }
    }
}

/// Piecewise linear approximation compared by two distances: a *structural*
/// distance over slopes and intercepts and a *prominence* distance over the
/// raw window's standard deviation.
#[derive(Debug, Clone)]
pub struct StructuralProminenceNode {
    depth: usize,
    std: f64,
    slopes: Vec<f64>,
    intercepts: Vec<f64>,
    structural_threshold: f64,
    prominence_threshold: f64,
}

impl StructuralProminenceNode {
    pub fn new(
        depth: usize,
        std: f64,
        slopes: Vec<f64>,
        intercepts: Vec<f64>,
        params: &NodeParams,
    ) -> Result<Self, HpmError> {
        let structural_threshold =
            required(&params.structural_threshold, "structural_threshold", depth)?;
        let prominence_threshold =
            required(&params.prominence_threshold, "prominence_threshold", depth)?;
        Ok(StructuralProminenceNode {
            depth,
            std,
            slopes,
            intercepts,
            structural_threshold,
            prominence_threshold,
        })
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn std(&self) -> f64 {
        self.std
    }

    pub fn slopes(&self) -> &[f64] {
        &self.slopes
    }

    fn comparable(&self, other: &StructuralProminenceNode) -> Result<(), HpmError> {
        if self.depth != other.depth {
            return Err(HpmError::Incomparable(
                "cannot compare nodes of different depths".into(),
            ));
        }
        if self.structural_threshold != other.structural_threshold {
            return Err(HpmError::Incomparable(
                "cannot compare nodes with different structural thresholds".into(),
            ));
        }
        if self.prominence_threshold != other.prominence_threshold {
            return Err(HpmError::Incomparable(
                "cannot compare nodes with different prominence thresholds".into(),
            ));
        }
        if self.slopes.len() != other.slopes.len() {
            return Err(HpmError::Incomparable(
                "cannot compare nodes with different frame counts".into(),
            ));
        }
        Ok(())
    }

    /// Mean of the signed slope and intercept differences. The sign is kept
    /// here; the combined distance takes the absolute value.
    pub fn structural_distance(&self, other: &StructuralProminenceNode) -> Result<f64, HpmError> {
        self.comparable(other)?;
        let total: f64 = self
            .slopes
            .iter()
            .zip(&self.intercepts)
            .zip(other.slopes.iter().zip(&other.intercepts))
            .map(|((a1, b1), (a2, b2))| (a1 - a2) + (b1 - b2))
            .sum();
        Ok(total / self.slopes.len() as f64)
    }

    /// Ratio of the larger to the smaller standard deviation, minus one.
    pub fn prominence_distance(&self, other: &StructuralProminenceNode) -> Result<f64, HpmError> {
        self.comparable(other)?;
        let maximum = self.std.max(other.std);
        let minimum = self.std.min(other.std);
        Ok(maximum / (minimum + 1e-10) - 1.0)
    }

    pub fn distance(&self, other: &StructuralProminenceNode) -> Result<f64, HpmError> {
        Ok(self.structural_distance(other)?.abs() + self.prominence_distance(other)?.abs())
    }

    pub fn equivalent(&self, other: &StructuralProminenceNode) -> bool {
        let structural = match self.structural_distance(other) {
            Ok(distance) => distance.abs() <= self.structural_threshold,
            Err(_) => return false,
        };
        let prominence = match self.prominence_distance(other) {
            Ok(distance) => distance.abs() <= self.prominence_threshold,
            Err(_) => return false,
        };
        structural && prominence
    }
}

/// Symbolic aggregate approximation: frame means discretised into an
/// alphabet by inverse-Normal cut points.
#[derive(Debug, Clone)]
pub struct SaxNode {
    depth: usize,
    segment_length: usize,
    frames: usize,
    symbols: Vec<usize>,
    cut_points: Vec<f64>,
    alphabet_size: usize,
    distance_threshold: f64,
}

impl SaxNode {
    pub fn new(
        depth: usize,
        segment_length: usize,
        symbols: Vec<usize>,
        cut_points: Vec<f64>,
        alphabet_size: usize,
        params: &NodeParams,
    ) -> Result<Self, HpmError> {
        let distance_threshold = required(&params.distance_threshold, "distance_threshold", depth)?;
        Ok(SaxNode {
            depth,
            segment_length,
            frames: symbols.len(),
            symbols,
            cut_points,
            alphabet_size,
            distance_threshold,
        })
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn symbols(&self) -> &[usize] {
        &self.symbols
    }

    fn comparable(&self, other: &SaxNode) -> Result<(), HpmError> {
        if self.depth != other.depth {
            return Err(HpmError::Incomparable(
                "cannot compare nodes of different depths".into(),
            ));
        }
        if self.distance_threshold != other.distance_threshold {
            return Err(HpmError::Incomparable(
                "cannot compare nodes with different distance thresholds".into(),
            ));
        }
        if self.segment_length != other.segment_length || self.frames != other.frames {
            return Err(HpmError::Incomparable(format!(
                "cannot compare nodes with segment lengths {} and {} or frames {} and {}",
                self.segment_length, other.segment_length, self.frames, other.frames
            )));
        }
        Ok(())
    }

    /// Distance between two symbols: zero when equal or adjacent, otherwise
    /// the spread between the cut points separating them.
    pub fn symbol_distance(&self, s1: usize, s2: usize) -> Result<f64, HpmError> {
        if s1 >= self.alphabet_size || s2 >= self.alphabet_size {
            return Err(HpmError::InvalidInput(format!(
                "symbol index out of bounds: {s1}, {s2} with alphabet size {}",
                self.alphabet_size
            )));
        }
        if s1.abs_diff(s2) <= 1 {
            return Ok(0.0);
        }
        Ok(self.cut_points[s1.max(s2) - 1] - self.cut_points[s1.min(s2)])
    }

    pub fn distance(&self, other: &SaxNode) -> Result<f64, HpmError> {
        self.comparable(other)?;
        let mut total = 0.0;
        for (s1, s2) in self.symbols.iter().zip(&other.symbols) {
            let d = self.symbol_distance(*s1, *s2)?;
            total += d * d;
        }
        Ok((self.segment_length as f64 / self.frames as f64).sqrt() * total.sqrt())
    }

    pub fn equivalent(&self, other: &SaxNode) -> bool {
        match self.distance(other) {
            Ok(distance) => distance <= self.distance_threshold,
            Err(_) => false,
        }
    }
}

/// Frame sums with a mean-absolute-difference distance. A toy variant kept
/// as the simplest end-to-end example of the node contract.
#[derive(Debug, Clone)]
pub struct SumNode {
    depth: usize,
    sums: Vec<f64>,
    distance_threshold: f64,
}

impl SumNode {
    pub fn new(depth: usize, sums: Vec<f64>, params: &NodeParams) -> Result<Self, HpmError> {
        let distance_threshold = required(&params.distance_threshold, "distance_threshold", depth)?;
        Ok(SumNode {
            depth,
            sums,
            distance_threshold,
        })
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn sums(&self) -> &[f64] {
        &self.sums
    }

    fn comparable(&self, other: &SumNode) -> Result<(), HpmError> {
        if self.depth != other.depth {
            return Err(HpmError::Incomparable(
                "cannot compare nodes of different depths".into(),
            ));
        }
        if self.distance_threshold != other.distance_threshold {
            return Err(HpmError::Incomparable(
                "cannot compare nodes with different distance thresholds".into(),
            ));
        }
        if self.sums.len() != other.sums.len() {
            return Err(HpmError::Incomparable(
                "cannot compare nodes with different frame counts".into(),
            ));
        }
        Ok(())
    }

    pub fn distance(&self, other: &SumNode) -> Result<f64, HpmError> {
        self.comparable(other)?;
        let total: f64 = self
            .sums
            .iter()
            .zip(&other.sums)
            .map(|(a, b)| (a - b).abs())
            .sum();
        Ok(total / self.sums.len() as f64)
    }

    pub fn equivalent(&self, other: &SumNode) -> bool {
        match self.distance(other) {
            Ok(distance) => distance <= self.distance_threshold,
            Err(_) => false,
        }
    }
}

/// A variant-tagged approximation of one window at one depth.
#[derive(Debug, Clone)]
pub enum Node {
    Paa(PaaNode),
    Pla(PlaNode),
    SlopeSign(SlopeSignNode),
    StructuralProminence(StructuralProminenceNode),
    Sax(SaxNode),
    Sum(SumNode),
}

impl Node {
    pub fn depth(&self) -> usize {
        match self {
            Node::Paa(node) => node.depth(),
            Node::Pla(node) => node.depth(),
            Node::SlopeSign(node) => node.depth(),
            Node::StructuralProminence(node) => node.depth(),
            Node::Sax(node) => node.depth(),
            Node::Sum(node) => node.depth(),
        }
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            Node::Paa(_) => "Paa",
            Node::Pla(_) => "Pla",
            Node::SlopeSign(_) => "SlopeSign",
            Node::StructuralProminence(_) => "StructuralProminence",
            Node::Sax(_) => "Sax",
            Node::Sum(_) => "Sum",
        }
    }

    /// Variant-specific approximate equality. Nodes of different variants,
    /// depths or threshold values are never equivalent.
    pub fn equivalent(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Paa(a), Node::Paa(b)) => a.equivalent(b),
            (Node::Pla(a), Node::Pla(b)) => a.equivalent(b),
            (Node::SlopeSign(a), Node::SlopeSign(b)) => a.equivalent(b),
            (Node::StructuralProminence(a), Node::StructuralProminence(b)) => a.equivalent(b),
            (Node::Sax(a), Node::Sax(b)) => a.equivalent(b),
            (Node::Sum(a), Node::Sum(b)) => a.equivalent(b),
            _ => false,
        }
    }

    /// Variant-specific distance. Comparing across variants is an
    /// `Incomparable` error.
    pub fn distance(&self, other: &Node) -> Result<f64, HpmError> {
        match (self, other) {
            (Node::Paa(a), Node::Paa(b)) => a.distance(b),
            (Node::Pla(a), Node::Pla(b)) => a.distance(b),
            (Node::SlopeSign(a), Node::SlopeSign(b)) => a.distance(b),
            (Node::StructuralProminence(a), Node::StructuralProminence(b)) => a.distance(b),
            (Node::Sax(a), Node::Sax(b)) => a.distance(b),
            (Node::Sum(a), Node::Sum(b)) => a.distance(b),
            _ => Err(HpmError::Incomparable(format!(
                "cannot compare node of variant {} with {}",
                self.variant_name(),
                other.variant_name()
            ))),
        }
    }
}
