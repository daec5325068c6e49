//! Hierarchical pattern matching (HPM) anomaly detection for univariate
//! time series.
//!
//! A series is cut into overlapping windows, each window is discretised
//! into a *chain* of increasingly fine approximations, and chains are
//! stored in a pattern model during training. A test window is normal when
//! its chain is recognised by the model; per-point scores average the
//! verdicts of all windows covering the point.
//!
//! The pipeline, leaves first:
//!
//! - [`segment`]: sliding-window segmentation, optional differencing and
//!   autocorrelation-derived window size.
//! - [`nodes`]: the node variants approximating one window at one depth.
//! - [`discretise`]: window → chain of nodes.
//! - [`patterns`]: chain storage (per-depth sets, rooted tree, layered
//!   DAG).
//! - [`nested`] and [`nw_set`]: combining consecutive chains into nested
//!   words with call/return structure, for context-sensitive matching.
//! - [`hpm`]: the scoring driver tying the pieces together.
//!
//! [`words`] and [`acceptors`] provide the flat word primitive and finite
//! acceptors recognising word languages.
//!
//! # Examples
//!
//! ```
//! use hpm::segment::SlidingWindowConfig;
//! use hpm::{HpmConfig, hpm as hpm_run};
//!
//! let train: Vec<f64> = (0..100).map(|i| (i as f64 * 0.1).sin()).collect();
//! let config = HpmConfig {
//!     segmenter: SlidingWindowConfig {
//!         window_size: 10,
//!         ..Default::default()
//!     },
//!     ..Default::default()
//! };
//! let scores = hpm_run(&train, &train, &config).unwrap();
//! assert_eq!(scores.len(), train.len());
//! assert!(scores.iter().all(|score| (0.0..=1.0).contains(score)));
//! ```

pub mod acceptors;
pub mod digraph;
pub mod discretise;
pub mod helpers;
pub mod hpm;
pub mod nested;
pub mod nodes;
pub mod nw_set;
pub mod patterns;
pub mod segment;
pub mod words;

pub use crate::helpers::HpmError;
pub use crate::hpm::{HpmConfig, ModelConfig, hpm};
