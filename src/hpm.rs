//! The hierarchical pattern matching driver.
//!
//! Trains a pattern model on sliding windows of a training series, then
//! scores every point of a test series by how many of the windows covering
//! it were recognised. Scores close to 1 mean the local pattern was seen in
//! training; scores close to 0 mean it was not.

use crate::discretise::{Chain, Discretiser, DiscretiserConfig};
use crate::helpers::HpmError;
use crate::nw_set::{NestedWordSet, NestedWordSetConfig};
use crate::patterns::{MatchStrategy, PatternGraph, PatternModel, PatternSet, PatternTree};
use crate::segment::{SlidingWindow, SlidingWindowConfig};

/// Which pattern model scores the test windows.
#[derive(Debug, Clone)]
pub enum ModelConfig {
    PatternSet,
    PatternTree { closest_match: bool },
    PatternGraph { closest_match: bool },
    NestedWordSet(NestedWordSetConfig),
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig::PatternTree {
            closest_match: false,
        }
    }
}

/// Full configuration of one HPM run.
#[derive(Debug, Clone, Default)]
pub struct HpmConfig {
    pub segmenter: SlidingWindowConfig,
    pub discretiser: DiscretiserConfig,
    pub model: ModelConfig,
}

enum AnomalyModel {
    Set(PatternSet),
    Tree(PatternTree),
    Graph(PatternGraph),
    Nested(Box<NestedWordSet>),
}

impl AnomalyModel {
    fn build(config: &ModelConfig) -> Result<Self, HpmError> {
        Ok(match config {
            ModelConfig::PatternSet => AnomalyModel::Set(PatternSet::new()),
            ModelConfig::PatternTree { closest_match } => {
                AnomalyModel::Tree(PatternTree::new(strategy(*closest_match)))
            }
            ModelConfig::PatternGraph { closest_match } => {
                AnomalyModel::Graph(PatternGraph::new(strategy(*closest_match)))
            }
            ModelConfig::NestedWordSet(config) => {
                AnomalyModel::Nested(Box::new(NestedWordSet::new(config.clone())?))
            }
        })
    }

    fn learn(&mut self, chains: &[Chain]) -> Result<(), HpmError> {
        match self {
            AnomalyModel::Set(model) => {
                model.learn(chains)?;
            }
            AnomalyModel::Tree(model) => {
                model.learn(chains)?;
            }
            AnomalyModel::Graph(model) => {
                model.learn(chains)?;
            }
            AnomalyModel::Nested(model) => {
                model.learn(chains)?;
            }
        }
        Ok(())
    }
}

fn strategy(closest_match: bool) -> MatchStrategy {
    if closest_match {
        MatchStrategy::Closest
    } else {
        MatchStrategy::First
    }
}

/// Run hierarchical pattern matching: learn `train`, score `test`.
///
/// Every test window adds a recognised/unrecognised vote to each point it
/// covers; a point's score is the mean of its votes, or 0 where no window
/// covers it. All scores lie in `[0, 1]`.
pub fn hpm(train: &[f64], test: &[f64], config: &HpmConfig) -> Result<Vec<f64>, HpmError> {
    let mut segmenter = SlidingWindow::new(config.segmenter.clone())?;
    let discretiser = Discretiser::new(config.discretiser.clone())?;
    let mut model = AnomalyModel::build(&config.model)?;

    let training_chains = segmenter
        .segment(train)?
        .iter()
        .map(|segment| discretiser.discretise(segment))
        .collect::<Result<Vec<_>, _>>()?;
    let testing_chains = segmenter
        .segment(test)?
        .iter()
        .map(|segment| discretiser.discretise(segment))
        .collect::<Result<Vec<_>, _>>()?;
    model.learn(&training_chains)?;

    let window = segmenter.window_size();
    let step = segmenter.step_size();
    let mut counts = vec![0usize; test.len()];
    let mut scores = vec![0.0; test.len()];

    let mut vote = |start: usize, end: usize, recognised: bool| {
        for point in start..end.min(test.len()) {
            counts[point] += 1;
            scores[point] += f64::from(u8::from(recognised));
        }
    };

    match &mut model {
        AnomalyModel::Nested(model) => {
            // A context of k windows covers the span of its first through
            // last window.
            let context = model.context_size();
            for index in 0..(testing_chains.len() + 1).saturating_sub(context) {
                let recognised = model.contains(&testing_chains[index..index + context])?;
                let start = index * step;
                let end = (index + context - 1) * step + window;
                vote(start, end, recognised);
            }
        }
        model => {
            for (index, chain) in testing_chains.iter().enumerate() {
                let recognised = match model {
                    AnomalyModel::Set(model) => model.contains(chain)?,
                    AnomalyModel::Tree(model) => model.contains(chain)?,
                    AnomalyModel::Graph(model) => model.contains(chain)?,
                    AnomalyModel::Nested(_) => unreachable!("handled above"),
                };
                let start = index * step;
                vote(start, start + window, recognised);
            }
        }
    }

    Ok(scores
        .iter()
        .zip(&counts)
        .map(|(score, count)| if *count == 0 { 0.0 } else { score / *count as f64 })
        .collect())
}
