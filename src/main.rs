//! UCR anomaly benchmark runner.
//!
//! Iterates a directory of UCR time series files (sorted by byte size),
//! runs each configured HPM variant, converts the minimum-score location
//! into a predicted anomaly index and records per-algorithm booleans in a
//! results CSV.
//!
//! File names follow the UCR convention
//! `<id>_<meta>_<train_len>_<anom_start>_<anom_end>.txt`; the sample values
//! are whitespace-separated.

use std::error::Error;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;
use itertools::Itertools;
use log::{info, warn};
use serde::Serialize;

use hpm::discretise::DiscretiserConfig;
use hpm::nodes::{DepthFn, NodeParams};
use hpm::segment::SlidingWindowConfig;
use hpm::{HpmConfig, ModelConfig, hpm as hpm_run};

#[derive(Parser, Debug)]
#[command(name = "ucr-bench", about = "Run HPM configurations over a UCR data directory")]
struct Args {
    /// Directory containing the UCR `.txt` files.
    #[arg(long, default_value = "data")]
    data: PathBuf,
    /// Path of the results CSV.
    #[arg(long, default_value = "results/results.csv")]
    results: PathBuf,
    /// Dump each score array as JSON next to the results.
    #[arg(long)]
    save_scores: bool,
    /// Directory for the score dumps.
    #[arg(long, default_value = "results/scores")]
    scores_dir: PathBuf,
}

struct UcrDataset {
    identifier: String,
    train: Vec<f64>,
    test: Vec<f64>,
    anomaly: (usize, usize),
}

#[derive(Serialize)]
struct ScoreDump<'a> {
    identifier: &'a str,
    algorithm: &'a str,
    scores: &'a [f64],
}

/// The configurations evaluated against every dataset, in column order.
fn algorithms() -> Vec<(String, HpmConfig)> {
    let configured = |differentiation: bool| HpmConfig {
        segmenter: SlidingWindowConfig {
            window_size: 200,
            autocorrelation: true,
            differentiation,
            ..Default::default()
        },
        discretiser: DiscretiserConfig {
            node_params: NodeParams {
                structural_threshold: Some(DepthFn::constant(0.25)),
                prominence_threshold: Some(DepthFn::constant(0.25)),
                ..Default::default()
            },
            ..Default::default()
        },
        model: ModelConfig::PatternGraph {
            closest_match: false,
        },
    };
    vec![
        ("HPM_PatternGraph_auto_diff".to_string(), configured(true)),
        ("HPM_PatternGraph_auto".to_string(), configured(false)),
    ]
}

/// Parse `<id>_<meta>_<train_len>_<anom_start>_<anom_end>.txt` and split
/// the series into train and test parts.
fn load_dataset(path: &Path) -> Result<UcrDataset, Box<dyn Error>> {
    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or("unreadable file name")?;
    let fields: Vec<&str> = name.split('_').collect();
    if fields.len() < 4 {
        return Err(format!("file name `{name}` does not follow the UCR convention").into());
    }
    let identifier = fields[0].to_string();
    let train_len: usize = fields[fields.len() - 3].parse()?;
    let anomaly_start: usize = fields[fields.len() - 2].parse()?;
    let anomaly_end: usize = fields[fields.len() - 1].parse()?;

    let contents = fs::read_to_string(path)?;
    let data = contents
        .split_whitespace()
        .map(str::parse::<f64>)
        .collect::<Result<Vec<_>, _>>()?;
    if train_len >= data.len() {
        return Err(format!("training length {train_len} exceeds series length").into());
    }
    let (train, test) = data.split_at(train_len);
    Ok(UcrDataset {
        identifier,
        train: train.to_vec(),
        test: test.to_vec(),
        anomaly: (anomaly_start, anomaly_end),
    })
}

/// All `.txt` files of the directory, smallest first.
fn dataset_paths(dir: &Path) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "txt") {
            let size = fs::metadata(&path)?.len();
            paths.push((size, path));
        }
    }
    paths.sort();
    Ok(paths.into_iter().map(|(_, path)| path).collect())
}

fn position_of_min(scores: &[f64]) -> usize {
    let mut best = 0;
    for (index, score) in scores.iter().enumerate() {
        if *score < scores[best] {
            best = index;
        }
    }
    best
}

/// Whether the minimum-score location counts as a correct prediction:
/// within `max(anomaly length, 100)` of the ground-truth range.
fn prediction_correct(min_index: usize, train_len: usize, anomaly: (usize, usize)) -> bool {
    let (start, end) = anomaly;
    let margin = (end - start + 1).max(100) as i64;
    let predicted = (min_index + train_len) as i64;
    start as i64 - margin < predicted && predicted < end as i64 + margin
}

fn evaluate(dataset: &UcrDataset, name: &str, config: &HpmConfig, args: &Args) -> bool {
    let window = config.segmenter.window_size;
    let scores = match hpm_run(&dataset.train, &dataset.test, config) {
        Ok(scores) => scores,
        Err(error) => {
            warn!("{name} failed on UCR {}: {error}", dataset.identifier);
            return false;
        }
    };
    if scores.len() < window * 2 {
        warn!(
            "scores length {} is less than two times window size {window}, skipping",
            scores.len()
        );
        return false;
    }
    if args.save_scores {
        if let Err(error) = dump_scores(&dataset.identifier, name, &scores, &args.scores_dir) {
            warn!("could not save scores for UCR {}: {error}", dataset.identifier);
        }
    }
    let min_index = position_of_min(&scores[window..scores.len() - window]) + window;
    prediction_correct(min_index, dataset.train.len(), dataset.anomaly)
}

fn dump_scores(
    identifier: &str,
    algorithm: &str,
    scores: &[f64],
    dir: &Path,
) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{identifier}-{algorithm}-scores.json"));
    let dump = ScoreDump {
        identifier,
        algorithm,
        scores,
    };
    fs::write(path, serde_json::to_string(&dump)?)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();
    let algorithms = algorithms();

    if let Some(results_dir) = args.results.parent() {
        if !results_dir.as_os_str().is_empty() {
            fs::create_dir_all(results_dir)?;
        }
    }
    let mut results_file = fs::File::create(&args.results)?;
    writeln!(
        results_file,
        "id,{}",
        algorithms.iter().map(|(name, _)| name).join(",")
    )?;

    for path in dataset_paths(&args.data)? {
        let dataset = match load_dataset(&path) {
            Ok(dataset) => dataset,
            Err(error) => {
                warn!("skipping {}: {error}", path.display());
                continue;
            }
        };
        info!(
            "evaluating UCR {} (training: [0:{}], testing: [{}:{}], anomaly: [{}, {}])",
            dataset.identifier,
            dataset.train.len(),
            dataset.train.len(),
            dataset.train.len() + dataset.test.len(),
            dataset.anomaly.0,
            dataset.anomaly.1,
        );
        let started = Instant::now();
        let row = algorithms
            .iter()
            .map(|(name, config)| evaluate(&dataset, name, config, &args))
            .collect::<Vec<_>>();
        info!(
            "UCR {} done in {:.2}s",
            dataset.identifier,
            started.elapsed().as_secs_f64()
        );

        writeln!(
            results_file,
            "{},{}",
            dataset.identifier,
            row.iter().join(",")
        )?;
        results_file.flush()?;
    }
    Ok(())
}
