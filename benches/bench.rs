use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use hpm::discretise::{Discretiser, DiscretiserConfig};
use hpm::patterns::{MatchStrategy, PatternGraph, PatternModel, PatternTree};
use hpm::segment::{SlidingWindow, SlidingWindowConfig};

fn criterion_benchmark(c: &mut Criterion) {
    let series: Vec<f64> = (0..200).map(|i| (i as f64 * 0.05).sin()).collect();
    let discretiser = Discretiser::new(DiscretiserConfig::default()).unwrap();

    c.bench_function("discretise (200 samples)", |b| {
        b.iter(|| discretiser.discretise(black_box(&series)).unwrap())
    });

    let mut segmenter = SlidingWindow::new(SlidingWindowConfig {
        window_size: 50,
        ..Default::default()
    })
    .unwrap();
    let chains = segmenter
        .segment(&series)
        .unwrap()
        .iter()
        .map(|segment| discretiser.discretise(segment).unwrap())
        .collect::<Vec<_>>();

    c.bench_function("pattern tree learn (150 chains)", |b| {
        b.iter(|| {
            let mut model = PatternTree::new(MatchStrategy::First);
            model.learn(black_box(&chains)).unwrap()
        })
    });
    c.bench_function("pattern graph learn (150 chains)", |b| {
        b.iter(|| {
            let mut model = PatternGraph::new(MatchStrategy::Closest);
            model.learn(black_box(&chains)).unwrap()
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
