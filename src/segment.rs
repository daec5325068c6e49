//! Sliding-window segmentation of a one-dimensional signal.
//!
//! A [`SlidingWindow`] cuts a series into overlapping fixed-length windows.
//! The window size can optionally be derived from the autocorrelation
//! function of the first segmented series, with the configured size acting
//! as a fallback when no periodicity is found.

use itertools::Itertools;

use crate::helpers::{HpmError, mean};

/// Smallest lag considered when deriving a window size from autocorrelation.
/// Shorter lags are trivial self-matches, not periodicity.
const MINIMUM_LAG: usize = 10;

/// Configuration for [`SlidingWindow`].
#[derive(Debug, Clone)]
pub struct SlidingWindowConfig {
    /// Window width. With `autocorrelation` set this is the fallback width
    /// used when the series shows no periodicity.
    pub window_size: usize,
    /// Offset between consecutive windows.
    pub step_size: usize,
    /// Apply first differencing before windowing.
    pub differentiation: bool,
    /// Derive the window size from the autocorrelation function on the
    /// first call, caching the result.
    pub autocorrelation: bool,
}

impl Default for SlidingWindowConfig {
    fn default() -> Self {
        SlidingWindowConfig {
            window_size: 200,
            step_size: 1,
            differentiation: false,
            autocorrelation: false,
        }
    }
}

/// Segmenter that cuts a series into overlapping fixed-size windows.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    fallback: usize,
    derived: Option<usize>,
    step_size: usize,
    differentiation: bool,
    autocorrelation: bool,
}

impl SlidingWindow {
    pub fn new(config: SlidingWindowConfig) -> Result<Self, HpmError> {
        if config.window_size == 0 {
            return Err(HpmError::InvalidInput(
                "`window_size` must be greater than 0".into(),
            ));
        }
        if config.step_size == 0 {
            return Err(HpmError::InvalidInput(
                "`step_size` must be greater than 0".into(),
            ));
        }
        Ok(SlidingWindow {
            fallback: config.window_size,
            derived: None,
            step_size: config.step_size,
            differentiation: config.differentiation,
            autocorrelation: config.autocorrelation,
        })
    }

    /// The effective window size: the autocorrelation-derived width once it
    /// has been computed, the configured width otherwise.
    pub fn window_size(&self) -> usize {
        self.derived.unwrap_or(self.fallback)
    }

    pub fn step_size(&self) -> usize {
        self.step_size
    }

    /// Cut `data` into windows of the effective width strided by the step
    /// size. Fails with `InvalidInput` when the (possibly differenced) data
    /// is shorter than one window.
    pub fn segment(&mut self, data: &[f64]) -> Result<Vec<Vec<f64>>, HpmError> {
        if self.autocorrelation && self.derived.is_none() {
            self.derived = Some(ac_window_size(data, MINIMUM_LAG).unwrap_or(self.fallback));
        }
        let window = self.window_size();
        let diffed;
        let data = if self.differentiation {
            diffed = data
                .iter()
                .tuple_windows()
                .map(|(previous, next)| next - previous)
                .collect::<Vec<_>>();
            diffed.as_slice()
        } else {
            data
        };
        if data.len() < window {
            return Err(HpmError::InvalidInput(format!(
                "data length {} must be at least the window size {window}",
                data.len()
            )));
        }
        Ok((0..=data.len() - window)
            .step_by(self.step_size)
            .map(|start| data[start..start + window].to_vec())
            .collect())
    }
}

/// Derive a window size as the lag of the autocorrelation maximum.
///
/// The one-sided sample ACF is computed for lags `1..=n-1-n/2`, each value
/// normalised by `variance * (n - lag)`. Lags up to `minimum` are discarded;
/// the winning lag is returned only when its coefficient exceeds 0.5.
fn ac_window_size(data: &[f64], minimum: usize) -> Option<usize> {
    let n = data.len();
    if n < 4 {
        return None;
    }
    let max_lag = n - 1 - n / 2;
    if max_lag <= minimum {
        return None;
    }
    let m = mean(data);
    let centered = data.iter().map(|x| x - m).collect::<Vec<_>>();
    let variance = centered.iter().map(|x| x * x).sum::<f64>() / n as f64;
    if variance == 0.0 {
        return None;
    }
    let mut best_lag = 0;
    let mut best = f64::NEG_INFINITY;
    for lag in (minimum + 1)..=max_lag {
        let raw: f64 = (0..n - lag).map(|i| centered[i] * centered[i + lag]).sum();
        let coefficient = raw / (variance * (n - lag) as f64);
        if coefficient > best {
            best = coefficient;
            best_lag = lag;
        }
    }
    (best > 0.5).then_some(best_lag)
}
