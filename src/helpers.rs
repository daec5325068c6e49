use thiserror::Error;

/// Top-level errors for segmentation, discretisation and pattern models.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HpmError {
    /// Malformed arguments: wrong shape, empty chain, non-positive sizes.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Comparing nodes of different variants, depths or threshold
    /// configurations, or a match that violates the matching-relation
    /// invariant.
    #[error("incomparable: {0}")]
    Incomparable(String),
    /// A position out of bounds or a broken internal invariant.
    #[error("internal error: {0}")]
    Internal(String),
}

/// The arithmetic mean of a slice. Zero for an empty slice.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        0.0
    } else {
        data.iter().sum::<f64>() / data.len() as f64
    }
}

/// The population standard deviation of a slice.
pub fn std_dev(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let m = mean(data);
    (data.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / data.len() as f64).sqrt()
}

/// Z-score normalisation. A sequence with zero variance maps to the zero
/// vector instead of dividing by zero.
pub fn normalise(data: &[f64]) -> Result<Vec<f64>, HpmError> {
    if data.is_empty() {
        return Err(HpmError::InvalidInput(
            "cannot normalise an empty sequence".into(),
        ));
    }
    let sd = std_dev(data);
    if sd == 0.0 {
        return Ok(vec![0.0; data.len()]);
    }
    let m = mean(data);
    Ok(data.iter().map(|x| (x - m) / sd).collect())
}

/// Divide `[begin, end)` into `number` equally sized half-open frames.
///
/// Frame boundaries are computed with a real-valued step and truncated, so
/// lengths may differ by one when `number` does not divide the range.
pub fn divide(begin: usize, end: usize, number: usize) -> Result<Vec<(usize, usize)>, HpmError> {
    if number < 1 {
        return Err(HpmError::InvalidInput(format!(
            "amount of frames must be greater than 0, got {number}"
        )));
    }
    if number > end - begin {
        return Err(HpmError::InvalidInput(format!(
            "amount of frames must be at most the sequence length ({}), got {number}",
            end - begin
        )));
    }
    if number == 1 {
        return Ok(vec![(begin, end)]);
    }
    let step = (end - begin) as f64 / number as f64;
    Ok((0..number)
        .map(|frame| {
            (
                (begin as f64 + frame as f64 * step) as usize,
                (begin as f64 + (frame + 1) as f64 * step) as usize,
            )
        })
        .collect())
}

/// Ordinary least squares fit of a line through `(0, y[0]), (1, y[1]), ...`.
/// Returns `(slope, intercept)`. A single point fits a flat line through it.
pub fn line_fit(y: &[f64]) -> (f64, f64) {
    let n = y.len();
    if n <= 1 {
        return (0.0, y.first().copied().unwrap_or(0.0));
    }
    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = mean(y);
    let mut cov = 0.0;
    let mut var = 0.0;
    for (i, value) in y.iter().enumerate() {
        let dx = i as f64 - x_mean;
        cov += dx * (value - y_mean);
        var += dx * dx;
    }
    let slope = cov / var;
    (slope, y_mean - slope * x_mean)
}

/// The quantile function of the standard normal distribution.
///
/// Acklam's rational approximation (relative error below 1.15e-9 across the
/// open unit interval), with the tail branches for extreme probabilities.
/// Probabilities outside (0, 1) yield infinities.
pub fn norm_quantile(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];
    const P_LOW: f64 = 0.02425;

    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }
    if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    }
}
