//! One-dimensional interpolation strategies.
//!
//! An [`Interpolator`] fits observed `(x, y)` samples into an [`Interpolant`]
//! that can be queried anywhere. The default [`LinearInterpolator`] is
//! piecewise linear inside the sample range and flat outside it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{self, DeltaSurfError};

/// A fitted curve `x → y`.
pub trait Interpolant: Send + Sync + fmt::Debug {
    /// Value at `query`.
    fn eval(&self, query: f64) -> error::Result<f64>;

    /// Values at each query, failing on the first error.
    fn eval_many(&self, queries: &[f64]) -> error::Result<Vec<f64>> {
        queries.iter().map(|&q| self.eval(q)).collect()
    }
}

/// Strategy that turns observed samples into an [`Interpolant`].
///
/// Samples need not be sorted.
pub trait Interpolator: Send + Sync + fmt::Debug {
    /// Fit `y` against `x`.
    ///
    /// # Errors
    /// Implementations return [`DeltaSurfError::InsufficientData`] when the
    /// samples cannot define a curve.
    fn fit(&self, x: &[f64], y: &[f64]) -> error::Result<Box<dyn Interpolant>>;
}

/// What to do with queries outside the observed range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extrapolation {
    /// Return the value at the nearest boundary sample.
    #[default]
    Flat,
    /// Fail with [`DeltaSurfError::InvalidInput`].
    Reject,
}

/// Piecewise-linear interpolation with a configurable extrapolation policy.
///
/// # Examples
/// ```
/// use deltasurf::surface::{Interpolator, LinearInterpolator};
///
/// let curve = LinearInterpolator::default().fit(&[0.5, 0.1, 0.9], &[60.0, 80.0, 75.0])?;
/// assert_eq!(curve.eval(0.5)?, 60.0);
/// assert!((curve.eval(0.3)? - 70.0).abs() < 1e-12);
/// assert_eq!(curve.eval(0.0)?, 80.0);
/// # Ok::<(), deltasurf::DeltaSurfError>(())
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinearInterpolator {
    extrapolation: Extrapolation,
}

impl LinearInterpolator {
    pub fn new(extrapolation: Extrapolation) -> Self {
        Self { extrapolation }
    }

    pub fn extrapolation(&self) -> Extrapolation {
        self.extrapolation
    }
}

impl Interpolator for LinearInterpolator {
    fn fit(&self, x: &[f64], y: &[f64]) -> error::Result<Box<dyn Interpolant>> {
        Ok(Box::new(LinearInterpolant::new(x, y, self.extrapolation)?))
    }
}

/// Sorted samples of a piecewise-linear curve.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearInterpolant {
    xs: Vec<f64>,
    ys: Vec<f64>,
    extrapolation: Extrapolation,
}

impl LinearInterpolant {
    /// Sort the samples by `x` once.
    ///
    /// # Errors
    /// Returns [`DeltaSurfError::InvalidInput`] for mismatched lengths or
    /// non-finite samples, and [`DeltaSurfError::InsufficientData`] when
    /// fewer than two distinct `x` values are given.
    pub fn new(x: &[f64], y: &[f64], extrapolation: Extrapolation) -> error::Result<Self> {
        if x.len() != y.len() {
            return Err(DeltaSurfError::InvalidInput {
                message: format!(
                    "x and y must have the same length, got {} and {}",
                    x.len(),
                    y.len()
                ),
            });
        }
        if let Some(v) = x.iter().chain(y).find(|v| !v.is_finite()) {
            return Err(DeltaSurfError::InvalidInput {
                message: format!("interpolation samples must be finite, got {v}"),
            });
        }

        let mut pairs: Vec<(f64, f64)> = x.iter().copied().zip(y.iter().copied()).collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (xs, ys): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();

        let distinct = 1 + xs.windows(2).filter(|w| w[1] > w[0]).count();
        if xs.is_empty() || distinct < 2 {
            return Err(DeltaSurfError::InsufficientData {
                message: format!(
                    "linear interpolation needs at least 2 distinct x values, got {}",
                    if xs.is_empty() { 0 } else { distinct }
                ),
                expiration_timestamp: None,
            });
        }

        Ok(Self {
            xs,
            ys,
            extrapolation,
        })
    }

    /// Smallest and largest observed `x`.
    pub fn domain(&self) -> (f64, f64) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }

    fn boundary(&self, query: f64, index: usize) -> error::Result<f64> {
        match self.extrapolation {
            Extrapolation::Flat => Ok(self.ys[index]),
            Extrapolation::Reject => Err(DeltaSurfError::InvalidInput {
                message: format!(
                    "query {query} outside interpolation range [{}, {}]",
                    self.xs[0],
                    self.xs[self.xs.len() - 1]
                ),
            }),
        }
    }
}

impl Interpolant for LinearInterpolant {
    fn eval(&self, query: f64) -> error::Result<f64> {
        if query.is_nan() {
            return Err(DeltaSurfError::InvalidInput {
                message: "interpolation query is NaN".into(),
            });
        }
        let n = self.xs.len();
        if query < self.xs[0] {
            return self.boundary(query, 0);
        }
        if query > self.xs[n - 1] {
            return self.boundary(query, n - 1);
        }

        let right = self.xs.partition_point(|&x| x < query);
        // Exact hits return the sample itself.
        if self.xs[right] == query {
            return Ok(self.ys[right]);
        }
        let left = right - 1;
        let alpha = (query - self.xs[left]) / (self.xs[right] - self.xs[left]);
        Ok(self.ys[left] + alpha * (self.ys[right] - self.ys[left]))
    }
}
