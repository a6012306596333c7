//! Symmetric target grid of neg-put-deltas.
//!
//! A half grid such as `[0.10, 0.25]` expands to
//! `[0.10, 0.25, 0.50, 0.75, 0.90]`: the sorted half, ATMF, then the
//! mirrored call wing. The grid always has odd length with 0.5 in the
//! middle, and every point carries its desk label (`10P` … `10C`).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::conventions::{self, ATMF_NEG_PUT_DELTA};
use crate::error::{self, DeltaSurfError};

/// Half grid used when none is configured.
pub const DEFAULT_HALF_GRID: [f64; 2] = [0.10, 0.25];

/// Full symmetric neg-put-delta grid with labels.
///
/// Serializes as its half grid and validates on deserialization.
///
/// # Examples
/// ```
/// use deltasurf::surface::DeltaGrid;
///
/// let grid = DeltaGrid::from_half_grid(&[0.25, 0.10])?;
/// assert_eq!(grid.labels(), ["10P", "25P", "ATMF", "25C", "10C"]);
/// assert_eq!(grid.atm_index(), 2);
/// # Ok::<(), deltasurf::DeltaSurfError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct DeltaGrid {
    half: Vec<f64>,
    values: Vec<f64>,
    labels: Vec<String>,
}

impl DeltaGrid {
    /// Expand a half grid into the full symmetric grid.
    ///
    /// An empty half grid yields the single-point grid `[0.5]`.
    ///
    /// # Errors
    /// Returns [`DeltaSurfError::Configuration`] if a value is non-finite or
    /// outside (0, 0.5), values repeat, or two grid points would share a label.
    pub fn from_half_grid(half_grid: &[f64]) -> error::Result<Self> {
        for &v in half_grid {
            if !v.is_finite() || v <= 0.0 || v >= ATMF_NEG_PUT_DELTA {
                return Err(DeltaSurfError::Configuration {
                    message: format!("half grid values must lie in (0, 0.5), got {v}"),
                });
            }
        }

        let mut half = half_grid.to_vec();
        half.sort_by(f64::total_cmp);
        if let Some(w) = half.windows(2).find(|w| w[0] == w[1]) {
            return Err(DeltaSurfError::Configuration {
                message: format!("half grid contains duplicate value {}", w[0]),
            });
        }

        let values: Vec<f64> = half
            .iter()
            .copied()
            .chain(std::iter::once(ATMF_NEG_PUT_DELTA))
            .chain(half.iter().rev().map(|&v| 1.0 - v))
            .collect();

        let labels = values
            .iter()
            .map(|&v| conventions::delta_label(v))
            .collect::<error::Result<Vec<_>>>()?;
        let mut seen = HashSet::with_capacity(labels.len());
        if let Some(dup) = labels.iter().find(|l| !seen.insert(l.as_str())) {
            return Err(DeltaSurfError::Configuration {
                message: format!("half grid {half:?} maps two grid points to label {dup}"),
            });
        }

        Ok(Self {
            half,
            values,
            labels,
        })
    }

    /// Sorted half grid this grid was built from.
    pub fn half(&self) -> &[f64] {
        &self.half
    }

    /// Grid neg-put-deltas, strictly increasing.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Labels aligned with [`values`](Self::values).
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false: a grid holds at least the ATMF point.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Index of the ATMF point, `len / 2`.
    pub fn atm_index(&self) -> usize {
        self.values.len() / 2
    }

    /// Index of the point symmetric to `index` around ATMF.
    pub fn mirror(&self, index: usize) -> usize {
        self.values.len() - 1 - index
    }

    /// Number of symmetric wing pairs.
    pub fn wing_count(&self) -> usize {
        self.half.len()
    }

    /// `(npd, label)` pairs in grid order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, &str)> {
        self.values
            .iter()
            .copied()
            .zip(self.labels.iter().map(String::as_str))
    }
}

impl Default for DeltaGrid {
    fn default() -> Self {
        let half = DEFAULT_HALF_GRID.to_vec();
        let values = vec![0.10, 0.25, ATMF_NEG_PUT_DELTA, 0.75, 0.90];
        let labels = ["10P", "25P", conventions::ATMF, "25C", "10C"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        Self {
            half,
            values,
            labels,
        }
    }
}

impl TryFrom<Vec<f64>> for DeltaGrid {
    type Error = DeltaSurfError;
    fn try_from(half: Vec<f64>) -> Result<Self, Self::Error> {
        Self::from_half_grid(&half)
    }
}

impl From<DeltaGrid> for Vec<f64> {
    fn from(grid: DeltaGrid) -> Self {
        grid.half
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn default_half_grid_expands_to_five_points() {
        let grid = DeltaGrid::from_half_grid(&DEFAULT_HALF_GRID).unwrap();
        let expected = [0.10, 0.25, 0.50, 0.75, 0.90];
        assert_eq!(grid.len(), 5);
        for (got, want) in grid.values().iter().zip(expected) {
            assert_abs_diff_eq!(*got, want, epsilon = 1e-15);
        }
        assert_eq!(grid.labels(), ["10P", "25P", "ATMF", "25C", "10C"]);
    }

    #[test]
    fn default_matches_built_grid() {
        let built = DeltaGrid::from_half_grid(&DEFAULT_HALF_GRID).unwrap();
        let default = DeltaGrid::default();
        assert_eq!(built.labels(), default.labels());
        assert_eq!(built.half(), default.half());
        for (a, b) in built.values().iter().zip(default.values()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-15);
        }
    }

    #[test]
    fn unsorted_half_grid_is_sorted() {
        let grid = DeltaGrid::from_half_grid(&[0.25, 0.05, 0.10]).unwrap();
        assert_eq!(grid.half(), [0.05, 0.10, 0.25]);
        assert_eq!(grid.atm_index(), 3);
        assert_eq!(grid.values()[3], 0.5);
        assert_eq!(grid.labels()[6], "5C");
    }

    #[test]
    fn mirror_indices() {
        let grid = DeltaGrid::default();
        assert_eq!(grid.mirror(0), 4);
        assert_eq!(grid.mirror(3), 1);
        assert_eq!(grid.mirror(grid.atm_index()), grid.atm_index());
        assert_eq!(grid.wing_count(), 2);
    }

    #[test]
    fn empty_half_grid_is_atmf_only() {
        let grid = DeltaGrid::from_half_grid(&[]).unwrap();
        assert_eq!(grid.values(), [0.5]);
        assert_eq!(grid.labels(), ["ATMF"]);
        assert_eq!(grid.wing_count(), 0);
    }

    #[test]
    fn rejects_out_of_range_values() {
        for bad in [0.0, 0.5, 0.6, -0.1, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(
                    DeltaGrid::from_half_grid(&[0.1, bad]),
                    Err(DeltaSurfError::Configuration { .. })
                ),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_duplicates() {
        assert!(matches!(
            DeltaGrid::from_half_grid(&[0.25, 0.1, 0.25]),
            Err(DeltaSurfError::Configuration { .. })
        ));
    }

    #[test]
    fn rejects_label_collisions() {
        // 0.101 and 0.104 both read "10P".
        assert!(matches!(
            DeltaGrid::from_half_grid(&[0.101, 0.104]),
            Err(DeltaSurfError::Configuration { .. })
        ));
    }

    #[test]
    fn serde_uses_half_grid() {
        let grid: DeltaGrid = serde_json::from_str("[0.25, 0.1]").unwrap();
        assert_eq!(grid.labels().len(), 5);
        assert_eq!(serde_json::to_string(&grid).unwrap(), "[0.1,0.25]");
        assert!(serde_json::from_str::<DeltaGrid>("[0.7]").is_err());
    }
}
