//! Strike and volatility at each grid delta for one expiration.
//!
//! Only put quotes are sampled: the exchange marks puts and calls at the
//! same strike with the same implied vol, and put deltas map directly onto
//! neg-put-delta. Grid points outside the observed delta range are clamped
//! to the nearest observed delta before interpolation and flagged as
//! extrapolated, so the interpolator is only ever queried inside its range.

use serde::{Deserialize, Serialize};

use crate::conventions::neg_put_delta;
use crate::error::{self, DeltaSurfError};
use crate::market::ExpirySlice;
use crate::surface::grid::DeltaGrid;
use crate::surface::interp::Interpolator;
use crate::types::{Strike, Vol};

/// Interpolated market data at one grid delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfacePoint {
    /// Desk label, e.g. `25P`.
    pub label: String,
    /// Target grid neg-put-delta.
    pub neg_put_delta: f64,
    /// Neg-put-delta actually interpolated at, after clamping.
    pub clamped_neg_put_delta: f64,
    pub strike: Strike,
    pub volatility: Vol,
    /// True when the grid delta lay outside the observed put delta range.
    pub extrapolated: bool,
}

/// Interpolate strike and vol at every grid point from the slice's puts.
///
/// # Errors
/// - [`DeltaSurfError::EmptySlice`] if the slice has no puts
/// - [`DeltaSurfError::InvalidInput`] if a put delta is not finite
/// - [`DeltaSurfError::InsufficientData`] if the puts span fewer than two
///   distinct deltas
pub fn build_slice(
    slice: &ExpirySlice,
    grid: &DeltaGrid,
    interpolator: &dyn Interpolator,
) -> error::Result<Vec<SurfacePoint>> {
    let expiration = slice.expiration_timestamp();
    let puts = slice.puts();
    if puts.is_empty() {
        return Err(DeltaSurfError::EmptySlice {
            expiration_timestamp: expiration,
            side: "put",
        });
    }

    if let Some(t) = puts.iter().find(|t| !t.delta.is_finite()) {
        return Err(DeltaSurfError::InvalidInput {
            message: format!("{} has non-finite delta {}", t.instrument_name, t.delta),
        });
    }

    let md_npd: Vec<f64> = puts.iter().map(|t| neg_put_delta(t.delta)).collect();
    let md_strike: Vec<f64> = puts.iter().map(|t| t.strike).collect();
    let md_vol: Vec<f64> = puts.iter().map(|t| t.implied_volatility).collect();

    let lo = md_npd.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = md_npd.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let strike_curve = interpolator
        .fit(&md_npd, &md_strike)
        .map_err(|e| e.at_expiration(expiration))?;
    let vol_curve = interpolator
        .fit(&md_npd, &md_vol)
        .map_err(|e| e.at_expiration(expiration))?;

    #[cfg(feature = "logging")]
    tracing::debug!(
        expiration,
        n_puts = puts.len(),
        npd_min = lo,
        npd_max = hi,
        "building slice"
    );

    grid.iter()
        .map(|(npd, label)| -> error::Result<SurfacePoint> {
            let extrapolated = npd < lo || npd > hi;
            let clamped = npd.clamp(lo, hi);
            Ok(SurfacePoint {
                label: label.to_string(),
                neg_put_delta: npd,
                clamped_neg_put_delta: clamped,
                strike: Strike(strike_curve.eval(clamped)?),
                volatility: Vol(vol_curve.eval(clamped)?),
                extrapolated,
            })
        })
        .collect()
}
