//! Market conventions for delta-quoted surfaces.
//!
//! Moneyness is expressed as negative put delta (npd): 0 is the deep put
//! wing, 1 the deep call wing, 0.5 at-the-money-forward. Grid points and
//! summary columns are labelled the way option desks quote them: `10P`,
//! `25P`, `ATMF`, `25C`, `10C`, and `25RR` / `25FLY` for the wings.

use crate::error::{self, DeltaSurfError};

/// At-the-money-forward label.
pub const ATMF: &str = "ATMF";
/// Risk reversal column suffix.
pub const RR: &str = "RR";
/// Butterfly column suffix.
pub const FLY: &str = "FLY";
/// Put-wing label suffix.
pub const PUT_SUFFIX: &str = "P";
/// Call-wing label suffix.
pub const CALL_SUFFIX: &str = "C";

/// The at-the-money-forward neg-put-delta.
pub const ATMF_NEG_PUT_DELTA: f64 = 0.5;

/// Absolute tolerance for treating a neg-put-delta as ATMF.
pub const ATMF_TOLERANCE: f64 = 1e-12;

/// Summary table column groups.
pub mod columns {
    pub const FORWARD: &str = "forward";
    pub const NEG_PUT_DELTA: &str = "neg_put_delta";
    pub const STRIKE: &str = "strike";
    pub const VOLATILITY: &str = "volatility";
    pub const EXTRAPOLATED: &str = "extrapolated";
    pub const VOLATILITY_ARF: &str = "volatility_arf";
    pub const EXTRAPOLATED_ARF: &str = "extrapolated_arf";
}

/// Convert a put delta (negative by convention) to neg-put-delta: npd = −Δ.
pub fn neg_put_delta(put_delta: f64) -> f64 {
    -put_delta
}

/// Format a fraction as a whole percent: `0.1 → "10"`.
///
/// Halves round to even, so `0.125 → "12"`.
pub fn percent_label(x: f64) -> String {
    format!("{}", (x * 100.0).round_ties_even() as i64)
}

/// Desk label of a neg-put-delta: `ATMF`, `<n>P` below 0.5, `<n>C` above.
///
/// Values within [`ATMF_TOLERANCE`] of 0.5 are always `ATMF`.
///
/// # Errors
/// Returns [`DeltaSurfError::InvalidInput`] for NaN, the only value that is
/// neither near, below nor above 0.5.
///
/// # Examples
/// ```
/// use deltasurf::conventions::delta_label;
/// assert_eq!(delta_label(0.10)?, "10P");
/// assert_eq!(delta_label(0.5)?, "ATMF");
/// assert_eq!(delta_label(0.75)?, "25C");
/// # Ok::<(), deltasurf::DeltaSurfError>(())
/// ```
pub fn delta_label(npd: f64) -> error::Result<String> {
    if (npd - ATMF_NEG_PUT_DELTA).abs() < ATMF_TOLERANCE {
        Ok(ATMF.to_string())
    } else if npd < ATMF_NEG_PUT_DELTA {
        Ok(percent_label(npd) + PUT_SUFFIX)
    } else if npd > ATMF_NEG_PUT_DELTA {
        Ok(percent_label(1.0 - npd) + CALL_SUFFIX)
    } else {
        Err(DeltaSurfError::InvalidInput {
            message: format!("neg-put-delta {npd} has no label"),
        })
    }
}

/// Wing label of a call-side grid point: `0.75 → "25"`.
pub fn wing_label(call_npd: f64) -> String {
    percent_label(1.0 - call_npd)
}
