//! ATMF / risk reversal / butterfly decomposition of a symmetric slice.
//!
//! For a call-side grid index `i` and its put-side mirror `m`:
//!
//! ```text
//! RR(i)  = σ(i) − σ(m)
//! FLY(i) = ½(σ(i) + σ(m)) − σ(ATMF)
//! ```
//!
//! A risk reversal is extrapolated if either leg is; a butterfly also
//! inherits the ATMF flag. Wings are listed from the money outward.

use serde::{Deserialize, Serialize};

use crate::conventions::{self, FLY, RR};
use crate::error::{self, DeltaSurfError};
use crate::surface::slice::SurfacePoint;
use crate::types::Vol;

/// A volatility quote with its extrapolation provenance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub volatility: Vol,
    pub extrapolated: bool,
}

/// Risk reversal and butterfly for one symmetric delta pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WingQuote {
    /// Whole-percent delta of the wing, e.g. `25`.
    pub label: String,
    pub risk_reversal: Quote,
    pub butterfly: Quote,
}

impl WingQuote {
    /// Column name of the risk reversal, e.g. `25RR`.
    pub fn rr_column(&self) -> String {
        format!("{}{RR}", self.label)
    }

    /// Column name of the butterfly, e.g. `25FLY`.
    pub fn fly_column(&self) -> String {
        format!("{}{FLY}", self.label)
    }
}

/// ATMF plus one [`WingQuote`] per delta pair, innermost first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decomposition {
    pub atmf: Quote,
    pub wings: Vec<WingQuote>,
}

impl Decomposition {
    /// Look up a column by name: `ATMF`, `<n>RR` or `<n>FLY`.
    pub fn quote(&self, column: &str) -> Option<Quote> {
        if column == conventions::ATMF {
            return Some(self.atmf);
        }
        self.wings.iter().find_map(|w| {
            if column == w.rr_column() {
                Some(w.risk_reversal)
            } else if column == w.fly_column() {
                Some(w.butterfly)
            } else {
                None
            }
        })
    }
}

/// Fold a symmetric slice (grid order, ATMF in the middle) into ATMF/RR/FLY.
///
/// # Errors
/// Returns [`DeltaSurfError::InvalidInput`] if `points` is empty or has even
/// length.
pub fn decompose(points: &[SurfacePoint]) -> error::Result<Decomposition> {
    let n = points.len();
    if n % 2 == 0 {
        return Err(DeltaSurfError::InvalidInput {
            message: format!("decomposition needs an odd number of grid points, got {n}"),
        });
    }
    let i_atm = n / 2;
    let atm = &points[i_atm];

    let wings = (1..=i_atm)
        .map(|offset| {
            let call = &points[i_atm + offset];
            let put = &points[n - 1 - (i_atm + offset)];
            let rr_extrapolated = call.extrapolated || put.extrapolated;
            WingQuote {
                label: conventions::wing_label(call.neg_put_delta),
                risk_reversal: Quote {
                    volatility: Vol(call.volatility.0 - put.volatility.0),
                    extrapolated: rr_extrapolated,
                },
                butterfly: Quote {
                    volatility: Vol(0.5 * (call.volatility.0 + put.volatility.0) - atm.volatility.0),
                    extrapolated: rr_extrapolated || atm.extrapolated,
                },
            }
        })
        .collect();

    Ok(Decomposition {
        atmf: Quote {
            volatility: atm.volatility,
            extrapolated: atm.extrapolated,
        },
        wings,
    })
}
