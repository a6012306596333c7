//! Core domain types for delta surface construction.
//!
//! Interpolated outputs use newtypes ([`Strike`], [`Vol`]) so a strike read
//! off the surface can't be passed where a volatility is expected. Inputs
//! (raw quotes, grid values) stay bare `f64` and are validated where they
//! enter the crate.
//!
//! These types wrap `f64`, so they derive `PartialEq` and `PartialOrd` only.

use serde::{Deserialize, Serialize};

/// Strike price `K` of an option contract.
///
/// # Examples
/// ```
/// use deltasurf::types::Strike;
/// let strike = Strike(60_000.0);
/// assert_eq!(strike.0, 60_000.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Strike(pub f64);

/// Implied volatility `σ` in the units quoted by the data source.
///
/// Deribit quotes `mark_iv` in percent, so a value of 65.0 means 65%
/// annualized. The surface never rescales volatilities.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Vol(pub f64);

/// Option type: call or put.
///
/// Serialized lowercase to match exchange payloads (`"put"`, `"call"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    /// Right to buy at strike price.
    Call,
    /// Right to sell at strike price.
    Put,
}

impl OptionType {
    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionType::Call => "call",
            OptionType::Put => "put",
        }
    }
}
