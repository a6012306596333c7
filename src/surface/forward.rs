//! Forward estimation per expiration.

use crate::error::{self, DeltaSurfError};
use crate::market::ExpirySlice;

/// Forward price of an expiration: the mean underlying price over all of its
/// ticks, puts and calls alike.
///
/// # Errors
/// Returns [`DeltaSurfError::EmptySlice`] if the slice has no ticks.
pub fn estimate_forward(slice: &ExpirySlice) -> error::Result<f64> {
    if slice.is_empty() {
        return Err(DeltaSurfError::EmptySlice {
            expiration_timestamp: slice.expiration_timestamp(),
            side: "any",
        });
    }
    let sum: f64 = slice.ticks().map(|t| t.underlying_price).sum();
    Ok(sum / slice.len() as f64)
}
