//! # deltasurf
//!
//! Delta-quoted implied volatility surface summaries from raw option quotes.
//!
//! Takes one exchange snapshot of an option chain and produces, per
//! expiration: the forward, strike and vol at a symmetric grid of deltas
//! (`10P`, `25P`, `ATMF`, `25C`, `10C`, …), and the desk decomposition into
//! ATMF vol, risk reversals and butterflies. Every interpolated value carries
//! a flag telling whether it was extrapolated beyond the quoted deltas.
//!
//! ## Architecture
//!
//! - **`market`**: snapshot records and the tick normalizer
//! - **`surface`**: forward estimation, delta grid, interpolation, slice
//!   building, decomposition and assembly
//! - **`conventions`**: labels and column names
//!
//! ## Design
//!
//! - **All or nothing.** A build returns a surface covering every quoted
//!   expiration or a single [`DeltaSurfError`]; library code never panics.
//! - **Immutable surfaces.** Rows are created once by the builder.
//! - **Pluggable interpolation.** Any [`Interpolator`](surface::Interpolator)
//!   can replace the default piecewise-linear, flat-extrapolating one.
//! - **Parallel by expiration.** With the `parallel` feature, expirations
//!   are built concurrently with rayon.
//! - **Serializable.** Inputs and outputs implement Serde traits; the grid
//!   and configuration validate on deserialization.

pub mod conventions;
pub mod error;
pub mod market;
pub mod surface;
pub mod types;
mod validate;

#[doc(inline)]
pub use error::{DeltaSurfError, Result};
#[doc(inline)]
pub use market::OptionChainSnapshot;
#[doc(inline)]
pub use surface::{DeltaSurface, DeltaSurfaceBuilder};
#[doc(inline)]
pub use types::{OptionType, Strike, Vol};
