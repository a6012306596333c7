//! Delta surface construction.
//!
//! Each expiration is processed independently:
//!
//! 1. [`forward`]: mean underlying price of the expiry's quotes
//! 2. [`slice`]: strike and vol at each [`DeltaGrid`] point, interpolated
//!    from put quotes with an [`Interpolator`]
//! 3. [`decompose`]: ATMF, risk reversal and butterfly per wing
//!
//! [`summary`] assembles the rows into a [`DeltaSurface`], and
//! [`DeltaSurfaceBuilder`] drives the whole pipeline.

pub mod builder;
pub mod decompose;
pub mod forward;
pub mod grid;
pub mod interp;
pub mod slice;
pub mod summary;

pub use builder::{DeltaSurfaceBuilder, SurfaceConfig};
pub use decompose::{Decomposition, Quote, WingQuote, decompose};
pub use forward::estimate_forward;
pub use grid::{DEFAULT_HALF_GRID, DeltaGrid};
pub use interp::{Extrapolation, Interpolant, Interpolator, LinearInterpolant, LinearInterpolator};
pub use slice::{SurfacePoint, build_slice};
pub use summary::{Cell, ColumnKey, DeltaSurface, SummaryTable, SurfaceRow};
