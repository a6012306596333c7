//! Builder API for delta surface construction.
//!
//! ```
//! use deltasurf::market::OptionChainSnapshot;
//! use deltasurf::surface::DeltaSurfaceBuilder;
//!
//! let snapshot = OptionChainSnapshot::from_json(r#"{
//!     "instruments": [
//!         {"instrument_name": "BTC-P1", "expiration_timestamp": 1711699200000, "strike": 50000.0, "option_type": "put"},
//!         {"instrument_name": "BTC-P2", "expiration_timestamp": 1711699200000, "strike": 60000.0, "option_type": "put"}
//!     ],
//!     "tickers": [
//!         {"instrument_name": "BTC-P1", "mark_iv": 70.0, "underlying_price": 61000.0, "greeks": {"delta": -0.08}},
//!         {"instrument_name": "BTC-P2", "mark_iv": 55.0, "underlying_price": 61010.0, "greeks": {"delta": -0.45}}
//!     ]
//! }"#)?;
//!
//! let surface = DeltaSurfaceBuilder::new()
//!     .name("BTC")
//!     .as_of(1_709_000_000_000)
//!     .half_grid(&[0.10, 0.25])
//!     .build(&snapshot)?;
//!
//! let row = &surface.rows()[0];
//! assert_eq!(row.forward, 61005.0);
//! assert!(row.point("10C").unwrap().extrapolated);
//! # Ok::<(), deltasurf::DeltaSurfError>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{self, DeltaSurfError};
use crate::market::{self, ExpirySlice, NormalizedChain, OptionChainSnapshot};
use crate::surface::decompose::decompose;
use crate::surface::forward::estimate_forward;
use crate::surface::grid::{DEFAULT_HALF_GRID, DeltaGrid};
use crate::surface::interp::{Extrapolation, Interpolator, LinearInterpolator};
use crate::surface::slice::build_slice;
use crate::surface::summary::{DeltaSurface, SurfaceRow};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Serializable surface settings.
///
/// ```
/// use deltasurf::surface::{Extrapolation, SurfaceConfig};
///
/// let config = SurfaceConfig::from_json(r#"{"target_half_grid": [0.05, 0.25]}"#)?;
/// assert_eq!(config.target_half_grid.labels()[0], "5P");
/// assert_eq!(config.extrapolation, Extrapolation::Flat);
/// # Ok::<(), deltasurf::DeltaSurfError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SurfaceConfig {
    /// Half grid of neg-put-deltas to quote, validated on parse.
    pub target_half_grid: DeltaGrid,
    /// Interpolator policy outside the observed delta range.
    pub extrapolation: Extrapolation,
}

impl SurfaceConfig {
    /// Parse settings from JSON; missing fields take their defaults.
    ///
    /// # Errors
    /// Returns [`DeltaSurfError::Configuration`] on malformed JSON, unknown
    /// fields or an invalid half grid.
    pub fn from_json(json: &str) -> error::Result<Self> {
        serde_json::from_str(json).map_err(|e| DeltaSurfError::Configuration {
            message: format!("invalid surface configuration: {e}"),
        })
    }
}

/// Builder for delta surfaces.
///
/// Collects the surface identity and settings, then builds one surface per
/// snapshot. The same builder can be reused across snapshots.
#[derive(Debug)]
pub struct DeltaSurfaceBuilder {
    name: String,
    as_of_timestamp: Option<i64>,
    half_grid: Vec<f64>,
    extrapolation: Extrapolation,
    interpolator: Option<Box<dyn Interpolator>>,
}

impl DeltaSurfaceBuilder {
    /// A builder with the default half grid `[0.10, 0.25]` and flat
    /// linear interpolation.
    pub fn new() -> Self {
        Self {
            name: String::new(),
            as_of_timestamp: None,
            half_grid: DEFAULT_HALF_GRID.to_vec(),
            extrapolation: Extrapolation::default(),
            interpolator: None,
        }
    }

    /// Surface name, e.g. the underlying currency.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Snapshot time in integer epoch milliseconds. Required.
    pub fn as_of(mut self, timestamp: i64) -> Self {
        self.as_of_timestamp = Some(timestamp);
        self
    }

    /// Half grid of neg-put-deltas, each in (0, 0.5).
    pub fn half_grid(mut self, half_grid: &[f64]) -> Self {
        self.half_grid = half_grid.to_vec();
        self
    }

    /// Extrapolation policy of the default linear interpolator.
    ///
    /// Ignored when a custom [`interpolator`](Self::interpolator) is set.
    pub fn extrapolation(mut self, extrapolation: Extrapolation) -> Self {
        self.extrapolation = extrapolation;
        self
    }

    /// Replace the default [`LinearInterpolator`].
    pub fn interpolator(mut self, interpolator: Box<dyn Interpolator>) -> Self {
        self.interpolator = Some(interpolator);
        self
    }

    /// Apply a [`SurfaceConfig`].
    pub fn config(mut self, config: SurfaceConfig) -> Self {
        self.half_grid = config.target_half_grid.half().to_vec();
        self.extrapolation = config.extrapolation;
        self
    }

    /// Normalize a snapshot and build its surface.
    ///
    /// # Errors
    /// See [`build_from_chain`](Self::build_from_chain); additionally returns
    /// [`DeltaSurfError::InvalidInput`] for tickers with missing or
    /// out-of-range quote fields.
    pub fn build(&self, snapshot: &OptionChainSnapshot) -> error::Result<DeltaSurface> {
        let chain = market::normalize(snapshot)?;
        self.build_from_chain(&chain)
    }

    /// Build a surface from an already normalized chain.
    ///
    /// Every expiration must succeed; the first failure aborts the build.
    ///
    /// # Errors
    /// - [`DeltaSurfError::Configuration`] if the as-of timestamp is missing
    ///   or negative, or the half grid is invalid
    /// - [`DeltaSurfError::InvalidInput`] if the chain has no expirations
    /// - [`DeltaSurfError::EmptySlice`] if an expiration has no put quotes
    /// - [`DeltaSurfError::InsufficientData`] if an expiration's puts span
    ///   fewer than two distinct deltas
    pub fn build_from_chain(&self, chain: &NormalizedChain) -> error::Result<DeltaSurface> {
        let as_of_timestamp = self.as_of_timestamp.ok_or_else(|| DeltaSurfError::Configuration {
            message: "as-of timestamp is required".into(),
        })?;
        if as_of_timestamp < 0 {
            return Err(DeltaSurfError::Configuration {
                message: format!("as-of timestamp must be non-negative, got {as_of_timestamp}"),
            });
        }
        let grid = DeltaGrid::from_half_grid(&self.half_grid)?;
        if chain.is_empty() {
            return Err(DeltaSurfError::InvalidInput {
                message: "snapshot contains no quoted expirations".into(),
            });
        }

        let default_interpolator = LinearInterpolator::new(self.extrapolation);
        let interpolator: &dyn Interpolator = match &self.interpolator {
            Some(custom) => custom.as_ref(),
            None => &default_interpolator,
        };

        #[cfg(feature = "logging")]
        tracing::debug!(
            name = %self.name,
            as_of_timestamp,
            n_expirations = chain.len(),
            grid = ?grid.labels(),
            "surface build started"
        );

        let build_row = |slice: &ExpirySlice| -> error::Result<SurfaceRow> {
            let forward = estimate_forward(slice)?;
            let points = build_slice(slice, &grid, interpolator)?;
            let quotes = decompose(&points)?;
            Ok(SurfaceRow {
                expiration_timestamp: slice.expiration_timestamp(),
                forward,
                points,
                quotes,
            })
        };

        let slices: Vec<&ExpirySlice> = chain.slices().collect();

        #[cfg(feature = "parallel")]
        let rows: Vec<SurfaceRow> = slices
            .par_iter()
            .map(|slice| build_row(*slice))
            .collect::<error::Result<Vec<_>>>()?;
        #[cfg(not(feature = "parallel"))]
        let rows: Vec<SurfaceRow> = slices
            .iter()
            .map(|slice| build_row(*slice))
            .collect::<error::Result<Vec<_>>>()?;

        #[cfg(feature = "logging")]
        tracing::debug!(n_rows = rows.len(), "surface build complete");

        Ok(DeltaSurface::new(
            self.name.clone(),
            as_of_timestamp,
            grid,
            rows,
            chain.missing_instruments().to_vec(),
            chain.unmatched_tickers().to_vec(),
        ))
    }
}

impl Default for DeltaSurfaceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{Greeks, Instrument, Ticker};
    use crate::surface::interp::Interpolant;
    use crate::types::OptionType;
    use approx::assert_abs_diff_eq;

    const EXP_1: i64 = 1_711_699_200_000;
    const EXP_2: i64 = 1_714_118_400_000;
    const AS_OF: i64 = 1_709_000_000_000;

    fn quote(
        snap: &mut OptionChainSnapshot,
        exp: i64,
        strike: f64,
        ot: OptionType,
        delta: f64,
        iv: f64,
        underlying: f64,
    ) {
        let name = format!("BTC-{exp}-{strike}-{}", ot.as_str());
        snap.instruments.push(Instrument {
            instrument_name: name.clone(),
            expiration_timestamp: exp,
            strike,
            option_type: ot,
            base_currency: Some("BTC".into()),
            kind: Some("option".into()),
        });
        snap.tickers.push(Ticker {
            instrument_name: name,
            mark_iv: Some(iv),
            underlying_price: Some(underlying),
            greeks: Some(Greeks {
                delta: Some(delta),
                ..Greeks::default()
            }),
            ..Ticker::default()
        });
    }

    fn two_expiry_snapshot() -> OptionChainSnapshot {
        let mut snap = OptionChainSnapshot::default();
        // Later expiry first: output must still be ascending.
        quote(&mut snap, EXP_2, 8_000.0, OptionType::Put, -0.15, 0.85, 10_100.0);
        quote(&mut snap, EXP_2, 10_000.0, OptionType::Put, -0.50, 0.62, 10_100.0);
        quote(&mut snap, EXP_2, 12_000.0, OptionType::Put, -0.85, 0.70, 10_100.0);
        quote(&mut snap, EXP_1, 9_000.0, OptionType::Put, -0.05, 0.80, 10_000.0);
        quote(&mut snap, EXP_1, 10_000.0, OptionType::Put, -0.50, 0.60, 10_020.0);
        quote(&mut snap, EXP_1, 11_000.0, OptionType::Put, -0.95, 0.75, 9_980.0);
        quote(&mut snap, EXP_1, 11_000.0, OptionType::Call, 0.05, 0.75, 10_000.0);
        snap
    }

    fn builder() -> DeltaSurfaceBuilder {
        DeltaSurfaceBuilder::new().name("BTC").as_of(AS_OF)
    }

    #[test]
    fn builds_rows_in_expiration_order() {
        let surface = builder().build(&two_expiry_snapshot()).unwrap();
        assert_eq!(surface.name(), "BTC");
        assert_eq!(surface.as_of_timestamp(), AS_OF);
        assert_eq!(surface.expirations().collect::<Vec<_>>(), vec![EXP_1, EXP_2]);
        for row in surface.rows() {
            assert_eq!(row.points.len(), 5);
            assert_eq!(row.quotes.wings.len(), 2);
        }
    }

    #[test]
    fn forward_averages_all_quotes_of_the_expiry() {
        let surface = builder().build(&two_expiry_snapshot()).unwrap();
        assert_abs_diff_eq!(surface.row(EXP_1).unwrap().forward, 10_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(surface.row(EXP_2).unwrap().forward, 10_100.0, epsilon = 1e-9);
    }

    #[test]
    fn flags_follow_each_expiry_range() {
        let surface = builder().build(&two_expiry_snapshot()).unwrap();
        let r1 = surface.row(EXP_1).unwrap();
        assert!(r1.points.iter().all(|p| !p.extrapolated));
        let r2 = surface.row(EXP_2).unwrap();
        // Observed range [0.15, 0.85]: both 10-delta points are clamped.
        assert!(r2.point("10P").unwrap().extrapolated);
        assert!(r2.point("10C").unwrap().extrapolated);
        assert!(!r2.point("25P").unwrap().extrapolated);
        assert!(r2.quote("10FLY").unwrap().extrapolated);
        assert!(!r2.quote("25RR").unwrap().extrapolated);
    }

    #[test]
    fn missing_as_of_is_a_configuration_error() {
        let err = DeltaSurfaceBuilder::new().build(&two_expiry_snapshot()).unwrap_err();
        assert!(matches!(err, DeltaSurfError::Configuration { .. }));
        let err = DeltaSurfaceBuilder::new()
            .as_of(-1)
            .build(&two_expiry_snapshot())
            .unwrap_err();
        assert!(matches!(err, DeltaSurfError::Configuration { .. }));
    }

    #[test]
    fn invalid_half_grid_is_a_configuration_error() {
        let err = builder()
            .half_grid(&[0.25, 0.25])
            .build(&two_expiry_snapshot())
            .unwrap_err();
        assert!(matches!(err, DeltaSurfError::Configuration { .. }));
    }

    #[test]
    fn empty_snapshot_is_rejected() {
        let err = builder().build(&OptionChainSnapshot::default()).unwrap_err();
        assert!(matches!(err, DeltaSurfError::InvalidInput { .. }));
    }

    #[test]
    fn expiry_without_puts_aborts_whole_build() {
        let mut snap = two_expiry_snapshot();
        quote(&mut snap, 1_800_000_000_000, 10_000.0, OptionType::Call, 0.5, 0.6, 10_000.0);
        let err = builder().build(&snap).unwrap_err();
        assert!(matches!(
            err,
            DeltaSurfError::EmptySlice {
                expiration_timestamp: 1_800_000_000_000,
                side: "put"
            }
        ));
    }

    #[test]
    fn config_overrides_grid() {
        let config = SurfaceConfig::from_json(r#"{"target_half_grid": [0.25]}"#).unwrap();
        let surface = builder().config(config).build(&two_expiry_snapshot()).unwrap();
        assert_eq!(surface.grid().labels(), ["25P", "ATMF", "25C"]);
        assert_eq!(surface.rows()[0].quotes.wings.len(), 1);
    }

    #[test]
    fn config_rejects_bad_input() {
        assert!(matches!(
            SurfaceConfig::from_json(r#"{"target_half_grid": [0.6]}"#),
            Err(DeltaSurfError::Configuration { .. })
        ));
        assert!(matches!(
            SurfaceConfig::from_json(r#"{"grid": [0.1]}"#),
            Err(DeltaSurfError::Configuration { .. })
        ));
        let config = SurfaceConfig::from_json("{}").unwrap();
        assert_eq!(config, SurfaceConfig::default());
    }

    /// Always returns the first sample's y: a stand-in strategy.
    #[derive(Debug)]
    struct FirstSample;

    #[derive(Debug)]
    struct Constant(f64);

    impl Interpolant for Constant {
        fn eval(&self, _query: f64) -> error::Result<f64> {
            Ok(self.0)
        }
    }

    impl Interpolator for FirstSample {
        fn fit(&self, _x: &[f64], y: &[f64]) -> error::Result<Box<dyn Interpolant>> {
            Ok(Box::new(Constant(y[0])))
        }
    }

    #[test]
    fn custom_interpolator_is_used() {
        let surface = builder()
            .interpolator(Box::new(FirstSample))
            .build(&two_expiry_snapshot())
            .unwrap();
        let row = surface.row(EXP_1).unwrap();
        // Puts sorted by strike: the 9000 put comes first.
        assert!(row.points.iter().all(|p| p.strike.0 == 9_000.0));
        assert!(row.quotes.wings.iter().all(|w| w.risk_reversal.volatility.0 == 0.0));
    }
}
