//! Tick normalization: join tickers onto instruments and bucket by expiry.
//!
//! Tickers are left-joined onto instruments by `instrument_name`. A ticker
//! whose instrument is unknown is dropped and recorded in
//! [`NormalizedChain::unmatched_tickers`]. Names listed as `missing` in the
//! snapshot never produce a tick and are carried through as metadata.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{self, DeltaSurfError};
use crate::market::snapshot::{Instrument, OptionChainSnapshot, Ticker};
use crate::types::OptionType;
use crate::validate::{validate_delta, validate_non_negative, validate_positive};

/// One quoted option at the snapshot instant, greeks and stats flattened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionTick {
    pub instrument_name: String,
    pub expiration_timestamp: i64,
    pub strike: f64,
    pub option_type: OptionType,
    /// Puts negative, calls positive.
    pub delta: f64,
    pub implied_volatility: f64,
    pub underlying_price: f64,
    pub mark_price: Option<f64>,
    pub gamma: Option<f64>,
    pub vega: Option<f64>,
    pub theta: Option<f64>,
    pub rho: Option<f64>,
    pub volume: Option<f64>,
    pub price_change: Option<f64>,
    pub low: Option<f64>,
    pub high: Option<f64>,
}

impl OptionTick {
    /// A tick with only the fields the surface needs; optional quote fields
    /// are left empty.
    pub fn new(
        instrument_name: impl Into<String>,
        expiration_timestamp: i64,
        strike: f64,
        option_type: OptionType,
        delta: f64,
        implied_volatility: f64,
        underlying_price: f64,
    ) -> Self {
        Self {
            instrument_name: instrument_name.into(),
            expiration_timestamp,
            strike,
            option_type,
            delta,
            implied_volatility,
            underlying_price,
            mark_price: None,
            gamma: None,
            vega: None,
            theta: None,
            rho: None,
            volume: None,
            price_change: None,
            low: None,
            high: None,
        }
    }

    /// Merge instrument metadata with its ticker.
    ///
    /// # Errors
    /// Returns [`DeltaSurfError::InvalidInput`] if the ticker lacks a delta,
    /// mark IV or underlying price, or any required value is out of range.
    pub fn from_parts(instrument: &Instrument, ticker: &Ticker) -> error::Result<Self> {
        let name = &instrument.instrument_name;
        let required = |value: Option<f64>, field: &str| {
            value.ok_or_else(|| DeltaSurfError::InvalidInput {
                message: format!("{name}: ticker has no {field}"),
            })
        };
        let greeks = ticker.greeks.clone().unwrap_or_default();
        let stats = ticker.stats.clone().unwrap_or_default();

        let strike = validate_positive(instrument.strike, &format!("{name} strike"))?;
        let delta = validate_delta(required(greeks.delta, "delta")?, &format!("{name} delta"))?;
        let implied_volatility =
            validate_non_negative(required(ticker.mark_iv, "mark_iv")?, &format!("{name} mark_iv"))?;
        let underlying_price = validate_positive(
            required(ticker.underlying_price, "underlying_price")?,
            &format!("{name} underlying_price"),
        )?;

        Ok(Self {
            instrument_name: name.clone(),
            expiration_timestamp: instrument.expiration_timestamp,
            strike,
            option_type: instrument.option_type,
            delta,
            implied_volatility,
            underlying_price,
            mark_price: ticker.mark_price,
            gamma: greeks.gamma,
            vega: greeks.vega,
            theta: greeks.theta,
            rho: greeks.rho,
            volume: stats.volume,
            price_change: stats.price_change,
            low: stats.low,
            high: stats.high,
        })
    }
}

/// All ticks sharing one expiration, split by option type and sorted by strike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpirySlice {
    expiration_timestamp: i64,
    puts: Vec<OptionTick>,
    calls: Vec<OptionTick>,
}

impl ExpirySlice {
    /// Build a slice from ticks of a single expiration.
    ///
    /// # Errors
    /// Returns [`DeltaSurfError::InvalidInput`] if a tick belongs to another
    /// expiration.
    pub fn from_ticks(expiration_timestamp: i64, ticks: Vec<OptionTick>) -> error::Result<Self> {
        let mut slice = Self {
            expiration_timestamp,
            puts: Vec::new(),
            calls: Vec::new(),
        };
        for tick in ticks {
            slice.push(tick)?;
        }
        slice.sort();
        Ok(slice)
    }

    fn push(&mut self, tick: OptionTick) -> error::Result<()> {
        if tick.expiration_timestamp != self.expiration_timestamp {
            return Err(DeltaSurfError::InvalidInput {
                message: format!(
                    "{} expires at {}, not {}",
                    tick.instrument_name, tick.expiration_timestamp, self.expiration_timestamp
                ),
            });
        }
        match tick.option_type {
            OptionType::Put => self.puts.push(tick),
            OptionType::Call => self.calls.push(tick),
        }
        Ok(())
    }

    fn sort(&mut self) {
        self.puts.sort_by(|a, b| a.strike.total_cmp(&b.strike));
        self.calls.sort_by(|a, b| a.strike.total_cmp(&b.strike));
    }

    pub fn expiration_timestamp(&self) -> i64 {
        self.expiration_timestamp
    }

    pub fn puts(&self) -> &[OptionTick] {
        &self.puts
    }

    pub fn calls(&self) -> &[OptionTick] {
        &self.calls
    }

    /// Ticks of one option type.
    pub fn side(&self, option_type: OptionType) -> &[OptionTick] {
        match option_type {
            OptionType::Put => &self.puts,
            OptionType::Call => &self.calls,
        }
    }

    /// All ticks, puts first.
    pub fn ticks(&self) -> impl Iterator<Item = &OptionTick> {
        self.puts.iter().chain(self.calls.iter())
    }

    pub fn len(&self) -> usize {
        self.puts.len() + self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Ticks bucketed by expiration, plus the join metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedChain {
    slices: BTreeMap<i64, ExpirySlice>,
    missing_instruments: Vec<String>,
    unmatched_tickers: Vec<String>,
}

impl NormalizedChain {
    /// Slices in ascending expiration order.
    pub fn slices(&self) -> impl Iterator<Item = &ExpirySlice> {
        self.slices.values()
    }

    pub fn slice(&self, expiration_timestamp: i64) -> Option<&ExpirySlice> {
        self.slices.get(&expiration_timestamp)
    }

    pub fn expirations(&self) -> impl Iterator<Item = i64> + '_ {
        self.slices.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Instrument names the snapshot had no quote for.
    pub fn missing_instruments(&self) -> &[String] {
        &self.missing_instruments
    }

    /// Ticker names with no matching instrument, dropped by the join.
    pub fn unmatched_tickers(&self) -> &[String] {
        &self.unmatched_tickers
    }
}

/// Join, flatten and bucket a snapshot.
///
/// # Errors
/// Returns [`DeltaSurfError::InvalidInput`] if a joined ticker is missing a
/// required quote field or carries an out-of-range value.
pub fn normalize(snapshot: &OptionChainSnapshot) -> error::Result<NormalizedChain> {
    let mut instruments: HashMap<&str, &Instrument> = HashMap::with_capacity(snapshot.instruments.len());
    for instrument in &snapshot.instruments {
        instruments
            .entry(instrument.instrument_name.as_str())
            .or_insert(instrument);
    }
    let missing: HashSet<&str> = snapshot.missing.iter().map(String::as_str).collect();

    let mut buckets: BTreeMap<i64, Vec<OptionTick>> = BTreeMap::new();
    let mut unmatched_tickers = Vec::new();

    for ticker in &snapshot.tickers {
        let name = ticker.instrument_name.as_str();
        if missing.contains(name) {
            #[cfg(feature = "logging")]
            tracing::warn!(instrument = name, "ticker listed as missing, skipped");
            continue;
        }
        let Some(instrument) = instruments.get(name) else {
            #[cfg(feature = "logging")]
            tracing::warn!(instrument = name, "ticker has no matching instrument, dropped");
            unmatched_tickers.push(ticker.instrument_name.clone());
            continue;
        };
        let tick = OptionTick::from_parts(instrument, ticker)?;
        buckets.entry(tick.expiration_timestamp).or_default().push(tick);
    }

    let slices = buckets
        .into_iter()
        .map(|(ts, ticks)| ExpirySlice::from_ticks(ts, ticks).map(|s| (ts, s)))
        .collect::<error::Result<BTreeMap<_, _>>>()?;

    #[cfg(feature = "logging")]
    tracing::debug!(
        n_expirations = slices.len(),
        n_missing = snapshot.missing.len(),
        n_unmatched = unmatched_tickers.len(),
        "option chain normalized"
    );

    Ok(NormalizedChain {
        slices,
        missing_instruments: snapshot.missing.clone(),
        unmatched_tickers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::snapshot::{Greeks, Stats};

    const EXP_1: i64 = 1_711_699_200_000;
    const EXP_2: i64 = 1_714_118_400_000;

    fn instrument(name: &str, exp: i64, strike: f64, ot: OptionType) -> Instrument {
        Instrument {
            instrument_name: name.into(),
            expiration_timestamp: exp,
            strike,
            option_type: ot,
            base_currency: Some("BTC".into()),
            kind: Some("option".into()),
        }
    }

    fn ticker(name: &str, delta: f64, iv: f64, underlying: f64) -> Ticker {
        Ticker {
            instrument_name: name.into(),
            mark_iv: Some(iv),
            underlying_price: Some(underlying),
            greeks: Some(Greeks {
                delta: Some(delta),
                vega: Some(10.0),
                ..Greeks::default()
            }),
            stats: Some(Stats {
                volume: Some(3.0),
                ..Stats::default()
            }),
            ..Ticker::default()
        }
    }

    fn snapshot() -> OptionChainSnapshot {
        OptionChainSnapshot {
            instruments: vec![
                instrument("A-11000-P", EXP_1, 11_000.0, OptionType::Put),
                instrument("A-9000-P", EXP_1, 9_000.0, OptionType::Put),
                instrument("A-10000-C", EXP_1, 10_000.0, OptionType::Call),
                instrument("B-10000-P", EXP_2, 10_000.0, OptionType::Put),
                instrument("B-12000-C", EXP_2, 12_000.0, OptionType::Call),
            ],
            tickers: vec![
                ticker("A-11000-P", -0.7, 60.0, 10_010.0),
                ticker("A-9000-P", -0.2, 70.0, 9_990.0),
                ticker("A-10000-C", 0.5, 62.0, 10_000.0),
                ticker("B-10000-P", -0.45, 65.0, 10_050.0),
                ticker("ORPHAN-1-P", -0.3, 50.0, 10_000.0),
            ],
            missing: vec!["B-12000-C".into()],
        }
    }

    #[test]
    fn buckets_by_expiration_and_type() {
        let chain = normalize(&snapshot()).unwrap();
        assert_eq!(chain.expirations().collect::<Vec<_>>(), vec![EXP_1, EXP_2]);

        let a = chain.slice(EXP_1).unwrap();
        assert_eq!(a.puts().len(), 2);
        assert_eq!(a.calls().len(), 1);
        assert_eq!(a.len(), 3);
        assert_eq!(a.side(OptionType::Call)[0].instrument_name, "A-10000-C");

        let b = chain.slice(EXP_2).unwrap();
        assert_eq!(b.puts().len(), 1);
        assert!(b.calls().is_empty());
    }

    #[test]
    fn puts_are_sorted_by_strike() {
        let chain = normalize(&snapshot()).unwrap();
        let strikes: Vec<f64> = chain.slice(EXP_1).unwrap().puts().iter().map(|t| t.strike).collect();
        assert_eq!(strikes, vec![9_000.0, 11_000.0]);
    }

    #[test]
    fn flattens_greeks_and_stats() {
        let chain = normalize(&snapshot()).unwrap();
        let tick = &chain.slice(EXP_2).unwrap().puts()[0];
        assert_eq!(tick.delta, -0.45);
        assert_eq!(tick.implied_volatility, 65.0);
        assert_eq!(tick.underlying_price, 10_050.0);
        assert_eq!(tick.vega, Some(10.0));
        assert_eq!(tick.gamma, None);
        assert_eq!(tick.volume, Some(3.0));
    }

    #[test]
    fn unmatched_ticker_is_dropped_and_recorded() {
        let chain = normalize(&snapshot()).unwrap();
        assert_eq!(chain.unmatched_tickers(), &["ORPHAN-1-P".to_string()]);
        assert!(chain.slices().flat_map(|s| s.ticks()).all(|t| t.instrument_name != "ORPHAN-1-P"));
    }

    #[test]
    fn missing_instruments_pass_through_without_ticks() {
        let mut snap = snapshot();
        // A ticker for a name listed as missing must still be ignored.
        snap.tickers.push(ticker("B-12000-C", 0.2, 80.0, 50_000.0));
        let chain = normalize(&snap).unwrap();
        assert_eq!(chain.missing_instruments(), &["B-12000-C".to_string()]);
        let b = chain.slice(EXP_2).unwrap();
        assert!(b.calls().is_empty());
    }

    #[test]
    fn ticker_without_delta_is_rejected() {
        let mut snap = snapshot();
        snap.tickers[0].greeks = None;
        let err = normalize(&snap).unwrap_err();
        match err {
            DeltaSurfError::InvalidInput { message } => assert!(message.contains("delta")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn out_of_range_delta_is_rejected() {
        let mut snap = snapshot();
        snap.tickers[0] = ticker("A-11000-P", -1.5, 60.0, 10_000.0);
        assert!(matches!(normalize(&snap), Err(DeltaSurfError::InvalidInput { .. })));
    }

    #[test]
    fn from_ticks_rejects_foreign_expiration() {
        let tick = OptionTick::from_parts(
            &instrument("X", EXP_2, 1.0, OptionType::Put),
            &ticker("X", -0.5, 50.0, 1.0),
        )
        .unwrap();
        assert!(ExpirySlice::from_ticks(EXP_1, vec![tick]).is_err());
    }
}
