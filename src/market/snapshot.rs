//! Input boundary: one snapshot of an exchange option chain.
//!
//! Field names follow Deribit's public API (`get_instruments`, `ticker`).
//! Unknown fields are ignored; quote fields the exchange may omit are
//! `Option` and checked by the normalizer, not here.

use serde::{Deserialize, Serialize};

use crate::error::{self, DeltaSurfError};
use crate::types::OptionType;

/// Static metadata for one listed option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub instrument_name: String,
    /// Expiry, integer epoch milliseconds (UTC).
    pub expiration_timestamp: i64,
    pub strike: f64,
    pub option_type: OptionType,
    pub base_currency: Option<String>,
    pub kind: Option<String>,
}

/// Greeks sub-record of a ticker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    pub delta: Option<f64>,
    pub gamma: Option<f64>,
    pub vega: Option<f64>,
    pub theta: Option<f64>,
    pub rho: Option<f64>,
}

/// Daily statistics sub-record of a ticker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub volume: Option<f64>,
    pub price_change: Option<f64>,
    pub low: Option<f64>,
    pub high: Option<f64>,
}

/// Live quote for one instrument.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub instrument_name: String,
    pub timestamp: Option<i64>,
    /// Mark implied volatility, in the exchange's units (percent on Deribit).
    pub mark_iv: Option<f64>,
    pub mark_price: Option<f64>,
    pub bid_iv: Option<f64>,
    pub ask_iv: Option<f64>,
    pub underlying_price: Option<f64>,
    pub underlying_index: Option<String>,
    pub open_interest: Option<f64>,
    pub greeks: Option<Greeks>,
    pub stats: Option<Stats>,
}

/// Instruments, their tickers, and the names no ticker could be fetched for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionChainSnapshot {
    pub instruments: Vec<Instrument>,
    pub tickers: Vec<Ticker>,
    #[serde(default)]
    pub missing: Vec<String>,
}

impl OptionChainSnapshot {
    /// Parse a snapshot from JSON.
    ///
    /// # Errors
    /// Returns [`DeltaSurfError::Configuration`] if the document is malformed,
    /// including timestamps that are not integers.
    pub fn from_json(json: &str) -> error::Result<Self> {
        serde_json::from_str(json).map_err(|e| DeltaSurfError::Configuration {
            message: format!("malformed option chain snapshot: {e}"),
        })
    }
}
