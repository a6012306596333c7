//! Market data ingestion.
//!
//! - [`snapshot`]: raw instruments and tickers as delivered by the exchange
//! - [`normalize`]: joined, flattened ticks bucketed into [`ExpirySlice`]s

pub mod normalize;
pub mod snapshot;

pub use normalize::{ExpirySlice, NormalizedChain, OptionTick, normalize};
pub use snapshot::{Greeks, Instrument, OptionChainSnapshot, Stats, Ticker};
