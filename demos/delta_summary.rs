//! Summarize an option chain snapshot as a delta-quoted vol surface.
//!
//! Demonstrates the full workflow:
//!   1. Parse a Deribit-style snapshot (instruments + tickers)
//!   2. Build the surface on a custom delta grid
//!   3. Read per-expiry points and ATMF/RR/FLY quotes
//!   4. Flatten into the wide summary table
//!
//! Run with: `RUST_LOG=deltasurf=debug cargo run --example delta_summary`

use deltasurf::market::OptionChainSnapshot;
use deltasurf::surface::{Cell, DeltaSurfaceBuilder, SurfaceConfig};
use tracing_subscriber::EnvFilter;

const SNAPSHOT: &str = r#"{
    "instruments": [
        {"instrument_name": "BTC-29MAR24-50000-P", "expiration_timestamp": 1711699200000, "strike": 50000.0, "option_type": "put"},
        {"instrument_name": "BTC-29MAR24-56000-P", "expiration_timestamp": 1711699200000, "strike": 56000.0, "option_type": "put"},
        {"instrument_name": "BTC-29MAR24-61000-P", "expiration_timestamp": 1711699200000, "strike": 61000.0, "option_type": "put"},
        {"instrument_name": "BTC-29MAR24-66000-P", "expiration_timestamp": 1711699200000, "strike": 66000.0, "option_type": "put"},
        {"instrument_name": "BTC-29MAR24-72000-P", "expiration_timestamp": 1711699200000, "strike": 72000.0, "option_type": "put"},
        {"instrument_name": "BTC-29MAR24-72000-C", "expiration_timestamp": 1711699200000, "strike": 72000.0, "option_type": "call"},
        {"instrument_name": "BTC-26APR24-45000-P", "expiration_timestamp": 1714118400000, "strike": 45000.0, "option_type": "put"},
        {"instrument_name": "BTC-26APR24-61000-P", "expiration_timestamp": 1714118400000, "strike": 61000.0, "option_type": "put"},
        {"instrument_name": "BTC-26APR24-70000-P", "expiration_timestamp": 1714118400000, "strike": 70000.0, "option_type": "put"},
        {"instrument_name": "BTC-26APR24-80000-C", "expiration_timestamp": 1714118400000, "strike": 80000.0, "option_type": "call"}
    ],
    "tickers": [
        {"instrument_name": "BTC-29MAR24-50000-P", "mark_iv": 78.5, "underlying_price": 61020.0, "greeks": {"delta": -0.06}},
        {"instrument_name": "BTC-29MAR24-56000-P", "mark_iv": 66.0, "underlying_price": 61020.0, "greeks": {"delta": -0.21}},
        {"instrument_name": "BTC-29MAR24-61000-P", "mark_iv": 58.2, "underlying_price": 61020.0, "greeks": {"delta": -0.49}},
        {"instrument_name": "BTC-29MAR24-66000-P", "mark_iv": 57.1, "underlying_price": 61020.0, "greeks": {"delta": -0.74}},
        {"instrument_name": "BTC-29MAR24-72000-P", "mark_iv": 60.4, "underlying_price": 61020.0, "greeks": {"delta": -0.93}},
        {"instrument_name": "BTC-29MAR24-72000-C", "mark_iv": 60.4, "underlying_price": 61040.0, "greeks": {"delta": 0.07}},
        {"instrument_name": "BTC-26APR24-45000-P", "mark_iv": 80.3, "underlying_price": 61400.0, "greeks": {"delta": -0.08}},
        {"instrument_name": "BTC-26APR24-61000-P", "mark_iv": 61.0, "underlying_price": 61400.0, "greeks": {"delta": -0.47}},
        {"instrument_name": "BTC-26APR24-70000-P", "mark_iv": 59.6, "underlying_price": 61400.0, "greeks": {"delta": -0.78}}
    ],
    "missing": ["BTC-26APR24-80000-C"]
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // ---------------------------------------------------------------
    // 1. Parse the snapshot
    // ---------------------------------------------------------------

    let snapshot = OptionChainSnapshot::from_json(SNAPSHOT)?;
    println!(
        "Snapshot: {} instruments, {} tickers, {} missing",
        snapshot.instruments.len(),
        snapshot.tickers.len(),
        snapshot.missing.len()
    );

    // ---------------------------------------------------------------
    // 2. Build the surface
    // ---------------------------------------------------------------

    let config = SurfaceConfig::from_json(r#"{"target_half_grid": [0.10, 0.25]}"#)?;
    let surface = DeltaSurfaceBuilder::new()
        .name("BTC")
        .as_of(1_709_251_200_000)
        .config(config)
        .build(&snapshot)?;

    println!("Grid: {:?}", surface.grid().labels());
    println!("Missing: {:?}\n", surface.missing_instruments());

    // ---------------------------------------------------------------
    // 3. Per-expiry points and quotes
    // ---------------------------------------------------------------

    for row in surface.rows() {
        println!("Expiry {}  forward {:.2}", row.expiration_timestamp, row.forward);
        println!("  {:>6} {:>8} {:>10} {:>8} {:>6}", "label", "npd", "strike", "vol", "extrap");
        for p in &row.points {
            println!(
                "  {:>6} {:>8.4} {:>10.1} {:>8.3} {:>6}",
                p.label, p.clamped_neg_put_delta, p.strike.0, p.volatility.0, p.extrapolated
            );
        }
        println!(
            "  ATMF {:.3}{}",
            row.quotes.atmf.volatility.0,
            if row.quotes.atmf.extrapolated { " *" } else { "" }
        );
        for w in &row.quotes.wings {
            println!(
                "  {:>6} {:>8.3}{}   {:>6} {:>8.3}{}",
                w.rr_column(),
                w.risk_reversal.volatility.0,
                if w.risk_reversal.extrapolated { " *" } else { "  " },
                w.fly_column(),
                w.butterfly.volatility.0,
                if w.butterfly.extrapolated { " *" } else { "  " },
            );
        }
        println!();
    }

    // ---------------------------------------------------------------
    // 4. Wide summary table
    // ---------------------------------------------------------------

    let table = surface.summary_table();
    println!("Summary table: {} rows x {} columns", table.rows.len(), table.columns.len());
    for (expiry, cells) in table.index.iter().zip(&table.rows) {
        let arf: Vec<String> = table
            .columns
            .iter()
            .zip(cells)
            .filter(|(k, _)| k.group == "volatility_arf")
            .map(|(k, cell)| match cell {
                Cell::Number(v) => format!("{}={v:.3}", k.label),
                Cell::Flag(b) => format!("{}={b}", k.label),
            })
            .collect();
        println!("  {expiry}: {}", arf.join("  "));
    }

    Ok(())
}
