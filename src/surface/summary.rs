//! Assembled surface: one row per expiration, ascending.
//!
//! Each [`SurfaceRow`] carries the forward, the interpolated point at every
//! grid delta and the ATMF/RR/FLY decomposition. [`SummaryTable`] flattens
//! the rows into a wide table with two-level `(group, label)` column keys.

use serde::{Deserialize, Serialize};

use crate::conventions::{self, columns};
use crate::error::{self, DeltaSurfError};
use crate::surface::decompose::{Decomposition, Quote};
use crate::surface::grid::DeltaGrid;
use crate::surface::slice::SurfacePoint;

/// Complete summary of one expiration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceRow {
    pub expiration_timestamp: i64,
    pub forward: f64,
    /// One point per grid delta, in grid order.
    pub points: Vec<SurfacePoint>,
    pub quotes: Decomposition,
}

impl SurfaceRow {
    /// Point at a grid label such as `25P` or `ATMF`.
    pub fn point(&self, label: &str) -> Option<&SurfacePoint> {
        self.points.iter().find(|p| p.label == label)
    }

    /// Quote at a decomposition column such as `ATMF` or `10FLY`.
    pub fn quote(&self, column: &str) -> Option<Quote> {
        self.quotes.quote(column)
    }
}

/// A delta-quoted implied volatility surface.
///
/// Owns every derived row. Built by
/// [`DeltaSurfaceBuilder`](crate::surface::DeltaSurfaceBuilder).
///
/// Deserialization re-sorts rows by expiration and rejects duplicate
/// expirations or rows that do not match the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DeltaSurfaceRaw")]
pub struct DeltaSurface {
    name: String,
    as_of_timestamp: i64,
    grid: DeltaGrid,
    rows: Vec<SurfaceRow>,
    missing_instruments: Vec<String>,
    unmatched_tickers: Vec<String>,
}

#[derive(Deserialize)]
struct DeltaSurfaceRaw {
    name: String,
    as_of_timestamp: i64,
    grid: DeltaGrid,
    rows: Vec<SurfaceRow>,
    missing_instruments: Vec<String>,
    unmatched_tickers: Vec<String>,
}

impl TryFrom<DeltaSurfaceRaw> for DeltaSurface {
    type Error = DeltaSurfError;

    fn try_from(raw: DeltaSurfaceRaw) -> Result<Self, Self::Error> {
        if let Some(row) = raw.rows.iter().find(|r| r.points.len() != raw.grid.len()) {
            return Err(DeltaSurfError::InvalidInput {
                message: format!(
                    "row {} has {} points, grid has {}",
                    row.expiration_timestamp,
                    row.points.len(),
                    raw.grid.len()
                ),
            });
        }
        let surface = Self::new(
            raw.name,
            raw.as_of_timestamp,
            raw.grid,
            raw.rows,
            raw.missing_instruments,
            raw.unmatched_tickers,
        );
        if let Some(w) = surface
            .rows
            .windows(2)
            .find(|w| w[0].expiration_timestamp == w[1].expiration_timestamp)
        {
            return Err(DeltaSurfError::InvalidInput {
                message: format!("duplicate expiration {}", w[0].expiration_timestamp),
            });
        }
        Ok(surface)
    }
}

impl DeltaSurface {
    pub(crate) fn new(
        name: String,
        as_of_timestamp: i64,
        grid: DeltaGrid,
        mut rows: Vec<SurfaceRow>,
        missing_instruments: Vec<String>,
        unmatched_tickers: Vec<String>,
    ) -> Self {
        rows.sort_by_key(|r| r.expiration_timestamp);
        Self {
            name,
            as_of_timestamp,
            grid,
            rows,
            missing_instruments,
            unmatched_tickers,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Snapshot time, integer epoch milliseconds.
    pub fn as_of_timestamp(&self) -> i64 {
        self.as_of_timestamp
    }

    pub fn grid(&self) -> &DeltaGrid {
        &self.grid
    }

    /// Rows in ascending expiration order.
    pub fn rows(&self) -> &[SurfaceRow] {
        &self.rows
    }

    pub fn row(&self, expiration_timestamp: i64) -> Option<&SurfaceRow> {
        self.rows
            .binary_search_by_key(&expiration_timestamp, |r| r.expiration_timestamp)
            .ok()
            .map(|i| &self.rows[i])
    }

    pub fn expirations(&self) -> impl Iterator<Item = i64> + '_ {
        self.rows.iter().map(|r| r.expiration_timestamp)
    }

    /// `(expiration, forward)` pairs.
    pub fn forwards(&self) -> Vec<(i64, f64)> {
        self.rows
            .iter()
            .map(|r| (r.expiration_timestamp, r.forward))
            .collect()
    }

    /// Instruments the snapshot had no quote for.
    pub fn missing_instruments(&self) -> &[String] {
        &self.missing_instruments
    }

    /// Tickers dropped because no instrument matched them.
    pub fn unmatched_tickers(&self) -> &[String] {
        &self.unmatched_tickers
    }

    /// Flatten into a wide table.
    pub fn summary_table(&self) -> SummaryTable {
        SummaryTable::from_surface(self)
    }

    /// Pretty-printed JSON of the whole surface.
    ///
    /// # Errors
    /// Returns [`DeltaSurfError::Serialization`] if serialization fails.
    pub fn to_json(&self) -> error::Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| DeltaSurfError::Serialization {
            message: format!("failed to serialize surface: {e}"),
        })
    }
}

/// Two-level column key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnKey {
    pub group: String,
    pub label: String,
}

impl ColumnKey {
    fn new(group: &str, label: &str) -> Self {
        Self {
            group: group.to_string(),
            label: label.to_string(),
        }
    }
}

/// A table cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Flag(bool),
}

/// Wide per-expiration table.
///
/// Columns, in order: `(forward, forward)`; then for each of
/// `neg_put_delta`, `strike`, `volatility`, `extrapolated` one column per
/// grid label; then `volatility_arf` and `extrapolated_arf` over
/// `ATMF, <n>RR, <n>FLY, …` from the money outward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryTable {
    pub columns: Vec<ColumnKey>,
    /// Expiration timestamps, ascending.
    pub index: Vec<i64>,
    pub rows: Vec<Vec<Cell>>,
}

impl SummaryTable {
    fn from_surface(surface: &DeltaSurface) -> Self {
        let labels = surface.grid.labels();
        let arf_columns = arf_columns(surface);

        let mut keys = vec![ColumnKey::new(columns::FORWARD, columns::FORWARD)];
        for group in [
            columns::NEG_PUT_DELTA,
            columns::STRIKE,
            columns::VOLATILITY,
            columns::EXTRAPOLATED,
        ] {
            keys.extend(labels.iter().map(|l| ColumnKey::new(group, l)));
        }
        for group in [columns::VOLATILITY_ARF, columns::EXTRAPOLATED_ARF] {
            keys.extend(arf_columns.iter().map(|l| ColumnKey::new(group, l)));
        }

        let rows = surface
            .rows
            .iter()
            .map(|row| {
                let mut cells = Vec::with_capacity(keys.len());
                cells.push(Cell::Number(row.forward));
                cells.extend(row.points.iter().map(|p| Cell::Number(p.clamped_neg_put_delta)));
                cells.extend(row.points.iter().map(|p| Cell::Number(p.strike.0)));
                cells.extend(row.points.iter().map(|p| Cell::Number(p.volatility.0)));
                cells.extend(row.points.iter().map(|p| Cell::Flag(p.extrapolated)));
                let quotes = arf_quotes(&row.quotes);
                cells.extend(quotes.iter().map(|q| Cell::Number(q.volatility.0)));
                cells.extend(quotes.iter().map(|q| Cell::Flag(q.extrapolated)));
                cells
            })
            .collect();

        Self {
            columns: keys,
            index: surface.expirations().collect(),
            rows,
        }
    }

    /// Cell at `(expiration, group, label)`.
    pub fn get(&self, expiration_timestamp: i64, group: &str, label: &str) -> Option<Cell> {
        let r = self.index.iter().position(|&t| t == expiration_timestamp)?;
        let c = self
            .columns
            .iter()
            .position(|k| k.group == group && k.label == label)?;
        self.rows.get(r)?.get(c).copied()
    }

    /// Whole column, top to bottom.
    pub fn column(&self, group: &str, label: &str) -> Option<Vec<Cell>> {
        let c = self
            .columns
            .iter()
            .position(|k| k.group == group && k.label == label)?;
        self.rows.iter().map(|r| r.get(c).copied()).collect()
    }
}

fn arf_columns(surface: &DeltaSurface) -> Vec<String> {
    let mut names = vec![conventions::ATMF.to_string()];
    let wings = surface.grid.half().iter().rev().map(|&v| 1.0 - v);
    for call_npd in wings {
        let label = conventions::wing_label(call_npd);
        names.push(format!("{label}{}", conventions::RR));
        names.push(format!("{label}{}", conventions::FLY));
    }
    names
}

fn arf_quotes(quotes: &Decomposition) -> Vec<Quote> {
    let mut out = vec![quotes.atmf];
    for w in &quotes.wings {
        out.push(w.risk_reversal);
        out.push(w.butterfly);
    }
    out
}
