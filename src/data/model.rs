use std::collections::HashSet;
use std::fmt;

use chrono::{NaiveTime, Timelike};

// ---------------------------------------------------------------------------
// CellValue – a single raw cell of the source table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell, as read from a spreadsheet, CSV or Parquet file.
/// Kept around for the preview table; typed fields live on [`Transaction`].
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Time(NaiveTime),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Time(t) => write!(f, "{}", t.format("%H:%M:%S")),
            CellValue::Empty => Ok(()),
        }
    }
}

impl CellValue {
    /// Numeric view of the cell; text is parsed leniently (surrounding whitespace).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Guess the type of a textual cell (CSV, stringified Arrow values).
    pub fn from_text(s: &str) -> Self {
        if s.is_empty() {
            return CellValue::Empty;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        if s == "true" || s == "false" {
            return CellValue::Bool(s == "true");
        }
        CellValue::Text(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Transaction – one sale
// ---------------------------------------------------------------------------

/// Hour of day (0–23) for a time-of-day value.
pub fn derive_hour(time: NaiveTime) -> u8 {
    // `NaiveTime::hour` is always < 24.
    time.hour() as u8
}

/// One row of the sales table, with the columns the dashboard works on.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub city: String,
    pub customer_type: String,
    pub gender: String,
    pub product_line: String,
    pub total: f64,
    pub rating: f64,
    pub time: NaiveTime,
    hour: u8,
}

impl Transaction {
    pub fn new(
        city: impl Into<String>,
        customer_type: impl Into<String>,
        gender: impl Into<String>,
        product_line: impl Into<String>,
        total: f64,
        rating: f64,
        time: NaiveTime,
    ) -> Self {
        Transaction {
            city: city.into(),
            customer_type: customer_type.into(),
            gender: gender.into(),
            product_line: product_line.into(),
            total,
            rating,
            time,
            hour: derive_hour(time),
        }
    }

    /// Derived once from `time`; there is no setter.
    pub fn hour(&self) -> u8 {
        self.hour
    }
}

// ---------------------------------------------------------------------------
// SalesTable – the complete loaded table
// ---------------------------------------------------------------------------

/// The parsed table, shared read-only between recomputations.
#[derive(Debug, Clone)]
pub struct SalesTable {
    /// Every column of the load window, in source order (preview only).
    pub headers: Vec<String>,
    /// Raw cells, `rows[i]` belongs to `transactions[i]`.
    pub rows: Vec<Vec<CellValue>>,
    pub transactions: Vec<Transaction>,
    /// Distinct values in order of first appearance.
    pub cities: Vec<String>,
    pub customer_types: Vec<String>,
    pub genders: Vec<String>,
}

impl SalesTable {
    /// Build the distinct-value indices from the typed rows.
    pub fn new(
        headers: Vec<String>,
        rows: Vec<Vec<CellValue>>,
        transactions: Vec<Transaction>,
    ) -> Self {
        let cities = distinct(transactions.iter().map(|t| t.city.as_str()));
        let customer_types = distinct(transactions.iter().map(|t| t.customer_type.as_str()));
        let genders = distinct(transactions.iter().map(|t| t.gender.as_str()));
        SalesTable {
            headers,
            rows,
            transactions,
            cities,
            customer_types,
            genders,
        }
    }

    /// Table without preview columns.
    #[cfg(test)]
    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        let rows = vec![Vec::new(); transactions.len()];
        Self::new(Vec::new(), rows, transactions)
    }

    /// Number of transactions.
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Hour column recomputed from `time`.
    pub fn rederive_hours(&self) -> Vec<u8> {
        self.transactions.iter().map(|t| derive_hour(t.time)).collect()
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}
