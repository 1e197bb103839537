use std::collections::{BTreeMap, HashMap};

use super::model::SalesTable;

// ---------------------------------------------------------------------------
// Rating domain
// ---------------------------------------------------------------------------

/// Valid range for ratings.  Values outside it (and NaN) are left out of the
/// average rating; the transaction still counts everywhere else.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingPolicy {
    pub min: f64,
    pub max: f64,
}

impl Default for RatingPolicy {
    fn default() -> Self {
        RatingPolicy { min: 1.0, max: 10.0 }
    }
}

impl RatingPolicy {
    pub fn accepts(&self, rating: f64) -> bool {
        rating >= self.min && rating <= self.max
    }
}

// ---------------------------------------------------------------------------
// KPIs
// ---------------------------------------------------------------------------

/// Headline numbers for the filtered view.  An empty view yields zeros.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Kpis {
    pub transactions: usize,
    pub total_sales: f64,
    /// Mean of in-domain ratings, rounded to 1 decimal.
    pub average_rating: f64,
    /// How many ratings went into `average_rating`.
    pub rated: usize,
    /// Mean of Total, rounded to 2 decimals.
    pub average_sale: f64,
}

impl Kpis {
    pub fn is_empty(&self) -> bool {
        self.transactions == 0
    }

    pub fn has_rating(&self) -> bool {
        self.rated > 0
    }
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn compute_kpis(table: &SalesTable, indices: &[usize], policy: &RatingPolicy) -> Kpis {
    let mut total_sales = 0.0;
    let mut rating_sum = 0.0;
    let mut rated = 0;
    let mut transactions = 0;

    for tx in indices.iter().filter_map(|&i| table.transactions.get(i)) {
        transactions += 1;
        total_sales += tx.total;
        if policy.accepts(tx.rating) {
            rating_sum += tx.rating;
            rated += 1;
        }
    }

    let mean = |sum: f64, n: usize| if n == 0 { 0.0 } else { sum / n as f64 };
    Kpis {
        transactions,
        total_sales,
        average_rating: round_to(mean(rating_sum, rated), 1),
        rated,
        average_sale: round_to(mean(total_sales, transactions), 2),
    }
}

// ---------------------------------------------------------------------------
// Grouped sums
// ---------------------------------------------------------------------------

/// Sum of Total per product line, ascending by sum (ties by name).
pub fn sales_by_product_line(table: &SalesTable, indices: &[usize]) -> Vec<(String, f64)> {
    let mut sums: HashMap<&str, f64> = HashMap::new();
    for tx in indices.iter().filter_map(|&i| table.transactions.get(i)) {
        *sums.entry(tx.product_line.as_str()).or_default() += tx.total;
    }
    let mut out: Vec<(String, f64)> = sums
        .into_iter()
        .map(|(line, sum)| (line.to_string(), sum))
        .collect();
    out.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    out
}

/// Sum of Total per hour of day, ascending by hour.  Hours without sales
/// are absent.
pub fn sales_by_hour(table: &SalesTable, indices: &[usize]) -> Vec<(u8, f64)> {
    let mut sums: BTreeMap<u8, f64> = BTreeMap::new();
    for tx in indices.iter().filter_map(|&i| table.transactions.get(i)) {
        *sums.entry(tx.hour()).or_default() += tx.total;
    }
    sums.into_iter().collect()
}
