//! Text rendering of the KPI panels.

use crate::data::aggregate::Kpis;

pub const STAR: &str = "⭐";

/// Upper bound on the stars drawn next to the average rating.
pub const MAX_STARS: usize = 10;

/// Integer with comma thousands separators: `1234567` → `"1,234,567"`.
pub fn thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Total sales, truncated to whole currency units: `"322,966 $"`.
pub fn total_sales_label(kpis: &Kpis) -> String {
    format!("{} $", thousands(kpis.total_sales.trunc() as i64))
}

/// One star per rating point, rounded half away from zero, at most
/// [`MAX_STARS`].
pub fn stars(average_rating: f64) -> String {
    let count = average_rating.round().clamp(0.0, MAX_STARS as f64) as usize;
    STAR.repeat(count)
}

/// `"7.0 ⭐⭐⭐⭐⭐⭐⭐"`; `"0.0"` when no rating is available.
pub fn rating_label(kpis: &Kpis) -> String {
    if !kpis.has_rating() {
        return format!("{:.1}", 0.0);
    }
    format!("{:.1} {}", kpis.average_rating, stars(kpis.average_rating))
}

/// `"322.97 $"`.
pub fn average_sale_label(kpis: &Kpis) -> String {
    format!("{:.2} $", kpis.average_sale)
}
