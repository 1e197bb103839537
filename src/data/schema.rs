use crate::error::{LoadError, LoadResult};

// ---------------------------------------------------------------------------
// Schema descriptor: required headers and what they must contain
// ---------------------------------------------------------------------------

/// What a required column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    /// Free text, used as a filter or grouping key.
    Category,
    /// Currency amount.
    Amount,
    /// Numeric score, checked against the rating domain at aggregation time.
    Rating,
    /// Time of day; the hour is derived from it.
    TimeOfDay,
}

/// Logical role of a required column inside the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    City,
    CustomerType,
    Gender,
    ProductLine,
    Total,
    Rating,
    Time,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnSpec {
    pub field: Field,
    pub header: String,
    pub kind: ColumnKind,
}

/// The headers a source must carry. Independent of the file format.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaDescriptor {
    pub columns: Vec<ColumnSpec>,
}

impl Default for SchemaDescriptor {
    fn default() -> Self {
        let spec = |field, header: &str, kind| ColumnSpec {
            field,
            header: header.to_string(),
            kind,
        };
        SchemaDescriptor {
            columns: vec![
                spec(Field::City, "City", ColumnKind::Category),
                spec(Field::CustomerType, "Customer_type", ColumnKind::Category),
                spec(Field::Gender, "Gender", ColumnKind::Category),
                spec(Field::ProductLine, "Product line", ColumnKind::Category),
                spec(Field::Total, "Total", ColumnKind::Amount),
                spec(Field::Rating, "Rating", ColumnKind::Rating),
                spec(Field::Time, "Time", ColumnKind::TimeOfDay),
            ],
        }
    }
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::City,
        Field::CustomerType,
        Field::Gender,
        Field::ProductLine,
        Field::Total,
        Field::Rating,
        Field::Time,
    ];

    fn slot(self) -> usize {
        self as usize
    }
}

/// A required column located in a concrete header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
    pub position: usize,
    pub header: String,
    pub kind: ColumnKind,
}

/// Position of every required column inside a concrete header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnIndex {
    located: Vec<Located>,
}

impl ColumnIndex {
    pub fn get(&self, field: Field) -> &Located {
        &self.located[field.slot()]
    }
}

impl SchemaDescriptor {
    pub fn spec(&self, field: Field) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.field == field)
    }

    /// Locate every required header; fails on the first one missing.
    /// Headers are compared after trimming surrounding whitespace.
    pub fn validate(&self, headers: &[String]) -> LoadResult<ColumnIndex> {
        let located = Field::ALL
            .iter()
            .map(|&field| {
                let spec = self
                    .spec(field)
                    .ok_or_else(|| LoadError::MissingColumn(format!("{field:?}")))?;
                headers
                    .iter()
                    .position(|h| h.trim() == spec.header)
                    .map(|position| Located {
                        position,
                        header: spec.header.clone(),
                        kind: spec.kind,
                    })
                    .ok_or_else(|| LoadError::MissingColumn(spec.header.clone()))
            })
            .collect::<LoadResult<Vec<_>>>()?;
        Ok(ColumnIndex { located })
    }
}

// ---------------------------------------------------------------------------
// Sheet window: where the table sits inside a spreadsheet
// ---------------------------------------------------------------------------

/// Header row offset and column range of the table inside a worksheet.
/// All indices are 0-based; column `A` is 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SheetWindow {
    pub header_row: u32,
    pub first_col: u32,
    pub last_col: u32,
}

impl Default for SheetWindow {
    /// Header on row 4, columns `B` through `R`.
    fn default() -> Self {
        SheetWindow {
            header_row: 3,
            first_col: 1,
            last_col: 17,
        }
    }
}

impl SheetWindow {
    /// Build a window from a header row offset and an A1-style column range (`"B:R"`).
    pub fn new(header_row: u32, columns: &str) -> LoadResult<Self> {
        let (first_col, last_col) = parse_column_range(columns)?;
        Ok(SheetWindow {
            header_row,
            first_col,
            last_col,
        })
    }
}

/// `"B:R"` → `(1, 17)`. A single column (`"C"`) is accepted too.
pub fn parse_column_range(s: &str) -> LoadResult<(u32, u32)> {
    let bad = || LoadError::BadWindow(s.to_string());
    let (first, last) = match s.split_once(':') {
        Some((a, b)) => (a, b),
        None => (s, s),
    };
    let first = column_index(first.trim()).ok_or_else(bad)?;
    let last = column_index(last.trim()).ok_or_else(bad)?;
    if first > last {
        return Err(bad());
    }
    Ok((first, last))
}

/// `"A"` → 0, `"Z"` → 25, `"AA"` → 26.
pub fn column_index(letters: &str) -> Option<u32> {
    if letters.is_empty() || letters.len() > 3 {
        return None;
    }
    letters.chars().try_fold(0u32, |acc, c| {
        let c = c.to_ascii_uppercase();
        c.is_ascii_uppercase()
            .then(|| acc * 26 + (c as u32 - 'A' as u32 + 1))
    })
    .map(|n| n - 1)
}

// ---------------------------------------------------------------------------
// Load parameters
// ---------------------------------------------------------------------------

/// Everything besides the file itself that determines how a table is loaded.
/// Part of the cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LoadParams {
    /// Worksheet name; the first sheet when `None`.
    pub sheet: Option<String>,
    pub window: SheetWindow,
    pub schema: SchemaDescriptor,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn column_letters() {
        assert_eq!(column_index("A"), Some(0));
        assert_eq!(column_index("b"), Some(1));
        assert_eq!(column_index("R"), Some(17));
        assert_eq!(column_index("AA"), Some(26));
        assert_eq!(column_index(""), None);
        assert_eq!(column_index("B2"), None);
    }

    #[test]
    fn default_window_is_b_to_r_from_row_four() {
        let window = SheetWindow::new(3, "B:R").unwrap();
        assert_eq!(window, SheetWindow::default());
        assert!(matches!(
            SheetWindow::new(3, "R:B"),
            Err(LoadError::BadWindow(_))
        ));
    }

    #[test]
    fn validate_finds_all_required_columns() {
        let schema = SchemaDescriptor::default();
        let idx = schema
            .validate(&headers(&[
                "Invoice ID",
                "City",
                "Customer_type",
                "Gender",
                "Product line",
                "Total",
                "Time",
                " Rating ",
            ]))
            .unwrap();
        assert_eq!(idx.get(Field::City).position, 1);
        assert_eq!(idx.get(Field::Rating).position, 7);
        assert_eq!(idx.get(Field::ProductLine).header, "Product line");
        assert_eq!(idx.get(Field::Time).kind, ColumnKind::TimeOfDay);
    }

    #[test]
    fn validate_reports_missing_column() {
        let schema = SchemaDescriptor::default();
        let err = schema
            .validate(&headers(&["City", "Customer type", "Gender"]))
            .unwrap_err();
        match err {
            LoadError::MissingColumn(name) => assert_eq!(name, "Customer_type"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
