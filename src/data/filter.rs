use std::collections::BTreeSet;

use super::model::{CellValue, SalesTable, Transaction};

// ---------------------------------------------------------------------------
// Filter dimensions
// ---------------------------------------------------------------------------

/// The three categorical columns the sidebar filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dimension {
    City,
    CustomerType,
    Gender,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::City, Dimension::CustomerType, Dimension::Gender];

    /// Sidebar label.
    pub fn label(self) -> &'static str {
        match self {
            Dimension::City => "City",
            Dimension::CustomerType => "Customer type",
            Dimension::Gender => "Gender",
        }
    }

    /// The row's value for this dimension.
    pub fn value_of(self, tx: &Transaction) -> &str {
        match self {
            Dimension::City => &tx.city,
            Dimension::CustomerType => &tx.customer_type,
            Dimension::Gender => &tx.gender,
        }
    }

    /// Distinct values of this dimension, in order of first appearance.
    pub fn options(self, table: &SalesTable) -> &[String] {
        match self {
            Dimension::City => &table.cities,
            Dimension::CustomerType => &table.customer_types,
            Dimension::Gender => &table.genders,
        }
    }
}

// ---------------------------------------------------------------------------
// Filter selection
// ---------------------------------------------------------------------------

/// Selected values per dimension.
///
/// A row passes when its value is selected in *every* dimension.  An empty
/// set selects nothing: there is no implicit "all" fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    cities: BTreeSet<String>,
    customer_types: BTreeSet<String>,
    genders: BTreeSet<String>,
}

impl FilterSelection {
    /// Every distinct value selected (i.e., show everything).
    pub fn all(table: &SalesTable) -> Self {
        let mut selection = Self::default();
        for dim in Dimension::ALL {
            selection.select_all(table, dim);
        }
        selection
    }

    pub fn selected(&self, dim: Dimension) -> &BTreeSet<String> {
        match dim {
            Dimension::City => &self.cities,
            Dimension::CustomerType => &self.customer_types,
            Dimension::Gender => &self.genders,
        }
    }

    fn selected_mut(&mut self, dim: Dimension) -> &mut BTreeSet<String> {
        match dim {
            Dimension::City => &mut self.cities,
            Dimension::CustomerType => &mut self.customer_types,
            Dimension::Gender => &mut self.genders,
        }
    }

    pub fn contains(&self, dim: Dimension, value: &str) -> bool {
        self.selected(dim).contains(value)
    }

    /// Flip a single value in a dimension.
    pub fn toggle(&mut self, dim: Dimension, value: &str) {
        let selected = self.selected_mut(dim);
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
    }

    /// Select all values in a dimension.
    pub fn select_all(&mut self, table: &SalesTable, dim: Dimension) {
        *self.selected_mut(dim) = dim.options(table).iter().cloned().collect();
    }

    /// Deselect all values in a dimension.
    pub fn select_none(&mut self, dim: Dimension) {
        self.selected_mut(dim).clear();
    }

    /// Logical AND of the per-dimension membership tests.
    pub fn matches(&self, tx: &Transaction) -> bool {
        Dimension::ALL
            .iter()
            .all(|&dim| self.contains(dim, dim.value_of(tx)))
    }
}

/// Return indices of transactions that pass the selection, in source order.
pub fn filtered_indices(table: &SalesTable, selection: &FilterSelection) -> Vec<usize> {
    table
        .transactions
        .iter()
        .enumerate()
        .filter(|(_, tx)| selection.matches(tx))
        .map(|(i, _)| i)
        .collect()
}

/// Raw cells of the first `limit` filtered rows, for the preview table.
pub fn preview_rows<'a>(
    table: &'a SalesTable,
    indices: &[usize],
    limit: usize,
) -> Vec<&'a [CellValue]> {
    indices
        .iter()
        .take(limit)
        .filter_map(|&i| table.rows.get(i).map(Vec::as_slice))
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::model::tests::at;

    /// Eight rows covering every City × Customer_type × Gender combination
    /// of two values each, plus product lines and hours that vary.
    pub(crate) fn sample_table() -> SalesTable {
        let mut rows = Vec::new();
        let mut total = 10.0;
        for city in ["Yangon", "Mandalay"] {
            for ctype in ["Member", "Normal"] {
                for gender in ["Female", "Male"] {
                    let line = if gender == "Female" { "Health and beauty" } else { "Sports and travel" };
                    let hour = 10 + rows.len() as u32;
                    rows.push(Transaction::new(city, ctype, gender, line, total, 6.0, at(hour, 15)));
                    total += 10.0;
                }
            }
        }
        SalesTable::from_transactions(rows)
    }

    /// All subsets of a slice, including the empty one.
    fn subsets(values: &[String]) -> Vec<BTreeSet<String>> {
        (0..1u32 << values.len())
            .map(|mask| {
                values
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| mask & (1 << i) != 0)
                    .map(|(_, v)| v.clone())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn default_selection_keeps_every_row() {
        let table = sample_table();
        let selection = FilterSelection::all(&table);
        assert_eq!(filtered_indices(&table, &selection), (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn filtered_view_is_the_membership_conjunction() {
        let table = sample_table();
        for cities in subsets(&table.cities) {
            for ctypes in subsets(&table.customer_types) {
                for genders in subsets(&table.genders) {
                    let selection = FilterSelection {
                        cities: cities.clone(),
                        customer_types: ctypes.clone(),
                        genders: genders.clone(),
                    };
                    let expected: Vec<usize> = table
                        .transactions
                        .iter()
                        .enumerate()
                        .filter(|(_, t)| {
                            cities.contains(&t.city)
                                && ctypes.contains(&t.customer_type)
                                && genders.contains(&t.gender)
                        })
                        .map(|(i, _)| i)
                        .collect();
                    assert_eq!(filtered_indices(&table, &selection), expected);
                }
            }
        }
    }

    #[test]
    fn empty_dimension_selects_nothing() {
        let table = sample_table();
        for dim in Dimension::ALL {
            let mut selection = FilterSelection::all(&table);
            selection.select_none(dim);
            assert!(filtered_indices(&table, &selection).is_empty(), "{dim:?}");
        }
    }

    #[test]
    fn toggling_flips_membership() {
        let table = sample_table();
        let mut selection = FilterSelection::all(&table);
        selection.toggle(Dimension::City, "Yangon");
        assert!(!selection.contains(Dimension::City, "Yangon"));
        assert_eq!(filtered_indices(&table, &selection), vec![4, 5, 6, 7]);

        selection.toggle(Dimension::City, "Yangon");
        selection.toggle(Dimension::Gender, "Male");
        assert_eq!(filtered_indices(&table, &selection), vec![0, 2, 4, 6]);

        selection.select_all(&table, Dimension::Gender);
        assert_eq!(filtered_indices(&table, &selection).len(), 8);
    }

    #[test]
    fn preview_is_capped() {
        let mut table = sample_table();
        table.rows = (0..table.len())
            .map(|i| vec![CellValue::Integer(i as i64)])
            .collect();
        let indices: Vec<usize> = (0..8).rev().collect();
        let preview = preview_rows(&table, &indices, 3);
        assert_eq!(preview.len(), 3);
        assert_eq!(preview[0], [CellValue::Integer(7)]);
    }
}
