//! Per-column filter state and the rows it derives.
//!
//! [`FilterEngine`] owns the full row collection and the current
//! [`FilterState`]. Every mutation builds a new `FilterState` from the old one
//! and swaps it in, recomputing the filtered rows from scratch whenever a
//! selection changes.

use color_eyre::Result;
use polars::prelude::DataFrame;
use std::collections::BTreeMap;

use crate::dataset::data_columns;
use crate::filter_options::{apply_filters, calculate_filter_options, FilterOption, FilterValue};

/// Selection, search text and panel visibility for one column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnFilter {
    pub column: String,
    /// Selected values, de-duplicated, in the order they were picked.
    pub selected_values: Vec<FilterValue>,
    pub search_term: String,
    pub is_open: bool,
}

impl ColumnFilter {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ..Self::default()
        }
    }

    pub fn is_active(&self) -> bool {
        !self.selected_values.is_empty()
    }

    pub fn is_selected(&self, value: &FilterValue) -> bool {
        self.selected_values.contains(value)
    }

    /// Selection that results from clicking `value`: removed when selected,
    /// appended otherwise.
    pub fn toggled(&self, value: &FilterValue) -> Vec<FilterValue> {
        if self.is_selected(value) {
            self.selected_values
                .iter()
                .filter(|v| *v != value)
                .cloned()
                .collect()
        } else {
            let mut values = self.selected_values.clone();
            values.push(value.clone());
            values
        }
    }

    /// Button text: the label alone, `label: value` for a single selection,
    /// `label (n)` for several.
    pub fn display_text(&self, label: &str) -> String {
        match self.selected_values.as_slice() {
            [] => label.to_string(),
            [single] => format!("{}: {}", label, single),
            many => format!("{} ({})", label, many.len()),
        }
    }
}

/// Filters for every known column plus the rows they let through.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    filters: Vec<ColumnFilter>,
    filtered_data: DataFrame,
    total_count: usize,
}

impl FilterState {
    /// Fresh state over `data`: one empty, closed filter per column and every
    /// row passing.
    pub fn initial(data: &DataFrame, columns: &[String]) -> Self {
        Self {
            filters: columns.iter().map(ColumnFilter::new).collect(),
            filtered_data: data.clone(),
            total_count: data.height(),
        }
    }

    pub fn filters(&self) -> &[ColumnFilter] {
        &self.filters
    }

    pub fn filter(&self, column: &str) -> Option<&ColumnFilter> {
        self.filters.iter().find(|f| f.column == column)
    }

    pub fn filtered_data(&self) -> &DataFrame {
        &self.filtered_data
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn has_active_filters(&self) -> bool {
        self.filters.iter().any(ColumnFilter::is_active)
    }

    /// Number of selected values summed over all columns.
    pub fn applied_filter_count(&self) -> usize {
        self.filters.iter().map(|f| f.selected_values.len()).sum()
    }

    /// Active selections, optionally leaving one column out.
    pub fn selections_excluding(
        &self,
        excluded: Option<&str>,
    ) -> BTreeMap<String, Vec<FilterValue>> {
        self.filters
            .iter()
            .filter(|f| f.is_active() && Some(f.column.as_str()) != excluded)
            .map(|f| (f.column.clone(), f.selected_values.clone()))
            .collect()
    }

    /// New state with `column`'s selection replaced and the filtered rows
    /// recomputed over `data`. Unknown columns leave the state unchanged.
    pub fn with_selection(
        &self,
        data: &DataFrame,
        column: &str,
        values: Vec<FilterValue>,
    ) -> Result<Self> {
        if self.filter(column).is_none() {
            return Ok(self.clone());
        }

        let mut deduped: Vec<FilterValue> = Vec::with_capacity(values.len());
        for value in values {
            if !deduped.contains(&value) {
                deduped.push(value);
            }
        }

        let filters: Vec<ColumnFilter> = self
            .filters
            .iter()
            .map(|f| {
                if f.column == column {
                    ColumnFilter {
                        selected_values: deduped.clone(),
                        ..f.clone()
                    }
                } else {
                    f.clone()
                }
            })
            .collect();

        let next = Self {
            filters,
            filtered_data: DataFrame::default(),
            total_count: 0,
        };
        let filtered_data = apply_filters(data, &next.selections_excluding(None))?;
        Ok(Self {
            total_count: filtered_data.height(),
            filtered_data,
            ..next
        })
    }

    /// New state with `column`'s search text replaced.
    pub fn with_search(&self, column: &str, term: &str) -> Self {
        self.map_filter(column, |f| ColumnFilter {
            search_term: term.to_string(),
            ..f.clone()
        })
    }

    /// New state with `column`'s panel flipped open/closed.
    pub fn with_toggled(&self, column: &str) -> Self {
        self.map_filter(column, |f| ColumnFilter {
            is_open: !f.is_open,
            ..f.clone()
        })
    }

    /// New state with every selection and search cleared, every panel closed,
    /// and all of `data` passing.
    pub fn cleared(&self, data: &DataFrame) -> Self {
        Self {
            filters: self
                .filters
                .iter()
                .map(|f| ColumnFilter::new(f.column.clone()))
                .collect(),
            filtered_data: data.clone(),
            total_count: data.height(),
        }
    }

    fn map_filter(&self, column: &str, f: impl Fn(&ColumnFilter) -> ColumnFilter) -> Self {
        Self {
            filters: self
                .filters
                .iter()
                .map(|filter| {
                    if filter.column == column {
                        f(filter)
                    } else {
                        filter.clone()
                    }
                })
                .collect(),
            ..self.clone()
        }
    }
}

impl PartialEq for FilterState {
    fn eq(&self, other: &Self) -> bool {
        self.total_count == other.total_count
            && self.filters == other.filters
            && self.filtered_data.equals_missing(&other.filtered_data)
    }
}

/// Owner of the row collection and its filter state.
#[derive(Debug, Clone, Default)]
pub struct FilterEngine {
    data: DataFrame,
    columns: Vec<String>,
    state: FilterState,
}

impl FilterEngine {
    /// The empty engine: no rows, no filters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine loaded with `data`.
    pub fn with_data(data: DataFrame) -> Self {
        let mut engine = Self::new();
        engine.set_data(data);
        engine
    }

    /// Replace the rows. Every column of `data` except the identifier becomes
    /// a known column with an empty filter.
    pub fn set_data(&mut self, data: DataFrame) {
        self.columns = data_columns(&data);
        self.state = FilterState::initial(&data, &self.columns);
        self.data = data;
        log::info!(
            "filter engine loaded {} rows over columns {:?}",
            self.data.height(),
            self.columns
        );
    }

    pub fn update_selection(&mut self, column: &str, values: Vec<FilterValue>) -> Result<()> {
        if !self.knows(column) {
            return Ok(());
        }
        self.state = self.state.with_selection(&self.data, column, values)?;
        log::debug!(
            "selection on {}: {} value(s), {} of {} rows pass",
            column,
            self.state.filter(column).map_or(0, |f| f.selected_values.len()),
            self.state.total_count(),
            self.data.height()
        );
        Ok(())
    }

    pub fn update_search(&mut self, column: &str, term: &str) {
        if self.knows(column) {
            self.state = self.state.with_search(column, term);
        }
    }

    pub fn toggle_open(&mut self, column: &str) {
        if self.knows(column) {
            self.state = self.state.with_toggled(column);
        }
    }

    pub fn clear_all(&mut self) {
        self.state = self.state.cleared(&self.data);
        log::debug!("cleared all filters, {} rows pass", self.state.total_count());
    }

    /// Options for `column` over the rows passing every *other* column's
    /// selection, scoped by the column's own search text.
    pub fn facet_options(&self, column: &str) -> Result<Vec<FilterOption>> {
        let Some(filter) = self.state.filter(column) else {
            log::warn!("options requested for unknown column {}", column);
            return Ok(Vec::new());
        };
        let others = self.state.selections_excluding(Some(column));
        let available = apply_filters(&self.data, &others)?;
        calculate_filter_options(&available, column, &filter.search_term)
    }

    pub fn data(&self) -> &DataFrame {
        &self.data
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn filter(&self, column: &str) -> Option<&ColumnFilter> {
        self.state.filter(column)
    }

    pub fn filtered_data(&self) -> &DataFrame {
        self.state.filtered_data()
    }

    pub fn total_count(&self) -> usize {
        self.state.total_count()
    }

    pub fn has_active_filters(&self) -> bool {
        self.state.has_active_filters()
    }

    pub fn applied_filter_count(&self) -> usize {
        self.state.applied_filter_count()
    }

    fn knows(&self, column: &str) -> bool {
        let known = self.columns.iter().any(|c| c == column);
        if !known {
            log::warn!("ignoring filter change for unknown column {}", column);
        }
        known
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn two_rows() -> DataFrame {
        df!(
            "id" => ["1", "2"],
            "number" => [100i64, 200],
            "mod350" => [100i64, 200]
        )
        .unwrap()
    }

    #[test]
    fn test_empty_engine() {
        let engine = FilterEngine::new();
        assert_eq!(engine.data().height(), 0);
        assert_eq!(engine.total_count(), 0);
        assert_eq!(engine.filtered_data().height(), 0);
        assert!(engine.state().filters().is_empty());
        assert!(engine.facet_options("number").unwrap().is_empty());
    }

    #[test]
    fn test_set_data_creates_filters() {
        let engine = FilterEngine::with_data(two_rows());
        assert_eq!(engine.columns(), &["number", "mod350"]);
        assert_eq!(engine.total_count(), 2);
        let filter = engine.filter("number").unwrap();
        assert!(filter.selected_values.is_empty());
        assert!(filter.search_term.is_empty());
        assert!(!filter.is_open);
        assert!(engine.filter("id").is_none());
    }

    #[test]
    fn test_selection_dedups() {
        let mut engine = FilterEngine::with_data(two_rows());
        engine
            .update_selection(
                "number",
                vec![FilterValue::Number(100), FilterValue::Number(100)],
            )
            .unwrap();
        assert_eq!(
            engine.filter("number").unwrap().selected_values,
            vec![FilterValue::Number(100)]
        );
        assert_eq!(engine.applied_filter_count(), 1);
    }

    #[test]
    fn test_with_selection_leaves_previous_state() {
        let engine = FilterEngine::with_data(two_rows());
        let before = engine.state().clone();
        let after = before
            .with_selection(engine.data(), "number", vec![FilterValue::Number(100)])
            .unwrap();
        assert_eq!(before.total_count(), 2);
        assert_eq!(after.total_count(), 1);
        assert!(!before.has_active_filters());
        assert_ne!(before, after);
        assert_eq!(&before, engine.state());
        assert_eq!(after.cleared(engine.data()), before);
    }

    #[test]
    fn test_column_filter_toggled() {
        let mut filter = ColumnFilter::new("number");
        let (a, b) = (FilterValue::Number(100), FilterValue::Number(200));
        filter.selected_values = filter.toggled(&a);
        filter.selected_values = filter.toggled(&b);
        assert_eq!(filter.selected_values, vec![a.clone(), b.clone()]);
        filter.selected_values = filter.toggled(&a);
        assert_eq!(filter.selected_values, vec![FilterValue::Number(200)]);
    }

    #[test]
    fn test_column_filter_display_text() {
        let mut filter = ColumnFilter::new("number");
        assert_eq!(filter.display_text("number"), "number");
        filter.selected_values = vec![FilterValue::Number(1)];
        assert_eq!(filter.display_text("number"), "number: 1");
        filter.selected_values = vec![FilterValue::Number(1), FilterValue::Number(2)];
        assert_eq!(filter.display_text("number"), "number (2)");
    }

    #[test]
    fn test_unknown_column_is_noop() {
        let mut engine = FilterEngine::with_data(two_rows());
        engine
            .update_selection("nope", vec![FilterValue::Number(1)])
            .unwrap();
        engine.update_search("nope", "x");
        engine.toggle_open("nope");
        assert_eq!(engine.total_count(), 2);
        assert!(engine.filter("nope").is_none());
        assert!(engine.facet_options("nope").unwrap().is_empty());
    }
}
