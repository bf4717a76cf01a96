//! Distinct-value options for a column and the row predicate behind them.

use color_eyre::Result;
use polars::prelude::*;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// A single cell value as seen by filters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FilterValue {
    Number(i64),
    Text(String),
}

impl FilterValue {
    pub fn is_number(&self) -> bool {
        matches!(self, FilterValue::Number(_))
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Number(n) => write!(f, "{}", n),
            FilterValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Number(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

/// One selectable value of a column with its occurrence count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOption {
    pub value: FilterValue,
    pub label: String,
    pub count: usize,
}

/// Typed read access to one column. Integer columns are widened to i64,
/// everything else is read through its string form.
enum ColumnView {
    Numbers(Int64Chunked),
    Text(StringChunked),
}

impl ColumnView {
    fn from_series(series: &Series) -> Result<Self> {
        if series.dtype().is_integer() {
            let cast = series.cast(&DataType::Int64)?;
            Ok(Self::Numbers(cast.i64()?.clone()))
        } else {
            let cast = series.cast(&DataType::String)?;
            Ok(Self::Text(cast.str()?.clone()))
        }
    }

    /// `None` when the frame has no such column.
    fn of(df: &DataFrame, column: &str) -> Result<Option<Self>> {
        match df.column(column) {
            Ok(col) => Ok(Some(Self::from_series(col.as_materialized_series())?)),
            Err(_) => Ok(None),
        }
    }

    fn get(&self, idx: usize) -> Option<FilterValue> {
        match self {
            Self::Numbers(ca) => ca.get(idx).map(FilterValue::Number),
            Self::Text(ca) => ca.get(idx).map(FilterValue::from),
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Numbers(ca) => ca.len(),
            Self::Text(ca) => ca.len(),
        }
    }
}

/// Distinct values of `column` in `df` with their counts.
///
/// Nulls are skipped. A non-empty `search_term` keeps only options whose label
/// contains it, ignoring case. Numeric options come back largest first, text
/// options in label order. A column that `df` does not have yields no options.
pub fn calculate_filter_options(
    df: &DataFrame,
    column: &str,
    search_term: &str,
) -> Result<Vec<FilterOption>> {
    let series = match df.column(column) {
        Ok(col) => col.as_materialized_series(),
        Err(_) => return Ok(Vec::new()),
    };

    let value_counts = series.value_counts(false, false, "counts".into(), false)?;
    let columns = value_counts.get_columns();
    let values = ColumnView::from_series(columns[0].as_materialized_series())?;
    let counts_series = columns[1]
        .as_materialized_series()
        .cast(&DataType::UInt64)?;
    let counts = counts_series.u64()?;

    let needle = search_term.to_lowercase();
    let mut options: Vec<FilterOption> = (0..values.len())
        .filter_map(|idx| {
            let value = values.get(idx)?;
            let count = counts.get(idx).unwrap_or(0) as usize;
            Some(FilterOption {
                label: value.to_string(),
                value,
                count,
            })
        })
        .filter(|option| needle.is_empty() || option.label.to_lowercase().contains(&needle))
        .collect();

    sort_options(&mut options);
    Ok(options)
}

fn sort_options(options: &mut [FilterOption]) {
    let all_numeric = options.iter().all(|o| o.value.is_number());
    options.sort_by(|a, b| match (&a.value, &b.value) {
        (FilterValue::Number(x), FilterValue::Number(y)) if all_numeric => y.cmp(x),
        _ => compare_labels(&a.label, &b.label),
    });
}

/// Dictionary-style label ordering: case-insensitive first, exact as tie-break.
///
/// This approximates locale collation with Unicode lowercasing and code point
/// order. Accented letters sort after the unaccented alphabet rather than
/// next to their base letter.
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Rows of `df` that satisfy every non-empty selection in `selections`.
///
/// Within a column a row passes when its value is one of the selected values;
/// across columns all selections must pass. Row order is preserved. A
/// selection on a column `df` lacks matches no rows.
pub fn apply_filters(
    df: &DataFrame,
    selections: &BTreeMap<String, Vec<FilterValue>>,
) -> Result<DataFrame> {
    let mut active: Vec<(ColumnView, HashSet<&FilterValue>)> = Vec::new();
    for (column, values) in selections {
        if values.is_empty() {
            continue;
        }
        match ColumnView::of(df, column)? {
            Some(view) => active.push((view, values.iter().collect())),
            None => return Ok(df.clear()),
        }
    }

    if active.is_empty() {
        return Ok(df.clone());
    }

    let mask: BooleanChunked = (0..df.height())
        .map(|idx| {
            active.iter().all(|(view, allowed)| {
                view.get(idx)
                    .is_some_and(|value| allowed.contains(&value))
            })
        })
        .collect();

    Ok(df.filter(&mask)?)
}

/// Compact count label: `1.2M`, `3.4K`, or the plain number below 1000.
pub fn format_count(count: usize) -> String {
    if count >= 1_000_000 {
        format!("{:.1}M", count as f64 / 1_000_000.0)
    } else if count >= 1000 {
        format!("{:.1}K", count as f64 / 1000.0)
    } else {
        count.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        df!(
            "id" => ["1", "2", "3"],
            "number" => [100i64, 200, 100],
            "mod350" => [100i64, 200, 100]
        )
        .unwrap()
    }

    fn values(options: &[FilterOption]) -> Vec<(FilterValue, usize)> {
        options.iter().map(|o| (o.value.clone(), o.count)).collect()
    }

    #[test]
    fn test_options_count_and_sort_descending() {
        let options = calculate_filter_options(&sample(), "number", "").unwrap();
        assert_eq!(
            values(&options),
            vec![(FilterValue::Number(200), 1), (FilterValue::Number(100), 2)]
        );
        assert_eq!(options[0].label, "200");
    }

    #[test]
    fn test_options_search_term() {
        let options = calculate_filter_options(&sample(), "number", "10").unwrap();
        assert_eq!(values(&options), vec![(FilterValue::Number(100), 2)]);
    }

    #[test]
    fn test_options_unknown_column() {
        assert!(calculate_filter_options(&sample(), "missing", "")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_text_options_sort_by_label() {
        let df = df!("name" => ["beta", "Alpha", "alpha", "beta"]).unwrap();
        let options = calculate_filter_options(&df, "name", "").unwrap();
        let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["Alpha", "alpha", "beta"]);
        assert_eq!(options[2].count, 2);

        let searched = calculate_filter_options(&df, "name", "ALP").unwrap();
        assert_eq!(searched.len(), 2);
    }

    #[test]
    fn test_compare_labels_folds_case() {
        assert_eq!(compare_labels("Zeta", "alpha"), Ordering::Greater);
        assert_eq!(compare_labels("Éclair", "éclair"), Ordering::Less);
        assert_eq!(compare_labels("ÉCLAIR", "éclair"), Ordering::Less);
        assert_eq!(compare_labels("éclair", "zeta"), Ordering::Greater);
    }

    #[test]
    fn test_options_skip_nulls() {
        let df = df!("n" => [Some(1i64), None, Some(1)]).unwrap();
        let options = calculate_filter_options(&df, "n", "").unwrap();
        assert_eq!(values(&options), vec![(FilterValue::Number(1), 2)]);
    }

    #[test]
    fn test_apply_filters_empty_selection() {
        let mut selections = BTreeMap::new();
        selections.insert("number".to_string(), Vec::new());
        let out = apply_filters(&sample(), &selections).unwrap();
        assert_eq!(out.height(), 3);
    }

    #[test]
    fn test_apply_filters_unknown_column_matches_nothing() {
        let mut selections = BTreeMap::new();
        selections.insert("missing".to_string(), vec![FilterValue::Number(1)]);
        let out = apply_filters(&sample(), &selections).unwrap();
        assert_eq!(out.height(), 0);
        assert_eq!(out.width(), 3);
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1500), "1.5K");
        assert_eq!(format_count(50001), "50.0K");
        assert_eq!(format_count(2_000_000), "2.0M");
    }
}
