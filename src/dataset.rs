//! Deterministic sample dataset.

use color_eyre::Result;
use polars::prelude::*;

use crate::DatasetSize;

/// Identifier column; never offered as a filter.
pub const ID_COLUMN: &str = "id";
/// Base number column.
pub const BASE_COLUMN: &str = "number";
/// Moduli applied to the base value, one derived column each.
pub const MODULI: [i64; 3] = [20002, 350, 8000];

/// Name of the column holding `number % modulus`.
pub fn modulus_column(modulus: i64) -> String {
    format!("mod{}", modulus)
}

/// Generate the sample rows for `size`.
///
/// Columns are `id`, `number`, then one `mod<N>` column per entry in [`MODULI`].
/// Row `i` has id `row-<i>`; rows are in generation order.
pub fn generate(size: DatasetSize) -> Result<DataFrame> {
    let count = size.row_count();
    let numbers: Vec<i64> = (0..count).map(|i| size.base_value(i)).collect();
    let ids: Vec<String> = (0..count).map(|i| format!("row-{}", i)).collect();

    let mut columns: Vec<Column> = Vec::with_capacity(MODULI.len() + 2);
    columns.push(Series::new(ID_COLUMN.into(), ids).into());
    for modulus in MODULI {
        let derived: Vec<i64> = numbers.iter().map(|n| n % modulus).collect();
        columns.push(Series::new(modulus_column(modulus).into(), derived).into());
    }
    columns.insert(1, Series::new(BASE_COLUMN.into(), numbers).into());

    let df = DataFrame::new(columns)?;
    log::info!(
        "generated {} dataset: {} rows, {} columns",
        size.as_str(),
        df.height(),
        df.width()
    );
    Ok(df)
}

/// Filterable columns of `df` in frame order: everything except [`ID_COLUMN`].
pub fn data_columns(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .filter(|name| name != ID_COLUMN)
        .collect()
}
