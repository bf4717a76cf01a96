#![allow(dead_code)]

use polars::prelude::*;

/// The two-row frame used throughout the engine tests.
pub fn two_rows() -> DataFrame {
    df!(
        "id" => ["row-0", "row-1"],
        "number" => [100i64, 200],
        "mod350" => [100i64, 200]
    )
    .unwrap()
}

/// Twelve rows where `a` cycles 0..3 and `b` cycles 0..4, so every (a, b)
/// pair occurs exactly once.
pub fn grid() -> DataFrame {
    df!(
        "id" => (0..12).map(|i| format!("row-{}", i)).collect::<Vec<String>>(),
        "a" => (0..12i64).map(|i| i % 3).collect::<Vec<i64>>(),
        "b" => (0..12i64).map(|i| i % 4).collect::<Vec<i64>>()
    )
    .unwrap()
}

pub fn i64_values(df: &DataFrame, column: &str) -> Vec<i64> {
    df.column(column)
        .unwrap()
        .as_materialized_series()
        .i64()
        .unwrap()
        .into_no_null_iter()
        .collect()
}

pub fn ids(df: &DataFrame) -> Vec<String> {
    df.column("id")
        .unwrap()
        .as_materialized_series()
        .str()
        .unwrap()
        .into_no_null_iter()
        .map(|s| s.to_string())
        .collect()
}
