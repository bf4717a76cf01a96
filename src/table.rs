//! Sorting and paging of the filtered rows for display.

use color_eyre::Result;
use polars::prelude::*;

pub const DEFAULT_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn is_descending(&self) -> bool {
        matches!(self, SortDirection::Descending)
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }
}

/// Active table sort: one column and a direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortConfig {
    pub column: String,
    pub direction: SortDirection,
}

impl SortConfig {
    /// Sort that results from clicking `column`'s header.
    ///
    /// Clicking the column currently sorted ascending flips it to descending;
    /// any other click sorts that column ascending.
    pub fn next(current: Option<&SortConfig>, column: &str) -> SortConfig {
        let direction = match current {
            Some(sort) if sort.column == column && sort.direction == SortDirection::Ascending => {
                SortDirection::Descending
            }
            _ => SortDirection::Ascending,
        };
        SortConfig {
            column: column.to_string(),
            direction,
        }
    }

    /// Header marker for `column` under this sort.
    pub fn indicator(sort: Option<&SortConfig>, column: &str) -> &'static str {
        match sort {
            Some(sort) if sort.column == column => sort.direction.arrow(),
            _ => "↕",
        }
    }
}

/// `df` ordered by `sort`, keeping the incoming order among equal values.
/// Without a sort, or for a column `df` lacks, rows come back unchanged.
pub fn sort_rows(df: &DataFrame, sort: Option<&SortConfig>) -> Result<DataFrame> {
    let Some(sort) = sort else {
        return Ok(df.clone());
    };
    if df.column(&sort.column).is_err() {
        return Ok(df.clone());
    }

    let options = SortMultipleOptions {
        descending: vec![sort.direction.is_descending()],
        maintain_order: true,
        ..Default::default()
    };
    let sorted = df
        .clone()
        .lazy()
        .sort_by_exprs(vec![col(sort.column.as_str())], options)
        .collect()?;
    Ok(sorted)
}

/// Page position over a row count, 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current_page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl Pagination {
    /// Pagination over `total_items` with `current_page` clamped into range.
    pub fn new(total_items: usize, page_size: usize, current_page: usize) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total_items.div_ceil(page_size);
        Self {
            current_page: current_page.clamp(1, total_pages.max(1)),
            page_size,
            total_items,
            total_pages,
        }
    }

    /// 1-based position of the first row on the page.
    pub fn start_index(&self) -> usize {
        (self.current_page - 1) * self.page_size + 1
    }

    /// 1-based position of the last row on the page, clamped to the total.
    pub fn end_index(&self) -> usize {
        (self.current_page * self.page_size).min(self.total_items)
    }

    pub fn offset(&self) -> usize {
        (self.current_page - 1) * self.page_size
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn next_page(&self) -> Self {
        Self::new(self.total_items, self.page_size, self.current_page + 1)
    }

    pub fn previous_page(&self) -> Self {
        Self::new(
            self.total_items,
            self.page_size,
            self.current_page.saturating_sub(1),
        )
    }
}

/// Rows of `df` on the page described by `pagination`.
pub fn paginate(df: &DataFrame, pagination: &Pagination) -> DataFrame {
    df.slice(pagination.offset() as i64, pagination.page_size)
}

/// `value` with `,` between groups of three digits.
pub fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
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
