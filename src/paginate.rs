use std::{fmt, ops::Range, str::FromStr};

use serde::Serialize;

use crate::error::EngineError;

/// The closed set of page sizes a caller may pick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "usize")]
pub enum RowsPerPage {
    #[default]
    Ten,
    TwentyFive,
    Fifty,
    Hundred,
}

impl RowsPerPage {
    pub const ALL: [RowsPerPage; 4] = [
        RowsPerPage::Ten,
        RowsPerPage::TwentyFive,
        RowsPerPage::Fifty,
        RowsPerPage::Hundred,
    ];

    pub fn get(self) -> usize {
        match self {
            RowsPerPage::Ten => 10,
            RowsPerPage::TwentyFive => 25,
            RowsPerPage::Fifty => 50,
            RowsPerPage::Hundred => 100,
        }
    }
}

impl From<RowsPerPage> for usize {
    fn from(value: RowsPerPage) -> Self {
        value.get()
    }
}

impl TryFrom<usize> for RowsPerPage {
    type Error = EngineError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        RowsPerPage::ALL
            .into_iter()
            .find(|candidate| candidate.get() == value)
            .ok_or(EngineError::UnsupportedPageSize(value))
    }
}

impl FromStr for RowsPerPage {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parsed: usize = value
            .trim()
            .parse()
            .map_err(|_| format!("'{value}' is not a number"))?;
        RowsPerPage::try_from(parsed).map_err(|err| err.to_string())
    }
}

impl fmt::Display for RowsPerPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// A single navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStep {
    Previous,
    Next,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Paginator {
    rows_per_page: RowsPerPage,
    current_page: usize,
    total: usize,
}

impl Paginator {
    pub fn new(rows_per_page: RowsPerPage) -> Self {
        Paginator {
            rows_per_page,
            current_page: 0,
            total: 0,
        }
    }

    /// Re-partitions for a view of `total` rows and returns to the first page.
    pub fn recompute(&mut self, total: usize) {
        self.total = total;
        self.current_page = 0;
    }

    pub fn set_rows_per_page(&mut self, rows_per_page: RowsPerPage) {
        self.rows_per_page = rows_per_page;
        self.current_page = 0;
    }

    pub fn rows_per_page(&self) -> RowsPerPage {
        self.rows_per_page
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn page_count(&self) -> usize {
        self.total.div_ceil(self.rows_per_page.get())
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 0
    }

    pub fn has_next(&self) -> bool {
        self.current_page + 1 < self.page_count()
    }

    /// Moves one page; returns false (and changes nothing) at either end.
    pub fn step(&mut self, step: PageStep) -> bool {
        match step {
            PageStep::Previous if self.has_previous() => self.current_page -= 1,
            PageStep::Next if self.has_next() => self.current_page += 1,
            _ => return false,
        }
        true
    }

    /// Positions of the current page within the view.
    pub fn page_range(&self) -> Range<usize> {
        let size = self.rows_per_page.get();
        let start = (self.current_page * size).min(self.total);
        let end = (start + size).min(self.total);
        start..end
    }

    /// Lengths of every page, in order.
    pub fn page_lengths(&self) -> Vec<usize> {
        let size = self.rows_per_page.get();
        (0..self.page_count())
            .map(|page| size.min(self.total - page * size))
            .collect()
    }

    /// Builds the metadata for the current page of `view`.
    ///
    /// The last shown position is found by locating the final row of the page
    /// in `view`; when it cannot be located the total is reported instead.
    pub fn metadata<T: PartialEq>(&self, view: &[T]) -> PageMetadata {
        let range = self.page_range();
        let (first_shown, last_shown) = if range.is_empty() {
            (0, 0)
        } else {
            let last = view
                .get(range.end - 1)
                .and_then(|row| view.iter().position(|candidate| candidate == row))
                .map(|idx| idx + 1)
                .unwrap_or(self.total);
            (range.start + 1, last)
        };
        PageMetadata {
            current_page_index: self.current_page,
            page_count: self.page_count(),
            total_records: self.total,
            first_shown_index: first_shown,
            last_shown_index: last_shown,
            rows_per_page: self.rows_per_page,
            has_previous: self.has_previous(),
            has_next: self.has_next(),
        }
    }
}

/// Pagination facts the renderer needs for one update. Shown indices are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMetadata {
    pub current_page_index: usize,
    pub page_count: usize,
    pub total_records: usize,
    pub first_shown_index: usize,
    pub last_shown_index: usize,
    pub rows_per_page: RowsPerPage,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PageMetadata {
    pub fn summary(&self) -> String {
        format!(
            "Showing {} to {} of {} entries",
            self.first_shown_index, self.last_shown_index, self.total_records
        )
    }

    pub fn position(&self) -> String {
        format!("Page {} of {}", self.current_page_index + 1, self.page_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_per_page_accepts_only_the_fixed_sizes() {
        assert_eq!(RowsPerPage::try_from(25), Ok(RowsPerPage::TwentyFive));
        assert_eq!(
            RowsPerPage::try_from(20),
            Err(EngineError::UnsupportedPageSize(20))
        );
        assert_eq!("100".parse::<RowsPerPage>(), Ok(RowsPerPage::Hundred));
        assert!("ten".parse::<RowsPerPage>().is_err());
    }

    #[test]
    fn twenty_three_rows_make_three_pages() {
        let mut pager = Paginator::new(RowsPerPage::Ten);
        pager.recompute(23);
        assert_eq!(pager.page_count(), 3);
        assert_eq!(pager.page_lengths(), vec![10, 10, 3]);
    }

    #[test]
    fn exact_multiple_has_no_empty_trailing_page() {
        let mut pager = Paginator::new(RowsPerPage::Ten);
        pager.recompute(20);
        assert_eq!(pager.page_lengths(), vec![10, 10]);
    }

    #[test]
    fn stepping_past_either_end_is_ignored() {
        let mut pager = Paginator::new(RowsPerPage::Ten);
        pager.recompute(23);
        assert!(!pager.step(PageStep::Previous));
        assert_eq!(pager.current_page(), 0);
        assert!(pager.step(PageStep::Next));
        assert!(pager.step(PageStep::Next));
        assert!(!pager.step(PageStep::Next));
        assert_eq!(pager.current_page(), 2);
        assert_eq!(pager.page_range(), 20..23);
    }

    #[test]
    fn empty_view_has_no_pages_and_no_navigation() {
        let mut pager = Paginator::new(RowsPerPage::Fifty);
        pager.recompute(0);
        assert_eq!(pager.page_count(), 0);
        assert!(!pager.has_next());
        assert!(!pager.step(PageStep::Next));
        let meta = pager.metadata::<usize>(&[]);
        assert_eq!((meta.first_shown_index, meta.last_shown_index), (0, 0));
    }

    #[test]
    fn changing_page_size_returns_to_first_page() {
        let mut pager = Paginator::new(RowsPerPage::Ten);
        pager.recompute(40);
        pager.step(PageStep::Next);
        pager.set_rows_per_page(RowsPerPage::TwentyFive);
        assert_eq!(pager.current_page(), 0);
        assert_eq!(pager.page_count(), 2);
    }

    #[test]
    fn metadata_reports_shown_range() {
        let view: Vec<usize> = (100..123).collect();
        let mut pager = Paginator::new(RowsPerPage::Ten);
        pager.recompute(view.len());
        pager.step(PageStep::Next);
        let meta = pager.metadata(&view);
        assert_eq!(meta.summary(), "Showing 11 to 20 of 23 entries");
        assert_eq!(meta.position(), "Page 2 of 3");
        pager.step(PageStep::Next);
        assert_eq!(pager.metadata(&view).summary(), "Showing 21 to 23 of 23 entries");
    }
}
