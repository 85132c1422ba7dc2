// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;
use std::ops::Range;

use crate::columns::ColumnVisibility;
use crate::ids::RecordKey;
use crate::query::{Choice, FilterSet, QueryError, filter_records};
use crate::table::{CellValue, TableRecord};
use crate::{References, SortDirection, TableKind};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page_size: usize,
    page_index: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
            page_index: 0,
        }
    }

    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    pub const fn page_index(&self) -> usize {
        self.page_index
    }

    pub const fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size)
    }

    pub fn page_range(&self, total: usize) -> Range<usize> {
        let start = self.page_index.saturating_mul(self.page_size).min(total);
        let end = start.saturating_add(self.page_size).min(total);
        start..end
    }

    pub fn paginate<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.page_range(items.len())]
    }

    pub fn go_to_page(&mut self, page: usize, total: usize) -> bool {
        if page >= self.page_count(total) {
            return false;
        }
        self.page_index = page;
        true
    }

    pub fn next(&mut self, total: usize) -> bool {
        self.go_to_page(self.page_index + 1, total)
    }

    pub fn previous(&mut self) -> bool {
        if self.page_index == 0 {
            return false;
        }
        self.page_index -= 1;
        true
    }

    pub fn first(&mut self) {
        self.page_index = 0;
    }

    pub fn set_page_size(&mut self, size: usize) -> bool {
        if size == 0 || size > MAX_PAGE_SIZE {
            return false;
        }
        self.page_size = size;
        self.page_index = 0;
        true
    }

    pub fn clamp(&mut self, total: usize) {
        let last = self.page_count(total).saturating_sub(1);
        self.page_index = self.page_index.min(last);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub column: &'static str,
    pub direction: SortDirection,
}

/// Stable sort by one column; equal cells fall back to ascending id.
pub fn sort_records<R: TableRecord>(rows: &mut Vec<&R>, sort: Option<SortSpec>, refs: &References) {
    match sort {
        None => rows.sort_by(|a, b| a.id().cmp(b.id())),
        Some(spec) => {
            let mut keyed = rows
                .drain(..)
                .map(|row| (row.cell(spec.column, refs), row))
                .collect::<Vec<(CellValue, &R)>>();
            keyed.sort_by(|(cell_a, a), (cell_b, b)| {
                let ord = cell_a.compare(cell_b);
                let ord = match spec.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                };
                ord.then_with(|| a.id().cmp(b.id()))
            });
            rows.extend(keyed.into_iter().map(|(_, row)| row));
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewPage<'a, R> {
    pub rows: Vec<&'a R>,
    pub page_index: usize,
    pub page_count: usize,
    pub total_matches: usize,
    pub total_records: usize,
}

/// Everything the user has set on one table: query, filters, sort, paging,
/// column visibility, cursor and selection.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub kind: TableKind,
    query: String,
    filters: FilterSet,
    sort: Option<SortSpec>,
    pub pager: Pager,
    pub columns: ColumnVisibility,
    cursor_row: usize,
    cursor_col: usize,
    selection: BTreeSet<String>,
}

impl TableView {
    pub fn new(kind: TableKind) -> Self {
        Self::with_page_size(kind, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(kind: TableKind, page_size: usize) -> Self {
        Self {
            kind,
            query: String::new(),
            filters: FilterSet::new(),
            sort: None,
            pager: Pager::new(page_size),
            columns: ColumnVisibility::new(kind.columns()),
            cursor_row: 0,
            cursor_col: 0,
            selection: BTreeSet::new(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub const fn sort(&self) -> Option<SortSpec> {
        self.sort
    }

    pub const fn cursor_row(&self) -> usize {
        self.cursor_row
    }

    fn reset_to_first_page(&mut self) {
        self.pager.first();
        self.cursor_row = 0;
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.reset_to_first_page();
    }

    pub fn push_query_char(&mut self, ch: char) {
        self.query.push(ch);
        self.reset_to_first_page();
    }

    pub fn pop_query_char(&mut self) {
        self.query.pop();
        self.reset_to_first_page();
    }

    pub fn set_filter(&mut self, key: &str, choice: Choice) -> Result<(), QueryError> {
        self.filters.set(self.kind, key, choice)?;
        self.reset_to_first_page();
        Ok(())
    }

    /// Steps a filter through `all` and each declared choice, wrapping.
    pub fn cycle_filter(&mut self, key: &str, step: isize) -> Result<Choice, QueryError> {
        let Some(spec) = self.kind.filter(key) else {
            return Err(QueryError::UnknownFilter {
                table: self.kind,
                key: key.to_owned(),
            });
        };
        let current = match self.filters.get(key) {
            Choice::All => 0,
            Choice::Only(value) => spec
                .choices
                .iter()
                .position(|choice| *choice == value)
                .map_or(0, |index| index + 1),
        };
        let slots = spec.choices.len() as isize + 1;
        let next = (current as isize + step).rem_euclid(slots) as usize;
        let choice = if next == 0 {
            Choice::All
        } else {
            Choice::Only(spec.choices[next - 1].to_owned())
        };
        self.set_filter(key, choice.clone())?;
        Ok(choice)
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.reset_to_first_page();
    }

    /// New column sorts ascending; the same column flips direction.
    pub fn toggle_sort(&mut self, column: &str) -> bool {
        let Some(spec) = self.kind.column(column).filter(|spec| spec.sortable) else {
            return false;
        };
        self.sort = Some(match self.sort {
            Some(current) if current.column == spec.key => SortSpec {
                column: spec.key,
                direction: current.direction.flipped(),
            },
            _ => SortSpec {
                column: spec.key,
                direction: SortDirection::Asc,
            },
        });
        true
    }

    pub fn clear_sort(&mut self) {
        self.sort = None;
    }

    pub fn move_row(&mut self, delta: isize, rows_on_page: usize) {
        if rows_on_page == 0 {
            self.cursor_row = 0;
            return;
        }
        let next = self.cursor_row as isize + delta;
        self.cursor_row = next.clamp(0, rows_on_page as isize - 1) as usize;
    }

    pub fn move_column(&mut self, delta: isize) {
        let visible = self.columns.visible_keys().len();
        if visible == 0 {
            self.cursor_col = 0;
            return;
        }
        let next = self.cursor_col as isize + delta;
        self.cursor_col = next.clamp(0, visible as isize - 1) as usize;
    }

    /// Column under the cursor, among the visible columns.
    pub fn cursor_column(&self) -> Option<&'static str> {
        let visible = self.columns.visible_keys();
        visible
            .get(self.cursor_col.min(visible.len().saturating_sub(1)))
            .copied()
    }

    pub fn next_page(&mut self, total: usize) -> bool {
        let moved = self.pager.next(total);
        if moved {
            self.cursor_row = 0;
        }
        moved
    }

    pub fn previous_page(&mut self) -> bool {
        let moved = self.pager.previous();
        if moved {
            self.cursor_row = 0;
        }
        moved
    }

    pub fn set_page_size(&mut self, size: usize) -> bool {
        let changed = self.pager.set_page_size(size);
        if changed {
            self.cursor_row = 0;
        }
        changed
    }

    pub fn toggle_selected(&mut self, id: &str) -> bool {
        if self.selection.remove(id) {
            false
        } else {
            self.selection.insert(id.to_owned());
            true
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.contains(id)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selected_ids(&self) -> Vec<String> {
        self.selection.iter().cloned().collect()
    }

    /// Filter, sort, then paginate `records`. Clamps the page and cursor into
    /// range and drops selected ids that no longer exist.
    pub fn project<'a, R: TableRecord>(
        &mut self,
        records: &'a [R],
        refs: &References,
    ) -> ViewPage<'a, R> {
        let mut matches = filter_records(records, &self.query, &self.filters);
        sort_records(&mut matches, self.sort, refs);

        if !self.selection.is_empty() {
            let live = records
                .iter()
                .map(|record| record.id().as_str())
                .collect::<BTreeSet<_>>();
            self.selection.retain(|id| live.contains(id.as_str()));
        }

        let total_matches = matches.len();
        self.pager.clamp(total_matches);
        let rows = self.pager.paginate(&matches).to_vec();
        self.cursor_row = self.cursor_row.min(rows.len().saturating_sub(1));

        ViewPage {
            rows,
            page_index: self.pager.page_index(),
            page_count: self.pager.page_count(total_matches),
            total_matches,
            total_records: records.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Pager, TableView};
    use crate::query::Choice;
    use crate::{
        Call, CallDirection, CallId, CallStatus, RecordKey, References, SortDirection, TableKind,
    };
    use time::macros::datetime;

    fn call(seq: u64) -> Call {
        Call {
            id: CallId::from_sequence(seq),
            client_name: "Rita Ng".to_owned(),
            phone_number: "+44 20 7946 0000".to_owned(),
            agent_name: "Sam".to_owned(),
            direction: CallDirection::Inbound,
            status: CallStatus::Completed,
            duration_secs: 60,
            notes: String::new(),
            created_at: datetime!(2025-10-01 08:00 UTC),
            updated_at: datetime!(2025-10-01 08:00 UTC),
        }
    }

    #[test]
    fn five_digit_ids_follow_four_digit_ids() {
        let records = [10_000, 1_001, 1_000, 9_999].map(call);
        let refs = References::default();

        let mut view = TableView::with_page_size(TableKind::Calls, 10);
        let unsorted = view
            .project(&records, &refs)
            .rows
            .iter()
            .map(|row| row.id.get())
            .collect::<Vec<_>>();
        assert_eq!(unsorted, ["CALL-1000", "CALL-1001", "CALL-9999", "CALL-10000"]);

        assert!(view.toggle_sort("id"));
        assert!(view.toggle_sort("id"));
        let descending = view
            .project(&records, &refs)
            .rows
            .iter()
            .map(|row| row.id.get())
            .collect::<Vec<_>>();
        assert_eq!(descending, ["CALL-10000", "CALL-9999", "CALL-1001", "CALL-1000"]);
    }

    #[test]
    fn twenty_three_rows_make_three_pages() {
        let items = (0..23).collect::<Vec<_>>();
        let mut pager = Pager::new(10);
        assert_eq!(pager.page_count(items.len()), 3);
        assert_eq!(pager.paginate(&items).len(), 10);
        assert!(pager.next(items.len()));
        assert_eq!(pager.paginate(&items).len(), 10);
        assert!(pager.next(items.len()));
        assert_eq!(pager.paginate(&items), &[20, 21, 22]);
        assert!(!pager.next(items.len()));
        assert_eq!(pager.page_index(), 2);
    }

    #[test]
    fn pager_bounds() {
        let mut pager = Pager::new(5);
        assert!(!pager.previous());
        assert!(!pager.go_to_page(4, 20));
        assert!(pager.go_to_page(3, 20));
        pager.clamp(6);
        assert_eq!(pager.page_index(), 1);
        assert!(!pager.set_page_size(0));
        assert!(pager.set_page_size(3));
        assert_eq!(pager.page_index(), 0);
        assert_eq!(pager.page_count(0), 0);
        assert_eq!(pager.page_range(0), 0..0);
    }

    #[test]
    fn sort_toggles_and_rejects_unsortable_columns() {
        let mut view = TableView::new(TableKind::BankAccounts);
        assert!(view.toggle_sort("balance"));
        assert_eq!(view.sort().map(|sort| sort.direction), Some(SortDirection::Asc));
        assert!(view.toggle_sort("balance"));
        assert_eq!(view.sort().map(|sort| sort.direction), Some(SortDirection::Desc));
        assert!(view.toggle_sort("status"));
        assert_eq!(view.sort().map(|sort| sort.column), Some("status"));
        assert_eq!(view.sort().map(|sort| sort.direction), Some(SortDirection::Asc));
        assert!(!view.toggle_sort("account_number"));
        assert!(!view.toggle_sort("nope"));
        view.clear_sort();
        assert_eq!(view.sort(), None);
    }

    #[test]
    fn query_and_filter_changes_reset_to_first_page() -> anyhow::Result<()> {
        let mut view = TableView::with_page_size(TableKind::Calls, 2);
        assert!(view.pager.go_to_page(3, 10));
        view.push_query_char('a');
        assert_eq!(view.pager.page_index(), 0);

        assert!(view.pager.go_to_page(2, 10));
        view.set_filter("status", Choice::parse("missed"))?;
        assert_eq!(view.pager.page_index(), 0);
        Ok(())
    }

    #[test]
    fn cycle_filter_wraps_through_all() -> anyhow::Result<()> {
        let mut view = TableView::new(TableKind::Calls);
        assert_eq!(view.cycle_filter("direction", 1)?, Choice::parse("inbound"));
        assert_eq!(view.cycle_filter("direction", 1)?, Choice::parse("outbound"));
        assert_eq!(view.cycle_filter("direction", 1)?, Choice::All);
        assert_eq!(view.cycle_filter("direction", -1)?, Choice::parse("outbound"));
        assert!(view.cycle_filter("ghost", 1).is_err());
        Ok(())
    }

    #[test]
    fn column_cursor_tracks_visible_columns() {
        let mut view = TableView::new(TableKind::Calls);
        view.move_column(1);
        assert_eq!(view.cursor_column(), Some("client_name"));
        view.columns.hide_all();
        view.move_column(1);
        assert_eq!(view.cursor_column(), None);
    }
}
