//! Per-column sort state and the single-column row sorter.
//!
//! The sorter orders a view (positions into the normalized rows) by one
//! column. Values shaped like `DD/MM/YYYY` compare as calendar dates; other
//! values use [`compare_generic`]. Missing cells always sort lowest before the
//! direction is applied. The underlying sort is stable.
//!
//! Keys fall into three blocks ordered missing < slash date < anything else,
//! so every `DD/MM/YYYY` string sorts before every other string, including
//! ones that would compare lower as text (`""` or `"0"`). Pairwise date versus
//! text comparison is not transitive, and `sort_by` needs a total order.

use std::{cmp::Ordering, collections::BTreeSet, fmt};

use log::{debug, warn};
use serde::Serialize;

use crate::{
    data::{SlashDate, Value, ValueKind, compare_generic, parse_slash_date},
    rows::Row,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    None,
    Ascending,
    Descending,
}

impl SortDirection {
    /// `Ascending` flips to `Descending`; anything else becomes `Ascending`.
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::None | SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn is_active(self) -> bool {
        self != SortDirection::None
    }

    /// Only `Ascending` yields ascending order. `None` sorts like `Descending`.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::None | SortDirection::Descending => ordering.reverse(),
        }
    }

    pub fn indicator(self) -> &'static str {
        match self {
            SortDirection::None => "",
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            SortDirection::None => "none",
            SortDirection::Ascending => "ascending",
            SortDirection::Descending => "descending",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Direction per column, stored in column order.
///
/// Toggling one column leaves the others untouched, so several columns can be
/// active at once. Consumers that re-sort honor only [`SortState::first_active`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    entries: Vec<(String, SortDirection)>,
}

impl SortState {
    pub fn from_columns<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SortState {
            entries: names
                .into_iter()
                .map(|name| (name.into(), SortDirection::None))
                .collect(),
        }
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.entries.iter().position(|(name, _)| name == column)
    }

    pub fn get(&self, column: &str) -> Option<SortDirection> {
        self.position(column).map(|idx| self.entries[idx].1)
    }

    pub fn set(&mut self, column: &str, direction: SortDirection) -> bool {
        match self.position(column) {
            Some(idx) => {
                self.entries[idx].1 = direction;
                true
            }
            None => false,
        }
    }

    /// Advances `column` to its next direction and returns it.
    pub fn toggle(&mut self, column: &str) -> Option<SortDirection> {
        let idx = self.position(column)?;
        let next = self.entries[idx].1.toggled();
        self.entries[idx].1 = next;
        Some(next)
    }

    /// Column position, name and direction of the first active entry.
    pub fn first_active(&self) -> Option<(usize, &str, SortDirection)> {
        self.entries
            .iter()
            .enumerate()
            .find(|(_, (_, direction))| direction.is_active())
            .map(|(idx, (name, direction))| (idx, name.as_str(), *direction))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
enum SortKey<'a> {
    Missing,
    Date(SlashDate),
    Plain(&'a Value),
}

impl<'a> SortKey<'a> {
    fn of(value: Option<&'a Value>) -> Self {
        match value {
            None => SortKey::Missing,
            Some(value) => parse_slash_date(value)
                .map(SortKey::Date)
                .unwrap_or(SortKey::Plain(value)),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Missing => 0,
            SortKey::Date(_) => 1,
            SortKey::Plain(_) => 2,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Date(a), SortKey::Date(b)) => a.cmp(b),
            (SortKey::Plain(a), SortKey::Plain(b)) => compare_generic(a, b),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum KeyClass {
    Date,
    Plain(ValueKind),
}

fn warn_on_mixed_kinds(keys: &[(usize, SortKey<'_>)], name: &str) {
    let classes: BTreeSet<KeyClass> = keys
        .iter()
        .filter_map(|(_, key)| match key {
            SortKey::Missing => None,
            SortKey::Date(_) => Some(KeyClass::Date),
            SortKey::Plain(value) => Some(KeyClass::Plain(value.kind())),
        })
        .collect();
    if classes.len() > 1 {
        warn!(
            "Column '{name}' mixes {} kinds of values; their relative order is unspecified",
            classes.len()
        );
    }
}

/// Stable sort of `view` (positions into `rows`) by the cell at `column`.
pub fn sort_view(
    view: &mut [usize],
    rows: &[Row],
    column: usize,
    name: &str,
    direction: SortDirection,
) {
    let mut keyed: Vec<(usize, SortKey<'_>)> = view
        .iter()
        .map(|&idx| (idx, SortKey::of(rows[idx].cell(column))))
        .collect();
    warn_on_mixed_kinds(&keyed, name);
    keyed.sort_by(|(_, a), (_, b)| direction.apply(a.compare(b)));
    for (slot, (idx, _)) in view.iter_mut().zip(keyed) {
        *slot = idx;
    }
    debug!("Sorted {} row(s) by '{name}' ({direction})", view.len());
}

/// Sorts `view` by the column called `name`, toggling its direction first when
/// `toggle` is set. Returns the direction used, or `None` for an unknown column.
pub fn sort_by_column(
    view: &mut [usize],
    rows: &[Row],
    state: &mut SortState,
    name: &str,
    toggle: bool,
) -> Option<SortDirection> {
    let column = state.position(name)?;
    let direction = if toggle {
        state.toggle(name)?
    } else {
        state.entries[column].1
    };
    sort_view(view, rows, column, name, direction);
    Some(direction)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(values: &[Option<Value>]) -> Vec<Row> {
        values
            .iter()
            .enumerate()
            .map(|(ordinal, value)| Row {
                ordinal,
                cells: vec![value.clone()],
            })
            .collect()
    }

    fn sorted(rows: &[Row], direction: SortDirection) -> Vec<usize> {
        let mut view: Vec<usize> = (0..rows.len()).collect();
        sort_view(&mut view, rows, 0, "col", direction);
        view
    }

    #[test]
    fn toggle_cycles_without_returning_to_none() {
        let mut state = SortState::from_columns(["name"]);
        assert_eq!(state.toggle("name"), Some(SortDirection::Ascending));
        assert_eq!(state.toggle("name"), Some(SortDirection::Descending));
        assert_eq!(state.toggle("name"), Some(SortDirection::Ascending));
        assert_eq!(state.toggle("missing"), None);
    }

    #[test]
    fn slash_dates_sort_chronologically() {
        let rows = rows(&[
            Some(Value::from("01/12/2023")),
            Some(Value::from("15/03/2022")),
            Some(Value::from("02/01/2023")),
        ]);
        assert_eq!(sorted(&rows, SortDirection::Ascending), vec![1, 2, 0]);
        assert_eq!(sorted(&rows, SortDirection::Descending), vec![0, 2, 1]);
    }

    #[test]
    fn none_direction_sorts_like_descending() {
        let rows = rows(&[
            Some(Value::Integer(1)),
            Some(Value::Integer(3)),
            Some(Value::Integer(2)),
        ]);
        assert_eq!(sorted(&rows, SortDirection::None), vec![1, 2, 0]);
    }

    #[test]
    fn numbers_sort_numerically_and_strings_lexicographically() {
        let numbers = rows(&[
            Some(Value::Integer(10)),
            Some(Value::Float(9.5)),
            Some(Value::Integer(100)),
        ]);
        assert_eq!(sorted(&numbers, SortDirection::Ascending), vec![1, 0, 2]);
        let strings = rows(&[
            Some(Value::from("10")),
            Some(Value::from("9")),
            Some(Value::from("100")),
        ]);
        assert_eq!(sorted(&strings, SortDirection::Ascending), vec![0, 2, 1]);
    }

    #[test]
    fn missing_cells_sort_lowest_and_ties_keep_input_order() {
        let rows = rows(&[
            Some(Value::from("b")),
            None,
            Some(Value::from("a")),
            Some(Value::from("b")),
        ]);
        assert_eq!(sorted(&rows, SortDirection::Ascending), vec![1, 2, 0, 3]);
        assert_eq!(sorted(&rows, SortDirection::Descending), vec![0, 3, 2, 1]);
    }

    #[test]
    fn invalid_slash_dates_sort_before_valid_ones() {
        let rows = rows(&[Some(Value::from("01/01/2000")), Some(Value::from("99/99/9999"))]);
        assert_eq!(sorted(&rows, SortDirection::Ascending), vec![1, 0]);
    }

    #[test]
    fn sort_by_column_toggles_then_sorts() {
        let rows = rows(&[Some(Value::from("Bob")), Some(Value::from("Amy"))]);
        let mut state = SortState::from_columns(["name"]);
        let mut view = vec![0, 1];
        let used = sort_by_column(&mut view, &rows, &mut state, "name", true);
        assert_eq!(used, Some(SortDirection::Ascending));
        assert_eq!(view, vec![1, 0]);
        assert_eq!(sort_by_column(&mut view, &rows, &mut state, "nope", true), None);
    }

    #[test]
    fn first_active_follows_column_order() {
        let mut state = SortState::from_columns(["a", "b", "c"]);
        state.set("c", SortDirection::Ascending);
        state.set("b", SortDirection::Descending);
        assert_eq!(state.first_active(), Some((1, "b", SortDirection::Descending)));
    }
}
