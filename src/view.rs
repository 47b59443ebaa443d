//! The derived-view pipeline: filter, sort and paginate the ledger for display.
//!
//! `derive` is pure. It is recomputed from the ledger and the `ViewState` whenever the dashboard
//! is rendered, so nothing here needs to be kept in sync with the ledger.

use crate::model::{Category, CategoryFilter, Expense};
use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Number of expenses shown initially, and the number added by each `load_more`.
pub const DEFAULT_PAGE_SIZE: usize = 5;

#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Date,
    Amount,
}

serde_plain::derive_display_from_serialize!(SortKey);
serde_plain::derive_fromstr_from_deserialize!(SortKey);

#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

serde_plain::derive_display_from_serialize!(SortDirection);
serde_plain::derive_fromstr_from_deserialize!(SortDirection);

/// Which field to sort by and in which direction. Defaults to newest first.
///
/// The text form is `<key>-<direction>`, e.g. `amount-asc`.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortSpec {
    /// The four sort options offered to the user, in menu order.
    pub const OPTIONS: [SortSpec; 4] = [
        SortSpec::new(SortKey::Date, SortDirection::Desc),
        SortSpec::new(SortKey::Date, SortDirection::Asc),
        SortSpec::new(SortKey::Amount, SortDirection::Desc),
        SortSpec::new(SortKey::Amount, SortDirection::Asc),
    ];

    pub const fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    pub fn label(&self) -> &'static str {
        match (self.key, self.direction) {
            (SortKey::Date, SortDirection::Desc) => "Date (Newest)",
            (SortKey::Date, SortDirection::Asc) => "Date (Oldest)",
            (SortKey::Amount, SortDirection::Desc) => "Amount (High-Low)",
            (SortKey::Amount, SortDirection::Asc) => "Amount (Low-High)",
        }
    }

    fn compare(&self, a: &Expense, b: &Expense) -> Ordering {
        let ordering = match self.key {
            SortKey::Date => a.date().cmp(&b.date()),
            SortKey::Amount => a.amount().cmp(&b.amount()),
        };
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl Display for SortSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.key, self.direction)
    }
}

impl FromStr for SortSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((key, direction)) = s.trim().split_once('-') else {
            bail!("Invalid sort '{s}', expected <date|amount>-<asc|desc>");
        };
        let (Ok(key), Ok(direction)) = (SortKey::from_str(key), SortDirection::from_str(direction))
        else {
            bail!("Invalid sort '{s}', expected <date|amount>-<asc|desc>");
        };
        Ok(Self { key, direction })
    }
}

/// The user's current view settings. This is UI state, not part of the ledger.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    search: String,
    category: CategoryFilter,
    sort: SortSpec,
    visible_count: usize,
    page_size: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl ViewState {
    /// Creates a view state that shows `page_size` expenses at first. A zero page size is
    /// treated as one.
    pub fn new(page_size: usize) -> Self {
        let page_size = page_size.max(1);
        Self {
            search: String::new(),
            category: CategoryFilter::All,
            sort: SortSpec::default(),
            visible_count: page_size,
            page_size,
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn category(&self) -> CategoryFilter {
        self.category
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    pub fn set_category(&mut self, filter: impl Into<CategoryFilter>) {
        self.category = filter.into();
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.sort = sort;
    }

    /// Shows one more page. The visible count only ever grows.
    pub fn load_more(&mut self) {
        self.visible_count = self.visible_count.saturating_add(self.page_size);
    }

    /// Resets the search term, the category filter and the sort order together. The visible count
    /// is left alone.
    pub fn clear_filters(&mut self) {
        self.search.clear();
        self.category = CategoryFilter::All;
        self.sort = SortSpec::default();
    }

    /// True when a search term or a category filter narrows the view.
    pub fn filters_active(&self) -> bool {
        !self.search.is_empty() || !self.category.is_all()
    }

    fn matches(&self, expense: &Expense) -> bool {
        let term = self.search.to_lowercase();
        expense.description().to_lowercase().contains(&term)
            && self.category.matches(expense.category())
    }
}

/// The currently displayed slice of the ledger.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct View {
    /// The visible expenses, in display order.
    pub expenses: Vec<Expense>,
    /// How many expenses passed the filters, including those beyond the visible count.
    pub matched: usize,
    /// Whether more filtered expenses exist beyond the visible count.
    pub has_more: bool,
}

impl View {
    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }
}

/// Filters, sorts and paginates `expenses` according to `state`.
///
/// The sort is stable: expenses that compare equal keep the relative order they have in the
/// ledger.
pub fn derive<'a>(expenses: impl IntoIterator<Item = &'a Expense>, state: &ViewState) -> View {
    let mut filtered: Vec<&Expense> = expenses.into_iter().filter(|e| state.matches(e)).collect();
    filtered.sort_by(|a, b| state.sort.compare(a, b));
    let matched = filtered.len();
    let expenses: Vec<Expense> = filtered
        .into_iter()
        .take(state.visible_count)
        .cloned()
        .collect();
    View {
        expenses,
        matched,
        has_more: matched > state.visible_count,
    }
}

/// Convenience for narrowing a view to one category.
impl From<Category> for ViewState {
    fn from(category: Category) -> Self {
        let mut state = ViewState::default();
        state.set_category(category);
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Ledger;
    use crate::model::{Amount, SeedExpense};
    use crate::seed;
    use chrono::{DateTime, Utc};

    fn seeded() -> Ledger {
        Ledger::from_seed(seed::builtin().unwrap())
    }

    fn descriptions(view: &View) -> Vec<&str> {
        view.expenses.iter().map(|e| e.description()).collect()
    }

    fn expense(description: &str, amount: &str, date: &str) -> SeedExpense {
        SeedExpense {
            description: description.to_string(),
            amount: Amount::from_str(amount).unwrap(),
            category: Category::Other,
            date: DateTime::parse_from_rfc3339(date)
                .unwrap()
                .with_timezone(&Utc),
        }
    }

    #[test]
    fn test_default_view_is_first_page_newest_first() {
        let ledger = seeded();
        let view = derive(&ledger, &ViewState::default());
        assert_eq!(
            descriptions(&view),
            vec![
                "Groceries",
                "Train Ticket",
                "Internet Bill",
                "Coffee with friend",
                "Movie Tickets"
            ]
        );
        assert_eq!(view.matched, 7);
        assert!(view.has_more);
    }

    #[test]
    fn test_food_filter() {
        let ledger = seeded();
        let view = derive(&ledger, &ViewState::from(Category::Food));
        assert_eq!(descriptions(&view), vec!["Groceries", "Coffee with friend"]);
        assert_eq!(view.expenses[0].amount(), Amount::from_str("75.40").unwrap());
        assert_eq!(view.expenses[1].amount(), Amount::from_str("8.75").unwrap());
        assert!(!view.has_more);
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let ledger = seeded();
        let mut state = ViewState::default();
        state.set_search("BILL");
        let view = derive(&ledger, &state);
        assert_eq!(descriptions(&view), vec!["Internet Bill", "Electricity Bill"]);
    }

    #[test]
    fn test_search_and_category_combine() {
        let ledger = seeded();
        let mut state = ViewState::from(Category::Transport);
        state.set_search("t");
        let view = derive(&ledger, &state);
        assert_eq!(descriptions(&view), vec!["Train Ticket"]);
    }

    #[test]
    fn test_no_match_is_empty_view() {
        let ledger = seeded();
        let mut state = ViewState::default();
        state.set_search("yacht");
        let view = derive(&ledger, &state);
        assert!(view.is_empty());
        assert_eq!(view.matched, 0);
        assert!(!view.has_more);
    }

    #[test]
    fn test_amount_sort_reverses() {
        let ledger = Ledger::from_seed(vec![
            expense("a", "3", "2024-01-01T00:00:00Z"),
            expense("b", "1", "2024-01-02T00:00:00Z"),
            expense("c", "2", "2024-01-03T00:00:00Z"),
        ]);
        let mut state = ViewState::default();
        state.set_sort(SortSpec::new(SortKey::Amount, SortDirection::Asc));
        let asc = derive(&ledger, &state);
        state.set_sort(SortSpec::new(SortKey::Amount, SortDirection::Desc));
        let desc = derive(&ledger, &state);
        assert_eq!(descriptions(&asc), vec!["b", "c", "a"]);
        let mut reversed = descriptions(&desc);
        reversed.reverse();
        assert_eq!(descriptions(&asc), reversed);
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        let ledger = Ledger::from_seed(vec![
            expense("first", "5", "2024-01-01T00:00:00Z"),
            expense("second", "5", "2024-01-02T00:00:00Z"),
            expense("cheap", "1", "2024-01-03T00:00:00Z"),
            expense("third", "5", "2024-01-04T00:00:00Z"),
        ]);
        let mut state = ViewState::default();
        state.set_sort(SortSpec::new(SortKey::Amount, SortDirection::Desc));
        assert_eq!(
            descriptions(&derive(&ledger, &state)),
            vec!["first", "second", "third", "cheap"]
        );
        state.set_sort(SortSpec::new(SortKey::Amount, SortDirection::Asc));
        assert_eq!(
            descriptions(&derive(&ledger, &state)),
            vec!["cheap", "first", "second", "third"]
        );
    }

    #[test]
    fn test_load_more_until_exhausted() {
        let ledger = seeded();
        let mut state = ViewState::default();
        assert_eq!(state.visible_count(), 5);
        state.load_more();
        assert_eq!(state.visible_count(), 10);
        let view = derive(&ledger, &state);
        assert_eq!(view.len(), 7);
        assert!(!view.has_more);
        state.load_more();
        assert_eq!(state.visible_count(), 15);
        assert_eq!(derive(&ledger, &state).len(), 7);
    }

    #[test]
    fn test_clear_filters_resets_everything_but_count() {
        let mut state = ViewState::new(3);
        state.set_search("bill");
        state.set_category(Category::Bills);
        state.set_sort(SortSpec::new(SortKey::Amount, SortDirection::Asc));
        state.load_more();
        assert!(state.filters_active());
        state.clear_filters();
        assert_eq!(state.search(), "");
        assert_eq!(state.category(), CategoryFilter::All);
        assert_eq!(state.sort(), SortSpec::default());
        assert_eq!(state.visible_count(), 6);
        assert!(!state.filters_active());
    }

    #[test]
    fn test_sort_spec_text_form() {
        for spec in SortSpec::OPTIONS {
            assert_eq!(SortSpec::from_str(&spec.to_string()).unwrap(), spec);
        }
        assert_eq!(SortSpec::default().to_string(), "date-desc");
        assert_eq!(SortSpec::default().label(), "Date (Newest)");
        assert!(SortSpec::from_str("amount").is_err());
        assert!(SortSpec::from_str("price-asc").is_err());
    }

    #[test]
    fn test_zero_page_size_shows_one() {
        let state = ViewState::new(0);
        assert_eq!(state.page_size(), 1);
        assert_eq!(state.visible_count(), 1);
    }
}
