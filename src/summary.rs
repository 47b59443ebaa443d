//! Summary statistics and the category breakdown, always computed over the whole ledger.

use crate::model::{Amount, Category, ColorGroup, Expense};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::collections::BTreeMap;

/// Totals across every expense in the ledger.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct Summary {
    pub total: Amount,
    pub count: usize,
    /// `total / count`, or zero for an empty ledger.
    pub average: Amount,
}

impl Summary {
    /// Totals saturate at the largest `Decimal` rather than overflowing. Entries added through
    /// validation are bounded by `Amount::MAX_ENTRY`, so this only matters for ledgers built
    /// directly.
    pub fn compute<'a>(expenses: impl IntoIterator<Item = &'a Expense>) -> Self {
        let (total, count) = expenses
            .into_iter()
            .fold((Amount::ZERO, 0usize), |(total, count), e| {
                (total + e.amount(), count + 1)
            });
        let average = if count == 0 {
            Amount::ZERO
        } else {
            Amount::new(total.value() / Decimal::from(count))
        };
        Self {
            total,
            count,
            average,
        }
    }
}

/// Sums amounts per category. Categories without expenses are absent.
pub fn category_totals<'a>(
    expenses: impl IntoIterator<Item = &'a Expense>,
) -> BTreeMap<Category, Amount> {
    let mut totals = BTreeMap::new();
    for expense in expenses {
        let total = totals.entry(expense.category()).or_insert(Amount::ZERO);
        *total = *total + expense.amount();
    }
    totals
}

/// One row of the category chart.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: Category,
    pub label: &'static str,
    pub color: ColorGroup,
    pub total: Amount,
    /// Share of the overall total in percent, unrounded. Zero when the overall total is zero.
    pub percentage: Decimal,
}

impl CategoryShare {
    /// The percentage rounded to a whole number, for display.
    pub fn rounded_percentage(&self) -> Decimal {
        self.percentage
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
    }
}

/// Builds the chart rows: every catalog category in catalog order, including the ones with no
/// expenses, which show at zero.
pub fn breakdown<'a>(expenses: impl IntoIterator<Item = &'a Expense>) -> Vec<CategoryShare> {
    let totals = category_totals(expenses);
    let overall: Amount = totals.values().sum();
    Category::ALL
        .into_iter()
        .map(|category| {
            let total = totals.get(&category).copied().unwrap_or_default();
            let percentage = if overall.is_zero() {
                Decimal::ZERO
            } else {
                total.value() / overall.value() * Decimal::ONE_HUNDRED
            };
            CategoryShare {
                category,
                label: category.label(),
                color: category.color(),
                total,
                percentage,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Ledger;
    use crate::seed;
    use std::str::FromStr;

    fn amt(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    fn seeded() -> Ledger {
        Ledger::from_seed(seed::builtin().unwrap())
    }

    #[test]
    fn test_seed_summary() {
        let ledger = seeded();
        let summary = Summary::compute(&ledger);
        assert_eq!(summary.count, 7);
        assert_eq!(summary.total, amt("364.08"));
        assert_eq!(summary.average, Amount::new(amt("364.08").value() / Decimal::from(7)));
        assert_eq!(summary.average.to_string(), "$52.01");
    }

    #[test]
    fn test_empty_ledger_average_is_zero() {
        let summary = Summary::compute(&Ledger::new());
        assert_eq!(summary.count, 0);
        assert!(summary.total.is_zero());
        assert!(summary.average.is_zero());
    }

    #[test]
    fn test_category_totals_only_present_categories() {
        let mut ledger = seeded();
        let ids: Vec<_> = ledger
            .iter()
            .filter(|e| e.category() == Category::Other)
            .map(|e| e.id())
            .collect();
        for id in ids {
            ledger.remove(id);
        }
        let totals = category_totals(&ledger);
        assert_eq!(totals.len(), 3);
        assert!(!totals.contains_key(&Category::Other));
        assert_eq!(totals[&Category::Food], amt("84.15"));
        assert_eq!(totals[&Category::Transport], amt("67.60"));
        assert_eq!(totals[&Category::Bills], amt("180.33"));
        let sum: Amount = totals.values().sum();
        assert_eq!(sum, Summary::compute(&ledger).total);
    }

    #[test]
    fn test_breakdown_covers_catalog_and_sums_to_100() {
        let ledger = seeded();
        let rows = breakdown(&ledger);
        assert_eq!(
            rows.iter().map(|r| r.category).collect::<Vec<_>>(),
            Category::ALL.to_vec()
        );
        let total: Amount = rows.iter().map(|r| r.total).sum();
        assert_eq!(total, Summary::compute(&ledger).total);
        let exact: Decimal = rows.iter().map(|r| r.percentage).sum();
        assert!((exact - Decimal::ONE_HUNDRED).abs() < Decimal::from_str("0.0001").unwrap());
        let rounded: Decimal = rows.iter().map(|r| r.rounded_percentage()).sum();
        assert!((rounded - Decimal::ONE_HUNDRED).abs() <= Decimal::from(2));
        assert_eq!(rows[2].label, "Bills");
        assert_eq!(rows[2].rounded_percentage(), Decimal::from(50));
    }

    #[test]
    fn test_breakdown_of_empty_ledger_is_all_zero() {
        let rows = breakdown(&Ledger::new());
        assert_eq!(rows.len(), 4);
        assert!(rows
            .iter()
            .all(|r| r.total.is_zero() && r.percentage.is_zero()));
    }

    #[test]
    fn test_totals_saturate_instead_of_overflowing() {
        let mut ledger = seeded();
        ledger.add("Yacht", Amount::new(Decimal::MAX), Category::Other);
        ledger.add("Island", Amount::new(Decimal::MAX), Category::Other);
        let summary = Summary::compute(&ledger);
        assert_eq!(summary.count, 9);
        assert_eq!(summary.total, Amount::new(Decimal::MAX));
        let rows = breakdown(&ledger);
        assert_eq!(rows[3].total, Amount::new(Decimal::MAX));
        assert!(rows.iter().all(|r| r.percentage <= Decimal::ONE_HUNDRED));
    }

    #[test]
    fn test_missing_category_shows_at_zero() {
        let mut ledger = Ledger::new();
        ledger.add("Bus", amt("10"), Category::Transport);
        let rows = breakdown(&ledger);
        assert_eq!(rows[0].category, Category::Food);
        assert!(rows[0].percentage.is_zero());
        assert_eq!(rows[1].percentage, Decimal::ONE_HUNDRED);
    }
}
