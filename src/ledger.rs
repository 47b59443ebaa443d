//! The in-memory expense ledger.
//!
//! The ledger is the only owner of expense records. It assumes its inputs have already been
//! validated (see `validation`) and does not check them again.

use crate::model::{Amount, Category, Expense, ExpenseId, ExpenseUpdates, SeedExpense};
use crate::Result;
use anyhow::{bail, Context};
use chrono::Utc;
use tracing::{debug, trace};

#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct Ledger {
    expenses: Vec<Expense>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ledger from seed records, assigning each a fresh id and keeping the seed order.
    pub fn from_seed(seed: impl IntoIterator<Item = SeedExpense>) -> Self {
        let expenses: Vec<Expense> = seed.into_iter().map(SeedExpense::into_expense).collect();
        debug!("Seeded ledger with {} expenses", expenses.len());
        Self { expenses }
    }

    /// Records a new expense dated now and places it at the front of the ledger.
    pub fn add(
        &mut self,
        description: impl Into<String>,
        amount: Amount,
        category: Category,
    ) -> Expense {
        let expense = Expense {
            id: ExpenseId::new(),
            description: description.into(),
            amount,
            category,
            date: Utc::now(),
        };
        trace!("Adding expense {}", expense.id());
        self.expenses.insert(0, expense.clone());
        expense
    }

    /// Applies `updates` to the expense with `id` in place and returns the updated record.
    ///
    /// # Errors
    ///
    /// - Returns an error if no expense has the given id. The ledger is left unchanged.
    pub fn update(&mut self, id: ExpenseId, updates: &ExpenseUpdates) -> Result<Expense> {
        let expense = self
            .expenses
            .iter_mut()
            .find(|e| e.id == id)
            .with_context(|| format!("Expense not found: {id}"))?;
        *expense = expense.patched(updates);
        trace!("Updated expense {id}");
        Ok(expense.clone())
    }

    /// Removes the expense with `id`, returning it. Removing an unknown id does nothing.
    pub fn remove(&mut self, id: ExpenseId) -> Option<Expense> {
        let ix = self.expenses.iter().position(|e| e.id == id)?;
        trace!("Removing expense {id}");
        Some(self.expenses.remove(ix))
    }

    pub fn get(&self, id: ExpenseId) -> Option<&Expense> {
        self.expenses.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: ExpenseId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Expense> {
        self.expenses.iter()
    }

    pub fn as_slice(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    /// Finds the single expense whose id starts with `prefix`. Short ids are what the text front
    /// end shows, so this is how typed ids are turned back into real ones.
    ///
    /// # Errors
    ///
    /// - Returns an error if no id, or more than one id, matches the prefix.
    pub fn resolve(&self, prefix: &str) -> Result<ExpenseId> {
        let mut matches = self.expenses.iter().filter(|e| e.id.has_prefix(prefix));
        let first = match matches.next() {
            Some(expense) => expense.id,
            None => bail!("No expense matches id '{prefix}'"),
        };
        let others = matches.count();
        if others > 0 {
            bail!(
                "The id '{prefix}' is ambiguous, it matches {} expenses",
                others + 1
            );
        }
        Ok(first)
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a Expense;
    type IntoIter = std::slice::Iter<'a, Expense>;

    fn into_iter(self) -> Self::IntoIter {
        self.expenses.iter()
    }
}
