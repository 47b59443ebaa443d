//! Types that represent the core data model, such as `Expense` and `Category`.
mod amount;
mod category;
mod expense;

pub use amount::{Amount, AmountError};
pub use category::{Category, CategoryFilter, CategoryInfo, ColorGroup};
pub use expense::{Expense, ExpenseId, ExpenseUpdates, SeedExpense, SHORT_ID_LEN};
