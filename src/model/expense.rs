use crate::model::{Amount, Category};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Number of characters shown when an id is displayed in its short form.
pub const SHORT_ID_LEN: usize = 8;

/// The opaque identity of an expense. Ids are random, so they never collide within a session.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(Uuid);

impl ExpenseId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The first few hex characters of the id, enough to tell records apart on screen.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..SHORT_ID_LEN].to_string()
    }

    /// Whether `prefix` (case-insensitive, hyphens ignored) is a prefix of this id.
    pub(crate) fn has_prefix(&self, prefix: &str) -> bool {
        let wanted = prefix.replace('-', "").to_ascii_lowercase();
        !wanted.is_empty() && self.0.simple().to_string().starts_with(&wanted)
    }
}

impl Default for ExpenseId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ExpenseId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// A single recorded expense.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Expense {
    pub(crate) id: ExpenseId,
    pub(crate) description: String,
    pub(crate) amount: Amount,
    pub(crate) category: Category,
    /// When the expense was recorded. Used as the display date and the default sort key.
    pub(crate) date: DateTime<Utc>,
}

impl Expense {
    pub fn id(&self) -> ExpenseId {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// Returns a copy of this expense with `updates` applied. The id and date never change.
    pub fn patched(&self, updates: &ExpenseUpdates) -> Expense {
        Expense {
            id: self.id,
            description: updates
                .description
                .clone()
                .unwrap_or_else(|| self.description.clone()),
            amount: updates.amount.unwrap_or(self.amount),
            category: updates.category.unwrap_or(self.category),
            date: self.date,
        }
    }
}

/// Field changes to apply to an existing expense. `None` leaves a field unchanged.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ExpenseUpdates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl ExpenseUpdates {
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.amount.is_none() && self.category.is_none()
    }
}

/// An expense as written in a seed file: everything except the id, which is assigned on load.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SeedExpense {
    pub description: String,
    pub amount: Amount,
    pub category: Category,
    pub date: DateTime<Utc>,
}

impl SeedExpense {
    pub(crate) fn into_expense(self) -> Expense {
        Expense {
            id: ExpenseId::new(),
            description: self.description,
            amount: self.amount,
            category: self.category,
            date: self.date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sample() -> Expense {
        SeedExpense {
            description: "Gasoline".to_string(),
            amount: Amount::from_str("45.10").unwrap(),
            category: Category::Transport,
            date: DateTime::parse_from_rfc3339("2023-10-21T08:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        }
        .into_expense()
    }

    #[test]
    fn test_patch_only_touches_given_fields() {
        let original = sample();
        let updates = ExpenseUpdates {
            amount: Some(Amount::from_str("50.00").unwrap()),
            ..Default::default()
        };
        let patched = original.patched(&updates);
        assert_eq!(patched.id(), original.id());
        assert_eq!(patched.date(), original.date());
        assert_eq!(patched.description(), "Gasoline");
        assert_eq!(patched.category(), Category::Transport);
        assert_eq!(patched.amount(), Amount::from_str("50").unwrap());
    }

    #[test]
    fn test_short_id_and_prefix() {
        let id = ExpenseId::new();
        let short = id.short();
        assert_eq!(short.len(), SHORT_ID_LEN);
        assert!(id.has_prefix(&short));
        assert!(id.has_prefix(&short.to_ascii_uppercase()));
        assert!(id.has_prefix(&id.to_string()));
        assert!(!id.has_prefix(""));
    }

    #[test]
    fn test_serialized_date_is_iso_8601() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["date"], "2023-10-21T08:00:00Z");
        assert_eq!(json["category"], "transport");
        assert_eq!(json["amount"], "45.10");
    }
}
