//! Transient session state: the notification slot, the expense forms and the edit session.
//!
//! None of this is part of the ledger. Each piece is an exclusive singleton: one visible
//! notification, one add form, at most one edit session.

use crate::model::{Amount, Category, Expense, ExpenseId, ExpenseUpdates};
use crate::validation::{self, Field, FieldErrors};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::trace;

/// How long a notification stays visible unless configured otherwise.
pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
}

serde_plain::derive_display_from_serialize!(NotificationKind);

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
}

/// Identifies one `show` call. Handing the ticket back to `Notifier::expire` clears the
/// notification only if nothing newer has been shown since.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct Ticket {
    generation: u64,
    ttl: Duration,
}

impl Ticket {
    /// How long to wait before expiring this ticket.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// The single notification slot.
#[derive(Debug, Clone)]
pub struct Notifier {
    current: Option<Notification>,
    generation: u64,
    ttl: Duration,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_TTL)
    }
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        Self {
            current: None,
            generation: 0,
            ttl,
        }
    }

    /// Shows `message`, replacing whatever was visible. The caller schedules the returned ticket
    /// for expiry after `Ticket::ttl`.
    pub fn show(&mut self, message: impl Into<String>, kind: NotificationKind) -> Ticket {
        self.generation += 1;
        let notification = Notification {
            message: message.into(),
            kind,
        };
        trace!("Notification {}: {notification:?}", self.generation);
        self.current = Some(notification);
        Ticket {
            generation: self.generation,
            ttl: self.ttl,
        }
    }

    /// Clears the notification if `ticket` belongs to it. Returns whether anything was cleared.
    pub fn expire(&mut self, ticket: Ticket) -> bool {
        if ticket.generation != self.generation || self.current.is_none() {
            trace!("Ignoring stale notification ticket {}", ticket.generation);
            return false;
        }
        self.current = None;
        true
    }

    /// Clears the notification regardless of tickets.
    pub fn dismiss(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// The validated values of a submitted form.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FormInput {
    pub description: String,
    pub amount: Amount,
    pub category: Category,
}

/// Raw text entered into an expense form, plus the errors from the last submission.
///
/// Changing a field clears that field's error and no other.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize)]
pub struct ExpenseForm {
    description: String,
    amount: String,
    category: Category,
    errors: FieldErrors,
}

impl ExpenseForm {
    /// An empty form with the default category.
    pub fn new() -> Self {
        Self::default()
    }

    /// A form pre-filled from an existing expense.
    pub fn from_expense(expense: &Expense) -> Self {
        Self {
            description: expense.description().to_string(),
            amount: expense.amount().plain(),
            category: expense.category(),
            errors: FieldErrors::new(),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.errors.clear(Field::Description);
    }

    pub fn set_amount(&mut self, amount: impl Into<String>) {
        self.amount = amount.into();
        self.errors.clear(Field::Amount);
    }

    pub fn set_category(&mut self, category: Category) {
        self.category = category;
    }

    /// Validates the form. On success the errors are cleared and the parsed input is returned;
    /// otherwise the errors are kept on the form and returned.
    pub fn submit(&mut self) -> Result<FormInput, FieldErrors> {
        match validation::parse_input(&self.description, &self.amount) {
            Ok(amount) => {
                self.errors = FieldErrors::new();
                Ok(FormInput {
                    description: self.description.clone(),
                    amount,
                    category: self.category,
                })
            }
            Err(errors) => {
                self.errors = errors.clone();
                Err(errors)
            }
        }
    }

    /// Empties the form back to its defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// An open edit of one expense: a snapshot of the record as it was when editing began, and the
/// form holding the pending changes.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct EditSession {
    target: Expense,
    form: ExpenseForm,
}

impl EditSession {
    pub fn new(target: Expense) -> Self {
        let form = ExpenseForm::from_expense(&target);
        Self { target, form }
    }

    pub fn target(&self) -> &Expense {
        &self.target
    }

    pub fn id(&self) -> ExpenseId {
        self.target.id()
    }

    pub fn form(&self) -> &ExpenseForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ExpenseForm {
        &mut self.form
    }

    /// Validates the form and turns it into the updates to apply to the target.
    pub fn submit(&mut self) -> Result<ExpenseUpdates, FieldErrors> {
        let input = self.form.submit()?;
        Ok(ExpenseUpdates {
            description: Some(input.description),
            amount: Some(input.amount),
            category: Some(input.category),
        })
    }
}

/// Color theme preference. It has no effect on the ledger.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

serde_plain::derive_display_from_serialize!(Theme);
serde_plain::derive_fromstr_from_deserialize!(Theme);

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}
