//! The dashboard store: owns the ledger and all UI state, and is the only way to change either.
//!
//! A presentation layer holds one `Dashboard`, calls its operations in response to user events
//! and reads the derived values back out for rendering. Derived values (`view`, `summary`,
//! `breakdown`) are recomputed on every call.

use crate::config::Config;
use crate::ledger::Ledger;
use crate::model::{Category, CategoryFilter, Expense, ExpenseId, ExpenseUpdates};
use crate::session::{
    EditSession, ExpenseForm, Notification, NotificationKind, Notifier, Theme, Ticket,
};
use crate::summary::{self, CategoryShare, Summary};
use crate::validation::{Field, FieldErrors, AMOUNT_INVALID, DESCRIPTION_REQUIRED};
use crate::view::{self, SortSpec, View, ViewState};
use crate::{seed, Result};
use serde::Serialize;
use std::fmt::{Display, Formatter};
use tracing::{debug, warn};

pub const EXPENSE_ADDED: &str = "Expense added successfully!";
pub const EXPENSE_UPDATED: &str = "Expense updated successfully!";
pub const EXPENSE_DELETED: &str = "Expense deleted.";

/// Why an update was not applied.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Rejected {
    /// The submitted values did not pass validation.
    Invalid(FieldErrors),
    /// No expense has this id. The user interface only offers ids from the ledger, so this means
    /// a stale id was used.
    NotFound(ExpenseId),
    /// `save_edit` was called without an open edit session.
    NotEditing,
}

impl Display for Rejected {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejected::Invalid(errors) => {
                let messages: Vec<&str> = errors.iter().map(|(_, m)| m).collect();
                write!(f, "{}", messages.join(" "))
            }
            Rejected::NotFound(id) => write!(f, "Expense not found: {id}"),
            Rejected::NotEditing => f.write_str("No expense is being edited"),
        }
    }
}

impl std::error::Error for Rejected {}

/// Everything a renderer needs, captured at one moment.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub theme: Theme,
    pub summary: Summary,
    pub breakdown: Vec<CategoryShare>,
    pub view_state: ViewState,
    pub view: View,
    pub filters_active: bool,
    pub notification: Option<Notification>,
    pub add_form: ExpenseForm,
    pub edit: Option<EditSession>,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    ledger: Ledger,
    view: ViewState,
    notifier: Notifier,
    add_form: ExpenseForm,
    edit: Option<EditSession>,
    theme: Theme,
    pending: Option<Ticket>,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(Ledger::new(), &Config::default())
    }
}

impl Dashboard {
    /// Creates a dashboard over `ledger` using the page size, notification delay and theme from
    /// `config`.
    pub fn new(ledger: Ledger, config: &Config) -> Self {
        Self {
            ledger,
            view: ViewState::new(config.page_size()),
            notifier: Notifier::new(config.notification_ttl()),
            add_form: ExpenseForm::new(),
            edit: None,
            theme: config.theme(),
            pending: None,
        }
    }

    /// Creates a dashboard whose ledger is seeded from the configured seed file, or from the
    /// built-in sample set when none is configured.
    pub async fn load(config: &Config) -> Result<Self> {
        let records = seed::resolve(config.seed()).await?;
        Ok(Self::new(Ledger::from_seed(records), config))
    }

    // -------------------------------------------------------------------------------------------
    // Ledger mutations
    // -------------------------------------------------------------------------------------------

    /// Fills the add form with the given values and submits it.
    pub fn add_expense(
        &mut self,
        description: &str,
        amount_text: &str,
        category: Category,
    ) -> std::result::Result<Expense, FieldErrors> {
        self.add_form.set_description(description);
        self.add_form.set_amount(amount_text);
        self.add_form.set_category(category);
        self.submit_add_form()
    }

    /// Validates the add form and, when valid, records the expense and resets the form. When
    /// invalid, the ledger is untouched and the errors stay on the form.
    pub fn submit_add_form(&mut self) -> std::result::Result<Expense, FieldErrors> {
        let input = self.add_form.submit()?;
        let expense = self
            .ledger
            .add(input.description, input.amount, input.category);
        debug!("Added expense {} ({})", expense.id(), expense.description());
        self.add_form.reset();
        self.notify(EXPENSE_ADDED, NotificationKind::Success);
        Ok(expense)
    }

    /// Applies `updates` to the expense with `id`. An open edit session on the same expense is
    /// closed.
    pub fn update_expense(
        &mut self,
        id: ExpenseId,
        updates: &ExpenseUpdates,
    ) -> std::result::Result<Expense, Rejected> {
        let errors = check_updates(updates);
        if !errors.is_empty() {
            return Err(Rejected::Invalid(errors));
        }
        debug_assert!(self.ledger.contains(id), "update of unknown expense {id}");
        let updated = match self.ledger.update(id, updates) {
            Ok(updated) => updated,
            Err(e) => {
                warn!("Ignoring update: {e}");
                return Err(Rejected::NotFound(id));
            }
        };
        debug!("Updated expense {id}");
        if self.edit.as_ref().is_some_and(|s| s.id() == id) {
            self.edit = None;
        }
        self.notify(EXPENSE_UPDATED, NotificationKind::Success);
        Ok(updated)
    }

    /// Deletes the expense with `id`. Deleting an unknown id does nothing in release builds and
    /// fails a debug assertion otherwise, since only ids from the ledger are ever offered.
    pub fn delete_expense(&mut self, id: ExpenseId) -> Option<Expense> {
        debug_assert!(self.ledger.contains(id), "delete of unknown expense {id}");
        let Some(removed) = self.ledger.remove(id) else {
            warn!("Ignoring delete of unknown expense {id}");
            return None;
        };
        debug!("Deleted expense {id} ({})", removed.description());
        if self.edit.as_ref().is_some_and(|s| s.id() == id) {
            self.edit = None;
        }
        self.notify(EXPENSE_DELETED, NotificationKind::Error);
        Some(removed)
    }

    // -------------------------------------------------------------------------------------------
    // Add form
    // -------------------------------------------------------------------------------------------

    pub fn add_form(&self) -> &ExpenseForm {
        &self.add_form
    }

    pub fn set_add_description(&mut self, description: impl Into<String>) {
        self.add_form.set_description(description);
    }

    pub fn set_add_amount(&mut self, amount: impl Into<String>) {
        self.add_form.set_amount(amount);
    }

    pub fn set_add_category(&mut self, category: Category) {
        self.add_form.set_category(category);
    }

    // -------------------------------------------------------------------------------------------
    // Editing
    // -------------------------------------------------------------------------------------------

    /// Opens an edit session on the expense with `id`, replacing any session already open.
    /// Returns `None`, and leaves any current session alone, when the id is unknown.
    pub fn begin_edit(&mut self, id: ExpenseId) -> Option<&EditSession> {
        let Some(target) = self.ledger.get(id) else {
            warn!("Cannot edit unknown expense {id}");
            return None;
        };
        debug!("Editing expense {id}");
        self.edit = Some(EditSession::new(target.clone()));
        self.edit.as_ref()
    }

    /// Closes the edit session without changing the ledger. Returns whether a session was open.
    pub fn cancel_edit(&mut self) -> bool {
        self.edit.take().is_some()
    }

    /// The Escape key cancels editing.
    pub fn escape(&mut self) -> bool {
        self.cancel_edit()
    }

    pub fn edit_session(&self) -> Option<&EditSession> {
        self.edit.as_ref()
    }

    /// The snapshot of the expense being edited.
    pub fn edit_target(&self) -> Option<&Expense> {
        self.edit.as_ref().map(EditSession::target)
    }

    /// Returns false when no edit session is open.
    pub fn set_edit_description(&mut self, description: impl Into<String>) -> bool {
        self.edit_form_mut()
            .map(|f| f.set_description(description))
            .is_some()
    }

    /// Returns false when no edit session is open.
    pub fn set_edit_amount(&mut self, amount: impl Into<String>) -> bool {
        self.edit_form_mut().map(|f| f.set_amount(amount)).is_some()
    }

    /// Returns false when no edit session is open.
    pub fn set_edit_category(&mut self, category: Category) -> bool {
        self.edit_form_mut()
            .map(|f| f.set_category(category))
            .is_some()
    }

    /// Validates the edit form and applies it to the target expense. Invalid input keeps the
    /// session open with its errors.
    pub fn save_edit(&mut self) -> std::result::Result<Expense, Rejected> {
        let session = self.edit.as_mut().ok_or(Rejected::NotEditing)?;
        let id = session.id();
        let updates = session.submit().map_err(Rejected::Invalid)?;
        let result = self.update_expense(id, &updates);
        if let Err(Rejected::NotFound(_)) = result {
            self.edit = None;
        }
        result
    }

    fn edit_form_mut(&mut self) -> Option<&mut ExpenseForm> {
        self.edit.as_mut().map(EditSession::form_mut)
    }

    // -------------------------------------------------------------------------------------------
    // View state
    // -------------------------------------------------------------------------------------------

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.view.set_search(term);
    }

    pub fn set_category_filter(&mut self, filter: impl Into<CategoryFilter>) {
        self.view.set_category(filter);
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.view.set_sort(sort);
    }

    pub fn load_more(&mut self) {
        self.view.load_more();
    }

    pub fn clear_filters(&mut self) {
        self.view.clear_filters();
    }

    pub fn filters_active(&self) -> bool {
        self.view.filters_active()
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    // -------------------------------------------------------------------------------------------
    // Theme and notifications
    // -------------------------------------------------------------------------------------------

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        debug!("Theme is now {}", self.theme);
        self.theme
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notifier.current()
    }

    /// Takes the ticket of the most recent notification, if it has not been taken yet. The
    /// presentation layer schedules it for `expire_notification` after `Ticket::ttl`.
    pub fn take_ticket(&mut self) -> Option<Ticket> {
        self.pending.take()
    }

    /// Clears the notification if `ticket` still refers to it.
    pub fn expire_notification(&mut self, ticket: Ticket) -> bool {
        self.notifier.expire(ticket)
    }

    fn notify(&mut self, message: &str, kind: NotificationKind) {
        self.pending = Some(self.notifier.show(message, kind));
    }

    // -------------------------------------------------------------------------------------------
    // Derived values
    // -------------------------------------------------------------------------------------------

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// The filtered, sorted and paginated expenses for display.
    pub fn view(&self) -> View {
        view::derive(&self.ledger, &self.view)
    }

    pub fn summary(&self) -> Summary {
        Summary::compute(&self.ledger)
    }

    pub fn breakdown(&self) -> Vec<CategoryShare> {
        summary::breakdown(&self.ledger)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            theme: self.theme,
            summary: self.summary(),
            breakdown: self.breakdown(),
            view_state: self.view.clone(),
            view: self.view(),
            filters_active: self.filters_active(),
            notification: self.notification().cloned(),
            add_form: self.add_form.clone(),
            edit: self.edit.clone(),
        }
    }
}

/// Updates that bypass the forms must still keep the ledger's invariants.
fn check_updates(updates: &ExpenseUpdates) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if updates
        .description
        .as_deref()
        .is_some_and(|d| d.trim().is_empty())
    {
        errors.insert(Field::Description, DESCRIPTION_REQUIRED);
    }
    if updates.amount.is_some_and(|a| !a.is_valid_entry()) {
        errors.insert(Field::Amount, AMOUNT_INVALID);
    }
    errors
}
