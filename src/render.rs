//! Plain-text rendering of the dashboard for the terminal front end.

use crate::dashboard::Snapshot;
use crate::model::Expense;
use crate::session::{EditSession, ExpenseForm, Notification, NotificationKind};
use crate::summary::{CategoryShare, Summary};
use crate::view::{View, ViewState};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::fmt::Write;

pub const EMPTY_STATE: &str = "No expenses found.";

const BAR_WIDTH: usize = 20;

/// Formats a date the way the expense list shows it, e.g. `Oct 26, 2023`.
pub fn format_date(date: DateTime<Utc>) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Renders the whole dashboard.
pub fn dashboard(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    if let Some(notification) = &snapshot.notification {
        out.push_str(&self::notification(notification));
        out.push_str("\n\n");
    }
    let _ = writeln!(out, "Expense Tracker ({} mode)", snapshot.theme);
    out.push_str("Your personal finance dashboard.\n\n");
    out.push_str(&summary(&snapshot.summary, &snapshot.breakdown));
    out.push('\n');
    out.push_str(&expense_list(&snapshot.view, &snapshot.view_state));
    if let Some(edit) = &snapshot.edit {
        out.push('\n');
        out.push_str(&edit_session(edit));
    }
    if !snapshot.add_form.errors().is_empty() {
        out.push('\n');
        out.push_str(&form_errors("Add expense", &snapshot.add_form));
    }
    out
}

/// Renders the summary cards and the category chart. The chart is left out while there is nothing
/// to divide up.
pub fn summary(summary: &Summary, breakdown: &[CategoryShare]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total Expenses   {}", summary.total);
    let _ = writeln!(out, "Transactions     {}", summary.count);
    let _ = writeln!(out, "Average Expense  {}", summary.average.round_cents());
    if summary.total.is_zero() {
        return out;
    }
    out.push_str("\nSpending by Category\n");
    for share in breakdown {
        let pct = share.rounded_percentage();
        let _ = writeln!(
            out,
            "  {:<10} {:>12} {:>4}%  {}",
            share.label,
            share.total.to_string(),
            pct.to_string(),
            bar(share.percentage)
        );
    }
    out
}

/// Renders the visible expenses with the current view settings.
pub fn expense_list(view: &View, state: &ViewState) -> String {
    let mut out = String::new();
    let _ = write!(out, "Recent Expenses  [sort: {}", state.sort().label());
    if !state.category().is_all() {
        let _ = write!(out, ", category: {}", state.category());
    }
    if !state.search().is_empty() {
        let _ = write!(out, ", search: \"{}\"", state.search());
    }
    out.push_str("]\n");

    if view.is_empty() {
        let _ = writeln!(out, "  {EMPTY_STATE}");
        if state.filters_active() {
            out.push_str("  Try adjusting your search or filters (`clear`).\n");
        }
        return out;
    }
    for expense in &view.expenses {
        out.push_str(&expense_row(expense));
        out.push('\n');
    }
    if view.has_more {
        let _ = writeln!(
            out,
            "  Showing {} of {}. Type `more` to load more.",
            view.len(),
            view.matched
        );
    }
    out
}

/// One line of the expense list.
pub fn expense_row(expense: &Expense) -> String {
    format!(
        "  {}  {:<12}  {:<24}  {:<9}  {:>12}",
        expense.id().short(),
        format_date(expense.date()),
        expense.description(),
        expense.category().label(),
        expense.amount().to_string()
    )
}

pub fn notification(notification: &Notification) -> String {
    let marker = match notification.kind {
        NotificationKind::Success => "✓",
        NotificationKind::Error => "✗",
    };
    format!("{marker} {}", notification.message)
}

/// Renders an open edit session: the original record and the pending form values.
pub fn edit_session(session: &EditSession) -> String {
    let form = session.form();
    let mut out = String::new();
    let _ = writeln!(out, "Editing {}", session.target().id().short());
    let _ = writeln!(out, "  description: {}", form.description());
    let _ = writeln!(out, "  amount:      {}", form.amount());
    let _ = writeln!(out, "  category:    {}", form.category().label());
    out.push_str("  (`set <field> <value>`, `save`, `cancel`)\n");
    if !form.errors().is_empty() {
        out.push_str(&form_errors("Edit expense", form));
    }
    out
}

/// Lists a form's field errors, one per line.
pub fn form_errors(title: &str, form: &ExpenseForm) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{title}:");
    for (field, message) in form.errors().iter() {
        let _ = writeln!(out, "  {field}: {message}");
    }
    out
}

fn bar(percentage: Decimal) -> String {
    let filled = (percentage * Decimal::from(BAR_WIDTH) / Decimal::ONE_HUNDRED)
        .round()
        .to_usize()
        .unwrap_or_default()
        .min(BAR_WIDTH);
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}
