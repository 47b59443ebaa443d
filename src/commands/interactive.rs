//! The interactive session: reads commands line by line, applies them to an in-memory
//! dashboard, and expires notifications in the background.

use crate::args::{EditField, SessionCommand, SessionLine};
use crate::commands::Out;
use crate::dashboard::Rejected;
use crate::model::Category;
use crate::session::Ticket;
use crate::utils::plural;
use crate::{render, Config, Dashboard, Result};
use anyhow::{bail, Context};
use std::str::FromStr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

const PROMPT: &str = "> ";
const HINT: &str = "Type `help` for the list of commands.";
const NOT_EDITING: &str = "No expense is being edited. Start with `edit <id>`.";

/// Runs an interactive session on stdin and stdout until `quit` or end of input.
pub async fn interactive(config: Config) -> Result<Out<()>> {
    let mut dashboard = Dashboard::load(&config).await?;
    let input = BufReader::new(tokio::io::stdin());
    let mut output = tokio::io::stdout();
    run(&mut dashboard, input, &mut output).await?;
    Ok(Out::new_message(format!(
        "Session ended with {} in the ledger",
        plural(dashboard.ledger().len(), "expense")
    )))
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum Flow {
    Continue,
    Quit,
}

/// The session loop. Commands are read from `input` and their results written to `output`.
/// Notification expiry tickets arrive on a channel fed by `ExpiryTimer`.
pub(crate) async fn run<R, W>(dashboard: &mut Dashboard, input: R, output: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut timer = ExpiryTimer::new(tx);

    write(output, &render::dashboard(&dashboard.snapshot())).await?;
    write(output, HINT).await?;
    prompt(output).await?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Unable to read input")? else {
                    debug!("End of input");
                    break;
                };
                let (text, flow) = execute(dashboard, &line);
                write(output, &text).await?;
                if let Some(ticket) = dashboard.take_ticket() {
                    timer.schedule(ticket);
                }
                if flow == Flow::Quit {
                    break;
                }
                prompt(output).await?;
            }
            Some(ticket) = rx.recv() => {
                if dashboard.expire_notification(ticket) {
                    trace!("Notification expired");
                }
            }
        }
    }
    timer.cancel();
    Ok(())
}

/// Holds at most one pending expiry. Scheduling a new ticket aborts the previous timer.
struct ExpiryTimer {
    tx: UnboundedSender<Ticket>,
    handle: Option<JoinHandle<()>>,
}

impl ExpiryTimer {
    fn new(tx: UnboundedSender<Ticket>) -> Self {
        Self { tx, handle: None }
    }

    fn schedule(&mut self, ticket: Ticket) {
        self.cancel();
        let tx = self.tx.clone();
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(ticket.ttl()).await;
            // The receiver is gone once the session has ended
            let _ = tx.send(ticket);
        }));
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for ExpiryTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Parses and applies one line. Failures are reported in the returned text; the session goes on.
fn execute(dashboard: &mut Dashboard, line: &str) -> (String, Flow) {
    if line.trim().is_empty() {
        return (String::new(), Flow::Continue);
    }
    let command = match SessionLine::parse_line(line) {
        Ok(parsed) => parsed.command,
        Err(e) => return (e.to_string(), Flow::Continue),
    };
    trace!("{command:?}");
    match apply(dashboard, command) {
        Ok(reply) => reply,
        Err(e) => (format!("Error: {e:#}"), Flow::Continue),
    }
}

fn apply(dashboard: &mut Dashboard, command: SessionCommand) -> Result<(String, Flow)> {
    let text = match command {
        SessionCommand::Add {
            description,
            amount,
            category,
        } => match dashboard.add_expense(&description, &amount, category) {
            Ok(expense) => format!("{}\n{}", notice(dashboard), render::expense_row(&expense)),
            Err(_) => render::form_errors("Add expense", dashboard.add_form()),
        },

        SessionCommand::Edit { id } => {
            let id = dashboard.ledger().resolve(&id)?;
            match dashboard.begin_edit(id) {
                Some(session) => render::edit_session(session),
                None => bail!("Expense not found: {}", id.short()),
            }
        }

        SessionCommand::Set { field, value } => {
            let changed = match field {
                EditField::Description => dashboard.set_edit_description(value),
                EditField::Amount => dashboard.set_edit_amount(value),
                EditField::Category => dashboard.set_edit_category(Category::from_str(&value)?),
            };
            if !changed {
                bail!(NOT_EDITING);
            }
            edit_text(dashboard)
        }

        SessionCommand::Save => match dashboard.save_edit() {
            Ok(expense) => format!("{}\n{}", notice(dashboard), render::expense_row(&expense)),
            Err(Rejected::Invalid(_)) => edit_text(dashboard),
            Err(Rejected::NotEditing) => bail!(NOT_EDITING),
            Err(e) => bail!(e),
        },

        SessionCommand::Cancel => {
            if dashboard.escape() {
                "Edit cancelled.".to_string()
            } else {
                "Nothing is being edited.".to_string()
            }
        }

        SessionCommand::Delete { id } => {
            let id = dashboard.ledger().resolve(&id)?;
            match dashboard.delete_expense(id) {
                Some(removed) => format!("{} ({})", notice(dashboard), removed.description()),
                None => bail!("Expense not found: {}", id.short()),
            }
        }

        SessionCommand::Search { term } => {
            dashboard.set_search_term(term.unwrap_or_default());
            list_text(dashboard)
        }

        SessionCommand::Filter { category } => {
            dashboard.set_category_filter(category);
            list_text(dashboard)
        }

        SessionCommand::Sort { sort } => {
            dashboard.set_sort(sort);
            list_text(dashboard)
        }

        SessionCommand::More => {
            dashboard.load_more();
            list_text(dashboard)
        }

        SessionCommand::Clear => {
            dashboard.clear_filters();
            list_text(dashboard)
        }

        SessionCommand::Theme => format!("Switched to {} mode.", dashboard.toggle_theme()),

        SessionCommand::Show => render::dashboard(&dashboard.snapshot()),

        SessionCommand::Summary => render::summary(&dashboard.summary(), &dashboard.breakdown()),

        SessionCommand::Quit => return Ok(("Bye.".to_string(), Flow::Quit)),
    };
    Ok((text, Flow::Continue))
}

fn notice(dashboard: &Dashboard) -> String {
    dashboard
        .notification()
        .map(render::notification)
        .unwrap_or_default()
}

fn list_text(dashboard: &Dashboard) -> String {
    render::expense_list(&dashboard.view(), dashboard.view_state())
}

fn edit_text(dashboard: &Dashboard) -> String {
    dashboard
        .edit_session()
        .map(render::edit_session)
        .unwrap_or_default()
}

async fn write<W>(output: &mut W, text: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    if text.is_empty() {
        return Ok(());
    }
    output.write_all(text.as_bytes()).await?;
    if !text.ends_with('\n') {
        output.write_all(b"\n").await?;
    }
    Ok(())
}

async fn prompt<W>(output: &mut W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    output.write_all(PROMPT.as_bytes()).await?;
    output.flush().await?;
    Ok(())
}
