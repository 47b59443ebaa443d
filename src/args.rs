//! These structs provide the CLI interface for the expenses CLI, and the grammar of the commands
//! accepted by the interactive session.

use crate::model::{Category, CategoryFilter};
use crate::view::SortSpec;
use crate::Result;
use anyhow::bail;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::LevelFilter;

/// expenses: A personal expense dashboard for the terminal.
///
/// Expenses are held in memory only. Every run starts from the same seed data, either the
/// built-in sample expenses or a JSON seed file given with --seed. Nothing is ever written to
/// disk.
///
/// Without a subcommand, an interactive session is started. Type `help` in the session for the
/// list of commands.
#[derive(Debug, Parser, Clone)]
#[command(version)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Args {
    pub fn new(common: Common, command: Option<Command>) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    /// The subcommand to run, `interactive` when none was given.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Interactive)
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Start an interactive session (the default).
    Interactive,
    /// Print the expense list once and exit.
    List(ListArgs),
    /// Print the totals and the category breakdown once and exit.
    Summary(SummaryArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::WARN)]
    log_level: LevelFilter,

    /// A JSON config file. Defaults to <config dir>/expenses/config.json when that file exists.
    #[arg(long, env = "EXPENSES_CONFIG")]
    config: Option<PathBuf>,

    /// A JSON seed file to build the ledger from instead of the built-in sample expenses.
    #[arg(long, env = "EXPENSES_SEED")]
    seed: Option<PathBuf>,

    /// How many expenses to show per page.
    #[arg(long)]
    page_size: Option<usize>,
}

impl Common {
    pub fn new(log_level: LevelFilter) -> Self {
        Self {
            log_level,
            config: None,
            seed: None,
            page_size: None,
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn config(&self) -> Option<&Path> {
        self.config.as_deref()
    }

    pub fn seed(&self) -> Option<&Path> {
        self.seed.as_deref()
    }

    pub fn page_size(&self) -> Option<usize> {
        self.page_size
    }
}

/// Args for the `expenses list` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct ListArgs {
    /// Only show expenses whose description contains this text (case-insensitive).
    #[arg(long)]
    pub search: Option<String>,

    /// Only show expenses in this category: all, food, transport, bills or other.
    #[arg(long, default_value_t = CategoryFilter::All)]
    pub category: CategoryFilter,

    /// The sort order: date-desc, date-asc, amount-desc or amount-asc.
    #[arg(long, default_value_t = SortSpec::default())]
    pub sort: SortSpec,

    /// Show every matching expense instead of only the first page.
    #[arg(long)]
    pub all: bool,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Args for the `expenses summary` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct SummaryArgs {
    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

/// A form field that can be changed while editing an expense.
#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
pub enum EditField {
    Description,
    Amount,
    Category,
}

/// One line typed into the interactive session.
#[derive(Debug, Parser, Clone)]
#[command(
    no_binary_name = true,
    disable_version_flag = true,
    help_template = "Commands:\n{subcommands}"
)]
pub struct SessionLine {
    #[command(subcommand)]
    pub command: SessionCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SessionCommand {
    /// Add an expense: add <description> <amount> [category]
    Add {
        description: String,
        #[arg(allow_hyphen_values = true)]
        amount: String,
        #[arg(value_enum, default_value_t = Category::Food)]
        category: Category,
    },
    /// Start editing an expense: edit <id>
    Edit { id: String },
    /// Change a field of the expense being edited: set <description|amount|category> <value>
    Set {
        #[arg(value_enum)]
        field: EditField,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Save the expense being edited
    Save,
    /// Stop editing without saving
    #[command(alias = "escape", alias = "esc")]
    Cancel,
    /// Delete an expense: delete <id>
    #[command(alias = "rm")]
    Delete { id: String },
    /// Search descriptions; no term clears the search
    Search { term: Option<String> },
    /// Filter by category: all, food, transport, bills or other
    Filter { category: CategoryFilter },
    /// Sort: date-desc, date-asc, amount-desc or amount-asc
    Sort { sort: SortSpec },
    /// Show the next page of expenses
    More,
    /// Reset the search, the category filter and the sort order
    Clear,
    /// Switch between dark and light mode
    Theme,
    /// Show the whole dashboard
    #[command(alias = "ls")]
    Show,
    /// Show the totals and the category breakdown
    Summary,
    /// Leave the session
    #[command(alias = "exit")]
    Quit,
}

impl SessionLine {
    /// Parses a line of input. Words are separated by whitespace; double quotes group words.
    pub fn parse_line(line: &str) -> std::result::Result<Self, ParseLineError> {
        let words = split_words(line).map_err(ParseLineError::Quote)?;
        SessionLine::try_parse_from(words).map_err(ParseLineError::Clap)
    }
}

/// Why a session line could not be parsed.
#[derive(Debug)]
pub enum ParseLineError {
    Quote(anyhow::Error),
    /// Includes requests for help, which clap reports as errors.
    Clap(clap::Error),
}

impl std::fmt::Display for ParseLineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseLineError::Quote(e) => write!(f, "error: {e}"),
            ParseLineError::Clap(e) => write!(f, "{}", e.render()),
        }
    }
}

/// Splits `line` into words, treating double-quoted runs as part of one word.
fn split_words(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quoted = false;
    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if quoted {
        bail!("Unterminated quote in '{line}'");
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
