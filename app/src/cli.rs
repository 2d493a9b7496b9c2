//! Command-line surface of the `taskdeck` binary.

use crate::record_store::RecordStore;
use crate::render::{render_about, render_route, render_todos};
use crate::routes::Route;
use crate::sync::{SyncController, SyncError};
use crate::types::{SortDirection, SortField, TodoId};
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "taskdeck",
    version,
    about = "A todo list kept in a hosted record store.",
    after_help = "Examples:\n  taskdeck list --sort title --direction asc --page 2\n  taskdeck add Buy milk\n  taskdeck toggle recA1b2C3\n  taskdeck open '/?page=2'"
)]
pub struct Cli {
    /// Override the tracing filter (e.g. "info", "taskdeck=trace")
    #[arg(long = "log", value_name = "DIRECTIVE", global = true)]
    pub log_filter: Option<String>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommand {
    /// Show the list, sorted and searched by the store
    List(ListArgs),
    /// Add a todo
    Add(AddArgs),
    /// Change a todo's title
    Edit(EditArgs),
    /// Flip a todo between done and not done
    Toggle(IdArgs),
    /// Delete a todo
    Delete(IdArgs),
    /// Show the view a path selects, e.g. `/`, `/?page=2` or `/about`
    Open(OpenArgs),
    /// Show information about the app
    About,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Field to sort by
    #[arg(long, value_enum)]
    pub sort: Option<SortArg>,

    /// Sort direction
    #[arg(long, value_enum)]
    pub direction: Option<DirectionArg>,

    /// Only show todos whose title contains this text
    #[arg(long, value_name = "TEXT")]
    pub search: Option<String>,

    /// Page to show (15 todos per page)
    #[arg(long, value_name = "N")]
    pub page: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Title of the new todo
    #[arg(value_name = "TITLE", required = true)]
    pub title: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct EditArgs {
    /// Record id of the todo
    #[arg(value_name = "ID")]
    pub id: String,

    /// New title
    #[arg(value_name = "TITLE", required = true)]
    pub title: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct IdArgs {
    /// Record id of the todo
    #[arg(value_name = "ID")]
    pub id: String,
}

#[derive(Args, Debug, Clone)]
pub struct OpenArgs {
    /// Path with optional query
    #[arg(value_name = "PATH")]
    pub path: String,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortArg {
    /// Todo title
    Title,
    /// Time the todo was added
    CreatedTime,
}

impl From<SortArg> for SortField {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Title => Self::Title,
            SortArg::CreatedTime => Self::CreatedTime,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionArg {
    /// Ascending
    Asc,
    /// Descending
    Desc,
}

impl From<DirectionArg> for SortDirection {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Asc => Self::Asc,
            DirectionArg::Desc => Self::Desc,
        }
    }
}

/// Output of commands that never touch the record store
#[must_use]
pub fn render_offline(command: &CliCommand) -> Option<String> {
    match command {
        CliCommand::About => Some(render_about()),
        CliCommand::Open(args) => match Route::parse(&args.path) {
            Route::Todos { .. } => None,
            route => Some(render_route(&route, &crate::types::TodoState::new())),
        },
        _ => None,
    }
}

/// Run `command` against `controller` and render the resulting view
///
/// Every command loads the list first. A failed remote call is not an
/// error here: its message and rollback are already in the state, and the
/// rendered view shows the banner.
///
/// # Errors
///
/// Returns [`SyncError::EmptyTitle`] or [`SyncError::UnknownTodo`] when the
/// command is rejected before reaching the store, and [`SyncError::Store`]
/// if the store is shutting down.
#[tracing::instrument(skip(controller))]
pub async fn execute<R: RecordStore>(
    command: CliCommand,
    controller: &SyncController<R>,
) -> Result<String, SyncError> {
    let mut page = None;

    if let CliCommand::List(args) = &command {
        if let Some(sort) = args.sort {
            controller.set_sort_field(sort.into()).await?;
        }
        if let Some(direction) = args.direction {
            controller.set_sort_direction(direction.into()).await?;
        }
        if let Some(search) = &args.search {
            controller.set_query_string(search.trim()).await?;
        }
        page.clone_from(&args.page);
    }

    tolerate_remote(controller.fetch_todos().await)?;

    let outcome = match command {
        CliCommand::List(_) | CliCommand::About => Ok(()),
        CliCommand::Add(args) => controller.add_todo(&args.title.join(" ")).await,
        CliCommand::Edit(args) => {
            let id = TodoId::new(args.id);
            match controller.snapshot().await.get(&id).cloned() {
                Some(todo) => {
                    controller
                        .update_todo(crate::types::Todo {
                            title: args.title.join(" "),
                            ..todo
                        })
                        .await
                },
                None => Err(SyncError::UnknownTodo(id)),
            }
        },
        CliCommand::Toggle(args) => controller.complete_todo(&TodoId::new(args.id)).await,
        CliCommand::Delete(args) => controller.delete_todo(&TodoId::new(args.id)).await,
        CliCommand::Open(args) => {
            let route = Route::parse(&args.path);
            let state = controller.snapshot().await;
            return Ok(render_route(&route, &state));
        },
    };
    tolerate_remote(outcome)?;

    let state = controller.snapshot().await;
    Ok(render_todos(&state, page.as_deref()))
}

fn tolerate_remote(outcome: Result<(), SyncError>) -> Result<(), SyncError> {
    match outcome {
        Err(SyncError::Remote(error)) => {
            tracing::debug!(error = %error, "Remote failure shown in view");
            Ok(())
        },
        other => other,
    }
}
