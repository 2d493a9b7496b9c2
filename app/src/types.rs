//! Domain types for the todo list.
//!
//! A todo is a record in the hosted store, mapped into a local shape. The
//! state aggregate holds the last reconciled list together with the UI flags
//! and view settings the reducer owns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskdeck_airtable::{Direction, ListQuery, Record, Sort};

/// Store-assigned identifier of a todo
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TodoId(String);

impl TodoId {
    /// Wraps a record id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the record id
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TodoId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A single todo item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Identifier assigned by the store
    pub id: TodoId,
    /// Title
    pub title: String,
    /// Whether the todo is done
    pub is_completed: bool,
    /// When the store created the record
    pub created_time: Option<DateTime<Utc>>,
}

impl Todo {
    /// Creates an incomplete todo without a creation time
    #[must_use]
    pub fn new(id: impl Into<TodoId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            is_completed: false,
            created_time: None,
        }
    }

    /// Sets the completion flag
    #[must_use]
    pub const fn completed(mut self, is_completed: bool) -> Self {
        self.is_completed = is_completed;
        self
    }

    /// Sets the creation time
    #[must_use]
    pub const fn created_at(mut self, created_time: DateTime<Utc>) -> Self {
        self.created_time = Some(created_time);
        self
    }
}

impl From<Record> for Todo {
    fn from(record: Record) -> Self {
        Self {
            id: TodoId(record.id),
            title: record.fields.title.unwrap_or_default(),
            is_completed: record.fields.is_completed.unwrap_or(false),
            created_time: record.created_time,
        }
    }
}

/// Field the list is sorted by
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortField {
    /// Todo title
    #[serde(rename = "title")]
    Title,
    /// Record creation time
    #[default]
    #[serde(rename = "createdTime")]
    CreatedTime,
}

impl SortField {
    /// Field name as stored in the table
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::CreatedTime => "createdTime",
        }
    }
}

/// Sort direction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending
    Asc,
    /// Descending
    #[default]
    Desc,
}

impl From<SortDirection> for Direction {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => Self::Asc,
            SortDirection::Desc => Self::Desc,
        }
    }
}

/// State of the todo list
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoState {
    /// Todos in the order the store returned them
    pub todo_list: Vec<Todo>,
    /// True while the bulk fetch is in flight
    pub is_loading: bool,
    /// True while a mutation is in flight
    pub is_saving: bool,
    /// Last failure message; empty means no error
    pub error_message: String,
    /// Sort field
    pub sort_field: SortField,
    /// Sort direction
    pub sort_direction: SortDirection,
    /// Settled search text the list is filtered by
    pub query_string: String,
    /// Search text as typed, before the debounce settles
    pub search_input: String,
}

impl TodoState {
    /// Creates the initial state: empty list, newest first
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state holding `todos`
    #[must_use]
    pub fn with_todos(todos: Vec<Todo>) -> Self {
        Self {
            todo_list: todos,
            ..Self::default()
        }
    }

    /// Returns the number of todos
    #[must_use]
    pub fn count(&self) -> usize {
        self.todo_list.len()
    }

    /// Returns the number of completed todos
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.todo_list.iter().filter(|t| t.is_completed).count()
    }

    /// Returns a todo by id
    #[must_use]
    pub fn get(&self, id: &TodoId) -> Option<&Todo> {
        self.todo_list.iter().find(|t| &t.id == id)
    }

    /// Checks if a todo exists
    #[must_use]
    pub fn exists(&self, id: &TodoId) -> bool {
        self.get(id).is_some()
    }

    /// Whether an error banner should be shown
    #[must_use]
    pub fn has_error(&self) -> bool {
        !self.error_message.is_empty()
    }

    /// List request matching the current sort and search settings
    #[must_use]
    pub fn list_query(&self) -> ListQuery {
        ListQuery::new()
            .with_sort(Sort::new(
                self.sort_field.as_str(),
                self.sort_direction.into(),
            ))
            .with_search(self.query_string.clone())
    }
}

/// Rollback payload: one todo restored by id, or the whole list replaced
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Revert {
    /// Restore a single todo in place
    One(Todo),
    /// Replace the list wholesale
    All(Vec<Todo>),
}

/// Actions folded into [`TodoState`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TodoAction {
    // ========== Remote lifecycle ==========
    /// Bulk fetch started
    FetchTodos,

    /// Bulk fetch succeeded
    LoadTodos {
        /// Records returned by the store
        records: Vec<Record>,
    },

    /// A fetch or mutation failed
    SetLoadError {
        /// User-visible message
        message: String,
    },

    /// A mutation is about to be sent
    StartRequest,

    /// A mutation settled, successfully or not
    EndRequest,

    /// A create succeeded
    AddTodo {
        /// Record returned by the store
        record: Record,
    },

    // ========== Local mutations ==========
    /// Replace the todo with the same id
    UpdateTodo {
        /// Edited todo
        todo: Todo,
    },

    /// Flip the completion flag of a todo
    CompleteTodo {
        /// Todo to toggle
        id: TodoId,
    },

    /// Remove a todo from the list
    DeleteTodo {
        /// Todo to remove
        id: TodoId,
    },

    /// Undo a failed mutation
    RevertTodo(Revert),

    /// Dismiss the error banner
    ClearError,

    // ========== View settings ==========
    /// Change the sort field
    SetSortField(SortField),

    /// Change the sort direction
    SetSortDirection(SortDirection),

    /// Set the settled search text
    SetQueryString(String),

    /// A keystroke in the search box
    SearchInputChanged {
        /// Full text of the search box
        text: String,
    },

    /// Clear the search box immediately
    ClearSearch,

    /// The list must be fetched again with the current settings
    RefetchRequested,
}
