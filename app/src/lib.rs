//! Todo list synced to a hosted record store.
//!
//! The list lives in a single [`TodoState`] owned by a store and changed only
//! through [`TodoAction`]s folded by the pure [`TodoReducer`]. The
//! [`SyncController`] talks to the record store and dispatches actions around
//! each call: optimistic edits, completions and deletions are rolled back
//! when the store rejects them.
//!
//! # Quick Start
//!
//! ```no_run
//! use taskdeck::{Config, SyncController, TodoEnvironment, TodoView};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env()?;
//! let controller = SyncController::new(
//!     config.client()?,
//!     TodoEnvironment::new(config.search_debounce),
//! );
//!
//! controller.fetch_todos().await?;
//! controller.add_todo("Buy milk").await?;
//!
//! let state = controller.snapshot().await;
//! for todo in TodoView::derive(&state, None).todos {
//!     println!("[{}] {}", if todo.is_completed { 'x' } else { ' ' }, todo.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod record_store;
pub mod reducer;
pub mod render;
pub mod routes;
pub mod sync;
pub mod types;
pub mod view;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use record_store::RecordStore;
pub use reducer::{TodoEnvironment, TodoReducer, SEARCH_DEBOUNCE};
pub use routes::Route;
pub use sync::{SyncController, SyncError, TodoStore};
pub use types::{Revert, SortDirection, SortField, Todo, TodoAction, TodoId, TodoState};
pub use view::{Pagination, TodoView, PAGE_SIZE};
