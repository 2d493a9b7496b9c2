//! Sync controller: remote operations with optimistic updates and rollback.
//!
//! Each mutation dispatches its optimistic change, then `StartRequest`, awaits
//! the record store, and settles: success needs no further change (except
//! `AddTodo`, which carries the store-assigned id), failure dispatches
//! `SetLoadError` followed by a `RevertTodo` with the snapshot taken before
//! the optimistic change. `EndRequest` always closes the sequence.
//!
//! Operations are serialized: a mutation holds the lock from snapshot
//! capture through `EndRequest`, and a fetch holds it until the loaded list
//! is in state, so a rollback can never discard another operation's effect.

use crate::record_store::RecordStore;
use crate::reducer::{TodoEnvironment, TodoReducer};
use crate::types::{Revert, SortDirection, SortField, Todo, TodoAction, TodoId, TodoState};
use std::sync::Arc;
use std::time::Duration;
use taskdeck_airtable::{AirtableError, FieldsPatch};
use taskdeck_runtime::{Store, StoreError};
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;

/// Store specialized to the todo list
pub type TodoStore = Store<TodoState, TodoAction, TodoEnvironment, TodoReducer>;

/// Errors returned by sync operations
#[derive(Debug, Error)]
pub enum SyncError {
    /// The title is empty after trimming; nothing was dispatched
    #[error("Todo title cannot be empty")]
    EmptyTitle,

    /// No todo with this id is in the list; nothing was dispatched
    #[error("Todo {0} not found")]
    UnknownTodo(TodoId),

    /// The record store call failed; the error message and rollback have
    /// already been dispatched
    #[error(transparent)]
    Remote(#[from] AirtableError),

    /// The store rejected an action
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Runs fetch and mutation operations against a [`RecordStore`]
pub struct SyncController<R> {
    store: TodoStore,
    remote: Arc<R>,
    mutations: Arc<Mutex<()>>,
}

impl<R> Clone for SyncController<R> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            remote: Arc::clone(&self.remote),
            mutations: Arc::clone(&self.mutations),
        }
    }
}

impl<R: RecordStore> SyncController<R> {
    /// Creates a controller with an empty todo list
    #[must_use]
    pub fn new(remote: R, environment: TodoEnvironment) -> Self {
        Self::with_state(remote, environment, TodoState::new())
    }

    /// Creates a controller starting from `state`
    #[must_use]
    pub fn with_state(remote: R, environment: TodoEnvironment, state: TodoState) -> Self {
        Self {
            store: Store::with_broadcast_capacity(state, TodoReducer::new(), environment, 64),
            remote: Arc::new(remote),
            mutations: Arc::new(Mutex::new(())),
        }
    }

    /// The underlying store, for observers
    #[must_use]
    pub const fn store(&self) -> &TodoStore {
        &self.store
    }

    /// A copy of the current state
    pub async fn snapshot(&self) -> TodoState {
        self.store.state(Clone::clone).await
    }

    /// Load the list using the current sort and search settings
    ///
    /// Waits for an in-flight mutation to settle first.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Remote`] after dispatching `SetLoadError` if the
    /// list request fails.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_todos(&self) -> Result<(), SyncError> {
        let _guard = self.mutations.lock().await;
        self.dispatch(TodoAction::FetchTodos).await?;

        let query = self.store.state(TodoState::list_query).await;
        match self.remote.list(&query).await {
            Ok(records) => {
                tracing::debug!(count = records.len(), "Fetched todos");
                metrics::counter!("sync.fetch.success").increment(1);
                self.dispatch(TodoAction::LoadTodos { records }).await
            },
            Err(error) => {
                tracing::warn!(error = %error, "Fetch failed");
                metrics::counter!("sync.fetch.failure").increment(1);
                self.dispatch(TodoAction::SetLoadError {
                    message: error.to_string(),
                })
                .await?;
                Err(error.into())
            },
        }
    }

    /// Create a todo titled `title` (trimmed)
    ///
    /// Pessimistic: the todo appears only once the store returns its id.
    ///
    /// # Errors
    ///
    /// - [`SyncError::EmptyTitle`] before any dispatch
    /// - [`SyncError::Remote`] after the error message has been dispatched
    #[tracing::instrument(skip(self))]
    pub async fn add_todo(&self, title: &str) -> Result<(), SyncError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(SyncError::EmptyTitle);
        }

        let _guard = self.mutations.lock().await;
        self.dispatch(TodoAction::StartRequest).await?;

        let outcome = match self.remote.create(title).await {
            Ok(record) => {
                metrics::counter!("sync.mutation.success", "operation" => "add").increment(1);
                self.dispatch(TodoAction::AddTodo { record }).await?;
                Ok(())
            },
            Err(error) => {
                tracing::warn!(error = %error, "Add failed");
                metrics::counter!("sync.mutation.failure", "operation" => "add").increment(1);
                self.dispatch(TodoAction::SetLoadError {
                    message: error.to_string(),
                })
                .await?;
                Err(error.into())
            },
        };

        self.dispatch(TodoAction::EndRequest).await?;
        outcome
    }

    /// Replace a todo's title and completion flag, optimistically
    ///
    /// # Errors
    ///
    /// - [`SyncError::EmptyTitle`] or [`SyncError::UnknownTodo`] before any dispatch
    /// - [`SyncError::Remote`] after the todo has been rolled back
    #[tracing::instrument(skip(self), fields(id = %edited.id))]
    pub async fn update_todo(&self, edited: Todo) -> Result<(), SyncError> {
        let title = edited.title.trim();
        if title.is_empty() {
            return Err(SyncError::EmptyTitle);
        }
        let edited = Todo {
            title: title.to_string(),
            ..edited
        };

        let _guard = self.mutations.lock().await;
        let original = self.existing(&edited.id).await?;

        let id = edited.id.clone();
        let patch = FieldsPatch {
            title: Some(edited.title.clone()),
            is_completed: Some(edited.is_completed),
        };

        self.dispatch(TodoAction::UpdateTodo { todo: edited }).await?;
        self.dispatch(TodoAction::StartRequest).await?;
        let outcome = self.remote.update(&id, patch).await.map(drop);
        self.settle("update", outcome, Revert::One(original)).await
    }

    /// Toggle a todo's completion flag, optimistically
    ///
    /// # Errors
    ///
    /// - [`SyncError::UnknownTodo`] before any dispatch
    /// - [`SyncError::Remote`] after the todo has been rolled back
    #[tracing::instrument(skip(self))]
    pub async fn complete_todo(&self, id: &TodoId) -> Result<(), SyncError> {
        let _guard = self.mutations.lock().await;
        let original = self.existing(id).await?;

        let patch = FieldsPatch {
            is_completed: Some(!original.is_completed),
            ..FieldsPatch::default()
        };

        self.dispatch(TodoAction::CompleteTodo { id: id.clone() })
            .await?;
        self.dispatch(TodoAction::StartRequest).await?;
        let outcome = self.remote.update(id, patch).await.map(drop);
        self.settle("completion", outcome, Revert::One(original))
            .await
    }

    /// Delete a todo, optimistically
    ///
    /// # Errors
    ///
    /// - [`SyncError::UnknownTodo`] before any dispatch
    /// - [`SyncError::Remote`] after the list has been restored
    #[tracing::instrument(skip(self))]
    pub async fn delete_todo(&self, id: &TodoId) -> Result<(), SyncError> {
        let _guard = self.mutations.lock().await;
        let (known, snapshot) = self
            .store
            .state(|s| (s.exists(id), s.todo_list.clone()))
            .await;
        if !known {
            return Err(SyncError::UnknownTodo(id.clone()));
        }

        self.dispatch(TodoAction::DeleteTodo { id: id.clone() })
            .await?;
        self.dispatch(TodoAction::StartRequest).await?;
        let outcome = self.remote.delete(id).await;
        self.settle("deletion", outcome, Revert::All(snapshot))
            .await
    }

    /// Dismiss the error banner
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Store`] if the store is shutting down.
    pub async fn clear_error(&self) -> Result<(), SyncError> {
        self.dispatch(TodoAction::ClearError).await
    }

    /// Change the sort field; a change triggers a refetch
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Store`] if the store is shutting down.
    pub async fn set_sort_field(&self, field: SortField) -> Result<(), SyncError> {
        self.dispatch(TodoAction::SetSortField(field)).await
    }

    /// Change the sort direction; a change triggers a refetch
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Store`] if the store is shutting down.
    pub async fn set_sort_direction(&self, direction: SortDirection) -> Result<(), SyncError> {
        self.dispatch(TodoAction::SetSortDirection(direction)).await
    }

    /// Apply search text immediately, bypassing the debounce
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Store`] if the store is shutting down.
    pub async fn set_query_string(&self, query: &str) -> Result<(), SyncError> {
        self.dispatch(TodoAction::SetQueryString(query.to_string()))
            .await
    }

    /// Record a keystroke in the search box; the search settles after the
    /// debounce period unless another keystroke arrives first
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Store`] if the store is shutting down.
    pub async fn search_input(&self, text: &str) -> Result<(), SyncError> {
        self.dispatch(TodoAction::SearchInputChanged {
            text: text.to_string(),
        })
        .await
    }

    /// Clear the search box and any pending debounce
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Store`] if the store is shutting down.
    pub async fn clear_search(&self) -> Result<(), SyncError> {
        self.dispatch(TodoAction::ClearSearch).await
    }

    /// Re-fetch whenever a view setting change requests it
    ///
    /// The task runs until aborted.
    #[must_use]
    pub fn spawn_refetch_listener(&self) -> JoinHandle<()> {
        let mut actions = self.store.subscribe_actions();
        let controller = self.clone();

        tokio::spawn(async move {
            loop {
                match actions.recv().await {
                    Ok(TodoAction::RefetchRequested) => {
                        if let Err(error) = controller.fetch_todos().await {
                            tracing::debug!(error = %error, "Refetch failed");
                        }
                    },
                    Ok(_) => {},
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Refetch listener lagged");
                    },
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// Stop accepting actions and wait for pending effects
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Store`] if effects are still running at the timeout.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), SyncError> {
        self.store.shutdown(timeout).await?;
        Ok(())
    }

    async fn dispatch(&self, action: TodoAction) -> Result<(), SyncError> {
        tracing::debug!(?action, "Dispatching");
        self.store.send(action).await?;
        Ok(())
    }

    async fn existing(&self, id: &TodoId) -> Result<Todo, SyncError> {
        self.store
            .state(|s| s.get(id).cloned())
            .await
            .ok_or_else(|| SyncError::UnknownTodo(id.clone()))
    }

    /// Close a mutation: on failure report and roll back, then end the request
    async fn settle(
        &self,
        operation: &'static str,
        outcome: Result<(), AirtableError>,
        rollback: Revert,
    ) -> Result<(), SyncError> {
        let outcome = match outcome {
            Ok(()) => {
                metrics::counter!("sync.mutation.success", "operation" => operation).increment(1);
                Ok(())
            },
            Err(error) => {
                tracing::warn!(operation, error = %error, "Mutation failed, rolling back");
                metrics::counter!("sync.mutation.failure", "operation" => operation).increment(1);
                metrics::counter!("sync.rollbacks").increment(1);

                self.dispatch(TodoAction::SetLoadError {
                    message: format!("{error}. Reverting todo {operation}..."),
                })
                .await?;
                self.dispatch(TodoAction::RevertTodo(rollback)).await?;
                Err(error.into())
            },
        };

        self.dispatch(TodoAction::EndRequest).await?;
        outcome
    }
}
