//! Reducer for the todo list.
//!
//! Every state transition of the app goes through [`TodoReducer`]. The
//! reducer is pure; remote calls live in the sync controller, and the only
//! effects returned here are the search debounce timer and refetch requests.

use crate::types::{Revert, Todo, TodoAction, TodoState};
use std::time::Duration;
use taskdeck_core::{
    effect::{Effect, EffectId},
    reducer::Reducer,
    smallvec, SmallVec,
};

/// Registration id of the pending search debounce timer
pub const SEARCH_DEBOUNCE: EffectId = EffectId::new("search-debounce");

/// Default quiet period before typed search text is applied
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Environment dependencies for the todo reducer
#[derive(Clone, Debug)]
pub struct TodoEnvironment {
    /// Quiet period after the last keystroke before the search settles
    pub search_debounce: Duration,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment`
    #[must_use]
    pub const fn new(search_debounce: Duration) -> Self {
        Self { search_debounce }
    }
}

impl Default for TodoEnvironment {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DEBOUNCE)
    }
}

/// Reducer for the todo list
#[derive(Clone, Debug, Default)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn replace(state: &mut TodoState, todo: Todo) {
        if let Some(slot) = state.todo_list.iter_mut().find(|t| t.id == todo.id) {
            *slot = todo;
        }
    }

    fn refetch() -> SmallVec<[Effect<TodoAction>; 4]> {
        smallvec![Effect::send(TodoAction::RefetchRequested)]
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Remote lifecycle ==========
            TodoAction::FetchTodos => {
                state.is_loading = true;
                state.error_message.clear();
            },

            TodoAction::LoadTodos { records } => {
                state.todo_list = records.into_iter().map(Todo::from).collect();
                state.is_loading = false;
            },

            TodoAction::SetLoadError { message } => {
                state.error_message = message;
                state.is_loading = false;
                state.is_saving = false;
            },

            TodoAction::StartRequest => {
                state.is_saving = true;
                state.error_message.clear();
            },

            TodoAction::EndRequest => {
                state.is_saving = false;
            },

            TodoAction::AddTodo { record } => {
                state.todo_list.push(Todo::from(record));
                state.is_saving = false;
            },

            // ========== Local mutations ==========
            TodoAction::UpdateTodo { todo } => Self::replace(state, todo),

            TodoAction::CompleteTodo { id } => {
                if let Some(todo) = state.todo_list.iter_mut().find(|t| t.id == id) {
                    todo.is_completed = !todo.is_completed;
                }
            },

            TodoAction::DeleteTodo { id } => {
                state.todo_list.retain(|t| t.id != id);
            },

            TodoAction::RevertTodo(Revert::One(original)) => Self::replace(state, original),

            TodoAction::RevertTodo(Revert::All(originals)) => {
                state.todo_list = originals;
            },

            TodoAction::ClearError => {
                state.error_message.clear();
            },

            // ========== View settings ==========
            TodoAction::SetSortField(field) => {
                if state.sort_field != field {
                    state.sort_field = field;
                    return Self::refetch();
                }
            },

            TodoAction::SetSortDirection(direction) => {
                if state.sort_direction != direction {
                    state.sort_direction = direction;
                    return Self::refetch();
                }
            },

            TodoAction::SetQueryString(query) => {
                if state.query_string != query {
                    state.query_string = query;
                    return Self::refetch();
                }
            },

            TodoAction::SearchInputChanged { text } => {
                state.search_input.clone_from(&text);
                return smallvec![
                    Effect::Delay {
                        duration: env.search_debounce,
                        action: Box::new(TodoAction::SetQueryString(text)),
                    }
                    .cancellable(SEARCH_DEBOUNCE)
                ];
            },

            TodoAction::ClearSearch => {
                state.search_input.clear();
                let mut effects: SmallVec<[Effect<TodoAction>; 4]> =
                    smallvec![Effect::Cancel(SEARCH_DEBOUNCE)];
                if !state.query_string.is_empty() {
                    state.query_string.clear();
                    effects.push(Effect::send(TodoAction::RefetchRequested));
                }
                return effects;
            },

            // Observed by the sync controller
            TodoAction::RefetchRequested => {},
        }

        SmallVec::new()
    }
}
