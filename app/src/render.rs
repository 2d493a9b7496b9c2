//! Terminal presentation of the views.

use crate::routes::Route;
use crate::types::{SortDirection, SortField, TodoState};
use crate::view::TodoView;
use std::fmt::Write;

const TITLE: &str = "My Todos";

/// Render whatever `route` selects
#[must_use]
pub fn render_route(route: &Route, state: &TodoState) -> String {
    match route {
        Route::Todos { page } => render_todos(state, page.as_deref()),
        Route::About => render_about(),
        Route::NotFound => render_not_found(),
    }
}

/// Render the list view at `page`
#[must_use]
pub fn render_todos(state: &TodoState, page: Option<&str>) -> String {
    let view = TodoView::derive(state, page);
    let mut out = String::new();

    let _ = writeln!(out, "{TITLE}");
    let _ = writeln!(out, "{}", "=".repeat(TITLE.len()));

    if state.is_loading {
        let _ = writeln!(out, "Todo list loading...");
    } else if view.is_empty() {
        let _ = writeln!(out, "No todos yet!");
    } else {
        for todo in &view.todos {
            let mark = if todo.is_completed { 'x' } else { ' ' };
            let _ = writeln!(out, "[{mark}] {}  ({})", todo.title, todo.id);
        }
    }

    let pagination = view.pagination;
    if pagination.redirected {
        let _ = writeln!(out, "(requested page does not exist; showing page 1)");
    }
    let previous = if pagination.has_previous() {
        "< Previous"
    } else {
        "  Previous"
    };
    let next = if pagination.has_next() { "Next >" } else { "Next  " };
    let _ = writeln!(
        out,
        "\n{previous}   Page {} of {}   {next}",
        pagination.current_page, pagination.total_pages
    );

    let field = match state.sort_field {
        SortField::Title => "title",
        SortField::CreatedTime => "time added",
    };
    let direction = match state.sort_direction {
        SortDirection::Asc => "ascending",
        SortDirection::Desc => "descending",
    };
    let _ = write!(out, "Sorted by {field}, {direction}");
    if !state.query_string.is_empty() {
        let _ = write!(out, "; search \"{}\"", state.query_string);
    }
    out.push('\n');

    if state.is_saving {
        let _ = writeln!(out, "Saving...");
    }
    if state.has_error() {
        let _ = writeln!(out, "\n! {}", state.error_message);
    }

    out
}

/// Render the about view
#[must_use]
pub fn render_about() -> String {
    [
        "About This Todo App",
        "",
        "A todo list kept in a hosted record store. Edits, completions and",
        "deletions show up at once and are rolled back if the store rejects",
        "them; new todos appear once the store has assigned their id.",
        "",
        "The list is sorted and searched by the store, then shown fifteen",
        "todos per page. Asking for a page that does not exist shows the",
        "first page.",
        "",
    ]
    .join("\n")
}

/// Render the not-found view
#[must_use]
pub fn render_not_found() -> String {
    "404 - Page Not Found\n\nThe page you are looking for does not exist.\nGo to Home: /\n"
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Todo;

    #[test]
    fn loading_and_empty_messages() {
        let loading = TodoState {
            is_loading: true,
            ..TodoState::new()
        };
        assert!(render_todos(&loading, None).contains("Todo list loading..."));
        assert!(render_todos(&TodoState::new(), None).contains("No todos yet!"));
    }

    #[test]
    fn lists_todos_with_footer_and_banner() {
        let state = TodoState {
            error_message: "Not found: NOT_FOUND. Reverting todo deletion...".to_string(),
            ..TodoState::with_todos(vec![
                Todo::new("rec1", "Buy milk").completed(true),
                Todo::new("rec2", "Walk dog"),
            ])
        };
        let out = render_todos(&state, None);

        assert!(out.contains("[x] Buy milk  (rec1)"));
        assert!(out.contains("[ ] Walk dog  (rec2)"));
        assert!(out.contains("Page 1 of 1"));
        assert!(out.contains("! Not found: NOT_FOUND. Reverting todo deletion..."));
    }

    #[test]
    fn redirect_is_noted() {
        let out = render_todos(&TodoState::new(), Some("9"));
        assert!(out.contains("showing page 1"));
        assert!(out.contains("Page 1 of 1"));
    }

    #[test]
    fn routes_pick_views() {
        let state = TodoState::new();
        assert!(render_route(&Route::About, &state).starts_with("About This Todo App"));
        assert!(render_route(&Route::NotFound, &state).contains("404"));
        assert!(render_route(&Route::Todos { page: None }, &state).contains("My Todos"));
    }
}
