//! Derived list view: filter, sort and paginate.
//!
//! Recomputed from [`TodoState`] on every render and never stored.

use crate::types::{SortDirection, SortField, Todo, TodoState};
use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

/// Todos shown per page
pub const PAGE_SIZE: usize = 15;

/// Page position of a derived view
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page being shown
    pub current_page: usize,
    /// Number of pages, at least 1
    pub total_pages: usize,
    /// The requested page was invalid and page 1 is shown instead
    pub redirected: bool,
}

impl Pagination {
    /// Resolve a raw `page` query value against `item_count` items
    ///
    /// A missing value means page 1. Unparsable, zero and out-of-range
    /// values redirect to page 1.
    #[must_use]
    pub fn resolve(requested: Option<&str>, item_count: usize) -> Self {
        let total_pages = item_count.div_ceil(PAGE_SIZE).max(1);
        let page = requested.map(|raw| raw.trim().parse::<usize>().ok());

        let (current_page, redirected) = match page {
            None => (1, false),
            Some(Some(page)) if (1..=total_pages).contains(&page) => (page, false),
            Some(_) => (1, true),
        };

        Self {
            current_page,
            total_pages,
            redirected,
        }
    }

    /// Whether a previous page exists
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    /// Whether a next page exists
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    fn range(&self, item_count: usize) -> std::ops::Range<usize> {
        let start = ((self.current_page - 1) * PAGE_SIZE).min(item_count);
        start..(start + PAGE_SIZE).min(item_count)
    }
}

/// One page of the filtered, sorted list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TodoView {
    /// Todos on the current page, in display order
    pub todos: Vec<Todo>,
    /// Number of todos matching the search across all pages
    pub matching: usize,
    /// Page position
    pub pagination: Pagination,
}

impl TodoView {
    /// Derive the page `requested_page` of `state`'s list
    #[must_use]
    pub fn derive(state: &TodoState, requested_page: Option<&str>) -> Self {
        let mut todos = filter_todos(&state.todo_list, &state.query_string);
        sort_todos(&mut todos, state.sort_field, state.sort_direction);

        let matching = todos.len();
        let pagination = Pagination::resolve(requested_page, matching);
        let range = pagination.range(matching);
        let todos = todos.drain(range).collect();

        Self {
            todos,
            matching,
            pagination,
        }
    }

    /// Whether there is nothing to show on any page
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matching == 0
    }
}

/// Todos whose title contains `query`, ignoring case
#[must_use]
pub fn filter_todos(todos: &[Todo], query: &str) -> Vec<Todo> {
    let query = query.to_lowercase();
    todos
        .iter()
        .filter(|todo| query.is_empty() || todo.title.to_lowercase().contains(&query))
        .cloned()
        .collect()
}

/// Stable sort by `field` in `direction`
pub fn sort_todos(todos: &mut [Todo], field: SortField, direction: SortDirection) {
    todos.sort_by(|a, b| {
        let ordering = match field {
            SortField::Title => compare_titles(&a.title, &b.title),
            SortField::CreatedTime => a.created_time.cmp(&b.created_time),
        };
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

/// Human ordering of titles
///
/// Letters compare case-insensitively and runs of digits compare by numeric
/// value, so `t2` sorts before `t10`. Titles equal under those rules fall
/// back to a plain comparison.
#[must_use]
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    natural(a, b).then_with(|| a.cmp(b))
}

fn natural(a: &str, b: &str) -> Ordering {
    let mut a = a.chars().peekable();
    let mut b = b.chars().peekable();

    loop {
        match (a.peek().copied(), b.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let ordering = compare_numbers(&digit_run(&mut a), &digit_run(&mut b));
                if ordering != Ordering::Equal {
                    return ordering;
                }
            },
            (Some(x), Some(y)) => {
                let ordering = x.to_lowercase().cmp(y.to_lowercase());
                if ordering != Ordering::Equal {
                    return ordering;
                }
                a.next();
                b.next();
            },
        }
    }
}

fn digit_run(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.next_if(char::is_ascii_digit) {
        run.push(c);
    }
    run
}

/// Compare digit strings by value without parsing (no overflow)
fn compare_numbers(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
