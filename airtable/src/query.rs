//! List query encoding: sort and search parameters

/// Sort direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Direction {
    /// Ascending
    #[default]
    Asc,
    /// Descending
    Desc,
}

impl Direction {
    /// Wire value
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Server-side sort on a single field
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sort {
    /// Field name as stored in the table
    pub field: String,
    /// Direction
    pub direction: Direction,
}

impl Sort {
    /// Sort by `field` in `direction`
    #[must_use]
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

/// Parameters of a list request
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Optional sort
    pub sort: Option<Sort>,
    /// Substring to search for in the `title` field; empty means no filter
    pub search: String,
}

impl ListQuery {
    /// Unsorted, unfiltered query
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sort
    #[must_use]
    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Set the search text
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Query-string pairs for this request (unencoded)
    #[must_use]
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(3);
        if let Some(sort) = &self.sort {
            params.push(("sort[0][field]".to_string(), sort.field.clone()));
            params.push((
                "sort[0][direction]".to_string(),
                sort.direction.as_str().to_string(),
            ));
        }
        if !self.search.is_empty() {
            params.push(("filterByFormula".to_string(), search_formula(&self.search)));
        }
        params
    }
}

/// `SEARCH("<text>",title)` with `text` escaped as a formula string literal
#[must_use]
pub fn search_formula(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '"' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    format!("SEARCH(\"{escaped}\",title)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_has_no_params() {
        assert!(ListQuery::new().params().is_empty());
    }

    #[test]
    fn sort_and_search_params() {
        let params = ListQuery::new()
            .with_sort(Sort::new("title", Direction::Asc))
            .with_search("milk")
            .params();

        assert_eq!(
            params,
            vec![
                ("sort[0][field]".to_string(), "title".to_string()),
                ("sort[0][direction]".to_string(), "asc".to_string()),
                (
                    "filterByFormula".to_string(),
                    "SEARCH(\"milk\",title)".to_string()
                ),
            ]
        );
    }

    #[test]
    fn formula_escapes_quotes_and_backslashes() {
        assert_eq!(
            search_formula(r#"say "hi" \o/"#),
            r#"SEARCH("say \"hi\" \\o/",title)"#
        );
    }
}
