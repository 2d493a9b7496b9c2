//! Navigation surface: which view a path selects.

use reqwest::Url;

/// A parsed location
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    /// `/`: the todo list, with the raw `page` query value if present
    Todos {
        /// Requested page, unvalidated
        page: Option<String>,
    },
    /// `/about`
    About,
    /// Anything else
    NotFound,
}

impl Route {
    /// Parse a path with optional query, such as `/?page=2`
    ///
    /// A trailing slash is ignored. Input that cannot be read as a path is
    /// not found.
    #[must_use]
    pub fn parse(path_and_query: &str) -> Self {
        let path_and_query = path_and_query.trim();
        let relative = if path_and_query.starts_with('/') {
            path_and_query.to_string()
        } else {
            format!("/{path_and_query}")
        };

        let Ok(url) = Url::parse("http://taskdeck.local").and_then(|base| base.join(&relative))
        else {
            return Self::NotFound;
        };

        match url.path().trim_end_matches('/') {
            "" => Self::Todos {
                page: url
                    .query_pairs()
                    .find(|(key, _)| key == "page")
                    .map(|(_, value)| value.into_owned()),
            },
            "/about" => Self::About,
            _ => Self::NotFound,
        }
    }

    /// Path that selects this route
    #[must_use]
    pub fn to_path(&self) -> String {
        match self {
            Self::Todos { page: None } => "/".to_string(),
            Self::Todos { page: Some(page) } => {
                let mut url = Url::parse("http://taskdeck.local/").ok();
                if let Some(url) = url.as_mut() {
                    url.query_pairs_mut().append_pair("page", page);
                }
                url.and_then(|u| u.query().map(|q| format!("/?{q}")))
                    .unwrap_or_else(|| "/".to_string())
            },
            Self::About => "/about".to_string(),
            Self::NotFound => "/404".to_string(),
        }
    }

    /// Route of list page `page`
    #[must_use]
    pub fn page(page: usize) -> Self {
        Self::Todos {
            page: Some(page.to_string()),
        }
    }
}
