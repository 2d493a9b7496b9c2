//! # Record Store Client
//!
//! Rust client for the hosted tabular record store (Airtable REST API)
//! that persists taskdeck's todos.
//!
//! ## Example
//!
//! ```no_run
//! use taskdeck_airtable::{AirtableClient, Direction, ListQuery, Sort};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = AirtableClient::from_parts(
//!         "https://api.airtable.com/v0",
//!         "appExampleBase",
//!         "Todos",
//!         "pat-example",
//!     )?;
//!
//!     let query = ListQuery::new().with_sort(Sort::new("createdTime", Direction::Desc));
//!     for record in client.list(&query).await? {
//!         println!("{}: {:?}", record.id, record.fields.title);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - List with sort and `SEARCH` formula filtering, following `offset` pagination
//! - Create, partial update, and delete of single records
//! - Typed request/response schemas; shape mismatches surface as
//!   [`AirtableError::MalformedResponse`]

pub mod client;
pub mod error;
pub mod query;
pub mod types;

// Re-export main types for convenience
pub use client::AirtableClient;
pub use error::AirtableError;
pub use query::{Direction, ListQuery, Sort};
pub use types::{FieldsPatch, Record, RecordFields};
