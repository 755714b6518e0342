//! Game catalog access on top of a Supabase (PostgREST) backend.
//!
//! This module provides everything needed to read the hosted game catalog,
//! which is split across three tables, one per [`GameCategory`].
//!
//! # Modules
//!
//! - `client` - Catalog operations: per-category listing, aggregation, search and detail
//! - `connection` - Lazily built, replaceable connection handle
//! - `requester` - HTTP client for the PostgREST endpoints of the backend
//! - `response_structs` - Internal data structures for backend responses
//! - `structs` - Public data structures representing games and categories
//!
//! # Examples
//!
//! ```no_run
//! use miku_catalog::catalog::{CatalogClient, Connection};
//!
//! # async fn example() {
//! let connection = Connection::new("https://project.supabase.co", "anon-key");
//! let client = CatalogClient::new(connection);
//! let games = client.fetch_all_categories().await;
//! println!("{} games in the catalog", games.len());
//! # }
//! ```

mod client;
mod connection;
mod requester;
mod response_structs;
mod structs;

pub use crate::catalog::client::CatalogClient;
pub use crate::catalog::connection::Connection;
pub use crate::catalog::structs::{GameCategory, GameImages, GameListItem, GameRecord};

use thiserror::Error;

/// Errors that can occur while querying the catalog backend.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The configured endpoint is not a usable http(s) URL.
    #[error("invalid endpoint {0}")]
    InvalidEndpoint(String),

    /// The backend rejected the query.
    ///
    /// Carries the message reported by the backend, e.g. a malformed filter
    /// or a missing row on a single-row fetch.
    #[error("query on {table} rejected: {message}")]
    RemoteQuery { table: String, message: String },

    /// The request could not be sent or its response could not be read.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a body that does not match the expected rows.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}
