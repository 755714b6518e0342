//! Response structures for the PostgREST endpoints.
//!
//! This module contains structures for deserializing JSON responses from
//! the backend that have no public counterpart.

use serde::Deserialize;
use std::fmt;

use crate::catalog::structs::{GameCategory, GameListItem, null_as_empty};

/// Row returned by a title search, which does not select the image list.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ListingRow {
    pub id: String,
    pub title: String,
    pub cover_image_url: Option<String>,
    pub version: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
}

impl ListingRow {
    /// Turns the row into a list item tagged with the table it was read from.
    pub fn into_list_item(self, category: GameCategory) -> GameListItem {
        GameListItem {
            id: self.id,
            title: self.title,
            cover_image_url: self.cover_image_url,
            category,
            version: self.version,
            tags: self.tags,
        }
    }
}

/// Error body sent by PostgREST with any non-2xx status.
///
/// ```json
/// {"code": "PGRST116", "details": "The result contains 0 rows", "hint": null, "message": "JSON object requested, multiple (or no) rows returned"}
/// ```
#[derive(Deserialize, Debug)]
pub struct PostgrestError {
    pub message: Option<String>,
    pub code: Option<String>,
    pub details: Option<String>,
    pub hint: Option<String>,
}

impl fmt::Display for PostgrestError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "code={:?}, message={:?}, details={:?}, hint={:?}",
            self.code, self.message, self.details, self.hint
        )
    }
}
