//! Public data structures for catalog entries.
//!
//! This module defines the game categories backed by the remote tables and the
//! record shapes returned by the catalog operations.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};

/// Classification of a game, each backed by its own remote table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GameCategory {
    /// All-ages games, stored in `games`.
    #[serde(rename = "games")]
    General,
    /// Adult games, stored in `h_games`.
    #[serde(rename = "h_games")]
    Adult,
    /// Visual novels, stored in `galgames`.
    #[serde(rename = "galgames")]
    VisualNovel,
}

impl GameCategory {
    /// Every category, in the order multi-category operations walk them.
    pub const ALL: [GameCategory; 3] = [
        GameCategory::General,
        GameCategory::Adult,
        GameCategory::VisualNovel,
    ];

    /// Name of the remote table holding this category.
    pub fn table(&self) -> &'static str {
        match self {
            GameCategory::General => "games",
            GameCategory::Adult => "h_games",
            GameCategory::VisualNovel => "galgames",
        }
    }
}

impl fmt::Display for GameCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.table())
    }
}

/// Error returned when a string names no known category.
#[derive(Debug, thiserror::Error)]
#[error("unknown category {0}, expected one of games, h_games, galgames")]
pub struct UnknownCategory(String);

impl FromStr for GameCategory {
    type Err = UnknownCategory;

    /// Accepts the table name (`h_games`) or the readable name (`adult`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "games" | "general" => Ok(GameCategory::General),
            "h_games" | "adult" => Ok(GameCategory::Adult),
            "galgames" | "visual-novel" => Ok(GameCategory::VisualNovel),
            _ => Err(UnknownCategory(s.to_owned())),
        }
    }
}

/// Minimal game record as stored in a category table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Identifier, unique within its table only
    pub id: String,
    pub title: String,
    /// Screenshot URLs in display order
    #[serde(default, deserialize_with = "null_as_empty")]
    pub image_urls: Vec<String>,
    pub cover_image_url: Option<String>,
    pub version: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
}

/// Game summary used by listings and search results.
///
/// Never persisted, always derived from a row of the table named by `category`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameListItem {
    pub id: String,
    pub title: String,
    pub cover_image_url: Option<String>,
    /// Category of the table the row was read from
    pub category: GameCategory,
    pub version: Option<String>,
    pub tags: Vec<String>,
}

impl GameListItem {
    /// Builds the summary of `record`, read from the `category` table.
    pub fn from_record(record: GameRecord, category: GameCategory) -> Self {
        GameListItem {
            id: record.id,
            title: record.title,
            cover_image_url: record.cover_image_url,
            category,
            version: record.version,
            tags: record.tags,
        }
    }
}

/// Full image list of a single game, fetched on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameImages {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub image_urls: Vec<String>,
}

/// Deserializes an absent or `null` array as an empty one.
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
