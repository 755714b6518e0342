//! Text response formatters for the command line.
//!
//! This module turns catalog results into the plain text printed by each
//! subcommand. JSON output is produced directly with `serde_json`.

use crate::catalog::{GameImages, GameListItem, GameRecord};

/// Formats a list of games, one line per game.
///
/// Each line shows the source table, the id, the title, and when present the
/// version and the tags.
///
/// # Examples
///
/// ```
/// # use miku_catalog::response::format_games;
/// let output = format_games(&[]);
/// assert_eq!(output, "No games found.");
/// ```
pub fn format_games(games: &[GameListItem]) -> String {
    if games.is_empty() {
        return "No games found.".to_owned();
    }

    let lines = games
        .iter()
        .map(|game| {
            format_line(
                game.category.table(),
                &game.id,
                &game.title,
                game.version.as_deref(),
                &game.tags,
            )
        })
        .collect::<Vec<String>>()
        .join("\n");

    format!("{} games:\n{}", games.len(), lines)
}

/// Formats the games of a single category.
pub fn format_records(table: &str, records: &[GameRecord]) -> String {
    if records.is_empty() {
        return format!("No games found in {}.", table);
    }

    let lines = records
        .iter()
        .map(|record| {
            let line = format_line(
                table,
                &record.id,
                &record.title,
                record.version.as_deref(),
                &record.tags,
            );
            format!("{} ({} images)", line, record.image_urls.len())
        })
        .collect::<Vec<String>>()
        .join("\n");

    format!("{} games:\n{}", records.len(), lines)
}

/// Formats the image list of a game, or a not found message.
pub fn format_images(game_id: &str, images: Option<&GameImages>) -> String {
    match images {
        Some(images) if images.image_urls.is_empty() => format!("{} has no images.", images.id),
        Some(images) => format!("{}:\n{}", images.id, images.image_urls.join("\n")),
        None => format!("No images found for {}.", game_id),
    }
}

fn format_line(table: &str, id: &str, title: &str, version: Option<&str>, tags: &[String]) -> String {
    let mut line = format!("[{}] {} {}", table, id, title);
    if let Some(version) = version {
        line.push_str(&format!(" v{}", version));
    }
    if !tags.is_empty() {
        line.push_str(&format!(" #{}", tags.join(" #")));
    }
    line
}
