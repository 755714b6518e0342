//! Catalog operations over the category tables.
//!
//! This module provides the [`CatalogClient`] struct which turns single-table
//! queries into the listings, searches and lookups used by the application.
//! Multi-category operations query the tables one after the other and keep
//! going when a table fails.

use std::sync::Arc;

use log::{debug, error, info, warn};

use crate::catalog::CatalogError;
use crate::catalog::connection::Connection;
use crate::catalog::requester::{Requester, SupabaseRequester};
use crate::catalog::structs::{GameCategory, GameImages, GameListItem, GameRecord};

/// Maximum number of search results taken from each category.
pub const SEARCH_LIMIT: usize = 20;

/// Category pinged by [`CatalogClient::check_connectivity`].
const CONNECTIVITY_CATEGORY: GameCategory = GameCategory::General;

/// Read access to the game catalog.
///
/// # Examples
///
/// ```no_run
/// use miku_catalog::catalog::{CatalogClient, Connection, GameCategory};
///
/// # #[tokio::main]
/// # async fn main() {
/// let client = CatalogClient::new(Connection::new("https://project.supabase.co", "anon-key"));
/// let results = client.search("miku", Some(GameCategory::VisualNovel)).await;
/// println!("Results: {:?}", results);
/// # }
/// ```
pub struct CatalogClient<R: Requester> {
    /// Requester used to query the backend
    requester: R,
}

impl<R: Requester> CatalogClient<R> {
    /// Create a new [CatalogClient].
    ///
    /// # Arguments
    ///
    /// * `requester` - An implementation of the [Requester] trait to query the backend.
    pub fn new(requester: R) -> Self {
        CatalogClient { requester }
    }

    /// Fetches the active games of one category, newest first.
    ///
    /// # Errors
    ///
    /// Any failure of the single underlying query is returned to the caller,
    /// [`CatalogError::RemoteQuery`] when the backend rejects it.
    pub async fn fetch_category(
        &self,
        category: GameCategory,
    ) -> Result<Vec<GameRecord>, CatalogError> {
        let records = self.requester.get_active_games(category).await?;
        debug!("fetched {} games from {}", records.len(), category);

        Ok(records)
    }

    /// Fetches the active games of every category.
    ///
    /// Categories are queried in [`GameCategory::ALL`] order. A category whose
    /// query fails is logged and contributes nothing, so this never fails.
    /// Items are not deduplicated, ids are only unique within a table.
    pub async fn fetch_all_categories(&self) -> Vec<GameListItem> {
        info!("fetch games of all categories");

        let mut outcomes = Vec::with_capacity(GameCategory::ALL.len());
        for category in GameCategory::ALL {
            let outcome = self.fetch_category(category).await.map(|records| {
                records
                    .into_iter()
                    .map(|record| GameListItem::from_record(record, category))
                    .collect()
            });
            outcomes.push((category, outcome));
        }

        collect_outcomes("fetch", outcomes)
    }

    /// Fetches the image list of a single game.
    ///
    /// Returns `None` both when the game does not exist and when the query
    /// fails; only the log tells the two apart.
    pub async fn fetch_game_detail(&self, game_id: &str, category: GameCategory) -> Option<GameImages> {
        match self.requester.get_game_images(category, game_id).await {
            Ok(images) => Some(images),
            Err(e) => {
                warn!("failed to fetch images of {} in {}: {}", game_id, category, e);
                None
            }
        }
    }

    /// Searches active games whose title contains `keyword`, ignoring case.
    ///
    /// Searches every category when `category` is `None`. Each category
    /// contributes at most [`SEARCH_LIMIT`] items, in the backend's order.
    /// Failing categories are logged and skipped as in
    /// [`Self::fetch_all_categories`].
    pub async fn search(&self, keyword: &str, category: Option<GameCategory>) -> Vec<GameListItem> {
        let categories = match category {
            Some(category) => vec![category],
            None => GameCategory::ALL.to_vec(),
        };
        info!("search {:?} in {:?}", keyword, categories);

        let mut outcomes = Vec::with_capacity(categories.len());
        for category in categories {
            let outcome = self
                .requester
                .search_active_games(category, keyword, SEARCH_LIMIT)
                .await
                .map(|rows| {
                    rows.into_iter()
                        .take(SEARCH_LIMIT)
                        .map(|row| row.into_list_item(category))
                        .collect()
                });
            outcomes.push((category, outcome));
        }

        collect_outcomes("search", outcomes)
    }

    /// Returns whether the backend answers a minimal query.
    pub async fn check_connectivity(&self) -> bool {
        match self.requester.ping_table(CONNECTIVITY_CATEGORY).await {
            Ok(()) => true,
            Err(e) => {
                debug!("connectivity check failed: {}", e);
                false
            }
        }
    }
}

impl CatalogClient<Connection> {
    /// Returns the connection handle, building it on first call.
    pub async fn get_connection(&self) -> Result<Arc<SupabaseRequester>, CatalogError> {
        self.requester.handle().await
    }

    /// Replaces the connection handle, see [`Connection::reconfigure`].
    pub async fn reconfigure(&self, endpoint: &str, anon_key: &str) -> Result<(), CatalogError> {
        self.requester.reconfigure(endpoint, anon_key).await
    }
}

/// Concatenates the items of every successful category, in order.
///
/// Failed categories are logged and contribute no items.
fn collect_outcomes(
    operation: &str,
    outcomes: Vec<(GameCategory, Result<Vec<GameListItem>, CatalogError>)>,
) -> Vec<GameListItem> {
    outcomes
        .into_iter()
        .fold(Vec::new(), |mut items, (category, outcome)| {
            match outcome {
                Ok(category_items) => items.extend(category_items),
                Err(e) => error!("failed to {} {}: {}", operation, category, e),
            }
            items
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::requester::MockRequester;
    use crate::catalog::response_structs::ListingRow;
    use mockall::Sequence;
    use mockall::predicate::eq;

    fn record(id: &str, title: &str, tags: &[&str]) -> GameRecord {
        GameRecord {
            id: id.to_owned(),
            title: title.to_owned(),
            image_urls: vec![format!("https://img/{}.png", id)],
            cover_image_url: None,
            version: Some("1.0".to_owned()),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn row(id: &str, title: &str) -> ListingRow {
        ListingRow {
            id: id.to_owned(),
            title: title.to_owned(),
            cover_image_url: None,
            version: None,
            tags: vec![],
        }
    }

    fn remote_error(table: &str) -> CatalogError {
        CatalogError::RemoteQuery {
            table: table.to_owned(),
            message: "boom".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_fetch_category() {
        let mut mock_requester = MockRequester::new();
        mock_requester
            .expect_get_active_games()
            .with(eq(GameCategory::General))
            .times(1)
            .returning(|_| Ok(vec![record("g1", "Miku Quest", &["rpg"])]));

        let client = CatalogClient::new(mock_requester);
        let games = client.fetch_category(GameCategory::General).await.unwrap();

        assert_eq!(games.len(), 1);
        assert_eq!(games[0].id, "g1");
        assert_eq!(games[0].title, "Miku Quest");
        assert_eq!(games[0].tags, vec!["rpg"]);
    }

    #[tokio::test]
    async fn test_fetch_category_surfaces_remote_error() {
        let mut mock_requester = MockRequester::new();
        mock_requester
            .expect_get_active_games()
            .times(1)
            .returning(|_| Err(remote_error("h_games")));

        let client = CatalogClient::new(mock_requester);
        let result = client.fetch_category(GameCategory::Adult).await;

        assert!(matches!(result, Err(CatalogError::RemoteQuery { .. })));
    }

    #[tokio::test]
    async fn test_fetch_all_categories() {
        let mut mock_requester = MockRequester::new();
        let mut seq = Sequence::new();
        mock_requester
            .expect_get_active_games()
            .with(eq(GameCategory::General))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(vec![
                    record("g2", "Newest", &[]),
                    record("g1", "Miku Quest", &["rpg"]),
                ])
            });
        mock_requester
            .expect_get_active_games()
            .with(eq(GameCategory::Adult))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec![record("h1", "Night", &[])]));
        mock_requester
            .expect_get_active_games()
            .with(eq(GameCategory::VisualNovel))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec![record("g1", "Same id, other table", &[])]));

        let client = CatalogClient::new(mock_requester);
        let items = client.fetch_all_categories().await;

        assert_eq!(items.len(), 4);
        let ids: Vec<(&str, GameCategory)> =
            items.iter().map(|i| (i.id.as_str(), i.category)).collect();
        assert_eq!(
            ids,
            vec![
                ("g2", GameCategory::General),
                ("g1", GameCategory::General),
                ("h1", GameCategory::Adult),
                ("g1", GameCategory::VisualNovel),
            ]
        );
        assert_eq!(items[1].tags, vec!["rpg"]);
    }

    #[tokio::test]
    async fn test_fetch_all_categories_isolates_failure() {
        let mut mock_requester = MockRequester::new();
        mock_requester
            .expect_get_active_games()
            .with(eq(GameCategory::General))
            .times(1)
            .returning(|_| Ok(vec![record("g1", "Miku Quest", &[])]));
        mock_requester
            .expect_get_active_games()
            .with(eq(GameCategory::Adult))
            .times(1)
            .returning(|_| Err(remote_error("h_games")));
        mock_requester
            .expect_get_active_games()
            .with(eq(GameCategory::VisualNovel))
            .times(1)
            .returning(|_| Ok(vec![record("v1", "Snow Route", &[])]));

        let client = CatalogClient::new(mock_requester);
        let items = client.fetch_all_categories().await;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].category, GameCategory::General);
        assert_eq!(items[1].category, GameCategory::VisualNovel);
    }

    #[tokio::test]
    async fn test_fetch_all_categories_all_failing() {
        let mut mock_requester = MockRequester::new();
        mock_requester
            .expect_get_active_games()
            .times(3)
            .returning(|c| Err(remote_error(c.table())));

        let client = CatalogClient::new(mock_requester);

        assert!(client.fetch_all_categories().await.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_game_detail() {
        let mut mock_requester = MockRequester::new();
        mock_requester
            .expect_get_game_images()
            .with(eq(GameCategory::General), eq("g1"))
            .times(1)
            .returning(|_, id| {
                Ok(GameImages {
                    id: id.to_owned(),
                    image_urls: vec!["https://img/b.png".to_owned(), "https://img/a.png".to_owned()],
                })
            });

        let client = CatalogClient::new(mock_requester);
        let images = client
            .fetch_game_detail("g1", GameCategory::General)
            .await
            .unwrap();

        assert_eq!(images.id, "g1");
        assert_eq!(images.image_urls, vec!["https://img/b.png", "https://img/a.png"]);
    }

    #[tokio::test]
    async fn test_fetch_game_detail_failure_is_absent() {
        let mut mock_requester = MockRequester::new();
        mock_requester
            .expect_get_game_images()
            .times(1)
            .returning(|_, _| Err(remote_error("galgames")));

        let client = CatalogClient::new(mock_requester);

        assert!(
            client
                .fetch_game_detail("missing", GameCategory::VisualNovel)
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_search_all_categories() {
        let mut mock_requester = MockRequester::new();
        let mut seq = Sequence::new();
        mock_requester
            .expect_search_active_games()
            .with(eq(GameCategory::General), eq("miku"), eq(SEARCH_LIMIT))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(vec![row("g1", "Miku Quest")]));
        mock_requester
            .expect_search_active_games()
            .with(eq(GameCategory::Adult), eq("miku"), eq(SEARCH_LIMIT))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(vec![]));
        mock_requester
            .expect_search_active_games()
            .with(eq(GameCategory::VisualNovel), eq("miku"), eq(SEARCH_LIMIT))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(vec![row("v3", "MIKU days"), row("v1", "miku nights")]));

        let client = CatalogClient::new(mock_requester);
        let items = client.search("miku", None).await;

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].category, GameCategory::General);
        assert_eq!(items[1].id, "v3");
        assert_eq!(items[2].id, "v1");
        assert!(items[1..].iter().all(|i| i.category == GameCategory::VisualNovel));
    }

    #[tokio::test]
    async fn test_search_single_category() {
        let mut mock_requester = MockRequester::new();
        mock_requester
            .expect_search_active_games()
            .with(eq(GameCategory::Adult), eq("foo"), eq(SEARCH_LIMIT))
            .times(1)
            .returning(|_, _, _| Ok(vec![row("h1", "Foo"), row("h2", "Bar foo")]));

        let client = CatalogClient::new(mock_requester);
        let items = client.search("foo", Some(GameCategory::Adult)).await;

        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.category == GameCategory::Adult));
    }

    #[tokio::test]
    async fn test_search_caps_each_category() {
        let mut mock_requester = MockRequester::new();
        mock_requester
            .expect_search_active_games()
            .times(3)
            .returning(|category, _, _| {
                Ok((0..30)
                    .map(|i| row(&format!("{}-{}", category.table(), i), "a"))
                    .collect())
            });

        let client = CatalogClient::new(mock_requester);
        let items = client.search("a", None).await;

        assert_eq!(items.len(), 3 * SEARCH_LIMIT);
        for category in GameCategory::ALL {
            let count = items.iter().filter(|i| i.category == category).count();
            assert_eq!(count, SEARCH_LIMIT);
        }
    }

    #[tokio::test]
    async fn test_search_isolates_failure() {
        let mut mock_requester = MockRequester::new();
        mock_requester
            .expect_search_active_games()
            .with(eq(GameCategory::General), eq("x"), eq(SEARCH_LIMIT))
            .times(1)
            .returning(|_, _, _| Err(remote_error("games")));
        mock_requester
            .expect_search_active_games()
            .with(eq(GameCategory::Adult), eq("x"), eq(SEARCH_LIMIT))
            .times(1)
            .returning(|_, _, _| Ok(vec![row("h1", "x")]));
        mock_requester
            .expect_search_active_games()
            .with(eq(GameCategory::VisualNovel), eq("x"), eq(SEARCH_LIMIT))
            .times(1)
            .returning(|_, _, _| Err(remote_error("galgames")));

        let client = CatalogClient::new(mock_requester);
        let items = client.search("x", None).await;

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "h1");
    }

    #[tokio::test]
    async fn test_check_connectivity() {
        let mut mock_requester = MockRequester::new();
        mock_requester
            .expect_ping_table()
            .with(eq(GameCategory::General))
            .times(1)
            .returning(|_| Ok(()));

        let client = CatalogClient::new(mock_requester);

        assert!(client.check_connectivity().await);
    }

    #[tokio::test]
    async fn test_check_connectivity_failure() {
        let mut mock_requester = MockRequester::new();
        mock_requester
            .expect_ping_table()
            .times(1)
            .returning(|_| Err(remote_error("games")));

        let client = CatalogClient::new(mock_requester);

        assert!(!client.check_connectivity().await);
    }

    #[tokio::test]
    async fn test_active_rows_only_against_backend() {
        let mut server = mockito::Server::new_async().await;
        let active = r#"[{"id": "g1", "title": "Miku Quest", "image_urls": [], "cover_image_url": null, "version": null, "tags": ["rpg"]}]"#;

        // Only a status-filtered query is answered
        server
            .mock("GET", "/rest/v1/games")
            .match_query(mockito::Matcher::UrlEncoded(
                "status".to_owned(),
                "eq.active".to_owned(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(active)
            .create_async()
            .await;
        for table in ["h_games", "galgames"] {
            server
                .mock("GET", format!("/rest/v1/{}", table).as_str())
                .match_query(mockito::Matcher::Any)
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body("[]")
                .create_async()
                .await;
        }

        let client = CatalogClient::new(Connection::new(&server.url(), "key"));

        let games = client.fetch_category(GameCategory::General).await.unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].id, "g1");

        let items = client.fetch_all_categories().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "g1");
        assert_eq!(items[0].category, GameCategory::General);
        assert_eq!(items[0].tags, vec!["rpg"]);
    }

    #[tokio::test]
    async fn test_reconfigure_then_get_connection() {
        let client = CatalogClient::new(Connection::new("https://old.example.com", "old"));

        client
            .reconfigure("https://new.example.com", "new")
            .await
            .unwrap();
        let handle = client.get_connection().await.unwrap();

        assert_eq!(handle.endpoint().host_str(), Some("new.example.com"));
        assert_eq!(handle.anon_key(), "new");
    }
}
