//! HTTP client for the catalog backend.
//!
//! This module provides the [`SupabaseRequester`] struct for querying the
//! PostgREST API exposed by a Supabase project under `/rest/v1/{table}`.

use log::{debug, info};
use mockall::automock;
use reqwest::{Client, RequestBuilder, Response, header};
use serde::de::DeserializeOwned;
use url::Url;

use crate::catalog::CatalogError;
use crate::catalog::response_structs::{ListingRow, PostgrestError};
use crate::catalog::structs::{GameCategory, GameImages, GameRecord};

/// Columns of a full game record.
const RECORD_FIELDS: &str = "id,title,image_urls,cover_image_url,version,tags";
/// Columns of a search result, the image list is left out.
const LISTING_FIELDS: &str = "id,title,cover_image_url,version,tags";
/// Columns of a detail request.
const IMAGES_FIELDS: &str = "id,image_urls";
/// Media type asking PostgREST for a single object instead of an array.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// HTTP client for requesting catalog rows from the backend.
///
/// # Examples
///
/// ```no_run
/// let requester = SupabaseRequester::new("https://project.supabase.co", "anon-key").unwrap();
/// let games = requester.get_active_games(GameCategory::General).await.unwrap();
/// println!("Games: {:?}", games);
/// ```
#[derive(Debug)]
pub struct SupabaseRequester {
    /// Project endpoint, without the `/rest/v1` suffix
    endpoint: Url,
    /// Access key sent as `apikey` and bearer token
    anon_key: String,
    /// HTTP client
    client: Client,
}

/// Trait for querying the catalog tables.
///
/// This trait abstracts the HTTP operations for easier testing with mocks.
/// Each method is exactly one round trip.
#[automock]
pub trait Requester {
    /// Fetches the active rows of a category, newest first.
    async fn get_active_games(&self, category: GameCategory)
    -> Result<Vec<GameRecord>, CatalogError>;
    /// Fetches at most `limit` active rows whose title contains `keyword`, ignoring case.
    async fn search_active_games(
        &self,
        category: GameCategory,
        keyword: &str,
        limit: usize,
    ) -> Result<Vec<ListingRow>, CatalogError>;
    /// Fetches the image list of a single game by id.
    async fn get_game_images(
        &self,
        category: GameCategory,
        game_id: &str,
    ) -> Result<GameImages, CatalogError>;
    /// Issues the smallest possible query against a category table.
    async fn ping_table(&self, category: GameCategory) -> Result<(), CatalogError>;
}

impl SupabaseRequester {
    /// Create a new [SupabaseRequester].
    ///
    /// # Arguments
    ///
    /// * `endpoint` - The base URL of the Supabase project.
    /// * `anon_key` - The access key of the project.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidEndpoint`] if `endpoint` is not an http(s) URL.
    pub fn new(endpoint: &str, anon_key: &str) -> Result<Self, CatalogError> {
        let parsed = Url::parse(endpoint)
            .map_err(|e| CatalogError::InvalidEndpoint(format!("{:?}: {}", endpoint, e)))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CatalogError::InvalidEndpoint(format!(
                "{:?}: unsupported scheme {}",
                endpoint,
                parsed.scheme()
            )));
        }

        Ok(SupabaseRequester {
            endpoint: parsed,
            anon_key: anon_key.to_string(),
            client: Client::new(),
        })
    }

    /// Endpoint this requester talks to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Access key this requester authenticates with.
    pub fn anon_key(&self) -> &str {
        &self.anon_key
    }

    fn table_url(&self, category: GameCategory) -> String {
        format!(
            "{}/rest/v1/{}",
            self.endpoint.as_str().trim_end_matches('/'),
            category.table()
        )
    }

    /// Starts an authenticated GET on the table of `category`.
    fn get(&self, category: GameCategory) -> RequestBuilder {
        self.client
            .get(self.table_url(category))
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    /// Reads the body of `response` as `T`, or the backend error it carries.
    async fn read_body<T: DeserializeOwned>(
        category: GameCategory,
        response: Response,
    ) -> Result<T, CatalogError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let remote_error = serde_json::from_str::<PostgrestError>(&body).ok();
            match &remote_error {
                Some(remote_error) => {
                    debug!("{} answered {} -> {}", category.table(), status, remote_error)
                }
                None => debug!("{} answered {} -> {}", category.table(), status, body),
            }

            let message = match remote_error.and_then(|e| e.message) {
                Some(message) => message,
                None if !body.trim().is_empty() => body,
                None => status.to_string(),
            };
            return Err(CatalogError::RemoteQuery {
                table: category.table().to_string(),
                message,
            });
        }

        debug!("response from {} -> {}", category.table(), body);

        Ok(serde_json::from_str(&body)?)
    }
}

impl Requester for SupabaseRequester {
    /// Request `/rest/v1/{table}?select=...&status=eq.active&order=created_at.desc`.
    async fn get_active_games(
        &self,
        category: GameCategory,
    ) -> Result<Vec<GameRecord>, CatalogError> {
        info!("request active games of {}", category);

        let response = self
            .get(category)
            .query(&[
                ("select", RECORD_FIELDS),
                ("status", "eq.active"),
                ("order", "created_at.desc"),
            ])
            .send()
            .await?;

        Self::read_body(category, response).await
    }

    /// Request `/rest/v1/{table}?select=...&status=eq.active&title=ilike.%{keyword}%&limit={limit}`.
    ///
    /// No ordering is requested, rows come back in the backend's default order.
    async fn search_active_games(
        &self,
        category: GameCategory,
        keyword: &str,
        limit: usize,
    ) -> Result<Vec<ListingRow>, CatalogError> {
        info!("search {} for {:?}", category, keyword);

        let response = self
            .get(category)
            .query(&[
                ("select", LISTING_FIELDS.to_string()),
                ("status", "eq.active".to_string()),
                ("title", format!("ilike.%{}%", keyword)),
                ("limit", limit.to_string()),
            ])
            .send()
            .await?;

        Self::read_body(category, response).await
    }

    /// Request `/rest/v1/{table}?select=id,image_urls&id=eq.{game_id}` as a single object.
    ///
    /// The backend reports a missing row as an error, so not found surfaces as
    /// [`CatalogError::RemoteQuery`].
    async fn get_game_images(
        &self,
        category: GameCategory,
        game_id: &str,
    ) -> Result<GameImages, CatalogError> {
        info!("request images of {} in {}", game_id, category);

        let response = self
            .get(category)
            .header(header::ACCEPT, SINGLE_OBJECT)
            .query(&[
                ("select", IMAGES_FIELDS.to_string()),
                ("id", format!("eq.{}", game_id)),
            ])
            .send()
            .await?;

        Self::read_body(category, response).await
    }

    /// Request `/rest/v1/{table}?select=id&limit=1`.
    async fn ping_table(&self, category: GameCategory) -> Result<(), CatalogError> {
        debug!("ping {}", category);

        let response = self
            .get(category)
            .query(&[("select", "id"), ("limit", "1")])
            .send()
            .await?;

        Self::read_body::<serde_json::Value>(category, response)
            .await
            .map(|_| ())
    }
}
