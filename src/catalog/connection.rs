//! Shared, replaceable connection to the catalog backend.
//!
//! The [`Connection`] owns the [`SupabaseRequester`] used by every catalog
//! operation. The requester is built lazily from the configured credentials on
//! first use and can be swapped at any time with [`Connection::reconfigure`].

use std::sync::Arc;

use log::{debug, info};
use tokio::sync::RwLock;

use crate::catalog::CatalogError;
use crate::catalog::requester::{Requester, SupabaseRequester};
use crate::catalog::response_structs::ListingRow;
use crate::catalog::structs::{GameCategory, GameImages, GameRecord};

/// Lazily built handle to the backend, safe to share between tasks.
///
/// Requests already holding the previous handle finish on it after a
/// reconfiguration; there is no ordering guarantee between a reconfiguration
/// and requests issued concurrently with it.
pub struct Connection {
    /// Endpoint used to build the first handle
    endpoint: String,
    /// Access key used to build the first handle
    anon_key: String,
    /// Current handle, `None` until first use
    handle: RwLock<Option<Arc<SupabaseRequester>>>,
}

impl Connection {
    /// Create a new [Connection]. No handle is built until it is first needed.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - The base URL of the Supabase project.
    /// * `anon_key` - The access key of the project.
    pub fn new(endpoint: &str, anon_key: &str) -> Self {
        Connection {
            endpoint: endpoint.to_string(),
            anon_key: anon_key.to_string(),
            handle: RwLock::new(None),
        }
    }

    /// Returns the current handle, building it from the configured
    /// credentials on first call.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidEndpoint`] if the configured endpoint is
    /// malformed. Nothing is cached in that case, the next call tries again.
    pub async fn handle(&self) -> Result<Arc<SupabaseRequester>, CatalogError> {
        if let Some(handle) = self.handle.read().await.as_ref() {
            return Ok(Arc::clone(handle));
        }

        let mut guard = self.handle.write().await;
        // Another task may have built it while we waited for the write lock
        if let Some(handle) = guard.as_ref() {
            return Ok(Arc::clone(handle));
        }

        debug!("build connection handle for {}", self.endpoint);
        let handle = Arc::new(SupabaseRequester::new(&self.endpoint, &self.anon_key)?);
        *guard = Some(Arc::clone(&handle));

        Ok(handle)
    }

    /// Replaces the handle with one built from `endpoint` and `anon_key`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidEndpoint`] if `endpoint` is malformed,
    /// in which case the current handle is kept.
    pub async fn reconfigure(&self, endpoint: &str, anon_key: &str) -> Result<(), CatalogError> {
        let handle = Arc::new(SupabaseRequester::new(endpoint, anon_key)?);
        *self.handle.write().await = Some(handle);

        info!("connection reconfigured to {}", endpoint);

        Ok(())
    }
}

impl Requester for Connection {
    async fn get_active_games(
        &self,
        category: GameCategory,
    ) -> Result<Vec<GameRecord>, CatalogError> {
        self.handle().await?.get_active_games(category).await
    }

    async fn search_active_games(
        &self,
        category: GameCategory,
        keyword: &str,
        limit: usize,
    ) -> Result<Vec<ListingRow>, CatalogError> {
        self.handle()
            .await?
            .search_active_games(category, keyword, limit)
            .await
    }

    async fn get_game_images(
        &self,
        category: GameCategory,
        game_id: &str,
    ) -> Result<GameImages, CatalogError> {
        self.handle()
            .await?
            .get_game_images(category, game_id)
            .await
    }

    async fn ping_table(&self, category: GameCategory) -> Result<(), CatalogError> {
        self.handle().await?.ping_table(category).await
    }
}
