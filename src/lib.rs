//! SharedSpoon Rust Client Library
//!
//! A Rust client for the SharedSpoon community food-sharing platform,
//! providing the application core behind its views: session and identity
//! handling, access-gated navigation, a typed data-access layer over the
//! platform REST API, and the listing query pipeline with debounced search.
//!
//! Authentication is delegated to an external identity provider and
//! persistence to the platform's REST API; this crate holds no authoritative
//! state beyond one opaque bearer token.

pub mod auth;
pub mod config;
pub mod debounce;
pub mod error;
pub mod fetch;
pub mod listings;
pub mod models;
pub mod nav;

use std::sync::Arc;

use reqwest::Client;
use tokio::sync::mpsc;

use crate::auth::store::{MemoryTokenStore, TokenStore};
use crate::auth::Auth;
use crate::config::{ClientOptions, Config};
use crate::debounce::Debouncer;
use crate::error::Result;
use crate::listings::ListingsClient;
use crate::nav::{RouteGate, RouteKind};

/// The main entry point for the SharedSpoon client
pub struct SharedSpoon {
    /// Endpoint configuration
    pub config: Config,
    /// HTTP client used for requests
    pub http_client: Client,
    /// Client options
    pub options: ClientOptions,
    auth: Arc<Auth>,
}

impl SharedSpoon {
    /// Create a new client with default options and an in-memory token
    /// store.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sharedspoon::SharedSpoon;
    ///
    /// let client = SharedSpoon::new(
    ///     "https://api.sharedspoon.example",
    ///     "https://id.sharedspoon.example",
    /// ).unwrap();
    /// ```
    pub fn new(api_url: &str, identity_url: &str) -> Result<Self> {
        let config = Config::new(api_url, identity_url)?;
        Self::with_config(
            config,
            ClientOptions::default(),
            Arc::new(MemoryTokenStore::new()),
        )
    }

    /// Create a new client with custom options and token store.
    pub fn with_config(
        config: Config,
        options: ClientOptions,
        store: Arc<dyn TokenStore>,
    ) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        let auth = Arc::new(Auth::new(
            config.clone(),
            http_client.clone(),
            store,
            options.clone(),
        ));

        Ok(Self {
            config,
            http_client,
            options,
            auth,
        })
    }

    /// Create a client from the `SHAREDSPOON_API_URL` and
    /// `SHAREDSPOON_IDENTITY_URL` environment variables.
    pub fn from_env() -> Result<Self> {
        let config = Config::from_env()?;
        Self::with_config(
            config,
            ClientOptions::default(),
            Arc::new(MemoryTokenStore::new()),
        )
    }

    /// The auth client: sign-in/out and the shared session stream.
    pub fn auth(&self) -> &Arc<Auth> {
        &self.auth
    }

    /// A data-access client for listings and pickup requests.
    pub fn listings(&self) -> ListingsClient {
        ListingsClient::new(
            self.config.clone(),
            self.http_client.clone(),
            Arc::clone(&self.auth),
        )
    }

    /// Mount a navigation gate for a route.
    pub fn gate(&self, kind: RouteKind, requested_path: &str) -> RouteGate {
        RouteGate::new(kind, requested_path)
    }

    /// Spawn a search debouncer using the configured quiet window.
    pub fn search_debouncer(&self) -> (Debouncer, mpsc::UnboundedReceiver<String>) {
        Debouncer::new(self.options.debounce_window)
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::auth::{Auth, AuthState};
    pub use crate::config::ClientOptions;
    pub use crate::error::Error;
    pub use crate::listings::query::{QueryConfig, SortKey};
    pub use crate::listings::{ListingsClient, LoadState, SubmitGuard};
    pub use crate::models::{FoodListing, FoodRequest, ListingStatus, NewListing};
    pub use crate::nav::{RouteDecision, RouteGate, RouteKind};
    pub use crate::SharedSpoon;
}
