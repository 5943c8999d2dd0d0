//! Configuration for the SharedSpoon client

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

/// Endpoint configuration for the SharedSpoon client.
///
/// It's recommended to load these values from environment variables or a
/// secure config source rather than hard-coding them.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the SharedSpoon REST API
    pub api_url: Url,
    /// Base URL of the external identity provider
    pub identity_url: Url,
}

impl Config {
    /// Creates a new configuration, validating both URLs.
    pub fn new(api_url: &str, identity_url: &str) -> Result<Self> {
        let api_url = Url::parse(api_url)?;
        let identity_url = Url::parse(identity_url)?;
        if api_url.cannot_be_a_base() || identity_url.cannot_be_a_base() {
            return Err(Error::config("base URLs must be absolute http(s) URLs"));
        }
        Ok(Self {
            api_url,
            identity_url,
        })
    }

    /// Attempts to create configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let api_url = std::env::var("SHAREDSPOON_API_URL").map_err(|_| {
            Error::config("SHAREDSPOON_API_URL environment variable not found")
        })?;
        let identity_url = std::env::var("SHAREDSPOON_IDENTITY_URL").map_err(|_| {
            Error::config("SHAREDSPOON_IDENTITY_URL environment variable not found")
        })?;
        Self::new(&api_url, &identity_url)
    }
}

/// Behavioural options for the SharedSpoon client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// Quiet period the search debouncer waits for before settling a value
    pub debounce_window: Duration,

    /// Route the navigation gate redirects to when a protected view is
    /// reached without a session
    pub sign_in_path: String,

    /// Route signed-in users are sent to from public-only views
    pub home_path: String,

    /// Whether the bearer token is written to the token store after sign-in
    pub persist_session: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
            debounce_window: Duration::from_millis(300),
            sign_in_path: "/login".to_string(),
            home_path: "/".to_string(),
            persist_session: true,
        }
    }
}

impl ClientOptions {
    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the search debounce window
    pub fn with_debounce_window(mut self, value: Duration) -> Self {
        self.debounce_window = value;
        self
    }

    /// Set the sign-in route
    pub fn with_sign_in_path(mut self, value: &str) -> Self {
        self.sign_in_path = value.to_string();
        self
    }

    /// Set the home route
    pub fn with_home_path(mut self, value: &str) -> Self {
        self.home_path = value.to_string();
        self
    }

    /// Set whether to persist the session token
    pub fn with_persist_session(mut self, value: bool) -> Self {
        self.persist_session = value;
        self
    }
}
