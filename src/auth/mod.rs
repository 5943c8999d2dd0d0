//! Session and identity handling for the SharedSpoon client.
//!
//! Authentication itself is delegated to an external identity provider; the
//! platform API only ever sees the bearer token minted by its own
//! `generate-token` endpoint in exchange for a provider ID token.
//!
//! There is exactly one session per client. Views observe it through a
//! [`tokio::sync::watch`] stream obtained from [`Auth::subscribe`] instead of
//! re-subscribing to the provider independently, so every consumer sees the
//! same transition at the same time. The stream starts [`AuthState::Unresolved`]
//! and resolves on the first sign-in, restore, or sign-out.

pub mod store;

use std::sync::Arc;

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::watch;

use crate::config::{ClientOptions, Config};
use crate::error::{Error, Result};
use crate::fetch::Fetch;
use crate::models::CurrentUser;
use store::TokenStore;

/// The client's current view of "who is signed in, if anyone".
///
/// `Unresolved` means the answer is not known yet; it is distinct from
/// `SignedOut`, which is a determined absence.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AuthState {
    #[default]
    Unresolved,
    SignedIn(CurrentUser),
    SignedOut,
}

impl AuthState {
    /// Whether the initial determination has happened.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, AuthState::Unresolved)
    }

    /// The signed-in user, if any.
    pub fn user(&self) -> Option<&CurrentUser> {
        match self {
            AuthState::SignedIn(user) => Some(user),
            _ => None,
        }
    }
}

/// Third-party sign-in providers supported by the identity service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
    Github,
    Facebook,
}

impl OAuthProvider {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Github => "github",
            Self::Facebook => "facebook",
        }
    }
}

/// OAuth sign-in configuration
#[derive(Debug, Clone, Default)]
pub struct OAuthSignInOptions {
    pub redirect_to: Option<String>,
    pub scopes: Option<String>,
}

#[derive(Deserialize)]
struct SignInResponse {
    #[serde(rename = "idToken")]
    id_token: String,
    user: CurrentUser,
}

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

/// Auth client: sign-in/out against the identity provider, token exchange
/// with the platform API, and the hoisted session stream.
pub struct Auth {
    config: Config,
    http_client: Client,
    store: Arc<dyn TokenStore>,
    options: ClientOptions,
    state: watch::Sender<AuthState>,
}

impl Auth {
    /// Create a new Auth client.
    pub fn new(
        config: Config,
        http_client: Client,
        store: Arc<dyn TokenStore>,
        options: ClientOptions,
    ) -> Self {
        let (state, _) = watch::channel(AuthState::Unresolved);
        Self {
            config,
            http_client,
            store,
            options,
            state,
        }
    }

    /// Subscribe to session changes.
    ///
    /// The receiver yields the current state immediately and every transition
    /// afterwards. Dropping it is the unsubscribe; nothing keeps firing into
    /// a view that has been torn down.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// The signed-in user, if the session is resolved and present.
    pub fn current_user(&self) -> Option<CurrentUser> {
        self.state.borrow().user().cloned()
    }

    /// The stored bearer token, if any.
    pub async fn bearer_token(&self) -> Result<Option<String>> {
        self.store.load().await
    }

    /// Sign in with email and password.
    ///
    /// Runs the full flow: provider sign-in, ID-token exchange for a platform
    /// bearer token, token persistence, and publication of the new session.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<CurrentUser> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(Error::validation("email and password are required"));
        }

        let url = self.config.identity_url.join("v1/sign-in")?;
        let payload = serde_json::json!({
            "email": email,
            "password": password,
        });

        let response: SignInResponse = Fetch::post(&self.http_client, url.as_str())
            .json(&payload)?
            .execute()
            .await?;

        self.establish_session(&response.id_token, response.user)
            .await
    }

    /// Complete a third-party popup sign-in.
    ///
    /// The provider hands the application an ID token; this exchanges it for
    /// a platform bearer token and loads the profile it belongs to.
    pub async fn sign_in_with_id_token(&self, id_token: &str) -> Result<CurrentUser> {
        let token = self.exchange_id_token(id_token).await?;
        let user = self.fetch_profile(&token).await?;
        if self.options.persist_session {
            self.store.save(&token).await?;
        }
        tracing::info!(uid = %user.uid, "signed in via provider token");
        self.state.send_replace(AuthState::SignedIn(user.clone()));
        Ok(user)
    }

    /// Build the identity provider's authorize URL for an OAuth sign-in.
    pub fn oauth_sign_in_url(
        &self,
        provider: OAuthProvider,
        options: Option<OAuthSignInOptions>,
    ) -> String {
        let options = options.unwrap_or_default();
        let mut url = format!(
            "{}v1/authorize?provider={}",
            self.config.identity_url,
            provider.as_str()
        );

        if let Some(redirect_to) = options.redirect_to {
            url.push_str(&format!(
                "&redirect_to={}",
                urlencoding::encode(&redirect_to)
            ));
        }

        if let Some(scopes) = options.scopes {
            url.push_str(&format!("&scopes={}", urlencoding::encode(&scopes)));
        }

        url
    }

    /// Resolve the session from a previously persisted token.
    ///
    /// Called once at startup. No token resolves the stream to signed-out; a
    /// rejected token is cleared and also resolves to signed-out. Any other
    /// failure (network down, server error) leaves the stream unresolved so
    /// the caller can retry.
    pub async fn restore(&self) -> Result<AuthState> {
        let Some(token) = self.store.load().await? else {
            self.state.send_replace(AuthState::SignedOut);
            return Ok(AuthState::SignedOut);
        };

        match self.fetch_profile(&token).await {
            Ok(user) => {
                tracing::debug!(uid = %user.uid, "session restored from stored token");
                self.state.send_replace(AuthState::SignedIn(user.clone()));
                Ok(AuthState::SignedIn(user))
            }
            Err(err) if err.is_auth_rejection() => {
                tracing::debug!("stored token rejected; clearing");
                self.store.clear().await?;
                self.state.send_replace(AuthState::SignedOut);
                Ok(AuthState::SignedOut)
            }
            Err(err) => Err(err),
        }
    }

    /// Sign out.
    ///
    /// The provider call is best-effort; a failure there never blocks the
    /// local teardown of token and session.
    pub async fn sign_out(&self) -> Result<()> {
        match self.config.identity_url.join("v1/sign-out") {
            Ok(url) => {
                if let Err(err) = Fetch::post(&self.http_client, url.as_str())
                    .execute_unit()
                    .await
                {
                    tracing::warn!(error = %err, "identity sign-out failed; clearing local session anyway");
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "bad identity sign-out URL");
            }
        }

        self.store.clear().await?;
        self.state.send_replace(AuthState::SignedOut);
        Ok(())
    }

    /// React to a 401/403 from the platform API: the credential is invalid
    /// or expired, so drop it and resolve the session to signed-out. The
    /// navigation gate turns that transition into the sign-in redirect.
    pub(crate) async fn credential_rejected(&self) {
        if let Err(err) = self.store.clear().await {
            tracing::warn!(error = %err, "failed to clear rejected token");
        }
        self.state.send_replace(AuthState::SignedOut);
    }

    async fn establish_session(
        &self,
        id_token: &str,
        user: CurrentUser,
    ) -> Result<CurrentUser> {
        let token = match self.exchange_id_token(id_token).await {
            Ok(token) => token,
            Err(err) => {
                // Provider accepted the credentials but the platform refused
                // to mint a token; treat the whole sign-in as failed.
                tracing::warn!(error = %err, "token exchange failed");
                let _ = self.store.clear().await;
                self.state.send_replace(AuthState::SignedOut);
                return Err(err);
            }
        };

        if self.options.persist_session {
            self.store.save(&token).await?;
        }

        tracing::info!(uid = %user.uid, "signed in");
        self.state.send_replace(AuthState::SignedIn(user.clone()));
        Ok(user)
    }

    async fn exchange_id_token(&self, id_token: &str) -> Result<String> {
        let url = self.config.api_url.join("api/auth/generate-token")?;
        let payload = serde_json::json!({ "idToken": id_token });

        let response: TokenResponse = Fetch::post(&self.http_client, url.as_str())
            .json(&payload)?
            .execute()
            .await?;
        Ok(response.token)
    }

    async fn fetch_profile(&self, token: &str) -> Result<CurrentUser> {
        let url = self.config.api_url.join("api/auth/me")?;
        Fetch::get(&self.http_client, url.as_str())
            .bearer_auth(token)
            .execute()
            .await
    }

    // --- Test-only Helper ---
    pub async fn set_session_for_test(&self, user: Option<CurrentUser>, token: Option<&str>) {
        match token {
            Some(token) => {
                let _ = self.store.save(token).await;
            }
            None => {
                let _ = self.store.clear().await;
            }
        }
        match user {
            Some(user) => self.state.send_replace(AuthState::SignedIn(user)),
            None => self.state.send_replace(AuthState::SignedOut),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::MemoryTokenStore;

    fn auth() -> Auth {
        let config = Config::new("http://localhost:3000", "http://localhost:9099").unwrap();
        Auth::new(
            config,
            Client::new(),
            Arc::new(MemoryTokenStore::new()),
            ClientOptions::default(),
        )
    }

    #[test]
    fn oauth_sign_in_url_carries_provider_and_redirect() {
        let auth = auth();

        let url = auth.oauth_sign_in_url(OAuthProvider::Google, None);
        assert!(url.contains("provider=google"));

        let options = OAuthSignInOptions {
            redirect_to: Some("https://example.com/callback".to_string()),
            scopes: Some("email profile".to_string()),
        };
        let url = auth.oauth_sign_in_url(OAuthProvider::Github, Some(options));
        assert!(url.contains("provider=github"));
        assert!(url.contains("redirect_to=https%3A%2F%2Fexample.com%2Fcallback"));
        assert!(url.contains("scopes=email%20profile"));
    }

    #[tokio::test]
    async fn empty_credentials_fail_without_network() {
        let auth = auth();
        let err = auth.sign_in_with_password("", "pw").await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        // the stream stays unresolved; a rejected form is not a determination
        assert_eq!(*auth.subscribe().borrow(), AuthState::Unresolved);
    }

    #[tokio::test]
    async fn subscribers_share_one_session() {
        let auth = auth();
        let rx_a = auth.subscribe();
        let rx_b = auth.subscribe();

        let user = CurrentUser {
            uid: "uid-1".to_string(),
            email: "a@example.com".to_string(),
            display_name: None,
            photo_url: None,
        };
        auth.set_session_for_test(Some(user.clone()), Some("tok")).await;

        assert_eq!(rx_a.borrow().user(), Some(&user));
        assert_eq!(rx_b.borrow().user(), Some(&user));
        assert_eq!(auth.bearer_token().await.unwrap().as_deref(), Some("tok"));
    }

    #[tokio::test]
    async fn credential_rejection_clears_token_and_resolves_signed_out() {
        let auth = auth();
        auth.set_session_for_test(
            Some(CurrentUser {
                uid: "uid-1".to_string(),
                email: "a@example.com".to_string(),
                display_name: None,
                photo_url: None,
            }),
            Some("stale"),
        )
        .await;

        auth.credential_rejected().await;
        assert_eq!(auth.bearer_token().await.unwrap(), None);
        assert_eq!(*auth.subscribe().borrow(), AuthState::SignedOut);
    }
}
