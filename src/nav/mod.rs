//! Access-gated navigation.
//!
//! Decides, for a requested view, whether to render it, hold a transitional
//! placeholder, or redirect — and remembers the originally requested path so
//! sign-in can return the user there ("continuation" semantics).
//!
//! The gate is a small per-mount state machine: it starts `Resolving`, must
//! not issue navigation side effects until the session is determined (this
//! is what prevents redirect flicker at mount), and settles on `Authorized`
//! or `Unauthorized` with the first auth event. A later change on the auth
//! stream (external sign-out, sign-in elsewhere) re-enters the machine.

use tokio::sync::watch;

use crate::auth::AuthState;

/// Access class of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// Anyone may view; the gate never redirects.
    Public,
    /// Requires a session; anonymous visitors are sent to sign-in.
    Protected,
    /// Only for signed-out visitors (sign-in, register); signed-in users are
    /// sent home.
    PublicOnly,
}

/// Resolution state of the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Resolving,
    Authorized,
    Unauthorized,
}

/// What the view layer should do right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Render the requested view.
    Render,
    /// Render a non-interactive placeholder; no navigation permitted.
    Placeholder,
    /// Navigate to sign-in, remembering where the visitor wanted to go.
    RedirectToSignIn { from: String },
    /// Navigate to the home destination.
    RedirectHome,
}

/// Per-mount route gate.
#[derive(Debug)]
pub struct RouteGate {
    kind: RouteKind,
    requested_path: String,
    state: GateState,
    redirected: bool,
}

impl RouteGate {
    /// Mount the gate for a route. Starts unresolved.
    pub fn new(kind: RouteKind, requested_path: impl Into<String>) -> Self {
        Self {
            kind,
            requested_path: requested_path.into(),
            state: GateState::Resolving,
            redirected: false,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// Feed one auth event into the machine and get the decision.
    ///
    /// A redirect is issued at most once per entry into a state; asking
    /// again without a state change yields `Placeholder`.
    pub fn on_auth_event(&mut self, signed_in: bool) -> RouteDecision {
        let next = if signed_in {
            GateState::Authorized
        } else {
            GateState::Unauthorized
        };
        if next != self.state {
            // re-enter the machine: a fresh state may redirect again
            self.state = next;
            self.redirected = false;
        }
        self.decision()
    }

    /// The decision for the current state without consuming a redirect.
    /// While resolving this is always the placeholder.
    pub fn current(&self) -> RouteDecision {
        match (self.state, self.kind) {
            (GateState::Resolving, _) => RouteDecision::Placeholder,
            (GateState::Authorized, RouteKind::PublicOnly) => RouteDecision::RedirectHome,
            (GateState::Authorized, _) => RouteDecision::Render,
            (GateState::Unauthorized, RouteKind::Protected) => {
                RouteDecision::RedirectToSignIn {
                    from: self.requested_path.clone(),
                }
            }
            (GateState::Unauthorized, _) => RouteDecision::Render,
        }
    }

    fn decision(&mut self) -> RouteDecision {
        match self.current() {
            decision @ (RouteDecision::RedirectToSignIn { .. } | RouteDecision::RedirectHome) => {
                if self.redirected {
                    RouteDecision::Placeholder
                } else {
                    self.redirected = true;
                    decision
                }
            }
            decision => decision,
        }
    }

    /// Drive the gate from the session stream until it resolves.
    ///
    /// Consumes events from a receiver obtained via
    /// [`crate::auth::Auth::subscribe`]; dropping the receiver afterwards is
    /// the unsubscribe. Returns `Placeholder` if the stream closes before
    /// resolving (client torn down mid-mount).
    pub async fn resolve(
        &mut self,
        events: &mut watch::Receiver<AuthState>,
    ) -> RouteDecision {
        loop {
            let signed_in = {
                let state = events.borrow_and_update();
                if state.is_resolved() {
                    Some(state.user().is_some())
                } else {
                    None
                }
            };
            if let Some(signed_in) = signed_in {
                return self.on_auth_event(signed_in);
            }
            if events.changed().await.is_err() {
                return RouteDecision::Placeholder;
            }
        }
    }
}

/// Continuation path: the originally requested protected URL, preserved
/// across the sign-in round-trip. Consulted once, then discarded.
#[derive(Debug, Default)]
pub struct Continuation {
    path: Option<String>,
}

impl Continuation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember where the visitor was headed.
    pub fn remember(&mut self, path: impl Into<String>) {
        self.path = Some(path.into());
    }

    /// Take the destination for the post-sign-in redirect. Subsequent calls
    /// return `None`; the home destination is the usual fallback.
    pub fn take(&mut self) -> Option<String> {
        self.path.take()
    }
}

/// Build the sign-in URL carrying the continuation path.
pub fn sign_in_url(sign_in_path: &str, from: &str) -> String {
    format!("{}?from={}", sign_in_path, urlencoding::encode(from))
}

/// Recover the continuation path from a sign-in URL's query string.
pub fn continuation_from_url(url: &str) -> Option<String> {
    let query = url.split_once('?')?.1;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "from")
        .map(|(_, value)| value.into_owned())
}
