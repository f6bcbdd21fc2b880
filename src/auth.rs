// src/auth.rs
use crate::error::{ClientError, ClientResult};
use crate::types::response::TokenResponse;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Bearer credential plus the minimal identity shown to the user.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl Session {
    pub fn new(access_token: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            email: email.into(),
            first_name: None,
            last_name: None,
        }
    }

    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.to_string(),
            (None, Some(last)) => last.to_string(),
            (None, None) => self.email.clone(),
        }
    }

    pub fn bearer(&self) -> &str {
        &self.access_token
    }
}

impl From<TokenResponse> for Session {
    fn from(token: TokenResponse) -> Self {
        Self {
            access_token: token.access_token,
            email: token.email,
            first_name: token.first_name,
            last_name: token.last_name,
        }
    }
}

// The token never goes to logs
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish_non_exhaustive()
    }
}

/// Shared handle on the current session.
///
/// Owned by the application root; services get a clone and read the session per operation.
#[derive(Clone)]
pub struct SessionContext {
    tx: Arc<watch::Sender<Option<Session>>>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionContext {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    pub fn establish(&self, session: Session) {
        info!("Session established for {}", session.email);
        self.tx.send_replace(Some(session));
    }

    /// End the session. Returns false if there was none.
    pub fn end(&self) -> bool {
        let previous = self.tx.send_replace(None);
        if let Some(session) = &previous {
            info!("Session ended for {}", session.email);
        }
        previous.is_some()
    }

    pub fn current(&self) -> Option<Session> {
        self.tx.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// The current session, or `AuthRequired`.
    pub fn require(&self) -> ClientResult<Session> {
        self.current().ok_or(ClientError::AuthRequired)
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.tx.subscribe()
    }

    /// End the session when the backend rejected `token`.
    ///
    /// Only the session that owns `token` is ended; a 401 for a credential that has
    /// since been replaced leaves the newer session alone. Returns true if a session ended.
    pub fn reject(&self, err: &ClientError, token: &str) -> bool {
        if !err.requires_login() {
            return false;
        }

        let mut ended = None;
        self.tx.send_if_modified(|current| {
            if current.as_ref().is_some_and(|s| s.bearer() == token) {
                ended = current.take();
                true
            } else {
                false
            }
        });

        match ended {
            Some(session) => {
                warn!(
                    "Backend rejected the credential for {}, signed out",
                    session.email
                );
                true
            }
            None => {
                debug!("Ignoring rejection of a credential that is no longer current");
                false
            }
        }
    }
}
