//! Per-user session: an optional bearer token.
//!
//! Two states, Anonymous (initial) and Authenticated. A successful login
//! stores the token; logout clears it. The token is never refreshed or
//! re-validated: an expired token simply makes later reads fail with the
//! backend's own error.

use crate::client::{TafsirClient, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    /// A fresh, anonymous session.
    pub fn new() -> Self {
        Self::default()
    }

    /// A session seeded with a token obtained elsewhere (e.g. `--token`).
    /// An empty string leaves the session anonymous.
    pub fn with_token(token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            token: (!token.is_empty()).then_some(token),
        }
    }

    /// Log in through `client`. Returns whether the session is now
    /// authenticated; on failure the session is left anonymous.
    pub fn login<T: Transport>(
        &mut self,
        client: &TafsirClient<T>,
        username: &str,
        password: &str,
    ) -> bool {
        match client.login(username, password) {
            Ok(token) => {
                tracing::info!(username, "login succeeded");
                self.token = Some(token);
                true
            }
            Err(e) => {
                tracing::info!(username, error = %e, "login failed");
                self.token = None;
                false
            }
        }
    }

    pub fn logout(&mut self) {
        if self.token.take().is_some() {
            tracing::info!("logged out");
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn current_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn state(&self) -> SessionState {
        if self.is_authenticated() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        }
    }
}
