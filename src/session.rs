//! Portal session management for Heliotrope
//!
//! This module holds the token/secret pair obtained from authentication and
//! the staleness policy that decides when a proactive re-authentication is
//! due. The stored session is replaced wholesale on every successful
//! authentication and left untouched on failure, so in-flight readers never
//! observe a half-updated pair.

use crate::api::PortalApi;
use crate::config::CredentialsConfig;
use crate::error::Result;
use crate::logging::get_logger;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Token/secret pair issued by the portal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    /// Session token, sent as a query parameter on every data call
    pub token: String,

    /// Session secret, part of the signed material only
    pub secret: String,

    /// When this session was issued
    pub issued_at: DateTime<Utc>,
}

impl AuthSession {
    /// Create a session issued now
    pub fn new(token: String, secret: String) -> Self {
        Self {
            token,
            secret,
            issued_at: Utc::now(),
        }
    }
}

/// Holder of the current portal session
pub struct SessionStore {
    /// Current session, if any. Only the refresh engine mutates this.
    session: Option<AuthSession>,

    /// Maximum session age before a proactive re-authentication
    max_age: Duration,

    /// Logger
    logger: crate::logging::StructuredLogger,
}

impl SessionStore {
    /// Create a new store with the given maximum session age
    pub fn new(max_age: Duration) -> Self {
        let logger = get_logger("session");
        Self {
            session: None,
            max_age,
            logger,
        }
    }

    /// Current session, if one is installed
    pub fn current(&self) -> Option<&AuthSession> {
        self.session.as_ref()
    }

    /// Install a session obtained elsewhere (config seed or cache)
    pub fn install(&mut self, session: AuthSession) {
        self.session = Some(session);
    }

    /// Whether a re-authentication is due. An absent session counts as stale.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        match &self.session {
            Some(session) => now - session.issued_at >= self.max_age,
            None => true,
        }
    }

    /// Authenticate against the portal and replace the stored session.
    ///
    /// The swap happens only on success; on failure the previous session is
    /// left intact and the error is propagated to the caller.
    pub async fn reauthenticate(
        &mut self,
        api: &dyn PortalApi,
        credentials: &CredentialsConfig,
    ) -> Result<&AuthSession> {
        let session = api.authenticate(credentials).await?;
        self.logger.info("Portal authentication succeeded, session replaced");
        Ok(self.session.insert(session))
    }
}
