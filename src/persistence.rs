//! Persistence layer for the portal session
//!
//! The latest token/secret pair is cached on disk so a process restart does
//! not force a re-authentication. Loading and saving are best-effort; a
//! missing or unreadable cache only means the next cycle authenticates
//! from scratch.

use crate::error::Result;
use crate::logging::get_logger;
use crate::session::AuthSession;
use std::path::Path;

/// On-disk cache for the current [`AuthSession`]
pub struct SessionCache {
    file_path: String,
    logger: crate::logging::StructuredLogger,
}

impl SessionCache {
    /// Create a cache backed by the given file path
    pub fn new(file_path: &str) -> Self {
        let logger = get_logger("persistence");
        Self {
            file_path: file_path.to_string(),
            logger,
        }
    }

    /// Load the cached session from disk, if present
    pub fn load(&self) -> Result<Option<AuthSession>> {
        let path = Path::new(&self.file_path);

        if !path.exists() {
            self.logger.info("No cached session file found");
            return Ok(None);
        }

        let contents = std::fs::read_to_string(path)?;
        let session: AuthSession = serde_json::from_str(&contents)?;
        self.logger.info("Loaded cached session from disk");

        Ok(Some(session))
    }

    /// Save the session to disk
    pub fn save(&self, session: &AuthSession) -> Result<()> {
        let contents = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.file_path, contents)?;
        self.logger.debug("Saved session to disk");

        Ok(())
    }
}
