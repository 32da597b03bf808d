//! Application state for the HTTP server.

use std::sync::Arc;

use crate::auth::{AdminCredentials, SessionSigner};
use crate::config::{AppConfig, ConfigError};
use crate::db::repository::FullRepository;
use crate::models::{BusinessDayClock, SlotLabels};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for storage operations
    pub repository: Arc<dyn FullRepository>,
    /// Issues and verifies admin session tokens
    pub sessions: SessionSigner,
    pub credentials: AdminCredentials,
    /// Resolves the default date of the daily record
    pub clock: BusinessDayClock,
    pub slot_labels: SlotLabels,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn FullRepository>,
        sessions: SessionSigner,
        credentials: AdminCredentials,
        clock: BusinessDayClock,
    ) -> Self {
        Self {
            repository,
            sessions,
            credentials,
            clock,
            slot_labels: SlotLabels::default(),
        }
    }

    /// Build the state from validated configuration.
    pub fn from_config(
        repository: Arc<dyn FullRepository>,
        config: &AppConfig,
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(
            repository,
            config.signer(),
            config.credentials(),
            config.clock()?,
        ))
    }
}
