//! Action dispatcher boundary.
//!
//! The pipeline resolves what to do (rendered location, description,
//! conflict strategy); dispatchers perform the side effect. No retry logic
//! lives here — a failure is surfaced to the caller with full addressing.

use async_trait::async_trait;
use tracing::info;

use crate::config::ConflictStrategy;
use crate::error::ActionError;
use crate::mail::Attachment;

/// Performs the side-effecting filing operation for one attachment.
#[async_trait]
pub trait ActionDispatcher: Send + Sync {
    /// Store `attachment` at `location` with the given description, applying
    /// `strategy` when the target already exists.
    async fn dispatch(
        &self,
        attachment: &Attachment,
        description: &str,
        location: &str,
        strategy: ConflictStrategy,
    ) -> Result<(), ActionError>;
}

/// Dry-run dispatcher: logs the resolved action and does nothing else.
#[derive(Debug, Default)]
pub struct LogDispatcher;

#[async_trait]
impl ActionDispatcher for LogDispatcher {
    async fn dispatch(
        &self,
        attachment: &Attachment,
        description: &str,
        location: &str,
        strategy: ConflictStrategy,
    ) -> Result<(), ActionError> {
        info!(
            attachment = %attachment.name,
            location = %location,
            strategy = strategy.label(),
            description = %description,
            "Dry run — would store attachment"
        );
        Ok(())
    }
}
