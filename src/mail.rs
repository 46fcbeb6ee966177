//! Host mail objects and the store boundary.
//!
//! These are read-only snapshots of host data. The pipeline never mutates
//! them; it only reads ordered sequences and scalar fields while building
//! substitution maps.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// A mail thread: the top-level container, owning its messages in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    /// Host thread id.
    pub id: String,
    /// Permanent link to the thread in the host UI.
    pub permalink: String,
    /// Messages in thread order.
    pub messages: Vec<Message>,
}

/// A message within a thread, owning its attachments in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Host message id.
    pub id: String,
    /// Subject line.
    pub subject: String,
    /// Sender address.
    pub from: String,
    /// When the message was sent.
    pub date: DateTime<Utc>,
    /// Attachments in declaration order.
    pub attachments: Vec<Attachment>,
}

/// An attachment on a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    /// Filename.
    pub name: String,
    /// MIME content type, e.g. `"application/pdf"`.
    pub content_type: String,
    /// Size in bytes.
    pub size: u64,
    /// Raw content bytes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<u8>,
}

/// Mail store boundary — pure I/O, no filing logic.
///
/// The pipeline never constructs queries itself; rule `filter` strings are
/// passed through verbatim.
#[async_trait]
pub trait MailStore: Send + Sync {
    /// Search for threads matching `query`, returning at most `max_results`.
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<Thread>, StoreError>;
}
