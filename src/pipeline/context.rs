//! Traversal contexts.
//!
//! Each context pairs one item with its position in its parent sequence and
//! the rule that matched it (plus the rule's position in its rule list).
//! Contexts are immutable `Copy` values built fresh per item and passed as
//! call parameters — index values never leak between iterations, and a
//! future parallel traversal only needs separate `ProcessingContext` values.

use chrono::FixedOffset;

use crate::config::{Config, Rule};
use crate::error::ConfigError;
use crate::mail::{Attachment, Message, Thread};

/// The current thread paired with its batch position and matched rule.
#[derive(Debug, Clone, Copy)]
pub struct ThreadContext<'a> {
    /// The thread being processed.
    pub thread: &'a Thread,
    /// The thread rule that matched it.
    pub rule: &'a Rule,
    /// Position of the thread within the search batch.
    pub index: usize,
    /// Position of the rule within the top-level rule list.
    pub rule_index: usize,
}

/// The current message paired with its thread position and matched rule.
#[derive(Debug, Clone, Copy)]
pub struct MessageContext<'a> {
    /// The message being processed.
    pub message: &'a Message,
    /// The message rule that matched it.
    pub rule: &'a Rule,
    /// Position of the message within its thread.
    pub index: usize,
    /// Position of the rule within the thread rule's `handler` list.
    pub rule_index: usize,
}

/// The current attachment paired with its message position and matched rule.
#[derive(Debug, Clone, Copy)]
pub struct AttachmentContext<'a> {
    /// The attachment being processed.
    pub attachment: &'a Attachment,
    /// The attachment rule being applied.
    pub rule: &'a Rule,
    /// Position of the attachment within its message.
    pub index: usize,
    /// Position of the rule within the message rule's `handler` list, or
    /// `None` when the rule comes from a different scope.
    pub rule_index: Option<usize>,
}

/// Shared traversal state threaded through the pipeline.
///
/// Built by the outer driver with the config and resolved timezone; the
/// thread and message slots are filled level by level via `with_thread` /
/// `with_message`, each returning a derived copy rather than mutating in
/// place.
#[derive(Debug, Clone, Copy)]
pub struct ProcessingContext<'a> {
    /// The validated configuration.
    pub config: &'a Config,
    /// UTC offset for date-valued placeholders.
    pub timezone: FixedOffset,
    /// The current thread context, once installed.
    pub thread: Option<ThreadContext<'a>>,
    /// The current message context, once installed.
    pub message: Option<MessageContext<'a>>,
}

impl<'a> ProcessingContext<'a> {
    /// Build the root context, resolving the configured timezone once.
    pub fn new(config: &'a Config) -> Result<Self, ConfigError> {
        Ok(Self {
            config,
            timezone: config.settings.timezone_offset()?,
            thread: None,
            message: None,
        })
    }

    /// A copy of this context with the thread slot installed.
    pub fn with_thread(mut self, thread: ThreadContext<'a>) -> Self {
        self.thread = Some(thread);
        self
    }

    /// A copy of this context with the message slot installed.
    pub fn with_message(mut self, message: MessageContext<'a>) -> Self {
        self.message = Some(message);
        self
    }
}
