//! The outer driver: one store search per top-level rule, then the
//! thread → message → attachment traversal over each batch.
//!
//! Failures on individual items are logged with full addressing and
//! collected into the run report — they never abort the batch.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::actions::ActionDispatcher;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::mail::MailStore;
use crate::pipeline::context::ProcessingContext;
use crate::pipeline::thread::ThreadProcessor;

/// Outcome of one filing run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Number of successfully dispatched actions.
    pub dispatched: usize,
    /// Per-item failures, each addressed precisely enough to retry by hand.
    pub failures: Vec<ItemFailure>,
}

impl RunReport {
    /// Whether the run completed without any item failures.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// One failed item, addressed by thread id, message index, attachment index
/// and rule index — whichever apply at the level the failure occurred.
#[derive(Debug)]
pub struct ItemFailure {
    pub thread_id: Option<String>,
    pub message_index: Option<usize>,
    pub attachment_index: Option<usize>,
    pub rule_index: Option<usize>,
    pub error: Error,
}

/// The filing pipeline: config plus the two I/O collaborators.
pub struct Pipeline {
    config: Config,
    store: Arc<dyn MailStore>,
    dispatcher: Arc<dyn ActionDispatcher>,
}

impl Pipeline {
    /// Create a pipeline over an already-validated config.
    pub fn new(
        config: Config,
        store: Arc<dyn MailStore>,
        dispatcher: Arc<dyn ActionDispatcher>,
    ) -> Self {
        Self {
            config,
            store,
            dispatcher,
        }
    }

    /// Run every top-level rule: one bounded store search per rule, then the
    /// full traversal over the returned batch.
    pub async fn run(&self) -> Result<RunReport> {
        let ctx = ProcessingContext::new(&self.config)?;
        let mut report = RunReport::default();

        let rules = self.config.handler.rules();
        info!(rules = rules.len(), "Starting filing run");

        for (rule_index, rule) in rules.iter().enumerate() {
            let Some(query) = rule.filter.as_deref() else {
                warn!(rule_index, "Top-level rule has no filter — skipping");
                continue;
            };

            let threads = match self
                .store
                .search(query, self.config.settings.max_batch_size)
                .await
            {
                Ok(threads) => threads,
                Err(error) => {
                    error!(rule_index, query, error = %error, "Store search failed");
                    report.failures.push(ItemFailure {
                        thread_id: None,
                        message_index: None,
                        attachment_index: None,
                        rule_index: Some(rule_index),
                        error: error.into(),
                    });
                    continue;
                }
            };
            debug!(rule_index, threads = threads.len(), "Search returned batch");

            let processor = ThreadProcessor::new(ctx, &threads, Arc::clone(&self.dispatcher));
            processor.process_rule(rule, rule_index, &mut report).await;
        }

        info!(
            dispatched = report.dispatched,
            failures = report.failures.len(),
            "Filing run complete"
        );
        Ok(report)
    }
}
