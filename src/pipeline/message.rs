//! Message-level processing: fans each message rule out over the current
//! thread's messages and recurses into attachment processing.

use std::sync::Arc;

use tracing::{debug, error};

use crate::actions::ActionDispatcher;
use crate::config::{Rule, RuleSet};
use crate::error::WiringError;
use crate::pipeline::attachment::AttachmentProcessor;
use crate::pipeline::context::{MessageContext, ProcessingContext, ThreadContext};
use crate::pipeline::runner::{ItemFailure, RunReport};

/// Processes message rules against the messages of the current thread.
pub struct MessageProcessor<'a> {
    ctx: ProcessingContext<'a>,
    thread: ThreadContext<'a>,
    dispatcher: Arc<dyn ActionDispatcher>,
}

impl<'a> MessageProcessor<'a> {
    /// Fails immediately when the context carries no thread context — a
    /// wiring defect in the caller, surfaced here rather than as a missing
    /// value deep in the traversal.
    pub fn new(
        ctx: &ProcessingContext<'a>,
        dispatcher: Arc<dyn ActionDispatcher>,
    ) -> Result<Self, WiringError> {
        let thread = ctx.thread.ok_or(WiringError::MissingThreadContext)?;
        Ok(Self {
            ctx: *ctx,
            thread,
            dispatcher,
        })
    }

    /// Run every rule, in declared order, against the thread's messages.
    pub async fn process_rules(&self, rules: &'a [Rule], report: &mut RunReport) {
        for (rule_index, rule) in rules.iter().enumerate() {
            self.process_rule(rule, rule_index, report).await;
        }
    }

    /// Run one rule against every message of the current thread.
    pub async fn process_rule(&self, rule: &'a Rule, rule_index: usize, report: &mut RunReport) {
        for (index, message) in self.thread.thread.messages.iter().enumerate() {
            let message_ctx = MessageContext {
                message,
                rule,
                index,
                rule_index,
            };
            let ctx = self.ctx.with_message(message_ctx);

            let processor = match AttachmentProcessor::new(&ctx, Arc::clone(&self.dispatcher)) {
                Ok(processor) => processor,
                Err(error) => {
                    error!(
                        thread_id = %self.thread.thread.id,
                        message_index = index,
                        rule_index,
                        error = %error,
                        "Attachment processor wiring failed"
                    );
                    report.failures.push(ItemFailure {
                        thread_id: Some(self.thread.thread.id.clone()),
                        message_index: Some(index),
                        attachment_index: None,
                        rule_index: Some(rule_index),
                        error: error.into(),
                    });
                    continue;
                }
            };

            match &rule.handler {
                RuleSet::Rules(attachment_rules) => {
                    processor.process_rules(attachment_rules, report).await;
                }
                RuleSet::None => {
                    debug!(
                        message_id = %message.id,
                        "Message rule declares no attachment rules"
                    );
                }
            }
        }
    }
}
