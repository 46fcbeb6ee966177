//! Attachment-level processing — the bottom of the traversal, where the
//! substitution map is built, templates are rendered and the action
//! dispatcher is invoked.
//!
//! Every rule is applied to every attachment of the current message; the
//! decision of which rules are meant for this message was already made by
//! the caller, and this component trusts it.

use std::sync::Arc;

use chrono::FixedOffset;
use tracing::{debug, warn};

use crate::actions::ActionDispatcher;
use crate::config::Rule;
use crate::error::{Error, WiringError};
use crate::pipeline::context::{
    AttachmentContext, MessageContext, ProcessingContext, ThreadContext,
};
use crate::pipeline::pattern::evaluate_pattern;
use crate::pipeline::runner::{ItemFailure, RunReport};
use crate::pipeline::substitution::build_substitution_map;

/// Description template used when a rule declares none.
const DEFAULT_DESCRIPTION: &str = "Mail title: ${message.subject}\n\
    Mail date: ${message.date:dateformat:yyyy-mm-dd HH:MM:ss}\n\
    Mail link: ${thread.permalink}";

/// Processes attachment rules against the attachments of the current message.
pub struct AttachmentProcessor<'a> {
    timezone: FixedOffset,
    thread: ThreadContext<'a>,
    message: MessageContext<'a>,
    dispatcher: Arc<dyn ActionDispatcher>,
}

impl std::fmt::Debug for AttachmentProcessor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttachmentProcessor")
            .field("timezone", &self.timezone)
            .field("thread", &self.thread)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

impl<'a> AttachmentProcessor<'a> {
    /// Fails immediately when the context lacks a thread or message context.
    /// Both must be installed before any attachment is touched.
    pub fn new(
        ctx: &ProcessingContext<'a>,
        dispatcher: Arc<dyn ActionDispatcher>,
    ) -> Result<Self, WiringError> {
        let thread = ctx.thread.ok_or(WiringError::MissingThreadContext)?;
        let message = ctx.message.ok_or(WiringError::MissingMessageContext)?;
        Ok(Self {
            timezone: ctx.timezone,
            thread,
            message,
            dispatcher,
        })
    }

    /// Run every rule, in the order given, unconditionally — no
    /// first-match short-circuit.
    pub async fn process_rules(&self, rules: &'a [Rule], report: &mut RunReport) {
        for rule in rules {
            self.process_rule(rule, report).await;
        }
    }

    /// Run one rule against every attachment of the current message.
    ///
    /// The rule's index is resolved against the message rule's `handler`
    /// list; a rule from a different scope resolves to `None`. A failure on
    /// one attachment is logged and recorded, and the iteration continues.
    pub async fn process_rule(&self, rule: &'a Rule, report: &mut RunReport) {
        let rule_index = self.message.rule.handler.index_of(rule);

        for (index, attachment) in self.message.message.attachments.iter().enumerate() {
            let attachment_ctx = AttachmentContext {
                attachment,
                rule,
                index,
                rule_index,
            };

            match self.process_attachment(&attachment_ctx).await {
                Ok(()) => report.dispatched += 1,
                Err(error) => {
                    warn!(
                        thread_id = %self.thread.thread.id,
                        message_index = self.message.index,
                        attachment_index = index,
                        rule_index = ?rule_index,
                        error = %error,
                        "Attachment processing failed — continuing with next item"
                    );
                    report.failures.push(ItemFailure {
                        thread_id: Some(self.thread.thread.id.clone()),
                        message_index: Some(self.message.index),
                        attachment_index: Some(index),
                        rule_index,
                        error,
                    });
                }
            }
        }
    }

    /// The substitution + action step for one attachment.
    async fn process_attachment(&self, ctx: &AttachmentContext<'a>) -> Result<(), Error> {
        let map = build_substitution_map(
            self.thread.thread,
            self.message.index,
            Some(ctx.index),
            self.message.rule,
            ctx.rule_index,
        )?;

        // Diagnostic dump, kept separate from the action step below so the
        // two can be toggled independently.
        debug!(
            thread_id = %self.thread.thread.id,
            message_index = self.message.index,
            attachment_index = ctx.index,
            map = ?map,
            "Built substitution map"
        );

        let location = evaluate_pattern(&ctx.rule.location, &map, &self.timezone)?;
        let description = evaluate_pattern(
            ctx.rule.description.as_deref().unwrap_or(DEFAULT_DESCRIPTION),
            &map,
            &self.timezone,
        )?;
        let strategy = ctx.rule.conflict_strategy.unwrap_or_default();

        self.dispatcher
            .dispatch(ctx.attachment, &description, &location, strategy)
            .await?;
        Ok(())
    }
}
