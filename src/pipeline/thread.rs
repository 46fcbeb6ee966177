//! Thread-level processing: fans each thread rule out over the current
//! search batch and recurses into message processing.

use std::sync::Arc;

use tracing::{debug, error};

use crate::actions::ActionDispatcher;
use crate::config::{Rule, RuleSet};
use crate::mail::Thread;
use crate::pipeline::context::{ProcessingContext, ThreadContext};
use crate::pipeline::message::MessageProcessor;
use crate::pipeline::runner::{ItemFailure, RunReport};

/// Processes thread rules against a batch of threads.
pub struct ThreadProcessor<'a> {
    ctx: ProcessingContext<'a>,
    threads: &'a [Thread],
    dispatcher: Arc<dyn ActionDispatcher>,
}

impl<'a> ThreadProcessor<'a> {
    /// Create a processor over a search batch. No contexts are required yet;
    /// this is the top of the traversal.
    pub fn new(
        ctx: ProcessingContext<'a>,
        threads: &'a [Thread],
        dispatcher: Arc<dyn ActionDispatcher>,
    ) -> Self {
        Self {
            ctx,
            threads,
            dispatcher,
        }
    }

    /// Run every rule, in declared order, against the whole batch.
    pub async fn process_rules(&self, rules: &'a [Rule], report: &mut RunReport) {
        for (rule_index, rule) in rules.iter().enumerate() {
            self.process_rule(rule, rule_index, report).await;
        }
    }

    /// Run one rule against every thread in the batch.
    pub async fn process_rule(&self, rule: &'a Rule, rule_index: usize, report: &mut RunReport) {
        for (index, thread) in self.threads.iter().enumerate() {
            let thread_ctx = ThreadContext {
                thread,
                rule,
                index,
                rule_index,
            };
            let ctx = self.ctx.with_thread(thread_ctx);

            let processor = match MessageProcessor::new(&ctx, Arc::clone(&self.dispatcher)) {
                Ok(processor) => processor,
                Err(error) => {
                    error!(
                        thread_id = %thread.id,
                        rule_index,
                        error = %error,
                        "Message processor wiring failed"
                    );
                    report.failures.push(ItemFailure {
                        thread_id: Some(thread.id.clone()),
                        message_index: None,
                        attachment_index: None,
                        rule_index: Some(rule_index),
                        error: error.into(),
                    });
                    continue;
                }
            };

            match &rule.handler {
                RuleSet::Rules(message_rules) => {
                    processor.process_rules(message_rules, report).await;
                }
                RuleSet::None => {
                    debug!(thread_id = %thread.id, "Thread rule declares no message rules");
                }
            }
        }
    }
}
