//! The filing pipeline.
//!
//! Traversal is strictly sequential: declared rule order (outer loop)
//! crossed with host item order (inner loop), at each of three levels:
//!
//! 1. `ThreadProcessor` — threads of the current search batch
//! 2. `MessageProcessor` — messages of the current thread
//! 3. `AttachmentProcessor` — attachments of the current message, where the
//!    substitution map is built, templates are rendered and the action
//!    dispatcher is invoked
//!
//! Every (rule, item) pair is visited — there is no first-match
//! short-circuit, so one attachment may be acted on by several rules.

pub mod attachment;
pub mod context;
pub mod message;
pub mod pattern;
pub mod runner;
pub mod substitution;
pub mod thread;

pub use attachment::AttachmentProcessor;
pub use context::{AttachmentContext, MessageContext, ProcessingContext, ThreadContext};
pub use message::MessageProcessor;
pub use pattern::evaluate_pattern;
pub use runner::{ItemFailure, Pipeline, RunReport};
pub use substitution::{build_substitution_map, SubstitutionMap, Value};
pub use thread::ThreadProcessor;
