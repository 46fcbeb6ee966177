//! mailfiler — rule-driven filing of mail attachments.
//!
//! Traverses threads → messages → attachments against a nested rule tree,
//! builds a substitution map per item, renders the rule's location and
//! description templates against it, and hands the result to an external
//! action dispatcher.

pub mod actions;
pub mod config;
pub mod error;
pub mod mail;
pub mod pipeline;
