//! Substitution map construction.
//!
//! The map is an open record: dotted string keys (`thread.x`, `message.x`,
//! `attachment.x`) to typed values, built fresh per (message, attachment,
//! rule) triple and immutable once built. Keeping the key space open means
//! hosts can extend the template vocabulary without breaking changes.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};

use crate::config::Rule;
use crate::error::IndexError;
use crate::mail::Thread;

/// A typed substitution value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Plain text, rendered verbatim.
    Text(String),
    /// An integer, rendered in decimal.
    Number(i64),
    /// A timestamp. Rendered as RFC 3339 unless a `dateformat` modifier
    /// reshapes it.
    Date(DateTime<Utc>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Date(dt) => write!(f, "{}", dt.to_rfc3339()),
        }
    }
}

/// Flat mapping from dotted keys to typed values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubstitutionMap {
    entries: HashMap<String, Value>,
}

impl SubstitutionMap {
    /// Insert a value under a dotted key.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    /// Look up a key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Whether the key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the substitution map for one item.
///
/// `attachment_index` is `None` when operating at message level; attachment
/// keys are then omitted entirely, so a template reaching for them fails
/// loudly at evaluation instead of rendering something the user never
/// intended. `attachment_rule_index` is `None` when the applied rule is not
/// an element of the message rule's `handler` list.
///
/// Fails when `message_index` or `attachment_index` is out of bounds. Reads
/// thread data only; no side effects.
pub fn build_substitution_map(
    thread: &Thread,
    message_index: usize,
    attachment_index: Option<usize>,
    message_rule: &Rule,
    attachment_rule_index: Option<usize>,
) -> Result<SubstitutionMap, IndexError> {
    let message =
        thread
            .messages
            .get(message_index)
            .ok_or_else(|| IndexError::MessageOutOfBounds {
                thread_id: thread.id.clone(),
                index: message_index,
                len: thread.messages.len(),
            })?;

    let mut map = SubstitutionMap::default();

    map.insert("thread.id", Value::Text(thread.id.clone()));
    map.insert("thread.permalink", Value::Text(thread.permalink.clone()));
    if let Some(first) = thread.messages.first() {
        map.insert(
            "thread.firstMessageSubject",
            Value::Text(first.subject.clone()),
        );
    }

    map.insert("message.id", Value::Text(message.id.clone()));
    map.insert("message.subject", Value::Text(message.subject.clone()));
    map.insert("message.from", Value::Text(message.from.clone()));
    map.insert("message.date", Value::Date(message.date));
    map.insert("message.index", Value::Number(message_index as i64));

    if let Some(name) = &message_rule.name {
        map.insert("rule.name", Value::Text(name.clone()));
    }

    if let Some(att_index) = attachment_index {
        let attachment =
            message
                .attachments
                .get(att_index)
                .ok_or_else(|| IndexError::AttachmentOutOfBounds {
                    message_id: message.id.clone(),
                    index: att_index,
                    len: message.attachments.len(),
                })?;

        map.insert("attachment.name", Value::Text(attachment.name.clone()));
        map.insert(
            "attachment.contentType",
            Value::Text(attachment.content_type.clone()),
        );
        map.insert("attachment.size", Value::Number(attachment.size as i64));
        map.insert("attachment.index", Value::Number(att_index as i64));
        if let Some(rule_index) = attachment_rule_index {
            map.insert("attachment.ruleIndex", Value::Number(rule_index as i64));
        }
    }

    Ok(map)
}
