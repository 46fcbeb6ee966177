//! Configuration model — validated rule tree consumed by the pipeline.
//!
//! Loading and schema validation happen outside this crate; by the time a
//! `Config` reaches the pipeline it is assumed well-formed. Rule lists keep
//! their declaration order — matching and indexing depend on it.

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Pipeline configuration: global settings plus the top-level rule list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Global settings.
    #[serde(default)]
    pub settings: Settings,
    /// Top-level (thread) rules, in declaration order.
    #[serde(default)]
    pub handler: RuleSet,
}

/// Global pipeline settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Maximum number of threads fetched per store search.
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: u32,
    /// UTC offset applied to date-valued placeholders, e.g. "+02:00".
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_max_batch_size() -> u32 {
    10
}

fn default_timezone() -> String {
    "+00:00".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_batch_size: default_max_batch_size(),
            timezone: default_timezone(),
        }
    }
}

impl Settings {
    /// Parse the configured timezone into a fixed UTC offset.
    pub fn timezone_offset(&self) -> Result<FixedOffset, ConfigError> {
        self.timezone
            .parse()
            .map_err(|_| ConfigError::InvalidTimezone {
                value: self.timezone.clone(),
            })
    }
}

/// A single filing rule.
///
/// `location` and `description` are template patterns evaluated against the
/// substitution map of the matched item. `handler` holds the rules for the
/// next traversal level down (thread rule → message rules → attachment
/// rules).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Optional human-readable name, exposed to templates as `rule.name`.
    #[serde(default)]
    pub name: Option<String>,
    /// Host search query. Only consulted on top-level rules by the runner.
    #[serde(default)]
    pub filter: Option<String>,
    /// Destination template, e.g. `"Invoices/${message.date:dateformat:yyyy}/${attachment.name}"`.
    pub location: String,
    /// Description template. Falls back to a built-in template when absent.
    #[serde(default)]
    pub description: Option<String>,
    /// Conflict handling when the target location is already occupied.
    #[serde(default)]
    pub conflict_strategy: Option<ConflictStrategy>,
    /// Rules for the next traversal level, in declaration order.
    #[serde(default)]
    pub handler: RuleSet,
}

/// A rule's nested rule list.
///
/// Absence is a distinct state, not an empty list — callers must decide what
/// "no rules" means at their level instead of relying on a default-to-empty
/// convention.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleSet {
    /// An ordered list of rules.
    Rules(Vec<Rule>),
    /// No nested rules declared.
    #[default]
    None,
}

impl RuleSet {
    /// The nested rules, empty for `None`.
    pub fn rules(&self) -> &[Rule] {
        match self {
            Self::Rules(rules) => rules,
            Self::None => &[],
        }
    }

    /// Whether no nested rule list was declared.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Position of `rule` within this list, by identity.
    ///
    /// `None` when the rule is not an element of this list (e.g. a rule list
    /// from a different scope), mirroring the unmatched case.
    pub fn index_of(&self, rule: &Rule) -> Option<usize> {
        self.rules().iter().position(|r| std::ptr::eq(r, rule))
    }
}

/// Policy applied when the target location already holds an item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictStrategy {
    /// Create the item regardless (duplicates allowed).
    #[default]
    Create,
    /// Leave the existing item untouched and skip this one.
    Skip,
    /// Replace the existing item.
    Overwrite,
    /// Store under a derived, non-conflicting name.
    Rename,
}

impl ConflictStrategy {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Skip => "skip",
            Self::Overwrite => "overwrite",
            Self::Rename => "rename",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_default_offset_is_utc() {
        let settings = Settings::default();
        let offset = settings.timezone_offset().unwrap();
        assert_eq!(offset.local_minus_utc(), 0);
    }

    #[test]
    fn settings_positive_offset_parses() {
        let settings = Settings {
            timezone: "+02:00".into(),
            ..Default::default()
        };
        assert_eq!(settings.timezone_offset().unwrap().local_minus_utc(), 7200);
    }

    #[test]
    fn settings_garbage_offset_fails() {
        let settings = Settings {
            timezone: "Mars/Olympus".into(),
            ..Default::default()
        };
        assert!(settings.timezone_offset().is_err());
    }

    #[test]
    fn rule_set_none_vs_empty() {
        assert!(RuleSet::None.is_none());
        assert!(!RuleSet::Rules(vec![]).is_none());
        assert!(RuleSet::Rules(vec![]).rules().is_empty());
    }

    #[test]
    fn rule_set_index_of_is_identity_based() {
        let rules = RuleSet::Rules(vec![
            make_rule("a"),
            make_rule("b"),
        ]);
        let second = &rules.rules()[1];
        assert_eq!(rules.index_of(second), Some(1));

        // An equal but distinct rule is not an element of the list.
        let stranger = make_rule("b");
        assert_eq!(rules.index_of(&stranger), None);
    }

    #[test]
    fn conflict_strategy_defaults_to_create() {
        assert_eq!(ConflictStrategy::default(), ConflictStrategy::Create);
        assert_eq!(ConflictStrategy::Rename.label(), "rename");
    }

    #[test]
    fn config_deserializes_nested_handler() {
        let json = r#"{
            "settings": { "max_batch_size": 5, "timezone": "+01:00" },
            "handler": [
                {
                    "filter": "has:attachment",
                    "location": "Inbox",
                    "handler": [
                        {
                            "location": "Invoices/${attachment.name}",
                            "conflict_strategy": "rename",
                            "handler": [
                                { "location": "Invoices/${attachment.name}" }
                            ]
                        }
                    ]
                }
            ]
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.settings.max_batch_size, 5);

        let thread_rules = config.handler.rules();
        assert_eq!(thread_rules.len(), 1);
        let message_rules = thread_rules[0].handler.rules();
        assert_eq!(message_rules.len(), 1);
        assert_eq!(
            message_rules[0].conflict_strategy,
            Some(ConflictStrategy::Rename)
        );
        let attachment_rules = message_rules[0].handler.rules();
        assert_eq!(attachment_rules.len(), 1);
        assert!(attachment_rules[0].handler.is_none());
    }

    #[test]
    fn config_missing_handler_is_none_not_empty() {
        let config: Config = serde_json::from_str(r#"{ "settings": {} }"#).unwrap();
        assert!(config.handler.is_none());
    }

    fn make_rule(name: &str) -> Rule {
        Rule {
            name: Some(name.into()),
            filter: None,
            location: "somewhere".into(),
            description: None,
            conflict_strategy: None,
            handler: RuleSet::None,
        }
    }
}
