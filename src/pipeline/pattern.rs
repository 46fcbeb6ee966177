//! Template pattern evaluation.
//!
//! Patterns contain zero or more placeholders of the form `${key}` or
//! `${key:dateformat:FORMAT}`; plain text outside placeholders is copied
//! verbatim. A key the map does not hold is a hard error — silently
//! rendering it empty (or as the literal placeholder) would produce a path
//! or description the user never intended.

use std::sync::LazyLock;

use chrono::TimeZone;
use regex::Regex;

use crate::error::PatternError;
use crate::pipeline::substitution::{SubstitutionMap, Value};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}]*)\}").unwrap()
});

/// Separates the key from an optional date format inside a placeholder.
const DATEFORMAT_MODIFIER: &str = ":dateformat:";

/// Render `pattern` against `map`.
///
/// Date-valued placeholders with a `dateformat` modifier are rendered in
/// `tz` using the format vocabulary `yyyy`/`yy` (year), `mm` (month), `dd`
/// (day), `HH` (hour), `MM` (minute), `ss` (second); everything else in the
/// format string is copied through. The timezone affects only date values.
/// A modifier on a non-date value falls back to the value's natural string
/// form. A pattern without placeholders is returned unchanged.
pub fn evaluate_pattern<Tz>(
    pattern: &str,
    map: &SubstitutionMap,
    tz: &Tz,
) -> Result<String, PatternError>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::with_capacity(pattern.len());
    let mut copied_up_to = 0;

    for placeholder in PLACEHOLDER.find_iter(pattern) {
        out.push_str(&pattern[copied_up_to..placeholder.start()]);

        // Strip the "${" prefix and "}" suffix.
        let inner = &pattern[placeholder.start() + 2..placeholder.end() - 1];
        let (key, format) = match inner.split_once(DATEFORMAT_MODIFIER) {
            Some((key, format)) => (key, Some(format)),
            None => (inner, None),
        };

        let value = map.get(key).ok_or_else(|| PatternError::UnknownKey {
            key: key.to_string(),
            pattern: pattern.to_string(),
        })?;

        match (value, format) {
            (Value::Date(date), Some(format)) => {
                let rendered = date
                    .with_timezone(tz)
                    .format(&to_strftime(format))
                    .to_string();
                out.push_str(&rendered);
            }
            (value, _) => out.push_str(&value.to_string()),
        }

        copied_up_to = placeholder.end();
    }

    out.push_str(&pattern[copied_up_to..]);
    Ok(out)
}

/// Translate the dateformat vocabulary into a strftime string.
///
/// Longest token first so `yyyy` is not consumed as two `yy`. Literal `%`
/// is escaped so arbitrary format input cannot inject strftime specifiers.
fn to_strftime(format: &str) -> String {
    const TOKENS: [(&str, &str); 7] = [
        ("yyyy", "%Y"),
        ("yy", "%y"),
        ("mm", "%m"),
        ("dd", "%d"),
        ("HH", "%H"),
        ("MM", "%M"),
        ("ss", "%S"),
    ];

    let mut out = String::with_capacity(format.len());
    let mut rest = format;
    'outer: while !rest.is_empty() {
        for (token, spec) in TOKENS {
            if let Some(tail) = rest.strip_prefix(token) {
                out.push_str(spec);
                rest = tail;
                continue 'outer;
            }
        }
        let mut chars = rest.chars();
        match chars.next() {
            Some('%') => out.push_str("%%"),
            Some(c) => out.push(c),
            None => break,
        }
        rest = chars.as_str();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone, Utc};

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn map_with(entries: &[(&str, Value)]) -> SubstitutionMap {
        let mut map = SubstitutionMap::default();
        for (key, value) in entries {
            map.insert(*key, value.clone());
        }
        map
    }

    #[test]
    fn plain_text_is_identity() {
        let map = SubstitutionMap::default();
        let pattern = "Invoices/2026/unchanged";
        assert_eq!(evaluate_pattern(pattern, &map, &utc()).unwrap(), pattern);
    }

    #[test]
    fn substitutes_text_values() {
        let map = map_with(&[
            ("message.subject", Value::Text("Invoice".into())),
            ("attachment.name", Value::Text("inv.pdf".into())),
        ]);
        let out =
            evaluate_pattern("${message.subject} - ${attachment.name}", &map, &utc()).unwrap();
        assert_eq!(out, "Invoice - inv.pdf");
    }

    #[test]
    fn unknown_key_names_key_and_pattern() {
        let map = map_with(&[("message.subject", Value::Text("Invoice".into()))]);
        let err = evaluate_pattern("x/${attachment.name}", &map, &utc()).unwrap_err();
        assert_eq!(
            err,
            PatternError::UnknownKey {
                key: "attachment.name".into(),
                pattern: "x/${attachment.name}".into(),
            }
        );
    }

    #[test]
    fn dateformat_renders_in_timezone() {
        let date = Utc.with_ymd_and_hms(2026, 3, 2, 23, 30, 5).unwrap();
        let map = map_with(&[("message.date", Value::Date(date))]);

        // +02:00 pushes 23:30 over midnight.
        let berlin_ish = FixedOffset::east_opt(2 * 3600).unwrap();
        let out = evaluate_pattern(
            "${message.date:dateformat:yyyy-mm-dd HH:MM:ss}",
            &map,
            &berlin_ish,
        )
        .unwrap();
        assert_eq!(out, "2026-03-03 01:30:05");
    }

    #[test]
    fn timezone_only_affects_dates() {
        let map = map_with(&[("attachment.name", Value::Text("inv.pdf".into()))]);
        let offset = FixedOffset::east_opt(5 * 3600).unwrap();
        let out = evaluate_pattern("${attachment.name}", &map, &offset).unwrap();
        assert_eq!(out, "inv.pdf");
    }

    #[test]
    fn date_without_modifier_uses_natural_form() {
        let date = Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap();
        let map = map_with(&[("message.date", Value::Date(date))]);
        let out = evaluate_pattern("${message.date}", &map, &utc()).unwrap();
        assert_eq!(out, "2026-03-02T09:30:00+00:00");
    }

    #[test]
    fn dateformat_on_non_date_falls_back_to_natural_form() {
        let map = map_with(&[("attachment.size", Value::Number(2048))]);
        let out =
            evaluate_pattern("${attachment.size:dateformat:yyyy}", &map, &utc()).unwrap();
        assert_eq!(out, "2048");
    }

    #[test]
    fn mixed_literal_and_placeholders() {
        let date = Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap();
        let map = map_with(&[
            ("message.subject", Value::Text("Invoice".into())),
            ("message.date", Value::Date(date)),
        ]);
        let out = evaluate_pattern(
            "Filed/${message.date:dateformat:yyyy}/(${message.subject})",
            &map,
            &utc(),
        )
        .unwrap();
        assert_eq!(out, "Filed/2026/(Invoice)");
    }

    #[test]
    fn two_digit_year_and_literals_pass_through() {
        let date = Utc.with_ymd_and_hms(2026, 3, 2, 9, 5, 7).unwrap();
        let map = map_with(&[("message.date", Value::Date(date))]);
        let out =
            evaluate_pattern("${message.date:dateformat:yy/mm at HH:MM}", &map, &utc()).unwrap();
        assert_eq!(out, "26/03 at 09:05");
    }

    #[test]
    fn percent_in_format_is_escaped() {
        let date = Utc.with_ymd_and_hms(2026, 3, 2, 9, 5, 7).unwrap();
        let map = map_with(&[("message.date", Value::Date(date))]);
        let out = evaluate_pattern("${message.date:dateformat:yyyy%}", &map, &utc()).unwrap();
        assert_eq!(out, "2026%");
    }

    #[test]
    fn rendering_is_insertion_order_independent() {
        let date = Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap();

        let mut forward = SubstitutionMap::default();
        forward.insert("message.date", Value::Date(date));
        forward.insert("attachment.name", Value::Text("inv.pdf".into()));

        let mut reverse = SubstitutionMap::default();
        reverse.insert("attachment.name", Value::Text("inv.pdf".into()));
        reverse.insert("message.date", Value::Date(date));

        let pattern = "${attachment.name}-${message.date:dateformat:yyyy-mm-dd}";
        assert_eq!(
            evaluate_pattern(pattern, &forward, &utc()).unwrap(),
            evaluate_pattern(pattern, &reverse, &utc()).unwrap(),
        );
    }

    #[test]
    fn to_strftime_token_table() {
        assert_eq!(to_strftime("yyyy-mm-dd HH:MM:ss"), "%Y-%m-%d %H:%M:%S");
        assert_eq!(to_strftime("yy"), "%y");
        assert_eq!(to_strftime("plain"), "plain");
    }
}
