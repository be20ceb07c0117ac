//! Field Matcher
//!
//! Compares one fact value against one test expression and reports a match quality in
//! `[0, 1]`. Test expressions are interpreted lazily; nothing is validated up front and
//! every malformed or mismatched input degrades to quality `0`.
//!
//! ## Test expression forms (strings)
//!
//! | form              | quality                                   | extracted            |
//! |-------------------|-------------------------------------------|----------------------|
//! | exact equality    | `1.0`                                     | the value            |
//! | `*`               | `0.25`                                    | the value            |
//! | `re/<pattern>/`   | `0.75` on search hit                      | group 1 or the match |
//! | `..$*$..[/@name]` | `0.75` on search hit                      | group 1, captured    |
//! | `*text*`          | `len(text) / len(value)` if contained     | the value            |
//! | `*text`           | `len(text) / len(value)` if suffix        | the value            |
//! | `text*`           | `len(text) / len(value)` if contained     | the value            |
//! | `pre*suf`         | `(len(pre) + len(suf)) / len(value)`      | the value            |
//!
//! Numbers compare exactly (`1.0`) or within `1e-6` (`0.9`). A numeric string facing a
//! number is parsed first (integer when it has no decimal point, float otherwise).

use crate::constants::markers::{
    CAPTURE_NAME_SEPARATOR, DEFAULT_CAPTURE_NAME, EXTRACT_GREEDY, EXTRACT_TOKEN, REGEX_PREFIX,
    STAR,
};
use crate::constants::quality::{EXACT, FLOAT_TOLERANCE, NEAR_NUMERIC, PATTERN, WILDCARD};
use crate::pattern_cache;
use sift_types::FactValue;
use std::borrow::Cow;

/// Result of matching a single field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMatch {
    /// Match quality in `[0, 1]`; `0` means no match
    pub quality: f64,
    /// Value produced by the match, `None` whenever `quality` is `0`
    pub extracted: Option<FactValue>,
    /// Capture name requested by an extract-match expression
    pub capture: Option<String>,
}

impl FieldMatch {
    /// The "no match" result
    pub fn miss() -> Self {
        Self { quality: 0.0, extracted: None, capture: None }
    }

    pub fn is_match(&self) -> bool {
        self.quality > 0.0
    }
}

/// Outcome of a textual comparison before it is tied back to the original value
#[derive(Debug)]
enum TextMatch {
    Miss,
    Plain(f64),
    Pattern { extracted: FactValue, capture: Option<String> },
}

/// Match `value` against the test expression `test`
pub fn match_field(value: &FactValue, test: &FactValue) -> FieldMatch {
    let coerced_value = coerce_numeric(value, test);
    let coerced_test = coerce_numeric(test, value);

    let outcome = match (coerced_value.as_ref(), coerced_test.as_ref()) {
        (FactValue::String(v), FactValue::String(t)) => match_text(v, t),
        (v, t) => match match_numbers(v, t) {
            Some(quality) if quality > 0.0 => TextMatch::Plain(quality),
            _ => TextMatch::Miss,
        },
    };

    match outcome {
        TextMatch::Miss => FieldMatch::miss(),
        TextMatch::Plain(quality) => {
            FieldMatch { quality, extracted: Some(value.clone()), capture: None }
        }
        TextMatch::Pattern { extracted, capture } => {
            FieldMatch { quality: PATTERN, extracted: Some(extracted), capture }
        }
    }
}

/// Parse `side` as a number when it is a string facing a numeric `other`.
/// Unparseable strings are left as they are.
fn coerce_numeric<'a>(side: &'a FactValue, other: &FactValue) -> Cow<'a, FactValue> {
    match side {
        FactValue::String(text) if other.is_numeric() => {
            parse_numeric(text).map_or(Cow::Borrowed(side), Cow::Owned)
        }
        _ => Cow::Borrowed(side),
    }
}

fn parse_numeric(text: &str) -> Option<FactValue> {
    let text = text.trim();
    if text.contains('.') {
        text.parse::<f64>().ok().map(FactValue::Float)
    } else {
        text.parse::<i64>().ok().map(FactValue::Integer)
    }
}

/// Numeric comparison; `None` when either side is not a number
fn match_numbers(value: &FactValue, test: &FactValue) -> Option<f64> {
    if let (FactValue::Integer(a), FactValue::Integer(b)) = (value, test) {
        return Some(if a == b { EXACT } else { 0.0 });
    }

    let (a, b) = (value.as_f64()?, test.as_f64()?);
    #[allow(clippy::float_cmp)]
    let quality = if a == b {
        EXACT
    } else if (a - b).abs() < FLOAT_TOLERANCE {
        NEAR_NUMERIC
    } else {
        0.0
    };
    Some(quality)
}

fn match_text(value: &str, test: &str) -> TextMatch {
    if value == test {
        return TextMatch::Plain(EXACT);
    }
    if test.strip_prefix(STAR) == Some("") {
        return TextMatch::Plain(WILDCARD);
    }
    if let Some(rest) = test.strip_prefix(REGEX_PREFIX) {
        let pattern = rest.strip_suffix('/').unwrap_or(rest);
        return match_regex(value, pattern);
    }
    if test.contains(EXTRACT_GREEDY) {
        return match_extract(value, test);
    }
    if test.contains(STAR) {
        return match_star(value, test);
    }
    TextMatch::Miss
}

fn match_regex(value: &str, pattern: &str) -> TextMatch {
    let Some(regex) = pattern_cache::compile(pattern) else {
        return TextMatch::Miss;
    };
    let Some(captures) = regex.captures(value) else {
        return TextMatch::Miss;
    };

    let group = if captures.len() > 1 { captures.get(1) } else { captures.get(0) };
    let extracted = group.map_or(FactValue::Null, |m| FactValue::from(m.as_str()));
    TextMatch::Pattern { extracted, capture: None }
}

fn match_extract(value: &str, test: &str) -> TextMatch {
    let (expression, capture) = test
        .rsplit_once(CAPTURE_NAME_SEPARATOR)
        .unwrap_or((test, DEFAULT_CAPTURE_NAME));

    let Some(regex) = pattern_cache::compile(&extract_pattern(expression)) else {
        return TextMatch::Miss;
    };
    let Some(captures) = regex.captures(value) else {
        return TextMatch::Miss;
    };

    let extracted = captures.get(1).map_or(FactValue::Null, |m| FactValue::from(m.as_str()));
    TextMatch::Pattern { extracted, capture: Some(capture.to_string()) }
}

/// Build the search pattern for an extract-match expression: literal text is escaped,
/// `$*$` becomes a non-whitespace group and a lone `$*` a greedy group.
pub(crate) fn extract_pattern(expression: &str) -> String {
    let mut pattern = String::with_capacity(expression.len() + 8);
    let mut rest = expression;

    while let Some(pos) = rest.find(EXTRACT_GREEDY) {
        pattern.push_str(&regex::escape(&rest[..pos]));
        rest = &rest[pos..];
        if let Some(tail) = rest.strip_prefix(EXTRACT_TOKEN) {
            pattern.push_str(r"(\S+)");
            rest = tail;
        } else {
            pattern.push_str("(.*)");
            rest = &rest[EXTRACT_GREEDY.len()..];
        }
    }
    pattern.push_str(&regex::escape(rest));
    pattern
}

fn match_star(value: &str, test: &str) -> TextMatch {
    let value_len = value.chars().count();

    let matched_len = if let Some(inner) = test.strip_prefix(STAR) {
        match inner.strip_suffix(STAR) {
            Some(text) => value.contains(text).then(|| char_len(text)),
            None => value.ends_with(inner).then(|| char_len(inner)),
        }
    } else if let Some(text) = test.strip_suffix(STAR) {
        value.contains(text).then(|| char_len(text))
    } else {
        test.split_once(STAR).and_then(|(prefix, suffix)| {
            let literal_len = char_len(prefix) + char_len(suffix);
            (literal_len <= value_len && value.starts_with(prefix) && value.ends_with(suffix))
                .then_some(literal_len)
        })
    };

    match matched_len {
        Some(len) if len > 0 && value_len > 0 => TextMatch::Plain(ratio(len, value_len)),
        _ => TextMatch::Miss,
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[allow(clippy::cast_precision_loss)]
fn ratio(matched: usize, total: usize) -> f64 {
    matched as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = "string key=1.0 string";

    fn quality(value: impl Into<FactValue>, test: impl Into<FactValue>) -> f64 {
        match_field(&value.into(), &test.into()).quality
    }

    #[test]
    fn exact_and_wildcard() {
        assert_eq!(quality("api.openai.com", "api.openai.com"), EXACT);
        assert_eq!(quality("anything", "*"), WILDCARD);
        assert_eq!(quality("", "*"), WILDCARD);
        assert_eq!(quality("abc", "abd"), 0.0);
    }

    #[test]
    fn regex_extracts_first_group() {
        let m = match_field(&BODY.into(), &r"re/key=([^\s]+)/".into());
        assert_eq!(m.quality, PATTERN);
        assert_eq!(m.extracted, Some(FactValue::from("1.0")));
        assert_eq!(m.capture, None);
    }

    #[test]
    fn regex_without_group_extracts_whole_match_and_slash_is_optional() {
        let m = match_field(&BODY.into(), &"re/key=1".into());
        assert_eq!(m.quality, PATTERN);
        assert_eq!(m.extracted, Some(FactValue::from("key=1")));
    }

    #[test]
    fn malformed_regex_is_a_miss() {
        let m = match_field(&BODY.into(), &"re/(key/".into());
        assert_eq!(m, FieldMatch::miss());
    }

    #[test]
    fn extract_token_and_greedy() {
        let m = match_field(&BODY.into(), &"key=$*$".into());
        assert_eq!(m.quality, PATTERN);
        assert_eq!(m.extracted, Some(FactValue::from("1.0")));
        assert_eq!(m.capture.as_deref(), Some("match"));

        let m = match_field(&BODY.into(), &"key=$*".into());
        assert_eq!(m.extracted, Some(FactValue::from("1.0 string")));
    }

    #[test]
    fn extract_with_named_capture() {
        let m = match_field(
            &"string model=llama3.2 string".into(),
            &"model=$*$/@model".into(),
        );
        assert_eq!(m.extracted, Some(FactValue::from("llama3.2")));
        assert_eq!(m.capture.as_deref(), Some("model"));
    }

    #[test]
    fn extract_escapes_literal_text() {
        assert_eq!(extract_pattern("a.b=$*$ (x)"), r"a\.b=(\S+) \(x\)");
        assert_eq!(extract_pattern("$*,$*$"), r"(.*),(\S+)");
        let m = match_field(&"axb=1".into(), &"a.b=$*$".into());
        assert_eq!(m, FieldMatch::miss());
    }

    #[test]
    fn star_forms_score_by_length_ratio() {
        let contains_key = quality(BODY, "*key*");
        let contains_longer = quality(BODY, "*key=1.0*");
        let prefix = quality(BODY, "str*");
        let suffix = quality(BODY, "*ring");

        assert!((contains_key - 3.0 / 21.0).abs() < 1e-12);
        assert!(contains_longer > contains_key);
        assert!((prefix - contains_key).abs() < 1e-12);
        assert!(suffix > contains_key);
        assert_eq!(quality(BODY, "string*string"), 12.0 / 21.0);
        assert_eq!(quality("abc", "*abc*"), EXACT);
    }

    #[test]
    fn star_forms_miss() {
        assert_eq!(quality("api.openai.com", "*.org"), 0.0);
        assert_eq!(quality("api.openai.com", "*xyz*"), 0.0);
        assert_eq!(quality("api.openai.com", "api*org"), 0.0);
        assert_eq!(quality("abc", "ab*bc"), 0.0);
        assert_eq!(quality("abc", "**"), 0.0);
    }

    #[test]
    fn suffix_quality_grows_with_literal_length() {
        let long = quality("api.openai.com", "*.openai.com");
        let short = quality("api.openai.com", "*.com");
        assert!(long > short && short > 0.0);
    }

    #[test]
    fn numeric_coercion() {
        assert_eq!(quality("42", 42), EXACT);
        assert_eq!(quality("3.14", 3.14), EXACT);
        assert_eq!(quality("100.0", 100), EXACT);
        assert_eq!(quality(42, "42"), EXACT);
        assert_eq!(quality("hello", 42), 0.0);
        assert_eq!(quality("3.14", "42"), 0.0);
    }

    #[test]
    fn numeric_tolerance() {
        assert_eq!(quality(42, 43), 0.0);
        assert_eq!(quality(1.0, 1.000_000_1), NEAR_NUMERIC);
        assert_eq!(quality(1.0, 1.01), 0.0);
        assert_eq!(quality(2, 2.0), EXACT);
    }

    #[test]
    fn other_types_never_match() {
        assert_eq!(match_field(&FactValue::Null, &FactValue::Null), FieldMatch::miss());
        assert_eq!(quality(FactValue::Null, "*"), 0.0);
    }
}
