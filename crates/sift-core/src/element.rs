//! Knowledge Element
//!
//! An open, insertion-ordered record of facts. Elements play two roles: the observed
//! facts handed to `RuleBase::select`, and the conditions of a rule, whose values are
//! read as test expressions for the [`matcher`](crate::matcher).
//!
//! Matching is split in two phases. [`KnowledgeElement::score`] is a pure query that
//! returns the score together with any pending captures; [`KnowledgeElement::commit`]
//! writes those captures back as `<field>/<capture>` fields.
//! [`KnowledgeElement::match_element`] runs both.

use crate::constants::markers::RESERVED_PREFIX;
use crate::constants::scoring::FIELD_BASE_SCORE;
use crate::error::{SiftError, SiftResult};
use crate::matcher;
use sift_types::FactValue;
use std::collections::HashMap;
use std::fmt;
use tracing::trace;

/// Insertion-ordered mapping from field name to [`FactValue`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KnowledgeElement {
    fields: Vec<(String, FactValue)>,
    index: HashMap<String, usize>,
}

/// Result of scoring an element against a test element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchOutcome {
    /// `100 + quality` per matched field, `0` when any field fails
    pub score: f64,
    /// Captured values keyed by `<field>/<capture>`, in field order
    pub captures: Vec<(String, FactValue)>,
}

impl MatchOutcome {
    pub fn miss() -> Self {
        Self::default()
    }

    pub fn is_match(&self) -> bool {
        self.score > 0.0
    }
}

impl KnowledgeElement {
    /// Create an empty element
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an element from `(key, value)` pairs; later duplicates overwrite earlier ones
    pub fn from_pairs<I, K, V>(pairs: I) -> SiftResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FactValue>,
    {
        let mut element = Self::new();
        for (key, value) in pairs {
            element.set(key, value)?;
        }
        Ok(element)
    }

    /// Build an element from a JSON object of scalar values
    pub fn from_json(value: &serde_json::Value) -> SiftResult<Self> {
        let object = value.as_object().ok_or_else(|| SiftError::InvalidFact {
            field: String::new(),
            message: "expected a JSON object".to_string(),
        })?;

        let mut element = Self::new();
        for (key, raw) in object {
            let fact = FactValue::try_from(raw).map_err(|err| SiftError::InvalidFact {
                field: key.clone(),
                message: err.to_string(),
            })?;
            element.set(key.clone(), fact)?;
        }
        Ok(element)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&FactValue> {
        self.index.get(key).map(|&slot| &self.fields[slot].1)
    }

    /// Add or overwrite a field. Overwriting keeps the field's original position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FactValue>) -> SiftResult<()> {
        let key = key.into();
        if key.starts_with(RESERVED_PREFIX) {
            return Err(SiftError::ReservedField { field: key, prefix: RESERVED_PREFIX });
        }
        self.insert_unchecked(key, value.into());
        Ok(())
    }

    /// Remove a field, returning its value
    pub fn remove(&mut self, key: &str) -> Option<FactValue> {
        let slot = self.index.remove(key)?;
        let (_, value) = self.fields.remove(slot);
        for position in self.index.values_mut() {
            if *position > slot {
                *position -= 1;
            }
        }
        Some(value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FactValue)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }

    fn insert_unchecked(&mut self, key: String, value: FactValue) {
        match self.index.get(&key) {
            Some(&slot) => self.fields[slot].1 = value,
            None => {
                self.index.insert(key.clone(), self.fields.len());
                self.fields.push((key, value));
            }
        }
    }

    /// Score this element against `test` without modifying it.
    ///
    /// Every field of `test` must be present here; a missing field or a field whose
    /// quality is `0` makes the whole score `0`. An empty `test` never matches.
    pub fn score(&self, test: &KnowledgeElement) -> MatchOutcome {
        let mut score = 0.0;
        let mut captures = Vec::new();

        for (field, expression) in test.iter() {
            let Some(value) = self.get(field) else {
                trace!(field, "Test field absent from element");
                return MatchOutcome::miss();
            };

            let field_match = matcher::match_field(value, expression);
            if !field_match.is_match() {
                trace!(field, %expression, "Field did not match");
                return MatchOutcome::miss();
            }

            score += FIELD_BASE_SCORE + field_match.quality;
            if let (Some(name), Some(extracted)) = (field_match.capture, field_match.extracted) {
                captures.push((format!("{field}/{name}"), extracted));
            }
        }

        MatchOutcome { score, captures }
    }

    /// Apply the captures of a successful outcome, returning its score
    pub fn commit(&mut self, outcome: MatchOutcome) -> f64 {
        if outcome.is_match() {
            for (key, value) in outcome.captures {
                trace!(key = %key, %value, "Committing capture");
                self.insert_unchecked(key, value);
            }
        }
        outcome.score
    }

    /// Score against `test` and write back any captures
    pub fn match_element(&mut self, test: &KnowledgeElement) -> f64 {
        let outcome = self.score(test);
        self.commit(outcome)
    }
}

impl TryFrom<&serde_json::Value> for KnowledgeElement {
    type Error = SiftError;

    fn try_from(value: &serde_json::Value) -> SiftResult<Self> {
        Self::from_json(value)
    }
}

impl fmt::Display for KnowledgeElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match value {
                FactValue::String(s) => write!(f, "{key}: {s:?}")?,
                other => write!(f, "{key}: {other}")?,
            }
        }
        write!(f, "}}")
    }
}
