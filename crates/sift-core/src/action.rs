//! Rule action grammar
//!
//! A rule's actions run in order against two memory scopes and an optional artifact
//! collaborator:
//!
//! - `Assign { k: v, .. }` applies each pair as a memory assignment, in order.
//! - `Pair(k, v)` is a memory assignment, or `artifacts.process(k, Some(v))` when `k`
//!   starts with `!`.
//! - `Single(v)` invokes `artifacts.process(v, None)` when `v` starts with `!`.
//!
//! Memory assignment rules:
//!
//! - a key starting with `@` forces the write into long-term memory;
//! - a string value starting with `$` is a reference, resolved in immediate memory
//!   first, then long-term memory, and `null` when unresolved;
//! - the write goes to long-term memory when it is supplied and either already holds
//!   the key or the write is forced; otherwise it goes to immediate memory unless
//!   forced. A forced write without long-term memory is dropped.

use crate::constants::markers::{ARTIFACT, LONG_TERM, REFERENCE};
use crate::element::KnowledgeElement;
use crate::error::{SiftError, SiftResult};
use sift_types::FactValue;
use std::fmt;
use tracing::{debug, trace, warn};

/// One step of a rule's action list
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Mapping action: every pair is a memory assignment
    Assign(Vec<(String, FactValue)>),
    /// `(key, value)`: memory assignment or artifact invocation
    Pair(String, FactValue),
    /// `(value,)`: artifact invocation without parameters
    Single(FactValue),
}

impl Action {
    pub fn assign<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FactValue>,
    {
        Self::Assign(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    pub fn pair(key: impl Into<String>, value: impl Into<FactValue>) -> Self {
        Self::Pair(key.into(), value.into())
    }

    pub fn single(value: impl Into<FactValue>) -> Self {
        Self::Single(value.into())
    }

    /// Artifact invocation `!function`, with parameters when given
    pub fn artifact(function: &str, params: Option<FactValue>) -> Self {
        let key = format!("{ARTIFACT}{function}");
        match params {
            Some(params) => Self::Pair(key, params),
            None => Self::Single(FactValue::String(key)),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Assign(pairs) => {
                write!(f, "{{")?;
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
            Action::Pair(key, value) => write!(f, "({key}, {value})"),
            Action::Single(value) => write!(f, "({value})"),
        }
    }
}

/// External side-effect collaborator invoked by `!`-marked actions.
///
/// The return value carries no data back into the engine; an error aborts the
/// remaining actions and is returned from `Rule::execute`.
pub trait Artifacts {
    fn process(&mut self, function: &str, params: Option<&FactValue>) -> anyhow::Result<()>;
}

/// Artifact collaborator that ignores every invocation
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopArtifacts;

impl Artifacts for NoopArtifacts {
    fn process(&mut self, function: &str, _params: Option<&FactValue>) -> anyhow::Result<()> {
        trace!(function, "No artifact collaborator supplied, ignoring");
        Ok(())
    }
}

/// Adapts a closure into an [`Artifacts`] collaborator
pub struct FnArtifacts<F>(pub F);

impl<F> Artifacts for FnArtifacts<F>
where
    F: FnMut(&str, Option<&FactValue>) -> anyhow::Result<()>,
{
    fn process(&mut self, function: &str, params: Option<&FactValue>) -> anyhow::Result<()> {
        (self.0)(function, params)
    }
}

fn artifact_name(value: &str) -> Option<&str> {
    value.strip_prefix(ARTIFACT)
}

fn invoke(
    artifacts: &mut dyn Artifacts,
    function: &str,
    params: Option<&FactValue>,
) -> SiftResult<()> {
    debug!(function, "Invoking artifact");
    artifacts.process(function, params).map_err(|err| SiftError::artifact(function, err))
}

/// Apply a single action
pub(crate) fn apply(
    action: &Action,
    immediate: &mut KnowledgeElement,
    mut long: Option<&mut KnowledgeElement>,
    artifacts: &mut dyn Artifacts,
) -> SiftResult<()> {
    match action {
        Action::Assign(pairs) => {
            for (key, value) in pairs {
                assign_memory(key, value, immediate, long.as_deref_mut());
            }
        }
        Action::Pair(key, value) => match artifact_name(key) {
            Some(function) => invoke(artifacts, function, Some(value))?,
            None => assign_memory(key, value, immediate, long),
        },
        Action::Single(value) => match value.as_str().and_then(artifact_name) {
            Some(function) => invoke(artifacts, function, None)?,
            // No default key is defined for bare values.
            None => warn!(%value, "Singleton action without artifact marker has no effect"),
        },
    }
    Ok(())
}

/// Resolve a `$name` reference against immediate then long-term memory
fn resolve(
    value: &FactValue,
    immediate: &KnowledgeElement,
    long: Option<&KnowledgeElement>,
) -> FactValue {
    let Some(name) = value.as_str().and_then(|s| s.strip_prefix(REFERENCE)) else {
        return value.clone();
    };

    immediate
        .get(name)
        .or_else(|| long.and_then(|memory| memory.get(name)))
        .cloned()
        .unwrap_or_else(|| {
            trace!(reference = name, "Unresolved reference, assigning null");
            FactValue::Null
        })
}

/// Memory assignment of `value` to `key`
pub fn assign_memory(
    key: &str,
    value: &FactValue,
    immediate: &mut KnowledgeElement,
    long: Option<&mut KnowledgeElement>,
) {
    let (key, forced) = match key.strip_prefix(LONG_TERM) {
        Some(stripped) => (stripped, true),
        None => (key, false),
    };
    let value = resolve(value, immediate, long.as_deref());

    let target = match long {
        Some(memory) if forced || memory.contains(key) => Some((memory, "long")),
        _ if !forced => Some((immediate, "immediate")),
        _ => None,
    };

    match target {
        Some((memory, scope)) => {
            trace!(key, scope, %value, "Assigning memory");
            if let Err(err) = memory.set(key, value) {
                warn!(key, scope, error = %err, "Dropping assignment");
            }
        }
        None => debug!(key, "Forced long-term write without long-term memory, dropped"),
    }
}
