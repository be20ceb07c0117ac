//! Rules
//!
//! A rule pairs a condition element with an ordered action list, lives in exactly one
//! namespace, and carries a positive weight used when several rules tie during
//! selection. Rules are immutable once built; only their textual form is computed
//! lazily and memoized.

use crate::action::{self, Action, Artifacts, NoopArtifacts};
use crate::constants::rules::{DEFAULT_NAMESPACE, DEFAULT_WEIGHT};
use crate::element::{KnowledgeElement, MatchOutcome};
use crate::error::{SiftError, SiftResult};
use crate::ids::{IdGenerator, RuleId};
use std::fmt;
use std::sync::OnceLock;
use tracing::{debug, instrument};

/// An identified, namespaced condition/action pair
#[derive(Debug, Clone)]
pub struct Rule {
    id: RuleId,
    namespace: String,
    conditions: KnowledgeElement,
    actions: Vec<Action>,
    weight: f64,
    repr_cache: OnceLock<String>,
}

impl Rule {
    /// Start building a rule with the given conditions
    pub fn builder(conditions: KnowledgeElement) -> RuleBuilder {
        RuleBuilder::new(conditions)
    }

    pub fn id(&self) -> &RuleId {
        &self.id
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn conditions(&self) -> &KnowledgeElement {
        &self.conditions
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Score `knowledge` against this rule's conditions without modifying it
    pub fn score(&self, knowledge: &KnowledgeElement) -> MatchOutcome {
        knowledge.score(&self.conditions)
    }

    /// Score `knowledge` against this rule's conditions, committing captures on a match.
    /// `0` means no match.
    pub fn match_element(&self, knowledge: &mut KnowledgeElement) -> f64 {
        knowledge.match_element(&self.conditions)
    }

    /// Run the actions in order against immediate and long-term memory.
    ///
    /// Without an artifact collaborator, `!`-marked actions are ignored. The first
    /// artifact failure stops execution and is returned.
    #[instrument(skip_all, fields(rule_id = %self.id))]
    pub fn execute(
        &self,
        immediate: &mut KnowledgeElement,
        mut long: Option<&mut KnowledgeElement>,
        artifacts: Option<&mut dyn Artifacts>,
    ) -> SiftResult<()> {
        let mut noop = NoopArtifacts;
        let artifacts: &mut dyn Artifacts = match artifacts {
            Some(artifacts) => artifacts,
            None => &mut noop,
        };

        debug!(action_count = self.actions.len(), "Executing rule");
        for action in &self.actions {
            action::apply(action, immediate, long.as_deref_mut(), artifacts)?;
        }
        Ok(())
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = self.repr_cache.get_or_init(|| {
            let actions = self.actions.iter().map(ToString::to_string).collect::<Vec<_>>();
            format!(
                "Rule[{}]:conditions=[{}], actions=[{}], weight={}",
                self.id,
                self.conditions,
                actions.join(", "),
                self.weight
            )
        });
        f.write_str(repr)
    }
}

/// Builder for [`Rule`]
#[derive(Debug, Clone)]
pub struct RuleBuilder {
    conditions: KnowledgeElement,
    actions: Vec<Action>,
    weight: f64,
    namespace: Option<String>,
}

impl RuleBuilder {
    pub fn new(conditions: KnowledgeElement) -> Self {
        Self { conditions, actions: Vec::new(), weight: DEFAULT_WEIGHT, namespace: None }
    }

    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn actions(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.actions.extend(actions);
        self
    }

    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Set the namespace; an empty name falls back to the default namespace
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Build with the next rule id from `ids`. Rules only come out of a `RuleBase`,
    /// whose generator is the single source of rule ids.
    pub(crate) fn build(
        self,
        ids: &mut IdGenerator,
        default_namespace: &str,
    ) -> SiftResult<Rule> {
        if !(self.weight.is_finite() && self.weight > 0.0) {
            return Err(SiftError::InvalidWeight { weight: self.weight });
        }

        let namespace = match self.namespace {
            Some(namespace) if !namespace.is_empty() => namespace,
            _ if default_namespace.is_empty() => DEFAULT_NAMESPACE.to_string(),
            _ => default_namespace.to_string(),
        };

        Ok(Rule {
            id: ids.next_rule_id(),
            namespace,
            conditions: self.conditions,
            actions: self.actions,
            weight: self.weight,
            repr_cache: OnceLock::new(),
        })
    }
}
