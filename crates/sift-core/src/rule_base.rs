//! Rule Base
//!
//! Namespace-indexed rule storage with scored, strategy-driven selection.
//!
//! ## Architecture Overview
//!
//! ```text
//! Selection Flow:
//!
//! Search Space  →  Scoring  →  Candidate Set  →  Tie Resolution  →  Selection
//!  namespaces     rule.score   per strategy      uniform/weighted    (rule, score,
//!  in order       + commit                       (seedable rng)       candidates)
//! ```
//!
//! Namespaces and the rules inside each namespace are kept in insertion order, so
//! `FirstMatch` and every scan are reproducible. Tie-breaking draws from a `StdRng`
//! owned by the rule base; seed it (or inject one) for deterministic selections.
//!
//! The rule base does no internal locking. Callers sharing one across threads wrap it
//! in their own lock.

use crate::config::EngineConfig;
use crate::constants::rules::DEFAULT_WEIGHT;
use crate::element::KnowledgeElement;
use crate::error::{SiftError, SiftResult};
use crate::ids::{IdGenerator, RuleId};
use crate::rule::{Rule, RuleBuilder};
use crate::strategy::SelectionStrategy;
use rand::SeedableRng;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument, trace};

/// Namespaces searched by a selection
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Scope {
    /// Every namespace, in insertion order
    #[default]
    All,
    /// A single namespace
    One(String),
    /// Several namespaces, searched in the given order
    Many(Vec<String>),
}

impl From<&str> for Scope {
    fn from(namespace: &str) -> Self {
        if namespace.is_empty() { Scope::All } else { Scope::One(namespace.to_string()) }
    }
}

impl From<String> for Scope {
    fn from(namespace: String) -> Self {
        if namespace.is_empty() { Scope::All } else { Scope::One(namespace) }
    }
}

impl From<Option<&str>> for Scope {
    fn from(namespace: Option<&str>) -> Self {
        namespace.map_or(Scope::All, Scope::from)
    }
}

impl From<Vec<String>> for Scope {
    fn from(namespaces: Vec<String>) -> Self {
        Scope::Many(namespaces)
    }
}

impl From<&[&str]> for Scope {
    fn from(namespaces: &[&str]) -> Self {
        Scope::Many(namespaces.iter().map(ToString::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Scope {
    fn from(namespaces: [&str; N]) -> Self {
        Scope::from(&namespaces[..])
    }
}

/// Outcome of [`RuleBase::select`]
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// The chosen rule; `None` means "no decision"
    pub rule: Option<Arc<Rule>>,
    /// Best score seen, `0` when nothing matched
    pub score: f64,
    /// Candidate set, `None` for `FirstMatch`
    pub candidates: Option<Vec<Arc<Rule>>>,
}

impl Selection {
    pub fn into_parts(self) -> (Option<Arc<Rule>>, f64, Option<Vec<Arc<Rule>>>) {
        (self.rule, self.score, self.candidates)
    }

    pub fn is_decision(&self) -> bool {
        self.rule.is_some()
    }
}

/// Namespace-indexed collection of rules
#[derive(Debug)]
pub struct RuleBase {
    buckets: Vec<(String, Vec<Arc<Rule>>)>,
    namespace_index: HashMap<String, usize>,
    rule_index: HashMap<RuleId, usize>,
    ids: IdGenerator,
    rng: StdRng,
    config: EngineConfig,
}

impl Default for RuleBase {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleBase {
    /// Create an empty rule base with an entropy-seeded random source
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create an empty rule base whose tie-breaking is reproducible
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Create an empty rule base using `rng` for tie-breaking
    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            buckets: Vec::new(),
            namespace_index: HashMap::new(),
            rule_index: HashMap::new(),
            ids: IdGenerator::new(),
            rng,
            config: EngineConfig::default(),
        }
    }

    /// Create an empty rule base from `config`
    pub fn from_config(config: EngineConfig) -> Self {
        info!(
            strategy = %config.default_strategy,
            namespace = %config.default_namespace,
            seeded = config.rng_seed.is_some(),
            "Creating rule base"
        );
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { config, ..Self::with_rng(rng) }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Generator every rule of this base draws its id from
    pub fn ids(&self) -> &IdGenerator {
        &self.ids
    }

    /// Build `builder` with this base's id generator and configured default namespace,
    /// then insert it into its namespace bucket, creating the bucket on first use.
    ///
    /// The base's generator is the only source of rule ids, so ids never repeat within
    /// one base, including ids of rules removed earlier.
    #[instrument(skip(self, builder))]
    pub fn add_new(&mut self, builder: RuleBuilder) -> SiftResult<Arc<Rule>> {
        let rule = builder.build(&mut self.ids, &self.config.default_namespace)?;
        Ok(self.insert(rule))
    }

    fn insert(&mut self, rule: Rule) -> Arc<Rule> {
        let slot = match self.namespace_index.get(rule.namespace()) {
            Some(&slot) => slot,
            None => {
                let slot = self.buckets.len();
                self.buckets.push((rule.namespace().to_string(), Vec::new()));
                self.namespace_index.insert(rule.namespace().to_string(), slot);
                slot
            }
        };

        let rule = Arc::new(rule);
        self.rule_index.insert(rule.id().clone(), slot);
        self.buckets[slot].1.push(Arc::clone(&rule));
        debug!(
            rule_id = %rule.id(),
            namespace = rule.namespace(),
            bucket_size = self.buckets[slot].1.len(),
            "Added rule"
        );
        rule
    }

    /// Remove a rule by id. Empty buckets are kept so namespace order stays stable.
    pub fn remove(&mut self, id: &RuleId) -> Option<Arc<Rule>> {
        let slot = self.rule_index.remove(id)?;
        let rules = &mut self.buckets[slot].1;
        let position = rules.iter().position(|rule| rule.id() == id)?;
        debug!(rule_id = %id, "Removed rule");
        Some(rules.remove(position))
    }

    pub fn get(&self, id: &RuleId) -> Option<&Arc<Rule>> {
        let slot = *self.rule_index.get(id)?;
        self.buckets[slot].1.iter().find(|rule| rule.id() == id)
    }

    /// Namespaces in insertion order
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.buckets.iter().map(|(namespace, _)| namespace.as_str())
    }

    /// Rules of `namespace` in insertion order; empty when the namespace is unknown
    pub fn rules_in(&self, namespace: &str) -> &[Arc<Rule>] {
        match self.namespace_index.get(namespace) {
            Some(&slot) => self.buckets[slot].1.as_slice(),
            None => &[],
        }
    }

    /// Total number of rules
    pub fn len(&self) -> usize {
        self.rule_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rule_index.is_empty()
    }

    /// Bucket slots to scan, in search order. Unknown namespaces are skipped and
    /// repeated ones are scanned once.
    fn search_space(&self, scope: &Scope) -> Vec<usize> {
        match scope {
            Scope::All => (0..self.buckets.len()).collect(),
            Scope::One(namespace) => {
                self.namespace_index.get(namespace).copied().into_iter().collect()
            }
            Scope::Many(namespaces) => {
                let mut seen = HashSet::new();
                namespaces
                    .iter()
                    .filter_map(|namespace| self.namespace_index.get(namespace).copied())
                    .filter(|slot| seen.insert(*slot))
                    .collect()
            }
        }
    }

    /// Select a rule matching `test` using the configured default strategy
    pub fn select_default(
        &mut self,
        test: &mut KnowledgeElement,
        scope: impl Into<Scope>,
    ) -> SiftResult<Selection> {
        let strategy = self.config.default_strategy;
        self.select(test, scope, strategy)
    }

    /// Score every rule in `scope` against `test` and pick a winner per `strategy`.
    ///
    /// Captures produced by each matching rule are committed to `test` as the scan
    /// reaches it. An empty or wholly non-matching search space yields no rule and a
    /// score of `0`.
    #[instrument(skip(self, test, scope, strategy), fields(strategy = %strategy))]
    pub fn select(
        &mut self,
        test: &mut KnowledgeElement,
        scope: impl Into<Scope>,
        strategy: SelectionStrategy,
    ) -> SiftResult<Selection> {
        let scope = scope.into();
        let mut best_score = 0.0;
        let mut first_match = None;
        let mut candidates: Vec<Arc<Rule>> = Vec::new();

        'scan: for slot in self.search_space(&scope) {
            let (namespace, rules) = &self.buckets[slot];
            trace!(
                namespace = namespace.as_str(),
                rule_count = rules.len(),
                "Scanning namespace"
            );

            for rule in rules {
                let outcome = rule.score(test);
                if !outcome.is_match() {
                    continue;
                }
                let score = test.commit(outcome);
                trace!(rule_id = %rule.id(), score, "Rule matched");

                match strategy {
                    SelectionStrategy::FirstMatch => {
                        best_score = score;
                        first_match = Some(Arc::clone(rule));
                        break 'scan;
                    }
                    SelectionStrategy::BestMatches => {
                        if score > best_score {
                            best_score = score;
                            candidates.clear();
                            candidates.push(Arc::clone(rule));
                        } else if score == best_score {
                            candidates.push(Arc::clone(rule));
                        }
                    }
                    SelectionStrategy::AllMatches => {
                        if score > best_score {
                            best_score = score;
                        }
                        candidates.push(Arc::clone(rule));
                    }
                }
            }
        }

        let selection = if strategy.collects_candidates() {
            let rule = self.resolve_tie(&candidates)?;
            Selection { rule, score: best_score, candidates: Some(candidates) }
        } else {
            Selection { rule: first_match, score: best_score, candidates: None }
        };

        debug!(
            selected = ?selection.rule.as_ref().map(|rule| rule.id().as_str()),
            score = selection.score,
            candidate_count = ?selection.candidates.as_ref().map(Vec::len),
            "Selection completed"
        );
        Ok(selection)
    }

    /// Pick one rule from the candidate set, weighting only when some weight differs
    /// from the default
    fn resolve_tie(&mut self, candidates: &[Arc<Rule>]) -> SiftResult<Option<Arc<Rule>>> {
        match candidates {
            [] => Ok(None),
            [only] => Ok(Some(Arc::clone(only))),
            _ if candidates.iter().all(|rule| rule.weight() == DEFAULT_WEIGHT) => {
                Ok(candidates.choose(&mut self.rng).cloned())
            }
            _ => {
                let distribution = WeightedIndex::new(candidates.iter().map(|rule| rule.weight()))
                    .map_err(|err| SiftError::Selection { message: err.to_string() })?;
                Ok(Some(Arc::clone(&candidates[distribution.sample(&mut self.rng)])))
            }
        }
    }
}
