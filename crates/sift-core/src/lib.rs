#![deny(warnings)]
#![allow(missing_docs)]
//! Core functionality for the Sift rule-selection engine.
//!
//! Sift scores a collection of rules by how well their conditions fuzzily match a set
//! of observed facts, selects a winner with a configurable strategy, and executes the
//! winner's actions against working memory.
//!
//! ```
//! use sift_core::{Action, KnowledgeElement, Rule, RuleBase, SelectionStrategy};
//!
//! # fn main() -> sift_core::SiftResult<()> {
//! let mut base = RuleBase::with_seed(42);
//! base.add_new(
//!     Rule::builder(KnowledgeElement::from_pairs([("target", "*.openai.com")])?)
//!         .action(Action::pair("destination", "ollama"))
//!         .namespace("level-1"),
//! )?;
//!
//! let mut session = KnowledgeElement::from_pairs([("target", "api.openai.com")])?;
//! let selection = base.select(&mut session, "level-1", SelectionStrategy::BestMatches)?;
//! if let Some(rule) = selection.rule {
//!     rule.execute(&mut session, None, None)?;
//! }
//! assert_eq!(session.get("destination"), Some(&sift_core::FactValue::from("ollama")));
//! # Ok(())
//! # }
//! ```

/// Rule action grammar and the artifact collaborator seam
pub mod action;
/// Engine configuration (TOML and environment)
pub mod config;
/// Constants shared by matcher, actions and rule base
pub mod constants;
/// Knowledge elements and element scoring
pub mod element;
/// Error types
pub mod error;
/// Per-category identifier generation
pub mod ids;
/// Single-field fuzzy matcher
pub mod matcher;
/// Process-wide cache of compiled patterns
mod pattern_cache;
/// Rules and the rule builder
pub mod rule;
/// Namespace-indexed rule storage and selection
pub mod rule_base;
/// Selection strategies
pub mod strategy;

pub use action::{Action, Artifacts, FnArtifacts, NoopArtifacts};
pub use config::EngineConfig;
pub use element::{KnowledgeElement, MatchOutcome};
pub use error::{SiftError, SiftResult};
pub use ids::{IdGenerator, RuleId};
pub use matcher::{FieldMatch, match_field};
pub use rule::{Rule, RuleBuilder};
pub use rule_base::{RuleBase, Scope, Selection};
pub use sift_types::FactValue;
pub use strategy::SelectionStrategy;
