//! Sift Prelude
//!
//! This crate re-exports the most frequently used public items from the Sift
//! workspace (currently `sift-core` and `sift-types`). Down-stream applications can
//! depend on `sift-prelude` to avoid long import lists and to stay insulated from
//! internal module reshuffles.

#![deny(warnings)]
#![deny(missing_docs)]

// Re-export element, rule and selection types -------------------------------------------------

pub use sift_core::{
    // Actions and collaborators
    Action, Artifacts, FnArtifacts, NoopArtifacts,
    // Configuration and errors
    EngineConfig, SiftError, SiftResult,
    // Facts and matching
    KnowledgeElement, MatchOutcome,
    // Rules and selection
    Rule, RuleBase, RuleBuilder, RuleId, Scope, Selection, SelectionStrategy,
};

pub use sift_types::FactValue;
