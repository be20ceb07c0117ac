//! Compiled Pattern Cache
//!
//! Regex (`re/...`) and extract-match test expressions are compiled the first time
//! they are evaluated and kept in a bounded, process-wide cache keyed by the final
//! regex source. Rule conditions are evaluated against every element passed to
//! `select`, so without the cache each selection would recompile every pattern.
//!
//! Malformed patterns are cached as `None` so the compile error is logged once and
//! every later evaluation is an immediate "no match".

use crate::constants::cache::PATTERN_CACHE_CAPACITY;
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};
use tracing::{trace, warn};

static PATTERN_CACHE: OnceLock<Mutex<PatternCache>> = OnceLock::new();

/// Bounded map from regex source to its compiled form
#[derive(Debug, Default)]
pub(crate) struct PatternCache {
    patterns: HashMap<String, Option<Regex>>,
    hits: u64,
    misses: u64,
}

impl PatternCache {
    /// Return the compiled pattern, compiling and caching it on first use
    pub(crate) fn get_or_compile(&mut self, source: &str) -> Option<Regex> {
        if let Some(compiled) = self.patterns.get(source) {
            self.hits += 1;
            return compiled.clone();
        }

        self.misses += 1;
        let compiled = match Regex::new(source) {
            Ok(regex) => Some(regex),
            Err(err) => {
                warn!(pattern = source, error = %err, "Malformed pattern treated as no match");
                None
            }
        };

        if self.patterns.len() >= PATTERN_CACHE_CAPACITY {
            trace!(
                entries = self.patterns.len(),
                hits = self.hits,
                misses = self.misses,
                "Pattern cache full, resetting"
            );
            self.patterns.clear();
        }
        self.patterns.insert(source.to_string(), compiled.clone());
        compiled
    }
}

fn global() -> &'static Mutex<PatternCache> {
    PATTERN_CACHE.get_or_init(|| Mutex::new(PatternCache::default()))
}

/// Compile `source` through the process-wide cache.
///
/// A poisoned lock only means another thread panicked mid-insert; the map itself is
/// still usable, so the guard is recovered instead of propagating the panic.
pub(crate) fn compile(source: &str) -> Option<Regex> {
    let mut cache = global().lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    cache.get_or_compile(source)
}
