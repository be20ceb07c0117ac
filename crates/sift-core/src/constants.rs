/// Fixed values used by the matcher, the action grammar and the rule base.
///
/// Field match qualities
pub mod quality {
    /// Exact equality of strings or numbers
    pub const EXACT: f64 = 1.0;

    /// Numbers that differ by less than [`FLOAT_TOLERANCE`]
    pub const NEAR_NUMERIC: f64 = 0.9;

    /// Regex (`re/...`) and extract-match (`$*`, `$*$`) hits
    pub const PATTERN: f64 = 0.75;

    /// The bare `*` wildcard, weaker than any textual partial match
    pub const WILDCARD: f64 = 0.25;

    /// Absolute tolerance for numeric near-equality
    pub const FLOAT_TOLERANCE: f64 = 1e-6;
}

/// Element scoring
pub mod scoring {
    /// Added per matched field on top of its quality
    pub const FIELD_BASE_SCORE: f64 = 100.0;
}

/// Markers recognised in test expressions and actions
pub mod markers {
    /// Field names starting with this prefix are reserved for engine bookkeeping
    pub const RESERVED_PREFIX: &str = "__";

    /// Wildcard / star marker
    pub const STAR: char = '*';

    /// Regex test prefix
    pub const REGEX_PREFIX: &str = "re/";

    /// Non-whitespace capture group
    pub const EXTRACT_TOKEN: &str = "$*$";

    /// Greedy capture group
    pub const EXTRACT_GREEDY: &str = "$*";

    /// Separates an extract-match expression from its capture name
    pub const CAPTURE_NAME_SEPARATOR: &str = "/@";

    /// Capture name used when no `/@name` suffix is given
    pub const DEFAULT_CAPTURE_NAME: &str = "match";

    /// Action key forcing the write into long-term memory
    pub const LONG_TERM: char = '@';

    /// Action value resolved as a reference into memory
    pub const REFERENCE: char = '$';

    /// Action key or value invoking an artifact
    pub const ARTIFACT: char = '!';
}

/// Rule defaults
pub mod rules {
    /// Namespace used when a rule is created without one
    pub const DEFAULT_NAMESPACE: &str = "_";

    /// Weight used when a rule is created without one
    pub const DEFAULT_WEIGHT: f64 = 1.0;

    /// Id category for rules
    pub const RULE_ID_CATEGORY: &str = "r-";
}

/// Compiled-pattern cache
pub mod cache {
    /// Number of compiled patterns kept before the cache is reset
    pub const PATTERN_CACHE_CAPACITY: usize = 1024;
}
