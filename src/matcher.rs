//! Pattern Matcher
//!
//! Evaluates a single text-field condition against a stored value.
//! Three condition forms exist: `*` (or empty) matches anything, a value
//! ending in `*` matches any stored value starting with the part before
//! the `*`, and anything else matches by exact, case-sensitive equality.
//!
//! Leading and infix wildcards are deliberately unsupported.

/// Evaluate a condition against a stored text value
pub fn matches(stored: &str, condition: &str) -> bool {
    if condition.is_empty() || condition == "*" {
        return true;
    }

    if let Some(prefix) = condition.strip_suffix('*') {
        return stored.starts_with(prefix);
    }

    stored == condition
}

/// Check whether a condition constrains anything at all
pub fn is_wildcard(condition: &str) -> bool {
    condition.is_empty() || condition == "*"
}
