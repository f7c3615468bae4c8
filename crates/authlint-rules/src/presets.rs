//! Rule sets and lookup by name.

use authlint_core::{ConventionsConfig, RuleBox};

use crate::{no_ctx_identity_lookup, no_raw_convex_function, NoCtxIdentityLookup, NoRawConvexFunction};

/// Returns every built-in rule configured with `conventions`.
#[must_use]
pub fn all_rules(conventions: &ConventionsConfig) -> Vec<RuleBox> {
    vec![
        Box::new(NoRawConvexFunction::from_conventions(conventions)),
        Box::new(NoCtxIdentityLookup::from_conventions(conventions)),
    ]
}

/// Looks up a built-in rule by name or code.
///
/// Matching is case-insensitive, so `auth001` and `AUTH001` both work.
#[must_use]
pub fn rule_by_name(name_or_code: &str, conventions: &ConventionsConfig) -> Option<RuleBox> {
    let key = name_or_code.trim();
    let is = |name: &str, code: &str| key.eq_ignore_ascii_case(name) || key.eq_ignore_ascii_case(code);

    if is(no_raw_convex_function::NAME, no_raw_convex_function::CODE) {
        Some(Box::new(NoRawConvexFunction::from_conventions(conventions)))
    } else if is(no_ctx_identity_lookup::NAME, no_ctx_identity_lookup::CODE) {
        Some(Box::new(NoCtxIdentityLookup::from_conventions(conventions)))
    } else {
        None
    }
}
