//! Name-prefix partitioning of provider rules.
//!
//! Membership of a rule in a scope is determined purely by string prefix
//! matching on the rule name; there is no secondary index or tag. Any backend
//! rule whose name happens to share the prefix, whoever created it, belongs
//! to the scope. Hyphenated application names can therefore produce prefixes
//! that overlap across scopes; callers own their naming discipline.

use perimeter_backend::FirewallRule;

use crate::model::{Scope, ScopedRule};

/// The name prefix shared by every rule of the scope.
pub fn scope_prefix(scope: &Scope) -> String {
    format!("{}-{}-", scope.service_project, scope.application)
}

/// Flat provider name for a scope-local rule name.
pub fn provider_name(scope: &Scope, custom_name: &str) -> String {
    format!(
        "{}-{}-{}",
        scope.service_project, scope.application, custom_name
    )
}

/// Scope-local name of a provider rule, or `None` when the rule does not
/// belong to the scope. Never errors.
pub fn custom_name<'a>(scope: &Scope, provider_name: &'a str) -> Option<&'a str> {
    provider_name.strip_prefix(&scope_prefix(scope))
}

/// Keep the rules belonging to the scope, in input order.
pub fn filter_by_scope(scope: &Scope, rules: Vec<FirewallRule>) -> Vec<ScopedRule> {
    rules
        .into_iter()
        .filter_map(|rule| {
            let custom = custom_name(scope, &rule.name)?.to_string();
            Some(ScopedRule {
                rule,
                custom_name: custom,
            })
        })
        .collect()
}
