use std::sync::Arc;

use tracing::{debug, error};

use perimeter_backend::{FirewallRule, RuleBackend};

use crate::error::{BatchError, RuleError, RuleFailure};
use crate::model::{Scope, ScopedRule, ScopedRuleSet};
use crate::naming;

/// Orchestrates per-scope rule operations against a pluggable backend.
///
/// Batch operations are sequential and best-effort: every rule is attempted
/// exactly once in input order, there is no rollback, and the aggregate error
/// names every rule that failed. The backend offers no multi-object
/// transaction primitive; the reconciler's only promise is that one rule's
/// failure never hides another's.
pub struct RuleService {
    backend: Arc<dyn RuleBackend>,
}

impl RuleService {
    pub fn new(backend: Arc<dyn RuleBackend>) -> Self {
        Self { backend }
    }

    /// All rules belonging to the scope, as of one backend listing.
    pub async fn list(&self, scope: &Scope) -> Result<ScopedRuleSet, RuleError> {
        debug!(project = %scope.project, "listing rules for scope");
        let rules = self.backend.list_all(&scope.project).await?;
        Ok(ScopedRuleSet::new(
            scope,
            naming::filter_by_scope(scope, rules),
        ))
    }

    /// Create every desired rule, independently and in input order. Any
    /// per-rule failure makes the whole batch fail with an aggregate that
    /// names each failed rule; the successes are not rolled back.
    pub async fn create_batch(
        &self,
        scope: &Scope,
        rules: Vec<ScopedRule>,
    ) -> Result<ScopedRuleSet, RuleError> {
        let mut created = Vec::new();
        let mut failures = Vec::new();
        for scoped in rules {
            let mut rule = scoped.rule;
            rule.name = naming::provider_name(scope, &scoped.custom_name);
            debug!(project = %scope.project, name = %rule.name, "creating rule");
            match self.backend.create(&scope.project, rule).await {
                Ok(confirmed) => created.push(ScopedRule {
                    rule: confirmed,
                    custom_name: scoped.custom_name,
                }),
                Err(err) => failures.push(RuleFailure {
                    custom_name: scoped.custom_name,
                    error: err,
                }),
            }
        }
        if failures.is_empty() {
            Ok(ScopedRuleSet::new(scope, created))
        } else {
            Err(BatchError::new(failures).into())
        }
    }

    /// Discover the scope's current members, then delete each one. A listing
    /// failure aborts before any delete; per-rule delete failures are
    /// aggregated like `create_batch`. An empty scope deletes trivially.
    pub async fn delete_batch(&self, scope: &Scope) -> Result<(), RuleError> {
        let current = self.list(scope).await.map_err(|err| {
            error!(project = %scope.project, %err, "listing failed, no deletes attempted");
            err
        })?;
        let mut failures = Vec::new();
        for scoped in current.rules {
            debug!(project = %scope.project, name = %scoped.rule.name, "deleting rule");
            if let Err(err) = self.backend.delete(&scope.project, &scoped.rule.name).await {
                failures.push(RuleFailure {
                    custom_name: scoped.custom_name,
                    error: err,
                });
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(BatchError::new(failures).into())
        }
    }

    /// Create one named rule and return it as the backend confirmed it.
    pub async fn create_rule(
        &self,
        scope: &Scope,
        custom_name: &str,
        mut rule: FirewallRule,
    ) -> Result<ScopedRuleSet, RuleError> {
        rule.name = naming::provider_name(scope, custom_name);
        debug!(project = %scope.project, name = %rule.name, "creating rule");
        let confirmed = self.backend.create(&scope.project, rule).await?;
        Ok(self.single(scope, custom_name, confirmed))
    }

    /// Fetch one named rule; a missing rule surfaces the backend's not-found.
    pub async fn get_rule(
        &self,
        scope: &Scope,
        custom_name: &str,
    ) -> Result<ScopedRuleSet, RuleError> {
        let name = naming::provider_name(scope, custom_name);
        let rule = self.backend.get(&scope.project, &name).await?;
        Ok(self.single(scope, custom_name, rule))
    }

    /// Replace one named rule with the given definition.
    pub async fn update_rule(
        &self,
        scope: &Scope,
        custom_name: &str,
        mut rule: FirewallRule,
    ) -> Result<ScopedRuleSet, RuleError> {
        rule.name = naming::provider_name(scope, custom_name);
        debug!(project = %scope.project, name = %rule.name, "updating rule");
        let confirmed = self.backend.update(&scope.project, rule).await?;
        Ok(self.single(scope, custom_name, confirmed))
    }

    /// Delete one named rule; deleting a rule that does not exist is a
    /// reported not-found, not a silent no-op.
    pub async fn delete_rule(&self, scope: &Scope, custom_name: &str) -> Result<(), RuleError> {
        let name = naming::provider_name(scope, custom_name);
        debug!(project = %scope.project, %name, "deleting rule");
        self.backend.delete(&scope.project, &name).await?;
        Ok(())
    }

    fn single(&self, scope: &Scope, custom_name: &str, rule: FirewallRule) -> ScopedRuleSet {
        ScopedRuleSet::new(
            scope,
            vec![ScopedRule {
                rule,
                custom_name: custom_name.to_string(),
            }],
        )
    }
}
