use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::backend::RuleBackend;
use crate::error::BackendError;
use crate::rule::FirewallRule;

/// In-memory rule backend, keyed by project. Used as the test stand-in for
/// the provider API and as a development backend.
///
/// Listing an unknown project is an error, but creating into one implicitly
/// creates the project entry, matching the provider's behavior of rejecting
/// reads against projects the caller cannot see.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    projects: Mutex<HashMap<String, Vec<FirewallRule>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every operation either completes its mutation or leaves the map
    /// untouched, so a poisoned lock still guards consistent data.
    fn projects(&self) -> MutexGuard<'_, HashMap<String, Vec<FirewallRule>>> {
        self.projects.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed a project with rules, creating the project entry if needed.
    pub fn seed(&self, project: &str, rules: impl IntoIterator<Item = FirewallRule>) {
        let mut projects = self.projects();
        projects
            .entry(project.to_string())
            .or_default()
            .extend(rules);
    }

    /// Number of rules currently held for a project, if it exists.
    pub fn rule_count(&self, project: &str) -> Option<usize> {
        let projects = self.projects();
        projects.get(project).map(Vec::len)
    }
}

#[async_trait]
impl RuleBackend for MemoryBackend {
    async fn list_all(&self, project: &str) -> Result<Vec<FirewallRule>, BackendError> {
        let projects = self.projects();
        projects
            .get(project)
            .cloned()
            .ok_or_else(|| BackendError::Provider(format!("project not found: {project}")))
    }

    async fn get(&self, project: &str, name: &str) -> Result<FirewallRule, BackendError> {
        let projects = self.projects();
        projects
            .get(project)
            .and_then(|rules| rules.iter().find(|rule| rule.name == name))
            .cloned()
            .ok_or_else(|| BackendError::NotFound(name.to_string()))
    }

    async fn create(
        &self,
        project: &str,
        rule: FirewallRule,
    ) -> Result<FirewallRule, BackendError> {
        let mut projects = self.projects();
        let rules = projects.entry(project.to_string()).or_default();
        if rules.iter().any(|existing| existing.name == rule.name) {
            return Err(BackendError::AlreadyExists(rule.name));
        }
        rules.push(rule.clone());
        Ok(rule)
    }

    async fn update(
        &self,
        project: &str,
        rule: FirewallRule,
    ) -> Result<FirewallRule, BackendError> {
        let mut projects = self.projects();
        let existing = projects
            .get_mut(project)
            .and_then(|rules| rules.iter_mut().find(|existing| existing.name == rule.name))
            .ok_or_else(|| BackendError::NotFound(rule.name.clone()))?;
        *existing = rule.clone();
        Ok(rule)
    }

    async fn delete(&self, project: &str, name: &str) -> Result<(), BackendError> {
        let mut projects = self.projects();
        let rules = projects
            .get_mut(project)
            .ok_or_else(|| BackendError::NotFound(name.to_string()))?;
        let position = rules
            .iter()
            .position(|rule| rule.name == name)
            .ok_or_else(|| BackendError::NotFound(name.to_string()))?;
        rules.remove(position);
        Ok(())
    }
}
