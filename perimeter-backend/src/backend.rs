use async_trait::async_trait;

use crate::error::BackendError;
use crate::rule::FirewallRule;

/// Storage capability for provider firewall rules, keyed by project.
///
/// The provider API is the system of record; implementations hold no state of
/// their own beyond what the provider (or the in-memory stand-in) holds.
#[async_trait]
pub trait RuleBackend: Send + Sync {
    async fn list_all(&self, project: &str) -> Result<Vec<FirewallRule>, BackendError>;
    async fn get(&self, project: &str, name: &str) -> Result<FirewallRule, BackendError>;
    async fn create(&self, project: &str, rule: FirewallRule)
    -> Result<FirewallRule, BackendError>;
    async fn update(&self, project: &str, rule: FirewallRule)
    -> Result<FirewallRule, BackendError>;
    async fn delete(&self, project: &str, name: &str) -> Result<(), BackendError>;
}
