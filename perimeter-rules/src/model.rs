use serde::{Deserialize, Serialize};

use perimeter_backend::FirewallRule;

/// The triple that partitions provider rules into logical owners. `project`
/// names the backend namespace; `service_project` and `application` together
/// form the name prefix shared by every rule of one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub project: String,
    pub service_project: String,
    pub application: String,
}

impl Scope {
    pub fn new(
        project: impl Into<String>,
        service_project: impl Into<String>,
        application: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            service_project: service_project.into(),
            application: application.into(),
        }
    }
}

/// A provider rule together with its scope-local name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopedRule {
    pub rule: FirewallRule,
    pub custom_name: String,
}

/// One application's view of the provider state: a scope plus the rules whose
/// names carry the scope's prefix. Built fresh per request, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopedRuleSet {
    pub project: String,
    pub service_project: String,
    pub application: String,
    #[serde(rename = "data")]
    pub rules: Vec<ScopedRule>,
}

impl ScopedRuleSet {
    pub fn new(scope: &Scope, rules: Vec<ScopedRule>) -> Self {
        Self {
            project: scope.project.clone(),
            service_project: scope.service_project.clone(),
            application: scope.application.clone(),
            rules,
        }
    }
}

#[cfg(test)]
mod tests {
    use perimeter_backend::FirewallRule;

    use super::{Scope, ScopedRule, ScopedRuleSet};

    #[test]
    fn rule_set_serializes_rules_under_data() {
        let scope = Scope::new("host", "svc", "app");
        let set = ScopedRuleSet::new(
            &scope,
            vec![ScopedRule {
                rule: FirewallRule::named("svc-app-allow-ssh"),
                custom_name: "allow-ssh".to_string(),
            }],
        );

        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["project"], "host");
        assert_eq!(json["service_project"], "svc");
        assert_eq!(json["data"][0]["custom_name"], "allow-ssh");
        assert_eq!(json["data"][0]["rule"]["name"], "svc-app-allow-ssh");
    }
}
