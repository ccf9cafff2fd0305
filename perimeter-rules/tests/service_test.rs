use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use async_trait::async_trait;

use perimeter_backend::{
    BackendError, FirewallAllowed, FirewallRule, MemoryBackend, RuleBackend,
};
use perimeter_rules::{RuleError, RuleService, Scope, ScopedRule};

fn allow_tcp(name: &str, ports: &[&str]) -> FirewallRule {
    FirewallRule {
        name: name.to_string(),
        network: "global/networks/default".to_string(),
        allowed: vec![FirewallAllowed {
            ip_protocol: "TCP".to_string(),
            ports: ports.iter().map(ToString::to_string).collect(),
        }],
        ..FirewallRule::default()
    }
}

fn service_with_backend() -> (RuleService, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::new());
    (RuleService::new(backend.clone()), backend)
}

/// Backend double that refuses to delete one pinned rule name, recording
/// every delete attempt.
struct StuckRuleBackend {
    rules: Vec<FirewallRule>,
    stuck: String,
    delete_attempts: Mutex<Vec<String>>,
}

impl StuckRuleBackend {
    fn new(rules: Vec<FirewallRule>, stuck: &str) -> Arc<Self> {
        Arc::new(Self {
            rules,
            stuck: stuck.to_string(),
            delete_attempts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl RuleBackend for StuckRuleBackend {
    async fn list_all(&self, _project: &str) -> Result<Vec<FirewallRule>, BackendError> {
        Ok(self.rules.clone())
    }

    async fn get(&self, _project: &str, name: &str) -> Result<FirewallRule, BackendError> {
        Err(BackendError::NotFound(name.to_string()))
    }

    async fn create(
        &self,
        _project: &str,
        rule: FirewallRule,
    ) -> Result<FirewallRule, BackendError> {
        Ok(rule)
    }

    async fn update(
        &self,
        _project: &str,
        rule: FirewallRule,
    ) -> Result<FirewallRule, BackendError> {
        Ok(rule)
    }

    async fn delete(&self, _project: &str, name: &str) -> Result<(), BackendError> {
        self.delete_attempts.lock().unwrap().push(name.to_string());
        if name == self.stuck {
            Err(BackendError::Provider(format!(
                "rule {name} is referenced by another resource"
            )))
        } else {
            Ok(())
        }
    }
}

#[tokio::test]
async fn list_returns_only_the_scopes_rules() {
    let (service, backend) = service_with_backend();
    backend.seed(
        "kubernetes-host-project",
        [
            allow_tcp("kubernetes-demo-the-hard-way-allow-external", &["22", "6443"]),
            allow_tcp("kubernetes-demo-the-easy-way-allow-external", &["22", "6443"]),
            allow_tcp("kubernetes-training-the-hard-way-allow-external", &["22"]),
            allow_tcp("default-allow-icmp", &[]),
        ],
    );

    let scope = Scope::new("kubernetes-host-project", "kubernetes-demo", "the-hard-way");
    let set = service.list(&scope).await.unwrap();

    assert_eq!(set.rules.len(), 1);
    assert_eq!(set.rules[0].custom_name, "allow-external");
    assert_eq!(
        set.rules[0].rule.name,
        "kubernetes-demo-the-hard-way-allow-external"
    );
}

#[tokio::test]
async fn list_unknown_project_surfaces_backend_error() {
    let (service, _backend) = service_with_backend();
    let scope = Scope::new("non-existing-project", "kubernetes-demo", "the-hard-way");
    let err = service.list(&scope).await.unwrap_err();
    assert_matches!(err, RuleError::Backend(_));
}

#[tokio::test]
async fn create_batch_encodes_names_and_returns_confirmed_rules() {
    let (service, backend) = service_with_backend();
    let scope = Scope::new("dummy-project", "dummy-service_project", "dummy-application");

    let desired = vec![ScopedRule {
        rule: allow_tcp("remote", &["22", "3389"]),
        custom_name: "allow-tcp-22-3389".to_string(),
    }];
    let set = service.create_batch(&scope, desired).await.unwrap();

    assert_eq!(set.rules.len(), 1);
    assert_eq!(
        set.rules[0].rule.name,
        "dummy-service_project-dummy-application-allow-tcp-22-3389"
    );
    assert_eq!(backend.rule_count("dummy-project"), Some(1));
}

#[tokio::test]
async fn create_batch_attempts_every_rule_and_enumerates_failures() {
    let (service, backend) = service_with_backend();
    let scope = Scope::new("host", "svc", "app");
    // The second of three desired rules already exists.
    backend.seed("host", [allow_tcp("svc-app-allow-b", &["443"])]);

    let desired = vec![
        ScopedRule {
            rule: allow_tcp("a", &["80"]),
            custom_name: "allow-a".to_string(),
        },
        ScopedRule {
            rule: allow_tcp("b", &["443"]),
            custom_name: "allow-b".to_string(),
        },
        ScopedRule {
            rule: allow_tcp("c", &["8080"]),
            custom_name: "allow-c".to_string(),
        },
    ];
    let err = service.create_batch(&scope, desired).await.unwrap_err();

    assert_matches!(err, RuleError::Batch(batch) => {
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].custom_name, "allow-b");
    });
    // The non-conflicting rules landed despite the failure.
    backend.get("host", "svc-app-allow-a").await.unwrap();
    backend.get("host", "svc-app-allow-c").await.unwrap();
    assert_eq!(backend.rule_count("host"), Some(3));
}

#[tokio::test]
async fn delete_batch_on_empty_scope_succeeds() {
    let (service, backend) = service_with_backend();
    backend.seed("host", [allow_tcp("other-app-allow-all", &["80"])]);

    let scope = Scope::new("host", "svc", "app");
    service.delete_batch(&scope).await.unwrap();
    assert_eq!(backend.rule_count("host"), Some(1));
}

#[tokio::test]
async fn delete_batch_removes_only_the_scopes_rules() {
    let (service, backend) = service_with_backend();
    backend.seed(
        "nginx-host-project",
        [
            allow_tcp("nginx-demo-front-allow-publicly", &["80", "443"]),
            allow_tcp("nginx-demo-front-allow-admin", &["8443"]),
            allow_tcp("nginx-demo-back-allow-publicly", &["80", "443"]),
        ],
    );

    let scope = Scope::new("nginx-host-project", "nginx-demo", "front");
    service.delete_batch(&scope).await.unwrap();

    let front = service.list(&scope).await.unwrap();
    assert!(front.rules.is_empty());

    let back_scope = Scope::new("nginx-host-project", "nginx-demo", "back");
    let back = service.list(&back_scope).await.unwrap();
    assert_eq!(back.rules.len(), 1);
    assert_eq!(back.rules[0].rule.allowed[0].ports, ["80", "443"]);
}

#[tokio::test]
async fn delete_batch_attempts_every_rule_and_enumerates_failures() {
    // The first discovered rule refuses to delete; the remaining deletes
    // must still be attempted, and the aggregate must name the refusal.
    let backend = StuckRuleBackend::new(
        vec![
            allow_tcp("svc-app-allow-a", &["80"]),
            allow_tcp("svc-app-allow-b", &["443"]),
            allow_tcp("svc-app-allow-c", &["8080"]),
        ],
        "svc-app-allow-a",
    );
    let service = RuleService::new(backend.clone());
    let scope = Scope::new("host", "svc", "app");

    let err = service.delete_batch(&scope).await.unwrap_err();
    assert_matches!(err, RuleError::Batch(batch) => {
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].custom_name, "allow-a");
    });

    let attempts = backend.delete_attempts.lock().unwrap();
    assert_eq!(
        *attempts,
        ["svc-app-allow-a", "svc-app-allow-b", "svc-app-allow-c"]
    );
}

#[tokio::test]
async fn delete_batch_fails_fast_when_listing_fails() {
    let (service, _backend) = service_with_backend();
    let scope = Scope::new("non-existing-project", "svc", "app");
    let err = service.delete_batch(&scope).await.unwrap_err();
    assert_matches!(err, RuleError::Backend(_));
}

#[tokio::test]
async fn single_rule_roundtrip() {
    let (service, _backend) = service_with_backend();
    let scope = Scope::new("host", "svc", "app");

    service
        .create_rule(&scope, "allow-ssh", allow_tcp("ignored", &["22"]))
        .await
        .unwrap();

    let fetched = service.get_rule(&scope, "allow-ssh").await.unwrap();
    assert_eq!(fetched.rules[0].rule.name, "svc-app-allow-ssh");
    assert_eq!(fetched.rules[0].custom_name, "allow-ssh");

    let mut replacement = allow_tcp("ignored", &["22"]);
    replacement.description = "bastion only".to_string();
    let updated = service
        .update_rule(&scope, "allow-ssh", replacement)
        .await
        .unwrap();
    assert_eq!(updated.rules[0].rule.description, "bastion only");

    service.delete_rule(&scope, "allow-ssh").await.unwrap();
}

#[tokio::test]
async fn missing_single_rule_is_a_distinguishable_not_found() {
    let (service, backend) = service_with_backend();
    backend.seed("host", []);
    let scope = Scope::new("host", "svc", "app");

    let get_err = service.get_rule(&scope, "never-created").await.unwrap_err();
    assert!(get_err.is_not_found());

    let delete_err = service
        .delete_rule(&scope, "never-created")
        .await
        .unwrap_err();
    assert!(delete_err.is_not_found());

    let list_err = service
        .list(&Scope::new("nowhere", "svc", "app"))
        .await
        .unwrap_err();
    assert!(!list_err.is_not_found());
}
