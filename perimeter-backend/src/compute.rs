use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use crate::backend::RuleBackend;
use crate::error::BackendError;
use crate::rule::FirewallRule;

const DEFAULT_BASE_URL: &str = "https://compute.googleapis.com/compute/v1";

#[derive(Debug, Clone)]
pub struct ComputeConfig {
    /// Base URL of the compute API, overridable for tests and emulators.
    pub base_url: String,
    /// Bearer token presented on every request. Acquiring and refreshing the
    /// token is the caller's concern.
    pub access_token: String,
}

impl ComputeConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: access_token.into(),
        }
    }
}

/// Rule backend speaking the provider's REST firewall API.
pub struct ComputeBackend {
    client: reqwest::Client,
    config: ComputeConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct FirewallListPage {
    items: Vec<FirewallRule>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct ProviderErrorBody {
    #[serde(default)]
    error: ProviderErrorDetail,
}

#[derive(Debug, Deserialize, Default)]
struct ProviderErrorDetail {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
}

impl ComputeBackend {
    pub fn new(config: ComputeConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn firewalls_url(&self, project: &str) -> String {
        format!(
            "{}/projects/{project}/global/firewalls",
            self.config.base_url
        )
    }

    fn firewall_url(&self, project: &str, name: &str) -> String {
        format!(
            "{}/projects/{project}/global/firewalls/{name}",
            self.config.base_url
        )
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, BackendError> {
        request
            .bearer_auth(&self.config.access_token)
            .send()
            .await
            .map_err(|err| BackendError::Provider(err.to_string()))
    }

    /// Read the response body and turn a non-success status into the typed
    /// error for it. Returns the raw body text on success.
    async fn check(&self, response: reqwest::Response) -> Result<String, BackendError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| BackendError::Provider(err.to_string()))?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(classify_error(status, &body))
        }
    }
}

/// Map a provider HTTP status and error body onto a `BackendError`. This is
/// the only place provider status codes are interpreted.
fn classify_error(status: StatusCode, body: &str) -> BackendError {
    let detail = serde_json::from_str::<ProviderErrorBody>(body)
        .map(|parsed| parsed.error)
        .unwrap_or_default();
    let message = if detail.message.is_empty() {
        format!("status {status}")
    } else {
        format!("code {} message '{}'", detail.code, detail.message)
    };
    match status {
        StatusCode::NOT_FOUND => BackendError::NotFound(message),
        StatusCode::CONFLICT => BackendError::AlreadyExists(message),
        _ => BackendError::Provider(message),
    }
}

#[async_trait]
impl RuleBackend for ComputeBackend {
    async fn list_all(&self, project: &str) -> Result<Vec<FirewallRule>, BackendError> {
        let mut rules = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut request = self.client.get(self.firewalls_url(project));
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }
            let response = self.send(request).await?;
            let body = self.check(response).await?;
            let page: FirewallListPage = serde_json::from_str(&body)
                .map_err(|err| BackendError::Provider(format!("malformed list response: {err}")))?;
            rules.extend(page.items);
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        debug!(project, count = rules.len(), "listed provider rules");
        Ok(rules)
    }

    async fn get(&self, project: &str, name: &str) -> Result<FirewallRule, BackendError> {
        let response = self.send(self.client.get(self.firewall_url(project, name))).await?;
        let body = self.check(response).await?;
        serde_json::from_str(&body)
            .map_err(|err| BackendError::Provider(format!("malformed rule response: {err}")))
    }

    async fn create(
        &self,
        project: &str,
        rule: FirewallRule,
    ) -> Result<FirewallRule, BackendError> {
        debug!(project, name = %rule.name, "creating provider rule");
        let request = self.client.post(self.firewalls_url(project)).json(&rule);
        let response = self.send(request).await?;
        self.check(response).await?;
        // Insert returns an operation, not the rule; re-fetch for the
        // confirmed state.
        self.get(project, &rule.name).await
    }

    async fn update(
        &self,
        project: &str,
        rule: FirewallRule,
    ) -> Result<FirewallRule, BackendError> {
        debug!(project, name = %rule.name, "updating provider rule");
        let request = self
            .client
            .patch(self.firewall_url(project, &rule.name))
            .json(&rule);
        let response = self.send(request).await?;
        self.check(response).await?;
        self.get(project, &rule.name).await
    }

    async fn delete(&self, project: &str, name: &str) -> Result<(), BackendError> {
        debug!(project, name, "deleting provider rule");
        let response = self
            .send(self.client.delete(self.firewall_url(project, name)))
            .await?;
        self.check(response).await?;
        Ok(())
    }
}
