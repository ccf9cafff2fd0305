use serde::{Deserialize, Serialize};

/// A provider-level firewall rule. Field names follow the provider's JSON
/// representation; only `name` carries meaning for scoping, the rest is
/// opaque payload passed through to the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FirewallRule {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub network: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub direction: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub source_ranges: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub source_tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub target_tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<FirewallAllowed>,
}

/// One allowed protocol/port entry of a firewall rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirewallAllowed {
    #[serde(rename = "IPProtocol")]
    pub ip_protocol: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
}

impl FirewallRule {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FirewallAllowed, FirewallRule};

    #[test]
    fn serializes_provider_field_names() {
        let rule = FirewallRule {
            name: "web-allow-https".to_string(),
            network: "global/networks/default".to_string(),
            source_ranges: vec!["0.0.0.0/0".to_string()],
            allowed: vec![FirewallAllowed {
                ip_protocol: "TCP".to_string(),
                ports: vec!["443".to_string()],
            }],
            ..FirewallRule::default()
        };

        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["name"], "web-allow-https");
        assert_eq!(json["sourceRanges"][0], "0.0.0.0/0");
        assert_eq!(json["allowed"][0]["IPProtocol"], "TCP");
        assert!(json.get("description").is_none());
    }

    #[test]
    fn deserializes_with_missing_fields() {
        let rule: FirewallRule = serde_json::from_str(r#"{"name":"only-a-name"}"#).unwrap();
        assert_eq!(rule.name, "only-a-name");
        assert!(rule.allowed.is_empty());
        assert!(rule.priority.is_none());
    }
}
