//! Common types and utilities for the EC2 query API

use serde::Deserialize;

/// API version sent with every action
pub const API_VERSION: &str = "2016-11-15";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorResponse {
    #[serde(default)]
    pub errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorEntry {
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// Form parameters for a single action.
///
/// Lists are flattened the way the query protocol expects: `Name.1`, `Name.2`
/// for scalars and `Name.1.Field` for structures, always 1-based.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    params: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn add_optional<K: Into<String>, V: ToString>(mut self, key: K, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.params.push((key.into(), v.to_string()));
        }
        self
    }

    pub fn add_list<V: ToString>(mut self, prefix: &str, values: &[V]) -> Self {
        for (idx, value) in values.iter().enumerate() {
            self.params
                .push((format!("{}.{}", prefix, idx + 1), value.to_string()));
        }
        self
    }

    /// Adds `prefix.N.field` entries for the N-th structure in a list
    pub fn add_member<V: ToString>(self, prefix: &str, position: usize, field: &str, value: V) -> Self {
        self.add(format!("{}.{}.{}", prefix, position + 1, field), value)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// The full form body for `action`
    pub fn into_form(self, action: &str) -> Vec<(String, String)> {
        let mut form = Vec::with_capacity(self.params.len() + 2);
        form.push(("Action".to_string(), action.to_string()));
        form.push(("Version".to_string(), API_VERSION.to_string()));
        form.extend(self.params);
        form
    }
}

/// Body of actions that only acknowledge the request
#[derive(Debug, Deserialize)]
pub struct ReturnResponse {
    #[serde(rename = "Return", default = "default_return")]
    pub r#return: bool,
}

fn default_return() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_are_one_based() {
        let params = QueryParams::new()
            .add("SubnetId", "subnet-1")
            .add_list("SecurityGroupId", &["sg-1", "sg-2"])
            .add_member("PrivateIpAddresses", 0, "Primary", true);

        assert_eq!(params.get("SecurityGroupId.1"), Some("sg-1"));
        assert_eq!(params.get("SecurityGroupId.2"), Some("sg-2"));
        assert_eq!(params.get("PrivateIpAddresses.1.Primary"), Some("true"));
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn optional_values_are_skipped_when_none() {
        let params = QueryParams::new()
            .add_optional("Description", None::<String>)
            .add_optional("Force", Some(true));
        assert_eq!(params.get("Description"), None);
        assert_eq!(params.get("Force"), Some("true"));
    }

    #[test]
    fn form_starts_with_action_and_version() {
        let form = QueryParams::new()
            .add("NetworkInterfaceId", "eni-1")
            .into_form("DeleteNetworkInterface");
        assert_eq!(form[0], ("Action".to_string(), "DeleteNetworkInterface".to_string()));
        assert_eq!(form[1], ("Version".to_string(), API_VERSION.to_string()));
        assert_eq!(form[2], ("NetworkInterfaceId".to_string(), "eni-1".to_string()));
    }

    #[test]
    fn error_response_parses_codes() {
        let body = r#"{"Errors":[{"Code":"InvalidNetworkInterfaceID.NotFound","Message":"gone"}],"RequestID":"r-1"}"#;
        let parsed: ErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].code, "InvalidNetworkInterfaceID.NotFound");
        assert_eq!(parsed.errors[0].message, "gone");
    }
}
