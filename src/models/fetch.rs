use std::fmt;

use serde::{Deserialize, Serialize};

/// Proxy id as sent by clients, either `3` or `"3"`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ProxyId {
    Index(i64),
    Text(String),
}

impl ProxyId {
    /// Numeric registry index, if the id is one
    pub fn index(&self) -> Option<i64> {
        match self {
            ProxyId::Index(id) => Some(*id),
            ProxyId::Text(text) => text.trim().parse().ok(),
        }
    }
}

impl fmt::Display for ProxyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyId::Index(id) => write!(f, "{}", id),
            ProxyId::Text(text) => write!(f, "{:?}", text),
        }
    }
}

/// Body of `POST /api/fetch`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchPayload {
    pub url: Option<String>,
    pub proxy_id: Option<ProxyId>,
}

/// Body of `POST /api/proxy/test`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyTestPayload {
    pub proxy_id: Option<ProxyId>,
}

/// One fetch job handed to the orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub target_url: String,
    pub proxy_id: i64,
}

impl FetchRequest {
    pub fn new(target_url: impl Into<String>, proxy_id: i64) -> Self {
        Self {
            target_url: target_url.into(),
            proxy_id,
        }
    }
}

/// Successful fetch as returned to the caller
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchSuccess {
    pub success: bool,
    pub status_code: u16,
    pub body: String,
    pub url: String,
    pub proxy: String,
}

/// Successful proxy probe
#[derive(Debug, Clone, Serialize)]
pub struct ProbeSuccess {
    pub success: bool,
    pub message: String,
    pub proxy: String,
}

/// Structured failure returned for every categorized error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureBody {
    pub success: bool,
    pub error: String,
    pub details: String,
    pub suggestion: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_payload_uses_camel_case() {
        let payload: FetchPayload =
            serde_json::from_str(r#"{"url":"http://example.com/","proxyId":3}"#).unwrap();
        assert_eq!(payload.url.as_deref(), Some("http://example.com/"));
        assert_eq!(payload.proxy_id, Some(ProxyId::Index(3)));

        let empty: FetchPayload = serde_json::from_str("{}").unwrap();
        assert!(empty.url.is_none());
        assert!(empty.proxy_id.is_none());
    }

    #[test]
    fn test_proxy_id_accepts_numbers_and_numeric_strings() {
        let payload: ProxyTestPayload = serde_json::from_str(r#"{"proxyId":"3"}"#).unwrap();
        let id = payload.proxy_id.unwrap();
        assert_eq!(id, ProxyId::Text("3".to_string()));
        assert_eq!(id.index(), Some(3));

        assert_eq!(ProxyId::Index(-1).index(), Some(-1));
        assert_eq!(ProxyId::Text(" 7 ".to_string()).index(), Some(7));
        assert_eq!(ProxyId::Text("abc".to_string()).index(), None);
        assert_eq!(ProxyId::Text("abc".to_string()).to_string(), "\"abc\"");
    }

    #[test]
    fn test_fetch_success_serialization() {
        let success = FetchSuccess {
            success: true,
            status_code: 200,
            body: "Hello".to_string(),
            url: "http://example.com/".to_string(),
            proxy: "192.252.210.233:4145".to_string(),
        };
        let json = serde_json::to_value(&success).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["statusCode"], 200);
        assert_eq!(json["body"], "Hello");
        assert_eq!(json["proxy"], "192.252.210.233:4145");
    }
}
