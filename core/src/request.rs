//! Request descriptors.
//!
//! A `RequestDescriptor` names one remote operation: endpoint, method,
//! query parameters, optional JSON body, header overrides and an optional
//! timeout override. It is plain data until `ApiClient::build_request`
//! turns it into an `HttpRequest`.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::http::HttpMethod;

/// Scalar value of a query parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Bool(v) => write!(f, "{v}"),
            QueryValue::Int(v) => write!(f, "{v}"),
            QueryValue::Float(v) => write!(f, "{v}"),
            QueryValue::Str(v) => f.write_str(v),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(v: &str) -> Self {
        QueryValue::Str(v.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(v: String) -> Self {
        QueryValue::Str(v)
    }
}

impl From<bool> for QueryValue {
    fn from(v: bool) -> Self {
        QueryValue::Bool(v)
    }
}

impl From<f64> for QueryValue {
    fn from(v: f64) -> Self {
        QueryValue::Float(v)
    }
}

macro_rules! query_value_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for QueryValue {
            fn from(v: $t) -> Self {
                QueryValue::Int(v as i64)
            }
        })*
    };
}

query_value_from_int!(i32, i64, u8, u16, u32);

/// One remote call, described as data.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub endpoint: String,
    pub method: HttpMethod,
    /// Ordered parameters. `None` values are omitted from the URL.
    pub query: Vec<(String, Option<QueryValue>)>,
    pub body: Option<serde_json::Value>,
    pub headers: Vec<(String, String)>,
    /// Overrides `ClientConfig::timeout` for this call.
    pub timeout: Option<Duration>,
}

impl RequestDescriptor {
    pub fn new(method: HttpMethod, endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            method,
            query: Vec::new(),
            body: None,
            headers: Vec::new(),
            timeout: None,
        }
    }

    pub fn get(endpoint: &str) -> Self {
        Self::new(HttpMethod::Get, endpoint)
    }

    pub fn post(endpoint: &str) -> Self {
        Self::new(HttpMethod::Post, endpoint)
    }

    pub fn put(endpoint: &str) -> Self {
        Self::new(HttpMethod::Put, endpoint)
    }

    pub fn delete(endpoint: &str) -> Self {
        Self::new(HttpMethod::Delete, endpoint)
    }

    pub fn patch(endpoint: &str) -> Self {
        Self::new(HttpMethod::Patch, endpoint)
    }

    pub fn query(mut self, key: &str, value: impl Into<QueryValue>) -> Self {
        self.query.push((key.to_string(), Some(value.into())));
        self
    }

    /// Add a parameter that may be absent. Absent parameters never reach the URL.
    pub fn query_opt<V: Into<QueryValue>>(mut self, key: &str, value: Option<V>) -> Self {
        self.query.push((key.to_string(), value.map(Into::into)));
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Attach `payload` as the JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, payload: &T) -> Result<Self, ApiError> {
        let value =
            serde_json::to_value(payload).map_err(|e| ApiError::Serialization(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The parameters that will be transmitted, in order.
    pub fn defined_query(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.query
            .iter()
            .filter_map(|(k, v)| v.as_ref().map(|v| (k.as_str(), v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn query_values_render_as_plain_text() {
        assert_eq!(QueryValue::from(1).to_string(), "1");
        assert_eq!(QueryValue::from(true).to_string(), "true");
        assert_eq!(QueryValue::from(2.5).to_string(), "2.5");
        assert_eq!(QueryValue::from("TG").to_string(), "TG");
    }

    #[test]
    fn defined_query_skips_absent_values() {
        let desc = RequestDescriptor::get("/information")
            .query("action", "suppliers")
            .query_opt::<&str>("search", None)
            .query_opt("limit", Some(10));
        let defined: Vec<_> = desc.defined_query().map(|(k, _)| k).collect();
        assert_eq!(defined, vec!["action", "limit"]);
        assert_eq!(desc.query.len(), 3);
    }

    #[test]
    fn json_body_is_captured_at_construction() {
        let mut payload = BTreeMap::new();
        payload.insert("code", "TG");
        let desc = RequestDescriptor::post("/information").json(&payload).unwrap();
        assert_eq!(desc.body, Some(serde_json::json!({"code": "TG"})));
    }

    #[test]
    fn unserializable_payload_fails_at_construction() {
        let mut payload = BTreeMap::new();
        payload.insert(vec![1u8], "non-string key");
        let err = RequestDescriptor::post("/information").json(&payload).unwrap_err();
        assert!(matches!(err, ApiError::Serialization(_)));
    }

    #[test]
    fn query_value_deserializes_untagged() {
        let q: Vec<(String, QueryValue)> =
            serde_json::from_str(r#"[["action","suppliers"],["limit",1],["active",true]]"#).unwrap();
        assert_eq!(q[0].1, QueryValue::from("suppliers"));
        assert_eq!(q[1].1, QueryValue::Int(1));
        assert_eq!(q[2].1, QueryValue::Bool(true));
    }
}
