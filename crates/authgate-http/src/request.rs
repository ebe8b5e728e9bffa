//! Request and response values exchanged with an [`HttpTransport`](crate::HttpTransport).

use std::fmt;

use authgate_interceptor::Intercept;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub const AUTHORIZATION: &str = "authorization";
pub const CONTENT_TYPE: &str = "content-type";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        })
    }
}

/// An outgoing request.
///
/// Requests are authenticated by default: the client attaches a bearer
/// token and reports a 401 to the interceptor. [`public`](Self::public)
/// and [`handle_unauthorized_locally`](Self::handle_unauthorized_locally)
/// relax that per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    public: bool,
    intercept: Intercept,
}

impl HttpRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: None,
            public: false,
            intercept: Intercept::Global,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Adds a header, replacing any existing one with the same name.
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Serializes `body` as the JSON payload.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_vec(body)?);
        self.set_header(CONTENT_TYPE, "application/json");
        Ok(self)
    }

    /// Sends without a credential. A 401 on a public request is returned to
    /// the caller and never reaches the interceptor.
    pub fn public(mut self) -> Self {
        self.public = true;
        self
    }

    /// Keeps a 401 on this request away from the interceptor so the caller
    /// can handle it itself. The session is left alone.
    pub fn handle_unauthorized_locally(mut self) -> Self {
        self.intercept = Intercept::OptOut;
        self
    }

    pub fn is_public(&self) -> bool {
        self.public
    }

    /// How a 401 on this request is reported.
    pub fn intercept(&self) -> Intercept {
        if self.public {
            Intercept::OptOut
        } else {
            self.intercept
        }
    }

    /// Case-insensitive header lookup.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub(crate) fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        self.headers.push((name.to_ascii_lowercase(), value.into()));
    }
}

/// A response from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Builds a response carrying `body` as JSON.
    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, serde_json::Error> {
        self.body = serde_json::to_vec(body)?;
        self.headers
            .push((CONTENT_TYPE.to_string(), "application/json".to_string()));
        Ok(self)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults_authenticated_and_intercepted() {
        let req = HttpRequest::get("/api/orders");
        assert_eq!(req.method, Method::Get);
        assert!(!req.is_public());
        assert_eq!(req.intercept(), Intercept::Global);
    }

    #[test]
    fn test_request_opt_out_sets_intercept() {
        let req = HttpRequest::post("/api/checkout").handle_unauthorized_locally();
        assert_eq!(req.intercept(), Intercept::OptOut);
        assert!(!req.is_public());
    }

    #[test]
    fn test_request_public_never_intercepts() {
        let req = HttpRequest::get("/api/catalog").public();
        assert!(req.is_public());
        assert_eq!(req.intercept(), Intercept::OptOut);
    }

    #[test]
    fn test_request_json_sets_body_and_content_type() {
        let req = HttpRequest::put("/api/profile")
            .json(&serde_json::json!({ "name": "Ada" }))
            .unwrap();
        assert_eq!(req.header_value("Content-Type"), Some("application/json"));
        assert_eq!(req.body.as_deref(), Some(br#"{"name":"Ada"}"#.as_slice()));
    }

    #[test]
    fn test_request_header_replaces_same_name() {
        let req = HttpRequest::delete("/api/x")
            .header("X-Trace", "1")
            .header("x-trace", "2");
        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.header_value("X-TRACE"), Some("2"));
    }

    #[test]
    fn test_response_status_helpers() {
        assert!(HttpResponse::new(204).is_success());
        assert!(!HttpResponse::new(302).is_success());
        assert!(HttpResponse::new(401).is_unauthorized());
    }

    #[test]
    fn test_response_json_decodes_body() {
        let resp = HttpResponse::new(200)
            .with_json(&serde_json::json!({ "total": 3 }))
            .unwrap();
        let value: serde_json::Value = resp.json().unwrap();
        assert_eq!(value["total"], 3);
    }

    #[test]
    fn test_method_display() {
        assert_eq!(Method::Patch.to_string(), "PATCH");
    }
}
