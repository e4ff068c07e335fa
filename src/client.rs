use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use crate::catalog::Method;
use crate::error::ApiError;
use crate::query::QueryParams;
use crate::session::Credentials;

pub const DEFAULT_BASE_URL: &str = "https://api.merge.dev/api/ticketing/v1";

/// One fully built call: resolved path, optional filters and body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<QueryParams>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>, query: Option<QueryParams>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: query.filter(|q| !q.is_empty()),
            body: None,
        }
    }

    pub fn write(method: Method, path: impl Into<String>, body: Value) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            body: Some(body),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Like [`ApiClient::new`], with a request timeout when one is configured.
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: builder.build()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn execute(
        &self,
        request: &ApiRequest,
        credentials: &Credentials,
    ) -> Result<Value, ApiError> {
        self.call(
            &request.path,
            request.method,
            credentials,
            request.query.as_ref(),
            request.body.as_ref(),
        )
        .await
    }

    /// Performs a single request. A non-2xx status is returned as
    /// [`ApiError::Http`] with the body text; its body is never parsed.
    pub async fn call(
        &self,
        path: &str,
        method: Method,
        credentials: &Credentials,
        query: Option<&QueryParams>,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let url = self.url_for(path);
        info!(method = %method, url = %url, "sending request");

        let mut req_builder = match method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Patch => self.client.patch(&url),
        };

        req_builder = req_builder
            .bearer_auth(credentials.api_key())
            .header("X-Account-Token", credentials.account_token())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json");

        if let Some(query) = query {
            req_builder = req_builder.query(query);
        }

        if method.is_write() {
            let body = body.cloned().unwrap_or_else(|| Value::Object(Default::default()));
            debug!(payload = %body, "outgoing payload");
            req_builder = req_builder.json(&body);
        }

        let resp = req_builder.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        info!(status = status.as_u16(), "received response");

        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|source| ApiError::Decode { source, body: text })
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url_concatenation() {
        let client = ApiClient::new("https://example.test/api/v1/");
        assert_eq!(client.base_url(), "https://example.test/api/v1");
        assert_eq!(client.url_for("/tickets/42"), "https://example.test/api/v1/tickets/42");
        assert_eq!(
            ApiClient::default().url_for("/users"),
            "https://api.merge.dev/api/ticketing/v1/users"
        );
    }

    #[test]
    fn test_empty_query_is_dropped() {
        let req = ApiRequest::get("/tickets", Some(QueryParams::new()));
        assert_eq!(req.query, None);

        let req = ApiRequest::write(Method::Post, "/tickets", json!({"model": {}}));
        assert_eq!(req.method, Method::Post);
        assert!(req.query.is_none());
    }
}
