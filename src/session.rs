use serde_json::Value;
use std::fmt;

use crate::client::{ApiClient, ApiRequest};
use crate::error::{ApiError, SessionError};

/// API key and linked-account token. Held in memory for one session only.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    account_token: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, account_token: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            account_token: account_token.into(),
        }
    }

    pub fn api_key(&self) -> &str {
        self.api_key.trim()
    }

    pub fn account_token(&self) -> &str {
        self.account_token.trim()
    }

    pub fn is_complete(&self) -> bool {
        !self.api_key().is_empty() && !self.account_token().is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("account_token", &"<redacted>")
            .finish()
    }
}

/// An authenticated interactive session: the credentials entered at the
/// start plus the client every call goes through.
#[derive(Debug, Clone)]
pub struct Session {
    credentials: Credentials,
    client: ApiClient,
}

impl Session {
    pub fn start(credentials: Credentials, client: ApiClient) -> Result<Self, SessionError> {
        if !credentials.is_complete() {
            return Err(SessionError::MissingCredentials);
        }
        Ok(Self { credentials, client })
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn execute(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        self.client.execute(request, &self.credentials).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = Credentials::new("sk_live_secret", "acct_token_secret");
        let out = format!("{:?}", creds);
        assert!(!out.contains("sk_live_secret"));
        assert!(!out.contains("acct_token_secret"));
    }

    #[test]
    fn test_credentials_are_trimmed() {
        let creds = Credentials::new("  key\n", "\ttoken ");
        assert_eq!(creds.api_key(), "key");
        assert_eq!(creds.account_token(), "token");
    }

    #[test]
    fn test_session_requires_both_credentials() {
        let err = Session::start(Credentials::new("key", "   "), ApiClient::default()).unwrap_err();
        assert_eq!(err, SessionError::MissingCredentials);
        assert!(Session::start(Credentials::new("key", "token"), ApiClient::default()).is_ok());
    }
}
