use crate::error::AuthError;
use std::fmt;

/// Authenticated session against the platform. `token` is the value of the
/// session cookie; `xsrf_token` is echoed back on mutating requests.
#[derive(Debug, Clone)]
pub struct NoteSession {
    pub token: String,
    pub xsrf_token: Option<String>,
}

impl NoteSession {
    /// Builds a session from a pre-existing cookie value. No network call is
    /// made; validity is only discovered on first use.
    pub fn from_token(token: &str) -> Self {
        Self {
            token: token.to_string(),
            xsrf_token: None,
        }
    }
}

impl fmt::Display for NoteSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"token\":\"[REDACTED]\",\"xsrf_token\":{}}}",
            self.xsrf_token
                .as_ref()
                .map_or("null".to_string(), |_| "\"[REDACTED]\"".to_string())
        )
    }
}

#[async_trait::async_trait]
pub trait NoteAuthenticator: Send + Sync {
    async fn login(&self) -> Result<NoteSession, AuthError>;
}
