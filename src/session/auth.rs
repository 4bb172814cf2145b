/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 15/2/26
******************************************************************************/
use crate::config::Config;
use crate::constants::{LEGACY_SESSION_COOKIE, SESSION_COOKIE, SIGN_IN_PATH, XSRF_COOKIE};
use crate::error::{AppError, AuthError};
use crate::session::interface::{NoteAuthenticator, NoteSession};
use crate::transport::http_client::NoteHttpClient;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Serialize, Debug)]
struct SignInRequest<'a> {
    login: &'a str,
    password: &'a str,
}

/// Credential-based authenticator. Exchanges email and password for the
/// session cookie the platform sets on a successful sign-in.
pub struct NoteAuth<T: NoteHttpClient> {
    config: Arc<Config>,
    client: Arc<T>,
}

impl<T: NoteHttpClient> NoteAuth<T> {
    pub fn new(config: Arc<Config>, client: Arc<T>) -> Self {
        Self { config, client }
    }
}

fn map_auth_error(error: AppError) -> AuthError {
    match error {
        AppError::Network(e) => AuthError::Transport(e),
        AppError::Api(status, _) => AuthError::Rejected(status),
        other => AuthError::Unexpected(other.to_string()),
    }
}

fn find_cookie(cookies: &[(String, String)], name: &str) -> Option<String> {
    cookies
        .iter()
        .find(|(cookie_name, _)| cookie_name == name)
        .map(|(_, value)| value.clone())
}

#[async_trait::async_trait]
impl<T: NoteHttpClient + 'static> NoteAuthenticator for NoteAuth<T> {
    #[instrument(skip(self))]
    async fn login(&self) -> Result<NoteSession, AuthError> {
        let request = SignInRequest {
            login: &self.config.credentials.email,
            password: &self.config.credentials.password,
        };

        debug!("Signing in as {}", self.config.credentials.email);
        let (body, cookies): (serde_json::Value, _) = self
            .client
            .post_anonymous(SIGN_IN_PATH, &request)
            .await
            .map_err(map_auth_error)?;

        // A 2xx status alone is not proof of success. The server answers
        // some bad credentials with 200 and an error payload, so require
        // the account marker before trusting the response.
        if body["data"]["email_confirmed_flag"].is_null() {
            return Err(AuthError::Unexpected(
                "sign-in response has no account data".to_string(),
            ));
        }

        let token = find_cookie(&cookies, SESSION_COOKIE)
            .or_else(|| find_cookie(&cookies, LEGACY_SESSION_COOKIE))
            .ok_or_else(|| {
                AuthError::Unexpected("session cookie missing from sign-in response".to_string())
            })?;

        let xsrf_token = find_cookie(&cookies, XSRF_COOKIE);
        if xsrf_token.is_none() {
            warn!("No XSRF token in sign-in response; write requests may be rejected");
        }

        info!("Signed in as {}", self.config.credentials.email);
        Ok(NoteSession { token, xsrf_token })
    }
}
