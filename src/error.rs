/******************************************************************************
    Author: Joaquín Béjar García
    Email: jb@taunais.com
    Date: 14/2/26
 ******************************************************************************/
use crate::constants::BODY_EXCERPT_CHARS;
use reqwest::StatusCode;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::{fmt, io};

#[derive(Debug)]
pub enum AuthError {
    Transport(reqwest::Error),
    Rejected(StatusCode),
    Unexpected(String),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Transport(e) => write!(f, "transport error: {e}"),
            AuthError::Rejected(s) => write!(f, "sign-in rejected: {s}"),
            AuthError::Unexpected(msg) => write!(f, "unexpected sign-in response: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        AuthError::Transport(e)
    }
}

#[derive(Debug)]
pub enum MediaError {
    NotFound(PathBuf),
    Transport(reqwest::Error),
    Rejected { status: StatusCode, body: String },
}

impl Display for MediaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            MediaError::NotFound(p) => write!(f, "image not found: {}", p.display()),
            MediaError::Transport(e) => write!(f, "transport error: {e}"),
            MediaError::Rejected { status, body } => {
                write!(f, "upload rejected: {status}: {body}")
            }
        }
    }
}

impl std::error::Error for MediaError {}

impl From<reqwest::Error> for MediaError {
    fn from(e: reqwest::Error) -> Self {
        MediaError::Transport(e)
    }
}

#[derive(Debug)]
pub enum DraftError {
    CreateFailed(String),
    UpdateFailed(String),
    PublishFailed(String),
}

impl Display for DraftError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DraftError::CreateFailed(msg) => write!(f, "draft creation failed: {msg}"),
            DraftError::UpdateFailed(msg) => write!(f, "draft update failed: {msg}"),
            DraftError::PublishFailed(msg) => write!(f, "publish failed: {msg}"),
        }
    }
}

impl std::error::Error for DraftError {}

#[derive(Debug)]
pub enum AppError {
    Network(reqwest::Error),
    Io(io::Error),
    Json(serde_json::Error),
    Api(StatusCode, String),
    InvalidHeader(String),
    Config(String),
    Generation(String),
    Auth(AuthError),
    Media(MediaError),
    Draft(DraftError),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Network(e) => write!(f, "network error: {e}"),
            AppError::Io(e) => write!(f, "io error: {e}"),
            AppError::Json(e) => write!(f, "json error: {e}"),
            AppError::Api(s, body) => write!(f, "api request failed: {s}: {body}"),
            AppError::InvalidHeader(name) => write!(f, "invalid header value for {name}"),
            AppError::Config(msg) => write!(f, "config error: {msg}"),
            AppError::Generation(msg) => write!(f, "generation error: {msg}"),
            AppError::Auth(e) => write!(f, "auth error: {e}"),
            AppError::Media(e) => write!(f, "media error: {e}"),
            AppError::Draft(e) => write!(f, "draft error: {e}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Network(e)
    }
}
impl From<io::Error> for AppError {
    fn from(e: io::Error) -> Self {
        AppError::Io(e)
    }
}
impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Json(e)
    }
}
impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        AppError::Auth(e)
    }
}
impl From<MediaError> for AppError {
    fn from(e: MediaError) -> Self {
        AppError::Media(e)
    }
}
impl From<DraftError> for AppError {
    fn from(e: DraftError) -> Self {
        AppError::Draft(e)
    }
}

/// Bounded slice of a response body, for logs and error payloads.
pub(crate) fn body_excerpt(body: &str) -> String {
    if body.chars().count() <= BODY_EXCERPT_CHARS {
        body.to_string()
    } else {
        let cut: String = body.chars().take(BODY_EXCERPT_CHARS).collect();
        format!("{cut}...")
    }
}
