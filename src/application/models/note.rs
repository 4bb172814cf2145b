/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/2/26
******************************************************************************/
use serde::{Deserialize, Serialize};
use std::fmt;

/// Requested visibility of an article on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Server-side draft handle. The numeric id addresses the resource on the
/// API, the key is the public slug used in reader-facing URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub id: u64,
    pub key: String,
}

/// Opaque asset key returned by the upload endpoint. Only meaningful to
/// the session that obtained it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaReference(pub String);

impl MediaReference {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything the publishing flow needs to fill a draft. Built once per
/// cycle and not mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct ContentPayload {
    pub title: String,
    pub body_markup: String,
    pub hashtags: Vec<String>,
    pub status: PostStatus,
    pub eyecatch_reference: Option<MediaReference>,
}

impl fmt::Display for ContentPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        write!(f, "{}", s)
    }
}

/// How far a publishing cycle got with a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftState {
    Created,
    ContentSaved,
    Published,
}

/// Result of a full publishing attempt. The URL points at the draft even
/// when a later step failed, so a human can finish it by hand.
#[derive(Debug, Clone, Serialize)]
pub struct PublishOutcome {
    pub note_url: String,
    pub draft: Draft,
    #[serde(skip)]
    pub state: DraftState,
}

impl fmt::Display for PublishOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        write!(f, "{}", s)
    }
}

/// Full-resource body for the draft update endpoint. The platform expects
/// the whole representation on every PUT, including boilerplate fields it
/// defaults itself on the web editor.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateNoteRequest {
    pub name: String,
    pub free_body: String,
    pub hashtags: Vec<String>,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eyecatch_image_key: Option<String>,
    pub image_keys: Vec<String>,
    pub author_ids: Vec<String>,
    pub magazine_ids: Vec<String>,
    pub circle_permissions: Vec<String>,
    pub price: u32,
    pub limited: bool,
}

impl UpdateNoteRequest {
    /// The eyecatch field is omitted entirely when no media reference is
    /// available. Sending `null` trips server-side validation.
    pub fn new(payload: &ContentPayload, status: PostStatus) -> Self {
        let eyecatch_image_key = payload
            .eyecatch_reference
            .as_ref()
            .map(|reference| reference.as_str().to_string());
        let image_keys = eyecatch_image_key.iter().cloned().collect();

        Self {
            name: payload.title.clone(),
            free_body: payload.body_markup.clone(),
            hashtags: payload
                .hashtags
                .iter()
                .map(|tag| format!("#{tag}"))
                .collect(),
            status: status.as_str(),
            eyecatch_image_key,
            image_keys,
            author_ids: Vec::new(),
            magazine_ids: Vec::new(),
            circle_permissions: Vec::new(),
            price: 0,
            limited: false,
        }
    }
}
