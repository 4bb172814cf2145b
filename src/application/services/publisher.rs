use crate::application::models::note::{
    ContentPayload, Draft, DraftState, PostStatus, PublishOutcome, UpdateNoteRequest,
};
use crate::config::Config;
use crate::constants::{NOTE_URL_PREFIX, TEXT_NOTES_PATH};
use crate::error::{AppError, DraftError};
use crate::session::interface::NoteSession;
use crate::transport::http_client::NoteHttpClient;
use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Serialize, Debug)]
struct CreateNoteRequest {
    template_key: Option<String>,
}

/// Servicio de publicación. Lleva un borrador por la secuencia
/// crear, actualizar y publicar contra la API de la plataforma.
#[async_trait]
pub trait PublisherService: Send + Sync {
    /// Crea un borrador vacío y devuelve su par id/clave.
    async fn create_draft(&self, session: &NoteSession) -> Result<Draft, DraftError>;

    /// Envía la representación completa del borrador con estado `draft`.
    async fn update_draft(
        &self,
        session: &NoteSession,
        draft: &Draft,
        payload: &ContentPayload,
    ) -> Result<(), DraftError>;

    /// Reenvía la misma representación con estado `published`.
    async fn publish_draft(
        &self,
        session: &NoteSession,
        draft: &Draft,
        payload: &ContentPayload,
    ) -> Result<(), DraftError>;

    /// Ejecuta la secuencia completa. Solo falla si no llega a existir un
    /// borrador; a partir de ahí siempre devuelve la URL del borrador.
    async fn publish_article(
        &self,
        session: &NoteSession,
        payload: &ContentPayload,
    ) -> Result<PublishOutcome, DraftError>;
}

pub struct PublisherServiceImpl<T: NoteHttpClient> {
    config: Arc<Config>,
    client: Arc<T>,
}

impl<T: NoteHttpClient> PublisherServiceImpl<T> {
    pub fn new(config: Arc<Config>, client: Arc<T>) -> Self {
        Self { config, client }
    }

    fn note_url(&self, draft: &Draft) -> String {
        format!(
            "{}{}{}",
            self.config.platform.base_url.trim_end_matches('/'),
            NOTE_URL_PREFIX,
            draft.key
        )
    }

    async fn put_note(
        &self,
        session: &NoteSession,
        draft: &Draft,
        payload: &ContentPayload,
        status: PostStatus,
    ) -> Result<(), AppError> {
        let path = format!("{}/{}", TEXT_NOTES_PATH, draft.id);
        let request = UpdateNoteRequest::new(payload, status);
        debug!("Sending {} note {} ({})", status, draft.id, draft.key);

        let _: serde_json::Value = self
            .client
            .request(Method::PUT, &path, session, Some(&request))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl<T: NoteHttpClient + 'static> PublisherService for PublisherServiceImpl<T> {
    async fn create_draft(&self, session: &NoteSession) -> Result<Draft, DraftError> {
        let request = CreateNoteRequest { template_key: None };

        let response: serde_json::Value = self
            .client
            .request(Method::POST, TEXT_NOTES_PATH, session, Some(&request))
            .await
            .map_err(|e| DraftError::CreateFailed(e.to_string()))?;

        let id = response["data"]["id"].as_u64();
        let key = response["data"]["key"].as_str();
        match (id, key) {
            (Some(id), Some(key)) => {
                info!("Draft created with id {} and key {}", id, key);
                Ok(Draft {
                    id,
                    key: key.to_string(),
                })
            }
            _ => Err(DraftError::CreateFailed(
                "creation response missing id or key".to_string(),
            )),
        }
    }

    async fn update_draft(
        &self,
        session: &NoteSession,
        draft: &Draft,
        payload: &ContentPayload,
    ) -> Result<(), DraftError> {
        self.put_note(session, draft, payload, PostStatus::Draft)
            .await
            .map_err(|e| DraftError::UpdateFailed(e.to_string()))
    }

    async fn publish_draft(
        &self,
        session: &NoteSession,
        draft: &Draft,
        payload: &ContentPayload,
    ) -> Result<(), DraftError> {
        self.put_note(session, draft, payload, PostStatus::Published)
            .await
            .map_err(|e| DraftError::PublishFailed(e.to_string()))
    }

    async fn publish_article(
        &self,
        session: &NoteSession,
        payload: &ContentPayload,
    ) -> Result<PublishOutcome, DraftError> {
        let draft = self.create_draft(session).await?;
        let note_url = self.note_url(&draft);

        if let Err(e) = self.update_draft(session, &draft, payload).await {
            // The draft exists but is empty. Leave it for manual recovery.
            error!("Draft update failed, leaving empty draft {}: {}", note_url, e);
            return Ok(PublishOutcome {
                note_url,
                draft,
                state: DraftState::Created,
            });
        }

        let mut state = DraftState::ContentSaved;
        if payload.status == PostStatus::Published {
            match self.publish_draft(session, &draft, payload).await {
                Ok(()) => state = DraftState::Published,
                Err(e) => {
                    warn!("Publishing failed, note stays as saved draft: {}", e);
                }
            }
        }

        info!("Note available at {} ({:?})", note_url, state);
        Ok(PublishOutcome {
            note_url,
            draft,
            state,
        })
    }
}
