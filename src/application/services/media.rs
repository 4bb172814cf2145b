use crate::application::models::note::MediaReference;
use crate::constants::UPLOAD_IMAGE_PATH;
use crate::error::{body_excerpt, AppError, MediaError};
use crate::session::interface::NoteSession;
use crate::transport::http_client::NoteHttpClient;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Servicio de subida de imágenes al endpoint de assets de la plataforma.
#[async_trait]
pub trait MediaService: Send + Sync {
    /// Sube un fichero local y devuelve la clave opaca del asset.
    async fn upload(
        &self,
        session: &NoteSession,
        file_path: &Path,
    ) -> Result<MediaReference, MediaError>;
}

pub struct MediaServiceImpl<T: NoteHttpClient> {
    client: Arc<T>,
}

impl<T: NoteHttpClient> MediaServiceImpl<T> {
    pub fn new(client: Arc<T>) -> Self {
        Self { client }
    }
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

fn map_media_error(error: AppError) -> MediaError {
    match error {
        AppError::Network(e) => MediaError::Transport(e),
        AppError::Api(status, body) => MediaError::Rejected { status, body },
        other => MediaError::Rejected {
            status: StatusCode::OK,
            body: other.to_string(),
        },
    }
}

#[async_trait]
impl<T: NoteHttpClient + 'static> MediaService for MediaServiceImpl<T> {
    async fn upload(
        &self,
        session: &NoteSession,
        file_path: &Path,
    ) -> Result<MediaReference, MediaError> {
        // The file is read up front so a missing path never reaches the
        // network.
        let bytes = tokio::fs::read(file_path)
            .await
            .map_err(|_| MediaError::NotFound(file_path.to_path_buf()))?;

        let file_name = file_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .to_string();
        let mime = mime_for(file_path);
        debug!("Uploading {} as {}", file_name, mime);

        let response: serde_json::Value = self
            .client
            .post_file(UPLOAD_IMAGE_PATH, session, "file", &file_name, mime, bytes)
            .await
            .map_err(map_media_error)?;

        let key = response["data"]["key"]
            .as_str()
            .ok_or_else(|| MediaError::Rejected {
                status: StatusCode::OK,
                body: body_excerpt(&response.to_string()),
            })?;

        info!("Uploaded {} as asset {}", file_name, key);
        Ok(MediaReference(key.to_string()))
    }
}

#[cfg(test)]
mod tests_media_service {
    use super::*;
    use crate::transport::http_client::NoteHttpClientImpl;
    use crate::utils::logger::setup_logger;
    use mockito::{Matcher, Server};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn create_service(server: &Server) -> MediaServiceImpl<NoteHttpClientImpl> {
        let client = Arc::new(NoteHttpClientImpl::new(&server.url(), 30).unwrap());
        MediaServiceImpl::new(client)
    }

    fn create_session() -> NoteSession {
        NoteSession {
            token: "sess".to_string(),
            xsrf_token: Some("xsrf123".to_string()),
        }
    }

    fn write_image(dir: &tempfile::TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, [0x89, 0x50, 0x4e, 0x47]).unwrap();
        path
    }

    #[tokio::test]
    async fn test_upload_success() {
        setup_logger();
        let mut server = Server::new_async().await;
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(&dir, "eyecatch.png");

        let mock = server
            .mock("POST", "/api/v1/upload_image")
            .match_header("x-xsrf-token", "xsrf123")
            .match_body(Matcher::Regex("name=\"file\"".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": {"key": "img_key_1"}}"#)
            .create_async()
            .await;

        let service = create_service(&server);
        let reference = service.upload(&create_session(), &path).await.unwrap();

        assert_eq!(reference.as_str(), "img_key_1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_upload_missing_file_makes_no_request() {
        setup_logger();
        let mut server = Server::new_async().await;

        let mock = server
            .mock("POST", "/api/v1/upload_image")
            .expect(0)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.png");

        let service = create_service(&server);
        let result = service.upload(&create_session(), &missing).await;

        match result {
            Err(MediaError::NotFound(path)) => assert_eq!(path, missing),
            other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_upload_rejected_status() {
        setup_logger();
        let mut server = Server::new_async().await;
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(&dir, "eyecatch.png");

        let mock = server
            .mock("POST", "/api/v1/upload_image")
            .with_status(413)
            .with_body("too large")
            .create_async()
            .await;

        let service = create_service(&server);
        let result = service.upload(&create_session(), &path).await;

        match result {
            Err(MediaError::Rejected { status, body }) => {
                assert_eq!(status.as_u16(), 413);
                assert_eq!(body, "too large");
            }
            other => panic!("expected Rejected, got {:?}", other.map(|_| ())),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_upload_response_without_key_is_rejected() {
        setup_logger();
        let mut server = Server::new_async().await;
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(&dir, "eyecatch.jpg");

        let mock = server
            .mock("POST", "/api/v1/upload_image")
            .with_status(200)
            .with_body(r#"{"data": {}}"#)
            .create_async()
            .await;

        let service = create_service(&server);
        let result = service.upload(&create_session(), &path).await;

        assert!(matches!(result, Err(MediaError::Rejected { .. })));
        mock.assert_async().await;
    }

    #[test]
    fn test_mime_for_extensions() {
        assert_eq!(mime_for(Path::new("a.png")), "image/png");
        assert_eq!(mime_for(Path::new("a.JPG")), "image/jpeg");
        assert_eq!(mime_for(Path::new("a.jpeg")), "image/jpeg");
        assert_eq!(mime_for(Path::new("a.gif")), "image/gif");
        assert_eq!(mime_for(Path::new("a.webp")), "application/octet-stream");
        assert_eq!(mime_for(Path::new("noext")), "application/octet-stream");
    }
}
