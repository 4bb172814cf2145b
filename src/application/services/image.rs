use crate::config::Config;
use crate::constants::TXT2IMG_PATH;
use crate::error::{body_excerpt, AppError};
use base64::Engine;
use reqwest::Client;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

#[derive(Serialize, Debug)]
struct Txt2ImgRequest<'a> {
    prompt: &'a str,
    negative_prompt: &'a str,
    width: u32,
    height: u32,
    steps: u32,
}

/// Client for a Stable Diffusion web UI compatible txt2img endpoint.
/// Only constructed when an image API URL is configured; without one the
/// publishing cycle falls back to a static eyecatch file.
pub struct ImageClient {
    config: Arc<Config>,
    client: Client,
    api_url: String,
}

impl ImageClient {
    pub fn from_config(config: Arc<Config>) -> Result<Option<Self>, AppError> {
        let Some(api_url) = config.image.api_url.clone() else {
            return Ok(None);
        };
        let client = Client::builder()
            .timeout(Duration::from_secs(config.generation.timeout))
            .build()?;
        Ok(Some(Self {
            config,
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }))
    }

    /// Renders one image for the prompt and writes it to `output_path`.
    pub async fn render(&self, prompt: &str, output_path: &Path) -> Result<PathBuf, AppError> {
        let url = format!("{}{}", self.api_url, TXT2IMG_PATH);
        let request = Txt2ImgRequest {
            prompt,
            negative_prompt: &self.config.image.negative_prompt,
            width: self.config.image.width,
            height: self.config.image.height,
            steps: self.config.image.steps,
        };

        debug!("Rendering eyecatch image for prompt: {}", prompt);
        let response = self.client.post(&url).json(&request).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            error!("Image request failed. Status: {}, Body: {}", status, body);
            return Err(AppError::Api(status, body_excerpt(&body)));
        }

        let value: serde_json::Value = serde_json::from_str(&body)?;
        let encoded = value["images"][0]
            .as_str()
            .ok_or_else(|| AppError::Generation("no image in txt2img response".to_string()))?;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| AppError::Generation(format!("invalid image data: {}", e)))?;

        tokio::fs::write(output_path, bytes).await?;
        info!("Eyecatch image written to {}", output_path.display());
        Ok(output_path.to_path_buf())
    }
}
