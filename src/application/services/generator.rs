use crate::application::services::search::SearchClient;
use crate::config::Config;
use crate::constants::GENERATE_CONTENT_PATH_PREFIX;
use crate::error::{body_excerpt, AppError};
use async_trait::async_trait;
use chrono::{Local, Timelike};
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Fuente de contenido del ciclo de publicación.
#[async_trait]
pub trait ArticleGenerator: Send + Sync {
    /// Genera el cuerpo del artículo en Markdown para los géneros dados.
    /// Devuelve `None` cuando el modelo no produce texto utilizable.
    async fn generate_article(&self, genres: &[String]) -> Result<Option<String>, AppError>;

    /// Genera un prompt corto en inglés para el modelo de imágenes.
    async fn generate_image_prompt(&self, article_text: &str) -> Result<String, AppError>;
}

#[derive(Serialize, Debug)]
struct GenerateContentRequest {
    #[serde(rename = "systemInstruction")]
    system_instruction: ContentPart,
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationParameters,
}

#[derive(Serialize, Debug)]
struct Content {
    role: &'static str,
    parts: Vec<TextPart>,
}

#[derive(Serialize, Debug)]
struct ContentPart {
    parts: Vec<TextPart>,
}

#[derive(Serialize, Debug)]
struct TextPart {
    text: String,
}

#[derive(Serialize, Debug)]
struct GenerationParameters {
    temperature: f32,
}

/// Client for the generative-language REST API. When search is enabled it
/// asks the search client for per-genre headlines and feeds them to the
/// model as context.
pub struct GeminiClient {
    config: Arc<Config>,
    client: Client,
    search: Option<SearchClient>,
}

impl GeminiClient {
    pub fn new(config: Arc<Config>) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.generation.timeout))
            .build()?;
        let search = if config.search.enabled {
            Some(SearchClient::new(config.clone())?)
        } else {
            None
        };
        Ok(Self {
            config,
            client,
            search,
        })
    }

    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String, AppError> {
        let url = format!(
            "{}{}{}:generateContent",
            self.config.generation.base_url.trim_end_matches('/'),
            GENERATE_CONTENT_PATH_PREFIX,
            self.config.generation.model
        );
        let request = GenerateContentRequest {
            system_instruction: ContentPart {
                parts: vec![TextPart {
                    text: system_prompt.to_string(),
                }],
            },
            contents: vec![Content {
                role: "user",
                parts: vec![TextPart {
                    text: user_prompt.to_string(),
                }],
            }],
            generation_config: GenerationParameters { temperature: 0.7 },
        };

        debug!("Requesting generation from model {}", self.config.generation.model);
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.config.generation.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            error!("Generation request failed. Status: {}, Body: {}", status, body);
            return Err(AppError::Api(status, body_excerpt(&body)));
        }

        let value: serde_json::Value = serde_json::from_str(&body)?;
        let text = value["candidates"][0]["content"]["parts"]
            .as_array()
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|part| part["text"].as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        Ok(text)
    }

    async fn build_context(&self, genres: &[String]) -> String {
        let mut context = String::new();
        for genre in genres {
            context.push_str(&format!("\n## {}\n", genre));

            let results = match &self.search {
                Some(search) => {
                    let query = format!("{} ニュース", genre);
                    match search.search(&query, self.config.search.max_results).await {
                        Ok(results) => results,
                        Err(e) => {
                            warn!("Search for {} failed: {}", genre, e);
                            Vec::new()
                        }
                    }
                }
                None => Vec::new(),
            };

            if results.is_empty() {
                context.push_str("(ニュースなし)\n");
            } else {
                for (index, result) in results.iter().enumerate() {
                    context.push_str(&format!(
                        "{}. {}: {}\n",
                        index + 1,
                        result.title,
                        result.snippet
                    ));
                }
            }
        }
        context
    }
}

#[async_trait]
impl ArticleGenerator for GeminiClient {
    async fn generate_article(&self, genres: &[String]) -> Result<Option<String>, AppError> {
        let now = Local::now();
        let period = if now.hour() < 12 { "午前" } else { "午後" };
        let title = format!("{} {}レポート", now.format("%Y-%m-%d"), period);
        info!("Generating content for: {}", title);

        let context = self.build_context(genres).await;
        let user_prompt = format!(
            "Title: {}\n\nSearch Results (Context):\n{}\n\nPlease generate the report based on the system instructions.",
            title, context
        );

        let text = self
            .generate(&self.config.generation.system_prompt, &user_prompt)
            .await?;
        if text.trim().is_empty() {
            warn!("Model returned no text");
            return Ok(None);
        }
        Ok(Some(text))
    }

    async fn generate_image_prompt(&self, article_text: &str) -> Result<String, AppError> {
        let system_prompt = "You write prompts for an image generation model. \
            Answer with a single short English prompt describing a cover illustration \
            for the given article. No explanations, no quotes.";
        let user_prompt = format!("Article:\n{}", article_text);

        let text = self.generate(system_prompt, &user_prompt).await?;
        let prompt = text.trim().to_string();
        if prompt.is_empty() {
            return Err(AppError::Generation(
                "empty image prompt response".to_string(),
            ));
        }
        Ok(prompt)
    }
}
