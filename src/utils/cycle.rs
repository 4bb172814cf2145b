use crate::application::models::note::{ContentPayload, MediaReference, PostStatus};
use crate::application::services::generator::ArticleGenerator;
use crate::application::services::image::ImageClient;
use crate::application::services::media::{MediaService, MediaServiceImpl};
use crate::application::services::publisher::{PublisherService, PublisherServiceImpl};
use crate::config::Config;
use crate::constants::MAX_TITLE_CHARS;
use crate::error::AppError;
use crate::presentation::markdown::MarkdownTransformer;
use crate::session::interface::NoteSession;
use crate::transport::http_client::NoteHttpClient;
use async_trait::async_trait;
use chrono::{Local, NaiveDateTime, Timelike};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

/// One end-to-end run: generate, transform, stage media, publish.
#[async_trait]
pub trait CycleRunner: Send + Sync {
    /// Returns the note URL when a draft was created, `None` when the
    /// cycle was skipped or aborted before a draft existed.
    async fn run_cycle(&self) -> Result<Option<String>, AppError>;
}

pub struct PublishCycle<G: ArticleGenerator, T: NoteHttpClient> {
    config: Arc<Config>,
    session: NoteSession,
    generator: G,
    transformer: MarkdownTransformer,
    media: MediaServiceImpl<T>,
    publisher: PublisherServiceImpl<T>,
    image: Option<ImageClient>,
}

impl<G: ArticleGenerator, T: NoteHttpClient + 'static> PublishCycle<G, T> {
    pub fn new(
        config: Arc<Config>,
        session: NoteSession,
        generator: G,
        client: Arc<T>,
        image: Option<ImageClient>,
    ) -> Self {
        Self {
            media: MediaServiceImpl::new(client.clone()),
            publisher: PublisherServiceImpl::new(config.clone(), client),
            transformer: MarkdownTransformer::new(),
            config,
            session,
            generator,
            image,
        }
    }

    /// Prepares an eyecatch and uploads it. Every failure on this path is
    /// non-fatal; the article is simply published without a cover.
    async fn stage_eyecatch(&self, article: &str) -> Option<MediaReference> {
        let path = PathBuf::from(&self.config.platform.eyecatch_path);

        if let Some(image) = &self.image {
            match self.generator.generate_image_prompt(article).await {
                Ok(prompt) => {
                    if let Err(e) = image.render(&prompt, &path).await {
                        warn!("Image generation failed, trying existing eyecatch: {}", e);
                    }
                }
                Err(e) => {
                    warn!("Image prompt generation failed, trying existing eyecatch: {}", e);
                }
            }
        }

        match self.media.upload(&self.session, &path).await {
            Ok(reference) => Some(reference),
            Err(e) => {
                warn!("Eyecatch upload failed, continuing without one: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl<G: ArticleGenerator, T: NoteHttpClient + 'static> CycleRunner for PublishCycle<G, T> {
    async fn run_cycle(&self) -> Result<Option<String>, AppError> {
        info!("Starting publishing cycle");

        let genres = &self.config.generation.genres;
        let Some(markdown) = self.generator.generate_article(genres).await? else {
            warn!("Generator returned no content, skipping this cycle");
            return Ok(None);
        };

        let (hashtags, body_markup) = self.transformer.transform(&markdown);
        let eyecatch_reference = self.stage_eyecatch(&markdown).await;
        let title = derive_title(&markdown, Local::now().naive_local());
        let status = if self.config.platform.publish {
            PostStatus::Published
        } else {
            PostStatus::Draft
        };

        let payload = ContentPayload {
            title,
            body_markup,
            hashtags,
            status,
            eyecatch_reference,
        };

        match self.publisher.publish_article(&self.session, &payload).await {
            Ok(outcome) => Ok(Some(outcome.note_url)),
            Err(e) => {
                error!("Publishing cycle failed: {}", e);
                Ok(None)
            }
        }
    }
}

/// The first level-one heading becomes the title unless it is unusable,
/// in which case a dated default is synthesized.
fn derive_title(markdown: &str, now: NaiveDateTime) -> String {
    let heading = markdown
        .lines()
        .find_map(|line| line.trim().strip_prefix("# "))
        .map(str::trim);

    if let Some(heading) = heading {
        if !heading.is_empty() && heading.chars().count() <= MAX_TITLE_CHARS {
            return heading.to_string();
        }
    }

    let period = if now.hour() < 12 { "午前" } else { "午後" };
    format!("{} {}レポート", now.format("%Y-%m-%d"), period)
}
