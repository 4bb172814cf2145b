use note_publisher::application::services::generator::GeminiClient;
use note_publisher::application::services::image::ImageClient;
use note_publisher::config::Config;
use note_publisher::scheduler::{Schedule, Scheduler};
use note_publisher::session::auth::NoteAuth;
use note_publisher::session::interface::{NoteAuthenticator, NoteSession};
use note_publisher::transport::http_client::NoteHttpClientImpl;
use note_publisher::utils::cycle::PublishCycle;
use note_publisher::utils::logger::setup_logger;
use std::process;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    setup_logger();

    let config = Arc::new(Config::new());
    if let Err(e) = config.validate() {
        error!("Configuration invalid: {}", e);
        process::exit(1);
    }

    let schedule = match Schedule::new(&config.schedule.triggers) {
        Ok(schedule) => schedule,
        Err(e) => {
            error!("Schedule invalid: {}", e);
            process::exit(1);
        }
    };

    let client = match NoteHttpClientImpl::new(&config.platform.base_url, config.platform.timeout)
    {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            process::exit(1);
        }
    };

    let session = match &config.credentials.session_token {
        Some(token) => {
            info!("Using configured session token");
            NoteSession::from_token(token)
        }
        None => {
            info!("No session token configured, signing in with credentials");
            let auth = NoteAuth::new(config.clone(), client.clone());
            match auth.login().await {
                Ok(session) => session,
                Err(e) => {
                    error!("Sign-in failed: {}", e);
                    process::exit(1);
                }
            }
        }
    };

    let generator = match GeminiClient::new(config.clone()) {
        Ok(generator) => generator,
        Err(e) => {
            error!("Failed to build generation client: {}", e);
            process::exit(1);
        }
    };

    let image = match ImageClient::from_config(config.clone()) {
        Ok(image) => image,
        Err(e) => {
            error!("Failed to build image client: {}", e);
            process::exit(1);
        }
    };

    let cycle = PublishCycle::new(config.clone(), session, generator, client, image);
    let scheduler = Scheduler::new(schedule, cycle);

    info!(
        "Starting scheduler with triggers {:?}",
        config.schedule.triggers
    );
    scheduler
        .run(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;

    info!("Stopped");
}
