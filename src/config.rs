use crate::error::AppError;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::fmt::Debug;
use std::str::FromStr;
use tracing::error;

#[derive(Debug, Deserialize, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub session_token: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub platform: PlatformConfig,
    pub generation: GenerationConfig,
    pub search: SearchConfig,
    pub image: ImageConfig,
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlatformConfig {
    pub base_url: String,
    pub timeout: u64,
    pub eyecatch_path: String,
    pub publish: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub system_prompt: String,
    pub genres: Vec<String>,
    pub timeout: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    pub enabled: bool,
    pub base_url: String,
    pub max_results: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImageConfig {
    pub api_url: Option<String>,
    pub negative_prompt: String,
    pub width: u32,
    pub height: u32,
    pub steps: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScheduleConfig {
    pub triggers: Vec<String>,
}

impl fmt::Display for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"email\":\"{}\",\"password\":\"[REDACTED]\",\"session_token\":{}}}",
            self.email,
            self.session_token
                .as_ref()
                .map_or("null".to_string(), |_| "\"[REDACTED]\"".to_string())
        )
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"credentials\":{},\"platform\":{},\"generation\":{},\"search\":{},\"image\":{},\"schedule\":{}}}",
            self.credentials, self.platform, self.generation, self.search, self.image, self.schedule
        )
    }
}

impl fmt::Display for PlatformConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"base_url\":\"{}\",\"timeout\":{},\"eyecatch_path\":\"{}\",\"publish\":{}}}",
            self.base_url, self.timeout, self.eyecatch_path, self.publish
        )
    }
}

impl fmt::Display for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let genres = serde_json::to_string(&self.genres).map_err(|_| fmt::Error)?;
        let prompt = serde_json::to_string(&self.system_prompt).map_err(|_| fmt::Error)?;
        write!(
            f,
            "{{\"base_url\":\"{}\",\"api_key\":\"[REDACTED]\",\"model\":\"{}\",\"system_prompt\":{},\"genres\":{},\"timeout\":{}}}",
            self.base_url, self.model, prompt, genres, self.timeout
        )
    }
}

impl fmt::Display for SearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"enabled\":{},\"base_url\":\"{}\",\"max_results\":{}}}",
            self.enabled, self.base_url, self.max_results
        )
    }
}

impl fmt::Display for ImageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let negative = serde_json::to_string(&self.negative_prompt).map_err(|_| fmt::Error)?;
        write!(
            f,
            "{{\"api_url\":{},\"negative_prompt\":{},\"width\":{},\"height\":{},\"steps\":{}}}",
            self.api_url
                .as_ref()
                .map_or("null".to_string(), |u| format!("\"{u}\"")),
            negative,
            self.width,
            self.height,
            self.steps
        )
    }
}

impl fmt::Display for ScheduleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let triggers = serde_json::to_string(&self.triggers).map_err(|_| fmt::Error)?;
        write!(f, "{{\"triggers\":{triggers}}}")
    }
}

pub fn get_env_or_default<T: FromStr>(env_var: &str, default: T) -> T
where
    <T as FromStr>::Err: Debug,
{
    match env::var(env_var) {
        Ok(val) => val.parse::<T>().unwrap_or_else(|_| {
            error!("Failed to parse {}: {}, using default", env_var, val);
            default
        }),
        Err(_) => default,
    }
}

/// Reads an optional value, ignoring empty strings and `YOUR_` placeholders
/// left over from a template config.
pub fn get_env_optional(env_var: &str) -> Option<String> {
    env::var(env_var)
        .ok()
        .filter(|v| !v.is_empty() && !v.starts_with("YOUR_"))
}

pub fn get_env_list(env_var: &str, default: &str) -> Vec<String> {
    let raw = get_env_or_default(env_var, String::from(default));
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn is_placeholder(value: &str) -> bool {
    value.is_empty() || value.starts_with("YOUR_")
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Config {
            credentials: Credentials {
                email: get_env_or_default("NOTE_EMAIL", String::new()),
                password: get_env_or_default("NOTE_PASSWORD", String::new()),
                session_token: get_env_optional("NOTE_SESSION_TOKEN"),
            },
            platform: PlatformConfig {
                base_url: get_env_or_default("NOTE_BASE_URL", String::from("https://note.com")),
                timeout: get_env_or_default("NOTE_REST_TIMEOUT", 30),
                eyecatch_path: get_env_or_default(
                    "NOTE_EYECATCH_PATH",
                    String::from("eyecatch.png"),
                ),
                publish: get_env_or_default("NOTE_PUBLISH", true),
            },
            generation: GenerationConfig {
                base_url: get_env_or_default(
                    "GEMINI_BASE_URL",
                    String::from("https://generativelanguage.googleapis.com"),
                ),
                api_key: get_env_or_default("GEMINI_API_KEY", String::new()),
                model: get_env_or_default("GEMINI_MODEL", String::from("gemini-2.0-flash-exp")),
                system_prompt: get_env_or_default(
                    "NOTE_SYSTEM_PROMPT",
                    String::from(
                        "あなたはニュースレポートの編集者です。与えられた検索結果をもとに、\
                         Markdown形式で簡潔な日本語のレポートを書いてください。",
                    ),
                ),
                genres: get_env_list("NOTE_TOPIC_GENRES", "金融,政治,カルチャー,サブカルチャー"),
                timeout: get_env_or_default("GEMINI_TIMEOUT", 120),
            },
            search: SearchConfig {
                enabled: get_env_or_default("NOTE_SEARCH_ENABLED", true),
                base_url: get_env_or_default(
                    "NOTE_SEARCH_BASE_URL",
                    String::from("https://api.duckduckgo.com"),
                ),
                max_results: get_env_or_default("NOTE_SEARCH_MAX_RESULTS", 5),
            },
            image: ImageConfig {
                api_url: get_env_optional("NOTE_IMAGE_API_URL"),
                negative_prompt: get_env_or_default(
                    "NOTE_IMAGE_NEGATIVE_PROMPT",
                    String::from("low quality, blurry, text"),
                ),
                width: get_env_or_default("NOTE_IMAGE_WIDTH", 512),
                height: get_env_or_default("NOTE_IMAGE_HEIGHT", 512),
                steps: get_env_or_default("NOTE_IMAGE_STEPS", 20),
            },
            schedule: ScheduleConfig {
                triggers: get_env_list("NOTE_SCHEDULE_TIMES", "08:00,20:00"),
            },
        }
    }

    /// Startup contract: the process must not enter the scheduling loop with
    /// placeholder credentials or an unusable generation setup.
    pub fn validate(&self) -> Result<(), AppError> {
        let mut missing = Vec::new();

        if is_placeholder(&self.generation.api_key) {
            missing.push("GEMINI_API_KEY");
        }
        if is_placeholder(&self.generation.model) {
            missing.push("GEMINI_MODEL");
        }

        let has_token = self.credentials.session_token.is_some();
        let has_creds = !is_placeholder(&self.credentials.email)
            && !is_placeholder(&self.credentials.password);
        if !has_token && !has_creds {
            missing.push("NOTE_SESSION_TOKEN or NOTE_EMAIL/NOTE_PASSWORD");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::Config(format!(
                "missing or default configuration: {}",
                missing.join(", ")
            )))
        }
    }
}


#[cfg(test)]
mod tests_validate {
    use super::*;

    fn config_with(
        email: &str,
        password: &str,
        token: Option<&str>,
        api_key: &str,
    ) -> Config {
        let mut config = Config::new();
        config.credentials.email = email.to_string();
        config.credentials.password = password.to_string();
        config.credentials.session_token = token.map(String::from);
        config.generation.api_key = api_key.to_string();
        config.generation.model = "gemini-test".to_string();
        config
    }

    #[test]
    fn test_validate_with_session_token() {
        let config = config_with("", "", Some("tok"), "key");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_with_credentials() {
        let config = config_with("writer@example.com", "pass", None, "key");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_without_auth() {
        let config = config_with("", "", None, "key");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("NOTE_SESSION_TOKEN"));
    }

    #[test]
    fn test_validate_placeholder_api_key() {
        let config = config_with("writer@example.com", "pass", None, "YOUR_GEMINI_API_KEY");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }
}
