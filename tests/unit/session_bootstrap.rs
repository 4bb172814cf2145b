use note_publisher::config::Config;
use note_publisher::session::interface::NoteSession;
use pretty_assertions::assert_eq;

// These run in their own crate, the same way the binary consumes the
// library, so they cover the exact field accesses the entry point makes.

#[test]
fn test_configured_token_short_circuits_sign_in() {
    let mut config = Config::new();
    config.credentials.session_token = Some("stored_cookie".to_string());

    let session = match &config.credentials.session_token {
        Some(token) => NoteSession::from_token(token),
        None => unreachable!("token was just set"),
    };

    assert_eq!(session.token, "stored_cookie");
    assert!(session.xsrf_token.is_none());
}

#[test]
fn test_token_only_credentials_pass_validation() {
    let mut config = Config::new();
    config.credentials.email = String::new();
    config.credentials.password = String::new();
    config.credentials.session_token = Some("stored_cookie".to_string());
    config.generation.api_key = "key".to_string();
    config.generation.model = "gemini-test".to_string();

    assert!(config.validate().is_ok());
}

#[test]
fn test_missing_token_falls_back_to_credentials() {
    let mut config = Config::new();
    config.credentials.email = "writer@example.com".to_string();
    config.credentials.password = "pass".to_string();
    config.credentials.session_token = None;
    config.generation.api_key = "key".to_string();
    config.generation.model = "gemini-test".to_string();

    assert!(config.credentials.session_token.is_none());
    assert!(config.validate().is_ok());
}
