/******************************************************************************
    Author: Joaquín Béjar García
    Email: jb@taunais.com
    Date: 15/2/26
 ******************************************************************************/

use crate::constants::{EDITOR_PATH, SESSION_COOKIE, XSRF_COOKIE, XSRF_HEADER};
use crate::error::AppError;
use crate::session::interface::NoteSession;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE, ORIGIN, REFERER, SET_COOKIE};
use reqwest::Response;

/// Header set for authenticated requests: session cookie, anti-forgery echo
/// and the `Origin`/`Referer` pair the editor sends.
pub(crate) fn session_headers(
    base_url: &str,
    session: &NoteSession,
) -> Result<HeaderMap, AppError> {
    let mut headers = HeaderMap::new();

    let mut cookie = format!("{}={}", SESSION_COOKIE, session.token);
    if let Some(xsrf) = &session.xsrf_token {
        cookie.push_str(&format!("; {}={}", XSRF_COOKIE, xsrf));
    }
    headers.insert(COOKIE, header_value(&cookie, "Cookie")?);

    if let Some(xsrf) = &session.xsrf_token {
        headers.insert(XSRF_HEADER, header_value(xsrf, XSRF_HEADER)?);
    }

    headers.insert(ORIGIN, header_value(base_url, "Origin")?);
    let referer = format!("{}{}", base_url, EDITOR_PATH);
    headers.insert(REFERER, header_value(&referer, "Referer")?);

    Ok(headers)
}

fn header_value(value: &str, name: &str) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(value).map_err(|_| AppError::InvalidHeader(name.to_string()))
}

/// Collects `name=value` pairs from every `Set-Cookie` header on a response.
/// Attributes after the first `;` are discarded.
pub(crate) fn extract_cookies(response: &Response) -> Vec<(String, String)> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .filter_map(parse_set_cookie)
        .collect()
}

fn parse_set_cookie(raw: &str) -> Option<(String, String)> {
    let pair = raw.split(';').next()?;
    let (name, value) = pair.split_once('=')?;
    Some((name.trim().to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests_headers {
    use super::*;
    use pretty_assertions::assert_eq;

    fn session() -> NoteSession {
        NoteSession {
            token: "sess".to_string(),
            xsrf_token: Some("xsrf123".to_string()),
        }
    }

    #[test]
    fn test_session_headers_full() {
        let headers = session_headers("https://note.com", &session()).unwrap();

        assert_eq!(
            headers.get(COOKIE).unwrap(),
            "_note_session_v5=sess; XSRF-TOKEN=xsrf123"
        );
        assert_eq!(headers.get(XSRF_HEADER).unwrap(), "xsrf123");
        assert_eq!(headers.get(ORIGIN).unwrap(), "https://note.com");
        assert_eq!(headers.get(REFERER).unwrap(), "https://note.com/notes/new");
    }

    #[test]
    fn test_session_headers_without_xsrf() {
        let session = NoteSession::from_token("sess");
        let headers = session_headers("https://note.com", &session).unwrap();

        assert_eq!(headers.get(COOKIE).unwrap(), "_note_session_v5=sess");
        assert!(headers.get(XSRF_HEADER).is_none());
    }

    #[test]
    fn test_session_headers_rejects_control_chars() {
        let session = NoteSession::from_token("bad\nvalue");
        let result = session_headers("https://note.com", &session);
        assert!(matches!(result, Err(AppError::InvalidHeader(_))));
    }

    #[test]
    fn test_parse_set_cookie() {
        assert_eq!(
            parse_set_cookie("_note_session_v5=abc; path=/; HttpOnly"),
            Some(("_note_session_v5".to_string(), "abc".to_string()))
        );
        assert_eq!(
            parse_set_cookie("XSRF-TOKEN=tok"),
            Some(("XSRF-TOKEN".to_string(), "tok".to_string()))
        );
        assert_eq!(parse_set_cookie("no-equals-sign"), None);
    }
}
