/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/2/26
******************************************************************************/

// The editor rejects requests that do not look like a browser session.
pub(crate) const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub(crate) const SESSION_COOKIE: &str = "_note_session_v5";
pub(crate) const LEGACY_SESSION_COOKIE: &str = "session";
pub(crate) const XSRF_COOKIE: &str = "XSRF-TOKEN";
pub(crate) const XSRF_HEADER: &str = "X-XSRF-TOKEN";

pub(crate) const SIGN_IN_PATH: &str = "/api/v1/sessions/sign_in";
pub(crate) const TEXT_NOTES_PATH: &str = "/api/v1/text_notes";
pub(crate) const UPLOAD_IMAGE_PATH: &str = "/api/v1/upload_image";
pub(crate) const EDITOR_PATH: &str = "/notes/new";
pub(crate) const NOTE_URL_PREFIX: &str = "/notes/";

pub(crate) const GENERATE_CONTENT_PATH_PREFIX: &str = "/v1beta/models/";
pub(crate) const TXT2IMG_PATH: &str = "/sdapi/v1/txt2img";

// Titles much longer than this get truncated by the editor UI.
pub(crate) const MAX_TITLE_CHARS: usize = 100;

pub(crate) const BODY_EXCERPT_CHARS: usize = 256;
