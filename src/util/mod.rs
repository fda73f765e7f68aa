//! Small helpers shared by the TUI and the CLI.

mod text;

pub use text::{display_width, sanitize_line, truncate_to_width};

use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum OpenError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Refusing to open {0} link")]
    UnsupportedScheme(String),
    #[error("Failed to open browser: {0}")]
    Launch(#[from] std::io::Error),
}

/// Check that a link from a remote API is a plain web URL.
///
/// Anything else (`file:`, `javascript:`, custom handlers) is rejected before
/// it reaches the desktop opener.
pub fn validate_url_for_open(raw: &str) -> Result<Url, OpenError> {
    let url = Url::parse(raw.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(OpenError::UnsupportedScheme(other.to_string())),
    }
}

/// Open a trailer or poster link in the default browser.
pub fn open_in_browser(raw: &str) -> Result<(), OpenError> {
    let url = validate_url_for_open(raw)?;
    open::that(url.as_str())?;
    tracing::debug!(url = %url, "Opened in browser");
    Ok(())
}
