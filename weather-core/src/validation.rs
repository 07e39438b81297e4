//! Outbound URL checks.

use url::Url;

use crate::error::{Error, Result};

const SECURE_SCHEME: &str = "https";

/// Parse `raw` and accept it only if it is an `https` URL with a non-empty host.
pub fn validate_url(raw: &str) -> Result<Url> {
    let parsed = Url::parse(raw).map_err(|_| Error::InvalidUrl(raw.to_string()))?;

    let has_host = parsed.host_str().is_some_and(|host| !host.is_empty());
    if parsed.scheme() != SECURE_SCHEME || !has_host {
        return Err(Error::InvalidUrl(raw.to_string()));
    }

    Ok(parsed)
}
