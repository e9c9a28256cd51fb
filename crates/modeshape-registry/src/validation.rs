//! Validation of server connection properties
//!
//! Pure functions; callers decide whether a failure blocks an operation.

use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("URL '{url}' has no host")]
    MissingHost { url: String },

    #[error("URL '{url}' has no port")]
    MissingPort { url: String },

    #[error("User must not be empty")]
    EmptyUser,
}

/// A URL is valid when it parses, names a host and spells out a port.
///
/// `http://host:80` is accepted even though 80 is the scheme default;
/// `http://host` is not.
pub fn is_url_valid(url: &str) -> Result<(), ValidationError> {
    let parsed = Url::parse(url).map_err(|e| ValidationError::InvalidUrl {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::MissingHost {
            url: url.to_string(),
        });
    }

    // Url normalizes default ports away, so fall back to the raw text
    if parsed.port().is_none() && !has_explicit_port(url) {
        return Err(ValidationError::MissingPort {
            url: url.to_string(),
        });
    }

    Ok(())
}

pub fn is_user_valid(user: &str) -> Result<(), ValidationError> {
    if user.is_empty() {
        return Err(ValidationError::EmptyUser);
    }
    Ok(())
}

/// Every password, including none, is currently acceptable.
pub fn is_password_valid(_password: Option<&str>) -> Result<(), ValidationError> {
    Ok(())
}

/// Checks URL, then user, then password, stopping at the first failure.
pub fn is_server_valid(
    url: &str,
    user: &str,
    password: Option<&str>,
) -> Result<(), ValidationError> {
    is_url_valid(url)?;
    is_user_valid(user)?;
    is_password_valid(password)
}

fn has_explicit_port(raw: &str) -> bool {
    let rest = raw.split_once("://").map_or(raw, |(_, r)| r);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or("");
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, hp)| hp);

    let port = match host_port.strip_prefix('[') {
        Some(ipv6) => ipv6.split_once("]:").map(|(_, p)| p),
        None => host_port.rsplit_once(':').map(|(_, p)| p),
    };

    port.is_some_and(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
}
