use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    Server(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to parse {what}: {reason}")]
    Parse { what: String, reason: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl FetchError {
    /// Truncate a response body to avoid logging a whole HTML page
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, url: &str, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            404 | 410 => FetchError::NotFound(url.to_string()),
            429 => FetchError::RateLimited,
            500..=599 => FetchError::Server(format!("{} ({}): {}", url, status, truncated)),
            _ => FetchError::InvalidResponse(format!("Status {} for {}: {}", status, url, truncated)),
        }
    }

    pub fn parse(what: impl Into<String>, reason: impl Into<String>) -> Self {
        FetchError::Parse {
            what: what.into(),
            reason: reason.into(),
        }
    }

    /// Whether the entity simply does not exist, as opposed to a transient failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound(_))
    }

    /// Retrying would give the same answer: the page is missing or unreadable
    pub fn is_permanent(&self) -> bool {
        matches!(self, FetchError::NotFound(_) | FetchError::Parse { .. })
    }
}

/// Whether `err` was caused by a permanent [`FetchError`].
///
/// Only these may be degraded to null fields inside a cached computation;
/// anything else has to propagate so the result is not stored.
pub fn is_permanent(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<FetchError>())
        .any(FetchError::is_permanent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_maps_codes() {
        let url = "rider/nobody";
        assert!(FetchError::from_status(StatusCode::NOT_FOUND, url, "").is_not_found());
        assert!(matches!(
            FetchError::from_status(StatusCode::TOO_MANY_REQUESTS, url, ""),
            FetchError::RateLimited
        ));
        assert!(matches!(
            FetchError::from_status(StatusCode::BAD_GATEWAY, url, "oops"),
            FetchError::Server(_)
        ));
        assert!(matches!(
            FetchError::from_status(StatusCode::FORBIDDEN, url, ""),
            FetchError::InvalidResponse(_)
        ));
    }

    #[test]
    fn test_permanent_errors_survive_context() {
        use anyhow::Context;

        let missing: anyhow::Result<()> = Err(FetchError::NotFound("rider/x".into())).context("Failed to fetch rider");
        assert!(is_permanent(&missing.unwrap_err()));

        let unreadable = anyhow::Error::new(FetchError::parse("rider page", "no name"));
        assert!(is_permanent(&unreadable));

        let server: anyhow::Result<()> = Err(FetchError::Server("502".into())).context("Failed to fetch rider");
        assert!(!is_permanent(&server.unwrap_err()));
        assert!(!is_permanent(&anyhow::Error::new(FetchError::RateLimited)));
        assert!(!is_permanent(&anyhow::anyhow!("cache write failed")));
    }

    #[test]
    fn test_truncate_body_respects_char_boundaries() {
        let body = "é".repeat(400);
        let truncated = FetchError::truncate_body(&body);
        assert!(truncated.contains("truncated, 800 total bytes"));
        assert!(truncated.starts_with("éé"));
    }
}
