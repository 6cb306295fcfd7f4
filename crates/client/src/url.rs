//! Base URL canonicalization for the resource endpoint.

/// Error type for URL canonicalization failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("resource id {0:?} cannot be used as a path segment")]
    InvalidSegment(String),
}

/// Canonicalize the endpoint base URL so request paths can be joined onto it.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Default scheme to https:// if missing
/// 3. Lowercase the host
/// 4. Drop query string and fragment
/// 5. Ensure the path ends with `/`, so `https://api.example.com/v1` keeps `/v1`
pub fn canonicalize_base(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let url_str = if trimmed.contains("://") { trimmed.to_string() } else { format!("https://{trimmed}") };

    let mut parsed = url::Url::parse(&url_str).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if let Some(host) = parsed.host_str() {
        let host = host.to_lowercase();
        parsed
            .set_host(Some(&host))
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }

    parsed.set_query(None);
    parsed.set_fragment(None);

    if !parsed.path().ends_with('/') {
        let path = format!("{}/", parsed.path());
        parsed.set_path(&path);
    }

    Ok(parsed)
}

/// Resolve an absolute resource path (`/users/1`) against a canonical base.
pub fn resolve(base: &url::Url, path: &str) -> Result<url::Url, UrlError> {
    base.join(path.trim_start_matches('/'))
        .map_err(|e| UrlError::InvalidUrl(e.to_string()))
}

/// Resolve a collection path, then append `resource` as one encoded path
/// segment, so `/`, `?` and `#` inside an id stay part of the id.
pub fn resolve_resource(base: &url::Url, path: &str, resource: Option<&str>) -> Result<url::Url, UrlError> {
    let mut url = resolve(base, path)?;
    let Some(id) = resource else {
        return Ok(url);
    };

    // `push` silently drops dot segments.
    if matches!(id, "" | "." | "..") {
        return Err(UrlError::InvalidSegment(id.to_string()));
    }

    url.path_segments_mut()
        .map_err(|()| UrlError::InvalidUrl("base URL cannot take path segments".into()))?
        .pop_if_empty()
        .push(id);
    Ok(url)
}
