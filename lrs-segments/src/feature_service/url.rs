//! ArcGIS REST service URL helpers.

use reqwest::Url;

/// Path prefix every ArcGIS REST service URL shares.
const REST_ROOT: [&str; 3] = ["arcgis", "rest", "services"];

/// Shape accepted by [`parse_url`], for error messages.
const EXPECTED_FORMAT: &str =
    "https://<host>/arcgis/rest/services[/<folder>]/<service>/<Map|Feature>Server[/<layer id>][/<operation>]";

const QUERY_FORMAT: &str = "<service or layer URL>/query";

/// A URL that does not match the expected ArcGIS REST shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("URL {url} does not match expected format \"{expected}\"")]
pub struct BadUrlError {
    pub url: String,
    pub expected: &'static str,
}

impl BadUrlError {
    fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            expected: EXPECTED_FORMAT,
        }
    }

    /// `url` was required to point at a `query` operation.
    pub fn not_a_query_url(url: &str) -> Self {
        Self {
            url: url.to_string(),
            expected: QUERY_FORMAT,
        }
    }
}

/// Whether a service is a map or a feature service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceType {
    Map,
    Feature,
}

/// Components of an ArcGIS REST service URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceUrlParts {
    pub folder: Option<String>,
    pub service_name: String,
    pub service_type: ServiceType,
    pub layer_id: Option<u32>,
    /// Whatever follows the service (or layer), e.g. `"query"`.
    pub operation: Option<String>,
}

fn is_word(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Split a service URL into folder, service, type, layer and operation.
///
/// # Examples
///
/// ```
/// use lrs_segments::feature_service::{ServiceType, parse_url};
///
/// let parts = parse_url(
///     "https://data.wsdot.wa.gov/arcgis/rest/services/Shared/AllStateRoutePoints/MapServer/0/query",
/// )
/// .unwrap();
/// assert_eq!(parts.folder.as_deref(), Some("Shared"));
/// assert_eq!(parts.service_name, "AllStateRoutePoints");
/// assert_eq!(parts.service_type, ServiceType::Map);
/// assert_eq!(parts.layer_id, Some(0));
/// assert_eq!(parts.operation.as_deref(), Some("query"));
///
/// assert!(parse_url("https://example.com").is_err());
/// ```
pub fn parse_url(url: &str) -> Result<ServiceUrlParts, BadUrlError> {
    let parsed = Url::parse(url).map_err(|_| BadUrlError::new(url))?;
    if parsed.scheme() != "https" || parsed.host_str().is_none() {
        return Err(BadUrlError::new(url));
    }

    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    if segments.len() <= REST_ROOT.len() || segments[..REST_ROOT.len()] != REST_ROOT {
        return Err(BadUrlError::new(url));
    }
    let rest = &segments[REST_ROOT.len()..];

    let server_idx = rest
        .iter()
        .position(|seg| *seg == "MapServer" || *seg == "FeatureServer")
        .ok_or_else(|| BadUrlError::new(url))?;

    let service_type = if rest[server_idx] == "MapServer" {
        ServiceType::Map
    } else {
        ServiceType::Feature
    };

    let (folder, service_name) = match &rest[..server_idx] {
        [service] => (None, *service),
        [folder, service] => (Some(folder.to_string()), *service),
        _ => return Err(BadUrlError::new(url)),
    };
    if !is_word(service_name) || folder.as_deref().is_some_and(|f| !is_word(f)) {
        return Err(BadUrlError::new(url));
    }

    let mut tail = &rest[server_idx + 1..];
    let layer_id = match tail.first().and_then(|seg| seg.parse::<u32>().ok()) {
        Some(id) => {
            tail = &tail[1..];
            Some(id)
        }
        None => None,
    };

    let operation = (!tail.is_empty()).then(|| tail.join("/"));

    Ok(ServiceUrlParts {
        folder,
        service_name: service_name.to_string(),
        service_type,
        layer_id,
        operation,
    })
}

/// Whether `url` ends with a `query` path segment.
///
/// With `trailing_slash` set, additionally require (`Some(true)`) or forbid
/// (`Some(false)`) a trailing `/`.
pub fn is_query_url(url: &str, trailing_slash: Option<bool>) -> bool {
    let (trimmed, has_slash) = match url.strip_suffix('/') {
        Some(t) => (t, true),
        None => (url, false),
    };

    let Some(last) = trimmed.rsplit('/').next() else {
        return false;
    };
    if !last.eq_ignore_ascii_case("query") {
        return false;
    }

    trailing_slash.is_none_or(|wanted| wanted == has_slash)
}

/// The `query` endpoint for a service or layer URL.
///
/// URLs that already point at `query` are returned unchanged.
pub fn query_url(service_url: &str) -> Result<Url, BadUrlError> {
    if is_query_url(service_url, None) {
        return Url::parse(service_url).map_err(|_| BadUrlError::new(service_url));
    }

    let mut base = service_url.to_string();
    if !base.ends_with('/') {
        base.push('/');
    }

    Url::parse(&base)
        .and_then(|u| u.join("query"))
        .map_err(|_| BadUrlError::new(service_url))
}
