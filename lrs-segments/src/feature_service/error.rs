//! Feature service error types.

use super::types::LayerKind;
use super::url::BadUrlError;

/// Errors from querying the LRS feature service and decoding its response.
#[derive(Debug, thiserror::Error)]
pub enum FeatureServiceError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Body was not JSON, or a layer did not match the expected types
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Decoded JSON lacks the `layers` array or a layer lacks `id`/`features`
    #[error("unexpected response shape: {reason}")]
    UnexpectedResponseShape { reason: String, body: Option<String> },

    /// The milepost or route layer is absent from the response
    #[error("no {0} layer in response")]
    MissingLayer(LayerKind),

    /// Layer id is neither the milepost nor the route layer
    #[error("unsupported layer type: layer id {id}")]
    UnsupportedLayerType { id: i64 },

    /// A feature's geometry or attributes could not be used
    #[error("invalid feature {index} in layer {layer_id}: {reason}")]
    InvalidFeature {
        layer_id: i64,
        index: usize,
        reason: String,
    },

    /// Service URL does not look like an ArcGIS REST endpoint
    #[error(transparent)]
    BadUrl(#[from] BadUrlError),

    /// Fixture files could not be read
    #[error("fixture error: {message}")]
    Fixture { message: String },
}

/// Cap on how much of a response body is kept for diagnostics.
pub(crate) const BODY_EXCERPT_CHARS: usize = 500;

pub(crate) fn body_excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FeatureServiceError::Api {
            status: 500,
            message: "Internal Server Error".into(),
        };
        assert_eq!(err.to_string(), "API error 500: Internal Server Error");

        let err = FeatureServiceError::MissingLayer(LayerKind::Route);
        assert_eq!(err.to_string(), "no route layer in response");

        let err = FeatureServiceError::UnsupportedLayerType { id: 2 };
        assert_eq!(err.to_string(), "unsupported layer type: layer id 2");

        let err = FeatureServiceError::UnexpectedResponseShape {
            reason: "missing layers array".into(),
            body: Some("{}".into()),
        };
        assert!(err.to_string().contains("missing layers array"));
    }

    #[test]
    fn excerpt_is_bounded() {
        let long = "x".repeat(2000);
        assert_eq!(body_excerpt(&long).len(), BODY_EXCERPT_CHARS);
        assert_eq!(body_excerpt("short"), "short");
    }
}
