//! Feature service query façade and HTTP transport.
//!
//! [`FeatureService`] issues one combined milepost + route query, checks the
//! shape of the response and hands both layers to the normalizer. Fetching
//! bytes and decoding them are separate seams ([`Transport`] and
//! [`ResponseDecoder`]) so tests and alternative services can swap either.

use std::future::Future;
use std::time::Duration;

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::{MilepostGraphic, RouteGraphic};

use super::convert::{NormalizedLayer, to_graphics};
use super::error::{FeatureServiceError, body_excerpt};
use super::types::{
    CountResponse, FeatureSetResponse, LayerKind, LayerQueryRequest, LayerQueryResponse,
    QueryRequest,
};
use super::url::{BadUrlError, is_query_url, query_url};

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the HTTP transport.
#[derive(Debug, Clone)]
pub struct FeatureServiceConfig {
    /// Service (or layer) URL; `query` is appended when missing.
    pub service_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl FeatureServiceConfig {
    pub fn new(service_url: impl Into<String>) -> Self {
        Self {
            service_url: service_url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Executes a query and returns the raw response body.
pub trait Transport {
    fn fetch<R: QueryRequest + Sync>(
        &self,
        request: &R,
    ) -> impl Future<Output = Result<String, FeatureServiceError>> + Send;
}

/// Turns a response body into a shape-checked [`LayerQueryResponse`].
pub trait ResponseDecoder {
    fn decode(&self, body: &str) -> Result<LayerQueryResponse, FeatureServiceError>;
}

/// Queries the service over HTTP GET.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    query_url: Url,
}

impl HttpTransport {
    pub fn new(config: FeatureServiceConfig) -> Result<Self, FeatureServiceError> {
        let query_url = query_url(&config.service_url)?;
        Self::with_query_url(query_url, config.timeout_secs)
    }

    fn with_query_url(query_url: Url, timeout_secs: u64) -> Result<Self, FeatureServiceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self { http, query_url })
    }

    /// Like [`HttpTransport::new`], but `service_url` must already end with
    /// `query`; nothing is appended.
    pub fn for_query_url(config: FeatureServiceConfig) -> Result<Self, FeatureServiceError> {
        if !is_query_url(&config.service_url, None) {
            return Err(BadUrlError::not_a_query_url(&config.service_url).into());
        }
        let query_url = query_url(&config.service_url)?;
        Self::with_query_url(query_url, config.timeout_secs)
    }

    pub fn query_url(&self) -> &Url {
        &self.query_url
    }
}

impl Transport for HttpTransport {
    async fn fetch<R: QueryRequest + Sync>(
        &self,
        request: &R,
    ) -> Result<String, FeatureServiceError> {
        debug!(url = %self.query_url, key = %request.key(), "querying feature service");

        let response = self
            .http
            .get(self.query_url.clone())
            .query(&request.query_pairs())
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeatureServiceError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(response.text().await?)
    }
}

/// Default decoder: JSON, with the envelope validated before typing.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLayerDecoder;

impl ResponseDecoder for JsonLayerDecoder {
    fn decode(&self, body: &str) -> Result<LayerQueryResponse, FeatureServiceError> {
        let value = service_json(body)?;
        check_envelope(&value).map_err(|reason| shape_error(reason, body))?;
        typed(value, body)
    }
}

/// Parse a response body, turning an ArcGIS error object into
/// [`FeatureServiceError::Api`].
fn service_json(body: &str) -> Result<Value, FeatureServiceError> {
    let value: Value = serde_json::from_str(body).map_err(|e| FeatureServiceError::Json {
        message: e.to_string(),
        body: Some(body_excerpt(body)),
    })?;

    // ArcGIS reports query errors as 200 responses with an error object.
    if let Some(error) = value.get("error") {
        return Err(FeatureServiceError::Api {
            status: error
                .get("code")
                .and_then(Value::as_u64)
                .and_then(|c| u16::try_from(c).ok())
                .unwrap_or(0),
            message: error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown service error")
                .to_string(),
        });
    }

    Ok(value)
}

fn typed<T: DeserializeOwned>(value: Value, body: &str) -> Result<T, FeatureServiceError> {
    serde_json::from_value(value).map_err(|e| FeatureServiceError::Json {
        message: e.to_string(),
        body: Some(body_excerpt(body)),
    })
}

fn shape_error(reason: impl Into<String>, body: &str) -> FeatureServiceError {
    FeatureServiceError::UnexpectedResponseShape {
        reason: reason.into(),
        body: Some(body_excerpt(body)),
    }
}

/// `layers` must be an array of objects with an integer `id` and a
/// `features` array.
fn check_envelope(value: &Value) -> Result<(), String> {
    let layers = value
        .get("layers")
        .ok_or("missing layers")?
        .as_array()
        .ok_or("layers is not an array")?;

    for (i, layer) in layers.iter().enumerate() {
        if layer.get("id").and_then(Value::as_i64).is_none() {
            return Err(format!("layer {i} has no numeric id"));
        }
        if !layer.get("features").is_some_and(Value::is_array) {
            return Err(format!("layer {i} has no features array"));
        }
    }

    Ok(())
}

/// Both layers of a route segment query, normalized to graphics.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryGraphics {
    pub mileposts: Vec<MilepostGraphic>,
    pub routes: Vec<RouteGraphic>,
    pub exceeded_transfer_limit: bool,
}

/// Decode a single-layer response; `features` must be an array.
pub fn decode_feature_set(body: &str) -> Result<FeatureSetResponse, FeatureServiceError> {
    let value = service_json(body)?;
    if !value.get("features").is_some_and(Value::is_array) {
        return Err(shape_error("missing features array", body));
    }
    typed(value, body)
}

/// Decode a `returnCountOnly` response.
pub fn decode_count(body: &str) -> Result<u64, FeatureServiceError> {
    let value = service_json(body)?;
    if !value.get("count").is_some_and(Value::is_u64) {
        return Err(shape_error("missing count", body));
    }
    typed::<CountResponse>(value, body).map(|c| c.count)
}

/// The feature query façade.
#[derive(Debug, Clone)]
pub struct FeatureService<T, D = JsonLayerDecoder> {
    transport: T,
    decoder: D,
}

impl<T: Transport> FeatureService<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            decoder: JsonLayerDecoder,
        }
    }
}

impl<T: Transport, D: ResponseDecoder> FeatureService<T, D> {
    pub fn with_decoder(transport: T, decoder: D) -> Self {
        Self { transport, decoder }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run a single-layer query and return its raw features.
    pub async fn query_features<R: QueryRequest + Sync>(
        &self,
        request: &R,
    ) -> Result<FeatureSetResponse, FeatureServiceError> {
        let body = self.transport.fetch(request).await?;
        let response = decode_feature_set(&body)?;

        if response.exceeded_transfer_limit {
            warn!(
                key = %request.key(),
                "feature service exceeded its transfer limit; results may be truncated"
            );
        }
        debug!(key = %request.key(), features = response.features.len(), "feature set received");

        Ok(response)
    }

    /// Run a `returnCountOnly` query.
    pub async fn query_count<R: QueryRequest + Sync>(
        &self,
        request: &R,
    ) -> Result<u64, FeatureServiceError> {
        let body = self.transport.fetch(request).await?;
        decode_count(&body)
    }

    /// Run the query and return both layers as graphics.
    ///
    /// Fails with [`FeatureServiceError::MissingLayer`] when either the
    /// milepost (id 0) or route (id 1) layer is absent.
    pub async fn query(
        &self,
        request: &LayerQueryRequest,
    ) -> Result<QueryGraphics, FeatureServiceError> {
        let body = self.transport.fetch(request).await?;
        let response = self.decoder.decode(&body)?;

        if response.exceeded_transfer_limit {
            warn!(
                route = %request.route_key,
                "feature service exceeded its transfer limit; results may be truncated"
            );
        }

        let milepost_layer = response
            .layer(LayerKind::Milepost)
            .ok_or(FeatureServiceError::MissingLayer(LayerKind::Milepost))?;
        let route_layer = response
            .layer(LayerKind::Route)
            .ok_or(FeatureServiceError::MissingLayer(LayerKind::Route))?;

        let NormalizedLayer::Mileposts(mileposts) = to_graphics(milepost_layer)? else {
            return Err(FeatureServiceError::MissingLayer(LayerKind::Milepost));
        };
        let NormalizedLayer::Routes(routes) = to_graphics(route_layer)? else {
            return Err(FeatureServiceError::MissingLayer(LayerKind::Route));
        };

        debug!(
            route = %request.route_key,
            mileposts = mileposts.len(),
            routes = routes.len(),
            "feature service responded"
        );

        Ok(QueryGraphics {
            mileposts,
            routes,
            exceeded_transfer_limit: response.exceeded_transfer_limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_service::mock::StaticTransport;

    fn request() -> LayerQueryRequest {
        LayerQueryRequest::new(vec![], 3857, "002")
    }

    #[test]
    fn config_builder() {
        let config =
            FeatureServiceConfig::new("https://example.com/arcgis/rest/services/A/FeatureServer")
                .with_timeout(60);
        assert_eq!(config.timeout_secs, 60);

        let config = FeatureServiceConfig::new("x");
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn transport_appends_query() {
        let transport = HttpTransport::new(FeatureServiceConfig::new(
            "https://example.com/arcgis/rest/services/Shared/LRS/FeatureServer",
        ))
        .unwrap();
        assert_eq!(
            transport.query_url().as_str(),
            "https://example.com/arcgis/rest/services/Shared/LRS/FeatureServer/query"
        );
    }

    #[test]
    fn transport_rejects_relative_url() {
        let err = HttpTransport::new(FeatureServiceConfig::new("LRS/FeatureServer")).unwrap_err();
        assert!(matches!(err, FeatureServiceError::BadUrl(_)));
    }

    #[test]
    fn decode_rejects_non_json() {
        let err = JsonLayerDecoder.decode("<html>").unwrap_err();
        assert!(matches!(err, FeatureServiceError::Json { .. }));
    }

    #[test]
    fn decode_rejects_missing_layers() {
        let err = JsonLayerDecoder.decode(r#"{"features": []}"#).unwrap_err();
        match err {
            FeatureServiceError::UnexpectedResponseShape { reason, .. } => {
                assert_eq!(reason, "missing layers")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn decode_rejects_layer_without_id_or_features() {
        let err = JsonLayerDecoder
            .decode(r#"{"layers": [{"features": []}]}"#)
            .unwrap_err();
        assert!(matches!(err, FeatureServiceError::UnexpectedResponseShape { .. }));

        let err = JsonLayerDecoder
            .decode(r#"{"layers": [{"id": "0", "features": []}]}"#)
            .unwrap_err();
        assert!(matches!(err, FeatureServiceError::UnexpectedResponseShape { .. }));

        let err = JsonLayerDecoder
            .decode(r#"{"layers": [{"id": 0, "features": {}}]}"#)
            .unwrap_err();
        assert!(matches!(err, FeatureServiceError::UnexpectedResponseShape { .. }));
    }

    #[test]
    fn decode_service_error_object() {
        let err = JsonLayerDecoder
            .decode(r#"{"error": {"code": 400, "message": "Invalid where clause"}}"#)
            .unwrap_err();
        match err {
            FeatureServiceError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid where clause");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn decode_single_layer_feature_set() {
        let set = decode_feature_set(r#"{"features": [{"attributes": {"SRMP": 1}}]}"#).unwrap();
        assert_eq!(set.features.len(), 1);

        let err = decode_feature_set(r#"{"layers": []}"#).unwrap_err();
        assert!(matches!(err, FeatureServiceError::UnexpectedResponseShape { .. }));

        let err = decode_feature_set(r#"{"error": {"code": 498, "message": "Invalid token"}}"#)
            .unwrap_err();
        assert!(matches!(err, FeatureServiceError::Api { status: 498, .. }));
    }

    #[test]
    fn decode_count_response() {
        assert_eq!(decode_count(r#"{"count": 1234}"#).unwrap(), 1234);
        assert!(matches!(
            decode_count(r#"{"count": "many"}"#),
            Err(FeatureServiceError::UnexpectedResponseShape { .. })
        ));
    }

    #[test]
    fn query_url_transport_requires_query_suffix() {
        let err = HttpTransport::for_query_url(FeatureServiceConfig::new("https://example.com"))
            .unwrap_err();
        match err {
            FeatureServiceError::BadUrl(bad) => assert_eq!(bad.url, "https://example.com"),
            other => panic!("unexpected error: {other:?}"),
        }

        let url = "https://example.com/arcgis/rest/services/A/MapServer/0/query";
        let transport = HttpTransport::for_query_url(FeatureServiceConfig::new(url)).unwrap();
        assert_eq!(transport.query_url().as_str(), url);
    }

    #[tokio::test]
    async fn query_requires_both_layers() {
        let service = FeatureService::new(StaticTransport::new(
            r#"{"layers": [{"id": 1, "features": []}]}"#,
        ));
        let err = service.query(&request()).await.unwrap_err();
        assert!(matches!(
            err,
            FeatureServiceError::MissingLayer(LayerKind::Milepost)
        ));

        let service = FeatureService::new(StaticTransport::new(
            r#"{"layers": [{"id": 0, "features": []}]}"#,
        ));
        let err = service.query(&request()).await.unwrap_err();
        assert!(matches!(err, FeatureServiceError::MissingLayer(LayerKind::Route)));
    }

    #[tokio::test]
    async fn query_tolerates_extra_layers_and_flags_truncation() {
        let service = FeatureService::new(StaticTransport::new(
            r#"{
                "layers": [
                    {"id": 0, "features": []},
                    {"id": 1, "features": []},
                    {"id": 7, "features": []}
                ],
                "exceededTransferLimit": true
            }"#,
        ));
        let graphics = service.query(&request()).await.unwrap();
        assert!(graphics.mileposts.is_empty());
        assert!(graphics.routes.is_empty());
        assert!(graphics.exceeded_transfer_limit);
    }

    struct UpperCaseKeys;

    impl ResponseDecoder for UpperCaseKeys {
        fn decode(&self, body: &str) -> Result<LayerQueryResponse, FeatureServiceError> {
            JsonLayerDecoder.decode(&body.replace("LAYERS", "layers"))
        }
    }

    #[tokio::test]
    async fn custom_decoder_is_used() {
        let body = r#"{"LAYERS": [{"id": 0, "features": []}, {"id": 1, "features": []}]}"#;
        let service = FeatureService::with_decoder(StaticTransport::new(body), UpperCaseKeys);
        assert!(service.query(&request()).await.is_ok());
    }
}
