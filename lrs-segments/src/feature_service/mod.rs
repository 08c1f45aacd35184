//! LRS feature service access.
//!
//! One combined query reads both layers of an LRS map/feature service:
//!
//! - layer 0: milepost points, attributes only (`SRMP`, `ARM`, ...)
//! - layer 1: route lines with measured geometry, one feature per
//!   `RouteIdentifier` (route id plus `i`/`d` direction)
//!
//! Single-layer queries (statistics, distinct values, counts) go through
//! the same [`Transport`] via [`FeatureService::query_features`] and
//! [`FeatureService::query_count`].
//!
//! HTTP and decoding are pluggable ([`Transport`], [`ResponseDecoder`]);
//! [`FixtureTransport`] replays saved responses for tests and offline use.

mod client;
mod convert;
mod error;
mod layer_def;
mod mock;
mod types;
mod url;

pub use client::{
    FeatureService, FeatureServiceConfig, HttpTransport, JsonLayerDecoder, QueryGraphics,
    ResponseDecoder, Transport, decode_count, decode_feature_set,
};
pub use convert::{NormalizedLayer, convert_mileposts, convert_routes, to_graphics};
pub use error::FeatureServiceError;
pub use layer_def::{LayerDef, LayerDefs};
pub use mock::{FixtureTransport, StaticTransport};
pub use types::{
    CountResponse, FeatureSetResponse, LayerKind, LayerQueryRequest, LayerQueryResponse,
    QueryRequest, ResponseFeature, ResponseLayer, ResponsePoint, ResponsePolyline,
};
pub use url::{BadUrlError, ServiceType, ServiceUrlParts, is_query_url, parse_url, query_url};
