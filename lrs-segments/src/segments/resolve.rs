//! Resolving a milepost range to route segments.
//!
//! [`SegmentResolver::resolve`] makes the single feature query and returns
//! a lazy [`RouteSegments`] iterator. Each call to `next` reconciles and
//! cuts one route line, in the order the route layer listed them, so a
//! caller that stops early never pays for the remaining routes. The first
//! error ends the sequence.

use futures::Stream;
use serde::Serialize;
use tracing::debug;

use crate::domain::{MilepostGraphic, Polyline, RouteGraphic};
use crate::feature_service::{
    FeatureService, FeatureServiceConfig, HttpTransport, JsonLayerDecoder, ResponseDecoder,
    Transport,
};

use super::config::ResolveConfig;
use super::error::SegmentError;
use super::locate::{LocateBetween, MeasureInterpolator};
use super::reconcile::{ResolvedMeasures, resolve_measures};
use super::request::RouteSegmentQuery;

/// One resolved route segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSegment {
    /// `RouteIdentifier` of the route line, direction included (`"002i"`).
    pub route_id: String,
    pub route_graphic: RouteGraphic,
    /// Every milepost record the query returned.
    pub milepost_graphics: Vec<MilepostGraphic>,
    pub route_segment: Polyline,
    pub measures: ResolvedMeasures,
    pub options: RouteSegmentQuery,
}

impl RouteSegment {
    /// The segment as plain `geo` geometry.
    pub fn to_multi_line_string(&self) -> geo::MultiLineString {
        self.route_segment.to_multi_line_string()
    }
}

/// Cut the route line between two measures.
///
/// Fails with [`SegmentError::SegmentNotFound`] when locate-between yields
/// nothing.
pub fn extract_segment<L: LocateBetween>(
    locator: &L,
    route: &RouteGraphic,
    begin_measure: f64,
    end_measure: f64,
) -> Result<Polyline, SegmentError> {
    locator
        .execute_many(std::slice::from_ref(&route.geometry), begin_measure, end_measure)
        .into_iter()
        .next()
        .flatten()
        .ok_or_else(|| SegmentError::SegmentNotFound {
            route_identifier: route.attributes.route_identifier.clone(),
            begin_arm: begin_measure,
            end_arm: end_measure,
        })
}

/// Lazy sequence of route segments for one query.
pub struct RouteSegments<L = MeasureInterpolator> {
    routes: std::vec::IntoIter<RouteGraphic>,
    mileposts: Vec<MilepostGraphic>,
    query: RouteSegmentQuery,
    locator: L,
    config: ResolveConfig,
    failed: bool,
}

impl<L: LocateBetween> RouteSegments<L> {
    pub fn new(
        routes: Vec<RouteGraphic>,
        mileposts: Vec<MilepostGraphic>,
        query: RouteSegmentQuery,
        locator: L,
        config: ResolveConfig,
    ) -> Self {
        Self {
            routes: routes.into_iter(),
            mileposts,
            query,
            locator,
            config,
            failed: false,
        }
    }

    /// Route lines not yet processed.
    pub fn remaining(&self) -> usize {
        if self.failed { 0 } else { self.routes.len() }
    }

    /// Adapt into a [`Stream`] for async callers. Still lazy.
    pub fn into_stream(self) -> impl Stream<Item = Result<RouteSegment, SegmentError>> {
        futures::stream::iter(self)
    }

    fn segment_for(&self, route: RouteGraphic) -> Result<RouteSegment, SegmentError> {
        let query = &self.query;
        let measures = resolve_measures(&route, &self.mileposts, &query.begin, &query.end)?;

        let route_segment = extract_segment(
            &self.locator,
            &route,
            self.config.to_measure(measures.begin_arm),
            self.config.to_measure(measures.end_arm),
        )?;

        debug!(
            route = %route.attributes.route_identifier,
            begin_arm = measures.begin_arm,
            end_arm = measures.end_arm,
            paths = route_segment.path_count(),
            "resolved route segment"
        );

        Ok(RouteSegment {
            route_id: route.attributes.route_identifier.clone(),
            route_graphic: route,
            milepost_graphics: self.mileposts.clone(),
            route_segment,
            measures,
            options: self.query.clone(),
        })
    }
}

impl<L: LocateBetween> Iterator for RouteSegments<L> {
    type Item = Result<RouteSegment, SegmentError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let route = self.routes.next()?;
        let result = self.segment_for(route);
        self.failed = result.is_err();
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining()))
    }
}

impl<L: LocateBetween> std::iter::FusedIterator for RouteSegments<L> {}

/// Resolves milepost ranges against one feature service.
pub struct SegmentResolver<T, D = JsonLayerDecoder, L = MeasureInterpolator> {
    service: FeatureService<T, D>,
    locator: L,
    config: ResolveConfig,
}

impl<T: Transport> SegmentResolver<T> {
    pub fn new(service: FeatureService<T>) -> Self {
        Self {
            service,
            locator: MeasureInterpolator,
            config: ResolveConfig::default(),
        }
    }
}

impl<T: Transport, D: ResponseDecoder, L: LocateBetween + Clone> SegmentResolver<T, D, L> {
    /// Use a different locate-between implementation.
    pub fn with_locator<L2: LocateBetween + Clone>(self, locator: L2) -> SegmentResolver<T, D, L2> {
        SegmentResolver {
            service: self.service,
            locator,
            config: self.config,
        }
    }

    pub fn with_config(mut self, config: ResolveConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ResolveConfig {
        &self.config
    }

    /// Query the service and return the segments lazily.
    ///
    /// The feature query is the only network call; errors from it are
    /// returned here, before any segment is produced.
    pub async fn resolve(
        &self,
        query: &RouteSegmentQuery,
    ) -> Result<RouteSegments<L>, SegmentError> {
        let request = query.layer_request();
        let graphics = self.service.query(&request).await?;

        Ok(RouteSegments::new(
            graphics.routes,
            graphics.mileposts,
            query.clone(),
            self.locator.clone(),
            self.config,
        ))
    }
}

/// Resolve a query against the service at `service_url` over HTTP.
pub async fn resolve_route_segments(
    service_url: &str,
    query: &RouteSegmentQuery,
) -> Result<RouteSegments, SegmentError> {
    let transport = HttpTransport::new(FeatureServiceConfig::new(service_url))?;
    SegmentResolver::new(FeatureService::new(transport))
        .resolve(query)
        .await
}
