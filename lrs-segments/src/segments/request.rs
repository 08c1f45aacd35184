//! Route segment query options.

use serde::Serialize;

use crate::domain::{LrsDirection, Milepost, RouteId, SpatialReference};
use crate::feature_service::{LayerDef, LayerKind, LayerQueryRequest};
use crate::predicate::{MILEPOST_FIELDS, ROUTE_FIELDS, RoutePredicates};

use super::error::QueryInputError;

fn fields(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Default output spatial reference (Web Mercator).
pub const DEFAULT_OUT_SR: u32 = SpatialReference::WEB_MERCATOR.wkid;

/// What to resolve: a route, optionally one direction, and a milepost range.
///
/// # Examples
///
/// ```
/// use lrs_segments::domain::LrsDirection;
/// use lrs_segments::segments::RouteSegmentQuery;
///
/// let query = RouteSegmentQuery::parse("002", "118", "119B")
///     .unwrap()
///     .with_direction(LrsDirection::Increase);
/// assert_eq!(query.route_key(), "002i");
/// assert_eq!(query.end.to_string(), "119B");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSegmentQuery {
    pub route_id: RouteId,
    #[serde(rename = "routeDirection", skip_serializing_if = "Option::is_none")]
    pub direction: Option<LrsDirection>,
    #[serde(rename = "beginMilepost")]
    pub begin: Milepost,
    #[serde(rename = "endMilepost")]
    pub end: Milepost,
    #[serde(rename = "outSR")]
    pub out_sr: u32,
}

impl RouteSegmentQuery {
    /// A query covering both directions, output in Web Mercator.
    pub fn new(route_id: RouteId, begin: Milepost, end: Milepost) -> Self {
        Self {
            route_id,
            direction: None,
            begin,
            end,
            out_sr: DEFAULT_OUT_SR,
        }
    }

    /// Build a query from text input, e.g. `("005", "10", "12.5B")`.
    pub fn parse(route_id: &str, begin: &str, end: &str) -> Result<Self, QueryInputError> {
        Ok(Self::new(
            RouteId::parse(route_id)?,
            Milepost::from_text(begin)?,
            Milepost::from_text(end)?,
        ))
    }

    pub fn with_direction(mut self, direction: LrsDirection) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn with_out_sr(mut self, wkid: u32) -> Self {
        self.out_sr = wkid;
        self
    }

    pub fn predicates(&self) -> RoutePredicates {
        RoutePredicates::build(&self.route_id, self.direction, &self.begin, &self.end)
    }

    /// `"002"` for both directions, `"002i"` for one.
    pub fn route_key(&self) -> String {
        match self.direction {
            Some(direction) => self.route_id.with_direction(direction),
            None => self.route_id.to_string(),
        }
    }

    /// The combined milepost + route layer request.
    pub fn layer_request(&self) -> LayerQueryRequest {
        let RoutePredicates {
            milepost_where,
            route_where,
        } = self.predicates();

        LayerQueryRequest::new(
            vec![
                LayerDef::new(LayerKind::Milepost.id(), milepost_where, fields(MILEPOST_FIELDS)),
                LayerDef::new(LayerKind::Route.id(), route_where, fields(ROUTE_FIELDS)),
            ],
            self.out_sr,
            self.route_key(),
        )
    }
}
