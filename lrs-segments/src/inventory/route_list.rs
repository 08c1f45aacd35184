//! Distinct route identifiers of the LRS route layer.
//!
//! The layer caps how many records one response may hold, so the list is
//! read in pages: a count query first, then one `resultOffset` query per
//! page, all pages in flight at once.

use std::collections::BTreeSet;

use futures::future::try_join_all;
use serde::Deserialize;
use tracing::debug;

use crate::feature_service::{
    FeatureService, FeatureServiceConfig, FeatureServiceError, HttpTransport, QueryRequest,
    ResponseDecoder, Transport,
};

use super::feature_attributes;

/// Records requested per page.
pub const DEFAULT_PAGE_SIZE: u64 = 1000;

const ROUTE_ORDER: &str =
    "StateRouteNumber,RelatedRouteQualifier,RelatedRouteType,InventoryDirection DESC";

/// A query over every route identifier: either the count or one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteListQuery {
    Count,
    Page { offset: u64, count: u64 },
}

impl QueryRequest for RouteListQuery {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("f", "json".to_string()),
            ("where", "1=1".to_string()),
            ("outFields", "RouteIdentifier".to_string()),
            ("returnDistinctValues", "true".to_string()),
            ("returnGeometry", "false".to_string()),
            ("orderByFields", ROUTE_ORDER.to_string()),
        ];

        match self {
            RouteListQuery::Count => pairs.push(("returnCountOnly", "true".to_string())),
            RouteListQuery::Page { offset, count } => {
                pairs.push(("resultOffset", offset.to_string()));
                pairs.push(("resultRecordCount", count.to_string()));
            }
        }

        pairs
    }

    fn key(&self) -> String {
        match self {
            RouteListQuery::Count => "route-count".to_string(),
            RouteListQuery::Page { offset, .. } => format!("routes-{offset}"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RouteIdentifierAttributes {
    #[serde(rename = "RouteIdentifier")]
    route_identifier: String,
}

/// Number of route identifiers the layer holds.
pub async fn route_count<T: Transport, D: ResponseDecoder>(
    service: &FeatureService<T, D>,
) -> Result<u64, FeatureServiceError> {
    service.query_count(&RouteListQuery::Count).await
}

/// Every route identifier, deduplicated and sorted.
///
/// A `page_size` of zero is treated as one.
pub async fn route_identifiers<T: Transport, D: ResponseDecoder>(
    service: &FeatureService<T, D>,
    page_size: u64,
) -> Result<Vec<String>, FeatureServiceError> {
    let page_size = page_size.max(1);
    let total = route_count(service).await?;

    let pages: Vec<RouteListQuery> = std::iter::successors(Some(0u64), |offset| {
        offset.checked_add(page_size)
    })
    .take_while(|offset| *offset < total)
    .map(|offset| RouteListQuery::Page {
        offset,
        count: page_size,
    })
    .collect();

    let sets = try_join_all(pages.iter().map(|page| service.query_features(page))).await?;

    let routes: BTreeSet<String> = sets
        .iter()
        .flat_map(|set| feature_attributes::<RouteIdentifierAttributes>(set, "route list"))
        .map(|attrs| attrs.route_identifier)
        .collect();

    debug!(total, pages = pages.len(), routes = routes.len(), "fetched route list");

    Ok(routes.into_iter().collect())
}

/// [`route_identifiers`] against the route layer at `service_url` over HTTP,
/// in pages of [`DEFAULT_PAGE_SIZE`].
pub async fn fetch_route_identifiers(
    service_url: &str,
) -> Result<Vec<String>, FeatureServiceError> {
    let transport = HttpTransport::new(FeatureServiceConfig::new(service_url))?;
    route_identifiers(&FeatureService::new(transport), DEFAULT_PAGE_SIZE).await
}
