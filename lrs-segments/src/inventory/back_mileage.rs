//! Back-mileage SRMPs per route and direction.
//!
//! Where a route was realigned, the milepost sequence restarts and the
//! stretch before the restart is signed as back mileage (`AheadBackInd =
//! 'B'`). Knowing which SRMPs are back mileage lets callers build valid
//! `118B`-style mileposts.

use std::collections::BTreeMap;

use futures::future::try_join_all;
use serde::Deserialize;
use tracing::debug;

use crate::domain::LrsDirection;
use crate::feature_service::{
    FeatureService, FeatureServiceConfig, FeatureServiceError, HttpTransport, QueryRequest,
    ResponseDecoder, Transport,
};

use super::feature_attributes;

/// Back-mileage SRMPs keyed by route id plus direction (`"005i"`). Each
/// list keeps the order the service returned.
pub type BackMileposts = BTreeMap<String, Vec<f64>>;

/// Distinct back-mileage records for one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackMileageQuery {
    pub direction: LrsDirection,
}

impl QueryRequest for BackMileageQuery {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("f", "json".to_string()),
            (
                "where",
                format!("AheadBackInd = 'B' AND Direction = '{}'", self.direction),
            ),
            ("outFields", "RouteID,Direction,SRMP".to_string()),
            ("returnDistinctValues", "true".to_string()),
            ("returnGeometry", "false".to_string()),
        ]
    }

    fn key(&self) -> String {
        format!("back-mileage-{}", self.direction)
    }
}

#[derive(Debug, Deserialize)]
struct BackMileageAttributes {
    #[serde(rename = "RouteID")]
    route_id: String,
    #[serde(rename = "Direction")]
    direction: LrsDirection,
    #[serde(rename = "SRMP")]
    srmp: f64,
}

/// Back-mileage SRMPs for one direction, or for both when `direction` is
/// `None`. Both directions are queried concurrently.
pub async fn back_mileposts<T: Transport, D: ResponseDecoder>(
    service: &FeatureService<T, D>,
    direction: Option<LrsDirection>,
) -> Result<BackMileposts, FeatureServiceError> {
    let queries: Vec<BackMileageQuery> = match direction {
        Some(direction) => vec![BackMileageQuery { direction }],
        None => LrsDirection::ALL
            .into_iter()
            .map(|direction| BackMileageQuery { direction })
            .collect(),
    };

    let sets = try_join_all(queries.iter().map(|q| service.query_features(q))).await?;

    let mut mileposts = BackMileposts::new();
    for set in &sets {
        for record in feature_attributes::<BackMileageAttributes>(set, "back mileage") {
            mileposts
                .entry(format!("{}{}", record.route_id, record.direction))
                .or_default()
                .push(record.srmp);
        }
    }

    debug!(routes = mileposts.len(), "collected back mileage");
    Ok(mileposts)
}

/// [`back_mileposts`] against the milepost layer at `query_url` over HTTP.
///
/// `query_url` must point at the layer's `query` operation (see
/// [`DEFAULT_MILEPOSTS_QUERY_URL`](super::DEFAULT_MILEPOSTS_QUERY_URL));
/// anything else fails with [`FeatureServiceError::BadUrl`] before any
/// request is made.
pub async fn fetch_back_mileposts(
    query_url: &str,
    direction: Option<LrsDirection>,
) -> Result<BackMileposts, FeatureServiceError> {
    let transport = HttpTransport::for_query_url(FeatureServiceConfig::new(query_url))?;
    back_mileposts(&FeatureService::new(transport), direction).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_service::{FixtureTransport, StaticTransport};

    fn fixture_service() -> FeatureService<FixtureTransport> {
        FeatureService::new(FixtureTransport::new("data/inventory").unwrap())
    }

    #[test]
    fn query_parameters() {
        let query = BackMileageQuery {
            direction: LrsDirection::Decrease,
        };
        let pairs = query.query_pairs();
        assert!(pairs.contains(&("where", "AheadBackInd = 'B' AND Direction = 'd'".to_string())));
        assert!(pairs.contains(&("returnGeometry", "false".to_string())));
        assert_eq!(query.key(), "back-mileage-d");
    }

    #[tokio::test]
    async fn both_directions_are_merged() {
        let mileposts = back_mileposts(&fixture_service(), None).await.unwrap();

        assert_eq!(
            mileposts.keys().collect::<Vec<_>>(),
            vec!["005d", "005i", "101i"]
        );
        assert_eq!(mileposts["005i"], vec![10.0, 10.2]);
        assert_eq!(mileposts["005d"], vec![10.0]);
        assert!(mileposts.values().all(|srmps| !srmps.is_empty()));
    }

    #[tokio::test]
    async fn single_direction() {
        let mileposts = back_mileposts(&fixture_service(), Some(LrsDirection::Increase))
            .await
            .unwrap();

        // The record without SRMP is skipped.
        assert_eq!(mileposts.len(), 2);
        assert!(mileposts.keys().all(|key| key.ends_with('i')));
    }

    #[tokio::test]
    async fn service_error_is_reported() {
        let service = FeatureService::new(StaticTransport::new(
            r#"{"error": {"code": 400, "message": "Unable to complete operation."}}"#,
        ));
        let err = back_mileposts(&service, Some(LrsDirection::Increase))
            .await
            .unwrap_err();
        assert!(matches!(err, FeatureServiceError::Api { status: 400, .. }));
    }

    #[tokio::test]
    async fn non_query_url_is_rejected() {
        let err = fetch_back_mileposts("https://example.com", None)
            .await
            .unwrap_err();
        match err {
            FeatureServiceError::BadUrl(bad) => assert_eq!(bad.url, "https://example.com"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
