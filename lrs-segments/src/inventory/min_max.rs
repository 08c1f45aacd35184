//! SRMP extent of a route, per direction and ahead/back indicator.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{AheadBack, LrsDirection, MilepostDirection, RouteId};
use crate::feature_service::{
    FeatureService, FeatureServiceConfig, FeatureServiceError, HttpTransport, QueryRequest,
    ResponseDecoder, Transport,
};

use super::feature_attributes;

const MIN_SRMP: &str = "MinSrmp";
const MAX_SRMP: &str = "MaxSrmp";

/// Server-side MIN/MAX of `SRMP`, grouped by route, direction and indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinMaxQuery {
    pub route_id: RouteId,
    pub direction: Option<LrsDirection>,
}

impl MinMaxQuery {
    pub fn new(route_id: RouteId, direction: Option<LrsDirection>) -> Self {
        Self {
            route_id,
            direction,
        }
    }

    pub fn where_clause(&self) -> String {
        match self.direction {
            Some(direction) => format!(
                "RouteID = '{}' AND Direction = '{direction}'",
                self.route_id
            ),
            None => format!("RouteID = '{}'", self.route_id),
        }
    }
}

impl QueryRequest for MinMaxQuery {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let statistics = json!([
            {
                "statisticType": "MIN",
                "onStatisticField": "SRMP",
                "outStatisticFieldName": MIN_SRMP
            },
            {
                "statisticType": "MAX",
                "onStatisticField": "SRMP",
                "outStatisticFieldName": MAX_SRMP
            }
        ]);

        vec![
            ("f", "json".to_string()),
            ("where", self.where_clause()),
            ("outStatistics", statistics.to_string()),
            (
                "groupByFieldsForStatistics",
                "RouteID,Direction,AheadBackInd".to_string(),
            ),
            (
                "orderByFields",
                format!("RouteID,Direction DESC,AheadBackInd ASC,{MIN_SRMP},{MAX_SRMP}"),
            ),
        ]
    }

    fn key(&self) -> String {
        match self.direction {
            Some(direction) => format!("min-max-{}{direction}", self.route_id),
            None => format!("min-max-{}", self.route_id),
        }
    }
}

/// `(min, max)` SRMP for ahead and back mileage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AheadBackRanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ahead: Option<(f64, f64)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub back: Option<(f64, f64)>,
}

impl AheadBackRanges {
    fn slot(&mut self, ahead_back: AheadBack) -> &mut Option<(f64, f64)> {
        match ahead_back {
            AheadBack::Ahead => &mut self.ahead,
            AheadBack::Back => &mut self.back,
        }
    }
}

/// SRMP extent of one route.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MinMaxRange {
    pub route_id: String,
    pub increase: AheadBackRanges,
    pub decrease: AheadBackRanges,
}

impl MinMaxRange {
    pub fn new(route_id: impl Into<String>) -> Self {
        Self {
            route_id: route_id.into(),
            increase: AheadBackRanges::default(),
            decrease: AheadBackRanges::default(),
        }
    }

    /// The `(min, max)` SRMP for one direction and indicator, if any.
    pub fn range(&self, direction: LrsDirection, ahead_back: AheadBack) -> Option<(f64, f64)> {
        let ranges = match direction {
            LrsDirection::Increase => &self.increase,
            LrsDirection::Decrease => &self.decrease,
        };
        match ahead_back {
            AheadBack::Ahead => ranges.ahead,
            AheadBack::Back => ranges.back,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MinMaxAttributes {
    #[serde(rename = "RouteID")]
    route_id: String,
    #[serde(rename = "Direction")]
    direction: MilepostDirection,
    #[serde(rename = "AheadBackInd")]
    ahead_back: AheadBack,
    #[serde(rename = "MinSrmp")]
    min_srmp: f64,
    #[serde(rename = "MaxSrmp")]
    max_srmp: f64,
}

/// Minimum and maximum SRMP of `route_id`, for one direction or both.
///
/// Fails with [`FeatureServiceError::UnexpectedResponseShape`] when the
/// service returns no usable statistics row.
pub async fn milepost_min_max<T: Transport, D: ResponseDecoder>(
    service: &FeatureService<T, D>,
    route_id: &RouteId,
    direction: Option<LrsDirection>,
) -> Result<MinMaxRange, FeatureServiceError> {
    let query = MinMaxQuery::new(route_id.clone(), direction);
    let set = service.query_features(&query).await?;
    let rows: Vec<MinMaxAttributes> = feature_attributes(&set, "milepost statistics");

    let first = rows
        .first()
        .ok_or_else(|| FeatureServiceError::UnexpectedResponseShape {
            reason: format!("no milepost statistics for route {route_id}"),
            body: None,
        })?;

    let mut range = MinMaxRange::new(first.route_id.clone());
    for row in &rows {
        let ranges = match row.direction {
            MilepostDirection::Increase => &mut range.increase,
            MilepostDirection::Decrease => &mut range.decrease,
            MilepostDirection::Both | MilepostDirection::Unknown => continue,
        };
        *ranges.slot(row.ahead_back) = Some((row.min_srmp, row.max_srmp));
    }

    Ok(range)
}

/// [`milepost_min_max`] against the milepost layer at `service_url` over HTTP.
pub async fn fetch_milepost_min_max(
    service_url: &str,
    route_id: &RouteId,
    direction: Option<LrsDirection>,
) -> Result<MinMaxRange, FeatureServiceError> {
    let transport = HttpTransport::new(FeatureServiceConfig::new(service_url))?;
    milepost_min_max(&FeatureService::new(transport), route_id, direction).await
}
