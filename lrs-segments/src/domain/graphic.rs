//! Graphic records: a geometry paired with its feature attributes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{AheadBack, MeasuredPoint, MilepostDirection, Polyline, SuffixedRouteId};

/// A geometry with the attributes of the feature it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Graphic<G, A> {
    pub geometry: G,
    pub attributes: A,
}

/// A milepost record with its point measure copied from `ARM`.
///
/// The point is `None` when the service sent no geometry for the record.
pub type MilepostGraphic = Graphic<Option<MeasuredPoint>, MilepostAttributes>;

/// A route line, possibly made of several disjoint paths.
pub type RouteGraphic = Graphic<Polyline, RouteAttributes>;

/// Attributes of a milepost point feature.
///
/// `RouteID`, `SRMP` and `AheadBackInd` are required; a record missing any
/// of them does not deserialize. A record without `Direction` is kept but
/// never lies on any route direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilepostAttributes {
    /// Unsuffixed route id.
    #[serde(rename = "RouteID")]
    pub route_id: String,

    #[serde(rename = "Direction", default)]
    pub direction: Option<MilepostDirection>,

    /// Display milepost; can repeat along a route at resets.
    #[serde(rename = "SRMP")]
    pub srmp: f64,

    #[serde(rename = "AheadBackInd")]
    pub ahead_back: AheadBack,

    /// Accumulated route mileage, the measure used for interpolation.
    #[serde(rename = "ARM", default)]
    pub arm: Option<f64>,

    #[serde(rename = "Easting", default, skip_serializing_if = "Option::is_none")]
    pub easting: Option<f64>,

    #[serde(rename = "Northing", default, skip_serializing_if = "Option::is_none")]
    pub northing: Option<f64>,

    #[serde(rename = "Longitude", default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    #[serde(rename = "Latitude", default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    #[serde(rename = "Azimuth", default, skip_serializing_if = "Option::is_none")]
    pub azimuth: Option<f64>,

    /// `yyyymmdd`
    #[serde(rename = "LRS_Date", default, skip_serializing_if = "Option::is_none")]
    pub lrs_date: Option<String>,
}

impl MilepostAttributes {
    /// Parse `LRS_Date`, if present and well formed.
    pub fn lrs_date(&self) -> Option<NaiveDate> {
        self.lrs_date
            .as_deref()
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y%m%d").ok())
    }
}

/// Attributes of a route line feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteAttributes {
    /// Route id with the direction appended, e.g. `"005i"`.
    #[serde(rename = "RouteIdentifier")]
    pub route_identifier: String,

    #[serde(rename = "Label", default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(rename = "SymbolCode", default, skip_serializing_if = "Option::is_none")]
    pub symbol_code: Option<String>,

    #[serde(
        rename = "StateRouteNumber",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub state_route_number: Option<String>,

    #[serde(
        rename = "RelatedRouteType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub related_route_type: Option<String>,

    #[serde(
        rename = "RelatedRouteQualifier",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub related_route_qualifier: Option<String>,

    #[serde(
        rename = "InventoryDirection",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub inventory_direction: Option<String>,
}

impl RouteAttributes {
    pub fn split_identifier(&self) -> SuffixedRouteId {
        SuffixedRouteId::split(&self.route_identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LrsDirection, RouteSuffix};

    #[test]
    fn deserialize_milepost_attributes() {
        let attrs: MilepostAttributes = serde_json::from_value(serde_json::json!({
            "RouteID": "002",
            "Direction": "i",
            "SRMP": 118,
            "AheadBackInd": "A",
            "ARM": 118.0,
            "LRS_Date": "20231231",
            "Azimuth": 90.5
        }))
        .unwrap();

        assert_eq!(attrs.route_id, "002");
        assert_eq!(attrs.direction, Some(MilepostDirection::Increase));
        assert_eq!(attrs.srmp, 118.0);
        assert_eq!(attrs.ahead_back, AheadBack::Ahead);
        assert_eq!(attrs.arm, Some(118.0));
        assert_eq!(attrs.azimuth, Some(90.5));
        assert_eq!(attrs.lrs_date(), NaiveDate::from_ymd_opt(2023, 12, 31));
    }

    #[test]
    fn milepost_requires_core_fields() {
        let missing_srmp = serde_json::json!({
            "RouteID": "002", "Direction": "i", "AheadBackInd": "A", "ARM": 1.0
        });
        assert!(serde_json::from_value::<MilepostAttributes>(missing_srmp).is_err());

        let null_route = serde_json::json!({
            "RouteID": null, "Direction": "i", "SRMP": 1, "AheadBackInd": "A"
        });
        assert!(serde_json::from_value::<MilepostAttributes>(null_route).is_err());

        let bad_indicator = serde_json::json!({
            "RouteID": "002", "Direction": "i", "SRMP": 1, "AheadBackInd": "X"
        });
        assert!(serde_json::from_value::<MilepostAttributes>(bad_indicator).is_err());
    }

    #[test]
    fn direction_is_optional() {
        let attrs: MilepostAttributes = serde_json::from_value(serde_json::json!({
            "RouteID": "002", "SRMP": 1, "AheadBackInd": "A", "ARM": 1.0
        }))
        .unwrap();
        assert_eq!(attrs.direction, None);
    }

    #[test]
    fn malformed_lrs_date_is_none() {
        let attrs: MilepostAttributes = serde_json::from_value(serde_json::json!({
            "RouteID": "002", "Direction": "b", "SRMP": 1, "AheadBackInd": "B",
            "LRS_Date": "2023-12-31"
        }))
        .unwrap();
        assert_eq!(attrs.lrs_date(), None);
        assert_eq!(attrs.arm, None);
    }

    #[test]
    fn route_attributes_split() {
        let attrs: RouteAttributes =
            serde_json::from_value(serde_json::json!({"RouteIdentifier": "002d"})).unwrap();
        let id = attrs.split_identifier();
        assert_eq!(id.base(), "002");
        assert_eq!(id.suffix(), RouteSuffix::Directed(LrsDirection::Decrease));
        assert!(attrs.label.is_none());
    }
}
