//! Route and milepost inventory lookups.
//!
//! These describe what the LRS holds rather than resolving a range: the
//! back-mileage SRMPs of each route, the SRMP extent of a route per
//! direction, and the list of route identifiers. Each is a single-layer
//! query through [`FeatureService`](crate::feature_service::FeatureService).

mod back_mileage;
mod min_max;
mod route_list;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::feature_service::FeatureSetResponse;

pub use back_mileage::{BackMileageQuery, BackMileposts, back_mileposts, fetch_back_mileposts};
pub use min_max::{
    AheadBackRanges, MinMaxQuery, MinMaxRange, fetch_milepost_min_max, milepost_min_max,
};
pub use route_list::{
    DEFAULT_PAGE_SIZE, RouteListQuery, fetch_route_identifiers, route_count, route_identifiers,
};

/// Query endpoint of the state route milepost point layer.
pub const DEFAULT_MILEPOSTS_QUERY_URL: &str =
    "https://data.wsdot.wa.gov/arcgis/rest/services/Shared/AllStateRoutePoints/MapServer/0/query";

/// The LRS route line layer.
pub const DEFAULT_LRS_ROUTES_URL: &str =
    "https://data.wsdot.wa.gov/arcgis/rest/services/Shared/LRSData/FeatureServer/9/";

/// Typed attributes of every feature in `set`, skipping records that do
/// not fit `A`.
fn feature_attributes<A: DeserializeOwned>(set: &FeatureSetResponse, what: &str) -> Vec<A> {
    set.features
        .iter()
        .enumerate()
        .filter_map(|(index, feature)| {
            match serde_json::from_value(Value::Object(feature.attributes.clone())) {
                Ok(attributes) => Some(attributes),
                Err(e) => {
                    warn!(what, index, error = %e, "skipping record");
                    None
                }
            }
        })
        .collect()
}
