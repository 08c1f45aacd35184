//! Errors from resolving milepost ranges to route segments.

use crate::domain::{InvalidDirection, InvalidMilepost, InvalidRouteId, Milepost, MilepostGraphic};
use crate::feature_service::FeatureServiceError;

/// Error resolving one query. Any error ends the whole result sequence.
#[derive(Debug, thiserror::Error)]
pub enum SegmentError {
    /// Begin and/or end milepost has no usable record for a route line
    #[error(
        "milepost {} not found for route {route_identifier} ({} matching records)",
        display_mileposts(.missing),
        .matching.len()
    )]
    MilepostNotFound {
        /// Suffixed identifier of the route line (`"002i"`)
        route_identifier: String,
        /// Base route id the mileposts were matched against
        route_id: String,
        /// Mileposts that could not be resolved
        missing: Vec<Milepost>,
        /// Milepost records that matched the route and direction
        matching: Vec<MilepostGraphic>,
    },

    /// Locate-between produced no geometry for the measure range
    #[error("no segment between ARM {begin_arm} and {end_arm} on route {route_identifier}")]
    SegmentNotFound {
        route_identifier: String,
        begin_arm: f64,
        end_arm: f64,
    },

    /// The feature query failed
    #[error(transparent)]
    Query(#[from] FeatureServiceError),
}

fn display_mileposts(mileposts: &[Milepost]) -> String {
    mileposts
        .iter()
        .map(Milepost::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Error building a query from user input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryInputError {
    #[error(transparent)]
    RouteId(#[from] InvalidRouteId),

    #[error(transparent)]
    Milepost(#[from] InvalidMilepost),

    #[error(transparent)]
    Direction(#[from] InvalidDirection),
}
