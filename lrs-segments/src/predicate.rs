//! Where-clause construction for the milepost and route layers.
//!
//! A physical milepost near a measurement reset exists as two records
//! (ahead and back), so the milepost predicate always asks for both the
//! begin and the end record. Picking the right one per route happens when
//! reconciling, not here.

use crate::domain::{LrsDirection, Milepost, RouteId};

/// Fields requested from the milepost layer.
pub const MILEPOST_FIELDS: &[&str] = &[
    "RouteID",
    "Direction",
    "SRMP",
    "AheadBackInd",
    "ARM",
    "Easting",
    "Northing",
    "Longitude",
    "Latitude",
    "Azimuth",
    "LRS_Date",
];

/// Fields requested from the route layer.
pub const ROUTE_FIELDS: &[&str] = &["RouteIdentifier"];

/// The pair of where clauses for one route segment query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePredicates {
    pub milepost_where: String,
    pub route_where: String,
}

impl RoutePredicates {
    pub fn build(
        route_id: &RouteId,
        direction: Option<LrsDirection>,
        begin: &Milepost,
        end: &Milepost,
    ) -> Self {
        Self {
            milepost_where: milepost_where(route_id, direction, begin, end),
            route_where: route_where(route_id, direction),
        }
    }
}

/// Predicate selecting the begin and end milepost records of a route.
pub fn milepost_where(
    route_id: &RouteId,
    direction: Option<LrsDirection>,
    begin: &Milepost,
    end: &Milepost,
) -> String {
    let mut parts = vec![
        format!("RouteID = '{route_id}'"),
        format!("({} OR {})", srmp_clause(begin), srmp_clause(end)),
    ];

    if let Some(direction) = direction {
        parts.push(format!("Direction IN ('{direction}', 'b')"));
    }

    parts.join(" AND ")
}

fn srmp_clause(milepost: &Milepost) -> String {
    format!(
        "(SRMP = {} AND AheadBackInd = '{}')",
        milepost.value(),
        milepost.indicator()
    )
}

/// Predicate selecting route lines: one direction exactly, or both via a
/// single-character wildcard.
pub fn route_where(route_id: &RouteId, direction: Option<LrsDirection>) -> String {
    match direction {
        Some(direction) => format!("RouteIdentifier = '{route_id}{direction}'"),
        None => format!("RouteIdentifier LIKE '{route_id}_'"),
    }
}
