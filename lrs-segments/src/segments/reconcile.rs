//! Matching milepost records to route lines and resolving ARM values.
//!
//! Milepost records carry no route geometry and route lines carry no SRMP,
//! so the two are joined through the route id and direction. The route
//! line's `RouteIdentifier` is the base route id with the direction as its
//! final character; a milepost belongs to it when its `RouteID` equals the
//! base and its `Direction` is that direction or `b` (both). When the final
//! character is not a direction, either direction qualifies. Records
//! without a `Direction` never match.

use serde::Serialize;
use tracing::{trace, warn};

use crate::domain::{Milepost, MilepostGraphic, RouteGraphic, SuffixedRouteId};

use super::error::SegmentError;

/// Begin and end measures for one route line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedMeasures {
    pub begin_arm: f64,
    pub end_arm: f64,
}

/// Milepost records that belong to the given route line, in input order.
pub fn matching_mileposts<'a>(
    route: &SuffixedRouteId,
    mileposts: &'a [MilepostGraphic],
) -> Vec<&'a MilepostGraphic> {
    let directions = route.suffix().directions();

    mileposts
        .iter()
        .filter(|g| {
            g.attributes.route_id == route.base()
                && g.attributes
                    .direction
                    .is_some_and(|dir| directions.iter().any(|d| dir.serves(*d)))
        })
        .collect()
}

/// First record matching `milepost` that has an ARM value.
///
/// More than one candidate means duplicate source records; the first one
/// still wins, but the tie is logged.
fn find_arm(
    route_identifier: &str,
    milepost: &Milepost,
    candidates: &[&MilepostGraphic],
) -> Option<f64> {
    let mut found = candidates.iter().filter_map(|g| {
        let attrs = &g.attributes;
        if milepost.matches(attrs.srmp, attrs.ahead_back) {
            attrs.arm
        } else {
            None
        }
    });

    let first = found.next()?;
    let others: Vec<f64> = found.collect();
    if !others.is_empty() {
        warn!(
            route = route_identifier,
            milepost = %milepost,
            chosen_arm = first,
            ?others,
            "several milepost records match; using the first"
        );
    }

    Some(first)
}

/// Resolve the begin and end ARM for one route line.
///
/// Fails with [`SegmentError::MilepostNotFound`] when either milepost has no
/// matching record with an ARM value.
pub fn resolve_measures(
    route: &RouteGraphic,
    mileposts: &[MilepostGraphic],
    begin: &Milepost,
    end: &Milepost,
) -> Result<ResolvedMeasures, SegmentError> {
    let route_identifier = &route.attributes.route_identifier;
    let suffixed = route.attributes.split_identifier();
    let matching = matching_mileposts(&suffixed, mileposts);

    trace!(
        route = %route_identifier,
        candidates = matching.len(),
        "reconciling mileposts"
    );

    let begin_arm = find_arm(route_identifier, begin, &matching);
    let end_arm = find_arm(route_identifier, end, &matching);

    match (begin_arm, end_arm) {
        (Some(begin_arm), Some(end_arm)) => Ok(ResolvedMeasures { begin_arm, end_arm }),
        (begin_arm, end_arm) => {
            let missing = [(begin, begin_arm), (end, end_arm)]
                .into_iter()
                .filter(|(_, arm)| arm.is_none())
                .map(|(mp, _)| *mp)
                .collect();

            Err(SegmentError::MilepostNotFound {
                route_identifier: route_identifier.clone(),
                route_id: suffixed.base().to_string(),
                missing,
                matching: matching.into_iter().cloned().collect(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        AheadBack, Graphic, MeasuredPoint, MilepostAttributes, MilepostDirection, Polyline,
        RouteAttributes,
    };

    fn milepost(
        route_id: &str,
        direction: MilepostDirection,
        srmp: f64,
        ahead_back: AheadBack,
        arm: Option<f64>,
    ) -> MilepostGraphic {
        Graphic {
            geometry: Some(MeasuredPoint {
                x: 0.0,
                y: 0.0,
                m: arm,
                has_m: true,
                spatial_reference: None,
            }),
            attributes: MilepostAttributes {
                route_id: route_id.to_string(),
                direction: Some(direction),
                srmp,
                ahead_back,
                arm,
                easting: None,
                northing: None,
                longitude: None,
                latitude: None,
                azimuth: None,
                lrs_date: None,
            },
        }
    }

    fn route(identifier: &str) -> RouteGraphic {
        Graphic {
            geometry: Polyline::new(vec![], None),
            attributes: RouteAttributes {
                route_identifier: identifier.to_string(),
                label: None,
                symbol_code: None,
                state_route_number: None,
                related_route_type: None,
                related_route_qualifier: None,
                inventory_direction: None,
            },
        }
    }

    fn mp(s: &str) -> Milepost {
        Milepost::from_text(s).unwrap()
    }

    use AheadBack::{Ahead, Back};
    use MilepostDirection::{Both, Decrease, Increase, Unknown};

    #[test]
    fn resolves_begin_and_end_arm() {
        let mileposts = vec![
            milepost("002", Increase, 118.0, Ahead, Some(118.0)),
            milepost("002", Increase, 119.0, Ahead, Some(119.05)),
        ];
        let measures =
            resolve_measures(&route("002i"), &mileposts, &mp("118"), &mp("119")).unwrap();
        assert_eq!(
            measures,
            ResolvedMeasures {
                begin_arm: 118.0,
                end_arm: 119.05
            }
        );
    }

    #[test]
    fn filters_by_route_and_direction() {
        let mileposts = vec![
            milepost("002", Decrease, 118.0, Ahead, Some(1.0)),
            milepost("0022", Increase, 118.0, Ahead, Some(2.0)),
            milepost("002", Unknown, 118.0, Ahead, Some(3.0)),
            milepost("002", Both, 118.0, Ahead, Some(4.0)),
            milepost("002", Increase, 119.0, Ahead, Some(5.0)),
        ];

        let suffixed = SuffixedRouteId::split("002i");
        let matching = matching_mileposts(&suffixed, &mileposts);
        assert_eq!(matching.len(), 2);

        let measures =
            resolve_measures(&route("002i"), &mileposts, &mp("118"), &mp("119")).unwrap();
        assert_eq!(measures.begin_arm, 4.0);
        assert_eq!(measures.end_arm, 5.0);
    }

    #[test]
    fn ahead_and_back_are_distinct() {
        let mileposts = vec![
            milepost("005", Increase, 10.0, Back, Some(10.0)),
            milepost("005", Increase, 10.0, Ahead, Some(10.3)),
            milepost("005", Increase, 12.0, Ahead, Some(12.3)),
        ];
        let back = resolve_measures(&route("005i"), &mileposts, &mp("10B"), &mp("12")).unwrap();
        assert_eq!(back.begin_arm, 10.0);

        let ahead = resolve_measures(&route("005i"), &mileposts, &mp("10"), &mp("12")).unwrap();
        assert_eq!(ahead.begin_arm, 10.3);
    }

    #[test]
    fn first_match_wins_on_ties() {
        let mileposts = vec![
            milepost("002", Increase, 118.0, Ahead, Some(118.0)),
            milepost("002", Both, 118.0, Ahead, Some(999.0)),
            milepost("002", Increase, 119.0, Ahead, Some(119.05)),
        ];
        let measures =
            resolve_measures(&route("002i"), &mileposts, &mp("118"), &mp("119")).unwrap();
        assert_eq!(measures.begin_arm, 118.0);
    }

    #[test]
    fn missing_begin_reports_context() {
        let mileposts = vec![
            milepost("002", Increase, 119.0, Ahead, Some(119.05)),
            milepost("002", Decrease, 118.0, Ahead, Some(118.0)),
        ];
        let err =
            resolve_measures(&route("002i"), &mileposts, &mp("118"), &mp("119")).unwrap_err();
        match err {
            SegmentError::MilepostNotFound {
                route_identifier,
                route_id,
                missing,
                matching,
            } => {
                assert_eq!(route_identifier, "002i");
                assert_eq!(route_id, "002");
                assert_eq!(missing, vec![mp("118")]);
                assert_eq!(matching.len(), 1);
                assert_eq!(matching[0].attributes.srmp, 119.0);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn record_without_arm_does_not_resolve() {
        let mileposts = vec![
            milepost("002", Increase, 118.0, Ahead, None),
            milepost("002", Increase, 119.0, Ahead, Some(119.05)),
        ];
        assert!(matches!(
            resolve_measures(&route("002i"), &mileposts, &mp("118"), &mp("119")),
            Err(SegmentError::MilepostNotFound { .. })
        ));
    }

    #[test]
    fn ambiguous_suffix_accepts_both_directions() {
        let mileposts = vec![
            milepost("005", Decrease, 1.0, Ahead, Some(1.0)),
            milepost("005", Increase, 2.0, Ahead, Some(2.0)),
            milepost("005x", Increase, 1.0, Ahead, Some(99.0)),
        ];
        let measures = resolve_measures(&route("005x"), &mileposts, &mp("1"), &mp("2")).unwrap();
        assert_eq!(measures.begin_arm, 1.0);
        assert_eq!(measures.end_arm, 2.0);
    }

    #[test]
    fn records_without_direction_or_point_still_resolve() {
        let mut no_point = milepost("005", Increase, 10.0, Ahead, Some(10.0));
        no_point.geometry = None;
        let mut no_direction = milepost("005", Increase, 12.0, Ahead, Some(12.0));
        no_direction.attributes.direction = None;

        let mileposts = vec![
            no_point,
            no_direction,
            milepost("005", Both, 12.0, Ahead, Some(12.5)),
        ];
        let measures = resolve_measures(&route("005i"), &mileposts, &mp("10"), &mp("12")).unwrap();
        assert_eq!(measures.begin_arm, 10.0);
        // The direction-less record never serves a direction.
        assert_eq!(measures.end_arm, 12.5);
    }
}
