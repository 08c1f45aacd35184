//! Conversion from raw response layers to graphic records.
//!
//! Milepost points get their measure from the `ARM` attribute, never from
//! the geometry. Route polylines keep their paths exactly as sent.

use serde_json::Value;
use tracing::warn;

use crate::domain::{
    Graphic, MeasuredCoord, MeasuredPoint, MilepostAttributes, MilepostGraphic, Polyline,
    RouteAttributes, RouteGraphic, SpatialReference,
};

use super::error::FeatureServiceError;
use super::types::{LayerKind, ResponseFeature, ResponseLayer, ResponsePoint, ResponsePolyline};

/// Graphics of one layer, tagged by which layer they came from.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedLayer {
    Mileposts(Vec<MilepostGraphic>),
    Routes(Vec<RouteGraphic>),
}

/// Convert one decoded layer to graphics.
///
/// Fails with [`FeatureServiceError::UnsupportedLayerType`] unless the layer
/// id is 0 (mileposts) or 1 (routes).
pub fn to_graphics(layer: &ResponseLayer) -> Result<NormalizedLayer, FeatureServiceError> {
    match LayerKind::from_id(layer.id) {
        Some(LayerKind::Milepost) => Ok(NormalizedLayer::Mileposts(convert_mileposts(layer))),
        Some(LayerKind::Route) => convert_routes(layer).map(NormalizedLayer::Routes),
        None => Err(FeatureServiceError::UnsupportedLayerType { id: layer.id }),
    }
}

/// Convert the milepost layer, skipping records that cannot be used.
///
/// Only records missing `RouteID`, `SRMP` or `AheadBackInd` are skipped.
/// Records without a point or a `Direction` are kept.
pub fn convert_mileposts(layer: &ResponseLayer) -> Vec<MilepostGraphic> {
    let mut graphics = Vec::with_capacity(layer.features.len());

    for (index, feature) in layer.features.iter().enumerate() {
        match convert_milepost(feature, layer.spatial_reference) {
            Ok(graphic) => graphics.push(graphic),
            Err(reason) => {
                let route_id = feature.attributes.get("RouteID").and_then(Value::as_str);
                warn!(layer_id = layer.id, index, route_id, %reason, "skipping milepost record");
            }
        }
    }

    graphics
}

fn convert_milepost(
    feature: &ResponseFeature,
    spatial_reference: Option<SpatialReference>,
) -> Result<MilepostGraphic, String> {
    let attributes: MilepostAttributes =
        serde_json::from_value(Value::Object(feature.attributes.clone()))
            .map_err(|e| e.to_string())?;

    // Reconciliation reads attributes only, so a record without a point
    // still carries a usable ARM.
    let point = match &feature.geometry {
        Some(geometry) if !geometry.is_null() => {
            let point: ResponsePoint =
                serde_json::from_value(geometry.clone()).map_err(|e| e.to_string())?;
            Some(MeasuredPoint {
                x: point.x,
                y: point.y,
                m: attributes.arm,
                has_m: true,
                spatial_reference,
            })
        }
        _ => None,
    };

    Ok(Graphic {
        geometry: point,
        attributes,
    })
}

/// Convert the route layer. Any unusable feature fails the whole layer.
pub fn convert_routes(layer: &ResponseLayer) -> Result<Vec<RouteGraphic>, FeatureServiceError> {
    layer
        .features
        .iter()
        .enumerate()
        .map(|(index, feature)| {
            convert_route(feature, layer.spatial_reference).map_err(|reason| {
                FeatureServiceError::InvalidFeature {
                    layer_id: layer.id,
                    index,
                    reason,
                }
            })
        })
        .collect()
}

fn convert_route(
    feature: &ResponseFeature,
    spatial_reference: Option<SpatialReference>,
) -> Result<RouteGraphic, String> {
    let attributes: RouteAttributes =
        serde_json::from_value(Value::Object(feature.attributes.clone()))
            .map_err(|e| e.to_string())?;

    let geometry = feature.geometry.clone().ok_or("no geometry")?;
    let polyline: ResponsePolyline =
        serde_json::from_value(geometry).map_err(|e| e.to_string())?;

    let paths = polyline
        .paths
        .into_iter()
        .map(|path| {
            path.into_iter()
                .map(|position| match position.as_slice() {
                    &[x, y, m] => Ok(MeasuredCoord::new(x, y, m)),
                    other => Err(format!(
                        "expected [x, y, m] position, got {} values",
                        other.len()
                    )),
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Graphic {
        geometry: Polyline::new(paths, spatial_reference),
        attributes,
    })
}
