//! Feature service request and response DTOs.
//!
//! Response types map directly onto the multi-layer `query` JSON. They are
//! only built after the envelope has been shape-checked (see
//! [`super::client::JsonLayerDecoder`]); geometry and attributes stay loosely
//! typed until the normalizer converts them per layer.

use std::fmt;

use serde::Deserialize;

use crate::domain::SpatialReference;

use super::layer_def::{LayerDef, LayerDefs};

/// The two layers a route segment query reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// Layer 0: milepost points.
    Milepost,
    /// Layer 1: route lines.
    Route,
}

impl LayerKind {
    pub fn id(&self) -> i64 {
        match self {
            LayerKind::Milepost => 0,
            LayerKind::Route => 1,
        }
    }

    pub fn from_id(id: i64) -> Option<Self> {
        match id {
            0 => Some(LayerKind::Milepost),
            1 => Some(LayerKind::Route),
            _ => None,
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerKind::Milepost => f.write_str("milepost"),
            LayerKind::Route => f.write_str("route"),
        }
    }
}

/// Parameters for one call to a `query` endpoint.
pub trait QueryRequest {
    /// Query-string parameters, `f=json` included.
    fn query_pairs(&self) -> Vec<(&'static str, String)>;

    /// Short name for logs and fixture lookup, e.g. `"002i"` or `"route-count"`.
    fn key(&self) -> String;
}

/// A combined query against several layers of one service.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerQueryRequest {
    pub layer_defs: LayerDefs,
    /// Output spatial reference wkid.
    pub out_sr: u32,
    pub return_geometry: bool,
    pub return_m: bool,
    /// Route this request is for (`"002"`, `"002i"`); not sent on the wire.
    pub route_key: String,
}

impl LayerQueryRequest {
    pub fn new(layer_defs: Vec<LayerDef>, out_sr: u32, route_key: impl Into<String>) -> Self {
        Self {
            layer_defs: LayerDefs(layer_defs),
            out_sr,
            return_geometry: true,
            return_m: true,
            route_key: route_key.into(),
        }
    }

}

impl QueryRequest for LayerQueryRequest {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("f", "json".to_string()),
            ("layerDefs", self.layer_defs.to_param()),
            ("outSR", self.out_sr.to_string()),
            ("returnGeometry", self.return_geometry.to_string()),
            ("returnM", self.return_m.to_string()),
        ]
    }

    fn key(&self) -> String {
        self.route_key.clone()
    }
}

/// Response of a multi-layer query.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerQueryResponse {
    pub layers: Vec<ResponseLayer>,

    /// The service truncated at least one layer.
    #[serde(default)]
    pub exceeded_transfer_limit: bool,
}

impl LayerQueryResponse {
    /// Find a layer by kind.
    pub fn layer(&self, kind: LayerKind) -> Option<&ResponseLayer> {
        self.layers.iter().find(|l| l.id == kind.id())
    }
}

/// One layer of a query response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseLayer {
    pub id: i64,

    /// e.g. `esriGeometryPoint`, `esriGeometryPolyline`.
    pub geometry_type: Option<String>,

    pub spatial_reference: Option<SpatialReference>,

    pub object_id_field_name: Option<String>,

    pub features: Vec<ResponseFeature>,
}

/// A raw feature: geometry and attributes as sent.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseFeature {
    pub geometry: Option<serde_json::Value>,

    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

/// Response of a single-layer query.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSetResponse {
    pub features: Vec<ResponseFeature>,

    #[serde(default)]
    pub exceeded_transfer_limit: bool,
}

/// Response of a `returnCountOnly` query.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

/// Point geometry (`{"x": .., "y": ..}`); `m` is rarely present.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponsePoint {
    pub x: f64,
    pub y: f64,
    pub m: Option<f64>,
}

/// Polyline geometry. Positions are `[x, y]` or `[x, y, m]`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponsePolyline {
    pub paths: Vec<Vec<Vec<f64>>>,
}
