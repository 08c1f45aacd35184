//! Measured geometries returned by the LRS feature service.
//!
//! Shapes follow the Esri JSON layout (`paths`, `hasM`, `spatialReference`)
//! so they serialize back into something map clients understand. Use
//! [`Polyline::to_multi_line_string`] and [`MeasuredPoint::to_point`] to get
//! plain `geo` types.

use geo::{Coord, LineString, MultiLineString, Point};
use serde::{Deserialize, Serialize};

/// Spatial reference of a geometry (`{"wkid": 3857, "latestWkid": 3857}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpatialReference {
    pub wkid: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_wkid: Option<u32>,
}

impl SpatialReference {
    /// Web Mercator, the default output spatial reference.
    pub const WEB_MERCATOR: SpatialReference = SpatialReference {
        wkid: 3857,
        latest_wkid: Some(3857),
    };

    pub fn new(wkid: u32) -> Self {
        Self {
            wkid,
            latest_wkid: None,
        }
    }
}

/// A vertex with a linear measure, serialized as `[x, y, m]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct MeasuredCoord {
    pub x: f64,
    pub y: f64,
    pub m: f64,
}

impl MeasuredCoord {
    pub fn new(x: f64, y: f64, m: f64) -> Self {
        Self { x, y, m }
    }

    pub fn xy(&self) -> Coord {
        Coord {
            x: self.x,
            y: self.y,
        }
    }

    /// The point a fraction `t` of the way from `self` to `other`.
    pub fn lerp(&self, other: &MeasuredCoord, t: f64) -> MeasuredCoord {
        let a = self.xy();
        let b = other.xy();
        let c = a + (b - a) * t;
        MeasuredCoord {
            x: c.x,
            y: c.y,
            m: self.m + (other.m - self.m) * t,
        }
    }
}

impl From<[f64; 3]> for MeasuredCoord {
    fn from([x, y, m]: [f64; 3]) -> Self {
        Self { x, y, m }
    }
}

impl From<MeasuredCoord> for [f64; 3] {
    fn from(c: MeasuredCoord) -> Self {
        [c.x, c.y, c.m]
    }
}

/// A single positioned point carrying a measure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasuredPoint {
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub m: Option<f64>,
    pub has_m: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spatial_reference: Option<SpatialReference>,
}

impl MeasuredPoint {
    pub fn to_point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A line made of one or more disjoint measured paths.
///
/// Each path is kept separate: a gap in a route's geometry shows up as
/// two paths, never as a segment bridging the gap.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Polyline {
    pub paths: Vec<Vec<MeasuredCoord>>,
    pub has_m: bool,
    pub has_z: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spatial_reference: Option<SpatialReference>,
}

impl Polyline {
    pub fn new(
        paths: Vec<Vec<MeasuredCoord>>,
        spatial_reference: Option<SpatialReference>,
    ) -> Self {
        Self {
            paths,
            has_m: true,
            has_z: false,
            spatial_reference,
        }
    }

    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.paths.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.iter().all(Vec::is_empty)
    }

    /// Smallest and largest measure over all vertices.
    pub fn measure_range(&self) -> Option<(f64, f64)> {
        self.paths
            .iter()
            .flatten()
            .map(|c| c.m)
            .fold(None, |acc, m| match acc {
                None => Some((m, m)),
                Some((lo, hi)) => Some((lo.min(m), hi.max(m))),
            })
    }

    /// Drop the measures; one `LineString` per path.
    pub fn to_multi_line_string(&self) -> MultiLineString {
        MultiLineString::new(
            self.paths
                .iter()
                .map(|path| LineString::new(path.iter().map(MeasuredCoord::xy).collect()))
                .collect(),
        )
    }
}
