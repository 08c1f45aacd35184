//! Domain types for linear-referenced routes and mileposts.
//!
//! Value types here enforce their invariants at construction time, so code
//! that receives them can trust their validity.

mod direction;
mod geometry;
mod graphic;
mod milepost;
mod route_id;

pub use direction::{InvalidDirection, LrsDirection, MilepostDirection};
pub use geometry::{MeasuredCoord, MeasuredPoint, Polyline, SpatialReference};
pub use graphic::{Graphic, MilepostAttributes, MilepostGraphic, RouteAttributes, RouteGraphic};
pub use milepost::{AheadBack, InvalidMilepost, Milepost};
pub use route_id::{InvalidRouteId, RouteId, RouteSuffix, SuffixedRouteId};
