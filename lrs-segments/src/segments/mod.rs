//! Milepost range to route segment resolution.
//!
//! Given a route, an optional direction and a begin/end milepost, this
//! module queries the milepost and route layers once, matches milepost
//! records to each returned route line, and cuts the line between the two
//! resolved ARM measures. Route lines with gaps produce multi-path
//! segments; the gap is never bridged.

mod config;
mod error;
mod locate;
mod reconcile;
mod request;
mod resolve;


pub use config::ResolveConfig;
pub use error::{QueryInputError, SegmentError};
pub use locate::{LocateBetween, MeasureInterpolator};
pub use reconcile::{ResolvedMeasures, matching_mileposts, resolve_measures};
pub use request::{DEFAULT_OUT_SR, RouteSegmentQuery};
pub use resolve::{
    RouteSegment, RouteSegments, SegmentResolver, extract_segment, resolve_route_segments,
};
