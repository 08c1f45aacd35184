//! Route identifier types.

use std::fmt;

use serde::Serialize;

use super::LrsDirection;

/// Error returned when parsing an invalid route id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid route id {input:?}: {reason}")]
pub struct InvalidRouteId {
    input: String,
    reason: &'static str,
}

/// An unsuffixed route id such as `"005"` or `"002COBROWNE"`.
///
/// Route ids are interpolated straight into query predicates, so only
/// ASCII letters and digits are accepted.
///
/// # Examples
///
/// ```
/// use lrs_segments::domain::RouteId;
///
/// assert_eq!(RouteId::parse("005").unwrap().as_str(), "005");
/// assert!(RouteId::parse("005' OR 1=1 --").is_err());
/// assert!(RouteId::parse("").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RouteId(String);

impl RouteId {
    pub fn parse(s: &str) -> Result<Self, InvalidRouteId> {
        if s.is_empty() {
            return Err(InvalidRouteId {
                input: s.to_string(),
                reason: "must not be empty",
            });
        }

        if !s.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(InvalidRouteId {
                input: s.to_string(),
                reason: "must contain only ASCII letters and digits",
            });
        }

        Ok(RouteId(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The route-layer identifier for one direction of this route (`"005i"`).
    pub fn with_direction(&self, direction: LrsDirection) -> String {
        format!("{}{}", self.0, direction)
    }
}

impl fmt::Debug for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RouteId({})", self.0)
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The direction part of a route-layer `RouteIdentifier`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteSuffix {
    /// Final character was `i` or `d`.
    Directed(LrsDirection),
    /// Final character was something else; both directions apply.
    Ambiguous,
}

impl RouteSuffix {
    /// Route directions a milepost may serve to belong to this route.
    pub fn directions(&self) -> &'static [LrsDirection] {
        match self {
            RouteSuffix::Directed(LrsDirection::Increase) => &[LrsDirection::Increase],
            RouteSuffix::Directed(LrsDirection::Decrease) => &[LrsDirection::Decrease],
            RouteSuffix::Ambiguous => &LrsDirection::ALL,
        }
    }
}

/// A route-layer identifier split into its base route id and direction.
///
/// The final character is always the direction slot: `"005i"` and `"005d"`
/// are directed, while `"005x"` is route `"005"` with no usable direction,
/// so both directions apply.
///
/// # Examples
///
/// ```
/// use lrs_segments::domain::{LrsDirection, RouteSuffix, SuffixedRouteId};
///
/// let id = SuffixedRouteId::split("005i");
/// assert_eq!(id.base(), "005");
/// assert_eq!(id.suffix(), RouteSuffix::Directed(LrsDirection::Increase));
///
/// let odd = SuffixedRouteId::split("005x");
/// assert_eq!(odd.base(), "005");
/// assert_eq!(odd.suffix(), RouteSuffix::Ambiguous);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixedRouteId {
    base: String,
    suffix: RouteSuffix,
}

impl SuffixedRouteId {
    /// Split off the trailing direction character.
    pub fn split(route_identifier: &str) -> Self {
        let Some((index, last)) = route_identifier.char_indices().next_back() else {
            return Self {
                base: String::new(),
                suffix: RouteSuffix::Ambiguous,
            };
        };

        let suffix = match LrsDirection::from_char(last) {
            Some(direction) => RouteSuffix::Directed(direction),
            None => RouteSuffix::Ambiguous,
        };

        Self {
            base: route_identifier[..index].to_string(),
            suffix,
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn suffix(&self) -> RouteSuffix {
        self.suffix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_route_ids() {
        assert!(RouteId::parse("002").is_ok());
        assert!(RouteId::parse("005").is_ok());
        assert!(RouteId::parse("002COBROWNE").is_ok());
        assert!(RouteId::parse("101SPABERDN").is_ok());
    }

    #[test]
    fn reject_quotes_and_wildcards() {
        assert!(RouteId::parse("00'5").is_err());
        assert!(RouteId::parse("005_").is_err());
        assert!(RouteId::parse("005%").is_err());
        assert!(RouteId::parse("005 ").is_err());
    }

    #[test]
    fn with_direction() {
        let id = RouteId::parse("002").unwrap();
        assert_eq!(id.with_direction(LrsDirection::Increase), "002i");
        assert_eq!(id.with_direction(LrsDirection::Decrease), "002d");
    }

    #[test]
    fn split_decrease() {
        let id = SuffixedRouteId::split("002d");
        assert_eq!(id.base(), "002");
        assert_eq!(id.suffix().directions(), &[LrsDirection::Decrease]);
    }

    #[test]
    fn ambiguous_suffix_covers_both_directions() {
        let id = SuffixedRouteId::split("002x");
        assert_eq!(id.base(), "002");
        assert_eq!(id.suffix(), RouteSuffix::Ambiguous);
        assert_eq!(id.suffix().directions().len(), 2);
    }

    #[test]
    fn split_empty() {
        let id = SuffixedRouteId::split("");
        assert_eq!(id.base(), "");
        assert_eq!(id.suffix(), RouteSuffix::Ambiguous);

        let single = SuffixedRouteId::split("i");
        assert_eq!(single.base(), "");
        assert_eq!(single.suffix(), RouteSuffix::Directed(LrsDirection::Increase));
    }

    #[test]
    fn split_non_ascii_suffix() {
        let id = SuffixedRouteId::split("005é");
        assert_eq!(id.base(), "005");
        assert_eq!(id.suffix(), RouteSuffix::Ambiguous);
    }

    #[test]
    fn debug_and_display() {
        let id = RouteId::parse("005").unwrap();
        assert_eq!(format!("{id:?}"), "RouteId(005)");
        assert_eq!(id.to_string(), "005");
    }
}
