//! Direction codes used by the LRS route and milepost layers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid route direction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid route direction {0:?}: must be \"i\" or \"d\"")]
pub struct InvalidDirection(pub String);

/// Direction of travel along a route's measure.
///
/// The route layer only ever has these two: route identifiers carry one
/// of them as their final character (`"005i"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LrsDirection {
    /// Increasing measure.
    #[serde(rename = "i")]
    Increase,
    /// Decreasing measure.
    #[serde(rename = "d")]
    Decrease,
}

impl LrsDirection {
    pub const ALL: [LrsDirection; 2] = [LrsDirection::Increase, LrsDirection::Decrease];

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'i' => Some(LrsDirection::Increase),
            'd' => Some(LrsDirection::Decrease),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            LrsDirection::Increase => 'i',
            LrsDirection::Decrease => 'd',
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LrsDirection::Increase => "i",
            LrsDirection::Decrease => "d",
        }
    }
}

impl fmt::Display for LrsDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LrsDirection {
    type Err = InvalidDirection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next().and_then(LrsDirection::from_char), chars.next()) {
            (Some(direction), None) => Ok(direction),
            _ => Err(InvalidDirection(s.to_string())),
        }
    }
}

/// The `Direction` field of a milepost record.
///
/// Mileposts can belong to one direction, to both, or be unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MilepostDirection {
    #[serde(rename = "i")]
    Increase,
    #[serde(rename = "d")]
    Decrease,
    #[serde(rename = "u")]
    Unknown,
    #[serde(rename = "b")]
    Both,
}

impl MilepostDirection {
    /// Whether a milepost with this direction lies on the given route direction.
    ///
    /// `Both` matches either direction; `Unknown` matches neither.
    pub fn serves(&self, direction: LrsDirection) -> bool {
        matches!(
            (self, direction),
            (MilepostDirection::Both, _)
                | (MilepostDirection::Increase, LrsDirection::Increase)
                | (MilepostDirection::Decrease, LrsDirection::Decrease)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MilepostDirection::Increase => "i",
            MilepostDirection::Decrease => "d",
            MilepostDirection::Unknown => "u",
            MilepostDirection::Both => "b",
        }
    }
}

impl From<LrsDirection> for MilepostDirection {
    fn from(direction: LrsDirection) -> Self {
        match direction {
            LrsDirection::Increase => MilepostDirection::Increase,
            LrsDirection::Decrease => MilepostDirection::Decrease,
        }
    }
}

impl fmt::Display for MilepostDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_lrs_direction() {
        assert_eq!("i".parse::<LrsDirection>(), Ok(LrsDirection::Increase));
        assert_eq!("d".parse::<LrsDirection>(), Ok(LrsDirection::Decrease));
        assert!("I".parse::<LrsDirection>().is_err());
        assert!("b".parse::<LrsDirection>().is_err());
        assert!("id".parse::<LrsDirection>().is_err());
        assert!("".parse::<LrsDirection>().is_err());
    }

    #[test]
    fn both_serves_every_direction() {
        for direction in LrsDirection::ALL {
            assert!(MilepostDirection::Both.serves(direction));
            assert!(!MilepostDirection::Unknown.serves(direction));
        }
        assert!(MilepostDirection::Increase.serves(LrsDirection::Increase));
        assert!(!MilepostDirection::Increase.serves(LrsDirection::Decrease));
        assert!(MilepostDirection::Decrease.serves(LrsDirection::Decrease));
    }

    #[test]
    fn deserialize_milepost_direction() {
        let d: MilepostDirection = serde_json::from_str("\"b\"").unwrap();
        assert_eq!(d, MilepostDirection::Both);
        assert!(serde_json::from_str::<MilepostDirection>("\"x\"").is_err());
    }

    #[test]
    fn display() {
        assert_eq!(LrsDirection::Decrease.to_string(), "d");
        assert_eq!(MilepostDirection::Unknown.to_string(), "u");
        assert_eq!(
            MilepostDirection::from(LrsDirection::Increase),
            MilepostDirection::Increase
        );
    }
}
