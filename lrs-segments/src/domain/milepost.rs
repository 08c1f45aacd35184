//! State route milepost (SRMP) value type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a milepost cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid milepost {input:?}: {reason}")]
pub struct InvalidMilepost {
    input: String,
    reason: &'static str,
}

impl InvalidMilepost {
    fn new(input: impl Into<String>, reason: &'static str) -> Self {
        Self {
            input: input.into(),
            reason,
        }
    }

    /// The text or value that was rejected.
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// Which occurrence of a duplicated SRMP value is meant.
///
/// Near a measurement reset the same SRMP appears twice along a route:
/// the back mileage before the reset and the ahead mileage after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AheadBack {
    #[default]
    #[serde(rename = "A")]
    Ahead,
    #[serde(rename = "B")]
    Back,
}

impl AheadBack {
    /// Parse an indicator letter, case-insensitively.
    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(AheadBack::Ahead),
            'B' => Some(AheadBack::Back),
            _ => None,
        }
    }

    /// The indicator as stored in the `AheadBackInd` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            AheadBack::Ahead => "A",
            AheadBack::Back => "B",
        }
    }

    pub fn is_back(&self) -> bool {
        matches!(self, AheadBack::Back)
    }
}

impl fmt::Display for AheadBack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mile-marker value with its ahead/back flag.
///
/// The value is always finite and non-negative. Ahead is the default
/// and is never shown in the display form.
///
/// # Examples
///
/// ```
/// use lrs_segments::domain::{AheadBack, Milepost};
///
/// let mp = Milepost::from_text("123.4B").unwrap();
/// assert_eq!(mp.value(), 123.4);
/// assert!(mp.is_back());
/// assert_eq!(mp.to_string(), "123.4B");
///
/// let ahead = Milepost::from_tuple((118.0, AheadBack::Ahead)).unwrap();
/// assert_eq!(ahead.to_string(), "118");
///
/// assert!(Milepost::from_text("B12").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Milepost {
    value: f64,
    is_back: bool,
}

impl Milepost {
    /// Build a milepost from a value and an explicit flag.
    pub fn new(value: f64, is_back: bool) -> Result<Self, InvalidMilepost> {
        if !value.is_finite() {
            return Err(InvalidMilepost::new(value.to_string(), "must be finite"));
        }
        if value < 0.0 {
            return Err(InvalidMilepost::new(
                value.to_string(),
                "must not be negative",
            ));
        }
        Ok(Self { value, is_back })
    }

    /// An ahead milepost with the given value.
    pub fn from_number(value: f64) -> Result<Self, InvalidMilepost> {
        Self::new(value, false)
    }

    /// Build from a `(value, indicator)` pair.
    pub fn from_tuple((value, indicator): (f64, AheadBack)) -> Result<Self, InvalidMilepost> {
        Self::new(value, indicator.is_back())
    }

    /// Parse `<number>[AB]?`, where the letter is case-insensitive and
    /// defaults to ahead when absent.
    pub fn from_text(text: &str) -> Result<Self, InvalidMilepost> {
        let trimmed = text.trim();

        let (number, indicator) = match trimmed.chars().last() {
            Some(c) if c.is_ascii_alphabetic() => {
                let indicator = AheadBack::from_letter(c)
                    .ok_or_else(|| InvalidMilepost::new(text, "suffix must be A or B"))?;
                (&trimmed[..trimmed.len() - 1], indicator)
            }
            _ => (trimmed, AheadBack::Ahead),
        };

        if !is_decimal(number) {
            return Err(InvalidMilepost::new(text, "expected <number>[A|B]"));
        }

        let value: f64 = number
            .parse()
            .map_err(|_| InvalidMilepost::new(text, "expected <number>[A|B]"))?;

        Self::new(value, indicator.is_back())
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn is_back(&self) -> bool {
        self.is_back
    }

    /// The `AheadBackInd` value for this milepost.
    pub fn indicator(&self) -> AheadBack {
        if self.is_back {
            AheadBack::Back
        } else {
            AheadBack::Ahead
        }
    }

    pub fn to_tuple(&self) -> (f64, AheadBack) {
        (self.value, self.indicator())
    }

    /// Whether a milepost record with the given SRMP and indicator denotes
    /// this milepost.
    pub fn matches(&self, srmp: f64, indicator: AheadBack) -> bool {
        self.value == srmp && self.indicator() == indicator
    }
}

/// `\d+(\.\d+)?`
fn is_decimal(s: &str) -> bool {
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s, None),
    };

    let all_digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());

    all_digits(int_part) && frac_part.is_none_or(all_digits)
}

impl fmt::Display for Milepost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_back {
            write!(f, "{}B", self.value)
        } else {
            write!(f, "{}", self.value)
        }
    }
}

impl FromStr for Milepost {
    type Err = InvalidMilepost;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}

impl TryFrom<(f64, AheadBack)> for Milepost {
    type Error = InvalidMilepost;

    fn try_from(tuple: (f64, AheadBack)) -> Result<Self, Self::Error> {
        Self::from_tuple(tuple)
    }
}

impl Serialize for Milepost {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
