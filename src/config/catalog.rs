//! Closed catalogs for wire harness listings.
//!
//! Wire gauges, connector types, marketplace categories and the length
//! grammar live here so the validator, the change detector and the payload
//! builder all agree on the same vocabulary.

use std::fmt;

/// Wire gauges accepted in `specifications.wire_gauge`.
pub const WIRE_GAUGES: &[&str] = &[
    "10 AWG", "12 AWG", "14 AWG", "16 AWG", "18 AWG", "20 AWG", "22 AWG", "24 AWG", "26 AWG",
    "28 AWG", "30 AWG",
];

/// Connector types accepted in `specifications.connector_type`.
pub const CONNECTOR_TYPES: &[&str] = &[
    "JST Connector",
    "Molex Connector",
    "Deutsch Connector",
    "AMP Connector",
    "TE Connectivity Connector",
    "Dupont Connector",
    "Anderson Powerpole",
    "Weather Pack",
    "Metri-Pack",
    "Ring Terminal",
    "Spade Terminal",
    "Bare Wire",
];

/// Optional specification attributes a category may recommend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecAttribute {
    /// `specifications.current_rating`.
    CurrentRating,
    /// `specifications.voltage_rating`.
    VoltageRating,
    /// `specifications.temperature_range`.
    TemperatureRange,
}

impl SpecAttribute {
    /// Key of the attribute inside the `specifications` section.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::CurrentRating => "current_rating",
            Self::VoltageRating => "voltage_rating",
            Self::TemperatureRange => "temperature_range",
        }
    }
}

/// A marketplace category a listing can be filed under.
#[derive(Debug)]
pub struct Category {
    /// Key used in `amazon.category`.
    pub key: &'static str,
    /// Marketplace product type the category maps to.
    pub product_type: &'static str,
    /// Specification attributes buyers in this category expect.
    pub recommended: &'static [SpecAttribute],
}

/// All supported categories.
pub const CATEGORIES: &[Category] = &[
    Category {
        key: "electronics-components",
        product_type: "ELECTRONIC_COMPONENT",
        recommended: &[SpecAttribute::CurrentRating, SpecAttribute::VoltageRating],
    },
    Category {
        key: "automotive-parts",
        product_type: "AUTO_PART",
        recommended: &[SpecAttribute::CurrentRating, SpecAttribute::TemperatureRange],
    },
    Category {
        key: "industrial-electrical",
        product_type: "ELECTRICAL_WIRING",
        recommended: &[
            SpecAttribute::CurrentRating,
            SpecAttribute::VoltageRating,
            SpecAttribute::TemperatureRange,
        ],
    },
];

/// Looks up a category by key.
#[must_use]
pub fn find_category(key: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.key == key)
}

/// Canonical length units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthUnit {
    /// Inches.
    Inches,
    /// Feet.
    Feet,
    /// Millimeters.
    Millimeters,
    /// Centimeters.
    Centimeters,
    /// Meters.
    Meters,
}

impl LengthUnit {
    /// Parses a unit word, accepting the usual synonyms in any case.
    #[must_use]
    pub fn from_word(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "inches" | "inch" | "in" => Some(Self::Inches),
            "feet" | "foot" | "ft" => Some(Self::Feet),
            "mm" | "millimeters" | "millimeter" => Some(Self::Millimeters),
            "cm" | "centimeters" | "centimeter" => Some(Self::Centimeters),
            "meters" | "meter" | "m" => Some(Self::Meters),
            _ => None,
        }
    }

    /// Canonical unit name, as used in marketplace attributes.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inches => "inches",
            Self::Feet => "feet",
            Self::Millimeters => "millimeters",
            Self::Centimeters => "centimeters",
            Self::Meters => "meters",
        }
    }
}

/// A cable length parsed from `<number> <unit-word>`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    /// Numeric magnitude.
    pub value: f64,
    /// Unit of the magnitude.
    pub unit: LengthUnit,
}

impl Length {
    /// Parses `"<number> <unit-word>"`.
    ///
    /// The number is an unsigned decimal (`12`, `0.5`); exactly one unit word
    /// must follow it.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let mut parts = input.split_whitespace();
        let number = parts.next()?;
        let unit = parts.next()?;
        if parts.next().is_some() || !is_plain_decimal(number) {
            return None;
        }

        Some(Self {
            value: number.parse().ok()?,
            unit: LengthUnit::from_word(unit)?,
        })
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit.as_str())
    }
}

/// Returns true for `digits` or `digits.digits`.
fn is_plain_decimal(s: &str) -> bool {
    let mut halves = s.splitn(2, '.');
    let whole = halves.next().unwrap_or_default();
    let fraction = halves.next();

    let all_digits = |part: &str| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit());

    all_digits(whole) && fraction.is_none_or(all_digits)
}

/// Numeric part of a gauge such as `"18 AWG"`.
#[must_use]
pub fn gauge_number(gauge: &str) -> Option<&str> {
    gauge
        .split_whitespace()
        .next()
        .filter(|n| n.chars().all(|c| c.is_ascii_digit()))
}
