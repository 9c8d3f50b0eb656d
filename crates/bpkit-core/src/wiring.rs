//! # Wire Connection Resolver
//!
//! Computes the wire descriptors linking two entities' circuit connectors.
//!
//! A wire is stored as `[entity_a, connector_a, entity_b, connector_b]`.
//! Combinators have four circuit connectors:
//!
//! | id | connector    |
//! |----|--------------|
//! | 1  | input red    |
//! | 2  | input green  |
//! | 3  | output red   |
//! | 4  | output green |
//!
//! Other ids (copper wiring on poles, switch connectors) are carried through
//! untouched when a blueprint is parsed.

use crate::{BlueprintError, BlueprintResult, Entity, EntityNumber};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// CONNECTORS
// =============================================================================

/// Connector id on an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pin(pub u8);

impl Pin {
    pub const INPUT_RED: Pin = Pin(1);
    pub const INPUT_GREEN: Pin = Pin(2);
    pub const OUTPUT_RED: Pin = Pin(3);
    pub const OUTPUT_GREEN: Pin = Pin(4);

    /// Connector for a side and a color.
    #[must_use]
    pub const fn circuit(side: Side, color: WireColor) -> Pin {
        match (side, color) {
            (Side::Input, WireColor::Red) => Pin::INPUT_RED,
            (Side::Input, WireColor::Green) => Pin::INPUT_GREEN,
            (Side::Output, WireColor::Red) => Pin::OUTPUT_RED,
            (Side::Output, WireColor::Green) => Pin::OUTPUT_GREEN,
        }
    }
}

/// Input or output side of a combinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Input,
    Output,
}

impl Side {
    fn from_char(c: char) -> Option<Self> {
        match c {
            'i' => Some(Side::Input),
            'o' => Some(Side::Output),
            _ => None,
        }
    }

    const fn as_char(self) -> char {
        match self {
            Side::Input => 'i',
            Side::Output => 'o',
        }
    }
}

/// Circuit wire color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WireColor {
    Red,
    Green,
}

// =============================================================================
// CONNECT CODE
// =============================================================================

/// Which side of each endpoint a connection uses: `ii`, `io`, `oi` or `oo`.
///
/// The first letter applies to the first entity, the second letter to the
/// second entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectCode {
    pub first: Side,
    pub second: Side,
}

impl ConnectCode {
    #[must_use]
    pub const fn new(first: Side, second: Side) -> Self {
        Self { first, second }
    }
}

impl FromStr for ConnectCode {
    type Err = BlueprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BlueprintError::InvalidConnectCode(s.to_string());
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(a), Some(b), None) => {
                let first = Side::from_char(a).ok_or_else(invalid)?;
                let second = Side::from_char(b).ok_or_else(invalid)?;
                Ok(Self { first, second })
            }
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for ConnectCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.first.as_char(), self.second.as_char())
    }
}

// =============================================================================
// WIRE COLORS
// =============================================================================

/// Set of wire colors to lay. Iterates red before green.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WireColors {
    pub red: bool,
    pub green: bool,
}

impl WireColors {
    pub const RED: WireColors = WireColors {
        red: true,
        green: false,
    };
    pub const GREEN: WireColors = WireColors {
        red: false,
        green: true,
    };
    pub const BOTH: WireColors = WireColors {
        red: true,
        green: true,
    };

    /// Selected colors, red first.
    pub fn iter(self) -> impl Iterator<Item = WireColor> {
        [(self.red, WireColor::Red), (self.green, WireColor::Green)]
            .into_iter()
            .filter_map(|(on, color)| on.then_some(color))
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        !self.red && !self.green
    }
}

impl FromStr for WireColors {
    type Err = BlueprintError;

    /// Parse a string of `r` and `g` characters. Order and repeats do not
    /// matter.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut colors = WireColors::default();
        for c in s.chars() {
            match c {
                'r' => colors.red = true,
                'g' => colors.green = true,
                other => return Err(BlueprintError::InvalidWireColor(other)),
            }
        }
        Ok(colors)
    }
}

// =============================================================================
// WIRE
// =============================================================================

/// One wire between two connectors. Serialized as a 4-element array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(EntityNumber, Pin, EntityNumber, Pin)")]
#[serde(into = "(EntityNumber, Pin, EntityNumber, Pin)")]
pub struct Wire {
    pub a: EntityNumber,
    pub a_pin: Pin,
    pub b: EntityNumber,
    pub b_pin: Pin,
}

impl From<(EntityNumber, Pin, EntityNumber, Pin)> for Wire {
    fn from((a, a_pin, b, b_pin): (EntityNumber, Pin, EntityNumber, Pin)) -> Self {
        Self { a, a_pin, b, b_pin }
    }
}

impl From<Wire> for (EntityNumber, Pin, EntityNumber, Pin) {
    fn from(w: Wire) -> Self {
        (w.a, w.a_pin, w.b, w.b_pin)
    }
}

/// Wires between two entity numbers, one per selected color.
#[must_use]
pub fn wires_between(
    a: EntityNumber,
    b: EntityNumber,
    code: ConnectCode,
    colors: WireColors,
) -> Vec<Wire> {
    colors
        .iter()
        .map(|color| Wire {
            a,
            a_pin: Pin::circuit(code.first, color),
            b,
            b_pin: Pin::circuit(code.second, color),
        })
        .collect()
}

/// Wires connecting `a` to `b`.
///
/// Both entities need an assigned number; whether they belong to a blueprint
/// is the caller's concern.
pub fn resolve(
    a: &Entity,
    b: &Entity,
    code: ConnectCode,
    colors: WireColors,
) -> BlueprintResult<Vec<Wire>> {
    let a_num = a.entity_number().ok_or(BlueprintError::UnassignedEntity)?;
    let b_num = b.entity_number().ok_or(BlueprintError::UnassignedEntity)?;
    Ok(wires_between(a_num, b_num, code, colors))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Position;
    use serde_json::json;

    fn numbered(n: u32) -> Entity {
        Entity::decider_combinator(Position::default()).with_number(EntityNumber(n))
    }

    #[test]
    fn input_to_output_both_colors() {
        let wires = resolve(
            &numbered(1),
            &numbered(2),
            "io".parse().expect("code"),
            "rg".parse().expect("colors"),
        )
        .expect("resolve");
        assert_eq!(
            serde_json::to_value(&wires).expect("serialize"),
            json!([[1, 1, 2, 3], [1, 2, 2, 4]])
        );
    }

    #[test]
    fn every_code_maps_to_expected_pins() {
        let cases = [
            ("ii", Pin::INPUT_RED, Pin::INPUT_RED),
            ("io", Pin::INPUT_RED, Pin::OUTPUT_RED),
            ("oi", Pin::OUTPUT_RED, Pin::INPUT_RED),
            ("oo", Pin::OUTPUT_RED, Pin::OUTPUT_RED),
        ];
        for (code, a_pin, b_pin) in cases {
            let code: ConnectCode = code.parse().expect("code");
            let wires = wires_between(EntityNumber(5), EntityNumber(9), code, WireColors::RED);
            assert_eq!(wires.len(), 1);
            assert_eq!((wires[0].a_pin, wires[0].b_pin), (a_pin, b_pin), "{code}");
        }
    }

    #[test]
    fn green_only() {
        let wires = wires_between(
            EntityNumber(1),
            EntityNumber(2),
            "oo".parse().expect("code"),
            WireColors::GREEN,
        );
        assert_eq!(wires, vec![Wire {
            a: EntityNumber(1),
            a_pin: Pin::OUTPUT_GREEN,
            b: EntityNumber(2),
            b_pin: Pin::OUTPUT_GREEN,
        }]);
    }

    #[test]
    fn colors_emit_red_first_and_collapse_repeats() {
        let colors: WireColors = "ggrg".parse().expect("colors");
        assert_eq!(colors, WireColors::BOTH);
        assert_eq!(colors.iter().collect::<Vec<_>>(), vec![WireColor::Red, WireColor::Green]);
    }

    #[test]
    fn empty_colors_yield_no_wires() {
        let colors: WireColors = "".parse().expect("colors");
        assert!(colors.is_empty());
        let wires = resolve(&numbered(1), &numbered(2), "ii".parse().expect("code"), colors)
            .expect("resolve");
        assert!(wires.is_empty());
    }

    #[test]
    fn rejects_bad_color() {
        assert!(matches!(
            "rb".parse::<WireColors>(),
            Err(BlueprintError::InvalidWireColor('b'))
        ));
    }

    #[test]
    fn rejects_bad_code() {
        for bad in ["", "i", "iio", "xo", "IO"] {
            assert!(
                matches!(bad.parse::<ConnectCode>(), Err(BlueprintError::InvalidConnectCode(_))),
                "{bad:?} should be rejected"
            );
        }
        let code: ConnectCode = "oi".parse().expect("code");
        assert_eq!(code.to_string(), "oi");
    }

    #[test]
    fn unassigned_endpoint_is_an_error() {
        let unnumbered = Entity::arithmetic_combinator(Position::default());
        let result = resolve(&numbered(1), &unnumbered, ConnectCode::new(Side::Input, Side::Output), WireColors::RED);
        assert!(matches!(result, Err(BlueprintError::UnassignedEntity)));
    }

    #[test]
    fn wire_parses_foreign_connectors() {
        let wire: Wire = serde_json::from_value(json!([3, 5, 4, 5])).expect("parse");
        assert_eq!(wire.a_pin, Pin(5));
        assert_eq!(serde_json::to_value(wire).expect("serialize"), json!([3, 5, 4, 5]));
    }
}
