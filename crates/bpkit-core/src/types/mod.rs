//! # Core Type Definitions
//!
//! This module contains the small value types shared by every layer of the
//! blueprint model:
//! - Identifiers (`EntityNumber`)
//! - Placement (`Position`, `Direction`)
//! - Signal references (`SignalId`, `Quality`)
//! - Error types (`BlueprintError`, `DecodeStage`)
//!
//! ## Document Model
//!
//! The untyped intermediate representation is `serde_json::Value`, aliased as
//! [`Document`]. Typed values parse from it and flatten back into it through
//! the sparse policy tables in [`crate::sparse`].

use crate::sparse::{self, SparseMap};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Generic tree of maps, sequences and scalars produced by the codec.
pub type Document = Value;

/// Result alias used throughout the crate.
pub type BlueprintResult<T> = Result<T, BlueprintError>;

// =============================================================================
// ENTITY NUMBER
// =============================================================================

/// Positive identifier of an entity inside one blueprint.
///
/// Wires refer to entities by this number, so it must be unique within the
/// owning blueprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityNumber(pub u32);

impl EntityNumber {
    /// Get the raw number.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// POSITION
// =============================================================================

/// Tile position of an entity.
///
/// Both coordinates default to `0` when missing from the input map.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Flatten into a document fragment.
    ///
    /// Whole coordinates are written as integers, the way the game writes
    /// them. Non-finite coordinates have no JSON form and fail with
    /// `BlueprintError::Encode`.
    pub fn to_document(&self) -> BlueprintResult<Value> {
        let mut map = SparseMap::new(sparse::POSITION_FIELDS);
        map.put("x", coordinate_value(self.x)?);
        map.put("y", coordinate_value(self.y)?);
        Ok(map.finish())
    }
}

/// Largest magnitude at which every whole `f64` is still an exact integer.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

fn coordinate_value(v: f64) -> BlueprintResult<Value> {
    if !v.is_finite() {
        return Err(BlueprintError::Encode(format!(
            "coordinate {} is not a finite number",
            v
        )));
    }
    if v.fract() == 0.0 && v.abs() < MAX_EXACT_INTEGER {
        return Ok(Value::from(v as i64));
    }
    Number::from_f64(v)
        .map(Value::Number)
        .ok_or_else(|| BlueprintError::Encode(format!("coordinate {} is not representable", v)))
}

// =============================================================================
// DIRECTION
// =============================================================================

/// Eight-way rotation, encoded on the wire as even integers `0..=14`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// All directions in clockwise order starting at north.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Wire value of this direction.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Direction::North => 0,
            Direction::NorthEast => 2,
            Direction::East => 4,
            Direction::SouthEast => 6,
            Direction::South => 8,
            Direction::SouthWest => 10,
            Direction::West => 12,
            Direction::NorthWest => 14,
        }
    }

    /// Look up a direction by its wire value.
    #[must_use]
    pub fn from_code(code: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|d| u64::from(d.code()) == code)
    }
}

impl FromStr for Direction {
    type Err = BlueprintError;

    /// Accepts full names (`north-east`, `northeast`), compass abbreviations
    /// (`ne`) or the wire value (`2`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "");
        let direction = match key.as_str() {
            "n" | "north" => Direction::North,
            "ne" | "northeast" => Direction::NorthEast,
            "e" | "east" => Direction::East,
            "se" | "southeast" => Direction::SouthEast,
            "s" | "south" => Direction::South,
            "sw" | "southwest" => Direction::SouthWest,
            "w" | "west" => Direction::West,
            "nw" | "northwest" => Direction::NorthWest,
            other => other
                .parse::<u64>()
                .ok()
                .and_then(Direction::from_code)
                .ok_or_else(|| BlueprintError::Structural(format!("unknown direction: {}", s)))?,
        };
        Ok(direction)
    }
}

// =============================================================================
// SIGNALS
// =============================================================================

/// Reference to a named, optionally typed signal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignalId {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl SignalId {
    /// A signal with an explicit type (`item`, `virtual`, `fluid`, ...).
    #[must_use]
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: Some(kind.into()),
        }
    }

    /// A signal without a type; the game treats it as an item.
    #[must_use]
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: None,
        }
    }

    /// Shorthand for a `virtual` signal such as `signal-A`.
    #[must_use]
    pub fn virtual_signal(name: impl Into<String>) -> Self {
        Self::new(name, "virtual")
    }

    /// Flatten into a document fragment, omitting an absent type.
    pub fn to_document(&self) -> Value {
        let mut map = SparseMap::new(sparse::SIGNAL_FIELDS);
        map.put("name", Value::from(self.name.as_str()));
        map.put_opt("type", self.kind.as_deref());
        map.finish()
    }
}

impl FromStr for SignalId {
    type Err = BlueprintError;

    /// Parses `type:name` or a bare `name`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let signal = match s.split_once(':') {
            Some((kind, name)) if !kind.is_empty() && !name.is_empty() => SignalId::new(name, kind),
            Some(_) => {
                return Err(BlueprintError::Structural(format!(
                    "malformed signal reference: {}",
                    s
                )));
            }
            None if !s.is_empty() => SignalId::untyped(s),
            None => {
                return Err(BlueprintError::Structural(
                    "empty signal reference".to_string(),
                ));
            }
        };
        Ok(signal)
    }
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Some(kind) => write!(f, "{}:{}", kind, self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Quality tier attachable to a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    #[default]
    Normal,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Quality {
    /// Fixed cycle used when packing values; order decides which tier each
    /// packed value receives.
    pub const CYCLE: [Quality; 5] = [
        Quality::Normal,
        Quality::Uncommon,
        Quality::Rare,
        Quality::Epic,
        Quality::Legendary,
    ];

    /// Wire name of the tier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Quality::Normal => "normal",
            Quality::Uncommon => "uncommon",
            Quality::Rare => "rare",
            Quality::Epic => "epic",
            Quality::Legendary => "legendary",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Quality {
    type Err = BlueprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Quality::CYCLE
            .into_iter()
            .find(|q| q.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| BlueprintError::Structural(format!("unknown quality tier: {}", s)))
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Sub-stage of a failed decode, so callers can tell a mangled paste from a
/// corrupt payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStage {
    /// The text is not valid Base64 (or too long to be a blueprint).
    Base64,
    /// The decoded bytes are not a complete zlib stream.
    Inflate,
    /// The inflated payload is not JSON.
    Json,
}

impl fmt::Display for DecodeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DecodeStage::Base64 => "base64",
            DecodeStage::Inflate => "inflate",
            DecodeStage::Json => "json",
        })
    }
}

/// Errors that can occur in the blueprint core.
///
/// - No silent failures, no partial results
/// - The core never logs; presenting the error is the caller's job
#[derive(Debug, Error)]
pub enum BlueprintError {
    /// The exchange string could not be turned into a document.
    #[error("Decode failed at {stage} stage: {message}")]
    Decode { stage: DecodeStage, message: String },

    /// The document could not be serialized.
    #[error("Encode failed: {0}")]
    Encode(String),

    /// The document does not have the expected shape.
    #[error("Structural error: {0}")]
    Structural(String),

    /// A wire endpoint has no entity number yet.
    #[error("Entity has no entity_number assigned")]
    UnassignedEntity,

    /// A wire endpoint refers to an entity that is not in the blueprint.
    #[error("Entity {0} is not part of this blueprint")]
    UnknownEntity(EntityNumber),

    /// Two entities would share one number.
    #[error("Entity number {0} is already taken")]
    DuplicateEntityNumber(EntityNumber),

    /// Connect code outside `ii`, `io`, `oi`, `oo`.
    #[error("Invalid connect code {0:?} (expected ii, io, oi or oo)")]
    InvalidConnectCode(String),

    /// Wire color character other than `r` or `g`.
    #[error("Invalid wire color {0:?} (expected r or g)")]
    InvalidWireColor(char),

    /// The catalog has no signal for the requested slot.
    #[error("Catalog has no signal for slot {0}")]
    CatalogLookup(u32),

    /// A variant-specific mutator was used on the wrong kind of entity.
    #[error("Entity {name:?} does not carry a {expected} control behavior")]
    WrongBehavior { name: String, expected: &'static str },

    /// Blueprint icons are numbered 1 to 4.
    #[error("Icon index {0} out of range (expected 1..=4)")]
    IconIndexOutOfRange(u8),

    /// An I/O error occurred in a caller-side adapter.
    #[error("I/O error: {0}")]
    Io(String),
}

impl BlueprintError {
    /// Build a decode error for the given stage.
    pub fn decode(stage: DecodeStage, message: impl fmt::Display) -> Self {
        Self::Decode {
            stage,
            message: message.to_string(),
        }
    }

    /// Stable machine-readable name of the error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Decode { .. } => "decode",
            Self::Encode(_) => "encode",
            Self::Structural(_) => "structural",
            Self::UnassignedEntity => "unassigned_entity",
            Self::UnknownEntity(_) => "unknown_entity",
            Self::DuplicateEntityNumber(_) => "duplicate_entity_number",
            Self::InvalidConnectCode(_) => "invalid_connect_code",
            Self::InvalidWireColor(_) => "invalid_wire_color",
            Self::CatalogLookup(_) => "catalog_lookup",
            Self::WrongBehavior { .. } => "wrong_behavior",
            Self::IconIndexOutOfRange(_) => "icon_index_out_of_range",
            Self::Io(_) => "io",
        }
    }

    /// The decode stage, if this is a decode error.
    #[must_use]
    pub fn decode_stage(&self) -> Option<DecodeStage> {
        match self {
            Self::Decode { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
