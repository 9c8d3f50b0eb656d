//! # Entity Model
//!
//! A placed object: shared base fields plus one control-behavior variant.
//!
//! The variant is a tagged union rather than a type hierarchy, so every
//! consumer handles all combinator kinds exhaustively:
//! - `Passive`: no control behavior
//! - `Opaque`: behavior of a non-combinator entity, kept verbatim
//! - `Constant` / `Decider` / `Arithmetic`: typed combinator payloads
//!
//! The variant is chosen from the entity `name` when parsing and when
//! constructing with [`Entity::new`].

mod arithmetic;
mod constant;
mod decider;

pub use arithmetic::{ArithmeticBehavior, ArithmeticOperation, Operand};
pub use constant::{ConstantBehavior, Filter, PackedSlot, Section};
pub use decider::{CompareType, Comparator, DeciderBehavior, DeciderCondition, DeciderOutput};

use crate::primitives::{ARITHMETIC_COMBINATOR, CONSTANT_COMBINATOR, DECIDER_COMBINATOR};
use crate::sparse::{self, SparseMap};
use crate::{BlueprintError, BlueprintResult, Direction, EntityNumber, Position};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// NETWORKS
// =============================================================================

fn enabled() -> bool {
    true
}

/// Which circuit networks a signal is read from. Both are on by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Networks {
    #[serde(default = "enabled")]
    pub red: bool,
    #[serde(default = "enabled")]
    pub green: bool,
}

impl Networks {
    pub const BOTH: Networks = Networks {
        red: true,
        green: true,
    };
    pub const RED: Networks = Networks {
        red: true,
        green: false,
    };
    pub const GREEN: Networks = Networks {
        red: false,
        green: true,
    };

    /// Flatten into a document fragment; both flags are always written.
    pub fn to_document(self) -> Value {
        let mut map = SparseMap::new(sparse::NETWORK_FIELDS);
        map.put("red", Value::from(self.red))
            .put("green", Value::from(self.green));
        map.finish()
    }
}

impl Default for Networks {
    fn default() -> Self {
        Self::BOTH
    }
}

// =============================================================================
// CONTROL BEHAVIOR
// =============================================================================

/// Variant-specific control payload of an entity.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ControlBehavior {
    #[default]
    Passive,
    Opaque(Value),
    Constant(ConstantBehavior),
    Decider(DeciderBehavior),
    Arithmetic(ArithmeticBehavior),
}

impl ControlBehavior {
    /// Empty payload matching an entity name.
    #[must_use]
    pub fn for_name(name: &str) -> Self {
        match name {
            CONSTANT_COMBINATOR => ControlBehavior::Constant(ConstantBehavior::new()),
            DECIDER_COMBINATOR => ControlBehavior::Decider(DeciderBehavior::new()),
            ARITHMETIC_COMBINATOR => ControlBehavior::Arithmetic(ArithmeticBehavior::new()),
            _ => ControlBehavior::Passive,
        }
    }

    /// Parse a `control_behavior` fragment for an entity called `name`.
    pub fn from_document(name: &str, fragment: Option<&Value>) -> BlueprintResult<Self> {
        let Some(fragment) = fragment.filter(|v| !sparse::is_falsy(v)) else {
            return Ok(Self::for_name(name));
        };
        let behavior = match name {
            CONSTANT_COMBINATOR => {
                ControlBehavior::Constant(ConstantBehavior::from_document(fragment)?)
            }
            DECIDER_COMBINATOR => {
                ControlBehavior::Decider(DeciderBehavior::from_document(fragment)?)
            }
            ARITHMETIC_COMBINATOR => {
                ControlBehavior::Arithmetic(ArithmeticBehavior::from_document(fragment)?)
            }
            _ => ControlBehavior::Opaque(fragment.clone()),
        };
        Ok(behavior)
    }

    /// Flatten into a `control_behavior` fragment (`null` when empty).
    pub fn to_document(&self) -> Value {
        match self {
            ControlBehavior::Passive => Value::Null,
            ControlBehavior::Opaque(v) => v.clone(),
            ControlBehavior::Constant(c) => c.to_document(),
            ControlBehavior::Decider(d) => d.to_document(),
            ControlBehavior::Arithmetic(a) => a.to_document(),
        }
    }

    /// Short name of the variant.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            ControlBehavior::Passive => "passive",
            ControlBehavior::Opaque(_) => "opaque",
            ControlBehavior::Constant(_) => "constant",
            ControlBehavior::Decider(_) => "decider",
            ControlBehavior::Arithmetic(_) => "arithmetic",
        }
    }
}

// =============================================================================
// ENTITY
// =============================================================================

#[derive(Deserialize)]
struct RawEntity {
    #[serde(default)]
    entity_number: Option<u32>,
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    position: Option<Position>,
    #[serde(default)]
    direction: Option<u64>,
    #[serde(default)]
    control_behavior: Option<Value>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// A placed object in a blueprint.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Fixed once the entity belongs to a blueprint; see [`Entity::with_number`].
    pub(crate) entity_number: Option<EntityNumber>,
    pub name: String,
    /// Secondary classifier, present on signal-carrying entities.
    pub kind: Option<String>,
    pub position: Position,
    /// `None` is the default orientation.
    pub direction: Option<Direction>,
    pub control_behavior: ControlBehavior,
    /// Unrecognized keys (`items`, `tags`, ...), re-emitted verbatim.
    pub extra: Map<String, Value>,
}

/// Error for typed access to a payload the entity does not hold.
fn wrong_behavior(name: &str, expected: &'static str) -> BlueprintError {
    BlueprintError::WrongBehavior {
        name: name.to_string(),
        expected,
    }
}

impl Entity {
    /// Create an unnumbered entity; combinator names get an empty payload.
    #[must_use]
    pub fn new(name: impl Into<String>, position: Position) -> Self {
        let name = name.into();
        Self {
            entity_number: None,
            control_behavior: ControlBehavior::for_name(&name),
            name,
            kind: None,
            position,
            direction: None,
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn constant_combinator(position: Position) -> Self {
        Self::new(CONSTANT_COMBINATOR, position)
    }

    #[must_use]
    pub fn decider_combinator(position: Position) -> Self {
        Self::new(DECIDER_COMBINATOR, position)
    }

    #[must_use]
    pub fn arithmetic_combinator(position: Position) -> Self {
        Self::new(ARITHMETIC_COMBINATOR, position)
    }

    /// Request a specific number when the entity is added to a blueprint.
    #[must_use]
    pub fn with_number(mut self, number: EntityNumber) -> Self {
        self.entity_number = Some(number);
        self
    }

    /// Number within its blueprint, `None` until assigned.
    #[must_use]
    pub fn entity_number(&self) -> Option<EntityNumber> {
        self.entity_number
    }

    /// Parse one element of `blueprint.entities`.
    ///
    /// A missing `position` becomes `(0, 0)`; `entity_number` 0 counts as
    /// unassigned.
    pub fn from_document(fragment: &Value) -> BlueprintResult<Self> {
        let raw: RawEntity = serde_json::from_value(fragment.clone())
            .map_err(|e| BlueprintError::Structural(format!("entity: {}", e)))?;

        let name = raw.name.unwrap_or_default();
        let direction = raw
            .direction
            .map(|code| {
                Direction::from_code(code).ok_or_else(|| {
                    BlueprintError::Structural(format!(
                        "entity {:?}: unsupported direction {}",
                        name, code
                    ))
                })
            })
            .transpose()?;
        let control_behavior =
            ControlBehavior::from_document(&name, raw.control_behavior.as_ref())?;

        Ok(Self {
            entity_number: raw.entity_number.filter(|n| *n != 0).map(EntityNumber),
            kind: raw.kind,
            position: raw.position.unwrap_or_default(),
            direction,
            control_behavior,
            extra: raw.extra,
            name,
        })
    }

    /// Flatten into a document fragment.
    ///
    /// Falsy fields are dropped; `position` is always written.
    pub fn to_document(&self) -> BlueprintResult<Value> {
        let mut map = SparseMap::new(sparse::ENTITY_FIELDS);
        map.put_opt("entity_number", self.entity_number.map(EntityNumber::value))
            .put("name", Value::from(self.name.as_str()))
            .put_opt("type", self.kind.as_deref())
            .put("position", self.position.to_document()?)
            .put_opt("direction", self.direction.map(Direction::code))
            .put("control_behavior", self.control_behavior.to_document())
            .put_extra(&self.extra);
        Ok(map.finish())
    }

    /// Set the orientation. Whether the entity can actually rotate is not
    /// checked.
    pub fn rotate_to(&mut self, direction: Direction) {
        self.direction = Some(direction);
    }

    /// Overwrite the name and/or type. `None` and empty strings leave the
    /// field alone.
    pub fn replace(&mut self, name: Option<&str>, kind: Option<&str>) {
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            self.name = name.to_string();
        }
        if let Some(kind) = kind.filter(|k| !k.is_empty()) {
            self.kind = Some(kind.to_string());
        }
    }

    /// Constant combinator payload.
    pub fn constant_mut(&mut self) -> BlueprintResult<&mut ConstantBehavior> {
        match &mut self.control_behavior {
            ControlBehavior::Constant(c) => Ok(c),
            _ => Err(wrong_behavior(&self.name, "constant")),
        }
    }

    /// Decider combinator payload.
    pub fn decider_mut(&mut self) -> BlueprintResult<&mut DeciderBehavior> {
        match &mut self.control_behavior {
            ControlBehavior::Decider(d) => Ok(d),
            _ => Err(wrong_behavior(&self.name, "decider")),
        }
    }

    /// Arithmetic combinator payload.
    pub fn arithmetic_mut(&mut self) -> BlueprintResult<&mut ArithmeticBehavior> {
        match &mut self.control_behavior {
            ControlBehavior::Arithmetic(a) => Ok(a),
            _ => Err(wrong_behavior(&self.name, "arithmetic")),
        }
    }

    /// Constant combinator payload, if this is one.
    #[must_use]
    pub fn constant(&self) -> Option<&ConstantBehavior> {
        match &self.control_behavior {
            ControlBehavior::Constant(c) => Some(c),
            _ => None,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
