//! # bpkit-core
//!
//! Blueprint exchange-string codec and data model - THE CODEC.
//!
//! This crate converts between the opaque exchange string a factory game
//! uses to share blueprints and a structured, mutable, round-trippable model
//! of the blueprint: entities, combinator logic, icons and wires.
//!
//! ## Layers
//!
//! - `formats` → exchange string <-> generic [`Document`]
//! - `catalog` → caller-supplied slot -> signal table
//! - `sparse` → per-field omit-if-default policy tables
//! - `entity` → entities and their control-behavior variants
//! - `blueprint` → the aggregate and its invariants
//! - `wiring` → circuit wire descriptors between two entities
//!
//! ## Constraints
//!
//! The core:
//! - Is pure and synchronous: NO async, NO network, NO logging
//! - Never produces a partial result: every operation either succeeds or
//!   returns a [`BlueprintError`]
//! - Receives external data (the signal catalog) explicitly
//!
//! ## Example
//!
//! ```
//! use bpkit_core::{Blueprint, Entity, Position, WireColors};
//!
//! let mut bp = Blueprint::new();
//! let a = bp.add_entity(Entity::decider_combinator(Position::new(0.5, 1.0)))?;
//! let b = bp.add_entity(Entity::arithmetic_combinator(Position::new(1.5, 1.0)))?;
//! bp.connect(a, b, "oi".parse()?, WireColors::RED)?;
//!
//! let text = bp.to_exchange_string()?;
//! assert_eq!(Blueprint::from_exchange_string(&text)?, bp);
//! # Ok::<(), bpkit_core::BlueprintError>(())
//! ```

// =============================================================================
// MODULES
// =============================================================================

pub mod blueprint;
pub mod catalog;
pub mod entity;
pub mod formats;
pub mod primitives;
pub mod sparse;
pub mod types;
pub mod wiring;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    BlueprintError, BlueprintResult, DecodeStage, Direction, Document, EntityNumber, Position,
    Quality, SignalId,
};

// =============================================================================
// RE-EXPORTS: Model
// =============================================================================

pub use blueprint::{Blueprint, Icon};
pub use catalog::SignalCatalog;
pub use entity::{
    ArithmeticBehavior, ArithmeticOperation, CompareType, Comparator, ConstantBehavior,
    ControlBehavior, DeciderBehavior, DeciderCondition, DeciderOutput, Entity, Filter, Networks,
    Operand, PackedSlot, Section,
};
pub use wiring::{ConnectCode, Pin, Side, Wire, WireColor, WireColors};

// =============================================================================
// RE-EXPORTS: Formats (from formats module)
// =============================================================================

pub use formats::{decode, encode};
