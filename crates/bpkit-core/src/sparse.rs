//! # Sparse Serialization Policy
//!
//! Blueprint documents leave out every field whose value is absent, empty,
//! zero or `false`. A field present with such a value on input is therefore
//! indistinguishable from a missing one after decode -> encode.
//!
//! The rule is not applied ad hoc. Each document shape has a policy table
//! below listing every field it can emit and whether that field may be
//! dropped. Fields the game reads with a non-falsy default (network flags,
//! `copy_count_from_input`) or whose zero carries meaning (`position`,
//! filter `count`) are marked [`Omit::Never`].

use serde_json::{Map, Value};

/// Omission policy of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Omit {
    /// Always written, even when falsy.
    Never,
    /// Dropped when the value is falsy.
    IfFalsy,
}

/// One row of a policy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub key: &'static str,
    pub omit: Omit,
}

const fn never(key: &'static str) -> FieldRule {
    FieldRule {
        key,
        omit: Omit::Never,
    }
}

const fn if_falsy(key: &'static str) -> FieldRule {
    FieldRule {
        key,
        omit: Omit::IfFalsy,
    }
}

// =============================================================================
// POLICY TABLES
// =============================================================================

/// `blueprint` object.
pub const BLUEPRINT_FIELDS: &[FieldRule] = &[
    never("item"),
    if_falsy("label"),
    if_falsy("description"),
    if_falsy("icons"),
    if_falsy("entities"),
    if_falsy("wires"),
    if_falsy("version"),
];

/// Entry of `blueprint.icons`.
pub const ICON_FIELDS: &[FieldRule] = &[never("signal"), never("index")];

/// Signal reference (`{name, type?}`).
pub const SIGNAL_FIELDS: &[FieldRule] = &[never("name"), if_falsy("type")];

/// Entity position.
pub const POSITION_FIELDS: &[FieldRule] = &[never("x"), never("y")];

/// Entry of `blueprint.entities`.
pub const ENTITY_FIELDS: &[FieldRule] = &[
    if_falsy("entity_number"),
    if_falsy("name"),
    if_falsy("type"),
    never("position"),
    if_falsy("direction"),
    if_falsy("control_behavior"),
];

/// Constant combinator `control_behavior` and its `sections` wrapper.
pub const CONSTANT_BEHAVIOR_FIELDS: &[FieldRule] = &[if_falsy("sections")];

/// One section of a constant combinator.
pub const SECTION_FIELDS: &[FieldRule] = &[never("index"), if_falsy("filters")];

/// One filter inside a section.
pub const FILTER_FIELDS: &[FieldRule] = &[
    never("index"),
    never("name"),
    if_falsy("type"),
    never("quality"),
    never("comparator"),
    never("count"),
];

/// Decider combinator `control_behavior`.
pub const DECIDER_BEHAVIOR_FIELDS: &[FieldRule] = &[if_falsy("decider_conditions")];

/// `decider_conditions` object.
pub const DECIDER_CONDITIONS_FIELDS: &[FieldRule] =
    &[if_falsy("conditions"), if_falsy("outputs")];

/// One decider condition.
pub const DECIDER_CONDITION_FIELDS: &[FieldRule] = &[
    if_falsy("first_signal"),
    if_falsy("first_signal_networks"),
    if_falsy("constant"),
    if_falsy("second_signal"),
    if_falsy("second_signal_networks"),
    never("comparator"),
    if_falsy("compare_type"),
];

/// One decider output.
pub const DECIDER_OUTPUT_FIELDS: &[FieldRule] = &[
    if_falsy("signal"),
    never("copy_count_from_input"),
    if_falsy("networks"),
    if_falsy("constant"),
];

/// Red/green network selection.
pub const NETWORK_FIELDS: &[FieldRule] = &[never("red"), never("green")];

/// Arithmetic combinator `control_behavior`.
pub const ARITHMETIC_BEHAVIOR_FIELDS: &[FieldRule] = &[if_falsy("arithmetic_conditions")];

/// `arithmetic_conditions` object.
pub const ARITHMETIC_CONDITIONS_FIELDS: &[FieldRule] = &[
    if_falsy("first_signal"),
    if_falsy("first_signal_networks"),
    if_falsy("first_constant"),
    if_falsy("second_signal"),
    if_falsy("second_signal_networks"),
    if_falsy("second_constant"),
    if_falsy("operation"),
    if_falsy("output_signal"),
];

// =============================================================================
// FALSY TEST
// =============================================================================

/// Whether a value counts as "not set" for the sparse rule.
#[must_use]
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Look up the policy of `key` in `rules`.
///
/// Keys missing from the table follow the default rule and are dropped when
/// falsy.
#[must_use]
pub fn policy(rules: &[FieldRule], key: &str) -> Omit {
    rules
        .iter()
        .find(|r| r.key == key)
        .map_or(Omit::IfFalsy, |r| r.omit)
}

// =============================================================================
// SPARSE MAP BUILDER
// =============================================================================

/// Object builder that applies a policy table on every insertion.
///
/// Keys keep insertion order.
#[derive(Debug)]
pub struct SparseMap {
    rules: &'static [FieldRule],
    map: Map<String, Value>,
}

impl SparseMap {
    /// Start an empty object governed by `rules`.
    #[must_use]
    pub fn new(rules: &'static [FieldRule]) -> Self {
        Self {
            rules,
            map: Map::new(),
        }
    }

    /// Insert `value` under `key` unless the policy drops it.
    pub fn put(&mut self, key: &str, value: Value) -> &mut Self {
        if policy(self.rules, key) == Omit::Never || !is_falsy(&value) {
            self.map.insert(key.to_string(), value);
        }
        self
    }

    /// Insert an optional value; `None` is treated as `null`.
    pub fn put_opt<T: Into<Value>>(&mut self, key: &str, value: Option<T>) -> &mut Self {
        self.put(key, value.map_or(Value::Null, Into::into))
    }

    /// Insert every entry of `extra` whose key is not already present.
    ///
    /// Extras are fields this crate does not model; they are copied verbatim,
    /// falsy or not, because their defaults are unknown here.
    pub fn put_extra(&mut self, extra: &Map<String, Value>) -> &mut Self {
        for (key, value) in extra {
            if !self.map.contains_key(key) {
                self.map.insert(key.clone(), value.clone());
            }
        }
        self
    }

    /// Finish into a JSON object.
    #[must_use]
    pub fn finish(self) -> Value {
        Value::Object(self.map)
    }
}

// =============================================================================
// TESTS
// =============================================================================
