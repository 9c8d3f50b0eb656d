//! # Decider Combinator
//!
//! Conditions compare signals (or a signal and a constant) and, when the
//! combined result holds, the outputs are emitted.
//!
//! Mutation is accumulation only: `add_condition` and `add_output` append to
//! the payload, which exists from construction.

use super::Networks;
use crate::sparse::{self, SparseMap};
use crate::{BlueprintError, BlueprintResult, SignalId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// COMPARATOR
// =============================================================================

/// Comparison operator of a decider condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Comparator {
    #[default]
    #[serde(rename = "<")]
    Less,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = "≥")]
    GreaterOrEqual,
    #[serde(rename = "≤")]
    LessOrEqual,
    #[serde(rename = "≠")]
    NotEqual,
}

impl Comparator {
    /// Symbol as written in blueprints.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Comparator::Less => "<",
            Comparator::Greater => ">",
            Comparator::Equal => "=",
            Comparator::GreaterOrEqual => "≥",
            Comparator::LessOrEqual => "≤",
            Comparator::NotEqual => "≠",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Comparator {
    type Err = BlueprintError;

    /// Accepts the blueprint symbols and their ASCII spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "<" => Ok(Comparator::Less),
            ">" => Ok(Comparator::Greater),
            "=" | "==" => Ok(Comparator::Equal),
            "≥" | ">=" => Ok(Comparator::GreaterOrEqual),
            "≤" | "<=" => Ok(Comparator::LessOrEqual),
            "≠" | "!=" => Ok(Comparator::NotEqual),
            other => Err(BlueprintError::Structural(format!(
                "unknown comparator: {}",
                other
            ))),
        }
    }
}

/// How a condition combines with the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareType {
    And,
    Or,
}

impl CompareType {
    const fn as_str(self) -> &'static str {
        match self {
            CompareType::And => "and",
            CompareType::Or => "or",
        }
    }
}

// =============================================================================
// CONDITION & OUTPUT
// =============================================================================

/// One row of the condition list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct DeciderCondition {
    #[serde(default)]
    pub first_signal: Option<SignalId>,
    #[serde(default)]
    pub first_signal_networks: Option<Networks>,
    #[serde(default)]
    pub constant: Option<i32>,
    #[serde(default)]
    pub second_signal: Option<SignalId>,
    #[serde(default)]
    pub second_signal_networks: Option<Networks>,
    #[serde(default)]
    pub comparator: Comparator,
    #[serde(default)]
    pub compare_type: Option<CompareType>,
}

impl DeciderCondition {
    /// `signal <comparator> constant`.
    #[must_use]
    pub fn signal_vs_constant(signal: SignalId, comparator: Comparator, constant: i32) -> Self {
        Self {
            first_signal: Some(signal),
            constant: Some(constant),
            comparator,
            ..Self::default()
        }
    }

    /// `first <comparator> second`.
    #[must_use]
    pub fn signal_vs_signal(first: SignalId, comparator: Comparator, second: SignalId) -> Self {
        Self {
            first_signal: Some(first),
            second_signal: Some(second),
            comparator,
            ..Self::default()
        }
    }

    /// Restrict which networks the first signal is read from.
    #[must_use]
    pub fn with_first_networks(mut self, networks: Networks) -> Self {
        self.first_signal_networks = Some(networks);
        self
    }

    /// Restrict which networks the second signal is read from.
    #[must_use]
    pub fn with_second_networks(mut self, networks: Networks) -> Self {
        self.second_signal_networks = Some(networks);
        self
    }

    /// Combine with the previous condition using AND.
    #[must_use]
    pub fn and(mut self) -> Self {
        self.compare_type = Some(CompareType::And);
        self
    }

    /// Combine with the previous condition using OR.
    #[must_use]
    pub fn or(mut self) -> Self {
        self.compare_type = Some(CompareType::Or);
        self
    }

    fn to_document(&self) -> Value {
        let mut map = SparseMap::new(sparse::DECIDER_CONDITION_FIELDS);
        map.put_opt("first_signal", self.first_signal.as_ref().map(SignalId::to_document))
            .put_opt(
                "first_signal_networks",
                self.first_signal_networks.map(Networks::to_document),
            )
            .put_opt("constant", self.constant)
            .put_opt("second_signal", self.second_signal.as_ref().map(SignalId::to_document))
            .put_opt(
                "second_signal_networks",
                self.second_signal_networks.map(Networks::to_document),
            )
            .put("comparator", Value::from(self.comparator.symbol()))
            .put_opt("compare_type", self.compare_type.map(CompareType::as_str));
        map.finish()
    }
}

fn copy_by_default() -> bool {
    true
}

/// One row of the output list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeciderOutput {
    #[serde(default)]
    pub signal: Option<SignalId>,
    /// Emit the input count of `signal` (`true`) or a fixed value (`false`).
    #[serde(default = "copy_by_default")]
    pub copy_count_from_input: bool,
    #[serde(default)]
    pub networks: Option<Networks>,
    /// Fixed value when not copying; the game uses `1` when absent.
    #[serde(default)]
    pub constant: Option<i32>,
}

impl Default for DeciderOutput {
    fn default() -> Self {
        Self {
            signal: None,
            copy_count_from_input: copy_by_default(),
            networks: None,
            constant: None,
        }
    }
}

impl DeciderOutput {
    /// Output `signal` with the count read from the input networks.
    #[must_use]
    pub fn copy(signal: SignalId) -> Self {
        Self {
            signal: Some(signal),
            ..Self::default()
        }
    }

    /// Output `signal` with a fixed value of `constant`.
    #[must_use]
    pub fn fixed(signal: SignalId, constant: i32) -> Self {
        Self {
            signal: Some(signal),
            copy_count_from_input: false,
            networks: None,
            constant: Some(constant),
        }
    }

    /// Restrict which networks the copied count is read from.
    #[must_use]
    pub fn with_networks(mut self, networks: Networks) -> Self {
        self.networks = Some(networks);
        self
    }

    fn to_document(&self) -> Value {
        let mut map = SparseMap::new(sparse::DECIDER_OUTPUT_FIELDS);
        map.put_opt("signal", self.signal.as_ref().map(SignalId::to_document))
            .put("copy_count_from_input", Value::from(self.copy_count_from_input))
            .put_opt("networks", self.networks.map(Networks::to_document))
            .put_opt("constant", self.constant);
        map.finish()
    }
}

// =============================================================================
// DECIDER BEHAVIOR
// =============================================================================

#[derive(Deserialize, Default)]
struct RawDecider {
    #[serde(default)]
    decider_conditions: RawDeciderConditions,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Deserialize, Default)]
struct RawDeciderConditions {
    #[serde(default)]
    conditions: Vec<DeciderCondition>,
    #[serde(default)]
    outputs: Vec<DeciderOutput>,
}

/// Control behavior of a decider combinator.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeciderBehavior {
    pub conditions: Vec<DeciderCondition>,
    pub outputs: Vec<DeciderOutput>,
    /// Unrecognized `control_behavior` keys, re-emitted verbatim.
    pub extra: Map<String, Value>,
}

impl DeciderBehavior {
    /// Create an empty behavior.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `control_behavior` fragment.
    pub fn from_document(fragment: &Value) -> BlueprintResult<Self> {
        let raw: RawDecider = serde_json::from_value(fragment.clone()).map_err(|e| {
            BlueprintError::Structural(format!("decider combinator behavior: {}", e))
        })?;
        Ok(Self {
            conditions: raw.decider_conditions.conditions,
            outputs: raw.decider_conditions.outputs,
            extra: raw.extra,
        })
    }

    /// Flatten into a `control_behavior` fragment (`null` when empty).
    pub fn to_document(&self) -> Value {
        let mut inner = SparseMap::new(sparse::DECIDER_CONDITIONS_FIELDS);
        inner
            .put(
                "conditions",
                Value::Array(self.conditions.iter().map(DeciderCondition::to_document).collect()),
            )
            .put(
                "outputs",
                Value::Array(self.outputs.iter().map(DeciderOutput::to_document).collect()),
            );

        let mut outer = SparseMap::new(sparse::DECIDER_BEHAVIOR_FIELDS);
        outer
            .put("decider_conditions", inner.finish())
            .put_extra(&self.extra);

        let doc = outer.finish();
        if sparse::is_falsy(&doc) {
            Value::Null
        } else {
            doc
        }
    }

    /// Append a condition.
    pub fn add_condition(&mut self, condition: DeciderCondition) -> &mut Self {
        self.conditions.push(condition);
        self
    }

    /// Append an output.
    pub fn add_output(&mut self, output: DeciderOutput) -> &mut Self {
        self.outputs.push(output);
        self
    }
}
