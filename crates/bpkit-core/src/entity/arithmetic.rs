//! # Arithmetic Combinator
//!
//! Computes `first <operation> second` and writes the result to an output
//! signal. Each operand is either a signal read from the input networks or a
//! constant.

use super::Networks;
use crate::sparse::{self, SparseMap};
use crate::{BlueprintError, BlueprintResult, SignalId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

/// Operator of an arithmetic combinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArithmeticOperation {
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "%")]
    Modulo,
    #[serde(rename = "^")]
    Power,
    #[serde(rename = "<<")]
    ShiftLeft,
    #[serde(rename = ">>")]
    ShiftRight,
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
    #[serde(rename = "XOR")]
    Xor,
}

impl ArithmeticOperation {
    const ALL: [ArithmeticOperation; 11] = [
        ArithmeticOperation::Multiply,
        ArithmeticOperation::Divide,
        ArithmeticOperation::Add,
        ArithmeticOperation::Subtract,
        ArithmeticOperation::Modulo,
        ArithmeticOperation::Power,
        ArithmeticOperation::ShiftLeft,
        ArithmeticOperation::ShiftRight,
        ArithmeticOperation::And,
        ArithmeticOperation::Or,
        ArithmeticOperation::Xor,
    ];

    /// Symbol as written in blueprints.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            ArithmeticOperation::Multiply => "*",
            ArithmeticOperation::Divide => "/",
            ArithmeticOperation::Add => "+",
            ArithmeticOperation::Subtract => "-",
            ArithmeticOperation::Modulo => "%",
            ArithmeticOperation::Power => "^",
            ArithmeticOperation::ShiftLeft => "<<",
            ArithmeticOperation::ShiftRight => ">>",
            ArithmeticOperation::And => "AND",
            ArithmeticOperation::Or => "OR",
            ArithmeticOperation::Xor => "XOR",
        }
    }
}

impl FromStr for ArithmeticOperation {
    type Err = BlueprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|op| op.symbol().eq_ignore_ascii_case(s))
            .ok_or_else(|| BlueprintError::Structural(format!("unknown operation: {}", s)))
    }
}

/// Left or right side of the operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Signal(SignalId),
    Constant(i32),
}

impl Operand {
    fn from_parts(signal: Option<SignalId>, constant: Option<i32>) -> Option<Self> {
        signal
            .map(Operand::Signal)
            .or(constant.map(Operand::Constant))
    }

    fn signal(&self) -> Option<Value> {
        match self {
            Operand::Signal(s) => Some(s.to_document()),
            Operand::Constant(_) => None,
        }
    }

    fn constant(&self) -> Option<i32> {
        match self {
            Operand::Signal(_) => None,
            Operand::Constant(c) => Some(*c),
        }
    }
}

#[derive(Deserialize, Default)]
struct RawArithmetic {
    #[serde(default)]
    arithmetic_conditions: RawArithmeticConditions,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Deserialize, Default)]
struct RawArithmeticConditions {
    #[serde(default)]
    first_signal: Option<SignalId>,
    #[serde(default)]
    first_signal_networks: Option<Networks>,
    #[serde(default)]
    first_constant: Option<i32>,
    #[serde(default)]
    second_signal: Option<SignalId>,
    #[serde(default)]
    second_signal_networks: Option<Networks>,
    #[serde(default)]
    second_constant: Option<i32>,
    #[serde(default)]
    operation: Option<ArithmeticOperation>,
    #[serde(default)]
    output_signal: Option<SignalId>,
}

/// Control behavior of an arithmetic combinator.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArithmeticBehavior {
    pub first: Option<Operand>,
    pub first_networks: Option<Networks>,
    pub second: Option<Operand>,
    pub second_networks: Option<Networks>,
    pub operation: Option<ArithmeticOperation>,
    pub output_signal: Option<SignalId>,
    /// Unrecognized `control_behavior` keys, re-emitted verbatim.
    pub extra: Map<String, Value>,
}

impl ArithmeticBehavior {
    /// Create an empty behavior.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `control_behavior` fragment.
    ///
    /// When both a signal and a constant are given for one side, the signal
    /// wins.
    pub fn from_document(fragment: &Value) -> BlueprintResult<Self> {
        let raw: RawArithmetic = serde_json::from_value(fragment.clone()).map_err(|e| {
            BlueprintError::Structural(format!("arithmetic combinator behavior: {}", e))
        })?;
        let c = raw.arithmetic_conditions;
        Ok(Self {
            first: Operand::from_parts(c.first_signal, c.first_constant),
            first_networks: c.first_signal_networks,
            second: Operand::from_parts(c.second_signal, c.second_constant),
            second_networks: c.second_signal_networks,
            operation: c.operation,
            output_signal: c.output_signal,
            extra: raw.extra,
        })
    }

    /// Flatten into a `control_behavior` fragment (`null` when empty).
    pub fn to_document(&self) -> Value {
        let mut inner = SparseMap::new(sparse::ARITHMETIC_CONDITIONS_FIELDS);
        inner
            .put_opt("first_signal", self.first.as_ref().and_then(Operand::signal))
            .put_opt(
                "first_signal_networks",
                self.first_networks.map(Networks::to_document),
            )
            .put_opt("first_constant", self.first.as_ref().and_then(Operand::constant))
            .put_opt("second_signal", self.second.as_ref().and_then(Operand::signal))
            .put_opt(
                "second_signal_networks",
                self.second_networks.map(Networks::to_document),
            )
            .put_opt("second_constant", self.second.as_ref().and_then(Operand::constant))
            .put_opt("operation", self.operation.map(ArithmeticOperation::symbol))
            .put_opt("output_signal", self.output_signal.as_ref().map(SignalId::to_document));

        let mut outer = SparseMap::new(sparse::ARITHMETIC_BEHAVIOR_FIELDS);
        outer
            .put("arithmetic_conditions", inner.finish())
            .put_extra(&self.extra);

        let doc = outer.finish();
        if sparse::is_falsy(&doc) {
            Value::Null
        } else {
            doc
        }
    }

    pub fn set_first_signal(&mut self, signal: SignalId) -> &mut Self {
        self.first = Some(Operand::Signal(signal));
        self
    }

    pub fn set_first_constant(&mut self, constant: i32) -> &mut Self {
        self.first = Some(Operand::Constant(constant));
        self
    }

    pub fn set_second_signal(&mut self, signal: SignalId) -> &mut Self {
        self.second = Some(Operand::Signal(signal));
        self
    }

    pub fn set_second_constant(&mut self, constant: i32) -> &mut Self {
        self.second = Some(Operand::Constant(constant));
        self
    }

    pub fn set_first_networks(&mut self, networks: Networks) -> &mut Self {
        self.first_networks = Some(networks);
        self
    }

    pub fn set_second_networks(&mut self, networks: Networks) -> &mut Self {
        self.second_networks = Some(networks);
        self
    }

    pub fn set_operation(&mut self, operation: ArithmeticOperation) -> &mut Self {
        self.operation = Some(operation);
        self
    }

    pub fn set_output_signal(&mut self, signal: SignalId) -> &mut Self {
        self.output_signal = Some(signal);
        self
    }
}
