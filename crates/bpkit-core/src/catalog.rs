//! # Signal Catalog
//!
//! Read-only table mapping a packing slot to the signal that stores values
//! for that slot. The table itself is external data supplied by the embedding
//! application; this module only loads and queries it.
//!
//! JSON form: an object keyed by decimal strings.
//!
//! ```json
//! {"0": {"name": "wooden-chest", "type": "item"}, "1": {"name": "signal-A", "type": "virtual"}}
//! ```

use crate::{BlueprintError, BlueprintResult, SignalId};
use serde_json::Value;
use std::collections::BTreeMap;

/// Slot-indexed signal table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalCatalog {
    signals: BTreeMap<u32, SignalId>,
}

impl SignalCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from signals in slot order, starting at slot 0.
    #[must_use]
    pub fn from_signals(signals: impl IntoIterator<Item = SignalId>) -> Self {
        Self {
            signals: (0u32..).zip(signals).collect(),
        }
    }

    /// Parse the JSON form.
    ///
    /// Keys must be decimal slot numbers and every entry needs a `name`.
    pub fn from_document(document: &Value) -> BlueprintResult<Self> {
        let object = document.as_object().ok_or_else(|| {
            BlueprintError::Structural("catalog must be a JSON object".to_string())
        })?;

        let mut signals = BTreeMap::new();
        for (key, entry) in object {
            let slot: u32 = key.trim().parse().map_err(|_| {
                BlueprintError::Structural(format!("catalog key {:?} is not a slot number", key))
            })?;
            let signal: SignalId = serde_json::from_value(entry.clone()).map_err(|e| {
                BlueprintError::Structural(format!("catalog slot {}: {}", slot, e))
            })?;
            signals.insert(slot, signal);
        }

        Ok(Self { signals })
    }

    /// Parse the JSON form from text.
    pub fn from_json_str(text: &str) -> BlueprintResult<Self> {
        let document: Value = serde_json::from_str(text)
            .map_err(|e| BlueprintError::Structural(format!("catalog is not JSON: {}", e)))?;
        Self::from_document(&document)
    }

    /// Set the signal for a slot, returning the one it replaced.
    pub fn insert(&mut self, slot: u32, signal: SignalId) -> Option<SignalId> {
        self.signals.insert(slot, signal)
    }

    /// Look up a slot.
    pub fn lookup(&self, slot: u32) -> BlueprintResult<&SignalId> {
        self.signals
            .get(&slot)
            .ok_or(BlueprintError::CatalogLookup(slot))
    }

    /// Number of slots defined.
    #[must_use]
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    /// Whether the catalog defines no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    /// Number of values that can be packed before the first missing slot.
    ///
    /// Each slot holds one value per quality tier.
    #[must_use]
    pub fn packing_capacity(&self) -> u64 {
        let contiguous = (0u32..)
            .take_while(|slot| self.signals.contains_key(slot))
            .count() as u64;
        contiguous * u64::from(crate::primitives::QUALITY_TIERS)
    }
}
