//! # Constant Combinator
//!
//! A constant combinator outputs a fixed set of signals, organised in
//! sections of up to 1000 filters each.
//!
//! Besides plain upserts (`set_filter`), it supports bulk packing of a flat
//! value sequence (`add_filter_auto`). The packing counter belongs to the
//! combinator and advances only on a successful `add_filter_auto` call, so
//! calls are monotonic by construction. A decoded combinator resumes after
//! the filters it was decoded with:
//!
//! ```text
//! g        = packing counter (0-based, +1 per call)
//! section  = g / 1000 + 1
//! index    = g % 1000 + 1
//! slot     = g / 5          -> catalog signal
//! quality  = CYCLE[g % 5]   -> normal, uncommon, rare, epic, legendary
//! ```

use crate::catalog::SignalCatalog;
use crate::primitives::{FILTER_COMPARATOR, QUALITY_TIERS, SECTION_CAPACITY};
use crate::sparse::{self, SparseMap};
use crate::{BlueprintError, BlueprintResult, Quality, SignalId};
use serde::Deserialize;
use serde_json::{Map, Value};

// =============================================================================
// FILTER & SECTION
// =============================================================================

/// One signal slot of a section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Filter {
    /// 1-based position inside the owning section.
    pub index: u32,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub quality: Quality,
    #[serde(default = "default_comparator")]
    pub comparator: String,
    #[serde(default)]
    pub count: i32,
}

fn default_comparator() -> String {
    FILTER_COMPARATOR.to_string()
}

impl Filter {
    /// Create a filter for `signal` holding `count`.
    #[must_use]
    pub fn new(index: u32, signal: SignalId, count: i32, quality: Quality) -> Self {
        Self {
            index,
            name: signal.name,
            kind: signal.kind,
            quality,
            comparator: default_comparator(),
            count,
        }
    }

    /// The signal this filter outputs.
    #[must_use]
    pub fn signal(&self) -> SignalId {
        SignalId {
            name: self.name.clone(),
            kind: self.kind.clone(),
        }
    }

    fn to_document(&self) -> Value {
        let mut map = SparseMap::new(sparse::FILTER_FIELDS);
        map.put("index", Value::from(self.index))
            .put("name", Value::from(self.name.as_str()))
            .put_opt("type", self.kind.as_deref())
            .put("quality", Value::from(self.quality.as_str()))
            .put("comparator", Value::from(self.comparator.as_str()))
            .put("count", Value::from(self.count));
        map.finish()
    }
}

/// A numbered bank of filters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Section {
    /// 1-based section number.
    pub index: u32,
    #[serde(default)]
    pub filters: Vec<Filter>,
}

impl Section {
    /// Create an empty section.
    #[must_use]
    pub fn new(index: u32) -> Self {
        Self {
            index,
            filters: Vec::new(),
        }
    }

    fn to_document(&self) -> Value {
        let mut map = SparseMap::new(sparse::SECTION_FIELDS);
        map.put("index", Value::from(self.index)).put(
            "filters",
            Value::Array(self.filters.iter().map(Filter::to_document).collect()),
        );
        map.finish()
    }
}

// =============================================================================
// PACKING ARITHMETIC
// =============================================================================

/// Where the value with packing index `g` lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedSlot {
    /// 1-based section number.
    pub section_index: u32,
    /// 1-based filter index inside the section (`1..=1000`).
    pub local_index: u32,
    /// Catalog key of the signal.
    pub signal_slot: u32,
    /// Quality tier of the value.
    pub quality: Quality,
}

impl PackedSlot {
    /// Compute the slot for packing index `global`.
    #[must_use]
    pub const fn for_index(global: u32) -> Self {
        Self {
            section_index: global / SECTION_CAPACITY + 1,
            local_index: global % SECTION_CAPACITY + 1,
            signal_slot: global / QUALITY_TIERS,
            quality: Quality::CYCLE[(global % QUALITY_TIERS) as usize],
        }
    }
}

// =============================================================================
// CONSTANT BEHAVIOR
// =============================================================================

#[derive(Deserialize, Default)]
struct RawConstant {
    #[serde(default)]
    sections: RawSections,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Deserialize, Default)]
struct RawSections {
    #[serde(default)]
    sections: Vec<Section>,
}

/// Control behavior of a constant combinator.
///
/// Equality compares the emitted content (sections and extras), not the
/// packing counter, which is not part of the document.
#[derive(Debug, Clone, Default)]
pub struct ConstantBehavior {
    sections: Vec<Section>,
    packed: u32,
    /// Unrecognized `control_behavior` keys, re-emitted verbatim.
    pub extra: Map<String, Value>,
}

impl PartialEq for ConstantBehavior {
    fn eq(&self, other: &Self) -> bool {
        self.sections == other.sections && self.extra == other.extra
    }
}

impl ConstantBehavior {
    /// Create an empty behavior.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `control_behavior` fragment.
    ///
    /// The packing counter continues after the filters already present.
    pub fn from_document(fragment: &Value) -> BlueprintResult<Self> {
        let raw: RawConstant = serde_json::from_value(fragment.clone()).map_err(|e| {
            BlueprintError::Structural(format!("constant combinator behavior: {}", e))
        })?;
        let sections = raw.sections.sections;
        let filters: usize = sections.iter().map(|s| s.filters.len()).sum();
        Ok(Self {
            sections,
            packed: u32::try_from(filters).unwrap_or(u32::MAX),
            extra: raw.extra,
        })
    }

    /// Flatten into a `control_behavior` fragment (`null` when empty).
    pub fn to_document(&self) -> Value {
        let mut inner = SparseMap::new(sparse::CONSTANT_BEHAVIOR_FIELDS);
        inner.put(
            "sections",
            Value::Array(self.sections.iter().map(Section::to_document).collect()),
        );

        let mut outer = SparseMap::new(sparse::CONSTANT_BEHAVIOR_FIELDS);
        outer.put("sections", inner.finish()).put_extra(&self.extra);

        let doc = outer.finish();
        if sparse::is_falsy(&doc) {
            Value::Null
        } else {
            doc
        }
    }

    /// Sections in creation order.
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Section with the given number, if present.
    #[must_use]
    pub fn section(&self, index: u32) -> Option<&Section> {
        self.sections.iter().find(|s| s.index == index)
    }

    /// Total number of filters across all sections.
    #[must_use]
    pub fn filter_count(&self) -> usize {
        self.sections.iter().map(|s| s.filters.len()).sum()
    }

    /// Packing index the next `add_filter_auto` call will use.
    #[must_use]
    pub fn next_packed_index(&self) -> u32 {
        self.packed
    }

    /// Get or append the section numbered `index`.
    fn section_mut(&mut self, index: u32) -> &mut Section {
        let pos = match self.sections.iter().position(|s| s.index == index) {
            Some(pos) => pos,
            None => {
                self.sections.push(Section::new(index));
                self.sections.len() - 1
            }
        };
        &mut self.sections[pos]
    }

    /// Append a filter to section `section_index`, creating the section if
    /// needed.
    ///
    /// Filters are append-only: a second call with the same `filter_index`
    /// adds another entry instead of replacing the first. The packing counter
    /// is not touched.
    pub fn set_filter(
        &mut self,
        section_index: u32,
        filter_index: u32,
        signal: SignalId,
        count: i32,
        quality: Quality,
    ) {
        self.section_mut(section_index)
            .filters
            .push(Filter::new(filter_index, signal, count, quality));
    }

    /// Pack `count` into the next free slot, resolving the signal through
    /// `catalog`.
    ///
    /// On `CatalogLookup` failure the combinator is left untouched and the
    /// counter does not advance.
    pub fn add_filter_auto(
        &mut self,
        catalog: &SignalCatalog,
        count: i32,
    ) -> BlueprintResult<PackedSlot> {
        let global = self.packed;
        if global == u32::MAX {
            return Err(BlueprintError::Structural(
                "constant combinator packing counter exhausted".to_string(),
            ));
        }
        let slot = PackedSlot::for_index(global);
        let signal = catalog.lookup(slot.signal_slot)?.clone();

        self.section_mut(slot.section_index).filters.push(Filter::new(
            slot.local_index,
            signal,
            count,
            slot.quality,
        ));
        self.packed = global + 1;
        Ok(slot)
    }
}

// =============================================================================
// TESTS
// =============================================================================
