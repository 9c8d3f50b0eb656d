//! # Blueprint Aggregate
//!
//! A blueprint owns its entities, icons and wires plus a little metadata.
//!
//! ## Invariants
//!
//! - Entity numbers are unique within one blueprint
//! - Every entity number referenced by a wire belongs to an entity of the
//!   same blueprint
//! - Icons are numbered 1 to 4
//!
//! Entities are only ever appended. There is no deletion.

use crate::formats;
use crate::primitives::{BLUEPRINT_ITEM, BLUEPRINT_KEY, MAX_ICONS};
use crate::sparse::{self, SparseMap};
use crate::wiring::{self, ConnectCode, Wire, WireColors};
use crate::{BlueprintError, BlueprintResult, Direction, Document, Entity, EntityNumber, SignalId};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// One of the up to four signals shown as the blueprint's icon.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Icon {
    pub index: u8,
    pub signal: SignalId,
}

impl Icon {
    fn to_document(&self) -> Value {
        let mut map = SparseMap::new(sparse::ICON_FIELDS);
        map.put("signal", self.signal.to_document())
            .put("index", Value::from(self.index));
        map.finish()
    }
}

#[derive(Deserialize)]
struct RawBlueprint {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    version: Option<u64>,
    #[serde(default)]
    icons: Vec<Icon>,
    #[serde(default)]
    entities: Vec<Value>,
    #[serde(default)]
    wires: Vec<Wire>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// A blueprint: the unit encoded in one exchange string.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Blueprint {
    label: Option<String>,
    description: Option<String>,
    version: Option<u64>,
    icons: Vec<Icon>,
    entities: Vec<Entity>,
    wires: Vec<Wire>,
    extra: Map<String, Value>,
}

impl Blueprint {
    /// Create an empty blueprint.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // DOCUMENT CONVERSION
    // =========================================================================

    /// Build a blueprint from a decoded document.
    ///
    /// The root must be an object holding a `blueprint` object. Duplicate
    /// entity numbers and wires to unknown entities are rejected.
    pub fn from_document(document: &Document) -> BlueprintResult<Self> {
        let inner = document
            .get(BLUEPRINT_KEY)
            .filter(|v| v.is_object())
            .ok_or_else(|| {
                BlueprintError::Structural(format!("missing \"{}\" object", BLUEPRINT_KEY))
            })?;
        let mut raw: RawBlueprint = serde_json::from_value(inner.clone())
            .map_err(|e| BlueprintError::Structural(format!("blueprint: {}", e)))?;
        // The discriminator is regenerated on output.
        raw.extra.remove("item");

        let mut seen = BTreeSet::new();
        let mut entities = Vec::with_capacity(raw.entities.len());
        for fragment in &raw.entities {
            let entity = Entity::from_document(fragment)?;
            if let Some(number) = entity.entity_number {
                if !seen.insert(number) {
                    return Err(BlueprintError::Structural(format!(
                        "entity number {} appears twice",
                        number
                    )));
                }
            }
            entities.push(entity);
        }

        for wire in &raw.wires {
            for number in [wire.a, wire.b] {
                if !seen.contains(&number) {
                    return Err(BlueprintError::Structural(format!(
                        "wire references unknown entity {}",
                        number
                    )));
                }
            }
        }

        Ok(Self {
            label: raw.label,
            description: raw.description,
            version: raw.version,
            icons: raw.icons,
            entities,
            wires: raw.wires,
            extra: raw.extra,
        })
    }

    /// Flatten into a document `{"blueprint": {...}}`.
    pub fn to_document(&self) -> BlueprintResult<Document> {
        let entities = self
            .entities
            .iter()
            .map(Entity::to_document)
            .collect::<BlueprintResult<Vec<_>>>()?;
        let icons: Vec<Value> = self.icons.iter().map(Icon::to_document).collect();
        let wires = serde_json::to_value(&self.wires)
            .map_err(|e| BlueprintError::Encode(e.to_string()))?;

        let mut inner = SparseMap::new(sparse::BLUEPRINT_FIELDS);
        inner
            .put("item", Value::from(BLUEPRINT_ITEM))
            .put_opt("label", self.label.as_deref())
            .put_opt("description", self.description.as_deref())
            .put("icons", Value::from(icons))
            .put("entities", Value::from(entities))
            .put("wires", wires)
            .put_opt("version", self.version)
            .put_extra(&self.extra);

        let mut root = Map::new();
        root.insert(BLUEPRINT_KEY.to_string(), inner.finish());
        Ok(Value::Object(root))
    }

    /// Decode an exchange string into a blueprint.
    pub fn from_exchange_string(exchange: &str) -> BlueprintResult<Self> {
        Self::from_document(&formats::decode(exchange)?)
    }

    /// Encode this blueprint as an exchange string.
    pub fn to_exchange_string(&self) -> BlueprintResult<String> {
        formats::encode(&self.to_document()?)
    }

    // =========================================================================
    // ENTITIES
    // =========================================================================

    /// Append an entity and return its number.
    ///
    /// An entity without a number gets `entity_count() + 1`. Numbers are
    /// positive: an explicit 0 is `Structural`.
    pub fn add_entity(&mut self, mut entity: Entity) -> BlueprintResult<EntityNumber> {
        let number = match entity.entity_number {
            Some(EntityNumber(0)) => {
                return Err(BlueprintError::Structural(
                    "entity number must be positive".to_string(),
                ));
            }
            Some(n) => n,
            None => {
                let next = u32::try_from(self.entities.len() + 1).map_err(|_| {
                    BlueprintError::Structural("too many entities".to_string())
                })?;
                EntityNumber(next)
            }
        };
        if self.contains(number) {
            return Err(BlueprintError::DuplicateEntityNumber(number));
        }
        entity.entity_number = Some(number);
        self.entities.push(entity);
        Ok(number)
    }

    fn contains(&self, number: EntityNumber) -> bool {
        self.entities
            .iter()
            .any(|e| e.entity_number == Some(number))
    }

    /// Entity with the given number.
    #[must_use]
    pub fn entity(&self, number: EntityNumber) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|e| e.entity_number == Some(number))
    }

    /// Mutable entity with the given number.
    pub fn entity_mut(&mut self, number: EntityNumber) -> Option<&mut Entity> {
        self.entities
            .iter_mut()
            .find(|e| e.entity_number == Some(number))
    }

    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Point every entity in one direction.
    pub fn rotate_all(&mut self, direction: Direction) {
        for entity in &mut self.entities {
            entity.rotate_to(direction);
        }
    }

    // =========================================================================
    // WIRES
    // =========================================================================

    /// Wire two entities of this blueprint together.
    ///
    /// Returns the number of wires added (one per color).
    pub fn connect_entities(
        &mut self,
        a: &Entity,
        b: &Entity,
        code: ConnectCode,
        colors: WireColors,
    ) -> BlueprintResult<usize> {
        let wires = wiring::resolve(a, b, code, colors)?;
        self.push_wires(wires)
    }

    /// Wire two entities of this blueprint together by number.
    pub fn connect(
        &mut self,
        a: EntityNumber,
        b: EntityNumber,
        code: ConnectCode,
        colors: WireColors,
    ) -> BlueprintResult<usize> {
        self.push_wires(wiring::wires_between(a, b, code, colors))
    }

    fn push_wires(&mut self, wires: Vec<Wire>) -> BlueprintResult<usize> {
        if let Some(missing) = wires
            .iter()
            .flat_map(|w| [w.a, w.b])
            .find(|n| !self.contains(*n))
        {
            return Err(BlueprintError::UnknownEntity(missing));
        }
        let added = wires.len();
        self.wires.extend(wires);
        Ok(added)
    }

    #[must_use]
    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    // =========================================================================
    // ICONS AND METADATA
    // =========================================================================

    /// Set icon `index` (1 to 4), replacing any icon already there.
    pub fn set_icon(&mut self, index: u8, signal: SignalId) -> BlueprintResult<()> {
        if !(1..=MAX_ICONS).contains(&index) {
            return Err(BlueprintError::IconIndexOutOfRange(index));
        }
        match self.icons.iter_mut().find(|i| i.index == index) {
            Some(icon) => icon.signal = signal,
            None => {
                self.icons.push(Icon { index, signal });
                self.icons.sort_by_key(|i| i.index);
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn icons(&self) -> &[Icon] {
        &self.icons
    }

    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = Some(label.into());
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    /// Game version the blueprint was saved with.
    #[must_use]
    pub fn version(&self) -> Option<u64> {
        self.version
    }

    pub fn set_version(&mut self, version: u64) {
        self.version = Some(version);
    }
}

// =============================================================================
// TESTS
// =============================================================================
