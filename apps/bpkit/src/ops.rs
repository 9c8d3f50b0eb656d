//! # Shared Operations
//!
//! Blueprint operations used by both the CLI and the HTTP API.

use bpkit_core::{
    Blueprint, BlueprintError, BlueprintResult, ControlBehavior, Entity, Position, SignalCatalog,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum number of values accepted by one pack request.
///
/// One million values is 1000 sections in a single combinator.
pub const MAX_PACK_VALUES: usize = 1_000_000;

// =============================================================================
// INSPECT
// =============================================================================

/// Overview of a blueprint's contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlueprintSummary {
    pub label: Option<String>,
    pub description: Option<String>,
    pub version: Option<u64>,
    /// Icons as `type:name`, in index order.
    pub icons: Vec<String>,
    pub entity_count: usize,
    pub wire_count: usize,
    /// Entity count per entity name.
    pub entities: BTreeMap<String, usize>,
    /// Entity count per control-behavior kind.
    pub behaviors: BTreeMap<String, usize>,
    /// Filters held by all constant combinators.
    pub constant_filters: usize,
}

impl BlueprintSummary {
    /// Summarize a blueprint.
    pub fn of(bp: &Blueprint) -> Self {
        let mut entities = BTreeMap::new();
        let mut behaviors = BTreeMap::new();
        let mut constant_filters = 0;

        for entity in bp.entities() {
            *entities.entry(entity.name.clone()).or_insert(0) += 1;
            *behaviors
                .entry(entity.control_behavior.kind().to_string())
                .or_insert(0) += 1;
            if let ControlBehavior::Constant(c) = &entity.control_behavior {
                constant_filters += c.filter_count();
            }
        }

        Self {
            label: bp.label().map(str::to_string),
            description: bp.description().map(str::to_string),
            version: bp.version(),
            icons: bp.icons().iter().map(|i| i.signal.to_string()).collect(),
            entity_count: bp.entity_count(),
            wire_count: bp.wires().len(),
            entities,
            behaviors,
            constant_filters,
        }
    }
}

// =============================================================================
// PACK
// =============================================================================

/// Result of packing a value sequence.
#[derive(Debug, Clone)]
pub struct Packed {
    pub blueprint: Blueprint,
    pub filters: usize,
    pub sections: usize,
}

/// Build a blueprint holding one constant combinator with `values` packed
/// into it in order.
pub fn pack_values(
    catalog: &SignalCatalog,
    values: &[i32],
    label: Option<&str>,
) -> BlueprintResult<Packed> {
    if values.len() > MAX_PACK_VALUES {
        return Err(BlueprintError::Structural(format!(
            "{} values exceed the maximum of {}",
            values.len(),
            MAX_PACK_VALUES
        )));
    }

    let mut rom = Entity::constant_combinator(Position::default());
    let behavior = rom.constant_mut()?;
    for value in values {
        behavior.add_filter_auto(catalog, *value)?;
    }
    let filters = behavior.filter_count();
    let sections = behavior.sections().len();

    let mut blueprint = Blueprint::new();
    if let Some(label) = label.filter(|l| !l.is_empty()) {
        blueprint.set_label(label);
    }
    blueprint.add_entity(rom)?;

    Ok(Packed {
        blueprint,
        filters,
        sections,
    })
}

/// Parse whitespace- or comma-separated integers.
pub fn parse_values(text: &str) -> BlueprintResult<Vec<i32>> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(|t| {
            t.parse::<i32>()
                .map_err(|e| BlueprintError::Structural(format!("value {:?}: {}", t, e)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bpkit_core::{Direction, SignalId};

    fn catalog() -> SignalCatalog {
        SignalCatalog::from_signals((0..10).map(|i| SignalId::new(format!("signal-{i}"), "item")))
    }

    #[test]
    fn pack_counts_filters_and_sections() {
        let packed = pack_values(&catalog(), &[1, 2, 3], Some("rom")).expect("pack");
        assert_eq!(packed.filters, 3);
        assert_eq!(packed.sections, 1);
        assert_eq!(packed.blueprint.label(), Some("rom"));
        assert_eq!(packed.blueprint.entity_count(), 1);
    }

    #[test]
    fn pack_reports_missing_slot() {
        let values = vec![0; 51];
        assert!(matches!(
            pack_values(&catalog(), &values, None),
            Err(BlueprintError::CatalogLookup(10))
        ));
    }

    #[test]
    fn parse_values_accepts_mixed_separators() {
        assert_eq!(parse_values("1, 2\n-3\t4").expect("parse"), vec![1, 2, -3, 4]);
        assert!(parse_values("1 two").is_err());
        assert!(parse_values("").expect("parse").is_empty());
    }

    #[test]
    fn summary_counts_entities() {
        let mut packed = pack_values(&catalog(), &[5; 7], None).expect("pack").blueprint;
        packed
            .add_entity(Entity::new("small-lamp", Position::new(1.0, 0.0)))
            .expect("add");
        packed.rotate_all(Direction::East);
        packed
            .set_icon(1, SignalId::new("constant-combinator", "item"))
            .expect("icon");

        let summary = BlueprintSummary::of(&packed);
        assert_eq!(summary.entity_count, 2);
        assert_eq!(summary.constant_filters, 7);
        assert_eq!(summary.entities.get("small-lamp"), Some(&1));
        assert_eq!(summary.behaviors.get("constant"), Some(&1));
        assert_eq!(summary.behaviors.get("passive"), Some(&1));
        assert_eq!(summary.icons, vec!["item:constant-combinator".to_string()]);
    }
}
