//! # Property-Based Tests
//!
//! Codec and model invariants checked with proptest.

use bpkit_core::{
    Blueprint, Direction, Entity, EntityNumber, PackedSlot, Position, Quality, SignalCatalog,
    SignalId, WireColors, decode, encode,
};
use proptest::collection::{btree_map, vec};
use proptest::prelude::*;
use serde_json::{Map, Value};

/// JSON values without floats, so structural equality is exact.
fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        ".{0,12}".prop_map(Value::from),
    ];
    leaf.prop_recursive(4, 64, 6, |inner| {
        prop_oneof![
            vec(inner.clone(), 0..6).prop_map(Value::from),
            btree_map("[a-z_]{1,8}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect::<Map<String, Value>>())),
        ]
    })
}

fn direction() -> impl Strategy<Value = Direction> {
    (0usize..8).prop_map(|i| Direction::ALL[i])
}

/// Entity shape: name, half-tile position, optional direction.
fn entity_shape() -> impl Strategy<Value = (String, i32, i32, Option<Direction>)> {
    (
        prop_oneof![
            Just("small-lamp".to_string()),
            Just("inserter".to_string()),
            Just("decider-combinator".to_string()),
            "[a-z]{3,10}(-[a-z]{2,6})?",
        ],
        -2000i32..2000,
        -2000i32..2000,
        proptest::option::of(direction()),
    )
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Any document survives encode -> decode.
    #[test]
    fn codec_roundtrip(value in json_value()) {
        let text = encode(&value).expect("encode");
        prop_assert!(text.starts_with('0'));
        prop_assert_eq!(decode(&text).expect("decode"), value);
    }

    /// Surrounding whitespace never changes the decoded document.
    #[test]
    fn codec_ignores_surrounding_whitespace(value in json_value(), pad in "[ \t\r\n]{0,4}") {
        let text = format!("{pad}{}{pad}", encode(&value).expect("encode"));
        prop_assert_eq!(decode(&text).expect("decode"), value);
    }

    /// Packing coordinates always reconstruct the packing index.
    #[test]
    fn packed_slot_is_consistent(g in 0u32..u32::MAX) {
        let slot = PackedSlot::for_index(g);
        prop_assert!((1..=1000).contains(&slot.local_index));
        prop_assert_eq!((slot.section_index - 1) * 1000 + slot.local_index - 1, g);
        prop_assert_eq!(slot.signal_slot, g / 5);
        prop_assert_eq!(slot.quality, Quality::CYCLE[(g % 5) as usize]);
    }

    /// Packed values land in order, one section per thousand.
    #[test]
    fn packing_fills_sections_in_order(values in vec(any::<i32>(), 0..2500)) {
        let catalog = SignalCatalog::from_signals(
            (0..500).map(|i| SignalId::new(format!("signal-{i}"), "item")),
        );
        let mut rom = Entity::constant_combinator(Position::default());
        let behavior = rom.constant_mut().expect("constant");
        for v in &values {
            behavior.add_filter_auto(&catalog, *v).expect("pack");
        }

        prop_assert_eq!(behavior.filter_count(), values.len());
        prop_assert_eq!(behavior.sections().len(), values.len().div_ceil(1000));
        let flat: Vec<i32> = behavior
            .sections()
            .iter()
            .flat_map(|s| s.filters.iter().map(|f| f.count))
            .collect();
        prop_assert_eq!(flat, values);
    }

    /// Color strings select red iff they contain `r`, green iff `g`.
    #[test]
    fn wire_colors_parse(s in "[rg]{0,8}") {
        let colors: WireColors = s.parse().expect("colors");
        prop_assert_eq!(colors.red, s.contains('r'));
        prop_assert_eq!(colors.green, s.contains('g'));
    }

    /// Any other character is rejected.
    #[test]
    fn wire_colors_reject_foreign_chars(prefix in "[rg]{0,3}", bad in "[^rg]") {
        let text = format!("{prefix}{bad}");
        prop_assert!(text.parse::<WireColors>().is_err());
    }

    /// A blueprint built through the API survives the exchange string.
    #[test]
    fn blueprint_roundtrip(
        shapes in vec(entity_shape(), 1..20),
        links in vec((0usize..20, 0usize..20, 0usize..4), 0..10),
        label in proptest::option::of("[A-Za-z0-9 ]{1,20}"),
    ) {
        let mut bp = Blueprint::new();
        if let Some(label) = &label {
            bp.set_label(label.clone());
        }
        let mut numbers = Vec::new();
        for (name, x, y, dir) in &shapes {
            let mut entity = Entity::new(name.clone(), Position::new(f64::from(*x) / 2.0, f64::from(*y) / 2.0));
            if let Some(d) = dir {
                entity.rotate_to(*d);
            }
            numbers.push(bp.add_entity(entity).expect("add"));
        }
        for (a, b, code) in &links {
            let a = numbers[a % numbers.len()];
            let b = numbers[b % numbers.len()];
            let code = ["ii", "io", "oi", "oo"][*code].parse().expect("code");
            bp.connect(a, b, code, WireColors::BOTH).expect("connect");
        }

        let text = bp.to_exchange_string().expect("encode");
        let decoded = Blueprint::from_exchange_string(&text).expect("decode");

        // North is the default orientation and is not written.
        let mut expected = bp.clone();
        for entity in expected.entities_mut() {
            if entity.direction == Some(Direction::North) {
                entity.direction = None;
            }
        }
        prop_assert_eq!(decoded, expected);
    }

    /// Auto numbering on a fresh blueprint is 1..=n.
    #[test]
    fn auto_numbering_is_sequential(n in 1usize..50) {
        let mut bp = Blueprint::new();
        for i in 0..n {
            let number = bp.add_entity(Entity::new("pipe", Position::default())).expect("add");
            prop_assert_eq!(number, EntityNumber(u32::try_from(i + 1).expect("fits")));
        }
        prop_assert_eq!(bp.entity_count(), n);
    }
}
