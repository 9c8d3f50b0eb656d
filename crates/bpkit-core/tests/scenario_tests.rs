//! # Scenario Tests
//!
//! End-to-end checks of the public API, grouped by layer.
//!
//! ## Groups
//! - S0: Exchange codec
//! - S1: Sparse emission
//! - S2: Constant combinator packing
//! - S3: Wiring
//! - S4: Full blueprint round trips

use bpkit_core::{
    ArithmeticOperation, Blueprint, BlueprintError, Comparator, DecodeStage, DeciderCondition,
    DeciderOutput, Direction, Entity, EntityNumber, Networks, Position, Quality, SignalCatalog,
    SignalId, WireColors, decode, encode,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::json;

fn catalog(slots: u32) -> SignalCatalog {
    SignalCatalog::from_signals((0..slots).map(|i| SignalId::new(format!("signal-{i}"), "item")))
}

// =============================================================================
// S0: EXCHANGE CODEC
// =============================================================================

mod s0_codec {
    use super::*;

    /// S0.1: A document survives encode -> decode.
    #[test]
    fn document_roundtrip() {
        let doc = json!({"blueprint": {
            "item": "blueprint",
            "label": "Ünïcode ✓",
            "entities": [{"entity_number": 1, "name": "pipe", "position": {"x": -3.5, "y": 7}}],
            "version": 281479275675648_u64
        }});
        let text = encode(&doc).expect("encode");
        assert!(text.starts_with('0'));
        assert_eq!(decode(&text).expect("decode"), doc);
    }

    /// S0.2: Corrupted compressed payload fails at the inflate stage.
    #[test]
    fn corrupted_payload_is_inflate_error() {
        let text = format!("0{}", STANDARD.encode(b"definitely not zlib"));
        let err = decode(&text).expect_err("corrupt");
        assert_eq!(err.decode_stage(), Some(DecodeStage::Inflate));
    }

    /// S0.3: Valid zlib around non-JSON fails at the JSON stage.
    #[test]
    fn non_json_payload_is_json_error() {
        use flate2::Compression;
        use flate2::write::ZlibEncoder;
        use std::io::Write;

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"{not json").expect("write");
        let compressed = encoder.finish().expect("finish");

        let text = format!("0{}", STANDARD.encode(compressed));
        let err = decode(&text).expect_err("not json");
        assert_eq!(err.decode_stage(), Some(DecodeStage::Json));
    }

    /// S0.4: Invalid Base64 fails at the first stage.
    #[test]
    fn bad_base64_is_base64_error() {
        let err = decode("0***").expect_err("bad base64");
        assert_eq!(err.decode_stage(), Some(DecodeStage::Base64));
    }

    /// S0.5: A valid document without a blueprint object is structural.
    #[test]
    fn missing_blueprint_is_structural() {
        let text = encode(&json!({"blueprint_book": {}})).expect("encode");
        assert!(matches!(
            Blueprint::from_exchange_string(&text),
            Err(BlueprintError::Structural(_))
        ));
    }
}

// =============================================================================
// S1: SPARSE EMISSION
// =============================================================================

mod s1_sparse {
    use super::*;

    /// S1.1: Absent fields are omitted; position is always present.
    #[test]
    fn passive_entity_keeps_only_position() {
        let mut bp = Blueprint::new();
        bp.add_entity(Entity::new("small-lamp", Position::default()))
            .expect("add");

        let doc = bp.to_document().expect("emit");
        let entity = &doc["blueprint"]["entities"][0];
        assert_eq!(entity["position"], json!({"x": 0, "y": 0}));
        for key in ["direction", "type", "control_behavior"] {
            assert!(entity.get(key).is_none(), "{key} should be omitted");
        }
    }

    /// S1.2: Fresh combinators emit no control behavior.
    #[test]
    fn empty_combinators_emit_no_behavior() {
        let mut bp = Blueprint::new();
        bp.add_entity(Entity::constant_combinator(Position::default()))
            .expect("add");
        bp.add_entity(Entity::decider_combinator(Position::new(1.0, 0.0)))
            .expect("add");
        bp.add_entity(Entity::arithmetic_combinator(Position::new(2.0, 0.0)))
            .expect("add");

        let doc = bp.to_document().expect("emit");
        for entity in doc["blueprint"]["entities"].as_array().expect("entities") {
            assert!(entity.get("control_behavior").is_none());
        }
    }

    /// S1.3: Zero counts and disabled networks are still written.
    #[test]
    fn meaningful_zeros_survive() {
        let mut rom = Entity::constant_combinator(Position::default());
        rom.constant_mut().expect("constant").set_filter(
            1,
            1,
            SignalId::virtual_signal("signal-A"),
            0,
            Quality::Normal,
        );
        let doc = rom.to_document().expect("emit");
        let filter = &doc["control_behavior"]["sections"]["sections"][0]["filters"][0];
        assert_eq!(filter["count"], json!(0));

        let mut decider = Entity::decider_combinator(Position::default());
        decider.decider_mut().expect("decider").add_condition(
            DeciderCondition::signal_vs_constant(SignalId::virtual_signal("signal-A"), Comparator::Greater, 0)
                .with_first_networks(Networks::RED),
        );
        let doc = decider.to_document().expect("emit");
        let condition = &doc["control_behavior"]["decider_conditions"]["conditions"][0];
        assert_eq!(condition["first_signal_networks"], json!({"red": true, "green": false}));
    }
}

// =============================================================================
// S2: CONSTANT COMBINATOR PACKING
// =============================================================================

mod s2_packing {
    use super::*;

    /// S2.1: Twelve packed values stay in one section, cycling quality.
    #[test]
    fn twelve_values_fill_one_section() {
        let catalog = catalog(3);
        let mut rom = Entity::constant_combinator(Position::default());
        let behavior = rom.constant_mut().expect("constant");
        for v in 0..12 {
            behavior.add_filter_auto(&catalog, v).expect("pack");
        }

        assert_eq!(behavior.sections().len(), 1);
        let filters = &behavior.sections()[0].filters;
        assert_eq!(filters.len(), 12);
        assert_eq!(filters[4].quality, Quality::Legendary);
        assert_eq!(filters[5].quality, Quality::Normal);
        assert_eq!(filters[5].name, "signal-1");
        assert_eq!(filters[11].name, "signal-2");
        assert_eq!(filters[11].index, 12);
    }

    /// S2.2: Packing continues after the filters of a decoded combinator.
    #[test]
    fn packing_continues_after_decode() {
        let catalog = catalog(400);
        let mut bp = Blueprint::new();
        let mut rom = Entity::constant_combinator(Position::default());
        for v in 0..1003 {
            rom.constant_mut()
                .expect("constant")
                .add_filter_auto(&catalog, v)
                .expect("pack");
        }
        let n = bp.add_entity(rom).expect("add");

        let text = bp.to_exchange_string().expect("encode");
        let mut decoded = Blueprint::from_exchange_string(&text).expect("decode");
        let behavior = decoded
            .entity_mut(n)
            .expect("entity")
            .constant_mut()
            .expect("constant");
        assert_eq!(behavior.next_packed_index(), 1003);

        let slot = behavior.add_filter_auto(&catalog, 7).expect("pack");
        assert_eq!((slot.section_index, slot.local_index), (2, 4));
        assert_eq!(behavior.sections().len(), 2);
        assert_eq!(behavior.section(2).expect("section 2").filters.len(), 4);
    }

    /// S2.3: A lookup failure leaves the combinator untouched.
    #[test]
    fn lookup_failure_does_not_mutate() {
        let catalog = catalog(1);
        let mut rom = Entity::constant_combinator(Position::default());
        let behavior = rom.constant_mut().expect("constant");
        for v in 0..5 {
            behavior.add_filter_auto(&catalog, v).expect("pack");
        }
        let before = behavior.clone();

        assert!(matches!(
            behavior.add_filter_auto(&catalog, 99),
            Err(BlueprintError::CatalogLookup(1))
        ));
        assert_eq!(*behavior, before);
        assert_eq!(behavior.next_packed_index(), 5);
    }

    /// S2.4: Plain filters do not move the packing counter.
    #[test]
    fn set_filter_then_pack_starts_at_first_slot() {
        let catalog = catalog(2);
        let mut rom = Entity::constant_combinator(Position::default());
        let behavior = rom.constant_mut().expect("constant");
        behavior.set_filter(1, 1, SignalId::new("iron-plate", "item"), 100, Quality::Normal);

        let slot = behavior.add_filter_auto(&catalog, 7).expect("pack");
        assert_eq!(slot.section_index, 1);
        assert_eq!(slot.local_index, 1);
        assert_eq!(slot.signal_slot, 0);
        assert_eq!(slot.quality, Quality::Normal);

        let filters = &behavior.section(1).expect("section 1").filters;
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[1].name, "signal-0");
        assert_eq!(filters[1].count, 7);
    }

    /// S2.5: Thousands of packed filters survive the exchange string.
    #[test]
    fn large_packed_blueprint_roundtrip() {
        let catalog = catalog(1200);
        let mut bp = Blueprint::new();
        let mut rom = Entity::constant_combinator(Position::default());
        let behavior = rom.constant_mut().expect("constant");
        for v in 0..6000 {
            behavior.add_filter_auto(&catalog, v * 31 - 9000).expect("pack");
        }
        bp.add_entity(rom).expect("add");

        let text = bp.to_exchange_string().expect("encode");
        let decoded = Blueprint::from_exchange_string(&text).expect("decode");
        assert_eq!(decoded, bp);

        let behavior = decoded.entities()[0].constant().expect("constant");
        assert_eq!(behavior.sections().len(), 6);
        assert_eq!(behavior.filter_count(), 6000);
        assert_eq!(behavior.next_packed_index(), 6000);
    }
}

// =============================================================================
// S3: WIRING
// =============================================================================

mod s3_wiring {
    use super::*;

    /// S3.1: Input-to-output on both colors yields red then green.
    #[test]
    fn io_rg_yields_two_wires() {
        let mut bp = Blueprint::new();
        let a = bp
            .add_entity(Entity::decider_combinator(Position::default()))
            .expect("add");
        let b = bp
            .add_entity(Entity::decider_combinator(Position::new(1.0, 0.0)))
            .expect("add");
        let first = bp.entity(a).expect("a").clone();
        let second = bp.entity(b).expect("b").clone();

        bp.connect_entities(&first, &second, "io".parse().expect("code"), "rg".parse().expect("colors"))
            .expect("connect");

        let doc = bp.to_document().expect("emit");
        assert_eq!(doc["blueprint"]["wires"], json!([[1, 1, 2, 3], [1, 2, 2, 4]]));
    }

    /// S3.2: Unnumbered endpoints are an error, never entity 0.
    #[test]
    fn unnumbered_endpoint_is_rejected() {
        let mut bp = Blueprint::new();
        let a = bp
            .add_entity(Entity::decider_combinator(Position::default()))
            .expect("add");
        let first = bp.entity(a).expect("a").clone();
        let loose = Entity::decider_combinator(Position::new(3.0, 0.0));

        let result = bp.connect_entities(&first, &loose, "oo".parse().expect("code"), WireColors::GREEN);
        assert!(matches!(result, Err(BlueprintError::UnassignedEntity)));
        assert!(bp.wires().is_empty());
    }

    /// S3.3: Wires to entities outside the blueprint are rejected.
    #[test]
    fn foreign_entity_is_rejected() {
        let mut bp = Blueprint::new();
        let a = bp
            .add_entity(Entity::decider_combinator(Position::default()))
            .expect("add");
        let result = bp.connect(a, EntityNumber(40), "ii".parse().expect("code"), WireColors::RED);
        assert!(matches!(result, Err(BlueprintError::UnknownEntity(EntityNumber(40)))));
    }
}

// =============================================================================
// S4: FULL BLUEPRINT ROUND TRIPS
// =============================================================================

mod s4_blueprint {
    use super::*;

    /// S4.1: A single filter survives serialize -> decode.
    #[test]
    fn single_filter_end_to_end() {
        let mut bp = Blueprint::new();
        let mut rom = Entity::constant_combinator(Position::default());
        rom.constant_mut().expect("constant").set_filter(
            1,
            1,
            SignalId::new("iron-plate", "item"),
            100,
            Quality::Normal,
        );
        bp.add_entity(rom).expect("add");

        let text = bp.to_exchange_string().expect("encode");
        let doc = decode(&text).expect("decode");
        let filters = &doc["blueprint"]["entities"][0]["control_behavior"]["sections"]["sections"][0]["filters"];
        assert_eq!(filters.as_array().map(Vec::len), Some(1));
        assert_eq!(filters[0]["count"], json!(100));
        assert_eq!(filters[0]["quality"], json!("normal"));
        assert_eq!(filters[0]["name"], json!("iron-plate"));
    }

    /// S4.2: Every combinator kind keeps its typed payload.
    #[test]
    fn combinator_circuit_roundtrip() {
        let mut bp = Blueprint::new();
        bp.set_label("counter");
        bp.set_icon(1, SignalId::new("decider-combinator", "item"))
            .expect("icon");

        let mut rom = Entity::constant_combinator(Position::new(0.5, 0.0));
        rom.constant_mut().expect("constant").set_filter(
            1,
            1,
            SignalId::virtual_signal("signal-A"),
            1,
            Quality::Normal,
        );
        let rom = bp.add_entity(rom).expect("add");

        let mut decider = Entity::decider_combinator(Position::new(1.5, 0.5));
        decider.rotate_to(Direction::East);
        decider
            .decider_mut()
            .expect("decider")
            .add_condition(DeciderCondition::signal_vs_constant(
                SignalId::virtual_signal("signal-A"),
                Comparator::LessOrEqual,
                60,
            ))
            .add_output(DeciderOutput::copy(SignalId::virtual_signal("signal-A")));
        let decider = bp.add_entity(decider).expect("add");

        let mut arith = Entity::arithmetic_combinator(Position::new(2.5, 0.5));
        arith
            .arithmetic_mut()
            .expect("arithmetic")
            .set_first_signal(SignalId::virtual_signal("signal-A"))
            .set_second_constant(2)
            .set_operation(ArithmeticOperation::Multiply)
            .set_output_signal(SignalId::virtual_signal("signal-B"));
        let arith = bp.add_entity(arith).expect("add");

        bp.connect(rom, decider, "oi".parse().expect("code"), WireColors::RED)
            .expect("connect");
        bp.connect(decider, decider, "oi".parse().expect("code"), WireColors::GREEN)
            .expect("connect");
        bp.connect(decider, arith, "oi".parse().expect("code"), WireColors::BOTH)
            .expect("connect");

        let text = bp.to_exchange_string().expect("encode");
        let decoded = Blueprint::from_exchange_string(&text).expect("decode");
        assert_eq!(decoded, bp);
        assert_eq!(decoded.wires().len(), 4);
        assert_eq!(
            decoded.entity(decider).and_then(|e| e.direction),
            Some(Direction::East)
        );
    }

    /// S4.3: Documents written by the game keep unknown fields.
    #[test]
    fn game_document_roundtrip() {
        let doc = json!({"blueprint": {
            "icons": [{"signal": {"name": "constant-combinator"}, "index": 1}],
            "entities": [
                {
                    "entity_number": 1,
                    "name": "constant-combinator",
                    "position": {"x": 0.5, "y": 0.5},
                    "control_behavior": {
                        "sections": {"sections": [{"index": 1, "filters": [
                            {"index": 1, "type": "item", "name": "iron-plate", "quality": "normal", "comparator": "=", "count": 20}
                        ]}]},
                        "is_on": false
                    },
                    "player_description": "rom"
                },
                {
                    "entity_number": 2,
                    "name": "medium-electric-pole",
                    "position": {"x": 1.5, "y": 0.5}
                }
            ],
            "wires": [[1, 1, 2, 1]],
            "item": "blueprint",
            "version": 562949954076673_u64
        }});
        let text = encode(&doc).expect("encode");
        let bp = Blueprint::from_exchange_string(&text).expect("decode");
        assert_eq!(bp.to_document().expect("emit"), doc);
    }

    /// S4.4: Entity number 0 is never accepted into a blueprint.
    #[test]
    fn zero_entity_number_is_rejected() {
        let mut bp = Blueprint::new();
        let err = bp
            .add_entity(Entity::new("pipe", Position::default()).with_number(EntityNumber(0)))
            .expect_err("0 is not a valid number");
        assert!(matches!(err, BlueprintError::Structural(_)));
        assert_eq!(bp.entity_count(), 0);

        let n = bp
            .add_entity(Entity::new("pipe", Position::default()))
            .expect("add");
        assert_eq!(n, EntityNumber(1));
        assert!(matches!(
            bp.connect(EntityNumber(0), n, "oi".parse().expect("code"), WireColors::RED),
            Err(BlueprintError::UnknownEntity(EntityNumber(0)))
        ));
    }

    /// S4.5: Edits through the aggregate keep numbers and wires decodable.
    #[test]
    fn edits_in_place_keep_numbering() {
        let mut bp = Blueprint::new();
        let a = bp
            .add_entity(Entity::decider_combinator(Position::default()))
            .expect("add");
        let b = bp
            .add_entity(Entity::new("small-lamp", Position::new(1.0, 0.0)).with_number(EntityNumber(5)))
            .expect("add");
        bp.connect(a, b, "oi".parse().expect("code"), WireColors::GREEN)
            .expect("connect");

        for entity in bp.entities_mut() {
            entity.rotate_to(Direction::East);
        }
        let lamp = bp.entity_mut(b).expect("entity");
        lamp.rotate_to(Direction::South);
        assert_eq!(lamp.entity_number(), Some(b));

        let text = bp.to_exchange_string().expect("encode");
        let decoded = Blueprint::from_exchange_string(&text).expect("decode");
        let numbers: Vec<_> = decoded.entities().iter().map(|e| e.entity_number()).collect();
        assert_eq!(numbers, vec![Some(a), Some(EntityNumber(5))]);
        assert_eq!(decoded.wires(), bp.wires());
    }
}
