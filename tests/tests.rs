// ../tests/tests.rs
use serde_json::json;
use std::fs;
use tormenta_sheet::catalog::{self, SkillFilter, TrainingFilter};
use tormenta_sheet::character::*;
use tormenta_sheet::dice::{self, Die};
use tormenta_sheet::stats::{
    defense_total, is_trained, skill_total, total_level, training_bonus,
};
use tormenta_sheet::utils::*;
use tormenta_sheet::*;

fn legacy_record() -> CharacterRecord {
    let json_str =
        fs::read_to_string("tests/legacy_sheet.json").expect("Failed to read legacy sheet fixture");
    let value: serde_json::Value = serde_json::from_str(&json_str).expect("Failed to parse JSON");
    CharacterRecord::from_value(value["character"].clone())
}

fn armor(category: ArmorCategory, ca: i64, penalty: i64, equipped: bool) -> Armor {
    Armor {
        category,
        ca,
        penalty,
        equipped,
        ..Armor::default()
    }
}

#[test]
fn test_modifier_spot_values() {
    assert_eq!(modifier(10), 0);
    assert_eq!(modifier(11), 0);
    assert_eq!(modifier(8), -1);
    assert_eq!(modifier(9), -1);
    assert_eq!(modifier(20), 5);
    assert_eq!(modifier(1), -5);
    assert_eq!(modifier(-3), -7);
    for score in -20..40 {
        assert_eq!(modifier(score), ((score - 10) as f64 / 2.0).floor() as i64);
    }
}

#[test]
fn test_training_tiers() {
    for level in 1..=6 {
        assert_eq!(training_bonus(level, true), 2);
    }
    for level in 7..=14 {
        assert_eq!(training_bonus(level, true), 4);
    }
    for level in [15, 16, 20, 30] {
        assert_eq!(training_bonus(level, true), 6);
    }
    for level in [1, 7, 15] {
        assert_eq!(training_bonus(level, false), 0);
    }
}

#[test]
fn test_is_trained_flags() {
    assert!(is_trained(&json!(true)));
    assert!(is_trained(&json!("treinada")));
    assert!(!is_trained(&json!("destreinado")));
    assert!(!is_trained(&json!("")));
    assert!(!is_trained(&json!(false)));
    assert!(!is_trained(&serde_json::Value::Null));
}

#[test]
fn test_skill_total_composition() {
    let info = catalog::find("Acrobacia").expect("Acrobacia is in the catalog");
    assert!(info.armor_penalty);

    let mut attributes = AttributeSet::default();
    attributes.set(Attribute::Dexterity, 14);
    let entry = SkillEntry {
        trained: true,
        others: 1,
        extra: 0,
        attribute: None,
    };

    assert_eq!(skill_total(&entry, info, 10, &attributes, 3), 9);

    // The penalty only applies to skills flagged for it.
    let athletics = catalog::find("Atletismo").expect("Atletismo is in the catalog");
    let strong = SkillEntry {
        attribute: Some(Attribute::Dexterity),
        ..entry.clone()
    };
    assert_eq!(skill_total(&strong, athletics, 10, &attributes, 3), 12);
}

#[test]
fn test_trained_only_skill_is_still_computed() {
    let info = catalog::find("Ladinagem").expect("Ladinagem is in the catalog");
    assert!(info.trained_only);

    let record = make_default();
    assert_eq!(record.skill_total("Ladinagem"), Some(0));
    assert_eq!(record.skill_total("Nope"), None);
}

#[test]
fn test_defense_summation() {
    let mut attributes = AttributeSet::default();
    attributes.set(Attribute::Strength, 12);
    attributes.set(Attribute::Dexterity, 16);

    let both = DefenseAttributes::new([Attribute::Strength, Attribute::Dexterity]);
    assert_eq!(defense_total(&both, &attributes, 4, 2, 1), 21);

    let legacy = DefenseAttributes::new([Attribute::Dexterity]);
    assert_eq!(defense_total(&legacy, &attributes, 4, 2, 1), 20);
}

#[test]
fn test_total_level_fallback() {
    let class = |level| ClassLevel {
        name: "Guerreiro".to_string(),
        level,
    };

    assert_eq!(total_level(&[], 5), 5);
    assert_eq!(total_level(&[class(0)], 5), 5);
    assert_eq!(total_level(&[class(3), class(2)], 9), 5);
    assert_eq!(total_level(&[], 0), 1);
}

#[test]
fn test_encumbrance_tiers() {
    let limits = load_limits(10);
    assert_eq!(limits.without_penalty, 30);
    assert_eq!(limits.max, 100);

    assert_eq!(load_status(25.0, limits), LoadStatus::Light);
    assert_eq!(load_status(30.0, limits), LoadStatus::Light);
    assert_eq!(load_status(35.0, limits), LoadStatus::Heavy);
    assert_eq!(load_status(105.0, limits), LoadStatus::Overload);
    assert_eq!(LoadStatus::Heavy.message(), "-2 defense and -3m movement");
}

#[test]
fn test_weight_and_first_equipped_rules() {
    let armors = vec![
        armor(ArmorCategory::Light, 2, 0, false),
        armor(ArmorCategory::Heavy, 6, -3, true),
        armor(ArmorCategory::Light, 4, 1, true),
        armor(ArmorCategory::Shield, 2, 2, true),
    ];
    assert_eq!(armor_penalty(&armors), 3);
    assert_eq!(equipped_armor_bonus(&armors), 6);
    assert_eq!(equipped_shield_bonus(&armors), 2);
    assert_eq!(armor_penalty(&[]), 0);

    let items = vec![
        Item {
            weight: 0.25,
            quantity: 3,
            ..Item::default()
        },
        Item {
            weight: 1.0,
            ..Item::default()
        },
    ];
    let weapons = vec![Weapon {
        weight: 2.0,
        ..Weapon::default()
    }];
    // 0.75 + 1.0 + 2.0 + 4.0 rounds half up at the tenths digit.
    assert_eq!(total_weight(&weapons, &armors, &items), 7.8);
}

#[test]
fn test_defense_attribute_set_never_empties() {
    let mut record = make_default();
    assert!(!record.toggle_defense_attribute(Attribute::Dexterity));
    assert_eq!(record.defense_attributes.len(), 1);

    assert!(record.toggle_defense_attribute(Attribute::Wisdom));
    assert!(record.toggle_defense_attribute(Attribute::Dexterity));
    assert!(!record.toggle_defense_attribute(Attribute::Wisdom));
    assert!(record.defense_attributes.contains(Attribute::Wisdom));

    let empty = DefenseAttributes::new([]);
    assert_eq!(empty, DefenseAttributes::default());
}

#[test]
fn test_legacy_sheet_is_normalized() {
    let record = legacy_record();

    assert_eq!(record.name, "Valéria");
    assert_eq!(record.movement, 9);
    assert_eq!(record.photo, Photo::Absent);
    assert_eq!(record.total_level(), 7);
    assert_eq!(
        record.defense_attributes,
        DefenseAttributes::new([Attribute::Wisdom])
    );
    assert_eq!(record.attributes.strength, 14);
    assert_eq!(record.inventory.money.tibars, 150);
    assert_eq!(record.inventory.items[1].quantity, 1);

    let derived = record.derived();
    assert_eq!(derived.level, 7);
    assert_eq!(derived.defense, 23);
    assert_eq!(derived.armor_penalty, 2);
    assert_eq!(derived.carried_weight, 23.0);
    assert_eq!(derived.load_status, LoadStatus::Light);

    let total = |name: &str| {
        derived
            .skills
            .iter()
            .find(|skill| skill.name == name)
            .map(|skill| skill.total)
    };
    assert_eq!(total("Atletismo"), Some(12));
    assert_eq!(total("Furtividade"), Some(2));
    assert_eq!(total("Vontade"), Some(7));

    let serialized = serde_json::to_value(&record).expect("Failed to serialize record");
    assert!(serialized.get("defenseAttribute").is_none());
    assert_eq!(serialized["defenseAttributes"], json!(["sabedoria"]));
}

#[test]
fn test_unreadable_values_take_defaults() {
    let record = CharacterRecord::from_value(json!({
        "atributos": { "forca": "lots", "destreza": "13abc" },
        "inventario": "broken",
        "pericias": { "Luta": { "treinada": "sim", "bonusExtra": "x" } },
        "recursos": { "vida": { "atual": "5", "maximo": 10 } }
    }));

    assert_eq!(record.attributes.strength, 10);
    assert_eq!(record.attributes.dexterity, 13);
    assert_eq!(record.inventory, Inventory::default());
    assert!(record.skill_entry("Luta").trained);
    assert_eq!(record.skill_entry("Luta").extra, 0);
    assert_eq!(record.resources.life.current, 5);
    assert_eq!(record.resources.life.percentage(), 50.0);

    assert_eq!(CharacterRecord::from_value(json!(42)).attributes, AttributeSet::default());
}

#[test]
fn test_extreme_scores_saturate() {
    assert_eq!(modifier(i64::MIN), i64::MIN / 2);
    assert_eq!(modifier(i64::MAX), (i64::MAX - 10) / 2);
    assert_eq!(load_limits(i64::MAX).max, i64::MAX);
    assert_eq!(load_limits(i64::MIN).without_penalty, i64::MIN);

    let clumsy = CharacterRecord::from_value(json!({ "atributos": { "destreza": -1e30 } }));
    assert_eq!(clumsy.attributes.dexterity, i64::MIN);
    assert_eq!(clumsy.defense(), 10 + i64::MIN / 2);
    assert_eq!(clumsy.derived().defense, clumsy.defense());

    let strong = CharacterRecord::from_value(json!({ "atributos": { "forca": 1e18 } }));
    let derived = strong.derived();
    assert_eq!(derived.load_limits.without_penalty, 3_000_000_000_000_000_000);
    assert_eq!(derived.load_limits.max, i64::MAX);
    assert_eq!(derived.load_status, LoadStatus::Light);

    let extreme = CharacterRecord::from_value(json!({
        "defesa_outros": 1e19,
        "pericias": { "Atletismo": { "outros": 1e19, "bonusExtra": 5 } },
        "inventario": {
            "armaduras": [{ "categoria": "leve", "penalidade": -1e30, "equipada": true }]
        }
    }));
    assert_eq!(extreme.defense(), i64::MAX);
    assert_eq!(extreme.inventory.armor_penalty(), i64::MAX);
    assert_eq!(extreme.skill_total("Atletismo"), Some(i64::MAX));
    assert_eq!(extreme.skill_total("Acrobacia"), Some(-i64::MAX));
}

#[test]
fn test_fixed_pools_keep_their_colors() {
    let record = CharacterRecord::from_value(json!({
        "recursos": {
            "vida": { "atual": 3, "maximo": 10 },
            "mana": { "atual": 1, "cor": "#000000" },
            "prana": { "cor": "" },
            "recursos_extras": [{ "id": "t20_x", "nome": "Fôlego" }]
        }
    }));
    let resources = &record.resources;

    assert_eq!(resources.life.color, LIFE_COLOR);
    assert_eq!(resources.life.current, 3);
    assert_eq!(resources.mana.color, "#000000");
    assert_eq!(resources.prana.color, PRANA_COLOR);
    assert_eq!(resources.extras[0].pool.color, EXTRA_COLOR);
    assert_eq!(make_default().resources.mana.color, MANA_COLOR);
}

#[test]
fn test_form_input_parsing() {
    assert_eq!(parse_bonus("3"), 3);
    assert_eq!(parse_bonus("-2"), -2);
    assert_eq!(parse_bonus("abc"), 0);
    assert_eq!(parse_weight("1.5kg"), 1.5);
    assert_eq!(parse_weight(""), 0.0);
    assert_eq!(parse_money("12 peças"), 12);
    assert_eq!(parse_class_level(""), 1);
    assert_eq!(parse_class_level("0"), 1);
    assert_eq!(parse_attribute_score("x"), 10);
    assert_eq!(parse_attribute_score("18"), 18);
    assert_eq!(parse_movement("12m"), 12);
    assert_eq!(parse_movement("-"), 9);
    assert_eq!(parse_quantity("0"), 1);
}

#[test]
fn test_generated_ids_are_unique_and_key_safe() {
    let first = generate_id();
    let second = generate_id();
    assert_ne!(first, second);
    assert!(first.starts_with(ID_PREFIX));
    assert!(first.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
}

#[test]
fn test_merge_update_is_shallow() {
    let mut record = make_default();
    record.attributes.set(Attribute::Charisma, 15);

    let patch = RecordPatch::from_json(r#"{ "nome": "Kaya", "atributos": { "forca": 18 } }"#)
        .expect("Failed to parse patch");
    let merged = merge_update(&record, patch);

    assert_eq!(merged.name, "Kaya");
    assert_eq!(merged.attributes.strength, 18);
    // The whole attribute set was replaced, so charisma is back to its default.
    assert_eq!(merged.attributes.charisma, 10);
    assert_eq!(merged.inventory, record.inventory);
    assert_eq!(record.name, "");

    let legacy = RecordPatch::from_json(r#"{ "defenseAttribute": "forca" }"#)
        .expect("Failed to parse patch");
    let merged = merge_update(&merged, legacy);
    assert_eq!(
        merged.defense_attributes,
        DefenseAttributes::new([Attribute::Strength])
    );
}

#[test]
fn test_photo_limits() {
    let err = Photo::from_upload("data:image/png;base64,AAAA".to_string(), MAX_PHOTO_BYTES + 1)
        .expect_err("Oversized upload should be rejected");
    assert!(matches!(err, AppError::PhotoTooLarge { .. }));

    let photo = Photo::from_upload("data:image/png;base64,AAAA".to_string(), 1024)
        .expect("Small upload should be accepted");
    let mut frame = photo.frame();
    frame.zoom_by(5.0);
    frame.move_to(-2.0, 0.25);
    assert_eq!(frame.zoom, PhotoFrame::MAX_ZOOM);
    assert_eq!((frame.offset_x, frame.offset_y), (-0.5, 0.25));
    frame.zoom_by(-10.0);
    assert_eq!(frame.zoom, PhotoFrame::MIN_ZOOM);

    assert_eq!(Photo::from_frame(PhotoFrame::default()), Photo::Absent);
}

#[test]
fn test_item_bonuses_are_summed_by_quantity() {
    let record = CharacterRecord::from_value(json!({
        "inventario": { "itens": [
            { "nome": "Anel", "quantidade": 2, "bonus_forca": 1, "bonus_pericia_nome": "Luta", "bonus_pericia_valor": 2 },
            { "nome": "Amuleto", "bonus_mana": "3" }
        ] }
    }));

    let bonuses = record.inventory.item_bonuses();
    assert_eq!(bonuses.attribute(Attribute::Strength), 2);
    assert_eq!(bonuses.mana, 3);
    assert_eq!(record.inventory.skill_bonus("Luta"), 4);
    // Informational only.
    assert_eq!(record.skill_total("Luta"), Some(0));
}

#[test]
fn test_skill_filter() {
    let record = legacy_record();

    let by_name = SkillFilter {
        name: "furti".to_string(),
        ..SkillFilter::default()
    };
    let names: Vec<_> = by_name.apply(&record.skills).iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["Furtividade"]);

    let by_attribute = SkillFilter {
        attribute: Some(Attribute::Charisma),
        training: TrainingFilter::Trained,
        ..SkillFilter::default()
    };
    let names: Vec<_> = by_attribute
        .apply(&record.skills)
        .iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["Vontade"]);

    let mut filter = by_attribute;
    assert!(filter.is_active());
    filter.clear();
    assert!(!filter.is_active());
    assert_eq!(filter.apply(&record.skills).len(), catalog::SKILLS.len());
}

#[test]
fn test_dice_rolls_match_sheet_totals() {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    let record = legacy_record();
    let mut rng = StdRng::seed_from_u64(20);

    let roll = dice::roll_skill(&record, "Atletismo", &mut rng).expect("Known skill");
    assert!((1..=20).contains(&roll.roll));
    assert_eq!(roll.modifier, 12);
    assert_eq!(roll.total, roll.roll + 12);
    assert!(roll.details.starts_with("Atletismo: "));
    assert!(roll.details.ends_with(&format!("= {}", roll.total)));
    assert!(dice::roll_skill(&record, "Voar", &mut rng).is_none());

    let roll = dice::roll_attribute(&record, Attribute::Wisdom, &mut rng);
    assert_eq!(roll.modifier, 3);
    assert_eq!(roll.total, roll.roll + 3);

    let roll = dice::roll_custom(Die::D6, -2, &mut rng);
    assert!((1..=6).contains(&roll.roll));
    assert_eq!(roll.total, roll.roll - 2);
    assert!(roll.details.starts_with("d6-2: "));

    let mut first = StdRng::seed_from_u64(7);
    let mut second = StdRng::seed_from_u64(7);
    assert_eq!(
        dice::roll_custom(Die::D20, 0, &mut first),
        dice::roll_custom(Die::D20, 0, &mut second)
    );
    assert_eq!("D12".parse::<Die>().expect("Valid die"), Die::D12);
}
