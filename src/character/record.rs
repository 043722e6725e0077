// /character/record.rs
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::character::attributes::{Attribute, AttributeSet, DefenseAttributes};
use crate::character::inventory::Inventory;
use crate::character::resources::Resources;
use crate::character::skills::SkillMap;
use crate::error::{AppError, Result};
use crate::utils::{
    generate_id, lenient_f64, lenient_int, lenient_movement, lenient_opt_int, lenient_opt_level,
    lenient_opt_movement, lenient_opt_string, lenient_string, or_default,
};

pub const MAX_PHOTO_BYTES: u64 = 5 * 1024 * 1024;

const LEGACY_DEFENSE_KEY: &str = "defenseAttribute";
const DEFENSE_KEY: &str = "defenseAttributes";

fn one() -> i64 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassLevel {
    #[serde(rename = "nome", deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(rename = "nivel", deserialize_with = "lenient_int")]
    pub level: i64,
}

impl Default for ClassLevel {
    fn default() -> Self {
        Self {
            name: String::new(),
            level: 1,
        }
    }
}

// region:  --- Photo

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotoFrame {
    #[serde(deserialize_with = "lenient_string")]
    pub src: String,
    #[serde(rename = "srcOriginal", skip_serializing_if = "Option::is_none")]
    pub src_original: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub zoom: f64,
    #[serde(rename = "offsetX", deserialize_with = "lenient_f64")]
    pub offset_x: f64,
    #[serde(rename = "offsetY", deserialize_with = "lenient_f64")]
    pub offset_y: f64,
}

impl Default for PhotoFrame {
    fn default() -> Self {
        Self {
            src: String::new(),
            src_original: None,
            zoom: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

impl PhotoFrame {
    pub const MIN_ZOOM: f64 = 1.0;
    pub const MAX_ZOOM: f64 = 3.0;
    pub const MAX_OFFSET: f64 = 0.5;

    pub fn from_source(src: String) -> Self {
        Self {
            src_original: Some(src.clone()),
            src,
            ..Self::default()
        }
    }

    pub fn zoom_by(&mut self, delta: f64) {
        self.zoom = (self.zoom + delta).clamp(Self::MIN_ZOOM, Self::MAX_ZOOM);
    }

    // Offsets are fractions of the crop circle.
    pub fn move_to(&mut self, offset_x: f64, offset_y: f64) {
        self.offset_x = offset_x.clamp(-Self::MAX_OFFSET, Self::MAX_OFFSET);
        self.offset_y = offset_y.clamp(-Self::MAX_OFFSET, Self::MAX_OFFSET);
    }

    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.offset_x = 0.0;
        self.offset_y = 0.0;
    }

    // The uncropped image, for re-editing.
    pub fn original(&self) -> &str {
        self.src_original.as_deref().unwrap_or(&self.src)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Photo {
    #[default]
    Absent,
    Uri(String),
    Edited(PhotoFrame),
}

impl Photo {
    /// Rejects uploads over [`MAX_PHOTO_BYTES`] before anything is stored.
    pub fn from_upload(src: String, size_bytes: u64) -> Result<Self> {
        if size_bytes > MAX_PHOTO_BYTES {
            return Err(AppError::PhotoTooLarge {
                size: size_bytes,
                limit: MAX_PHOTO_BYTES,
            });
        }
        Ok(Photo::Edited(PhotoFrame::from_source(src)))
    }

    // Starting point for the crop editor.
    pub fn frame(&self) -> PhotoFrame {
        match self {
            Photo::Absent => PhotoFrame::default(),
            Photo::Uri(src) => PhotoFrame {
                src: src.clone(),
                ..PhotoFrame::default()
            },
            Photo::Edited(frame) => PhotoFrame {
                src: frame.original().to_string(),
                ..frame.clone()
            },
        }
    }

    // Saving an editor frame with no image removes the photo.
    pub fn from_frame(frame: PhotoFrame) -> Self {
        if frame.src.is_empty() {
            Photo::Absent
        } else {
            Photo::Edited(frame)
        }
    }
}

impl Serialize for Photo {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Photo::Absent => serializer.serialize_str(""),
            Photo::Uri(src) => serializer.serialize_str(src),
            Photo::Edited(frame) => frame.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Photo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(src) if src.is_empty() => Photo::Absent,
            Value::String(src) => Photo::Uri(src),
            object @ Value::Object(_) => serde_json::from_value::<PhotoFrame>(object)
                .map(Photo::from_frame)
                .unwrap_or_default(),
            _ => Photo::Absent,
        })
    }
}

// endregion:  --- Photo

// region:  --- Spells, abilities and powers

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tradition {
    Arcane,
    Divine,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Spell {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(rename = "nome", deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(rename = "escola", deserialize_with = "lenient_string")]
    pub school: String,
    #[serde(rename = "execucao", deserialize_with = "lenient_string")]
    pub casting_time: String,
    #[serde(rename = "alcance", deserialize_with = "lenient_string")]
    pub range: String,
    #[serde(rename = "duracao", deserialize_with = "lenient_string")]
    pub duration: String,
    #[serde(rename = "descricao", deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(rename = "nivel", deserialize_with = "lenient_string")]
    pub circle: String,
}

impl Default for Spell {
    fn default() -> Self {
        Self {
            id: generate_id(),
            name: "New Spell".to_string(),
            school: String::new(),
            casting_time: String::new(),
            range: String::new(),
            duration: String::new(),
            description: String::new(),
            circle: circle_key(1),
        }
    }
}

pub fn circle_key(circle: u8) -> String {
    format!("{circle}º")
}

pub type SpellCircles = BTreeMap<String, Vec<Spell>>;

fn default_circles() -> SpellCircles {
    (1..=5).map(|circle| (circle_key(circle), Vec::new())).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Spellbook {
    #[serde(rename = "arcana", deserialize_with = "or_default")]
    pub arcane: SpellCircles,
    #[serde(rename = "divina", deserialize_with = "or_default")]
    pub divine: SpellCircles,
}

impl Default for Spellbook {
    fn default() -> Self {
        Self {
            arcane: default_circles(),
            divine: default_circles(),
        }
    }
}

impl Spellbook {
    pub fn circles(&self, tradition: Tradition) -> &SpellCircles {
        match tradition {
            Tradition::Arcane => &self.arcane,
            Tradition::Divine => &self.divine,
        }
    }

    fn circles_mut(&mut self, tradition: Tradition) -> &mut SpellCircles {
        match tradition {
            Tradition::Arcane => &mut self.arcane,
            Tradition::Divine => &mut self.divine,
        }
    }

    pub fn spells(&self, tradition: Tradition, circle: u8) -> &[Spell] {
        self.circles(tradition)
            .get(&circle_key(circle))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn add_spell(&mut self, tradition: Tradition, circle: u8) -> &mut Spell {
        let key = circle_key(circle);
        let spells = self.circles_mut(tradition).entry(key.clone()).or_default();
        spells.push(Spell {
            circle: key,
            ..Spell::default()
        });
        let last = spells.len() - 1;
        &mut spells[last]
    }

    pub fn remove_spell(&mut self, id: &str) {
        for circles in [&mut self.arcane, &mut self.divine] {
            for spells in circles.values_mut() {
                spells.retain(|spell| spell.id != id);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ability {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(rename = "nome", deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(rename = "descricao", deserialize_with = "lenient_string")]
    pub description: String,
}

impl Default for Ability {
    fn default() -> Self {
        Self {
            id: generate_id(),
            name: "New Ability".to_string(),
            description: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Power {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(rename = "nome", deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(rename = "tipo", deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(rename = "descricao", deserialize_with = "lenient_string")]
    pub description: String,
}

impl Default for Power {
    fn default() -> Self {
        Self {
            id: generate_id(),
            name: "New Power".to_string(),
            kind: "Geral".to_string(),
            description: String::new(),
        }
    }
}

// endregion:  --- Spells, abilities and powers

// region:  --- Character record

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterRecord {
    #[serde(rename = "nome", deserialize_with = "lenient_string")]
    pub name: String,
    // Only read when no class levels are recorded.
    #[serde(rename = "nivel", default = "one", deserialize_with = "lenient_int")]
    pub level: i64,
    #[serde(rename = "raca", deserialize_with = "lenient_string")]
    pub race: String,
    #[serde(deserialize_with = "or_default")]
    pub classes: Vec<ClassLevel>,
    #[serde(rename = "divindade", deserialize_with = "lenient_string")]
    pub deity: String,
    #[serde(rename = "tendencia", deserialize_with = "lenient_string")]
    pub alignment: String,
    #[serde(rename = "origem", deserialize_with = "lenient_string")]
    pub origin: String,
    #[serde(rename = "deslocamento", deserialize_with = "lenient_movement")]
    pub movement: i64,
    #[serde(rename = "foto")]
    pub photo: Photo,
    #[serde(rename = "defenseAttributes", alias = "defenseAttribute")]
    pub defense_attributes: DefenseAttributes,
    #[serde(rename = "atributos", deserialize_with = "or_default")]
    pub attributes: AttributeSet,
    #[serde(rename = "recursos", deserialize_with = "or_default")]
    pub resources: Resources,
    #[serde(rename = "defesa_outros", deserialize_with = "lenient_int")]
    pub defense_other: i64,
    #[serde(rename = "pericias", deserialize_with = "or_default")]
    pub skills: SkillMap,
    #[serde(rename = "inventario", deserialize_with = "or_default")]
    pub inventory: Inventory,
    #[serde(rename = "magias", deserialize_with = "or_default")]
    pub spells: Spellbook,
    #[serde(rename = "habilidades", deserialize_with = "or_default")]
    pub abilities: Vec<Ability>,
    #[serde(rename = "poderes", deserialize_with = "or_default")]
    pub powers: Vec<Power>,
}

impl Default for CharacterRecord {
    fn default() -> Self {
        make_default()
    }
}

/// A blank sheet: every attribute at 10, empty lists, defense from dexterity.
pub fn make_default() -> CharacterRecord {
    CharacterRecord {
        name: String::new(),
        level: 1,
        race: String::new(),
        classes: Vec::new(),
        deity: String::new(),
        alignment: String::new(),
        origin: String::new(),
        movement: 9,
        photo: Photo::Absent,
        defense_attributes: DefenseAttributes::default(),
        attributes: AttributeSet::default(),
        resources: Resources::default(),
        defense_other: 0,
        skills: SkillMap::new(),
        inventory: Inventory::default(),
        spells: Spellbook::default(),
        abilities: Vec::new(),
        powers: Vec::new(),
    }
}

// Folds the legacy single defense attribute into the list form. When both are present the list wins.
pub(crate) fn normalize_legacy(value: &mut Value) {
    if let Value::Object(map) = value {
        if let Some(legacy) = map.remove(LEGACY_DEFENSE_KEY) {
            map.entry(DEFENSE_KEY).or_insert(legacy);
        }
    }
}

impl CharacterRecord {
    /// Builds a record from any JSON value. Missing or unreadable fields take their defaults and
    /// anything that is not an object yields a blank sheet.
    pub fn from_value(mut value: Value) -> Self {
        normalize_legacy(&mut value);
        serde_json::from_value(value).unwrap_or_else(|e| {
            log::warn!("Unreadable character record, using defaults: {e}");
            make_default()
        })
    }

    pub fn add_class(&mut self) -> &mut ClassLevel {
        self.classes.push(ClassLevel::default());
        let last = self.classes.len() - 1;
        &mut self.classes[last]
    }

    pub fn add_ability(&mut self) -> &mut Ability {
        self.abilities.push(Ability::default());
        let last = self.abilities.len() - 1;
        &mut self.abilities[last]
    }

    pub fn add_power(&mut self) -> &mut Power {
        self.powers.push(Power::default());
        let last = self.powers.len() - 1;
        &mut self.powers[last]
    }

    /// Returns false when the change was refused because it would leave no defense attribute.
    pub fn toggle_defense_attribute(&mut self, attribute: Attribute) -> bool {
        self.defense_attributes.toggle(attribute)
    }

    pub fn display_name(&self) -> Option<&str> {
        Some(self.name.trim()).filter(|name| !name.is_empty())
    }

    pub fn merge(&mut self, patch: RecordPatch) {
        let RecordPatch {
            name,
            level,
            race,
            classes,
            deity,
            alignment,
            origin,
            movement,
            photo,
            defense_attributes,
            attributes,
            resources,
            defense_other,
            skills,
            inventory,
            spells,
            abilities,
            powers,
        } = patch;

        if let Some(value) = name {
            self.name = value;
        }
        if let Some(value) = level {
            self.level = value;
        }
        if let Some(value) = race {
            self.race = value;
        }
        if let Some(value) = classes {
            self.classes = value;
        }
        if let Some(value) = deity {
            self.deity = value;
        }
        if let Some(value) = alignment {
            self.alignment = value;
        }
        if let Some(value) = origin {
            self.origin = value;
        }
        if let Some(value) = movement {
            self.movement = value;
        }
        if let Some(value) = photo {
            self.photo = value;
        }
        if let Some(value) = defense_attributes {
            self.defense_attributes = value;
        }
        if let Some(value) = attributes {
            self.attributes = value;
        }
        if let Some(value) = resources {
            self.resources = value;
        }
        if let Some(value) = defense_other {
            self.defense_other = value;
        }
        if let Some(value) = skills {
            self.skills = value;
        }
        if let Some(value) = inventory {
            self.inventory = value;
        }
        if let Some(value) = spells {
            self.spells = value;
        }
        if let Some(value) = abilities {
            self.abilities = value;
        }
        if let Some(value) = powers {
            self.powers = value;
        }
    }
}

/// Top-level replacement of the fields present in `patch`. Nested values are swapped whole,
/// so callers change one attribute by sending a complete `AttributeSet`.
pub fn merge_update(record: &CharacterRecord, patch: RecordPatch) -> CharacterRecord {
    let mut merged = record.clone();
    merged.merge(patch);
    merged
}

// A partial record. Every present field replaces the record's field as a whole.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RecordPatch {
    #[serde(rename = "nome", deserialize_with = "lenient_opt_string")]
    pub name: Option<String>,
    #[serde(rename = "nivel", deserialize_with = "lenient_opt_level")]
    pub level: Option<i64>,
    #[serde(rename = "raca", deserialize_with = "lenient_opt_string")]
    pub race: Option<String>,
    pub classes: Option<Vec<ClassLevel>>,
    #[serde(rename = "divindade", deserialize_with = "lenient_opt_string")]
    pub deity: Option<String>,
    #[serde(rename = "tendencia", deserialize_with = "lenient_opt_string")]
    pub alignment: Option<String>,
    #[serde(rename = "origem", deserialize_with = "lenient_opt_string")]
    pub origin: Option<String>,
    #[serde(rename = "deslocamento", deserialize_with = "lenient_opt_movement")]
    pub movement: Option<i64>,
    #[serde(rename = "foto")]
    pub photo: Option<Photo>,
    #[serde(rename = "defenseAttributes", alias = "defenseAttribute")]
    pub defense_attributes: Option<DefenseAttributes>,
    #[serde(rename = "atributos")]
    pub attributes: Option<AttributeSet>,
    #[serde(rename = "recursos")]
    pub resources: Option<Resources>,
    #[serde(rename = "defesa_outros", deserialize_with = "lenient_opt_int")]
    pub defense_other: Option<i64>,
    #[serde(rename = "pericias")]
    pub skills: Option<SkillMap>,
    #[serde(rename = "inventario")]
    pub inventory: Option<Inventory>,
    #[serde(rename = "magias")]
    pub spells: Option<Spellbook>,
    #[serde(rename = "habilidades")]
    pub abilities: Option<Vec<Ability>>,
    #[serde(rename = "poderes")]
    pub powers: Option<Vec<Power>>,
}

impl RecordPatch {
    pub fn from_json(raw: &str) -> Result<Self> {
        let mut value: Value = serde_json::from_str(raw)?;
        normalize_legacy(&mut value);
        Ok(serde_json::from_value(value)?)
    }
}

// endregion:  --- Character record
