// /character/attributes.rs
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::{EnumIter, EnumString};

use crate::utils::lenient_attribute_score;

// The six base attributes. The stored names are the ones the sheet files have always used.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter, EnumString,
    strum_macros::Display,
)]
#[strum(ascii_case_insensitive)]
pub enum Attribute {
    #[serde(rename = "forca")]
    #[strum(to_string = "forca", serialize = "strength", serialize = "for")]
    Strength,
    #[serde(rename = "destreza")]
    #[strum(to_string = "destreza", serialize = "dexterity", serialize = "des")]
    Dexterity,
    #[serde(rename = "constituicao")]
    #[strum(to_string = "constituicao", serialize = "constitution", serialize = "con")]
    Constitution,
    #[serde(rename = "inteligencia")]
    #[strum(to_string = "inteligencia", serialize = "intelligence", serialize = "int")]
    Intelligence,
    #[serde(rename = "sabedoria")]
    #[strum(to_string = "sabedoria", serialize = "wisdom", serialize = "sab")]
    Wisdom,
    #[serde(rename = "carisma")]
    #[strum(to_string = "carisma", serialize = "charisma", serialize = "car")]
    Charisma,
}

impl Attribute {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Attribute::Strength => "FOR",
            Attribute::Dexterity => "DES",
            Attribute::Constitution => "CON",
            Attribute::Intelligence => "INT",
            Attribute::Wisdom => "SAB",
            Attribute::Charisma => "CAR",
        }
    }

    // Lenient lookup used for stored overrides; anything unknown reads as absent.
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_str().and_then(|name| Attribute::from_str(name.trim()).ok())
    }
}

/// Integer modifier of an attribute score: `floor((score - 10) / 2)`.
///
/// No range is enforced, extreme scores give extreme modifiers.
pub fn modifier(score: i64) -> i64 {
    score.saturating_sub(10).div_euclid(2)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeSet {
    #[serde(rename = "forca", deserialize_with = "lenient_attribute_score")]
    pub strength: i64,
    #[serde(rename = "destreza", deserialize_with = "lenient_attribute_score")]
    pub dexterity: i64,
    #[serde(rename = "constituicao", deserialize_with = "lenient_attribute_score")]
    pub constitution: i64,
    #[serde(rename = "inteligencia", deserialize_with = "lenient_attribute_score")]
    pub intelligence: i64,
    #[serde(rename = "sabedoria", deserialize_with = "lenient_attribute_score")]
    pub wisdom: i64,
    #[serde(rename = "carisma", deserialize_with = "lenient_attribute_score")]
    pub charisma: i64,
}

impl Default for AttributeSet {
    fn default() -> Self {
        Self {
            strength: 10,
            dexterity: 10,
            constitution: 10,
            intelligence: 10,
            wisdom: 10,
            charisma: 10,
        }
    }
}

impl AttributeSet {
    pub fn get(&self, attribute: Attribute) -> i64 {
        match attribute {
            Attribute::Strength => self.strength,
            Attribute::Dexterity => self.dexterity,
            Attribute::Constitution => self.constitution,
            Attribute::Intelligence => self.intelligence,
            Attribute::Wisdom => self.wisdom,
            Attribute::Charisma => self.charisma,
        }
    }

    pub fn set(&mut self, attribute: Attribute, score: i64) {
        let slot = match attribute {
            Attribute::Strength => &mut self.strength,
            Attribute::Dexterity => &mut self.dexterity,
            Attribute::Constitution => &mut self.constitution,
            Attribute::Intelligence => &mut self.intelligence,
            Attribute::Wisdom => &mut self.wisdom,
            Attribute::Charisma => &mut self.charisma,
        };
        *slot = score;
    }

    pub fn modifier(&self, attribute: Attribute) -> i64 {
        modifier(self.get(attribute))
    }

    pub fn modifiers(&self) -> Vec<(Attribute, i64)> {
        Attribute::iter()
            .map(|attribute| (attribute, self.modifier(attribute)))
            .collect()
    }
}

// Attributes whose modifiers are summed into defense. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefenseAttributes(Vec<Attribute>);

impl Default for DefenseAttributes {
    fn default() -> Self {
        Self(vec![Attribute::Dexterity])
    }
}

impl DefenseAttributes {
    pub fn new(attributes: impl IntoIterator<Item = Attribute>) -> Self {
        let mut set = Self(Vec::new());
        for attribute in attributes {
            set.insert(attribute);
        }
        if set.0.is_empty() {
            return Self::default();
        }
        set
    }

    pub fn contains(&self, attribute: Attribute) -> bool {
        self.0.contains(&attribute)
    }

    pub fn iter(&self) -> impl Iterator<Item = Attribute> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn insert(&mut self, attribute: Attribute) {
        if !self.contains(attribute) {
            self.0.push(attribute);
        }
    }

    /// Returns false, leaving the set untouched, when `attribute` is the last one left.
    pub fn remove(&mut self, attribute: Attribute) -> bool {
        if !self.contains(attribute) {
            return true;
        }
        if self.0.len() == 1 {
            log::debug!("Refusing to remove the last defense attribute ({attribute})");
            return false;
        }
        self.0.retain(|a| *a != attribute);
        true
    }

    pub fn toggle(&mut self, attribute: Attribute) -> bool {
        if self.contains(attribute) {
            self.remove(attribute)
        } else {
            self.insert(attribute);
            true
        }
    }
}

impl Serialize for DefenseAttributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

// Accepts the legacy single-name form as well as a list.
impl<'de> Deserialize<'de> for DefenseAttributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let attributes = match &value {
            Value::Array(items) => items.iter().filter_map(Attribute::from_value).collect(),
            single => Attribute::from_value(single).into_iter().collect::<Vec<_>>(),
        };
        Ok(Self::new(attributes))
    }
}
