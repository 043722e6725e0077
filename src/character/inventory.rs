// /character/inventory.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::character::attributes::Attribute;
use crate::utils::{
    generate_id, int_from_value, lenient_bool, lenient_f64, lenient_int, lenient_string,
    or_default,
};

fn is_zero(value: &i64) -> bool {
    *value == 0
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponCategory {
    #[default]
    #[serde(rename = "simples")]
    Simple,
    #[serde(rename = "marcial")]
    Martial,
    #[serde(rename = "exotica")]
    Exotic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weapon {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(rename = "nome", deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(rename = "categoria", deserialize_with = "or_default")]
    pub category: WeaponCategory,
    #[serde(rename = "dano", deserialize_with = "lenient_string")]
    pub damage: String,
    #[serde(rename = "critico", deserialize_with = "lenient_string")]
    pub critical: String,
    #[serde(rename = "alcance", deserialize_with = "lenient_string")]
    pub range: String,
    #[serde(rename = "tipo", deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(rename = "peso", deserialize_with = "lenient_f64")]
    pub weight: f64,
    #[serde(rename = "preco", deserialize_with = "lenient_string")]
    pub price: String,
    #[serde(rename = "propriedades", deserialize_with = "or_default")]
    pub properties: Vec<String>,
    #[serde(rename = "proficiencia", deserialize_with = "lenient_bool")]
    pub proficient: bool,
    #[serde(rename = "bonus_ataque", deserialize_with = "lenient_int")]
    pub attack_bonus: i64,
    #[serde(rename = "bonus_dano", deserialize_with = "lenient_int")]
    pub damage_bonus: i64,
    #[serde(rename = "descricao", deserialize_with = "lenient_string")]
    pub description: String,
}

impl Default for Weapon {
    fn default() -> Self {
        Self {
            id: generate_id(),
            name: "New Weapon".to_string(),
            category: WeaponCategory::Simple,
            damage: "1d6".to_string(),
            critical: "20/x2".to_string(),
            range: "Melee".to_string(),
            kind: "Slashing".to_string(),
            weight: 1.0,
            price: String::new(),
            properties: Vec::new(),
            proficient: false,
            attack_bonus: 0,
            damage_bonus: 0,
            description: String::new(),
        }
    }
}

impl Weapon {
    // Properties are edited as one comma separated line.
    pub fn set_properties(&mut self, line: &str) {
        self.properties = line
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(String::from)
            .collect();
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArmorCategory {
    #[default]
    #[serde(rename = "leve")]
    Light,
    #[serde(rename = "pesada")]
    Heavy,
    #[serde(rename = "escudo")]
    Shield,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Armor {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(rename = "nome", deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(rename = "categoria", deserialize_with = "or_default")]
    pub category: ArmorCategory,
    #[serde(deserialize_with = "lenient_int")]
    pub ca: i64,
    // Magnitude; stored with whatever sign was typed.
    #[serde(rename = "penalidade", deserialize_with = "lenient_int")]
    pub penalty: i64,
    #[serde(rename = "peso", deserialize_with = "lenient_f64")]
    pub weight: f64,
    #[serde(rename = "preco", deserialize_with = "lenient_string")]
    pub price: String,
    #[serde(rename = "equipada", deserialize_with = "lenient_bool")]
    pub equipped: bool,
    #[serde(rename = "descricao", deserialize_with = "lenient_string")]
    pub description: String,
}

impl Default for Armor {
    fn default() -> Self {
        Self {
            id: generate_id(),
            name: "New Armor".to_string(),
            category: ArmorCategory::Light,
            ca: 0,
            penalty: 0,
            weight: 1.0,
            price: String::new(),
            equipped: false,
            description: String::new(),
        }
    }
}

impl Armor {
    pub fn is_shield(&self) -> bool {
        self.category == ArmorCategory::Shield
    }
}

// Optional bonuses an item can carry. Zero means "not set" and is left out of the stored form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemBonuses {
    #[serde(rename = "bonus_armadura", deserialize_with = "lenient_int", skip_serializing_if = "is_zero")]
    pub armor: i64,
    #[serde(rename = "bonus_vida", deserialize_with = "lenient_int", skip_serializing_if = "is_zero")]
    pub life: i64,
    #[serde(rename = "bonus_mana", deserialize_with = "lenient_int", skip_serializing_if = "is_zero")]
    pub mana: i64,
    #[serde(rename = "bonus_prana", deserialize_with = "lenient_int", skip_serializing_if = "is_zero")]
    pub prana: i64,
    #[serde(rename = "bonus_movimento", deserialize_with = "lenient_int", skip_serializing_if = "is_zero")]
    pub movement: i64,
    #[serde(rename = "bonus_forca", deserialize_with = "lenient_int", skip_serializing_if = "is_zero")]
    pub strength: i64,
    #[serde(rename = "bonus_destreza", deserialize_with = "lenient_int", skip_serializing_if = "is_zero")]
    pub dexterity: i64,
    #[serde(rename = "bonus_constituicao", deserialize_with = "lenient_int", skip_serializing_if = "is_zero")]
    pub constitution: i64,
    #[serde(rename = "bonus_inteligencia", deserialize_with = "lenient_int", skip_serializing_if = "is_zero")]
    pub intelligence: i64,
    #[serde(rename = "bonus_sabedoria", deserialize_with = "lenient_int", skip_serializing_if = "is_zero")]
    pub wisdom: i64,
    #[serde(rename = "bonus_carisma", deserialize_with = "lenient_int", skip_serializing_if = "is_zero")]
    pub charisma: i64,
    #[serde(rename = "bonus_pericia_nome", deserialize_with = "lenient_string", skip_serializing_if = "String::is_empty")]
    pub skill_name: String,
    #[serde(rename = "bonus_pericia_valor", deserialize_with = "lenient_int", skip_serializing_if = "is_zero")]
    pub skill_value: i64,
}

impl ItemBonuses {
    pub fn attribute(&self, attribute: Attribute) -> i64 {
        match attribute {
            Attribute::Strength => self.strength,
            Attribute::Dexterity => self.dexterity,
            Attribute::Constitution => self.constitution,
            Attribute::Intelligence => self.intelligence,
            Attribute::Wisdom => self.wisdom,
            Attribute::Charisma => self.charisma,
        }
    }

    fn accumulate(&mut self, other: &ItemBonuses, times: i64) {
        let add = |total: &mut i64, bonus: i64| {
            *total = total.saturating_add(bonus.saturating_mul(times));
        };
        add(&mut self.armor, other.armor);
        add(&mut self.life, other.life);
        add(&mut self.mana, other.mana);
        add(&mut self.prana, other.prana);
        add(&mut self.movement, other.movement);
        add(&mut self.strength, other.strength);
        add(&mut self.dexterity, other.dexterity);
        add(&mut self.constitution, other.constitution);
        add(&mut self.intelligence, other.intelligence);
        add(&mut self.wisdom, other.wisdom);
        add(&mut self.charisma, other.charisma);
    }
}

// Quantity is at least one; anything else that was stored reads as one.
fn lenient_quantity<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(int_from_value(&value).filter(|q| *q >= 1).unwrap_or(1))
}

fn one() -> i64 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Item {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(rename = "nome", deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(rename = "quantidade", default = "one", deserialize_with = "lenient_quantity")]
    pub quantity: i64,
    #[serde(rename = "peso", deserialize_with = "lenient_f64")]
    pub weight: f64,
    #[serde(rename = "preco", deserialize_with = "lenient_string")]
    pub price: String,
    #[serde(rename = "categoria", deserialize_with = "lenient_string")]
    pub category: String,
    #[serde(rename = "descricao", deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(flatten)]
    pub bonuses: ItemBonuses,
}

impl Default for Item {
    fn default() -> Self {
        Self {
            id: generate_id(),
            name: "New Item".to_string(),
            quantity: 1,
            weight: 0.0,
            price: String::new(),
            category: String::new(),
            description: String::new(),
            bonuses: ItemBonuses::default(),
        }
    }
}

impl Item {
    pub fn total_weight(&self) -> f64 {
        self.weight * self.quantity.max(1) as f64
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Currency {
    #[serde(rename = "T$", deserialize_with = "lenient_int")]
    pub tibars: i64,
    #[serde(rename = "PP", deserialize_with = "lenient_int")]
    pub platinum: i64,
    #[serde(rename = "PO", deserialize_with = "lenient_int")]
    pub gold: i64,
    #[serde(rename = "PE", deserialize_with = "lenient_int")]
    pub silver: i64,
    #[serde(rename = "PC", deserialize_with = "lenient_int")]
    pub copper: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Inventory {
    #[serde(rename = "armas", deserialize_with = "or_default")]
    pub weapons: Vec<Weapon>,
    #[serde(rename = "armaduras", deserialize_with = "or_default")]
    pub armors: Vec<Armor>,
    #[serde(rename = "itens", deserialize_with = "or_default")]
    pub items: Vec<Item>,
    #[serde(rename = "dinheiro", deserialize_with = "or_default")]
    pub money: Currency,
}

impl Inventory {
    pub fn add_weapon(&mut self) -> &mut Weapon {
        self.weapons.push(Weapon::default());
        let last = self.weapons.len() - 1;
        &mut self.weapons[last]
    }

    pub fn add_armor(&mut self) -> &mut Armor {
        self.armors.push(Armor::default());
        let last = self.armors.len() - 1;
        &mut self.armors[last]
    }

    pub fn add_item(&mut self) -> &mut Item {
        self.items.push(Item::default());
        let last = self.items.len() - 1;
        &mut self.items[last]
    }

    pub fn remove_entry(&mut self, id: &str) {
        self.weapons.retain(|weapon| weapon.id != id);
        self.armors.retain(|armor| armor.id != id);
        self.items.retain(|item| item.id != id);
    }

    pub fn armor_penalty(&self) -> i64 {
        armor_penalty(&self.armors)
    }

    pub fn total_weight(&self) -> f64 {
        total_weight(&self.weapons, &self.armors, &self.items)
    }

    // Sum of every item's optional bonuses, multiplied by quantity. Informational only.
    pub fn item_bonuses(&self) -> ItemBonuses {
        let mut total = ItemBonuses::default();
        for item in &self.items {
            total.accumulate(&item.bonuses, item.quantity.max(1));
        }
        total
    }

    // Bonuses items grant to one named skill.
    pub fn skill_bonus(&self, skill: &str) -> i64 {
        self.items
            .iter()
            .filter(|item| item.bonuses.skill_name == skill)
            .map(|item| item.bonuses.skill_value.saturating_mul(item.quantity.max(1)))
            .fold(0, i64::saturating_add)
    }
}

// region:  --- Equipment effects

/// Penalty of the first equipped armor or shield, as a positive number.
pub fn armor_penalty(armors: &[Armor]) -> i64 {
    armors
        .iter()
        .find(|armor| armor.equipped)
        .map(|armor| armor.penalty.saturating_abs())
        .unwrap_or(0)
}

// First equipped match wins; several equipped entries are never summed.
pub fn equipped_armor_bonus(armors: &[Armor]) -> i64 {
    armors
        .iter()
        .find(|armor| armor.equipped && !armor.is_shield())
        .map(|armor| armor.ca)
        .unwrap_or(0)
}

pub fn equipped_shield_bonus(armors: &[Armor]) -> i64 {
    armors
        .iter()
        .find(|armor| armor.equipped && armor.is_shield())
        .map(|armor| armor.ca)
        .unwrap_or(0)
}

/// Carried weight rounded to one decimal.
pub fn total_weight(weapons: &[Weapon], armors: &[Armor], items: &[Item]) -> f64 {
    let weapons: f64 = weapons.iter().map(|weapon| weapon.weight).sum();
    let armors: f64 = armors.iter().map(|armor| armor.weight).sum();
    let items: f64 = items.iter().map(Item::total_weight).sum();
    round_tenths(weapons + armors + items)
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0 + 0.5).floor() / 10.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadLimits {
    pub without_penalty: i64,
    pub max: i64,
}

pub fn load_limits(strength: i64) -> LoadLimits {
    LoadLimits {
        without_penalty: strength.saturating_mul(3),
        max: strength.saturating_mul(10),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
pub enum LoadStatus {
    #[strum(to_string = "light")]
    Light,
    #[strum(to_string = "heavy")]
    Heavy,
    #[strum(to_string = "overload")]
    Overload,
}

impl LoadStatus {
    // Advisory text only; the penalties are not applied to other stats.
    pub fn message(&self) -> &'static str {
        match self {
            LoadStatus::Light => "no penalty",
            LoadStatus::Heavy => "-2 defense and -3m movement",
            LoadStatus::Overload => "cannot carry more",
        }
    }
}

pub fn load_status(total_weight: f64, limits: LoadLimits) -> LoadStatus {
    if total_weight > limits.max as f64 {
        LoadStatus::Overload
    } else if total_weight > limits.without_penalty as f64 {
        LoadStatus::Heavy
    } else {
        LoadStatus::Light
    }
}

// endregion:  --- Equipment effects
