// Derived statistics. Everything here is a pure function of the sheet, cheap enough to run on
// every redraw, so nothing is cached on the record.

use serde::Serialize;
use serde_json::Value;

use crate::catalog::{self, SkillInfo};
use crate::character::{
    Attribute, AttributeSet, CharacterRecord, ClassLevel, DefenseAttributes, LoadLimits,
    LoadStatus, SkillEntry, equipped_armor_bonus, equipped_shield_bonus, load_limits, load_status,
};

pub const BASE_DEFENSE: i64 = 10;

/// Sum of the class levels. An empty list, or one summing to zero, falls back to the stored
/// standalone level, and to 1 when that is unset too.
pub fn total_level(classes: &[ClassLevel], fallback_level: i64) -> i64 {
    let sum = classes
        .iter()
        .map(|class| class.level)
        .fold(0, i64::saturating_add);
    if sum != 0 {
        sum
    } else if fallback_level != 0 {
        fallback_level
    } else {
        1
    }
}

pub fn training_bonus(level: i64, trained: bool) -> i64 {
    if !trained {
        0
    } else if level >= 15 {
        6
    } else if level >= 7 {
        4
    } else {
        2
    }
}

/// Reads a stored training flag. Older sheets used strings, where "destreinado" meant untrained.
pub fn is_trained(flag: &Value) -> bool {
    match flag {
        Value::Bool(trained) => *trained,
        Value::String(text) => !text.is_empty() && text != "destreinado",
        _ => false,
    }
}

/// Half level + attribute modifier + training + bonuses, minus the armor penalty for skills
/// that take it. Computed for trained-only skills too; hiding them is up to the caller.
pub fn skill_total(
    entry: &SkillEntry,
    info: &SkillInfo,
    level: i64,
    attributes: &AttributeSet,
    armor_penalty: i64,
) -> i64 {
    let half_level = level.div_euclid(2);
    let attribute = attributes.modifier(entry.effective_attribute(info));
    let training = training_bonus(level, entry.trained);
    let penalty = if info.armor_penalty { armor_penalty } else { 0 };

    [attribute, training, entry.others, entry.extra]
        .into_iter()
        .fold(half_level, i64::saturating_add)
        .saturating_sub(penalty)
}

pub fn defense_total(
    defense_attributes: &DefenseAttributes,
    attributes: &AttributeSet,
    armor_bonus: i64,
    shield_bonus: i64,
    other_bonus: i64,
) -> i64 {
    // Scores are unbounded; every step saturates.
    defense_attributes
        .iter()
        .map(|attribute| attributes.modifier(attribute))
        .chain([armor_bonus, shield_bonus, other_bonus])
        .fold(BASE_DEFENSE, i64::saturating_add)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillTotal {
    pub name: &'static str,
    pub attribute: Attribute,
    pub trained: bool,
    pub trained_only: bool,
    pub armor_penalty: bool,
    pub total: i64,
}

// Everything the sheet shows that is not typed in directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedStats {
    pub level: i64,
    pub defense: i64,
    pub armor_penalty: i64,
    pub modifiers: Vec<(Attribute, i64)>,
    pub skills: Vec<SkillTotal>,
    pub carried_weight: f64,
    pub load_limits: LoadLimits,
    pub load_status: LoadStatus,
}

impl CharacterRecord {
    pub fn total_level(&self) -> i64 {
        total_level(&self.classes, self.level)
    }

    pub fn defense(&self) -> i64 {
        let armors = &self.inventory.armors;
        defense_total(
            &self.defense_attributes,
            &self.attributes,
            equipped_armor_bonus(armors),
            equipped_shield_bonus(armors),
            self.defense_other,
        )
    }

    pub fn skill_entry(&self, name: &str) -> SkillEntry {
        self.skills.get(name).cloned().unwrap_or_default()
    }

    pub fn skill_total(&self, name: &str) -> Option<i64> {
        let info = catalog::find(name)?;
        Some(self.skill_total_for(info))
    }

    pub fn skill_total_for(&self, info: &SkillInfo) -> i64 {
        skill_total(
            &self.skill_entry(info.name),
            info,
            self.total_level(),
            &self.attributes,
            self.inventory.armor_penalty(),
        )
    }

    pub fn derived(&self) -> DerivedStats {
        let level = self.total_level();
        let armor_penalty = self.inventory.armor_penalty();
        let skills = catalog::SKILLS
            .iter()
            .map(|info| {
                let entry = self.skill_entry(info.name);
                SkillTotal {
                    name: info.name,
                    attribute: entry.effective_attribute(info),
                    trained: entry.trained,
                    trained_only: info.trained_only,
                    armor_penalty: info.armor_penalty,
                    total: skill_total(&entry, info, level, &self.attributes, armor_penalty),
                }
            })
            .collect();
        let carried_weight = self.inventory.total_weight();
        let limits = load_limits(self.attributes.strength);

        DerivedStats {
            level,
            defense: self.defense(),
            armor_penalty,
            modifiers: self.attributes.modifiers(),
            skills,
            carried_weight,
            load_limits: limits,
            load_status: load_status(carried_weight, limits),
        }
    }
}
