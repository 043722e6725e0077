// Quick rolls from the sheet. Skill rolls go through the same totals the sheet displays.
use rand::Rng;
use serde::Serialize;
use strum_macros::{Display, EnumIter, EnumString};

use crate::catalog;
use crate::character::{Attribute, CharacterRecord};
use crate::stats::training_bonus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Die {
    D4,
    D6,
    D8,
    D10,
    D12,
    D20,
}

impl Die {
    pub fn sides(&self) -> u32 {
        match self {
            Die::D4 => 4,
            Die::D6 => 6,
            Die::D8 => 8,
            Die::D10 => 10,
            Die::D12 => 12,
            Die::D20 => 20,
        }
    }

    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> i64 {
        i64::from(rng.random_range(1..=self.sides()))
    }
}

// Result of a single roll, with a line explaining how the total came about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiceRoll {
    pub die: Die,
    pub roll: i64,
    pub modifier: i64,
    pub total: i64,
    pub details: String,
}

fn signed(value: i64) -> String {
    if value >= 0 {
        format!("+{value}")
    } else {
        value.to_string()
    }
}

/// d20 plus the attribute modifier.
pub fn roll_attribute<R: Rng + ?Sized>(
    record: &CharacterRecord,
    attribute: Attribute,
    rng: &mut R,
) -> DiceRoll {
    let roll = Die::D20.roll(rng);
    let modifier = record.attributes.modifier(attribute);
    let total = roll.saturating_add(modifier);

    DiceRoll {
        die: Die::D20,
        roll,
        modifier,
        total,
        details: format!(
            "{}: {roll} (d20) {} (atributo) = {total}",
            attribute.abbreviation(),
            signed(modifier)
        ),
    }
}

/// d20 plus the skill's displayed total. Unknown skill names give `None`.
pub fn roll_skill<R: Rng + ?Sized>(
    record: &CharacterRecord,
    skill: &str,
    rng: &mut R,
) -> Option<DiceRoll> {
    let info = catalog::find(skill)?;
    let modifier = record.skill_total_for(info);
    let roll = Die::D20.roll(rng);
    let total = roll.saturating_add(modifier);

    let entry = record.skill_entry(info.name);
    let level = record.total_level();
    let attribute = entry.effective_attribute(info);
    let mut parts = vec![
        format!("{roll} (d20)"),
        format!("{} (1/2 nível)", signed(level.div_euclid(2))),
        format!(
            "{} ({})",
            signed(record.attributes.modifier(attribute)),
            attribute.abbreviation()
        ),
    ];
    let training = training_bonus(level, entry.trained);
    if training != 0 {
        parts.push(format!("{} (treino)", signed(training)));
    }
    if entry.others != 0 {
        parts.push(format!("{} (outros)", signed(entry.others)));
    }
    if entry.extra != 0 {
        parts.push(format!("{} (extra)", signed(entry.extra)));
    }
    let penalty = if info.armor_penalty {
        record.inventory.armor_penalty()
    } else {
        0
    };
    if penalty != 0 {
        parts.push(format!("-{penalty} (armadura)"));
    }

    Some(DiceRoll {
        die: Die::D20,
        roll,
        modifier,
        total,
        details: format!("{}: {} = {total}", info.name, parts.join(" ")),
    })
}

pub fn roll_custom<R: Rng + ?Sized>(die: Die, modifier: i64, rng: &mut R) -> DiceRoll {
    let roll = die.roll(rng);
    let total = roll.saturating_add(modifier);
    let details = if modifier == 0 {
        format!("{die}: {roll} ({die}) = {total}")
    } else {
        let modifier = signed(modifier);
        format!("{die}{modifier}: {roll} ({die}) {modifier} = {total}")
    };

    DiceRoll {
        die,
        roll,
        modifier,
        total,
        details,
    }
}
