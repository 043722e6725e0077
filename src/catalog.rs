// Fixed skill table. Both the sheet totals and the dice roller read from here, so a skill's
// attribute or armor flag must only ever be changed in this one place.

use crate::character::{Attribute, SkillMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkillInfo {
    pub name: &'static str,
    pub attribute: Attribute,
    pub armor_penalty: bool,
    pub trained_only: bool,
}

const fn skill(name: &'static str, attribute: Attribute) -> SkillInfo {
    SkillInfo {
        name,
        attribute,
        armor_penalty: false,
        trained_only: false,
    }
}

const fn armored(info: SkillInfo) -> SkillInfo {
    SkillInfo {
        armor_penalty: true,
        ..info
    }
}

const fn trained(info: SkillInfo) -> SkillInfo {
    SkillInfo {
        trained_only: true,
        ..info
    }
}

use Attribute::{Charisma, Constitution, Dexterity, Intelligence, Strength, Wisdom};

pub const SKILLS: [SkillInfo; 29] = [
    armored(skill("Acrobacia", Dexterity)),
    trained(skill("Adestramento", Charisma)),
    skill("Atletismo", Strength),
    skill("Atuação", Charisma),
    skill("Cavalgar", Dexterity),
    trained(skill("Conhecimento", Intelligence)),
    skill("Cura", Wisdom),
    skill("Diplomacia", Charisma),
    skill("Enganação", Charisma),
    skill("Fortitude", Constitution),
    armored(skill("Furtividade", Dexterity)),
    trained(skill("Guerra", Intelligence)),
    skill("Iniciativa", Dexterity),
    skill("Intimidação", Charisma),
    skill("Intuição", Wisdom),
    skill("Investigação", Intelligence),
    trained(skill("Jogatina", Charisma)),
    armored(trained(skill("Ladinagem", Dexterity))),
    skill("Luta", Strength),
    trained(skill("Misticismo", Intelligence)),
    trained(skill("Nobreza", Intelligence)),
    trained(skill("Ofício", Intelligence)),
    skill("Percepção", Wisdom),
    trained(skill("Pilotagem", Dexterity)),
    skill("Pontaria", Dexterity),
    skill("Reflexos", Dexterity),
    trained(skill("Religião", Wisdom)),
    skill("Sobrevivência", Wisdom),
    skill("Vontade", Wisdom),
];

pub fn find(name: &str) -> Option<&'static SkillInfo> {
    SKILLS.iter().find(|info| info.name == name)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrainingFilter {
    #[default]
    All,
    Trained,
    Untrained,
}

#[derive(Debug, Clone, Default)]
pub struct SkillFilter {
    pub name: String,
    pub attribute: Option<Attribute>,
    pub training: TrainingFilter,
}

impl SkillFilter {
    pub fn is_active(&self) -> bool {
        !self.name.is_empty() || self.attribute.is_some() || self.training != TrainingFilter::All
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    // Attribute matching uses the skill's override when the sheet has one.
    pub fn matches(&self, info: &SkillInfo, skills: &SkillMap) -> bool {
        let entry = skills.get(info.name);

        if !self.name.is_empty() && !info.name.to_lowercase().contains(&self.name.to_lowercase()) {
            return false;
        }

        if let Some(attribute) = self.attribute {
            let effective = entry.and_then(|e| e.attribute).unwrap_or(info.attribute);
            if effective != attribute {
                return false;
            }
        }

        let trained = entry.is_some_and(|e| e.trained);
        match self.training {
            TrainingFilter::All => true,
            TrainingFilter::Trained => trained,
            TrainingFilter::Untrained => !trained,
        }
    }

    pub fn apply(&self, skills: &SkillMap) -> Vec<&'static SkillInfo> {
        SKILLS
            .iter()
            .filter(|info| self.matches(info, skills))
            .collect()
    }
}
