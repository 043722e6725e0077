// /character/skills.rs
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::catalog::SkillInfo;
use crate::character::attributes::Attribute;
use crate::stats;
use crate::utils::lenient_int;

// Per-skill overrides. Skills without an entry use the catalog defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillEntry {
    #[serde(rename = "treinada", deserialize_with = "training_flag")]
    pub trained: bool,
    #[serde(rename = "outros", deserialize_with = "lenient_int")]
    pub others: i64,
    #[serde(rename = "bonusExtra", deserialize_with = "lenient_int")]
    pub extra: i64,
    #[serde(
        rename = "atributo",
        deserialize_with = "attribute_override",
        skip_serializing_if = "Option::is_none"
    )]
    pub attribute: Option<Attribute>,
}

impl SkillEntry {
    pub fn effective_attribute(&self, info: &SkillInfo) -> Attribute {
        self.attribute.unwrap_or(info.attribute)
    }
}

// `true`, or any string other than "destreinado", marks the skill as trained.
fn training_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(stats::is_trained(&value))
}

fn attribute_override<'de, D>(deserializer: D) -> Result<Option<Attribute>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(Attribute::from_value(&value))
}

pub type SkillMap = BTreeMap<String, SkillEntry>;
