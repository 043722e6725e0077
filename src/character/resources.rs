// /character/resources.rs
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::utils::{generate_id, lenient_int, lenient_string, or_default};

pub const LIFE_COLOR: &str = "#ef4444";
pub const MANA_COLOR: &str = "#3b82f6";
pub const PRANA_COLOR: &str = "#eab308";
pub const EXTRA_COLOR: &str = "#8b5cf6";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourcePool {
    #[serde(rename = "atual", deserialize_with = "lenient_int")]
    pub current: i64,
    #[serde(rename = "maximo", deserialize_with = "lenient_int")]
    pub max: i64,
    #[serde(rename = "cor", deserialize_with = "lenient_string")]
    pub color: String,
}

impl Default for ResourcePool {
    fn default() -> Self {
        Self::with_color(EXTRA_COLOR)
    }
}

impl ResourcePool {
    pub fn with_color(color: &str) -> Self {
        Self {
            current: 0,
            max: 0,
            color: color.to_string(),
        }
    }

    // Fill level for bars; a pool without a maximum reads as empty.
    pub fn percentage(&self) -> f64 {
        if self.max > 0 {
            self.current as f64 / self.max as f64 * 100.0
        } else {
            0.0
        }
    }
}

// A user-defined pool next to life, mana and prana.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtraResource {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(rename = "nome", deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(flatten)]
    pub pool: ResourcePool,
}

impl Default for ExtraResource {
    fn default() -> Self {
        Self {
            id: generate_id(),
            name: "New Resource".to_string(),
            pool: ResourcePool::with_color(EXTRA_COLOR),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resources {
    #[serde(rename = "vida", deserialize_with = "life_pool")]
    pub life: ResourcePool,
    #[serde(deserialize_with = "mana_pool")]
    pub mana: ResourcePool,
    #[serde(deserialize_with = "prana_pool")]
    pub prana: ResourcePool,
    #[serde(rename = "recursos_extras", deserialize_with = "or_default")]
    pub extras: Vec<ExtraResource>,
}

// A fixed pool stored without a usable `cor` keeps its own color.
fn pool_with_color<'de, D>(deserializer: D, color: &str) -> Result<ResourcePool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let mut pool = ResourcePool::deserialize(&value).unwrap_or_default();
    match value.get("cor") {
        Some(Value::String(stored)) if !stored.is_empty() => {}
        _ => pool.color = color.to_string(),
    }
    Ok(pool)
}

fn life_pool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ResourcePool, D::Error> {
    pool_with_color(deserializer, LIFE_COLOR)
}

fn mana_pool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ResourcePool, D::Error> {
    pool_with_color(deserializer, MANA_COLOR)
}

fn prana_pool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ResourcePool, D::Error> {
    pool_with_color(deserializer, PRANA_COLOR)
}

impl Default for Resources {
    fn default() -> Self {
        Self {
            life: ResourcePool::with_color(LIFE_COLOR),
            mana: ResourcePool::with_color(MANA_COLOR),
            prana: ResourcePool::with_color(PRANA_COLOR),
            extras: Vec::new(),
        }
    }
}

impl Resources {
    pub fn add_extra(&mut self) -> &mut ExtraResource {
        self.extras.push(ExtraResource::default());
        let last = self.extras.len() - 1;
        &mut self.extras[last]
    }

    pub fn remove_extra(&mut self, id: &str) {
        self.extras.retain(|extra| extra.id != id);
    }

    pub fn extra(&self, id: &str) -> Option<&ExtraResource> {
        self.extras.iter().find(|extra| extra.id == id)
    }
}
