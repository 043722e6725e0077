// Lenient number handling shared by the data model and the form-input helpers.
//
// Sheets come from hand-edited JSON, older exports and text inputs. Nothing in here ever fails:
// anything that cannot be read as a number collapses to a documented default.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use uuid::Uuid;

pub const ID_PREFIX: &str = "t20_";

// Opaque, storage-key-safe identifier for sheets and list entries.
pub fn generate_id() -> String {
    format!("{}{}", ID_PREFIX, Uuid::new_v4().simple())
}

/// Reads the leading integer of `input`, ignoring whatever follows it ("12abc" is 12).
pub fn parse_int_prefix(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let mut end = 0;
    for (index, c) in trimmed.char_indices() {
        let sign = index == 0 && (c == '-' || c == '+');
        if c.is_ascii_digit() || sign {
            end = index + c.len_utf8();
        } else {
            break;
        }
    }
    trimmed[..end].parse().ok()
}

/// Reads the leading decimal number of `input` ("1.5kg" is 1.5).
pub fn parse_float_prefix(input: &str) -> Option<f64> {
    let trimmed = input.trim_start();
    let mut end = 0;
    let mut seen_dot = false;
    for (index, c) in trimmed.char_indices() {
        let accepted = match c {
            '0'..='9' => true,
            '-' | '+' => index == 0,
            '.' if !seen_dot => {
                seen_dot = true;
                true
            }
            _ => false,
        };
        if !accepted {
            break;
        }
        end = index + c.len_utf8();
    }
    trimmed[..end].parse().ok().filter(|value: &f64| value.is_finite())
}

pub fn int_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(text) => parse_int_prefix(text),
        _ => None,
    }
}

pub fn float_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => parse_float_prefix(text),
        _ => None,
    }
}

// region:  --- Form input parsing

pub fn parse_bonus(input: &str) -> i64 {
    parse_int_prefix(input).unwrap_or(0)
}

pub fn parse_weight(input: &str) -> f64 {
    parse_float_prefix(input).unwrap_or(0.0)
}

pub fn parse_money(input: &str) -> i64 {
    parse_int_prefix(input).unwrap_or(0)
}

// The following treat zero like garbage: an empty or zero field falls back to the default.

pub fn parse_class_level(input: &str) -> i64 {
    non_zero_or(parse_int_prefix(input), 1)
}

pub fn parse_attribute_score(input: &str) -> i64 {
    non_zero_or(parse_int_prefix(input), 10)
}

pub fn parse_movement(input: &str) -> i64 {
    non_zero_or(parse_int_prefix(input), 9)
}

pub fn parse_quantity(input: &str) -> i64 {
    non_zero_or(parse_int_prefix(input), 1)
}

fn non_zero_or(value: Option<i64>, default: i64) -> i64 {
    value.filter(|v| *v != 0).unwrap_or(default)
}

// endregion:  --- Form input parsing

// region:  --- Serde helpers

/// Falls back to `T::default()` when the stored value has the wrong shape.
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

pub fn lenient_int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(int_from_value(&value).unwrap_or(0))
}

pub fn lenient_attribute_score<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(int_from_value(&value).unwrap_or(10))
}

pub fn lenient_movement<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(int_from_value(&value).unwrap_or(9))
}

pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(float_from_value(&value).unwrap_or(0.0))
}

pub fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(matches!(value, Value::Bool(true)))
}

pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(text) => text,
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => String::new(),
    })
}

// Patch fields: a present value is always read, falling back to the field's default.

pub fn lenient_opt_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(Some(int_from_value(&value).unwrap_or(0)))
}

pub fn lenient_opt_level<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(Some(int_from_value(&value).unwrap_or(1)))
}

pub fn lenient_opt_movement<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(Some(int_from_value(&value).unwrap_or(9)))
}

pub fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_string(deserializer).map(Some)
}

// endregion:  --- Serde helpers
