//! # Field Values
//!
//! Typed values stored in a block's data map.
//!
//! The template's field kind decides which variant is legal:
//!
//! ```text
//! text | textarea | select | color  → Text
//! number                            → Number
//! checkbox                          → Bool
//! dimension                         → Dimension ("12px", "1.5rem", "auto")
//! repeater                          → RepeaterItems (flat records)
//! ```
//!
//! Values arriving from a snapshot or from the client are loosely typed
//! JSON. [`FieldValue::coerce`] turns them into the legal variant.

use crate::template::{Field, FieldKind};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// One row of a repeater field
pub type Record = BTreeMap<String, String>;

/// CSS length units accepted by dimension fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Px,
    Em,
    Rem,
    #[serde(rename = "%")]
    Percent,
    Vh,
    Vw,
}

impl Unit {
    pub const ALL: [Unit; 6] = [Unit::Px, Unit::Em, Unit::Rem, Unit::Percent, Unit::Vh, Unit::Vw];

    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Px => "px",
            Unit::Em => "em",
            Unit::Rem => "rem",
            Unit::Percent => "%",
            Unit::Vh => "vh",
            Unit::Vw => "vw",
        }
    }

    pub fn parse(s: &str) -> Option<Unit> {
        Unit::ALL
            .iter()
            .copied()
            .find(|unit| unit.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

/// A dimension is always stored combined: `value + unit`, or `auto`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dimension {
    Auto,
    Length(f64, Unit),
}

impl Dimension {
    /// Parse a combined dimension string.
    ///
    /// A bare number takes `default_unit`; without one it is rejected.
    pub fn parse(input: &str, default_unit: Option<Unit>) -> Option<Self> {
        let input = input.trim();
        if input.eq_ignore_ascii_case("auto") {
            return Some(Dimension::Auto);
        }

        let split = input
            .char_indices()
            .find(|(i, c)| !(c.is_ascii_digit() || *c == '.' || (*i == 0 && (*c == '-' || *c == '+'))))
            .map(|(i, _)| i)
            .unwrap_or(input.len());

        let (amount, unit) = input.split_at(split);
        let amount: f64 = amount.parse().ok()?;
        if !amount.is_finite() {
            return None;
        }

        let unit = if unit.trim().is_empty() {
            default_unit?
        } else {
            Unit::parse(unit)?
        };

        Some(Dimension::Length(amount, unit))
    }

    /// Combine the split `amount` / `unit` pair a property form edits.
    pub fn combine(amount: &str, unit: Option<Unit>) -> Option<Self> {
        match unit {
            None => Dimension::parse(amount, None).filter(|d| *d == Dimension::Auto),
            Some(unit) => {
                let amount: f64 = amount.trim().parse().ok()?;
                amount.is_finite().then_some(Dimension::Length(amount, unit))
            }
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Auto => write!(f, "auto"),
            Dimension::Length(amount, unit) => write!(f, "{}{}", amount, unit.as_str()),
        }
    }
}

/// A value stored under a field name in a block's data map
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Dimension(Dimension),
    RepeaterItems(Vec<Record>),
}

impl FieldValue {
    /// Convert into the variant `field.kind` allows.
    ///
    /// Returns `None` when the value has no sensible reading for that kind.
    pub fn coerce(&self, field: &Field) -> Option<FieldValue> {
        match field.kind {
            FieldKind::Text | FieldKind::Textarea | FieldKind::Select | FieldKind::Color => {
                match self {
                    FieldValue::RepeaterItems(_) => None,
                    other => Some(FieldValue::Text(other.to_display_string())),
                }
            }

            FieldKind::Number => match self {
                FieldValue::Number(n) => Some(FieldValue::Number(*n)),
                FieldValue::Text(s) => s
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .map(FieldValue::Number),
                FieldValue::Bool(b) => Some(FieldValue::Number(if *b { 1.0 } else { 0.0 })),
                _ => None,
            },

            FieldKind::Checkbox => match self {
                FieldValue::Bool(b) => Some(FieldValue::Bool(*b)),
                FieldValue::Number(n) => Some(FieldValue::Bool(*n != 0.0)),
                FieldValue::Text(s) => parse_flag(s).map(FieldValue::Bool),
                _ => None,
            },

            FieldKind::Dimension => match self {
                FieldValue::Dimension(d) => Some(FieldValue::Dimension(*d)),
                FieldValue::Number(n) => Some(FieldValue::Dimension(Dimension::Length(
                    *n,
                    field.default_unit(),
                ))),
                FieldValue::Text(s) => {
                    Dimension::parse(s, Some(field.default_unit())).map(FieldValue::Dimension)
                }
                _ => None,
            },

            FieldKind::Repeater => match self {
                FieldValue::RepeaterItems(items) => Some(FieldValue::RepeaterItems(items.clone())),
                // Legacy encoding: the array was stored as a JSON string
                FieldValue::Text(s) if s.trim().is_empty() => Some(FieldValue::RepeaterItems(vec![])),
                FieldValue::Text(s) => serde_json::from_str::<serde_json::Value>(s)
                    .ok()
                    .and_then(|json| records_from_json(&json))
                    .map(FieldValue::RepeaterItems),
                _ => None,
            },
        }
    }

    /// Plain string form used by renderers, previews and loose comparison
    pub fn to_display_string(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Dimension(d) => d.to_string(),
            FieldValue::RepeaterItems(items) => {
                serde_json::to_string(items).unwrap_or_default()
            }
        }
    }

    /// Equality used by visibility conditions.
    ///
    /// Same-variant values compare directly; mixed variants compare by
    /// their display strings so `Text("all")` still matches a condition
    /// declared against a select's value.
    pub fn loosely_eq(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (FieldValue::Bool(a), FieldValue::Text(b)) | (FieldValue::Text(b), FieldValue::Bool(a)) => {
                parse_flag(b) == Some(*a)
            }
            (a, b) if std::mem::discriminant(a) == std::mem::discriminant(b) => a == b,
            (a, b) => a.to_display_string() == b.to_display_string(),
        }
    }

    pub fn as_bool(&self) -> bool {
        match self {
            FieldValue::Bool(b) => *b,
            FieldValue::Number(n) => *n != 0.0,
            FieldValue::Text(s) => parse_flag(s).unwrap_or(false),
            FieldValue::Dimension(_) => true,
            FieldValue::RepeaterItems(items) => !items.is_empty(),
        }
    }

    pub fn as_items(&self) -> &[Record] {
        match self {
            FieldValue::RepeaterItems(items) => items,
            _ => &[],
        }
    }

    /// Read an untyped JSON value
    pub fn from_json(json: serde_json::Value) -> FieldValue {
        use serde_json::Value;

        match json {
            Value::Null => FieldValue::Text(String::new()),
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Number(n) => FieldValue::Number(n.as_f64().unwrap_or_default()),
            Value::String(s) => FieldValue::Text(s),
            Value::Array(_) => {
                FieldValue::RepeaterItems(records_from_json(&json).unwrap_or_default())
            }
            Value::Object(_) => FieldValue::Text(json.to_string()),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;

        match self {
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Dimension(d) => Value::String(d.to_string()),
            FieldValue::RepeaterItems(items) => Value::Array(
                items
                    .iter()
                    .map(|record| {
                        Value::Object(
                            record
                                .iter()
                                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                                .collect(),
                        )
                    })
                    .collect(),
            ),
        }
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "" | "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

/// Flatten a JSON array of objects into records; nested values are stringified
fn records_from_json(json: &serde_json::Value) -> Option<Vec<Record>> {
    let items = json.as_array()?;
    let mut records = Vec::with_capacity(items.len());

    for item in items {
        let object = item.as_object()?;
        let record = object
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    serde_json::Value::String(s) => s.clone(),
                    serde_json::Value::Null => String::new(),
                    other => other.to_string(),
                };
                (key.clone(), value)
            })
            .collect();
        records.push(record);
    }

    Some(records)
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(FieldValue::from_json)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<Dimension> for FieldValue {
    fn from(d: Dimension) -> Self {
        FieldValue::Dimension(d)
    }
}

impl From<Vec<Record>> for FieldValue {
    fn from(items: Vec<Record>) -> Self {
        FieldValue::RepeaterItems(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::Field;

    #[test]
    fn test_dimension_parse() {
        assert_eq!(Dimension::parse("auto", None), Some(Dimension::Auto));
        assert_eq!(
            Dimension::parse("12px", None),
            Some(Dimension::Length(12.0, Unit::Px))
        );
        assert_eq!(
            Dimension::parse("1.5rem", None),
            Some(Dimension::Length(1.5, Unit::Rem))
        );
        assert_eq!(
            Dimension::parse("50%", None),
            Some(Dimension::Length(50.0, Unit::Percent))
        );
        assert_eq!(
            Dimension::parse("-4px", None),
            Some(Dimension::Length(-4.0, Unit::Px))
        );
        assert_eq!(Dimension::parse("8", None), None);
        assert_eq!(
            Dimension::parse("8", Some(Unit::Em)),
            Some(Dimension::Length(8.0, Unit::Em))
        );
        assert_eq!(Dimension::parse("wide", Some(Unit::Px)), None);
        assert_eq!(Dimension::parse("4furlongs", None), None);
    }

    #[test]
    fn test_dimension_display_is_combined() {
        assert_eq!(Dimension::Length(4.0, Unit::Px).to_string(), "4px");
        assert_eq!(Dimension::Length(1.5, Unit::Rem).to_string(), "1.5rem");
        assert_eq!(Dimension::Length(100.0, Unit::Percent).to_string(), "100%");
        assert_eq!(Dimension::Auto.to_string(), "auto");
    }

    #[test]
    fn test_dimension_combine() {
        assert_eq!(
            Dimension::combine("4", Some(Unit::Px)),
            Some(Dimension::Length(4.0, Unit::Px))
        );
        assert_eq!(Dimension::combine("auto", None), Some(Dimension::Auto));
        assert_eq!(Dimension::combine("4", None), None);
        assert_eq!(Dimension::combine("x", Some(Unit::Px)), None);
    }

    #[test]
    fn test_dimension_serializes_as_single_string() {
        let value = FieldValue::Dimension(Dimension::Length(4.0, Unit::Px));
        assert_eq!(serde_json::to_string(&value).unwrap(), r#""4px""#);
    }

    #[test]
    fn test_checkbox_coercion() {
        let field = Field::checkbox("new_tab", "Open in new tab", false);
        assert_eq!(
            FieldValue::from("1").coerce(&field),
            Some(FieldValue::Bool(true))
        );
        assert_eq!(
            FieldValue::from("off").coerce(&field),
            Some(FieldValue::Bool(false))
        );
        assert_eq!(
            FieldValue::Number(0.0).coerce(&field),
            Some(FieldValue::Bool(false))
        );
        assert_eq!(FieldValue::from("maybe").coerce(&field), None);
    }

    #[test]
    fn test_number_coercion() {
        let field = Field::number("rows", "Rows", 4.0);
        assert_eq!(
            FieldValue::from(" 12 ").coerce(&field),
            Some(FieldValue::Number(12.0))
        );
        assert_eq!(FieldValue::from("twelve").coerce(&field), None);
    }

    #[test]
    fn test_dimension_coercion_uses_first_unit() {
        let field = Field::dimension("gap", "Gap", "16px");
        assert_eq!(
            FieldValue::Number(8.0).coerce(&field),
            Some(FieldValue::Dimension(Dimension::Length(8.0, Unit::Px)))
        );
        assert_eq!(
            FieldValue::from("2em").coerce(&field),
            Some(FieldValue::Dimension(Dimension::Length(2.0, Unit::Em)))
        );
    }

    #[test]
    fn test_legacy_repeater_string_is_decoded() {
        let field = Field::repeater("items", "Items", &["label", "url"]);
        let legacy = FieldValue::from(r#"[{"label":"Home","url":"/"},{"label":"About","url":"/about"}]"#);

        let coerced = legacy.coerce(&field).unwrap();
        let items = coerced.as_items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].get("url").map(String::as_str), Some("/about"));

        // Always written back as an array
        let json = serde_json::to_value(&coerced).unwrap();
        assert!(json.is_array());
    }

    #[test]
    fn test_repeater_numbers_are_flattened_to_strings() {
        let json = serde_json::json!([{ "label": "One", "order": 1 }]);
        let value = FieldValue::from_json(json);
        assert_eq!(
            value.as_items()[0].get("order").map(String::as_str),
            Some("1")
        );
    }

    #[test]
    fn test_loose_equality() {
        assert!(FieldValue::from("all").loosely_eq(&FieldValue::from("all")));
        assert!(!FieldValue::from("none").loosely_eq(&FieldValue::from("all")));
        assert!(FieldValue::Bool(true).loosely_eq(&FieldValue::from("1")));
        assert!(FieldValue::Number(2.0).loosely_eq(&FieldValue::from("2")));
    }
}
