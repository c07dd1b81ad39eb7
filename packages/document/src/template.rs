//! # Block Templates
//!
//! Schema for one block type: its fields, their defaults, optional
//! visibility conditions, and whether the block accepts children.
//! Templates are pure data and immutable once registered.

use crate::value::{Dimension, FieldValue, Unit};
use serde::Serialize;

/// Input kind of a field; decides which [`FieldValue`] variant is legal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Textarea,
    Select,
    Checkbox,
    Number,
    Color,
    Dimension,
    Repeater,
}

/// Palette grouping; carries no meaning inside a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Content,
    FormField,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Content => "Content",
            Category::FormField => "Form fields",
        }
    }
}

/// A field is shown only while `on_field`'s effective value equals `equals`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub on_field: String,
    pub equals: FieldValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub default: FieldValue,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,

    /// Units offered by a dimension field; the first is used for bare numbers
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub units: Vec<Unit>,

    /// Record keys of a repeater field
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub item_fields: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

impl Field {
    fn new(name: &str, label: &str, kind: FieldKind, default: FieldValue) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            default,
            options: vec![],
            units: vec![],
            item_fields: vec![],
            condition: None,
        }
    }

    pub fn text(name: &str, label: &str, default: &str) -> Self {
        Self::new(name, label, FieldKind::Text, default.into())
    }

    pub fn textarea(name: &str, label: &str, default: &str) -> Self {
        Self::new(name, label, FieldKind::Textarea, default.into())
    }

    pub fn color(name: &str, label: &str, default: &str) -> Self {
        Self::new(name, label, FieldKind::Color, default.into())
    }

    pub fn number(name: &str, label: &str, default: f64) -> Self {
        Self::new(name, label, FieldKind::Number, default.into())
    }

    pub fn checkbox(name: &str, label: &str, default: bool) -> Self {
        Self::new(name, label, FieldKind::Checkbox, default.into())
    }

    pub fn select(name: &str, label: &str, options: &[(&str, &str)], default: &str) -> Self {
        let mut field = Self::new(name, label, FieldKind::Select, default.into());
        field.options = options
            .iter()
            .map(|(value, label)| SelectOption {
                value: value.to_string(),
                label: label.to_string(),
            })
            .collect();
        field
    }

    /// Dimension field offering px, em, rem and %
    pub fn dimension(name: &str, label: &str, default: &str) -> Self {
        let units = vec![Unit::Px, Unit::Em, Unit::Rem, Unit::Percent];
        let default = Dimension::parse(default, units.first().copied()).unwrap_or(Dimension::Auto);
        let mut field = Self::new(name, label, FieldKind::Dimension, default.into());
        field.units = units;
        field
    }

    pub fn repeater(name: &str, label: &str, item_fields: &[&str]) -> Self {
        let mut field = Self::new(name, label, FieldKind::Repeater, FieldValue::RepeaterItems(vec![]));
        field.item_fields = item_fields.iter().map(|s| s.to_string()).collect();
        field
    }

    /// Only show this field while `on_field` equals `equals`
    pub fn when(mut self, on_field: &str, equals: impl Into<FieldValue>) -> Self {
        self.condition = Some(Condition {
            on_field: on_field.to_string(),
            equals: equals.into(),
        });
        self
    }

    pub fn with_units(mut self, units: &[Unit]) -> Self {
        self.units = units.to_vec();
        self
    }

    pub fn default_unit(&self) -> Unit {
        self.units.first().copied().unwrap_or(Unit::Px)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockTemplate {
    pub type_id: String,
    pub display_name: String,
    pub category: Category,
    pub accepts_children: bool,
    pub fields: Vec<Field>,
}

impl BlockTemplate {
    pub fn new(type_id: &str, display_name: &str, category: Category) -> Self {
        Self {
            type_id: type_id.to_string(),
            display_name: display_name.to_string(),
            category,
            accepts_children: false,
            fields: vec![],
        }
    }

    pub fn container(mut self) -> Self {
        self.accepts_children = true;
        self
    }

    pub fn with_fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields whose value another field's condition depends on
    pub fn controlling_fields(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for field in &self.fields {
            if let Some(condition) = &field.condition {
                if self.field(&condition.on_field).is_some()
                    && !names.contains(&condition.on_field.as_str())
                {
                    names.push(condition.on_field.as_str());
                }
            }
        }
        names
    }

    pub fn is_controlling(&self, field_name: &str) -> bool {
        self.fields.iter().any(|f| {
            f.condition
                .as_ref()
                .map(|c| c.on_field == field_name)
                .unwrap_or(false)
        })
    }
}
