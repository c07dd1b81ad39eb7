//! # Property Form
//!
//! The form shown for the focused instance: one entry per visible field,
//! filled from the instance's stored values. Dimension fields are split
//! into an amount and a unit for editing and combined again on input.

use pagesmith_document::{
    is_visible, BlockTemplate, Dimension, Field, FieldKind, FieldMap, FieldValue, InstanceId,
    MutationError, Record, SelectOption, Unit,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyForm {
    pub instance_id: InstanceId,
    pub type_id: String,
    pub title: String,
    pub fields: Vec<FormField>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub value: FormValue,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub units: Vec<Unit>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub item_fields: Vec<String>,
    /// Changing this field shows or hides others
    pub controlling: bool,
}

/// A value as an input widget edits it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum FormValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Dimension { amount: String, unit: Option<Unit> },
    Items(Vec<Record>),
}

impl FormValue {
    fn from_field_value(field: &Field, value: &FieldValue) -> Self {
        match value.coerce(field).unwrap_or_else(|| value.clone()) {
            FieldValue::Text(s) => FormValue::Text(s),
            FieldValue::Number(n) => FormValue::Number(n),
            FieldValue::Bool(b) => FormValue::Bool(b),
            FieldValue::Dimension(Dimension::Auto) => FormValue::Dimension {
                amount: "auto".to_string(),
                unit: None,
            },
            FieldValue::Dimension(Dimension::Length(amount, unit)) => FormValue::Dimension {
                amount: amount.to_string(),
                unit: Some(unit),
            },
            FieldValue::RepeaterItems(items) => FormValue::Items(items),
        }
    }
}

/// A change coming from a form widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FieldInput {
    Value { value: FieldValue },
    /// Split amount/unit pair; `unit: None` means `auto`
    Dimension { amount: String, unit: Option<Unit> },
}

impl FieldInput {
    pub fn value(value: impl Into<FieldValue>) -> Self {
        FieldInput::Value {
            value: value.into(),
        }
    }

    pub fn dimension(amount: &str, unit: Option<Unit>) -> Self {
        FieldInput::Dimension {
            amount: amount.to_string(),
            unit,
        }
    }

    /// The single value to store. Dimension pairs are combined here so the
    /// document only ever sees `12px` or `auto`.
    pub fn into_value(self, field: &Field) -> Result<FieldValue, MutationError> {
        match self {
            FieldInput::Value { value } => Ok(value),
            FieldInput::Dimension { amount, unit } => Dimension::combine(&amount, unit)
                .map(FieldValue::Dimension)
                .ok_or_else(|| MutationError::InvalidValue {
                    field: field.name.clone(),
                    kind: field.kind,
                }),
        }
    }
}

impl PropertyForm {
    /// Rebuild from the template, applying visibility to the stored values
    pub fn build(instance_id: InstanceId, template: &BlockTemplate, data: &FieldMap) -> Self {
        let controlling = template.controlling_fields();

        let fields = template
            .fields
            .iter()
            .filter(|field| is_visible(template, data, field))
            .map(|field| FormField {
                name: field.name.clone(),
                label: field.label.clone(),
                kind: field.kind,
                value: FormValue::from_field_value(field, data.get(&field.name).unwrap_or(&field.default)),
                options: field.options.clone(),
                units: field.units.clone(),
                item_fields: field.item_fields.clone(),
                controlling: controlling.contains(&field.name.as_str()),
            })
            .collect();

        Self {
            instance_id,
            type_id: template.type_id.clone(),
            title: template.display_name.clone(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagesmith_document::{default_data, TemplateRegistry};

    #[test]
    fn test_form_shows_visible_fields_only() {
        let template = TemplateRegistry::builtin().resolve("button").unwrap();
        let mut data = default_data(template);

        let form = PropertyForm::build(InstanceId::fresh(), template, &data);
        assert!(form.field("padding_type").unwrap().controlling);
        assert!(form.field("padding_all").is_none());

        data.insert("padding_type".to_string(), FieldValue::from("all"));
        let form = PropertyForm::build(InstanceId::fresh(), template, &data);
        assert_eq!(
            form.field("padding_all").unwrap().value,
            FormValue::Dimension {
                amount: "16".to_string(),
                unit: Some(Unit::Px)
            }
        );
    }

    #[test]
    fn test_auto_dimension_has_no_unit() {
        let template = TemplateRegistry::builtin().resolve("image").unwrap();
        let form = PropertyForm::build(InstanceId::fresh(), template, &default_data(template));
        assert_eq!(
            form.field("width").unwrap().value,
            FormValue::Dimension {
                amount: "auto".to_string(),
                unit: None
            }
        );
    }

    #[test]
    fn test_dimension_input_is_combined() {
        let template = TemplateRegistry::builtin().resolve("spacer").unwrap();
        let height = template.field("height").unwrap();

        let value = FieldInput::dimension("2.5", Some(Unit::Rem)).into_value(height).unwrap();
        assert_eq!(value, FieldValue::Dimension(Dimension::Length(2.5, Unit::Rem)));

        let value = FieldInput::dimension("auto", None).into_value(height).unwrap();
        assert_eq!(value, FieldValue::Dimension(Dimension::Auto));

        let err = FieldInput::dimension("tall", Some(Unit::Px)).into_value(height).unwrap_err();
        assert!(matches!(err, MutationError::InvalidValue { .. }));
    }
}
