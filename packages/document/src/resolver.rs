//! # Field Resolver
//!
//! Effective values (stored value, else template default) and conditional
//! visibility. Hidden values stay in the data map untouched; they are only
//! left out of property forms and generated output.

use crate::document::FieldMap;
use crate::template::{BlockTemplate, Field};
use crate::value::FieldValue;

/// A visible field together with the value it should show
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedField<'t> {
    pub field: &'t Field,
    pub value: FieldValue,
}

/// Stored value if present, otherwise the template default.
///
/// `None` when the template has no field of that name.
pub fn effective_value<'a>(
    template: &'a BlockTemplate,
    data: &'a FieldMap,
    field_name: &str,
) -> Option<&'a FieldValue> {
    let field = template.field(field_name)?;
    Some(data.get(field_name).unwrap_or(&field.default))
}

/// A field is visible when it has no condition, or when the controlling
/// sibling's effective value equals the condition. A condition naming a
/// field the template does not have is never satisfied.
pub fn is_visible(template: &BlockTemplate, data: &FieldMap, field: &Field) -> bool {
    match &field.condition {
        None => true,
        Some(condition) => effective_value(template, data, &condition.on_field)
            .map(|value| value.loosely_eq(&condition.equals))
            .unwrap_or(false),
    }
}

pub fn visible_fields<'t>(
    template: &'t BlockTemplate,
    data: &'t FieldMap,
) -> impl Iterator<Item = &'t Field> + 't {
    template
        .fields
        .iter()
        .filter(move |field| is_visible(template, data, field))
}

/// Effective values of every visible field, in template order
pub fn resolve_visible<'t>(template: &'t BlockTemplate, data: &FieldMap) -> Vec<ResolvedField<'t>> {
    template
        .fields
        .iter()
        .filter(|field| is_visible(template, data, field))
        .map(|field| ResolvedField {
            field,
            value: data.get(&field.name).unwrap_or(&field.default).clone(),
        })
        .collect()
}
