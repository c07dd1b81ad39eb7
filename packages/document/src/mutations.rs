//! # Document Mutations
//!
//! The four structural operations on a block document, plus element
//! styles.
//!
//! ## Semantics
//!
//! ### AddBlock
//! - Appends a new instance with every field at its template default
//! - `parent_id` must name a top-level instance whose template accepts
//!   children; a nested instance is never a valid parent
//!
//! ### UpdateField
//! - Atomic replacement of one stored value, coerced to the field's kind
//! - Unknown data keys are preserved but cannot be edited
//!
//! ### MoveBlock
//! - Reorders top-level blocks only; moving into or out of a container
//!   is done with remove + add
//!
//! ### RemoveBlock
//! - Removes the instance and, for containers, all of its children
//!
//! A failed mutation leaves the document untouched.

use crate::document::{BlockInstance, Document, InstanceId, LeafBlock};
use crate::registry::{RegistryError, TemplateRegistry};
use crate::template::FieldKind;
use crate::value::FieldValue;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Mutation {
    #[serde(rename_all = "camelCase")]
    AddBlock {
        type_id: String,
        parent_id: Option<InstanceId>,
    },

    #[serde(rename_all = "camelCase")]
    UpdateField {
        instance_id: InstanceId,
        field: String,
        value: FieldValue,
    },

    /// Move before `before`, or to the end when `before` is `None`
    #[serde(rename_all = "camelCase")]
    MoveBlock {
        instance_id: InstanceId,
        before: Option<InstanceId>,
    },

    #[serde(rename_all = "camelCase")]
    RemoveBlock { instance_id: InstanceId },

    /// `None` clears the style
    SetElementStyle { name: String, value: Option<String> },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Unknown block type: {0}")]
    UnknownType(String),

    #[error("Unknown instance: {0}")]
    UnknownInstance(InstanceId),

    #[error("Unknown field '{field}' on {type_id}")]
    UnknownField { type_id: String, field: String },

    #[error("{0} does not accept children")]
    NotAContainer(InstanceId),

    #[error("{0} is nested inside a container and cannot be reordered")]
    NotTopLevel(InstanceId),

    #[error("Value for '{field}' is not a valid {kind:?}")]
    InvalidValue { field: String, kind: FieldKind },
}

impl From<RegistryError> for MutationError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::UnknownType(t) | RegistryError::DuplicateType(t) => {
                MutationError::UnknownType(t)
            }
        }
    }
}

/// What an applied mutation changed
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    Added(InstanceId),
    Updated {
        /// The field drives another field's visibility
        controlling: bool,
    },
    Moved,
    Removed {
        removed: Vec<InstanceId>,
        document_empty: bool,
    },
    StyleSet,
}

/// Result of applying a mutation
#[derive(Debug, Clone, PartialEq)]
pub struct MutationResult {
    /// New document version
    pub version: u64,
    pub outcome: MutationOutcome,
}

impl Mutation {
    /// Apply mutation to the document with validation
    pub fn apply(
        &self,
        doc: &mut Document,
        registry: &TemplateRegistry,
    ) -> Result<MutationOutcome, MutationError> {
        self.validate(doc, registry)?;

        match self {
            Mutation::AddBlock { type_id, parent_id } => {
                Self::apply_add(doc, registry, type_id, *parent_id).map(MutationOutcome::Added)
            }

            Mutation::UpdateField {
                instance_id,
                field,
                value,
            } => Self::apply_update(doc, registry, *instance_id, field, value),

            Mutation::MoveBlock {
                instance_id,
                before,
            } => Self::apply_move(doc, *instance_id, *before),

            Mutation::RemoveBlock { instance_id } => Ok(Self::apply_remove(doc, *instance_id)),

            Mutation::SetElementStyle { name, value } => {
                match value {
                    Some(value) => doc.element_styles.insert(name.clone(), value.clone()),
                    None => doc.element_styles.remove(name),
                };
                Ok(MutationOutcome::StyleSet)
            }
        }
    }

    /// Validate without applying
    pub fn validate(&self, doc: &Document, registry: &TemplateRegistry) -> Result<(), MutationError> {
        match self {
            Mutation::AddBlock { type_id, parent_id } => {
                registry.resolve(type_id)?;

                if let Some(parent_id) = parent_id {
                    let parent = doc
                        .find(*parent_id)
                        .ok_or(MutationError::UnknownInstance(*parent_id))?;

                    if parent.is_nested() {
                        return Err(MutationError::NotAContainer(*parent_id));
                    }

                    let parent_template = registry.resolve(parent.type_id())?;
                    if !parent_template.accepts_children {
                        return Err(MutationError::NotAContainer(*parent_id));
                    }
                }

                Ok(())
            }

            Mutation::UpdateField {
                instance_id,
                field,
                value,
            } => {
                let block = doc
                    .find(*instance_id)
                    .ok_or(MutationError::UnknownInstance(*instance_id))?;
                let template = registry.resolve(block.type_id())?;

                let field_def = template.field(field).ok_or_else(|| MutationError::UnknownField {
                    type_id: template.type_id.clone(),
                    field: field.clone(),
                })?;

                value
                    .coerce(field_def)
                    .map(|_| ())
                    .ok_or_else(|| MutationError::InvalidValue {
                        field: field.clone(),
                        kind: field_def.kind,
                    })
            }

            Mutation::MoveBlock {
                instance_id,
                before,
            } => {
                Self::require_top_level(doc, *instance_id)?;
                if let Some(before) = before {
                    Self::require_top_level(doc, *before)?;
                }
                Ok(())
            }

            Mutation::RemoveBlock { instance_id } => {
                doc.find(*instance_id)
                    .ok_or(MutationError::UnknownInstance(*instance_id))?;
                Ok(())
            }

            Mutation::SetElementStyle { .. } => Ok(()),
        }
    }

    fn require_top_level(doc: &Document, id: InstanceId) -> Result<(), MutationError> {
        match doc.find(id) {
            None => Err(MutationError::UnknownInstance(id)),
            Some(found) if found.is_nested() => Err(MutationError::NotTopLevel(id)),
            Some(_) => Ok(()),
        }
    }

    fn apply_add(
        doc: &mut Document,
        registry: &TemplateRegistry,
        type_id: &str,
        parent_id: Option<InstanceId>,
    ) -> Result<InstanceId, MutationError> {
        let template = registry.resolve(type_id)?;

        match parent_id {
            None => {
                let block = BlockInstance::from_template(template);
                let id = block.id;
                doc.blocks.push(block);
                Ok(id)
            }
            Some(parent_id) => {
                let parent = doc
                    .top_level_mut(parent_id)
                    .ok_or(MutationError::NotAContainer(parent_id))?;

                // A container placed as a child is a plain leaf
                let child = LeafBlock::new(type_id, crate::document::default_data(template));
                let id = child.id;
                parent.children.get_or_insert_with(Vec::new).push(child);
                Ok(id)
            }
        }
    }

    fn apply_update(
        doc: &mut Document,
        registry: &TemplateRegistry,
        instance_id: InstanceId,
        field: &str,
        value: &FieldValue,
    ) -> Result<MutationOutcome, MutationError> {
        let (type_id, data) = doc
            .data_mut(instance_id)
            .ok_or(MutationError::UnknownInstance(instance_id))?;
        let template = registry.resolve(type_id)?;
        let field_def = template.field(field).ok_or_else(|| MutationError::UnknownField {
            type_id: template.type_id.clone(),
            field: field.to_string(),
        })?;

        let coerced = value.coerce(field_def).ok_or_else(|| MutationError::InvalidValue {
            field: field.to_string(),
            kind: field_def.kind,
        })?;

        data.insert(field.to_string(), coerced);

        Ok(MutationOutcome::Updated {
            controlling: template.is_controlling(field),
        })
    }

    fn apply_move(
        doc: &mut Document,
        instance_id: InstanceId,
        before: Option<InstanceId>,
    ) -> Result<MutationOutcome, MutationError> {
        if before == Some(instance_id) {
            return Ok(MutationOutcome::Moved);
        }

        let from = doc
            .top_level_index(instance_id)
            .ok_or(MutationError::NotTopLevel(instance_id))?;
        let block = doc.blocks.remove(from);

        let to = match before {
            Some(before) => match doc.top_level_index(before) {
                Some(index) => index,
                None => {
                    doc.blocks.insert(from, block);
                    return Err(MutationError::UnknownInstance(before));
                }
            },
            None => doc.blocks.len(),
        };

        doc.blocks.insert(to, block);
        Ok(MutationOutcome::Moved)
    }

    fn apply_remove(doc: &mut Document, instance_id: InstanceId) -> MutationOutcome {
        let mut removed = vec![];

        if let Some(index) = doc.top_level_index(instance_id) {
            let block = doc.blocks.remove(index);
            removed.push(block.id);
            removed.extend(block.children().iter().map(|c| c.id));
        } else {
            for block in &mut doc.blocks {
                if let Some(children) = &mut block.children {
                    if let Some(position) = children.iter().position(|c| c.id == instance_id) {
                        removed.push(children.remove(position).id);
                        break;
                    }
                }
            }
        }

        MutationOutcome::Removed {
            removed,
            document_empty: doc.blocks.is_empty(),
        }
    }
}

impl Document {
    /// Apply a mutation; the version advances only on success
    pub fn apply(
        &mut self,
        registry: &TemplateRegistry,
        mutation: &Mutation,
    ) -> Result<MutationResult, MutationError> {
        let outcome = mutation.apply(self, registry)?;
        self.version += 1;

        Ok(MutationResult {
            version: self.version,
            outcome,
        })
    }

    pub fn add_block(
        &mut self,
        registry: &TemplateRegistry,
        type_id: &str,
        parent_id: Option<InstanceId>,
    ) -> Result<InstanceId, MutationError> {
        let mutation = Mutation::AddBlock {
            type_id: type_id.to_string(),
            parent_id,
        };
        mutation.validate(self, registry)?;

        let id = Mutation::apply_add(self, registry, type_id, parent_id)?;
        self.version += 1;
        Ok(id)
    }

    pub fn update_field(
        &mut self,
        registry: &TemplateRegistry,
        instance_id: InstanceId,
        field: &str,
        value: impl Into<FieldValue>,
    ) -> Result<MutationResult, MutationError> {
        self.apply(
            registry,
            &Mutation::UpdateField {
                instance_id,
                field: field.to_string(),
                value: value.into(),
            },
        )
    }

    pub fn move_block(
        &mut self,
        registry: &TemplateRegistry,
        instance_id: InstanceId,
        before: Option<InstanceId>,
    ) -> Result<MutationResult, MutationError> {
        self.apply(registry, &Mutation::MoveBlock { instance_id, before })
    }

    pub fn remove_block(
        &mut self,
        registry: &TemplateRegistry,
        instance_id: InstanceId,
    ) -> Result<MutationResult, MutationError> {
        self.apply(registry, &Mutation::RemoveBlock { instance_id })
    }
}
