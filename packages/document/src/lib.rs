//! # Pagesmith Document
//!
//! Block templates and the editable block document.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ registry: type id → BlockTemplate           │
//! │  - field schema, defaults, conditions       │
//! └─────────────────────────────────────────────┘
//!                     ↓ constrains
//! ┌─────────────────────────────────────────────┐
//! │ document: ordered BlockInstances            │
//! │  - one level of LeafBlock children          │
//! │  - mutations validated against templates    │
//! └─────────────────────────────────────────────┘
//!                     ↓ read by
//! ┌─────────────────────────────────────────────┐
//! │ resolver: effective values + visibility     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use pagesmith_document::{Document, TemplateRegistry};
//!
//! let registry = TemplateRegistry::builtin();
//! let mut doc = Document::new("home");
//!
//! let button = doc.add_block(registry, "button", None).unwrap();
//! doc.update_field(registry, button, "text", "Go").unwrap();
//! assert_eq!(doc.blocks.len(), 1);
//! ```

mod catalogue;
mod document;
mod mutations;
mod registry;
pub mod resolver;
mod template;
mod value;

pub use catalogue::spacing_fields;
pub use document::{
    default_data, BlockData, BlockInstance, BlockRef, Document, FieldMap, InstanceId, LeafBlock,
};
pub use mutations::{Mutation, MutationError, MutationOutcome, MutationResult};
pub use registry::{RegistryError, TemplateRegistry};
pub use resolver::{effective_value, is_visible, resolve_visible, visible_fields, ResolvedField};
pub use template::{BlockTemplate, Category, Condition, Field, FieldKind, SelectOption};
pub use value::{Dimension, FieldValue, Record, Unit};
