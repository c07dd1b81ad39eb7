//! # Block Document
//!
//! The editable tree for one slot: an ordered list of block instances.
//! Instances of container templates hold exactly one more level of
//! children. Children are [`LeafBlock`]s, which have no `children` field at
//! all, so deeper nesting cannot be represented.
//!
//! ```text
//! Document (slot "header")
//!  ├─ BlockInstance container ── LeafBlock heading
//!  │                          └─ LeafBlock menu
//!  └─ BlockInstance button
//! ```
//!
//! Instance ids are process-local and only identify blocks inside an
//! editing session. They are never written into a snapshot; loading a
//! snapshot assigns fresh ids.

use crate::registry::TemplateRegistry;
use crate::template::BlockTemplate;
use crate::value::FieldValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

pub type FieldMap = BTreeMap<String, FieldValue>;

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// Editor identity of a placed block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(u64);

impl InstanceId {
    /// Next id from the process-wide monotonic counter
    pub fn fresh() -> Self {
        InstanceId(NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block-{}", self.0)
    }
}

/// Read access shared by top-level blocks and children
pub trait BlockData {
    fn id(&self) -> InstanceId;
    fn type_id(&self) -> &str;
    fn data(&self) -> &FieldMap;
}

/// A child of a container; never has children of its own
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeafBlock {
    #[serde(skip, default = "InstanceId::fresh")]
    pub id: InstanceId,
    pub type_id: String,
    #[serde(default)]
    pub data: FieldMap,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockInstance {
    #[serde(skip, default = "InstanceId::fresh")]
    pub id: InstanceId,
    pub type_id: String,
    #[serde(default)]
    pub data: FieldMap,
    /// Present only for templates that accept children
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<LeafBlock>>,
}

impl LeafBlock {
    pub fn new(type_id: &str, data: FieldMap) -> Self {
        Self {
            id: InstanceId::fresh(),
            type_id: type_id.to_string(),
            data,
        }
    }

    fn content_eq(&self, other: &LeafBlock) -> bool {
        self.type_id == other.type_id && self.data == other.data
    }
}

impl BlockInstance {
    pub fn new(type_id: &str, data: FieldMap) -> Self {
        Self {
            id: InstanceId::fresh(),
            type_id: type_id.to_string(),
            data,
            children: None,
        }
    }

    /// Instance with every field set to its template default
    pub fn from_template(template: &BlockTemplate) -> Self {
        let mut block = Self::new(&template.type_id, default_data(template));
        if template.accepts_children {
            block.children = Some(Vec::new());
        }
        block
    }

    pub fn with_children(mut self, children: Vec<LeafBlock>) -> Self {
        self.children = Some(children);
        self
    }

    pub fn children(&self) -> &[LeafBlock] {
        self.children.as_deref().unwrap_or(&[])
    }

    fn content_eq(&self, other: &BlockInstance) -> bool {
        self.type_id == other.type_id
            && self.data == other.data
            && self.children().len() == other.children().len()
            && self
                .children()
                .iter()
                .zip(other.children())
                .all(|(a, b)| a.content_eq(b))
    }
}

impl BlockData for BlockInstance {
    fn id(&self) -> InstanceId {
        self.id
    }

    fn type_id(&self) -> &str {
        &self.type_id
    }

    fn data(&self) -> &FieldMap {
        &self.data
    }
}

impl BlockData for LeafBlock {
    fn id(&self) -> InstanceId {
        self.id
    }

    fn type_id(&self) -> &str {
        &self.type_id
    }

    fn data(&self) -> &FieldMap {
        &self.data
    }
}

pub fn default_data(template: &BlockTemplate) -> FieldMap {
    template
        .fields
        .iter()
        .map(|field| (field.name.clone(), field.default.clone()))
        .collect()
}

/// Where a block sits in the tree
#[derive(Debug, Clone, Copy)]
pub enum BlockRef<'a> {
    TopLevel {
        index: usize,
        block: &'a BlockInstance,
    },
    Child {
        parent: &'a BlockInstance,
        index: usize,
        block: &'a LeafBlock,
    },
}

impl<'a> BlockRef<'a> {
    pub fn id(&self) -> InstanceId {
        match self {
            BlockRef::TopLevel { block, .. } => block.id,
            BlockRef::Child { block, .. } => block.id,
        }
    }

    pub fn type_id(&self) -> &'a str {
        match self {
            BlockRef::TopLevel { block, .. } => &block.type_id,
            BlockRef::Child { block, .. } => &block.type_id,
        }
    }

    pub fn data(&self) -> &'a FieldMap {
        match self {
            BlockRef::TopLevel { block, .. } => &block.data,
            BlockRef::Child { block, .. } => &block.data,
        }
    }

    pub fn is_nested(&self) -> bool {
        matches!(self, BlockRef::Child { .. })
    }
}

/// Editable document for one slot
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub slot_name: String,
    pub blocks: Vec<BlockInstance>,
    pub element_styles: BTreeMap<String, String>,

    /// Increments on each applied mutation
    pub version: u64,
}

impl Document {
    pub fn new(slot_name: &str) -> Self {
        Self {
            slot_name: slot_name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_blocks(slot_name: &str, blocks: Vec<BlockInstance>) -> Self {
        Self {
            slot_name: slot_name.to_string(),
            blocks,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of instances, children included
    pub fn instance_count(&self) -> usize {
        self.blocks.iter().map(|b| 1 + b.children().len()).sum()
    }

    pub fn find(&self, id: InstanceId) -> Option<BlockRef<'_>> {
        for (index, block) in self.blocks.iter().enumerate() {
            if block.id == id {
                return Some(BlockRef::TopLevel { index, block });
            }
            if let Some(position) = block.children().iter().position(|c| c.id == id) {
                return Some(BlockRef::Child {
                    parent: block,
                    index: position,
                    block: &block.children()[position],
                });
            }
        }
        None
    }

    pub fn top_level_index(&self, id: InstanceId) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == id)
    }

    pub fn top_level_mut(&mut self, id: InstanceId) -> Option<&mut BlockInstance> {
        self.blocks.iter_mut().find(|b| b.id == id)
    }

    /// Type id and mutable data map of any instance
    pub fn data_mut(&mut self, id: InstanceId) -> Option<(&str, &mut FieldMap)> {
        for block in &mut self.blocks {
            if block.id == id {
                return Some((block.type_id.as_str(), &mut block.data));
            }
            if let Some(children) = &mut block.children {
                if let Some(child) = children.iter_mut().find(|c| c.id == id) {
                    return Some((child.type_id.as_str(), &mut child.data));
                }
            }
        }
        None
    }

    /// Bring a freshly deserialized tree in line with the registry.
    ///
    /// Values are coerced to their field kinds (values that cannot be
    /// coerced, and unknown keys, are kept as they are). Children are kept
    /// only on container templates. Blocks of unknown types are left
    /// untouched so nothing is lost.
    pub fn normalize(&mut self, registry: &TemplateRegistry) {
        for block in &mut self.blocks {
            let Ok(template) = registry.resolve(&block.type_id) else {
                tracing::warn!(type_id = %block.type_id, "snapshot references unknown block type");
                continue;
            };

            coerce_data(template, &mut block.data);

            if template.accepts_children {
                let children = block.children.get_or_insert_with(Vec::new);
                for child in children.iter_mut() {
                    if let Ok(child_template) = registry.resolve(&child.type_id) {
                        coerce_data(child_template, &mut child.data);
                    }
                }
            } else if block.children.take().is_some() {
                tracing::debug!(type_id = %block.type_id, "dropping children of non-container block");
            }
        }
    }

    /// Equality over `{typeId, data, children}`; ids and version are ignored
    pub fn content_eq(&self, other: &Document) -> bool {
        self.element_styles == other.element_styles
            && self.blocks.len() == other.blocks.len()
            && self
                .blocks
                .iter()
                .zip(&other.blocks)
                .all(|(a, b)| a.content_eq(b))
    }
}

fn coerce_data(template: &BlockTemplate, data: &mut FieldMap) {
    for (name, value) in data.iter_mut() {
        if let Some(field) = template.field(name) {
            if let Some(coerced) = value.coerce(field) {
                *value = coerced;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Dimension, Unit};

    #[test]
    fn test_instance_ids_are_monotonic() {
        let a = InstanceId::fresh();
        let b = InstanceId::fresh();
        assert!(b > a);
        assert!(a.to_string().starts_with("block-"));
    }

    #[test]
    fn test_from_template_sets_defaults() {
        let registry = TemplateRegistry::builtin();
        let template = registry.resolve("button").unwrap();
        let block = BlockInstance::from_template(template);

        assert_eq!(block.data.get("text"), Some(&FieldValue::from("Click me")));
        assert_eq!(block.data.len(), template.fields.len());
        assert!(block.children.is_none());

        let container = BlockInstance::from_template(registry.resolve("container").unwrap());
        assert_eq!(container.children.as_ref().map(Vec::len), Some(0));
    }

    #[test]
    fn test_find_reports_nesting() {
        let child = LeafBlock::new("textview", FieldMap::new());
        let child_id = child.id;
        let parent = BlockInstance::new("container", FieldMap::new()).with_children(vec![child]);
        let parent_id = parent.id;
        let doc = Document::with_blocks("home", vec![parent]);

        assert!(!doc.find(parent_id).unwrap().is_nested());
        assert!(doc.find(child_id).unwrap().is_nested());
        assert!(doc.find(InstanceId::fresh()).is_none());
        assert_eq!(doc.instance_count(), 2);
    }

    #[test]
    fn test_snapshot_json_omits_ids_and_collapses_grandchildren() {
        let json = r#"{
            "typeId": "container",
            "data": {},
            "children": [
                { "typeId": "container", "data": {}, "children": [ { "typeId": "textview" } ] }
            ]
        }"#;

        let block: BlockInstance = serde_json::from_str(json).unwrap();
        assert_eq!(block.children().len(), 1);

        let out = serde_json::to_value(&block).unwrap();
        assert!(out.get("id").is_none());
        assert!(out["children"][0].get("children").is_none());
    }

    #[test]
    fn test_normalize_coerces_and_drops_stray_children() {
        let registry = TemplateRegistry::builtin();
        let mut data = FieldMap::new();
        data.insert("padding_top".to_string(), FieldValue::from("4px"));
        data.insert("legacy_key".to_string(), FieldValue::from("kept"));

        let mut button = BlockInstance::new("button", data);
        button.children = Some(vec![LeafBlock::new("textview", FieldMap::new())]);

        let mut doc = Document::with_blocks("home", vec![button]);
        doc.normalize(registry);

        let block = &doc.blocks[0];
        assert!(block.children.is_none());
        assert_eq!(
            block.data.get("padding_top"),
            Some(&FieldValue::Dimension(Dimension::Length(4.0, Unit::Px)))
        );
        assert_eq!(block.data.get("legacy_key"), Some(&FieldValue::from("kept")));
    }

    #[test]
    fn test_content_eq_ignores_ids() {
        let a = Document::with_blocks("x", vec![BlockInstance::new("button", FieldMap::new())]);
        let b = Document::with_blocks("x", vec![BlockInstance::new("button", FieldMap::new())]);
        assert_ne!(a.blocks[0].id, b.blocks[0].id);
        assert!(a.content_eq(&b));
    }
}
