//! Built-in trees a slot returns to on reset

use crate::slots::{SlotKind, SlotName};
use chrono::Datelike;
use pagesmith_compiler::page_label;
use pagesmith_document::{Document, MutationError, TemplateRegistry};

/// The fixed starting document for `slot`
pub fn default_tree(
    slot: &SlotName,
    registry: &TemplateRegistry,
    site_title: &str,
) -> Result<Document, MutationError> {
    let mut doc = Document::new(slot.as_str());

    match (slot.kind(), slot.as_str()) {
        (SlotKind::Element, "header") => {
            let row = doc.add_block(registry, "container", None)?;
            doc.update_field(registry, row, "layout", "row")?;
            doc.update_field(registry, row, "align_items", "center")?;

            let title = doc.add_block(registry, "heading", Some(row))?;
            doc.update_field(registry, title, "text", site_title)?;
            doc.update_field(registry, title, "level", "h1")?;

            let menu = doc.add_block(registry, "menu", Some(row))?;
            doc.update_field(registry, menu, "auto_populate", true)?;
        }
        (SlotKind::Element, _) => {
            let container = doc.add_block(registry, "container", None)?;
            let text = doc.add_block(registry, "textview", Some(container))?;
            let year = chrono::Local::now().year();
            doc.update_field(registry, text, "content", format!("© {} {}", year, site_title))?;
            doc.update_field(registry, text, "align", "center")?;
        }
        (SlotKind::Page, name) => {
            let heading = doc.add_block(registry, "heading", None)?;
            doc.update_field(registry, heading, "text", page_label(name))?;
            doc.update_field(registry, heading, "level", "h1")?;
            doc.add_block(registry, "textview", None)?;
        }
    }

    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagesmith_document::FieldValue;

    fn tree(name: &str) -> Document {
        let slot = SlotName::parse(name).unwrap();
        default_tree(&slot, TemplateRegistry::builtin(), "Bakery").unwrap()
    }

    #[test]
    fn test_header_tree() {
        let doc = tree("header");
        assert_eq!(doc.blocks.len(), 1);
        let children = doc.blocks[0].children();
        assert_eq!(children[0].type_id, "heading");
        assert_eq!(children[0].data.get("text"), Some(&FieldValue::from("Bakery")));
        assert_eq!(children[1].type_id, "menu");
        assert_eq!(children[1].data.get("auto_populate"), Some(&FieldValue::Bool(true)));
    }

    #[test]
    fn test_footer_tree() {
        let doc = tree("footer");
        let text = &doc.blocks[0].children()[0];
        assert_eq!(text.type_id, "textview");
        assert!(text.data.get("content").unwrap().to_display_string().ends_with("Bakery"));
    }

    #[test]
    fn test_page_tree() {
        let doc = tree("about-us");
        assert_eq!(doc.blocks[0].data.get("text"), Some(&FieldValue::from("About Us")));
        assert_eq!(doc.blocks[1].type_id, "textview");
    }
}
