use crate::{generate, load_document, render_instance, CompileError, GenerateOptions, OutputMode};
use pagesmith_document::{BlockInstance, Document, FieldValue, TemplateRegistry};

fn registry() -> &'static TemplateRegistry {
    TemplateRegistry::builtin()
}

fn persisted(doc: &Document) -> String {
    generate(doc, registry(), &GenerateOptions::persisted()).expect("Failed to generate")
}

#[test]
fn test_persisted_layout() {
    let mut doc = Document::new("header");
    doc.add_block(registry(), "heading", None).unwrap();

    let code = persisted(&doc);
    println!("Generated:\n{}", code);

    let lines: Vec<&str> = code.lines().collect();
    assert_eq!(lines[0], "<?php");
    assert!(lines[1].starts_with("/* PAGESMITH_BLOCKS: "));
    assert_eq!(lines[2], "?>");
    assert_eq!(lines[3], r#"<header class="ps-slot ps-slot-header">"#);
    assert!(lines[4].starts_with("  <h2 "));
    assert_eq!(lines.last(), Some(&"</header>"));
}

#[test]
fn test_page_slots_use_main() {
    let doc = Document::new("about");
    let code = persisted(&doc);
    assert!(code.contains(r#"<main class="ps-slot ps-slot-about">"#));
    assert!(code.ends_with("</main>\n"));
}

#[test]
fn test_round_trip_through_generated_source() {
    let mut doc = Document::new("footer");
    let container = doc.add_block(registry(), "container", None).unwrap();
    let text = doc.add_block(registry(), "textview", Some(container)).unwrap();
    doc.update_field(registry(), text, "content", "© 2026").unwrap();
    let button = doc.add_block(registry(), "button", None).unwrap();
    doc.update_field(registry(), button, "padding_type", "individual").unwrap();
    doc.update_field(registry(), button, "padding_top", "4px").unwrap();
    doc.element_styles
        .insert("background_color".to_string(), "#111".to_string());

    let code = persisted(&doc);
    let restored = load_document(&code, "footer", registry());
    assert!(restored.content_eq(&doc));
}

#[test]
fn test_hostile_text_stays_inert() {
    let payload = r#""); DROP everything /* "#;
    let mut doc = Document::new("home");
    let heading = doc.add_block(registry(), "heading", None).unwrap();
    doc.update_field(registry(), heading, "text", payload).unwrap();
    let closer = doc.add_block(registry(), "textview", None).unwrap();
    doc.update_field(registry(), closer, "content", "*/ <?php echo 1; ?>").unwrap();

    let code = persisted(&doc);
    println!("Generated:\n{}", code);

    // The PHP header holds exactly one comment terminator, at the end of the marker
    let header: Vec<&str> = code.lines().take(3).collect();
    assert_eq!(header.join("\n").matches("*/").count(), 1);
    assert!(header[1].ends_with(" */"));

    // Only the header opens and closes PHP
    assert_eq!(code.matches("<?php").count(), 1);
    assert_eq!(code.matches("?>").count(), 1);

    assert!(code.contains("&quot;); DROP everything /* "));
    assert!(code.contains("*/ &lt;?php echo 1; ?&gt;"));

    let restored = load_document(&code, "home", registry());
    assert_eq!(
        restored.blocks[0].data.get("text"),
        Some(&FieldValue::from(payload))
    );
    assert!(restored.content_eq(&doc));
}

#[test]
fn test_unknown_type_is_refused() {
    let doc = Document::with_blocks("home", vec![BlockInstance::new("carousel", Default::default())]);

    let err = generate(&doc, registry(), &GenerateOptions::persisted()).unwrap_err();
    assert!(matches!(err, CompileError::UnknownType(ref t) if t == "carousel"));

    let err = generate(&doc, registry(), &GenerateOptions::default()).unwrap_err();
    assert!(matches!(err, CompileError::UnknownType(_)));
}

#[test]
fn test_container_children_are_concatenated_in_order() {
    let mut doc = Document::new("header");
    let container = doc.add_block(registry(), "container", None).unwrap();
    let first = doc.add_block(registry(), "heading", Some(container)).unwrap();
    doc.update_field(registry(), first, "text", "First").unwrap();
    let second = doc.add_block(registry(), "button", Some(container)).unwrap();
    doc.update_field(registry(), second, "text", "Second").unwrap();

    let code = persisted(&doc);
    let first_at = code.find(">First<").unwrap();
    let second_at = code.find(">Second<").unwrap();
    let close_at = code.rfind("  </div>").unwrap();
    assert!(first_at < second_at);
    assert!(second_at < close_at);
    assert!(code.contains("\n    <h2 "));
}

#[test]
fn test_element_styles_become_custom_properties() {
    let mut doc = Document::new("header");
    doc.element_styles
        .insert("background_color".to_string(), "#fff\"; evil".to_string());

    let code = persisted(&doc);
    assert!(code.contains(r#"style="--ps-background-color: #fff&quot; evil;""#));
}

#[test]
fn test_auto_populated_menu_defers_to_render_time() {
    let mut doc = Document::new("header");
    let menu = doc.add_block(registry(), "menu", None).unwrap();
    doc.update_field(registry(), menu, "auto_populate", true).unwrap();
    doc.update_field(registry(), menu, "home_label", "Start's").unwrap();

    let code = persisted(&doc);
    assert!(code.contains("glob(__DIR__ . '/' . '../pages' . '/*.php')"));
    assert!(code.contains(r"$ps_home_label = 'Start\'s';"));
    assert!(code.contains("usort($ps_pages"));

    let options = GenerateOptions {
        auto_populate_menus: false,
        ..GenerateOptions::persisted()
    };
    let code = generate(&doc, registry(), &options).unwrap();
    assert!(!code.contains("glob("));
}

#[test]
fn test_preview_dump() {
    let mut doc = Document::new("header");
    let container = doc.add_block(registry(), "container", None).unwrap();
    doc.add_block(registry(), "heading", Some(container)).unwrap();
    let menu = doc.add_block(registry(), "menu", None).unwrap();
    doc.update_field(registry(), menu, "auto_populate", true).unwrap();

    let options = GenerateOptions {
        mode: OutputMode::Preview,
        ..Default::default()
    }
    .with_page_slots(vec!["contact".to_string(), "home".to_string()]);
    let code = generate(&doc, registry(), &options).unwrap();
    println!("Preview:\n{}", code);

    assert!(code.starts_with("slot: header\n"));
    assert!(code.contains("- container (block-"));
    assert!(code.contains("children:"));
    assert!(code.contains("text = \"Heading\""));
    assert!(code.contains("Home -> /\n"));
    assert!(code.contains("Contact -> /contact\n"));
    assert!(!code.contains("padding_all"));
    assert!(!code.contains("PAGESMITH_BLOCKS"));
}

#[test]
fn test_preview_of_empty_document() {
    let code = generate(&Document::new("home"), registry(), &GenerateOptions::default()).unwrap();
    assert_eq!(code, "slot: home\nblocks: (none)\n");
}

#[test]
fn test_render_single_instance() {
    let mut doc = Document::new("header");
    let container = doc.add_block(registry(), "container", None).unwrap();
    let child = doc.add_block(registry(), "button", Some(container)).unwrap();
    doc.update_field(registry(), child, "text", "Go").unwrap();

    let options = GenerateOptions::persisted();
    let markup = render_instance(&doc, child, registry(), &options).unwrap().unwrap();
    assert!(markup.starts_with(r#"<div class="ps-block ps-button""#));
    assert!(markup.contains(">Go</a>"));

    let markup = render_instance(&doc, container, registry(), &options).unwrap().unwrap();
    assert!(markup.contains(">Go</a>"));

    let ghost = pagesmith_document::InstanceId::fresh();
    assert!(render_instance(&doc, ghost, registry(), &options).unwrap().is_none());
}
