use crate::context::{Context, GenerateOptions, OutputMode};
use crate::escape::{css_ident, css_value, escape_html};
use crate::menu::auto_entries;
use crate::renderers::{RenderInput, RendererRegistry};
use crate::snapshot::{CommentCodec, Snapshot, SnapshotCodec, SnapshotError};
use pagesmith_document::{
    resolve_visible, BlockData, BlockInstance, BlockRef, BlockTemplate, Document, InstanceId,
    LeafBlock, TemplateRegistry,
};
use thiserror::Error;

/// Errors that can occur during code generation
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Unknown block type: {0}")]
    UnknownType(String),

    #[error("No markup renderer for block type: {0}")]
    MissingRenderer(String),

    #[error("Document content would break out of the snapshot comment")]
    MarkerInjectionRejected,

    #[error("Failed to serialize snapshot: {0}")]
    Snapshot(#[source] serde_json::Error),
}

impl From<SnapshotError> for CompileError {
    fn from(e: SnapshotError) -> Self {
        match e {
            SnapshotError::Serialize(e) => CompileError::Snapshot(e),
            SnapshotError::MarkerInjectionRejected => CompileError::MarkerInjectionRejected,
        }
    }
}

/// Generate source for a document using the built-in renderers
pub fn generate(
    doc: &Document,
    registry: &TemplateRegistry,
    options: &GenerateOptions,
) -> Result<String, CompileError> {
    generate_with(doc, registry, RendererRegistry::builtin(), options)
}

pub fn generate_with(
    doc: &Document,
    registry: &TemplateRegistry,
    renderers: &RendererRegistry,
    options: &GenerateOptions,
) -> Result<String, CompileError> {
    check_types(doc, registry)?;

    match options.mode {
        OutputMode::Preview => Ok(generate_preview(doc, registry, options)),
        OutputMode::Persisted => generate_persisted(doc, registry, renderers, options),
    }
}

/// Markup for a single instance, as it appears in persisted output.
///
/// Used for live previews of one block after a field change. `None` when
/// the document has no instance with that id.
pub fn render_instance(
    doc: &Document,
    id: InstanceId,
    registry: &TemplateRegistry,
    options: &GenerateOptions,
) -> Result<Option<String>, CompileError> {
    let renderers = RendererRegistry::builtin();
    let markup = match doc.find(id) {
        None => return Ok(None),
        Some(BlockRef::TopLevel { block, .. }) => render_block(block, registry, renderers, options)?,
        Some(BlockRef::Child { block, .. }) => render_leaf(block, registry, renderers, options)?,
    };
    Ok(Some(markup))
}

/// Every instance must resolve before any output is produced
fn check_types(doc: &Document, registry: &TemplateRegistry) -> Result<(), CompileError> {
    for block in &doc.blocks {
        let template = resolve(registry, &block.type_id)?;
        if template.accepts_children {
            for child in block.children() {
                resolve(registry, &child.type_id)?;
            }
        }
    }
    Ok(())
}

fn resolve<'r>(registry: &'r TemplateRegistry, type_id: &str) -> Result<&'r BlockTemplate, CompileError> {
    registry
        .resolve(type_id)
        .map_err(|_| CompileError::UnknownType(type_id.to_string()))
}

fn wrapper_tag(slot_name: &str) -> &'static str {
    match slot_name {
        "header" => "header",
        "footer" => "footer",
        _ => "main",
    }
}

fn generate_persisted(
    doc: &Document,
    registry: &TemplateRegistry,
    renderers: &RendererRegistry,
    options: &GenerateOptions,
) -> Result<String, CompileError> {
    let marker = CommentCodec.encode(&Snapshot::from_document(doc))?;
    let mut ctx = Context::new(options);

    ctx.add_line("<?php");
    ctx.add_line(&marker);
    ctx.add_line("?>");

    let tag = wrapper_tag(&doc.slot_name);
    let slot_class = css_ident(&doc.slot_name);
    let styles = element_style_attribute(doc);
    if styles.is_empty() {
        ctx.add_line(&format!(r#"<{} class="ps-slot ps-slot-{}">"#, tag, slot_class));
    } else {
        ctx.add_line(&format!(
            r#"<{} class="ps-slot ps-slot-{}" style="{}">"#,
            tag, slot_class, styles
        ));
    }
    ctx.indent();

    for block in &doc.blocks {
        let markup = render_block(block, registry, renderers, options)?;
        ctx.add_lines(&markup);
    }

    ctx.dedent();
    ctx.add_line(&format!("</{}>", tag));

    tracing::debug!(
        slot = %doc.slot_name,
        blocks = doc.blocks.len(),
        "generated persisted source"
    );

    Ok(ctx.get_output())
}

/// Element styles as CSS custom properties, `--ps-<name>: <value>;`
fn element_style_attribute(doc: &Document) -> String {
    doc.element_styles
        .iter()
        .filter_map(|(name, value)| {
            let name = css_ident(name);
            let value = css_value(value);
            (!name.is_empty() && !value.is_empty())
                .then(|| format!("--ps-{}: {};", name, escape_html(&value)))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_block(
    block: &BlockInstance,
    registry: &TemplateRegistry,
    renderers: &RendererRegistry,
    options: &GenerateOptions,
) -> Result<String, CompileError> {
    let template = resolve(registry, &block.type_id)?;

    let mut input = RenderInput::new(template, block.id, &block.data);
    if template.accepts_children {
        let mut children = Vec::with_capacity(block.children().len());
        for child in block.children() {
            let markup = render_leaf(child, registry, renderers, options)?;
            children.extend(markup.lines().map(|line| format!("{}{}", options.indent, line)));
        }
        input = input.with_children(children.join("\n"));
    }

    render_input(input, renderers, options)
}

fn render_leaf(
    child: &LeafBlock,
    registry: &TemplateRegistry,
    renderers: &RendererRegistry,
    options: &GenerateOptions,
) -> Result<String, CompileError> {
    let template = resolve(registry, &child.type_id)?;
    render_input(RenderInput::new(template, child.id, &child.data), renderers, options)
}

fn render_input<'a>(
    input: RenderInput<'a>,
    renderers: &RendererRegistry,
    options: &'a GenerateOptions,
) -> Result<String, CompileError> {
    let renderer = renderers
        .get(input.type_id())
        .ok_or_else(|| CompileError::MissingRenderer(input.type_id().to_string()))?;

    let input = if options.auto_populate_menus {
        input.with_pages_dir(&options.pages_dir)
    } else {
        input
    };

    Ok(renderer.render(&input))
}

fn generate_preview(doc: &Document, registry: &TemplateRegistry, options: &GenerateOptions) -> String {
    let mut ctx = Context::new(options);

    ctx.add_line(&format!("slot: {}", doc.slot_name));

    if !doc.element_styles.is_empty() {
        ctx.add_line("element styles:");
        ctx.indent();
        for (name, value) in &doc.element_styles {
            ctx.add_line(&format!("{} = {}", name, serde_json::Value::from(value.as_str())));
        }
        ctx.dedent();
    }

    if doc.blocks.is_empty() {
        ctx.add_line("blocks: (none)");
        return ctx.get_output();
    }

    ctx.add_line("blocks:");
    ctx.indent();
    for block in &doc.blocks {
        let Ok(template) = registry.resolve(&block.type_id) else {
            continue;
        };
        preview_block(&mut ctx, block, template, options);

        if template.accepts_children && !block.children().is_empty() {
            ctx.indent();
            ctx.indent();
            ctx.add_line("children:");
            ctx.indent();
            for child in block.children() {
                if let Ok(child_template) = registry.resolve(&child.type_id) {
                    preview_block(&mut ctx, child, child_template, options);
                }
            }
            ctx.dedent();
            ctx.dedent();
            ctx.dedent();
        }
    }
    ctx.dedent();

    ctx.get_output()
}

fn preview_block(ctx: &mut Context, block: &impl BlockData, template: &BlockTemplate, options: &GenerateOptions) {
    ctx.add_line(&format!("- {} ({})", block.type_id(), block.id()));
    ctx.indent();
    ctx.indent();

    let resolved = resolve_visible(template, block.data());
    for field in &resolved {
        ctx.add_line(&format!("{} = {}", field.field.name, field.value.to_json()));
    }

    for (name, value) in block.data() {
        if template.field(name).is_none() {
            ctx.add_line(&format!("{} = {} (unknown field)", name, value.to_json()));
        }
    }

    let auto_menu = options.auto_populate_menus
        && resolved
            .iter()
            .any(|r| r.field.name == "auto_populate" && r.value.as_bool());
    if auto_menu {
        let text = |name: &str| {
            resolved
                .iter()
                .find(|r| r.field.name == name)
                .map(|r| r.value.to_display_string())
                .unwrap_or_default()
        };
        ctx.add_line("auto entries:");
        ctx.indent();
        for entry in auto_entries(&options.page_slots, &text("home_slug"), &text("home_label")) {
            ctx.add_line(&format!("{} -> {}", entry.label, entry.url));
        }
        ctx.dedent();
    }

    ctx.dedent();
    ctx.dedent();
}
