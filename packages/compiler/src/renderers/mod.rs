//! # Markup Renderers
//!
//! One pure function per block type, looked up by type id. The generator
//! calls exactly one renderer per instance and concatenates the results.
//!
//! Renderers only see a [`RenderInput`]: the visible fields with their
//! effective values, plus already-rendered child markup for containers.
//! Anything read through [`RenderInput::text`] and friends comes out
//! HTML-escaped.

mod builtin;

use crate::escape::{css_value, escape_html};
use pagesmith_document::{resolve_visible, BlockTemplate, FieldValue, InstanceId, Record};
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

/// Everything a renderer may read about one instance
pub struct RenderInput<'a> {
    pub template: &'a BlockTemplate,
    pub instance_id: InstanceId,
    values: BTreeMap<&'a str, FieldValue>,
    children: Option<String>,
    pages_dir: Option<&'a str>,
}

impl<'a> RenderInput<'a> {
    pub fn new(
        template: &'a BlockTemplate,
        instance_id: InstanceId,
        data: &pagesmith_document::FieldMap,
    ) -> Self {
        let values = resolve_visible(template, data)
            .into_iter()
            .map(|resolved| (resolved.field.name.as_str(), resolved.value))
            .collect();

        Self {
            template,
            instance_id,
            values,
            children: None,
            pages_dir: None,
        }
    }

    /// Rendered child markup, one instance per line
    pub fn with_children(mut self, markup: String) -> Self {
        self.children = Some(markup);
        self
    }

    /// Enables auto-populated menus, listing `*.php` under `dir`
    pub fn with_pages_dir(mut self, dir: &'a str) -> Self {
        self.pages_dir = Some(dir);
        self
    }

    pub fn type_id(&self) -> &str {
        &self.template.type_id
    }

    /// Effective value of a visible field
    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Escaped display string; empty for hidden or unknown fields
    pub fn text(&self, name: &str) -> String {
        escape_html(&self.raw_text(name))
    }

    /// Unescaped display string. Callers must escape for their own context.
    pub fn raw_text(&self, name: &str) -> String {
        self.value(name)
            .map(FieldValue::to_display_string)
            .unwrap_or_default()
    }

    pub fn flag(&self, name: &str) -> bool {
        self.value(name).map(FieldValue::as_bool).unwrap_or(false)
    }

    pub fn is(&self, name: &str, expected: &str) -> bool {
        self.raw_text(name) == expected
    }

    /// Repeater rows with every cell escaped
    pub fn items(&self, name: &str) -> Vec<Record> {
        self.value(name)
            .map(FieldValue::as_items)
            .unwrap_or_default()
            .iter()
            .map(|row| {
                row.iter()
                    .map(|(key, value)| (key.clone(), escape_html(value)))
                    .collect()
            })
            .collect()
    }

    pub fn children(&self) -> &str {
        self.children.as_deref().unwrap_or("")
    }

    pub fn pages_dir(&self) -> Option<&str> {
        self.pages_dir
    }

    /// `ps-block ps-<type>` plus an extra class
    pub fn class_with(&self, extra: &str) -> String {
        let base = format!("ps-block ps-{}", escape_html(self.type_id()));
        if extra.is_empty() {
            base
        } else {
            format!("{} {}", base, extra)
        }
    }

    /// `prop: value;` pairs for every visible, non-empty field, escaped for
    /// a double-quoted style attribute
    pub fn style(&self, declarations: &[(&str, &str)]) -> String {
        declarations
            .iter()
            .filter_map(|(property, field)| {
                let value = css_value(&self.raw_text(field));
                (!value.is_empty()).then(|| format!("{}: {};", property, escape_html(&value)))
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Padding and bottom margin from the shared spacing group
    pub fn spacing_style(&self) -> String {
        let mut declarations = Vec::new();

        if self.is("padding_type", "all") {
            declarations.push(self.style(&[("padding", "padding_all")]));
        } else if self.is("padding_type", "individual") {
            declarations.push(self.style(&[
                ("padding-top", "padding_top"),
                ("padding-right", "padding_right"),
                ("padding-bottom", "padding_bottom"),
                ("padding-left", "padding_left"),
            ]));
        }

        if !self.is("margin_bottom", "0px") {
            declarations.push(self.style(&[("margin-bottom", "margin_bottom")]));
        }

        declarations.retain(|d| !d.is_empty());
        declarations.join(" ")
    }
}

/// Turns one instance into markup
pub trait MarkupRenderer: Send + Sync {
    fn render(&self, input: &RenderInput<'_>) -> String;
}

impl<F> MarkupRenderer for F
where
    F: Fn(&RenderInput<'_>) -> String + Send + Sync,
{
    fn render(&self, input: &RenderInput<'_>) -> String {
        self(input)
    }
}

/// Type id → renderer
#[derive(Default)]
pub struct RendererRegistry {
    renderers: HashMap<String, Box<dyn MarkupRenderer>>,
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renderers for the built-in catalogue
    pub fn builtin() -> &'static RendererRegistry {
        static BUILTIN: OnceLock<RendererRegistry> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            let mut registry = RendererRegistry::new();
            builtin::register_all(&mut registry);
            registry
        })
    }

    pub fn register(&mut self, type_id: &str, renderer: impl MarkupRenderer + 'static) {
        self.renderers.insert(type_id.to_string(), Box::new(renderer));
    }

    pub fn get(&self, type_id: &str) -> Option<&dyn MarkupRenderer> {
        self.renderers.get(type_id).map(|r| r.as_ref())
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.renderers.contains_key(type_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagesmith_document::{default_data, TemplateRegistry};

    #[test]
    fn test_every_builtin_template_has_a_renderer() {
        let renderers = RendererRegistry::builtin();
        for template in TemplateRegistry::builtin().templates() {
            assert!(renderers.contains(&template.type_id), "no renderer for {}", template.type_id);
        }
    }

    #[test]
    fn test_input_escapes_and_hides() {
        let template = TemplateRegistry::builtin().resolve("button").unwrap();
        let mut data = default_data(template);
        data.insert("text".to_string(), FieldValue::from("<b>Go</b>"));
        data.insert("padding_top".to_string(), FieldValue::from("4px"));

        let input = RenderInput::new(template, InstanceId::fresh(), &data);
        assert_eq!(input.text("text"), "&lt;b&gt;Go&lt;/b&gt;");
        assert_eq!(input.text("padding_top"), "");
        assert_eq!(input.spacing_style(), "");
    }

    #[test]
    fn test_spacing_style() {
        let template = TemplateRegistry::builtin().resolve("heading").unwrap();
        let mut data = default_data(template);
        data.insert("padding_type".to_string(), FieldValue::from("individual"));
        data.insert("padding_top".to_string(), FieldValue::from("4px"));
        data.insert("margin_bottom".to_string(), FieldValue::from("1rem"));

        let input = RenderInput::new(template, InstanceId::fresh(), &data);
        assert_eq!(
            input.spacing_style(),
            "padding-top: 4px; padding-right: 0px; padding-bottom: 0px; padding-left: 0px; margin-bottom: 1rem;"
        );
    }

    #[test]
    fn test_custom_renderer() {
        let mut renderers = RendererRegistry::new();
        renderers.register("heading", |input: &RenderInput<'_>| format!("<h1>{}</h1>", input.text("text")));

        let template = TemplateRegistry::builtin().resolve("heading").unwrap();
        let input = RenderInput::new(template, InstanceId::fresh(), &default_data(template));
        let markup = renderers.get("heading").unwrap().render(&input);
        assert_eq!(markup, "<h1>Heading</h1>");
    }
}
