//! Renderers for the built-in catalogue

use super::{RenderInput, RendererRegistry};
use crate::menu;

const HEADING_LEVELS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];
const INPUT_TYPES: &[&str] = &["text", "email", "tel", "number", "password"];

pub(super) fn register_all(registry: &mut RendererRegistry) {
    registry.register("heading", heading);
    registry.register("textview", textview);
    registry.register("button", button);
    registry.register("image", image);
    registry.register("spacer", spacer);
    registry.register("divider", divider);
    registry.register("container", container);
    registry.register("menu", menu_block);
    registry.register("form", form);
    registry.register("input", input_field);
    registry.register("textarea_field", textarea_field);
    registry.register("select_field", select_field);
    registry.register("checkbox_field", checkbox_field);
    registry.register("submit", submit);
}

/// Pick `value` if it is one of `allowed`, else `fallback`
fn one_of<'a>(value: &str, allowed: &[&'a str], fallback: &'a str) -> &'a str {
    allowed.iter().copied().find(|a| *a == value).unwrap_or(fallback)
}

fn join_style(parts: &[String]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join(" ")
}

fn attr_if(condition: bool, attribute: &str) -> &str {
    if condition {
        attribute
    } else {
        ""
    }
}

fn heading(input: &RenderInput<'_>) -> String {
    let tag = one_of(&input.raw_text("level"), HEADING_LEVELS, "h2");
    let style = join_style(&[
        input.style(&[("text-align", "align"), ("color", "color")]),
        input.spacing_style(),
    ]);
    format!(
        r#"<{tag} class="{}" style="{}">{}</{tag}>"#,
        input.class_with(""),
        style,
        input.text("text"),
    )
}

fn textview(input: &RenderInput<'_>) -> String {
    let style = join_style(&[
        input.style(&[("text-align", "align"), ("color", "color"), ("font-size", "font_size")]),
        input.spacing_style(),
    ]);
    let content = input.text("content").replace("\r\n", "\n").replace('\n', "<br>");
    format!(
        r#"<div class="{}" style="{}">{}</div>"#,
        input.class_with(""),
        style,
        content
    )
}

fn button(input: &RenderInput<'_>) -> String {
    let style = join_style(&[input.style(&[("text-align", "align")]), input.spacing_style()]);
    let variant = one_of(&input.raw_text("variant"), &["primary", "secondary", "link"], "primary");
    let target = attr_if(input.flag("new_tab"), r#" target="_blank" rel="noopener""#);
    format!(
        r#"<div class="{}" style="{}"><a class="ps-button ps-button-{}" href="{}"{}>{}</a></div>"#,
        input.class_with(""),
        style,
        variant,
        input.text("url"),
        target,
        input.text("text"),
    )
}

fn image(input: &RenderInput<'_>) -> String {
    if input.raw_text("src").is_empty() {
        return format!(r#"<figure class="{}"></figure>"#, input.class_with("ps-image-empty"));
    }

    let img = format!(
        r#"<img src="{}" alt="{}" style="{}">"#,
        input.text("src"),
        input.text("alt"),
        input.style(&[("width", "width")]),
    );
    let body = if input.raw_text("link_url").is_empty() {
        img
    } else {
        format!(r#"<a href="{}">{}</a>"#, input.text("link_url"), img)
    };

    format!(
        r#"<figure class="{}" style="{}">{}</figure>"#,
        input.class_with(""),
        input.spacing_style(),
        body
    )
}

fn spacer(input: &RenderInput<'_>) -> String {
    format!(
        r#"<div class="{}" style="{}" aria-hidden="true"></div>"#,
        input.class_with(""),
        input.style(&[("height", "height")]),
    )
}

fn divider(input: &RenderInput<'_>) -> String {
    let style = join_style(&[
        format!(
            "border: 0; border-top: {} solid {};",
            input.text("thickness"),
            input.text("color")
        ),
        input.spacing_style(),
    ]);
    format!(r#"<hr class="{}" style="{}">"#, input.class_with(""), style)
}

fn container(input: &RenderInput<'_>) -> String {
    let direction = one_of(&input.raw_text("layout"), &["column", "row"], "column");
    let align = match input.raw_text("align_items").as_str() {
        "start" => "flex-start",
        "center" => "center",
        "end" => "flex-end",
        _ => "stretch",
    };
    let style = join_style(&[
        format!("display: flex; flex-direction: {}; align-items: {};", direction, align),
        input.style(&[
            ("gap", "gap"),
            ("background-color", "background_color"),
            ("max-width", "max_width"),
        ]),
        input.spacing_style(),
    ]);

    wrap_children(
        &format!(
            r#"<div class="{}" style="{}">"#,
            input.class_with(&format!("ps-container-{}", direction)),
            style
        ),
        input.children(),
        "</div>",
    )
}

fn menu_block(input: &RenderInput<'_>) -> String {
    if input.flag("auto_populate") {
        if let Some(pages_dir) = input.pages_dir() {
            return menu::auto_menu_markup(input, pages_dir);
        }
    }

    let orientation = one_of(&input.raw_text("orientation"), &["horizontal", "vertical"], "horizontal");
    let mut lines = vec![
        format!(
            r#"<nav class="{}" style="{}">"#,
            input.class_with(&format!("ps-menu-{}", orientation)),
            input.spacing_style()
        ),
        "<ul>".to_string(),
    ];
    for item in input.items("items") {
        let label = item.get("label").map(String::as_str).unwrap_or("");
        let url = item.get("url").map(String::as_str).unwrap_or("#");
        lines.push(format!(r#"  <li><a href="{}">{}</a></li>"#, url, label));
    }
    lines.push("</ul>".to_string());
    lines.push("</nav>".to_string());
    lines.join("\n")
}

fn form(input: &RenderInput<'_>) -> String {
    let method = one_of(&input.raw_text("method"), &["post", "get"], "post");
    let open = format!(
        r#"<form class="{}" style="{}" method="{}" action="{}" data-success="{}">"#,
        input.class_with(""),
        input.spacing_style(),
        method,
        input.text("action"),
        input.text("success_message"),
    );
    wrap_children(&open, input.children(), "</form>")
}

fn input_field(input: &RenderInput<'_>) -> String {
    let kind = one_of(&input.raw_text("input_type"), INPUT_TYPES, "text");
    format!(
        r#"<label class="{}"><span>{}</span><input type="{}" name="{}" placeholder="{}"{}></label>"#,
        input.class_with("ps-field"),
        input.text("label"),
        kind,
        input.text("name"),
        input.text("placeholder"),
        attr_if(input.flag("required"), " required"),
    )
}

fn textarea_field(input: &RenderInput<'_>) -> String {
    format!(
        r#"<label class="{}"><span>{}</span><textarea name="{}" rows="{}" placeholder="{}"{}></textarea></label>"#,
        input.class_with("ps-field"),
        input.text("label"),
        input.text("name"),
        input.text("rows"),
        input.text("placeholder"),
        attr_if(input.flag("required"), " required"),
    )
}

fn select_field(input: &RenderInput<'_>) -> String {
    let mut lines = vec![
        format!(r#"<label class="{}">"#, input.class_with("ps-field")),
        format!("  <span>{}</span>", input.text("label")),
        format!(
            r#"  <select name="{}"{}>"#,
            input.text("name"),
            attr_if(input.flag("required"), " required")
        ),
    ];
    for option in input.items("options") {
        let label = option.get("label").map(String::as_str).unwrap_or("");
        let value = option.get("value").map(String::as_str).unwrap_or(label);
        lines.push(format!(r#"    <option value="{}">{}</option>"#, value, label));
    }
    lines.push("  </select>".to_string());
    lines.push("</label>".to_string());
    lines.join("\n")
}

fn checkbox_field(input: &RenderInput<'_>) -> String {
    format!(
        r#"<label class="{}"><input type="checkbox" name="{}" value="1"{}> <span>{}</span></label>"#,
        input.class_with("ps-field"),
        input.text("name"),
        attr_if(input.flag("checked"), " checked"),
        input.text("label"),
    )
}

fn submit(input: &RenderInput<'_>) -> String {
    format!(
        r#"<div class="{}" style="{}"><button type="submit" class="ps-button ps-button-primary">{}</button></div>"#,
        input.class_with(""),
        input.style(&[("text-align", "align")]),
        input.text("text"),
    )
}

fn wrap_children(open: &str, children: &str, close: &str) -> String {
    if children.is_empty() {
        format!("{}{}", open, close)
    } else {
        format!("{}\n{}\n{}", open, children, close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagesmith_document::{default_data, FieldValue, InstanceId, Record, TemplateRegistry};

    fn render(type_id: &str, overrides: &[(&str, FieldValue)]) -> String {
        let template = TemplateRegistry::builtin().resolve(type_id).unwrap();
        let mut data = default_data(template);
        for (name, value) in overrides {
            data.insert(name.to_string(), value.clone());
        }
        let input = RenderInput::new(template, InstanceId::fresh(), &data);
        RendererRegistry::builtin().get(type_id).unwrap().render(&input)
    }

    #[test]
    fn test_heading_level_is_allowlisted() {
        let html = render("heading", &[("level", FieldValue::from("h1"))]);
        assert!(html.starts_with("<h1 "));
        assert!(html.ends_with("</h1>"));

        let html = render("heading", &[("level", FieldValue::from("script"))]);
        assert!(html.starts_with("<h2 "));
    }

    #[test]
    fn test_button_new_tab() {
        let html = render("button", &[("new_tab", FieldValue::Bool(true)), ("url", FieldValue::from("/go"))]);
        assert!(html.contains(r#"href="/go" target="_blank""#));
        assert!(html.contains("Click me"));
    }

    #[test]
    fn test_static_menu_escapes_items() {
        let mut item = Record::new();
        item.insert("label".to_string(), "A&B".to_string());
        item.insert("url".to_string(), "/a\"b".to_string());
        let html = render("menu", &[("items", FieldValue::RepeaterItems(vec![item]))]);
        assert!(html.contains(r#"<li><a href="/a&quot;b">A&amp;B</a></li>"#));
    }

    #[test]
    fn test_auto_menu_without_pages_dir_renders_static_shell() {
        let html = render("menu", &[("auto_populate", FieldValue::Bool(true))]);
        assert!(!html.contains("<?php"));
        assert!(html.contains("<ul>\n</ul>"));
    }

    #[test]
    fn test_textview_keeps_line_breaks() {
        let html = render("textview", &[("content", FieldValue::from("one\ntwo"))]);
        assert!(html.contains("one<br>two"));
    }

    #[test]
    fn test_empty_image() {
        let html = render("image", &[]);
        assert!(html.contains("ps-image-empty"));
        assert!(!html.contains("<img"));
    }
}
