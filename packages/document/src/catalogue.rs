//! Built-in block catalogue

use crate::template::{BlockTemplate, Category, Field};

const ALIGN: &[(&str, &str)] = &[("left", "Left"), ("center", "Center"), ("right", "Right")];

pub(crate) fn builtin_templates() -> Vec<BlockTemplate> {
    vec![
        heading(),
        textview(),
        button(),
        image(),
        spacer(),
        divider(),
        container(),
        menu(),
        form(),
        input(),
        textarea_field(),
        select_field(),
        checkbox_field(),
        submit(),
    ]
}

/// Padding / margin group shared by every visual block
pub fn spacing_fields() -> Vec<Field> {
    vec![
        Field::select(
            "padding_type",
            "Padding",
            &[("none", "None"), ("all", "All sides"), ("individual", "Individual sides")],
            "none",
        ),
        Field::dimension("padding_all", "Padding (all sides)", "16px").when("padding_type", "all"),
        Field::dimension("padding_top", "Padding top", "0px").when("padding_type", "individual"),
        Field::dimension("padding_right", "Padding right", "0px").when("padding_type", "individual"),
        Field::dimension("padding_bottom", "Padding bottom", "0px").when("padding_type", "individual"),
        Field::dimension("padding_left", "Padding left", "0px").when("padding_type", "individual"),
        Field::dimension("margin_bottom", "Bottom margin", "0px"),
    ]
}

fn heading() -> BlockTemplate {
    BlockTemplate::new("heading", "Heading", Category::Content)
        .with_fields([
            Field::text("text", "Text", "Heading"),
            Field::select(
                "level",
                "Level",
                &[("h1", "H1"), ("h2", "H2"), ("h3", "H3"), ("h4", "H4"), ("h5", "H5"), ("h6", "H6")],
                "h2",
            ),
            Field::select("align", "Alignment", ALIGN, "left"),
            Field::color("color", "Color", "#222222"),
        ])
        .with_fields(spacing_fields())
}

fn textview() -> BlockTemplate {
    BlockTemplate::new("textview", "Text", Category::Content)
        .with_fields([
            Field::textarea("content", "Content", "Write something here."),
            Field::select("align", "Alignment", ALIGN, "left"),
            Field::color("color", "Color", "#333333"),
            Field::dimension("font_size", "Font size", "16px"),
        ])
        .with_fields(spacing_fields())
}

fn button() -> BlockTemplate {
    BlockTemplate::new("button", "Button", Category::Content)
        .with_fields([
            Field::text("text", "Label", "Click me"),
            Field::text("url", "Link", "#"),
            Field::select(
                "variant",
                "Style",
                &[("primary", "Primary"), ("secondary", "Secondary"), ("link", "Link")],
                "primary",
            ),
            Field::checkbox("new_tab", "Open in new tab", false),
            Field::select("align", "Alignment", ALIGN, "left"),
        ])
        .with_fields(spacing_fields())
}

fn image() -> BlockTemplate {
    BlockTemplate::new("image", "Image", Category::Content)
        .with_fields([
            Field::text("src", "Image URL", ""),
            Field::text("alt", "Alt text", ""),
            Field::dimension("width", "Width", "auto"),
            Field::text("link_url", "Link", ""),
        ])
        .with_fields(spacing_fields())
}

fn spacer() -> BlockTemplate {
    BlockTemplate::new("spacer", "Spacer", Category::Content)
        .with_fields([Field::dimension("height", "Height", "32px")])
}

fn divider() -> BlockTemplate {
    BlockTemplate::new("divider", "Divider", Category::Content)
        .with_fields([
            Field::dimension("thickness", "Thickness", "1px"),
            Field::color("color", "Color", "#dddddd"),
        ])
        .with_fields(spacing_fields())
}

fn container() -> BlockTemplate {
    BlockTemplate::new("container", "Container", Category::Content)
        .container()
        .with_fields([
            Field::select("layout", "Layout", &[("column", "Column"), ("row", "Row")], "column"),
            Field::dimension("gap", "Gap", "16px"),
            Field::select(
                "align_items",
                "Align items",
                &[("stretch", "Stretch"), ("start", "Start"), ("center", "Center"), ("end", "End")],
                "stretch",
            ),
            Field::color("background_color", "Background", ""),
            Field::dimension("max_width", "Max width", "auto"),
        ])
        .with_fields(spacing_fields())
}

fn menu() -> BlockTemplate {
    BlockTemplate::new("menu", "Menu", Category::Content)
        .with_fields([
            Field::checkbox("auto_populate", "List pages automatically", false),
            Field::text("home_slug", "Home page", "home").when("auto_populate", true),
            Field::text("home_label", "Home label", "Home").when("auto_populate", true),
            Field::repeater("items", "Items", &["label", "url"]).when("auto_populate", false),
            Field::select(
                "orientation",
                "Orientation",
                &[("horizontal", "Horizontal"), ("vertical", "Vertical")],
                "horizontal",
            ),
        ])
        .with_fields(spacing_fields())
}

fn form() -> BlockTemplate {
    BlockTemplate::new("form", "Form", Category::FormField)
        .container()
        .with_fields([
            Field::text("action", "Submit to", ""),
            Field::select("method", "Method", &[("post", "POST"), ("get", "GET")], "post"),
            Field::text("success_message", "Success message", "Thanks, we got it."),
        ])
        .with_fields(spacing_fields())
}

fn input() -> BlockTemplate {
    BlockTemplate::new("input", "Input", Category::FormField).with_fields([
        Field::text("name", "Name", "field"),
        Field::text("label", "Label", "Label"),
        Field::select(
            "input_type",
            "Type",
            &[
                ("text", "Text"),
                ("email", "Email"),
                ("tel", "Phone"),
                ("number", "Number"),
                ("password", "Password"),
            ],
            "text",
        ),
        Field::text("placeholder", "Placeholder", ""),
        Field::checkbox("required", "Required", false),
    ])
}

fn textarea_field() -> BlockTemplate {
    BlockTemplate::new("textarea_field", "Text area", Category::FormField).with_fields([
        Field::text("name", "Name", "message"),
        Field::text("label", "Label", "Message"),
        Field::text("placeholder", "Placeholder", ""),
        Field::number("rows", "Rows", 4.0),
        Field::checkbox("required", "Required", false),
    ])
}

fn select_field() -> BlockTemplate {
    BlockTemplate::new("select_field", "Dropdown", Category::FormField).with_fields([
        Field::text("name", "Name", "choice"),
        Field::text("label", "Label", "Choose one"),
        Field::repeater("options", "Options", &["label", "value"]),
        Field::checkbox("required", "Required", false),
    ])
}

fn checkbox_field() -> BlockTemplate {
    BlockTemplate::new("checkbox_field", "Checkbox", Category::FormField).with_fields([
        Field::text("name", "Name", "agree"),
        Field::text("label", "Label", "I agree"),
        Field::checkbox("checked", "Checked by default", false),
    ])
}

fn submit() -> BlockTemplate {
    BlockTemplate::new("submit", "Submit button", Category::FormField).with_fields([
        Field::text("text", "Label", "Send"),
        Field::select("align", "Alignment", ALIGN, "left"),
    ])
}
