//! Auto-populated menus.
//!
//! A menu with `auto_populate` set does not bake its entries into the
//! generated file. It emits PHP that lists the page directory each time the
//! file runs, so pages created later show up without regenerating the
//! header. [`auto_entries`] computes the same list in Rust for previews.

use crate::escape::php_literal;
use crate::renderers::RenderInput;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
    pub slug: String,
    pub label: String,
    pub url: String,
}

/// Entries for the given page slugs: home first, the rest in byte order
pub fn auto_entries(pages: &[String], home_slug: &str, home_label: &str) -> Vec<MenuEntry> {
    let mut slugs: Vec<&String> = pages.iter().collect();
    slugs.sort_by(|a, b| {
        let a_home = a.as_str() == home_slug;
        let b_home = b.as_str() == home_slug;
        b_home.cmp(&a_home).then_with(|| a.cmp(b))
    });
    slugs.dedup();

    slugs
        .into_iter()
        .map(|slug| {
            if slug == home_slug {
                MenuEntry {
                    slug: slug.clone(),
                    label: home_label.to_string(),
                    url: "/".to_string(),
                }
            } else {
                MenuEntry {
                    slug: slug.clone(),
                    label: page_label(slug),
                    url: format!("/{}", slug),
                }
            }
        })
        .collect()
}

/// `about-us` → `About Us`, matching PHP's `ucwords(str_replace(['-', '_'], ' ', $slug))`
pub fn page_label(slug: &str) -> String {
    let mut label = String::with_capacity(slug.len());
    let mut word_start = true;
    for ch in slug.chars() {
        let ch = if ch == '-' || ch == '_' { ' ' } else { ch };
        if word_start {
            label.extend(ch.to_uppercase());
        } else {
            label.push(ch);
        }
        word_start = ch.is_whitespace();
    }
    label
}

/// PHP markup that builds the menu when the generated file executes
pub(crate) fn auto_menu_markup(input: &RenderInput<'_>, pages_dir: &str) -> String {
    let home_slug = input.raw_text("home_slug");
    let home_label = input.raw_text("home_label");

    let lines = [
        format!(
            r#"<nav class="{}" style="{}">"#,
            input.class_with(&format!("ps-menu-{}", input.text("orientation"))),
            input.spacing_style()
        ),
        "<?php".to_string(),
        format!("$ps_home = {};", php_literal(&home_slug)),
        format!("$ps_home_label = {};", php_literal(&home_label)),
        "$ps_pages = [];".to_string(),
        format!(
            "foreach (glob(__DIR__ . '/' . {} . '/*.php') ?: [] as $ps_file) {{",
            php_literal(pages_dir)
        ),
        "    $ps_pages[] = basename($ps_file, '.php');".to_string(),
        "}".to_string(),
        "usort($ps_pages, function ($a, $b) use ($ps_home) {".to_string(),
        "    if ($a === $ps_home) { return -1; }".to_string(),
        "    if ($b === $ps_home) { return 1; }".to_string(),
        "    return strcmp($a, $b);".to_string(),
        "});".to_string(),
        "?>".to_string(),
        "<ul>".to_string(),
        "<?php foreach ($ps_pages as $ps_page): ?>".to_string(),
        concat!(
            r#"  <li><a href="<?= htmlspecialchars($ps_page === $ps_home ? '/' : '/' . rawurlencode($ps_page)) ?>">"#,
            r#"<?= htmlspecialchars($ps_page === $ps_home ? $ps_home_label : ucwords(str_replace(['-', '_'], ' ', $ps_page))) ?>"#,
            "</a></li>"
        )
        .to_string(),
        "<?php endforeach; ?>".to_string(),
        "</ul>".to_string(),
        "</nav>".to_string(),
    ];

    lines.join("\n")
}
