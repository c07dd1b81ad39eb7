//! Escaping for the two contexts generated code interpolates into:
//! HTML markup and single-quoted PHP string literals.

/// Escape text for use in element content or a double-quoted attribute
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Backslash-escape a string for the inside of a single-quoted PHP literal.
///
/// Single-quoted PHP strings only recognise `\\` and `\'`, so those are
/// the only two sequences produced.
pub fn addslashes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            _ => out.push(ch),
        }
    }
    out
}

/// A complete single-quoted PHP string literal
pub fn php_literal(text: &str) -> String {
    format!("'{}'", addslashes(text))
}

/// Reduce a style key to characters valid in a CSS custom property name
pub fn css_ident(name: &str) -> String {
    name.chars()
        .filter_map(|ch| match ch {
            'a'..='z' | '0'..='9' | '-' => Some(ch),
            'A'..='Z' => Some(ch.to_ascii_lowercase()),
            '_' => Some('-'),
            _ => None,
        })
        .collect()
}

/// Keep a CSS value from escaping its declaration
pub fn css_value(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !matches!(ch, ';' | '{' | '}' | '\n' | '\r'))
        .collect::<String>()
        .trim()
        .to_string()
}
