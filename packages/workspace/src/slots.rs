//! Slot names and kinds.
//!
//! Slot names arrive from URLs and command lines and end up as file names,
//! so they are normalised and checked before anything touches the disk.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use unicode_normalization::UnicodeNormalization;

pub const ELEMENT_SLOTS: [&str; 2] = ["header", "footer"];
pub const MAX_SLOT_LEN: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    /// The fixed header and footer
    Element,
    Page,
}

impl SlotKind {
    pub fn namespace(&self) -> Namespace {
        match self {
            SlotKind::Element => Namespace::Elements,
            SlotKind::Page => Namespace::Pages,
        }
    }
}

/// A directory of slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    #[default]
    Pages,
    Elements,
}

impl Namespace {
    pub fn dir_name(&self) -> &'static str {
        match self {
            Namespace::Pages => "pages",
            Namespace::Elements => "elements",
        }
    }
}

impl FromStr for Namespace {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pages" => Ok(Namespace::Pages),
            "elements" => Ok(Namespace::Elements),
            other => Err(format!("unknown namespace {:?}", other)),
        }
    }
}

/// A validated slot name: `[a-z0-9][a-z0-9_-]*`, at most 64 characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotName(String);

impl SlotName {
    /// `None` when the name is not a valid slug after NFC normalisation
    pub fn parse(raw: &str) -> Option<Self> {
        let name: String = raw.trim().nfc().collect();

        let mut chars = name.chars();
        let first_ok = chars
            .next()
            .map(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
            .unwrap_or(false);
        let rest_ok = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');

        (first_ok && rest_ok && name.len() <= MAX_SLOT_LEN).then_some(SlotName(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> SlotKind {
        if ELEMENT_SLOTS.contains(&self.0.as_str()) {
            SlotKind::Element
        } else {
            SlotKind::Page
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.php", self.0)
    }
}

impl fmt::Display for SlotName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_slot_names() {
        for name in ["home", "about-us", "faq_2", "404", "header"] {
            assert!(SlotName::parse(name).is_some(), "{name} should be valid");
        }
        assert_eq!(SlotName::parse("  home ").unwrap().as_str(), "home");
    }

    #[test]
    fn test_invalid_slot_names() {
        for name in ["", "About", "../etc", "a/b", "-x", "_x", "café", "a.php", "a b"] {
            assert!(SlotName::parse(name).is_none(), "{name:?} should be rejected");
        }
        assert!(SlotName::parse(&"a".repeat(65)).is_none());
        assert!(SlotName::parse(&"a".repeat(64)).is_some());
    }

    #[test]
    fn test_slot_kinds() {
        assert_eq!(SlotName::parse("header").unwrap().kind(), SlotKind::Element);
        assert_eq!(SlotName::parse("footer").unwrap().kind(), SlotKind::Element);
        assert_eq!(SlotName::parse("home").unwrap().kind(), SlotKind::Page);
        assert_eq!(SlotKind::Page.namespace().dir_name(), "pages");
    }

    #[test]
    fn test_namespace_from_str() {
        assert_eq!("elements".parse::<Namespace>().unwrap(), Namespace::Elements);
        assert!("themes".parse::<Namespace>().is_err());
    }
}
