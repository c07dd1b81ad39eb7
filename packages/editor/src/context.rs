//! Per-session context.
//!
//! Everything an editing operation needs to know about its surroundings is
//! passed in explicitly through [`EditorContext`]; there is no process-wide
//! editor state.

use pagesmith_compiler::{GenerateOptions, OutputMode};
use pagesmith_document::TemplateRegistry;
use serde::{Deserialize, Serialize};

/// Switches exposed by the site's feature registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeatureFlags {
    /// Whether the builder surface is reachable at all
    pub builder_enabled: bool,
    /// Whether menus may list pages at render time
    pub auto_populate_menus: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            builder_enabled: true,
            auto_populate_menus: true,
        }
    }
}

/// Built once per request or session
#[derive(Debug, Clone, Copy)]
pub struct EditorContext<'r> {
    pub slot: &'r str,
    pub registry: &'r TemplateRegistry,
    pub features: FeatureFlags,
}

impl<'r> EditorContext<'r> {
    pub fn new(slot: &'r str, registry: &'r TemplateRegistry, features: FeatureFlags) -> Self {
        Self {
            slot,
            registry,
            features,
        }
    }

    /// Context over the built-in catalogue with default features
    pub fn builtin(slot: &'r str) -> Self {
        Self::new(slot, TemplateRegistry::builtin(), FeatureFlags::default())
    }

    /// Generation options matching this context's features
    pub fn generate_options(&self, mode: OutputMode) -> GenerateOptions {
        GenerateOptions {
            mode,
            auto_populate_menus: self.features.auto_populate_menus,
            ..Default::default()
        }
    }
}
