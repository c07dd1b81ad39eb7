use crate::catalogue;
use crate::template::{BlockTemplate, Category};
use std::collections::HashMap;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Unknown block type: {0}")]
    UnknownType(String),

    #[error("Duplicate block type: {0}")]
    DuplicateType(String),
}

/// Catalogue of block templates, looked up by type id
#[derive(Debug)]
pub struct TemplateRegistry {
    templates: Vec<BlockTemplate>,
    index: HashMap<String, usize>,
}

impl TemplateRegistry {
    pub fn new(templates: Vec<BlockTemplate>) -> Result<Self, RegistryError> {
        let mut index = HashMap::with_capacity(templates.len());
        for (position, template) in templates.iter().enumerate() {
            if index.insert(template.type_id.clone(), position).is_some() {
                return Err(RegistryError::DuplicateType(template.type_id.clone()));
            }
        }

        Ok(Self { templates, index })
    }

    /// Built-in catalogue, loaded once per process
    pub fn builtin() -> &'static TemplateRegistry {
        static BUILTIN: OnceLock<TemplateRegistry> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            let templates = catalogue::builtin_templates();
            let index = templates
                .iter()
                .enumerate()
                .map(|(position, t)| (t.type_id.clone(), position))
                .collect();
            TemplateRegistry { templates, index }
        })
    }

    pub fn resolve(&self, type_id: &str) -> Result<&BlockTemplate, RegistryError> {
        self.index
            .get(type_id)
            .map(|&position| &self.templates[position])
            .ok_or_else(|| RegistryError::UnknownType(type_id.to_string()))
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.index.contains_key(type_id)
    }

    pub fn templates(&self) -> &[BlockTemplate] {
        &self.templates
    }

    /// Templates grouped for palette display, in catalogue order
    pub fn categories(&self) -> Vec<(Category, Vec<&BlockTemplate>)> {
        let mut groups: Vec<(Category, Vec<&BlockTemplate>)> = Vec::new();
        for template in &self.templates {
            match groups.iter_mut().find(|(category, _)| *category == template.category) {
                Some((_, members)) => members.push(template),
                None => groups.push((template.category, vec![template])),
            }
        }
        groups
    }
}
