use anyhow::Result;
use pagesmith_workspace::{Config, SlotStore};
use std::path::{Path, PathBuf};

/// A project directory with its config and command-line overrides applied
#[derive(Debug, Clone)]
pub struct Project {
    pub dir: PathBuf,
    pub config: Config,
}

impl Project {
    pub fn load(dir: &Path, storage_dir: Option<String>) -> Result<Self> {
        let mut config = Config::load(dir)?;
        if let Some(storage_dir) = storage_dir {
            config.storage_dir = storage_dir;
        }
        Ok(Self {
            dir: dir.to_path_buf(),
            config,
        })
    }

    pub fn storage_path(&self) -> PathBuf {
        self.config.storage_path(&self.dir)
    }

    pub fn store(&self) -> SlotStore {
        SlotStore::new(self.storage_path())
            .with_features(self.config.features)
            .with_site_title(&self.config.site_title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_storage_override() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("pagesmith.config.json"),
            r#"{ "storageDir": "public", "siteTitle": "Bakery" }"#,
        )
        .unwrap();

        let project = Project::load(dir.path(), None).unwrap();
        assert_eq!(project.storage_path(), dir.path().join("public"));
        assert_eq!(project.config.site_title, "Bakery");

        let project = Project::load(dir.path(), Some("out".to_string())).unwrap();
        assert_eq!(project.storage_path(), dir.path().join("out"));
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let project = Project::load(dir.path(), None).unwrap();
        assert_eq!(project.storage_path(), dir.path().join("site"));
    }
}
