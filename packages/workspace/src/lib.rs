//! # Pagesmith Workspace
//!
//! Persistence and serving for the page builder: slot files on disk with
//! rolling backups, the project config, and the JSON API the builder UI
//! talks to.

pub mod api;
pub mod backend;
pub mod config;
pub mod defaults;
pub mod slots;
pub mod store;

pub use api::{router, serve, ApiError, AppState, ClientSettings};
pub use backend::StoreBackend;
pub use config::{Config, ConfigError, DEFAULT_CONFIG_NAME};
pub use defaults::default_tree;
pub use slots::{Namespace, SlotKind, SlotName, ELEMENT_SLOTS};
pub use store::{BackupInfo, SlotStore, StoreError, StoreResult, MAX_BACKUPS};
