//! Auto-saves written straight to a [`SlotStore`]

use crate::store::{SlotStore, StoreError};
use pagesmith_editor::{SaveBackend, SaveReceipt, SaveRequest};
use std::io;
use std::sync::Arc;

/// Runs each save on the blocking pool; the store does plain file IO
#[derive(Clone)]
pub struct StoreBackend {
    store: Arc<SlotStore>,
}

impl StoreBackend {
    pub fn new(store: Arc<SlotStore>) -> Self {
        Self { store }
    }
}

impl SaveBackend for StoreBackend {
    type Error = StoreError;

    async fn save(&self, request: SaveRequest) -> Result<SaveReceipt, StoreError> {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || {
            let slot = store.slot(&request.slot)?;
            let doc = request.snapshot.into_document(slot.as_str(), store.registry());
            tracing::debug!(slot = %slot, version = request.version, "auto-saving");
            store.save(&slot, &doc)
        })
        .await
        .map_err(|e| StoreError::Io(io::Error::new(io::ErrorKind::Other, e)))?
    }
}
