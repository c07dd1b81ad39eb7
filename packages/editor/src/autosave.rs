//! # Auto-save
//!
//! A single-slot register holds the latest unsaved snapshot. A saver task
//! waits for the register to go quiet for the debounce period, then writes
//! whatever is in it.
//!
//! - Scheduling never blocks and never queues: a newer request replaces an
//!   older one that has not been picked up yet.
//! - At most one save is in flight. Requests that arrive meanwhile are
//!   picked up after it completes.
//! - A failed save is not retried. The next edit schedules the next
//!   attempt.

use pagesmith_compiler::Snapshot;
use serde::Serialize;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Everything needed to persist one slot
#[derive(Debug, Clone)]
pub struct SaveRequest {
    pub slot: String,
    /// Document version the snapshot was taken at
    pub version: u64,
    pub snapshot: Snapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReceipt {
    pub bytes_written: usize,
    pub backup_created: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SaveStatus {
    Idle,
    Pending { version: u64 },
    Saving { version: u64 },
    #[serde(rename_all = "camelCase")]
    Saved { version: u64, bytes_written: usize },
    Failed { version: u64, error: String },
}

/// Where auto-saves go
pub trait SaveBackend: Send + Sync + 'static {
    type Error: Display + Send;

    fn save(
        &self,
        request: SaveRequest,
    ) -> impl Future<Output = Result<SaveReceipt, Self::Error>> + Send;
}

/// Handle to a running saver task
pub struct AutoSaver {
    pending: watch::Sender<Option<SaveRequest>>,
    status: watch::Receiver<SaveStatus>,
    task: JoinHandle<()>,
}

impl AutoSaver {
    /// Spawn the saver task on the current tokio runtime
    pub fn spawn<B: SaveBackend>(backend: B, debounce: Duration) -> Self {
        let (pending_tx, pending_rx) = watch::channel(None);
        let (status_tx, status_rx) = watch::channel(SaveStatus::Idle);
        let task = tokio::spawn(run_saver(backend, debounce, pending_rx, status_tx));

        Self {
            pending: pending_tx,
            status: status_rx,
            task,
        }
    }

    /// Replace the pending request and restart the debounce timer
    pub fn schedule(&self, request: SaveRequest) {
        tracing::trace!(slot = %request.slot, version = request.version, "save scheduled");
        self.pending.send_replace(Some(request));
    }

    pub fn status(&self) -> watch::Receiver<SaveStatus> {
        self.status.clone()
    }

    /// Write any pending request immediately and stop the task
    pub async fn shutdown(self) {
        drop(self.pending);
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "saver task failed");
        }
    }
}

async fn run_saver<B: SaveBackend>(
    backend: B,
    debounce: Duration,
    mut pending: watch::Receiver<Option<SaveRequest>>,
    status: watch::Sender<SaveStatus>,
) {
    while pending.changed().await.is_ok() {
        if let Some(request) = pending.borrow().as_ref() {
            status.send_replace(SaveStatus::Pending {
                version: request.version,
            });
        }

        let mut closed = false;
        loop {
            match tokio::time::timeout(debounce, pending.changed()).await {
                // A newer request restarts the timer
                Ok(Ok(())) => continue,
                Ok(Err(_)) => {
                    closed = true;
                    break;
                }
                Err(_) => break,
            }
        }

        let request = pending.borrow_and_update().clone();
        if let Some(request) = request {
            save_one(&backend, request, &status).await;
        }

        if closed {
            break;
        }
    }

    tracing::debug!("saver task stopped");
}

async fn save_one<B: SaveBackend>(backend: &B, request: SaveRequest, status: &watch::Sender<SaveStatus>) {
    let slot = request.slot.clone();
    let version = request.version;
    status.send_replace(SaveStatus::Saving { version });

    match backend.save(request).await {
        Ok(receipt) => {
            tracing::info!(
                slot = %slot,
                version,
                bytes = receipt.bytes_written,
                backup = receipt.backup_created,
                "auto-saved"
            );
            status.send_replace(SaveStatus::Saved {
                version,
                bytes_written: receipt.bytes_written,
            });
        }
        Err(e) => {
            tracing::warn!(slot = %slot, version, error = %e, "auto-save failed");
            status.send_replace(SaveStatus::Failed {
                version,
                error: e.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    const DEBOUNCE: Duration = Duration::from_millis(40);

    #[derive(Clone, Default)]
    struct Recorder {
        versions: Arc<Mutex<Vec<u64>>>,
        fail: bool,
    }

    impl SaveBackend for Recorder {
        type Error = String;

        async fn save(&self, request: SaveRequest) -> Result<SaveReceipt, String> {
            self.versions.lock().unwrap().push(request.version);
            if self.fail {
                Err("disk full".to_string())
            } else {
                Ok(SaveReceipt {
                    bytes_written: 10,
                    backup_created: false,
                })
            }
        }
    }

    fn request(version: u64) -> SaveRequest {
        SaveRequest {
            slot: "home".to_string(),
            version,
            snapshot: Snapshot::default(),
        }
    }

    async fn wait_until(status: &mut watch::Receiver<SaveStatus>, done: impl Fn(&SaveStatus) -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if done(&status.borrow_and_update()) {
                    return;
                }
                status.changed().await.unwrap();
            }
        })
        .await
        .expect("timed out waiting for save status");
    }

    #[tokio::test]
    async fn test_rapid_edits_coalesce_into_latest() {
        let backend = Recorder::default();
        let saver = AutoSaver::spawn(backend.clone(), DEBOUNCE);
        let mut status = saver.status();

        for version in 1..=3 {
            saver.schedule(request(version));
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        wait_until(&mut status, |s| matches!(s, SaveStatus::Saved { version: 3, .. })).await;
        assert_eq!(*backend.versions.lock().unwrap(), vec![3]);
    }

    #[tokio::test]
    async fn test_failed_save_waits_for_next_edit() {
        let backend = Recorder {
            fail: true,
            ..Default::default()
        };
        let saver = AutoSaver::spawn(backend.clone(), DEBOUNCE);
        let mut status = saver.status();

        saver.schedule(request(1));
        wait_until(&mut status, |s| matches!(s, SaveStatus::Failed { version: 1, .. })).await;

        tokio::time::sleep(DEBOUNCE * 4).await;
        assert_eq!(backend.versions.lock().unwrap().len(), 1);

        saver.schedule(request(2));
        wait_until(&mut status, |s| matches!(s, SaveStatus::Failed { version: 2, .. })).await;
        assert_eq!(*backend.versions.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_shutdown_flushes_pending_request() {
        let backend = Recorder::default();
        let saver = AutoSaver::spawn(backend.clone(), Duration::from_secs(60));

        saver.schedule(request(7));
        tokio::task::yield_now().await;
        saver.shutdown().await;

        assert_eq!(*backend.versions.lock().unwrap(), vec![7]);
    }
}
