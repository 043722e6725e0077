// Debounced persistence: a burst of edits turns into one write once things go quiet.
//
// At most one write is pending at a time. Scheduling again cancels the pending timer and starts
// a new one with the newer payload. Once a timer has fired its write always runs to completion,
// and writes are serialised so they land in the order they were scheduled.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::StorageError;
use crate::storage::Storage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveFailure {
    pub key: String,
    pub message: String,
}

struct PendingWrite {
    token: CancellationToken,
    started: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

pub struct SaveScheduler {
    storage: Arc<dyn Storage>,
    key: &'static str,
    delay: Duration,
    root: CancellationToken,
    pending: Option<PendingWrite>,
    latest: Option<Arc<String>>,
    write_lock: Arc<Mutex<()>>,
    notices: Option<mpsc::UnboundedSender<SaveFailure>>,
}

impl SaveScheduler {
    pub fn new(storage: Arc<dyn Storage>, key: &'static str, delay: Duration) -> Self {
        Self {
            storage,
            key,
            delay,
            root: CancellationToken::new(),
            pending: None,
            latest: None,
            write_lock: Arc::new(Mutex::new(())),
            notices: None,
        }
    }

    // Failed writes are reported here as well as in the log.
    pub fn set_notices(&mut self, notices: mpsc::UnboundedSender<SaveFailure>) {
        self.notices = Some(notices);
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| !pending.handle.is_finished())
    }

    pub fn schedule(&mut self, payload: String) {
        let payload = Arc::new(payload);
        self.latest = Some(payload.clone());

        if let Some(pending) = self.pending.take() {
            pending.token.cancel();
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            // No runtime to debounce on, so write straight away.
            log::debug!("No async runtime, writing {} synchronously", self.key);
            if let Err(e) = self.storage.set(self.key, &payload) {
                report_failure(self.key, &e, self.notices.as_ref());
            }
            return;
        };

        let token = self.root.child_token();
        let started = Arc::new(AtomicBool::new(false));
        let task = WriteTask {
            storage: self.storage.clone(),
            key: self.key,
            payload,
            write_lock: self.write_lock.clone(),
            notices: self.notices.clone(),
        };
        let delay = self.delay;
        let task_token = token.clone();
        let task_started = started.clone();

        let handle = runtime.spawn(async move {
            tokio::select! {
                biased;
                _ = task_token.cancelled() => {
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }
            task_started.store(true, Ordering::SeqCst);
            task.run().await;
        });

        self.pending = Some(PendingWrite {
            token,
            started,
            handle,
        });
    }

    /// Waits for the most recently scheduled write, if any, to fire and finish.
    pub async fn settled(&mut self) {
        if let Some(pending) = self.pending.take() {
            if let Err(e) = pending.handle.await {
                log::error!("Save task for {} failed: {e}", self.key);
            }
        }
    }

    /// Writes the newest payload now instead of waiting for the quiet period.
    pub async fn flush(&mut self) -> Result<(), StorageError> {
        let Some(pending) = self.pending.take() else {
            return Ok(());
        };
        pending.token.cancel();
        if let Err(e) = pending.handle.await {
            log::error!("Save task for {} failed: {e}", self.key);
        }
        if pending.started.load(Ordering::SeqCst) {
            return Ok(());
        }

        let Some(payload) = self.latest.clone() else {
            return Ok(());
        };
        let task = WriteTask {
            storage: self.storage.clone(),
            key: self.key,
            payload,
            write_lock: self.write_lock.clone(),
            notices: None,
        };
        task.write().await
    }

    // Drops the pending timer without writing. Used on teardown.
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.token.cancel();
        }
    }
}

impl Drop for SaveScheduler {
    fn drop(&mut self) {
        self.root.cancel();
    }
}

struct WriteTask {
    storage: Arc<dyn Storage>,
    key: &'static str,
    payload: Arc<String>,
    write_lock: Arc<Mutex<()>>,
    notices: Option<mpsc::UnboundedSender<SaveFailure>>,
}

impl WriteTask {
    async fn run(self) {
        let key = self.key;
        let notices = self.notices.clone();
        if let Err(e) = self.write().await {
            report_failure(key, &e, notices.as_ref());
        }
    }

    // The file write happens on the blocking pool; the lock keeps writes in order.
    async fn write(self) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let storage = self.storage;
        let key = self.key;
        let payload = self.payload;
        tokio::task::spawn_blocking(move || storage.set(key, &payload)).await??;
        log::debug!("Persisted {key}");
        Ok(())
    }
}

fn report_failure(
    key: &str,
    error: &StorageError,
    notices: Option<&mpsc::UnboundedSender<SaveFailure>>,
) {
    log::error!("Error saving {key}: {error}");
    if let Some(notices) = notices {
        let _ = notices.send(SaveFailure {
            key: key.to_string(),
            message: error.to_string(),
        });
    }
}
