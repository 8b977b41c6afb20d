//! Per-document-slot file transfer with progress and failure state.
//!
//! Each slot tracks its own transfer independently; re-uploading a slot
//! replaces its stored filename (last write wins). Size and extension
//! checks here are advisory; the backend enforces the same limits.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use hostel_types::api::UploadFileResponse;
use hostel_types::models::DocumentSlot;

use crate::api::ApiClient;
use crate::error::{ClientError, Result};

/// Advisory upload limit, mirrored server-side.
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Slot transfer state constants.
pub const STATE_IDLE: u8 = 0;
pub const STATE_UPLOADING: u8 = 1;
pub const STATE_COMPLETE: u8 = 2;
pub const STATE_FAILED: u8 = 3;

/// Shared progress state for one slot's transfer.
pub struct SlotProgress {
    pub bytes_done: AtomicU64,
    pub bytes_total: AtomicU64,
    pub state: AtomicU8,
}

impl SlotProgress {
    fn new() -> Self {
        Self {
            bytes_done: AtomicU64::new(0),
            bytes_total: AtomicU64::new(0),
            state: AtomicU8::new(STATE_IDLE),
        }
    }

    fn begin(&self, total: u64) {
        self.bytes_done.store(0, Ordering::Relaxed);
        self.bytes_total.store(total, Ordering::Relaxed);
        self.state.store(STATE_UPLOADING, Ordering::Relaxed);
    }

    /// Percent view with the dashboard's sentinel encoding:
    /// `None` = idle, `-1` = failed, `100` = complete. An in-flight
    /// transfer reports at most 99 so only completion shows 100.
    pub fn percent(&self) -> Option<i8> {
        match self.state.load(Ordering::Relaxed) {
            STATE_IDLE => None,
            STATE_FAILED => Some(-1),
            STATE_COMPLETE => Some(100),
            _ => {
                let total = self.bytes_total.load(Ordering::Relaxed);
                if total == 0 {
                    return Some(0);
                }
                let done = self.bytes_done.load(Ordering::Relaxed);
                let pct = (done.saturating_mul(100) / total).min(99);
                Some(pct as i8)
            }
        }
    }
}

struct SlotEntry {
    progress: Arc<SlotProgress>,
    filename: Option<String>,
}

impl SlotEntry {
    fn new() -> Self {
        Self {
            progress: Arc::new(SlotProgress::new()),
            filename: None,
        }
    }
}

/// Tracks uploads across all document slots for one upload session.
/// Discarded on navigation; the authoritative mapping lives on the form.
pub struct UploadManager {
    slots: Mutex<BTreeMap<DocumentSlot, SlotEntry>>,
}

impl UploadManager {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(BTreeMap::new()),
        }
    }

    /// Pre-populate slot filenames from an already-loaded form, with
    /// idle progress.
    pub fn seed(&self, files: &BTreeMap<DocumentSlot, String>) {
        let mut slots = self.slots.lock().unwrap();
        for (slot, filename) in files {
            slots.entry(*slot).or_insert_with(SlotEntry::new).filename = Some(filename.clone());
        }
    }

    /// Snapshot of the recorded slot → stored-filename mapping.
    pub fn files(&self) -> BTreeMap<DocumentSlot, String> {
        self.slots
            .lock()
            .unwrap()
            .iter()
            .filter_map(|(slot, entry)| entry.filename.clone().map(|name| (*slot, name)))
            .collect()
    }

    /// Progress handle for a slot, shared with any in-flight transfer.
    pub fn progress(&self, slot: DocumentSlot) -> Option<Arc<SlotProgress>> {
        self.slots
            .lock()
            .unwrap()
            .get(&slot)
            .map(|entry| entry.progress.clone())
    }

    pub fn percent(&self, slot: DocumentSlot) -> Option<i8> {
        self.progress(slot).and_then(|p| p.percent())
    }

    pub fn clear(&self) {
        self.slots.lock().unwrap().clear();
    }

    /// Upload `path` into `slot`.
    ///
    /// Validation failures reject before any network call. On success the
    /// slot records the server-assigned stored filename and reports 100;
    /// on failure the slot reports -1 and keeps whatever filename it had.
    pub async fn upload(
        &self,
        api: &ApiClient,
        path: &Path,
        slot: DocumentSlot,
    ) -> Result<String> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ClientError::Validation("file has no usable name".into()))?
            .to_string();

        let extension = match file_name.rfind('.') {
            Some(idx) => file_name[idx..].to_ascii_lowercase(),
            None => String::new(),
        };
        if !slot.accepted_extensions().contains(&extension.as_str()) {
            return Err(ClientError::Validation(format!(
                "{slot} does not accept '{extension}' files (allowed: {})",
                slot.accepted_extensions().join(", ")
            )));
        }

        let size = tokio::fs::metadata(path).await?.len();
        if size > MAX_UPLOAD_BYTES {
            return Err(ClientError::Validation(format!(
                "file is {size} bytes; the limit is {MAX_UPLOAD_BYTES} (5MB)"
            )));
        }

        let progress = {
            let mut slots = self.slots.lock().unwrap();
            let entry = slots.entry(slot).or_insert_with(SlotEntry::new);
            // Re-upload restarts this slot's progress from zero.
            entry.progress = Arc::new(SlotProgress::new());
            entry.progress.begin(size);
            entry.progress.clone()
        };

        match self.transfer(api, path, &file_name, size, slot, &progress).await {
            Ok(stored) => {
                progress.bytes_done.store(size, Ordering::Relaxed);
                progress.state.store(STATE_COMPLETE, Ordering::Relaxed);
                self.slots
                    .lock()
                    .unwrap()
                    .entry(slot)
                    .or_insert_with(SlotEntry::new)
                    .filename = Some(stored.clone());
                debug!(%slot, %stored, "upload complete");
                Ok(stored)
            }
            Err(err) => {
                progress.state.store(STATE_FAILED, Ordering::Relaxed);
                warn!(%slot, %err, "upload failed");
                Err(err)
            }
        }
    }

    async fn transfer(
        &self,
        api: &ApiClient,
        path: &Path,
        file_name: &str,
        size: u64,
        slot: DocumentSlot,
        progress: &Arc<SlotProgress>,
    ) -> Result<String> {
        let file = tokio::fs::File::open(path).await?;

        let counter = progress.clone();
        let stream = ReaderStream::new(file).map(move |chunk| {
            if let Ok(bytes) = &chunk {
                counter
                    .bytes_done
                    .fetch_add(bytes.len() as u64, Ordering::Relaxed);
            }
            chunk
        });

        let part = Part::stream_with_length(reqwest::Body::wrap_stream(stream), size)
            .file_name(file_name.to_string());
        let form = Form::new()
            .part("file", part)
            .text("file_type", slot.as_str());

        let response = api
            .authorize(
                api.http()
                    .post(format!("{}/api/upload-file", api.base_url()))
                    .multipart(form),
            )
            .send()
            .await
            .map_err(|err| ClientError::Transfer(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Transfer(format!("{status}: {body}")));
        }

        let parsed: UploadFileResponse = response
            .json()
            .await
            .map_err(|err| ClientError::Transfer(err.to_string()))?;
        Ok(parsed.filename)
    }
}

impl Default for UploadManager {
    fn default() -> Self {
        Self::new()
    }
}
