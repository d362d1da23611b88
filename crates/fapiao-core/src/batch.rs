//! Batch orchestration: one extraction pipeline per admitted file.
//!
//! Every file moves through `pending → processing → {success | error}`.
//! Pipelines run concurrently as joined futures and fail independently;
//! one file's failure never aborts or rolls back its siblings. The batch
//! outcome is computed only after every pipeline reaches a terminal state.

use futures_util::future::join_all;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use crate::admission::AdmittedFile;
use crate::extract::{instruction_for, parse_payload, ExtractionClient, ExtractionRequest};
use crate::models::{InvoiceStatus, NewInvoice};
use crate::normalize::normalize;
use crate::store::RecordSink;

/// Processing status of one file within a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// Admitted, pipeline not yet started.
    #[default]
    Pending,
    /// Pipeline in flight.
    Processing,
    /// Terminal: record normalized and saved.
    Success,
    /// Terminal: pipeline failed.
    Error,
}

impl FileStatus {
    /// Success and Error are absorbing within a batch.
    pub fn is_terminal(self) -> bool {
        matches!(self, FileStatus::Success | FileStatus::Error)
    }
}

/// Per-file processing state, readable throughout the batch for display.
#[derive(Debug, Clone, Default)]
pub struct FileProcessingState {
    /// Current status.
    pub status: FileStatus,

    /// Progress indicator, 0-100.
    pub progress: u8,

    /// Failure message; populated only in Error.
    pub error: Option<String>,

    /// Normalized record (pre-save view, without the store-assigned id);
    /// populated only in Success.
    pub result: Option<NewInvoice>,
}

/// Shared, name-keyed view of a batch's per-file states.
///
/// Writers are the per-file pipelines, one per key. Readers take
/// [`BatchProgress::snapshot`] and must tolerate staleness.
#[derive(Clone, Default)]
pub struct BatchProgress {
    inner: Arc<Mutex<HashMap<String, FileProcessingState>>>,
}

impl BatchProgress {
    /// Create pending entries for every admitted file.
    pub fn new(admitted: &[AdmittedFile]) -> Self {
        let states = admitted
            .iter()
            .map(|f| (f.name.clone(), FileProcessingState::default()))
            .collect();
        Self {
            inner: Arc::new(Mutex::new(states)),
        }
    }

    /// Clone of the current state map.
    pub fn snapshot(&self) -> HashMap<String, FileProcessingState> {
        self.inner.lock().expect("progress lock poisoned").clone()
    }

    /// Current state of one file, if it belongs to this batch.
    pub fn get(&self, name: &str) -> Option<FileProcessingState> {
        self.inner
            .lock()
            .expect("progress lock poisoned")
            .get(name)
            .cloned()
    }

    /// Apply a mutation unless the file is already terminal.
    fn update(&self, name: &str, apply: impl FnOnce(&mut FileProcessingState)) {
        let mut states = self.inner.lock().expect("progress lock poisoned");
        if let Some(state) = states.get_mut(name) {
            if !state.status.is_terminal() {
                apply(state);
            }
        }
    }

    fn mark_processing(&self, name: &str) {
        self.update(name, |s| {
            s.status = FileStatus::Processing;
            s.progress = 0;
        });
    }

    fn set_progress(&self, name: &str, progress: u8) {
        self.update(name, |s| s.progress = progress.min(100));
    }

    fn mark_success(&self, name: &str, result: NewInvoice) {
        self.update(name, |s| {
            s.status = FileStatus::Success;
            s.progress = 100;
            s.result = Some(result);
        });
    }

    fn mark_error(&self, name: &str, message: String) {
        self.update(name, |s| {
            s.status = FileStatus::Error;
            s.progress = 0;
            s.error = Some(message);
        });
    }

    /// True once every file is in a terminal state.
    pub fn is_complete(&self) -> bool {
        self.inner
            .lock()
            .expect("progress lock poisoned")
            .values()
            .all(|s| s.status.is_terminal())
    }
}

/// Aggregate result of one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Files that reached Success.
    pub succeeded: usize,

    /// Files that reached Error.
    pub failed: usize,
}

impl BatchOutcome {
    /// Number of admitted files in the batch.
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    /// Whether any file failed.
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// User-visible summary line.
    pub fn summary(&self) -> String {
        if self.has_failures() {
            format!("{} of {} files failed", self.failed, self.total())
        } else {
            format!("all {} files processed", self.total())
        }
    }
}

/// Drives admitted files through extraction, normalization and persistence.
#[derive(Clone)]
pub struct BatchOrchestrator {
    client: Arc<dyn ExtractionClient>,
    sink: Arc<dyn RecordSink>,
}

impl BatchOrchestrator {
    /// Build an orchestrator over an extraction client and a record sink.
    pub fn new(client: Arc<dyn ExtractionClient>, sink: Arc<dyn RecordSink>) -> Self {
        Self { client, sink }
    }

    /// Run one batch to completion and report the aggregate outcome.
    ///
    /// Overlapping batches are allowed; each call owns its `progress` map
    /// and shares nothing with other batches except the record sink.
    pub async fn run_batch(
        &self,
        admitted: Vec<AdmittedFile>,
        progress: BatchProgress,
    ) -> BatchOutcome {
        let pipelines = admitted
            .into_iter()
            .map(|file| self.process_file(file, &progress));
        let results = join_all(pipelines).await;

        let succeeded = results.iter().filter(|ok| **ok).count();
        let outcome = BatchOutcome {
            succeeded,
            failed: results.len() - succeeded,
        };
        debug!(
            succeeded = outcome.succeeded,
            failed = outcome.failed,
            "batch complete"
        );
        outcome
    }

    /// One file's pipeline: extract, parse, normalize, save. Steps are
    /// strictly sequential; any failure is terminal for this file only.
    async fn process_file(&self, file: AdmittedFile, progress: &BatchProgress) -> bool {
        progress.mark_processing(&file.name);
        debug!(file = %file.name, mime_type = %file.mime_type, "pipeline started");

        let request = ExtractionRequest {
            content: &file.content,
            mime_type: &file.mime_type,
            instruction: instruction_for(file.kind),
        };
        let text = match self.client.extract(request).await {
            Ok(text) => text,
            Err(e) => {
                warn!(file = %file.name, error = %e, "extraction failed");
                progress.mark_error(&file.name, e.to_string());
                return false;
            }
        };
        progress.set_progress(&file.name, 60);

        let raw = match parse_payload(&text) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(file = %file.name, error = %e, "extraction payload unusable");
                progress.mark_error(&file.name, e.to_string());
                return false;
            }
        };

        let invoice = match normalize(&raw) {
            Ok(invoice) => invoice,
            Err(e) => {
                warn!(file = %file.name, error = %e, "normalization failed");
                progress.mark_error(&file.name, e.to_string());
                return false;
            }
        };
        progress.set_progress(&file.name, 80);

        match self.sink.save(invoice.clone(), InvoiceStatus::Pending).await {
            Ok(record) => {
                debug!(file = %file.name, id = %record.id, "record saved");
                progress.mark_success(&file.name, invoice);
                true
            }
            Err(e) => {
                warn!(file = %file.name, error = %e, "save failed");
                progress.mark_error(&file.name, e.to_string());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admission::MimeKind;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn admitted(name: &str) -> AdmittedFile {
        AdmittedFile {
            name: name.to_string(),
            mime_type: "image/png".to_string(),
            kind: MimeKind::Image,
            content: vec![1, 2, 3],
        }
    }

    fn invoice() -> NewInvoice {
        NewInvoice {
            invoice_number: "INV1".to_string(),
            invoice_type: "普通发票".to_string(),
            date: "2025-01-01".to_string(),
            amount: Decimal::new(10050, 2),
            vendor: "X".to_string(),
        }
    }

    #[test]
    fn terminal_states_are_absorbing() {
        let files = vec![admitted("a.png")];
        let progress = BatchProgress::new(&files);

        progress.mark_processing("a.png");
        progress.mark_error("a.png", "boom".to_string());

        // Neither a later success nor progress ticks may leave Error.
        progress.mark_success("a.png", invoice());
        progress.set_progress("a.png", 50);

        let state = progress.get("a.png").unwrap();
        assert_eq!(state.status, FileStatus::Error);
        assert_eq!(state.progress, 0);
        assert_eq!(state.error.as_deref(), Some("boom"));
        assert_eq!(state.result, None);
    }

    #[test]
    fn success_carries_result_and_full_progress() {
        let files = vec![admitted("a.png")];
        let progress = BatchProgress::new(&files);

        progress.mark_processing("a.png");
        progress.mark_success("a.png", invoice());

        let state = progress.get("a.png").unwrap();
        assert_eq!(state.status, FileStatus::Success);
        assert_eq!(state.progress, 100);
        assert_eq!(state.result, Some(invoice()));
        assert_eq!(state.error, None);
    }

    #[test]
    fn unknown_file_updates_are_ignored() {
        let progress = BatchProgress::new(&[]);
        progress.mark_processing("ghost.png");
        assert!(progress.snapshot().is_empty());
    }

    #[test]
    fn states_start_pending() {
        let files = vec![admitted("a.png"), admitted("b.pdf")];
        let progress = BatchProgress::new(&files);

        let snapshot = progress.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.values().all(|s| s.status == FileStatus::Pending));
        assert!(!progress.is_complete());
    }

    #[test]
    fn outcome_summary_wording() {
        let clean = BatchOutcome { succeeded: 3, failed: 0 };
        assert_eq!(clean.summary(), "all 3 files processed");
        assert!(!clean.has_failures());

        let partial = BatchOutcome { succeeded: 1, failed: 2 };
        assert_eq!(partial.summary(), "2 of 3 files failed");
        assert!(partial.has_failures());
    }
}
