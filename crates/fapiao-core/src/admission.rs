//! File admission: type and size checks before any processing begins.

use crate::error::AdmissionError;

/// Maximum size of a single admitted file.
pub const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;

/// Broad document kind derived from the declared mime type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MimeKind {
    /// Any image/* subtype.
    Image,
    /// application/pdf.
    Pdf,
}

/// A raw file selection, not yet admitted.
#[derive(Debug, Clone)]
pub struct FileCandidate {
    /// File name as submitted.
    pub name: String,

    /// Declared mime type (e.g. "image/png", "application/pdf").
    pub mime_type: String,

    /// Raw file bytes.
    pub content: Vec<u8>,
}

/// A file that passed admission and is eligible for extraction.
///
/// Immutable once admitted; the pipeline only reads it.
#[derive(Debug, Clone)]
pub struct AdmittedFile {
    /// File name, unique within the batch.
    pub name: String,

    /// Declared mime type, forwarded to the extraction service.
    pub mime_type: String,

    /// Document kind, selects the extraction instruction.
    pub kind: MimeKind,

    /// Raw file bytes.
    pub content: Vec<u8>,
}

/// Outcome of admitting one submission.
#[derive(Debug, Default)]
pub struct Admission {
    /// Files eligible for extraction, in submission order.
    pub admitted: Vec<AdmittedFile>,

    /// Rejected candidates with their reasons, in submission order.
    pub rejections: Vec<AdmissionError>,
}

impl Admission {
    /// All rejection messages joined into one aggregated message.
    ///
    /// Empty string when nothing was rejected.
    pub fn rejection_summary(&self) -> String {
        self.rejections
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn classify_mime(mime_type: &str) -> Option<MimeKind> {
    if mime_type.starts_with("image/") {
        Some(MimeKind::Image)
    } else if mime_type == "application/pdf" {
        Some(MimeKind::Pdf)
    } else {
        None
    }
}

/// Validate raw file selections. Content is never inspected; only the
/// declared mime type, the byte length and name uniqueness are checked.
pub fn admit(candidates: Vec<FileCandidate>) -> Admission {
    let mut admission = Admission::default();

    for candidate in candidates {
        let Some(kind) = classify_mime(&candidate.mime_type) else {
            admission.rejections.push(AdmissionError::UnsupportedType {
                name: candidate.name,
            });
            continue;
        };

        if candidate.content.len() > MAX_FILE_BYTES {
            admission.rejections.push(AdmissionError::TooLarge {
                name: candidate.name,
            });
            continue;
        }

        // Per-file state is keyed by name; a duplicate would alias two
        // pipelines' states.
        if admission.admitted.iter().any(|f| f.name == candidate.name) {
            admission.rejections.push(AdmissionError::DuplicateName {
                name: candidate.name,
            });
            continue;
        }

        admission.admitted.push(AdmittedFile {
            name: candidate.name,
            mime_type: candidate.mime_type,
            kind,
            content: candidate.content,
        });
    }

    admission
}
