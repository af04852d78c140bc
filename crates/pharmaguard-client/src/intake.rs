//! Genomic file intake: validation and the upload state machine.
//!
//! The intake exclusively owns the active [`GenomicFile`]. Whenever the active
//! file changes (selection, removal, or a rejection that drops it) the
//! registered [`FileChangeListener`] is notified so results computed from a
//! previous file are dropped.

use std::path::Path;
use std::sync::Arc;

use pharmaguard_common::ValidationError;
use tracing::{debug, info, warn};

/// Largest accepted file, inclusive (5 MiB).
pub const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

pub const ACCEPTED_EXTENSION: &str = "vcf";

/// Percentage points added per upload tick.
const UPLOAD_STEP: u8 = 15;

/// A validated variant file held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenomicFile {
    name: String,
    size_bytes: u64,
    extension: String,
    content: Vec<u8>,
}

impl GenomicFile {
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        let name = name.into();
        Self {
            extension: extension_of(&name),
            size_bytes: content.len() as u64,
            name,
            content,
        }
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn size_bytes(&self) -> u64 { self.size_bytes }
    pub fn extension(&self) -> &str { &self.extension }
    pub fn content(&self) -> &[u8] { &self.content }

    /// Size in MB with two decimals, e.g. "0.42 MB".
    pub fn display_size(&self) -> String {
        format!("{:.2} MB", self.size_bytes as f64 / 1024.0 / 1024.0)
    }
}

/// Lower-cased text after the last dot, empty when the name has none.
/// A dotless name such as "vcf" is rejected rather than read as all
/// extension.
pub fn extension_of(name: &str) -> String {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default()
}

/// Check name and size of a candidate before its content is loaded.
/// The format check runs first.
pub fn validate_candidate(name: &str, size_bytes: u64) -> Result<(), ValidationError> {
    let extension = extension_of(name);
    if extension != ACCEPTED_EXTENSION {
        return Err(ValidationError::UnsupportedExtension {
            name: name.to_string(),
            extension,
        });
    }
    if size_bytes > MAX_FILE_SIZE {
        return Err(ValidationError::TooLarge {
            name: name.to_string(),
            size_bytes,
            max_bytes: MAX_FILE_SIZE,
        });
    }
    Ok(())
}

/// Notified whenever the active file changes.
pub trait FileChangeListener: Send + Sync {
    fn file_changed(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeStatus {
    Idle,
    Validating,
    Error,
    Uploading,
    Success,
}

impl IntakeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntakeStatus::Idle       => "idle",
            IntakeStatus::Validating => "validating",
            IntakeStatus::Error      => "error",
            IntakeStatus::Uploading  => "uploading",
            IntakeStatus::Success    => "success",
        }
    }
}

/// What happened to a selection attempt that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Accepted,
    /// Selection is locked while an upload is running.
    Ignored,
}

pub struct FileIntake {
    file: Option<GenomicFile>,
    status: IntakeStatus,
    error: Option<&'static str>,
    progress: u8,
    listener: Option<Arc<dyn FileChangeListener>>,
}

impl Default for FileIntake {
    fn default() -> Self {
        Self::new()
    }
}

impl FileIntake {
    pub fn new() -> Self {
        Self {
            file: None,
            status: IntakeStatus::Idle,
            error: None,
            progress: 0,
            listener: None,
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn FileChangeListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn file(&self) -> Option<&GenomicFile> { self.file.as_ref() }
    pub fn status(&self) -> IntakeStatus { self.status }
    pub fn error_message(&self) -> Option<&'static str> { self.error }
    pub fn progress(&self) -> u8 { self.progress }

    /// Validate and store a candidate file.
    ///
    /// On rejection the stored file is cleared and the intake enters `Error`.
    pub fn select_file(&mut self, candidate: GenomicFile) -> Result<Selection, ValidationError> {
        if self.status == IntakeStatus::Uploading {
            debug!(name = candidate.name(), "File selection ignored during upload");
            return Ok(Selection::Ignored);
        }

        self.error = None;
        self.status = IntakeStatus::Validating;

        if let Err(e) = validate_candidate(candidate.name(), candidate.size_bytes()) {
            self.reject(&e);
            return Err(e);
        }

        info!(
            name = candidate.name(),
            size_bytes = candidate.size_bytes(),
            "Accepted genomic file"
        );
        self.file = Some(candidate);
        self.status = IntakeStatus::Idle;
        self.notify();
        Ok(Selection::Accepted)
    }

    /// Read a file from disk and select it. Size and extension are checked
    /// against metadata before the content is read.
    pub async fn select_path(&mut self, path: &Path) -> pharmaguard_common::Result<Selection> {
        if self.status == IntakeStatus::Uploading {
            return Ok(Selection::Ignored);
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.error = None;
        self.status = IntakeStatus::Validating;

        let metadata = match tokio::fs::metadata(path).await {
            Ok(m) => m,
            Err(e) => {
                self.status = IntakeStatus::Idle;
                return Err(e.into());
            }
        };
        if let Err(e) = validate_candidate(&name, metadata.len()) {
            self.reject(&e);
            return Err(e.into());
        }

        let content = match tokio::fs::read(path).await {
            Ok(c) => c,
            Err(e) => {
                self.status = IntakeStatus::Idle;
                return Err(e.into());
            }
        };
        Ok(self.select_file(GenomicFile::new(name, content))?)
    }

    /// Clear file, error and progress unconditionally.
    pub fn remove_file(&mut self) {
        self.file = None;
        self.error = None;
        self.progress = 0;
        self.status = IntakeStatus::Idle;
        self.notify();
    }

    /// Begin the upload of the stored file. Returns false when there is no
    /// file or an upload is running or finished.
    pub fn start_upload(&mut self) -> bool {
        if self.file.is_none()
            || matches!(self.status, IntakeStatus::Uploading | IntakeStatus::Success)
        {
            return false;
        }
        self.status = IntakeStatus::Uploading;
        self.progress = 0;
        true
    }

    /// Advance upload progress by one step; reaching 100 completes it.
    pub fn advance_upload(&mut self) -> u8 {
        if self.status != IntakeStatus::Uploading {
            return self.progress;
        }
        self.progress = self.progress.saturating_add(UPLOAD_STEP).min(100);
        if self.progress == 100 {
            self.status = IntakeStatus::Success;
        }
        self.progress
    }

    fn reject(&mut self, err: &ValidationError) {
        warn!(error = %err, "Rejected genomic file");
        self.error = Some(err.user_message());
        self.status = IntakeStatus::Error;
        if self.file.take().is_some() {
            self.notify();
        }
    }

    fn notify(&self) {
        if let Some(listener) = &self.listener {
            listener.file_changed();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingListener(AtomicUsize);

    impl FileChangeListener for CountingListener {
        fn file_changed(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn vcf(name: &str, size: usize) -> GenomicFile {
        GenomicFile::new(name, vec![b'#'; size])
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("sample.VCF"), "vcf");
        assert_eq!(extension_of("sample.vcf.gz"), "gz");
        assert_eq!(extension_of("vcf"), "");
        assert_eq!(extension_of(".vcf"), "vcf");
    }

    #[test]
    fn test_rejects_wrong_extension_in_any_case() {
        for name in ["report.txt", "data.VCFX", "archive.vcf.gz", "noext", "notes.Txt"] {
            let mut intake = FileIntake::new();
            let err = intake.select_file(vcf(name, 10)).unwrap_err();
            assert!(matches!(err, ValidationError::UnsupportedExtension { .. }), "{name}");
            assert!(intake.file().is_none());
            assert_eq!(intake.status(), IntakeStatus::Error);
            assert_eq!(
                intake.error_message(),
                Some("Invalid file format. Only .vcf files are permitted.")
            );
        }
    }

    #[test]
    fn test_accepts_vcf_in_any_case() {
        for name in ["a.vcf", "b.VCF", "c.Vcf"] {
            let mut intake = FileIntake::new();
            assert_eq!(intake.select_file(vcf(name, 10)).unwrap(), Selection::Accepted);
            assert_eq!(intake.status(), IntakeStatus::Idle);
        }
    }

    #[test]
    fn test_size_boundary_is_inclusive() {
        let mut intake = FileIntake::new();
        intake.select_file(vcf("exact.vcf", MAX_FILE_SIZE as usize)).unwrap();
        assert_eq!(intake.file().unwrap().size_bytes(), 5_242_880);

        let err = intake
            .select_file(vcf("over.vcf", MAX_FILE_SIZE as usize + 1))
            .unwrap_err();
        assert!(matches!(err, ValidationError::TooLarge { .. }));
        assert!(intake.file().is_none(), "rejected selection clears the previous file");
    }

    #[test]
    fn test_oversized_rejected_regardless_of_extension() {
        assert!(validate_candidate("big.vcf", MAX_FILE_SIZE + 1).is_err());
        assert!(validate_candidate("big.txt", MAX_FILE_SIZE + 1).is_err());
        assert!(validate_candidate("big.VCF", u64::MAX).is_err());
    }

    #[test]
    fn test_error_cleared_on_next_valid_selection() {
        let mut intake = FileIntake::new();
        let _ = intake.select_file(vcf("bad.bam", 1));
        assert!(intake.error_message().is_some());
        intake.select_file(vcf("good.vcf", 1)).unwrap();
        assert!(intake.error_message().is_none());
    }

    #[test]
    fn test_listener_fires_whenever_active_file_changes() {
        let listener = Arc::new(CountingListener::default());
        let mut intake = FileIntake::new().with_listener(listener.clone());

        let _ = intake.select_file(vcf("a.txt", 1));
        assert_eq!(listener.0.load(Ordering::SeqCst), 0, "nothing was active");

        intake.select_file(vcf("a.vcf", 1)).unwrap();
        let _ = intake.select_file(vcf("b.txt", 1));
        intake.remove_file();

        assert_eq!(listener.0.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_remove_clears_everything() {
        let mut intake = FileIntake::new();
        intake.select_file(vcf("a.vcf", 1)).unwrap();
        intake.start_upload();
        intake.advance_upload();
        intake.remove_file();
        assert!(intake.file().is_none());
        assert_eq!(intake.progress(), 0);
        assert_eq!(intake.status(), IntakeStatus::Idle);
        assert!(intake.error_message().is_none());
    }

    #[test]
    fn test_upload_progress_reaches_success() {
        let mut intake = FileIntake::new();
        assert!(!intake.start_upload(), "no file, no upload");

        intake.select_file(vcf("a.vcf", 1)).unwrap();
        assert!(intake.start_upload());
        assert!(!intake.start_upload());

        let ignored = intake.select_file(vcf("b.vcf", 1)).unwrap();
        assert_eq!(ignored, Selection::Ignored);
        assert_eq!(intake.file().unwrap().name(), "a.vcf");

        let mut ticks = 0;
        while intake.status() == IntakeStatus::Uploading {
            intake.advance_upload();
            ticks += 1;
        }
        assert_eq!(ticks, 7);
        assert_eq!(intake.progress(), 100);
        assert_eq!(intake.status(), IntakeStatus::Success);
        assert!(!intake.start_upload());
    }

    #[tokio::test]
    async fn test_select_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patient.vcf");
        tokio::fs::write(&path, b"##fileformat=VCFv4.2\n").await.unwrap();

        let mut intake = FileIntake::new();
        intake.select_path(&path).await.unwrap();
        let file = intake.file().unwrap();
        assert_eq!(file.name(), "patient.vcf");
        assert_eq!(file.content(), b"##fileformat=VCFv4.2\n");
    }

    #[tokio::test]
    async fn test_select_path_rejects_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patient.bam");
        tokio::fs::write(&path, b"binary").await.unwrap();

        let mut intake = FileIntake::new();
        let err = intake.select_path(&path).await.unwrap_err();
        assert_eq!(err.user_message(), "Invalid file format. Only .vcf files are permitted.");
        assert_eq!(intake.status(), IntakeStatus::Error);
    }
}
