use thiserror::Error;

/// Message shown for every failure of an analysis run.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Failed to run full analysis on the VCF file. Please try again.";

/// Rejection reasons for a candidate genomic file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unsupported file extension {extension:?} for {name}")]
    UnsupportedExtension { name: String, extension: String },

    #[error("file {name} is {size_bytes} bytes, limit is {max_bytes}")]
    TooLarge { name: String, size_bytes: u64, max_bytes: u64 },
}

impl ValidationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ValidationError::UnsupportedExtension { .. } => {
                "Invalid file format. Only .vcf files are permitted."
            }
            ValidationError::TooLarge { .. } => {
                "File is too large. Maximum allowed size is 5MB."
            }
        }
    }
}

/// Failures of the response normalisation step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("analysis response contained no assessments")]
    EmptyResult,

    #[error("unexpected analysis response format: {0}")]
    UnexpectedFormat(String),
}

#[derive(Debug, Error)]
pub enum PharmaGuardError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Analysis service responded with status {status}")]
    Request { status: u16 },

    #[error("Analysis response is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Analysis response contained no assessments")]
    EmptyResult,

    #[error("Unexpected analysis response format: {0}")]
    UnexpectedFormat(String),

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("History error: {0}")]
    History(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<NormalizeError> for PharmaGuardError {
    fn from(err: NormalizeError) -> Self {
        match err {
            NormalizeError::EmptyResult => PharmaGuardError::EmptyResult,
            NormalizeError::UnexpectedFormat(detail) => PharmaGuardError::UnexpectedFormat(detail),
        }
    }
}

impl PharmaGuardError {
    /// The text a user sees for this error.
    pub fn user_message(&self) -> &'static str {
        match self {
            PharmaGuardError::Validation(v) => v.user_message(),
            _ => GENERIC_FAILURE_MESSAGE,
        }
    }

    /// True for the failure kinds an analysis run can end in.
    pub fn is_dispatch_failure(&self) -> bool {
        matches!(
            self,
            PharmaGuardError::Request { .. }
                | PharmaGuardError::Parse(_)
                | PharmaGuardError::EmptyResult
                | PharmaGuardError::UnexpectedFormat(_)
                | PharmaGuardError::Transport(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PharmaGuardError>;
