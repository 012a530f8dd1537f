// Error types module

use std::fmt;

use crate::brand::BrandStoreError;
use crate::jobs::JobError;
use crate::media::MediaError;
use crate::overlay::BuildError;

/// Top-level error for library callers that touch more than one subsystem
///
/// Each subsystem keeps its own error type; this one only gathers them so
/// a caller can use `?` across configuration, brand storage, pipeline
/// building, engine runs and job tracking.
#[derive(Debug)]
pub enum BrandmarkError {
    /// Configuration errors (invalid YAML, missing env vars, bad values)
    Config(String),

    /// Brand registry errors (unknown brand, locked record, parse failure)
    Brand(BrandStoreError),

    /// Filter graph construction errors
    Build(BuildError),

    /// ffprobe/ffmpeg errors
    Media(MediaError),

    /// Job tracking errors
    Job(JobError),

    /// Filesystem errors outside the subsystems above
    Io(std::io::Error),
}

impl fmt::Display for BrandmarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrandmarkError::Config(msg) => write!(f, "Configuration error: {}", msg),
            BrandmarkError::Brand(err) => write!(f, "Brand error: {}", err),
            BrandmarkError::Build(err) => write!(f, "Pipeline error: {}", err),
            BrandmarkError::Media(err) => write!(f, "Media error: {}", err),
            BrandmarkError::Job(err) => write!(f, "Job error: {}", err),
            BrandmarkError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for BrandmarkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BrandmarkError::Config(_) => None,
            BrandmarkError::Brand(err) => Some(err),
            BrandmarkError::Build(err) => Some(err),
            BrandmarkError::Media(err) => Some(err),
            BrandmarkError::Job(err) => Some(err),
            BrandmarkError::Io(err) => Some(err),
        }
    }
}

impl From<BrandStoreError> for BrandmarkError {
    fn from(err: BrandStoreError) -> Self {
        BrandmarkError::Brand(err)
    }
}

impl From<BuildError> for BrandmarkError {
    fn from(err: BuildError) -> Self {
        BrandmarkError::Build(err)
    }
}

impl From<MediaError> for BrandmarkError {
    fn from(err: MediaError) -> Self {
        BrandmarkError::Media(err)
    }
}

impl From<JobError> for BrandmarkError {
    fn from(err: JobError) -> Self {
        BrandmarkError::Job(err)
    }
}

impl From<std::io::Error> for BrandmarkError {
    fn from(err: std::io::Error) -> Self {
        BrandmarkError::Io(err)
    }
}
