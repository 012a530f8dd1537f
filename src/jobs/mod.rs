//! Render jobs.
//!
//! A job brands one source video for one or more brands. Its record moves
//! through `queued -> processing -> completed | failed` and carries one
//! outcome per requested brand. Records live in an injected [`JobStore`].

pub mod driver;
pub mod store;

pub use driver::{DriverSettings, JobDriver};
pub use store::{JobStore, JobUpdate, MemoryJobStore};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

use crate::brand::ParamOverrides;

/// Errors from job submission and tracking.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("job {0} not found")]
    NotFound(Uuid),

    #[error("invalid job request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Media(#[from] crate::media::MediaError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRequest {
    pub source: PathBuf,
    pub brands: Vec<String>,
    /// Applied over every requested brand's own parameters
    #[serde(default, skip_serializing_if = "ParamOverrides::is_empty")]
    pub overrides: ParamOverrides,
}

/// Brand name reduced to the characters allowed in output file names.
pub fn file_stem(brand: &str) -> String {
    brand
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

impl JobRequest {
    pub fn new<I, S>(source: impl Into<PathBuf>, brands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source: source.into(),
            brands: brands.into_iter().map(Into::into).collect(),
            overrides: ParamOverrides::default(),
        }
    }

    pub fn with_overrides(mut self, overrides: ParamOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn validate(&self) -> Result<(), JobError> {
        if self.brands.is_empty() {
            return Err(JobError::InvalidRequest("no brands requested".to_string()));
        }
        if self.brands.iter().any(|b| b.trim().is_empty()) {
            return Err(JobError::InvalidRequest("brand names cannot be empty".to_string()));
        }

        // Each brand writes one output file, so stems must not collide
        let mut stems: HashMap<String, &str> = HashMap::with_capacity(self.brands.len());
        for brand in &self.brands {
            if let Some(previous) = stems.insert(file_stem(brand), brand) {
                let message = if previous == brand {
                    format!("brand '{}' is requested more than once", brand)
                } else {
                    format!("brands '{}' and '{}' map to the same output file", previous, brand)
                };
                return Err(JobError::InvalidRequest(message));
            }
        }

        self.overrides.validate().map_err(JobError::InvalidRequest)
    }
}

/// Result of rendering one brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandOutcome {
    pub brand: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub had_layers: bool,
}

impl BrandOutcome {
    pub fn success(brand: impl Into<String>, output: PathBuf, had_layers: bool) -> Self {
        Self {
            brand: brand.into(),
            output: Some(output),
            error: None,
            had_layers,
        }
    }

    pub fn failure(brand: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            brand: brand.into(),
            output: None,
            error: Some(error.into()),
            had_layers: false,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.output.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: Uuid,
    pub source: PathBuf,
    pub brands: Vec<String>,
    pub status: JobStatus,
    pub outcomes: Vec<BrandOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobRecord {
    pub fn new(request: &JobRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            source: request.source.clone(),
            brands: request.brands.clone(),
            status: JobStatus::Queued,
            outcomes: Vec::new(),
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = JobStatus::Failed;
        self.error = Some(error.into());
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }
}
