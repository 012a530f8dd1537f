// Job driver: probe, normalize, then build and render each brand in turn

use std::path::{Path, PathBuf};
use std::sync::Arc;

use uuid::Uuid;

use super::{
    file_stem, BrandOutcome, JobError, JobRecord, JobRequest, JobStatus, JobStore, MemoryJobStore,
};
use crate::brand::{BrandStore, OverlayParams, ParamOverrides};
use crate::config::Config;
use crate::media::normalize::normalize;
use crate::media::{CompositeRequest, CompositingEngine, ExecutionGate, FfmpegEngine, MediaError};
use crate::overlay::{AssetResolver, FrameSize, PipelineBuilder};

/// Per-driver knobs taken from configuration.
#[derive(Debug, Clone)]
pub struct DriverSettings {
    pub output_dir: PathBuf,
    /// Scratch space for normalized sources; removed after each job
    pub work_dir: PathBuf,
    pub normalize: bool,
    /// Parameters for brands with no stored record
    pub default_params: OverlayParams,
}

impl DriverSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            work_dir: std::env::temp_dir().join("brandmark"),
            normalize: config.engine.normalize,
            default_params: config.overlay.clone(),
        }
    }
}

pub struct JobDriver {
    store: Arc<dyn JobStore>,
    brands: Arc<dyn BrandStore>,
    builder: Arc<PipelineBuilder>,
    engine: Arc<dyn CompositingEngine>,
    gate: ExecutionGate,
    settings: DriverSettings,
}

fn output_file_name(id: Uuid, brand: &str) -> String {
    format!("{}_{}.mp4", id, file_stem(brand))
}

impl JobDriver {
    pub fn new(
        store: Arc<dyn JobStore>,
        brands: Arc<dyn BrandStore>,
        builder: Arc<PipelineBuilder>,
        engine: Arc<dyn CompositingEngine>,
        gate: ExecutionGate,
        settings: DriverSettings,
    ) -> Self {
        Self {
            store,
            brands,
            builder,
            engine,
            gate,
            settings,
        }
    }

    /// Driver wired to ffmpeg and an in-memory job store.
    pub fn from_config(config: &Config, brands: Arc<dyn BrandStore>) -> Self {
        let store = MemoryJobStore::new(config.jobs.max_entries, config.jobs.ttl());
        Self::new(
            Arc::new(store),
            brands,
            Arc::new(PipelineBuilder::new(AssetResolver::new(config.assets.clone()))),
            Arc::new(FfmpegEngine::new(config.engine.clone())),
            ExecutionGate::new(config.engine.max_concurrent_runs),
            DriverSettings::from_config(config),
        )
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    pub fn gate(&self) -> &ExecutionGate {
        &self.gate
    }

    /// Record the job as queued and run it in the background.
    pub async fn submit(self: &Arc<Self>, request: JobRequest) -> Result<Uuid, JobError> {
        request.validate()?;
        let record = JobRecord::new(&request);
        let id = record.id;
        self.store.insert(record).await;
        tracing::info!(job_id = %id, source = %request.source.display(), brands = ?request.brands, "job queued");

        let driver = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = driver.run(id, request).await {
                tracing::error!(job_id = %id, error = %e, "job tracking failed");
            }
        });

        Ok(id)
    }

    /// Record the job and run it to completion on the current task.
    pub async fn run_to_completion(&self, request: JobRequest) -> Result<JobRecord, JobError> {
        request.validate()?;
        let record = JobRecord::new(&request);
        let id = record.id;
        self.store.insert(record).await;
        self.run(id, request).await
    }

    /// Run a job that is already in the store.
    pub async fn run(&self, id: Uuid, request: JobRequest) -> Result<JobRecord, JobError> {
        self.store
            .update(id, Box::new(|r: &mut JobRecord| r.status = JobStatus::Processing))
            .await?;

        let work_dir = self.settings.work_dir.join(id.to_string());
        let result = self.process(id, &request, &work_dir).await;

        if work_dir.exists() {
            if let Err(e) = tokio::fs::remove_dir_all(&work_dir).await {
                tracing::debug!(job_id = %id, error = %e, "failed to remove work dir");
            }
        }

        let record = match result {
            Ok(()) => {
                self.store
                    .update(
                        id,
                        Box::new(|r: &mut JobRecord| {
                            if r.succeeded() > 0 {
                                r.status = JobStatus::Completed;
                            } else {
                                let errors: Vec<String> = r
                                    .outcomes
                                    .iter()
                                    .filter_map(|o| o.error.as_ref().map(|e| format!("{}: {}", o.brand, e)))
                                    .collect();
                                r.fail(errors.join("; "));
                            }
                        }),
                    )
                    .await?
            }
            Err(e) => {
                let message = e.to_string();
                self.store.update(id, Box::new(move |r: &mut JobRecord| r.fail(message))).await?
            }
        };

        match record.status {
            JobStatus::Completed => tracing::info!(
                job_id = %id,
                succeeded = record.succeeded(),
                requested = record.brands.len(),
                "job completed"
            ),
            _ => tracing::error!(job_id = %id, error = ?record.error, "job failed"),
        }

        Ok(record)
    }

    /// Job-level steps. An error here fails the whole job; per-brand
    /// failures are recorded as outcomes instead.
    async fn process(&self, id: Uuid, request: &JobRequest, work_dir: &Path) -> Result<(), JobError> {
        if !request.source.is_file() {
            return Err(MediaError::VideoNotFound(request.source.display().to_string()).into());
        }

        let report = self.engine.probe(&request.source).await;
        if !report.has_video {
            return Err(MediaError::NoVideoStream(request.source.display().to_string()).into());
        }

        tokio::fs::create_dir_all(&self.settings.output_dir)
            .await
            .map_err(MediaError::from)?;

        let (input, frame) = if self.settings.normalize {
            tokio::fs::create_dir_all(work_dir)
                .await
                .map_err(MediaError::from)?;
            let normalized = {
                let _permit = self.gate.acquire().await?;
                normalize(self.engine.as_ref(), &request.source, work_dir).await
            };
            if normalized == request.source {
                (normalized, report.frame)
            } else {
                let frame = self.engine.probe(&normalized).await.frame;
                (normalized, frame)
            }
        } else {
            (request.source.clone(), report.frame)
        };

        tracing::info!(job_id = %id, %frame, input = %input.display(), "source ready");

        for name in &request.brands {
            let outcome = self
                .render_brand(id, name, &request.overrides, &input, frame)
                .await;
            self.store
                .update(id, Box::new(move |r: &mut JobRecord| r.outcomes.push(outcome)))
                .await?;
        }

        Ok(())
    }

    async fn render_brand(
        &self,
        id: Uuid,
        name: &str,
        overrides: &ParamOverrides,
        input: &Path,
        frame: FrameSize,
    ) -> BrandOutcome {
        let mut brand = match self.brands.for_render(name, &self.settings.default_params) {
            Ok(brand) => brand,
            Err(e) => return BrandOutcome::failure(name, e.to_string()),
        };
        if !overrides.is_empty() {
            brand.params = overrides.apply(&brand.params);
            tracing::debug!(job_id = %id, brand = %name, params = ?brand.params, "request overrides applied");
        }

        // Build outside the gate; only engine runs are serialized
        let description = match self.builder.build(&brand, frame) {
            Ok(description) => description,
            Err(e) => {
                tracing::error!(job_id = %id, brand = %name, error = %e, "pipeline build failed");
                return BrandOutcome::failure(name, e.to_string());
            }
        };

        let request = CompositeRequest {
            input: input.to_path_buf(),
            output: self.settings.output_dir.join(output_file_name(id, name)),
            filter_complex: description.filter_complex.clone(),
        };

        let result = match self.gate.acquire().await {
            Ok(_permit) => self.engine.composite(&request).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                tracing::info!(
                    job_id = %id,
                    brand = %name,
                    layers = ?description.layers,
                    output = %request.output.display(),
                    "brand rendered"
                );
                BrandOutcome::success(name, request.output, description.had_layers)
            }
            Err(e) => {
                tracing::error!(job_id = %id, brand = %name, error = %e, "brand render failed");
                BrandOutcome::failure(name, e.to_string())
            }
        }
    }
}
