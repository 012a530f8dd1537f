// Job driver tests against an in-process engine double.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tempfile::TempDir;

use brandmark::brand::{Brand, BrandStore, MemoryBrandStore, OverlayParams, ParamOverrides};
use brandmark::config::AssetsConfig;
use brandmark::jobs::{DriverSettings, JobDriver, JobRequest, JobStatus, JobStore, MemoryJobStore};
use brandmark::media::{CompositeRequest, CompositingEngine, ExecutionGate, MediaError, ProbeReport};
use brandmark::overlay::{AssetResolver, FrameSize, PipelineBuilder};

/// Engine double: fixed probe result, records composite requests, fails
/// any output whose name contains "Broken".
struct FakeEngine {
    report: ProbeReport,
    delay: Duration,
    requests: Mutex<Vec<CompositeRequest>>,
    normalized: Mutex<Vec<PathBuf>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl FakeEngine {
    fn new(report: ProbeReport) -> Self {
        Self {
            report,
            delay: Duration::ZERO,
            requests: Mutex::new(Vec::new()),
            normalized: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    fn video(width: u32, height: u32) -> Self {
        Self::new(ProbeReport {
            frame: FrameSize::new(width, height),
            has_video: true,
            defaulted: false,
        })
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl CompositingEngine for FakeEngine {
    async fn probe(&self, _input: &Path) -> ProbeReport {
        self.report
    }

    async fn normalize(&self, input: &Path, output: &Path) -> Result<(), MediaError> {
        fs::copy(input, output)?;
        self.normalized.lock().push(output.to_path_buf());
        Ok(())
    }

    async fn composite(&self, request: &CompositeRequest) -> Result<(), MediaError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.requests.lock().push(request.clone());
        if request.output.to_string_lossy().contains("Broken") {
            return Err(MediaError::ExecutionFailed {
                exit_code: Some(1),
                stderr: "Invalid argument".to_string(),
            });
        }
        fs::write(&request.output, b"rendered")?;
        Ok(())
    }
}

struct Fixture {
    dir: TempDir,
    source: PathBuf,
    engine: Arc<FakeEngine>,
    driver: Arc<JobDriver>,
}

fn fixture(engine: FakeEngine, brands: MemoryBrandStore, normalize: bool, gate: usize) -> Fixture {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("clip.mp4");
    fs::write(&source, b"video").unwrap();

    let layout = AssetsConfig::with_root(dir.path().join("assets"));
    let logo = layout.logo_dir().join("Acme_logo.png");
    fs::create_dir_all(logo.parent().unwrap()).unwrap();
    image::RgbaImage::from_pixel(40, 20, image::Rgba([0, 0, 0, 0]))
        .save(&logo)
        .unwrap();

    let engine = Arc::new(engine);
    let settings = DriverSettings {
        output_dir: dir.path().join("out"),
        work_dir: dir.path().join("work"),
        normalize,
        default_params: OverlayParams::default(),
    };
    let driver = Arc::new(JobDriver::new(
        Arc::new(MemoryJobStore::new(100, Duration::from_secs(60))),
        Arc::new(brands),
        Arc::new(PipelineBuilder::new(AssetResolver::new(layout))),
        engine.clone(),
        ExecutionGate::new(gate),
        settings,
    ));

    Fixture {
        dir,
        source,
        engine,
        driver,
    }
}

#[tokio::test]
async fn test_job_renders_each_brand() {
    let fx = fixture(FakeEngine::video(720, 1280), MemoryBrandStore::new(), false, 1);

    let record = fx
        .driver
        .run_to_completion(JobRequest::new(&fx.source, ["Acme", "Nobody"]))
        .await
        .unwrap();

    assert_eq!(record.status, JobStatus::Completed);
    assert_eq!(record.outcomes.len(), 2);
    assert!(record.outcomes.iter().all(|o| o.is_success()));

    // Acme has a logo; Nobody resolves nothing and passes through
    assert!(record.outcomes[0].had_layers);
    assert!(!record.outcomes[1].had_layers);

    let requests = fx.engine.requests.lock();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].filter_complex.contains("scale=108:54"));
    assert_eq!(requests[1].filter_complex, "[0:v]null[vout]");
    assert!(requests.iter().all(|r| r.input == fx.source));
    for outcome in &record.outcomes {
        assert!(outcome.output.as_ref().unwrap().is_file());
    }
}

#[tokio::test]
async fn test_failed_brand_does_not_stop_the_rest() {
    let fx = fixture(FakeEngine::video(1080, 1920), MemoryBrandStore::new(), false, 1);

    let record = fx
        .driver
        .run_to_completion(JobRequest::new(&fx.source, ["Broken", "../escape", "Acme"]))
        .await
        .unwrap();

    assert_eq!(record.status, JobStatus::Completed);
    assert_eq!(record.succeeded(), 1);

    let broken = &record.outcomes[0];
    assert!(broken.error.as_deref().unwrap().contains("Invalid argument"));

    // malformed identity is a build failure, surfaced verbatim
    let malformed = &record.outcomes[1];
    assert!(malformed.error.as_deref().unwrap().starts_with("Malformed brand"));
    assert_eq!(fx.engine.requests.lock().len(), 2);

    assert!(record.outcomes[2].is_success());
}

#[tokio::test]
async fn test_all_brands_failing_fails_the_job() {
    let fx = fixture(FakeEngine::video(1080, 1920), MemoryBrandStore::new(), false, 1);

    let record = fx
        .driver
        .run_to_completion(JobRequest::new(&fx.source, ["Broken"]))
        .await
        .unwrap();

    assert_eq!(record.status, JobStatus::Failed);
    assert!(record.error.as_deref().unwrap().starts_with("Broken: "));
}

#[tokio::test]
async fn test_inactive_brand_is_refused() {
    let brands = MemoryBrandStore::new();
    brands.upsert(Brand::new("Retired")).unwrap();
    brands.deactivate("Retired").unwrap();
    let fx = fixture(FakeEngine::video(1080, 1920), brands, false, 1);

    let record = fx
        .driver
        .run_to_completion(JobRequest::new(&fx.source, ["Retired"]))
        .await
        .unwrap();

    assert_eq!(record.status, JobStatus::Failed);
    assert!(record.outcomes[0].error.as_deref().unwrap().contains("inactive"));
    assert!(fx.engine.requests.lock().is_empty());
}

#[tokio::test]
async fn test_audio_only_source_fails_before_rendering() {
    let engine = FakeEngine::new(ProbeReport {
        frame: FrameSize::default_portrait(),
        has_video: false,
        defaulted: true,
    });
    let fx = fixture(engine, MemoryBrandStore::new(), false, 1);

    let record = fx
        .driver
        .run_to_completion(JobRequest::new(&fx.source, ["Acme"]))
        .await
        .unwrap();

    assert_eq!(record.status, JobStatus::Failed);
    assert!(record.error.as_deref().unwrap().contains("no video stream"));
    assert!(record.outcomes.is_empty());
    assert!(fx.engine.requests.lock().is_empty());
}

#[tokio::test]
async fn test_missing_source_fails() {
    let fx = fixture(FakeEngine::video(1080, 1920), MemoryBrandStore::new(), false, 1);

    let record = fx
        .driver
        .run_to_completion(JobRequest::new(fx.dir.path().join("absent.mp4"), ["Acme"]))
        .await
        .unwrap();

    assert_eq!(record.status, JobStatus::Failed);
    assert!(record.error.as_deref().unwrap().starts_with("video file not found"));
}

#[tokio::test]
async fn test_normalized_copy_is_composited_and_cleaned_up() {
    let fx = fixture(FakeEngine::video(720, 1280), MemoryBrandStore::new(), true, 1);

    let record = fx
        .driver
        .run_to_completion(JobRequest::new(&fx.source, ["Acme"]))
        .await
        .unwrap();
    assert_eq!(record.status, JobStatus::Completed);

    let normalized = fx.engine.normalized.lock().clone();
    assert_eq!(normalized.len(), 1);
    assert!(normalized[0].ends_with("clip_normalized.mp4"));

    let requests = fx.engine.requests.lock();
    assert_eq!(requests[0].input, normalized[0]);
    // scratch directory removed after the job
    assert!(!normalized[0].exists());
}

#[tokio::test]
async fn test_invalid_request_is_rejected_up_front() {
    let fx = fixture(FakeEngine::video(1080, 1920), MemoryBrandStore::new(), false, 1);
    let err = fx
        .driver
        .run_to_completion(JobRequest::new(&fx.source, Vec::<String>::new()))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("no brands requested"));
}

#[tokio::test]
async fn test_request_overrides_apply_over_brand_params() {
    let brands = MemoryBrandStore::new();
    brands
        .upsert(Brand::new("Acme").with_params(OverlayParams {
            logo_padding: 25,
            ..OverlayParams::default()
        }))
        .unwrap();
    let fx = fixture(FakeEngine::video(720, 1280), brands, false, 1);

    let request = JobRequest::new(&fx.source, ["Acme", "Nobody"]).with_overrides(ParamOverrides {
        logo_scale: Some(0.3),
        ..ParamOverrides::default()
    });
    let record = fx.driver.run_to_completion(request).await.unwrap();
    assert_eq!(record.status, JobStatus::Completed);

    let requests = fx.engine.requests.lock();
    // 0.3 * 720 = 216 wide, 216 * 20 / 40 = 108 high; stored padding kept
    assert!(requests[0].filter_complex.contains("scale=216:108"));
    assert!(requests[0].filter_complex.ends_with("overlay=W-w-25:H-h-25[vout]"));
    assert_eq!(requests[1].filter_complex, "[0:v]null[vout]");
}

#[tokio::test]
async fn test_invalid_overrides_are_rejected_up_front() {
    let fx = fixture(FakeEngine::video(1080, 1920), MemoryBrandStore::new(), false, 1);
    let request = JobRequest::new(&fx.source, ["Acme"]).with_overrides(ParamOverrides {
        watermark_opacity: Some(2.0),
        ..ParamOverrides::default()
    });

    let err = fx.driver.run_to_completion(request).await.unwrap_err();
    assert!(err.to_string().contains("watermark_opacity"));
    assert!(fx.engine.requests.lock().is_empty());
}

#[tokio::test]
async fn test_brands_sharing_an_output_file_are_rejected() {
    let fx = fixture(FakeEngine::video(1080, 1920), MemoryBrandStore::new(), false, 1);

    for brands in [["Acme", "Acme"], ["A B", "A_B"]] {
        let err = fx
            .driver
            .run_to_completion(JobRequest::new(&fx.source, brands))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("invalid job request"));
    }
    assert!(fx.driver.store().list().await.is_empty());
    assert!(fx.engine.requests.lock().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_gate_serializes_engine_runs() {
    let engine = FakeEngine::video(1080, 1920).with_delay(Duration::from_millis(30));
    let fx = fixture(engine, MemoryBrandStore::new(), false, 1);
    assert_eq!(fx.driver.gate().width(), 1);

    let mut ids = Vec::new();
    for _ in 0..3 {
        let request = JobRequest::new(&fx.source, ["Acme", "Other"]);
        ids.push(fx.driver.submit(request).await.unwrap());
    }

    for id in ids {
        let mut finished = false;
        for _ in 0..200 {
            let record = fx.driver.store().get(id).await.unwrap();
            if record.status.is_terminal() {
                assert_eq!(record.status, JobStatus::Completed);
                finished = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(finished, "job {id} did not finish");
    }

    assert_eq!(fx.engine.requests.lock().len(), 6);
    assert_eq!(fx.engine.peak.load(Ordering::SeqCst), 1);
    assert_eq!(fx.driver.gate().available(), 1);
}
