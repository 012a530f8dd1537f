use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use brandmark::brand::seed::scan_master_assets;
use brandmark::brand::{BrandRegistry, BrandStore, MemoryBrandStore, ParamOverrides};
use brandmark::config::Config;
use brandmark::jobs::{JobDriver, JobRequest, JobStatus};
use brandmark::media::probe;
use brandmark::overlay::{AssetResolver, FrameSize, Orientation, PipelineBuilder};

/// Brandmark - per-brand overlay pipelines for short-form video
#[derive(Parser, Debug)]
#[command(name = "brandmark")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (defaults apply when the default file is absent)
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a brand's filter graph without running the engine
    Plan {
        #[arg(short, long)]
        brand: String,

        /// Probe this video for the frame size
        #[arg(short, long, conflicts_with_all = ["width", "height"])]
        input: Option<PathBuf>,

        #[arg(long)]
        width: Option<u32>,

        #[arg(long)]
        height: Option<u32>,
    },

    /// Brand a video for one or more brands
    Render {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long = "brand", required = true)]
        brands: Vec<String>,

        #[command(flatten)]
        overrides: OverrideArgs,
    },

    /// List brands in the registry
    Brands {
        /// Include deactivated brands
        #[arg(long)]
        all: bool,
    },

    /// Scan the master asset directory for brands
    Seed {
        /// Write the result to the configured brands file instead of stdout
        #[arg(long)]
        write: bool,
    },

    /// Validate configuration and report which assets resolve per brand
    Check,
}

/// Per-job replacements for the brands' overlay parameters
#[derive(clap::Args, Debug)]
struct OverrideArgs {
    #[arg(long)]
    watermark_scale: Option<f64>,

    #[arg(long)]
    watermark_opacity: Option<f64>,

    #[arg(long)]
    logo_scale: Option<f64>,

    /// Logo padding in pixels
    #[arg(long)]
    logo_padding: Option<u32>,
}

impl From<OverrideArgs> for ParamOverrides {
    fn from(args: OverrideArgs) -> Self {
        Self {
            watermark_scale: args.watermark_scale,
            watermark_opacity: args.watermark_opacity,
            logo_scale: args.logo_scale,
            logo_padding: args.logo_padding,
        }
    }
}

fn load_config(path: &Path) -> Result<Config> {
    let config = if path.exists() {
        Config::from_file(path)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?
    } else if path == Path::new("config.yaml") {
        Config::default()
    } else {
        bail!("Configuration file not found: {}", path.display());
    };

    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("Invalid configuration")?;
    Ok(config)
}

fn load_brands(config: &Config) -> Result<MemoryBrandStore> {
    match &config.brands_file {
        Some(path) if path.exists() => {
            let registry = BrandRegistry::load(path)
                .with_context(|| format!("Failed to load brands from {}", path.display()))?;
            Ok(registry.into_store())
        }
        Some(path) => {
            tracing::warn!(brands_file = %path.display(), "brands file not found, using convention-only resolution");
            Ok(MemoryBrandStore::new())
        }
        None => Ok(MemoryBrandStore::new()),
    }
}

async fn plan(
    config: &Config,
    store: &dyn BrandStore,
    brand: &str,
    input: Option<PathBuf>,
    width: Option<u32>,
    height: Option<u32>,
) -> Result<()> {
    let frame = match (input, width, height) {
        (Some(input), _, _) => probe(&config.engine, &input).await.frame,
        (None, Some(width), Some(height)) => FrameSize::new(width, height),
        (None, None, None) => FrameSize::default_portrait(),
        _ => bail!("--width and --height must be given together"),
    };

    let builder = PipelineBuilder::new(AssetResolver::new(config.assets.clone()));
    let brand = store.for_render(brand, &config.overlay)?;
    let description = builder
        .build(&brand, frame)
        .with_context(|| format!("Failed to build pipeline for '{}'", brand.name))?;

    println!("brand:        {}", brand.display_name());
    println!("frame:        {}", description.frame);
    println!("orientation:  {}", description.orientation);
    println!("had_layers:   {}", description.had_layers);
    println!("layers:       {}", description.layers.join(", "));
    for asset in &description.assets {
        println!("asset:        {}", asset.display());
    }
    println!("filter:       {}", description);
    Ok(())
}

async fn render(config: &Config, store: MemoryBrandStore, request: JobRequest) -> Result<bool> {
    let driver = JobDriver::from_config(config, Arc::new(store));
    let record = driver
        .run_to_completion(request)
        .await
        .context("Job could not be tracked")?;

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(record.status == JobStatus::Completed)
}

fn list_brands(store: &dyn BrandStore, all: bool) {
    for brand in store.list(all) {
        let state = if brand.active { "active" } else { "inactive" };
        let lock = if brand.locked { ", locked" } else { "" };
        println!("{} ({}{}) - {}", brand.name, state, lock, brand.display_name());
    }
}

fn seed(config: &Config, write: bool) -> Result<()> {
    let brands = scan_master_assets(&config.assets, &config.overlay).context("Asset scan failed")?;
    tracing::info!(count = brands.len(), root = %config.assets.root.display(), "asset scan finished");

    let registry = BrandRegistry { brands };
    match (&config.brands_file, write) {
        (Some(path), true) => {
            registry
                .save(path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("wrote {} brands to {}", registry.brands.len(), path.display());
        }
        (None, true) => bail!("--write needs brands_file in the configuration"),
        (_, false) => print!("{}", registry.to_yaml()?),
    }
    Ok(())
}

fn check(config: &Config, store: &dyn BrandStore) -> Result<bool> {
    let resolver = AssetResolver::new(config.assets.clone());
    let mut healthy = true;

    println!("configuration ok (assets root: {})", config.assets.root.display());
    for brand in store.list(false) {
        let mut found = Vec::new();
        let mut missing = Vec::new();
        for orientation in Orientation::ALL {
            match resolver.resolve_watermark(&brand, orientation) {
                Ok(Some(_)) => found.push(format!("watermark/{}", orientation)),
                Ok(None) => missing.push(format!("watermark/{}", orientation)),
                Err(e) => {
                    healthy = false;
                    missing.push(format!("watermark/{} ({})", orientation, e));
                }
            }
        }
        match resolver.resolve_logo(&brand) {
            Ok(Some(_)) => found.push("logo".to_string()),
            Ok(None) => missing.push("logo".to_string()),
            Err(e) => {
                healthy = false;
                missing.push(format!("logo ({})", e));
            }
        }
        println!(
            "{}: found [{}] missing [{}]",
            brand.name,
            found.join(", "),
            missing.join(", ")
        );
    }
    Ok(healthy)
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = brandmark::logging::init_subscriber(&config.logging) {
        eprintln!("Failed to initialize logging subsystem: {}", e);
        return ExitCode::FAILURE;
    }

    tracing::info!(
        config_file = %args.config.display(),
        assets_root = %config.assets.root.display(),
        output_dir = %config.output_dir.display(),
        "Configuration loaded successfully"
    );

    match run(args.command, config) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, config: Config) -> Result<bool> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let store = load_brands(&config)?;

    match command {
        Command::Plan {
            brand,
            input,
            width,
            height,
        } => {
            runtime.block_on(plan(&config, &store, &brand, input, width, height))?;
            Ok(true)
        }
        Command::Render {
            input,
            brands,
            overrides,
        } => {
            let request = JobRequest::new(input, brands).with_overrides(overrides.into());
            runtime.block_on(render(&config, store, request))
        }
        Command::Brands { all } => {
            list_brands(&store, all);
            Ok(true)
        }
        Command::Seed { write } => {
            seed(&config, write)?;
            Ok(true)
        }
        Command::Check => check(&config, &store),
    }
}
