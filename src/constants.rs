// Constants module - centralized default values for configuration
//
// Overlay parameters, engine flags and job retention defaults live here so
// brand records, configuration and the CLI agree on the same numbers.

// =============================================================================
// Overlay defaults
// =============================================================================

/// Default watermark overscale multiplier (hides internal padding in the asset)
pub const DEFAULT_WATERMARK_SCALE: f64 = 1.15;

/// Default watermark opacity (multiplied into the asset's alpha channel)
pub const DEFAULT_WATERMARK_OPACITY: f64 = 0.4;

/// Default logo width as a fraction of the frame width
pub const DEFAULT_LOGO_SCALE: f64 = 0.15;

/// Default logo padding from the bottom-right corner in pixels
pub const DEFAULT_LOGO_PADDING: u32 = 40;

/// Smallest dimension the encoder accepts for a scaled layer
pub const MIN_LAYER_DIMENSION: u32 = 2;

// =============================================================================
// Text layer defaults
// =============================================================================

/// Default text font size in pixels
pub const DEFAULT_TEXT_SIZE: u32 = 48;

/// Default text colour
pub const DEFAULT_TEXT_COLOR: &str = "#FFFFFF";

/// Default text background colour
pub const DEFAULT_TEXT_BG_COLOR: &str = "#000000";

/// Default text background opacity
pub const DEFAULT_TEXT_BG_OPACITY: f64 = 0.5;

/// Default text margin from the anchored edge in pixels
pub const DEFAULT_TEXT_MARGIN: u32 = 40;

// =============================================================================
// Probe defaults
// =============================================================================

/// Frame width substituted when probing fails (canonical portrait)
pub const DEFAULT_FRAME_WIDTH: u32 = 1080;

/// Frame height substituted when probing fails (canonical portrait)
pub const DEFAULT_FRAME_HEIGHT: u32 = 1920;

// =============================================================================
// Filter graph labels
// =============================================================================

/// Pad of the source video stream
pub const INPUT_LABEL: &str = "0:v";

/// Canonical terminal label consumed by `-map`
pub const TERMINAL_LABEL: &str = "vout";

/// Label of the loaded watermark layer
pub const WATERMARK_LABEL: &str = "wm";

/// Label of the loaded logo layer
pub const LOGO_LABEL: &str = "logo";

// =============================================================================
// Asset layout defaults
// =============================================================================

/// Default master asset directory
pub const DEFAULT_ASSETS_ROOT: &str = "./WTF_MASTER_ASSETS/Branding";

/// Default watermark directory, relative to the asset root
pub const DEFAULT_WATERMARKS_DIR: &str = "Watermarks";

/// Default logo directory, relative to the asset root
pub const DEFAULT_LOGOS_DIR: &str = "Logos/Circle";

/// Default directory name for tall (portrait) watermarks
pub const DEFAULT_TALL_DIR: &str = "Vertical_HD";

/// Default directory name for square watermarks
pub const DEFAULT_SQUARE_DIR: &str = "Square";

/// Default directory name for wide (landscape) watermarks
pub const DEFAULT_WIDE_DIR: &str = "Landscape";

/// Filename suffix of watermark assets
pub const WATERMARK_SUFFIX: &str = "_watermark.png";

/// Filename suffix of logo assets
pub const LOGO_SUFFIX: &str = "_logo.png";

/// Token stripped from brand names before convention lookup
pub const BRAND_NAME_TOKEN: &str = "WTF";

// =============================================================================
// Engine defaults
// =============================================================================

/// Default ffmpeg binary
pub const DEFAULT_FFMPEG_PATH: &str = "ffmpeg";

/// Default ffprobe binary
pub const DEFAULT_FFPROBE_PATH: &str = "ffprobe";

/// Default engine run timeout in seconds
pub const DEFAULT_ENGINE_TIMEOUT_SECS: u64 = 600;

/// Default number of compositing runs allowed in flight
pub const DEFAULT_MAX_CONCURRENT_RUNS: usize = 1;

/// Default video codec
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";

/// Default constant rate factor
pub const DEFAULT_CRF: u8 = 23;

/// Default encoder preset
pub const DEFAULT_PRESET: &str = "fast";

/// Default audio codec
pub const DEFAULT_AUDIO_CODEC: &str = "aac";

/// Default audio bitrate
pub const DEFAULT_AUDIO_BITRATE: &str = "128k";

/// Default width the normalization step scales to
pub const DEFAULT_NORMALIZE_WIDTH: u32 = 720;

/// Bytes of engine stderr kept in error messages
pub const STDERR_TAIL_BYTES: usize = 2048;

// =============================================================================
// Job defaults
// =============================================================================

/// Default job record time-to-live in seconds (24 hours)
pub const DEFAULT_JOB_TTL_SECS: u64 = 24 * 60 * 60;

/// Default maximum number of job records kept
pub const DEFAULT_JOB_MAX_ENTRIES: u64 = 10_000;

/// Default output directory
pub const DEFAULT_OUTPUT_DIR: &str = "./exports";

// =============================================================================
// Logging defaults
// =============================================================================

/// Default log level directive
pub const DEFAULT_LOG_LEVEL: &str = "info";
