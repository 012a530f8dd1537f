// Configuration loading and validation tests.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use tempfile::NamedTempFile;

use brandmark::config::{Config, LogFormat};
use brandmark::overlay::Orientation;

#[test]
fn test_empty_config_uses_defaults() {
    let config = Config::from_yaml_with_env("").unwrap();

    assert_eq!(config.assets.root, PathBuf::from("./WTF_MASTER_ASSETS/Branding"));
    assert_eq!(config.overlay.watermark_scale, 1.15);
    assert_eq!(config.overlay.watermark_opacity, 0.4);
    assert_eq!(config.overlay.logo_scale, 0.15);
    assert_eq!(config.overlay.logo_padding, 40);
    assert_eq!(config.engine.max_concurrent_runs, 1);
    assert_eq!(config.engine.timeout(), Duration::from_secs(600));
    assert!(config.engine.normalize);
    assert_eq!(config.jobs.ttl(), Duration::from_secs(86_400));
    assert_eq!(config.logging.format, LogFormat::Json);
    assert!(config.brands_file.is_none());
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_sections_keep_field_defaults() {
    let yaml = r#"
assets:
  root: /srv/assets
  orientation_dirs:
    wide: Horizontal
overlay:
  watermark_opacity: 0.3
engine:
  max_concurrent_runs: 2
  normalize: false
jobs:
  ttl_secs: 60
logging:
  level: brandmark=debug
  format: pretty
output_dir: /srv/out
brands_file: /srv/brands.yaml
"#;
    let config = Config::from_yaml_with_env(yaml).unwrap();

    assert_eq!(
        config.assets.watermark_dir(Orientation::Wide),
        PathBuf::from("/srv/assets/Watermarks/Horizontal")
    );
    assert_eq!(
        config.assets.watermark_dir(Orientation::Tall),
        PathBuf::from("/srv/assets/Watermarks/Vertical_HD")
    );
    assert_eq!(config.assets.logo_dir(), PathBuf::from("/srv/assets/Logos/Circle"));
    assert_eq!(config.overlay.watermark_opacity, 0.3);
    assert_eq!(config.overlay.watermark_scale, 1.15);
    assert_eq!(config.engine.max_concurrent_runs, 2);
    assert!(!config.engine.normalize);
    assert_eq!(config.engine.ffmpeg_path, "ffmpeg");
    assert_eq!(config.jobs.ttl_secs, 60);
    assert_eq!(config.jobs.max_entries, 10_000);
    assert_eq!(config.logging.format, LogFormat::Pretty);
    assert_eq!(config.output_dir, PathBuf::from("/srv/out"));
    assert_eq!(config.brands_file, Some(PathBuf::from("/srv/brands.yaml")));
    assert!(config.validate().is_ok());
}

#[test]
fn test_env_substitution() {
    std::env::set_var("BRANDMARK_TEST_ASSET_ROOT", "/mnt/branding");
    let config = Config::from_yaml_with_env("assets:\n  root: ${BRANDMARK_TEST_ASSET_ROOT}\n").unwrap();
    assert_eq!(config.assets.root, PathBuf::from("/mnt/branding"));
}

#[test]
fn test_missing_env_var_is_an_error() {
    let err = Config::from_yaml_with_env("output_dir: ${BRANDMARK_TEST_UNSET_VAR_1}\n").unwrap_err();
    assert!(err.contains("BRANDMARK_TEST_UNSET_VAR_1"));
}

#[test]
fn test_validation_rejects_bad_values() {
    let cases = [
        "overlay:\n  watermark_opacity: 1.2\n",
        "overlay:\n  logo_scale: 0\n",
        "engine:\n  max_concurrent_runs: 0\n",
        "engine:\n  timeout_secs: 0\n",
        "engine:\n  normalize_width: 721\n",
        "jobs:\n  max_entries: 0\n",
        "assets:\n  orientation_dirs:\n    square: \"\"\n",
    ];
    for yaml in cases {
        let config = Config::from_yaml_with_env(yaml).unwrap();
        assert!(config.validate().is_err(), "accepted: {yaml}");
    }
}

#[test]
fn test_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "output_dir: /tmp/brandmark-out").unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.output_dir, PathBuf::from("/tmp/brandmark-out"));

    let err = Config::from_file("/nonexistent/brandmark.yaml").unwrap_err();
    assert!(err.starts_with("Failed to read config file"));
}
