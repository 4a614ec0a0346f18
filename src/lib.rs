pub mod capture;
pub mod convert;
pub mod decode;
pub mod display;
pub mod error;
pub mod pipeline;
pub mod transmit;

use std::path::Path;

use arc_swap::ArcSwap;
use capture::format::Subtype;
use capture::frame::SensorKind;
use serde::{Deserialize, Serialize};

use crate::transmit::Endpoint;

/// Global configuration that can be atomically swapped at runtime
pub static CONFIG: once_cell::sync::Lazy<ArcSwap<Config>> =
    once_cell::sync::Lazy::new(|| ArcSwap::from_pointee(Config::default()));

/// Prefix for environment overrides, e.g. `PRISM__CAPTURE__FPS=15`
const ENV_PREFIX: &str = "PRISM";

/// System configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub capture: CaptureConfig,
    pub display: DisplayConfig,
    pub pipeline: PipelineConfig,
    pub transmit: Endpoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    pub kind: SensorKind,
    /// Native subtype the source delivers
    pub subtype: Subtype,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Meters per raw depth unit
    pub depth_scale: f32,
    pub min_reliable_depth: u32, // raw units
    pub max_reliable_depth: u32, // raw units
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Simulated texture upload time of the headless surface
    pub upload_latency_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub decode: bool,
    pub result_queue: usize,
    /// Stop after this many captured frames
    pub max_frames: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capture: CaptureConfig {
                kind: SensorKind::Depth,
                subtype: Subtype::D16,
                width: 512,
                height: 424,
                fps: 30,
                depth_scale: 0.001, // millimeters
                min_reliable_depth: 500,
                max_reliable_depth: 4000,
            },
            display: DisplayConfig {
                upload_latency_ms: 8,
            },
            pipeline: PipelineConfig {
                decode: true,
                result_queue: 16,
                max_frames: None,
            },
            transmit: Endpoint {
                url: "http://localhost:8080/codes".to_string(),
                worker: "prism".to_string(),
            },
        }
    }
}

impl Config {
    /// Defaults, then `path` (TOML, optional), then `PRISM__*` environment
    /// variables.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Config::default())?);
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_load_without_a_file() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.capture.kind, SensorKind::Depth);
        assert_eq!(config.capture.subtype, Subtype::D16);
        assert_eq!(config.pipeline.max_frames, None);
    }

    #[test]
    fn file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[capture]
kind = "infrared"
subtype = "l16"
fps = 15

[pipeline]
max_frames = 90
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.capture.kind, SensorKind::Infrared);
        assert_eq!(config.capture.subtype, Subtype::L16);
        assert_eq!(config.capture.fps, 15);
        assert_eq!(config.capture.width, 512);
        assert_eq!(config.pipeline.max_frames, Some(90));
        assert_eq!(config.transmit.worker, "prism");
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Config::load(Some(Path::new("/nonexistent/prism.toml"))).is_err());
    }

    #[test]
    fn global_config_can_be_swapped() {
        let mut config = Config::default();
        config.display.upload_latency_ms = 1;
        CONFIG.store(std::sync::Arc::new(config));
        assert_eq!(CONFIG.load().display.upload_latency_ms, 1);
    }
}
