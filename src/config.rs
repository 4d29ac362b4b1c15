//! Viewer configuration, read from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working viewer. Colors are written as hex integers, e.g.
//! `background = 0x87CEEB`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use cgmath::Vector3;
use serde::Deserialize;
use thiserror::Error;

use crate::builder::SceneStyle;
use crate::layout::DEFAULT_LAYER;

pub const CONFIG_ENV: &str = "PLANVIEW_CONFIG";
pub const CONFIG_FILE: &str = "planview.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub layout_path: PathBuf,
    pub layer: String,
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub scene: SceneConfig,
    pub assets: AssetConfig,
    pub screenshot: ScreenshotConfig,
    pub logging: LoggingConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            layout_path: PathBuf::from("3d.json"),
            layer: DEFAULT_LAYER.to_string(),
            window: WindowConfig::default(),
            camera: CameraConfig::default(),
            scene: SceneConfig::default(),
            assets: AssetConfig::default(),
            screenshot: ScreenshotConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ViewerConfig {
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content, path)
    }

    /// Finds the configuration to use
    ///
    /// An explicit path wins, then `PLANVIEW_CONFIG`, then `./planview.toml`.
    /// With none of those present the defaults are returned.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Some(path) = env::var_os(CONFIG_ENV) {
            return Self::from_file(PathBuf::from(path));
        }

        let local = Path::new(CONFIG_FILE);
        if local.exists() {
            Self::from_file(local)
        } else {
            Ok(Self::default())
        }
    }

    /// Directory relative model paths resolve against
    ///
    /// Falls back to the layout file's directory.
    pub fn asset_base_dir(&self) -> PathBuf {
        self.assets.base_dir.clone().unwrap_or_else(|| {
            self.layout_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default()
        })
    }

    pub fn scene_style(&self) -> SceneStyle {
        let [x, y, z] = self.camera.offset;
        SceneStyle {
            background: self.scene.background,
            grid_size: self.scene.grid_size,
            grid_divisions: self.scene.grid_divisions,
            grid_center_color: self.scene.grid_center_color,
            grid_color: self.scene.grid_color,
            camera_offset: Vector3::new(x, y, z),
            ..SceneStyle::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
            title: "planview".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Eye position relative to the plan's centroid
    pub offset: [f32; 3],
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 10000.0,
            offset: [-800.0, 1000.0, 800.0],
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            pan_speed: 0.01,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub background: u32,
    pub grid_size: f32,
    pub grid_divisions: u32,
    pub grid_center_color: u32,
    pub grid_color: u32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        let style = SceneStyle::default();
        Self {
            background: style.background,
            grid_size: style.grid_size,
            grid_divisions: style.grid_divisions,
            grid_center_color: style.grid_center_color,
            grid_color: style.grid_color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub timeout_secs: u64,
    pub base_dir: Option<PathBuf>,
}

impl AssetConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            base_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScreenshotConfig {
    pub path: PathBuf,
}

impl Default for ScreenshotConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("render.png"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
