use crate::config::{rendering::RenderConfig, window::WindowConfig};
use anyhow::{ensure, Context, Result};
use directories::ProjectDirs;
use log::{debug, LevelFilter};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "advgl.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
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

impl LoggingConfig {
    pub fn level_filter(&self) -> Option<LevelFilter> {
        self.level.trim().parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Block on a console prompt before the process exits.
    pub pause_on_exit: bool,
    pub window: WindowConfig,
    pub rendering: RenderConfig,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pause_on_exit: true,
            window: WindowConfig::default(),
            rendering: RenderConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Reads the per-user config file, or defaults when there is none.
    pub fn load() -> Result<Self> {
        let path = config_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.window.width > 0 && self.window.height > 0,
            "window size must be non-zero, got {}x{}",
            self.window.width,
            self.window.height
        );
        ensure!(
            self.window.gl_version() >= (3, 3),
            "OpenGL {}.{} is too old, 3.3 core is the minimum",
            self.window.gl_major,
            self.window.gl_minor
        );
        ensure!(
            self.rendering
                .clear_color
                .iter()
                .all(|c| (0.0..=1.0).contains(c)),
            "clear_color components must lie in [0, 1], got {:?}",
            self.rendering.clear_color
        );
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "MetroManDevTeam", "advgl")
        .context("Couldn't determine project directory")?;
    Ok(proj_dirs.config_dir().join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::shaders::ShaderFailurePolicy;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_match_tutorial_window() {
        let config = AppConfig::default();
        assert_eq!((config.window.width, config.window.height), (1280, 720));
        assert_eq!(config.window.gl_version(), (3, 3));
        assert_eq!(config.window.title, "Adv Game Engine Tutorial");
        assert_eq!(config.rendering.clear_color, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(config.rendering.shader_failure, ShaderFailurePolicy::Abort);
        assert!(!config.window.vsync);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            pause_on_exit = false

            [rendering]
            shader_failure = "continue"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert!(!config.pause_on_exit);
        assert_eq!(config.rendering.shader_failure, ShaderFailurePolicy::Continue);
        assert_eq!(config.rendering.clear_color, [1.0; 4]);
        assert_eq!(config.window, WindowConfig::default());
        assert_eq!(config.logging.level_filter(), Some(LevelFilter::Debug));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(AppConfig::from_toml_str("[rendering]\nshader_failure = \"retry\"\n").is_err());
        assert!(AppConfig::from_toml_str("[window]\nwidth = 0\n").is_err());
        assert!(AppConfig::from_toml_str("[window]\ngl_major = 2\ngl_minor = 1\n").is_err());
        assert!(AppConfig::from_toml_str("[rendering]\nclear_color = [2.0, 0.0, 0.0, 1.0]\n").is_err());
    }

    #[test]
    fn test_unknown_log_level() {
        let logging = LoggingConfig {
            level: "chatty".to_string(),
        };
        assert_eq!(logging.level_filter(), None);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[window]\ntitle = \"Hello\"\nwidth = 640\nheight = 480\n").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.window.title, "Hello");
        assert_eq!((config.window.width, config.window.height), (640, 480));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_broken_file_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[window\n").unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(format!("{:#}", err).contains(CONFIG_FILE_NAME));
    }
}
