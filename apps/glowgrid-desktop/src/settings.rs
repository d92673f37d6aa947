use anyhow::{Context, Result};
use glowgrid_input::ReconfigureRequest;
use glowgrid_kernel::SceneConfig;
use glowgrid_render::BloomSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything the desktop app can be configured with at startup.
///
/// Missing fields fall back to their defaults, so a settings file only needs
/// the values it changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub scene: SceneConfig,
    pub bloom: BloomSettings,
}

impl Settings {
    /// Read a JSON settings file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse settings file {}", path.display()))?;
        tracing::info!(path = %path.display(), "settings loaded");
        Ok(settings.sanitized())
    }

    pub fn sanitized(self) -> Self {
        Self {
            scene: self.scene.sanitized(),
            bloom: self.bloom.sanitized(),
        }
    }

    /// Apply command-line overrides on top of the file values.
    pub fn with_overrides(self, request: &ReconfigureRequest) -> Self {
        if request.is_empty() {
            return self;
        }
        Self {
            scene: self.scene.merged(request),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_settings(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let file = write_settings(r#"{ "scene": { "grid": { "count": 25 } } }"#);
        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.scene.grid.count, 25);
        assert_eq!(settings.scene.grid.spacing, 3.0);
        assert_eq!(settings.bloom, BloomSettings::default());
    }

    #[test]
    fn out_of_range_values_are_sanitized() {
        let file = write_settings(
            r#"{ "scene": { "grid": { "count": 50000, "spacing": -2.0 } }, "bloom": { "strength": 10.0 } }"#,
        );
        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.scene.grid.count, 10_000);
        assert_eq!(settings.scene.grid.spacing, 3.0);
        assert_eq!(settings.bloom.strength, 3.0);
    }

    #[test]
    fn missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = Settings::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("absent.json"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let file = write_settings("{ not json");
        assert!(Settings::load(file.path()).is_err());
    }

    #[test]
    fn overrides_replace_file_values() {
        let request = ReconfigureRequest {
            count: Some(4),
            spacing: Some(1.5),
            ..ReconfigureRequest::default()
        };
        let settings = Settings::default().with_overrides(&request);
        assert_eq!(settings.scene.grid.count, 4);
        assert_eq!(settings.scene.grid.spacing, 1.5);
    }
}
