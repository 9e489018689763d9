use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::types::ThumbforgeConfig;

/// A loaded configuration file with its associated directory.
///
/// Paths in the config are relative to the config file location,
/// so we need to track where the config was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The parsed configuration
    pub config: ThumbforgeConfig,
    /// The directory containing the config file
    pub config_dir: PathBuf,
}

impl LoadedConfig {
    /// Load a config file from the given path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        let config: ThumbforgeConfig = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;

        let config_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self { config, config_dir })
    }

    /// Resolve the output directory relative to the config file directory.
    pub fn resolve_output_dir(&self) -> PathBuf {
        self.config_dir.join(&self.config.output_dir)
    }

    /// Resolve the font path relative to the config file directory.
    ///
    /// Absolute font paths are returned unchanged.
    pub fn resolve_font(&self) -> PathBuf {
        self.config_dir.join(&self.config.font)
    }

    /// Resolve the exiftool binary.
    ///
    /// A bare program name is left for `PATH` lookup; anything with a
    /// directory component is resolved against the config directory.
    pub fn resolve_exiftool(&self) -> PathBuf {
        let exiftool = Path::new(&self.config.exiftool);
        if exiftool.components().count() > 1 {
            self.config_dir.join(exiftool)
        } else {
            exiftool.to_path_buf()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thumbforge.json");
        fs::write(&path, r#"{ "output_dir": "cache", "label": false }"#).unwrap();

        let loaded = LoadedConfig::load(&path).unwrap();
        assert!(!loaded.config.label);
        assert_eq!(loaded.config.tiers.len(), 4);
        assert_eq!(loaded.resolve_output_dir(), dir.path().join("cache"));
    }

    #[test]
    fn test_load_custom_tiers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thumbforge.json");
        fs::write(
            &path,
            r#"{ "tiers": [ { "name": "small", "width": 64, "height": 48, "font_size": 12 } ] }"#,
        )
        .unwrap();

        let loaded = LoadedConfig::load(&path).unwrap();
        assert_eq!(loaded.config.tiers.len(), 1);
        assert_eq!(loaded.config.tiers[0].name, "small");
        assert_eq!(loaded.config.tiers[0].height, 48);
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(LoadedConfig::load(&path).is_err());
    }

    #[test]
    fn test_resolve_paths() {
        let loaded = LoadedConfig {
            config: ThumbforgeConfig {
                font: "fonts/Mono.ttf".to_string(),
                exiftool: "exiftool".to_string(),
                ..ThumbforgeConfig::default()
            },
            config_dir: PathBuf::from("/project"),
        };
        assert_eq!(loaded.resolve_font(), PathBuf::from("/project/fonts/Mono.ttf"));
        assert_eq!(loaded.resolve_exiftool(), PathBuf::from("exiftool"));

        let absolute = LoadedConfig {
            config: ThumbforgeConfig {
                font: "/usr/share/fonts/Mono.ttf".to_string(),
                exiftool: "tools/exiftool".to_string(),
                ..ThumbforgeConfig::default()
            },
            config_dir: PathBuf::from("/project"),
        };
        assert_eq!(
            absolute.resolve_font(),
            PathBuf::from("/usr/share/fonts/Mono.ttf")
        );
        assert_eq!(
            absolute.resolve_exiftool(),
            PathBuf::from("/project/tools/exiftool")
        );
    }
}
