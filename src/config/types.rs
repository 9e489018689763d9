use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::FreshnessPolicy;
use crate::cli::CompressionLevel;
use crate::error::ThumbError;

/// Default label font, a bold monospace face.
pub const DEFAULT_FONT: &str = "/usr/share/fonts/truetype/jetbrains-mono/JetBrainsMono-Bold.ttf";

/// Value of the `Software` text chunk in every thumbnail.
pub const DEFAULT_SOFTWARE: &str = "thumbforge";

pub const DEFAULT_EXIFTOOL: &str = "exiftool";

pub const DEFAULT_EXIFTOOL_TIMEOUT_SECS: u64 = 60;

/// One named thumbnail size: the bounding box and the label font size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeTier {
    /// Directory name under the output base (e.g. "normal")
    pub name: String,
    /// Bounding box width in pixels
    pub width: u32,
    /// Bounding box height in pixels
    pub height: u32,
    /// Label font size in pixels
    pub font_size: u32,
    /// Disabled tiers are neither rendered nor checked for freshness
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl SizeTier {
    pub fn new(name: &str, width: u32, height: u32, font_size: u32) -> Self {
        Self {
            name: name.to_string(),
            width,
            height,
            font_size,
            enabled: true,
        }
    }

    /// Padding around the label text
    pub fn label_padding(&self) -> u32 {
        self.font_size / 2
    }
}

/// The freedesktop tiers. `xx-large` is reserved and ships disabled.
pub fn default_tiers() -> Vec<SizeTier> {
    vec![
        SizeTier::new("normal", 128, 128, 20),
        SizeTier::new("large", 256, 256, 30),
        SizeTier::new("x-large", 512, 512, 40),
        SizeTier {
            enabled: false,
            ..SizeTier::new("xx-large", 1024, 1024, 100)
        },
    ]
}

/// PNG compression level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompressConfig {
    /// Optimization level 0-6
    Level(u8),
    /// Maximum compression ("max")
    Max(String),
}

/// Thumbforge configuration file structure.
///
/// Paths in the config are relative to the config file location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbforgeConfig {
    /// Config file version (currently 1)
    pub version: u32,
    /// Thumbnail cache root
    pub output_dir: String,
    /// Size tiers, in output order
    pub tiers: Vec<SizeTier>,
    /// Label font file
    pub font: String,
    /// Draw the format label on thumbnails
    pub label: bool,
    /// Value of the `Software` text chunk
    pub software: String,
    /// exiftool binary used for RAW previews
    pub exiftool: String,
    /// Per-invocation exiftool timeout in seconds
    pub exiftool_timeout_secs: u64,
    /// Treat thumbnails as stale when their `Thumb::MTime` differs from the source
    pub check_mtime: bool,
    /// PNG compression configuration (optional)
    pub compress: Option<CompressConfig>,
}

impl Default for ThumbforgeConfig {
    fn default() -> Self {
        Self {
            version: 1,
            output_dir: "thumbnails".to_string(),
            tiers: default_tiers(),
            font: DEFAULT_FONT.to_string(),
            label: true,
            software: DEFAULT_SOFTWARE.to_string(),
            exiftool: DEFAULT_EXIFTOOL.to_string(),
            exiftool_timeout_secs: DEFAULT_EXIFTOOL_TIMEOUT_SECS,
            check_mtime: false,
            compress: None,
        }
    }
}

/// Settings shared by every worker for the lifetime of a run.
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ThumbConfig {
    pub tiers: Vec<SizeTier>,
    pub font: PathBuf,
    pub label: bool,
    pub software: String,
    pub exiftool: PathBuf,
    pub exiftool_timeout: Duration,
    pub freshness: FreshnessPolicy,
    pub compress: Option<CompressionLevel>,
}

impl Default for ThumbConfig {
    fn default() -> Self {
        Self {
            tiers: default_tiers(),
            font: PathBuf::from(DEFAULT_FONT),
            label: true,
            software: DEFAULT_SOFTWARE.to_string(),
            exiftool: PathBuf::from(DEFAULT_EXIFTOOL),
            exiftool_timeout: Duration::from_secs(DEFAULT_EXIFTOOL_TIMEOUT_SECS),
            freshness: FreshnessPolicy::Exists,
            compress: None,
        }
    }
}

impl ThumbConfig {
    /// Tiers that are rendered and checked, in configured order.
    pub fn active_tiers(&self) -> impl Iterator<Item = &SizeTier> {
        self.tiers.iter().filter(|t| t.enabled)
    }

    pub fn validate(&self) -> Result<(), ThumbError> {
        if self.active_tiers().next().is_none() {
            return Err(ThumbError::Config("no enabled size tiers".to_string()));
        }

        let mut seen = HashSet::new();
        for tier in &self.tiers {
            if tier.name.is_empty() || tier.name.contains(['/', '\\']) || tier.name == ".." {
                return Err(ThumbError::Config(format!(
                    "invalid tier name '{}'",
                    tier.name
                )));
            }
            if !seen.insert(tier.name.as_str()) {
                return Err(ThumbError::Config(format!(
                    "duplicate tier name '{}'",
                    tier.name
                )));
            }
            if tier.width == 0 || tier.height == 0 {
                return Err(ThumbError::Config(format!(
                    "tier '{}' has an empty bounding box",
                    tier.name
                )));
            }
            if tier.font_size == 0 {
                return Err(ThumbError::Config(format!(
                    "tier '{}' has a zero font size",
                    tier.name
                )));
            }
        }

        if let Some(CompressionLevel::Level(n)) = self.compress {
            if n > 6 {
                return Err(ThumbError::Config(format!(
                    "compression level must be 0-6 or 'max', got {}",
                    n
                )));
            }
        }

        if self.exiftool_timeout.is_zero() {
            return Err(ThumbError::Config(
                "exiftool timeout must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
