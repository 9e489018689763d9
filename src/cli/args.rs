use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "thumbforge")]
#[command(
    version,
    about = "Generate PNG thumbnails (freedesktop sizes)",
    long_about = "Generate PNG thumbnails of photos and RAW files (CR2, CR3, ARW) in the \
                  freedesktop.org thumbnail cache layout. Point --output at \
                  ~/.cache/thumbnails to feed the desktop's thumbnail cache."
)]
pub struct CliArgs {
    /// Input image file or directory (searched recursively)
    pub input: PathBuf,

    /// Load settings from a JSON config file
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output directory [default: thumbnails]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of worker threads [default: all cores]
    #[arg(short = 'j', long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Overwrite existing thumbnails
    #[arg(short = 'f', long)]
    pub force: bool,

    /// Label font file (bold monospace TTF)
    #[arg(long, value_name = "FILE")]
    pub font: Option<PathBuf>,

    /// Do not draw the format label on thumbnails
    #[arg(long)]
    pub no_label: bool,

    /// Regenerate thumbnails whose Thumb::MTime differs from the source
    #[arg(long)]
    pub check_mtime: bool,

    /// exiftool binary used for RAW previews [default: exiftool]
    #[arg(long, value_name = "BIN")]
    pub exiftool: Option<PathBuf>,

    /// Compress PNG output (0-6 or 'max'). Default level is 2 if flag is present without value.
    #[arg(long, value_name = "LEVEL", default_missing_value = "2", num_args = 0..=1)]
    pub compress: Option<CompressionLevel>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// PNG compression level (0-6 or max)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionLevel {
    /// Optimization level 0-6
    Level(u8),
    /// Maximum compression
    Max,
}

impl std::str::FromStr for CompressionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("max") {
            Ok(CompressionLevel::Max)
        } else {
            s.parse::<u8>()
                .map_err(|_e| format!("invalid compression level: {}", s))
                .and_then(|n| {
                    if n <= 6 {
                        Ok(CompressionLevel::Level(n))
                    } else {
                        Err(format!("compression level must be 0-6 or 'max', got {}", n))
                    }
                })
        }
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        CompressionLevel::Level(2)
    }
}
