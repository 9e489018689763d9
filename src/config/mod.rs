mod load;
mod types;

pub use load::LoadedConfig;
pub use types::{
    CompressConfig, DEFAULT_FONT, DEFAULT_SOFTWARE, SizeTier, ThumbConfig, ThumbforgeConfig,
    default_tiers,
};
