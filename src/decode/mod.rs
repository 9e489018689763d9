mod decoder;
mod orientation;
mod preview;

pub use decoder::Decoder;
pub use orientation::RawRotation;
pub use preview::{ExifToolExtractor, PreviewExtractor};

#[cfg(test)]
pub(crate) use decoder::tests::{FakeExtractor, jpeg_bytes, jpeg_with_orientation};
