use image::DynamicImage;

/// Rotation reported by the preview extractor for a RAW file.
///
/// Quarter turns swap the output's width and height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawRotation {
    #[default]
    None,
    Clockwise90,
    Clockwise270,
    CounterClockwise90,
    Half,
}

impl RawRotation {
    /// Map an exiftool `Orientation` value. Unknown values mean no rotation.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag.map(str::trim) {
            Some("Rotate 90 CW") => RawRotation::Clockwise90,
            Some("Rotate 270 CW") => RawRotation::Clockwise270,
            Some("Rotate 90 CCW") => RawRotation::CounterClockwise90,
            Some("Rotate 180") => RawRotation::Half,
            _ => RawRotation::None,
        }
    }

    /// Signed angle in degrees, counter-clockwise positive.
    pub fn degrees(self) -> i32 {
        match self {
            RawRotation::None => 0,
            RawRotation::Clockwise90 => -90,
            RawRotation::Clockwise270 => -270,
            RawRotation::CounterClockwise90 => 90,
            RawRotation::Half => 180,
        }
    }

    pub fn apply(self, image: DynamicImage) -> DynamicImage {
        match self.degrees().rem_euclid(360) {
            90 => image.rotate270(),
            180 => image.rotate180(),
            270 => image.rotate90(),
            _ => image,
        }
    }
}
