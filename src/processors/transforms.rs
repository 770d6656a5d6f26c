//! Built-in image transforms.

use image::imageops::FilterType;
use image::DynamicImage;
use thumbforge_common::{Anchor, CropMode, Error, FlipDirection, Result, SizeSpec};

use super::Processor;

/// Resize to the spec's box using the spec's crop mode.
///
/// `fit` never upscales; `fill` and `stretch` always produce the exact box.
#[derive(Debug, Clone, Copy)]
pub struct Resize;

impl Processor for Resize {
    fn name(&self) -> &'static str {
        "resize"
    }

    fn process(&self, image: DynamicImage, spec: &SizeSpec) -> Result<DynamicImage> {
        if spec.width == 0 || spec.height == 0 {
            return Err(Error::processing(format!(
                "Cannot resize to {}x{}",
                spec.width, spec.height
            )));
        }

        Ok(match spec.crop {
            CropMode::Fit => {
                if image.width() <= spec.width && image.height() <= spec.height {
                    image
                } else {
                    image.resize(spec.width, spec.height, FilterType::Lanczos3)
                }
            }
            CropMode::Fill => image.resize_to_fill(spec.width, spec.height, FilterType::Lanczos3),
            CropMode::Stretch => image.resize_exact(spec.width, spec.height, FilterType::Lanczos3),
        })
    }
}

/// Crop to a fixed box, clamped to the image bounds.
#[derive(Debug, Clone, Copy)]
pub struct Crop {
    width: u32,
    height: u32,
    anchor: Anchor,
}

impl Crop {
    pub fn new(width: u32, height: u32, anchor: Anchor) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::invalid_input(format!(
                "Crop box must be non-empty, got {}x{}",
                width, height
            )));
        }
        Ok(Self {
            width,
            height,
            anchor,
        })
    }
}

impl Processor for Crop {
    fn name(&self) -> &'static str {
        "crop"
    }

    fn process(&self, image: DynamicImage, _spec: &SizeSpec) -> Result<DynamicImage> {
        let width = self.width.min(image.width());
        let height = self.height.min(image.height());
        let (x, y) = match self.anchor {
            Anchor::Center => ((image.width() - width) / 2, (image.height() - height) / 2),
            Anchor::TopLeft => (0, 0),
        };
        Ok(image.crop_imm(x, y, width, height))
    }
}

/// Clockwise rotation by a right angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotate {
    Quarter,
    Half,
    ThreeQuarters,
}

impl Rotate {
    pub fn new(degrees: u16) -> Result<Self> {
        match degrees {
            90 => Ok(Self::Quarter),
            180 => Ok(Self::Half),
            270 => Ok(Self::ThreeQuarters),
            other => Err(Error::invalid_input(format!(
                "Rotation must be 90, 180 or 270 degrees, got {}",
                other
            ))),
        }
    }
}

impl Processor for Rotate {
    fn name(&self) -> &'static str {
        "rotate"
    }

    fn process(&self, image: DynamicImage, _spec: &SizeSpec) -> Result<DynamicImage> {
        Ok(match self {
            Self::Quarter => image.rotate90(),
            Self::Half => image.rotate180(),
            Self::ThreeQuarters => image.rotate270(),
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Flip {
    direction: FlipDirection,
}

impl Flip {
    pub fn new(direction: FlipDirection) -> Self {
        Self { direction }
    }
}

impl Processor for Flip {
    fn name(&self) -> &'static str {
        "flip"
    }

    fn process(&self, image: DynamicImage, _spec: &SizeSpec) -> Result<DynamicImage> {
        Ok(match self.direction {
            FlipDirection::Horizontal => image.fliph(),
            FlipDirection::Vertical => image.flipv(),
        })
    }
}
