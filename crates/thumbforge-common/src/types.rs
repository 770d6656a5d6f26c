//! Core type definitions for thumbnail metadata and size specifications.
//!
//! Size specifications are deserialized from the `[sizes.<name>]` tables of
//! the configuration file. All enums serialize in lowercase.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Persisted record linking a source image and a size name to a generated file.
///
/// At most one record exists per `(source_name, size)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThumbnailMeta {
    /// Storage name of the source image.
    pub source_name: String,
    /// Storage name of the generated thumbnail file.
    pub thumbnail_name: String,
    /// Size name the thumbnail was generated for.
    pub size: String,
}

impl ThumbnailMeta {
    pub fn new(
        source_name: impl Into<String>,
        thumbnail_name: impl Into<String>,
        size: impl Into<String>,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            thumbnail_name: thumbnail_name.into(),
            size: size.into(),
        }
    }
}

/// How the source is fitted into the target box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropMode {
    /// Scale to fit inside the box, preserving aspect ratio.
    #[default]
    Fit,
    /// Scale to cover the box, then center-crop the overflow.
    Fill,
    /// Scale to the exact box, ignoring aspect ratio.
    Stretch,
}

impl fmt::Display for CropMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fit => write!(f, "fit"),
            Self::Fill => write!(f, "fill"),
            Self::Stretch => write!(f, "stretch"),
        }
    }
}

/// Encoded output format of a thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    #[serde(alias = "jpg")]
    Jpeg,
    Webp,
    Gif,
    Bmp,
}

impl OutputFormat {
    /// File extension (without the dot) used for generated files.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Png => write!(f, "png"),
            Self::Jpeg => write!(f, "jpeg"),
            Self::Webp => write!(f, "webp"),
            Self::Gif => write!(f, "gif"),
            Self::Bmp => write!(f, "bmp"),
        }
    }
}

/// Anchor point used by the crop processor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    #[default]
    Center,
    TopLeft,
}

/// Axis used by the flip processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlipDirection {
    Horizontal,
    Vertical,
}

/// A primary processing stage, applied to the decoded image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProcessorConfig {
    /// Resize to the size's dimensions using its crop mode.
    Resize,
    /// Crop to a fixed box.
    Crop {
        width: u32,
        height: u32,
        #[serde(default)]
        anchor: Anchor,
    },
    /// Rotate clockwise by 90, 180 or 270 degrees.
    Rotate { degrees: u16 },
    /// Mirror along an axis.
    Flip { direction: FlipDirection },
}

/// A post-processing stage, applied to the encoded bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PostProcessorConfig {
    /// Run an external optimizer in place on a temporary copy.
    ///
    /// `{filename}` in the command is replaced by the temporary file path.
    Optimize { command: String },
}

/// Named thumbnail size configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeSpec {
    pub width: u32,
    pub height: u32,

    #[serde(default)]
    pub crop: CropMode,

    /// Encoder quality (1-100), used for JPEG output.
    #[serde(default = "default_quality")]
    pub quality: u8,

    /// Output format; the source format is kept when unset.
    #[serde(default)]
    pub format: Option<OutputFormat>,

    /// Primary processors in order. An empty list means a single resize.
    #[serde(default)]
    pub processors: Vec<ProcessorConfig>,

    #[serde(default)]
    pub post_processors: Vec<PostProcessorConfig>,
}

fn default_quality() -> u8 {
    85
}

impl SizeSpec {
    /// Create a spec with the given box and default settings.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            crop: CropMode::default(),
            quality: default_quality(),
            format: None,
            processors: Vec::new(),
            post_processors: Vec::new(),
        }
    }

    pub fn with_crop(mut self, crop: CropMode) -> Self {
        self.crop = crop;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_processor(mut self, processor: ProcessorConfig) -> Self {
        self.processors.push(processor);
        self
    }

    pub fn with_post_processor(mut self, post: PostProcessorConfig) -> Self {
        self.post_processors.push(post);
        self
    }
}
