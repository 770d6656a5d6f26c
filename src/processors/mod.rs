//! Thumbnail processing pipeline.
//!
//! A [`Pipeline`] turns source bytes into thumbnail bytes for one
//! [`SizeSpec`]: decode, run the primary [`Processor`]s on the image, encode
//! to the output format, then run the [`PostProcessor`]s on the encoded
//! bytes. Any stage failing aborts the whole run with
//! [`Error::Processing`](thumbforge_common::Error::Processing).

mod optimize;
mod pipeline;
mod transforms;

pub use optimize::Optimize;
pub use pipeline::{encode, Pipeline, Processed};
pub use transforms::{Crop, Flip, Resize, Rotate};

use image::DynamicImage;
use thumbforge_common::{OutputFormat, PostProcessorConfig, ProcessorConfig, Result, SizeSpec};

/// A transform applied to the decoded image.
pub trait Processor: Send + Sync {
    fn name(&self) -> &'static str;

    fn process(&self, image: DynamicImage, spec: &SizeSpec) -> Result<DynamicImage>;
}

/// A transform applied to the encoded image bytes.
pub trait PostProcessor: Send + Sync {
    fn name(&self) -> &'static str;

    fn process(&self, data: Vec<u8>, format: OutputFormat, spec: &SizeSpec) -> Result<Vec<u8>>;
}

/// Build a processor from its configuration.
pub fn build_processor(config: &ProcessorConfig) -> Result<Box<dyn Processor>> {
    Ok(match config {
        ProcessorConfig::Resize => Box::new(Resize),
        ProcessorConfig::Crop {
            width,
            height,
            anchor,
        } => Box::new(Crop::new(*width, *height, *anchor)?),
        ProcessorConfig::Rotate { degrees } => Box::new(Rotate::new(*degrees)?),
        ProcessorConfig::Flip { direction } => Box::new(Flip::new(*direction)),
    })
}

/// Build a post-processor from its configuration.
pub fn build_post_processor(config: &PostProcessorConfig) -> Result<Box<dyn PostProcessor>> {
    Ok(match config {
        PostProcessorConfig::Optimize { command } => Box::new(Optimize::parse(command)?),
    })
}
