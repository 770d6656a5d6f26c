use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use thumbforge_common::{Error, OutputFormat, Result, SizeSpec};

use super::{build_post_processor, build_processor, PostProcessor, Processor, Resize};

/// Encoded output of a pipeline run.
#[derive(Debug, Clone)]
pub struct Processed {
    pub data: Vec<u8>,
    pub format: OutputFormat,
}

/// Ordered processors and post-processors for one size.
pub struct Pipeline {
    processors: Vec<Box<dyn Processor>>,
    post_processors: Vec<Box<dyn PostProcessor>>,
}

impl Pipeline {
    pub fn new(
        processors: Vec<Box<dyn Processor>>,
        post_processors: Vec<Box<dyn PostProcessor>>,
    ) -> Self {
        Self {
            processors,
            post_processors,
        }
    }

    /// Build the pipeline a size spec describes.
    ///
    /// A spec without processors gets a single [`Resize`].
    pub fn from_spec(spec: &SizeSpec) -> Result<Self> {
        let processors = if spec.processors.is_empty() {
            vec![Box::new(Resize) as Box<dyn Processor>]
        } else {
            spec.processors
                .iter()
                .map(build_processor)
                .collect::<Result<Vec<_>>>()?
        };

        let post_processors = spec
            .post_processors
            .iter()
            .map(build_post_processor)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(processors, post_processors))
    }

    /// Stage names in execution order, for logging.
    pub fn stages(&self) -> Vec<&'static str> {
        self.processors
            .iter()
            .map(|p| p.name())
            .chain(self.post_processors.iter().map(|p| p.name()))
            .collect()
    }

    /// Run every stage over `data`.
    pub fn run(&self, data: &[u8], spec: &SizeSpec) -> Result<Processed> {
        let source_format = image::guess_format(data)
            .map_err(|e| Error::processing(format!("Unrecognized image data: {}", e)))?;
        let mut image = image::load_from_memory_with_format(data, source_format)
            .map_err(|e| Error::processing(format!("Failed to decode image: {}", e)))?;

        for processor in &self.processors {
            image = processor.process(image, spec)?;
        }

        let format = spec.format.unwrap_or_else(|| output_format_for(source_format));
        let mut data = encode(&image, format, spec.quality)?;

        for post in &self.post_processors {
            data = post.process(data, format, spec)?;
        }

        tracing::debug!(
            stages = ?self.stages(),
            format = %format,
            width = image.width(),
            height = image.height(),
            bytes = data.len(),
            "Pipeline finished"
        );

        Ok(Processed { data, format })
    }
}

/// Encode `image` as `format`. `quality` applies to JPEG only.
pub fn encode(image: &DynamicImage, format: OutputFormat, quality: u8) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());

    let result = match format {
        OutputFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
            rgb.write_with_encoder(encoder)
        }
        OutputFormat::Png => image.write_to(&mut buf, ImageFormat::Png),
        other => {
            let eight_bit = if image.color().has_alpha() {
                DynamicImage::ImageRgba8(image.to_rgba8())
            } else {
                DynamicImage::ImageRgb8(image.to_rgb8())
            };
            eight_bit.write_to(&mut buf, image_format(other))
        }
    };

    result.map_err(|e| Error::processing(format!("Failed to encode {}: {}", format, e)))?;
    Ok(buf.into_inner())
}

fn image_format(format: OutputFormat) -> ImageFormat {
    match format {
        OutputFormat::Png => ImageFormat::Png,
        OutputFormat::Jpeg => ImageFormat::Jpeg,
        OutputFormat::Webp => ImageFormat::WebP,
        OutputFormat::Gif => ImageFormat::Gif,
        OutputFormat::Bmp => ImageFormat::Bmp,
    }
}

/// Keep the source format when we can encode it, PNG otherwise.
fn output_format_for(source: ImageFormat) -> OutputFormat {
    match source {
        ImageFormat::Jpeg => OutputFormat::Jpeg,
        ImageFormat::WebP => OutputFormat::Webp,
        ImageFormat::Gif => OutputFormat::Gif,
        ImageFormat::Bmp => OutputFormat::Bmp,
        _ => OutputFormat::Png,
    }
}
