//! Image handling for PDF documents

use crate::{PdfError, Result};
use image::{DynamicImage, GenericImageView, ImageReader};
use lopdf::{Dictionary, Object, ObjectId, Stream};
use std::io::{Cursor, Write};

impl From<image::ImageError> for PdfError {
    fn from(err: image::ImageError) -> Self {
        PdfError::ImageError(err.to_string())
    }
}

/// Detected image format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

/// Detect image format from magic bytes
pub fn detect_format(data: &[u8]) -> Result<ImageFormat> {
    if data.len() < 8 {
        return Err(PdfError::ImageError("Image data too short".to_string()));
    }

    // JPEG starts with FF D8 FF
    if data[0] == 0xFF && data[1] == 0xD8 && data[2] == 0xFF {
        return Ok(ImageFormat::Jpeg);
    }

    // PNG starts with 89 50 4E 47 0D 0A 1A 0A
    if data[0..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A] {
        return Ok(ImageFormat::Png);
    }

    Err(PdfError::ImageError("Unknown image format".to_string()))
}

/// Scale pixel dimensions by a uniform factor
///
/// One pixel maps to one point before scaling, so a 500x200 image at
/// scale 0.3 is drawn 150x60 points.
pub fn scaled_dimensions(width: u32, height: u32, scale: f64) -> (f64, f64) {
    (width as f64 * scale, height as f64 * scale)
}

/// Image XObject for PDF embedding
///
/// Pixels are stored Flate-compressed. Images with any transparency carry a
/// separate DeviceGray soft mask so the page underneath shows through.
#[derive(Debug, Clone)]
pub struct ImageXObject {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Color space ("DeviceRGB", "DeviceGray")
    pub color_space: String,
    /// Bits per component
    pub bits_per_component: u8,
    /// Compressed pixel data
    pub data: Vec<u8>,
    /// Compressed alpha channel, if the image is not fully opaque
    pub alpha: Option<Vec<u8>>,
}

fn deflate(raw: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(raw)?;
    Ok(encoder.finish()?)
}

impl ImageXObject {
    /// Decode a JPEG or PNG file into an XObject
    ///
    /// Rejects images with a zero width or height.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        detect_format(data)?;

        let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
        let image = reader.decode()?;
        Self::from_image(&image)
    }

    /// Build an XObject from an already decoded image
    pub fn from_image(image: &DynamicImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(PdfError::ImageError(format!(
                "Image has empty dimensions {width}x{height}"
            )));
        }

        let has_alpha = image.color().has_alpha();
        let is_gray = !image.color().has_color();

        let (raw_data, color_space) = if is_gray {
            (image.to_luma8().into_raw(), "DeviceGray")
        } else {
            (image.to_rgb8().into_raw(), "DeviceRGB")
        };

        let alpha = if has_alpha {
            let alpha_channel: Vec<u8> = image.to_rgba8().pixels().map(|p| p[3]).collect();
            if alpha_channel.iter().all(|&a| a == u8::MAX) {
                None
            } else {
                Some(deflate(&alpha_channel)?)
            }
        } else {
            None
        };

        Ok(Self {
            width,
            height,
            color_space: color_space.to_string(),
            bits_per_component: 8,
            data: deflate(&raw_data)?,
            alpha,
        })
    }

    /// Soft mask stream for the alpha channel, if any
    pub fn smask_stream(&self) -> Option<Stream> {
        self.alpha.as_ref().map(|alpha| {
            let mut dict = Dictionary::new();
            dict.set("Type", Object::Name(b"XObject".to_vec()));
            dict.set("Subtype", Object::Name(b"Image".to_vec()));
            dict.set("Width", self.width as i64);
            dict.set("Height", self.height as i64);
            dict.set("ColorSpace", Object::Name(b"DeviceGray".to_vec()));
            dict.set("BitsPerComponent", 8_i64);
            dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));
            dict.set("Length", alpha.len() as i64);
            Stream::new(dict, alpha.clone())
        })
    }

    /// Convert to lopdf Stream object
    ///
    /// # Arguments
    /// * `smask` - Object ID of the already-added soft mask stream
    pub fn to_pdf_stream(&self, smask: Option<ObjectId>) -> Stream {
        let mut dict = Dictionary::new();

        dict.set("Type", Object::Name(b"XObject".to_vec()));
        dict.set("Subtype", Object::Name(b"Image".to_vec()));
        dict.set("Width", self.width as i64);
        dict.set("Height", self.height as i64);
        dict.set(
            "ColorSpace",
            Object::Name(self.color_space.as_bytes().to_vec()),
        );
        dict.set("BitsPerComponent", self.bits_per_component as i64);
        dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));
        dict.set("Length", self.data.len() as i64);
        if let Some(smask_id) = smask {
            dict.set("SMask", Object::Reference(smask_id));
        }

        Stream::new(dict, self.data.clone())
    }
}

/// Generate operators to draw image at position
///
/// # Arguments
/// * `image_name` - Image resource name (e.g., "Im1")
/// * `x` - X coordinate of the lower-left corner in points
/// * `y` - Y coordinate of the lower-left corner in points (from bottom)
/// * `width` - Image width in points
/// * `height` - Image height in points
pub fn generate_image_operators(
    image_name: &str,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
) -> Vec<u8> {
    format!("q\n{width} 0 0 {height} {x} {y} cm\n/{image_name} Do\nQ\n").into_bytes()
}
