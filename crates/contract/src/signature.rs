//! Signature capture and decoding

use crate::{ContractError, Party, Result, ValidationError};
use base64::{engine::general_purpose::STANDARD, Engine};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_circle_mut;
use std::io::Cursor;

const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// A validated raster signature, kept in its data URI form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureImage {
    data_uri: String,
    bytes: Vec<u8>,
    width: u32,
    height: u32,
    blank: bool,
}

impl SignatureImage {
    /// Parse and validate a `data:image/...;base64,` URI
    ///
    /// The payload must decode to an image with non-zero dimensions.
    pub fn from_data_uri(data_uri: impl Into<String>) -> Result<Self> {
        let data_uri = data_uri.into();

        let payload = {
            let (header, payload) = data_uri.split_once(',').ok_or_else(|| {
                ContractError::InvalidSignature("not a data URI".to_string())
            })?;
            if !header.starts_with("data:image/") || !header.ends_with(";base64") {
                return Err(ContractError::InvalidSignature(format!(
                    "unsupported data URI header {header:?}"
                )));
            }
            payload
        };

        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| ContractError::InvalidSignature(e.to_string()))?;
        let image = image::load_from_memory(&bytes)
            .map_err(|e| ContractError::InvalidSignature(e.to_string()))?;

        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(ContractError::InvalidSignature(
                "image has zero size".to_string(),
            ));
        }
        let blank = image.color().has_alpha() && image.to_rgba8().pixels().all(|p| p[3] == 0);

        Ok(Self {
            data_uri,
            bytes,
            width,
            height,
            blank,
        })
    }

    /// Wrap PNG bytes as a signature
    pub fn from_png_bytes(png: &[u8]) -> Result<Self> {
        Self::from_data_uri(format!("{PNG_DATA_URI_PREFIX}{}", STANDARD.encode(png)))
    }

    /// Like [`from_data_uri`](Self::from_data_uri), reporting failures for a party
    pub fn for_party(party: Party, data_uri: impl Into<String>) -> Result<Self> {
        Self::from_data_uri(data_uri).map_err(|e| ContractError::ImageDecode {
            party,
            reason: e.to_string(),
        })
    }

    pub fn data_uri(&self) -> &str {
        &self.data_uri
    }

    /// Encoded image bytes (PNG or JPEG)
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Pixel dimensions
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// True when every pixel is fully transparent, as in an untouched canvas export
    pub fn is_blank(&self) -> bool {
        self.blank
    }
}

/// Pen radius in pixels
const PEN_RADIUS: i32 = 1;

/// A drawing surface that records strokes and rasterizes them
///
/// Coordinates are canvas pixels with the origin at the top-left corner.
#[derive(Debug, Clone)]
pub struct SignaturePad {
    width: u32,
    height: u32,
    strokes: Vec<Vec<(f32, f32)>>,
}

impl SignaturePad {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            strokes: Vec::new(),
        }
    }

    /// Start a new stroke at a point
    pub fn begin_stroke(&mut self, x: f32, y: f32) {
        self.strokes.push(vec![(x, y)]);
    }

    /// Extend the current stroke; starts one if none is open
    pub fn extend_stroke(&mut self, x: f32, y: f32) {
        match self.strokes.last_mut() {
            Some(stroke) => stroke.push((x, y)),
            None => self.begin_stroke(x, y),
        }
    }

    /// Forget every stroke
    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn stroke_count(&self) -> usize {
        self.strokes.len()
    }

    /// Pin a point to the canvas bounds
    fn clamp(&self, (x, y): (f32, f32)) -> (f32, f32) {
        let clamp_axis = |v: f32, max: u32| {
            if v.is_nan() {
                0.0
            } else {
                v.clamp(0.0, max as f32)
            }
        };
        (clamp_axis(x, self.width), clamp_axis(y, self.height))
    }

    /// Rasterize the strokes onto a transparent canvas
    ///
    /// Points outside the canvas are pinned to its edges.
    pub fn render(&self) -> RgbaImage {
        let mut canvas = RgbaImage::from_pixel(self.width, self.height, Rgba([0, 0, 0, 0]));
        let ink = Rgba([0, 0, 0, 255]);

        for stroke in &self.strokes {
            let mut points = stroke.iter().map(|&p| self.clamp(p));
            let Some(mut prev) = points.next() else {
                continue;
            };
            stamp(&mut canvas, prev, ink);

            for next in points {
                let (dx, dy) = (next.0 - prev.0, next.1 - prev.1);
                let steps = (dx.abs().max(dy.abs()) * 2.0).ceil().max(1.0) as usize;
                for i in 1..=steps {
                    let t = i as f32 / steps as f32;
                    stamp(&mut canvas, (prev.0 + dx * t, prev.1 + dy * t), ink);
                }
                prev = next;
            }
        }

        canvas
    }

    /// Export the drawing as a PNG signature
    ///
    /// A pad without strokes is rejected for the given party.
    pub fn to_signature(&self, party: Party) -> Result<SignatureImage> {
        if self.is_empty() {
            return Err(ValidationError::BlankSignature(party).into());
        }

        let mut png = Vec::new();
        DynamicImage::ImageRgba8(self.render())
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| ContractError::InvalidSignature(e.to_string()))?;

        log::debug!(
            "Rendered {} signature: {} strokes, {} bytes",
            party,
            self.strokes.len(),
            png.len()
        );
        SignatureImage::from_png_bytes(&png)
    }
}

fn stamp(canvas: &mut RgbaImage, (x, y): (f32, f32), ink: Rgba<u8>) {
    draw_filled_circle_mut(canvas, (x.round() as i32, y.round() as i32), PEN_RADIUS, ink);
}
