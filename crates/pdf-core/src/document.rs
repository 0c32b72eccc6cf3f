//! PDF Document wrapper

use crate::image::{generate_image_operators, ImageXObject};
use crate::text::{generate_text_operators, TextRenderContext};
use crate::{PdfError, Result, StandardFont};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

/// RGB Color (values 0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Create a new RGB color (values 0.0 - 1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create color from RGB values (0-255)
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Black color
    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    /// Red color
    pub fn red() -> Self {
        Self::rgb(1.0, 0.0, 0.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// PDF Document wrapper providing high-level overlay operations
///
/// All coordinates are PDF user space: points, origin at the bottom-left
/// corner of the page. Drawing is buffered per page and written into the
/// page content when the document is serialized.
pub struct PdfDocument {
    /// The underlying lopdf document
    inner: Document,
    /// Current standard font
    current_font: Option<StandardFont>,
    /// Current font size
    current_font_size: f32,
    /// Current text color
    current_text_color: Color,
    /// Embedded standard fonts (font -> PDF object ID)
    embedded_fonts: BTreeMap<StandardFont, ObjectId>,
    /// Page font resources (page number -> font -> resource name)
    page_font_resources: BTreeMap<usize, BTreeMap<StandardFont, String>>,
    /// Embedded images (data hash -> PDF object ID)
    embedded_images: BTreeMap<u64, ObjectId>,
    /// Page image resources (page number -> object ID -> resource name)
    page_image_resources: BTreeMap<usize, BTreeMap<ObjectId, String>>,
    /// Buffered content operators per page (page number -> operators)
    page_content_buffer: BTreeMap<usize, Vec<u8>>,
}

impl PdfDocument {
    /// Open a PDF document from bytes
    ///
    /// # Arguments
    /// * `data` - PDF file bytes
    pub fn open_from_bytes(data: &[u8]) -> Result<Self> {
        let inner = Document::load_mem(data).map_err(|e| PdfError::OpenError(e.to_string()))?;
        Ok(Self::from_document(inner))
    }

    fn from_document(inner: Document) -> Self {
        Self {
            inner,
            current_font: None,
            current_font_size: 12.0,
            current_text_color: Color::default(),
            embedded_fonts: BTreeMap::new(),
            page_font_resources: BTreeMap::new(),
            embedded_images: BTreeMap::new(),
            page_image_resources: BTreeMap::new(),
            page_content_buffer: BTreeMap::new(),
        }
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }

    /// Select a standard font and size for subsequent text
    ///
    /// The font dictionary is added to the document the first time a font is
    /// selected; later calls reuse the same object.
    pub fn set_font(&mut self, font: StandardFont, size: f32) {
        if !self.embedded_fonts.contains_key(&font) {
            let font_id = self.inner.add_object(font.to_pdf_object());
            self.embedded_fonts.insert(font, font_id);
        }

        self.current_font = Some(font);
        self.current_font_size = size;
    }

    /// Set only the font size (keeps current font)
    pub fn set_font_size(&mut self, size: f32) -> Result<()> {
        if self.current_font.is_none() {
            return Err(PdfError::FontNotSet);
        }

        self.current_font_size = size;
        Ok(())
    }

    /// Set the text color
    pub fn set_text_color(&mut self, color: Color) {
        self.current_text_color = color;
    }

    /// Number of distinct font objects added to the document
    pub fn embedded_font_count(&self) -> usize {
        self.embedded_fonts.len()
    }

    /// Get current font's text width for a string, in points
    pub fn get_text_width(&self, text: &str) -> Result<f64> {
        let font = self.current_font.ok_or(PdfError::FontNotSet)?;
        Ok(font.text_width_points(text, self.current_font_size) as f64)
    }

    fn validate_page(&self, page: usize) -> Result<()> {
        let page_count = self.page_count();
        if page == 0 || page > page_count {
            return Err(PdfError::InvalidPage(page, page_count));
        }
        Ok(())
    }

    fn page_id(&self, page: usize) -> Result<ObjectId> {
        let pages = self.inner.get_pages();
        pages
            .get(&(page as u32))
            .copied()
            .ok_or(PdfError::InvalidPage(page, pages.len()))
    }

    /// Insert a single line of text with its baseline at `(x, y)`
    ///
    /// # Arguments
    /// * `text` - Text to insert
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate in points
    /// * `y` - Y coordinate in points (from bottom)
    pub fn insert_text(&mut self, text: &str, page: usize, x: f64, y: f64) -> Result<()> {
        self.validate_page(page)?;

        // Skip empty text - nothing to render
        if text.is_empty() {
            return Ok(());
        }

        let font = self.current_font.ok_or(PdfError::FontNotSet)?;
        let text_hex = font.encode_hex(text)?;
        let font_resource_name = self.get_or_create_font_ref(font, page)?;

        let ctx = TextRenderContext {
            font_name: font_resource_name,
            font_size: self.current_font_size,
            color: self.current_text_color,
        };
        let operators = generate_text_operators(&text_hex, x, y, &ctx);
        self.buffer_content(page, &operators);

        Ok(())
    }

    /// Insert an image with its lower-left corner at `(x, y)`
    ///
    /// Identical image data is added to the document only once.
    ///
    /// # Arguments
    /// * `image` - Decoded image
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate in points
    /// * `y` - Y coordinate in points (from bottom)
    /// * `width` - Display width in points
    /// * `height` - Display height in points
    pub fn insert_image(
        &mut self,
        image: &ImageXObject,
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<()> {
        self.validate_page(page)?;

        let image_resource_name = self.get_or_create_image_ref(image, page)?;
        let operators = generate_image_operators(&image_resource_name, x, y, width, height);
        self.buffer_content(page, &operators);

        Ok(())
    }

    /// Get page width and height in points
    ///
    /// Reads the MediaBox (or CropBox), following the parent chain for
    /// inherited boxes.
    pub fn page_size(&self, page: usize) -> Result<(f64, f64)> {
        let page_id = self.page_id(page)?;
        let media_box = self.get_inherited_attribute(page_id, &[b"MediaBox", b"CropBox"])?;

        let values = match media_box {
            Some(Object::Array(arr)) => arr,
            Some(Object::Reference(id)) => self
                .inner
                .get_object(id)?
                .as_array()
                .map_err(|_| PdfError::ParseError("MediaBox is not an array".to_string()))?
                .clone(),
            // Default to US Letter as viewers do
            _ => return Ok((612.0, 792.0)),
        };

        if values.len() < 4 {
            return Err(PdfError::ParseError("Invalid MediaBox format".to_string()));
        }

        let number = |obj: &Object| -> Result<f64> {
            obj.as_f32()
                .map(|v| v as f64)
                .or_else(|_| obj.as_i64().map(|v| v as f64))
                .map_err(|_| PdfError::ParseError("Invalid MediaBox entry".to_string()))
        };

        let width = number(&values[2])? - number(&values[0])?;
        let height = number(&values[3])? - number(&values[1])?;
        Ok((width, height))
    }

    /// Look up a page attribute, following the parent chain when inherited
    fn get_inherited_attribute(&self, page_id: ObjectId, keys: &[&[u8]]) -> Result<Option<Object>> {
        let mut current_id = page_id;

        // Follow parent chain up to 10 levels (safety limit)
        for _ in 0..10 {
            let dict = self
                .inner
                .get_object(current_id)?
                .as_dict()
                .map_err(|_| PdfError::ParseError("Object is not a dictionary".to_string()))?;

            for key in keys {
                if let Ok(value) = dict.get(key) {
                    return Ok(Some(value.clone()));
                }
            }

            match dict.get(b"Parent") {
                Ok(Object::Reference(parent_id)) => current_id = *parent_id,
                _ => break,
            }
        }

        Ok(None)
    }

    /// Resolve a dictionary that may be stored inline or by reference
    fn resolve_dict(&self, obj: &Object) -> Result<Dictionary> {
        match obj {
            Object::Dictionary(dict) => Ok(dict.clone()),
            Object::Reference(id) => self
                .inner
                .get_object(*id)?
                .as_dict()
                .cloned()
                .map_err(|_| PdfError::ParseError("Reference is not a dictionary".to_string())),
            _ => Err(PdfError::ParseError("Expected a dictionary".to_string())),
        }
    }

    /// Current Resources of a page, including inherited ones
    fn page_resources(&self, page_id: ObjectId) -> Result<Dictionary> {
        match self.get_inherited_attribute(page_id, &[b"Resources"])? {
            Some(resources) => self.resolve_dict(&resources),
            None => Ok(Dictionary::new()),
        }
    }

    /// Pick a resource name that does not collide with the page's existing ones
    fn unique_resource_name(&self, page: usize, category: &[u8], prefix: &str) -> Result<String> {
        let page_id = self.page_id(page)?;
        let resources = self.page_resources(page_id)?;
        let existing = match resources.get(category) {
            Ok(obj) => self.resolve_dict(obj).unwrap_or_default(),
            Err(_) => Dictionary::new(),
        };

        let ours: Vec<&String> = self
            .page_font_resources
            .get(&page)
            .into_iter()
            .flat_map(|m| m.values())
            .chain(
                self.page_image_resources
                    .get(&page)
                    .into_iter()
                    .flat_map(|m| m.values()),
            )
            .collect();

        let mut n = 1;
        loop {
            let candidate = format!("{prefix}{n}");
            if !existing.has(candidate.as_bytes()) && !ours.contains(&&candidate) {
                return Ok(candidate);
            }
            n += 1;
        }
    }

    /// Add an entry to one category (Font, XObject) of a page's Resources
    ///
    /// The merged Resources dictionary is written inline on the page, so a
    /// Resources object shared with other pages is left untouched.
    fn add_page_resource(
        &mut self,
        page: usize,
        category: &[u8],
        resource_name: &str,
        object_id: ObjectId,
    ) -> Result<()> {
        let page_id = self.page_id(page)?;
        let mut resources = self.page_resources(page_id)?;

        let mut category_dict = match resources.get(category) {
            Ok(obj) => self.resolve_dict(obj)?,
            Err(_) => Dictionary::new(),
        };
        category_dict.set(resource_name.as_bytes(), Object::Reference(object_id));
        resources.set(category, Object::Dictionary(category_dict));

        let page_dict = self
            .inner
            .get_object_mut(page_id)?
            .as_dict_mut()
            .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?;
        page_dict.set("Resources", Object::Dictionary(resources));

        Ok(())
    }

    /// Get or create a font reference for a specific page
    ///
    /// Returns the resource name (e.g., "F1") for use in content streams
    fn get_or_create_font_ref(&mut self, font: StandardFont, page: usize) -> Result<String> {
        if let Some(name) = self
            .page_font_resources
            .get(&page)
            .and_then(|fonts| fonts.get(&font))
        {
            return Ok(name.clone());
        }

        let font_id = *self
            .embedded_fonts
            .get(&font)
            .ok_or(PdfError::FontNotSet)?;
        let resource_name = self.unique_resource_name(page, b"Font", "F")?;
        self.add_page_resource(page, b"Font", &resource_name, font_id)?;

        self.page_font_resources
            .entry(page)
            .or_default()
            .insert(font, resource_name.clone());

        Ok(resource_name)
    }

    /// Get or create an image reference for a specific page
    ///
    /// Returns the resource name (e.g., "Im1"). Images are deduplicated by
    /// hash of their pixel data.
    fn get_or_create_image_ref(&mut self, image: &ImageXObject, page: usize) -> Result<String> {
        let mut hasher = DefaultHasher::new();
        image.data.hash(&mut hasher);
        image.alpha.hash(&mut hasher);
        image.width.hash(&mut hasher);
        image.height.hash(&mut hasher);
        let data_hash = hasher.finish();

        let object_id = match self.embedded_images.get(&data_hash) {
            Some(object_id) => *object_id,
            None => {
                let smask_id = image
                    .smask_stream()
                    .map(|smask| self.inner.add_object(smask));
                let object_id = self.inner.add_object(image.to_pdf_stream(smask_id));
                self.embedded_images.insert(data_hash, object_id);
                object_id
            }
        };

        if let Some(name) = self
            .page_image_resources
            .get(&page)
            .and_then(|images| images.get(&object_id))
        {
            return Ok(name.clone());
        }

        let resource_name = self.unique_resource_name(page, b"XObject", "Im")?;
        self.add_page_resource(page, b"XObject", &resource_name, object_id)?;

        self.page_image_resources
            .entry(page)
            .or_default()
            .insert(object_id, resource_name.clone());

        Ok(resource_name)
    }

    /// Number of distinct images added to the document
    pub fn embedded_image_count(&self) -> usize {
        self.embedded_images.len()
    }

    /// Buffer content operators for a page (written at save time)
    fn buffer_content(&mut self, page: usize, content: &[u8]) {
        self.page_content_buffer
            .entry(page)
            .or_default()
            .extend_from_slice(content);
    }

    /// Flush all buffered content to page streams
    fn flush_content_buffers(&mut self) -> Result<()> {
        let buffers = std::mem::take(&mut self.page_content_buffer);

        for (page, content) in buffers {
            if !content.is_empty() {
                self.append_to_content_stream(page, &content)?;
            }
        }

        Ok(())
    }

    /// Append content to a page's content
    ///
    /// The existing streams are kept as-is and bracketed by `q` / `Q`, so any
    /// graphics state the template leaves behind cannot move the overlay.
    fn append_to_content_stream(&mut self, page: usize, content: &[u8]) -> Result<()> {
        let page_id = self.page_id(page)?;

        let existing = {
            let page_dict = self
                .inner
                .get_object(page_id)?
                .as_dict()
                .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?;

            match page_dict.get(b"Contents") {
                Ok(Object::Reference(id)) => match self.inner.get_object(*id)? {
                    Object::Array(arr) => arr.clone(),
                    _ => vec![Object::Reference(*id)],
                },
                Ok(Object::Array(arr)) => arr.clone(),
                Ok(Object::Stream(stream)) => vec![Object::Stream(stream.clone())],
                _ => Vec::new(),
            }
        };

        let mut contents = Vec::with_capacity(existing.len() + 2);
        let open_id = self
            .inner
            .add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        contents.push(Object::Reference(open_id));

        for obj in existing {
            match obj {
                Object::Stream(stream) => {
                    let id = self.inner.add_object(stream);
                    contents.push(Object::Reference(id));
                }
                other => contents.push(other),
            }
        }

        let mut overlay = b"Q\n".to_vec();
        overlay.extend_from_slice(content);
        let overlay_id = self.inner.add_object(Stream::new(Dictionary::new(), overlay));
        contents.push(Object::Reference(overlay_id));

        let page_dict = self
            .inner
            .get_object_mut(page_id)?
            .as_dict_mut()
            .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?;
        page_dict.set("Contents", Object::Array(contents));

        Ok(())
    }

    /// Save the document to bytes
    ///
    /// No timestamps or random IDs are written, so identical input produces
    /// identical output.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.flush_content_buffers()?;

        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;

        Ok(buffer)
    }

    /// Get a reference to the underlying lopdf document
    pub fn inner(&self) -> &Document {
        &self.inner
    }

    /// Get all page object IDs in order
    pub fn get_page_ids(&self) -> Vec<ObjectId> {
        self.inner.get_pages().values().copied().collect()
    }
}
