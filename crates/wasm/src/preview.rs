//! Preview object URLs

use contract::{PreviewTracker, PDF_MEDIA_TYPE};
use js_sys::{Array, Uint8Array};
use wasm_bindgen::prelude::*;
use web_sys::{Blob, BlobPropertyBag, Url};

/// Holds the object URL of the PDF preview
///
/// Call `begin()` before starting an assembly and pass the returned
/// generation to `show()` with the bytes. Results from superseded
/// generations are dropped, and the previous URL is revoked whenever a new
/// one is created.
#[wasm_bindgen]
#[derive(Default)]
pub struct PreviewHolder {
    tracker: PreviewTracker,
    url: Option<String>,
}

#[wasm_bindgen]
impl PreviewHolder {
    #[wasm_bindgen(constructor)]
    pub fn new() -> PreviewHolder {
        PreviewHolder::default()
    }

    /// Start a new preview request
    ///
    /// @returns Generation number for `show()`
    pub fn begin(&mut self) -> u32 {
        self.tracker.begin() as u32
    }

    /// Show assembled bytes if their request is still the newest
    ///
    /// @param generation - Value returned by `begin()`
    /// @param bytes - PDF bytes (Uint8Array)
    /// @returns The new object URL, or undefined for a stale result
    pub fn show(&mut self, generation: u32, bytes: &[u8]) -> Result<Option<String>, JsValue> {
        if !self.tracker.accept(generation as u64) {
            return Ok(None);
        }

        let parts = Array::new();
        parts.push(&Uint8Array::from(bytes));
        let options = BlobPropertyBag::new();
        options.set_type(PDF_MEDIA_TYPE);
        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;

        self.release();
        let url = Url::create_object_url_with_blob(&blob)?;
        self.url = Some(url.clone());
        Ok(Some(url))
    }

    /// Current object URL
    #[wasm_bindgen(getter)]
    pub fn url(&self) -> Option<String> {
        self.url.clone()
    }

    /// Revoke the current object URL
    pub fn release(&mut self) {
        if let Some(url) = self.url.take() {
            if let Err(e) = Url::revoke_object_url(&url) {
                log::warn!("Failed to revoke preview URL {}: {:?}", url, e);
            }
        }
    }
}

impl Drop for PreviewHolder {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    const PDF: &[u8] = b"%PDF-1.5\n%%EOF";

    #[wasm_bindgen_test]
    fn test_newer_preview_replaces_url() {
        let mut holder = PreviewHolder::new();
        let first = holder.begin();
        let first_url = holder.show(first, PDF).unwrap().unwrap();

        let second = holder.begin();
        let second_url = holder.show(second, PDF).unwrap().unwrap();
        assert_ne!(first_url, second_url);
        assert_eq!(holder.url(), Some(second_url));
    }

    #[wasm_bindgen_test]
    fn test_stale_preview_is_dropped() {
        let mut holder = PreviewHolder::new();
        let stale = holder.begin();
        let latest = holder.begin();

        let url = holder.show(latest, PDF).unwrap();
        assert!(url.is_some());
        assert_eq!(holder.show(stale, PDF).unwrap(), None);
        assert_eq!(holder.url(), url);

        holder.release();
        assert_eq!(holder.url(), None);
    }
}
