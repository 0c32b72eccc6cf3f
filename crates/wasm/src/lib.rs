//! WASM bindings for RentGen
//!
//! This crate provides JavaScript-friendly API for:
//! - Fetching the agreement template
//! - Driving the three-step wizard over `localStorage`
//! - Capturing signatures on a pad
//! - Assembling draft and signed agreements
//! - Showing previews without leaking object URLs
//!
//! # Example (JavaScript)
//!
//! ```javascript
//! import init, { fetchTemplate, RentalWizard, PreviewHolder } from 'rentgen-wasm';
//!
//! await init();
//!
//! const wizard = RentalWizard.start();
//! wizard.submitRecord(JSON.stringify(formData));
//!
//! const template = await fetchTemplate('/edoc/rentalRoomAgreement.pdf');
//! const preview = new PreviewHolder();
//! const generation = preview.begin();
//! const url = preview.show(generation, wizard.assembleDraft(template));
//! ```

mod preview;
mod storage;

pub use preview::PreviewHolder;
pub use storage::LocalStorageDraftStore;

use chrono::NaiveDate;
use contract::dates::{start_plus, today_plus};
use contract::{
    ContractError, ContractRecord, Party, SignatureImage, SignaturePad, Wizard, WizardStep,
};
use js_sys::Uint8Array;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

// Initialize panic hook and console logging
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_ok() {
        log::info!("RentGen WASM module initialized");
    }
}

fn js_error(e: ContractError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn parse_party(party: &str) -> Result<Party, JsValue> {
    match party.to_ascii_lowercase().as_str() {
        "landlord" => Ok(Party::Landlord),
        "tenant" => Ok(Party::Tenant),
        other => Err(JsValue::from_str(&format!("Unknown party: {other}"))),
    }
}

fn step_name(step: WizardStep) -> &'static str {
    match step {
        WizardStep::DataEntry => "dataEntry",
        WizardStep::Signatures => "signatures",
        WizardStep::Finalize => "finalize",
    }
}

fn parse_step(step: &str) -> Result<WizardStep, JsValue> {
    match step {
        "dataEntry" => Ok(WizardStep::DataEntry),
        "signatures" => Ok(WizardStep::Signatures),
        "finalize" => Ok(WizardStep::Finalize),
        other => Err(JsValue::from_str(&format!("Unknown step: {other}"))),
    }
}

/// Today's date from the browser clock
fn today() -> Result<NaiveDate, JsValue> {
    let now = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(
        now.get_full_year() as i32,
        now.get_month() + 1,
        now.get_date(),
    )
    .ok_or_else(|| JsValue::from_str("Invalid system date"))
}

/// Fetch the template bytes
///
/// A failed request or non-success status is reported once and not retried.
///
/// @param url - Template URL (e.g. "/edoc/rentalRoomAgreement.pdf")
/// @returns PDF bytes (Uint8Array)
#[wasm_bindgen(js_name = fetchTemplate)]
pub async fn fetch_template(url: String) -> Result<Uint8Array, JsValue> {
    let fetch_error = |detail: String| js_error(ContractError::TemplateFetch(detail));

    let window = web_sys::window().ok_or_else(|| fetch_error("No window available".into()))?;
    let response = JsFuture::from(window.fetch_with_str(&url))
        .await
        .map_err(|e| fetch_error(format!("{url}: {e:?}")))?;
    let response: Response = response.dyn_into()?;

    if !response.ok() {
        return Err(fetch_error(format!("{url}: HTTP {}", response.status())));
    }

    let buffer = JsFuture::from(response.array_buffer()?)
        .await
        .map_err(|e| fetch_error(format!("{url}: {e:?}")))?;
    let bytes = Uint8Array::new(&buffer);
    log::info!("Fetched template {} ({} bytes)", url, bytes.length());
    Ok(bytes)
}

/// ISO date `days` after today
#[wasm_bindgen(js_name = dateFromToday)]
pub fn date_from_today(days: i32) -> Result<String, JsValue> {
    Ok(today_plus(today()?, days as i64))
}

/// ISO date `days` after `start`, or after today when `start` is not a date
#[wasm_bindgen(js_name = dateFromStart)]
pub fn date_from_start(start: &str, days: i32) -> Result<String, JsValue> {
    Ok(start_plus(start, today()?, days as i64))
}

/// Rental agreement wizard backed by `localStorage`
#[wasm_bindgen]
pub struct RentalWizard {
    inner: Wizard<LocalStorageDraftStore>,
    landlord_pad: SignaturePad,
    tenant_pad: SignaturePad,
}

impl RentalWizard {
    fn with_wizard(inner: Wizard<LocalStorageDraftStore>) -> RentalWizard {
        RentalWizard {
            inner,
            landlord_pad: SignaturePad::new(500, 200),
            tenant_pad: SignaturePad::new(500, 200),
        }
    }

    fn pad_mut(&mut self, party: Party) -> &mut SignaturePad {
        match party {
            Party::Landlord => &mut self.landlord_pad,
            Party::Tenant => &mut self.tenant_pad,
        }
    }
}

#[wasm_bindgen]
impl RentalWizard {
    /// Begin a new agreement, clearing stored drafts
    pub fn start() -> Result<RentalWizard, JsValue> {
        let store = LocalStorageDraftStore::new().map_err(js_error)?;
        let inner = Wizard::start(store).map_err(js_error)?;
        Ok(Self::with_wizard(inner))
    }

    /// Continue from stored drafts
    pub fn resume() -> Result<RentalWizard, JsValue> {
        let store = LocalStorageDraftStore::new().map_err(js_error)?;
        let inner = Wizard::resume(store).map_err(js_error)?;
        Ok(Self::with_wizard(inner))
    }

    /// Replace the assembly configuration
    ///
    /// @param json - Configuration JSON (every field optional)
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(self, json: &str) -> Result<RentalWizard, JsValue> {
        let config = contract::AssemblyConfig::from_json(json).map_err(js_error)?;
        Ok(RentalWizard {
            inner: self.inner.with_config(config),
            landlord_pad: self.landlord_pad,
            tenant_pad: self.tenant_pad,
        })
    }

    /// Template URL from the configuration
    #[wasm_bindgen(getter, js_name = templatePath)]
    pub fn template_path(&self) -> String {
        self.inner.config().template_path.clone()
    }

    /// Current step ("dataEntry", "signatures", "finalize")
    #[wasm_bindgen(getter)]
    pub fn step(&self) -> String {
        step_name(self.inner.step()).to_string()
    }

    /// Enter a step, redirecting back when drafts are missing
    ///
    /// @returns The step actually entered
    pub fn enter(&mut self, step: &str) -> Result<String, JsValue> {
        let entered = self.inner.enter(parse_step(step)?).map_err(js_error)?;
        Ok(step_name(entered).to_string())
    }

    /// Stored record JSON, if any
    #[wasm_bindgen(js_name = recordJson)]
    pub fn record_json(&self) -> Result<Option<String>, JsValue> {
        self.inner
            .record()
            .and_then(|record| record.map(|r| r.to_json()).transpose())
            .map_err(js_error)
    }

    /// Save the form and move on to signatures
    ///
    /// @param json - Record JSON with camelCase keys
    #[wasm_bindgen(js_name = submitRecord)]
    pub fn submit_record(&mut self, json: &str) -> Result<String, JsValue> {
        let record = ContractRecord::from_json(json).map_err(js_error)?;
        let step = self.inner.submit_record(&record).map_err(js_error)?;
        Ok(step_name(step).to_string())
    }

    /// Resize a party's pad; clears its strokes
    #[wasm_bindgen(js_name = resizePad)]
    pub fn resize_pad(&mut self, party: &str, width: u32, height: u32) -> Result<(), JsValue> {
        *self.pad_mut(parse_party(party)?) = SignaturePad::new(width, height);
        Ok(())
    }

    #[wasm_bindgen(js_name = beginStroke)]
    pub fn begin_stroke(&mut self, party: &str, x: f32, y: f32) -> Result<(), JsValue> {
        self.pad_mut(parse_party(party)?).begin_stroke(x, y);
        Ok(())
    }

    #[wasm_bindgen(js_name = extendStroke)]
    pub fn extend_stroke(&mut self, party: &str, x: f32, y: f32) -> Result<(), JsValue> {
        self.pad_mut(parse_party(party)?).extend_stroke(x, y);
        Ok(())
    }

    /// Clear a party's pad and forget its pending signature
    #[wasm_bindgen(js_name = clearSignature)]
    pub fn clear_signature(&mut self, party: &str) -> Result<(), JsValue> {
        let party = parse_party(party)?;
        self.pad_mut(party).clear();
        self.inner.clear_signature(party);
        Ok(())
    }

    /// Keep the pad drawing as the party's pending signature
    ///
    /// Fails with "Please draw a signature first." on a blank pad.
    #[wasm_bindgen(js_name = savePadSignature)]
    pub fn save_pad_signature(&mut self, party: &str) -> Result<(), JsValue> {
        let party = parse_party(party)?;
        let pad = match party {
            Party::Landlord => &self.landlord_pad,
            Party::Tenant => &self.tenant_pad,
        };
        self.inner.save_signature(party, pad).map_err(js_error)
    }

    /// Keep a canvas export as the party's pending signature
    ///
    /// @param dataUri - "data:image/png;base64,..."
    #[wasm_bindgen(js_name = saveSignatureDataUri)]
    pub fn save_signature_data_uri(&mut self, party: &str, data_uri: &str) -> Result<(), JsValue> {
        let party = parse_party(party)?;
        let signature = SignatureImage::for_party(party, data_uri).map_err(js_error)?;
        self.inner.set_signature(party, signature).map_err(js_error)
    }

    /// Pending signature of a party as a data URI
    #[wasm_bindgen(js_name = signatureDataUri)]
    pub fn signature_data_uri(&self, party: &str) -> Result<Option<String>, JsValue> {
        let party = parse_party(party)?;
        Ok(self
            .inner
            .pending_signatures()
            .get(party)
            .map(|s| s.data_uri().to_string()))
    }

    /// Persist both signatures and move to the final step
    pub fn finalize(&mut self) -> Result<String, JsValue> {
        let step = self.inner.finalize().map_err(js_error)?;
        Ok(step_name(step).to_string())
    }

    /// Assemble a draft with the pending signatures
    ///
    /// @param template - Template bytes from `fetchTemplate()`
    /// @returns PDF bytes (Uint8Array)
    #[wasm_bindgen(js_name = assembleDraft)]
    pub fn assemble_draft(&self, template: &[u8]) -> Result<Uint8Array, JsValue> {
        let document = self.inner.draft_document(template).map_err(js_error)?;
        Ok(Uint8Array::from(document.bytes()))
    }

    /// Assemble the signed agreement from stored drafts
    ///
    /// @param template - Template bytes from `fetchTemplate()`
    /// @returns PDF bytes (Uint8Array)
    #[wasm_bindgen(js_name = assembleSigned)]
    pub fn assemble_signed(&self, template: &[u8]) -> Result<Uint8Array, JsValue> {
        let document = self.inner.signed_document(template).map_err(js_error)?;
        Ok(Uint8Array::from(document.bytes()))
    }

    /// Download name of the draft
    #[wasm_bindgen(getter, js_name = draftFileName)]
    pub fn draft_file_name(&self) -> String {
        self.inner.config().draft_file_name.clone()
    }

    /// Download name of the signed agreement
    #[wasm_bindgen(getter, js_name = signedFileName)]
    pub fn signed_file_name(&self) -> String {
        self.inner.config().signed_file_name.clone()
    }
}
