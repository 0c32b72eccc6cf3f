//! Document assembly
//!
//! Overlays a contract record and up to two signatures onto page 1 of a
//! pristine template. Every call parses the template afresh and works on its
//! own copy, so a failure leaves nothing behind.

use crate::layout::{FieldLayout, FieldPlacement, RENTAL_AGREEMENT_LAYOUT};
use crate::signature::SignatureImage;
use crate::wrap::wrap_text;
use crate::{AssemblyConfig, ContractError, ContractRecord, Party, Result, ValidationError};
use pdf_core::{scaled_dimensions, ImageXObject, PdfDocument, PdfError, StandardFont};

/// Media type of assembled documents
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// The page every field is drawn on
const DRAWING_PAGE: usize = 1;

/// Which flavour of the agreement was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Preview while signatures are still being collected
    Draft,
    /// Final agreement carrying both signatures
    Signed,
}

/// Signatures to draw, by party
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signatures {
    pub landlord: Option<SignatureImage>,
    pub tenant: Option<SignatureImage>,
}

impl Signatures {
    pub fn new(landlord: Option<SignatureImage>, tenant: Option<SignatureImage>) -> Self {
        Self { landlord, tenant }
    }

    /// Parse optional data URIs, naming the party whose image is bad
    pub fn from_data_uris(landlord: Option<&str>, tenant: Option<&str>) -> Result<Self> {
        let parse = |party: Party, uri: Option<&str>| {
            uri.filter(|u| !u.is_empty())
                .map(|u| SignatureImage::for_party(party, u))
                .transpose()
        };

        Ok(Self {
            landlord: parse(Party::Landlord, landlord)?,
            tenant: parse(Party::Tenant, tenant)?,
        })
    }

    pub fn get(&self, party: Party) -> Option<&SignatureImage> {
        match party {
            Party::Landlord => self.landlord.as_ref(),
            Party::Tenant => self.tenant.as_ref(),
        }
    }

    pub fn set(&mut self, party: Party, signature: Option<SignatureImage>) {
        match party {
            Party::Landlord => self.landlord = signature,
            Party::Tenant => self.tenant = signature,
        }
    }

    /// Parties without a signature, in signing order
    pub fn missing(&self) -> Vec<Party> {
        Party::ALL
            .into_iter()
            .filter(|party| self.get(*party).is_none())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }
}

/// Bytes of a freshly assembled agreement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledDocument {
    bytes: Vec<u8>,
    stage: Stage,
    file_name: String,
}

impl AssembledDocument {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Download name for this stage
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn media_type(&self) -> &'static str {
        PDF_MEDIA_TYPE
    }
}

/// Assemble with the default configuration
///
/// The result is a signed document when both signatures are supplied and a
/// draft otherwise.
pub fn assemble(
    template: &[u8],
    record: &ContractRecord,
    signatures: &Signatures,
) -> Result<AssembledDocument> {
    let stage = if signatures.is_complete() {
        Stage::Signed
    } else {
        Stage::Draft
    };
    assemble_with_config(template, record, signatures, stage, &AssemblyConfig::default())
}

/// Assemble a document for an explicit stage
///
/// A signed stage requires both signatures.
pub fn assemble_with_config(
    template: &[u8],
    record: &ContractRecord,
    signatures: &Signatures,
    stage: Stage,
    config: &AssemblyConfig,
) -> Result<AssembledDocument> {
    if stage == Stage::Signed && !signatures.is_complete() {
        return Err(ValidationError::MissingSignatures(signatures.missing()).into());
    }

    let layout = &RENTAL_AGREEMENT_LAYOUT;

    let mut doc = PdfDocument::open_from_bytes(template)
        .map_err(|e| ContractError::TemplateParse(e.to_string()))?;
    if doc.page_count() == 0 {
        return Err(ContractError::TemplateParse(
            "template has no pages".to_string(),
        ));
    }

    // Decode up front so a bad image fails before anything is drawn
    let images = decode_signatures(signatures)?;

    doc.set_font(StandardFont::Helvetica, 8.0);
    doc.set_text_color(config.text_color.into());

    let page_size = doc.page_size(DRAWING_PAGE)?;
    let mut runs = 0;
    for placement in layout.fields {
        runs += draw_field(&mut doc, placement, record.get(placement.key), page_size)?;
    }

    let mut drawn_signatures = 0;
    for (party, image) in &images {
        draw_signature(&mut doc, layout, *party, image, config.signature_scale)?;
        drawn_signatures += 1;
    }

    let bytes = doc.to_bytes()?;
    let file_name = match stage {
        Stage::Draft => config.draft_file_name.clone(),
        Stage::Signed => config.signed_file_name.clone(),
    };

    log::info!(
        "Assembled {} ({}): {} text runs, {} signatures, {} bytes",
        file_name,
        layout.version,
        runs,
        drawn_signatures,
        bytes.len()
    );

    Ok(AssembledDocument {
        bytes,
        stage,
        file_name,
    })
}

fn decode_signatures(signatures: &Signatures) -> Result<Vec<(Party, ImageXObject)>> {
    Party::ALL
        .into_iter()
        .filter_map(|party| signatures.get(party).map(|sig| (party, sig)))
        .map(|(party, sig)| {
            ImageXObject::from_bytes(sig.bytes())
                .map(|image| (party, image))
                .map_err(|e| ContractError::ImageDecode {
                    party,
                    reason: e.to_string(),
                })
        })
        .collect()
}

/// Single-line fields cannot carry line breaks
fn single_line(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect()
}

/// Draw one field and return the number of text runs
fn draw_field(
    doc: &mut PdfDocument,
    placement: &FieldPlacement,
    value: &str,
    (page_width, page_height): (f64, f64),
) -> Result<usize> {
    if value.is_empty() {
        return Ok(0);
    }

    if placement.x > page_width || placement.y > page_height {
        log::warn!(
            "Field {} at ({}, {}) lies outside the {}x{} page",
            placement.key,
            placement.x,
            placement.y,
            page_width,
            page_height
        );
    }

    let (lines, line_height) = match &placement.wrap {
        Some(spec) => (wrap_text(value, spec), spec.line_height),
        None => (vec![single_line(value)], 0.0),
    };

    doc.set_font_size(placement.size)?;
    for (i, line) in lines.iter().enumerate() {
        let y = placement.y - line_height * i as f64;
        log::debug!("Drawing {} line {} at ({}, {})", placement.key, i + 1, placement.x, y);

        doc.insert_text(line, DRAWING_PAGE, placement.x, y)
            .map_err(|e| match e {
                PdfError::UnsupportedCharacter(character) => ContractError::TextEncoding {
                    field: placement.key,
                    character,
                },
                other => other.into(),
            })?;
    }

    Ok(lines.len())
}

fn draw_signature(
    doc: &mut PdfDocument,
    layout: &FieldLayout,
    party: Party,
    image: &ImageXObject,
    scale: f64,
) -> Result<()> {
    let Some(anchor) = layout.signature(party) else {
        log::warn!("Layout {} has no anchor for the {} signature", layout.version, party);
        return Ok(());
    };

    let (width, height) = scaled_dimensions(image.width, image.height, scale);
    log::debug!(
        "Drawing {} signature at ({}, {}) size {}x{}",
        party,
        anchor.x,
        anchor.y,
        width,
        height
    );
    doc.insert_image(image, DRAWING_PAGE, anchor.x, anchor.y, width, height)?;
    Ok(())
}
