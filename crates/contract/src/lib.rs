//! Contract - Rental agreement assembly
//!
//! This crate provides:
//! - The contract record and its JSON draft form
//! - The fixed field layout of the rental agreement template
//! - Word wrapping against Helvetica metrics
//! - Document assembly (text fields and signatures onto page 1)
//! - Signature capture and decoding
//! - The three-step wizard over an injected draft store
//!
//! # Example
//!
//! ```ignore
//! use contract::{assemble, ContractRecord, Signatures, FileTemplateLoader, TemplateLoader};
//!
//! let template = FileTemplateLoader::new("public").load("/edoc/rentalRoomAgreement.pdf")?;
//! let record = ContractRecord::from_json(r#"{"tenantName":"Jane Doe"}"#)?;
//! let draft = assemble(&template, &record, &Signatures::default())?;
//! std::fs::write(draft.file_name(), draft.bytes())?;
//! ```

pub mod compositor;
mod config;
pub mod dates;
mod layout;
mod loader;
mod preview;
mod record;
mod signature;
mod store;
mod wizard;
mod wrap;

pub use compositor::{
    assemble, assemble_with_config, AssembledDocument, Signatures, Stage, PDF_MEDIA_TYPE,
};
pub use config::{AssemblyConfig, TextColor};
pub use layout::{
    FieldKey, FieldLayout, FieldPlacement, SignatureAnchor, WrapSpec, RENTAL_AGREEMENT_LAYOUT,
};
pub use loader::{FileTemplateLoader, StaticTemplateLoader, TemplateLoader, TEMPLATE_PATH};
pub use preview::PreviewTracker;
pub use record::ContractRecord;
pub use signature::{SignatureImage, SignaturePad};
pub use store::{
    signature_key, DraftStore, MemoryDraftStore, DRAFT_KEYS, LANDLORD_SIGNATURE_KEY,
    RENTAL_DATA_KEY, TENANT_SIGNATURE_KEY,
};
pub use wizard::{Wizard, WizardStep};
pub use wrap::wrap_text;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A signing party
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Party {
    Landlord,
    Tenant,
}

impl Party {
    /// Both parties, in signing order
    pub const ALL: [Party; 2] = [Party::Landlord, Party::Tenant];

    /// Human-readable name used in messages
    pub fn label(&self) -> &'static str {
        match self {
            Party::Landlord => "Landlord",
            Party::Tenant => "Tenant",
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Preconditions that block the wizard from moving on
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please draw a signature first.")]
    BlankSignature(Party),

    #[error("Please fill in at least one contract field first.")]
    EmptyRecord,

    #[error("No contract data found. Please fill in the contract form first.")]
    MissingRecord,

    #[error("Please save {} signature(s) first.", join_parties(.0))]
    MissingSignatures(Vec<Party>),

    #[error("Signatures have not been finalized yet.")]
    NotFinalized,

    #[error("Invalid date: {0:?} (expected YYYY-MM-DD)")]
    InvalidDate(String),
}

fn join_parties(parties: &[Party]) -> String {
    parties
        .iter()
        .map(Party::label)
        .collect::<Vec<_>>()
        .join(" and ")
}

/// Errors that can occur while preparing or assembling a contract
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("Failed to fetch template: {0}")]
    TemplateFetch(String),

    #[error("Failed to parse template: {0}")]
    TemplateParse(String),

    #[error("Failed to decode {party} signature: {reason}")]
    ImageDecode { party: Party, reason: String },

    #[error("Invalid signature image: {0}")]
    InvalidSignature(String),

    #[error("Field {field} contains {character:?}, which the standard font cannot encode")]
    TextEncoding { field: FieldKey, character: char },

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Draft store error: {0}")]
    Store(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("PDF error: {0}")]
    Pdf(#[from] pdf_core::PdfError),
}

/// Result type for contract operations
pub type Result<T> = std::result::Result<T, ContractError>;
