//! Three-step agreement wizard
//!
//! Data entry, signature capture, then the signed document. Progress is kept
//! in a [`DraftStore`]; signatures stay pending in memory until they are
//! finalized together.

use crate::compositor::{assemble_with_config, AssembledDocument, Signatures, Stage};
use crate::signature::{SignatureImage, SignaturePad};
use crate::store::{signature_key, DraftStore, RENTAL_DATA_KEY};
use crate::{AssemblyConfig, ContractRecord, Party, Result, TemplateLoader, ValidationError};

/// Wizard steps in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WizardStep {
    DataEntry,
    Signatures,
    Finalize,
}

/// Drives one agreement from data entry to the signed document
pub struct Wizard<S: DraftStore> {
    store: S,
    step: WizardStep,
    pending: Signatures,
    config: AssemblyConfig,
}

impl<S: DraftStore> Wizard<S> {
    /// Begin a fresh agreement, discarding any stored drafts
    pub fn start(mut store: S) -> Result<Self> {
        store.clear_drafts()?;
        log::info!("Started a new agreement");

        Ok(Self {
            store,
            step: WizardStep::DataEntry,
            pending: Signatures::default(),
            config: AssemblyConfig::default(),
        })
    }

    /// Continue from stored drafts
    ///
    /// Stored signatures become pending again; the wizard lands on the
    /// furthest step the drafts allow.
    pub fn resume(store: S) -> Result<Self> {
        let mut wizard = Self {
            store,
            step: WizardStep::DataEntry,
            pending: Signatures::default(),
            config: AssemblyConfig::default(),
        };

        for party in Party::ALL {
            match wizard.stored_signature(party) {
                Ok(signature) => wizard.pending.set(party, signature),
                Err(e) => log::warn!("Ignoring stored {} signature: {}", party, e),
            }
        }

        wizard.enter(WizardStep::Finalize)?;
        Ok(wizard)
    }

    /// Replace the assembly configuration
    pub fn with_config(mut self, config: AssemblyConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &AssemblyConfig {
        &self.config
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// The stored record, if one was submitted
    pub fn record(&self) -> Result<Option<ContractRecord>> {
        self.store
            .get(RENTAL_DATA_KEY)?
            .map(|json| ContractRecord::from_json(&json))
            .transpose()
    }

    fn required_record(&self) -> Result<ContractRecord> {
        match self.record()? {
            Some(record) if !record.is_empty() => Ok(record),
            _ => Err(ValidationError::MissingRecord.into()),
        }
    }

    fn stored_signature(&self, party: Party) -> Result<Option<SignatureImage>> {
        self.store
            .get(signature_key(party))?
            .filter(|uri| !uri.is_empty())
            .map(|uri| SignatureImage::for_party(party, uri))
            .transpose()
    }

    fn stored_signatures(&self) -> Result<Signatures> {
        Ok(Signatures::new(
            self.stored_signature(Party::Landlord)?,
            self.stored_signature(Party::Tenant)?,
        ))
    }

    /// Save the record and move on to signatures
    pub fn submit_record(&mut self, record: &ContractRecord) -> Result<WizardStep> {
        if record.is_empty() {
            return Err(ValidationError::EmptyRecord.into());
        }

        self.store.set(RENTAL_DATA_KEY, &record.to_json()?)?;
        self.step = WizardStep::Signatures;
        Ok(self.step)
    }

    /// Capture a party's signature from a pad
    ///
    /// The signature stays pending until [`finalize`](Self::finalize).
    pub fn save_signature(&mut self, party: Party, pad: &SignaturePad) -> Result<()> {
        let signature = pad.to_signature(party)?;
        self.set_signature(party, signature)
    }

    /// Set a party's pending signature from an already captured image
    ///
    /// A fully transparent image is rejected as a blank capture.
    pub fn set_signature(&mut self, party: Party, signature: SignatureImage) -> Result<()> {
        if signature.is_blank() {
            return Err(ValidationError::BlankSignature(party).into());
        }
        log::debug!("Saved pending {} signature", party);
        self.pending.set(party, Some(signature));
        Ok(())
    }

    pub fn clear_signature(&mut self, party: Party) {
        self.pending.set(party, None);
    }

    pub fn pending_signatures(&self) -> &Signatures {
        &self.pending
    }

    /// Persist both pending signatures and move to the final step
    pub fn finalize(&mut self) -> Result<WizardStep> {
        let missing = self.pending.missing();
        if !missing.is_empty() {
            return Err(ValidationError::MissingSignatures(missing).into());
        }
        self.required_record()?;

        for party in Party::ALL {
            if let Some(signature) = self.pending.get(party) {
                self.store.set(signature_key(party), signature.data_uri())?;
            }
        }

        self.step = WizardStep::Finalize;
        log::info!("Signatures finalized");
        Ok(self.step)
    }

    /// Furthest step the stored drafts allow
    pub fn reachable(&self) -> Result<WizardStep> {
        if self.required_record().is_err() {
            return Ok(WizardStep::DataEntry);
        }
        let signed = Party::ALL
            .into_iter()
            .all(|party| matches!(self.stored_signature(party), Ok(Some(_))));
        if !signed {
            return Ok(WizardStep::Signatures);
        }
        Ok(WizardStep::Finalize)
    }

    /// Enter a step, redirecting back when its preconditions are not met
    ///
    /// Returns the step actually entered.
    pub fn enter(&mut self, requested: WizardStep) -> Result<WizardStep> {
        let reachable = self.reachable()?;
        let entered = requested.min(reachable);
        if entered != requested {
            log::warn!("Cannot enter {:?}, redirecting to {:?}", requested, entered);
        }

        self.step = entered;
        Ok(entered)
    }

    /// Assemble a preview with whatever signatures are pending
    pub fn draft_document(&self, template: &[u8]) -> Result<AssembledDocument> {
        let record = self.required_record()?;
        assemble_with_config(template, &record, &self.pending, Stage::Draft, &self.config)
    }

    /// Assemble the final agreement from the stored drafts
    pub fn signed_document(&self, template: &[u8]) -> Result<AssembledDocument> {
        if self.step != WizardStep::Finalize {
            return Err(ValidationError::NotFinalized.into());
        }

        let record = self.required_record()?;
        let signatures = self.stored_signatures()?;
        assemble_with_config(template, &record, &signatures, Stage::Signed, &self.config)
    }

    /// Load the configured template and assemble the document for the current step
    pub fn document_from(&self, loader: &dyn TemplateLoader) -> Result<AssembledDocument> {
        let template = loader.load(&self.config.template_path)?;
        match self.step {
            WizardStep::Finalize => self.signed_document(&template),
            _ => self.draft_document(&template),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ContractError, FieldKey, MemoryDraftStore, LANDLORD_SIGNATURE_KEY};
    use pretty_assertions::assert_eq;

    fn record() -> ContractRecord {
        ContractRecord::new().with(FieldKey::TenantName, "Jane Doe")
    }

    fn pad() -> SignaturePad {
        let mut pad = SignaturePad::new(60, 20);
        pad.begin_stroke(5.0, 10.0);
        pad.extend_stroke(55.0, 10.0);
        pad
    }

    fn validation(result: Result<WizardStep>) -> ValidationError {
        match result {
            Err(ContractError::Validation(e)) => e,
            other => panic!("Expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_start_clears_drafts() {
        let mut store = MemoryDraftStore::new();
        store.set(RENTAL_DATA_KEY, "{}").unwrap();
        store.set(LANDLORD_SIGNATURE_KEY, "data:").unwrap();

        let wizard = Wizard::start(store).unwrap();
        assert_eq!(wizard.step(), WizardStep::DataEntry);
        assert!(wizard.store().is_empty());
    }

    #[test]
    fn test_empty_record_is_rejected() {
        let mut wizard = Wizard::start(MemoryDraftStore::new()).unwrap();
        let err = validation(wizard.submit_record(&ContractRecord::new()));
        assert_eq!(err, ValidationError::EmptyRecord);
        assert_eq!(wizard.step(), WizardStep::DataEntry);
    }

    #[test]
    fn test_submit_record_persists_json() {
        let mut wizard = Wizard::start(MemoryDraftStore::new()).unwrap();
        assert_eq!(wizard.submit_record(&record()).unwrap(), WizardStep::Signatures);
        assert_eq!(wizard.record().unwrap(), Some(record()));
    }

    #[test]
    fn test_blank_pad_is_rejected() {
        let mut wizard = Wizard::start(MemoryDraftStore::new()).unwrap();
        let result = wizard.save_signature(Party::Landlord, &SignaturePad::new(60, 20));
        assert!(matches!(
            result,
            Err(ContractError::Validation(ValidationError::BlankSignature(Party::Landlord)))
        ));
    }

    #[test]
    fn test_blank_canvas_export_is_rejected() {
        let mut png = Vec::new();
        image::DynamicImage::ImageRgba8(image::RgbaImage::new(500, 200))
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        let blank = SignatureImage::from_png_bytes(&png).unwrap();

        let mut wizard = Wizard::start(MemoryDraftStore::new()).unwrap();
        wizard.submit_record(&record()).unwrap();
        for party in Party::ALL {
            let result = wizard.set_signature(party, blank.clone());
            assert!(matches!(
                result,
                Err(ContractError::Validation(ValidationError::BlankSignature(p))) if p == party
            ));
        }

        assert!(wizard.pending_signatures().get(Party::Landlord).is_none());
        let err = validation(wizard.finalize());
        assert_eq!(err, ValidationError::MissingSignatures(vec![Party::Landlord, Party::Tenant]));
    }

    #[test]
    fn test_finalize_names_missing_parties() {
        let mut wizard = Wizard::start(MemoryDraftStore::new()).unwrap();
        wizard.submit_record(&record()).unwrap();

        let err = validation(wizard.finalize());
        assert_eq!(err.to_string(), "Please save Landlord and Tenant signature(s) first.");

        wizard.save_signature(Party::Landlord, &pad()).unwrap();
        let err = validation(wizard.finalize());
        assert_eq!(err.to_string(), "Please save Tenant signature(s) first.");
        assert_eq!(wizard.step(), WizardStep::Signatures);
    }

    #[test]
    fn test_cleared_signature_is_missing_again() {
        let mut wizard = Wizard::start(MemoryDraftStore::new()).unwrap();
        wizard.submit_record(&record()).unwrap();
        wizard.save_signature(Party::Landlord, &pad()).unwrap();
        wizard.save_signature(Party::Tenant, &pad()).unwrap();
        wizard.clear_signature(Party::Landlord);

        let err = validation(wizard.finalize());
        assert_eq!(err, ValidationError::MissingSignatures(vec![Party::Landlord]));
    }

    #[test]
    fn test_finalize_persists_signatures() {
        let mut wizard = Wizard::start(MemoryDraftStore::new()).unwrap();
        wizard.submit_record(&record()).unwrap();
        wizard.save_signature(Party::Landlord, &pad()).unwrap();
        wizard.save_signature(Party::Tenant, &pad()).unwrap();

        // Nothing is stored before finalizing
        assert_eq!(wizard.store().get(LANDLORD_SIGNATURE_KEY).unwrap(), None);

        assert_eq!(wizard.finalize().unwrap(), WizardStep::Finalize);
        let stored = wizard.store().get(LANDLORD_SIGNATURE_KEY).unwrap().unwrap();
        assert!(stored.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_enter_redirects() {
        let mut wizard = Wizard::start(MemoryDraftStore::new()).unwrap();
        assert_eq!(wizard.enter(WizardStep::Signatures).unwrap(), WizardStep::DataEntry);
        assert_eq!(wizard.enter(WizardStep::Finalize).unwrap(), WizardStep::DataEntry);

        wizard.submit_record(&record()).unwrap();
        assert_eq!(wizard.enter(WizardStep::Finalize).unwrap(), WizardStep::Signatures);
        assert_eq!(wizard.enter(WizardStep::DataEntry).unwrap(), WizardStep::DataEntry);
    }

    #[test]
    fn test_resume_lands_on_furthest_step() {
        let mut wizard = Wizard::start(MemoryDraftStore::new()).unwrap();
        wizard.submit_record(&record()).unwrap();
        wizard.save_signature(Party::Landlord, &pad()).unwrap();
        wizard.save_signature(Party::Tenant, &pad()).unwrap();
        wizard.finalize().unwrap();

        let resumed = Wizard::resume(wizard.into_store()).unwrap();
        assert_eq!(resumed.step(), WizardStep::Finalize);
        assert!(resumed.pending_signatures().is_complete());
    }

    #[test]
    fn test_resume_ignores_corrupt_signature() {
        let mut store = MemoryDraftStore::new();
        store.set(RENTAL_DATA_KEY, &record().to_json().unwrap()).unwrap();
        store.set(LANDLORD_SIGNATURE_KEY, "data:image/png;base64,AAAA").unwrap();

        let wizard = Wizard::resume(store).unwrap();
        assert_eq!(wizard.step(), WizardStep::Signatures);
        assert_eq!(wizard.pending_signatures().landlord, None);
    }

    #[test]
    fn test_signed_document_requires_finalize() {
        let mut wizard = Wizard::start(MemoryDraftStore::new()).unwrap();
        wizard.submit_record(&record()).unwrap();
        assert!(matches!(
            wizard.signed_document(b"%PDF"),
            Err(ContractError::Validation(ValidationError::NotFinalized))
        ));
    }

    #[test]
    fn test_draft_document_requires_record() {
        let wizard = Wizard::start(MemoryDraftStore::new()).unwrap();
        assert!(matches!(
            wizard.draft_document(b"%PDF"),
            Err(ContractError::Validation(ValidationError::MissingRecord))
        ));
    }
}
