//! Draft persistence between wizard steps

use crate::{Party, Result};
use std::collections::BTreeMap;

/// Key of the contract record JSON
pub const RENTAL_DATA_KEY: &str = "rentalData";
/// Key of the landlord signature data URI
pub const LANDLORD_SIGNATURE_KEY: &str = "landlordSignature";
/// Key of the tenant signature data URI
pub const TENANT_SIGNATURE_KEY: &str = "tenantSignature";

/// Every key the wizard writes
pub const DRAFT_KEYS: [&str; 3] = [RENTAL_DATA_KEY, LANDLORD_SIGNATURE_KEY, TENANT_SIGNATURE_KEY];

/// Store key of a party's signature
pub fn signature_key(party: Party) -> &'static str {
    match party {
        Party::Landlord => LANDLORD_SIGNATURE_KEY,
        Party::Tenant => TENANT_SIGNATURE_KEY,
    }
}

/// String key-value storage for drafts
///
/// Implemented over browser `localStorage` in the wasm crate and over a map
/// for native use and tests.
pub trait DraftStore {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    fn remove(&mut self, key: &str) -> Result<()>;

    /// Remove every draft key
    fn clear_drafts(&mut self) -> Result<()> {
        for key in DRAFT_KEYS {
            self.remove(key)?;
        }
        Ok(())
    }
}

/// In-memory draft store
#[derive(Debug, Clone, Default)]
pub struct MemoryDraftStore {
    entries: BTreeMap<String, String>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DraftStore for MemoryDraftStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}
