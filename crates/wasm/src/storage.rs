//! Draft store over browser `localStorage`

use contract::{ContractError, DraftStore};
use wasm_bindgen::JsValue;
use web_sys::Storage;

fn store_error(e: JsValue) -> ContractError {
    ContractError::Store(e.as_string().unwrap_or_else(|| format!("{e:?}")))
}

/// Drafts kept in the window's `localStorage`
pub struct LocalStorageDraftStore {
    storage: Storage,
}

impl LocalStorageDraftStore {
    pub fn new() -> contract::Result<Self> {
        let window = web_sys::window()
            .ok_or_else(|| ContractError::Store("No window available".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(store_error)?
            .ok_or_else(|| ContractError::Store("No localStorage".to_string()))?;
        Ok(Self { storage })
    }
}

impl DraftStore for LocalStorageDraftStore {
    fn get(&self, key: &str) -> contract::Result<Option<String>> {
        self.storage.get_item(key).map_err(store_error)
    }

    fn set(&mut self, key: &str, value: &str) -> contract::Result<()> {
        self.storage.set_item(key, value).map_err(store_error)
    }

    fn remove(&mut self, key: &str) -> contract::Result<()> {
        self.storage.remove_item(key).map_err(store_error)
    }
}
