//! Template loading

use crate::{ContractError, Result};
use std::path::PathBuf;

/// Location of the rental agreement template under the static asset root
pub const TEMPLATE_PATH: &str = "/edoc/rentalRoomAgreement.pdf";

/// Source of pristine template bytes
///
/// Failures are reported as [`ContractError::TemplateFetch`] and are not
/// retried.
pub trait TemplateLoader {
    fn load(&self, path: &str) -> Result<Vec<u8>>;
}

/// Loads templates from a directory that mirrors the static asset root
#[derive(Debug, Clone)]
pub struct FileTemplateLoader {
    root: PathBuf,
}

impl FileTemplateLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl TemplateLoader for FileTemplateLoader {
    fn load(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.root.join(path.trim_start_matches('/'));
        log::debug!("Loading template from {}", full_path.display());

        std::fs::read(&full_path).map_err(|e| {
            ContractError::TemplateFetch(format!("{}: {}", full_path.display(), e))
        })
    }
}

/// Serves one template held in memory
#[derive(Debug, Clone)]
pub struct StaticTemplateLoader {
    path: String,
    bytes: Vec<u8>,
}

impl StaticTemplateLoader {
    pub fn new(path: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            bytes,
        }
    }
}

impl TemplateLoader for StaticTemplateLoader {
    fn load(&self, path: &str) -> Result<Vec<u8>> {
        if path == self.path {
            Ok(self.bytes.clone())
        } else {
            Err(ContractError::TemplateFetch(format!("{path}: not found")))
        }
    }
}
