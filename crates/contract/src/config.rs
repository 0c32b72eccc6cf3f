//! Assembly configuration

use crate::loader::TEMPLATE_PATH;
use crate::{ContractError, Result, RENTAL_AGREEMENT_LAYOUT};
use serde::{Deserialize, Serialize};

/// RGB text colour (components 0.0 - 1.0)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TextColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Default for TextColor {
    fn default() -> Self {
        Self {
            r: 0.0,
            g: 0.0,
            b: 0.0,
        }
    }
}

impl From<TextColor> for pdf_core::Color {
    fn from(c: TextColor) -> Self {
        pdf_core::Color::rgb(c.r, c.g, c.b)
    }
}

fn default_template_path() -> String {
    TEMPLATE_PATH.to_string()
}

fn default_draft_file_name() -> String {
    "rental_agreement.pdf".to_string()
}

fn default_signed_file_name() -> String {
    "rental_agreement_signed.pdf".to_string()
}

fn default_signature_scale() -> f64 {
    RENTAL_AGREEMENT_LAYOUT.signature_scale
}

/// Settings for loading the template and naming the output
///
/// Every field has a default, so `{}` is a complete configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyConfig {
    #[serde(default = "default_template_path")]
    pub template_path: String,

    #[serde(default = "default_draft_file_name")]
    pub draft_file_name: String,

    #[serde(default = "default_signed_file_name")]
    pub signed_file_name: String,

    /// Factor applied to signature pixel dimensions
    #[serde(default = "default_signature_scale")]
    pub signature_scale: f64,

    #[serde(default)]
    pub text_color: TextColor,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            template_path: default_template_path(),
            draft_file_name: default_draft_file_name(),
            signed_file_name: default_signed_file_name(),
            signature_scale: default_signature_scale(),
            text_color: TextColor::default(),
        }
    }
}

impl AssemblyConfig {
    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        if !(config.signature_scale.is_finite() && config.signature_scale > 0.0) {
            return Err(ContractError::Config(format!(
                "signatureScale must be positive, got {}",
                config.signature_scale
            )));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(AssemblyConfig::from_json("{}").unwrap(), AssemblyConfig::default());
    }

    #[test]
    fn test_defaults() {
        let config = AssemblyConfig::default();
        assert_eq!(config.template_path, "/edoc/rentalRoomAgreement.pdf");
        assert_eq!(config.draft_file_name, "rental_agreement.pdf");
        assert_eq!(config.signed_file_name, "rental_agreement_signed.pdf");
        assert_eq!(config.signature_scale, 0.3);
    }

    #[test]
    fn test_partial_override() {
        let config = AssemblyConfig::from_json(
            r#"{"templatePath": "/edoc/v2.pdf", "textColor": {"r": 0.0, "g": 0.0, "b": 0.5}}"#,
        )
        .unwrap();
        assert_eq!(config.template_path, "/edoc/v2.pdf");
        assert_eq!(config.text_color.b, 0.5);
        assert_eq!(config.draft_file_name, "rental_agreement.pdf");
    }

    #[test]
    fn test_rejects_non_positive_scale() {
        assert!(AssemblyConfig::from_json(r#"{"signatureScale": 0}"#).is_err());
    }
}
