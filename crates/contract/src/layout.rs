//! Field layout of the rental agreement template
//!
//! Coordinates are PDF points on page 1, origin at the bottom-left corner.

use crate::Party;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical name of a contract field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKey {
    PropertyAddress,
    LandlordName,
    TenantName,
    ContractStartDate,
    ContractEndDate,
    DepositAmount,
    MonthlyRent,
    SpecialConditions,
}

impl FieldKey {
    /// All fields in record order
    pub const ALL: [FieldKey; 8] = [
        FieldKey::PropertyAddress,
        FieldKey::LandlordName,
        FieldKey::TenantName,
        FieldKey::ContractStartDate,
        FieldKey::ContractEndDate,
        FieldKey::DepositAmount,
        FieldKey::MonthlyRent,
        FieldKey::SpecialConditions,
    ];

    /// JSON key of the field in the draft record
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKey::PropertyAddress => "propertyAddress",
            FieldKey::LandlordName => "landlordName",
            FieldKey::TenantName => "tenantName",
            FieldKey::ContractStartDate => "contractStartDate",
            FieldKey::ContractEndDate => "contractEndDate",
            FieldKey::DepositAmount => "depositAmount",
            FieldKey::MonthlyRent => "monthlyRent",
            FieldKey::SpecialConditions => "specialConditions",
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Word-wrap parameters for a multi-line field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WrapSpec {
    /// Maximum line width in points
    pub max_width: f32,
    /// Lines beyond this count are dropped
    pub max_lines: usize,
    /// Font size used to measure candidate lines
    pub measure_size: f32,
    /// Distance between baselines in points
    pub line_height: f64,
}

/// Where and how one field is drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldPlacement {
    pub key: FieldKey,
    pub x: f64,
    pub y: f64,
    pub size: f32,
    pub wrap: Option<WrapSpec>,
}

impl FieldPlacement {
    const fn line(key: FieldKey, x: f64, y: f64) -> Self {
        Self {
            key,
            x,
            y,
            size: 8.0,
            wrap: None,
        }
    }
}

/// Lower-left corner of a signature image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignatureAnchor {
    pub party: Party,
    pub x: f64,
    pub y: f64,
}

/// A versioned set of placements for one template
#[derive(Debug, Clone, Copy)]
pub struct FieldLayout {
    pub version: &'static str,
    pub fields: &'static [FieldPlacement],
    pub signatures: &'static [SignatureAnchor],
    /// Uniform factor applied to signature pixel dimensions
    pub signature_scale: f64,
}

impl FieldLayout {
    /// Placement of a field, if the layout draws it
    pub fn field(&self, key: FieldKey) -> Option<&FieldPlacement> {
        self.fields.iter().find(|p| p.key == key)
    }

    /// Anchor of a party's signature
    pub fn signature(&self, party: Party) -> Option<&SignatureAnchor> {
        self.signatures.iter().find(|a| a.party == party)
    }
}

const RENTAL_AGREEMENT_FIELDS: [FieldPlacement; 8] = [
    FieldPlacement::line(FieldKey::LandlordName, 164.0, 655.0),
    FieldPlacement::line(FieldKey::TenantName, 165.0, 630.0),
    FieldPlacement::line(FieldKey::PropertyAddress, 409.0, 582.0),
    FieldPlacement::line(FieldKey::ContractStartDate, 319.0, 510.0),
    FieldPlacement::line(FieldKey::ContractEndDate, 235.0, 498.0),
    FieldPlacement::line(FieldKey::MonthlyRent, 297.0, 441.0),
    FieldPlacement::line(FieldKey::DepositAmount, 206.0, 361.0),
    FieldPlacement {
        key: FieldKey::SpecialConditions,
        x: 175.0,
        y: 261.0,
        size: 8.0,
        wrap: Some(WrapSpec {
            max_width: 400.0,
            max_lines: 4,
            measure_size: 10.0,
            line_height: 14.0,
        }),
    },
];

const RENTAL_AGREEMENT_SIGNATURES: [SignatureAnchor; 2] = [
    SignatureAnchor {
        party: Party::Landlord,
        x: 165.0,
        y: 162.0,
    },
    SignatureAnchor {
        party: Party::Tenant,
        x: 310.0,
        y: 162.0,
    },
];

/// Layout of `rentalRoomAgreement.pdf`
pub const RENTAL_AGREEMENT_LAYOUT: FieldLayout = FieldLayout {
    version: "rental-room-agreement/v1",
    fields: &RENTAL_AGREEMENT_FIELDS,
    signatures: &RENTAL_AGREEMENT_SIGNATURES,
    signature_scale: 0.3,
};

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_every_field_is_placed_once() {
        for key in FieldKey::ALL {
            let count = RENTAL_AGREEMENT_LAYOUT
                .fields
                .iter()
                .filter(|p| p.key == key)
                .count();
            assert_eq!(count, 1, "{key}");
        }
    }

    #[test]
    fn test_only_special_conditions_wraps() {
        let wrapped: Vec<FieldKey> = RENTAL_AGREEMENT_LAYOUT
            .fields
            .iter()
            .filter(|p| p.wrap.is_some())
            .map(|p| p.key)
            .collect();
        assert_eq!(wrapped, vec![FieldKey::SpecialConditions]);

        let wrap = RENTAL_AGREEMENT_LAYOUT
            .field(FieldKey::SpecialConditions)
            .and_then(|p| p.wrap)
            .unwrap();
        assert_eq!(wrap.max_lines, 4);
        assert_eq!(wrap.max_width, 400.0);
    }

    #[test]
    fn test_signature_anchors() {
        let landlord = RENTAL_AGREEMENT_LAYOUT.signature(Party::Landlord).unwrap();
        let tenant = RENTAL_AGREEMENT_LAYOUT.signature(Party::Tenant).unwrap();
        assert_eq!((landlord.x, landlord.y), (165.0, 162.0));
        assert_eq!((tenant.x, tenant.y), (310.0, 162.0));
    }

    #[test]
    fn test_field_key_names() {
        assert_eq!(FieldKey::ContractStartDate.to_string(), "contractStartDate");
        assert_eq!(
            serde_json::to_string(&FieldKey::MonthlyRent).unwrap(),
            "\"monthlyRent\""
        );
    }
}
