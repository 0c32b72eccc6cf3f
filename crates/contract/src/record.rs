//! Contract record

use crate::dates::{start_plus, today_plus};
use crate::{FieldKey, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The fields of one rental agreement
///
/// Every field is free text and defaults to empty. Dates are ISO `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContractRecord {
    pub property_address: String,
    pub landlord_name: String,
    pub tenant_name: String,
    pub contract_start_date: String,
    pub contract_end_date: String,
    pub deposit_amount: String,
    pub monthly_rent: String,
    pub special_conditions: String,
}

impl ContractRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a record from its draft JSON
    ///
    /// Missing keys become empty strings.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the record to draft JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Check whether every field is empty
    pub fn is_empty(&self) -> bool {
        FieldKey::ALL.iter().all(|key| self.get(*key).is_empty())
    }

    /// Value of a field
    pub fn get(&self, key: FieldKey) -> &str {
        match key {
            FieldKey::PropertyAddress => &self.property_address,
            FieldKey::LandlordName => &self.landlord_name,
            FieldKey::TenantName => &self.tenant_name,
            FieldKey::ContractStartDate => &self.contract_start_date,
            FieldKey::ContractEndDate => &self.contract_end_date,
            FieldKey::DepositAmount => &self.deposit_amount,
            FieldKey::MonthlyRent => &self.monthly_rent,
            FieldKey::SpecialConditions => &self.special_conditions,
        }
    }

    /// Replace the value of a field
    pub fn set(&mut self, key: FieldKey, value: impl Into<String>) {
        let slot = match key {
            FieldKey::PropertyAddress => &mut self.property_address,
            FieldKey::LandlordName => &mut self.landlord_name,
            FieldKey::TenantName => &mut self.tenant_name,
            FieldKey::ContractStartDate => &mut self.contract_start_date,
            FieldKey::ContractEndDate => &mut self.contract_end_date,
            FieldKey::DepositAmount => &mut self.deposit_amount,
            FieldKey::MonthlyRent => &mut self.monthly_rent,
            FieldKey::SpecialConditions => &mut self.special_conditions,
        };
        *slot = value.into();
    }

    /// Builder-style setter
    pub fn with(mut self, key: FieldKey, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Set the start date to `days` after today
    pub fn set_start_in(&mut self, days: i64, today: NaiveDate) {
        self.contract_start_date = today_plus(today, days);
    }

    /// Set the end date to `days` after the start date (or today without one)
    pub fn set_end_in(&mut self, days: i64, today: NaiveDate) {
        self.contract_end_date = start_plus(&self.contract_start_date, today, days);
    }
}
