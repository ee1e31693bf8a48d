//! Staff commission config lookup with default fallback.

use crate::{
    config::{StaffCommissionConfig, StaffConfigTable},
    error::{CommissionError, CommissionResult},
    types::DEFAULT_STAFF_ID,
};

/// Resolves a staff ID to its commission config.
///
/// Returned references point into the table, so resolving the same ID
/// twice yields the same config.
#[derive(Debug, Clone, Copy)]
pub struct StaffConfigResolver<'a> {
    table: &'a StaffConfigTable,
    strict: bool,
}

impl<'a> StaffConfigResolver<'a> {
    pub fn new(table: &'a StaffConfigTable, strict: bool) -> Self {
        Self { table, strict }
    }

    /// Look up `staff_id`; `context` names the caller in logs and errors.
    ///
    /// Falls back to the default config ("000") with a warning unless the
    /// resolver is strict.
    pub fn resolve(&self, staff_id: &str, context: &str) -> CommissionResult<&'a StaffCommissionConfig> {
        if let Some(config) = self.table.get(staff_id) {
            return Ok(config);
        }

        match self.table.default_config() {
            Some(_) if self.strict => Err(CommissionError::DefaultConfigRefused {
                staff_id: staff_id.to_string(),
                context:  context.to_string(),
            }),
            Some(default) => {
                log::warn!(
                    "{context}: no commission config for staff ID {staff_id}, using default config ({DEFAULT_STAFF_ID})"
                );
                Ok(default)
            }
            None => Err(CommissionError::MissingStaffConfig {
                staff_id: staff_id.to_string(),
                context:  context.to_string(),
            }),
        }
    }
}

/// Check that `value` is a rate in [0, 1].
pub fn validate_rate(staff_id: &str, field: &str, value: f64, context: &str) -> CommissionResult<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(CommissionError::InvalidRate {
            staff_id: staff_id.to_string(),
            field:    field.to_string(),
            value,
            context:  context.to_string(),
        })
    }
}
