//! Shared primitive types used across the commission engine.

use std::collections::BTreeMap;

use crate::aggregator::CommissionComponents;

/// Staff identifier as printed in the report, e.g. "012".
pub type StaffId = String;

/// Service name taken from a "Pay Rate:" section header.
pub type ServiceName = String;

/// Reserved staff ID holding the fallback commission config.
pub const DEFAULT_STAFF_ID: &str = "000";

/// Name of the catch-all revenue bucket.
pub const GENERAL_SERVICES: &str = "General Services";

/// The final per-staff result of a run, ordered by staff ID.
pub type CommissionMap = BTreeMap<StaffId, CommissionComponents>;

/// Round to 2 decimal places (half away from zero).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
