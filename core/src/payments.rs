//! Payment records for upload to the payroll provider.
//!
//! One record per non-zero payable component. Staff paid outside payroll
//! are left out.

use crate::{
    config::StaffConfigTable,
    directory::StaffDirectory,
    types::{round2, CommissionMap, StaffId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentItem {
    ServiceCommission,
    ProductCommission,
    Tips,
}

impl PaymentItem {
    /// Item label used by the payroll provider.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentItem::ServiceCommission => "Commission (Irregular)",
            PaymentItem::ProductCommission => "Sales Commission",
            PaymentItem::Tips => "Tips",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub staff_id: StaffId,
    pub staff_name: String,
    pub item: PaymentItem,
    pub amount: f64,
    pub remarks: String,
}

pub fn build_payment_records(
    commissions: &CommissionMap,
    configs: &StaffConfigTable,
    directory: &StaffDirectory,
) -> Vec<PaymentRecord> {
    let mut records = Vec::new();

    for (staff_id, components) in commissions {
        let config = configs.get(staff_id).or_else(|| configs.default_config());
        if config.is_some_and(|c| !c.pay_via_payroll) {
            log::info!("staff ID {staff_id}: paid outside payroll, no payment records");
            continue;
        }

        let record = directory.get(staff_id);
        let staff_name = record
            .map(|r| r.full_name())
            .or_else(|| config.map(|c| c.staff_name.clone()))
            .unwrap_or_default();

        let mut remarks = String::new();
        if let Some(resigned) = record.and_then(|r| r.resign_date) {
            log::info!("staff ID {staff_id} ({staff_name}) resigned on {resigned}; final commission payment");
            remarks = format!("Resigned {resigned}");
        }

        for (item, amount) in [
            (PaymentItem::ServiceCommission, components.total_service_commission),
            (PaymentItem::ProductCommission, components.product_commission),
            (PaymentItem::Tips, components.tips),
        ] {
            let amount = round2(amount);
            if amount == 0.0 {
                continue;
            }
            records.push(PaymentRecord {
                staff_id: staff_id.clone(),
                staff_name: staff_name.clone(),
                item,
                amount,
                remarks: remarks.clone(),
            });
        }
    }

    records
}
