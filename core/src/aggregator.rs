//! Per-staff commission record assembly.

use crate::{
    bucketer::ServiceRevenueMap,
    tiered::{calculate_tiered_commission, HurdleBreakdown, HurdleSchedule},
    types::{round2, ServiceName, GENERAL_SERVICES},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything a staff member is paid for one payroll period.
///
/// Pooling overwrites the numeric fields in place; the per-service
/// breakdown is left as calculated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionComponents {
    pub total_service_revenue: f64,
    pub general_service_commission: f64,
    pub custom_rate_commission: f64,
    pub custom_rate_commissions: BTreeMap<ServiceName, f64>,
    pub product_commission: f64,
    pub tips: f64,
    pub total_service_commission: f64,
}

impl CommissionComponents {
    /// Mutable access to every top-level numeric field, in declaration order.
    pub fn numeric_fields_mut(&mut self) -> [&mut f64; 6] {
        [
            &mut self.total_service_revenue,
            &mut self.general_service_commission,
            &mut self.custom_rate_commission,
            &mut self.product_commission,
            &mut self.tips,
            &mut self.total_service_commission,
        ]
    }

    /// Every top-level numeric field, in declaration order.
    pub fn numeric_fields(&self) -> [f64; 6] {
        [
            self.total_service_revenue,
            self.general_service_commission,
            self.custom_rate_commission,
            self.product_commission,
            self.tips,
            self.total_service_commission,
        ]
    }
}

/// Tips and product commission read from the staff block's footer rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockExtras {
    pub tips: f64,
    pub product_commission: f64,
}

/// Combine bucketed revenue with the hurdle schedule and block extras.
///
/// General Services goes through the tiered calculator; each custom-rate
/// bucket pays `revenue * rate`.
pub fn aggregate_commission(
    buckets: &ServiceRevenueMap,
    schedule: &HurdleSchedule,
    extras: BlockExtras,
) -> (CommissionComponents, HurdleBreakdown) {
    let general_revenue = buckets
        .get(GENERAL_SERVICES)
        .map_or(0.0, |entry| entry.service_revenue);
    let breakdown = calculate_tiered_commission(general_revenue, schedule);

    let custom_rate_commissions: BTreeMap<ServiceName, f64> = buckets
        .iter()
        .filter_map(|(service, entry)| {
            entry
                .custom_rate
                .map(|rate| (service.clone(), round2(entry.service_revenue * rate)))
        })
        .collect();
    // Folded from +0.0: an empty f64 sum is -0.0, which serializes as "-0.0".
    let custom_rate_commission = round2(custom_rate_commissions.values().fold(0.0, |acc, v| acc + v));

    let total_service_revenue = round2(buckets.values().fold(0.0, |acc, e| acc + e.service_revenue));

    let components = CommissionComponents {
        total_service_revenue,
        general_service_commission: breakdown.total_commission,
        custom_rate_commission,
        custom_rate_commissions,
        product_commission: round2(extras.product_commission),
        tips: round2(extras.tips),
        total_service_commission: round2(breakdown.total_commission + custom_rate_commission),
    };

    (components, breakdown)
}

/// Multi-line, human-readable breakdown for the staff log channel.
pub fn describe(staff_id: &str, staff_name: &str, c: &CommissionComponents, b: &HurdleBreakdown) -> String {
    let mut out = format!("Staff ID {staff_id} ({staff_name})\n");
    out.push_str(&format!("  Total service revenue:      {:>12.2}\n", c.total_service_revenue));
    out.push_str(&format!(
        "  Base:      revenue {:>12.2}  commission {:>10.2}\n",
        b.base_revenue, b.base_commission
    ));
    for (n, (rev, comm)) in [
        (b.hurdle1_revenue, b.hurdle1_commission),
        (b.hurdle2_revenue, b.hurdle2_commission),
        (b.hurdle3_revenue, b.hurdle3_commission),
    ]
    .into_iter()
    .enumerate()
    {
        if rev > 0.0 {
            out.push_str(&format!(
                "  Hurdle {}:  revenue {:>12.2}  commission {:>10.2}\n",
                n + 1,
                rev,
                comm
            ));
        }
    }
    out.push_str(&format!("  General service commission: {:>12.2}\n", c.general_service_commission));
    for (service, amount) in &c.custom_rate_commissions {
        out.push_str(&format!("  Custom rate ({service}): {amount:.2}\n"));
    }
    out.push_str(&format!("  Custom rate commission:     {:>12.2}\n", c.custom_rate_commission));
    out.push_str(&format!("  Total service commission:   {:>12.2}\n", c.total_service_commission));
    out.push_str(&format!("  Product commission:         {:>12.2}\n", c.product_commission));
    out.push_str(&format!("  Tips:                       {:>12.2}", c.tips));
    out
}
