//! Tiered ("hurdle") commission calculation.
//!
//! Pure: no I/O, no logging. Revenue exactly on a hurdle level belongs to
//! the tier below it. Rounding to cents happens at every step (tier
//! revenue, tier commission, total) so results match the payroll reports
//! to the cent.

use crate::types::round2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HurdleTier {
    pub level: f64,
    pub rate: f64,
}

/// Base rate plus up to three hurdle tiers with strictly increasing levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HurdleSchedule {
    pub base_rate: f64,
    pub tiers: [Option<HurdleTier>; 3],
}

impl HurdleSchedule {
    pub fn flat(base_rate: f64) -> Self {
        Self { base_rate, tiers: [None; 3] }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HurdleBreakdown {
    pub base_revenue: f64,
    pub base_commission: f64,
    pub hurdle1_revenue: f64,
    pub hurdle1_commission: f64,
    pub hurdle2_revenue: f64,
    pub hurdle2_commission: f64,
    pub hurdle3_revenue: f64,
    pub hurdle3_commission: f64,
    pub total_commission: f64,
}

/// Split `service_revenue` across the schedule's tiers and compute the
/// commission for each.
///
/// Without a first tier everything is paid at the base rate. With one,
/// revenue up to the first level earns nothing.
pub fn calculate_tiered_commission(service_revenue: f64, schedule: &HurdleSchedule) -> HurdleBreakdown {
    let [t1, t2, t3] = schedule.tiers;
    let mut base_revenue = 0.0;
    let mut revenue = [0.0; 3];

    match t1 {
        None => base_revenue = service_revenue,
        Some(t1) if service_revenue <= t1.level => {}
        Some(t1) => match t2 {
            Some(t2) if service_revenue > t2.level => match t3 {
                Some(t3) if service_revenue > t3.level => {
                    revenue = [
                        t2.level - t1.level,
                        t3.level - t2.level,
                        service_revenue - t3.level,
                    ];
                }
                _ => revenue = [t2.level - t1.level, service_revenue - t2.level, 0.0],
            },
            _ => revenue[0] = service_revenue - t1.level,
        },
    }

    let base_revenue = round2(base_revenue);
    let revenue = revenue.map(round2);
    let rate = |tier: Option<HurdleTier>| tier.map_or(0.0, |t| t.rate);

    let base_commission = round2(base_revenue * schedule.base_rate);
    let commission = [
        round2(revenue[0] * rate(t1)),
        round2(revenue[1] * rate(t2)),
        round2(revenue[2] * rate(t3)),
    ];

    HurdleBreakdown {
        base_revenue,
        base_commission,
        hurdle1_revenue: revenue[0],
        hurdle1_commission: commission[0],
        hurdle2_revenue: revenue[1],
        hurdle2_commission: commission[1],
        hurdle3_revenue: revenue[2],
        hurdle3_commission: commission[2],
        total_commission: round2(commission.iter().fold(base_commission, |acc, c| acc + c)),
    }
}
