//! Revenue bucketing within one staff block.
//!
//! A block is a list of service lines, optionally split into sections by
//! "<Category> Pay Rate: <Service> (<Rate>%)" header rows. Sections naming
//! a service with a custom rate for this staff member get their own bucket;
//! everything else lands in "General Services".

use crate::{
    config::StaffCommissionConfig,
    error::CommissionResult,
    grid::{first_text, number_at, Grid},
    resolver::validate_rate,
    types::{ServiceName, GENERAL_SERVICES},
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

static PAY_RATE_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<category>.*?)\s*Pay Rate:\s*(?P<service>.+?)\s*\((?P<rate>[\d.]+)%\)").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServiceRevenueEntry {
    pub service_revenue: f64,
    /// `None` for General Services.
    pub custom_rate: Option<f64>,
}

pub type ServiceRevenueMap = BTreeMap<ServiceName, ServiceRevenueEntry>;

/// A parsed "Pay Rate:" section header.
#[derive(Debug, Clone, PartialEq)]
pub struct PayRateHeader {
    pub category: String,
    pub service: String,
    /// Rate printed in the report, in percent. Informational only.
    pub report_rate: Option<f64>,
}

pub fn parse_pay_rate_header(text: &str) -> Option<PayRateHeader> {
    let caps = PAY_RATE_HEADER.captures(text)?;
    Some(PayRateHeader {
        category: caps["category"].trim().to_string(),
        service: caps["service"].trim().to_string(),
        report_rate: caps["rate"].parse().ok(),
    })
}

/// Bucket the revenue of the rows strictly between `start_row` (the staff
/// identity row) and `end_row` (the staff's total row).
///
/// Only positive numbers in `revenue_column` count. The General Services
/// bucket is created on its first contribution; custom-rate buckets are
/// created when their header is seen. `config` is the staff member's
/// already-resolved commission config.
pub fn bucket_service_revenue(
    grid: &Grid,
    start_row: usize,
    end_row: usize,
    revenue_column: usize,
    staff_id: &str,
    config: &StaffCommissionConfig,
) -> CommissionResult<ServiceRevenueMap> {
    const CONTEXT: &str = "service revenue bucketing";

    let mut buckets = ServiceRevenueMap::new();
    let mut active: ServiceName = GENERAL_SERVICES.to_string();

    let first = start_row.saturating_add(1);
    let last = end_row.min(grid.len());

    for row in grid.iter().take(last).skip(first) {
        if let Some(header) = first_text(row).and_then(parse_pay_rate_header) {
            active = match config.custom_rate_for(&header.service) {
                Some(rate) => {
                    let field = format!("customPayRates.{}", header.service);
                    let rate = validate_rate(staff_id, &field, rate, CONTEXT)?;
                    buckets
                        .entry(header.service.clone())
                        .or_insert(ServiceRevenueEntry { service_revenue: 0.0, custom_rate: Some(rate) });
                    header.service
                }
                None => {
                    log::debug!(
                        "staff ID {staff_id}: no custom rate for '{}' ({} section), counting as {GENERAL_SERVICES}",
                        header.service,
                        header.category
                    );
                    GENERAL_SERVICES.to_string()
                }
            };
        }

        let Some(revenue) = number_at(row, revenue_column).filter(|v| *v > 0.0) else {
            continue;
        };

        buckets
            .entry(active.clone())
            .or_insert(ServiceRevenueEntry { service_revenue: 0.0, custom_rate: None })
            .service_revenue += revenue;
    }

    Ok(buckets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::StaffConfigTable, grid::Cell};

    fn jane() -> StaffCommissionConfig {
        StaffConfigTable::default_test().get("001").unwrap().clone()
    }

    fn line(label: &str, revenue: f64) -> Vec<Cell> {
        vec![Cell::text(label), Cell::Empty, Cell::Number(revenue)]
    }

    #[test]
    fn parses_pay_rate_headers() {
        let h = parse_pay_rate_header("Hair Pay Rate: Extensions (55%)").unwrap();
        assert_eq!(h.category, "Hair");
        assert_eq!(h.service, "Extensions");
        assert_eq!(h.report_rate, Some(55.0));

        let h = parse_pay_rate_header("Pay Rate: Keratin Treatment (12.5%) ").unwrap();
        assert_eq!(h.category, "");
        assert_eq!(h.service, "Keratin Treatment");
        assert_eq!(h.report_rate, Some(12.5));

        assert!(parse_pay_rate_header("Womens Cut").is_none());
        assert!(parse_pay_rate_header("Pay Rate: Extensions").is_none());
    }

    #[test]
    fn custom_rate_section_gets_own_bucket() {
        let config = jane();
        let grid: Grid = vec![
            vec![Cell::text("Doe, Jane Staff ID #: 001")],
            vec![Cell::text("Hair Pay Rate: Extensions (55%)")],
            line("Tape extensions", 4000.0),
            line("Keratin bonds", 3000.0),
            vec![Cell::text("Total for Doe, Jane")],
        ];

        let buckets = bucket_service_revenue(&grid, 0, 4, 2, "001", &config).unwrap();
        assert_eq!(buckets.len(), 1);
        assert_eq!(
            buckets["Extensions"],
            ServiceRevenueEntry { service_revenue: 7000.0, custom_rate: Some(0.15) }
        );
    }

    #[test]
    fn unmatched_sections_merge_into_general() {
        let config = jane();
        let grid: Grid = vec![
            vec![Cell::text("Doe, Jane Staff ID #: 001")],
            line("Womens cut", 120.0),
            vec![Cell::text("Colour Pay Rate: Balayage (40%)"), Cell::Empty, Cell::Number(80.0)],
            line("Toner", 30.0),
            vec![Cell::text("Hair Pay Rate: Extensions (55%)")],
            line("Tape extensions", 500.0),
            vec![Cell::text("Total for Doe, Jane"), Cell::Empty, Cell::Number(730.0)],
        ];

        let buckets = bucket_service_revenue(&grid, 0, 6, 2, "001", &config).unwrap();
        assert_eq!(buckets[GENERAL_SERVICES].service_revenue, 230.0);
        assert_eq!(buckets[GENERAL_SERVICES].custom_rate, None);
        assert_eq!(buckets["Extensions"].service_revenue, 500.0);
        assert!(!buckets.contains_key("Balayage"));
    }

    #[test]
    fn ignores_non_positive_and_non_numeric_revenue() {
        let config = jane();
        let grid: Grid = vec![
            vec![Cell::text("Doe, Jane Staff ID #: 001")],
            line("Refund", -50.0),
            line("Comp", 0.0),
            vec![Cell::text("Note"), Cell::Empty, Cell::text("n/a")],
            vec![Cell::text("Short row")],
            line("Cut", 60.0),
            vec![Cell::text("Total for Doe, Jane")],
        ];

        let buckets = bucket_service_revenue(&grid, 0, 6, 2, "001", &config).unwrap();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[GENERAL_SERVICES].service_revenue, 60.0);
    }

    #[test]
    fn custom_bucket_exists_even_without_revenue() {
        let config = jane();
        let grid: Grid = vec![
            vec![Cell::text("Doe, Jane Staff ID #: 001")],
            vec![Cell::text("Hair Pay Rate: Extensions (55%)")],
            vec![Cell::text("Total for Doe, Jane")],
        ];

        let buckets = bucket_service_revenue(&grid, 0, 2, 2, "001", &config).unwrap();
        assert_eq!(buckets["Extensions"].service_revenue, 0.0);
        assert!(!buckets.contains_key(GENERAL_SERVICES));
    }

    #[test]
    fn invalid_custom_rate_is_fatal() {
        let mut config = jane();
        config.custom_pay_rates = vec![BTreeMap::from([("Extensions".to_string(), 15.0)])];
        let grid: Grid = vec![
            vec![Cell::text("Doe, Jane Staff ID #: 001")],
            vec![Cell::text("Hair Pay Rate: Extensions (55%)")],
            vec![Cell::text("Total for Doe, Jane")],
        ];

        let err = bucket_service_revenue(&grid, 0, 2, 2, "001", &config).unwrap_err();
        assert!(err.to_string().contains("customPayRates.Extensions"));
    }

    #[test]
    fn buckets_with_the_config_it_is_given() {
        // Staff ID absent from every table: the caller has already resolved it.
        let mut config = StaffCommissionConfig::flat("Guest Stylist", 0.1);
        config.custom_pay_rates = vec![BTreeMap::from([("Balayage".to_string(), 0.3)])];
        let grid: Grid = vec![
            vec![Cell::text("Stylist, Guest Staff ID #: 077")],
            vec![Cell::text("Colour Pay Rate: Balayage (40%)")],
            line("Full head", 250.0),
            vec![Cell::text("Total for Stylist, Guest")],
        ];

        let buckets = bucket_service_revenue(&grid, 0, 3, 2, "077", &config).unwrap();
        assert_eq!(
            buckets["Balayage"],
            ServiceRevenueEntry { service_revenue: 250.0, custom_rate: Some(0.3) }
        );
    }
}
