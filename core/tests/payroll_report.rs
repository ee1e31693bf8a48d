//! End-to-end tests: a small payroll report through the whole engine.

use salon_commission_core::{
    bucketer::bucket_service_revenue,
    config::{MissingStaffPolicy, RunOptions, StaffConfigTable},
    directory::StaffDirectory,
    engine::CommissionEngine,
    error::CommissionError,
    grid::{Cell, Grid},
    payments::{build_payment_records, PaymentItem},
    resolver::StaffConfigResolver,
    scanner::PayrollRowScanner,
    types::GENERAL_SERVICES,
};

fn text(s: &str) -> Vec<Cell> {
    vec![Cell::text(s)]
}

/// A service line with revenue in the default revenue column (4).
fn service(label: &str, qty: f64, revenue: f64) -> Vec<Cell> {
    vec![Cell::text(label), Cell::Number(qty), Cell::Empty, Cell::Empty, Cell::Number(revenue)]
}

fn footer(marker: &str, amount: f64) -> Vec<Cell> {
    vec![Cell::text(marker), Cell::Empty, Cell::Empty, Cell::Number(amount), Cell::Empty]
}

fn sample_report() -> Grid {
    vec![
        text("Payroll Report 01/05/2024 - 31/05/2024"),
        vec![Cell::text("Service"), Cell::text("Qty"), Cell::Empty, Cell::Empty, Cell::text("Sales")],
        // 001: tiered hurdles + Extensions custom rate
        text("Doe, Jane Staff ID #:001"),
        service("Womens Cut", 150.0, 20_000.0),
        service("Colour", 80.0, 20_000.0),
        text("Hair Pay Rate: Extensions (55%)"),
        service("Tape Extensions", 10.0, 4_000.0),
        service("Keratin Bonds", 6.0, 3_000.0),
        footer("Tips:", 150.0),
        footer("Sales Commission:", 80.0),
        vec![Cell::text("Total for Doe, Jane"), Cell::Empty, Cell::Empty, Cell::Empty, Cell::Number(47_000.0)],
        // 002 + 003: pooled, flat 10%
        text("Lee, Ann Staff ID #:002"),
        service("Blow Dry", 200.0, 10_000.0),
        footer("Tips:", 40.0),
        text("Total for Lee, Ann"),
        text("Chan, Bo Staff ID #:003"),
        service("Mens Cut", 100.0, 5_000.0),
        service("Refund", 1.0, -200.0),
        footer("Tips:", 20.0),
        text("Total for Chan, Bo"),
        // 004: contractor paid outside payroll, not in the directory
        text("Park, Cy Staff ID #:004"),
        text("Nails Pay Rate: Gel Polish (30%)"),
        service("Gel Polish", 40.0, 2_000.0),
        text("Total for Park, Cy"),
        text("Grand Total"),
    ]
}

fn run(options: RunOptions) -> Result<salon_commission_core::engine::CommissionRun, CommissionError> {
    let _ = env_logger::builder().is_test(true).try_init();
    let configs = StaffConfigTable::default_test();
    let directory = StaffDirectory::default_test();
    CommissionEngine::new(&configs, &directory, options).run(&sample_report())
}

/// Tiered and custom-rate commission for a single unpooled stylist.
#[test]
fn tiered_stylist_with_custom_rate_service() {
    let result = run(RunOptions::default()).unwrap();
    let jane = &result.commissions["001"];

    assert_eq!(jane.total_service_revenue, 47_000.0);
    assert_eq!(jane.general_service_commission, 1100.0);
    assert_eq!(jane.custom_rate_commissions["Extensions"], 1050.0);
    assert_eq!(jane.custom_rate_commission, 1050.0);
    assert_eq!(jane.total_service_commission, 2150.0);
    assert_eq!(jane.tips, 150.0);
    assert_eq!(jane.product_commission, 80.0);
}

/// Pooled staff end the run with identical numeric components.
#[test]
fn pooled_staff_share_equally() {
    let result = run(RunOptions::default()).unwrap();
    let ann = &result.commissions["002"];
    let bo = &result.commissions["003"];

    assert_eq!(result.pools.len(), 1);
    assert_eq!(ann.general_service_commission, 750.0);
    assert_eq!(bo.general_service_commission, 750.0);
    assert_eq!(ann.total_service_revenue, 7_500.0);
    assert_eq!(ann.tips, 30.0);
    assert_eq!(ann.numeric_fields(), bo.numeric_fields());
}

/// A contractor paid outside payroll is calculated but gets no payment records.
#[test]
fn contractor_outside_payroll_is_calculated_not_paid() {
    let result = run(RunOptions {
        missing_staff_policy: MissingStaffPolicy::Fatal,
        ..Default::default()
    })
    .unwrap();
    let cy = &result.commissions["004"];
    // Gel Polish has no custom rate for 004, so it is general revenue at 8%.
    assert_eq!(cy.general_service_commission, 160.0);
    assert!(cy.custom_rate_commissions.is_empty());

    let configs = StaffConfigTable::default_test();
    let directory = StaffDirectory::default_test();
    let payments = build_payment_records(&result.commissions, &configs, &directory);
    assert!(payments.iter().all(|p| p.staff_id != "004"));
    assert!(payments
        .iter()
        .any(|p| p.staff_id == "001" && p.item == PaymentItem::ServiceCommission && p.amount == 2150.0));
}

/// Bucket revenue adds up to the positive revenue cells of each block.
#[test]
fn buckets_cover_all_positive_revenue() {
    let grid = sample_report();
    let layout = RunOptions::default().layout;
    let configs = StaffConfigTable::default_test();
    let resolver = StaffConfigResolver::new(&configs, false);

    for block in PayrollRowScanner::new(&grid, &layout) {
        let block = block.unwrap();
        let config = resolver.resolve(&block.identity.staff_id, "test").unwrap();
        let buckets = bucket_service_revenue(
            &grid,
            block.identity_row,
            block.total_row,
            layout.revenue_column,
            &block.identity.staff_id,
            config,
        )
        .unwrap();

        let bucketed: f64 = buckets.values().map(|b| b.service_revenue).sum();
        let positive: f64 = grid[block.identity_row + 1..block.total_row]
            .iter()
            .filter_map(|row| row.get(layout.revenue_column).and_then(Cell::as_number))
            .filter(|v| *v > 0.0)
            .sum();
        assert!((bucketed - positive).abs() < 1e-9, "staff {}", block.identity.staff_id);
        assert!(buckets.keys().all(|k| k == GENERAL_SERVICES || k == "Extensions"));
    }
}

/// A stray total row stops the run with the probable staff name.
#[test]
fn orphan_total_row_is_fatal() {
    let mut grid = sample_report();
    grid.insert(11, text("Total for Someone, Else"));

    let configs = StaffConfigTable::default_test();
    let directory = StaffDirectory::default_test();
    let err = CommissionEngine::new(&configs, &directory, RunOptions::default())
        .run(&grid)
        .unwrap_err();
    assert!(err.to_string().contains("Someone, Else"), "unexpected error: {err}");
}

/// Staff with no custom-rate service serialize plain zeros, never `-0.0`.
#[test]
fn commission_map_json_has_no_negative_zero() {
    let result = run(RunOptions::default()).unwrap();
    let json = serde_json::to_string(&result.commissions).unwrap();
    assert!(!json.contains("-0.0"), "negative zero in {json}");
    assert!(result.commissions["004"].custom_rate_commission.is_sign_positive());
}
