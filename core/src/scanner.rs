//! Payroll report scanner.
//!
//! Walks the grid top to bottom and yields one [`StaffBlock`] per
//! "<Last>, <First> ... Staff ID #:<id>" row closed by a "Total for " row.
//!
//! STATES:
//!   SeekingStaffId --identity row--> InStaffBlock
//!   InStaffBlock   --total row-----> (emit block) SeekingStaffId
//!   SeekingStaffId --total row-----> fatal TotalWithoutStaff
//!
//! The scanner stops after the first error; blocks are yielded in row
//! order and never revisited.

use crate::{
    aggregator::BlockExtras,
    config::{MissingStaffPolicy, ReportLayout, StaffCommissionConfig},
    directory::StaffDirectory,
    error::{CommissionError, CommissionResult},
    grid::{first_text, last_populated, Cell, Grid},
    types::StaffId,
};
use once_cell::sync::Lazy;
use regex::Regex;

static STAFF_IDENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<last>[^,]+),\s*(?P<first>.*?)\s*Staff ID #:\s*(?P<id>\d*)").unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffIdentity {
    pub staff_id: StaffId,
    pub first_name: String,
    pub last_name: String,
}

impl StaffIdentity {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// One staff member's rows, identity row through total row.
#[derive(Debug, Clone, PartialEq)]
pub struct StaffBlock {
    pub identity: StaffIdentity,
    pub identity_row: usize,
    pub total_row: usize,
    pub extras: BlockExtras,
}

#[derive(Debug, Clone, PartialEq)]
enum ScanState {
    SeekingStaffId,
    InStaffBlock { identity_row: usize, identity: StaffIdentity },
    Failed,
}

/// Parse a staff identity row. `Some(Err(name))` means the row has the
/// marker but no digits after it.
pub fn parse_staff_identity(text: &str) -> Option<Result<StaffIdentity, String>> {
    let caps = STAFF_IDENTITY.captures(text)?;
    let last_name = caps["last"].trim().to_string();
    let first_name = caps["first"].trim().to_string();
    let staff_id = &caps["id"];

    if staff_id.is_empty() {
        return Some(Err(format!("{first_name} {last_name}").trim().to_string()));
    }

    Some(Ok(StaffIdentity {
        staff_id: staff_id.to_string(),
        first_name,
        last_name,
    }))
}

pub struct PayrollRowScanner<'a> {
    grid: &'a Grid,
    layout: &'a ReportLayout,
    next_row: usize,
    state: ScanState,
}

impl<'a> PayrollRowScanner<'a> {
    pub fn new(grid: &'a Grid, layout: &'a ReportLayout) -> Self {
        Self {
            grid,
            layout,
            next_row: 0,
            state: ScanState::SeekingStaffId,
        }
    }

    fn fail(&mut self, err: CommissionError) -> Option<CommissionResult<StaffBlock>> {
        self.state = ScanState::Failed;
        Some(Err(err))
    }

    /// Tips and product commission from the rows just above `total_row`,
    /// never reaching back past the identity row.
    fn read_extras(&self, identity: &StaffIdentity, identity_row: usize, total_row: usize) -> BlockExtras {
        let from = (identity_row + 1).max(total_row.saturating_sub(self.layout.tips_lookback_rows));
        let window = &self.grid[from..=total_row];

        let find = |marker: &str| -> Option<f64> {
            let row = window
                .iter()
                .find(|row| first_text(row).is_some_and(|t| t.trim() == marker))?;
            match last_populated(row).and_then(Cell::as_amount) {
                Some(value) => Some(value),
                None => {
                    log::warn!(
                        "staff ID {}: '{marker}' row has no amount, using 0",
                        identity.staff_id
                    );
                    Some(0.0)
                }
            }
        };

        let tips = find(self.layout.tips_marker.as_str()).unwrap_or_else(|| {
            log::warn!("staff ID {}: no '{}' row, tips = 0", identity.staff_id, self.layout.tips_marker);
            0.0
        });
        let product_commission = find(self.layout.product_commission_marker.as_str()).unwrap_or_else(|| {
            log::warn!(
                "staff ID {}: no '{}' row, product commission = 0",
                identity.staff_id,
                self.layout.product_commission_marker
            );
            0.0
        });

        BlockExtras { tips, product_commission }
    }
}

impl Iterator for PayrollRowScanner<'_> {
    type Item = CommissionResult<StaffBlock>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == ScanState::Failed {
            return None;
        }

        let grid = self.grid;
        while self.next_row < grid.len() {
            let row = self.next_row;
            self.next_row += 1;

            let Some(text) = first_text(&grid[row]) else {
                continue;
            };

            if let Some(rest) = text.strip_prefix(self.layout.total_prefix.as_str()) {
                match std::mem::replace(&mut self.state, ScanState::SeekingStaffId) {
                    ScanState::InStaffBlock { identity_row, identity } => {
                        let extras = self.read_extras(&identity, identity_row, row);
                        return Some(Ok(StaffBlock {
                            identity,
                            identity_row,
                            total_row: row,
                            extras,
                        }));
                    }
                    _ => {
                        return self.fail(CommissionError::TotalWithoutStaff {
                            staff_name: rest.trim().to_string(),
                            row,
                        });
                    }
                }
            }

            match parse_staff_identity(text) {
                Some(Ok(identity)) => {
                    if let ScanState::InStaffBlock { identity: open, identity_row } = &self.state {
                        log::warn!(
                            "row {row}: staff ID {} starts before staff ID {} (row {identity_row}) was totalled; dropping the open block",
                            identity.staff_id,
                            open.staff_id
                        );
                    }
                    self.state = ScanState::InStaffBlock { identity_row: row, identity };
                }
                Some(Err(staff_name)) => {
                    return self.fail(CommissionError::BlankStaffId { staff_name, row });
                }
                None => {}
            }
        }

        if let ScanState::InStaffBlock { identity, identity_row } =
            std::mem::replace(&mut self.state, ScanState::SeekingStaffId)
        {
            log::warn!(
                "report ended inside the block for staff ID {} (row {identity_row}) with no total row",
                identity.staff_id
            );
        }
        None
    }
}

/// Check a scanned staff member against the payroll provider's directory.
///
/// Staff paid outside payroll only need a config. Staff paid via payroll
/// must be in the directory; `policy` decides whether absence stops the run.
pub fn check_directory(
    identity: &StaffIdentity,
    config: &StaffCommissionConfig,
    directory: &StaffDirectory,
    policy: MissingStaffPolicy,
) -> CommissionResult<()> {
    if let Some(record) = directory.get(&identity.staff_id) {
        if let Some(resigned) = record.resign_date {
            log::info!(
                "staff ID {} ({}) resigned on {resigned}",
                identity.staff_id,
                record.full_name()
            );
        }
        return Ok(());
    }

    if !config.pay_via_payroll {
        log::info!(
            "staff ID {} ({}) is not in the staff directory and is paid outside payroll",
            identity.staff_id,
            identity.full_name()
        );
        return Ok(());
    }

    match policy {
        MissingStaffPolicy::Fatal => Err(CommissionError::StaffNotInDirectory {
            staff_id: identity.staff_id.clone(),
            staff_name: identity.full_name(),
        }),
        MissingStaffPolicy::Warn => {
            log::warn!(
                "staff ID {} ({}) is paid via payroll but missing from the staff directory",
                identity.staff_id,
                identity.full_name()
            );
            Ok(())
        }
    }
}
