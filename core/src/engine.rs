//! The commission engine: one payroll report in, one commission map out.
//!
//! EXECUTION ORDER (fixed, never reordered):
//!   1. Scan staff blocks in row order
//!   2. Per block: directory check, bucketing, tiered + custom commission
//!   3. Commit the block's components to the commission map
//!   4. Pooling, once, over the complete map
//!
//! RULES:
//!   - The grid, config table and directory are read-only.
//!   - The first fatal error aborts the run; no partial map is returned.
//!   - Per-staff output goes to the "staff" or "contractor" log target.

use crate::{
    aggregator::{aggregate_commission, describe, CommissionComponents},
    bucketer::bucket_service_revenue,
    config::{RunOptions, StaffConfigTable},
    directory::StaffDirectory,
    error::CommissionResult,
    grid::Grid,
    pooling::{do_pooling, Pool},
    resolver::StaffConfigResolver,
    scanner::{check_directory, PayrollRowScanner, StaffBlock},
    types::CommissionMap,
};

/// Result of a complete run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommissionRun {
    pub commissions: CommissionMap,
    pub pools: Vec<Pool>,
}

pub struct CommissionEngine<'a> {
    configs: &'a StaffConfigTable,
    directory: &'a StaffDirectory,
    options: RunOptions,
}

impl<'a> CommissionEngine<'a> {
    pub fn new(configs: &'a StaffConfigTable, directory: &'a StaffDirectory, options: RunOptions) -> Self {
        Self {
            configs,
            directory,
            options,
        }
    }

    fn resolver(&self) -> StaffConfigResolver<'a> {
        StaffConfigResolver::new(self.configs, self.options.strict_staff_config)
    }

    /// Run the full calculation over `grid`.
    pub fn run(&self, grid: &Grid) -> CommissionResult<CommissionRun> {
        let mut commissions = CommissionMap::new();

        for block in PayrollRowScanner::new(grid, &self.options.layout) {
            let block = block?;
            let staff_id = block.identity.staff_id.clone();
            let components = self.process_block(grid, &block)?;
            if commissions.insert(staff_id.clone(), components).is_some() {
                log::warn!("staff ID {staff_id} appears more than once in the report; keeping the last block");
            }
        }

        log::info!("Calculated commission for {} staff", commissions.len());

        let pools = do_pooling(self.configs, &mut commissions)?;
        Ok(CommissionRun { commissions, pools })
    }

    /// Commission components for one staff block, before pooling.
    pub fn process_block(&self, grid: &Grid, block: &StaffBlock) -> CommissionResult<CommissionComponents> {
        let staff_id = &block.identity.staff_id;

        // Resolved once per block; bucketing and tiers share this config.
        let config = self.resolver().resolve(staff_id, "payroll scan")?;
        check_directory(&block.identity, config, self.directory, self.options.missing_staff_policy)?;

        let buckets = bucket_service_revenue(
            grid,
            block.identity_row,
            block.total_row,
            self.options.layout.revenue_column,
            staff_id,
            config,
        )?;

        let schedule = config.hurdle_schedule(staff_id, "tiered commission")?;
        let (components, breakdown) = aggregate_commission(&buckets, &schedule, block.extras);

        let name = self
            .directory
            .get(staff_id)
            .map(|r| r.full_name())
            .unwrap_or_else(|| block.identity.full_name());
        log::info!(
            target: config.log_target(),
            "{}",
            describe(staff_id, &name, &components, &breakdown)
        );

        Ok(components)
    }
}
