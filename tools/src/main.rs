//! commission-runner: calculates staff commission for one payroll report.
//!
//! Usage:
//!   commission-runner --report payroll.csv --staff-config staff.json --directory staff_directory.json
//!   commission-runner --report payroll.csv --staff-config staff.json --strict-config --missing-staff fatal \
//!       --out commission.json --payments payments.json --csv commission.csv

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use salon_commission_core::{
    aggregator::CommissionComponents,
    config::{MissingStaffPolicy, RunOptions, StaffConfigTable},
    directory::StaffDirectory,
    engine::CommissionEngine,
    grid::{Cell, Grid},
    payments::build_payment_records,
    types::CommissionMap,
};
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "commission-runner",
    version,
    about = "Calculate salon staff commission from a payroll report",
    long_about = None
)]
struct Cli {
    /// Payroll report exported as CSV
    #[arg(long)]
    report: PathBuf,

    /// Staff commission config (JSON object keyed by staff ID)
    #[arg(long)]
    staff_config: PathBuf,

    /// Staff directory from the payroll provider (JSON object keyed by staff ID)
    #[arg(long)]
    directory: Option<PathBuf>,

    /// 0-based column holding service revenue
    #[arg(long, default_value_t = salon_commission_core::config::DEFAULT_REVENUE_COLUMN)]
    revenue_column: usize,

    /// Refuse the default ("000") config for staff without their own config
    #[arg(long)]
    strict_config: bool,

    /// What to do when staff paid via payroll are missing from the directory
    #[arg(long, value_enum, default_value_t = MissingStaff::Warn)]
    missing_staff: MissingStaff,

    /// Commission map output (JSON); "-" for stdout
    #[arg(long, default_value = "-")]
    out: String,

    /// Payment records for upload (JSON)
    #[arg(long)]
    payments: Option<PathBuf>,

    /// Flat commission export (CSV)
    #[arg(long)]
    csv: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum MissingStaff {
    Fatal,
    Warn,
}

impl From<MissingStaff> for MissingStaffPolicy {
    fn from(m: MissingStaff) -> Self {
        match m {
            MissingStaff::Fatal => MissingStaffPolicy::Fatal,
            MissingStaff::Warn => MissingStaffPolicy::Warn,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let configs = StaffConfigTable::load(&cli.staff_config)?;
    let directory = match &cli.directory {
        Some(path) => StaffDirectory::load(path)?,
        None => {
            log::warn!("No staff directory given; every staff member paid via payroll counts as missing");
            StaffDirectory::default()
        }
    };
    let grid = load_csv_grid(File::open(&cli.report).with_context(|| format!("opening {}", cli.report.display()))?)
        .with_context(|| format!("reading {}", cli.report.display()))?;
    log::info!("Loaded {} report rows from {}", grid.len(), cli.report.display());

    let mut options = RunOptions {
        strict_staff_config: cli.strict_config,
        missing_staff_policy: cli.missing_staff.into(),
        ..Default::default()
    };
    options.layout.revenue_column = cli.revenue_column;

    let run = CommissionEngine::new(&configs, &directory, options).run(&grid)?;

    write_json(&cli.out, &run.commissions)?;

    if let Some(path) = &cli.payments {
        let records = build_payment_records(&run.commissions, &configs, &directory);
        log::info!("Writing {} payment records to {}", records.len(), path.display());
        write_json(&path.to_string_lossy(), &records)?;
    }

    if let Some(path) = &cli.csv {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        write_commission_csv(file, &run.commissions)?;
    }

    print_summary(&run.commissions);
    Ok(())
}

/// Read a headerless, ragged CSV into a typed grid.
fn load_csv_grid<R: Read>(input: R) -> Result<Grid> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut grid = Grid::new();
    for record in reader.records() {
        let record = record?;
        grid.push(record.iter().map(Cell::from_raw).collect());
    }
    Ok(grid)
}

fn write_json<T: serde::Serialize>(out: &str, value: &T) -> Result<()> {
    if out == "-" {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        serde_json::to_writer_pretty(&mut handle, value)?;
        writeln!(handle)?;
        return Ok(());
    }
    let path = Path::new(out);
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

#[derive(serde::Serialize)]
struct CommissionCsvRow<'a> {
    staff_id: &'a str,
    total_service_revenue: f64,
    general_service_commission: f64,
    custom_rate_commission: f64,
    product_commission: f64,
    tips: f64,
    total_service_commission: f64,
}

fn write_commission_csv<W: Write>(out: W, commissions: &CommissionMap) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for (staff_id, c) in commissions {
        writer.serialize(CommissionCsvRow {
            staff_id,
            total_service_revenue: c.total_service_revenue,
            general_service_commission: c.general_service_commission,
            custom_rate_commission: c.custom_rate_commission,
            product_commission: c.product_commission,
            tips: c.tips,
            total_service_commission: c.total_service_commission,
        })?;
    }
    writer.flush()?;
    Ok(())
}

fn print_summary(commissions: &CommissionMap) {
    let total = |field: fn(&CommissionComponents) -> f64| {
        commissions.values().map(field).fold(0.0, |acc, v| acc + v)
    };
    let service = total(|c| c.total_service_commission);
    let product = total(|c| c.product_commission);
    let tips = total(|c| c.tips);

    eprintln!("=== COMMISSION SUMMARY ===");
    eprintln!("  staff:              {}", commissions.len());
    eprintln!("  service commission: {service:.2}");
    eprintln!("  product commission: {product:.2}");
    eprintln!("  tips:               {tips:.2}");
}
