use crate::{
    error::{CommissionError, CommissionResult},
    resolver::validate_rate,
    tiered::{HurdleSchedule, HurdleTier},
    types::{ServiceName, StaffId, DEFAULT_STAFF_ID},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Default 0-based column holding service revenue in the payroll report.
pub const DEFAULT_REVENUE_COLUMN: usize = 4;

pub const TOTAL_PREFIX: &str = "Total for ";
pub const TIPS_MARKER: &str = "Tips:";
pub const PRODUCT_COMMISSION_MARKER: &str = "Sales Commission:";
pub const TIPS_LOOKBACK_ROWS: usize = 4;

// ── Staff commission config ────────────────────────────────────────

/// Commission settings for one staff member, as stored in the config file.
///
/// Tier levels of 0 or below mean "tier not configured"; the conversion to
/// [`HurdleSchedule`] turns them into `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffCommissionConfig {
    #[serde(default)]
    pub staff_name: String,
    #[serde(default)]
    pub base_rate: f64,
    #[serde(default)]
    pub hurdle1_level: f64,
    #[serde(default)]
    pub hurdle1_rate: f64,
    #[serde(default)]
    pub hurdle2_level: f64,
    #[serde(default)]
    pub hurdle2_rate: f64,
    #[serde(default)]
    pub hurdle3_level: f64,
    #[serde(default)]
    pub hurdle3_rate: f64,
    #[serde(default)]
    pub pools_with: Vec<StaffId>,
    #[serde(default)]
    pub custom_pay_rates: Vec<BTreeMap<ServiceName, f64>>,
    #[serde(default)]
    pub contractor: bool,
    #[serde(default = "default_true", rename = "payViaPayroll", alias = "payViaTalenox")]
    pub pay_via_payroll: bool,
}

fn default_true() -> bool {
    true
}

impl StaffCommissionConfig {
    /// A config paying a flat base rate with no hurdles.
    pub fn flat(staff_name: &str, base_rate: f64) -> Self {
        Self {
            staff_name: staff_name.to_string(),
            base_rate,
            hurdle1_level: 0.0,
            hurdle1_rate: 0.0,
            hurdle2_level: 0.0,
            hurdle2_rate: 0.0,
            hurdle3_level: 0.0,
            hurdle3_rate: 0.0,
            pools_with: Vec::new(),
            custom_pay_rates: Vec::new(),
            contractor: false,
            pay_via_payroll: true,
        }
    }

    /// Validate the rate fields and build the tier schedule.
    pub fn hurdle_schedule(&self, staff_id: &str, context: &str) -> CommissionResult<HurdleSchedule> {
        let base_rate = validate_rate(staff_id, "baseRate", self.base_rate, context)?;
        let raw = [
            ("hurdle1", self.hurdle1_level, self.hurdle1_rate),
            ("hurdle2", self.hurdle2_level, self.hurdle2_rate),
            ("hurdle3", self.hurdle3_level, self.hurdle3_rate),
        ];

        let mut tiers = [None; 3];
        let mut previous: Option<f64> = None;
        for (slot, (tier, level, rate)) in tiers.iter_mut().zip(raw) {
            let rate = validate_rate(staff_id, &format!("{tier}Rate"), rate, context)?;
            if level <= 0.0 {
                continue;
            }
            // Present levels must strictly increase or tier revenue goes negative.
            if let Some(previous) = previous.filter(|p| level <= *p) {
                return Err(CommissionError::InvalidHurdleLevels {
                    staff_id: staff_id.to_string(),
                    field:    format!("{tier}Level"),
                    level,
                    previous,
                    context:  context.to_string(),
                });
            }
            previous = Some(level);
            *slot = Some(HurdleTier { level, rate });
        }

        Ok(HurdleSchedule { base_rate, tiers })
    }

    /// Configured custom rate for `service`, unvalidated.
    pub fn custom_rate_for(&self, service: &str) -> Option<f64> {
        self.custom_pay_rates
            .iter()
            .find_map(|rates| rates.get(service).copied())
    }

    /// Log target for per-staff output: contractors get their own channel.
    pub fn log_target(&self) -> &'static str {
        if self.contractor {
            "contractor"
        } else {
            "staff"
        }
    }
}

// ── Config table ───────────────────────────────────────────────────

/// All staff commission configs for a run, keyed by staff ID.
/// Read-only once loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaffConfigTable {
    configs: BTreeMap<StaffId, StaffCommissionConfig>,
}

impl StaffConfigTable {
    pub fn new(configs: BTreeMap<StaffId, StaffCommissionConfig>) -> Self {
        Self { configs }
    }

    /// Load from a JSON file mapping staff ID to config.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
        let table = Self::from_json_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {}: {e}", path.display()))?;
        log::info!(
            "Loaded {} staff commission configs from {}",
            table.configs.len(),
            path.display()
        );
        Ok(table)
    }

    pub fn from_json_str(json: &str) -> CommissionResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn get(&self, staff_id: &str) -> Option<&StaffCommissionConfig> {
        self.configs.get(staff_id)
    }

    pub fn default_config(&self) -> Option<&StaffCommissionConfig> {
        self.configs.get(DEFAULT_STAFF_ID)
    }

    /// Configured staff IDs in ascending order, including the default ID.
    pub fn iter(&self) -> impl Iterator<Item = (&StaffId, &StaffCommissionConfig)> {
        self.configs.iter()
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Table with hardcoded configs for use in unit tests.
    ///
    /// - "000": default, flat 5%
    /// - "001": hurdles at 30k/50k/80k (11%/15%/20%), Extensions at 15%
    /// - "002"/"003": flat 10%, pooled together
    /// - "004": contractor, flat 8%, not paid via payroll
    pub fn default_test() -> Self {
        let mut configs = BTreeMap::new();

        configs.insert(DEFAULT_STAFF_ID.to_string(), StaffCommissionConfig::flat("Default", 0.05));

        let mut tiered = StaffCommissionConfig::flat("Jane Doe", 0.0);
        tiered.hurdle1_level = 30_000.0;
        tiered.hurdle1_rate = 0.11;
        tiered.hurdle2_level = 50_000.0;
        tiered.hurdle2_rate = 0.15;
        tiered.hurdle3_level = 80_000.0;
        tiered.hurdle3_rate = 0.20;
        tiered.custom_pay_rates = vec![BTreeMap::from([("Extensions".to_string(), 0.15)])];
        configs.insert("001".to_string(), tiered);

        let mut pooled_a = StaffCommissionConfig::flat("Ann Lee", 0.10);
        pooled_a.pools_with = vec!["003".into()];
        configs.insert("002".to_string(), pooled_a);

        let mut pooled_b = StaffCommissionConfig::flat("Bo Chan", 0.10);
        pooled_b.pools_with = vec!["002".into()];
        configs.insert("003".to_string(), pooled_b);

        let mut contractor = StaffCommissionConfig::flat("Cy Park", 0.08);
        contractor.contractor = true;
        contractor.pay_via_payroll = false;
        configs.insert("004".to_string(), contractor);

        Self { configs }
    }
}

// ── Run options ────────────────────────────────────────────────────

/// What to do when a staff member paid via payroll is absent from the
/// staff directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingStaffPolicy {
    Fatal,
    #[default]
    Warn,
}

/// Literal markers and column positions of the report vendor's format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportLayout {
    pub revenue_column: usize,
    pub total_prefix: String,
    pub tips_marker: String,
    pub product_commission_marker: String,
    /// Rows above a total row searched for the tips/commission markers.
    pub tips_lookback_rows: usize,
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self {
            revenue_column: DEFAULT_REVENUE_COLUMN,
            total_prefix: TOTAL_PREFIX.to_string(),
            tips_marker: TIPS_MARKER.to_string(),
            product_commission_marker: PRODUCT_COMMISSION_MARKER.to_string(),
            tips_lookback_rows: TIPS_LOOKBACK_ROWS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunOptions {
    /// Refuse the default config for unconfigured staff instead of warning.
    pub strict_staff_config: bool,
    pub missing_staff_policy: MissingStaffPolicy,
    pub layout: ReportLayout,
}
