//! Staff directory as exported from the payroll provider.

use crate::types::StaffId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffRecord {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub resign_date: Option<NaiveDate>,
}

impl StaffRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaffDirectory {
    staff: BTreeMap<StaffId, StaffRecord>,
}

impl StaffDirectory {
    pub fn new(staff: BTreeMap<StaffId, StaffRecord>) -> Self {
        Self { staff }
    }

    /// Load from a JSON file mapping staff ID to record.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
        let directory: Self = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {}: {e}", path.display()))?;
        log::info!("Loaded {} staff directory entries from {}", directory.staff.len(), path.display());
        Ok(directory)
    }

    pub fn get(&self, staff_id: &str) -> Option<&StaffRecord> {
        self.staff.get(staff_id)
    }

    pub fn len(&self) -> usize {
        self.staff.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staff.is_empty()
    }

    /// Directory matching `StaffConfigTable::default_test()` minus the
    /// contractor, who is paid outside payroll.
    pub fn default_test() -> Self {
        let record = |first: &str, last: &str| StaffRecord {
            first_name: first.into(),
            last_name: last.into(),
            resign_date: None,
        };
        let mut staff = BTreeMap::new();
        staff.insert("001".to_string(), record("Jane", "Doe"));
        staff.insert("002".to_string(), record("Ann", "Lee"));
        staff.insert("003".to_string(), record("Bo", "Chan"));
        Self { staff }
    }
}
