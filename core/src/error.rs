use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommissionError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid rate {value} in '{field}' for staff ID {staff_id} ({context}): rates must be between 0 and 1")]
    InvalidRate {
        staff_id: String,
        field:    String,
        value:    f64,
        context:  String,
    },

    #[error("Hurdle level {level} in '{field}' for staff ID {staff_id} ({context}) must be above the previous hurdle level {previous}")]
    InvalidHurdleLevels {
        staff_id: String,
        field:    String,
        level:    f64,
        previous: f64,
        context:  String,
    },

    #[error("No commission config for staff ID {staff_id} and no default config exists ({context})")]
    MissingStaffConfig { staff_id: String, context: String },

    #[error("No commission config for staff ID {staff_id} and strict mode refuses the default config ({context})")]
    DefaultConfigRefused { staff_id: String, context: String },

    #[error("Pooling config appears incorrect for staff ID {staff_id} ({context}): declares pool {declared:?} but appears to be a member of pool {pool:?}")]
    PoolingInconsistent {
        staff_id: String,
        declared: Vec<String>,
        pool:     Vec<String>,
        context:  String,
    },

    #[error("Found 'Total for' row {row} with no staff ID in progress; probable staff name: '{staff_name}'")]
    TotalWithoutStaff { staff_name: String, row: usize },

    #[error("Blank staff ID on row {row} for staff '{staff_name}'")]
    BlankStaffId { staff_name: String, row: usize },

    #[error("Staff ID {staff_id} ({staff_name}) is paid via payroll but missing from the staff directory")]
    StaffNotInDirectory { staff_id: String, staff_name: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type CommissionResult<T> = Result<T, CommissionError>;
