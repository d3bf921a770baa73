pub mod calculations;
pub mod models;

pub use calculations::{PaySlipCalculator, TaxTable, TaxTableError};
pub use models::*;
