//! Tax calculation modules for monthly payslips.
//!
//! This module provides bracket resolution over a progressive tax table and
//! the monthly withholding calculation built on top of it.

pub mod common;
pub mod payslip;
pub mod tax_table;

pub use payslip::PaySlipCalculator;
pub use tax_table::{TaxTable, TaxTableError};
