//! Monthly income tax withholding for payslips.
//!
//! The calculator converts an annual salary and its resolved [`Bracket`] into
//! the tax withheld each month:
//!
//! ```text
//! monthly_tax = round((base_tax + (annual_salary - min) * marginal_rate) / 12)
//! ```
//!
//! Rounding is to whole currency units with midpoints going to the even
//! neighbour (see [`round_to_whole_number`]).
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use rust_decimal_macros::dec;
//! use payslip_core::Bracket;
//! use payslip_core::calculations::{PaySlipCalculator, TaxTable};
//!
//! let table = TaxTable::new(vec![
//!     Bracket::new(dec!(0), Some(dec!(18200)), dec!(0), dec!(0)),
//!     Bracket::new(dec!(18201), Some(dec!(37000)), dec!(0), dec!(0.19)),
//!     Bracket::new(dec!(37001), Some(dec!(80000)), dec!(3572), dec!(0.325)),
//!     Bracket::new(dec!(80001), Some(dec!(180000)), dec!(17547), dec!(0.37)),
//!     Bracket::new(dec!(180001), None, dec!(54547), dec!(0.45)),
//! ])
//! .unwrap();
//!
//! let calculator = PaySlipCalculator::with_tax_table(Arc::new(table));
//!
//! // (3572 + (60050 - 37001) * 0.325) / 12 = 921.91
//! let monthly_tax = calculator.monthly_income_tax_from_annual_salary(dec!(60050)).unwrap();
//! assert_eq!(monthly_tax, dec!(922));
//! ```

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::Bracket;
use crate::calculations::common::{MONTHS_IN_YEAR, round_to_whole_number};
use crate::calculations::tax_table::{TaxTable, TaxTableError};

/// Calculator for monthly income tax on a payslip.
///
/// Holds an optional shared [`TaxTable`]. Bracket-level calculation through
/// [`calculate_monthly_income_tax`](Self::calculate_monthly_income_tax) works
/// without a table; salary-level lookups require one to be loaded.
#[derive(Debug, Clone, Default)]
pub struct PaySlipCalculator {
    tax_table: Option<Arc<TaxTable>>,
}

impl PaySlipCalculator {
    /// Creates a calculator with no tax table loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a calculator backed by the given tax table.
    pub fn with_tax_table(tax_table: Arc<TaxTable>) -> Self {
        Self {
            tax_table: Some(tax_table),
        }
    }

    /// Publishes a fully constructed tax table, replacing any previous one.
    pub fn load_tax_table(
        &mut self,
        tax_table: Arc<TaxTable>,
    ) {
        self.tax_table = Some(tax_table);
    }

    /// Returns the loaded tax table, if any.
    pub fn tax_table(&self) -> Option<&TaxTable> {
        self.tax_table.as_deref()
    }

    /// Resolves the bracket for `annual_salary` in the loaded table.
    ///
    /// # Errors
    ///
    /// Returns [`TaxTableError::NotInitialized`] if no table is loaded, or
    /// [`TaxTableError::BracketNotFound`] if the salary is below every bracket.
    pub fn resolve_bracket(
        &self,
        annual_salary: Decimal,
    ) -> Result<&Bracket, TaxTableError> {
        self.tax_table
            .as_deref()
            .ok_or(TaxTableError::NotInitialized)?
            .resolve_bracket(annual_salary)
    }

    /// Calculates the monthly tax owed on `annual_salary` within `bracket`.
    ///
    /// The bracket is not checked against the salary; callers pass the
    /// bracket resolved for that salary. Arithmetic saturates at the limits
    /// of [`Decimal`].
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use payslip_core::Bracket;
    /// use payslip_core::calculations::PaySlipCalculator;
    ///
    /// let bracket = Bracket::new(dec!(18201), Some(dec!(37000)), dec!(0), dec!(0.19));
    ///
    /// // (25000 - 18201) * 0.19 / 12 = 107.65
    /// let tax = PaySlipCalculator::new().calculate_monthly_income_tax(dec!(25000), &bracket);
    /// assert_eq!(tax, dec!(108));
    /// ```
    pub fn calculate_monthly_income_tax(
        &self,
        annual_salary: Decimal,
        bracket: &Bracket,
    ) -> Decimal {
        let annual_tax = self.annual_income_tax(annual_salary, bracket);
        round_to_whole_number(annual_tax / Decimal::from(MONTHS_IN_YEAR))
    }

    /// Resolves the bracket for `annual_salary` and calculates its monthly tax.
    ///
    /// # Errors
    ///
    /// Propagates the [`TaxTableError`] from bracket resolution.
    pub fn monthly_income_tax_from_annual_salary(
        &self,
        annual_salary: Decimal,
    ) -> Result<Decimal, TaxTableError> {
        let bracket = self.resolve_bracket(annual_salary)?;
        Ok(self.calculate_monthly_income_tax(annual_salary, bracket))
    }

    /// Calculates unrounded annual tax: base tax plus the marginal portion.
    fn annual_income_tax(
        &self,
        annual_salary: Decimal,
        bracket: &Bracket,
    ) -> Decimal {
        let marginal_income = annual_salary.saturating_sub(bracket.min);
        let marginal_tax = marginal_income.saturating_mul(bracket.marginal_rate);
        bracket.base_tax.saturating_add(marginal_tax)
    }
}
