//! Progressive tax bracket table and bracket resolution.
//!
//! A [`TaxTable`] is an ordered, validated sequence of [`Bracket`]s. It is
//! built once, never mutated, and shared read-only between calculators.
//!
//! # Validation
//!
//! [`TaxTable::new`] rejects malformed input up front:
//!
//! | Check | Error |
//! |-------|-------|
//! | at least one bracket | [`TaxTableError::NotInitialized`] |
//! | `min >= 0` | [`TaxTableError::NegativeLowerBound`] |
//! | `max >= min` | [`TaxTableError::InvalidRange`] |
//! | `base_tax >= 0` | [`TaxTableError::NegativeBaseTax`] |
//! | `0 <= marginal_rate <= 1` | [`TaxTableError::InvalidMarginalRate`] |
//! | `min` strictly ascending | [`TaxTableError::OutOfOrder`] |
//! | only the last bracket is unbounded | [`TaxTableError::UnboundedBeforeLast`] |
//! | next `min` above previous `max` | [`TaxTableError::Overlap`] |
//! | next `min` at most one unit above previous `max` | [`TaxTableError::Gap`] |
//! | `base_tax` covers tax owed at previous `max` | [`TaxTableError::BaseTaxBelowAccumulated`] |
//!
//! Ordering is checked across the whole table before ranges are compared.
//!
//! Tables are stated in whole currency units, so a bracket ending at `18200`
//! followed by one starting at `18201` is contiguous.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use payslip_core::Bracket;
//! use payslip_core::calculations::TaxTable;
//!
//! let table = TaxTable::new(vec![
//!     Bracket::new(dec!(0), Some(dec!(18200)), dec!(0), dec!(0)),
//!     Bracket::new(dec!(18201), Some(dec!(37000)), dec!(0), dec!(0.19)),
//!     Bracket::new(dec!(37001), None, dec!(3572), dec!(0.325)),
//! ])
//! .unwrap();
//!
//! let bracket = table.resolve_bracket(dec!(25000)).unwrap();
//! assert_eq!(bracket.min, dec!(18201));
//! ```

use std::slice;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::Bracket;

/// Errors raised while building a tax table or resolving a bracket.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxTableError {
    /// No bracket table has been supplied.
    #[error("tax table is empty or has not been loaded")]
    NotInitialized,

    /// The salary is below the lower bound of every bracket.
    #[error("no tax bracket found for annual salary {0}")]
    BracketNotFound(Decimal),

    /// A bracket starts below zero.
    #[error("bracket lower bound must be non-negative, got {0}")]
    NegativeLowerBound(Decimal),

    /// A bracket ends before it starts.
    #[error("bracket upper bound {max} is below its lower bound {min}")]
    InvalidRange { min: Decimal, max: Decimal },

    /// A bracket carries a negative base tax.
    #[error("base tax must be non-negative, got {0}")]
    NegativeBaseTax(Decimal),

    /// A marginal rate lies outside `[0, 1]`.
    #[error("marginal rate must be between 0 and 1, got {0}")]
    InvalidMarginalRate(Decimal),

    /// Brackets are not strictly ascending by lower bound.
    #[error("bracket starting at {current} does not follow bracket starting at {previous}")]
    OutOfOrder { previous: Decimal, current: Decimal },

    /// An unbounded bracket is followed by another bracket.
    #[error("unbounded bracket starting at {0} must be the last bracket")]
    UnboundedBeforeLast(Decimal),

    /// A bracket starts inside the range of the previous one.
    #[error("bracket starting at {min} overlaps previous bracket ending at {previous_max}")]
    Overlap { previous_max: Decimal, min: Decimal },

    /// Salaries between two adjacent brackets are not covered.
    #[error("gap between bracket ending at {previous_max} and bracket starting at {min}")]
    Gap { previous_max: Decimal, min: Decimal },

    /// A bracket's base tax is lower than the tax owed at the top of the
    /// previous bracket, so tax would drop as salary rises.
    #[error(
        "base tax {base_tax} of bracket starting at {min} is below accumulated tax {accumulated}"
    )]
    BaseTaxBelowAccumulated {
        min: Decimal,
        base_tax: Decimal,
        accumulated: Decimal,
    },
}

/// An immutable, ordered table of marginal tax brackets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Bracket>", into = "Vec<Bracket>")]
pub struct TaxTable {
    brackets: Vec<Bracket>,
}

impl TaxTable {
    /// Builds a table from brackets ordered ascending by `min`.
    ///
    /// # Errors
    ///
    /// Returns [`TaxTableError::NotInitialized`] for an empty bracket list,
    /// or one of the validation errors listed in the module documentation.
    pub fn new(brackets: Vec<Bracket>) -> Result<Self, TaxTableError> {
        if brackets.is_empty() {
            return Err(TaxTableError::NotInitialized);
        }

        for bracket in &brackets {
            validate_bracket(bracket)?;
        }

        for pair in brackets.windows(2) {
            validate_order(&pair[0], &pair[1])?;
        }

        for pair in brackets.windows(2) {
            validate_adjacent(&pair[0], &pair[1])?;
        }

        debug!(brackets = brackets.len(), "Tax table constructed");

        Ok(Self { brackets })
    }

    /// Finds the bracket that applies to `annual_salary`.
    ///
    /// Selects the last bracket whose `min` does not exceed the salary. Only
    /// lower bounds are consulted; contiguity is guaranteed by construction.
    ///
    /// # Errors
    ///
    /// Returns [`TaxTableError::BracketNotFound`] if the salary is below the
    /// lowest bracket.
    pub fn resolve_bracket(
        &self,
        annual_salary: Decimal,
    ) -> Result<&Bracket, TaxTableError> {
        let Some(bracket) = self.brackets.iter().rev().find(|b| b.min <= annual_salary) else {
            warn!(
                annual_salary = %annual_salary,
                "Annual salary is below the lowest tax bracket"
            );
            return Err(TaxTableError::BracketNotFound(annual_salary));
        };

        debug!(
            annual_salary = %annual_salary,
            bracket_min = %bracket.min,
            "Resolved tax bracket"
        );

        Ok(bracket)
    }

    /// Returns the brackets in ascending order of `min`.
    pub fn brackets(&self) -> &[Bracket] {
        &self.brackets
    }

    /// Returns an iterator over the brackets in ascending order of `min`.
    pub fn iter(&self) -> slice::Iter<'_, Bracket> {
        self.brackets.iter()
    }

    /// Returns the number of brackets in the table.
    ///
    /// # Examples
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use payslip_core::{Bracket, TaxTable};
    ///
    /// let table = TaxTable::new(vec![Bracket::new(dec!(0), None, dec!(0), dec!(0.10))]).unwrap();
    ///
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.brackets.len()
    }

    /// Always `false`; an empty table cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.brackets.is_empty()
    }
}

impl TryFrom<Vec<Bracket>> for TaxTable {
    type Error = TaxTableError;

    fn try_from(brackets: Vec<Bracket>) -> Result<Self, Self::Error> {
        Self::new(brackets)
    }
}

impl From<TaxTable> for Vec<Bracket> {
    fn from(table: TaxTable) -> Self {
        table.brackets
    }
}

impl<'a> IntoIterator for &'a TaxTable {
    type Item = &'a Bracket;
    type IntoIter = slice::Iter<'a, Bracket>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn validate_bracket(bracket: &Bracket) -> Result<(), TaxTableError> {
    if bracket.min < Decimal::ZERO {
        return Err(TaxTableError::NegativeLowerBound(bracket.min));
    }
    if let Some(max) = bracket.max.filter(|max| *max < bracket.min) {
        return Err(TaxTableError::InvalidRange {
            min: bracket.min,
            max,
        });
    }
    if bracket.base_tax < Decimal::ZERO {
        return Err(TaxTableError::NegativeBaseTax(bracket.base_tax));
    }
    if bracket.marginal_rate < Decimal::ZERO || bracket.marginal_rate > Decimal::ONE {
        return Err(TaxTableError::InvalidMarginalRate(bracket.marginal_rate));
    }
    Ok(())
}

fn validate_order(
    previous: &Bracket,
    current: &Bracket,
) -> Result<(), TaxTableError> {
    if current.min <= previous.min {
        return Err(TaxTableError::OutOfOrder {
            previous: previous.min,
            current: current.min,
        });
    }
    Ok(())
}

fn validate_adjacent(
    previous: &Bracket,
    current: &Bracket,
) -> Result<(), TaxTableError> {
    let Some(previous_max) = previous.max else {
        return Err(TaxTableError::UnboundedBeforeLast(previous.min));
    };

    if current.min <= previous_max {
        return Err(TaxTableError::Overlap {
            previous_max,
            min: current.min,
        });
    }
    if current.min - previous_max > Decimal::ONE {
        return Err(TaxTableError::Gap {
            previous_max,
            min: current.min,
        });
    }

    let accumulated = previous_max
        .saturating_sub(previous.min)
        .saturating_mul(previous.marginal_rate)
        .saturating_add(previous.base_tax);
    if current.base_tax < accumulated {
        return Err(TaxTableError::BaseTaxBelowAccumulated {
            min: current.min,
            base_tax: current.base_tax,
            accumulated,
        });
    }
    Ok(())
}
