use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One marginal tax band of a bracket table.
///
/// Tax owed for a salary inside the band is `base_tax` plus `marginal_rate`
/// applied to the amount above `min`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    /// Inclusive lower bound of the annual salary range.
    pub min: Decimal,

    /// Inclusive upper bound of the annual salary range.
    ///
    /// `None` marks the top bracket, which has no upper bound. Blank values
    /// in textual sources deserialize to `None`.
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub max: Option<Decimal>,

    /// Cumulative tax owed at `min`.
    pub base_tax: Decimal,

    /// Fraction applied to the salary above `min` (e.g. 0.19 for 19%).
    pub marginal_rate: Decimal,
}

impl Bracket {
    /// Creates a bracket.
    ///
    /// # Arguments
    ///
    /// * `min` - Inclusive lower bound of the annual salary range
    /// * `max` - Inclusive upper bound, or `None` for the top bracket
    /// * `base_tax` - Tax owed at `min`
    /// * `marginal_rate` - Fraction applied to the salary above `min`
    pub fn new(
        min: Decimal,
        max: Option<Decimal>,
        base_tax: Decimal,
        marginal_rate: Decimal,
    ) -> Self {
        Self {
            min,
            max,
            base_tax,
            marginal_rate,
        }
    }

    /// Returns `true` if `annual_salary` lies within `[min, max]`.
    pub fn contains(
        &self,
        annual_salary: Decimal,
    ) -> bool {
        self.min <= annual_salary && self.max.is_none_or(|max| annual_salary <= max)
    }

    /// Returns `true` for the top bracket, which has no upper bound.
    pub fn is_unbounded(&self) -> bool {
        self.max.is_none()
    }
}

/// An upper bound as written in the source: a number, or text that may be blank.
#[derive(Deserialize)]
#[serde(untagged)]
enum UpperBound {
    Amount(Decimal),
    Text(String),
}

/// Reads an optional upper bound, treating `null` and blank text as unbounded.
fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<UpperBound>::deserialize(deserializer)? {
        None => Ok(None),
        Some(UpperBound::Amount(amount)) => Ok(Some(amount)),
        Some(UpperBound::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(UpperBound::Text(text)) => text
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
