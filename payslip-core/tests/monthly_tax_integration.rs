//! Integration tests for monthly tax withholding against the resident tax rates.

use std::sync::{Arc, Once};
use std::thread;

use payslip_core::{Bracket, PaySlipCalculator, TaxTable, TaxTableError};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const RESIDENT_TAX_RATES_CSV: &str = include_str!("../test-data/resident_tax_rates.csv");

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("payslip_core=debug")
            .with_test_writer()
            .try_init();
    });
}

fn load_tax_table(csv_data: &str) -> anyhow::Result<TaxTable> {
    let mut reader = csv::Reader::from_reader(csv_data.as_bytes());
    let brackets = reader
        .deserialize()
        .collect::<Result<Vec<Bracket>, csv::Error>>()?;

    Ok(TaxTable::new(brackets)?)
}

fn resident_calculator() -> PaySlipCalculator {
    init_tracing();

    let table = load_tax_table(RESIDENT_TAX_RATES_CSV).expect("Failed to load resident tax rates");
    PaySlipCalculator::with_tax_table(Arc::new(table))
}

const REFERENCE_CASES: [(Decimal, Decimal); 8] = [
    (dec!(17995), dec!(0)),
    (dec!(18200), dec!(0)),
    (dec!(18235), dec!(1)),
    (dec!(25000), dec!(108)),
    (dec!(60050), dec!(922)),
    (dec!(85000), dec!(1616)),
    (dec!(120000), dec!(2696)),
    (dec!(190000), dec!(4921)),
];

#[test]
fn test_load_resident_tax_rates() {
    let table = load_tax_table(RESIDENT_TAX_RATES_CSV).expect("Failed to load resident tax rates");

    assert_eq!(table.len(), 5);
    assert_eq!(
        table.brackets()[4],
        Bracket::new(dec!(180001), None, dec!(54547), dec!(0.45))
    );
}

#[test]
fn test_monthly_tax_matches_reference_values() {
    let calculator = resident_calculator();

    for (annual_salary, expected) in REFERENCE_CASES {
        let monthly_tax = calculator
            .monthly_income_tax_from_annual_salary(annual_salary)
            .expect("Failed to calculate monthly tax");

        assert_eq!(monthly_tax, expected, "annual salary {annual_salary}");
    }
}

#[test]
fn test_resolve_then_calculate_matches_reference_values() {
    let calculator = resident_calculator();

    for (annual_salary, expected) in REFERENCE_CASES {
        let bracket = calculator
            .resolve_bracket(annual_salary)
            .expect("Failed to resolve bracket");

        assert!(bracket.contains(annual_salary), "{annual_salary} not in {bracket:?}");
        assert_eq!(calculator.calculate_monthly_income_tax(annual_salary, bracket), expected);
    }
}

#[test]
fn test_resolved_bracket_has_greatest_lower_bound() {
    let calculator = resident_calculator();
    let table = calculator.tax_table().expect("Tax table should be loaded");

    for salary in [dec!(0), dec!(18200.99), dec!(37001), dec!(79999.50), dec!(180001), dec!(5000000)] {
        let bracket = table.resolve_bracket(salary).expect("Failed to resolve bracket");
        let expected = table
            .iter()
            .filter(|b| b.min <= salary)
            .max_by_key(|b| b.min)
            .expect("Some bracket should start below salary");

        assert_eq!(bracket, expected);
    }
}

#[test]
fn test_negative_salary_is_not_found() {
    let calculator = resident_calculator();

    let result = calculator.monthly_income_tax_from_annual_salary(dec!(-1));

    assert_eq!(result, Err(TaxTableError::BracketNotFound(dec!(-1))));
}

#[test]
fn test_single_bracket_table_rejects_lower_salaries() {
    init_tracing();

    let csv_data = "min,max,base_tax,marginal_rate\n80001,180000,17547,0.37\n";
    let table = load_tax_table(csv_data).expect("Failed to load single bracket");
    let calculator = PaySlipCalculator::with_tax_table(Arc::new(table));

    for salary in [dec!(-1), dec!(17995), dec!(60050)] {
        assert_eq!(
            calculator.resolve_bracket(salary),
            Err(TaxTableError::BracketNotFound(salary))
        );
    }
}

#[test]
fn test_empty_csv_is_not_initialized() {
    let error = load_tax_table("min,max,base_tax,marginal_rate\n").unwrap_err();

    assert_eq!(
        error.downcast_ref::<TaxTableError>(),
        Some(&TaxTableError::NotInitialized)
    );
}

#[test]
fn test_csv_with_gap_is_rejected() {
    let csv_data = "min,max,base_tax,marginal_rate\n0,18200,0,0\n20001,,0,0.19\n";

    let error = load_tax_table(csv_data).unwrap_err();

    assert_eq!(
        error.downcast_ref::<TaxTableError>(),
        Some(&TaxTableError::Gap {
            previous_max: dec!(18200),
            min: dec!(20001),
        })
    );
}

#[test]
fn test_shared_table_across_threads() {
    let calculator = Arc::new(resident_calculator());

    let handles: Vec<_> = REFERENCE_CASES
        .into_iter()
        .map(|(annual_salary, expected)| {
            let calculator = Arc::clone(&calculator);
            thread::spawn(move || {
                let monthly_tax = calculator
                    .monthly_income_tax_from_annual_salary(annual_salary)
                    .expect("Failed to calculate monthly tax");
                (monthly_tax, expected)
            })
        })
        .collect();

    for handle in handles {
        let (monthly_tax, expected) = handle.join().expect("Calculation thread panicked");
        assert_eq!(monthly_tax, expected);
    }
}
