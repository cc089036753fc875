//! Common test utilities
//!
//! Shared fixtures and assertion helpers for the integration suites.
//!
//! # Fixtures
//! - [`p5_catalog`] - The documentation subset in `tests/fixtures/p5_subset.json`
//! - [`color_validator`] - A validator with `p5.Color` registered
//!
//! # Assertion Helpers
//! - [`assert_accepts`] - Assert that an argument list validates
//! - [`expect_failure`] - Validate, expecting a [`ValidationFailure`]

#![allow(dead_code)]

use param_validator::{Catalog, Predicate, ValidateError, ValidationFailure, Validator, Value};

/// Raw fixture JSON.
pub const P5_SUBSET: &str = include_str!("../fixtures/p5_subset.json");

/// Loads the fixture catalog, panicking if it does not parse.
pub fn p5_catalog() -> Catalog {
    Catalog::from_json_str(P5_SUBSET).expect("fixture catalog should parse")
}

/// Validator over `catalog` with `p5.Color` registered as an opaque class.
pub fn color_validator(catalog: &Catalog) -> Validator<'_> {
    let mut validator = Validator::new(catalog);
    validator.register_type("p5.Color", Predicate::instance_of("p5.Color"));
    validator
}

/// Numeric argument list.
pub fn numbers(values: &[f64]) -> Vec<Value> {
    values.iter().copied().map(Value::from).collect()
}

/// Assert that `args` are accepted and handed back unchanged.
pub fn assert_accepts(validator: &Validator<'_>, function_id: &str, args: &[Value]) {
    match validator.validate(function_id, args) {
        Ok(returned) => assert_eq!(returned, args, "{function_id} should return its arguments"),
        Err(err) => panic!("{function_id}({}) should validate, got: {err}", render(args)),
    }
}

/// Validate `args`, expecting a failure, and return its details.
pub fn expect_failure(
    validator: &Validator<'_>,
    function_id: &str,
    args: &[Value],
) -> ValidationFailure {
    match validator.validate(function_id, args) {
        Ok(_) => panic!("{function_id}({}) should have been rejected", render(args)),
        Err(ValidateError::Validation(failure)) => failure,
        Err(other) => panic!("expected a validation failure, got: {other}"),
    }
}

/// Render an argument list for assertion messages.
pub fn render(args: &[Value]) -> String {
    args.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
