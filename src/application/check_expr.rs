//! Tag expression checking use case

use crate::domain::tags::{TagExpr, ValidationErrors};
use crate::error::{Result, SynergyError};

/// Outcome of checking one expression
#[derive(Debug, Clone, PartialEq)]
pub struct ExprCheck {
    pub input: String,
    pub result: std::result::Result<TagExpr, ValidationErrors>,
}

impl ExprCheck {
    pub fn is_valid(&self) -> bool {
        self.result.is_ok()
    }
}

/// Check every expression independently
pub fn check_expressions<S: AsRef<str>>(inputs: &[S]) -> Vec<ExprCheck> {
    inputs
        .iter()
        .map(|input| ExprCheck {
            input: input.as_ref().to_string(),
            result: TagExpr::parse(input.as_ref()),
        })
        .collect()
}

/// The first failed check as an error
pub fn first_failure(checks: &[ExprCheck]) -> Result<()> {
    match checks.iter().find_map(|c| c.result.as_ref().err().map(|e| (c, e))) {
        Some((check, errors)) => Err(SynergyError::InvalidExpression {
            input: check.input.clone(),
            errors: errors.messages().to_vec(),
        }),
        None => Ok(()),
    }
}
