//! Static checks on generated test code

pub mod python;

pub use python::PythonSyntaxValidator;

use crate::model::ValidationVerdict;

/// Judges candidate test code before it is executed
///
/// Validation never fails: problems the validator itself hits are reported
/// as a rejecting verdict.
pub trait LintValidator: Send + Sync {
    fn validate(&self, code: &str) -> ValidationVerdict;
}
