pub mod validator;

pub use validator::{FieldIssue, ValidationReport, Validator};
