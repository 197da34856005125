// Assertion module - response extraction and validation

pub mod extract;
pub mod predicate;
pub mod validator;

pub use extract::{ExtractError, ExtractionResult, ItemSource, extract};
pub use predicate::{FieldMatches, FieldPrefix, ItemPredicate, Violation};
pub use validator::{CheckResult, ResponseValidator, StatusExpectation, ValidationError};
