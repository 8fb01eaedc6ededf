//! Service layer for client-side business logic.
//!
//! Holds the pure logic the frontend drives directly: validating a schedule
//! draft before it is submitted to the persistence layer.

pub mod validation;

pub use validation::{
    field_errors, first_field_error, group_errors_by_field, validate_draft, DraftValidation,
    ValidationError,
};
