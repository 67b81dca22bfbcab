//! # Validation module
//!
//! This module provide the [`Validate`] trait implemented by custom resources
//! to check the invariants that could not be expressed by the openapi schema.

// -----------------------------------------------------------------------------
// Constants

pub const DNS_SUBDOMAIN_MAX_LENGTH: usize = 253;

// -----------------------------------------------------------------------------
// FieldError enumeration

#[derive(thiserror::Error, PartialEq, Eq, Clone, Debug)]
pub enum FieldError {
    #[error("field '{0}' must not be empty")]
    Empty(&'static str),
    #[error("field '{0}' has value '{1}' which is not a valid dns subdomain name")]
    InvalidName(&'static str, String),
    #[error("one of the fields '{0}' or '{1}' must be set")]
    OneOf(&'static str, &'static str),
}

// -----------------------------------------------------------------------------
// Error enumeration

#[derive(thiserror::Error, PartialEq, Eq, Clone, Debug)]
pub enum Error {
    #[error("invalid fields, {}", join(.0))]
    Fields(Vec<FieldError>),
}

fn join(errs: &[FieldError]) -> String {
    errs.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<Vec<FieldError>> for Error {
    fn from(errs: Vec<FieldError>) -> Self {
        Self::Fields(errs)
    }
}

// -----------------------------------------------------------------------------
// Validate trait

/// check invariants of a resource that the schema could not enforce
pub trait Validate {
    /// returns all field errors of the resource, empty if it is valid
    fn errors(&self) -> Vec<FieldError>;

    /// returns an [`Error`] aggregating all field errors, if any
    fn validate(&self) -> Result<(), Error> {
        let errs = self.errors();
        if errs.is_empty() {
            return Ok(());
        }

        Err(Error::from(errs))
    }
}

// -----------------------------------------------------------------------------
// Helper functions

/// returns if the value is empty or only made of whitespaces
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// push an [`FieldError::Empty`] into errs, if value is blank
pub fn non_empty(errs: &mut Vec<FieldError>, field: &'static str, value: &str) {
    if is_blank(value) {
        errs.push(FieldError::Empty(field));
    }
}

/// returns if the value is a dns subdomain name as defined in rfc 1123, which
/// is the format expected for the name of most kubernetes objects
pub fn is_dns_subdomain(value: &str) -> bool {
    if value.is_empty() || value.len() > DNS_SUBDOMAIN_MAX_LENGTH {
        return false;
    }

    value.split('.').all(|label| {
        !label.is_empty()
            && label
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
            && !label.starts_with('-')
            && !label.ends_with('-')
    })
}

/// push an [`FieldError`] into errs, if value is not a dns subdomain name
pub fn dns_subdomain(errs: &mut Vec<FieldError>, field: &'static str, value: &str) {
    if value.is_empty() {
        errs.push(FieldError::Empty(field));
    } else if !is_dns_subdomain(value) {
        errs.push(FieldError::InvalidName(field, value.to_string()));
    }
}
