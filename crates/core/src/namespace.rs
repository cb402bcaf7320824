//! Namespace name validation
//!
//! A namespace is an independently creatable ordered key space inside one
//! store file. Names are UTF-8 strings with these rules:
//! - Names must not be empty
//! - Names must not contain NUL bytes (\0)
//! - Names must not start with the reserved prefix `__`
//! - Names must not exceed [`MAX_NAMESPACE_LEN`] bytes

use crate::error::{Error, Result};

/// Prefix reserved for internal tables (sequence counters)
pub const RESERVED_PREFIX: &str = "__";

/// Maximum namespace name length in bytes
pub const MAX_NAMESPACE_LEN: usize = 255;

/// Validate a caller-supplied namespace name
///
/// ```
/// use burrow_core::namespace::validate_namespace;
///
/// assert!(validate_namespace("Users").is_ok());
/// assert!(validate_namespace("").is_err());
/// assert!(validate_namespace("__sequences").is_err());
/// ```
pub fn validate_namespace(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidInput("namespace name is empty".to_string()));
    }
    if name.contains('\0') {
        return Err(Error::InvalidInput(format!(
            "namespace name {:?} contains a NUL byte",
            name
        )));
    }
    if name.starts_with(RESERVED_PREFIX) {
        return Err(Error::InvalidInput(format!(
            "namespace name {:?} uses the reserved prefix {:?}",
            name, RESERVED_PREFIX
        )));
    }
    if name.len() > MAX_NAMESPACE_LEN {
        return Err(Error::InvalidInput(format!(
            "namespace name is {} bytes, max is {}",
            name.len(),
            MAX_NAMESPACE_LEN
        )));
    }
    Ok(())
}

/// True for names the storage layer keeps for itself
pub fn is_reserved(name: &str) -> bool {
    name.starts_with(RESERVED_PREFIX)
}
