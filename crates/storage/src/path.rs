//! Validation of path names before they are substituted into a format.
//!
//! A path name ends up as literal directories inside the recording root, so it
//! must never be able to climb out of it.

use crate::error::{ErrorKind, Result};
use std::path::{Component, Path};

/// Validates and normalizes a path name for use as `%path`.
///
/// Current-directory components, repeated and trailing separators are dropped,
/// and `..` is resolved as long as it stays inside the name. Rejects names
/// that are empty after normalization, escape upwards, carry a platform
/// prefix, or contain null bytes.
///
/// ```
/// use recstore_storage::validate_path_name;
///
/// assert_eq!(validate_path_name("site//cam1/").unwrap(), "site/cam1");
/// assert_eq!(validate_path_name("site/old/../cam1").unwrap(), "site/cam1");
/// assert!(validate_path_name("../etc").is_err());
/// assert!(validate_path_name("").is_err());
/// ```
pub fn validate(name: &str) -> Result<String> {
    let invalid = || ErrorKind::InvalidPath(name.to_string());
    if name.contains('\0') {
        exn::bail!(invalid());
    }
    let mut components: Vec<&str> = Vec::new();
    for component in Path::new(name).components() {
        match component {
            // Input was a &str, so every component is valid UTF-8.
            Component::Normal(s) => components.push(s.to_str().ok_or_else(invalid)?),
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(invalid()),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(invalid());
                }
            },
        }
    }
    match components.is_empty() {
        true => exn::bail!(invalid()),
        false => Ok(components.join("/")),
    }
}
