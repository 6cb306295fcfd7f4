//! Parameter validation gate shared by every controller operation.

use std::fmt;

use crate::Error;

/// Controller operations, as named in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Get,
    Fetch,
    Create,
    Update,
    Patch,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Get => "get",
            Operation::Fetch => "fetch",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Patch => "patch",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check the collection, then each `(param, present)` pair in order.
///
/// The first failing check wins, so callers list parameters in the order
/// they should be reported.
pub(crate) fn validate(collection: &str, operation: Operation, checks: &[(&'static str, bool)]) -> Result<(), Error> {
    if collection.is_empty() {
        return Err(Error::MissingCollection { operation });
    }

    if let Some((param, _)) = checks.iter().find(|(_, present)| !present) {
        return Err(Error::InvalidParameter { operation, param, collection: collection.to_string() });
    }

    Ok(())
}

/// Like [`validate`] for a single parameter whose validated form is needed
/// afterwards: `None` is reported as missing `param`.
pub(crate) fn require<T>(
    collection: &str, operation: Operation, param: &'static str, value: Option<T>,
) -> Result<T, Error> {
    validate(collection, operation, &[])?;
    value.ok_or_else(|| Error::InvalidParameter { operation, param, collection: collection.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_collection_checked_first() {
        let result = validate("", Operation::Get, &[("id", false)]);
        assert!(matches!(result, Err(Error::MissingCollection { operation: Operation::Get })));
    }

    #[test]
    fn test_first_missing_param_reported() {
        let result = validate("users", Operation::Patch, &[("id", true), ("prop", false), ("value", false)]);
        assert!(matches!(result, Err(Error::InvalidParameter { param: "prop", .. })));
    }

    #[test]
    fn test_all_present() {
        assert!(validate("users", Operation::Delete, &[("id", true)]).is_ok());
        assert!(validate("users", Operation::Fetch, &[]).is_ok());
    }

    #[test]
    fn test_require_returns_value() {
        assert_eq!(require("users", Operation::Update, "doc", Some(3)).unwrap(), 3);

        let result = require::<u8>("users", Operation::Update, "doc", None);
        assert!(matches!(result, Err(Error::InvalidParameter { param: "doc", operation: Operation::Update, .. })));

        let result = require("", Operation::Update, "doc", Some(3));
        assert!(matches!(result, Err(Error::MissingCollection { .. })));
    }

    #[test]
    fn test_operation_names() {
        assert_eq!(Operation::Create.to_string(), "create");
        assert_eq!(Operation::Delete.as_str(), "delete");
    }
}
