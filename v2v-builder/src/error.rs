//! Error types for the translation engine.

use thiserror::Error;

use crate::traits::{Kind, Ref};

/// Errors returned by the inventory and provisioner-catalog collaborators.
#[derive(Error, Debug)]
pub enum LookupError {
    /// No entity of the requested kind matched the reference.
    #[error("{kind} not found: {reference}")]
    NotFound { kind: Kind, reference: Ref },

    /// The entity exists but could not be decoded into the requested type.
    #[error("Failed to decode {kind} ({reference}): {source}")]
    Decode {
        kind: Kind,
        reference: Ref,
        #[source]
        source: serde_json::Error,
    },

    /// The inventory could not be reached.
    #[error("Inventory transport failed: {0}")]
    Transport(String),
}

/// Errors that abort a VM build.
#[derive(Error, Debug)]
pub enum BuildError {
    /// A referenced entity could not be fetched.
    #[error("{kind} lookup failed ({reference})")]
    Lookup {
        kind: Kind,
        reference: Ref,
        #[source]
        source: LookupError,
    },

    /// Provisioner capability records could not be listed.
    #[error("Failed to load provisioners in namespace '{namespace}'")]
    Catalog {
        namespace: String,
        #[source]
        source: LookupError,
    },
}

impl BuildError {
    /// Wrap a lookup failure with the kind and reference that produced it.
    pub fn lookup(kind: Kind, reference: &Ref, source: LookupError) -> Self {
        Self::Lookup {
            kind,
            reference: reference.clone(),
            source,
        }
    }
}

/// Result type alias for builder operations.
pub type Result<T> = std::result::Result<T, BuildError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_lookup_error_keeps_cause() {
        let reference = Ref::with_id("vm-1");
        let cause = LookupError::NotFound {
            kind: Kind::Vm,
            reference: reference.clone(),
        };
        let err = BuildError::lookup(Kind::Vm, &reference, cause);

        assert_eq!(err.to_string(), "vm lookup failed (id=vm-1)");
        let source = err.source().expect("cause preserved");
        assert_eq!(source.to_string(), "vm not found: id=vm-1");
    }
}
