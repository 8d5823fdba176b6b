//! Process-wide, read-only lookup from code to descriptor.
//!
//! Middleware that only has a code (from a downstream service response, a
//! stored audit record) resolves it back to the descriptor here. The
//! authentication catalog's registry is built once on first access and never
//! mutated afterwards, so concurrent readers need no synchronization beyond
//! the one-time initialization.
//!
//! ```rust
//! use authn_errors::{authn_registry, Classification};
//!
//! let registry = authn_registry().expect("catalog codes are unique");
//! let descriptor = registry.get("auth.identity.unsupported").unwrap();
//! assert_eq!(descriptor.classification(), Classification::NotImplemented);
//! ```

use crate::{definitions, Descriptor};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// Registry construction failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Two descriptors share a code.
    DuplicateCode {
        /// The code that appeared twice.
        code: &'static str,
    },
}

impl RegistryError {
    /// Generic message safe for untrusted boundaries.
    pub fn to_public(&self) -> &'static str {
        match self {
            Self::DuplicateCode { .. } => "Invalid error catalog",
        }
    }
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateCode { code } => {
                write!(f, "Error code '{}' is defined more than once", code)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Immutable code → descriptor map.
#[derive(Debug)]
pub struct Registry {
    by_code: HashMap<&'static str, &'static Descriptor>,
    ordered: Vec<&'static Descriptor>,
}

impl Registry {
    /// Build a registry, rejecting duplicate codes.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateCode`] for the first code seen twice.
    pub fn new<I>(descriptors: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = &'static Descriptor>,
    {
        let descriptors = descriptors.into_iter();
        let mut by_code = HashMap::with_capacity(descriptors.size_hint().0);
        let mut ordered = Vec::with_capacity(descriptors.size_hint().0);

        for descriptor in descriptors {
            let code = descriptor.code().as_str();
            if by_code.insert(code, descriptor).is_some() {
                return Err(RegistryError::DuplicateCode { code });
            }
            ordered.push(descriptor);
        }

        Ok(Self { by_code, ordered })
    }

    /// Descriptor registered under `code`.
    #[inline]
    pub fn get(&self, code: &str) -> Option<&'static Descriptor> {
        self.by_code.get(code).copied()
    }

    /// Whether `code` is registered.
    #[inline]
    pub fn contains(&self, code: &str) -> bool {
        self.by_code.contains_key(code)
    }

    /// Number of descriptors.
    #[inline]
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Whether the registry is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &'static Descriptor> + '_ {
        self.ordered.iter().copied()
    }
}

static AUTHN_REGISTRY: OnceLock<Result<Registry, RegistryError>> = OnceLock::new();

/// Registry of the authentication catalog.
///
/// Built on first call; later calls return the same result.
pub fn authn_registry() -> Result<&'static Registry, RegistryError> {
    AUTHN_REGISTRY
        .get_or_init(|| Registry::new(definitions::ALL.iter().copied()))
        .as_ref()
        .map_err(Clone::clone)
}
