// ABOUTME: Opaque CDN identifiers tagged with a phantom kind.
// ABOUTME: A distribution ID and an invalidation ID cannot be passed for one another.

use serde::{Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;

/// What an [`Id`] refers to. Only used at the type level.
pub trait IdKind {
    /// Name used in debug output and parse errors.
    const LABEL: &'static str;
}

pub enum Distribution {}
pub enum Invalidation {}

impl IdKind for Distribution {
    const LABEL: &'static str = "DistributionId";
}

impl IdKind for Invalidation {
    const LABEL: &'static str = "InvalidationId";
}

/// An identifier issued by the CDN service.
///
/// The value is opaque. `new` accepts anything the service handed back;
/// `FromStr`, used for configured values, trims and rejects blank input.
#[must_use = "IDs reference resources and should not be ignored"]
pub struct Id<K: IdKind> {
    value: String,
    kind: PhantomData<fn() -> K>,
}

impl<K: IdKind> Id<K> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_inner(self) -> String {
        self.value
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{label} cannot be empty")]
pub struct EmptyIdError {
    label: &'static str,
}

impl<K: IdKind> FromStr for Id<K> {
    type Err = EmptyIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(EmptyIdError { label: K::LABEL });
        }
        Ok(Self::new(trimmed))
    }
}

impl<K: IdKind> fmt::Debug for Id<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple(K::LABEL).field(&self.value).finish()
    }
}

impl<K: IdKind> fmt::Display for Id<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<K: IdKind> Clone for Id<K> {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl<K: IdKind> PartialEq for Id<K> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<K: IdKind> Eq for Id<K> {}

impl<K: IdKind> Hash for Id<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<K: IdKind> Serialize for Id<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

pub type DistributionId = Id<Distribution>;
pub type InvalidationId = Id<Invalidation>;
