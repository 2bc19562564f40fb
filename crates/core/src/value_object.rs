//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Derived structures such as capability sets and role sets are value objects:
/// they are rebuilt from a snapshot rather than edited, and two of them built
/// from equal inputs compare equal.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
