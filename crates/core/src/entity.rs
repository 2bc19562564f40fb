//! Entity trait: identity across record refetches.

/// Entity marker + minimal interface.
///
/// Records fetched from the backend keep their identity across snapshots even
/// when their other fields change; derived views key on this identity.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
