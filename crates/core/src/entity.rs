//! Entity trait: identity + continuity across state changes.

use uuid::Uuid;

/// Entity marker + minimal interface.
///
/// The id is opaque, assigned at creation, and immutable thereafter; the
/// natural key that drives duplicate detection lives with the storage
/// contract, not here.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy
        + Eq
        + core::hash::Hash
        + core::fmt::Debug
        + core::fmt::Display
        + From<Uuid>
        + Into<Uuid>
        + Send
        + Sync
        + 'static;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;

    /// Canonical display path for the entity, used as a redirect target.
    fn path(&self) -> String;
}
