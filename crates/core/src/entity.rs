//! Entity trait: identity that survives renames and regrants.

/// Entity marker + minimal interface.
///
/// Portfolios, modules and access profiles are entities: two values with the
/// same id refer to the same thing even when their names differ.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// Human-readable label (descriptive metadata only).
    fn label(&self) -> &str;
}
