//! Identity of stored records.

/// A record addressed by a key in storage.
///
/// Orders and goods are keyed by their own id, order lines by the
/// `(order_id, good_id)` pair.
pub trait Entity {
    /// Storage key. Small and `Copy` for every record in this system.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;

    /// Owned key, for use as a map key.
    fn key(&self) -> Self::Id {
        *self.id()
    }
}
