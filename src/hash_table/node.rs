use crate::ebr::Link;

/// [`Node`] is a single version of a key-value pair in a bucket chain.
///
/// The key and the value never change after construction; only the link to the next node is
/// updated, and its [`Tag`](crate::ebr::Tag) marks the node as logically removed.
pub(super) struct Node<K, V> {
    key: K,
    value: V,
    next: Link<Node<K, V>>,
}

impl<K, V> Node<K, V> {
    /// Creates a new unlinked [`Node`].
    #[inline]
    pub(super) fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            next: Link::null(),
        }
    }

    #[inline]
    pub(super) fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub(super) fn value(&self) -> &V {
        &self.value
    }

    /// Returns a reference to the link to the next node.
    #[inline]
    pub(super) fn next(&self) -> &Link<Node<K, V>> {
        &self.next
    }

    #[inline]
    pub(super) fn next_mut(&mut self) -> &mut Link<Node<K, V>> {
        &mut self.next
    }
}
