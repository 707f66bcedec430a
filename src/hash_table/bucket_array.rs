use super::node::Node;
use crate::ebr::Link;

use std::ptr::NonNull;

/// [`BucketArray`] is a fixed-size array of chain heads.
pub(super) struct BucketArray<K, V> {
    buckets: Box<[Link<Node<K, V>>]>,
}

impl<K, V> BucketArray<K, V> {
    /// Creates a new [`BucketArray`].
    ///
    /// The length of the array is the smallest power of two that is equal to or greater than
    /// `bucket_count`.
    pub(super) fn new(bucket_count: usize) -> Self {
        let array_len = bucket_count
            .min(1_usize << (usize::BITS - 1))
            .next_power_of_two();
        Self {
            buckets: (0..array_len).map(|_| Link::null()).collect(),
        }
    }

    /// Returns the number of buckets.
    #[inline]
    pub(super) fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the bucket index for the hash value.
    #[allow(clippy::cast_possible_truncation)]
    #[inline]
    pub(super) fn index(&self, hash: u64) -> usize {
        (hash as usize) & (self.buckets.len() - 1)
    }

    /// Returns the head of the chain for the hash value.
    #[inline]
    pub(super) fn bucket(&self, hash: u64) -> &Link<Node<K, V>> {
        &self.buckets[self.index(hash)]
    }
}

impl<K, V> Drop for BucketArray<K, V> {
    fn drop(&mut self) {
        // Logically removed entries that are still linked are freed here as they were never
        // retired.
        for bucket in self.buckets.iter_mut() {
            let mut current = bucket.unprotected_mut();
            while let Some(node_ptr) = NonNull::new(current) {
                let mut node = unsafe { Box::from_raw(node_ptr.as_ptr()) };
                current = node.next_mut().unprotected_mut();
            }
        }
    }
}
