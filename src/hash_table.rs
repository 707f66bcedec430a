//! [`HashTable`] is a lock-free concurrent hash table with a fixed number of buckets.

mod bucket_array;
mod node;

use bucket_array::BucketArray;
use node::Node;

use super::atomic::Ordering::{AcqRel, Acquire, Release};
use super::ebr::{Collector, Guard, Link, Owned, Ptr, Tag};
use super::Equivalent;
use std::collections::hash_map::RandomState;
use std::fmt::{self, Debug};
use std::hash::{BuildHasher, Hash};

/// The number of buckets of a [`HashTable`] created by [`HashTable::new`].
pub const DEFAULT_BUCKET_COUNT: usize = 1 << 20;

/// Lock-free concurrent hash table.
///
/// [`HashTable`] is an array of a fixed number of buckets where each bucket is the head of a
/// singly linked chain of entries. Entries are inserted, looked up, and removed without any
/// locks; every structural modification is a single compare-and-swap on a link.
///
/// ## Multi-version chains
///
/// [`HashTable::put`] never looks for an existing entry with the same key; it pushes a new entry
/// to the head of the chain. A chain may therefore hold several entries for a key, newest first.
/// [`HashTable::get`] returns the newest one, and [`HashTable::erase`] removes only the newest
/// one, making the next older entry for the key visible again.
///
/// ## Memory reclamation
///
/// Each [`HashTable`] owns an epoch-based garbage collector. Every operation pins the calling
/// thread for its duration; a removed entry is retired, and freed only after every operation that
/// might have observed it has finished. Dropping the [`HashTable`] frees all the entries,
/// retired or not.
///
/// ## Limitations
///
/// * The number of buckets is fixed at construction; the table never grows or shrinks.
/// * There is no way to iterate over the entries.
/// * [`HashTable::erase`] retries from the head of the chain on contention without bound.
/// * Only operations on the same key are ordered; there is no linearizability across keys.
pub struct HashTable<K, V, H = RandomState>
where
    H: BuildHasher,
{
    array: BucketArray<K, V>,
    collector: Collector<Node<K, V>>,
    build_hasher: H,
}

/// The outcome of a chain traversal.
enum Search<'g, K, V> {
    /// An entry satisfying the condition was found.
    Found {
        /// The link pointing to the entry.
        prev: &'g Link<Node<K, V>>,
        /// The entry.
        current: Ptr<'g, Node<K, V>>,
        /// A reference to the entry.
        node: &'g Node<K, V>,
        /// The successor of the entry, untagged.
        next: Ptr<'g, Node<K, V>>,
    },
    /// The end of the chain was reached.
    Absent,
    /// The chain was modified during the traversal.
    Retry,
}

impl<K, V> HashTable<K, V, RandomState> {
    /// Creates an empty [`HashTable`] with [`DEFAULT_BUCKET_COUNT`] buckets.
    ///
    /// # Examples
    ///
    /// ```
    /// use lfkv::HashTable;
    ///
    /// let hashtable: HashTable<u64, u32> = HashTable::new();
    ///
    /// assert_eq!(hashtable.bucket_count(), lfkv::hash_table::DEFAULT_BUCKET_COUNT);
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty [`HashTable`] with the specified number of buckets.
    ///
    /// The actual number of buckets is the smallest power of two that is equal to or greater
    /// than `bucket_count`.
    ///
    /// # Examples
    ///
    /// ```
    /// use lfkv::HashTable;
    ///
    /// let hashtable: HashTable<u64, u32> = HashTable::with_buckets(1000);
    ///
    /// assert_eq!(hashtable.bucket_count(), 1024);
    /// ```
    #[inline]
    #[must_use]
    pub fn with_buckets(bucket_count: usize) -> Self {
        Self::with_buckets_and_hasher(bucket_count, RandomState::new())
    }

    /// Creates an empty [`HashTable`] that attempts reclamation whenever a participant holds more
    /// than `threshold` removed entries.
    #[cfg(test)]
    pub(crate) fn with_reclaim_threshold(bucket_count: usize, threshold: usize) -> Self {
        Self {
            array: BucketArray::new(bucket_count),
            collector: Collector::with_threshold(threshold),
            build_hasher: RandomState::new(),
        }
    }
}

impl<K, V, H> HashTable<K, V, H>
where
    H: BuildHasher,
{
    /// Creates an empty [`HashTable`] with the given [`BuildHasher`].
    ///
    /// # Examples
    ///
    /// ```
    /// use lfkv::HashTable;
    /// use std::collections::hash_map::RandomState;
    ///
    /// let hashtable: HashTable<u64, u32, RandomState> = HashTable::with_hasher(RandomState::new());
    /// ```
    #[inline]
    pub fn with_hasher(build_hasher: H) -> Self {
        Self::with_buckets_and_hasher(DEFAULT_BUCKET_COUNT, build_hasher)
    }

    /// Creates an empty [`HashTable`] with the specified number of buckets and [`BuildHasher`].
    ///
    /// # Examples
    ///
    /// ```
    /// use lfkv::HashTable;
    /// use std::collections::hash_map::RandomState;
    ///
    /// let hashtable: HashTable<u64, u32, RandomState> =
    ///     HashTable::with_buckets_and_hasher(3, RandomState::new());
    ///
    /// assert_eq!(hashtable.bucket_count(), 4);
    /// ```
    #[inline]
    pub fn with_buckets_and_hasher(bucket_count: usize, build_hasher: H) -> Self {
        Self {
            array: BucketArray::new(bucket_count),
            collector: Collector::new(),
            build_hasher,
        }
    }

    /// Returns the number of buckets.
    ///
    /// # Examples
    ///
    /// ```
    /// use lfkv::HashTable;
    ///
    /// let hashtable: HashTable<u64, u32> = HashTable::with_buckets(16);
    /// assert_eq!(hashtable.bucket_count(), 16);
    /// ```
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.array.len()
    }

    /// Returns the current epoch of the garbage collector of the [`HashTable`].
    ///
    /// The epoch only advances when removed entries pile up, therefore it can be used to observe
    /// the progress of memory reclamation.
    ///
    /// # Examples
    ///
    /// ```
    /// use lfkv::HashTable;
    ///
    /// let hashtable: HashTable<u64, u32> = HashTable::with_buckets(16);
    /// assert_eq!(hashtable.epoch(), 0);
    /// ```
    #[inline]
    pub fn epoch(&self) -> u64 {
        self.collector.epoch()
    }
}

impl<K, V, H> HashTable<K, V, H>
where
    K: Eq + Hash,
    H: BuildHasher,
{
    /// Inserts a key-value pair.
    ///
    /// The entry is pushed to the head of its chain without checking whether the key exists; it
    /// shadows any older entry for the same key until it is erased.
    ///
    /// # Examples
    ///
    /// ```
    /// use lfkv::HashTable;
    ///
    /// let hashtable: HashTable<u64, u32> = HashTable::with_buckets(16);
    ///
    /// hashtable.put(1, 0);
    /// hashtable.put(1, 1);
    /// assert_eq!(hashtable.get(&1), Some(1));
    /// ```
    #[inline]
    pub fn put(&self, key: K, value: V) {
        let hash = self.hash(&key);
        let bucket = self.array.bucket(hash);
        let guard = self.collector.pin();

        let mut new_node = Owned::new(Node::new(key, value));
        let mut head = bucket.load(Acquire, &guard);
        loop {
            new_node.next().init(head);
            match bucket.publish(head, new_node, Release, Acquire, &guard) {
                Ok(_) => return,
                Err((passed, actual)) => {
                    new_node = passed;
                    head = actual;
                }
            }
        }
    }

    /// Returns a copy of the value of the newest entry for the key.
    ///
    /// Returns `None` if the key does not exist. Apart from the clone, it allocates memory only as
    /// described in [`HashTable::read`].
    ///
    /// # Examples
    ///
    /// ```
    /// use lfkv::HashTable;
    ///
    /// let hashtable: HashTable<String, String> = HashTable::with_buckets(16);
    ///
    /// assert!(hashtable.get("a").is_none());
    /// hashtable.put("a".to_string(), "b".to_string());
    /// assert_eq!(hashtable.get("a").as_deref(), Some("b"));
    /// ```
    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        Q: Equivalent<K> + Hash + ?Sized,
        V: Clone,
    {
        self.read(key, |_, v| v.clone())
    }

    /// Reads the newest entry for the key.
    ///
    /// Returns `None` if the key does not exist. The reader is invoked while the calling thread is
    /// pinned, and it must not block for long since the entries retired meanwhile cannot be freed.
    ///
    /// Reading does not allocate memory, except that pinning allocates a participant record when
    /// every existing one is in use, as on the first operation on the [`HashTable`]. Participant
    /// records are reused and freed with the [`HashTable`].
    ///
    /// # Examples
    ///
    /// ```
    /// use lfkv::HashTable;
    ///
    /// let hashtable: HashTable<u64, String> = HashTable::with_buckets(16);
    ///
    /// assert!(hashtable.read(&1, |_, v| v.len()).is_none());
    /// hashtable.put(1, "one".to_string());
    /// assert_eq!(hashtable.read(&1, |_, v| v.len()), Some(3));
    /// ```
    #[inline]
    pub fn read<Q, R, F: FnOnce(&K, &V) -> R>(&self, key: &Q, reader: F) -> Option<R>
    where
        Q: Equivalent<K> + Hash + ?Sized,
    {
        let hash = self.hash(key);
        let guard = self.collector.pin();
        let mut current = self.array.bucket(hash).load(Acquire, &guard);
        while let Some(node) = current.as_ref() {
            let next = node.next().load(Acquire, &guard);
            if next.tag() == Tag::None && key.equivalent(node.key()) {
                return Some(reader(node.key(), node.value()));
            }
            current = next.without_tag();
        }
        None
    }

    /// Checks if the key exists.
    ///
    /// # Examples
    ///
    /// ```
    /// use lfkv::HashTable;
    ///
    /// let hashtable: HashTable<u64, u32> = HashTable::with_buckets(16);
    ///
    /// assert!(!hashtable.contains(&1));
    /// hashtable.put(1, 0);
    /// assert!(hashtable.contains(&1));
    /// ```
    #[inline]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        Q: Equivalent<K> + Hash + ?Sized,
    {
        self.read(key, |_, _| ()).is_some()
    }

    /// Removes the newest entry for the key.
    ///
    /// Returns `false` if the key does not exist. If older entries for the key exist, the next
    /// newest one becomes visible.
    ///
    /// # Examples
    ///
    /// ```
    /// use lfkv::HashTable;
    ///
    /// let hashtable: HashTable<u64, u32> = HashTable::with_buckets(16);
    ///
    /// assert!(!hashtable.erase(&1));
    /// hashtable.put(1, 0);
    /// hashtable.put(1, 1);
    /// assert!(hashtable.erase(&1));
    /// assert_eq!(hashtable.get(&1), Some(0));
    /// assert!(hashtable.erase(&1));
    /// assert!(!hashtable.erase(&1));
    /// ```
    #[inline]
    pub fn erase<Q>(&self, key: &Q) -> bool
    where
        Q: Equivalent<K> + Hash + ?Sized,
    {
        let hash = self.hash(key);
        let bucket = self.array.bucket(hash);
        let guard = self.collector.pin();
        loop {
            match Self::search(bucket, |k| key.equivalent(k), &guard) {
                Search::Found {
                    prev,
                    current,
                    node,
                    next,
                } => {
                    // Only one thread can mark the entry removed.
                    let marked = next.with_tag(Tag::Removed);
                    if node
                        .next()
                        .compare_exchange(next, marked, AcqRel, Acquire, &guard)
                        .is_err()
                    {
                        relax();
                        continue;
                    }

                    if prev
                        .compare_exchange(current, next, AcqRel, Acquire, &guard)
                        .is_ok()
                    {
                        unsafe {
                            guard.retire(current);
                        }
                    } else {
                        // The chain changed; unlink the entry from a fresh traversal.
                        while let Search::Retry = Self::search(bucket, |_| false, &guard) {
                            relax();
                        }
                    }
                    return true;
                }
                Search::Absent => return false,
                Search::Retry => relax(),
            }
        }
    }

    /// Returns the hash value of the key.
    #[inline]
    fn hash<Q: Hash + ?Sized>(&self, key: &Q) -> u64 {
        self.build_hasher.hash_one(key)
    }

    /// Traverses the chain until it finds a live entry satisfying the condition.
    ///
    /// Logically removed entries on the way are unlinked and retired; `Search::Retry` is returned
    /// if an unlink fails because the chain was modified concurrently.
    fn search<'g, F: FnMut(&K) -> bool>(
        bucket: &'g Link<Node<K, V>>,
        mut condition: F,
        guard: &'g Guard<'_, Node<K, V>>,
    ) -> Search<'g, K, V> {
        let mut prev = bucket;
        let mut current = prev.load(Acquire, guard);
        while let Some(node) = current.as_ref() {
            let next = node.next().load(Acquire, guard);
            if next.tag() == Tag::Removed {
                let next = next.without_tag();
                if prev
                    .compare_exchange(current, next, AcqRel, Acquire, guard)
                    .is_err()
                {
                    return Search::Retry;
                }
                unsafe {
                    guard.retire(current);
                }
                current = next;
                continue;
            }
            if condition(node.key()) {
                return Search::Found {
                    prev,
                    current,
                    node,
                    next,
                };
            }
            prev = node.next();
            current = next;
        }
        Search::Absent
    }
}

impl<K, V, H> Debug for HashTable<K, V, H>
where
    H: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashTable")
            .field("bucket_count", &self.bucket_count())
            .field("epoch", &self.epoch())
            .finish_non_exhaustive()
    }
}

impl<K, V, H> Default for HashTable<K, V, H>
where
    H: BuildHasher + Default,
{
    /// Creates an empty default [`HashTable`] with [`DEFAULT_BUCKET_COUNT`] buckets.
    ///
    /// # Examples
    ///
    /// ```
    /// use lfkv::HashTable;
    ///
    /// let hashtable: HashTable<u64, u32> = HashTable::default();
    ///
    /// assert!(hashtable.get(&1).is_none());
    /// ```
    #[inline]
    fn default() -> Self {
        Self::with_buckets_and_hasher(DEFAULT_BUCKET_COUNT, H::default())
    }
}

unsafe impl<K, V, H> Send for HashTable<K, V, H>
where
    K: Send,
    V: Send,
    H: BuildHasher + Send,
{
}

unsafe impl<K, V, H> Sync for HashTable<K, V, H>
where
    K: Send + Sync,
    V: Send + Sync,
    H: BuildHasher + Sync,
{
}

/// Gives way to other threads before retrying a failed compare-and-swap.
#[inline]
fn relax() {
    #[cfg(not(feature = "loom"))]
    std::hint::spin_loop();

    #[cfg(feature = "loom")]
    loom::thread::yield_now();
}
