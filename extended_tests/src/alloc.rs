use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::ops::Add;
use std::thread::{self, LocalKey};

use lfkv::HashTable;

use crate::SERIALIZER;

/// Counts the bytes allocated and freed by each thread.
struct CountingAllocator;

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        record(&ALLOCATED, layout.size());
        unsafe { System.alloc(layout) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        record(&FREED, layout.size());
        unsafe { System.dealloc(ptr, layout) }
    }
}

#[global_allocator]
static GLOBAL: CountingAllocator = CountingAllocator;

thread_local! {
    static ALLOCATED: Cell<usize> = const { Cell::new(0) };
    static FREED: Cell<usize> = const { Cell::new(0) };
}

fn record(counter: &'static LocalKey<Cell<usize>>, size: usize) {
    // The thread-local storage may already be gone while the thread is exiting.
    let _ = counter.try_with(|c| c.set(c.get().wrapping_add(size)));
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
struct Usage {
    allocated: usize,
    freed: usize,
}

impl Usage {
    fn current() -> Self {
        Self {
            allocated: ALLOCATED.with(Cell::get),
            freed: FREED.with(Cell::get),
        }
    }

    fn since(self, start: Usage) -> Self {
        Self {
            allocated: self.allocated.wrapping_sub(start.allocated),
            freed: self.freed.wrapping_sub(start.freed),
        }
    }
}

impl Add for Usage {
    type Output = Usage;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            allocated: self.allocated + rhs.allocated,
            freed: self.freed + rhs.freed,
        }
    }
}

/// Runs the closure, and returns what the current thread allocated and freed meanwhile.
fn measure<R, F: FnOnce() -> R>(f: F) -> (R, Usage) {
    let start = Usage::current();
    let result = f();
    (result, Usage::current().since(start))
}

fn single_thread_workload() {
    let workload_size = 4096;
    let hashtable: HashTable<usize, String> = HashTable::with_buckets(64);
    for k in 0..workload_size {
        hashtable.put(k, k.to_string());
        hashtable.put(k, format!("{k}+"));
    }
    for k in 0..workload_size {
        assert_eq!(hashtable.get(&k), Some(format!("{k}+")));
        assert!(hashtable.erase(&k));
    }
    for k in (0..workload_size).filter(|k| k % 2 == 0) {
        assert!(hashtable.erase(&k));
    }
    assert!(hashtable.epoch() > 0);
    drop(hashtable);
}

fn multi_thread_workload(num_threads: usize) -> Usage {
    let workload_size = 2048;
    let (hashtable, mut usage) =
        measure(|| HashTable::<usize, String>::with_buckets(256));
    thread::scope(|s| {
        let threads: Vec<_> = (0..num_threads)
            .map(|thread_id| {
                let hashtable = &hashtable;
                s.spawn(move || {
                    measure(|| {
                        for k in 0..workload_size {
                            hashtable.put(k, format!("{thread_id}:{k}"));
                            if let Some(value) = hashtable.get(&k) {
                                assert!(value.ends_with(&format!(":{k}")));
                            }
                            let _ = hashtable.erase(&k);
                        }
                    })
                    .1
                })
            })
            .collect();
        for thread in threads {
            usage = usage + thread.join().unwrap();
        }
    });
    let ((), dropped) = measure(|| drop(hashtable));
    usage + dropped
}

#[test]
fn balance_single_thread() {
    let _guard = SERIALIZER.lock().unwrap();

    // Lazily initialized statics are allocated only once.
    single_thread_workload();

    let ((), usage) = measure(single_thread_workload);
    assert!(usage.allocated > 0);
    assert_eq!(usage.allocated, usage.freed);
}

#[test]
fn balance_multi_thread() {
    let _guard = SERIALIZER.lock().unwrap();

    let num_threads = 4;
    multi_thread_workload(num_threads);

    for _ in 0..4 {
        let usage = multi_thread_workload(num_threads);
        assert!(usage.allocated > 0);
        assert_eq!(usage.allocated, usage.freed);
    }
}

#[test]
fn read_allocation() {
    let _guard = SERIALIZER.lock().unwrap();

    // The first pin allocates a participant record, and it stays until the table is dropped.
    let hashtable: HashTable<usize, usize> = HashTable::with_buckets(16);
    let (value, usage) = measure(|| hashtable.get(&0));
    assert!(value.is_none());
    assert!(usage.allocated > 0);
    assert_eq!(usage.freed, 0);

    hashtable.put(0, 1);
    for _ in 0..4 {
        let (value, usage) = measure(|| hashtable.get(&0));
        assert_eq!(value, Some(1));
        assert_eq!(usage, Usage::default());
    }
}
