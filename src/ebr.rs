//! Epoch-based reclamation scoped to a single container.
//!
//! Unlike a process-wide collector, every [`Collector`] owns its own global epoch, its own set of
//! participants, and every instance retired through it, so that dropping the container frees all
//! the memory it ever allocated.
//!
//! A thread reading the container holds a [`Guard`] which announces the epoch the thread observed
//! when it started. The global epoch only advances when every active participant has announced the
//! current epoch, and an instance retired in epoch `e` is freed once the global epoch reaches
//! `e + 2`; by then, no [`Guard`] that could have seen the instance is alive.
//!
//! Like the containers it serves, it relies on the `SeqCst` ordering at the points where the
//! epoch announcements and the global epoch meet.

mod collector;
pub(crate) use collector::Collector;

mod guard;
pub(crate) use guard::Guard;

mod link;
pub(crate) use link::Link;

mod owned;
pub(crate) use owned::Owned;

mod ptr;
pub(crate) use ptr::Ptr;

mod retired;

mod tag;
pub(crate) use tag::Tag;

/// The number of retired instances a participant accumulates before it attempts to advance the
/// global epoch and free what has become unreachable.
pub(crate) const RECLAIM_THRESHOLD: usize = 64;
