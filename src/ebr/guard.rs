use super::collector::{Collector, Participant};
use super::Ptr;

use std::ptr::NonNull;

/// [`Guard`] allows the owner to read instances reachable from a container and keeps them from
/// being freed.
///
/// [`Guard`] internally prevents the global epoch of its [`Collector`] from passing through the
/// value announced by the participant it owns, thus keeping reachable instances from being
/// garbage collected.
pub(crate) struct Guard<'c, T> {
    collector: &'c Collector<T>,
    participant: &'c Participant<T>,
}

impl<'c, T> Guard<'c, T> {
    /// Creates a new [`Guard`] owning the supplied participant.
    #[inline]
    pub(super) fn new(collector: &'c Collector<T>, participant: &'c Participant<T>) -> Self {
        Self {
            collector,
            participant,
        }
    }

    /// Retires an instance that has been unlinked from the container.
    ///
    /// # Safety
    ///
    /// The instance must have been unlinked such that no [`Guard`] created afterwards can reach
    /// it, and it must be retired only once.
    #[inline]
    pub(crate) unsafe fn retire(&self, ptr: Ptr<'_, T>) {
        if let Some(instance_ptr) = NonNull::new(ptr.without_tag().as_raw().cast_mut()) {
            self.collector.retire(self.participant, instance_ptr);
        }
    }
}

impl<T> Drop for Guard<'_, T> {
    #[inline]
    fn drop(&mut self) {
        self.participant.quit();
    }
}
