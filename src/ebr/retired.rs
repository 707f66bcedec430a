use std::ptr::NonNull;

/// [`Retired`] is an instance that has been unlinked from its container but may still be read
/// by a thread that loaded a pointer to it before the unlink.
///
/// The instance is freed when the [`Retired`] is dropped.
#[derive(Debug)]
pub(super) struct Retired<T> {
    instance_ptr: NonNull<T>,
    epoch: u64,
}

impl<T> Retired<T> {
    /// Creates a new [`Retired`] stamped with the global epoch observed after the unlink.
    #[inline]
    pub(super) const fn new(instance_ptr: NonNull<T>, epoch: u64) -> Self {
        Self {
            instance_ptr,
            epoch,
        }
    }

    /// Returns `true` if no [`Guard`](super::Guard) can reach the instance when the global epoch
    /// is `global_epoch`.
    ///
    /// A participant announcing `e` keeps the global epoch at or below `e + 1`, therefore every
    /// participant that was active when the instance was retired has quit once the global epoch
    /// is two epochs ahead of the stamp.
    #[inline]
    pub(super) const fn is_reclaimable(&self, global_epoch: u64) -> bool {
        self.epoch + 2 <= global_epoch
    }
}

impl<T> Drop for Retired<T> {
    #[inline]
    fn drop(&mut self) {
        drop(unsafe { Box::from_raw(self.instance_ptr.as_ptr()) });
    }
}

unsafe impl<T: Send> Send for Retired<T> {}
