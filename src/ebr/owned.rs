use super::{Guard, Ptr};

use std::mem::forget;
use std::ops::Deref;
use std::ptr::NonNull;

/// [`Owned`] uniquely owns an instance that has not been published yet.
///
/// The instance is freed when the [`Owned`] is dropped; once published through
/// [`Link::publish`](super::Link::publish), the [`Owned`] is consumed and the instance belongs to
/// the container.
#[derive(Debug)]
pub(crate) struct Owned<T> {
    instance_ptr: NonNull<T>,
}

impl<T> Owned<T> {
    /// Creates a new instance of [`Owned`].
    #[inline]
    pub(crate) fn new(t: T) -> Self {
        let boxed = Box::new(t);
        Self {
            instance_ptr: NonNull::from(Box::leak(boxed)),
        }
    }

    /// Generates a [`Ptr`] out of the [`Owned`].
    #[inline]
    pub(crate) fn ptr<'g>(&self, _guard: &'g Guard<'_, T>) -> Ptr<'g, T> {
        Ptr::from(self.instance_ptr.as_ptr())
    }

    /// Gives up the ownership of the instance and returns a [`Ptr`] to it.
    ///
    /// The instance has to be either reachable from a container or passed to
    /// [`Guard::retire`](super::Guard::retire), otherwise it leaks.
    #[inline]
    pub(crate) fn release<'g>(self, guard: &'g Guard<'_, T>) -> Ptr<'g, T> {
        let ptr = self.ptr(guard);
        forget(self);
        ptr
    }
}

impl<T> Deref for Owned<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &Self::Target {
        unsafe { self.instance_ptr.as_ref() }
    }
}

impl<T> Drop for Owned<T> {
    #[inline]
    fn drop(&mut self) {
        drop(unsafe { Box::from_raw(self.instance_ptr.as_ptr()) });
    }
}

unsafe impl<T: Send> Send for Owned<T> {}

unsafe impl<T: Sync> Sync for Owned<T> {}
