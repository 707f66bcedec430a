use super::{Guard, Owned, Ptr, Tag};
use crate::atomic::AtomicPtr;
use crate::atomic::Ordering::{self, Relaxed};

use std::marker::PhantomData;
use std::ptr;

/// [`Link`] is an atomically updatable, taggable, non-owning pointer to an instance.
///
/// A [`Link`] never frees what it points to; instances are owned by the container until they are
/// unlinked and handed over to [`Guard::retire`].
#[derive(Debug)]
pub(crate) struct Link<T> {
    instance_ptr: AtomicPtr<T>,
    _phantom: PhantomData<*const T>,
}

impl<T> Link<T> {
    /// Creates a null [`Link`].
    #[inline]
    pub(crate) fn null() -> Self {
        Self {
            instance_ptr: AtomicPtr::new(ptr::null_mut()),
            _phantom: PhantomData,
        }
    }

    /// Loads a pointer value from the [`Link`].
    #[inline]
    pub(crate) fn load<'g>(&self, order: Ordering, _guard: &'g Guard<'_, T>) -> Ptr<'g, T> {
        Ptr::from(self.instance_ptr.load(order))
    }

    /// Initializes the [`Link`] of an instance that is not reachable by any other thread.
    #[inline]
    pub(crate) fn init(&self, ptr: Ptr<'_, T>) {
        self.instance_ptr.store(ptr.as_raw().cast_mut(), Relaxed);
    }

    /// Makes the supplied instance reachable through the [`Link`] if the [`Link`] still holds
    /// `current`.
    ///
    /// Returns a [`Ptr`] to the newly published instance.
    ///
    /// # Errors
    ///
    /// Returns the supplied [`Owned`] back along with the actual value of the [`Link`].
    #[inline]
    pub(crate) fn publish<'g>(
        &self,
        current: Ptr<'g, T>,
        new: Owned<T>,
        success: Ordering,
        failure: Ordering,
        guard: &'g Guard<'_, T>,
    ) -> Result<Ptr<'g, T>, (Owned<T>, Ptr<'g, T>)> {
        match self.instance_ptr.compare_exchange(
            current.as_raw().cast_mut(),
            new.ptr(guard).as_raw().cast_mut(),
            success,
            failure,
        ) {
            Ok(_) => Ok(new.release(guard)),
            Err(actual) => Err((new, Ptr::from(actual))),
        }
    }

    /// Stores `new` into the [`Link`] if the [`Link`] still holds `current`, tags included.
    ///
    /// Returns the previous value.
    ///
    /// # Errors
    ///
    /// Returns the actual value of the [`Link`].
    #[inline]
    pub(crate) fn compare_exchange<'g>(
        &self,
        current: Ptr<'g, T>,
        new: Ptr<'g, T>,
        success: Ordering,
        failure: Ordering,
        _guard: &'g Guard<'_, T>,
    ) -> Result<Ptr<'g, T>, Ptr<'g, T>> {
        self.instance_ptr
            .compare_exchange(
                current.as_raw().cast_mut(),
                new.as_raw().cast_mut(),
                success,
                failure,
            )
            .map(|previous| Ptr::from(previous))
            .map_err(|actual| Ptr::from(actual))
    }

    /// Returns the untagged pointer without protection.
    ///
    /// The exclusive borrow guarantees that no other thread is able to modify the [`Link`],
    /// however whether the instance is still valid is up to the caller.
    #[inline]
    pub(crate) fn unprotected_mut(&mut self) -> *mut T {
        Tag::unset_tag(self.instance_ptr.load(Relaxed)).cast_mut()
    }
}
