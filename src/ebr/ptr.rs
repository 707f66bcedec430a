use super::Tag;

use std::marker::PhantomData;

/// [`Ptr`] points to an instance protected by a [`Guard`](super::Guard).
///
/// The lifetime `'g` is that of the [`Guard`](super::Guard) the pointer was loaded under; the
/// instance cannot be freed while the [`Guard`](super::Guard) is alive.
#[derive(Debug)]
pub(crate) struct Ptr<'g, T> {
    instance_ptr: *const T,
    _phantom: PhantomData<&'g T>,
}

impl<'g, T> Ptr<'g, T> {
    /// Tries to create a reference to the underlying instance.
    #[inline]
    pub(crate) fn as_ref(&self) -> Option<&'g T> {
        unsafe { Tag::unset_tag(self.instance_ptr).as_ref() }
    }

    /// Returns its [`Tag`].
    #[inline]
    pub(crate) fn tag(&self) -> Tag {
        Tag::into_tag(self.instance_ptr)
    }

    /// Returns a copy of `self` with a [`Tag`] set.
    #[inline]
    pub(crate) fn with_tag(self, tag: Tag) -> Self {
        Self::from(Tag::update_tag(self.instance_ptr, tag))
    }

    /// Returns a copy of `self` with its [`Tag`] erased.
    #[inline]
    pub(crate) fn without_tag(self) -> Self {
        Self::from(Tag::unset_tag(self.instance_ptr))
    }

    /// Creates a new [`Ptr`] from a raw pointer.
    #[inline]
    pub(super) const fn from(ptr: *const T) -> Self {
        Self {
            instance_ptr: ptr,
            _phantom: PhantomData,
        }
    }

    /// Returns the raw pointer including its [`Tag`].
    #[inline]
    pub(super) const fn as_raw(self) -> *const T {
        self.instance_ptr
    }
}

impl<T> Clone for Ptr<'_, T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Ptr<'_, T> {}
