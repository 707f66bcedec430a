/// [`Tag`] is a one-bit mark embedded in the least significant bit of a link pointer.
///
/// The pointee type must be aligned to at least two bytes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Tag {
    /// No mark.
    None,
    /// The instance owning the link has been logically removed.
    Removed,
}

impl Tag {
    /// The bit used for the mark.
    const MASK: usize = 1;

    /// Returns the [`Tag`] embedded in the pointer.
    #[inline]
    pub(super) fn into_tag<P>(ptr: *const P) -> Tag {
        if (ptr as usize & Self::MASK) == 0 {
            Tag::None
        } else {
            Tag::Removed
        }
    }

    /// Returns the pointer with the tag field erased.
    ///
    /// Pointer arithmetic is used instead of an integer round trip in order to preserve the
    /// provenance of the pointer.
    #[inline]
    pub(super) fn unset_tag<P>(ptr: *const P) -> *const P {
        ptr.cast::<u8>()
            .wrapping_sub(ptr as usize & Self::MASK)
            .cast::<P>()
    }

    /// Returns the pointer with the tag field overwritten.
    #[inline]
    pub(super) fn update_tag<P>(ptr: *const P, tag: Tag) -> *const P {
        let bits = match tag {
            Tag::None => 0,
            Tag::Removed => Self::MASK,
        };
        Self::unset_tag(ptr)
            .cast::<u8>()
            .wrapping_add(bits)
            .cast::<P>()
    }
}
