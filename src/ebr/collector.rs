use super::retired::Retired;
use super::{Guard, RECLAIM_THRESHOLD};
use crate::atomic::Ordering::{Acquire, Relaxed, Release, SeqCst};
use crate::atomic::{fence, AtomicBool, AtomicPtr, AtomicU64};

use std::cell::UnsafeCell;
use std::fmt::{self, Debug};
use std::ptr::{self, NonNull};

/// [`Collector`] reclaims instances retired from a single container once no [`Guard`] can reach
/// them anymore.
pub(crate) struct Collector<T> {
    /// The global epoch.
    ///
    /// It only grows, and it never gets more than one epoch ahead of the oldest announcement of
    /// an active participant.
    epoch: AtomicU64,

    /// The head of a push-only linked list of participants.
    participants: AtomicPtr<Participant<T>>,

    /// The number of retired instances a participant holds before it attempts reclamation.
    threshold: usize,
}

/// [`Participant`] is a slot that a [`Guard`] claims for its lifetime.
///
/// Participants are never unlinked before the [`Collector`] is dropped; a thread that finishes
/// with a participant leaves it for the next thread to claim, along with its retired instances.
pub(super) struct Participant<T> {
    /// `true` while a [`Guard`] owns the participant.
    claimed: AtomicBool,

    /// The epoch announced by the owner, or-ed with [`Participant::INACTIVE`] when unowned.
    announcement: AtomicU64,

    /// Retired instances; only accessed by the owner.
    retired: UnsafeCell<Vec<Retired<T>>>,

    /// The next participant; immutable once the participant is published.
    next: *const Participant<T>,
}

impl<T> Collector<T> {
    /// Creates a new [`Collector`].
    pub(crate) fn new() -> Self {
        Self::with_threshold(RECLAIM_THRESHOLD)
    }

    /// Creates a new [`Collector`] that attempts reclamation once a participant holds more than
    /// `threshold` retired instances.
    pub(crate) fn with_threshold(threshold: usize) -> Self {
        Self {
            epoch: AtomicU64::new(0),
            participants: AtomicPtr::new(ptr::null_mut()),
            threshold,
        }
    }

    /// Pins the current thread.
    ///
    /// Instances reachable from the container when the method returns are not freed until the
    /// returned [`Guard`] is dropped.
    #[inline]
    pub(crate) fn pin(&self) -> Guard<'_, T> {
        let participant = self.claim();
        participant.announce(&self.epoch);
        Guard::new(self, participant)
    }

    /// Returns the current global epoch.
    #[inline]
    pub(crate) fn epoch(&self) -> u64 {
        self.epoch.load(Relaxed)
    }

    /// Appends an unlinked instance to the retired instances of the participant, and frees
    /// instances that have become unreachable if the participant has accumulated too many.
    pub(super) fn retire(&self, participant: &Participant<T>, instance_ptr: NonNull<T>) {
        // The unlink must be ordered before the epoch is read.
        fence(SeqCst);
        let epoch = self.epoch.load(SeqCst);

        // The participant is owned by the caller's `Guard`.
        let retired = unsafe { &mut *participant.retired.get() };
        retired.push(Retired::new(instance_ptr, epoch));
        if retired.len() > self.threshold {
            let global_epoch = self.try_advance();
            let num_retired = retired.len();
            retired.retain(|r| !r.is_reclaimable(global_epoch));
            tracing::trace!(
                epoch = global_epoch,
                reclaimed = num_retired - retired.len(),
                remaining = retired.len(),
                "reclamation pass"
            );
        }
    }

    /// Claims an unowned participant, or allocates a new one.
    fn claim(&self) -> &Participant<T> {
        let mut current = self.participants.load(Acquire);
        while let Some(participant) = unsafe { current.as_ref() } {
            if !participant.claimed.load(Relaxed)
                && participant
                    .claimed
                    .compare_exchange(false, true, Acquire, Relaxed)
                    .is_ok()
            {
                return participant;
            }
            current = participant.next.cast_mut();
        }

        let new = Box::into_raw(Box::new(Participant::new()));
        let mut head = self.participants.load(Relaxed);
        loop {
            unsafe {
                (*new).next = head;
            }
            match self
                .participants
                .compare_exchange(head, new, Release, Relaxed)
            {
                Ok(_) => break,
                Err(actual) => head = actual,
            }
        }
        unsafe { &*new }
    }

    /// Tries to advance the global epoch.
    ///
    /// The global epoch advances only if every active participant has announced the current
    /// global epoch. Returns the global epoch after the attempt.
    fn try_advance(&self) -> u64 {
        let global_epoch = self.epoch.load(SeqCst);
        fence(SeqCst);

        let mut current = self.participants.load(Acquire);
        while let Some(participant) = unsafe { current.as_ref() } {
            let announcement = participant.announcement.load(SeqCst);
            if (announcement & Participant::<T>::INACTIVE) == 0 && announcement != global_epoch {
                // Not ready for an epoch update.
                return global_epoch;
            }
            current = participant.next.cast_mut();
        }

        match self
            .epoch
            .compare_exchange(global_epoch, global_epoch + 1, SeqCst, SeqCst)
        {
            Ok(_) => {
                tracing::trace!(epoch = global_epoch + 1, "epoch advanced");
                global_epoch + 1
            }
            Err(actual) => actual,
        }
    }
}

impl<T> Debug for Collector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collector")
            .field("epoch", &self.epoch())
            .finish_non_exhaustive()
    }
}

impl<T> Drop for Collector<T> {
    fn drop(&mut self) {
        let mut current = self.participants.load(Relaxed);
        while !current.is_null() {
            let participant = unsafe { Box::from_raw(current) };
            debug_assert!(!participant.claimed.load(Relaxed));
            current = participant.next.cast_mut();
        }
    }
}

impl<T> Participant<T> {
    /// A bit in an announcement representing a participant without a [`Guard`].
    const INACTIVE: u64 = 1_u64 << 63;

    /// Creates a claimed [`Participant`].
    fn new() -> Self {
        Self {
            claimed: AtomicBool::new(true),
            announcement: AtomicU64::new(Self::INACTIVE),
            retired: UnsafeCell::new(Vec::new()),
            next: ptr::null(),
        }
    }

    /// Announces the current global epoch.
    ///
    /// The announcement is retried until it is known to be current after the fence, so that the
    /// global epoch cannot advance twice past it while the owner is active.
    fn announce(&self, epoch: &AtomicU64) {
        let mut current = epoch.load(Relaxed);
        loop {
            self.announcement.store(current, Relaxed);

            // What will happen after the fence strictly happens after the fence.
            fence(SeqCst);

            let actual = epoch.load(Relaxed);
            if actual == current {
                break;
            }
            current = actual;
        }
    }

    /// Releases the participant.
    pub(super) fn quit(&self) {
        let announcement = self.announcement.load(Relaxed);

        // What has happened cannot happen after the owner sets itself inactive.
        self.announcement
            .store(announcement | Self::INACTIVE, Release);
        self.claimed.store(false, Release);
    }
}
