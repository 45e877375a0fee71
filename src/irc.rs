use crate::counted::{self, add_ref, release, RefCounted};
use alloc::boxed::Box;
use core::{
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
    ops::Deref,
    ptr::{self, NonNull},
};

/// An owning handle to a [`RefCounted`] object.
///
/// `Irc<T>` wraps at most one raw reference to a `T` whose embedded
/// [`RefCount`][crate::RefCount] it manipulates: every live, non-empty
/// handle holds one vote against the destruction of its referent. Cloning a
/// handle takes a vote and dropping one releases it; the vote that brings
/// the counter to zero destroys the object then and there. A handle may also
/// be *empty*, holding no referent at all; [`Irc::empty`], [`Irc::reset`],
/// [`Irc::detach`], and [`Irc::take`] produce or leave behind empty handles.
///
/// Dereferencing an empty handle panics; use [`Irc::as_ref`] when emptiness
/// is an expected state.
///
/// The counter is plain non-atomic state, so `Irc<T>` is neither `Send` nor
/// `Sync`.
///
/// # Examples
///
/// ```
/// use intrc::{Irc, RefCount, RefCounted};
///
/// struct Node {
///     value: i32,
///     refs: RefCount,
/// }
///
/// unsafe impl RefCounted for Node {
///     fn ref_count(&self) -> &RefCount {
///         &self.refs
///     }
/// }
///
/// let handle = Irc::new(Node { value: 20, refs: RefCount::new() });
/// let copy = handle.clone();
///
/// assert!(handle == copy);
/// assert_eq!(copy.use_count(), 2);
/// assert_eq!(copy.value, 20);
/// ```
pub struct Irc<T: RefCounted> {
    ptr: Option<NonNull<T>>,
    phantom: PhantomData<Box<T>>,
}

impl<T: RefCounted> Irc<T> {
    /// Allocates `value` on the heap and returns the first handle to it.
    ///
    /// The embedded counter starts at zero and the new handle takes the
    /// first vote, so the returned handle reports `use_count() == 1`.
    ///
    /// # Examples
    ///
    /// ```
    /// use intrc::{Irc, RefCount, RefCounted};
    /// # struct Node { value: i32, refs: RefCount }
    /// # unsafe impl RefCounted for Node {
    /// #     fn ref_count(&self) -> &RefCount { &self.refs }
    /// # }
    /// # fn node(value: i32) -> Node { Node { value, refs: RefCount::new() } }
    ///
    /// let handle = Irc::new(node(10));
    /// assert_eq!(handle.use_count(), 1);
    /// assert_eq!(handle.value, 10);
    /// ```
    #[inline]
    pub fn new(value: T) -> Irc<T> {
        let ptr = NonNull::from(Box::leak(Box::new(value)));
        // SAFETY: the allocation is live and the counter is at zero; this
        // handle takes the first vote.
        unsafe { add_ref(ptr) };
        Irc {
            ptr: Some(ptr),
            phantom: PhantomData,
        }
    }

    /// Returns a handle with no referent.
    ///
    /// # Examples
    ///
    /// ```
    /// use intrc::{Irc, RefCount, RefCounted};
    /// # struct Node { value: i32, refs: RefCount }
    /// # unsafe impl RefCounted for Node {
    /// #     fn ref_count(&self) -> &RefCount { &self.refs }
    /// # }
    ///
    /// let handle: Irc<Node> = Irc::empty();
    /// assert!(handle.is_empty());
    /// assert_eq!(handle.use_count(), 0);
    /// ```
    #[inline]
    pub fn empty() -> Irc<T> {
        Irc {
            ptr: None,
            phantom: PhantomData,
        }
    }

    /// Wraps `ptr` without touching the counter, adopting a vote the caller
    /// already owns. A null `ptr` yields an empty handle.
    ///
    /// This is the inverse of [`Irc::detach`].
    ///
    /// # Safety
    ///
    /// A non-null `ptr` must refer to a live object allocated by
    /// [`Irc::new`], and the caller must own one un-tracked vote on it (for
    /// example from [`Irc::detach`] or [`add_ref`]); that vote now belongs
    /// to the returned handle.
    #[inline]
    pub unsafe fn from_raw(ptr: *mut T) -> Irc<T> {
        Irc {
            ptr: NonNull::new(ptr),
            phantom: PhantomData,
        }
    }

    /// Wraps `ptr` and takes a new vote on it. A null `ptr` yields an empty
    /// handle and no vote.
    ///
    /// # Safety
    ///
    /// A non-null `ptr` must refer to a live object allocated by this
    /// crate's construction path, or handed out by [`Box::into_raw`] before
    /// any handle existed.
    ///
    /// # Examples
    ///
    /// ```
    /// use intrc::{Irc, RefCount, RefCounted};
    /// # struct Node { value: i32, refs: RefCount }
    /// # unsafe impl RefCounted for Node {
    /// #     fn ref_count(&self) -> &RefCount { &self.refs }
    /// # }
    /// # fn node(value: i32) -> Node { Node { value, refs: RefCount::new() } }
    ///
    /// let raw = Box::into_raw(Box::new(node(5)));
    /// // Safety: `raw` is a live Box allocation with no handles yet.
    /// let handle = unsafe { Irc::from_raw_add_ref(raw) };
    /// assert_eq!(handle.use_count(), 1);
    /// assert_eq!(handle.value, 5);
    /// ```
    #[inline]
    pub unsafe fn from_raw_add_ref(ptr: *mut T) -> Irc<T> {
        let ptr = NonNull::new(ptr);
        if let Some(ptr) = ptr {
            add_ref(ptr);
        }
        Irc {
            ptr,
            phantom: PhantomData,
        }
    }

    /// Returns `true` if this handle has no referent.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ptr.is_none()
    }

    /// Returns the raw referent pointer, or null for an empty handle. The
    /// counter does not change and the handle stays as it is.
    #[inline]
    pub fn as_ptr(&self) -> *mut T {
        match self.ptr {
            Some(ptr) => ptr.as_ptr(),
            None => ptr::null_mut(),
        }
    }

    /// Borrows the referent, or returns `None` for an empty handle.
    ///
    /// # Examples
    ///
    /// ```
    /// use intrc::{Irc, RefCount, RefCounted};
    /// # struct Node { value: i32, refs: RefCount }
    /// # unsafe impl RefCounted for Node {
    /// #     fn ref_count(&self) -> &RefCount { &self.refs }
    /// # }
    /// # fn node(value: i32) -> Node { Node { value, refs: RefCount::new() } }
    ///
    /// let handle = Irc::new(node(4));
    /// assert_eq!(handle.as_ref().map(|n| n.value), Some(4));
    /// assert!(Irc::<Node>::empty().as_ref().is_none());
    /// ```
    #[inline]
    pub fn as_ref(&self) -> Option<&T> {
        // SAFETY: a non-empty handle holds a vote, so the referent is live
        // for at least as long as the handle.
        self.ptr.map(|ptr| unsafe { &*ptr.as_ptr() })
    }

    /// Mutably borrows the referent, but only when this handle holds the
    /// only vote. Returns `None` for an empty handle or a shared referent.
    ///
    /// # Examples
    ///
    /// ```
    /// use intrc::{Irc, RefCount, RefCounted};
    /// # struct Node { value: i32, refs: RefCount }
    /// # unsafe impl RefCounted for Node {
    /// #     fn ref_count(&self) -> &RefCount { &self.refs }
    /// # }
    /// # fn node(value: i32) -> Node { Node { value, refs: RefCount::new() } }
    ///
    /// let mut handle = Irc::new(node(1));
    /// handle.get_mut().unwrap().value = 2;
    ///
    /// let other = handle.clone();
    /// assert!(handle.get_mut().is_none());
    /// # drop(other);
    /// ```
    #[inline]
    pub fn get_mut(&mut self) -> Option<&mut T> {
        if self.use_count() == 1 {
            // SAFETY: the single vote is ours and we are borrowed mutably,
            // so no other handle or borrow can reach the referent.
            self.ptr.map(|ptr| unsafe { &mut *ptr.as_ptr() })
        } else {
            None
        }
    }

    /// Gives up ownership of the referent without releasing the vote.
    ///
    /// The handle becomes empty and the counter stays where it was; the
    /// caller now owns one un-tracked vote and must eventually return it,
    /// either by hand through [`release`] or by adopting it back into a
    /// handle with [`Irc::from_raw`].
    ///
    /// # Examples
    ///
    /// ```
    /// use intrc::{release, Irc, RefCount, RefCounted};
    /// # struct Node { value: i32, refs: RefCount }
    /// # unsafe impl RefCounted for Node {
    /// #     fn ref_count(&self) -> &RefCount { &self.refs }
    /// # }
    /// # fn node(value: i32) -> Node { Node { value, refs: RefCount::new() } }
    ///
    /// let mut handle = Irc::new(node(60));
    /// let raw = handle.detach().unwrap();
    ///
    /// assert!(handle.is_empty());
    /// assert_eq!(unsafe { raw.as_ref() }.ref_count().get(), 1);
    ///
    /// // the detached vote has to be released by hand
    /// unsafe { release(raw) };
    /// ```
    #[inline]
    pub fn detach(&mut self) -> Option<NonNull<T>> {
        self.ptr.take()
    }

    /// Moves the referent into a new handle, leaving this one empty. The
    /// counter does not change; the vote travels with the returned handle.
    ///
    /// # Examples
    ///
    /// ```
    /// use intrc::{Irc, RefCount, RefCounted};
    /// # struct Node { value: i32, refs: RefCount }
    /// # unsafe impl RefCounted for Node {
    /// #     fn ref_count(&self) -> &RefCount { &self.refs }
    /// # }
    /// # fn node(value: i32) -> Node { Node { value, refs: RefCount::new() } }
    ///
    /// let mut source = Irc::new(node(99));
    /// let moved = source.take();
    ///
    /// assert!(source.is_empty());
    /// assert_eq!(moved.use_count(), 1);
    /// assert_eq!(moved.value, 99);
    /// ```
    #[inline]
    pub fn take(&mut self) -> Irc<T> {
        Irc {
            ptr: self.ptr.take(),
            phantom: PhantomData,
        }
    }

    /// Releases this handle's vote and leaves the handle empty. Destroys
    /// the referent if that vote was the last one. Does nothing on an empty
    /// handle.
    ///
    /// # Examples
    ///
    /// ```
    /// use intrc::{Irc, RefCount, RefCounted};
    /// # struct Node { value: i32, refs: RefCount }
    /// # unsafe impl RefCounted for Node {
    /// #     fn ref_count(&self) -> &RefCount { &self.refs }
    /// # }
    /// # fn node(value: i32) -> Node { Node { value, refs: RefCount::new() } }
    ///
    /// let mut handle = Irc::new(node(8));
    /// handle.reset();
    /// assert!(handle.is_empty());
    /// ```
    #[inline]
    pub fn reset(&mut self) {
        if let Some(old) = self.ptr.take() {
            // SAFETY: we held a vote on a live referent and are returning it.
            unsafe { release(old) };
        }
    }

    /// Re-seats the handle on `new`, then releases the vote on the previous
    /// referent (destroying it if that was the last vote). With `add_ref`
    /// set, a vote is taken on the new referent; otherwise an existing vote
    /// is adopted as in [`Irc::from_raw`]. A null `new` leaves the handle
    /// empty.
    ///
    /// # Safety
    ///
    /// The same contract as [`Irc::from_raw_add_ref`] (with `add_ref`) or
    /// [`Irc::from_raw`] (without) applies to `new`.
    pub unsafe fn reset_raw(&mut self, new: *mut T, add_ref: bool) {
        let old = self.ptr;
        self.ptr = NonNull::new(new);
        if add_ref {
            if let Some(ptr) = self.ptr {
                counted::add_ref(ptr);
            }
        }
        if let Some(old) = old {
            release(old);
        }
    }

    /// Exchanges the *contents* of the two referents, in place.
    ///
    /// This is not a pointer swap: both handles keep their identity and
    /// their counter afterwards, and other raw pointers to either object
    /// observe the new values. Each referent's payload ends up in the other
    /// allocation.
    ///
    /// # Panics
    ///
    /// Panics if either handle is empty, or if either referent has more
    /// than one vote: exchanging the contents of an object that other
    /// handles can reach would mutate shared state behind their backs.
    ///
    /// # Examples
    ///
    /// ```
    /// use intrc::{Irc, RefCount, RefCounted};
    /// # struct Node { value: i32, refs: RefCount }
    /// # unsafe impl RefCounted for Node {
    /// #     fn ref_count(&self) -> &RefCount { &self.refs }
    /// # }
    /// # fn node(value: i32) -> Node { Node { value, refs: RefCount::new() } }
    ///
    /// let mut first = Irc::new(node(18));
    /// let mut second = Irc::new(node(81));
    ///
    /// first.swap_values(&mut second);
    ///
    /// assert_eq!(first.value, 81);
    /// assert_eq!(second.value, 18);
    /// assert_eq!(first.use_count(), 1);
    /// assert_eq!(second.use_count(), 1);
    /// ```
    pub fn swap_values(&mut self, other: &mut Irc<T>) {
        let ours = self.ptr.expect("swap_values on an empty Irc");
        let theirs = other.ptr.expect("swap_values on an empty Irc");
        assert!(
            self.use_count() == 1 && other.use_count() == 1,
            "swap_values on a shared referent"
        );
        // Both counters are 1, so swapping whole values keeps each
        // allocation's count intact; sole ownership also means the two
        // allocations are distinct.
        unsafe { ptr::swap_nonoverlapping(ours.as_ptr(), theirs.as_ptr(), 1) };
    }

    /// Returns the referent's current counter value, or 0 for an empty
    /// handle.
    ///
    /// # Examples
    ///
    /// ```
    /// use intrc::{Irc, RefCount, RefCounted};
    /// # struct Node { value: i32, refs: RefCount }
    /// # unsafe impl RefCounted for Node {
    /// #     fn ref_count(&self) -> &RefCount { &self.refs }
    /// # }
    /// # fn node(value: i32) -> Node { Node { value, refs: RefCount::new() } }
    ///
    /// let handle = Irc::new(node(5));
    /// let other = handle.clone();
    /// assert_eq!(handle.use_count(), 2);
    /// assert_eq!(other.use_count(), 2);
    /// ```
    #[inline]
    pub fn use_count(&self) -> usize {
        match self.as_ref() {
            Some(value) => value.ref_count().get(),
            None => 0,
        }
    }
}

impl<T: RefCounted> Clone for Irc<T> {
    #[inline]
    fn clone(&self) -> Irc<T> {
        if let Some(ptr) = self.ptr {
            // SAFETY: this handle holds a vote, so the referent is live.
            unsafe { add_ref(ptr) };
        }
        Irc {
            ptr: self.ptr,
            phantom: PhantomData,
        }
    }
}

impl<T: RefCounted> Drop for Irc<T> {
    #[inline]
    fn drop(&mut self) {
        if let Some(ptr) = self.ptr {
            // SAFETY: this handle holds a vote on a live referent and is
            // returning it; at zero the referent is destroyed.
            unsafe { release(ptr) };
        }
    }
}

impl<T: RefCounted> Default for Irc<T> {
    #[inline]
    fn default() -> Irc<T> {
        Irc::empty()
    }
}

impl<T: RefCounted> From<T> for Irc<T> {
    #[inline]
    fn from(value: T) -> Irc<T> {
        Irc::new(value)
    }
}

impl<T: RefCounted> Deref for Irc<T> {
    type Target = T;
    #[inline]
    fn deref(&self) -> &T {
        self.as_ref().expect("dereferenced an empty Irc")
    }
}

/// Handles compare by identity: two handles are equal when they reference
/// the same object, or when both are empty. Referents with equal payloads in
/// distinct allocations compare unequal.
impl<T: RefCounted> PartialEq for Irc<T> {
    #[inline]
    fn eq(&self, other: &Irc<T>) -> bool {
        self.as_ptr() == other.as_ptr()
    }
}

impl<T: RefCounted> Eq for Irc<T> {}

/// Hashes the referent's identity, consistent with the identity-based
/// [`PartialEq`].
impl<T: RefCounted> Hash for Irc<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_ptr().hash(state);
    }
}

impl<T: RefCounted + fmt::Debug> fmt::Debug for Irc<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_ref() {
            Some(value) => f.debug_tuple("Irc").field(value).finish(),
            None => f.write_str("Irc(<empty>)"),
        }
    }
}

impl<T: RefCounted> fmt::Pointer for Irc<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Pointer::fmt(&self.as_ptr(), f)
    }
}

impl<T: RefCounted> Unpin for Irc<T> {}
