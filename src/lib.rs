#![no_std]
//! # intrc: intrusive reference counting
//!
//! intrc is a single-threaded reference-counting library in which the live
//! counter is embedded inside the managed object itself instead of living in
//! a separate control block next to the data. You declare a [`RefCount`]
//! field in your own type, implement the [`RefCounted`] capability for it,
//! and hand ownership to the [`Irc<T>`] handle. Because the counter travels
//! with the object, any code holding a raw pointer to it can inspect the
//! count or participate in the ownership protocol through [`add_ref`] and
//! [`release`] without ever seeing the handle type. This is the classic
//! intrusive-pointer pattern, expressed with a compile-time capability bound
//! rather than inheritance.
//!
//! ```
//! use intrc::{Irc, RefCount, RefCounted};
//!
//! struct Node {
//!     label: &'static str,
//!     refs: RefCount,
//! }
//!
//! // Safety: `ref_count` always returns the counter embedded in `self`.
//! unsafe impl RefCounted for Node {
//!     fn ref_count(&self) -> &RefCount {
//!         &self.refs
//!     }
//! }
//!
//! let first = Irc::new(Node { label: "shared", refs: RefCount::new() });
//! let second = first.clone();
//!
//! assert_eq!(first.use_count(), 2);
//! assert_eq!(second.label, "shared");
//!
//! drop(first);
//! assert_eq!(second.use_count(), 1);
//! ```
//!
//! ## Why use intrc?
//!
//! - The allocation holds exactly your type: no hidden control block, no
//!   second counter word for weak references you do not use
//! - Raw-pointer holders can keep an object alive ([`add_ref`]) or vote for
//!   its destruction ([`release`]) without going through the handle, which
//!   makes object registries and intrusive collections straightforward
//! - Handles can be empty, re-seated with [`Irc::reset`], or told to give up
//!   ownership without releasing their vote ([`Irc::detach`])
//! - It supports `no_std` with extern alloc
//!
//! ## Why not use intrc?
//!
//! - The counter is plain (non-atomic) state: [`Irc<T>`] is neither `Send`
//!   nor `Sync`, and there is no atomic variant
//! - It does not provide weak references and does not detect reference
//!   cycles
//! - Your type must opt in by embedding a [`RefCount`] and implementing
//!   [`RefCounted`]; arbitrary `T` cannot be wrapped the way
//!   `std::rc::Rc<T>` wraps it
//!
//! ## Comparison
//!
//! |                      | `intrc::Irc` | `std::rc::Rc` |
//! | -------------------- | :----------: | :-----------: |
//! | Counter location     |  inside `T`  | control block |
//! | Weak references      |      ❌      |      ✅       |
//! | Raw-pointer interop  |      ✅      |    limited    |
//! | Empty (null) handles |      ✅      |      ❌       |
//! | Works with any `T`   |      ❌      |      ✅       |
//!
//! ### Features
//!
//! By default the counter is 32 bits wide on 64-bit platforms and word-sized
//! elsewhere, through the `usize-for-small-platforms` feature. Disabling
//! default features shrinks the counter to the half register size on smaller
//! targets: 16-bit counters on 32-bit platforms and 8-bit counters on 16-bit
//! platforms.

#![warn(missing_docs, missing_debug_implementations)]
extern crate alloc;

// Counter width ladder

#[cfg(target_pointer_width = "64")]
pub(crate) use u32 as ucount;

#[cfg(all(
    not(target_pointer_width = "64"),
    feature = "usize-for-small-platforms"
))]
pub(crate) use usize as ucount;

#[cfg(all(
    target_pointer_width = "32",
    not(feature = "usize-for-small-platforms")
))]
pub(crate) use u16 as ucount;

#[cfg(all(
    target_pointer_width = "16",
    not(feature = "usize-for-small-platforms")
))]
pub(crate) use u8 as ucount;

#[cfg(all(target_pointer_width = "8", not(feature = "usize-for-small-platforms")))]
pub(crate) use usize as ucount;

mod counted;
mod irc;
pub use counted::*;
pub use irc::*;
