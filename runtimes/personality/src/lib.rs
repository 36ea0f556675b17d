//! This crate provides `__noexcept_personality`, a drop-in replacement for the
//! C++ personality routine which turns a noexcept violation into immediate
//! termination, before any destructors between the throw site and the noexcept
//! boundary have run.
//!
//! It works together with the `noexcept_plugin` compiler pass:
//!
//! 1. The pass installs `__noexcept_personality` as the personality of every
//!    function, and rewrites the `must-not-throw` region of every noexcept
//!    function into a `catch (__noexcept_marker)` handler.
//! 2. The type descriptor of `__noexcept_marker` (see [`sentinel`]) claims to
//!    match every exception, so phase 1 of the unwinder finds that handler for
//!    any exception which escapes the function.
//! 3. When the host personality reports a handler in phase 1, we look at the
//!    adjusted pointer it cached in the exception record (see [`layout`]). If it
//!    is the sentinel, the handler is a noexcept boundary and we terminate right
//!    there, during the search phase, so phase 2 (which would run the
//!    destructors) never starts.
//!
//! The record layout is platform-specific:
//!
//! 1. Targets using the ARM EHABI unwinder use the `PropagatingStack` layout and
//!    the three-argument personality in `entry/ehabi.rs`.
//! 2. All other targets use the `CachedSearchResult` layout and the generic
//!    five-argument personality in `entry/itanium.rs`.
pub mod dispatch;
pub mod layout;
pub mod sentinel;

cfg_if::cfg_if! {
    if #[cfg(all(target_arch = "arm", not(target_vendor = "apple"), not(target_os = "netbsd")))] {
        #[path = "entry/ehabi.rs"]
        mod entry;
    } else {
        #[path = "entry/itanium.rs"]
        mod entry;
    }
}

pub use self::dispatch::{classify, Verdict};
pub use self::entry::__noexcept_personality;
pub use self::layout::{RecordLayout, TargetLayout};
