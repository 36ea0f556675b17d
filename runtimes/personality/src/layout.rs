//! Mirrors of the libsupc++ exception record.
//!
//! A native C++ exception is a `__cxa_exception` (or, for `std::rethrow_exception`,
//! a `__cxa_dependent_exception`) with the generic unwinder header as its last
//! field. The personality routine only ever sees a pointer to that header, so
//! we step backwards from it to reach the fields the host personality cached
//! during phase 1.
//!
//! Both record kinds share the same tail, so the same mirror serves for both.
//!
//! There are two variants of the tail, and the adjusted pointer lives in a
//! different place in each:
//!
//! * [`CachedSearchResult`], the Itanium variant, keeps the phase 1 results
//!   (`handlerSwitchValue` through `adjustedPtr`) in the record itself.
//! * [`PropagatingStack`], the ARM EHABI variant, keeps a stack of propagating
//!   exceptions in the record instead, and the personality caches its phase 1
//!   results in the barrier cache of the control block.
use core::mem::{self, offset_of};

use libc::{c_int, c_void};

/// The generic `_Unwind_Exception` header of the Itanium unwinder
///
/// `unwind.h` declares this with `__attribute__((__aligned__))`, i.e. with the
/// largest alignment of the target, which is 16 on every target we support.
#[repr(C, align(16))]
pub struct UnwindException {
    pub exception_class: u64,
    pub exception_cleanup: Option<unsafe extern "C" fn(c_int, *mut UnwindException)>,
    pub private_1: usize,
    pub private_2: usize,
}

/// The opaque `_Unwind_Context` the unwinder hands to personality routines
#[repr(C)]
pub struct UnwindContext {
    _private: [u8; 0],
}

/// The `_Unwind_Control_Block` of the ARM EHABI unwinder
///
/// The words of this structure are 32 bits wide on ARM; we use `usize` so that
/// the layout is exact on the targets which use it.
#[repr(C, align(8))]
pub struct UnwindControlBlock {
    pub exception_class: [u8; 8],
    pub exception_cleanup: Option<unsafe extern "C" fn(c_int, *mut UnwindControlBlock)>,
    pub unwinder_cache: [usize; 5],
    pub barrier_cache: BarrierCache,
    pub cleanup_cache: [usize; 4],
    pub pr_cache: PrCache,
}

#[repr(C)]
pub struct BarrierCache {
    pub sp: usize,
    /// `bitpattern[0]` holds the adjusted pointer once phase 1 finds a handler
    pub bitpattern: [usize; 5],
}

#[repr(C)]
pub struct PrCache {
    pub fnstart: usize,
    pub ehtp: *mut c_void,
    pub additional: usize,
    pub reserved1: usize,
}

/// `__cxa_exception` as laid out for the Itanium unwinder
#[repr(C)]
pub struct CxaException {
    pub exception_type: *const c_void,
    pub exception_destructor: Option<unsafe extern "C" fn(*mut c_void)>,
    pub unexpected_handler: Option<unsafe extern "C" fn()>,
    pub terminate_handler: Option<unsafe extern "C" fn()>,
    pub next_exception: *mut CxaException,
    /// A negative value means the exception was rethrown
    pub handler_count: c_int,
    pub handler_switch_value: c_int,
    pub action_record: *const u8,
    pub language_specific_data: *const u8,
    pub catch_temp: usize,
    pub adjusted_ptr: *mut c_void,
    pub unwind_header: UnwindException,
}

/// `__cxa_exception` as laid out for the ARM EHABI unwinder
#[repr(C)]
pub struct CxaEhabiException {
    pub exception_type: *const c_void,
    pub exception_destructor: Option<unsafe extern "C" fn(*mut c_void)>,
    pub unexpected_handler: Option<unsafe extern "C" fn()>,
    pub terminate_handler: Option<unsafe extern "C" fn()>,
    pub next_exception: *mut CxaEhabiException,
    pub handler_count: c_int,
    pub next_propagating_exception: *mut CxaEhabiException,
    pub propagation_count: c_int,
    pub unwind_header: UnwindControlBlock,
}

// The header must be the last field, since we find the record by stepping
// back from it.
static_assertions::const_assert_eq!(
    offset_of!(CxaException, unwind_header) + mem::size_of::<UnwindException>(),
    mem::size_of::<CxaException>()
);
static_assertions::const_assert_eq!(
    offset_of!(CxaEhabiException, unwind_header) + mem::size_of::<UnwindControlBlock>(),
    mem::size_of::<CxaEhabiException>()
);
#[cfg(target_pointer_width = "64")]
static_assertions::const_assert_eq!(offset_of!(CxaException, adjusted_ptr), 72);
#[cfg(target_pointer_width = "64")]
static_assertions::const_assert_eq!(offset_of!(CxaException, unwind_header), 80);
#[cfg(target_pointer_width = "32")]
static_assertions::const_assert_eq!(offset_of!(UnwindControlBlock, barrier_cache), 32);

/// A layout of the native exception record, selected per unwinding convention
pub trait RecordLayout {
    /// The unwinder header type the personality routine receives
    type Header;

    /// Returns the adjusted pointer cached by phase 1 for a native exception.
    ///
    /// # Safety
    ///
    /// `header` must be the header of a live native C++ exception for which
    /// the host personality has just reported a handler.
    unsafe fn cached_adjusted_ptr(header: *mut Self::Header) -> *mut c_void;
}

/// The Itanium layout, phase 1 results are cached in the `__cxa_exception`
pub enum CachedSearchResult {}
impl CachedSearchResult {
    /// Recovers the enclosing record from its unwinder header
    ///
    /// # Safety
    ///
    /// `header` must point to the `unwind_header` field of a `CxaException`.
    #[inline]
    pub unsafe fn record(header: *mut UnwindException) -> *mut CxaException {
        header
            .byte_sub(offset_of!(CxaException, unwind_header))
            .cast::<CxaException>()
    }
}
impl RecordLayout for CachedSearchResult {
    type Header = UnwindException;

    #[inline]
    unsafe fn cached_adjusted_ptr(header: *mut UnwindException) -> *mut c_void {
        (*Self::record(header)).adjusted_ptr
    }
}

/// The ARM EHABI layout, phase 1 results are cached in the control block
pub enum PropagatingStack {}
impl PropagatingStack {
    /// Recovers the enclosing record from its control block
    ///
    /// # Safety
    ///
    /// `header` must point to the `unwind_header` field of a `CxaEhabiException`.
    #[inline]
    pub unsafe fn record(header: *mut UnwindControlBlock) -> *mut CxaEhabiException {
        header
            .byte_sub(offset_of!(CxaEhabiException, unwind_header))
            .cast::<CxaEhabiException>()
    }
}
impl RecordLayout for PropagatingStack {
    type Header = UnwindControlBlock;

    #[inline]
    unsafe fn cached_adjusted_ptr(header: *mut UnwindControlBlock) -> *mut c_void {
        (*header).barrier_cache.bitpattern[0] as *mut c_void
    }
}

cfg_if::cfg_if! {
    if #[cfg(all(target_arch = "arm", not(target_vendor = "apple"), not(target_os = "netbsd")))] {
        pub type TargetLayout = PropagatingStack;
    } else {
        pub type TargetLayout = CachedSearchResult;
    }
}
