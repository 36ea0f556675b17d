//! The personality routine for targets using the generic Itanium unwinder.
use libc::{c_int, c_void};

use noexcept_abi::{ExceptionClass, UnwindReasonCode};

use crate::dispatch::{classify, Verdict};
use crate::layout::{CachedSearchResult, UnwindContext, UnwindException};

extern "C" {
    #[link_name = "__gxx_personality_v0"]
    fn gxx_personality_v0(
        version: c_int,
        actions: c_int,
        exception_class: u64,
        header: *mut UnwindException,
        context: *mut UnwindContext,
    ) -> UnwindReasonCode;

    #[link_name = "__cxa_begin_catch"]
    fn cxa_begin_catch(header: *mut c_void) -> *mut c_void;

    #[link_name = "_ZSt9terminatev"]
    fn std_terminate() -> !;
}

/// Installed by the compiler pass as the personality of every function.
///
/// Behaves exactly like `__gxx_personality_v0`, except that a handler found
/// in phase 1 at a rewritten noexcept boundary terminates the process
/// immediately, before phase 2 gets a chance to run any cleanups.
#[no_mangle]
pub unsafe extern "C" fn __noexcept_personality(
    version: c_int,
    actions: c_int,
    exception_class: u64,
    header: *mut UnwindException,
    context: *mut UnwindContext,
) -> UnwindReasonCode {
    let delegated = gxx_personality_v0(version, actions, exception_class, header, context);
    let class = ExceptionClass::new(exception_class);
    match classify::<CachedSearchResult>(version, actions, class, header, delegated) {
        Verdict::Continue(reason) => reason,
        Verdict::Terminate => terminate(header.cast()),
    }
}

/// Moves the exception into the caught state, so that the terminate handler
/// can inspect it via `std::current_exception`, then terminates.
///
/// The exception's own terminate handler is not used: no unwinding has
/// happened yet, so this thread cannot have seen a different handler than the
/// one currently installed.
#[cold]
unsafe fn terminate(header: *mut c_void) -> ! {
    cxa_begin_catch(header);
    std_terminate()
}
