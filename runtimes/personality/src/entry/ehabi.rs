//! The personality routine for targets using the ARM EHABI unwinder.
//!
//! EHABI personalities receive an unwind state instead of a version and an
//! action bitmask, and read the exception class from the control block.
use libc::{c_int, c_void};

use noexcept_abi::{ExceptionClass, UnwindReasonCode, UNWIND_VERSION};

use crate::dispatch::{classify, ehabi_actions, Verdict};
use crate::layout::{PropagatingStack, UnwindContext, UnwindControlBlock};

extern "C" {
    #[link_name = "__gxx_personality_v0"]
    fn gxx_personality_v0(
        state: c_int,
        header: *mut UnwindControlBlock,
        context: *mut UnwindContext,
    ) -> UnwindReasonCode;

    #[link_name = "__cxa_begin_catch"]
    fn cxa_begin_catch(header: *mut c_void) -> *mut c_void;

    #[link_name = "_ZSt9terminatev"]
    fn std_terminate() -> !;
}

/// Installed by the compiler pass as the personality of every function.
///
/// See the Itanium variant; the only difference is how the search phase is
/// recognized.
#[no_mangle]
pub unsafe extern "C" fn __noexcept_personality(
    state: c_int,
    header: *mut UnwindControlBlock,
    context: *mut UnwindContext,
) -> UnwindReasonCode {
    let delegated = gxx_personality_v0(state, header, context);
    let actions = ehabi_actions(state);
    let class = ExceptionClass::from_bytes((*header).exception_class);
    match classify::<PropagatingStack>(UNWIND_VERSION, actions.bits(), class, header, delegated) {
        Verdict::Continue(reason) => reason,
        Verdict::Terminate => terminate(header.cast()),
    }
}

#[cold]
unsafe fn terminate(header: *mut c_void) -> ! {
    cxa_begin_catch(header);
    std_terminate()
}
