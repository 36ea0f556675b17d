use std::ptr;

use libc::{c_int, c_void};

use noexcept_abi::{ExceptionClass, UnwindReasonCode};
use noexcept_personality::sentinel::{MarkerTypeInfo, SENTINEL_TYPE_INFO};

extern "C" {
    #[link_name = "_ZTI17__noexcept_marker"]
    static LINKED_SENTINEL_TYPE_INFO: MarkerTypeInfo;

    #[link_name = "__noexcept_personality"]
    fn linked_personality();
}

#[test]
fn sentinel_type_info_resolves_by_symbol_name() {
    let linked = unsafe { ptr::addr_of!(LINKED_SENTINEL_TYPE_INFO) };
    assert!(ptr::eq(linked, &SENTINEL_TYPE_INFO));
}

#[test]
fn personality_resolves_by_symbol_name() {
    let linked = linked_personality as *const c_void;
    let exported = noexcept_personality::__noexcept_personality as *const c_void;
    assert_eq!(linked, exported);
}

#[cfg(not(target_arch = "arm"))]
#[test]
fn unsupported_version_is_reported_by_the_delegate() {
    use noexcept_personality::layout::{CxaException, UnwindException};

    // The host personality rejects anything but version 1 before it looks at
    // the context, so this exercises the real delegate without a live unwind.
    let mut record: Box<CxaException> = Box::new(unsafe { std::mem::zeroed() });
    record.adjusted_ptr = noexcept_personality::sentinel::marker_address();
    let class = ExceptionClass::GNU_CXX_PRIMARY.as_u64();
    record.unwind_header.exception_class = class;
    let header: *mut UnwindException = ptr::addr_of_mut!(record.unwind_header);

    let search: c_int = 1;
    let reason = unsafe {
        noexcept_personality::__noexcept_personality(2, search, class, header, ptr::null_mut())
    };
    assert_eq!(reason, UnwindReasonCode::FATAL_PHASE1_ERROR);
}
