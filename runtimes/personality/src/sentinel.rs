//! The sentinel type, `__noexcept_marker`.
//!
//! The compiler pass rewrites every noexcept boundary into a handler which
//! catches `__noexcept_marker`. There is no such C++ class: the only thing
//! which exists is its type descriptor, `typeinfo for __noexcept_marker`,
//! which we lay out by hand here as an Itanium `std::type_info`.
//!
//! The host personality decides whether a handler matches by calling the
//! virtual `__do_catch` of the handler's type descriptor with the thrown type.
//! Ours says yes to everything, and reports the address of the marker instance
//! as the adjusted pointer. That address is how [`crate::dispatch`] recognizes a
//! noexcept boundary afterwards.
use core::ptr;

use libc::{c_char, c_uint, c_void};

use noexcept_abi::SENTINEL_MANGLED_NAME;

/// The layout of `std::type_info`
#[repr(C)]
pub struct TypeInfo {
    vtable: *const TypeInfoVTable,
    name: *const c_char,
}
impl TypeInfo {
    /// Returns the mangled name of the described type, as `type_info::name` would
    pub fn name(&self) -> *const c_char {
        self.name
    }
}

/// How a type descriptor decides whether a handler for it catches a thrown type
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MatchPredicate {
    /// Matches only the described type itself
    ExactType,
    /// Matches any thrown type, and adjusts the thrown object to the marker
    AlwaysMatch,
}
impl MatchPredicate {
    /// Applies this predicate to a thrown exception of type `thrown`.
    ///
    /// On a match, `adjusted` holds the pointer the handler will receive.
    ///
    /// # Safety
    ///
    /// `adjusted` must be valid for writes, and `thrown` must be null or a
    /// valid type descriptor.
    pub unsafe fn matches(
        self,
        this: &TypeInfo,
        thrown: *const TypeInfo,
        adjusted: *mut *mut c_void,
    ) -> bool {
        match self {
            Self::AlwaysMatch => {
                adjusted.write(marker_address());
                true
            }
            Self::ExactType => same_type(this, thrown),
        }
    }
}

/// A type descriptor whose matching is driven by a [`MatchPredicate`]
#[repr(C)]
pub struct MarkerTypeInfo {
    base: TypeInfo,
    predicate: MatchPredicate,
}
impl MarkerTypeInfo {
    #[inline]
    pub fn as_type_info(&self) -> &TypeInfo {
        &self.base
    }

    #[inline]
    pub fn predicate(&self) -> MatchPredicate {
        self.predicate
    }

    /// Calls `__do_catch` through the vtable, exactly as the host personality does
    ///
    /// # Safety
    ///
    /// See [`MatchPredicate::matches`].
    pub unsafe fn do_catch(
        &self,
        thrown: *const TypeInfo,
        adjusted: *mut *mut c_void,
        outer: c_uint,
    ) -> bool {
        ((*self.base.vtable).do_catch)(self, thrown, adjusted, outer)
    }
}
unsafe impl Sync for MarkerTypeInfo {}

/// The virtual functions of `std::type_info`, in libstdc++ declaration order
#[repr(C)]
struct TypeInfoVTable {
    complete_dtor: unsafe extern "C" fn(*const MarkerTypeInfo),
    deleting_dtor: unsafe extern "C" fn(*const MarkerTypeInfo),
    is_pointer_p: unsafe extern "C" fn(*const MarkerTypeInfo) -> bool,
    is_function_p: unsafe extern "C" fn(*const MarkerTypeInfo) -> bool,
    do_catch: unsafe extern "C" fn(
        *const MarkerTypeInfo,
        *const TypeInfo,
        *mut *mut c_void,
        c_uint,
    ) -> bool,
    do_upcast: unsafe extern "C" fn(*const MarkerTypeInfo, *const c_void, *mut *mut c_void) -> bool,
}

/// A complete vtable; the vtable pointer of an object points at `functions`
#[repr(C)]
struct VTable {
    offset_to_top: isize,
    rtti: *const c_void,
    functions: TypeInfoVTable,
}
unsafe impl Sync for VTable {}

static MARKER_VTABLE: VTable = VTable {
    offset_to_top: 0,
    rtti: ptr::null(),
    functions: TypeInfoVTable {
        complete_dtor: marker_dtor,
        deleting_dtor: marker_dtor,
        is_pointer_p: marker_is_pointer_p,
        is_function_p: marker_is_function_p,
        do_catch: marker_do_catch,
        do_upcast: marker_do_upcast,
    },
};

/// `typeinfo for __noexcept_marker`
///
/// The export name must stay in sync with `noexcept_abi::SENTINEL_TYPEINFO_SYMBOL`.
#[export_name = "_ZTI17__noexcept_marker"]
pub static SENTINEL_TYPE_INFO: MarkerTypeInfo = MarkerTypeInfo {
    base: TypeInfo {
        vtable: &MARKER_VTABLE.functions,
        name: SENTINEL_MANGLED_NAME.as_ptr().cast(),
    },
    predicate: MatchPredicate::AlwaysMatch,
};

/// The object every exception caught by the sentinel is adjusted to.
///
/// Not zero-sized, so that no other static can share its address.
#[repr(C)]
struct NoexceptMarker {
    _private: u8,
}

static NOEXCEPT_MARKER: NoexceptMarker = NoexceptMarker { _private: 0 };

/// Returns the address of the marker instance
#[inline]
pub fn marker_address() -> *mut c_void {
    ptr::addr_of!(NOEXCEPT_MARKER) as *mut c_void
}

unsafe fn same_type(this: &TypeInfo, thrown: *const TypeInfo) -> bool {
    if thrown.is_null() {
        return false;
    }
    if ptr::eq(this, thrown) {
        return true;
    }
    // Names beginning with '*' are local to their object file and compare by address only
    let name = this.name;
    let other = (*thrown).name;
    if name.is_null() || other.is_null() || *name == b'*' as c_char {
        return false;
    }
    libc::strcmp(name, other) == 0
}

unsafe extern "C" fn marker_dtor(_this: *const MarkerTypeInfo) {}

unsafe extern "C" fn marker_is_pointer_p(_this: *const MarkerTypeInfo) -> bool {
    false
}

unsafe extern "C" fn marker_is_function_p(_this: *const MarkerTypeInfo) -> bool {
    false
}

unsafe extern "C" fn marker_do_catch(
    this: *const MarkerTypeInfo,
    thrown: *const TypeInfo,
    adjusted: *mut *mut c_void,
    _outer: c_uint,
) -> bool {
    let this = &*this;
    this.predicate.matches(&this.base, thrown, adjusted)
}

unsafe extern "C" fn marker_do_upcast(
    _this: *const MarkerTypeInfo,
    _target: *const c_void,
    _obj: *mut *mut c_void,
) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use core::ffi::CStr;

    use pretty_assertions::assert_eq;

    use super::*;

    static INT_TYPE_INFO: MarkerTypeInfo = MarkerTypeInfo {
        base: TypeInfo {
            vtable: &MARKER_VTABLE.functions,
            name: b"i\0".as_ptr().cast(),
        },
        predicate: MatchPredicate::ExactType,
    };

    static OTHER_INT_TYPE_INFO: MarkerTypeInfo = MarkerTypeInfo {
        base: TypeInfo {
            vtable: &MARKER_VTABLE.functions,
            name: b"i\0".as_ptr().cast(),
        },
        predicate: MatchPredicate::ExactType,
    };

    static LONG_TYPE_INFO: MarkerTypeInfo = MarkerTypeInfo {
        base: TypeInfo {
            vtable: &MARKER_VTABLE.functions,
            name: b"l\0".as_ptr().cast(),
        },
        predicate: MatchPredicate::ExactType,
    };

    #[test]
    fn sentinel_catches_everything_and_adjusts_to_marker() {
        let mut thrown_object = 3i32;
        for thrown in [
            INT_TYPE_INFO.as_type_info() as *const TypeInfo,
            LONG_TYPE_INFO.as_type_info(),
            SENTINEL_TYPE_INFO.as_type_info(),
            ptr::null(),
        ] {
            let mut adjusted = ptr::addr_of_mut!(thrown_object).cast::<c_void>();
            let caught = unsafe { SENTINEL_TYPE_INFO.do_catch(thrown, &mut adjusted, 1) };
            assert!(caught);
            assert_eq!(adjusted, marker_address());
        }
    }

    #[test]
    fn exact_type_matches_by_identity_or_name() {
        let mut thrown_object = 3i32;
        let original = ptr::addr_of_mut!(thrown_object).cast::<c_void>();
        let mut adjusted = original;
        unsafe {
            assert!(INT_TYPE_INFO.do_catch(INT_TYPE_INFO.as_type_info(), &mut adjusted, 1));
            assert!(INT_TYPE_INFO.do_catch(OTHER_INT_TYPE_INFO.as_type_info(), &mut adjusted, 1));
            assert!(!INT_TYPE_INFO.do_catch(LONG_TYPE_INFO.as_type_info(), &mut adjusted, 1));
            assert!(!INT_TYPE_INFO.do_catch(ptr::null(), &mut adjusted, 1));
        }
        assert_eq!(adjusted, original);
    }

    #[test]
    fn sentinel_descriptor_has_mangled_name() {
        let name = unsafe { CStr::from_ptr(SENTINEL_TYPE_INFO.as_type_info().name()) };
        assert_eq!(name.to_bytes(), b"17__noexcept_marker");
        assert_eq!(SENTINEL_TYPE_INFO.predicate(), MatchPredicate::AlwaysMatch);
    }

    #[test]
    fn sentinel_is_neither_pointer_nor_function() {
        let vtable = unsafe { &*SENTINEL_TYPE_INFO.base.vtable };
        unsafe {
            assert!(!(vtable.is_pointer_p)(&SENTINEL_TYPE_INFO));
            assert!(!(vtable.is_function_p)(&SENTINEL_TYPE_INFO));
        }
        assert_eq!(MARKER_VTABLE.offset_to_top, 0);
    }
}
