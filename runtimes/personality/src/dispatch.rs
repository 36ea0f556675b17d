use libc::{c_int, c_void};

use noexcept_abi::{ehabi_state, ExceptionClass, UnwindAction, UnwindReasonCode, UNWIND_VERSION};

use crate::layout::RecordLayout;
use crate::sentinel;

/// What the personality routine should do after the host personality has run
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Report this reason code to the unwinder
    Continue(UnwindReasonCode),
    /// The handler found in phase 1 is a noexcept boundary, terminate now
    Terminate,
}

/// Decides whether the verdict of the host personality for this frame is a
/// noexcept violation.
///
/// This is only the case during phase 1 proper (version 1, no bit other than
/// the search phase set), when the host found a handler, and the adjusted
/// pointer it cached for that handler is the marker instance. Foreign
/// exceptions are never diverted, since their record layout is unknown.
///
/// # Safety
///
/// If the host reported a handler for a native exception in phase 1, `header`
/// must be the header of that live exception.
pub unsafe fn classify<L: RecordLayout>(
    version: c_int,
    actions: c_int,
    exception_class: ExceptionClass,
    header: *mut L::Header,
    delegated: UnwindReasonCode,
) -> Verdict {
    let search_only = UnwindAction::from_bits(actions).map_or(false, UnwindAction::is_search_only);
    if version != UNWIND_VERSION || !search_only || delegated != UnwindReasonCode::HANDLER_FOUND {
        return Verdict::Continue(delegated);
    }

    if adjusted_ptr::<L>(exception_class, header) == sentinel::marker_address() {
        Verdict::Terminate
    } else {
        Verdict::Continue(delegated)
    }
}

/// Returns the adjusted pointer of the handler found in phase 1, or null if
/// `exception_class` is foreign.
///
/// # Safety
///
/// See [`classify`].
#[inline]
pub unsafe fn adjusted_ptr<L: RecordLayout>(
    exception_class: ExceptionClass,
    header: *mut L::Header,
) -> *mut c_void {
    if exception_class.is_native() {
        L::cached_adjusted_ptr(header)
    } else {
        core::ptr::null_mut()
    }
}

/// Translates the unwind state of an ARM EHABI personality call into the
/// equivalent Itanium action mask.
///
/// Only `VIRTUAL_UNWIND_FRAME` without `FORCE_UNWIND` is a search phase.
pub fn ehabi_actions(state: c_int) -> UnwindAction {
    let mut actions = match state & ehabi_state::ACTION_MASK {
        ehabi_state::VIRTUAL_UNWIND_FRAME => UnwindAction::SEARCH_PHASE,
        _ => UnwindAction::CLEANUP_PHASE,
    };
    if state & ehabi_state::FORCE_UNWIND != 0 {
        actions |= UnwindAction::FORCE_UNWIND;
    }
    actions
}

#[cfg(test)]
mod tests {
    use core::{mem, ptr};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::layout::{
        CachedSearchResult, CxaEhabiException, CxaException, PropagatingStack, UnwindException,
    };

    const SEARCH: c_int = UnwindAction::SEARCH_PHASE.bits();

    struct Record(Box<CxaException>);
    impl Record {
        fn adjusted_to(class: ExceptionClass, adjusted: *mut c_void) -> Self {
            let mut record: Box<CxaException> = Box::new(unsafe { mem::zeroed() });
            record.adjusted_ptr = adjusted;
            record.unwind_header.exception_class = class.as_u64();
            Self(record)
        }

        fn header(&mut self) -> *mut UnwindException {
            ptr::addr_of_mut!(self.0.unwind_header)
        }

        fn classify(&mut self, version: c_int, actions: c_int, delegated: UnwindReasonCode) -> Verdict {
            let class = ExceptionClass::new(self.0.unwind_header.exception_class);
            unsafe { classify::<CachedSearchResult>(version, actions, class, self.header(), delegated) }
        }
    }

    #[test]
    fn sentinel_handler_in_search_phase_terminates() {
        for class in [ExceptionClass::GNU_CXX_PRIMARY, ExceptionClass::GNU_CXX_DEPENDENT] {
            let mut record = Record::adjusted_to(class, sentinel::marker_address());
            assert_eq!(
                record.classify(1, SEARCH, UnwindReasonCode::HANDLER_FOUND),
                Verdict::Terminate
            );
        }
    }

    #[test]
    fn user_handler_is_left_alone() {
        // An unrelated `catch (int)` above the noexcept boundary
        let mut caught = 3i32;
        let mut record = Record::adjusted_to(
            ExceptionClass::GNU_CXX_PRIMARY,
            ptr::addr_of_mut!(caught).cast(),
        );
        assert_eq!(
            record.classify(1, SEARCH, UnwindReasonCode::HANDLER_FOUND),
            Verdict::Continue(UnwindReasonCode::HANDLER_FOUND)
        );
    }

    #[test]
    fn only_pure_search_phase_is_diverted() {
        let mut record = Record::adjusted_to(ExceptionClass::GNU_CXX_PRIMARY, sentinel::marker_address());
        for actions in [
            UnwindAction::CLEANUP_PHASE,
            UnwindAction::CLEANUP_PHASE | UnwindAction::HANDLER_FRAME,
            UnwindAction::SEARCH_PHASE | UnwindAction::FORCE_UNWIND,
            UnwindAction::CLEANUP_PHASE | UnwindAction::FORCE_UNWIND | UnwindAction::END_OF_STACK,
        ] {
            assert_eq!(
                record.classify(1, actions.bits(), UnwindReasonCode::HANDLER_FOUND),
                Verdict::Continue(UnwindReasonCode::HANDLER_FOUND)
            );
        }
        // Unknown bits are not a search phase either
        assert_eq!(
            record.classify(1, SEARCH | 0x100, UnwindReasonCode::HANDLER_FOUND),
            Verdict::Continue(UnwindReasonCode::HANDLER_FOUND)
        );
    }

    #[test]
    fn version_mismatch_falls_through() {
        let mut record = Record::adjusted_to(ExceptionClass::GNU_CXX_PRIMARY, sentinel::marker_address());
        for version in [0, 2, -1] {
            assert_eq!(
                record.classify(version, SEARCH, UnwindReasonCode::HANDLER_FOUND),
                Verdict::Continue(UnwindReasonCode::HANDLER_FOUND)
            );
        }
    }

    #[test]
    fn other_reason_codes_fall_through() {
        let mut record = Record::adjusted_to(ExceptionClass::GNU_CXX_PRIMARY, sentinel::marker_address());
        for code in UnwindReasonCode::ALL {
            if code == UnwindReasonCode::HANDLER_FOUND {
                continue;
            }
            assert_eq!(record.classify(1, SEARCH, code), Verdict::Continue(code));
        }
    }

    #[test]
    fn foreign_exceptions_always_keep_the_delegated_verdict() {
        // Even if the bytes where a native record would cache the adjusted
        // pointer happen to hold the marker address.
        let foreign = [
            ExceptionClass::from_bytes(*b"MOZ\0RUST"),
            ExceptionClass::from_bytes(*b"GNUCC++\x02"),
            ExceptionClass::from_bytes(*b"CLNGC++\0"),
        ];
        for class in foreign {
            let mut record = Record::adjusted_to(class, sentinel::marker_address());
            for actions in 0..32 {
                for code in UnwindReasonCode::ALL {
                    assert_eq!(record.classify(1, actions, code), Verdict::Continue(code));
                }
            }
            let header = record.header();
            assert!(unsafe { adjusted_ptr::<CachedSearchResult>(class, header) }.is_null());
        }
    }

    #[test]
    fn host_reason_codes_pass_through_unchanged() {
        // Includes `_URC_FAILURE` and codes unknown to `unwind.h`
        let mut record = Record::adjusted_to(ExceptionClass::GNU_CXX_PRIMARY, sentinel::marker_address());
        for raw in [9, 10, 42, -1] {
            let code = UnwindReasonCode::new(raw);
            assert_eq!(record.classify(1, SEARCH, code), Verdict::Continue(code));
            let Verdict::Continue(returned) = record.classify(1, SEARCH, code) else {
                panic!("only a found handler may terminate");
            };
            assert_eq!(returned.as_c_int(), raw);
        }
    }

    #[test]
    fn ehabi_virtual_unwind_is_the_search_phase() {
        assert!(ehabi_actions(ehabi_state::VIRTUAL_UNWIND_FRAME).is_search_only());
        for state in [
            ehabi_state::VIRTUAL_UNWIND_FRAME | ehabi_state::FORCE_UNWIND,
            ehabi_state::UNWIND_FRAME_STARTING,
            ehabi_state::UNWIND_FRAME_RESUME,
            ehabi_state::UNWIND_FRAME_STARTING | ehabi_state::FORCE_UNWIND,
        ] {
            let actions = ehabi_actions(state);
            assert!(!actions.is_search_only(), "state {} is not a search", state);
        }
        assert_eq!(
            ehabi_actions(ehabi_state::UNWIND_FRAME_RESUME),
            UnwindAction::CLEANUP_PHASE
        );
        assert_eq!(
            ehabi_actions(ehabi_state::VIRTUAL_UNWIND_FRAME | ehabi_state::FORCE_UNWIND),
            UnwindAction::SEARCH_PHASE | UnwindAction::FORCE_UNWIND
        );
    }

    #[test]
    fn ehabi_sentinel_handler_terminates_only_in_search() {
        let mut record: Box<CxaEhabiException> = Box::new(unsafe { mem::zeroed() });
        record.unwind_header.exception_class = ExceptionClass::GNU_CXX_PRIMARY.to_bytes();
        record.unwind_header.barrier_cache.bitpattern[0] = sentinel::marker_address() as usize;
        let header = ptr::addr_of_mut!(record.unwind_header);

        let classify_state = move |state: c_int, delegated: UnwindReasonCode| {
            let class = ExceptionClass::from_bytes(unsafe { (*header).exception_class });
            let actions = ehabi_actions(state).bits();
            unsafe { classify::<PropagatingStack>(UNWIND_VERSION, actions, class, header, delegated) }
        };

        assert_eq!(
            classify_state(ehabi_state::VIRTUAL_UNWIND_FRAME, UnwindReasonCode::HANDLER_FOUND),
            Verdict::Terminate
        );
        for state in [
            ehabi_state::VIRTUAL_UNWIND_FRAME | ehabi_state::FORCE_UNWIND,
            ehabi_state::UNWIND_FRAME_STARTING,
            ehabi_state::UNWIND_FRAME_RESUME,
        ] {
            assert_eq!(
                classify_state(state, UnwindReasonCode::HANDLER_FOUND),
                Verdict::Continue(UnwindReasonCode::HANDLER_FOUND)
            );
        }
        assert_eq!(
            classify_state(ehabi_state::VIRTUAL_UNWIND_FRAME, UnwindReasonCode::FAILURE),
            Verdict::Continue(UnwindReasonCode::FAILURE)
        );

        // A user handler caches the thrown object instead
        let mut caught = 3i32;
        unsafe {
            (*header).barrier_cache.bitpattern[0] = ptr::addr_of_mut!(caught) as usize;
        }
        assert_eq!(
            classify_state(ehabi_state::VIRTUAL_UNWIND_FRAME, UnwindReasonCode::HANDLER_FOUND),
            Verdict::Continue(UnwindReasonCode::HANDLER_FOUND)
        );
    }
}
