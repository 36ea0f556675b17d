use core::ffi::c_int;
use core::fmt;

/// The only version of the personality routine interface we know how to handle
pub const UNWIND_VERSION: c_int = 1;

bitflags::bitflags! {
    /// The `_Unwind_Action` bitmask passed to a personality routine
    #[repr(transparent)]
    pub struct UnwindAction: c_int {
        /// Phase 1: find a handler, but do not touch the stack
        const SEARCH_PHASE = 1;
        /// Phase 2: run cleanups and install landing pads
        const CLEANUP_PHASE = 2;
        /// Set during phase 2 on the frame which reported the handler in phase 1
        const HANDLER_FRAME = 4;
        /// Unwinding was started by `_Unwind_ForcedUnwind`, handlers must not catch
        const FORCE_UNWIND = 8;
        /// Set by some unwinders on the last frame of a forced unwind
        const END_OF_STACK = 16;
    }
}
impl UnwindAction {
    /// Returns true if this is a phase 1 request with no other action bits set
    #[inline]
    pub fn is_search_only(self) -> bool {
        self == Self::SEARCH_PHASE
    }
}

/// The `_Unwind_State` values an ARM EHABI personality routine receives in
/// place of a version and an action mask
pub mod ehabi_state {
    use core::ffi::c_int;

    /// Phase 1, the frame is being searched for a handler
    pub const VIRTUAL_UNWIND_FRAME: c_int = 0;
    /// Phase 2, the frame is being unwound
    pub const UNWIND_FRAME_STARTING: c_int = 1;
    /// Phase 2, unwinding of the frame resumes after a cleanup
    pub const UNWIND_FRAME_RESUME: c_int = 2;
    pub const ACTION_MASK: c_int = 3;
    /// Set when unwinding was started by `_Unwind_ForcedUnwind`
    pub const FORCE_UNWIND: c_int = 8;
}

/// The `_Unwind_Reason_Code` returned by a personality routine
///
/// This is a plain integer rather than an enum: the host personality may return
/// codes we have no name for (e.g. `_URC_FAILURE` from the ARM EHABI
/// unwinder), and those must be passed on unchanged.
#[repr(transparent)]
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct UnwindReasonCode(c_int);
impl UnwindReasonCode {
    pub const NO_REASON: Self = Self(0);
    pub const FOREIGN_EXCEPTION_CAUGHT: Self = Self(1);
    pub const FATAL_PHASE2_ERROR: Self = Self(2);
    pub const FATAL_PHASE1_ERROR: Self = Self(3);
    pub const NORMAL_STOP: Self = Self(4);
    pub const END_OF_STACK: Self = Self(5);
    pub const HANDLER_FOUND: Self = Self(6);
    pub const INSTALL_CONTEXT: Self = Self(7);
    pub const CONTINUE_UNWIND: Self = Self(8);
    /// Only defined by the ARM EHABI unwinder
    pub const FAILURE: Self = Self(9);

    /// Every code defined by `unwind.h`, in numeric order
    pub const ALL: [Self; 10] = [
        Self::NO_REASON,
        Self::FOREIGN_EXCEPTION_CAUGHT,
        Self::FATAL_PHASE2_ERROR,
        Self::FATAL_PHASE1_ERROR,
        Self::NORMAL_STOP,
        Self::END_OF_STACK,
        Self::HANDLER_FOUND,
        Self::INSTALL_CONTEXT,
        Self::CONTINUE_UNWIND,
        Self::FAILURE,
    ];

    #[inline]
    pub const fn new(raw: c_int) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn as_c_int(self) -> c_int {
        self.0
    }

    /// Returns the `unwind.h` name of this code, if it has one
    pub fn name(self) -> Option<&'static str> {
        let name = match self.0 {
            0 => "_URC_NO_REASON",
            1 => "_URC_FOREIGN_EXCEPTION_CAUGHT",
            2 => "_URC_FATAL_PHASE2_ERROR",
            3 => "_URC_FATAL_PHASE1_ERROR",
            4 => "_URC_NORMAL_STOP",
            5 => "_URC_END_OF_STACK",
            6 => "_URC_HANDLER_FOUND",
            7 => "_URC_INSTALL_CONTEXT",
            8 => "_URC_CONTINUE_UNWIND",
            9 => "_URC_FAILURE",
            _ => return None,
        };
        Some(name)
    }
}
impl fmt::Debug for UnwindReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "UnwindReasonCode({})", self.0),
        }
    }
}

static_assertions::assert_eq_size!(UnwindReasonCode, c_int);
static_assertions::assert_eq_size!(UnwindAction, c_int);

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn search_only_excludes_every_other_bit() {
        assert!(UnwindAction::SEARCH_PHASE.is_search_only());
        assert!(!(UnwindAction::SEARCH_PHASE | UnwindAction::FORCE_UNWIND).is_search_only());
        assert!(!(UnwindAction::SEARCH_PHASE | UnwindAction::CLEANUP_PHASE).is_search_only());
        assert!(!UnwindAction::CLEANUP_PHASE.is_search_only());
        assert!(!(UnwindAction::CLEANUP_PHASE | UnwindAction::HANDLER_FRAME).is_search_only());
        assert!(!UnwindAction::empty().is_search_only());
    }

    #[test]
    fn reason_codes_match_unwind_h() {
        assert_eq!(UnwindReasonCode::NO_REASON.as_c_int(), 0);
        assert_eq!(UnwindReasonCode::FATAL_PHASE2_ERROR.as_c_int(), 2);
        assert_eq!(UnwindReasonCode::FATAL_PHASE1_ERROR.as_c_int(), 3);
        assert_eq!(UnwindReasonCode::HANDLER_FOUND.as_c_int(), 6);
        assert_eq!(UnwindReasonCode::CONTINUE_UNWIND.as_c_int(), 8);
        assert_eq!(UnwindReasonCode::FAILURE.as_c_int(), 9);
        for (i, code) in UnwindReasonCode::ALL.iter().enumerate() {
            assert_eq!(code.as_c_int(), i as c_int);
            assert!(code.name().is_some());
        }
    }

    #[test]
    fn unknown_reason_codes_are_kept_verbatim() {
        let code = UnwindReasonCode::new(42);
        assert_eq!(code.as_c_int(), 42);
        assert_eq!(code.name(), None);
        assert_eq!(format!("{:?}", code), "UnwindReasonCode(42)");
        assert_eq!(format!("{:?}", UnwindReasonCode::FAILURE), "_URC_FAILURE");
    }
}
