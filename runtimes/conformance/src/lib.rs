//! Runs real C++ code through `__noexcept_personality`.
//!
//! The build script compiles `fixtures/boundary.cpp` with the host C++
//! compiler, and switches every function in it over to `__noexcept_personality`,
//! so the host personality routine sees the sentinel type descriptor exactly as
//! it would in code compiled with the `noexcept_plugin` pass.
//!
//! This needs libstdc++ and the generic Itanium unwinder, so the fixture is only
//! built on x86_64 and aarch64 Linux with glibc. Elsewhere [`run`] is absent.
//!
//! A scenario which ends in `std::terminate` exits the whole process, so callers
//! run each scenario in a child process.

// Provides the personality routine and the sentinel type descriptor the fixture links against
extern crate noexcept_personality;

#[cfg(has_cxx_fixture)]
use libc::c_int;

/// The exit status of a scenario which ended in `std::terminate`
pub const TERMINATE_EXIT_CODE: i32 = 70;

/// The exit status of a scenario whose exception reached the caller
pub const CAUGHT_BY_CALLER_EXIT_CODE: i32 = 1;

/// The call chains the fixture can run.
///
/// In all of them, a thrower holding a guard object throws an `int` through a
/// forwarder holding another guard, and the caller of the noexcept function
/// catches `int`. Guards log `~guard in <frame>` to stderr when destroyed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Scenario {
    /// The noexcept function carries the sentinel handler
    Rewritten,
    /// The noexcept function keeps its `must-not-throw` region
    Unrewritten,
    /// Like `Rewritten`, but the exception is rethrown from an `exception_ptr`
    Rethrown,
    /// Like `Rewritten`, but the forwarder catches the exception itself
    CaughtBelowBoundary,
}
impl Scenario {
    pub const ALL: [Self; 4] = [
        Self::Rewritten,
        Self::Unrewritten,
        Self::Rethrown,
        Self::CaughtBelowBoundary,
    ];

    pub fn id(self) -> i32 {
        match self {
            Self::Rewritten => 0,
            Self::Unrewritten => 1,
            Self::Rethrown => 2,
            Self::CaughtBelowBoundary => 3,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|scenario| scenario.id() == id)
    }
}

#[cfg(has_cxx_fixture)]
extern "C" {
    fn noexcept_fixture_run(scenario: c_int) -> c_int;
}

/// Runs `scenario` in the current process.
///
/// Returns `0` if the exception was handled below the noexcept function, or
/// [`CAUGHT_BY_CALLER_EXIT_CODE`] if it escaped to the caller. If the process
/// was terminated, this does not return, and the process exits with
/// [`TERMINATE_EXIT_CODE`].
#[cfg(has_cxx_fixture)]
pub fn run(scenario: Scenario) -> i32 {
    // SAFETY: the fixture catches every exception it throws, or terminates
    unsafe { noexcept_fixture_run(scenario.id()) }
}
