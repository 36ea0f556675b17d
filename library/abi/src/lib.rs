//! This crate contains the protocol shared between the `noexcept_personality`
//! runtime and the compiler pass which rewrites noexcept functions to use it.
//!
//! Both halves have to agree on three things:
//!
//! 1. The symbol names of the personality routine and of the sentinel type
//!    descriptor, since the compiler only ever refers to them by name.
//! 2. The encoding of the Itanium unwinder interface (actions, reason codes,
//!    exception classes), since the runtime has to be a drop-in replacement for
//!    the host C++ personality routine.
//! 3. The identity of the sentinel type, which is how the runtime tells apart a
//!    rewritten noexcept boundary from a real user handler.
#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod class;
mod symbols;
mod unwind;

pub use self::class::ExceptionClass;
pub use self::symbols::*;
pub use self::unwind::{ehabi_state, UnwindAction, UnwindReasonCode, UNWIND_VERSION};
