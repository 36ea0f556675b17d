//! A model of the structured function IR of the host compiler, as it looks
//! before exception handling is lowered.
//!
//! At that point, a function body is a tree of statement sequences. Exception
//! regions are still explicit `try` statements: a `try`/`catch` whose cleanup
//! holds `catch` clauses or a single `must-not-throw` marker, and a
//! `try`/`finally` whose cleanup runs on every exit. The front end wraps the
//! body of every noexcept function in a `try`/`catch` whose cleanup is a
//! `must-not-throw` which calls `std::terminate`.
//!
//! Declarations are shared: a [`DeclRef`] is reference counted, and two
//! references denote the same declaration only if they point to the same
//! object.
mod decl;
mod function;
mod printer;
mod stmt;
mod types;

pub use self::decl::{DeclFlags, DeclRef, FunctionDecl};
pub use self::function::{Function, Unit};
pub use self::stmt::{
    Builtin, Call, Callee, Catch, MustNotThrow, Operand, Seq, Stmt, Temp, Try, TryKind,
};
pub use self::types::{FunctionType, RecordType, Type};
