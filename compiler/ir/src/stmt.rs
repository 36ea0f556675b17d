use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::{DeclRef, Type};

/// A compiler temporary, unique within its function
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Temp {
    id: u32,
    prefix: String,
    ty: Type,
}
impl Temp {
    pub(crate) fn new(id: u32, prefix: String, ty: Type) -> Self {
        Self { id, prefix, ty }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }
}
impl fmt::Display for Temp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", &self.prefix, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Int(i64),
    Temp(Temp),
}
impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{}", i),
            Self::Temp(temp) => write!(f, "{}", temp),
        }
    }
}

/// Compiler builtins which are expanded during lowering rather than called
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// `__builtin_eh_pointer (region)`, the exception object of the current handler
    EhPointer,
}
impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::EhPointer => f.write_str("__builtin_eh_pointer"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callee {
    Decl(DeclRef),
    Builtin(Builtin),
}
impl Callee {
    pub fn decl(&self) -> Option<&DeclRef> {
        match self {
            Self::Decl(decl) => Some(decl),
            Self::Builtin(_) => None,
        }
    }
}
impl fmt::Display for Callee {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Decl(decl) => write!(f, "{}", decl.name()),
            Self::Builtin(builtin) => write!(f, "{}", builtin),
        }
    }
}

/// A call, optionally assigning its result to a temporary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub lhs: Option<Temp>,
    pub callee: Callee,
    pub args: Vec<Operand>,
}
impl Call {
    pub fn new(callee: Callee, args: Vec<Operand>) -> Self {
        Self {
            lhs: None,
            callee,
            args,
        }
    }

    pub fn with_lhs(mut self, lhs: Temp) -> Self {
        self.lhs = Some(lhs);
        self
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TryKind {
    /// The cleanup runs only when an exception leaves `eval`
    Catch,
    /// The cleanup runs on every exit from `eval`
    Finally,
}

/// An exception region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Try {
    pub kind: TryKind,
    pub eval: Seq,
    pub cleanup: Seq,
}

/// A handler clause, found in the cleanup of a `try`/`catch`
///
/// An empty list of types catches everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catch {
    pub types: Vec<Type>,
    pub handler: Seq,
}

/// The cleanup of a region which no exception may leave.
///
/// Should an exception reach it, `fault` is called; the front end uses
/// `std::terminate` for noexcept functions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MustNotThrow {
    pub fault: DeclRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Call(Call),
    Try(Try),
    Catch(Catch),
    MustNotThrow(MustNotThrow),
    /// A lexical block
    Bind(Seq),
    Return(Option<Operand>),
}
impl Stmt {
    /// Returns true if this is a `try`/`catch` whose cleanup is a `must-not-throw`,
    /// the shape of the region enforcing a non-throwing contract.
    pub fn is_must_not_throw_region(&self) -> bool {
        self.as_must_not_throw_region().is_some()
    }

    /// Returns the `try` and its `must-not-throw` cleanup, if this is such a region
    pub fn as_must_not_throw_region(&self) -> Option<(&Try, &MustNotThrow)> {
        let Self::Try(region) = self else {
            return None;
        };
        if region.kind != TryKind::Catch {
            return None;
        }
        match region.cleanup.first() {
            Some(Self::MustNotThrow(mnt)) => Some((region, mnt)),
            _ => None,
        }
    }
}
impl From<Call> for Stmt {
    fn from(call: Call) -> Self {
        Self::Call(call)
    }
}
impl From<Try> for Stmt {
    fn from(region: Try) -> Self {
        Self::Try(region)
    }
}
impl From<Catch> for Stmt {
    fn from(catch: Catch) -> Self {
        Self::Catch(catch)
    }
}
impl From<MustNotThrow> for Stmt {
    fn from(mnt: MustNotThrow) -> Self {
        Self::MustNotThrow(mnt)
    }
}

/// A sequence of statements
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Seq(Vec<Stmt>);
impl Seq {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single<S: Into<Stmt>>(stmt: S) -> Self {
        Self(vec![stmt.into()])
    }

    pub fn push<S: Into<Stmt>>(&mut self, stmt: S) {
        self.0.push(stmt.into());
    }
}
impl Deref for Seq {
    type Target = [Stmt];

    fn deref(&self) -> &Self::Target {
        self.0.as_slice()
    }
}
impl DerefMut for Seq {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0.as_mut_slice()
    }
}
impl From<Vec<Stmt>> for Seq {
    fn from(stmts: Vec<Stmt>) -> Self {
        Self(stmts)
    }
}
impl FromIterator<Stmt> for Seq {
    fn from_iter<I: IntoIterator<Item = Stmt>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
