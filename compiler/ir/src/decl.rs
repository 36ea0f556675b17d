use std::fmt;
use std::sync::Arc;

use crate::FunctionType;

bitflags::bitflags! {
    /// Linkage properties of a declaration
    pub struct DeclFlags: u8 {
        /// Synthesized by the compiler, not written in the source
        const ARTIFICIAL = 1;
        /// Defined in some other unit
        const EXTERNAL = 1 << 1;
        /// Visible outside of this unit
        const PUBLIC = 1 << 2;
    }
}
impl Default for DeclFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// A shared reference to a declaration.
///
/// Identity matters: use [`Arc::ptr_eq`] to ask whether two references denote
/// the same declaration.
pub type DeclRef = Arc<FunctionDecl>;

/// A function declaration
#[derive(Debug, PartialEq, Eq)]
pub struct FunctionDecl {
    name: String,
    ty: FunctionType,
    flags: DeclFlags,
}
impl FunctionDecl {
    pub fn new<S: Into<String>>(name: S, ty: FunctionType) -> Self {
        Self {
            name: name.into(),
            ty,
            flags: DeclFlags::default(),
        }
    }

    pub fn with_flags(mut self, flags: DeclFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Converts this declaration into a shareable reference
    pub fn into_ref(self) -> DeclRef {
        Arc::new(self)
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn ty(&self) -> &FunctionType {
        &self.ty
    }

    pub fn flags(&self) -> DeclFlags {
        self.flags
    }

    pub fn is_nothrow(&self) -> bool {
        self.ty.is_nothrow()
    }

    /// An artificial, public, external declaration: a reference to a runtime symbol
    pub fn is_runtime_symbol(&self) -> bool {
        self.flags
            .contains(DeclFlags::ARTIFICIAL | DeclFlags::EXTERNAL | DeclFlags::PUBLIC)
    }
}
impl fmt::Display for FunctionDecl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name.as_str())
    }
}
