use std::sync::OnceLock;

use noexcept_abi::PERSONALITY_SYMBOL;
use noexcept_ir::{DeclFlags, DeclRef, FunctionDecl, FunctionType, Type};

/// Builds the external declaration of `__noexcept_personality`.
///
/// The signature is the one the host gives its own personality routines:
/// `unsigned int (int, int, long long unsigned int, void *, void *)`.
pub fn personality_decl() -> DeclRef {
    let ty = FunctionType::new(
        vec![
            Type::Int,
            Type::Int,
            Type::UnsignedLongLong,
            Type::Ptr,
            Type::Ptr,
        ],
        Type::Unsigned,
    );
    FunctionDecl::new(PERSONALITY_SYMBOL, ty)
        .with_flags(DeclFlags::ARTIFICIAL | DeclFlags::EXTERNAL | DeclFlags::PUBLIC)
        .into_ref()
}

/// The personality declaration of the compilation unit being processed.
///
/// Every function of a unit must refer to the very same declaration object;
/// the inliner refuses to inline across functions whose personalities differ,
/// which is a hard error for `always_inline` functions. The declaration must
/// not outlive its unit either, so the cache is reset between units.
#[derive(Debug, Default)]
pub struct PersonalityCache {
    decl: OnceLock<DeclRef>,
}
impl PersonalityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the declaration for this unit, creating it on first use
    pub fn get_or_init(&self) -> &DeclRef {
        self.decl.get_or_init(personality_decl)
    }

    /// Forgets the declaration of the previous unit
    pub fn reset(&mut self) {
        self.decl = OnceLock::new();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn declaration_matches_host_personality_signature() {
        let decl = personality_decl();
        assert_eq!(decl.name(), "__noexcept_personality");
        assert_eq!(
            decl.ty().to_string(),
            "unsigned int (int, int, long long unsigned int, void *, void *)"
        );
        assert!(decl.is_runtime_symbol());
        assert!(!decl.is_nothrow());
    }

    #[test]
    fn cache_is_created_lazily_and_reused() {
        let cache = PersonalityCache::new();
        let first = cache.get_or_init().clone();
        let second = cache.get_or_init().clone();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, cache.get_or_init()));
    }

    #[test]
    fn reset_starts_a_new_unit() {
        let mut cache = PersonalityCache::new();
        let first = cache.get_or_init().clone();
        cache.reset();

        let second = cache.get_or_init().clone();
        assert!(!Arc::ptr_eq(&first, &second));
        // Distinct objects, but equal declarations
        assert_eq!(first, second);
    }
}
