use alloc::format;
use alloc::string::String;

/// The symbol name of the replacement personality routine.
///
/// The compiler pass installs an external declaration with this name on every
/// function it processes, and the runtime exports a definition of it.
pub const PERSONALITY_SYMBOL: &str = "__noexcept_personality";

/// Called from the synthesized handler to move the exception into the caught state
pub const BEGIN_CATCH_SYMBOL: &str = "__cxa_begin_catch";

/// The source-level name of the sentinel type
pub const SENTINEL_TYPE_NAME: &str = "__noexcept_marker";

/// The exported type descriptor (`typeinfo for __noexcept_marker`) of the sentinel type.
///
/// This is the only sentinel symbol with default visibility. Every compilation
/// unit which catches the sentinel refers to it, and the runtime provides the
/// single definition they all resolve to.
pub const SENTINEL_TYPEINFO_SYMBOL: &str = "_ZTI17__noexcept_marker";

/// The mangled name string referenced by the sentinel's type descriptor
pub const SENTINEL_TYPENAME_SYMBOL: &str = "_ZTS17__noexcept_marker";

/// The NUL-terminated name returned by `type_info::name` for the sentinel
pub const SENTINEL_MANGLED_NAME: &[u8] = b"17__noexcept_marker\0";

/// Mangles `name` as an Itanium source name, i.e. `<length><identifier>`
pub fn mangle_source_name(name: &str) -> String {
    format!("{}{}", name.len(), name)
}

/// Returns the `typeinfo for <name>` symbol of a class named `name` in the global namespace
pub fn typeinfo_symbol(name: &str) -> String {
    format!("_ZTI{}", mangle_source_name(name))
}

/// Returns the `typeinfo name for <name>` symbol of a class named `name` in the global namespace
pub fn typeinfo_name_symbol(name: &str) -> String {
    format!("_ZTS{}", mangle_source_name(name))
}
