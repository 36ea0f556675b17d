use core::fmt;

/// The 8-byte tag stored in every `_Unwind_Exception` header which identifies
/// the runtime that raised it.
///
/// Tags are packed the way libsupc++ packs them: the first byte of the vendor
/// string is the most significant byte of the integer.
#[repr(transparent)]
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct ExceptionClass(u64);
impl ExceptionClass {
    /// `GNUCC++\0`, exceptions raised by `__cxa_throw`
    pub const GNU_CXX_PRIMARY: Self = Self::from_bytes(*b"GNUCC++\0");
    /// `GNUCC++\x01`, dependent exceptions raised by `std::rethrow_exception`
    pub const GNU_CXX_DEPENDENT: Self = Self::from_bytes(*b"GNUCC++\x01");

    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(u64::from_be_bytes(bytes))
    }

    #[inline]
    pub const fn to_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns true if this exception was raised by the native C++ runtime, in
    /// which case its header is embedded in a `__cxa_exception` record.
    ///
    /// Anything else is foreign, and its layout is unknown to us.
    #[inline]
    pub const fn is_native(self) -> bool {
        self.0 == Self::GNU_CXX_PRIMARY.0 || self.0 == Self::GNU_CXX_DEPENDENT.0
    }
}
impl From<u64> for ExceptionClass {
    #[inline]
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}
impl From<ExceptionClass> for u64 {
    #[inline]
    fn from(class: ExceptionClass) -> Self {
        class.0
    }
}
impl fmt::Debug for ExceptionClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ExceptionClass({})", self)
    }
}
impl fmt::Display for ExceptionClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for byte in self.to_bytes() {
            if byte.is_ascii_graphic() {
                write!(f, "{}", byte as char)?;
            } else {
                write!(f, "\\x{:02x}", byte)?;
            }
        }
        Ok(())
    }
}
