use std::fmt;

/// The types the pass needs to talk about
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Void,
    Int,
    Unsigned,
    UnsignedLongLong,
    Ptr,
    Record(RecordType),
}
impl Type {
    pub fn record<S: Into<String>>(name: S) -> Self {
        Self::Record(RecordType::new(name))
    }
}
impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Void => f.write_str("void"),
            Self::Int => f.write_str("int"),
            Self::Unsigned => f.write_str("unsigned int"),
            Self::UnsignedLongLong => f.write_str("long long unsigned int"),
            Self::Ptr => f.write_str("void *"),
            Self::Record(record) => write!(f, "struct {}", record.name()),
        }
    }
}

/// A named class type
///
/// Records are compared by name, as the linker compares their type descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordType {
    name: String,
}
impl RecordType {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}

/// The type of a function, including whether it carries a non-throwing contract
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionType {
    params: Vec<Type>,
    ret: Type,
    nothrow: bool,
}
impl FunctionType {
    pub fn new(params: Vec<Type>, ret: Type) -> Self {
        Self {
            params,
            ret,
            nothrow: false,
        }
    }

    /// Marks this type `noexcept`
    pub fn nothrow(mut self) -> Self {
        self.nothrow = true;
        self
    }

    pub fn params(&self) -> &[Type] {
        self.params.as_slice()
    }

    pub fn ret(&self) -> &Type {
        &self.ret
    }

    pub fn is_nothrow(&self) -> bool {
        self.nothrow
    }
}
impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} (", &self.ret)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", param)?;
        }
        f.write_str(")")?;
        if self.nothrow {
            f.write_str(" noexcept")?;
        }
        Ok(())
    }
}
