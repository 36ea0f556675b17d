use crate::{DeclRef, Seq, Temp, Type};

/// A function body together with its declaration
#[derive(Debug, Clone)]
pub struct Function {
    decl: DeclRef,
    personality: Option<DeclRef>,
    body: Seq,
    next_temp: u32,
}
impl Function {
    pub fn new(decl: DeclRef, body: Seq) -> Self {
        Self {
            decl,
            personality: None,
            body,
            next_temp: 0,
        }
    }

    pub fn decl(&self) -> &DeclRef {
        &self.decl
    }

    pub fn name(&self) -> &str {
        self.decl.name()
    }

    /// Returns true if the type of this function carries a non-throwing contract
    pub fn is_nothrow(&self) -> bool {
        self.decl.is_nothrow()
    }

    /// The personality routine used for the exception regions of this function
    pub fn personality(&self) -> Option<&DeclRef> {
        self.personality.as_ref()
    }

    pub fn set_personality(&mut self, personality: DeclRef) {
        self.personality = Some(personality);
    }

    pub fn body(&self) -> &Seq {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Seq {
        &mut self.body
    }

    /// Creates a fresh temporary of type `ty`, named after `prefix`
    pub fn create_tmp(&mut self, ty: Type, prefix: &str) -> Temp {
        let id = self.next_temp;
        self.next_temp += 1;
        Temp::new(id, prefix.to_string(), ty)
    }
}

/// A compilation unit
#[derive(Debug, Clone, Default)]
pub struct Unit {
    pub name: String,
    pub functions: Vec<Function>,
}
impl Unit {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            functions: vec![],
        }
    }

    pub fn push(&mut self, function: Function) {
        self.functions.push(function);
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name() == name)
    }
}
