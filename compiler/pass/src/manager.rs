use std::fmt;

use anyhow::Context;
use log::{debug, trace};

/// A named stage of a pipeline, run once for every function of a compilation unit.
///
/// `F` is the function representation of the host.
pub trait FunctionPass<F: ?Sized> {
    /// The name other stages refer to this one by
    fn name(&self) -> &str;

    /// Called before any function of `unit` is processed.
    ///
    /// State which must not outlive a compilation unit is reset here.
    fn begin_unit(&mut self, _unit: &str) {}

    /// Runs this stage on a single function
    fn execute(&mut self, function: &mut F) -> anyhow::Result<()>;

    /// Called once every function of `unit` has been processed
    fn end_unit(&mut self, _unit: &str) {}
}

/// Where a registered pass goes, relative to its reference pass
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PassPosition {
    InsertBefore,
    InsertAfter,
    Replace,
}
impl fmt::Display for PassPosition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InsertBefore => f.write_str("before"),
            Self::InsertAfter => f.write_str("after"),
            Self::Replace => f.write_str("in place of"),
        }
    }
}

/// A request to insert `pass` into a pipeline relative to the `instance`-th
/// occurrence (starting at 1) of the stage named `reference`.
pub struct PassRegistration<F: ?Sized> {
    pub pass: Box<dyn FunctionPass<F>>,
    pub reference: String,
    pub instance: usize,
    pub position: PassPosition,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("cannot insert `{pass}` {position} instance {instance} of `{reference}`: no such pass in the pipeline")]
    UnknownReference {
        pass: String,
        reference: String,
        instance: usize,
        position: PassPosition,
    },
    #[error("cannot insert `{pass}`: pass instance numbers start at 1")]
    InvalidInstance { pass: String },
}

/// An ordered pipeline of function passes
pub struct PassManager<F: ?Sized> {
    passes: Vec<Box<dyn FunctionPass<F>>>,
}
impl<F: ?Sized> Default for PassManager<F> {
    fn default() -> Self {
        Self::new()
    }
}
impl<F: ?Sized> PassManager<F> {
    pub fn new() -> Self {
        Self { passes: vec![] }
    }

    /// Appends `pass` to the end of the pipeline
    pub fn push(&mut self, pass: Box<dyn FunctionPass<F>>) {
        debug!("appending pass `{}`", pass.name());
        self.passes.push(pass);
    }

    /// Inserts a pass relative to an existing one, see [`PassRegistration`]
    pub fn register(&mut self, registration: PassRegistration<F>) -> Result<(), PipelineError> {
        let PassRegistration {
            pass,
            reference,
            instance,
            position,
        } = registration;

        if instance == 0 {
            return Err(PipelineError::InvalidInstance {
                pass: pass.name().to_string(),
            });
        }

        let index = self
            .passes
            .iter()
            .enumerate()
            .filter(|(_, p)| p.name() == reference)
            .map(|(i, _)| i)
            .nth(instance - 1);
        let Some(index) = index else {
            return Err(PipelineError::UnknownReference {
                pass: pass.name().to_string(),
                reference,
                instance,
                position,
            });
        };

        debug!(
            "registering pass `{}` {} instance {} of `{}`",
            pass.name(),
            position,
            instance,
            reference
        );
        match position {
            PassPosition::InsertBefore => self.passes.insert(index, pass),
            PassPosition::InsertAfter => self.passes.insert(index + 1, pass),
            PassPosition::Replace => self.passes[index] = pass,
        }
        Ok(())
    }

    /// Returns the names of the passes in this pipeline, in execution order
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.passes.iter().map(|p| p.name())
    }

    /// Runs the pipeline over every function of a compilation unit.
    ///
    /// Functions are processed one at a time, each running through every
    /// stage before the next function starts. The first error aborts the unit.
    pub fn run_unit<'f, I>(&mut self, unit: &str, functions: I) -> anyhow::Result<()>
    where
        F: 'f,
        I: IntoIterator<Item = &'f mut F>,
    {
        debug!("running {} passes on unit `{}`", self.passes.len(), unit);
        for pass in self.passes.iter_mut() {
            pass.begin_unit(unit);
        }

        for (index, function) in functions.into_iter().enumerate() {
            for pass in self.passes.iter_mut() {
                trace!("running `{}` on function #{} of `{}`", pass.name(), index, unit);
                pass.execute(function).with_context(|| {
                    format!(
                        "pass `{}` failed on function #{} of unit `{}`",
                        pass.name(),
                        index,
                        unit
                    )
                })?;
            }
        }

        for pass in self.passes.iter_mut() {
            pass.end_unit(unit);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::*;

    type Trace = Rc<RefCell<Vec<String>>>;

    struct Record {
        name: &'static str,
        trace: Trace,
    }
    impl FunctionPass<u32> for Record {
        fn name(&self) -> &str {
            self.name
        }

        fn begin_unit(&mut self, unit: &str) {
            self.trace.borrow_mut().push(format!("{}:begin:{}", self.name, unit));
        }

        fn execute(&mut self, function: &mut u32) -> anyhow::Result<()> {
            self.trace.borrow_mut().push(format!("{}:{}", self.name, function));
            Ok(())
        }

        fn end_unit(&mut self, unit: &str) {
            self.trace.borrow_mut().push(format!("{}:end:{}", self.name, unit));
        }
    }

    struct Fail;
    impl FunctionPass<u32> for Fail {
        fn name(&self) -> &str {
            "fail"
        }

        fn execute(&mut self, function: &mut u32) -> anyhow::Result<()> {
            anyhow::ensure!(*function != 2, "cannot handle function 2");
            Ok(())
        }
    }

    fn pipeline(trace: &Trace, names: &[&'static str]) -> PassManager<u32> {
        let mut manager = PassManager::new();
        for name in names.iter().copied() {
            manager.push(Box::new(Record {
                name,
                trace: trace.clone(),
            }));
        }
        manager
    }

    fn registration(
        trace: &Trace,
        name: &'static str,
        reference: &str,
        instance: usize,
        position: PassPosition,
    ) -> PassRegistration<u32> {
        PassRegistration {
            pass: Box::new(Record {
                name,
                trace: trace.clone(),
            }),
            reference: reference.to_string(),
            instance,
            position,
        }
    }

    #[test]
    fn insert_relative_to_named_instance() {
        let trace = Trace::default();
        let mut manager = pipeline(&trace, &["lower", "eh", "cfg", "eh"]);

        manager
            .register(registration(&trace, "mine", "eh", 1, PassPosition::InsertBefore))
            .unwrap();
        assert_eq!(
            manager.names().collect::<Vec<_>>(),
            vec!["lower", "mine", "eh", "cfg", "eh"]
        );

        manager
            .register(registration(&trace, "late", "eh", 2, PassPosition::InsertAfter))
            .unwrap();
        manager
            .register(registration(&trace, "cfg2", "cfg", 1, PassPosition::Replace))
            .unwrap();
        assert_eq!(
            manager.names().collect::<Vec<_>>(),
            vec!["lower", "mine", "eh", "cfg2", "eh", "late"]
        );
    }

    #[test]
    fn missing_reference_is_an_error() {
        let trace = Trace::default();
        let mut manager = pipeline(&trace, &["lower", "eh"]);

        let err = manager
            .register(registration(&trace, "mine", "eh", 2, PassPosition::InsertBefore))
            .unwrap_err();
        assert_eq!(
            err,
            PipelineError::UnknownReference {
                pass: "mine".to_string(),
                reference: "eh".to_string(),
                instance: 2,
                position: PassPosition::InsertBefore,
            }
        );

        let err = manager
            .register(registration(&trace, "mine", "eh", 0, PassPosition::InsertBefore))
            .unwrap_err();
        assert_eq!(err, PipelineError::InvalidInstance { pass: "mine".to_string() });
        assert_eq!(manager.names().collect::<Vec<_>>(), vec!["lower", "eh"]);
    }

    #[test]
    fn functions_run_through_every_stage_in_order() {
        let trace = Trace::default();
        let mut manager = pipeline(&trace, &["a", "b"]);
        let mut functions = vec![1, 2];

        manager.run_unit("unit.cpp", functions.iter_mut()).unwrap();
        assert_eq!(
            *trace.borrow(),
            vec![
                "a:begin:unit.cpp",
                "b:begin:unit.cpp",
                "a:1",
                "b:1",
                "a:2",
                "b:2",
                "a:end:unit.cpp",
                "b:end:unit.cpp",
            ]
        );
    }

    #[test]
    fn stage_errors_name_the_stage_and_function() {
        let trace = Trace::default();
        let mut manager = pipeline(&trace, &["a"]);
        manager.push(Box::new(Fail));
        let mut functions = vec![1, 2, 3];

        let err = manager.run_unit("unit.cpp", functions.iter_mut()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "pass `fail` failed on function #1 of unit `unit.cpp`"
        );
        assert!(format!("{:#}", err).ends_with("cannot handle function 2"));
        // The unit was aborted before the third function
        assert!(!trace.borrow().iter().any(|entry| entry == "a:3"));
    }
}
