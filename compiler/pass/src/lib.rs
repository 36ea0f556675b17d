//! Pass infrastructure.
//!
//! There are two levels here:
//!
//! * [`Pass`] is a single transformation from some input to some output.
//!   Passes compose with [`Pass::chain`], which is how larger transformations
//!   are built out of small ones.
//! * [`FunctionPass`] is a named stage of a host pipeline which runs once on
//!   every function of a compilation unit. Stages are ordered by a
//!   [`PassManager`], and are inserted relative to existing stages by name
//!   (see [`PassRegistration`]), rather than by the order of registration.
mod manager;

pub use self::manager::{
    FunctionPass, PassManager, PassPosition, PassRegistration, PipelineError,
};

/// This trait represents anything that can be run as a pass.
///
/// Passes operate on an input value, and return either the same type, or a new type, depending on the nature of the pass.
///
/// Implementations may represent a single pass, or an arbitrary number of passes that will be run as a single unit.
pub trait Pass {
    type Input<'a>;
    type Output<'a>;

    /// Runs the pass on the given input
    ///
    /// Passes should return `Err` to signal that the pass has failed
    /// and compilation of the unit should be aborted
    fn run<'a>(&mut self, input: Self::Input<'a>) -> anyhow::Result<Self::Output<'a>>;

    /// Chains two passes together to form a new, fused pass
    fn chain<P>(self, pass: P) -> Chain<Self, P>
    where
        Self: Sized,
        P: for<'a> Pass<Input<'a> = Self::Output<'a>>,
    {
        Chain::new(self, pass)
    }
}

/// This struct is not meant to be used directly, but is instead produced
/// when chaining `Pass` implementations together. `Chain` itself implements `Pass`,
/// which is what enables us to chain together arbitrarily many passes into a single one.
pub struct Chain<A, B> {
    a: A,
    b: B,
}
impl<A, B> Chain<A, B> {
    fn new(a: A, b: B) -> Self {
        Self { a, b }
    }
}
impl<A, B> Pass for Chain<A, B>
where
    A: Pass,
    B: for<'a> Pass<Input<'a> = <A as Pass>::Output<'a>>,
{
    type Input<'a> = <A as Pass>::Input<'a>;
    type Output<'a> = <B as Pass>::Output<'a>;

    fn run<'a>(&mut self, input: Self::Input<'a>) -> anyhow::Result<Self::Output<'a>> {
        let u = self.a.run(input)?;
        self.b.run(u)
    }
}
