use log::trace;

use noexcept_abi::{BEGIN_CATCH_SYMBOL, SENTINEL_TYPE_NAME};
use noexcept_ir::*;
use noexcept_pass::Pass;

use crate::RewritePolicy;

/// Returns the sentinel type the rewritten boundaries catch
pub fn sentinel_type() -> Type {
    Type::record(SENTINEL_TYPE_NAME)
}

/// Builds the external declaration `void *__cxa_begin_catch (void *)`
pub fn begin_catch_decl() -> DeclRef {
    FunctionDecl::new(BEGIN_CATCH_SYMBOL, FunctionType::new(vec![Type::Ptr], Type::Ptr))
        .with_flags(DeclFlags::ARTIFICIAL | DeclFlags::EXTERNAL | DeclFlags::PUBLIC)
        .into_ref()
}

/// Makes `personality` the personality routine of the function.
///
/// This applies to every function, not only noexcept ones: whether a function
/// needs a personality at all is only known once exception handling has been
/// lowered, and the personality cannot be changed after that.
pub struct InstallPersonality<'p> {
    personality: &'p DeclRef,
}
impl<'p> InstallPersonality<'p> {
    pub fn new(personality: &'p DeclRef) -> Self {
        Self { personality }
    }
}
impl<'p> Pass for InstallPersonality<'p> {
    type Input<'a> = &'a mut Function;
    type Output<'a> = &'a mut Function;

    fn run<'a>(&mut self, function: Self::Input<'a>) -> anyhow::Result<Self::Output<'a>> {
        function.set_personality(self.personality.clone());
        Ok(function)
    }
}

/// What [`RewriteTrap`] did to a function
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RewriteOutcome {
    pub nothrow: bool,
    pub traps_rewritten: usize,
    pub traps_skipped: usize,
}

/// Rewrites the `must-not-throw` region of a noexcept function into a handler
/// for the sentinel type.
///
/// Given the region the front end wraps around a noexcept function body:
///
/// ```text
/// try
///   { <body> }
/// catch
///   { <<<eh_must_not_throw (terminate)>>> }
/// ```
///
/// the cleanup is replaced, so that it reads:
///
/// ```text
/// try
///   { <body> }
/// catch
///   {
///     catch <struct __noexcept_marker>
///       {
///         eh_ptr.N = __builtin_eh_pointer (0);
///         __cxa_begin_catch (eh_ptr.N);
///         terminate ();
///       }
///   }
/// ```
///
/// Only top-level statements of the body are considered, as that is where the
/// front end puts the region.
pub struct RewriteTrap {
    policy: RewritePolicy,
}
impl RewriteTrap {
    pub fn new(policy: RewritePolicy) -> Self {
        Self { policy }
    }
}
impl Pass for RewriteTrap {
    type Input<'a> = &'a mut Function;
    type Output<'a> = RewriteOutcome;

    fn run<'a>(&mut self, function: Self::Input<'a>) -> anyhow::Result<Self::Output<'a>> {
        let mut outcome = RewriteOutcome {
            nothrow: function.is_nothrow(),
            ..Default::default()
        };
        if !outcome.nothrow {
            return Ok(outcome);
        }

        let regions = function
            .body()
            .iter()
            .enumerate()
            .filter_map(|(index, stmt)| {
                stmt.as_must_not_throw_region()
                    .map(|(_, mnt)| (index, mnt.fault.clone()))
            })
            .collect::<Vec<_>>();

        for (n, (index, fault)) in regions.into_iter().enumerate() {
            if n > 0 && self.policy == RewritePolicy::First {
                trace!(
                    "leaving must-not-throw region #{} of {} as is",
                    n,
                    function.name()
                );
                outcome.traps_skipped += 1;
                continue;
            }

            let handler = synthesize_handler(function, fault);
            if let Stmt::Try(region) = &mut function.body_mut()[index] {
                region.cleanup = Seq::single(handler);
                outcome.traps_rewritten += 1;
            }
        }

        Ok(outcome)
    }
}

/// Builds the sentinel handler which calls `fault` after beginning the catch
fn synthesize_handler(function: &mut Function, fault: DeclRef) -> Catch {
    let eh_ptr = function.create_tmp(Type::Ptr, "eh_ptr");

    let mut handler = Seq::new();
    handler.push(
        Call::new(Callee::Builtin(Builtin::EhPointer), vec![Operand::Int(0)])
            .with_lhs(eh_ptr.clone()),
    );
    handler.push(Call::new(
        Callee::Decl(begin_catch_decl()),
        vec![Operand::Temp(eh_ptr)],
    ));
    handler.push(Call::new(Callee::Decl(fault), vec![]));

    Catch {
        types: vec![sentinel_type()],
        handler,
    }
}
