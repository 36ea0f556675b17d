//! A compiler pass which gives noexcept functions a personality that does not
//! unwind.
//!
//! Normally, when an exception escapes a noexcept function, the unwinder finds
//! the `must-not-throw` region the front end wrapped around the function body,
//! and only then calls `std::terminate`. By that point, the second phase of
//! unwinding has already run the destructors of every frame between the throw
//! site and the noexcept function.
//!
//! This pass runs before exception handling is lowered, and does two things:
//!
//! * Every function gets `__noexcept_personality` as its personality routine.
//!   This routine, provided by the `noexcept_personality` runtime, behaves
//!   exactly like the default C++ personality, except that it terminates the
//!   process during the search phase when the handler it found is one for the
//!   sentinel type `__noexcept_marker`.
//! * In noexcept functions, the `must-not-throw` region is replaced by a
//!   handler for that sentinel type, which calls the original fault action.
//!
//! Since the runtime's descriptor for the sentinel type matches every thrown
//! type, the unwinder reports the rewritten region as a handler for any
//! exception, and the personality terminates before anything is unwound.
use log::{debug, info};

use noexcept_ir::Function;
use noexcept_pass::{FunctionPass, Pass, PassManager, PassPosition, PassRegistration};

mod options;
mod personality;
mod rewrite;

pub use self::options::{OptionsError, PluginArgument, PluginOptions, RewritePolicy};
pub use self::personality::{personality_decl, PersonalityCache};
pub use self::rewrite::{
    begin_catch_decl, sentinel_type, InstallPersonality, RewriteOutcome, RewriteTrap,
};

/// The name this pass is registered under
pub const PLUGIN_NAME: &str = "noexcept_personality";

/// The host stage which lowers `must-not-throw` regions, this pass runs before it
pub const CONTRACT_ENFORCEMENT_PASS: &str = "eh";

/// Information about the plugin reported to the host
#[derive(Debug, PartialEq, Eq)]
pub struct PluginInfo {
    pub version: &'static str,
    pub help: &'static str,
}

pub static PLUGIN_INFO: PluginInfo = PluginInfo {
    version: "0.1",
    help: "Mark noexcept functions with a personality that doesn't unwind",
};

/// Counters for a single compilation unit
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct UnitStats {
    pub functions: usize,
    pub nothrow_functions: usize,
    pub traps_rewritten: usize,
    pub traps_skipped: usize,
}

/// The pipeline stage installing the personality and rewriting trap regions
pub struct NoexceptPersonalityPass {
    options: PluginOptions,
    cache: PersonalityCache,
    stats: UnitStats,
}
impl NoexceptPersonalityPass {
    pub fn new(options: PluginOptions) -> Self {
        Self {
            options,
            cache: PersonalityCache::new(),
            stats: UnitStats::default(),
        }
    }

    /// The counters of the unit currently (or most recently) processed
    pub fn stats(&self) -> UnitStats {
        self.stats
    }
}
impl FunctionPass<Function> for NoexceptPersonalityPass {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn begin_unit(&mut self, unit: &str) {
        debug!("starting unit `{}`", unit);
        self.cache.reset();
        self.stats = UnitStats::default();
    }

    fn execute(&mut self, function: &mut Function) -> anyhow::Result<()> {
        let personality = self.cache.get_or_init();
        let mut pass =
            InstallPersonality::new(personality).chain(RewriteTrap::new(self.options.policy));
        let outcome = pass.run(&mut *function)?;

        debug!(
            "{}: nothrow = {}, rewritten = {}, skipped = {}",
            function.name(),
            outcome.nothrow,
            outcome.traps_rewritten,
            outcome.traps_skipped
        );
        self.stats.functions += 1;
        if outcome.nothrow {
            self.stats.nothrow_functions += 1;
        }
        self.stats.traps_rewritten += outcome.traps_rewritten;
        self.stats.traps_skipped += outcome.traps_skipped;
        Ok(())
    }

    fn end_unit(&mut self, unit: &str) {
        let stats = &self.stats;
        debug!(
            "finished unit `{}`: {} functions, {} noexcept, {} regions rewritten, {} left as is",
            unit,
            stats.functions,
            stats.nothrow_functions,
            stats.traps_rewritten,
            stats.traps_skipped
        );
    }
}

/// Entry point of the plugin.
///
/// Parses `args` and inserts the pass right before the first instance of the
/// stage lowering `must-not-throw` regions.
pub fn plugin_init(
    manager: &mut PassManager<Function>,
    args: &[PluginArgument],
) -> anyhow::Result<&'static PluginInfo> {
    let options = PluginOptions::from_args(args)?;
    info!(
        "initializing {} {} (policy = {})",
        PLUGIN_NAME, PLUGIN_INFO.version, options.policy
    );

    manager.register(PassRegistration {
        pass: Box::new(NoexceptPersonalityPass::new(options)),
        reference: CONTRACT_ENFORCEMENT_PASS.to_string(),
        instance: 1,
        position: PassPosition::InsertBefore,
    })?;

    Ok(&PLUGIN_INFO)
}
