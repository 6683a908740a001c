// src/core/orchestrator.rs

//! The multi-run orchestration loop.
//!
//! One `Orchestrator` ties the collaborators together for a single
//! invocation: it merges the option definitions contributed by the runner
//! and (when present) the context generator, applies configuration-supplied
//! default overrides, seeds and validates the working context, fans it out
//! into run contexts, and executes the runner once per context with each
//! failure contained to its own run.

use crate::{
    context::Context,
    core::{
        config_loader,
        errors::FatalError,
        options::OptionDefinitionRegistry,
        runner::{ContextGenerator, Runner},
    },
};
use anyhow::Result;
use indexmap::IndexMap;

pub struct Orchestrator {
    runner: Box<dyn Runner>,
    generator: Option<Box<dyn ContextGenerator>>,
    default_overrides: IndexMap<String, String>,
}

impl Orchestrator {
    pub fn new(
        runner: Box<dyn Runner>,
        generator: Option<Box<dyn ContextGenerator>>,
        default_overrides: IndexMap<String, String>,
    ) -> Self {
        Self {
            runner,
            generator,
            default_overrides,
        }
    }

    /// Loads the configuration file and assembles the orchestrator from it.
    pub fn from_config_file(path: &str) -> Result<Self> {
        let loaded = config_loader::load(path)?;
        Ok(Self::new(
            Box::new(loaded.runner),
            loaded
                .generator
                .map(|g| Box::new(g) as Box<dyn ContextGenerator>),
            loaded.default_overrides,
        ))
    }

    /// Builds the merged option definition registry for the given context.
    ///
    /// Contribution order is fixed: the runner first, then the generator if
    /// it implements the option-provider capability. Configuration default
    /// overrides are applied last, by name; override entries naming an
    /// option absent from the registry are silently ignored.
    ///
    /// The registry is rebuilt on every call rather than cached, because
    /// contributors may expose context-dependent option sets.
    pub fn option_definitions(&self, context: &Context) -> Result<OptionDefinitionRegistry> {
        let mut registry = OptionDefinitionRegistry::new();
        self.runner.add_cli_option_definitions(&mut registry, context)?;
        if let Some(generator) = &self.generator
            && let Some(provider) = generator.as_option_provider()
        {
            provider.add_cli_option_definitions(&mut registry, context)?;
        }
        for (name, value) in &self.default_overrides {
            if let Some(definition) = registry.get_mut(name) {
                definition.set_default_value(value);
            }
        }
        Ok(registry)
    }

    /// Seeds the working context: every option without a value whose
    /// resolved default is non-blank gets that default. Defaults are
    /// resolved lazily against the context as it fills up, so a default may
    /// reference an option seeded earlier in declaration order.
    fn add_default_values(&self, context: &mut Context) -> Result<()> {
        let registry = self.option_definitions(context)?;
        for definition in registry.values() {
            if !context.has_value_for_key(definition.name())
                && let Some(value) = definition.resolved_default(context)
            {
                context.put(definition.name(), value);
            }
        }
        Ok(())
    }

    /// The fail-fast precondition pass. Either every required option (after
    /// the alternative-satisfaction and dependency rules) has a value and
    /// every constrained value is allowed, or nothing runs.
    fn check_context(&self, context: &Context) -> Result<()> {
        let registry = self.option_definitions(context)?;
        for definition in registry.values() {
            if definition.is_required_and_not_ignored(context)
                && !context.has_value_for_key(definition.name())
            {
                return Err(FatalError::MissingRequiredOption(
                    definition.name().to_string(),
                )
                .into());
            }
            definition.check_allowed_value(context)?;
        }
        Ok(())
    }

    /// Logs a warning for every context key that matches neither a global
    /// nor a contributed option definition. Unknown options never abort the
    /// batch: option sets vary by configuration, and ignoring unused keys
    /// keeps invocations forward-compatible.
    pub fn check_for_unknown_options(
        &self,
        context: &Context,
        global_definitions: &OptionDefinitionRegistry,
    ) -> Result<()> {
        let registry = self.option_definitions(context)?;
        for key in context.keys() {
            if !global_definitions.contains_key(key) && !registry.contains_key(key) {
                log::warn!("[process] Ignoring unknown CLI option {}", key);
            }
        }
        Ok(())
    }

    fn contexts_to_run(&self, context: &Context) -> Result<Vec<Context>> {
        match &self.generator {
            Some(generator) => generator.generate_contexts(context),
            None => Ok(vec![context.clone()]),
        }
    }

    /// Runs the batch: seed defaults, validate, fan out, execute.
    ///
    /// A failure inside a single run is caught here — at exactly this
    /// iteration boundary, nowhere deeper and nowhere shallower — logged
    /// with the failing run's context values, and the loop continues. Fatal
    /// precondition errors propagate out before any run starts.
    pub fn run(&self, mut context: Context) -> Result<()> {
        self.add_default_values(&mut context)?;
        self.check_context(&context)?;
        let contexts = self.contexts_to_run(&context)?;
        let total = contexts.len();
        for (index, run_context) in contexts.into_iter().enumerate() {
            log::info!("[process] Starting run {}/{}", index + 1, total);
            if let Err(e) = self.runner.run(&run_context) {
                log::error!(
                    "[process] Error during run {}/{} ({}): {:#}",
                    index + 1,
                    total,
                    run_context,
                    e
                );
            }
        }
        log::info!("[process] Processing complete");
        Ok(())
    }
}
