// src/core/runner.rs

use crate::{
    context::Context,
    core::{options::OptionDefinitionRegistry, processors::Processor},
};
use anyhow::{Context as _, Result};

/// A contributor of CLI option definitions.
///
/// This is the explicit, optional capability a context generator may
/// implement in addition to generating contexts; the orchestrator checks for
/// it through [`ContextGenerator::as_option_provider`] instead of any
/// type-inspection trickery.
pub trait OptionDefinitionProvider {
    fn add_cli_option_definitions(
        &self,
        registry: &mut OptionDefinitionRegistry,
        context: &Context,
    ) -> Result<()>;
}

/// The collaborator executed once per generated context.
///
/// A failure raised from [`Runner::run`] is scoped to that single run: the
/// orchestrator catches it at the iteration boundary and continues the batch.
pub trait Runner {
    fn run(&self, context: &Context) -> Result<()>;

    /// Contributes this runner's option definitions. The option set may
    /// depend on the context, which is why registries are rebuilt per
    /// invocation instead of cached.
    fn add_cli_option_definitions(
        &self,
        registry: &mut OptionDefinitionRegistry,
        context: &Context,
    ) -> Result<()>;
}

/// Expands one validated context into the contexts to run against.
pub trait ContextGenerator {
    /// Must return a non-empty sequence. Each element is a full,
    /// independently owned copy, never a delta; a run mutating its context
    /// cannot be observed by any other run.
    fn generate_contexts(&self, context: &Context) -> Result<Vec<Context>>;

    /// The optional option-definition capability. Generators that also
    /// declare CLI options return themselves here.
    fn as_option_provider(&self) -> Option<&dyn OptionDefinitionProvider> {
        None
    }
}

/// A [`Runner`] that executes a configuration-declared pipeline of processor
/// steps in order. Option definitions are merged from every step, so the
/// registry a pipeline contributes is itself the product of multiple
/// independent sources.
pub struct PipelineRunner {
    name: String,
    steps: Vec<Box<dyn Processor>>,
}

impl PipelineRunner {
    pub fn new(name: impl Into<String>, steps: Vec<Box<dyn Processor>>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Runner for PipelineRunner {
    fn run(&self, context: &Context) -> Result<()> {
        // The run owns a working copy: enrichment steps may add values that
        // later steps consume, without the seed context ever observing them.
        let mut working = context.clone();
        for (position, step) in self.steps.iter().enumerate() {
            let proceed = step.process(&mut working).with_context(|| {
                format!("Step {} ({}) failed", position + 1, step.describe())
            })?;
            if !proceed {
                log::info!(
                    "[{}] Step {} ({}) stopped this run early",
                    self.name,
                    position + 1,
                    step.describe()
                );
                break;
            }
        }
        Ok(())
    }

    fn add_cli_option_definitions(
        &self,
        registry: &mut OptionDefinitionRegistry,
        context: &Context,
    ) -> Result<()> {
        for step in &self.steps {
            step.add_cli_option_definitions(registry, context)?;
        }
        Ok(())
    }
}
