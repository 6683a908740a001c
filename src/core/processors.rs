// src/core/processors.rs

use crate::{
    context::Context,
    core::{
        interpolator,
        options::{OptionDefinition, OptionDefinitionRegistry},
    },
    system::executor,
};
use anyhow::Result;
use colored::Colorize;

/// One step in a pipeline.
///
/// `process` returns whether the remaining pipeline should continue for this
/// run; `Ok(false)` stops the run early without raising a failure (the
/// enrichment contract). Any `Err` is a run-scoped failure handled by the
/// orchestrator, never by the step itself.
pub trait Processor {
    fn process(&self, context: &mut Context) -> Result<bool>;

    /// A short label identifying this step in logs and derived option help.
    fn describe(&self) -> &str;

    fn add_cli_option_definitions(
        &self,
        _registry: &mut OptionDefinitionRegistry,
        _context: &Context,
    ) -> Result<()> {
        Ok(())
    }
}

/// Registers the step's explicitly declared options, then an optional
/// definition for every `<ctx::KEY>` the template references that no
/// contributor has declared yet. Derived definitions keep help output
/// complete and stop the unknown-option warning from firing for keys a step
/// actually consumes.
fn add_step_options(
    registry: &mut OptionDefinitionRegistry,
    group: &str,
    label: &str,
    declared: &[OptionDefinition],
    template: &str,
) -> Result<()> {
    registry.add_all(declared.iter().cloned())?;
    for key in interpolator::context_references(template) {
        if !registry.contains_key(&key) {
            registry.add(OptionDefinition::new(
                group,
                &key,
                format!("Used by step '{}'", label),
                false,
            ))?;
        }
    }
    Ok(())
}

/// Interpolates a command template against the run context and executes it
/// as a system command.
pub struct CommandProcessor {
    group: String,
    label: String,
    template: String,
    ignore_errors: bool,
    silent: bool,
    options: Vec<OptionDefinition>,
}

impl CommandProcessor {
    pub fn new(
        group: impl Into<String>,
        label: impl Into<String>,
        template: impl Into<String>,
        ignore_errors: bool,
        silent: bool,
        options: Vec<OptionDefinition>,
    ) -> Self {
        Self {
            group: group.into(),
            label: label.into(),
            template: template.into(),
            ignore_errors,
            silent,
            options,
        }
    }
}

impl Processor for CommandProcessor {
    fn process(&self, context: &mut Context) -> Result<bool> {
        let command_line = interpolator::expand(&self.template, context)?;
        if !self.silent {
            println!("{} {}", "→".blue(), command_line.green());
        }
        executor::execute_command(&command_line, self.ignore_errors)?;
        Ok(true)
    }

    fn describe(&self) -> &str {
        &self.label
    }

    fn add_cli_option_definitions(
        &self,
        registry: &mut OptionDefinitionRegistry,
        _context: &Context,
    ) -> Result<()> {
        add_step_options(registry, &self.group, &self.label, &self.options, &self.template)
    }
}

/// Interpolates a template and prints it to stdout.
pub struct PrintProcessor {
    group: String,
    label: String,
    template: String,
    options: Vec<OptionDefinition>,
}

impl PrintProcessor {
    pub fn new(
        group: impl Into<String>,
        template: impl Into<String>,
        options: Vec<OptionDefinition>,
    ) -> Self {
        Self {
            group: group.into(),
            label: "print".to_string(),
            template: template.into(),
            options,
        }
    }
}

impl Processor for PrintProcessor {
    fn process(&self, context: &mut Context) -> Result<bool> {
        println!("{}", interpolator::expand(&self.template, context)?);
        Ok(true)
    }

    fn describe(&self) -> &str {
        &self.label
    }

    fn add_cli_option_definitions(
        &self,
        registry: &mut OptionDefinitionRegistry,
        _context: &Context,
    ) -> Result<()> {
        add_step_options(registry, &self.group, &self.label, &self.options, &self.template)
    }
}

/// Computes a browser-viewable deep link (or any other derived value) from a
/// URL template and stores it in the run context under the target key.
///
/// Returns `false` when the link cannot be computed, which stops the
/// remaining pipeline for this run without failing it: a record that cannot
/// be enriched is skipped, not fatal.
pub struct DeepLinkEnricher {
    group: String,
    label: String,
    target_key: String,
    url_template: String,
    options: Vec<OptionDefinition>,
}

impl DeepLinkEnricher {
    pub fn new(
        group: impl Into<String>,
        label: impl Into<String>,
        target_key: impl Into<String>,
        url_template: impl Into<String>,
        options: Vec<OptionDefinition>,
    ) -> Self {
        Self {
            group: group.into(),
            label: label.into(),
            target_key: target_key.into(),
            url_template: url_template.into(),
            options,
        }
    }
}

impl Processor for DeepLinkEnricher {
    fn process(&self, context: &mut Context) -> Result<bool> {
        match interpolator::expand(&self.url_template, context) {
            Ok(link) => {
                log::debug!("[{}] Computed {}={}", self.label, self.target_key, link);
                context.put(&self.target_key, link);
                Ok(true)
            }
            Err(e) => {
                log::warn!(
                    "[{}] Could not compute '{}', skipping the rest of this run: {:#}",
                    self.label,
                    self.target_key,
                    e
                );
                Ok(false)
            }
        }
    }

    fn describe(&self) -> &str {
        &self.label
    }

    fn add_cli_option_definitions(
        &self,
        registry: &mut OptionDefinitionRegistry,
        _context: &Context,
    ) -> Result<()> {
        add_step_options(
            registry,
            &self.group,
            &self.label,
            &self.options,
            &self.url_template,
        )
    }
}
