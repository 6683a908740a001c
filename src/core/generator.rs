// src/core/generator.rs

use crate::{
    constants,
    context::Context,
    core::{
        errors::FatalError,
        options::{OptionDefinition, OptionDefinitionRegistry},
        runner::{ContextGenerator, OptionDefinitionProvider},
    },
};
use anyhow::Result;

/// Fans one validated context out over the value set of a single option.
///
/// The values to run against come from the context itself when the option
/// was supplied (as a comma-separated list), falling back to the values
/// configured in the `[generator]` section. Each generated context is a full
/// working copy of the seed with the fan-out option pinned to one value.
pub struct ValueSetContextGenerator {
    option: String,
    description: String,
    values: Vec<String>,
}

impl ValueSetContextGenerator {
    pub fn new(
        option: impl Into<String>,
        description: Option<String>,
        values: Vec<String>,
    ) -> Self {
        let option = option.into();
        let description = description.unwrap_or_else(|| {
            format!("Comma-separated {} values; one run is executed per value", option)
        });
        Self {
            option,
            description,
            values,
        }
    }

    pub fn option(&self) -> &str {
        &self.option
    }

    fn resolved_values(&self, context: &Context) -> Vec<String> {
        match context.get(&self.option) {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
                .collect(),
            None => self.values.clone(),
        }
    }
}

impl ContextGenerator for ValueSetContextGenerator {
    fn generate_contexts(&self, context: &Context) -> Result<Vec<Context>> {
        let values = self.resolved_values(context);
        if values.is_empty() {
            return Err(FatalError::EmptyFanOut(self.option.clone()).into());
        }
        log::debug!(
            "Generating {} context(s) over option -{}",
            values.len(),
            self.option
        );
        Ok(values
            .into_iter()
            .map(|value| {
                let mut derived = context.clone();
                derived.put(&self.option, value);
                derived
            })
            .collect())
    }

    fn as_option_provider(&self) -> Option<&dyn OptionDefinitionProvider> {
        Some(self)
    }
}

impl OptionDefinitionProvider for ValueSetContextGenerator {
    fn add_cli_option_definitions(
        &self,
        registry: &mut OptionDefinitionRegistry,
        _context: &Context,
    ) -> Result<()> {
        // With no configured fallback values the option must come from the
        // CLI (or a defaults override), so it is declared required.
        let mut definition = OptionDefinition::new(
            constants::GROUP_GENERATOR,
            &self.option,
            &self.description,
            self.values.is_empty(),
        );
        if !self.values.is_empty() {
            definition = definition.default_value(self.values.join(","));
        }
        registry.add(definition)?;
        Ok(())
    }
}
