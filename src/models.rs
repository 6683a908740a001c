// src/models.rs

use crate::core::options::OptionDefinition;
use indexmap::IndexMap;
use serde::Deserialize;

// --- CONFIGURATION FILE MODELS (what is read from the TOML file) ---
// The configuration resource is opaque to the core except for three
// extraction points: the runner, the optional generator, and the CLI
// default-value overrides.

/// The deserialized structure of a procrun configuration file.
#[derive(Deserialize, Debug, Clone)]
pub struct ConfigFile {
    pub runner: RunnerConfig,
    pub generator: Option<GeneratorConfig>,
    /// CLI option name -> default value override. Applied onto matching
    /// definitions before validation; names that match no definition are
    /// silently ignored. Declaration order is preserved so overrides apply
    /// deterministically.
    #[serde(default)]
    pub defaults: IndexMap<String, String>,
}

/// The runner section: a named, ordered pipeline of steps.
#[derive(Deserialize, Debug, Clone)]
pub struct RunnerConfig {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, rename = "step")]
    pub steps: Vec<StepConfig>,
}

/// One pipeline step. Uses `untagged` for flexible syntax: the step kind is
/// inferred from its distinguishing key (`run`, `print`, `enrich`).
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum StepConfig {
    Command(CommandStepConfig),
    Print(PrintStepConfig),
    Enrich(EnrichStepConfig),
}

/// A step that interpolates a command template and executes it.
#[derive(Deserialize, Debug, Clone)]
pub struct CommandStepConfig {
    pub run: String,
    pub desc: Option<String>,
    #[serde(default)]
    pub ignore_errors: bool,
    #[serde(default)]
    pub silent: bool,
    #[serde(default, rename = "option")]
    pub options: Vec<OptionConfig>,
}

/// A step that interpolates a template and prints it.
#[derive(Deserialize, Debug, Clone)]
pub struct PrintStepConfig {
    pub print: String,
    #[serde(default, rename = "option")]
    pub options: Vec<OptionConfig>,
}

/// An enrichment step: computes a value from a template (typically a deep
/// link URL) and stores it back into the run context.
#[derive(Deserialize, Debug, Clone)]
pub struct EnrichStepConfig {
    pub enrich: String,
    pub url: String,
    /// Context key receiving the computed value. Defaults to the enricher name.
    pub target: Option<String>,
    #[serde(default, rename = "option")]
    pub options: Vec<OptionConfig>,
}

/// Declarative CLI option contributed by a step.
#[derive(Deserialize, Debug, Clone)]
pub struct OptionConfig {
    pub name: String,
    pub desc: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub flag: bool,
    pub default: Option<String>,
    #[serde(default)]
    pub allowed: Vec<AllowedValueConfig>,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub alternative_for: Vec<String>,
}

/// An allowed value, either bare or with a description.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum AllowedValueConfig {
    Plain(String),
    Described { value: String, desc: String },
}

/// The optional generator section: fans the validated context out over one
/// option's value set.
#[derive(Deserialize, Debug, Clone)]
pub struct GeneratorConfig {
    pub option: String,
    pub desc: Option<String>,
    #[serde(default)]
    pub values: Vec<String>,
}

// --- Conversions to runtime definitions ---

impl OptionConfig {
    /// Builds the runtime [`OptionDefinition`] under the given group.
    pub fn to_definition(&self, group: &str) -> OptionDefinition {
        let description = self
            .desc
            .clone()
            .unwrap_or_else(|| format!("Value for option {}", self.name));
        let mut definition =
            OptionDefinition::new(group, &self.name, description, self.required).flag(self.flag);
        if let Some(default) = &self.default {
            definition = definition.default_value(default);
        }
        for allowed in &self.allowed {
            definition = match allowed {
                AllowedValueConfig::Plain(value) => definition.allowed_value(value, ""),
                AllowedValueConfig::Described { value, desc } => {
                    definition.allowed_value(value, desc)
                }
            };
        }
        for dep in &self.depends_on {
            definition = definition.depends_on(dep);
        }
        for alt in &self.alternative_for {
            definition = definition.alternative_for(alt);
        }
        definition
    }
}
