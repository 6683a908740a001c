// src/core/config_loader.rs

use crate::{
    constants,
    core::{
        errors::FatalError,
        generator::ValueSetContextGenerator,
        processors::{CommandProcessor, DeepLinkEnricher, PrintProcessor, Processor},
        runner::PipelineRunner,
    },
    models::{ConfigFile, StepConfig},
};
use anyhow::Result;
use indexmap::IndexMap;
use std::{fs, path::PathBuf};

/// Everything the orchestrator needs, extracted from one configuration file:
/// the runner, the optional context generator, and the CLI default-value
/// overrides. The rest of the file is opaque to the core.
pub struct LoadedConfig {
    pub runner: PipelineRunner,
    pub generator: Option<ValueSetContextGenerator>,
    pub default_overrides: IndexMap<String, String>,
}

/// Loads and wires up a configuration file.
///
/// Missing or unreadable files are fatal precondition errors: nothing may
/// run on a configuration the user did not actually supply.
pub fn load(path_arg: &str) -> Result<LoadedConfig> {
    let expanded = shellexpand::tilde(path_arg);
    let path = PathBuf::from(expanded.as_ref());
    if !path.exists() {
        return Err(FatalError::ConfigFileNotFound(path_arg.to_string()).into());
    }
    let raw = fs::read_to_string(&path).map_err(|source| FatalError::ConfigFileNotReadable {
        path: path_arg.to_string(),
        source,
    })?;
    let config: ConfigFile =
        toml::from_str(&raw).map_err(|source| FatalError::ConfigFileInvalid {
            path: path_arg.to_string(),
            source: Box::new(source),
        })?;

    let display_path = dunce::canonicalize(&path).unwrap_or(path);
    log::info!("[process] Using configuration file {}", display_path.display());

    Ok(wire_up(config))
}

/// Builds the runtime collaborators from the parsed models. Split from
/// [`load`] so tests can wire configurations without touching the
/// filesystem.
pub fn wire_up(config: ConfigFile) -> LoadedConfig {
    let group = config
        .runner
        .name
        .clone()
        .unwrap_or_else(|| constants::DEFAULT_RUNNER_GROUP.to_string());
    if let Some(description) = &config.runner.description {
        log::debug!("[{}] {}", group, description);
    }

    let steps: Vec<Box<dyn Processor>> = config
        .runner
        .steps
        .iter()
        .enumerate()
        .map(|(position, step)| build_step(&group, position, step))
        .collect();

    let runner = PipelineRunner::new(&group, steps);
    let generator = config.generator.map(|generator_config| {
        ValueSetContextGenerator::new(
            generator_config.option,
            generator_config.desc,
            generator_config.values,
        )
    });

    LoadedConfig {
        runner,
        generator,
        default_overrides: config.defaults,
    }
}

fn build_step(group: &str, position: usize, step: &StepConfig) -> Box<dyn Processor> {
    match step {
        StepConfig::Command(command) => {
            let label = command
                .desc
                .clone()
                .unwrap_or_else(|| format!("command step {}", position + 1));
            let options = command
                .options
                .iter()
                .map(|option| option.to_definition(group))
                .collect();
            Box::new(CommandProcessor::new(
                group,
                label,
                &command.run,
                command.ignore_errors,
                command.silent,
                options,
            ))
        }
        StepConfig::Print(print) => {
            let options = print
                .options
                .iter()
                .map(|option| option.to_definition(group))
                .collect();
            Box::new(PrintProcessor::new(group, &print.print, options))
        }
        StepConfig::Enrich(enrich) => {
            let target = enrich.target.clone().unwrap_or_else(|| enrich.enrich.clone());
            let options = enrich
                .options
                .iter()
                .map(|option| option.to_definition(group))
                .collect();
            Box::new(DeepLinkEnricher::new(
                group,
                &enrich.enrich,
                target,
                &enrich.url,
                options,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        context::Context,
        core::{options::OptionDefinitionRegistry, runner::Runner},
    };
    use std::io::Write;

    #[test]
    fn missing_file_is_a_fatal_config_error() {
        // LoadedConfig holds trait objects and has no Debug impl, so the
        // error is extracted without formatting the success arm.
        let err = load("/definitely/not/here.toml").err().unwrap();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn malformed_toml_is_a_fatal_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[runner").unwrap();
        let err = load(file.path().to_str().unwrap()).err().unwrap();
        assert!(err.to_string().contains("could not be parsed"));
    }

    #[test]
    fn loads_and_wires_a_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
                [runner]
                name = "sync"

                [[runner.step]]
                print = "hello <ctx::user>"

                [generator]
                option = "release"
                values = ["1.0"]

                [defaults]
                user = "alice"
            "#
        )
        .unwrap();
        let loaded = load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(loaded.runner.name(), "sync");
        assert_eq!(loaded.generator.as_ref().unwrap().option(), "release");
        assert_eq!(
            loaded.default_overrides.get("user").map(String::as_str),
            Some("alice")
        );
    }

    #[test]
    fn wired_runner_contributes_step_options_under_the_runner_group() {
        let config: ConfigFile = toml::from_str(
            r#"
                [runner]
                name = "sync"

                [[runner.step]]
                run = "echo <ctx::release>"
                silent = true

                [[runner.step.option]]
                name = "mode"
                required = true
            "#,
        )
        .unwrap();
        let loaded = wire_up(config);
        let mut registry = OptionDefinitionRegistry::new();
        loaded
            .runner
            .add_cli_option_definitions(&mut registry, &Context::new())
            .unwrap();
        assert!(registry.get("mode").unwrap().is_required());
        assert_eq!(registry.get("release").unwrap().group(), "sync");
    }
}
