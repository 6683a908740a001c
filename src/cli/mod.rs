// src/cli/mod.rs

pub mod help;
pub mod logging;

use crate::{
    constants,
    context::Context,
    core::options::{OptionDefinition, OptionDefinitionRegistry},
};
use anyhow::Result;
use clap::Parser;

/// The outermost shell. Clap only captures the raw token stream; the
/// `-name value` grammar below has no subcommands or long/short flags for
/// clap to understand, so tokens pass through untouched and are parsed by
/// [`parse_context`].
#[derive(Parser, Debug, Default)]
#[command(
    name = "procrun",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct Cli {
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Parses the raw token stream into a context.
///
/// Grammar: a dash-prefixed token starts an option; the following token is
/// its value unless that token is itself dash-prefixed (or the stream ends),
/// in which case the option is a flag set to `"true"`. Leading dashes are
/// stripped from option names, so `-user`, `--user` and `---user` all set the
/// `user` key. No validation happens here; unknown names are the
/// orchestrator's concern.
pub fn parse_context(args: &[String]) -> Context {
    let mut context = Context::new();
    let mut tokens = args.iter().peekable();
    while let Some(token) = tokens.next() {
        if !token.starts_with('-') {
            log::warn!("Ignoring unexpected CLI token '{}'", token);
            continue;
        }
        let name = token.trim_start_matches('-');
        if name.is_empty() {
            continue;
        }
        match tokens.peek() {
            Some(next) if !next.starts_with('-') => {
                let value = tokens.next().map(String::as_str).unwrap_or_default();
                context.put(name, value);
            }
            _ => {
                context.put(name, "true");
            }
        }
    }
    context
}

pub fn help_option() -> OptionDefinition {
    OptionDefinition::new(
        constants::GROUP_GLOBAL,
        "help",
        "Show this help information",
        false,
    )
    .flag(true)
}

pub fn config_file_option() -> OptionDefinition {
    OptionDefinition::new(
        constants::GROUP_GLOBAL,
        "configFile",
        "Configuration file describing the runner and its steps",
        true,
    )
}

pub fn log_file_option() -> OptionDefinition {
    OptionDefinition::new(
        constants::GROUP_GLOBAL,
        "logFile",
        "Log file location",
        true,
    )
    .default_value(constants::DEFAULT_LOG_FILE)
    .depends_on("logLevel")
}

pub fn log_level_option() -> OptionDefinition {
    OptionDefinition::new(
        constants::GROUP_GLOBAL,
        "logLevel",
        "Log level",
        false,
    )
    .allowed_value("TRACE", "Detailed log information; may impact performance")
    .allowed_value("DEBUG", "Debug information; may impact performance")
    .allowed_value("INFO", "High-level informational messages")
    .allowed_value("WARN", "Warning messages")
    .allowed_value("ERROR", "Error messages")
    .allowed_value("FATAL", "Fatal errors only")
}

/// The global option definitions, in help-output order.
pub fn global_option_definitions() -> OptionDefinitionRegistry {
    let mut registry = OptionDefinitionRegistry::new();
    // These definitions never collide; the registry is built from scratch.
    let _ = registry.add_all([
        help_option(),
        config_file_option(),
        log_file_option(),
        log_level_option(),
    ]);
    registry
}

/// Validates supplied global option values against their allowed sets
/// (notably `-logLevel`). Global options never enter the orchestrator's
/// contributed registry, so their value constraints are checked here, in the
/// same fail-fast pass before any run starts. Requiredness needs no check:
/// a missing `-configFile` takes the usage path, and `-logFile` falls back to
/// its default.
pub fn check_global_options(context: &Context) -> Result<()> {
    for definition in global_option_definitions().values() {
        definition.check_allowed_value(context)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(tokens: &[&str]) -> Context {
        let args: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
        parse_context(&args)
    }

    #[test]
    fn pairs_become_key_value_entries() {
        let context = parse(&["-user", "alice", "-release", "1.0"]);
        assert_eq!(context.get("user"), Some("alice"));
        assert_eq!(context.get("release"), Some("1.0"));
    }

    #[test]
    fn trailing_option_without_value_is_a_flag() {
        let context = parse(&["-user", "alice", "-verbose"]);
        assert_eq!(context.get("verbose"), Some("true"));
    }

    #[test]
    fn option_followed_by_another_option_is_a_flag() {
        let context = parse(&["-help", "-user", "alice"]);
        assert_eq!(context.get("help"), Some("true"));
        assert_eq!(context.get("user"), Some("alice"));
    }

    #[test]
    fn leading_dashes_are_stripped() {
        let context = parse(&["--user", "alice", "---force"]);
        assert_eq!(context.get("user"), Some("alice"));
        assert_eq!(context.get("force"), Some("true"));
    }

    #[test]
    fn stray_value_tokens_are_skipped() {
        let context = parse(&["stray", "-user", "alice"]);
        assert_eq!(context.len(), 1);
        assert_eq!(context.get("user"), Some("alice"));
    }

    #[test]
    fn later_occurrence_of_the_same_option_wins() {
        let context = parse(&["-user", "alice", "-user", "bob"]);
        assert_eq!(context.get("user"), Some("bob"));
    }

    #[test]
    fn out_of_set_log_level_is_rejected() {
        let mut context = Context::new();
        context.put("logLevel", "VERBOSE");
        let err = check_global_options(&context).unwrap_err();
        assert!(err.to_string().contains("Invalid value 'VERBOSE'"));
        context.put("logLevel", "DEBUG");
        assert!(check_global_options(&context).is_ok());
    }

    #[test]
    fn global_definitions_cover_the_documented_set() {
        let registry = global_option_definitions();
        for name in ["help", "configFile", "logFile", "logLevel"] {
            assert!(registry.contains_key(name), "missing -{}", name);
        }
        assert!(registry.get("help").unwrap().is_flag());
        assert!(registry.get("configFile").unwrap().is_required());
        // logFile is required only while logLevel is in play.
        let log_file = registry.get("logFile").unwrap();
        assert!(!log_file.is_required_and_not_ignored(&Context::new()));
        assert_eq!(log_file.depends_on_options(), ["logLevel"]);
        assert_eq!(registry.get("logLevel").unwrap().allowed_values().len(), 6);
    }
}
