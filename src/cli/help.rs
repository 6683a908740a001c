// src/cli/help.rs

use crate::{
    context::Context,
    core::{options::OptionDefinition, orchestrator::Orchestrator},
};
use anyhow::Result;

const WRAP_WIDTH: usize = 100;

/// Accumulates indented, word-wrapped lines and prints them in one go. Help
/// output is deliberately plain text; it is the one surface meant to be piped
/// and grepped.
pub struct HelpPrinter {
    lines: Vec<String>,
}

impl HelpPrinter {
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    pub fn append_empty_ln(&mut self) {
        self.lines.push(String::new());
    }

    /// Appends `text` at the given indent, wrapping on word boundaries so no
    /// rendered line exceeds the wrap width. Continuation lines keep the
    /// indent.
    pub fn append_ln(&mut self, indent: usize, text: &str) {
        let prefix = " ".repeat(indent);
        let available = WRAP_WIDTH.saturating_sub(indent).max(1);
        let mut current = String::new();
        for word in text.split_whitespace() {
            if !current.is_empty() && current.len() + 1 + word.len() > available {
                self.lines.push(format!("{}{}", prefix, current));
                current.clear();
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        self.lines.push(format!("{}{}", prefix, current));
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

impl Default for HelpPrinter {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders the full usage text: the invocation line, the global options, and
/// (when a configuration was loadable) every option the configured runner and
/// generator contribute, grouped and in declaration order.
pub fn render_usage(orchestrator: Option<&Orchestrator>, context: &Context) -> Result<String> {
    let mut printer = HelpPrinter::new();
    printer.append_ln(0, "Usage:");
    printer.append_empty_ln();
    printer.append_ln(2, "procrun [options]");
    printer.append_empty_ln();

    let globals = super::global_option_definitions();
    append_group(&mut printer, "Global options:", globals.values(), context);

    match orchestrator {
        Some(orchestrator) => {
            let registry = orchestrator.option_definitions(context)?;
            for (group, definitions) in registry.by_groups() {
                append_group(
                    &mut printer,
                    &format!("Options for {}:", group),
                    definitions.into_iter(),
                    context,
                );
            }
        }
        None => {
            printer.append_ln(
                2,
                "Additional options will be shown when a valid configuration file has been specified",
            );
            printer.append_empty_ln();
        }
    }
    Ok(printer.render())
}

pub fn print_usage(orchestrator: Option<&Orchestrator>, context: &Context) -> Result<()> {
    println!("{}", render_usage(orchestrator, context)?);
    Ok(())
}

fn append_group<'a>(
    printer: &mut HelpPrinter,
    heading: &str,
    definitions: impl Iterator<Item = &'a OptionDefinition>,
    context: &Context,
) {
    printer.append_ln(0, heading);
    printer.append_empty_ln();
    for definition in definitions {
        append_option(printer, definition, context);
    }
}

fn append_option(printer: &mut HelpPrinter, definition: &OptionDefinition, context: &Context) {
    // Requiredness is contextual: a required option whose dependency is
    // absent, or whose alternative is already supplied, renders as optional.
    let requiredness = if definition.is_required_and_not_ignored(context) {
        "required"
    } else {
        "optional"
    };
    let value_hint = if definition.is_flag() { "" } else { " <value>" };
    printer.append_ln(
        2,
        &format!("-{}{} ({})", definition.name(), value_hint, requiredness),
    );
    printer.append_ln(4, definition.description());
    if definition.declared_default().is_some() {
        printer.append_ln(
            4,
            &format!("Default value: {}", definition.default_value_description()),
        );
    }
    if definition.value(context).is_some() {
        printer.append_ln(
            4,
            &format!(
                "Current value: {}",
                definition.current_value_description(context)
            ),
        );
    }
    if !definition.allowed_values().is_empty() {
        printer.append_ln(4, "Allowed values:");
        for allowed in definition.allowed_values() {
            printer.append_ln(6, &format!("{} - {}", allowed.value, allowed.description));
        }
    }
    if !definition.depends_on_options().is_empty() {
        printer.append_ln(
            4,
            &format!(
                "Requires options: {}",
                definition
                    .depends_on_options()
                    .iter()
                    .map(|name| format!("-{}", name))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        );
    }
    if !definition.alternative_for_options().is_empty() {
        printer.append_ln(
            4,
            &format!(
                "Alternative options: {}",
                definition
                    .alternative_for_options()
                    .iter()
                    .map(|name| format!("-{}", name))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        );
    }
    printer.append_empty_ln();
}
