// src/core/options.rs

use crate::{
    context::Context,
    core::{errors::FatalError, interpolator},
};
use indexmap::IndexMap;

/// One allowed value for an option, with its human description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedValue {
    pub value: String,
    pub description: String,
}

/// A single declarative CLI option.
///
/// Identity is `(group, name)`; names share one global namespace across all
/// groups, because CLI parsing has no concept of group. Definitions are
/// constructed once by their owning contributor at registry-build time and
/// stay immutable afterwards, except for the one default-value override the
/// orchestrator applies from the configuration before validation.
#[derive(Debug, Clone)]
pub struct OptionDefinition {
    group: String,
    name: String,
    description: String,
    required: bool,
    is_flag: bool,
    default_value: Option<String>,
    allowed_values: Vec<AllowedValue>,
    depends_on: Vec<String>,
    alternative_for: Vec<String>,
}

impl OptionDefinition {
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            description: description.into(),
            required,
            is_flag: false,
            default_value: None,
            allowed_values: Vec::new(),
            depends_on: Vec::new(),
            alternative_for: Vec::new(),
        }
    }

    /// Marks this option as a flag: presence on the CLI implies value "true".
    pub fn flag(mut self, is_flag: bool) -> Self {
        self.is_flag = is_flag;
        self
    }

    /// Declares the static default. The value may itself contain `<ctx::...>`
    /// references; those are resolved lazily against the context at use time.
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn allowed_value(mut self, value: impl Into<String>, description: impl Into<String>) -> Self {
        self.allowed_values.push(AllowedValue {
            value: value.into(),
            description: description.into(),
        });
        self
    }

    /// Declares an option that must also be set for this one to apply.
    pub fn depends_on(mut self, option: impl Into<String>) -> Self {
        self.depends_on.push(option.into());
        self
    }

    /// Declares an option this one is an alternative for: when any member of
    /// the alternative set carries a value, this option's requiredness is
    /// satisfied by proxy.
    pub fn alternative_for(mut self, option: impl Into<String>) -> Self {
        self.alternative_for.push(option.into());
        self
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_flag(&self) -> bool {
        self.is_flag
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn declared_default(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    pub fn allowed_values(&self) -> &[AllowedValue] {
        &self.allowed_values
    }

    pub fn depends_on_options(&self) -> &[String] {
        &self.depends_on
    }

    pub fn alternative_for_options(&self) -> &[String] {
        &self.alternative_for
    }

    /// An option is ignored when one of the options it depends on has no
    /// value in the context, or when one of its alternatives already carries
    /// a non-blank value. A blank alternative does not count as present.
    pub fn is_ignored(&self, context: &Context) -> bool {
        if self
            .depends_on
            .iter()
            .any(|dep| !context.has_value_for_key(dep))
        {
            return true;
        }
        self.alternative_for
            .iter()
            .any(|alt| context.get(alt).is_some_and(|v| !v.trim().is_empty()))
    }

    /// The requiredness predicate evaluated against the current context, not
    /// statically: a required option stops being required once a sibling
    /// alternative is supplied, or while a dependency is absent.
    pub fn is_required_and_not_ignored(&self, context: &Context) -> bool {
        self.required && !self.is_ignored(context)
    }

    /// Resolves the declared default against the context at call time. A
    /// blank or unresolvable default counts as no default.
    pub fn resolved_default(&self, context: &Context) -> Option<String> {
        let raw = self.default_value.as_deref()?;
        match interpolator::expand(raw, context) {
            Ok(value) if !value.trim().is_empty() => Some(value),
            Ok(_) => None,
            Err(e) => {
                log::trace!("Default for -{} left unresolved: {:#}", self.name, e);
                None
            }
        }
    }

    /// The option's value: the context value if present, else the lazily
    /// resolved default.
    pub fn value(&self, context: &Context) -> Option<String> {
        context
            .get(&self.name)
            .map(str::to_string)
            .or_else(|| self.resolved_default(context))
    }

    /// Rejects a supplied context value that falls outside a non-empty
    /// allowed-value set. Options without a context value, or without
    /// constraints, always pass.
    pub fn check_allowed_value(&self, context: &Context) -> Result<(), FatalError> {
        if let Some(value) = context.get(&self.name)
            && !self.allowed_values.is_empty()
            && !self.allowed_values.iter().any(|a| a.value == value)
        {
            return Err(FatalError::ValueNotAllowed {
                name: self.name.clone(),
                value: value.to_string(),
                allowed: self
                    .allowed_values
                    .iter()
                    .map(|a| a.value.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }
        Ok(())
    }

    /// Override hook for configuration-supplied defaults. Last writer wins;
    /// the orchestrator applies this once, before validation.
    pub fn set_default_value(&mut self, value: impl Into<String>) {
        self.default_value = Some(value.into());
    }

    pub fn default_value_description(&self) -> String {
        self.default_value
            .clone()
            .unwrap_or_else(|| "none".to_string())
    }

    pub fn current_value_description(&self, context: &Context) -> String {
        self.value(context).unwrap_or_else(|| "none".to_string())
    }
}

/// A keyed, groupable, mergeable collection of [`OptionDefinition`]s.
///
/// Contributors (runner steps, context generator, the CLI front end) add
/// their definitions into one shared instance; insertion order is preserved
/// so help text and validation errors enumerate options deterministically.
/// Registries are rebuilt per invocation, never cached across contexts,
/// because contributors may expose context-dependent option sets.
#[derive(Debug, Clone, Default)]
pub struct OptionDefinitionRegistry {
    definitions: IndexMap<String, OptionDefinition>,
}

impl OptionDefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a definition.
    ///
    /// Names share one global namespace: the same name declared under a
    /// different group is a configuration error and fails fast. The same
    /// `(group, name)` identity declared twice is reconcilable; the first
    /// declaration wins.
    pub fn add(&mut self, definition: OptionDefinition) -> Result<(), FatalError> {
        if let Some(existing) = self.definitions.get(definition.name()) {
            if existing.group() != definition.group() {
                return Err(FatalError::OptionNameCollision {
                    name: definition.name().to_string(),
                    existing_group: existing.group().to_string(),
                    new_group: definition.group().to_string(),
                });
            }
            return Ok(());
        }
        self.definitions
            .insert(definition.name().to_string(), definition);
        Ok(())
    }

    pub fn add_all(
        &mut self,
        definitions: impl IntoIterator<Item = OptionDefinition>,
    ) -> Result<(), FatalError> {
        for definition in definitions {
            self.add(definition)?;
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&OptionDefinition> {
        self.definitions.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut OptionDefinition> {
        self.definitions.get_mut(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// All definitions, in declaration order.
    pub fn values(&self) -> impl Iterator<Item = &OptionDefinition> {
        self.definitions.values()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Groups in first-declared order, options within a group in declaration
    /// order. This is the enumeration order for help text and validation
    /// errors, and it is reproducible across rebuilds from the same
    /// contributors.
    pub fn by_groups(&self) -> IndexMap<&str, Vec<&OptionDefinition>> {
        let mut groups: IndexMap<&str, Vec<&OptionDefinition>> = IndexMap::new();
        for definition in self.definitions.values() {
            groups
                .entry(definition.group())
                .or_default()
                .push(definition);
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(pairs: &[(&str, &str)]) -> Context {
        let mut context = Context::new();
        for (k, v) in pairs {
            context.put(*k, *v);
        }
        context
    }

    #[test]
    fn required_without_alternatives_tracks_presence() {
        let def = OptionDefinition::new("global", "apiKey", "API key", true);
        assert!(def.is_required_and_not_ignored(&ctx(&[])));
        assert!(!ctx(&[]).has_value_for_key("apiKey"));
        assert!(def.is_required_and_not_ignored(&ctx(&[("apiKey", "s3cret")])));
    }

    #[test]
    fn alternative_with_value_suspends_requiredness() {
        let def = OptionDefinition::new("auth", "userName", "User name", true)
            .alternative_for("authToken");
        assert!(def.is_required_and_not_ignored(&ctx(&[])));
        assert!(!def.is_required_and_not_ignored(&ctx(&[("authToken", "tok")])));
    }

    #[test]
    fn blank_alternative_does_not_count_as_present() {
        let def = OptionDefinition::new("auth", "userName", "User name", true)
            .alternative_for("authToken");
        assert!(def.is_required_and_not_ignored(&ctx(&[("authToken", "  ")])));
    }

    #[test]
    fn missing_dependency_makes_option_ignored() {
        let def = OptionDefinition::new("global", "logFile", "Log file", true)
            .default_value("procrun.log")
            .depends_on("logLevel");
        assert!(!def.is_required_and_not_ignored(&ctx(&[])));
        assert!(def.is_required_and_not_ignored(&ctx(&[("logLevel", "DEBUG")])));
    }

    #[test]
    fn value_prefers_context_over_default() {
        let def = OptionDefinition::new("runner", "user", "User", false).default_value("alice");
        assert_eq!(def.value(&ctx(&[])), Some("alice".to_string()));
        assert_eq!(def.value(&ctx(&[("user", "bob")])), Some("bob".to_string()));
    }

    #[test]
    fn default_referencing_context_resolves_lazily() {
        let def = OptionDefinition::new("runner", "email", "Email", false)
            .default_value("<ctx::user>@corp.example");
        // The referenced option has no value yet: no default available.
        assert_eq!(def.value(&ctx(&[])), None);
        // Once the sibling option is populated, the same definition resolves.
        assert_eq!(
            def.value(&ctx(&[("user", "alice")])),
            Some("alice@corp.example".to_string())
        );
    }

    #[test]
    fn blank_default_counts_as_no_default() {
        let def = OptionDefinition::new("runner", "tag", "Tag", false).default_value("   ");
        assert_eq!(def.resolved_default(&ctx(&[])), None);
    }

    #[test]
    fn override_wins_over_declared_default() {
        let mut def =
            OptionDefinition::new("runner", "user", "User", false).default_value("declared");
        def.set_default_value("from-config");
        assert_eq!(def.value(&ctx(&[])), Some("from-config".to_string()));
    }

    #[test]
    fn allowed_value_check_rejects_only_out_of_set_values() {
        let def = OptionDefinition::new("sync", "mode", "Mode", false)
            .allowed_value("full", "Everything")
            .allowed_value("delta", "Changes only");
        assert!(def.check_allowed_value(&ctx(&[])).is_ok());
        assert!(def.check_allowed_value(&ctx(&[("mode", "delta")])).is_ok());
        let err = def.check_allowed_value(&ctx(&[("mode", "partial")])).unwrap_err();
        assert!(err.to_string().contains("allowed values: full, delta"));
    }

    #[test]
    fn duplicate_name_across_groups_fails_fast() {
        let mut registry = OptionDefinitionRegistry::new();
        registry
            .add(OptionDefinition::new("global", "user", "User", false))
            .unwrap();
        let err = registry
            .add(OptionDefinition::new("runner", "user", "User", false))
            .unwrap_err();
        assert!(err.to_string().contains("Option name collision"));
    }

    #[test]
    fn duplicate_identity_keeps_first_declaration() {
        let mut registry = OptionDefinitionRegistry::new();
        registry
            .add(OptionDefinition::new("runner", "user", "First", false))
            .unwrap();
        registry
            .add(OptionDefinition::new("runner", "user", "Second", true))
            .unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("user").unwrap().description(), "First");
    }

    #[test]
    fn by_groups_orders_deterministically_across_rebuilds() {
        let build = || {
            let mut registry = OptionDefinitionRegistry::new();
            registry
                .add_all([
                    OptionDefinition::new("global", "help", "Help", false),
                    OptionDefinition::new("sync", "source", "Source", true),
                    OptionDefinition::new("global", "configFile", "Config", true),
                    OptionDefinition::new("sync", "target", "Target", true),
                    OptionDefinition::new("notify", "channel", "Channel", false),
                ])
                .unwrap();
            registry
        };

        for _ in 0..3 {
            let registry = build();
            let groups = registry.by_groups();
            let group_names: Vec<_> = groups.keys().copied().collect();
            assert_eq!(group_names, vec!["global", "sync", "notify"]);
            let sync_options: Vec<_> = groups["sync"].iter().map(|d| d.name()).collect();
            assert_eq!(sync_options, vec!["source", "target"]);
        }
    }
}
