// src/core/interpolator.rs

use crate::context::Context;
use anyhow::{Result, anyhow};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TOKEN_RE: Regex = Regex::new(r"<(ctx|env)::([A-Za-z0-9_.-]+)>").unwrap();
}

/// Upper bound on whole-template substitution passes. One pass replaces every
/// token currently present, so only values that keep introducing new tokens
/// (a cycle) can exhaust this.
const MAX_EXPANSION_PASSES: u32 = 16;

/// Expands `<ctx::KEY>` and `<env::NAME>` tokens in a template against the
/// given context.
///
/// Expansion always happens at call time, never at definition time, so a
/// default value declared early may reference options that are only populated
/// later. An unresolvable token is an error; callers that treat "no value" as
/// acceptable (default seeding) map that error to absence themselves.
pub fn expand(template: &str, context: &Context) -> Result<String> {
    let mut current = template.to_string();
    let mut passes = 0;

    while TOKEN_RE.is_match(&current) {
        if passes >= MAX_EXPANSION_PASSES {
            return Err(anyhow!(
                "Maximum expansion depth ({}) exceeded in template '{}'. Check for cyclical references.",
                MAX_EXPANSION_PASSES,
                template
            ));
        }

        let mut expanded = String::with_capacity(current.len());
        let mut tail = 0;
        for caps in TOKEN_RE.captures_iter(&current) {
            let Some(token) = caps.get(0) else { continue };
            expanded.push_str(&current[tail..token.start()]);
            expanded.push_str(&resolve_token(&caps, context)?);
            tail = token.end();
        }
        expanded.push_str(&current[tail..]);
        current = expanded;
        passes += 1;
    }

    Ok(current)
}

fn resolve_token(caps: &regex::Captures<'_>, context: &Context) -> Result<String> {
    let key = &caps[2];
    match &caps[1] {
        "ctx" => context.get(key).map(str::to_string).ok_or_else(|| {
            anyhow!("<ctx::{}> cannot be resolved: option '{}' has no value", key, key)
        }),
        // The regex only matches the ctx and env namespaces.
        _ => std::env::var(key)
            .map_err(|_| anyhow!("<env::{}> cannot be resolved: variable is not set", key)),
    }
}

/// Lists the context keys a template references via `<ctx::KEY>` tokens, in
/// order of first appearance. Used to auto-register optional definitions for
/// keys a step consumes.
pub fn context_references(template: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for caps in TOKEN_RE.captures_iter(template) {
        if &caps[1] == "ctx" {
            let key = caps[2].to_string();
            if !seen.contains(&key) {
                seen.push(key);
            }
        }
    }
    seen
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
    fn expands_context_tokens() {
        let context = ctx(&[("user", "alice"), ("release", "1.0")]);
        let out = expand("deploy <ctx::release> as <ctx::user>", &context).unwrap();
        assert_eq!(out, "deploy 1.0 as alice");
    }

    #[test]
    fn missing_key_is_an_error() {
        let context = ctx(&[]);
        let err = expand("<ctx::user>", &context).unwrap_err();
        assert!(err.to_string().contains("option 'user' has no value"));
    }

    #[test]
    fn literal_templates_pass_through() {
        let context = ctx(&[]);
        assert_eq!(expand("no tokens here", &context).unwrap(), "no tokens here");
    }

    #[test]
    fn expansion_is_lazy_not_positional() {
        // The referenced key can be populated after the template was written.
        let mut context = ctx(&[]);
        assert!(expand("<ctx::user>@corp", &context).is_err());
        context.put("user", "alice");
        assert_eq!(expand("<ctx::user>@corp", &context).unwrap(), "alice@corp");
    }

    #[test]
    fn many_flat_tokens_expand_without_hitting_the_depth_cap() {
        // Repetition is not recursion: any number of side-by-side tokens
        // resolves in a single pass.
        let context = ctx(&[("user", "alice")]);
        let template = "<ctx::user> ".repeat(20);
        assert_eq!(expand(&template, &context).unwrap(), "alice ".repeat(20));
    }

    #[test]
    fn runaway_self_reference_hits_the_depth_cap() {
        let context = ctx(&[("a", "<ctx::a>")]);
        let err = expand("<ctx::a>", &context).unwrap_err();
        assert!(err.to_string().contains("Maximum expansion depth"));
    }

    #[test]
    fn value_containing_another_token_resolves() {
        let context = ctx(&[("greeting", "hello <ctx::user>"), ("user", "alice")]);
        assert_eq!(expand("<ctx::greeting>", &context).unwrap(), "hello alice");
    }

    #[test]
    fn context_references_are_deduplicated_in_order() {
        let refs = context_references("<ctx::b> <env::HOME> <ctx::a> <ctx::b>");
        assert_eq!(refs, vec!["b".to_string(), "a".to_string()]);
    }
}
