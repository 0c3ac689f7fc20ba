//! Prompt templates for image captioning.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — changing the default caption wording
//!    requires editing exactly one place.
//!
//! 2. **Testability** — unit tests can render and inspect prompts directly
//!    without spinning up a model, making template regressions easy to catch.
//!
//! Callers can override the default via
//! [`crate::config::CaptionConfig::prompt_template`]; the constant here is
//! used only when no override is provided.

/// Default prompt template shared by both captioning strategies.
///
/// Recognised placeholders: `{title}` and `{description}`.
pub const DEFAULT_PROMPT_TEMPLATE: &str = "You are an intelligent assistant. Based on the given \
title and metadata, generate a descriptive caption for the image. \
Title: {title}. Description: {description}";

/// Default caption template for the template-backed (simple) strategy.
///
/// Recognised placeholders: `{title}` and `{description}`.
pub const DEFAULT_CAPTION_TEMPLATE: &str = "Generated caption for '{title}': {description}";

/// Render a prompt template, substituting the metadata placeholders.
///
/// Only `{title}` and `{description}` are recognised; any other brace
/// sequence is passed through untouched so templates can contain literal
/// braces without an escaping syntax.
pub fn render_prompt(template: &str, title: &str, description: &str) -> String {
    template
        .replace("{title}", title)
        .replace("{description}", description)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_both_placeholders() {
        let out = render_prompt("T: {title} D: {description}", "Dog", "A good dog");
        assert_eq!(out, "T: Dog D: A good dog");
    }

    #[test]
    fn unknown_placeholders_left_intact() {
        let out = render_prompt("{title} {model}", "Dog", "x");
        assert_eq!(out, "Dog {model}");
    }

    #[test]
    fn default_template_renders() {
        let out = render_prompt(DEFAULT_PROMPT_TEMPLATE, "Pic", "A park");
        assert!(out.contains("Title: Pic"));
        assert!(out.contains("Description: A park"));
        assert!(!out.contains('{'));
    }
}
