//! Prompt rendering with Handlebars.
//!
//! Custom helpers:
//! - truncate: cut a string to at most N characters

use crate::messages::{ADVISOR_SYSTEM_PROMPT, NO_CONTEXT};
use crate::templates::TemplatesFile;
use crate::OutError;
use advisor_core::{ContextDocument, QueryAnalysis, ResponsePlan, ResponseStrategy};
use handlebars::{handlebars_helper, Handlebars};
use serde_json::{json, Value};

/// Maximum characters of a document quoted into the prompt
pub const MAX_DOCUMENT_CHARS: usize = 500;

handlebars_helper!(truncate: |text: str, max: u64| {
    text.chars().take(max as usize).collect::<String>()
});

/// Compiled renderer with registered helpers
pub struct PromptRenderer {
    handlebars: Handlebars<'static>,
    templates: TemplatesFile,
}

impl PromptRenderer {
    pub fn new(templates: TemplatesFile) -> Result<Self, OutError> {
        let mut handlebars = Handlebars::new();

        // Prompts are plain text, not HTML
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.set_strict_mode(false);
        handlebars.register_helper("truncate", Box::new(truncate));

        for (name, template) in &templates.templates {
            handlebars
                .register_template_string(name, &template.template)
                .map_err(|e| OutError::Template(format!("{}: {}", name, e)))?;
        }

        Ok(Self { handlebars, templates })
    }

    /// Renderer over the templates compiled into the crate
    pub fn builtin() -> Result<Self, OutError> {
        Self::new(TemplatesFile::builtin()?)
    }

    /// Load from a file path
    pub fn load(path: &str) -> Result<Self, OutError> {
        Self::new(TemplatesFile::load(path)?)
    }

    /// Render a named template with data
    pub fn render(&self, template_name: &str, data: &Value) -> Result<String, OutError> {
        self.handlebars
            .render(template_name, data)
            .map_err(|e| OutError::Render(e.to_string()))
    }

    /// Build the system message for the generation call
    pub fn system_context(
        &self,
        base: &str,
        documents: &[ContextDocument],
        plan: Option<&ResponsePlan>,
        analysis: Option<&QueryAnalysis>,
    ) -> Result<String, OutError> {
        let base = if base.trim().is_empty() { ADVISOR_SYSTEM_PROMPT } else { base };

        let documents: Vec<Value> = documents
            .iter()
            .enumerate()
            .map(|(i, doc)| {
                json!({
                    "position": i + 1,
                    "content": doc.content,
                    "source": if doc.source.is_empty() { "Unknown source" } else { doc.source.as_str() },
                })
            })
            .collect();

        let data = json!({
            "base": base,
            "guidance": guidance(plan, analysis),
            "documents": documents,
            "max_chars": MAX_DOCUMENT_CHARS,
            "placeholder": NO_CONTEXT,
        });

        self.render("system_context", &data)
            .map(|text| text.trim_end().to_string())
    }

    pub fn list_templates(&self) -> Vec<&str> {
        self.templates.list_templates()
    }
}

/// Plan-derived instructions for the model, most urgent first
fn guidance(plan: Option<&ResponsePlan>, analysis: Option<&QueryAnalysis>) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(plan) = plan {
        if plan.strategy == ResponseStrategy::ImmediateSupport {
            lines.push("Offer immediate, practical support before anything else.".to_string());
        }
        if plan.include_professional_referral {
            lines.push(
                "Recommend appropriate professional help (pediatrician, counselor or emergency services)."
                    .to_string(),
            );
        }
        lines.push("Keep an empathetic, non-judgmental tone.".to_string());
        if plan.include_sources {
            lines.push("Mention which of the provided sources you relied on.".to_string());
        }
        if plan.suggest_followup {
            lines.push("Close with a follow-up question to clarify the situation.".to_string());
        }
    }

    if let Some(age) = analysis.and_then(|a| a.child_age.as_deref()) {
        lines.push(format!("The parent mentioned a child age of {}; tailor advice to it.", age));
    }

    lines
}
